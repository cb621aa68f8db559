/*!
# jpegls-rs

`jpegls-rs` is a pure Rust encoder for JPEG-LS (ISO/IEC 14495-1 / ITU-T T.87),
the low-complexity lossless and near-lossless image compression standard built
on the LOCO-I algorithm. It is particularly effective for medical images and
synthetic graphics.

The encoder supports 2 to 16 bits per sample, 1 to 255 components, the three
standard interleave modes (none, line, sample), custom preset coding
parameters (LSE), the optional HP color transformations, SPIFF headers, and
abbreviated table-specification streams.

## Example

```rust
use jpegls_rs::{FrameInfo, JpeglsEncoder};

let frame_info = FrameInfo { width: 4, height: 4, bits_per_sample: 8, component_count: 1 };
let source = [0u8; 16];
let mut destination = vec![0u8; 1024];

let mut encoder = JpeglsEncoder::new(&mut destination);
encoder.set_frame_info(frame_info).unwrap();
let bytes_written = encoder.encode(&source, 0).unwrap();
assert!(bytes_written > 0);
```

## Safety

The only `unsafe` in this crate is the guarded `align_to` reinterpretation of
byte buffers as `u16` samples for images deeper than 8 bits.
*/

pub mod coding_parameters;
pub mod color_transform;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod jpeg_marker_code;
pub mod jpeg_stream_writer;
pub mod process_line;
pub mod regular_mode_context;
pub mod run_mode_context;
pub mod scan_encoder;
pub mod traits;

pub use coding_parameters::JpeglsPcParameters;
pub use encoder::JpeglsEncoder;
pub use error::JpeglsError;

/// Basic information about an image frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// Width of the frame in pixels. Range [1, 65535].
    pub width: u32,
    /// Height of the frame in pixels. Range [1, 65535].
    pub height: u32,
    /// Bits per sample. Range [2, 16].
    pub bits_per_sample: i32,
    /// Number of color components (e.g. 1 for grayscale, 3 for RGB).
    pub component_count: i32,
}

/// Interleave mode for multi-component scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterleaveMode {
    /// Each component is encoded as a separate scan.
    #[default]
    None = 0,
    /// One scan, components interleaved line by line.
    Line = 1,
    /// One scan, components interleaved sample by sample.
    Sample = 2,
}

/// Color transformation for 3-component scans (HP extension, not defined in ISO/IEC 14495-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorTransformation {
    /// No color transformation.
    #[default]
    None = 0,
    /// HP1 color transformation.
    Hp1 = 1,
    /// HP2 color transformation.
    Hp2 = 2,
    /// HP3 color transformation.
    Hp3 = 3,
}

/// SPIFF profile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiffProfileId {
    /// No profile.
    None = 0,
    /// Continuous tone base profile.
    ContinuousToneBase = 1,
    /// Continuous tone progressive profile.
    ContinuousToneProgressive = 2,
    /// Bi-level facsimile profile.
    BiLevelFacsimile = 3,
    /// Continuous tone facsimile profile.
    ContinuousToneFacsimile = 4,
}

/// SPIFF color space identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiffColorSpace {
    /// Bi-level black.
    BiLevelBlack = 0,
    /// YCbCr (ITU-R BT.709) video.
    YCbCrItuBt709Video = 1,
    /// No color space (none).
    None = 2,
    /// YCbCr (ITU-R BT.601-1) RGB.
    YCbCrItuBt6011Rgb = 3,
    /// YCbCr (ITU-R BT.601-1) video.
    YCbCrItuBt6011Video = 4,
    /// Grayscale.
    Grayscale = 8,
    /// PhotoYCC.
    PhotoYcc = 9,
    /// RGB.
    Rgb = 10,
    /// CMY.
    Cmy = 11,
    /// CMYK.
    Cmyk = 12,
    /// YCCK.
    Ycck = 13,
    /// CIE Lab.
    CieLab = 14,
    /// Bi-level white.
    BiLevelWhite = 15,
}

/// SPIFF compression type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiffCompressionType {
    /// Uncompressed.
    Uncompressed = 0,
    /// Modified Huffman.
    ModifiedHuffman = 1,
    /// Modified Read.
    ModifiedRead = 2,
    /// Modified Modified Read.
    ModifiedModifiedRead = 3,
    /// JBIG.
    Jbig = 4,
    /// JPEG.
    Jpeg = 5,
    /// JPEG-LS.
    JpegLs = 6,
}

/// SPIFF resolution units identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiffResolutionUnits {
    /// Aspect ratio.
    AspectRatio = 0,
    /// Dots per inch (DPI).
    DotsPerInch = 1,
    /// Dots per centimeter.
    DotsPerCentimeter = 2,
}

/// Still Picture Interchange File Format (SPIFF) header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiffHeader {
    pub profile_id: SpiffProfileId,
    pub component_count: i32,
    pub height: u32,
    pub width: u32,
    pub color_space: SpiffColorSpace,
    pub bits_per_sample: i32,
    pub compression_type: SpiffCompressionType,
    pub resolution_units: SpiffResolutionUnits,
    pub vertical_resolution: u32,
    pub horizontal_resolution: u32,
}
