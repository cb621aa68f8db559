//! jpegls CLI - encode raw pixel dumps to JPEG-LS.
//!
//! Takes headerless raw sample data (grayscale or interleaved color) and
//! produces a `.jls` file, with optional near-lossless mode, interleave
//! selection and SPIFF header.

use clap::{Parser, Subcommand, ValueEnum};
use jpegls_rs::{
    ColorTransformation, FrameInfo, InterleaveMode, JpeglsEncoder, SpiffColorSpace,
    SpiffResolutionUnits,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// JPEG-LS (ITU-T T.87) encoder for raw pixel data
#[derive(Parser)]
#[command(name = "jpegls")]
#[command(version)]
#[command(about = "Encode raw pixel data to JPEG-LS", long_about = None)]
#[command(after_help = "EXAMPLES:
    jpegls encode -i pixels.raw -o image.jls -W 512 -H 512
    jpegls encode -i rgb.raw -o image.jls -W 640 -H 480 -n 3 -m sample
    jpegls encode -i ct.raw -o slice.jls -W 512 -H 512 -b 12 --near-lossless 2

The input must contain width x height x components samples; samples deeper
than 8 bits are read as native-endian 16-bit values.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode raw pixels to a JPEG-LS file
    #[command(visible_alias = "e")]
    Encode {
        /// Input raw pixel file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JPEG-LS file
        #[arg(short, long)]
        output: PathBuf,

        /// Image width in pixels
        #[arg(short = 'W', long)]
        width: u32,

        /// Image height in pixels
        #[arg(short = 'H', long)]
        height: u32,

        /// Bits per sample (2-16)
        #[arg(short = 'b', long, default_value = "8")]
        bits_per_sample: i32,

        /// Number of components (1=grayscale, 3=RGB)
        #[arg(short = 'n', long, default_value = "1")]
        components: i32,

        /// Interleave mode for multi-component images
        #[arg(short = 'm', long, default_value = "none", value_enum)]
        interleave: Interleave,

        /// NEAR parameter (0=lossless, 1-255=near-lossless)
        #[arg(long, default_value = "0")]
        near_lossless: i32,

        /// HP color transformation (3-component, 8/16-bit only)
        #[arg(short = 't', long, default_value = "none", value_enum)]
        transform: Transform,

        /// Write a standard SPIFF header
        #[arg(long)]
        spiff: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Interleave {
    None,
    Line,
    Sample,
}

impl From<Interleave> for InterleaveMode {
    fn from(value: Interleave) -> Self {
        match value {
            Interleave::None => InterleaveMode::None,
            Interleave::Line => InterleaveMode::Line,
            Interleave::Sample => InterleaveMode::Sample,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Transform {
    None,
    Hp1,
    Hp2,
    Hp3,
}

impl From<Transform> for ColorTransformation {
    fn from(value: Transform) -> Self {
        match value {
            Transform::None => ColorTransformation::None,
            Transform::Hp1 => ColorTransformation::Hp1,
            Transform::Hp2 => ColorTransformation::Hp2,
            Transform::Hp3 => ColorTransformation::Hp3,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            width,
            height,
            bits_per_sample,
            components,
            interleave,
            near_lossless,
            transform,
            spiff,
        } => {
            let source = match fs::read(&input) {
                Ok(data) => data,
                Err(error) => {
                    eprintln!("error: cannot read {}: {error}", input.display());
                    return ExitCode::FAILURE;
                }
            };

            let frame_info = FrameInfo {
                width,
                height,
                bits_per_sample,
                component_count: components,
            };

            let result = (|| {
                let mut destination = vec![0u8; estimated_size(&frame_info)];
                let mut encoder = JpeglsEncoder::new(&mut destination);
                encoder.set_frame_info(frame_info)?;
                encoder.set_near_lossless(near_lossless)?;
                encoder.set_interleave_mode(interleave.into())?;
                encoder.set_color_transformation(transform.into())?;

                if spiff {
                    let color_space = if components == 1 {
                        SpiffColorSpace::Grayscale
                    } else {
                        SpiffColorSpace::Rgb
                    };
                    encoder.write_standard_spiff_header(
                        color_space,
                        SpiffResolutionUnits::AspectRatio,
                        1,
                        1,
                    )?;
                }

                let bytes_written = encoder.encode(&source, 0)?;
                destination.truncate(bytes_written);
                Ok::<_, jpegls_rs::JpeglsError>(destination)
            })();

            match result {
                Ok(encoded) => {
                    if let Err(error) = fs::write(&output, &encoded) {
                        eprintln!("error: cannot write {}: {error}", output.display());
                        return ExitCode::FAILURE;
                    }
                    println!(
                        "{} -> {} ({} bytes, {:.2} bits/sample)",
                        input.display(),
                        output.display(),
                        encoded.len(),
                        encoded.len() as f64 * 8.0
                            / (width as f64 * height as f64 * components as f64)
                    );
                    ExitCode::SUCCESS
                }
                Err(error) => {
                    eprintln!("error: {error}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn estimated_size(frame_info: &FrameInfo) -> usize {
    let bytes_per_sample = if frame_info.bits_per_sample > 8 { 2 } else { 1 };
    frame_info.component_count as usize
        * frame_info.width as usize
        * frame_info.height as usize
        * bytes_per_sample
        * 2
        + 2048
}
