#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOI: Marks the start of an image.
    StartOfImage = 0xD8,

    /// EOI: Marks the end of an image.
    EndOfImage = 0xD9,

    /// SOS: Marks the start of scan.
    StartOfScan = 0xDA,

    /// APP0: Application data 0: used for JFIF header.
    ApplicationData0 = 0xE0,
    /// APP1: Application data 1: used for EXIF or XMP header.
    ApplicationData1 = 0xE1,
    /// APP2: Application data 2: used for ICC profile.
    ApplicationData2 = 0xE2,
    /// APP3: Application data 3.
    ApplicationData3 = 0xE3,
    /// APP4: Application data 4.
    ApplicationData4 = 0xE4,
    /// APP5: Application data 5.
    ApplicationData5 = 0xE5,
    /// APP6: Application data 6.
    ApplicationData6 = 0xE6,
    /// APP7: Application data 7: used for HP color-space info.
    ApplicationData7 = 0xE7,
    /// APP8: Application data 8: used for HP color-transformation info or SPIFF header.
    ApplicationData8 = 0xE8,
    /// APP9: Application data 9.
    ApplicationData9 = 0xE9,
    /// APP10: Application data 10.
    ApplicationData10 = 0xEA,
    /// APP11: Application data 11.
    ApplicationData11 = 0xEB,
    /// APP12: Application data 12: used for Picture info.
    ApplicationData12 = 0xEC,
    /// APP13: Application data 13: used by PhotoShop IRB.
    ApplicationData13 = 0xED,
    /// APP14: Application data 14: used by Adobe.
    ApplicationData14 = 0xEE,
    /// APP15: Application data 15.
    ApplicationData15 = 0xEF,

    /// COM: Comment block.
    Comment = 0xFE,

    // The following markers are defined in ISO/IEC 14495-1 | ITU T.87. (JPEG-LS standard)
    /// SOF_55: Marks the start of a JPEG-LS encoded frame.
    StartOfFrameJpegls = 0xF7,

    /// LSE: Marks the start of a JPEG-LS preset parameters segment.
    JpeglsPresetParameters = 0xF8,
}

impl JpegMarkerCode {
    /// Returns the APPn marker for an application data ID in the range [0..15].
    pub fn application_data(id: u8) -> Self {
        debug_assert!(id <= 15);
        match id {
            0 => Self::ApplicationData0,
            1 => Self::ApplicationData1,
            2 => Self::ApplicationData2,
            3 => Self::ApplicationData3,
            4 => Self::ApplicationData4,
            5 => Self::ApplicationData5,
            6 => Self::ApplicationData6,
            7 => Self::ApplicationData7,
            8 => Self::ApplicationData8,
            9 => Self::ApplicationData9,
            10 => Self::ApplicationData10,
            11 => Self::ApplicationData11,
            12 => Self::ApplicationData12,
            13 => Self::ApplicationData13,
            14 => Self::ApplicationData14,
            _ => Self::ApplicationData15,
        }
    }
}

pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;
