// Marker-segment level tests: SPIFF headers and directory entries, comment
// and application-data segments, mapping-table chunking and the segment-order
// state machine.

#[cfg(test)]
mod jpegls_marker_segments {
    use jpegls_rs::{
        FrameInfo, JpeglsEncoder, JpeglsError, SpiffColorSpace, SpiffCompressionType,
        SpiffHeader, SpiffProfileId, SpiffResolutionUnits,
    };

    fn gray_frame(width: u32, height: u32) -> FrameInfo {
        FrameInfo {
            width,
            height,
            bits_per_sample: 8,
            component_count: 1,
        }
    }

    fn find_sequence(stream: &[u8], needle: &[u8]) -> Option<usize> {
        stream.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn standard_spiff_header_layout() {
        let mut destination = vec![0u8; 4096];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        encoder.set_frame_info(gray_frame(4, 3)).unwrap();
        encoder
            .write_standard_spiff_header(SpiffColorSpace::Grayscale, SpiffResolutionUnits::DotsPerInch, 96, 96)
            .unwrap();
        let source: Vec<u8> = (0..12).collect();
        let bytes_written = encoder.encode(&source, 0).unwrap();
        let stream = &destination[..bytes_written];

        // SOI, then the 34-byte SPIFF APP8 segment.
        assert_eq!(&stream[..2], [0xFF, 0xD8]);
        assert_eq!(&stream[2..6], [0xFF, 0xE8, 0x00, 0x20]);
        assert_eq!(&stream[6..12], b"SPIFF\0");
        assert_eq!(stream[12], 2); // major version
        assert_eq!(stream[13], 0); // minor version
        assert_eq!(stream[14], SpiffProfileId::None as u8);
        assert_eq!(stream[15], 1); // component count
        assert_eq!(&stream[16..20], 3u32.to_be_bytes().as_slice()); // height
        assert_eq!(&stream[20..24], 4u32.to_be_bytes().as_slice()); // width
        assert_eq!(stream[24], SpiffColorSpace::Grayscale as u8);
        assert_eq!(stream[25], 8); // bits per sample
        assert_eq!(stream[26], SpiffCompressionType::JpegLs as u8);
        assert_eq!(stream[27], SpiffResolutionUnits::DotsPerInch as u8);
        assert_eq!(&stream[28..32], 96u32.to_be_bytes().as_slice());
        assert_eq!(&stream[32..36], 96u32.to_be_bytes().as_slice());

        // End-of-directory entry (with embedded SOI) precedes the SOF.
        let end_of_directory = [0xFF, 0xE8, 0x00, 0x08, 0, 0, 0, 1, 0xFF, 0xD8];
        let eod = find_sequence(stream, &end_of_directory).expect("missing end-of-directory");
        let sof = find_sequence(stream, &[0xFF, 0xF7]).expect("missing SOF");
        assert!(eod < sof);
    }

    #[test]
    fn spiff_entries_follow_the_header() {
        let mut destination = vec![0u8; 4096];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        encoder.set_frame_info(gray_frame(2, 2)).unwrap();
        encoder
            .write_standard_spiff_header(SpiffColorSpace::Grayscale, SpiffResolutionUnits::AspectRatio, 1, 1)
            .unwrap();
        encoder.write_spiff_entry(4, b"test").unwrap();
        let bytes_written = encoder.encode(&[0u8; 4], 0).unwrap();
        let stream = &destination[..bytes_written];

        // Entry: APP8, length 2 + 4 + 4, tag 4, data "test".
        let entry = [0xFF, 0xE8, 0x00, 0x0A, 0, 0, 0, 4, b't', b'e', b's', b't'];
        assert!(find_sequence(stream, &entry).is_some());
    }

    #[test]
    fn spiff_entry_requires_header() {
        let mut destination = vec![0u8; 128];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        assert_eq!(
            encoder.write_spiff_entry(4, b"test"),
            Err(JpeglsError::InvalidOperation)
        );
    }

    #[test]
    fn spiff_entry_validates_tag_and_size() {
        let mut destination = vec![0u8; 70000];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        encoder.set_frame_info(gray_frame(2, 2)).unwrap();
        encoder
            .write_standard_spiff_header(SpiffColorSpace::Grayscale, SpiffResolutionUnits::AspectRatio, 1, 1)
            .unwrap();

        // Tag 1 is reserved for the end-of-directory entry.
        assert_eq!(
            encoder.write_spiff_entry(1, b"x"),
            Err(JpeglsError::InvalidArgumentSpiffEntryTag)
        );
        let oversized = vec![0u8; 65529];
        assert_eq!(
            encoder.write_spiff_entry(4, &oversized),
            Err(JpeglsError::InvalidArgumentSpiffEntrySize)
        );
    }

    #[test]
    fn spiff_header_only_allowed_first() {
        let mut destination = vec![0u8; 4096];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        encoder.set_frame_info(gray_frame(2, 2)).unwrap();
        encoder.write_comment(b"hello").unwrap();
        assert_eq!(
            encoder.write_standard_spiff_header(
                SpiffColorSpace::Grayscale,
                SpiffResolutionUnits::AspectRatio,
                1,
                1
            ),
            Err(JpeglsError::InvalidOperation)
        );
    }

    #[test]
    fn explicit_spiff_header_validates_dimensions() {
        let mut destination = vec![0u8; 4096];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        let header = SpiffHeader {
            profile_id: SpiffProfileId::None,
            component_count: 1,
            height: 0,
            width: 4,
            color_space: SpiffColorSpace::Grayscale,
            bits_per_sample: 8,
            compression_type: SpiffCompressionType::JpegLs,
            resolution_units: SpiffResolutionUnits::AspectRatio,
            vertical_resolution: 1,
            horizontal_resolution: 1,
        };
        assert_eq!(
            encoder.write_spiff_header(&header),
            Err(JpeglsError::InvalidArgumentHeight)
        );
    }

    #[test]
    fn comment_and_application_data_precede_the_frame() {
        let mut destination = vec![0u8; 4096];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        encoder.set_frame_info(gray_frame(2, 2)).unwrap();
        encoder.write_comment(b"made with jpegls-rs").unwrap();
        encoder.write_application_data(11, &[1, 2, 3]).unwrap();
        let bytes_written = encoder.encode(&[0u8; 4], 0).unwrap();
        let stream = &destination[..bytes_written];

        let comment = find_sequence(stream, b"made with jpegls-rs").unwrap();
        assert_eq!(&stream[comment - 4..comment], [0xFF, 0xFE, 0x00, 21]);

        let app11 = find_sequence(stream, &[0xFF, 0xEB, 0x00, 0x05, 1, 2, 3]).unwrap();
        let sof = find_sequence(stream, &[0xFF, 0xF7]).unwrap();
        assert!(comment < sof && app11 < sof);
    }

    #[test]
    fn comment_after_encode_is_invalid() {
        let mut destination = vec![0u8; 4096];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        encoder.set_frame_info(gray_frame(2, 2)).unwrap();
        encoder.encode(&[0u8; 4], 0).unwrap();
        assert_eq!(encoder.write_comment(b"late"), Err(JpeglsError::InvalidOperation));
    }

    #[test]
    fn oversized_mapping_table_is_chunked() {
        // 70000 entries of 1 byte do not fit one LSE segment: expect a type 2
        // segment with 65530 data bytes followed by a type 3 continuation.
        let table: Vec<u8> = (0..70000u32).map(|i| (i % 251) as u8).collect();
        let mut destination = vec![0u8; 80000];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        encoder.write_table(7, 1, &table).unwrap();
        let bytes_written = encoder.create_tables_only().unwrap();
        let stream = &destination[..bytes_written];

        assert_eq!(&stream[..2], [0xFF, 0xD8]);
        // First chunk: length 65535, type 2.
        assert_eq!(&stream[2..9], [0xFF, 0xF8, 0xFF, 0xFF, 2, 7, 1]);
        let continuation = 2 + 2 + 65535;
        assert_eq!(
            &stream[continuation..continuation + 7],
            [0xFF, 0xF8, 0x11, 0x7B, 3, 7, 1]
        );
        assert_eq!(&stream[bytes_written - 2..], [0xFF, 0xD9]);
    }

    #[test]
    fn table_data_must_hold_one_entry() {
        let mut destination = vec![0u8; 128];
        let mut encoder = JpeglsEncoder::new(&mut destination);
        assert_eq!(
            encoder.write_table(1, 3, &[0, 0]),
            Err(JpeglsError::InvalidArgumentSize)
        );
    }
}
