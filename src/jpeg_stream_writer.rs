//! JPEG-LS codestream writer.
//!
//! `JpegStreamWriter` emits marker segments (SOI, SOF55, SOS, LSE, SPIFF,
//! COM, APPn, EOI) as big-endian byte sequences into a borrowed destination
//! buffer. Segment ordering is enforced one level up by the encoder; this
//! type is purely mechanical.

use crate::constants::{
    SEGMENT_MAX_DATA_SIZE, SPIFF_END_OF_DIRECTORY_ENTRY_TYPE, SPIFF_MAJOR_REVISION_NUMBER,
    SPIFF_MINOR_REVISION_NUMBER,
};
use crate::error::JpeglsError;
use crate::jpeg_marker_code::{JpegMarkerCode, JPEG_MARKER_START_BYTE};
use crate::{ColorTransformation, FrameInfo, InterleaveMode, JpeglsPcParameters, SpiffHeader};

pub struct JpegStreamWriter<'a> {
    destination: &'a mut [u8],
    position: usize,
}

impl<'a> JpegStreamWriter<'a> {
    pub fn new(destination: &'a mut [u8]) -> Self {
        Self {
            destination,
            position: 0,
        }
    }

    pub fn bytes_written(&self) -> usize {
        self.position
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    fn write_byte(&mut self, value: u8) -> Result<(), JpeglsError> {
        if self.position >= self.destination.len() {
            return Err(JpeglsError::DestinationTooSmall);
        }
        self.destination[self.position] = value;
        self.position += 1;
        Ok(())
    }

    fn write_bytes(&mut self, values: &[u8]) -> Result<(), JpeglsError> {
        if self.destination.len() - self.position < values.len() {
            return Err(JpeglsError::DestinationTooSmall);
        }
        self.destination[self.position..self.position + values.len()].copy_from_slice(values);
        self.position += values.len();
        Ok(())
    }

    fn write_u16(&mut self, value: u16) -> Result<(), JpeglsError> {
        self.write_bytes(&value.to_be_bytes())
    }

    fn write_u32(&mut self, value: u32) -> Result<(), JpeglsError> {
        self.write_bytes(&value.to_be_bytes())
    }

    fn write_marker(&mut self, marker: JpegMarkerCode) -> Result<(), JpeglsError> {
        self.write_byte(JPEG_MARKER_START_BYTE)?;
        self.write_byte(marker as u8)
    }

    /// Writes a marker and its segment length field. `data_size` excludes the
    /// two length bytes.
    fn write_segment_header(
        &mut self,
        marker: JpegMarkerCode,
        data_size: usize,
    ) -> Result<(), JpeglsError> {
        debug_assert!(data_size <= SEGMENT_MAX_DATA_SIZE);
        self.write_marker(marker)?;
        self.write_u16((data_size + 2) as u16)
    }

    pub fn write_start_of_image(&mut self) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::StartOfImage)
    }

    pub fn write_end_of_image(&mut self) -> Result<(), JpeglsError> {
        self.write_marker(JpegMarkerCode::EndOfImage)
    }

    pub fn write_spiff_header_segment(&mut self, header: &SpiffHeader) -> Result<(), JpeglsError> {
        debug_assert!(header.height > 0);
        debug_assert!(header.width > 0);

        // ISO/IEC 10918-3, Annex F: APP8 + "SPIFF\0" + 30 data bytes.
        self.write_segment_header(JpegMarkerCode::ApplicationData8, 30)?;
        self.write_bytes(b"SPIFF\0")?;
        self.write_byte(SPIFF_MAJOR_REVISION_NUMBER)?;
        self.write_byte(SPIFF_MINOR_REVISION_NUMBER)?;
        self.write_byte(header.profile_id as u8)?;
        self.write_byte(header.component_count as u8)?;
        self.write_u32(header.height)?;
        self.write_u32(header.width)?;
        self.write_byte(header.color_space as u8)?;
        self.write_byte(header.bits_per_sample as u8)?;
        self.write_byte(header.compression_type as u8)?;
        self.write_byte(header.resolution_units as u8)?;
        self.write_u32(header.vertical_resolution)?;
        self.write_u32(header.horizontal_resolution)
    }

    pub fn write_spiff_directory_entry(
        &mut self,
        entry_tag: u32,
        entry_data: &[u8],
    ) -> Result<(), JpeglsError> {
        self.write_segment_header(JpegMarkerCode::ApplicationData8, 4 + entry_data.len())?;
        self.write_u32(entry_tag)?;
        self.write_bytes(entry_data)
    }

    pub fn write_spiff_end_of_directory_entry(&mut self) -> Result<(), JpeglsError> {
        // ISO/IEC 10918-3, F.2.2.3 documents that the EOD entry segment should
        // have a length of 8 but only 6 data bytes. This allows existing
        // bit streams to be wrapped with a SPIFF header: the SOI marker is
        // carried as the entry's data bytes.
        self.write_segment_header(JpegMarkerCode::ApplicationData8, 6)?;
        self.write_u32(SPIFF_END_OF_DIRECTORY_ENTRY_TYPE)?;
        self.write_byte(JPEG_MARKER_START_BYTE)?;
        self.write_byte(JpegMarkerCode::StartOfImage as u8)
    }

    pub fn write_comment_segment(&mut self, comment: &[u8]) -> Result<(), JpeglsError> {
        self.write_segment_header(JpegMarkerCode::Comment, comment.len())?;
        self.write_bytes(comment)
    }

    pub fn write_application_data_segment(
        &mut self,
        application_data_id: u8,
        application_data: &[u8],
    ) -> Result<(), JpeglsError> {
        self.write_segment_header(
            JpegMarkerCode::application_data(application_data_id),
            application_data.len(),
        )?;
        self.write_bytes(application_data)
    }

    /// HP color-transformation segment: APP8 with the "mrfx" signature.
    pub fn write_color_transform_segment(
        &mut self,
        transformation: ColorTransformation,
    ) -> Result<(), JpeglsError> {
        self.write_segment_header(JpegMarkerCode::ApplicationData8, 5)?;
        self.write_bytes(b"mrfx")?;
        self.write_byte(transformation as u8)
    }

    pub fn write_start_of_frame_segment(&mut self, frame_info: &FrameInfo) -> Result<(), JpeglsError> {
        debug_assert!(frame_info.bits_per_sample > 0 && frame_info.bits_per_sample <= 16);
        debug_assert!(frame_info.height <= u16::MAX as u32);
        debug_assert!(frame_info.width <= u16::MAX as u32);
        debug_assert!(frame_info.component_count > 0 && frame_info.component_count <= u8::MAX as i32);

        let component_count = frame_info.component_count as usize;
        self.write_segment_header(JpegMarkerCode::StartOfFrameJpegls, 6 + component_count * 3)?;
        self.write_byte(frame_info.bits_per_sample as u8)?; // P
        self.write_u16(frame_info.height as u16)?; // Y
        self.write_u16(frame_info.width as u16)?; // X
        self.write_byte(frame_info.component_count as u8)?; // Nf

        for component_id in 1..=component_count {
            self.write_byte(component_id as u8)?; // Ci
            self.write_byte(0x11)?; // Hi = 1, Vi = 1 (no subsampling in JPEG-LS)
            self.write_byte(0)?; // Tqi, reserved
        }
        Ok(())
    }

    /// LSE segment, type 1: preset coding parameters.
    pub fn write_jpegls_preset_parameters_segment(
        &mut self,
        preset_coding_parameters: &JpeglsPcParameters,
    ) -> Result<(), JpeglsError> {
        self.write_segment_header(JpegMarkerCode::JpeglsPresetParameters, 1 + 5 * 2)?;
        self.write_byte(1)?; // Parameter ID 1: preset coding parameters
        self.write_u16(preset_coding_parameters.maximum_sample_value as u16)?;
        self.write_u16(preset_coding_parameters.threshold1 as u16)?;
        self.write_u16(preset_coding_parameters.threshold2 as u16)?;
        self.write_u16(preset_coding_parameters.threshold3 as u16)?;
        self.write_u16(preset_coding_parameters.reset_value as u16)
    }

    /// LSE segments, type 2 (+ type 3 continuations when the table does not
    /// fit a single segment): a mapping table.
    pub fn write_mapping_table_segment(
        &mut self,
        table_id: u8,
        entry_size: u8,
        table_data: &[u8],
    ) -> Result<(), JpeglsError> {
        const OVERHEAD: usize = 3; // parameter ID + table ID + entry size
        let mut remaining = table_data;
        let mut parameter_id = 2u8; // type 2 first, type 3 continuations

        loop {
            let chunk_size = remaining.len().min(SEGMENT_MAX_DATA_SIZE - OVERHEAD);
            let (chunk, rest) = remaining.split_at(chunk_size);

            self.write_segment_header(JpegMarkerCode::JpeglsPresetParameters, OVERHEAD + chunk_size)?;
            self.write_byte(parameter_id)?;
            self.write_byte(table_id)?;
            self.write_byte(entry_size)?;
            self.write_bytes(chunk)?;

            if rest.is_empty() {
                return Ok(());
            }
            remaining = rest;
            parameter_id = 3;
        }
    }

    pub fn write_start_of_scan_segment(
        &mut self,
        component_ids: &[u8],
        mapping_table_ids: &[u8],
        near_lossless: i32,
        interleave_mode: InterleaveMode,
    ) -> Result<(), JpeglsError> {
        debug_assert!(!component_ids.is_empty() && component_ids.len() <= 4);
        debug_assert_eq!(component_ids.len(), mapping_table_ids.len());

        self.write_segment_header(JpegMarkerCode::StartOfScan, 1 + component_ids.len() * 2 + 3)?;
        self.write_byte(component_ids.len() as u8)?; // Ns

        for (component_id, table_id) in component_ids.iter().zip(mapping_table_ids) {
            self.write_byte(*component_id)?; // Csi
            self.write_byte(*table_id)?; // Tmi, mapping table selector (0 = none)
        }

        self.write_byte(near_lossless as u8)?; // NEAR
        self.write_byte(interleave_mode as u8)?; // ILV
        self.write_byte(0) // Al/Ah, point transform (not supported)
    }

    /// The destination bytes that entropy-coded scan data may be written to.
    pub fn remaining_slice(&mut self) -> &mut [u8] {
        let start = self.position.min(self.destination.len());
        &mut self.destination[start..]
    }

    /// Advances over scan bytes written directly into `remaining_slice`.
    pub fn advance(&mut self, count: usize) {
        self.position += count;
        debug_assert!(self.position <= self.destination.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_of_image_writes_marker() {
        let mut buffer = [0u8; 2];
        let mut writer = JpegStreamWriter::new(&mut buffer);
        writer.write_start_of_image().unwrap();
        assert_eq!(writer.bytes_written(), 2);
        assert_eq!(buffer, [0xFF, 0xD8]);
    }

    #[test]
    fn start_of_frame_layout() {
        let mut buffer = [0u8; 64];
        let mut writer = JpegStreamWriter::new(&mut buffer);
        let frame_info = FrameInfo {
            width: 259,
            height: 2,
            bits_per_sample: 8,
            component_count: 3,
        };
        writer.write_start_of_frame_segment(&frame_info).unwrap();
        let written = writer.bytes_written();
        assert_eq!(
            &buffer[..written],
            &[
                0xFF, 0xF7, 0x00, 0x11, 8, 0x00, 0x02, 0x01, 0x03, 3, 1, 0x11, 0, 2, 0x11, 0, 3,
                0x11, 0
            ]
        );
    }

    #[test]
    fn preset_parameters_segment_layout() {
        let mut buffer = [0u8; 32];
        let mut writer = JpegStreamWriter::new(&mut buffer);
        let preset = JpeglsPcParameters {
            maximum_sample_value: 255,
            threshold1: 3,
            threshold2: 7,
            threshold3: 21,
            reset_value: 32,
        };
        writer.write_jpegls_preset_parameters_segment(&preset).unwrap();
        let written = writer.bytes_written();
        assert_eq!(
            &buffer[..written],
            &[0xFF, 0xF8, 0x00, 0x0D, 1, 0, 255, 0, 3, 0, 7, 0, 21, 0, 32]
        );
    }

    #[test]
    fn too_small_destination_is_rejected() {
        let mut buffer = [0u8; 1];
        let mut writer = JpegStreamWriter::new(&mut buffer);
        assert_eq!(
            writer.write_start_of_image(),
            Err(JpeglsError::DestinationTooSmall)
        );
    }

    #[test]
    fn spiff_end_of_directory_contains_start_of_image() {
        let mut buffer = [0u8; 16];
        let mut writer = JpegStreamWriter::new(&mut buffer);
        writer.write_spiff_end_of_directory_entry().unwrap();
        let written = writer.bytes_written();
        assert_eq!(
            &buffer[..written],
            &[0xFF, 0xE8, 0x00, 0x08, 0, 0, 0, 1, 0xFF, 0xD8]
        );
    }
}
