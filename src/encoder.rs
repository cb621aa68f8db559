//! The public JPEG-LS encoder.
//!
//! `JpeglsEncoder` owns the configuration, the marker-stream writer and the
//! segment-order state machine, and drives one `ScanEncoder` per scan.

use crate::coding_parameters::{
    calculate_maximum_sample_value, compute_default, compute_maximum_near_lossless, is_default,
    is_valid, CodingParameters, JpeglsPcParameters,
};
use crate::constants::{
    AUTO_CALCULATE_STRIDE, ESTIMATED_SEGMENT_OVERHEAD, MAXIMUM_BITS_PER_SAMPLE,
    MAXIMUM_COMPONENT_COUNT, MAXIMUM_COMPONENT_COUNT_IN_SCAN, MAXIMUM_HEIGHT,
    MAXIMUM_MAPPING_TABLE_ID, MAXIMUM_NEAR_LOSSLESS, MAXIMUM_WIDTH, MINIMUM_BITS_PER_SAMPLE,
    MINIMUM_MAPPING_ENTRY_SIZE, MINIMUM_MAPPING_TABLE_ID, MAXIMUM_MAPPING_ENTRY_SIZE,
    MAXIMUM_APPLICATION_DATA_ID, SEGMENT_MAX_DATA_SIZE, SPIFF_END_OF_DIRECTORY_ENTRY_TYPE,
    SPIFF_ENTRY_MAX_DATA_SIZE, SPIFF_HEADER_SIZE_IN_BYTES,
};
use crate::error::JpeglsError;
use crate::jpeg_stream_writer::JpegStreamWriter;
use crate::process_line::LineSource;
use crate::scan_encoder::ScanEncoder;
use crate::traits::Sample;
use crate::{
    ColorTransformation, FrameInfo, InterleaveMode, SpiffColorSpace, SpiffCompressionType,
    SpiffHeader, SpiffProfileId, SpiffResolutionUnits,
};

/// Segment-order state machine of the encoder
/// (`destination_set → spiff_header* → tables_and_miscellaneous → completed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    DestinationSet,
    SpiffHeader,
    TablesAndMiscellaneous,
    Completed,
}

pub struct JpeglsEncoder<'a> {
    writer: JpegStreamWriter<'a>,
    state: State,
    frame_info: Option<FrameInfo>,
    near_lossless: i32,
    interleave_mode: InterleaveMode,
    preset_coding_parameters: JpeglsPcParameters,
    color_transformation: ColorTransformation,
    mapping_table_ids: Vec<u8>,
}

impl<'a> JpeglsEncoder<'a> {
    /// Creates an encoder that writes into `destination`. The buffer is
    /// borrowed for the encoder's lifetime; nothing is written until a
    /// configuration or encode call asks for it.
    pub fn new(destination: &'a mut [u8]) -> Self {
        Self {
            writer: JpegStreamWriter::new(destination),
            state: State::DestinationSet,
            frame_info: None,
            near_lossless: 0,
            interleave_mode: InterleaveMode::None,
            preset_coding_parameters: JpeglsPcParameters::default(),
            color_transformation: ColorTransformation::None,
            mapping_table_ids: Vec::new(),
        }
    }

    pub fn set_frame_info(&mut self, frame_info: FrameInfo) -> Result<(), JpeglsError> {
        if frame_info.width == 0 || frame_info.width > MAXIMUM_WIDTH {
            return Err(JpeglsError::InvalidArgumentWidth);
        }
        if frame_info.height == 0 || frame_info.height > MAXIMUM_HEIGHT {
            return Err(JpeglsError::InvalidArgumentHeight);
        }
        if frame_info.bits_per_sample < MINIMUM_BITS_PER_SAMPLE
            || frame_info.bits_per_sample > MAXIMUM_BITS_PER_SAMPLE
        {
            return Err(JpeglsError::InvalidArgumentBitsPerSample);
        }
        if frame_info.component_count < 1 || frame_info.component_count > MAXIMUM_COMPONENT_COUNT {
            return Err(JpeglsError::InvalidArgumentComponentCount);
        }

        self.frame_info = Some(frame_info);
        Ok(())
    }

    /// Configures the NEAR parameter. 0 (the default) means lossless.
    pub fn set_near_lossless(&mut self, near_lossless: i32) -> Result<(), JpeglsError> {
        if near_lossless < 0 || near_lossless > MAXIMUM_NEAR_LOSSLESS {
            return Err(JpeglsError::InvalidArgumentNearLossless);
        }

        self.near_lossless = near_lossless;
        Ok(())
    }

    /// Configures the interleave mode. The source buffer passed to `encode`
    /// must match this layout.
    pub fn set_interleave_mode(&mut self, interleave_mode: InterleaveMode) -> Result<(), JpeglsError> {
        self.interleave_mode = interleave_mode;
        Ok(())
    }

    /// Configures custom preset coding parameters. Zero fields keep their
    /// standard default. Full validation happens when `encode` starts, as it
    /// needs the effective MAXVAL and NEAR values.
    pub fn set_preset_coding_parameters(
        &mut self,
        preset_coding_parameters: JpeglsPcParameters,
    ) -> Result<(), JpeglsError> {
        self.preset_coding_parameters = preset_coding_parameters;
        Ok(())
    }

    /// Configures the HP color transformation. Only valid for 3-component
    /// images with 8 or 16 bits per sample.
    pub fn set_color_transformation(
        &mut self,
        color_transformation: ColorTransformation,
    ) -> Result<(), JpeglsError> {
        self.color_transformation = color_transformation;
        Ok(())
    }

    /// Configures the mapping table a component references in its scan
    /// header. Table ID 0 (the default) means no table.
    pub fn set_table_id(&mut self, component_index: i32, table_id: i32) -> Result<(), JpeglsError> {
        if component_index < 0 || component_index >= MAXIMUM_COMPONENT_COUNT {
            return Err(JpeglsError::InvalidArgumentComponentIndex);
        }
        if table_id < 0 || table_id > MAXIMUM_MAPPING_TABLE_ID {
            return Err(JpeglsError::InvalidArgumentMappingTableId);
        }

        let index = component_index as usize;
        if self.mapping_table_ids.len() <= index {
            self.mapping_table_ids.resize(index + 1, 0);
        }
        self.mapping_table_ids[index] = table_id as u8;
        Ok(())
    }

    /// Size in bytes the destination buffer is expected to need for the
    /// configured frame. Dynamic extras such as SPIFF entries and mapping
    /// tables are not included.
    pub fn estimated_destination_size(&self) -> Result<usize, JpeglsError> {
        let frame_info = self.frame_info.ok_or(JpeglsError::InvalidOperation)?;
        Ok(frame_info.component_count as usize
            * frame_info.width as usize
            * frame_info.height as usize
            * bit_to_byte_count(frame_info.bits_per_sample)
            + ESTIMATED_SEGMENT_OVERHEAD
            + SPIFF_HEADER_SIZE_IN_BYTES)
    }

    /// Writes a SPIFF header. Only allowed directly after the destination is
    /// bound, before any other segment.
    pub fn write_spiff_header(&mut self, spiff_header: &SpiffHeader) -> Result<(), JpeglsError> {
        if spiff_header.height == 0 {
            return Err(JpeglsError::InvalidArgumentHeight);
        }
        if spiff_header.width == 0 {
            return Err(JpeglsError::InvalidArgumentWidth);
        }
        if self.state != State::DestinationSet {
            return Err(JpeglsError::InvalidOperation);
        }

        self.writer.write_start_of_image()?;
        self.writer.write_spiff_header_segment(spiff_header)?;
        self.state = State::SpiffHeader;
        Ok(())
    }

    /// Writes a SPIFF header derived from the configured frame info.
    pub fn write_standard_spiff_header(
        &mut self,
        color_space: SpiffColorSpace,
        resolution_units: SpiffResolutionUnits,
        vertical_resolution: u32,
        horizontal_resolution: u32,
    ) -> Result<(), JpeglsError> {
        let frame_info = self.frame_info.ok_or(JpeglsError::InvalidOperation)?;
        self.write_spiff_header(&SpiffHeader {
            profile_id: SpiffProfileId::None,
            component_count: frame_info.component_count,
            height: frame_info.height,
            width: frame_info.width,
            color_space,
            bits_per_sample: frame_info.bits_per_sample,
            compression_type: SpiffCompressionType::JpegLs,
            resolution_units,
            vertical_resolution,
            horizontal_resolution,
        })
    }

    /// Writes a SPIFF directory entry. Requires a SPIFF header.
    pub fn write_spiff_entry(&mut self, entry_tag: u32, entry_data: &[u8]) -> Result<(), JpeglsError> {
        if entry_tag == SPIFF_END_OF_DIRECTORY_ENTRY_TYPE {
            return Err(JpeglsError::InvalidArgumentSpiffEntryTag);
        }
        if entry_data.len() > SPIFF_ENTRY_MAX_DATA_SIZE {
            return Err(JpeglsError::InvalidArgumentSpiffEntrySize);
        }
        if self.state != State::SpiffHeader {
            return Err(JpeglsError::InvalidOperation);
        }

        self.writer.write_spiff_directory_entry(entry_tag, entry_data)
    }

    /// Writes the SPIFF end-of-directory entry. `encode` does this
    /// automatically; the explicit call exists for wrapping other streams.
    pub fn write_spiff_end_of_directory_entry(&mut self) -> Result<(), JpeglsError> {
        if self.state != State::SpiffHeader {
            return Err(JpeglsError::InvalidOperation);
        }

        self.writer.write_spiff_end_of_directory_entry()?;
        self.state = State::TablesAndMiscellaneous;
        Ok(())
    }

    /// Writes a comment (COM) segment. Must precede the image data.
    pub fn write_comment(&mut self, comment: &[u8]) -> Result<(), JpeglsError> {
        if comment.len() > SEGMENT_MAX_DATA_SIZE {
            return Err(JpeglsError::InvalidArgumentSize);
        }
        if self.state == State::Completed {
            return Err(JpeglsError::InvalidOperation);
        }

        self.transition_to_tables_and_miscellaneous()?;
        self.writer.write_comment_segment(comment)
    }

    /// Writes an application data (APPn) segment. Must precede the image
    /// data.
    pub fn write_application_data(
        &mut self,
        application_data_id: i32,
        application_data: &[u8],
    ) -> Result<(), JpeglsError> {
        if application_data_id < 0 || application_data_id > MAXIMUM_APPLICATION_DATA_ID {
            return Err(JpeglsError::InvalidArgumentApplicationDataId);
        }
        if application_data.len() > SEGMENT_MAX_DATA_SIZE {
            return Err(JpeglsError::InvalidArgumentSize);
        }
        if self.state == State::Completed {
            return Err(JpeglsError::InvalidOperation);
        }

        self.transition_to_tables_and_miscellaneous()?;
        self.writer
            .write_application_data_segment(application_data_id as u8, application_data)
    }

    /// Writes a mapping table (LSE type 2, with type 3 continuations for
    /// oversized tables). Must precede the image data.
    pub fn write_table(
        &mut self,
        table_id: i32,
        entry_size: i32,
        table_data: &[u8],
    ) -> Result<(), JpeglsError> {
        if table_id < MINIMUM_MAPPING_TABLE_ID || table_id > MAXIMUM_MAPPING_TABLE_ID {
            return Err(JpeglsError::InvalidArgumentMappingTableId);
        }
        if entry_size < MINIMUM_MAPPING_ENTRY_SIZE || entry_size > MAXIMUM_MAPPING_ENTRY_SIZE {
            return Err(JpeglsError::InvalidArgumentMappingEntrySize);
        }
        if table_data.len() < entry_size as usize {
            return Err(JpeglsError::InvalidArgumentSize);
        }
        if self.state == State::Completed {
            return Err(JpeglsError::InvalidOperation);
        }

        self.transition_to_tables_and_miscellaneous()?;
        self.writer
            .write_mapping_table_segment(table_id as u8, entry_size as u8, table_data)
    }

    /// Creates a JPEG-LS stream in the abbreviated format that carries only
    /// the mapping tables written so far.
    pub fn create_tables_only(&mut self) -> Result<usize, JpeglsError> {
        if self.state != State::TablesAndMiscellaneous {
            return Err(JpeglsError::InvalidOperation);
        }

        self.writer.write_end_of_image()?;
        self.state = State::Completed;
        Ok(self.writer.bytes_written())
    }

    /// Encodes `source` into the destination buffer and returns the number
    /// of bytes written. `stride` is the distance between rows in bytes;
    /// 0 selects the natural (packed) stride.
    pub fn encode(&mut self, source: &[u8], stride: usize) -> Result<usize, JpeglsError> {
        let frame_info = self.frame_info.ok_or(JpeglsError::InvalidOperation)?;
        if self.state == State::Completed {
            return Err(JpeglsError::InvalidOperation);
        }

        let maximum_sample_value = calculate_maximum_sample_value(frame_info.bits_per_sample);
        if self.near_lossless > compute_maximum_near_lossless(maximum_sample_value) {
            return Err(JpeglsError::InvalidArgumentNearLossless);
        }

        if self.interleave_mode != InterleaveMode::None
            && (frame_info.component_count < 2
                || frame_info.component_count > MAXIMUM_COMPONENT_COUNT_IN_SCAN)
        {
            return Err(JpeglsError::InvalidArgumentInterleaveMode);
        }

        if self.color_transformation != ColorTransformation::None {
            if frame_info.component_count != 3 {
                return Err(JpeglsError::InvalidArgumentColorTransformation);
            }
            if frame_info.bits_per_sample != 8 && frame_info.bits_per_sample != 16 {
                return Err(JpeglsError::BitDepthForTransformNotSupported);
            }
        }

        let validated_pc_parameters = is_valid(
            &self.preset_coding_parameters,
            maximum_sample_value,
            self.near_lossless,
        )?;

        let bytes_per_sample = bit_to_byte_count(frame_info.bits_per_sample);
        let components_per_row = if self.interleave_mode == InterleaveMode::None {
            1
        } else {
            frame_info.component_count as usize
        };
        let minimum_stride = frame_info.width as usize * bytes_per_sample * components_per_row;
        let stride = if stride == AUTO_CALCULATE_STRIDE {
            minimum_stride
        } else {
            stride
        };
        if stride < minimum_stride || stride % bytes_per_sample != 0 {
            return Err(JpeglsError::InvalidArgumentStride);
        }

        let plane_count = if self.interleave_mode == InterleaveMode::None {
            frame_info.component_count as usize
        } else {
            1
        };
        if source.len() < stride * frame_info.height as usize * plane_count {
            return Err(JpeglsError::InvalidArgumentSize);
        }

        self.transition_to_tables_and_miscellaneous()?;
        self.writer.write_start_of_frame_segment(&frame_info)?;

        if self.color_transformation != ColorTransformation::None {
            self.writer
                .write_color_transform_segment(self.color_transformation)?;
        }

        let defaults = compute_default(maximum_sample_value, self.near_lossless);
        if !is_default(&self.preset_coding_parameters, &defaults) {
            self.writer
                .write_jpegls_preset_parameters_segment(&self.preset_coding_parameters)?;
        } else if frame_info.bits_per_sample > 12 {
            // Some widely deployed decoders derive invalid default preset
            // parameters above 12 bits; writing the used values explicitly
            // keeps those decoders working.
            self.writer
                .write_jpegls_preset_parameters_segment(&validated_pc_parameters)?;
        }

        if frame_info.bits_per_sample <= 8 {
            self.encode_scans::<u8>(source, stride, frame_info, validated_pc_parameters)?;
        } else {
            // Reinterpret the byte buffer as native-endian u16 samples.
            let (head, body, tail) = unsafe { source.align_to::<u16>() };
            if !head.is_empty() || !tail.is_empty() {
                return Err(JpeglsError::InvalidArgumentSize);
            }
            self.encode_scans::<u16>(body, stride / 2, frame_info, validated_pc_parameters)?;
        }

        self.writer.write_end_of_image()?;
        self.state = State::Completed;
        Ok(self.writer.bytes_written())
    }

    /// The number of bytes written to the destination so far.
    pub fn bytes_written(&self) -> usize {
        self.writer.bytes_written()
    }

    /// Resets the write position to the start of the destination buffer,
    /// keeping the configuration. A second `encode` into the same buffer is
    /// allowed afterwards.
    pub fn rewind(&mut self) {
        self.writer.rewind();
        self.state = State::DestinationSet;
    }

    fn transition_to_tables_and_miscellaneous(&mut self) -> Result<(), JpeglsError> {
        match self.state {
            State::TablesAndMiscellaneous => Ok(()),
            State::SpiffHeader => {
                self.writer.write_spiff_end_of_directory_entry()?;
                self.state = State::TablesAndMiscellaneous;
                Ok(())
            }
            State::DestinationSet => {
                self.writer.write_start_of_image()?;
                self.state = State::TablesAndMiscellaneous;
                Ok(())
            }
            State::Completed => Err(JpeglsError::InvalidOperation),
        }
    }

    fn encode_scans<T: Sample>(
        &mut self,
        source: &[T],
        stride: usize,
        frame_info: FrameInfo,
        pc_parameters: JpeglsPcParameters,
    ) -> Result<(), JpeglsError> {
        let coding_parameters = CodingParameters {
            near_lossless: self.near_lossless,
            interleave_mode: self.interleave_mode,
            transformation: self.color_transformation,
        };
        let component_count = frame_info.component_count as usize;
        let width = frame_info.width as usize;
        let height = frame_info.height as usize;

        if self.interleave_mode == InterleaveMode::None {
            for component in 0..component_count {
                self.writer.write_start_of_scan_segment(
                    &[component as u8 + 1],
                    &[self.mapping_table_id(component)],
                    self.near_lossless,
                    InterleaveMode::None,
                )?;

                let lines = LineSource::new(
                    source,
                    stride,
                    width,
                    height,
                    InterleaveMode::None,
                    self.color_transformation,
                    component_count,
                    component,
                );
                let mut scan_encoder = ScanEncoder::new(
                    frame_info,
                    1,
                    pc_parameters,
                    coding_parameters,
                    self.writer.remaining_slice(),
                );
                let bytes_written = scan_encoder.encode_scan(&lines)?;
                self.writer.advance(bytes_written);
            }
        } else {
            let component_ids: Vec<u8> = (1..=component_count as u8).collect();
            let table_ids: Vec<u8> = (0..component_count)
                .map(|component| self.mapping_table_id(component))
                .collect();
            self.writer.write_start_of_scan_segment(
                &component_ids,
                &table_ids,
                self.near_lossless,
                self.interleave_mode,
            )?;

            let lines = LineSource::new(
                source,
                stride,
                width,
                height,
                self.interleave_mode,
                self.color_transformation,
                component_count,
                0,
            );
            let mut scan_encoder = ScanEncoder::new(
                frame_info,
                component_count,
                pc_parameters,
                coding_parameters,
                self.writer.remaining_slice(),
            );
            let bytes_written = scan_encoder.encode_scan(&lines)?;
            self.writer.advance(bytes_written);
        }
        Ok(())
    }

    fn mapping_table_id(&self, component: usize) -> u8 {
        self.mapping_table_ids.get(component).copied().unwrap_or(0)
    }
}

const fn bit_to_byte_count(bits_per_sample: i32) -> usize {
    ((bits_per_sample + 7) / 8) as usize
}
