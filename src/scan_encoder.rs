//! The LOCO-I scan encoder (ISO/IEC 14495-1, Annex A).
//!
//! One `ScanEncoder` encodes exactly one scan: it owns the context tables,
//! the neighbor row buffers and the bit register for the scan's lifetime and
//! writes byte-stuffed entropy-coded data directly into the destination
//! buffer. The sample type (`u8` or `u16`) is monomorphized once per scan;
//! the per-sample hot loop contains no dispatch.

use crate::coding_parameters::{
    compute_limit_parameter, compute_range_parameter, log2_ceiling, CodingParameters,
    JpeglsPcParameters,
};
use crate::constants::J;
use crate::error::JpeglsError;
use crate::process_line::LineSource;
use crate::regular_mode_context::RegularModeContext;
use crate::run_mode_context::RunModeContext;
use crate::traits::{apply_sign, bit_wise_sign, sign, Sample};
use crate::{FrameInfo, InterleaveMode};

pub struct ScanEncoder<'a> {
    destination: &'a mut [u8],
    position: usize,
    bit_buffer: u32,
    free_bit_count: i32,
    is_ff_written: bool,

    // One set of context statistics per scan, shared by all components in the
    // scan (A.2.1). Only the run index is tracked per component in
    // line-interleaved scans.
    contexts: Vec<RegularModeContext>,
    run_mode_contexts: [RunModeContext; 2],
    run_index: usize,

    width: usize,
    height: usize,
    component_count: usize,
    interleave_mode: InterleaveMode,

    t1: i32,
    t2: i32,
    t3: i32,
    reset_threshold: i32,
    near_lossless: i32,
    maximum_sample_value: i32,
    range: i32,
    limit: i32,
    quantized_bits_per_sample: i32,
}

impl<'a> ScanEncoder<'a> {
    pub fn new(
        frame_info: FrameInfo,
        scan_component_count: usize,
        pc_parameters: JpeglsPcParameters,
        coding_parameters: CodingParameters,
        destination: &'a mut [u8],
    ) -> Self {
        let near_lossless = coding_parameters.near_lossless;
        let maximum_sample_value = pc_parameters.maximum_sample_value;
        let range = compute_range_parameter(maximum_sample_value, near_lossless);
        let bits_per_sample = std::cmp::max(2, log2_ceiling(maximum_sample_value + 1));

        Self {
            destination,
            position: 0,
            bit_buffer: 0,
            free_bit_count: 32,
            is_ff_written: false,
            contexts: vec![RegularModeContext::new(range); 365],
            run_mode_contexts: [RunModeContext::new(0, range), RunModeContext::new(1, range)],
            run_index: 0,
            width: frame_info.width as usize,
            height: frame_info.height as usize,
            component_count: scan_component_count,
            interleave_mode: coding_parameters.interleave_mode,
            t1: pc_parameters.threshold1,
            t2: pc_parameters.threshold2,
            t3: pc_parameters.threshold3,
            reset_threshold: pc_parameters.reset_value,
            near_lossless,
            maximum_sample_value,
            range,
            limit: compute_limit_parameter(bits_per_sample),
            quantized_bits_per_sample: log2_ceiling(range),
        }
    }

    /// Encodes the whole scan and returns the number of destination bytes
    /// used.
    pub fn encode_scan<T: Sample>(&mut self, lines: &LineSource<T>) -> Result<usize, JpeglsError> {
        if self.interleave_mode == InterleaveMode::Sample {
            self.encode_lines_sample_interleaved(lines)?;
        } else {
            self.encode_lines(lines)?;
        }
        self.end_scan()?;
        Ok(self.position)
    }

    // Single-component scans and line-interleaved scans: each component's row
    // is coded in full before the next component's row of the same image
    // line, with its own neighbor rows and run index.
    fn encode_lines<T: Sample>(&mut self, lines: &LineSource<T>) -> Result<(), JpeglsError> {
        let width = self.width;
        let component_count = self.component_count;
        let pixel_stride = width + 2;
        let half = component_count * pixel_stride;

        // For the first line Rb = Rc = Rd = 0 (A.2.1), hence the zeroed
        // buffer.
        let mut line_buffer: Vec<T> = vec![T::default(); 2 * half];
        let mut run_index_values = vec![0usize; component_count];

        for line in 0..self.height {
            let (first_half, second_half) = line_buffer.split_at_mut(half);
            let (previous, current) = if (line & 1) == 1 {
                (second_half, first_half)
            } else {
                (first_half, second_half)
            };

            lines.copy_line(line, current, pixel_stride);

            for component in 0..component_count {
                self.run_index = run_index_values[component];
                let previous_row =
                    &mut previous[component * pixel_stride..(component + 1) * pixel_stride];
                let current_row =
                    &mut current[component * pixel_stride..(component + 1) * pixel_stride];

                // Edge extension: Rd of the last column repeats Rb, Ra of the
                // first column is the sample above it.
                previous_row[width + 1] = previous_row[width];
                current_row[0] = previous_row[1];

                self.encode_sample_row(previous_row, current_row)?;
                run_index_values[component] = self.run_index;
            }
        }
        Ok(())
    }

    fn encode_sample_row<T: Sample>(
        &mut self,
        previous_row: &mut [T],
        current_row: &mut [T],
    ) -> Result<(), JpeglsError> {
        let width = self.width;
        let mut index = 1;
        let mut rb = previous_row[0].to_i32();
        let mut rd = previous_row[1].to_i32();

        while index <= width {
            let ra = current_row[index - 1].to_i32();
            let rc = rb;
            rb = rd;
            rd = previous_row[index + 1].to_i32();

            let qs = compute_context_id(
                self.quantize_gradient(rd - rb),
                self.quantize_gradient(rb - rc),
                self.quantize_gradient(rc - ra),
            );

            if qs != 0 {
                let x = current_row[index].to_i32();
                let reconstructed =
                    self.encode_regular(qs, x, compute_predicted_value(ra, rb, rc))?;
                current_row[index] = T::from_i32(reconstructed);
                index += 1;
            } else {
                index += self.encode_run_mode(index, previous_row, current_row)?;
                if index <= width {
                    rb = previous_row[index - 1].to_i32();
                    rd = previous_row[index].to_i32();
                }
            }
        }
        Ok(())
    }

    fn encode_run_mode<T: Sample>(
        &mut self,
        start_index: usize,
        previous_row: &[T],
        current_row: &mut [T],
    ) -> Result<usize, JpeglsError> {
        let count_remaining = self.width - start_index + 1;
        let ra = current_row[start_index - 1].to_i32();

        let mut run_length = 0;
        while self.is_near(current_row[start_index + run_length].to_i32(), ra) {
            current_row[start_index + run_length] = T::from_i32(ra);
            run_length += 1;
            if run_length == count_remaining {
                break;
            }
        }

        self.encode_run_pixels(run_length as i32, run_length == count_remaining)?;
        if run_length == count_remaining {
            return Ok(run_length);
        }

        let x = current_row[start_index + run_length].to_i32();
        let rb = previous_row[start_index + run_length].to_i32();
        let reconstructed = self.encode_run_interruption_pixel(x, ra, rb)?;
        current_row[start_index + run_length] = T::from_i32(reconstructed);
        self.decrement_run_index();
        Ok(run_length + 1)
    }

    // Sample-interleaved scans: runs extend over whole pixels and are taken
    // only when the gradients of every component quantize to zero.
    fn encode_lines_sample_interleaved<T: Sample>(
        &mut self,
        lines: &LineSource<T>,
    ) -> Result<(), JpeglsError> {
        let width = self.width;
        let component_count = self.component_count;
        let pixel_stride = width + 2;
        let half = component_count * pixel_stride;

        let mut line_buffer: Vec<T> = vec![T::default(); 2 * half];

        for line in 0..self.height {
            let (first_half, second_half) = line_buffer.split_at_mut(half);
            let (previous_line, current_line) = if (line & 1) == 1 {
                (second_half, first_half)
            } else {
                (first_half, second_half)
            };

            lines.copy_line(line, current_line, pixel_stride);

            for component in 0..component_count {
                previous_line[(width + 1) * component_count + component] =
                    previous_line[width * component_count + component];
                current_line[component] = previous_line[component_count + component];
            }

            self.encode_pixel_row(previous_line, current_line)?;
        }
        Ok(())
    }

    fn encode_pixel_row<T: Sample>(
        &mut self,
        previous_line: &mut [T],
        current_line: &mut [T],
    ) -> Result<(), JpeglsError> {
        let width = self.width;
        let component_count = self.component_count;
        let mut index = 1;

        while index <= width {
            let pixel = index * component_count;
            let mut context_ids = [0i32; 4];
            let mut all_zero = true;

            for component in 0..component_count {
                let ra = current_line[pixel - component_count + component].to_i32();
                let rc = previous_line[pixel - component_count + component].to_i32();
                let rb = previous_line[pixel + component].to_i32();
                let rd = previous_line[pixel + component_count + component].to_i32();

                let qs = compute_context_id(
                    self.quantize_gradient(rd - rb),
                    self.quantize_gradient(rb - rc),
                    self.quantize_gradient(rc - ra),
                );
                context_ids[component] = qs;
                if qs != 0 {
                    all_zero = false;
                }
            }

            if all_zero {
                index += self.encode_pixel_run_mode(index, previous_line, current_line)?;
            } else {
                for component in 0..component_count {
                    let ra = current_line[pixel - component_count + component].to_i32();
                    let rc = previous_line[pixel - component_count + component].to_i32();
                    let rb = previous_line[pixel + component].to_i32();
                    let x = current_line[pixel + component].to_i32();

                    let reconstructed = self.encode_regular(
                        context_ids[component],
                        x,
                        compute_predicted_value(ra, rb, rc),
                    )?;
                    current_line[pixel + component] = T::from_i32(reconstructed);
                }
                index += 1;
            }
        }
        Ok(())
    }

    fn encode_pixel_run_mode<T: Sample>(
        &mut self,
        start_index: usize,
        previous_line: &[T],
        current_line: &mut [T],
    ) -> Result<usize, JpeglsError> {
        let component_count = self.component_count;
        let count_remaining = self.width - start_index + 1;
        let ra_pixel = (start_index - 1) * component_count;

        let mut run_length = 0;
        'extend: while run_length < count_remaining {
            let pixel = (start_index + run_length) * component_count;
            for component in 0..component_count {
                if !self.is_near(
                    current_line[pixel + component].to_i32(),
                    current_line[ra_pixel + component].to_i32(),
                ) {
                    break 'extend;
                }
            }
            for component in 0..component_count {
                current_line[pixel + component] = current_line[ra_pixel + component];
            }
            run_length += 1;
        }

        self.encode_run_pixels(run_length as i32, run_length == count_remaining)?;
        if run_length == count_remaining {
            return Ok(run_length);
        }

        // Run interruption: each component of the interrupting pixel selects
        // its run context from |Ra - Rb| (A.7.2), like the single-component
        // path.
        let pixel = (start_index + run_length) * component_count;
        for component in 0..component_count {
            let ra = current_line[ra_pixel + component].to_i32();
            let rb = previous_line[pixel + component].to_i32();
            let x = current_line[pixel + component].to_i32();

            let reconstructed = self.encode_run_interruption_pixel(x, ra, rb)?;
            current_line[pixel + component] = T::from_i32(reconstructed);
        }
        self.decrement_run_index();
        Ok(run_length + 1)
    }

    fn encode_regular(&mut self, qs: i32, x: i32, predicted: i32) -> Result<i32, JpeglsError> {
        let context_sign = bit_wise_sign(qs);
        let context_index = apply_sign(qs, context_sign) as usize;

        let (k, prediction_correction, error_correction) = {
            let context = &self.contexts[context_index];
            let k = context.compute_golomb_coding_parameter()?;
            (
                k,
                context.c(),
                context.error_correction(k | self.near_lossless),
            )
        };

        let predicted_value =
            self.correct_prediction(predicted + apply_sign(prediction_correction, context_sign));
        let error_value = self.compute_error_value(apply_sign(x - predicted_value, context_sign));

        self.encode_mapped_value(k, map_error_value(error_correction ^ error_value), self.limit)?;
        self.contexts[context_index].update_variables_and_bias(
            error_value,
            self.near_lossless,
            self.reset_threshold,
        )?;

        Ok(self.compute_reconstructed_sample(predicted_value, apply_sign(error_value, context_sign)))
    }

    fn encode_run_interruption_pixel(
        &mut self,
        x: i32,
        ra: i32,
        rb: i32,
    ) -> Result<i32, JpeglsError> {
        if (ra - rb).abs() <= self.near_lossless {
            let error_value = self.compute_error_value(x - ra);
            self.encode_run_interruption_error(1, error_value)?;
            Ok(self.compute_reconstructed_sample(ra, error_value))
        } else {
            let rb_sign = sign(rb - ra);
            let error_value = self.compute_error_value((x - rb) * rb_sign);
            self.encode_run_interruption_error(0, error_value)?;
            Ok(self.compute_reconstructed_sample(rb, error_value * rb_sign))
        }
    }

    fn encode_run_interruption_error(
        &mut self,
        context_index: usize,
        error_value: i32,
    ) -> Result<(), JpeglsError> {
        let (k, e_mapped_error_value) = {
            let context = &self.run_mode_contexts[context_index];
            let k = context.compute_golomb_coding_parameter();
            let map = context.compute_map(error_value, k);
            // EMErrval, code segment A.22.
            let e_mapped =
                2 * error_value.abs() - context.run_interruption_type() - i32::from(map);
            (k, e_mapped)
        };

        let limit = self.limit - J[self.run_index] - 1;
        self.encode_mapped_value(k, e_mapped_error_value, limit)?;
        self.run_mode_contexts[context_index].update_variables(
            error_value,
            e_mapped_error_value,
            self.reset_threshold,
        );
        Ok(())
    }

    fn encode_run_pixels(
        &mut self,
        mut run_length: i32,
        end_of_line: bool,
    ) -> Result<(), JpeglsError> {
        while run_length >= (1 << J[self.run_index]) {
            self.append_to_bit_stream(1, 1)?;
            run_length -= 1 << J[self.run_index];
            self.increment_run_index();
        }

        if end_of_line {
            if run_length != 0 {
                self.append_to_bit_stream(1, 1)?;
            }
        } else {
            // A '0' bit followed by the remaining length in J[RUNindex] bits.
            self.append_to_bit_stream(run_length as u32, J[self.run_index] + 1)?;
        }
        Ok(())
    }

    fn increment_run_index(&mut self) {
        if self.run_index < 31 {
            self.run_index += 1;
        }
    }

    fn decrement_run_index(&mut self) {
        if self.run_index > 0 {
            self.run_index -= 1;
        }
    }

    // Quantization of the local gradients, code segment A.4.
    fn quantize_gradient(&self, di: i32) -> i32 {
        if di <= -self.t3 {
            return -4;
        }
        if di <= -self.t2 {
            return -3;
        }
        if di <= -self.t1 {
            return -2;
        }
        if di < -self.near_lossless {
            return -1;
        }
        if di <= self.near_lossless {
            return 0;
        }
        if di < self.t1 {
            return 1;
        }
        if di < self.t2 {
            return 2;
        }
        if di < self.t3 {
            return 3;
        }
        4
    }

    fn correct_prediction(&self, predicted: i32) -> i32 {
        predicted.clamp(0, self.maximum_sample_value)
    }

    /// Quantizes the prediction error for near-lossless coding and reduces it
    /// to the interval `[-RANGE/2, RANGE/2 - 1]` (A.9).
    fn compute_error_value(&self, error_value: i32) -> i32 {
        self.modulo_range(self.quantize(error_value))
    }

    fn quantize(&self, error_value: i32) -> i32 {
        if error_value > 0 {
            (error_value + self.near_lossless) / (2 * self.near_lossless + 1)
        } else {
            -((self.near_lossless - error_value) / (2 * self.near_lossless + 1))
        }
    }

    fn dequantize(&self, error_value: i32) -> i32 {
        error_value * (2 * self.near_lossless + 1)
    }

    fn modulo_range(&self, mut error_value: i32) -> i32 {
        debug_assert!(error_value.abs() <= self.range);
        if error_value < 0 {
            error_value += self.range;
        }
        if error_value >= (self.range + 1) / 2 {
            error_value -= self.range;
        }
        debug_assert!(-self.range / 2 <= error_value && error_value <= (self.range + 1) / 2 - 1);
        error_value
    }

    fn compute_reconstructed_sample(&self, predicted_value: i32, error_value: i32) -> i32 {
        self.fix_reconstructed_value(predicted_value + self.dequantize(error_value))
    }

    fn fix_reconstructed_value(&self, mut value: i32) -> i32 {
        if value < -self.near_lossless {
            value += self.range * (2 * self.near_lossless + 1);
        } else if value > self.maximum_sample_value + self.near_lossless {
            value -= self.range * (2 * self.near_lossless + 1);
        }
        self.correct_prediction(value)
    }

    fn is_near(&self, lhs: i32, rhs: i32) -> bool {
        (lhs - rhs).abs() <= self.near_lossless
    }

    // Golomb-Rice coding of a mapped error value, code segment A.5.3 with the
    // LIMIT escape.
    fn encode_mapped_value(
        &mut self,
        k: i32,
        mapped_error: i32,
        limit: i32,
    ) -> Result<(), JpeglsError> {
        let mut high_bits = mapped_error >> k;

        if high_bits < limit - self.quantized_bits_per_sample - 1 {
            if high_bits + 1 > 31 {
                self.append_to_bit_stream(0, high_bits / 2)?;
                high_bits -= high_bits / 2;
            }
            self.append_to_bit_stream(1, high_bits + 1)?;
            return self
                .append_to_bit_stream((mapped_error & ((1 << k) - 1)) as u32, k);
        }

        if limit - self.quantized_bits_per_sample > 31 {
            self.append_to_bit_stream(0, 31)?;
            self.append_to_bit_stream(1, limit - self.quantized_bits_per_sample - 31)?;
        } else {
            self.append_to_bit_stream(1, limit - self.quantized_bits_per_sample)?;
        }
        self.append_to_bit_stream(
            ((mapped_error - 1) & ((1 << self.quantized_bits_per_sample) - 1)) as u32,
            self.quantized_bits_per_sample,
        )
    }

    // Bit sink. Bits enter a 32-bit register MSB first; full bytes leave via
    // `flush_byte`, which inserts the zero stuff bit after an emitted 0xFF
    // (T.87, A.1).
    fn append_to_bit_stream(&mut self, bits: u32, bit_count: i32) -> Result<(), JpeglsError> {
        debug_assert!((0..32).contains(&bit_count));
        debug_assert!(bit_count == 31 || bits < (1u32 << bit_count.max(1)) || bit_count == 0);

        if bit_count == 0 {
            return Ok(());
        }

        self.free_bit_count -= bit_count;
        if self.free_bit_count >= 0 {
            self.bit_buffer |= bits << self.free_bit_count;
        } else {
            // Place as many bits as fit, flush, and retry the remainder.
            self.bit_buffer |= bits >> -self.free_bit_count;
            self.flush()?;
            if self.free_bit_count < 0 {
                self.bit_buffer |= bits >> -self.free_bit_count;
                self.flush()?;
            }
            debug_assert!(self.free_bit_count >= 0);
            self.bit_buffer |= bits << self.free_bit_count;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), JpeglsError> {
        for _ in 0..4 {
            if self.free_bit_count >= 32 {
                break;
            }
            self.flush_byte()?;
        }
        Ok(())
    }

    fn flush_byte(&mut self) -> Result<(), JpeglsError> {
        if self.position >= self.destination.len() {
            return Err(JpeglsError::DestinationTooSmall);
        }

        let byte_value = if self.is_ff_written {
            // The byte after an 0xFF carries only 7 payload bits; its most
            // significant bit is the zero stuff bit.
            let value = (self.bit_buffer >> 25) as u8;
            self.bit_buffer <<= 7;
            self.free_bit_count += 7;
            value
        } else {
            let value = (self.bit_buffer >> 24) as u8;
            self.bit_buffer <<= 8;
            self.free_bit_count += 8;
            value
        };

        self.destination[self.position] = byte_value;
        self.position += 1;
        self.is_ff_written = byte_value == 0xFF;
        Ok(())
    }

    /// Drains the bit register, padding the final partial byte with 1-bits.
    fn end_scan(&mut self) -> Result<(), JpeglsError> {
        loop {
            let pending = 32 - self.free_bit_count;
            if pending == 0 {
                return Ok(());
            }

            let byte_bits = if self.is_ff_written { 7 } else { 8 };
            if pending >= byte_bits {
                self.flush_byte()?;
            } else {
                let pad = byte_bits - pending;
                self.append_to_bit_stream((1u32 << pad) - 1, pad)?;
            }
        }
    }
}

// Context index from the quantized gradients, code segment A.5. The sign
// folding to [0, 364] happens in `encode_regular`.
fn compute_context_id(q1: i32, q2: i32, q3: i32) -> i32 {
    (q1 * 9 + q2) * 9 + q3
}

// MED predictor (A.6) using the bit-wise sign shortcut: selects min(Ra, Rb),
// max(Ra, Rb) or Ra + Rb - Rc depending on where Rc lies.
fn compute_predicted_value(ra: i32, rb: i32, rc: i32) -> i32 {
    let sign_bits = bit_wise_sign(rb - ra);
    if (sign_bits ^ (rc - ra)) < 0 {
        return rb;
    }
    if (sign_bits ^ (rb - rc)) < 0 {
        return ra;
    }
    ra + rb - rc
}

// Error mapping to non-negative values (A.5.2): non-negative errors map to
// even codes, negative errors to odd codes.
fn map_error_value(error_value: i32) -> i32 {
    (error_value >> 30) ^ (2 * error_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding_parameters::compute_default;
    use crate::ColorTransformation;

    fn test_encoder(destination: &mut [u8]) -> ScanEncoder<'_> {
        let frame_info = FrameInfo {
            width: 1,
            height: 1,
            bits_per_sample: 8,
            component_count: 1,
        };
        let coding_parameters = CodingParameters {
            near_lossless: 0,
            interleave_mode: InterleaveMode::None,
            transformation: ColorTransformation::None,
        };
        ScanEncoder::new(
            frame_info,
            1,
            compute_default(255, 0),
            coding_parameters,
            destination,
        )
    }

    #[test]
    fn predictor_follows_med() {
        assert_eq!(compute_predicted_value(10, 20, 5), 25); // Rc below both
        assert_eq!(compute_predicted_value(10, 20, 30), 10); // Rc above both
        assert_eq!(compute_predicted_value(10, 20, 15), 15); // Rc in between
        assert_eq!(compute_predicted_value(20, 10, 5), 25);
        assert_eq!(compute_predicted_value(20, 10, 30), 10);
    }

    #[test]
    fn map_error_value_interleaves_signs() {
        assert_eq!(map_error_value(0), 0);
        assert_eq!(map_error_value(-1), 1);
        assert_eq!(map_error_value(1), 2);
        assert_eq!(map_error_value(-2), 3);
        assert_eq!(map_error_value(2), 4);
    }

    #[test]
    fn gradient_quantization_regions() {
        let mut buffer = [0u8; 16];
        let encoder = test_encoder(&mut buffer);
        // Default 8-bit thresholds: T1 = 3, T2 = 7, T3 = 21.
        assert_eq!(encoder.quantize_gradient(-22), -4);
        assert_eq!(encoder.quantize_gradient(-21), -4);
        assert_eq!(encoder.quantize_gradient(-7), -3);
        assert_eq!(encoder.quantize_gradient(-3), -2);
        assert_eq!(encoder.quantize_gradient(-1), -1);
        assert_eq!(encoder.quantize_gradient(0), 0);
        assert_eq!(encoder.quantize_gradient(1), 1);
        assert_eq!(encoder.quantize_gradient(3), 2);
        assert_eq!(encoder.quantize_gradient(7), 3);
        assert_eq!(encoder.quantize_gradient(21), 4);
    }

    #[test]
    fn stuff_bit_follows_ff_byte() {
        let mut buffer = [0u8; 4];
        let mut encoder = test_encoder(&mut buffer);
        encoder.append_to_bit_stream(0xFF, 8).unwrap();
        encoder.append_to_bit_stream(0, 7).unwrap();
        encoder.end_scan().unwrap();
        let written = encoder.position;
        assert_eq!(written, 2);
        assert_eq!(buffer[..2], [0xFF, 0x00]);
    }

    #[test]
    fn end_scan_pads_with_one_bits() {
        let mut buffer = [0u8; 4];
        let mut encoder = test_encoder(&mut buffer);
        encoder.append_to_bit_stream(0, 3).unwrap();
        encoder.end_scan().unwrap();
        assert_eq!(encoder.position, 1);
        assert_eq!(buffer[0], 0b0001_1111);
    }

    #[test]
    fn single_sample_scan_bit_pattern() {
        // A 1x1 image with value 42 enters run mode immediately (all
        // gradients are zero), emits a zero-length run marker and codes the
        // interruption sample with k = 2: '0', 20 zeros, '1', then the two
        // low bits of EMErrval = 83.
        let mut buffer = [0u8; 8];
        let mut encoder = test_encoder(&mut buffer);
        let source = [42u8];
        let lines = LineSource::new(
            &source,
            1,
            1,
            1,
            InterleaveMode::None,
            ColorTransformation::None,
            1,
            0,
        );
        let written = encoder.encode_scan(&lines).unwrap();
        assert_eq!(written, 3);
        assert_eq!(buffer[..3], [0x00, 0x00, 0x07]);
    }

    #[test]
    fn flat_row_uses_single_run_code() {
        // 8 identical samples after a regular first line: the row above
        // matches, so every line after the first is one run to end-of-line.
        let mut buffer = [0u8; 64];
        let frame_info = FrameInfo {
            width: 8,
            height: 8,
            bits_per_sample: 8,
            component_count: 1,
        };
        let coding_parameters = CodingParameters {
            near_lossless: 0,
            interleave_mode: InterleaveMode::None,
            transformation: ColorTransformation::None,
        };
        let mut encoder = ScanEncoder::new(
            frame_info,
            1,
            compute_default(255, 0),
            coding_parameters,
            &mut buffer,
        );
        let source = [0u8; 64];
        let lines = LineSource::new(
            &source,
            8,
            8,
            8,
            InterleaveMode::None,
            ColorTransformation::None,
            1,
            0,
        );
        let written = encoder.encode_scan(&lines).unwrap();
        assert!(written <= 4, "flat image should stay in run mode: {written}");
    }

    #[test]
    fn destination_too_small_is_reported() {
        let mut buffer = [0u8; 2];
        let frame_info = FrameInfo {
            width: 64,
            height: 64,
            bits_per_sample: 8,
            component_count: 1,
        };
        let coding_parameters = CodingParameters {
            near_lossless: 0,
            interleave_mode: InterleaveMode::None,
            transformation: ColorTransformation::None,
        };
        let mut encoder = ScanEncoder::new(
            frame_info,
            1,
            compute_default(255, 0),
            coding_parameters,
            &mut buffer,
        );
        let source: Vec<u8> = (0..64u32 * 64).map(|i| (i * 7) as u8).collect();
        let lines = LineSource::new(
            &source,
            64,
            64,
            64,
            InterleaveMode::None,
            ColorTransformation::None,
            1,
            0,
        );
        assert_eq!(
            encoder.encode_scan(&lines),
            Err(JpeglsError::DestinationTooSmall)
        );
    }
}
