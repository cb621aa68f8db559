//! Materializes one row of scan samples from the user's source buffer.
//!
//! The scan encoder works on contiguous row buffers with guard samples; this
//! module bridges the gap to the caller's layout: an arbitrary row stride,
//! planar sources for non-interleaved scans, and the optional forward HP
//! color transformation.

use crate::color_transform::transform_pixel;
use crate::traits::Sample;
use crate::{ColorTransformation, InterleaveMode};

pub struct LineSource<'a, T: Sample> {
    source: &'a [T],
    /// Distance between the start of two source rows, in samples.
    stride: usize,
    /// Distance between the start of two planes, in samples (planar sources).
    plane_stride: usize,
    width: usize,
    interleave_mode: InterleaveMode,
    transformation: ColorTransformation,
    component_count: usize,
    /// Plane index encoded by this scan (`InterleaveMode::None` only).
    scan_component: usize,
}

impl<'a, T: Sample> LineSource<'a, T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: &'a [T],
        stride: usize,
        width: usize,
        height: usize,
        interleave_mode: InterleaveMode,
        transformation: ColorTransformation,
        component_count: usize,
        scan_component: usize,
    ) -> Self {
        Self {
            source,
            stride,
            plane_stride: stride * height,
            width,
            interleave_mode,
            transformation,
            component_count,
            scan_component,
        }
    }

    /// Copies source row `line` into the scan encoder's current row storage.
    ///
    /// For `None` scans `destination` is a single row of `pixel_stride`
    /// samples with the scan samples at `[1..=width]`. For `Line` scans it
    /// holds one such row per component, `pixel_stride` apart. For `Sample`
    /// scans it is pixel-major with one guard pixel in front: component `c`
    /// of pixel `i` lives at `(1 + i) * component_count + c`.
    pub fn copy_line(&self, line: usize, destination: &mut [T], pixel_stride: usize) {
        match self.interleave_mode {
            InterleaveMode::None => self.copy_planar_line(line, destination),
            InterleaveMode::Line => self.copy_line_interleaved(line, destination, pixel_stride),
            InterleaveMode::Sample => self.copy_sample_interleaved(line, destination),
        }
    }

    fn copy_planar_line(&self, line: usize, destination: &mut [T]) {
        let row = self.scan_component * self.plane_stride + line * self.stride;

        if self.transformation == ColorTransformation::None {
            destination[1..=self.width].copy_from_slice(&self.source[row..row + self.width]);
            return;
        }

        // Transformed planar scans gather the triplet across the three planes
        // and keep the plane this scan encodes.
        let red_row = line * self.stride;
        let green_row = self.plane_stride + red_row;
        let blue_row = 2 * self.plane_stride + red_row;
        for i in 0..self.width {
            let transformed = transform_pixel(
                self.transformation,
                self.source[red_row + i],
                self.source[green_row + i],
                self.source[blue_row + i],
            );
            destination[1 + i] = match self.scan_component {
                0 => transformed.0,
                1 => transformed.1,
                _ => transformed.2,
            };
        }
    }

    fn copy_line_interleaved(&self, line: usize, destination: &mut [T], pixel_stride: usize) {
        let row = line * self.stride;

        if self.transformation == ColorTransformation::None {
            for component in 0..self.component_count {
                let source_row = row + component * self.width;
                destination[component * pixel_stride + 1..component * pixel_stride + 1 + self.width]
                    .copy_from_slice(&self.source[source_row..source_row + self.width]);
            }
            return;
        }

        for i in 0..self.width {
            let (v1, v2, v3) = transform_pixel(
                self.transformation,
                self.source[row + i],
                self.source[row + self.width + i],
                self.source[row + 2 * self.width + i],
            );
            destination[1 + i] = v1;
            destination[pixel_stride + 1 + i] = v2;
            destination[2 * pixel_stride + 1 + i] = v3;
        }
    }

    fn copy_sample_interleaved(&self, line: usize, destination: &mut [T]) {
        let row = line * self.stride;
        let component_count = self.component_count;

        if self.transformation == ColorTransformation::None {
            destination[component_count..component_count + self.width * component_count]
                .copy_from_slice(&self.source[row..row + self.width * component_count]);
            return;
        }

        for i in 0..self.width {
            let pixel = row + i * component_count;
            let (v1, v2, v3) = transform_pixel(
                self.transformation,
                self.source[pixel],
                self.source[pixel + 1],
                self.source[pixel + 2],
            );
            let destination_pixel = (1 + i) * component_count;
            destination[destination_pixel] = v1;
            destination[destination_pixel + 1] = v2;
            destination[destination_pixel + 2] = v3;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_line_is_copied_with_guard_offset() {
        let source: Vec<u8> = (0..12).collect(); // 2 planes of 2x3
        let lines = LineSource::new(
            &source,
            3,
            3,
            2,
            InterleaveMode::None,
            ColorTransformation::None,
            2,
            1,
        );
        let mut row = [0u8; 5];
        lines.copy_line(1, &mut row, 5);
        assert_eq!(row, [0, 9, 10, 11, 0]);
    }

    #[test]
    fn line_interleaved_row_is_split_per_component() {
        // One row of a 2x1 RGB image, line-interleaved: RR GG BB.
        let source = [1u8, 2, 11, 12, 21, 22];
        let lines = LineSource::new(
            &source,
            6,
            2,
            1,
            InterleaveMode::Line,
            ColorTransformation::None,
            3,
            0,
        );
        let mut rows = [0u8; 12];
        lines.copy_line(0, &mut rows, 4);
        assert_eq!(rows, [0, 1, 2, 0, 0, 11, 12, 0, 0, 21, 22, 0]);
    }

    #[test]
    fn sample_interleaved_row_keeps_pixel_layout() {
        let source = [1u8, 11, 21, 2, 12, 22];
        let lines = LineSource::new(
            &source,
            6,
            2,
            1,
            InterleaveMode::Sample,
            ColorTransformation::None,
            3,
            0,
        );
        let mut row = [0u8; 12]; // (2 pixels + 2 guards) * 3
        lines.copy_line(0, &mut row, 4);
        assert_eq!(row, [0, 0, 0, 1, 11, 21, 2, 12, 22, 0, 0, 0]);
    }
}
