use crate::constants::DEFAULT_RESET_THRESHOLD;
use crate::error::JpeglsError;
use crate::{ColorTransformation, InterleaveMode};
use std::cmp::{max, min};

/// Parameters of a single scan, resolved by the top-level encoder before the
/// scan encoder runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodingParameters {
    pub near_lossless: i32,
    pub interleave_mode: InterleaveMode,
    pub transformation: ColorTransformation,
}

/// JPEG-LS preset coding parameters (LSE marker segment, type 1).
///
/// Zero fields request the default derived from the bit depth and the NEAR
/// parameter (ISO/IEC 14495-1, C.2.4.1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JpeglsPcParameters {
    pub maximum_sample_value: i32,
    pub threshold1: i32,
    pub threshold2: i32,
    pub threshold3: i32,
    pub reset_value: i32,
}

// Clamping function as defined by ISO/IEC 14495-1, Figure C.3.
const fn clamp(i: i32, j: i32, maximum_sample_value: i32) -> i32 {
    if i > maximum_sample_value || i < j {
        j
    } else {
        i
    }
}

pub fn compute_maximum_near_lossless(maximum_sample_value: i32) -> i32 {
    debug_assert!(maximum_sample_value >= 1);
    min(255, maximum_sample_value / 2)
}

pub const fn calculate_maximum_sample_value(bits_per_sample: i32) -> i32 {
    (1 << bits_per_sample) - 1
}

/// Number of bits needed to represent `n` (smallest k with 2^k >= n).
pub const fn log2_ceiling(n: i32) -> i32 {
    debug_assert!(n >= 1);
    let mut k = 0;
    while n > (1 << k) {
        k += 1;
    }
    k
}

/// LIMIT as defined by ISO/IEC 14495-1, A.2.1: the longest code emitted for
/// a single sample in regular mode.
pub fn compute_limit_parameter(bits_per_sample: i32) -> i32 {
    2 * (bits_per_sample + max(8, bits_per_sample))
}

/// RANGE as defined by ISO/IEC 14495-1, A.2.1.
pub fn compute_range_parameter(maximum_sample_value: i32, near_lossless: i32) -> i32 {
    (maximum_sample_value + 2 * near_lossless) / (2 * near_lossless + 1) + 1
}

// Default coding threshold values as defined by ISO/IEC 14495-1, C.2.4.1.1.1
pub fn compute_default(maximum_sample_value: i32, near_lossless: i32) -> JpeglsPcParameters {
    debug_assert!(maximum_sample_value <= u16::MAX as i32);
    debug_assert!(
        near_lossless >= 0 && near_lossless <= compute_maximum_near_lossless(maximum_sample_value)
    );

    // Default threshold values for JPEG-LS statistical modeling as defined in
    // ISO/IEC 14495-1, table C.3 for the case MAXVAL = 255 and NEAR = 0.
    const DEFAULT_THRESHOLD1: i32 = 3; // BASIC_T1
    const DEFAULT_THRESHOLD2: i32 = 7; // BASIC_T2
    const DEFAULT_THRESHOLD3: i32 = 21; // BASIC_T3

    if maximum_sample_value >= 128 {
        let factor = (min(maximum_sample_value, 4095) + 128) / 256;
        let threshold1 = clamp(
            factor * (DEFAULT_THRESHOLD1 - 2) + 2 + 3 * near_lossless,
            near_lossless + 1,
            maximum_sample_value,
        );
        let threshold2 = clamp(
            factor * (DEFAULT_THRESHOLD2 - 3) + 3 + 5 * near_lossless,
            threshold1,
            maximum_sample_value,
        );

        JpeglsPcParameters {
            maximum_sample_value,
            threshold1,
            threshold2,
            threshold3: clamp(
                factor * (DEFAULT_THRESHOLD3 - 4) + 4 + 7 * near_lossless,
                threshold2,
                maximum_sample_value,
            ),
            reset_value: DEFAULT_RESET_THRESHOLD,
        }
    } else {
        let factor = 256 / (maximum_sample_value + 1);
        let threshold1 = clamp(
            max(2, DEFAULT_THRESHOLD1 / factor + 3 * near_lossless),
            near_lossless + 1,
            maximum_sample_value,
        );
        let threshold2 = clamp(
            max(3, DEFAULT_THRESHOLD2 / factor + 5 * near_lossless),
            threshold1,
            maximum_sample_value,
        );

        JpeglsPcParameters {
            maximum_sample_value,
            threshold1,
            threshold2,
            threshold3: clamp(
                max(4, DEFAULT_THRESHOLD3 / factor + 7 * near_lossless),
                threshold2,
                maximum_sample_value,
            ),
            reset_value: DEFAULT_RESET_THRESHOLD,
        }
    }
}

pub fn is_default(
    preset_coding_parameters: &JpeglsPcParameters,
    defaults: &JpeglsPcParameters,
) -> bool {
    if preset_coding_parameters.maximum_sample_value == 0
        && preset_coding_parameters.threshold1 == 0
        && preset_coding_parameters.threshold2 == 0
        && preset_coding_parameters.threshold3 == 0
        && preset_coding_parameters.reset_value == 0
    {
        return true;
    }

    preset_coding_parameters.maximum_sample_value == defaults.maximum_sample_value
        && preset_coding_parameters.threshold1 == defaults.threshold1
        && preset_coding_parameters.threshold2 == defaults.threshold2
        && preset_coding_parameters.threshold3 == defaults.threshold3
        && preset_coding_parameters.reset_value == defaults.reset_value
}

/// Validates preset coding parameters against ISO/IEC 14495-1, C.2.4.1.1,
/// table C.1 and resolves zero fields to their defaults.
pub fn is_valid(
    pc_parameters: &JpeglsPcParameters,
    maximum_component_value: i32,
    near_lossless: i32,
) -> Result<JpeglsPcParameters, JpeglsError> {
    debug_assert!(maximum_component_value >= 3 && maximum_component_value <= u16::MAX as i32);

    if pc_parameters.maximum_sample_value != 0
        && (pc_parameters.maximum_sample_value < 1
            || pc_parameters.maximum_sample_value > maximum_component_value)
    {
        return Err(JpeglsError::InvalidArgumentJpeglsPcParameters);
    }

    let maximum_sample_value = if pc_parameters.maximum_sample_value != 0 {
        pc_parameters.maximum_sample_value
    } else {
        maximum_component_value
    };

    if pc_parameters.threshold1 != 0
        && (pc_parameters.threshold1 < near_lossless + 1
            || pc_parameters.threshold1 > maximum_sample_value)
    {
        return Err(JpeglsError::InvalidArgumentJpeglsPcParameters);
    }

    let defaults = compute_default(maximum_sample_value, near_lossless);

    let threshold1 = if pc_parameters.threshold1 != 0 {
        pc_parameters.threshold1
    } else {
        defaults.threshold1
    };

    if pc_parameters.threshold2 != 0
        && (pc_parameters.threshold2 < threshold1 || pc_parameters.threshold2 > maximum_sample_value)
    {
        return Err(JpeglsError::InvalidArgumentJpeglsPcParameters);
    }

    let threshold2 = if pc_parameters.threshold2 != 0 {
        pc_parameters.threshold2
    } else {
        defaults.threshold2
    };

    if pc_parameters.threshold3 != 0
        && (pc_parameters.threshold3 < threshold2 || pc_parameters.threshold3 > maximum_sample_value)
    {
        return Err(JpeglsError::InvalidArgumentJpeglsPcParameters);
    }

    if pc_parameters.reset_value != 0
        && (pc_parameters.reset_value < 3
            || pc_parameters.reset_value > max(255, maximum_sample_value))
    {
        return Err(JpeglsError::InvalidArgumentJpeglsPcParameters);
    }

    Ok(JpeglsPcParameters {
        maximum_sample_value,
        threshold1,
        threshold2,
        threshold3: if pc_parameters.threshold3 != 0 {
            pc_parameters.threshold3
        } else {
            defaults.threshold3
        },
        reset_value: if pc_parameters.reset_value != 0 {
            pc_parameters.reset_value
        } else {
            defaults.reset_value
        },
    })
}
