use crate::constants::MAX_K_VALUE;
use crate::error::JpeglsError;
use crate::traits::bit_wise_sign;

/// Statistics of a single regular-mode context: the accumulated absolute
/// error `a`, the bias accumulator `b`, the prediction correction `c` and the
/// occurrence counter `n` (ISO/IEC 14495-1, A.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularModeContext {
    a: i32,
    b: i32,
    c: i32,
    n: i32,
}

impl RegularModeContext {
    pub fn new(range: i32) -> Self {
        Self {
            a: initialization_value_for_a(range),
            b: 0,
            c: 0,
            n: 1,
        }
    }

    pub fn c(&self) -> i32 {
        self.c
    }

    /// Maps the error value before Golomb coding when k == 0 and the bias is
    /// leaning negative (ISO/IEC 14495-1, code segment A.11 second branch).
    pub fn error_correction(&self, k: i32) -> i32 {
        if k != 0 {
            return 0;
        }
        bit_wise_sign(2 * self.b + self.n - 1)
    }

    /// Code segments A.12 and A.13: accumulate the prediction error, halve
    /// the statistics when `n` reaches the reset threshold and update the
    /// bias correction `c` while keeping `b` centered around `-n < b <= 0`.
    pub fn update_variables_and_bias(
        &mut self,
        error_value: i32,
        near_lossless: i32,
        reset_threshold: i32,
    ) -> Result<(), JpeglsError> {
        debug_assert!(self.n != 0);

        self.a += error_value.abs();
        self.b += error_value * (2 * near_lossless + 1);

        const OVERFLOW_LIMIT: i32 = 65536 * 256;
        if self.a >= OVERFLOW_LIMIT || self.b.abs() >= OVERFLOW_LIMIT {
            return Err(JpeglsError::InternalError);
        }

        if self.n == reset_threshold {
            self.a >>= 1;
            self.b >>= 1;
            self.n >>= 1;
        }
        self.n += 1;

        const MAX_C: i32 = 127;
        const MIN_C: i32 = -128;

        if self.b + self.n <= 0 {
            self.b += self.n;
            if self.b <= -self.n {
                self.b = -self.n + 1;
            }
            if self.c > MIN_C {
                self.c -= 1;
            }
        } else if self.b > 0 {
            self.b -= self.n;
            if self.b > 0 {
                self.b = 0;
            }
            if self.c < MAX_C {
                self.c += 1;
            }
        }
        Ok(())
    }

    /// Code segment A.10: the Golomb parameter is the smallest k with
    /// `n << k >= a`.
    pub fn compute_golomb_coding_parameter(&self) -> Result<i32, JpeglsError> {
        let mut k = 0;
        while (self.n << k) < self.a && k < MAX_K_VALUE {
            k += 1;
        }
        if k == MAX_K_VALUE {
            return Err(JpeglsError::InternalError);
        }
        Ok(k)
    }
}

/// ISO/IEC 14495-1, code segment A.8.
pub fn initialization_value_for_a(range: i32) -> i32 {
    std::cmp::max(2, (range + 32) / 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialization_for_8_bit_lossless() {
        let context = RegularModeContext::new(256);
        assert_eq!(context.a, 4);
        assert_eq!(context.b, 0);
        assert_eq!(context.c, 0);
        assert_eq!(context.n, 1);
    }

    #[test]
    fn golomb_parameter_grows_with_a() {
        let mut context = RegularModeContext::new(256);
        assert_eq!(context.compute_golomb_coding_parameter().unwrap(), 2);
        context.a = 100;
        assert_eq!(context.compute_golomb_coding_parameter().unwrap(), 7);
    }

    #[test]
    fn update_keeps_bias_centered() {
        let mut context = RegularModeContext::new(256);
        for _ in 0..200 {
            context.update_variables_and_bias(-3, 0, 64).unwrap();
            assert!(context.n >= 1);
            assert!(context.a >= 1);
            assert!(context.b > -context.n && context.b <= 0);
            assert!((-128..=127).contains(&context.c));
        }
    }

    #[test]
    fn reset_halves_statistics() {
        let mut context = RegularModeContext::new(256);
        context.a = 40;
        context.n = 64;
        context.update_variables_and_bias(1, 0, 64).unwrap();
        assert_eq!(context.n, 33);
        assert!(context.a <= 21);
    }
}
