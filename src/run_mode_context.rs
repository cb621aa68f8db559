use crate::regular_mode_context::initialization_value_for_a;

/// Statistics of one of the two run-interruption contexts
/// (ISO/IEC 14495-1, A.7.2). `run_interruption_type` is 1 for the context
/// used when `|Ra - Rb| <= NEAR` and 0 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunModeContext {
    run_interruption_type: i32,
    a: i32,
    n: i32,
    nn: i32,
}

impl RunModeContext {
    pub fn new(run_interruption_type: i32, range: i32) -> Self {
        Self {
            run_interruption_type,
            a: initialization_value_for_a(range),
            n: 1,
            nn: 0,
        }
    }

    pub fn run_interruption_type(&self) -> i32 {
        self.run_interruption_type
    }

    /// Code segment A.19.
    pub fn compute_golomb_coding_parameter(&self) -> i32 {
        let temp = self.a + (self.n >> 1) * self.run_interruption_type;
        let mut n_test = self.n;
        let mut k = 0;

        while n_test < temp {
            n_test <<= 1;
            k += 1;
            debug_assert!(k <= 32);
        }
        k
    }

    /// Code segment A.21: decides whether the error value maps to an odd or
    /// even code.
    pub fn compute_map(&self, error_value: i32, k: i32) -> bool {
        if k == 0 && error_value > 0 && 2 * self.nn < self.n {
            return true;
        }
        if error_value < 0 && 2 * self.nn >= self.n {
            return true;
        }
        if error_value < 0 && k != 0 {
            return true;
        }
        false
    }

    /// Code segment A.23.
    pub fn update_variables(
        &mut self,
        error_value: i32,
        e_mapped_error_value: i32,
        reset_threshold: i32,
    ) {
        if error_value < 0 {
            self.nn += 1;
        }

        self.a += (e_mapped_error_value + 1 - self.run_interruption_type) >> 1;

        if self.n == reset_threshold {
            self.a >>= 1;
            self.n >>= 1;
            self.nn >>= 1;
        }
        self.n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golomb_parameter_for_fresh_context() {
        // a = 4, n = 1: k is the smallest value with 1 << k >= 4.
        let context = RunModeContext::new(0, 256);
        assert_eq!(context.compute_golomb_coding_parameter(), 2);
    }

    #[test]
    fn map_follows_a21() {
        let context = RunModeContext::new(1, 256);
        // nn = 0, n = 1: positive errors map when k == 0.
        assert!(context.compute_map(1, 0));
        assert!(!context.compute_map(1, 2));
        assert!(context.compute_map(-1, 2));
        assert!(!context.compute_map(0, 0));
    }

    #[test]
    fn update_counts_negative_errors() {
        let mut context = RunModeContext::new(0, 256);
        context.update_variables(-2, 3, 64);
        assert_eq!(context.nn, 1);
        assert_eq!(context.n, 2);
        assert_eq!(context.a, 6);
    }
}
