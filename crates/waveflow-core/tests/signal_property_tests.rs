use proptest::prelude::*;
use waveflow_core::{average, soft_compress};

proptest! {
    /// soft_compress is monotonic non-decreasing in its first argument for
    /// any fixed power in (0, 1].
    #[test]
    fn soft_compress_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0, power in 0.01f32..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(soft_compress(lo, power) <= soft_compress(hi, power) + 1e-6);
    }

    /// soft_compress output stays in [0, 1] for any non-negative input.
    #[test]
    fn soft_compress_bounded(value in 0.0f32..=1000.0, power in 0.01f32..=4.0) {
        let out = soft_compress(value, power);
        prop_assert!((0.0..=1.0).contains(&out));
    }

    /// average never exceeds the slice maximum nor drops below the minimum,
    /// for any index pair (including degenerate and out-of-range ones).
    #[test]
    fn average_within_value_bounds(
        values in prop::collection::vec(0.0f32..=255.0, 0..64),
        start in 0usize..80,
        end in 0usize..80,
    ) {
        let avg = average(&values, start, end);
        if start >= end.min(values.len()) {
            prop_assert_eq!(avg, 0.0);
        } else {
            let slice = &values[start..end.min(values.len())];
            let min = slice.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = slice.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            prop_assert!(avg >= min - 1e-3 && avg <= max + 1e-3);
        }
    }
}
