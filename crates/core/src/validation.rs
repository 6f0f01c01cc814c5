//! Query option validation.
//!
//! Interactive callers get a permissive endpoint: out-of-range options are clamped into range
//! rather than rejected.

use crate::constants::{MAX_SEARCH_LIMIT, MAX_TOP_N};

/// Clamp a requested `top_n` into `1..=MAX_TOP_N`, falling back to `default` when absent.
pub fn clamp_top_n(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n < 1 => 1,
        Some(n) => usize::try_from(n).map_or(MAX_TOP_N, |n| n.min(MAX_TOP_N)),
        None => default.clamp(1, MAX_TOP_N),
    }
}

/// Clamp a requested `min_confidence` into `0.0..=100.0`.
///
/// Absent or non-finite values fall back to `default`.
pub fn clamp_min_confidence(requested: Option<f64>, default: f64) -> f64 {
    match requested {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => default.clamp(0.0, 100.0),
    }
}

/// Clamp an autocomplete result limit into `1..=MAX_SEARCH_LIMIT`.
pub fn clamp_search_limit(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(1, MAX_SEARCH_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_n_defaults_and_clamps() {
        assert_eq!(clamp_top_n(None, 10), 10);
        assert_eq!(clamp_top_n(Some(3), 10), 3);
        assert_eq!(clamp_top_n(Some(0), 10), 1);
        assert_eq!(clamp_top_n(Some(-7), 10), 1);
        assert_eq!(clamp_top_n(Some(10_000), 10), MAX_TOP_N);
    }

    #[test]
    fn min_confidence_clamps_and_ignores_non_finite() {
        assert_eq!(clamp_min_confidence(None, 5.0), 5.0);
        assert_eq!(clamp_min_confidence(Some(-3.0), 5.0), 0.0);
        assert_eq!(clamp_min_confidence(Some(250.0), 5.0), 100.0);
        assert_eq!(clamp_min_confidence(Some(42.5), 5.0), 42.5);
        assert_eq!(clamp_min_confidence(Some(f64::NAN), 5.0), 5.0);
        assert_eq!(clamp_min_confidence(Some(f64::INFINITY), 5.0), 5.0);
    }

    #[test]
    fn search_limit_clamps() {
        assert_eq!(clamp_search_limit(None, 8), 8);
        assert_eq!(clamp_search_limit(Some(0), 8), 1);
        assert_eq!(clamp_search_limit(Some(500), 8), MAX_SEARCH_LIMIT);
    }
}
