use crate::errors::ConfigError;
use serde::{
    Deserialize,
    Serialize,
};
use std::ops::RangeInclusive;

/// m/z matching tolerance.
///
/// Convention: the tolerance is a positive half-width. A tolerance of 1 Da
/// on a value of 10 means the range (9, 11).
///
/// Example:
/// ```
/// use isoquant::tolerance::MzTolerance;
///
/// let tol = MzTolerance::default(); // 25 ppm
/// let range = tol.mz_range(500.0);
/// assert!((range.start() - 499.9875).abs() < 1e-6);
/// assert!((range.end() - 500.0125).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MzTolerance {
    #[serde(rename = "da")]
    Absolute(f64),
    #[serde(rename = "ppm")]
    Ppm(f64),
}

impl Default for MzTolerance {
    fn default() -> Self {
        MzTolerance::Ppm(25.0)
    }
}

impl MzTolerance {
    /// Half-width of the tolerance window in m/z units around `mz`.
    pub fn absolute_at(&self, mz: f64) -> f64 {
        match self {
            MzTolerance::Absolute(da) => *da,
            MzTolerance::Ppm(ppm) => mz * ppm / 1e6,
        }
    }

    pub fn mz_range(&self, mz: f64) -> RangeInclusive<f64> {
        let half = self.absolute_at(mz);
        (mz - half)..=(mz + half)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = match self {
            MzTolerance::Absolute(x) | MzTolerance::Ppm(x) => *x,
        };
        if v.is_finite() && v > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidTolerance(v))
        }
    }
}

/// Finds the index range of elements in a slice sorted by `key_fn` whose keys
/// fall within `key_range` (both ends inclusive).
///
/// ```
/// use isoquant::tolerance::binary_search_range_by_key;
///
/// let mzs = [100.0, 100.5, 101.0, 101.5, 102.0];
/// let range = binary_search_range_by_key(&mzs, 100.4..=101.5, |x| *x);
/// assert_eq!(range, 1..4);
/// ```
pub fn binary_search_range_by_key<T, F>(
    slice: &[T],
    key_range: RangeInclusive<f64>,
    key_fn: F,
) -> std::ops::Range<usize>
where
    F: Fn(&T) -> f64,
{
    let start_idx = slice.partition_point(|x| key_fn(x) < *key_range.start());
    let end_idx =
        start_idx + slice[start_idx..].partition_point(|x| key_fn(x) <= *key_range.end());

    start_idx..end_idx
}
