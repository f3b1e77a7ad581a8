//! Collaborator interfaces consumed by the quantitation core.

use crate::tolerance::binary_search_range_by_key;
use std::ops::RangeInclusive;

/// Borrowed view of one centroided scan, sorted ascending by m/z.
#[derive(Debug, Clone, Copy)]
pub struct ScanPeaks<'a> {
    pub mz: &'a [f64],
    pub intensity: &'a [f64],
}

impl<'a> ScanPeaks<'a> {
    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Peaks whose m/z falls within `range` (inclusive).
    pub fn slice_mz(&self, range: RangeInclusive<f64>) -> ScanPeaks<'a> {
        let idx = binary_search_range_by_key(self.mz, range, |x| *x);
        ScanPeaks {
            mz: &self.mz[idx.clone()],
            intensity: &self.intensity[idx],
        }
    }

    /// Most intense peak within `range`, zero when there is none.
    pub fn max_intensity_in(&self, range: RangeInclusive<f64>) -> f64 {
        self.slice_mz(range)
            .intensity
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }
}

/// Read access to the MS1 scans of one run.
///
/// Implementations are loaded once and only read afterwards; to be used from
/// the batch runner they also need to be `Sync`.
pub trait SpectrumSource {
    fn scan_count(&self) -> usize;

    /// Index of the first scan whose number is `>= scan`.
    ///
    /// Returns `scan_count()` when every scan precedes `scan`.
    fn index_for_scan_num(&self, scan: u32) -> usize;

    fn scan_at(&self, index: usize) -> Option<ScanPeaks<'_>>;

    fn scan_num_at(&self, index: usize) -> Option<u32>;

    /// Identity of the run, used to give failures context.
    fn run_name(&self) -> &str {
        "unnamed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_and_max() {
        let mz = [100.0, 100.5, 101.0, 101.5];
        let intensity = [1.0, 5.0, 3.0, 2.0];
        let scan = ScanPeaks {
            mz: &mz,
            intensity: &intensity,
        };
        let sub = scan.slice_mz(100.4..=101.2);
        assert_eq!(sub.mz, &[100.5, 101.0]);
        assert_eq!(sub.intensity, &[5.0, 3.0]);
        assert_eq!(scan.max_intensity_in(100.9..=101.6), 3.0);
        assert_eq!(scan.max_intensity_in(200.0..=201.0), 0.0);
    }
}
