//! Per-scan isotope matching around an identification and extent detection.

use super::QuantConfig;
use crate::errors::DataProcessingError;
use crate::models::{
    PeptideQuantRequest,
    TargetList,
};
use crate::peaks::{
    local_maxima,
    match_peaks,
};
use crate::traits::{
    ScanPeaks,
    SpectrumSource,
};
use tracing::trace;

/// Lower margin (m/z) below the light monoisotope of the per-scan slice.
const SLICE_MARGIN_BELOW: f64 = 1.0;
/// Upper margin (m/z) above the heavy monoisotope of the per-scan slice.
const SLICE_MARGIN_ABOVE: f64 = 3.0;

/// Matched intensities for every scan in the window.
#[derive(Debug, Clone)]
pub struct ScanWindow {
    /// Scan numbers, ascending.
    pub scan_nums: Vec<u32>,
    /// `raw[scan][target]`, zero where the target was not matched.
    pub raw: Vec<Vec<f64>>,
    /// `matched[scan][isotope]`: both the light and the heavy isotope matched.
    pub matched: Vec<Vec<bool>>,
    pub match_counts: Vec<usize>,
    pub num_light: usize,
    pub num_heavy: usize,
}

/// Scan index range (inclusive) over which the match is coherent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub left: usize,
    pub center: usize,
    pub right: usize,
}

impl ScanWindow {
    pub fn build<S: SpectrumSource + ?Sized>(
        source: &S,
        request: &PeptideQuantRequest,
        targets: &TargetList,
        config: &QuantConfig,
    ) -> Result<Self, DataProcessingError> {
        let count = source.scan_count();
        if count == 0 {
            return Err(DataProcessingError::EmptyRun);
        }

        let idx = source.index_for_scan_num(request.scan()).min(count);
        let start = idx.saturating_sub(config.scans_before);
        let end = (idx + config.scans_after).min(count);
        if start >= end {
            return Err(DataProcessingError::EmptyWindow {
                scan: request.scan(),
            });
        }

        let tolerance = config
            .tolerance
            .absolute_at(request.heavy_mass() / request.charge() as f64);
        let mz_range = (request.light_mz() - SLICE_MARGIN_BELOW)
            ..=(request.heavy_mz() + SLICE_MARGIN_ABOVE);

        let mut rows: Vec<(u32, Vec<f64>)> = Vec::with_capacity(end - start);
        for i in start..end {
            let scan_num = source
                .scan_num_at(i)
                .ok_or(DataProcessingError::ScanNotFound { scan: request.scan() })?;
            let row = match source.scan_at(i) {
                Some(peaks) => {
                    match_scan(peaks.slice_mz(mz_range.clone()), targets, tolerance)
                }
                None => vec![0.0; targets.len()],
            };
            rows.push((scan_num, row));
        }
        rows.sort_by_key(|(scan_num, _)| *scan_num);

        let num_light = targets.num_light();
        let num_heavy = targets.num_heavy();
        let (scan_nums, raw): (Vec<u32>, Vec<Vec<f64>>) = rows.into_iter().unzip();
        let matched: Vec<Vec<bool>> = raw
            .iter()
            .map(|row| {
                (0..num_light)
                    .map(|k| row[k] > 0.0 && row[targets.heavy_index(k)] > 0.0)
                    .collect()
            })
            .collect();
        let match_counts = matched
            .iter()
            .map(|row| row.iter().filter(|x| **x).count())
            .collect();

        Ok(Self {
            scan_nums,
            raw,
            matched,
            match_counts,
            num_light,
            num_heavy,
        })
    }

    pub fn len(&self) -> usize {
        self.scan_nums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scan_nums.is_empty()
    }

    /// Walks outwards from the center while neighboring scans have matches.
    pub fn extent(&self, center_index: usize) -> Extent {
        let center = center_index.min(self.len().saturating_sub(1));
        let mut left = center;
        while left > 0 && self.match_counts[left - 1] > 0 {
            left -= 1;
        }
        let mut right = center;
        while right + 1 < self.len() && self.match_counts[right + 1] > 0 {
            right += 1;
        }
        Extent {
            left,
            center,
            right,
        }
    }

    /// Sums matched intensities over the extent, per isotope.
    ///
    /// With `raw_center` the center row contributes every matched target,
    /// including heavy isotopes beyond the light series, instead of only the
    /// isotopes matched in both species.
    pub fn summed_areas(&self, extent: &Extent, raw_center: bool) -> (Vec<f64>, Vec<f64>) {
        let mut light = vec![0.0; self.num_light];
        let mut heavy = vec![0.0; self.num_heavy];
        for i in extent.left..=extent.right {
            let use_raw = raw_center && i == extent.center;
            let row = &self.raw[i];
            let matched = &self.matched[i];
            for (k, acc) in light.iter_mut().enumerate() {
                if use_raw || matched[k] {
                    *acc += row[k];
                }
            }
            for (h, acc) in heavy.iter_mut().enumerate() {
                let both = h < self.num_light && matched[h];
                if use_raw || both {
                    *acc += row[self.num_light + h];
                }
            }
        }
        (light, heavy)
    }
}

/// Intensities of the local maxima of one scan slice matched to each target.
fn match_scan(peaks: ScanPeaks<'_>, targets: &TargetList, tolerance: f64) -> Vec<f64> {
    let mut row = vec![0.0; targets.len()];
    if peaks.is_empty() {
        return row;
    }
    let maxima = local_maxima(peaks.intensity);
    let observed: Vec<f64> = maxima.iter().map(|&i| peaks.mz[i]).collect();
    let matches = match_peaks(&observed, targets.as_slice(), tolerance);
    trace!(
        "{} maxima, {} matched of {} targets",
        maxima.len(),
        matches.len(),
        targets.len()
    );
    for (obs, targ) in matches.iter() {
        row[targ] = peaks.intensity[maxima[obs]];
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_from_counts(counts: &[usize]) -> ScanWindow {
        let len = counts.len();
        ScanWindow {
            scan_nums: (0..len as u32).collect(),
            raw: vec![vec![1.0; 4]; len],
            matched: counts
                .iter()
                .map(|&c| (0..2).map(|k| k < c).collect())
                .collect(),
            match_counts: counts.to_vec(),
            num_light: 2,
            num_heavy: 2,
        }
    }

    #[test]
    fn test_extent_walks_to_gaps() {
        let w = window_from_counts(&[1, 0, 2, 2, 1, 0, 2]);
        let e = w.extent(3);
        assert_eq!((e.left, e.center, e.right), (2, 3, 4));
    }

    #[test]
    fn test_extent_center_clamped_to_window() {
        let w = window_from_counts(&[0, 1, 1]);
        let e = w.extent(9);
        assert_eq!((e.left, e.center, e.right), (1, 2, 2));
    }

    #[test]
    fn test_extent_with_empty_center() {
        let w = window_from_counts(&[2, 0, 2]);
        let e = w.extent(1);
        assert_eq!((e.left, e.right), (0, 2));
    }

    #[test]
    fn test_summed_areas_masks_unmatched() {
        let w = window_from_counts(&[2, 1, 0]);
        let e = Extent {
            left: 0,
            center: 1,
            right: 2,
        };
        let (light, heavy) = w.summed_areas(&e, false);
        assert_eq!(light, vec![2.0, 1.0]);
        assert_eq!(heavy, vec![2.0, 1.0]);

        let (light, heavy) = w.summed_areas(&e, true);
        assert_eq!(light, vec![2.0, 2.0]);
        assert_eq!(heavy, vec![2.0, 2.0]);
    }

    #[test]
    fn test_raw_center_adds_heavy_beyond_light_range() {
        // Two light isotopes, six heavy ones; the center only matches isotope 0.
        let full = vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let center = vec![1.0, 1.0, 1.0, 0.0, 0.5, 0.25, 2.0, 4.0];
        let w = ScanWindow {
            scan_nums: vec![1, 3, 5],
            raw: vec![full.clone(), center, full],
            matched: vec![vec![true, true], vec![true, false], vec![true, true]],
            match_counts: vec![2, 1, 2],
            num_light: 2,
            num_heavy: 6,
        };
        let e = w.extent(1);
        assert_eq!((e.left, e.center, e.right), (0, 1, 2));

        let (_, masked) = w.summed_areas(&e, false);
        assert_eq!(masked, vec![3.0, 2.0, 0.0, 0.0, 0.0, 0.0]);

        let (light, raw) = w.summed_areas(&e, true);
        assert_eq!(light, vec![3.0, 3.0]);
        assert_eq!(raw, vec![3.0, 2.0, 0.5, 0.25, 2.0, 4.0]);
        let added: f64 = raw.iter().sum::<f64>() - masked.iter().sum::<f64>();
        assert_eq!(added, 0.5 + 0.25 + 2.0 + 4.0);
    }
}
