use crate::errors::DataProcessingError;
use crate::models::QuantResult;
use crate::tolerance::MzTolerance;
use crate::traits::SpectrumSource;

/// Sums, over the scans of an extent, the most intense peak found within
/// tolerance of a given m/z.
pub struct ExtentPeakSummer<'a, S: SpectrumSource + ?Sized> {
    source: &'a S,
    first_index: usize,
    last_index: usize,
    tolerance: MzTolerance,
}

impl<'a, S: SpectrumSource + ?Sized> ExtentPeakSummer<'a, S> {
    pub fn new(
        source: &'a S,
        quant: &QuantResult,
        tolerance: MzTolerance,
    ) -> Result<Self, DataProcessingError> {
        let first_index = locate(source, quant.first_scan)?;
        let last_index = locate(source, quant.last_scan)?;
        if first_index > last_index {
            return Err(DataProcessingError::InvertedExtent {
                first_scan: quant.first_scan,
                last_scan: quant.last_scan,
            });
        }
        Ok(Self {
            source,
            first_index,
            last_index,
            tolerance,
        })
    }

    pub fn num_scans(&self) -> usize {
        self.last_index + 1 - self.first_index
    }

    pub fn sum_at(&self, mz: f64) -> f64 {
        let range = self.tolerance.mz_range(mz);
        (self.first_index..=self.last_index)
            .filter_map(|i| self.source.scan_at(i))
            .map(|scan| scan.max_intensity_in(range.clone()))
            .sum()
    }

    pub fn sums_at(&self, mzs: &[f64]) -> Vec<f64> {
        mzs.iter().map(|mz| self.sum_at(*mz)).collect()
    }
}

fn locate<S: SpectrumSource + ?Sized>(source: &S, scan: u32) -> Result<usize, DataProcessingError> {
    let idx = source.index_for_scan_num(scan);
    match source.scan_num_at(idx) {
        Some(found) if found == scan => Ok(idx),
        _ => Err(DataProcessingError::ScanNotFound { scan }),
    }
}
