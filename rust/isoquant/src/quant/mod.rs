//! Light/heavy area quantitation over a scan window.
//!
//! For every identification:
//!
//! 1. Build a window of scans around the identification scan.
//! 2. Match local maxima of each scan slice against the isotope targets.
//! 3. Walk outwards from the center scan while both species keep matching.
//! 4. Sum matched intensities over that extent and correct the sums for
//!    envelope overlap.

pub mod extent;
pub mod overlap;

use crate::errors::DataProcessingError;
use crate::models::{
    PeptideQuantRequest,
    QuantResult,
};
use crate::tolerance::MzTolerance;
use crate::traits::SpectrumSource;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

pub use extent::{
    Extent,
    ScanWindow,
};
pub use overlap::{
    CorrectedAreas,
    INFINITE_RATIO_VALUE,
    OverlapCoefficients,
    correct_areas,
};

/// A center scan with this many or fewer matched isotopes triggers the
/// compatibility fallback.
pub const COMPAT_CENTER_MATCH_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuantConfig {
    pub tolerance: MzTolerance,
    pub scans_before: usize,
    pub scans_after: usize,
    /// Window position treated as the identification scan.
    pub center_index: usize,
    /// Reproduce the legacy center-row fallback: when the center scan has
    /// too few matched isotopes its unmasked intensities are summed.
    pub compat_mode: bool,
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            tolerance: MzTolerance::default(),
            scans_before: 10,
            scans_after: 20,
            center_index: 9,
            compat_mode: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Quantifier {
    pub config: QuantConfig,
}

impl Quantifier {
    pub fn new(config: QuantConfig) -> Self {
        Self { config }
    }

    pub fn quantify<S: SpectrumSource + ?Sized>(
        &self,
        source: &S,
        request: &PeptideQuantRequest,
    ) -> Result<QuantResult, DataProcessingError> {
        self.quantify_with_window(source, request).map(|(res, _)| res)
    }

    /// Same as [`Quantifier::quantify`] but also hands back the scan window.
    pub fn quantify_with_window<S: SpectrumSource + ?Sized>(
        &self,
        source: &S,
        request: &PeptideQuantRequest,
    ) -> Result<(QuantResult, ScanWindow), DataProcessingError> {
        let targets = request.targets();
        let window = ScanWindow::build(source, request, &targets, &self.config)?;
        if window.is_empty() {
            return Err(DataProcessingError::EmptyWindow {
                scan: request.scan(),
            });
        }

        let extent = window.extent(self.config.center_index);
        let center_match_count = window.match_counts[extent.center];
        let raw_center =
            self.config.compat_mode && center_match_count <= COMPAT_CENTER_MATCH_THRESHOLD;
        let (light_peak_areas, heavy_peak_areas) = window.summed_areas(&extent, raw_center);
        let q2_light: f64 = light_peak_areas.iter().sum();
        let q2_heavy: f64 = heavy_peak_areas.iter().sum();

        let coefs = OverlapCoefficients::full_window(request.light_mass(), request.heavy_mass())
            .ok_or(DataProcessingError::InsufficientSeparation {
                separation: request.heavy_mass() - request.light_mass(),
            })?;
        let corrected = coefs.solve(q2_light, q2_heavy);

        debug!(
            "{} z={} scans {}..={} q2=({:.1}, {:.1}) q3=({:.1}, {:.1}) center matches {}",
            request.peptide(),
            request.charge(),
            window.scan_nums[extent.left],
            window.scan_nums[extent.right],
            q2_light,
            q2_heavy,
            corrected.light,
            corrected.heavy,
            center_match_count,
        );

        let result = QuantResult {
            request: request.clone(),
            first_scan: window.scan_nums[extent.left],
            last_scan: window.scan_nums[extent.right],
            q2_light,
            q2_heavy,
            q3_light: corrected.light,
            q3_heavy: corrected.heavy,
            center_match_count,
            light_peak_areas,
            heavy_peak_areas,
        };
        Ok((result, window))
    }
}
