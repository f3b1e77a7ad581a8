use super::request::PeptideQuantRequest;
use crate::quant::overlap::{
    CorrectedAreas,
    INFINITE_RATIO_VALUE,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Stand-in values for ratios that are undefined because the heavy area is zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RatioSentinels {
    /// `Infinity` when only the heavy area is zero, `NaN` when both are.
    #[serde(rename = "ieee")]
    Ieee,
    #[serde(rename = "fixed")]
    Fixed { infinite: f64, undefined: f64 },
}

impl Default for RatioSentinels {
    fn default() -> Self {
        RatioSentinels::Fixed {
            infinite: INFINITE_RATIO_VALUE,
            undefined: -1.0,
        }
    }
}

impl RatioSentinels {
    pub fn ratio(&self, light: f64, heavy: f64) -> f64 {
        if heavy != 0.0 {
            return light / heavy;
        }
        match (self, light == 0.0) {
            (RatioSentinels::Ieee, false) => f64::INFINITY,
            (RatioSentinels::Ieee, true) => f64::NAN,
            (RatioSentinels::Fixed { infinite, .. }, false) => *infinite,
            (RatioSentinels::Fixed { undefined, .. }, true) => *undefined,
        }
    }
}

/// Outcome of quantifying one identification over its extent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantResult {
    pub request: PeptideQuantRequest,
    /// Scan numbers (not indices) bounding the extent, inclusive.
    pub first_scan: u32,
    pub last_scan: u32,
    /// Summed matched intensities before overlap correction.
    pub q2_light: f64,
    pub q2_heavy: f64,
    /// Overlap-corrected areas. `q3_heavy` is never negative.
    pub q3_light: f64,
    pub q3_heavy: f64,
    pub center_match_count: usize,
    /// Per-isotope summed intensities over the extent.
    pub light_peak_areas: Vec<f64>,
    pub heavy_peak_areas: Vec<f64>,
}

impl QuantResult {
    pub fn corrected(&self) -> CorrectedAreas {
        CorrectedAreas {
            light: self.q3_light,
            heavy: self.q3_heavy,
        }
    }

    /// Light/heavy ratio with [`INFINITE_RATIO_VALUE`] for a zero heavy area.
    ///
    /// This is the value the assessment compares against; it is always finite.
    pub fn algorithm_ratio(&self) -> f64 {
        self.corrected().ratio()
    }

    /// Light/heavy ratio with the reporting sentinels substituted.
    pub fn ratio(&self, sentinels: &RatioSentinels) -> f64 {
        sentinels.ratio(self.q3_light, self.q3_heavy)
    }

    pub fn has_signal(&self) -> bool {
        self.q3_light > 0.0 || self.q3_heavy > 0.0
    }
}
