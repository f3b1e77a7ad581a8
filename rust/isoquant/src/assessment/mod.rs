//! Quality assessment of a quantitation event.
//!
//! Checks run cheapest first: missing peaks, single-peak ratio, light/heavy
//! KL similarity, absolute 2-peak KL and finally the coeluting-peptide search.
//! Unless `perform_all_checks` is set, assessment stops at the first failure.

pub mod checks;
pub mod kl;
pub mod peak_sums;

use crate::errors::ConfigError;
use crate::isotopes::{
    ISOTOPE_SPACING,
    envelope,
    isotope_mz,
    most_abundant_isotope,
    mz_to_mass,
};
use crate::models::{
    AssessmentCheck,
    AssessmentResult,
    CheckOutcome,
    QuantResult,
};
use crate::quant::{
    CorrectedAreas,
    correct_areas,
};
use crate::tolerance::MzTolerance;
use crate::traits::SpectrumSource;
use checks::{
    kl_verdict,
    missing_peaks,
    single_peak_verdict,
    swapped_charge,
    two_peak_kl_cap,
};
use kl::kl_divergence;
use peak_sums::ExtentPeakSummer;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

/// Isotopes scored when explaining an interfering peak.
const COELUTION_CANDIDATE_PEAKS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssessorConfig {
    pub perform_all_checks: bool,
    pub check_missing_peaks: bool,
    pub max_single_peak_log_ratio_diff: f64,
    pub extreme_ratio_low: f64,
    pub extreme_ratio_high: f64,
    pub max_kl_diff: f64,
    pub max_kl_ratio: f64,
    pub max_two_peak_kl: f64,
    /// Fraction of the monoisotope a peak one isotope below must exceed to
    /// count as interference.
    pub coelution_intensity_fraction: f64,
    pub max_coelution_kl: f64,
    /// Overlap is significant when the light envelope at `i + separation`
    /// is more than this fraction of the light envelope at `i`.
    pub overlap_significance: f64,
    pub num_assessment_peaks: usize,
    pub tolerance: MzTolerance,
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self {
            perform_all_checks: false,
            check_missing_peaks: false,
            max_single_peak_log_ratio_diff: 1.5f64.ln(),
            extreme_ratio_low: 0.5,
            extreme_ratio_high: 2.0,
            max_kl_diff: 0.15,
            max_kl_ratio: 0.7,
            max_two_peak_kl: 10.0,
            coelution_intensity_fraction: 0.35,
            max_coelution_kl: 1.0,
            overlap_significance: 0.02,
            num_assessment_peaks: 4,
            tolerance: MzTolerance::default(),
        }
    }
}

impl AssessorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tolerance.validate()?;
        if self.num_assessment_peaks < 2 {
            return Err(ConfigError::Other(format!(
                "num_assessment_peaks must be at least 2, got {}",
                self.num_assessment_peaks
            )));
        }
        if !(self.extreme_ratio_low < self.extreme_ratio_high) {
            return Err(ConfigError::Other(format!(
                "extreme_ratio_low ({}) must be below extreme_ratio_high ({})",
                self.extreme_ratio_low, self.extreme_ratio_high
            )));
        }
        Ok(())
    }
}

/// Summed extent intensities at the isotope positions of both species.
#[derive(Debug, Clone)]
struct ObservedPeaks {
    light: Vec<f64>,
    heavy: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct EventAssessor {
    pub config: AssessorConfig,
}

impl EventAssessor {
    pub fn new(config: AssessorConfig) -> Self {
        Self { config }
    }

    pub fn assess<S: SpectrumSource + ?Sized>(
        &self,
        source: &S,
        quant: &QuantResult,
    ) -> AssessmentResult {
        if !quant.has_signal() {
            return AssessmentResult::unevaluated("Light and heavy areas are both zero");
        }

        let summer = match ExtentPeakSummer::new(source, quant, self.config.tolerance) {
            Ok(s) => s,
            Err(e) => return AssessmentResult::other(e.to_string()),
        };

        let request = &quant.request;
        let charge = request.charge();
        let n = self.config.num_assessment_peaks.max(2);
        let light_mzs: Vec<f64> = (0..n)
            .map(|i| isotope_mz(request.light_mz(), i, charge))
            .collect();
        let heavy_mzs: Vec<f64> = (0..n)
            .map(|i| isotope_mz(request.heavy_mz(), i, charge))
            .collect();
        let observed = ObservedPeaks {
            light: summer.sums_at(&light_mzs),
            heavy: summer.sums_at(&heavy_mzs),
        };

        let algorithm_ratio = quant.algorithm_ratio();
        let single_peak_ratio = self.single_peak_ratio(quant, &observed);
        debug!(
            "Assessing {} over {} scans: light {:?} heavy {:?} spr {:.3} alg {:.3}",
            request.peptide(),
            summer.num_scans(),
            observed.light,
            observed.heavy,
            single_peak_ratio,
            algorithm_ratio,
        );

        let mut outcomes: Vec<(AssessmentCheck, CheckOutcome)> = Vec::with_capacity(5);
        let halt = |outcomes: &Vec<(AssessmentCheck, CheckOutcome)>| {
            !self.config.perform_all_checks
                && outcomes.last().is_some_and(|(_, o)| !o.passed)
        };

        if self.config.check_missing_peaks {
            outcomes.push((
                AssessmentCheck::MissingPeaks,
                missing_peaks(&observed.light, &observed.heavy),
            ));
            if halt(&outcomes) {
                return AssessmentResult::from_checks(outcomes, single_peak_ratio);
            }
        }

        outcomes.push((
            AssessmentCheck::SinglePeakRatio,
            single_peak_verdict(single_peak_ratio, algorithm_ratio, &self.config),
        ));
        if halt(&outcomes) {
            return AssessmentResult::from_checks(outcomes, single_peak_ratio);
        }

        let (kl_light, kl_heavy) = self.two_peak_kl(quant, &observed);
        outcomes.push((
            AssessmentCheck::KlDivergence,
            kl_verdict(kl_light, kl_heavy, algorithm_ratio, &self.config),
        ));
        if halt(&outcomes) {
            return AssessmentResult::from_checks(outcomes, single_peak_ratio);
        }

        outcomes.push((
            AssessmentCheck::TwoPeakKl,
            two_peak_kl_cap(kl_light, kl_heavy, &self.config),
        ));
        if halt(&outcomes) {
            return AssessmentResult::from_checks(outcomes, single_peak_ratio);
        }

        outcomes.push((
            AssessmentCheck::Coelution,
            self.coelution(&summer, quant, &observed),
        ));
        AssessmentResult::from_checks(outcomes, single_peak_ratio)
    }

    /// Whether light isotopes land on heavy isotope `index` with more than
    /// negligible weight.
    fn overlap_is_significant(&self, quant: &QuantResult, index: usize) -> bool {
        let sep = quant.request.num_daltons_separation();
        let env = envelope(quant.request.light_mass(), sep + index + 1);
        env[index] > 0.0 && env[sep + index] / env[index] > self.config.overlap_significance
    }

    /// Ratio from the theoretically most intense isotope alone.
    fn single_peak_ratio(&self, quant: &QuantResult, observed: &ObservedPeaks) -> f64 {
        let request = &quant.request;
        let index = most_abundant_isotope(request.light_mass(), observed.light.len());
        let raw_light = observed.light[index];
        let raw_heavy = observed.heavy[index];

        let areas_are_finite = quant.q3_light > 0.0 && quant.q3_heavy > 0.0;
        if areas_are_finite && self.overlap_is_significant(quant, index) {
            if let Some(corrected) = correct_areas(
                request.light_mass(),
                request.heavy_mass(),
                raw_light,
                raw_heavy,
                index,
                index,
            ) {
                return corrected.ratio();
            }
        }
        CorrectedAreas {
            light: raw_light,
            heavy: raw_heavy,
        }
        .ratio()
    }

    /// 2-peak KL of each species against its theoretical envelope.
    ///
    /// When light isotopes overlap the heavy pair, the heavy theory includes
    /// the light bleed-through scaled by the algorithm ratio.
    fn two_peak_kl(&self, quant: &QuantResult, observed: &ObservedPeaks) -> (f64, f64) {
        let request = &quant.request;
        let light_theo = envelope(request.light_mass(), 2);
        let mut heavy_theo = envelope(request.heavy_mass(), 2);

        let areas_are_finite = quant.q3_light > 0.0 && quant.q3_heavy > 0.0;
        if areas_are_finite && (0..2).any(|i| self.overlap_is_significant(quant, i)) {
            let sep = request.num_daltons_separation();
            let light_env = envelope(request.light_mass(), sep + 2);
            let ratio = quant.algorithm_ratio();
            for (i, h) in heavy_theo.iter_mut().enumerate() {
                *h += ratio * light_env[sep + i];
            }
        }

        (
            kl_divergence(&light_theo, &observed.light[..2]),
            kl_divergence(&heavy_theo, &observed.heavy[..2]),
        )
    }

    fn coelution<S: SpectrumSource + ?Sized>(
        &self,
        summer: &ExtentPeakSummer<'_, S>,
        quant: &QuantResult,
        observed: &ObservedPeaks,
    ) -> CheckOutcome {
        let request = &quant.request;
        let charge = request.charge();
        let step = ISOTOPE_SPACING / charge as f64;

        let species = [
            ("Light", request.light_mz(), observed.light[0]),
            ("Heavy", request.heavy_mz(), observed.heavy[0]),
        ];
        let mut explained = Vec::new();
        for (name, mono_mz, mono_intensity) in species {
            if !(mono_intensity > 0.0) {
                continue;
            }
            let below_mz = mono_mz - step;
            let below = summer.sum_at(below_mz);
            if below <= self.config.coelution_intensity_fraction * mono_intensity {
                continue;
            }

            match self.explain_interference(summer, below_mz, charge) {
                Some(desc) => explained.push(format!("{} interference explained as {}", name, desc)),
                None => {
                    return CheckOutcome::fail(format!(
                        "{} monoisotope at {:.4} has a peak one isotope below at {:.1}% intensity",
                        name,
                        mono_mz,
                        100.0 * below / mono_intensity
                    ));
                }
            }
        }

        if explained.is_empty() {
            CheckOutcome::pass("No interfering peak below the monoisotopes")
        } else {
            CheckOutcome::pass(explained.join("; "))
        }
    }

    /// Tries to explain a peak at `mz` as an isotope of the same peptide
    /// family at the swapped charge state.
    fn explain_interference<S: SpectrumSource + ?Sized>(
        &self,
        summer: &ExtentPeakSummer<'_, S>,
        mz: f64,
        charge: u8,
    ) -> Option<String> {
        let other = swapped_charge(charge)?;
        let step = ISOTOPE_SPACING / other as f64;
        for offset in 0..COELUTION_CANDIDATE_PEAKS {
            let mono = mz - offset as f64 * step;
            let mass = mz_to_mass(mono, other);
            if !(mass > 0.0) {
                continue;
            }
            let theo = envelope(mass, COELUTION_CANDIDATE_PEAKS);
            let mzs: Vec<f64> = (0..COELUTION_CANDIDATE_PEAKS)
                .map(|i| isotope_mz(mono, i, other))
                .collect();
            let obs = summer.sums_at(&mzs);
            let kl = kl_divergence(&theo, &obs);
            if kl < self.config.max_coelution_kl {
                return Some(format!(
                    "isotope {} of a z={} species at {:.4} (KL {:.3})",
                    offset, other, mono, kl
                ));
            }
        }
        None
    }
}
