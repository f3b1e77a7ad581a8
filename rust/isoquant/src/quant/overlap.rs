//! Correction of light/heavy areas for isotope-envelope overlap.
//!
//! The upper isotopes of the light species land on the heavy isotope
//! positions. With `head` the fraction of the envelope counted for each
//! species and `tail` the fraction of the light envelope that bleeds into the
//! counted heavy peaks, the observed areas satisfy
//!
//! ```text
//! | head   0  | | light |   | raw_light |
//! | tail head | | heavy | = | raw_heavy |
//! ```
//!
//! The system is lower triangular so it is solved in closed form.
//!
//! Both the extent solve (all isotopes below the heavy monoisotope) and the
//! single-peak correction used during assessment go through
//! [`OverlapCoefficients::new`].

use crate::isotopes::isotope_abundance;

/// Ratio reported when the corrected heavy area is zero.
pub const INFINITE_RATIO_VALUE: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapCoefficients {
    pub num_daltons_separation: usize,
    pub first_peak: usize,
    pub max_peak_used: usize,
    pub head: f64,
    pub tail: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedAreas {
    pub light: f64,
    /// Never negative.
    pub heavy: f64,
}

impl CorrectedAreas {
    pub fn ratio(&self) -> f64 {
        if self.heavy == 0.0 {
            INFINITE_RATIO_VALUE
        } else {
            self.light / self.heavy
        }
    }
}

impl OverlapCoefficients {
    /// Coefficients for peaks `first_peak..=min(max_peaks, separation - 1)`.
    ///
    /// The envelope is evaluated at the heavy mass for both species, which
    /// keeps results identical to the established quantitation numbers.
    /// Returns `None` when the separation is under one dalton or the requested
    /// peak range is empty.
    pub fn new(light_mass: f64, heavy_mass: f64, first_peak: usize, max_peaks: usize) -> Option<Self> {
        let sep = (heavy_mass - light_mass).round();
        if !(sep >= 1.0) {
            return None;
        }
        let num_daltons_separation = sep as usize;
        let max_peak_used = max_peaks.min(num_daltons_separation - 1);
        if first_peak > max_peak_used {
            return None;
        }

        let head: f64 = (first_peak..=max_peak_used)
            .map(|i| isotope_abundance(heavy_mass, i))
            .sum();
        let tail: f64 = ((num_daltons_separation + first_peak)
            ..=(num_daltons_separation + max_peak_used))
            .map(|i| isotope_abundance(heavy_mass, i))
            .sum();
        if !(head > 0.0) {
            return None;
        }

        Some(Self {
            num_daltons_separation,
            first_peak,
            max_peak_used,
            head,
            tail,
        })
    }

    /// Coefficients over every light isotope below the heavy monoisotope.
    pub fn full_window(light_mass: f64, heavy_mass: f64) -> Option<Self> {
        Self::new(light_mass, heavy_mass, 0, usize::MAX)
    }

    pub fn solve(&self, raw_light: f64, raw_heavy: f64) -> CorrectedAreas {
        let light = raw_light / self.head;
        let heavy = ((raw_heavy - self.tail * light) / self.head).max(0.0);
        CorrectedAreas { light, heavy }
    }
}

/// General-purpose correction of a raw light/heavy area pair.
pub fn correct_areas(
    light_mass: f64,
    heavy_mass: f64,
    raw_light: f64,
    raw_heavy: f64,
    first_peak: usize,
    max_peaks: usize,
) -> Option<CorrectedAreas> {
    OverlapCoefficients::new(light_mass, heavy_mass, first_peak, max_peaks)
        .map(|c| c.solve(raw_light, raw_heavy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isotopes::envelope;

    #[test]
    fn test_window_matches_direct_sums() {
        let (light, heavy) = (1500.0, 1504.0);
        let coefs = OverlapCoefficients::full_window(light, heavy).unwrap();
        let shift = 4;
        let head: f64 = envelope(heavy, shift)[0..shift].iter().sum();
        let tail: f64 = envelope(heavy, 2 * shift)[shift..2 * shift].iter().sum();
        assert!((coefs.head - head).abs() < 1e-12);
        assert!((coefs.tail - tail).abs() < 1e-12);
        assert_eq!(coefs.max_peak_used, 3);
    }

    #[test]
    fn test_no_overlap_is_noop() {
        let out = correct_areas(1000.0, 1024.0, 500.0, 700.0, 0, 0).unwrap();
        let head = isotope_abundance(1024.0, 0);
        assert!((out.light - 500.0 / head).abs() < 1e-9);
        assert!((out.heavy * head - 700.0).abs() < 1e-6);
    }

    #[test]
    fn test_heavy_clamped_to_zero() {
        let out = correct_areas(3000.0, 3002.0, 1000.0, 0.0, 0, 5).unwrap();
        assert_eq!(out.heavy, 0.0);
        assert_eq!(out.ratio(), INFINITE_RATIO_VALUE);
    }

    #[test]
    fn test_overlap_reduces_heavy() {
        let coefs = OverlapCoefficients::new(3000.0, 3002.0, 0, 5).unwrap();
        assert_eq!(coefs.max_peak_used, 1);
        assert!(coefs.tail > 0.0);
        let out = coefs.solve(100.0, 100.0);
        assert!(out.heavy < out.light);
    }

    #[test]
    fn test_single_peak_form() {
        let coefs = OverlapCoefficients::new(2000.0, 2004.0, 1, 1).unwrap();
        assert!((coefs.head - isotope_abundance(2004.0, 1)).abs() < 1e-15);
        assert!((coefs.tail - isotope_abundance(2004.0, 5)).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(OverlapCoefficients::new(1000.0, 1000.2, 0, 5).is_none());
        assert!(OverlapCoefficients::new(1000.0, 1002.0, 3, 5).is_none());
    }
}
