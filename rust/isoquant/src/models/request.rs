use crate::errors::DataProcessingError;
use crate::isotopes::{
    isotope_mz,
    mass_to_mz,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;

/// Highest light isotope index searched for, regardless of label separation.
pub const MAX_LIGHT_ISOTOPE: usize = 5;

/// Number of heavy isotope peaks searched for.
pub const NUM_HEAVY_TARGETS: usize = 6;

/// A labelled identification to quantify.
///
/// Masses are neutral monoisotopic masses. Built once per identification,
/// never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeptideQuantRequest {
    peptide: Arc<str>,
    charge: u8,
    scan: u32,
    light_mass: f64,
    heavy_mass: f64,
}

impl PeptideQuantRequest {
    pub fn try_new(
        peptide: impl Into<Arc<str>>,
        charge: u8,
        scan: u32,
        light_mass: f64,
        heavy_mass: f64,
    ) -> Result<Self, DataProcessingError> {
        if charge == 0 {
            return Err(DataProcessingError::InvalidCharge { charge });
        }
        if !(heavy_mass > light_mass) || !light_mass.is_finite() || !heavy_mass.is_finite() {
            return Err(DataProcessingError::InconsistentMasses {
                light_mass,
                heavy_mass,
            });
        }
        let out = Self {
            peptide: peptide.into(),
            charge,
            scan,
            light_mass,
            heavy_mass,
        };
        if out.num_daltons_separation() < 1 {
            return Err(DataProcessingError::InsufficientSeparation {
                separation: heavy_mass - light_mass,
            });
        }
        Ok(out)
    }

    pub fn peptide(&self) -> &str {
        &self.peptide
    }

    pub fn charge(&self) -> u8 {
        self.charge
    }

    pub fn scan(&self) -> u32 {
        self.scan
    }

    pub fn light_mass(&self) -> f64 {
        self.light_mass
    }

    pub fn heavy_mass(&self) -> f64 {
        self.heavy_mass
    }

    pub fn light_mz(&self) -> f64 {
        mass_to_mz(self.light_mass, self.charge)
    }

    pub fn heavy_mz(&self) -> f64 {
        mass_to_mz(self.heavy_mass, self.charge)
    }

    /// Label separation rounded to whole daltons.
    pub fn num_daltons_separation(&self) -> usize {
        let sep = (self.heavy_mass - self.light_mass).round();
        if sep < 0.0 { 0 } else { sep as usize }
    }

    /// Highest light isotope index not overlapping the heavy monoisotope.
    pub fn safe_isotope(&self) -> usize {
        self.num_daltons_separation().saturating_sub(1)
    }

    /// `safe_isotope` capped at [`MAX_LIGHT_ISOTOPE`].
    pub fn safe_isotope_capped(&self) -> usize {
        self.safe_isotope().min(MAX_LIGHT_ISOTOPE)
    }

    pub fn targets(&self) -> TargetList {
        TargetList::from_request(self)
    }
}

/// The m/z values searched for in every scan of a window.
///
/// Light isotopes `0..=safeiso5` come first, followed by the
/// [`NUM_HEAVY_TARGETS`] heavy isotopes.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetList {
    mzs: Vec<f64>,
    num_light: usize,
}

impl TargetList {
    pub fn from_request(request: &PeptideQuantRequest) -> Self {
        let num_light = request.safe_isotope_capped() + 1;
        let light_mz = request.light_mz();
        let heavy_mz = request.heavy_mz();
        let charge = request.charge();

        let mut mzs = Vec::with_capacity(num_light + NUM_HEAVY_TARGETS);
        mzs.extend((0..num_light).map(|i| isotope_mz(light_mz, i, charge)));
        mzs.extend((0..NUM_HEAVY_TARGETS).map(|i| isotope_mz(heavy_mz, i, charge)));
        Self { mzs, num_light }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.mzs
    }

    pub fn len(&self) -> usize {
        self.mzs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mzs.is_empty()
    }

    pub fn num_light(&self) -> usize {
        self.num_light
    }

    pub fn num_heavy(&self) -> usize {
        self.mzs.len() - self.num_light
    }

    pub fn light(&self) -> &[f64] {
        &self.mzs[..self.num_light]
    }

    pub fn heavy(&self) -> &[f64] {
        &self.mzs[self.num_light..]
    }

    /// Position in the full list of the heavy isotope `isotope`.
    pub fn heavy_index(&self, isotope: usize) -> usize {
        self.num_light + isotope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separation_constants() {
        let req = PeptideQuantRequest::try_new("PEPTIDEK", 2, 100, 1000.0, 1006.0).unwrap();
        assert_eq!(req.num_daltons_separation(), 6);
        assert_eq!(req.safe_isotope(), 5);
        assert_eq!(req.safe_isotope_capped(), 5);

        let targets = req.targets();
        assert_eq!(targets.len(), 12);
        assert_eq!(targets.num_light() + targets.num_heavy(), targets.len());
        assert!((targets.as_slice()[0] - req.light_mz()).abs() < 1e-12);
        assert!((targets.heavy()[0] - req.heavy_mz()).abs() < 1e-12);
    }

    #[test]
    fn test_small_separation_caps_light_series() {
        let req = PeptideQuantRequest::try_new("PEPTIDEK", 3, 100, 1000.0, 1003.1).unwrap();
        assert_eq!(req.safe_isotope_capped(), 2);
        assert_eq!(req.targets().len(), 3 + NUM_HEAVY_TARGETS);
    }

    #[test]
    fn test_large_separation_is_capped() {
        let req = PeptideQuantRequest::try_new("PEPTIDEK", 2, 100, 1000.0, 1009.03).unwrap();
        assert_eq!(req.safe_isotope(), 8);
        assert_eq!(req.safe_isotope_capped(), MAX_LIGHT_ISOTOPE);
    }

    #[test]
    fn test_rejects_bad_requests() {
        assert!(PeptideQuantRequest::try_new("P", 0, 1, 1000.0, 1006.0).is_err());
        assert!(PeptideQuantRequest::try_new("P", 2, 1, 1006.0, 1000.0).is_err());
        assert!(PeptideQuantRequest::try_new("P", 2, 1, 1000.0, 1000.3).is_err());
    }
}
