//! Approximate isotope envelopes.
//!
//! The envelope of a peptide of neutral mass `M` is modelled as a Poisson
//! distribution with `lambda = M / 1800`, which is close enough to the
//! averagine envelope for the peptide masses this crate deals with.
//! Values are NOT normalized, callers that compare against observed
//! intensities normalize on their side.

/// Mass of a proton in daltons.
pub const PROTON_MASS: f64 = 1.007276;

/// Mass difference between 13C and 12C.
pub const ISOTOPE_SPACING: f64 = 1.0033548378;

/// Mass (in daltons) at which the expected number of heavy isotopes is 1.
pub const POISSON_MASS_SCALE: f64 = 1800.0;

/// Terms at or beyond this index are treated as zero.
pub const MAX_POISSON_TERMS: usize = 25;

const FACTORIALS: [f64; MAX_POISSON_TERMS] = build_factorials();

const fn build_factorials() -> [f64; MAX_POISSON_TERMS] {
    let mut out = [1.0; MAX_POISSON_TERMS];
    let mut i = 1;
    while i < MAX_POISSON_TERMS {
        out[i] = out[i - 1] * i as f64;
        i += 1;
    }
    out
}

/// Relative abundance of the `index`-th isotope peak for a neutral `mass`.
#[inline]
pub fn isotope_abundance(mass: f64, index: usize) -> f64 {
    if index >= MAX_POISSON_TERMS {
        return 0.0;
    }
    let lambda = mass / POISSON_MASS_SCALE;
    if index == 0 {
        return (-lambda).exp();
    }
    lambda.powi(index as i32) * (-lambda).exp() / FACTORIALS[index]
}

/// First `n` terms of the isotope envelope for a neutral `mass`.
///
/// ```
/// use isoquant::isotopes::envelope;
///
/// let env = envelope(1800.0, 3);
/// assert!((env[0] - 0.3679).abs() < 1e-3);
/// assert!((env[2] - 0.1839).abs() < 1e-3);
/// ```
pub fn envelope(mass: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| isotope_abundance(mass, i)).collect()
}

/// Index of the most abundant isotope among the first `n` peaks.
///
/// Ties resolve to the lower index.
pub fn most_abundant_isotope(mass: f64, n: usize) -> usize {
    let mut best = 0;
    let mut best_val = f64::NEG_INFINITY;
    for i in 0..n {
        let v = isotope_abundance(mass, i);
        if v > best_val {
            best = i;
            best_val = v;
        }
    }
    best
}

/// Normalizes a slice so it sums to one.
///
/// All-zero input is returned unchanged.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return values.to_vec();
    }
    values.iter().map(|v| v / total).collect()
}

/// Neutral monoisotopic mass to m/z at the given charge.
#[inline]
pub fn mass_to_mz(mass: f64, charge: u8) -> f64 {
    let z = charge as f64;
    (mass + z * PROTON_MASS) / z
}

/// m/z back to neutral mass at the given charge.
#[inline]
pub fn mz_to_mass(mz: f64, charge: u8) -> f64 {
    let z = charge as f64;
    mz * z - z * PROTON_MASS
}

/// m/z of the `index`-th isotope peak.
#[inline]
pub fn isotope_mz(mono_mz: f64, index: usize, charge: u8) -> f64 {
    mono_mz + index as f64 * ISOTOPE_SPACING / charge as f64
}
