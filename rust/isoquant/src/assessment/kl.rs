use crate::isotopes::normalize;

/// Observed intensities are floored to this before taking logs.
pub const KL_OBSERVED_FLOOR: f64 = 1e-10;

/// Kullback-Leibler divergence of the theoretical profile relative to the
/// observed one, after normalizing both to unit sum.
///
/// Terms where the theoretical abundance is zero contribute nothing.
///
/// ```
/// use isoquant::assessment::kl::kl_divergence;
/// let kl = kl_divergence(&[0.5, 0.5], &[10.0, 10.0]);
/// assert!(kl.abs() < 1e-12);
/// ```
pub fn kl_divergence(theoretical: &[f64], observed: &[f64]) -> f64 {
    let theo = normalize(theoretical);
    let obs = normalize(observed);
    theo.iter()
        .zip(obs.iter())
        .filter(|(t, _)| **t > 0.0)
        .map(|(t, o)| t * (t / o.max(KL_OBSERVED_FLOOR)).ln())
        .sum()
}
