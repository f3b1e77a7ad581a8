//! Decision rules of the individual assessment checks.
//!
//! Everything here is pure; the spectrum work lives in the assessor.

use super::AssessorConfig;
use crate::models::CheckOutcome;

/// Fails when both of the first two summed peaks of either species are zero.
pub fn missing_peaks(light: &[f64], heavy: &[f64]) -> CheckOutcome {
    let gone = |x: &[f64]| x.iter().take(2).all(|v| *v <= 0.0);
    match (gone(light), gone(heavy)) {
        (true, true) => CheckOutcome::fail("Light and heavy first two peaks are missing"),
        (true, false) => CheckOutcome::fail("Light first two peaks are missing"),
        (false, true) => CheckOutcome::fail("Heavy first two peaks are missing"),
        (false, false) => CheckOutcome::pass("First two peaks present"),
    }
}

fn extreme_side(ratio: f64, config: &AssessorConfig) -> Option<bool> {
    if ratio < config.extreme_ratio_low {
        Some(false)
    } else if ratio > config.extreme_ratio_high {
        Some(true)
    } else {
        None
    }
}

/// Compares the single-peak ratio against the algorithm ratio in log space.
///
/// Disagreement is tolerated when both ratios sit on the same side of the
/// extreme band.
pub fn single_peak_verdict(
    single_peak_ratio: f64,
    algorithm_ratio: f64,
    config: &AssessorConfig,
) -> CheckOutcome {
    let sp_side = extreme_side(single_peak_ratio, config);
    if sp_side.is_some() && sp_side == extreme_side(algorithm_ratio, config) {
        return CheckOutcome::pass(format!(
            "Single-peak ratio {:.3} and algorithm ratio {:.3} are both extreme",
            single_peak_ratio, algorithm_ratio
        ));
    }

    let diff = (single_peak_ratio.ln() - algorithm_ratio.ln()).abs();
    if diff.is_nan() || diff > config.max_single_peak_log_ratio_diff {
        CheckOutcome::fail(format!(
            "Single-peak ratio {:.3} differs from algorithm ratio {:.3} (|log diff| {:.3} > {:.3})",
            single_peak_ratio, algorithm_ratio, diff, config.max_single_peak_log_ratio_diff
        ))
    } else {
        CheckOutcome::pass(format!(
            "Single-peak ratio {:.3} agrees with algorithm ratio {:.3}",
            single_peak_ratio, algorithm_ratio
        ))
    }
}

/// Flags light and heavy envelopes that fit their theory very differently.
pub fn kl_verdict(
    kl_light: f64,
    kl_heavy: f64,
    algorithm_ratio: f64,
    config: &AssessorConfig,
) -> CheckOutcome {
    // A zero heavy KL gives an infinite ratio, which never flags.
    let ratio = kl_light / kl_heavy;
    let diff = (kl_light - kl_heavy).abs();

    if diff <= config.max_kl_diff || ratio >= config.max_kl_ratio {
        return CheckOutcome::pass(format!(
            "Light KL {:.3} and heavy KL {:.3} are within limits",
            kl_light, kl_heavy
        ));
    }

    // Only a worse heavy fit reaches here; heavy is the minor species above the band.
    if extreme_side(algorithm_ratio, config) == Some(true) {
        return CheckOutcome::pass(format!(
            "Heavy KL {:.3} is poor but it is the minor species at ratio {:.3}",
            kl_heavy, algorithm_ratio
        ));
    }

    CheckOutcome::fail(format!(
        "Light KL {:.3} and heavy KL {:.3} differ (diff {:.3}, ratio {:.3})",
        kl_light, kl_heavy, diff, ratio
    ))
}

pub fn two_peak_kl_cap(kl_light: f64, kl_heavy: f64, config: &AssessorConfig) -> CheckOutcome {
    let cap = config.max_two_peak_kl;
    if kl_light > cap || kl_heavy > cap {
        CheckOutcome::fail(format!(
            "2-peak KL too large (light {:.3}, heavy {:.3}, max {:.1})",
            kl_light, kl_heavy, cap
        ))
    } else {
        CheckOutcome::pass(format!(
            "2-peak KL within bounds (light {:.3}, heavy {:.3})",
            kl_light, kl_heavy
        ))
    }
}

/// Charge an interfering peptide would be tried at, 2 and 3 only.
pub fn swapped_charge(charge: u8) -> Option<u8> {
    match charge {
        2 => Some(3),
        3 => Some(2),
        _ => None,
    }
}
