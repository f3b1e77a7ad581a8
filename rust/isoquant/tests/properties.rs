use isoquant::isotopes::envelope;
use isoquant::peaks::match_peaks;
use isoquant::quant::{
    OverlapCoefficients,
    correct_areas,
};
use proptest::prelude::*;

const MATCH_TOLERANCE: f64 = 0.05;

/// Distinct values on a 0.01 grid, split between observed and targets.
fn split_values() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::btree_set(0u32..5_000, 2..40)
        .prop_flat_map(|set| {
            let values: Vec<u32> = set.into_iter().collect();
            let n = values.len();
            (Just(values), prop::collection::vec(any::<bool>(), n))
        })
        .prop_map(|(values, mask)| {
            let mut observed = Vec::new();
            let mut targets = Vec::new();
            for (v, is_observed) in values.into_iter().zip(mask) {
                let x = v as f64 * 0.01;
                if is_observed {
                    observed.push(x);
                } else {
                    targets.push(x);
                }
            }
            (observed, targets)
        })
}

fn matched_values(observed: &[f64], targets: &[f64]) -> Vec<(u64, u64)> {
    let mut out: Vec<(u64, u64)> = match_peaks(observed, targets, MATCH_TOLERANCE)
        .iter()
        .map(|(o, t)| (observed[o].to_bits(), targets[t].to_bits()))
        .collect();
    out.sort();
    out
}

proptest! {
    #[test]
    fn test_window_and_general_overlap_agree(
        light_mass in 100.0f64..6000.0,
        separation in 1usize..16,
        extra in 0.0f64..0.4,
    ) {
        let heavy_mass = light_mass + separation as f64 + extra;
        let window = OverlapCoefficients::full_window(light_mass, heavy_mass).unwrap();
        let general = OverlapCoefficients::new(light_mass, heavy_mass, 0, separation - 1).unwrap();

        // Direct evaluation of the window form.
        let head: f64 = envelope(heavy_mass, separation).iter().sum();
        let tail: f64 = envelope(heavy_mass, 2 * separation)[separation..].iter().sum();

        prop_assert!((window.head - head).abs() < 1e-9);
        prop_assert!((window.tail - tail).abs() < 1e-9);
        prop_assert!((general.head - head).abs() < 1e-9);
        prop_assert!((general.tail - tail).abs() < 1e-9);
    }

    #[test]
    fn test_corrected_heavy_never_negative(
        light_mass in 100.0f64..6000.0,
        separation in 1usize..16,
        raw_light in 0.0f64..1e10,
        raw_heavy in 0.0f64..1e10,
        first_peak in 0usize..6,
        max_peaks in 0usize..12,
    ) {
        let heavy_mass = light_mass + separation as f64;
        if let Some(areas) = correct_areas(light_mass, heavy_mass, raw_light, raw_heavy, first_peak, max_peaks) {
            prop_assert!(areas.heavy >= 0.0);
            prop_assert!(areas.light >= 0.0);
        }
        let window = OverlapCoefficients::full_window(light_mass, heavy_mass).unwrap();
        prop_assert!(window.solve(raw_light, raw_heavy).heavy >= 0.0);
    }

    #[test]
    fn test_correction_vanishes_with_separation(
        light_mass in 500.0f64..1500.0,
        raw_light in 1.0f64..1e9,
        raw_heavy in 1.0f64..1e9,
    ) {
        let heavy_mass = light_mass + 40.0;
        let areas = correct_areas(light_mass, heavy_mass, raw_light, raw_heavy, 0, 20).unwrap();
        prop_assert!((areas.heavy - raw_heavy).abs() <= 1e-9 * raw_heavy);
        prop_assert!((areas.light - raw_light).abs() <= 1e-9 * raw_light);
    }

    #[test]
    fn test_matching_ignores_input_order(
        (observed, targets, observed_perm, targets_perm) in split_values().prop_flat_map(|(o, t)| {
            (Just(o.clone()), Just(t.clone()), Just(o).prop_shuffle(), Just(t).prop_shuffle())
        })
    ) {
        prop_assert_eq!(
            matched_values(&observed, &targets),
            matched_values(&observed_perm, &targets_perm)
        );
    }

    #[test]
    fn test_matches_are_adjacent_and_nearest((observed, targets) in split_values()) {
        let matches = match_peaks(&observed, &targets, MATCH_TOLERANCE);

        let mut used_observed = vec![false; observed.len()];
        let mut used_targets = vec![false; targets.len()];
        for (o, t) in matches.iter() {
            prop_assert!(!used_observed[o]);
            prop_assert!(!used_targets[t]);
            used_observed[o] = true;
            used_targets[t] = true;

            let (ov, tv) = (observed[o], targets[t]);
            let gap = (ov - tv).abs();
            prop_assert!(gap < MATCH_TOLERANCE);

            let (lo, hi) = if ov < tv { (ov, tv) } else { (tv, ov) };
            // Nothing from either side sits between the pair.
            prop_assert!(!observed.iter().chain(targets.iter()).any(|x| *x > lo && *x < hi));

            // The outer neighbors of the pair, when from the opposite source,
            // are not strictly closer.
            let lo_is_observed = ov < tv;
            let (lo_others, hi_others) = if lo_is_observed {
                (&targets, &observed)
            } else {
                (&observed, &targets)
            };
            let below = observed
                .iter()
                .chain(targets.iter())
                .copied()
                .filter(|x| *x < lo)
                .fold(f64::NEG_INFINITY, f64::max);
            if below.is_finite() && lo_others.contains(&below) {
                prop_assert!(lo - below >= gap);
            }
            let above = observed
                .iter()
                .chain(targets.iter())
                .copied()
                .filter(|x| *x > hi)
                .fold(f64::INFINITY, f64::min);
            if above.is_finite() && hi_others.contains(&above) {
                prop_assert!(above - hi >= gap);
            }
        }
    }
}
