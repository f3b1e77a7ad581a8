//! One-to-one matching of observed peaks against target m/z values.
//!
//! Both inputs are merged into a single sorted sequence. Every adjacent pair
//! that mixes an observed and a target value and is closer than the tolerance
//! is a candidate. A candidate survives only if no adjacent candidate sharing
//! one of its endpoints is tighter; on equal gaps the lower-valued pair wins.
//! The result is that every point is paired with at most one cross-source
//! neighbor, its closest adjacent one.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Observed,
    Target,
}

#[derive(Debug, Clone, Copy)]
struct Tagged {
    value: f64,
    source: Source,
    index: usize,
}

/// Confirmed pairings. `observed[k]` matches `targets[k]`; order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeakMatches {
    pub observed: Vec<usize>,
    pub targets: Vec<usize>,
}

impl PeakMatches {
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.observed.iter().copied().zip(self.targets.iter().copied())
    }
}

/// Matches `observed` values against `targets` within `tolerance` (exclusive).
///
/// ```
/// use isoquant::peaks::match_peaks;
///
/// let observed = [100.0, 100.52, 101.0];
/// let targets = [100.001, 101.002];
/// let matches = match_peaks(&observed, &targets, 0.01);
/// let mut pairs: Vec<_> = matches.iter().collect();
/// pairs.sort();
/// assert_eq!(pairs, vec![(0, 0), (2, 1)]);
/// ```
pub fn match_peaks(observed: &[f64], targets: &[f64], tolerance: f64) -> PeakMatches {
    let mut merged: Vec<Tagged> = Vec::with_capacity(observed.len() + targets.len());
    merged.extend(observed.iter().enumerate().map(|(index, &value)| Tagged {
        value,
        source: Source::Observed,
        index,
    }));
    merged.extend(targets.iter().enumerate().map(|(index, &value)| Tagged {
        value,
        source: Source::Target,
        index,
    }));
    // Secondary keys keep the order total so permuted inputs sort identically.
    merged.sort_by(|a, b| {
        a.value
            .total_cmp(&b.value)
            .then_with(|| source_rank(a.source).cmp(&source_rank(b.source)))
    });

    if merged.len() < 2 {
        return PeakMatches::default();
    }

    // gaps[k] is the candidate gap between merged[k] and merged[k + 1].
    let gaps: Vec<Option<f64>> = merged
        .windows(2)
        .map(|w| {
            let gap = w[1].value - w[0].value;
            if w[0].source != w[1].source && gap < tolerance {
                Some(gap)
            } else {
                None
            }
        })
        .collect();

    let mut out = PeakMatches::default();
    for (k, gap) in gaps.iter().enumerate() {
        let Some(gap) = gap else { continue };
        let beaten_left = k > 0 && gaps[k - 1].is_some_and(|left| left <= *gap);
        let beaten_right = gaps.get(k + 1).copied().flatten().is_some_and(|right| right < *gap);
        if beaten_left || beaten_right {
            continue;
        }

        let (a, b) = (merged[k], merged[k + 1]);
        let (obs, targ) = match a.source {
            Source::Observed => (a.index, b.index),
            Source::Target => (b.index, a.index),
        };
        out.observed.push(obs);
        out.targets.push(targ);
    }
    out
}

fn source_rank(source: Source) -> u8 {
    match source {
        Source::Observed => 0,
        Source::Target => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_pairs(m: &PeakMatches) -> Vec<(usize, usize)> {
        let mut pairs: Vec<_> = m.iter().collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_no_match() {
        let m = match_peaks(&[100.0], &[101.0], 0.1);
        assert!(m.is_empty());
        assert!(match_peaks(&[], &[1.0], 0.1).is_empty());
    }

    #[test]
    fn test_same_source_neighbors_never_match() {
        let m = match_peaks(&[100.0, 100.001], &[], 0.1);
        assert!(m.is_empty());
    }

    #[test]
    fn test_tighter_neighbor_wins() {
        // T0 -- O0 - T1 : O0 is closer to T1
        let m = match_peaks(&[100.05], &[100.0, 100.06], 0.1);
        assert_eq!(sorted_pairs(&m), vec![(0, 1)]);
    }

    #[test]
    fn test_tie_goes_to_lower_pair() {
        // O0 -- T0 -- O1 with equal gaps: only one observed peak may take T0.
        let m = match_peaks(&[99.5, 100.5], &[100.0], 1.0);
        assert_eq!(sorted_pairs(&m), vec![(0, 0)]);
    }

    #[test]
    fn test_chain_middle_pair_wins() {
        // O0 -(3)- T0 -(1)- O1 -(2)- T1
        let m = match_peaks(&[0.0, 4.0], &[3.0, 6.0], 5.0);
        assert_eq!(sorted_pairs(&m), vec![(1, 0)]);
    }

    #[test]
    fn test_outer_pairs_survive_loose_middle() {
        // O0 -(1)- T0 -(2)- O1 -(1)- T1
        let m = match_peaks(&[0.0, 3.0], &[1.0, 4.0], 5.0);
        assert_eq!(sorted_pairs(&m), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_tolerance_is_exclusive() {
        let m = match_peaks(&[100.0], &[100.5], 0.5);
        assert!(m.is_empty());
    }

    #[test]
    fn test_non_candidate_neighbor_does_not_suppress() {
        // O0 -(0.05)- T0 -(0.01)- T1 : T0-T1 is same-source, not a competitor.
        let m = match_peaks(&[100.0], &[100.05, 100.06], 0.1);
        assert_eq!(sorted_pairs(&m), vec![(0, 0)]);
    }
}
