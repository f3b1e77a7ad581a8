/// Differences smaller than this are treated as flat.
pub const LOCAL_MAXIMA_EPSILON: f64 = 1e-10;

/// Indices of the local maxima of an intensity trace.
///
/// An interior point is a maximum when it rises by more than
/// [`LOCAL_MAXIMA_EPSILON`] from its left neighbor and drops by more than it
/// to its right neighbor, so plateaus yield no maximum. Endpoints only need
/// to be strictly greater than their single neighbor.
///
/// ```
/// use isoquant::peaks::local_maxima;
///
/// assert_eq!(local_maxima(&[0.0, 2.0, 1.0, 3.0]), vec![1, 3]);
/// ```
pub fn local_maxima(y: &[f64]) -> Vec<usize> {
    let n = y.len();
    if n < 2 {
        return Vec::new();
    }

    let mut out = Vec::new();
    if y[0] > y[1] {
        out.push(0);
    }
    for i in 1..(n - 1) {
        let rise = y[i] - y[i - 1];
        let fall = y[i + 1] - y[i];
        if rise > LOCAL_MAXIMA_EPSILON && fall < -LOCAL_MAXIMA_EPSILON {
            out.push(i);
        }
    }
    if y[n - 1] > y[n - 2] {
        out.push(n - 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input() {
        assert!(local_maxima(&[]).is_empty());
        assert!(local_maxima(&[5.0]).is_empty());
    }

    #[test]
    fn test_two_points() {
        assert_eq!(local_maxima(&[2.0, 1.0]), vec![0]);
        assert_eq!(local_maxima(&[1.0, 2.0]), vec![1]);
        assert!(local_maxima(&[1.0, 1.0]).is_empty());
    }

    #[test]
    fn test_plateau_is_not_a_maximum() {
        assert!(local_maxima(&[0.0, 1.0, 1.0, 0.0]).is_empty());
    }

    #[test]
    fn test_noise_below_epsilon_ignored() {
        let y = [0.0, 1.0, 1.0 + 1e-12, 0.0];
        assert!(local_maxima(&y).is_empty());
    }

    #[test]
    fn test_multiple_peaks() {
        let y = [0.0, 5.0, 0.0, 0.0, 3.0, 1.0, 4.0, 0.0];
        assert_eq!(local_maxima(&y), vec![1, 4, 6]);
    }
}
