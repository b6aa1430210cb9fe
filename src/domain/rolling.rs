//! Trailing-window extremes over sparse level arrays.
//!
//! Windows are `[i + 1 - lookback, i]` inclusive. Absent entries are skipped;
//! the result is `None` only when the whole window is absent. Monotonic deque,
//! amortized O(1) per bar.

use std::collections::VecDeque;

pub fn rolling_max(values: &[Option<f64>], lookback: usize) -> Vec<Option<f64>> {
    rolling_extreme(values, lookback, |candidate, kept| candidate >= kept)
}

pub fn rolling_min(values: &[Option<f64>], lookback: usize) -> Vec<Option<f64>> {
    rolling_extreme(values, lookback, |candidate, kept| candidate <= kept)
}

/// `dominates(new, old)` says whether `new` makes `old` useless for every
/// later window.
fn rolling_extreme(
    values: &[Option<f64>],
    lookback: usize,
    dominates: impl Fn(f64, f64) -> bool,
) -> Vec<Option<f64>> {
    let lookback = lookback.max(1);
    let mut window: VecDeque<(usize, f64)> = VecDeque::new();
    let mut out = Vec::with_capacity(values.len());

    for (i, value) in values.iter().enumerate() {
        if let Some(v) = *value {
            while window.back().is_some_and(|&(_, kept)| dominates(v, kept)) {
                window.pop_back();
            }
            window.push_back((i, v));
        }
        while window.front().is_some_and(|&(idx, _)| i - idx >= lookback) {
            window.pop_front();
        }
        out.push(window.front().map(|&(_, v)| v));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_max(values: &[Option<f64>], lookback: usize) -> Vec<Option<f64>> {
        (0..values.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(lookback);
                values[start..=i]
                    .iter()
                    .flatten()
                    .copied()
                    .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            })
            .collect()
    }

    #[test]
    fn absent_until_first_value() {
        let values = [None, None, Some(5.0), None];
        assert_eq!(rolling_max(&values, 3), vec![None, None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn value_expires_after_lookback() {
        let values = [Some(5.0), None, None, None];
        assert_eq!(rolling_max(&values, 2), vec![Some(5.0), Some(5.0), None, None]);
    }

    #[test]
    fn max_tracks_larger_newer_value() {
        let values = [Some(3.0), Some(7.0), Some(4.0), None, None];
        assert_eq!(
            rolling_max(&values, 3),
            vec![Some(3.0), Some(7.0), Some(7.0), Some(7.0), Some(4.0)]
        );
    }

    #[test]
    fn min_tracks_smaller_value() {
        let values = [Some(3.0), Some(1.0), Some(4.0), None];
        assert_eq!(
            rolling_min(&values, 2),
            vec![Some(3.0), Some(1.0), Some(1.0), Some(4.0)]
        );
    }

    #[test]
    fn matches_naive_scan() {
        let values: Vec<Option<f64>> = (0..40)
            .map(|i| if i % 3 == 0 { Some(((i * 7) % 11) as f64) } else { None })
            .collect();
        for lookback in [1, 2, 5, 20] {
            assert_eq!(rolling_max(&values, lookback), naive_max(&values, lookback));
        }
    }

    #[test]
    fn lookback_larger_than_any_index() {
        let values = [Some(2.0), None, Some(1.0), None];
        assert_eq!(
            rolling_max(&values, usize::MAX),
            vec![Some(2.0), Some(2.0), Some(2.0), Some(2.0)]
        );
        assert_eq!(
            rolling_min(&values, usize::MAX),
            vec![Some(2.0), Some(2.0), Some(1.0), Some(1.0)]
        );
    }
}
