//! Rank ordering, fallback scores and `top_k` truncation.

/// Sort `(index, score)` pairs by descending score. Ties keep input order.
pub fn rank_descending(mut scores: Vec<(usize, f64)>) -> Vec<(usize, f64)> {
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    scores
}

/// Scores for when no model is available: input order, strictly decreasing.
///
/// Steps of 0.01 while that keeps every score above zero, otherwise `1/n`.
pub fn fallback_scores(count: usize) -> Vec<(usize, f64)> {
    if count == 0 {
        return Vec::new();
    }
    let step = (1.0 / count as f64).min(0.01);
    (0..count).map(|i| (i, 1.0 - i as f64 * step)).collect()
}

/// Keep the first `top_k` items. Absent or non-positive `top_k` keeps all.
pub fn truncate_top_k<T>(mut items: Vec<T>, top_k: Option<i64>) -> Vec<T> {
    if let Some(k) = top_k.filter(|k| *k > 0) {
        items.truncate(usize::try_from(k).unwrap_or(usize::MAX));
    }
    items
}

/// Round to 6 decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending_is_stable() {
        let ranked = rank_descending(vec![(0, 0.2), (1, 0.9), (2, 0.2), (3, 0.5)]);
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_fallback_scores_strictly_decreasing() {
        let small = fallback_scores(3);
        assert_eq!(small[0], (0, 1.0));
        assert!((small[2].1 - 0.98).abs() < 1e-12);

        let large = fallback_scores(250);
        assert!(large.windows(2).all(|w| w[0].1 > w[1].1));
        assert!(large.iter().all(|(_, s)| *s > 0.0 && *s <= 1.0));
        assert!(large
            .iter()
            .map(|(_, s)| round_score(*s))
            .collect::<Vec<_>>()
            .windows(2)
            .all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_fallback_scores_empty() {
        assert!(fallback_scores(0).is_empty());
    }

    #[test]
    fn test_truncate_never_grows() {
        let items = vec![1, 2, 3];
        assert_eq!(truncate_top_k(items.clone(), Some(2)), vec![1, 2]);
        assert_eq!(truncate_top_k(items.clone(), Some(10)), items);
        assert_eq!(truncate_top_k(items.clone(), Some(0)), items);
        assert_eq!(truncate_top_k(items.clone(), Some(-4)), items);
        assert_eq!(truncate_top_k(items.clone(), None), items);
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123_456_789), 0.123457);
        assert_eq!(round_score(1.0), 1.0);
    }
}
