//! Quantile threshold sampling

use rand::Rng;

/// Draw up to `num_candidate_thresholds` split thresholds from `responses`.
///
/// With more responses than requested thresholds, `num_candidate_thresholds + 1`
/// quantile samples are drawn with replacement; otherwise every response is a
/// quantile sample. One threshold is drawn uniformly inside each gap between
/// adjacent sorted samples. An empty result means the responses cannot be
/// split (fewer than two of them, or all equal).
pub fn select_thresholds<R: Rng + ?Sized>(
    responses: &[f64],
    num_candidate_thresholds: usize,
    rng: &mut R,
) -> Vec<f64> {
    let n = responses.len();
    if n < 2 {
        return Vec::new();
    }

    let mut quantiles: Vec<f64> = if n > num_candidate_thresholds {
        (0..=num_candidate_thresholds)
            .map(|_| responses[rng.gen_range(0..n)])
            .collect()
    } else {
        responses.to_vec()
    };

    quantiles.sort_by(|a, b| a.total_cmp(b));

    match (quantiles.first(), quantiles.last()) {
        (Some(min), Some(max)) if min < max => {}
        _ => return Vec::new(),
    }

    quantiles
        .windows(2)
        .map(|pair| pair[0] + rng.gen::<f64>() * (pair[1] - pair[0]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_identical_responses_give_no_thresholds() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(select_thresholds(&[2.5; 10], 4, &mut rng).is_empty());
        assert!(select_thresholds(&[2.5; 3], 10, &mut rng).is_empty());
    }

    #[test]
    fn test_too_few_responses() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(select_thresholds(&[], 4, &mut rng).is_empty());
        assert!(select_thresholds(&[1.0], 4, &mut rng).is_empty());
    }

    #[test]
    fn test_small_input_uses_every_gap() {
        let mut rng = StdRng::seed_from_u64(7);
        let responses = [3.0, 1.0, 2.0, 4.0];
        let thresholds = select_thresholds(&responses, 10, &mut rng);

        assert_eq!(thresholds.len(), 3);
        for (i, t) in thresholds.iter().enumerate() {
            let lo = (i + 1) as f64;
            assert!(*t >= lo && *t <= lo + 1.0, "threshold {t} outside gap {i}");
        }
    }

    #[test]
    fn test_large_input_is_capped() {
        let mut rng = StdRng::seed_from_u64(11);
        let responses: Vec<f64> = (0..100).map(f64::from).collect();
        let thresholds = select_thresholds(&responses, 5, &mut rng);

        assert!(thresholds.len() <= 5);
        assert!(thresholds.iter().all(|t| (0.0..=99.0).contains(t)));
        assert!(thresholds.windows(2).all(|w| w[0] <= w[1]));
    }
}
