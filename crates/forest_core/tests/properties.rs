//! Property-based tests for partitioning, threshold sampling and forest chunking.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use arbor_forest_core::{
    goes_left, partition, partition_indices, partition_sizes, select_thresholds, DatasetIndex,
};

/// Finite responses with plenty of ties
fn arb_response() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-5i32..5).prop_map(f64::from),
        prop::num::f64::NORMAL.prop_map(|x| x.clamp(-1e6, 1e6)),
    ]
}

proptest! {
    #[test]
    fn partition_is_complete_and_disjoint(
        responses in prop_vec(arb_response(), 0..64),
        threshold in arb_response(),
        rows in prop_vec(0usize..64, 0..64),
    ) {
        let data: Vec<f64> = responses;
        prop_assume!(!data.is_empty());
        let indices: Vec<usize> = rows.into_iter().map(|r| r % data.len()).collect();
        let index = DatasetIndex::new(&data, indices.clone()).unwrap();
        let per_position: Vec<f64> = index.points().copied().collect();

        let (left, right) = partition(&index, &per_position, threshold).unwrap();

        prop_assert_eq!(left.len() + right.len(), index.len());
        prop_assert!(left.points().all(|&r| goes_left(r, threshold)));
        prop_assert!(right.points().all(|&r| !goes_left(r, threshold)));

        let mut recombined: Vec<usize> = left.indices().iter().chain(right.indices()).copied().collect();
        let mut original = indices;
        recombined.sort_unstable();
        original.sort_unstable();
        prop_assert_eq!(recombined, original);
    }

    #[test]
    fn thresholds_lie_within_response_range(
        responses in prop_vec(arb_response(), 2..80),
        count in 1usize..16,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let thresholds = select_thresholds(&responses, count, &mut rng);

        let min = responses.iter().copied().fold(f64::INFINITY, f64::min);
        let max = responses.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if min == max {
            prop_assert!(thresholds.is_empty());
        }
        prop_assert!(thresholds.len() <= count);
        // One ulp of slack for the interpolation
        let slack = 1e-9 * max.abs().max(min.abs()).max(1.0);
        prop_assert!(thresholds.iter().all(|t| *t >= min - slack && *t <= max + slack));
    }

    #[test]
    fn forest_chunks_are_balanced(n in 0usize..500, trees in 1usize..40) {
        let sizes = partition_sizes(n, trees);

        prop_assert_eq!(sizes.len(), trees);
        prop_assert_eq!(sizes.iter().sum::<usize>(), n);
        for (i, &size) in sizes.iter().enumerate() {
            let expected = n / trees + usize::from(i < n % trees);
            prop_assert_eq!(size, expected);
        }

        let shuffled: Vec<usize> = (0..n).rev().collect();
        let chunks = partition_indices(&shuffled, trees);
        let flattened: Vec<usize> = chunks.concat();
        prop_assert_eq!(flattened, shuffled);
    }
}

#[test]
fn identical_responses_have_no_thresholds() {
    let mut rng = StdRng::seed_from_u64(3);
    for n in [2, 5, 50] {
        assert!(select_thresholds(&vec![1.25; n], 10, &mut rng).is_empty());
    }
}
