//! Property tests for vote tabulation.

use proptest::prelude::*;

use cw_core::{Cast, CastId, Vote, leading_candidate, tally_votes, top_candidates};

const NAMES: [&str; 6] = ["ada", "grace", "alan", "edsger", "barbara", "donald"];

fn roster() -> Cast {
    Cast::new(NAMES.iter().map(|n| CastId::new(*n))).unwrap()
}

fn arb_votes() -> impl Strategy<Value = Vec<Vote>> {
    prop::collection::vec((0..NAMES.len(), 0..NAMES.len()), 0..40).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(v, t)| Vote::new(NAMES[v], NAMES[t]))
            .collect()
    })
}

proptest! {
    #[test]
    fn tally_sum_equals_ballot_count(votes in arb_votes()) {
        let counts = tally_votes(&votes);
        let sum: u32 = counts.values().sum();
        prop_assert_eq!(sum as usize, votes.len());
    }

    #[test]
    fn leading_is_a_top_candidate(votes in arb_votes()) {
        let cast = roster();
        let counts = tally_votes(&votes);
        let top = top_candidates(&counts, &cast);
        match leading_candidate(&counts, &cast) {
            Some(leading) => {
                prop_assert!(top.contains(&leading.id));
                // The rule: lowest cast-order index among the tied maximum.
                prop_assert_eq!(&leading.id, &top[0]);
                prop_assert_eq!(leading.count, *counts.values().max().unwrap());
            }
            None => prop_assert!(votes.is_empty()),
        }
    }

    #[test]
    fn tally_is_order_independent(votes in arb_votes()) {
        let mut reversed = votes.clone();
        reversed.reverse();
        prop_assert_eq!(tally_votes(&votes), tally_votes(&reversed));
    }
}
