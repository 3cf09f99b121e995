use crate::counter::Counter;
use crate::expectation::ExpectationTable;
use crate::statetable::HandState;
use crate::Rule;

/// Expected value of splitting a pair of `pair_rank`, for an initial bet of
/// 1 per hand. Returns the total over all resulting hands, so a plain split
/// lives in [-2, 2] and resplits widen the range further.
///
/// Each post-split hand starts from the one-card state of the kept card and
/// receives one card. The hand is then played for its best available
/// expectation: split aces stand unless the house lets them be hit, and
/// doubling needs both the double-after-split rule and an eligible total.
/// Drawing the pair rank again opens a resplit, which is folded in by
/// decomposing the resplit budget into a binary tree of hands.
pub fn calculate_split_expectation<C: Counter + ?Sized>(
    pair_rank: u8,
    expectations: &ExpectationTable,
    counter: &C,
    rule: &Rule,
) -> f64 {
    let one_card = HandState::new(pair_rank, pair_rank == 11);
    let can_hit = rule.hit_split_aces || pair_rank != 11;

    let mut split_ev = 0.0;
    let mut split_card_ev = 0.0;
    for rank in 2..=11 {
        let p = counter.probability(rank);
        // A second card on one card never busts.
        let next = match one_card.hit(rank) {
            Some(next) => next,
            None => panic!("Impossible to reach"),
        };
        let mut best = expectations.stand(&next);
        if can_hit {
            best = best.max(expectations.hit(&next));
            if rule.double_after_split && rule.double_allowed(next.value(), next.is_soft()) {
                best = best.max(expectations.double(&next));
            }
        }
        if rank == pair_rank {
            split_card_ev = best;
        } else {
            split_ev += 2.0 * p * best;
        }
    }

    let resplit_prob = counter.probability(pair_rank);
    let terminal_split_ev = split_ev + 2.0 * resplit_prob * split_card_ev;

    let can_resplit = rule.resplit_limit > 1 && (rule.resplit_aces || pair_rank != 11);
    if !(can_resplit && terminal_split_ev > split_card_ev) {
        return terminal_split_ev;
    }

    // Decompose the resplit budget into a full binary tree: the bottom level
    // holds hands that may still resplit (worth the terminal value) and the
    // hands beyond the budget are frozen at the single-hand value. Folding
    // one level combines two subtrees reached through one more pair draw.
    let mut num_splits = rule.resplit_limit as usize;
    let mut split_level = 1;
    while num_splits > split_level {
        num_splits -= split_level;
        split_level *= 2;
    }
    let mut values = vec![terminal_split_ev; num_splits];
    values.resize(split_level, split_card_ev);
    while values.len() > 1 {
        values = values
            .chunks_exact(2)
            .map(|pair| split_ev + resplit_prob * (pair[0] + pair[1]))
            .collect();
    }
    let folded = values[0];
    assert!(
        folded >= terminal_split_ev - 1e-9,
        "Resplitting must never be worth less than stopping at one split"
    );
    folded
}
