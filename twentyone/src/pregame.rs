use crate::counter::{Counter, Removed};
use crate::statetable::HandState;
use crate::strategy::{SolutionForShoe, SolutionForUpCard};
use crate::{Rule, SurrenderPolicy};

/// Expected value of the next round for a bet of 1, before any card is
/// dealt, assuming expectation-maximizing play. This is the number a bettor
/// sizes the wager with.
///
/// The outer sum runs over dealer up cards, the inner one over unordered
/// player starting hands with the second card conditioned on the first.
/// The counter is only borrowed for scoped removals and is returned to its
/// starting composition.
pub fn pre_deal_ev<C: Counter + ?Sized>(counter: &mut C, rule: &Rule) -> f64 {
    let shoe = SolutionForShoe::calculate(&*counter, rule);
    let mut total = 0.0;
    for face in 2..=11 {
        let p_face = counter.probability(face);
        if p_face == 0.0 {
            continue;
        }
        total += p_face * up_card_ev(shoe.for_up_card(face), counter, rule);
    }
    total
}

// One dealer up card: enumerate the player's starting hands, price each at
// its best expectation, and weave in naturals and surrender. Naturals pay
// immediately; the rest of the mass is conditioned on the dealer not
// holding one, then the dealer's natural claims its own share.
fn up_card_ev<C: Counter + ?Sized>(
    solution: &SolutionForUpCard,
    counter: &mut C,
    rule: &Rule,
) -> f64 {
    let p_natural = match solution.dealer_up_card() {
        11 => counter.probability(10),
        10 => counter.probability(11),
        _ => 0.0,
    };

    let mut hand_ev = 0.0;
    let mut p_early_surrender = 0.0;
    let mut p_player_blackjack = 0.0;
    for first in 2..=11 {
        let p_first = counter.probability(first);
        if p_first == 0.0 {
            continue;
        }
        let removed = Removed::new(counter, first);
        for second in first..=11 {
            let mut p_hand = p_first * removed.probability(second);
            if p_hand == 0.0 {
                continue;
            }
            let pair = first == second;
            if !pair {
                // Either order deals this hand.
                p_hand *= 2.0;
            }
            if first + second == 21 {
                hand_ev += p_hand * rule.payout_blackjack;
                p_player_blackjack = p_hand;
                continue;
            }

            let state = HandState::of_two_cards(first, second);
            let pair_rank = if pair && rule.resplit_limit > 0 {
                Some(first)
            } else {
                None
            };
            let mut ev = solution.max_expectation(&state, pair_rank, rule);
            match rule.surrender {
                SurrenderPolicy::Early => {
                    let against_peek = ev * (1.0 - p_natural) - p_natural;
                    if against_peek < -0.5 {
                        p_early_surrender += p_hand;
                        continue;
                    }
                }
                SurrenderPolicy::Late => ev = ev.max(-0.5),
                SurrenderPolicy::None => {}
            }
            hand_ev += p_hand * ev;
        }
    }

    hand_ev *= 1.0 - p_natural;
    hand_ev += p_natural * p_player_blackjack;
    hand_ev -= p_natural * (1.0 - p_player_blackjack);

    if rule.surrender == SurrenderPolicy::Early {
        hand_ev = hand_ev * (1.0 - p_early_surrender) + p_early_surrender * -0.5;
    }
    hand_ev
}
