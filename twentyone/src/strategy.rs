use crate::counter::Counter;
use crate::dealer::{DealerProbs, DealerProbsTable};
use crate::expectation::ExpectationTable;
use crate::hand::Hand;
use crate::split::calculate_split_expectation;
use crate::statetable::HandState;
use crate::{Move, Rule};

/// Everything needed to play out any player hand against one dealer up
/// card: the per-state stand/hit/double expectations plus the split
/// expectation for every pair rank. The dealer distribution behind it is
/// conditioned on the dealer not holding a natural.
#[derive(Debug, Clone)]
pub struct SolutionForUpCard {
    dealer_up_card: u8,
    expectations: ExpectationTable,
    ex_split: [f64; 10],
}

impl SolutionForUpCard {
    pub fn calculate<C: Counter + ?Sized>(
        dealer_up_card: u8,
        counter: &C,
        rule: &Rule,
    ) -> SolutionForUpCard {
        let dealer_table = DealerProbsTable::calculate(counter, rule.dealer_hits_soft_17);
        SolutionForUpCard::with_dealer_probs(
            dealer_up_card,
            dealer_table.up_card(dealer_up_card),
            counter,
            rule,
        )
    }

    pub fn with_dealer_probs<C: Counter + ?Sized>(
        dealer_up_card: u8,
        dealer_probs: &DealerProbs,
        counter: &C,
        rule: &Rule,
    ) -> SolutionForUpCard {
        let expectations = ExpectationTable::calculate(dealer_probs, counter);
        let ex_split = std::array::from_fn(|i| {
            calculate_split_expectation(i as u8 + 2, &expectations, counter, rule)
        });
        SolutionForUpCard {
            dealer_up_card,
            expectations,
            ex_split,
        }
    }

    pub fn dealer_up_card(&self) -> u8 {
        self.dealer_up_card
    }

    pub fn expectations(&self) -> &ExpectationTable {
        &self.expectations
    }

    pub fn split_expectation(&self, pair_rank: u8) -> f64 {
        assert!(
            (2..=11).contains(&pair_rank),
            "Invalid pair rank! It must be in [2, 11]"
        );
        self.ex_split[(pair_rank - 2) as usize]
    }

    /// Best expectation of a freshly dealt two-card hand, doubling and
    /// splitting included where the rule admits them.
    pub fn max_expectation(&self, state: &HandState, pair_rank: Option<u8>, rule: &Rule) -> f64 {
        let mut ex = self
            .expectations
            .stand(state)
            .max(self.expectations.hit(state));
        if rule.double_allowed(state.value(), state.is_soft()) {
            ex = ex.max(self.expectations.double(state));
        }
        if let Some(rank) = pair_rank {
            ex = ex.max(self.split_expectation(rank));
        }
        ex
    }

    /// The expectation-maximizing move for a hand in play. Ties resolve in
    /// favor of the more committal move: doubling over hitting, hitting
    /// over splitting, splitting over standing.
    ///
    /// `from_split` marks hands produced by a split, which changes what the
    /// house permits: split aces freeze unless they may be hit, doubling
    /// needs the double-after-split rule, and resplitting aces has its own
    /// switch. `splits_remaining` is the unused part of the resplit budget.
    pub fn resolve_move(
        &self,
        hand: &Hand,
        rule: &Rule,
        splits_remaining: u8,
        from_split: bool,
    ) -> Move {
        assert!(!hand.is_bust(), "A bust hand has no move to make");
        if hand.is_blackjack() && !from_split {
            return Move::Stand;
        }
        let state = hand.state();

        let frozen_split_aces = from_split && hand.cards()[0] == 11 && !rule.hit_split_aces;
        let can_hit = !frozen_split_aces;
        let can_double = hand.number_of_cards() == 2
            && can_hit
            && (!from_split || rule.double_after_split)
            && rule.double_allowed(state.value(), state.is_soft());
        let split_rank = hand
            .pair_rank()
            .filter(|&rank| splits_remaining > 0 && (!from_split || rank != 11 || rule.resplit_aces));

        let mut candidates: Vec<(f64, Move)> = Vec::with_capacity(4);
        if can_double {
            candidates.push((self.expectations.double(&state), Move::Double));
        }
        if can_hit {
            candidates.push((self.expectations.hit(&state), Move::Hit));
        }
        if let Some(rank) = split_rank {
            candidates.push((self.split_expectation(rank), Move::Split));
        }
        candidates.push((self.expectations.stand(&state), Move::Stand));

        let mut best = candidates[0];
        for &candidate in &candidates[1..] {
            if candidate.0 > best.0 {
                best = candidate;
            }
        }
        best.1
    }

    /// Whether giving up half the bet beats playing the hand out. Late
    /// surrender compares against the post-peek expectations as they are.
    /// Early surrender is offered before the dealer checks for a natural,
    /// so the expectation is deconditioned against the natural first.
    pub fn should_surrender<C: Counter + ?Sized>(
        &self,
        hand: &Hand,
        counter: &C,
        rule: &Rule,
        early: bool,
    ) -> bool {
        let pair_rank = if rule.resplit_limit > 0 {
            hand.pair_rank()
        } else {
            None
        };
        let mut ex = self.max_expectation(&hand.state(), pair_rank, rule);

        if early {
            if hand.is_blackjack() {
                return false;
            }
            let p_natural = match self.dealer_up_card {
                11 => counter.probability(10),
                10 => counter.probability(11),
                _ => 0.0,
            };
            ex = ex * (1.0 - p_natural) - p_natural;
        }
        ex < -0.5
    }
}

/// Solutions for all ten dealer up cards over one shoe composition, sharing
/// a single dealer relaxation.
#[derive(Debug, Clone)]
pub struct SolutionForShoe {
    solutions: [SolutionForUpCard; 10],
}

impl SolutionForShoe {
    pub fn calculate<C: Counter + ?Sized>(counter: &C, rule: &Rule) -> SolutionForShoe {
        let dealer_table = DealerProbsTable::calculate(counter, rule.dealer_hits_soft_17);
        let solutions = std::array::from_fn(|i| {
            let up_card = i as u8 + 2;
            SolutionForUpCard::with_dealer_probs(
                up_card,
                dealer_table.up_card(up_card),
                counter,
                rule,
            )
        });
        SolutionForShoe { solutions }
    }

    pub fn for_up_card(&self, dealer_up_card: u8) -> &SolutionForUpCard {
        assert!(
            (2..=11).contains(&dealer_up_card),
            "Invalid dealer up card! It must be in [2, 11]"
        );
        &self.solutions[(dealer_up_card - 2) as usize]
    }
}
