use crate::counter::Counter;
use crate::dealer::DealerProbs;
use crate::statetable::{HandState, StateTable};

/// Per-state expected values against one dealer up card, for an initial bet
/// of 1. Standing and hitting pay in [-1, 1]; doubling pays in [-2, 2].
#[derive(Debug, Clone)]
pub struct ExpectationTable {
    stand: StateTable<f64>,
    hit: StateTable<f64>,
    double: StateTable<f64>,
}

impl ExpectationTable {
    /// Backward induction over the abstract states. Standing compares the
    /// total against the dealer distribution directly. Hitting relaxes to a
    /// fixed point because a soft hand can harden into a state whose own
    /// hit expectation is still pending. Doubling draws exactly one card and
    /// then stands at doubled stakes.
    pub fn calculate<C: Counter + ?Sized>(
        dealer_probs: &DealerProbs,
        counter: &C,
    ) -> ExpectationTable {
        let mut stand: StateTable<f64> = StateTable::new();
        for state in HandState::all() {
            let ex = dealer_probs.p_worse_than_player(state.value())
                - dealer_probs.p_better_than_player(state.value());
            debug_assert!((-1.0..=1.0).contains(&ex));
            stand.set(&state, ex);
        }

        let mut hit: StateTable<f64> = StateTable::new();
        loop {
            let mut resolved_in_pass = 0;
            let mut unresolved = 0;
            for state in HandState::all() {
                if hit.contains_state(&state) {
                    continue;
                }
                let ready = (2..=11).all(|rank| {
                    if counter.probability(rank) == 0.0 {
                        return true;
                    }
                    match state.hit(rank) {
                        Some(next) => hit.contains_state(&next),
                        None => true,
                    }
                });
                if !ready {
                    unresolved += 1;
                    continue;
                }
                let mut ex = 0.0;
                for rank in 2..=11 {
                    let p = counter.probability(rank);
                    if p == 0.0 {
                        continue;
                    }
                    match state.hit(rank) {
                        Some(next) => ex += p * hit[&next].max(stand[&next]),
                        None => ex -= p,
                    }
                }
                debug_assert!((-1.0..=1.0).contains(&ex));
                hit.set(&state, ex);
                resolved_in_pass += 1;
            }
            if unresolved == 0 {
                break;
            }
            assert!(
                resolved_in_pass > 0,
                "Hit expectation relaxation stalled with {} states unresolved",
                unresolved
            );
        }

        let mut double: StateTable<f64> = StateTable::new();
        for state in HandState::all() {
            let mut ex = 0.0;
            for rank in 2..=11 {
                let p = counter.probability(rank);
                if p == 0.0 {
                    continue;
                }
                match state.hit(rank) {
                    Some(next) => ex += 2.0 * p * stand[&next],
                    None => ex -= 2.0 * p,
                }
            }
            debug_assert!((-2.0..=2.0).contains(&ex));
            double.set(&state, ex);
        }

        ExpectationTable { stand, hit, double }
    }

    pub fn stand(&self, state: &HandState) -> f64 {
        self.stand[state]
    }

    pub fn hit(&self, state: &HandState) -> f64 {
        self.hit[state]
    }

    pub fn double(&self, state: &HandState) -> f64 {
        self.double[state]
    }

    /// Best of standing and hitting. This is the value of a hand the player
    /// may no longer double or split.
    pub fn best_of_stand_hit(&self, state: &HandState) -> f64 {
        self.stand[state].max(self.hit[state])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::PerfectCounter;
    use crate::dealer::DealerProbsTable;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn table_for_up_card(up_card: u8) -> ExpectationTable {
        let counter = PerfectCounter::new(6);
        let dealer = DealerProbsTable::calculate(&counter, false);
        ExpectationTable::calculate(dealer.up_card(up_card), &counter)
    }

    #[test]
    fn hitting_twenty_one_always_busts() {
        let table = table_for_up_card(10);
        assert!((table.hit(&HandState::new(21, false)) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn low_totals_prefer_hitting() {
        let table = table_for_up_card(10);
        // Drawing to a hard 5 cannot bust and standing on it cannot win
        // without a dealer bust.
        for value in 4..=11 {
            let state = HandState::new(value, false);
            assert!(table.hit(&state) > table.stand(&state));
        }
    }

    #[test]
    fn soft_hands_never_bust_on_one_card() {
        let table = table_for_up_card(6);
        // One draw on a soft total at worst hardens, so the hit expectation
        // is bounded by the worst reachable stand/hit value, never -1.
        for value in 12..=17 {
            assert!(table.hit(&HandState::new(value, true)) > -1.0 + 1e-9);
        }
    }

    #[test]
    fn doubling_doubles_the_stakes() {
        let table = table_for_up_card(6);
        // Doubling a hard 20 draws one card and almost always lands worse,
        // while doubling an 11 is a famous favorite.
        assert!(table.double(&HandState::new(11, false)) > table.hit(&HandState::new(11, false)));
        assert!(table.double(&HandState::new(20, false)) < table.stand(&HandState::new(20, false)));
    }

    #[test]
    fn stand_expectation_matches_simulation() {
        let counter = PerfectCounter::new(200);
        let dealer = DealerProbsTable::calculate(&counter, false);
        let table = ExpectationTable::calculate(dealer.up_card(9), &counter);
        let exact = table.stand(&HandState::new(18, false));

        let mut rng = StdRng::seed_from_u64(0xd00d);
        let draw = |rng: &mut StdRng| -> u8 {
            let face = rng.gen_range(1..=13);
            match face {
                1 => 11,
                11..=13 => 10,
                f => f,
            }
        };
        let trials = 20_000;
        let mut payoff_sum = 0.0;
        for _ in 0..trials {
            let mut hand = crate::hand::Hand::new(&[9, draw(&mut rng)]);
            while !hand.is_bust() && hand.must_hit(false) {
                hand.add(draw(&mut rng));
            }
            payoff_sum += if hand.is_bust() || hand.value() < 18 {
                1.0
            } else if hand.value() == 18 {
                0.0
            } else {
                -1.0
            };
        }
        let empirical = payoff_sum / trials as f64;
        assert!(
            (empirical - exact).abs() < 0.03,
            "simulated {} vs computed {}",
            empirical,
            exact
        );
    }
}
