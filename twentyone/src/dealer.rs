use crate::counter::Counter;
use crate::statetable::{HandState, StateTable};
use log::debug;

/// Distribution over the dealer's terminal outcomes: bust plus the standing
/// totals 17 through 21. Index 0 is bust and index `v - 16` is total `v`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DealerProbs {
    probs: [f64; 6],
}

impl DealerProbs {
    /// A point mass on a standing total.
    fn of_terminal(value: u8) -> DealerProbs {
        debug_assert!((17..=21).contains(&value));
        let mut probs = [0.0; 6];
        probs[(value - 16) as usize] = 1.0;
        DealerProbs { probs }
    }

    fn add_bust(&mut self, p: f64) {
        self.probs[0] += p;
    }

    fn add_assign_with_p(&mut self, other: &DealerProbs, p: f64) {
        for (slot, &x) in self.probs.iter_mut().zip(other.probs.iter()) {
            *slot += p * x;
        }
    }

    pub fn p_bust(&self) -> f64 {
        self.probs[0]
    }

    pub fn p_final(&self, value: u8) -> f64 {
        debug_assert!((17..=21).contains(&value));
        self.probs[(value - 16) as usize]
    }

    pub fn total(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Probability the dealer finishes below the player's standing total,
    /// busts included.
    pub fn p_worse_than_player(&self, player_value: u8) -> f64 {
        debug_assert!(player_value <= 21);
        let mut p = self.probs[0];
        for value in 17..=21 {
            if value < player_value {
                p += self.probs[(value - 16) as usize];
            }
        }
        p
    }

    /// Probability the dealer finishes above the player's standing total.
    pub fn p_better_than_player(&self, player_value: u8) -> f64 {
        debug_assert!(player_value <= 21);
        let mut p = 0.0;
        for value in 17..=21 {
            if value > player_value {
                p += self.probs[(value - 16) as usize];
            }
        }
        p
    }

    // Removes the natural's mass from the 21 bucket and renormalizes, so the
    // distribution is conditioned on the dealer not holding a natural.
    fn condition_on_no_natural(&mut self, p_natural: f64) {
        assert!(
            p_natural < 1.0,
            "The dealer holds a natural with certainty; nothing remains to condition on"
        );
        self.probs[5] -= p_natural;
        debug_assert!(self.probs[5] > -1e-12);
        self.probs[5] = self.probs[5].max(0.0);
        for slot in self.probs.iter_mut() {
            *slot /= 1.0 - p_natural;
        }
    }
}

/// Dealer terminal-outcome distributions for every abstract dealer state,
/// computed against a fixed shoe composition.
#[derive(Debug, Clone)]
pub struct DealerProbsTable {
    table: StateTable<DealerProbs>,
}

impl DealerProbsTable {
    /// Solves the dealer's drawing process for the composition described by
    /// `counter`. States 17 through 21 are terminal, soft 17 excepted when
    /// the dealer hits soft 17. Everything else relaxes to a fixed point:
    /// a state resolves once all of its reachable successors have.
    ///
    /// The distributions for the ten and ace entries are conditioned on the
    /// dealer not holding a natural, since a natural ends the round before
    /// the dealer ever draws.
    pub fn calculate<C: Counter + ?Sized>(counter: &C, hits_soft_17: bool) -> DealerProbsTable {
        let mut table: StateTable<DealerProbs> = StateTable::new();

        for value in 17..=21 {
            table.set(&HandState::new(value, false), DealerProbs::of_terminal(value));
            if !(value == 17 && hits_soft_17) {
                table.set(&HandState::new(value, true), DealerProbs::of_terminal(value));
            }
        }

        let mut passes = 0;
        loop {
            let mut resolved_in_pass = 0;
            let mut unresolved = 0;
            for state in HandState::all() {
                if table.contains_state(&state) {
                    continue;
                }
                let ready = (2..=11).all(|rank| {
                    if counter.probability(rank) == 0.0 {
                        return true;
                    }
                    match state.hit(rank) {
                        Some(next) => table.contains_state(&next),
                        None => true,
                    }
                });
                if !ready {
                    unresolved += 1;
                    continue;
                }
                let mut probs = DealerProbs::default();
                for rank in 2..=11 {
                    let p = counter.probability(rank);
                    if p == 0.0 {
                        continue;
                    }
                    match state.hit(rank) {
                        Some(next) => probs.add_assign_with_p(&table[&next], p),
                        None => probs.add_bust(p),
                    }
                }
                table.set(&state, probs);
                resolved_in_pass += 1;
            }
            passes += 1;
            if unresolved == 0 {
                break;
            }
            // Every draw strictly raises value minus the soft discount, so
            // the dependency graph is acyclic and progress is guaranteed.
            assert!(
                resolved_in_pass > 0,
                "Dealer relaxation stalled with {} states unresolved",
                unresolved
            );
        }
        debug!("Dealer outcome relaxation converged in {} passes", passes);

        // Up card ten: the hole card being an ace makes a natural. Up card
        // ace: a ten-valued hole card does.
        if counter.probability(11) > 0.0 || counter.probability(10) > 0.0 {
            if let Some(probs) = table.get_mut(&HandState::new(10, false)) {
                probs.condition_on_no_natural(counter.probability(11));
            }
            if let Some(probs) = table.get_mut(&HandState::new(11, true)) {
                probs.condition_on_no_natural(counter.probability(10));
            }
        }

        for face in 2..=11 {
            let total = table[&Self::up_card_state(face)].total();
            assert!(
                (total - 1.0).abs() < 1e-6,
                "Dealer outcome distribution for up card {} sums to {}",
                face,
                total
            );
        }

        DealerProbsTable { table }
    }

    /// The distribution for a dealer showing `face` as the up card.
    pub fn up_card(&self, face: u8) -> &DealerProbs {
        &self.table[&Self::up_card_state(face)]
    }

    fn up_card_state(face: u8) -> HandState {
        assert!(
            (2..=11).contains(&face),
            "Invalid dealer up card! It must be in [2, 11]"
        );
        HandState::new(face, face == 11)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::PerfectCounter;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Plays out one dealer hand from the up card against a fresh infinite
    // shoe approximation (sampling with replacement from a uniform deck).
    // Returns 0 for bust, otherwise the standing total. Hands that would be
    // naturals are rejected by the caller where required.
    fn simulate_dealer(rng: &mut StdRng, up_card: u8, hits_soft_17: bool) -> (u8, u8) {
        let draw = |rng: &mut StdRng| -> u8 {
            let face = rng.gen_range(1..=13);
            match face {
                1 => 11,
                11..=13 => 10,
                f => f,
            }
        };
        let hole = draw(rng);
        let mut hand = crate::hand::Hand::new(&[up_card, hole]);
        while !hand.is_bust() && hand.must_hit(hits_soft_17) {
            hand.add(draw(rng));
        }
        let outcome = if hand.is_bust() { 0 } else { hand.value() };
        (outcome, hole)
    }

    fn assert_matches_simulation(up_card: u8, hits_soft_17: bool) {
        // A large shoe approximates drawing with replacement.
        let counter = PerfectCounter::new(200);
        let table = DealerProbsTable::calculate(&counter, hits_soft_17);
        let probs = table.up_card(up_card);

        let mut rng = StdRng::seed_from_u64(0x5eed + up_card as u64);
        let trials = 20_000;
        let mut outcomes = [0u32; 6];
        let mut accepted = 0;
        while accepted < trials {
            let (outcome, hole) = simulate_dealer(&mut rng, up_card, hits_soft_17);
            // The computed distribution conditions on no natural.
            let natural = (up_card == 11 && hole == 10) || (up_card == 10 && hole == 11);
            if natural {
                continue;
            }
            let index = if outcome == 0 { 0 } else { (outcome - 16) as usize };
            outcomes[index] += 1;
            accepted += 1;
        }

        for (index, &count) in outcomes.iter().enumerate() {
            let empirical = count as f64 / trials as f64;
            let exact = probs.probs[index];
            assert!(
                (empirical - exact).abs() < 0.02,
                "up card {} bucket {}: simulated {} vs computed {}",
                up_card,
                index,
                empirical,
                exact
            );
        }
    }

    #[test]
    fn distribution_matches_simulation_stand_soft_17() {
        for up_card in [2, 6, 10, 11] {
            assert_matches_simulation(up_card, false);
        }
    }

    #[test]
    fn distribution_matches_simulation_hit_soft_17() {
        for up_card in [6, 11] {
            assert_matches_simulation(up_card, true);
        }
    }

    #[test]
    fn all_up_cards_sum_to_one() {
        let counter = PerfectCounter::new(1);
        for hits_soft_17 in [false, true] {
            let table = DealerProbsTable::calculate(&counter, hits_soft_17);
            for face in 2..=11 {
                assert!((table.up_card(face).total() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn hitting_soft_17_raises_bust_probability_behind_an_ace() {
        let counter = PerfectCounter::new(6);
        let stand = DealerProbsTable::calculate(&counter, false);
        let hit = DealerProbsTable::calculate(&counter, true);
        assert!(hit.up_card(11).p_bust() > stand.up_card(11).p_bust());
        // Soft 17 no longer terminates, so its mass leaves the 17 bucket.
        assert!(hit.up_card(11).p_final(17) < stand.up_card(11).p_final(17));
    }

    #[test]
    fn comparison_helpers_partition_the_mass() {
        let counter = PerfectCounter::new(2);
        let table = DealerProbsTable::calculate(&counter, false);
        let probs = table.up_card(9);
        for player_value in [12u8, 17, 19, 21] {
            let worse = probs.p_worse_than_player(player_value);
            let better = probs.p_better_than_player(player_value);
            let push = if (17..=21).contains(&player_value) {
                probs.p_final(player_value)
            } else {
                0.0
            };
            assert!((worse + better + push - 1.0).abs() < 1e-9);
        }
    }
}
