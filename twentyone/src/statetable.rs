use std::ops::Index;

/// Number of distinct abstract states: hard totals 2..=21 and soft totals
/// 11..=21.
const NUMBER_OF_STATES: usize = 31;

/// The equivalence class of all concrete hands sharing a blackjack total and
/// softness. Downstream expectations depend only on this pair, never on the
/// exact cards, so every table in this crate is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandState {
    value: u8,
    soft: bool,
}

impl HandState {
    pub fn new(value: u8, soft: bool) -> HandState {
        if soft {
            assert!(
                (11..=21).contains(&value),
                "Invalid soft hand value! It must be in [11, 21]"
            );
        } else {
            assert!(
                (2..=21).contains(&value),
                "Invalid hard hand value! It must be in [2, 21]"
            );
        }
        HandState { value, soft }
    }

    /// State of a two-card starting hand. A pair of aces collapses from 22
    /// to 12 with one ace demoted; any other ace keeps counting as 11.
    pub fn of_two_cards(first: u8, second: u8) -> HandState {
        let mut value = first + second;
        if value == 22 {
            value = 12;
        }
        HandState::new(value, first == 11 || second == 11)
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_soft(&self) -> bool {
        self.soft
    }

    /// Successor state after drawing `rank`. A soft total above 21 hardens
    /// (an ace drops from 11 to 1); a hard total above 21 is a bust and has
    /// no successor.
    pub fn hit(&self, rank: u8) -> Option<HandState> {
        let mut value = self.value + rank;
        let mut soft = self.soft || rank == 11;
        if value > 21 && soft {
            value -= 10;
            soft = false;
        }
        if value > 21 {
            None
        } else {
            Some(HandState { value, soft })
        }
    }

    /// All abstract states, hard totals first. The relaxation loops re-scan
    /// this sequence until they reach a fixed point, so the order carries no
    /// meaning.
    pub fn all() -> impl Iterator<Item = HandState> {
        (2..=21)
            .map(|value| HandState::new(value, false))
            .chain((11..=21).map(|value| HandState::new(value, true)))
    }

    fn index(&self) -> usize {
        if self.soft {
            20 + (self.value - 11) as usize
        } else {
            (self.value - 2) as usize
        }
    }
}

/// This struct provides a convenient way to use HandState as the index of an
/// array, with explicit resolved/unresolved occupancy for the fixed-point
/// relaxation loops.
#[derive(Debug, Clone)]
pub struct StateTable<T> {
    data: [Option<T>; NUMBER_OF_STATES],
}

impl<T> StateTable<T> {
    pub fn new() -> StateTable<T> {
        StateTable {
            data: std::array::from_fn(|_| None),
        }
    }

    pub fn contains_state(&self, state: &HandState) -> bool {
        self.data[state.index()].is_some()
    }

    pub fn set(&mut self, state: &HandState, value: T) {
        self.data[state.index()] = Some(value);
    }

    pub fn get_mut(&mut self, state: &HandState) -> Option<&mut T> {
        self.data[state.index()].as_mut()
    }

    pub fn len(&self) -> usize {
        self.data.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|slot| slot.is_none())
    }
}

impl<T> Default for StateTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<&HandState> for StateTable<T> {
    type Output = T;
    fn index(&self, state: &HandState) -> &Self::Output {
        // An unresolved read means a relaxation pass consumed a state before
        // its dependencies settled, which is a bug, not a data error.
        self.data[state.index()].as_ref().unwrap_or_else(|| {
            panic!(
                "State ({}, soft: {}) is not resolved",
                state.value, state.soft
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_hit_transitions() {
        let state = HandState::new(12, false);
        assert_eq!(state.hit(5), Some(HandState::new(17, false)));
        assert_eq!(state.hit(10), None);
        // An ace on a high hard total counts as 1.
        assert_eq!(state.hit(11), Some(HandState::new(13, false)));
    }

    #[test]
    fn soft_hands_harden_instead_of_busting() {
        let state = HandState::new(16, true);
        assert_eq!(state.hit(9), Some(HandState::new(15, false)));
        assert_eq!(state.hit(5), Some(HandState::new(21, true)));
        assert_eq!(state.hit(11), Some(HandState::new(17, false)));
    }

    #[test]
    fn ace_on_low_hard_total_stays_soft() {
        let state = HandState::new(6, false);
        assert_eq!(state.hit(11), Some(HandState::new(17, true)));
    }

    #[test]
    fn two_card_states() {
        assert_eq!(HandState::of_two_cards(10, 6), HandState::new(16, false));
        assert_eq!(HandState::of_two_cards(11, 5), HandState::new(16, true));
        assert_eq!(HandState::of_two_cards(11, 10), HandState::new(21, true));
        assert_eq!(HandState::of_two_cards(11, 11), HandState::new(12, true));
    }

    #[test]
    fn state_space_is_complete_and_distinct() {
        let mut table: StateTable<usize> = StateTable::new();
        for (i, state) in HandState::all().enumerate() {
            assert!(!table.contains_state(&state));
            table.set(&state, i);
        }
        assert_eq!(table.len(), NUMBER_OF_STATES);
        for (i, state) in HandState::all().enumerate() {
            assert_eq!(table[&state], i);
        }
    }

    #[test]
    #[should_panic]
    fn reading_unresolved_state_panics() {
        let table: StateTable<f64> = StateTable::new();
        let _ = table[&HandState::new(16, false)];
    }
}
