use std::ops::Deref;

/// A card-probability model over the remaining shoe. Ranks are blackjack
/// values in [2, 11] with 11 standing for an ace and 10 for every ten-valued
/// card.
///
/// `count` marks a rank as dealt and `uncount` is its exact inverse, so a
/// `count(r); uncount(r)` pair must leave `probability(k)` unchanged for
/// every rank k. The probabilities of all ranks sum to 1 whenever cards
/// remain.
pub trait Counter {
    fn count(&mut self, rank: u8);
    fn uncount(&mut self, rank: u8);
    fn probability(&self, rank: u8) -> f64;
    fn reset(&mut self);
    fn total_remaining(&self) -> u32;
}

fn rank_index(rank: u8) -> usize {
    debug_assert!((2..=11).contains(&rank), "rank must be in [2, 11]");
    (rank - 2) as usize
}

fn full_counts(number_of_decks: u8) -> [u32; 10] {
    let mut counts = [number_of_decks as u32 * 4; 10];
    counts[rank_index(10)] = number_of_decks as u32 * 16;
    counts
}

/// Exact per-rank bookkeeping of the remaining shoe.
#[derive(Debug, Clone)]
pub struct PerfectCounter {
    number_of_decks: u8,
    remaining: [u32; 10],
    total: u32,
}

impl PerfectCounter {
    pub fn new(number_of_decks: u8) -> PerfectCounter {
        PerfectCounter {
            number_of_decks,
            remaining: full_counts(number_of_decks),
            total: number_of_decks as u32 * 52,
        }
    }

    pub fn remaining(&self, rank: u8) -> u32 {
        self.remaining[rank_index(rank)]
    }
}

impl Counter for PerfectCounter {
    fn count(&mut self, rank: u8) {
        let slot = &mut self.remaining[rank_index(rank)];
        // Going negative means count/uncount bookkeeping got out of sync
        // somewhere upstream.
        assert!(
            *slot > 0,
            "Counted more cards of rank {} than the shoe holds",
            rank
        );
        *slot -= 1;
        self.total -= 1;
    }

    fn uncount(&mut self, rank: u8) {
        self.remaining[rank_index(rank)] += 1;
        self.total += 1;
    }

    fn probability(&self, rank: u8) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.remaining[rank_index(rank)] as f64 / self.total as f64
    }

    fn reset(&mut self) {
        self.remaining = full_counts(self.number_of_decks);
        self.total = self.number_of_decks as u32 * 52;
    }

    fn total_remaining(&self) -> u32 {
        self.total
    }
}

/// High-Low running-count heuristic: low ranks (2..=6) add one, high ranks
/// (10 and ace) subtract one. Per-rank probabilities are reconstructed from
/// the tally around the uniform baseline, with the ten bucket carrying four
/// of the thirteen faces.
#[derive(Debug, Clone)]
pub struct HighLowCounter {
    number_of_decks: u8,
    running_count: i32,
    total: u32,
}

impl HighLowCounter {
    pub fn new(number_of_decks: u8) -> HighLowCounter {
        HighLowCounter {
            number_of_decks,
            running_count: 0,
            total: number_of_decks as u32 * 52,
        }
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }
}

impl Counter for HighLowCounter {
    fn count(&mut self, rank: u8) {
        if rank < 7 {
            self.running_count += 1;
        } else if rank > 9 {
            self.running_count -= 1;
        }
        self.total -= 1;
    }

    fn uncount(&mut self, rank: u8) {
        if rank < 7 {
            self.running_count -= 1;
        } else if rank > 9 {
            self.running_count += 1;
        }
        self.total += 1;
    }

    fn probability(&self, rank: u8) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        let naive_remaining = total / 13.0;
        let running_count = self.running_count as f64;
        let p = if rank < 7 {
            (5.0 * naive_remaining - running_count / 2.0) / (5.0 * total)
        } else if rank > 9 {
            let per_face = (5.0 * naive_remaining + running_count / 2.0) / (5.0 * total);
            if rank == 10 {
                per_face * 4.0
            } else {
                per_face
            }
        } else {
            naive_remaining / total
        };
        assert!(
            p >= 0.0,
            "Running count {} implies a negative fraction of rank {}",
            self.running_count,
            rank
        );
        p
    }

    fn reset(&mut self) {
        self.running_count = 0;
        self.total = self.number_of_decks as u32 * 52;
    }

    fn total_remaining(&self) -> u32 {
        self.total
    }
}

/// Composition-blind uniform model: an idealized infinite shoe. Also serves
/// as the ground truth for property tests.
#[derive(Debug, Clone)]
pub struct NoneCounter {
    number_of_decks: u8,
    total: u32,
}

impl NoneCounter {
    pub fn new(number_of_decks: u8) -> NoneCounter {
        NoneCounter {
            number_of_decks,
            total: number_of_decks as u32 * 52,
        }
    }
}

impl Counter for NoneCounter {
    fn count(&mut self, _rank: u8) {
        self.total -= 1;
    }

    fn uncount(&mut self, _rank: u8) {
        self.total += 1;
    }

    fn probability(&self, rank: u8) -> f64 {
        if rank == 10 {
            4.0 / 13.0
        } else {
            1.0 / 13.0
        }
    }

    fn reset(&mut self) {
        self.total = self.number_of_decks as u32 * 52;
    }

    fn total_remaining(&self) -> u32 {
        self.total
    }
}

/// Scoped removal of one card: counts the rank on construction and uncounts
/// it when dropped, so enumeration code cannot leak a composition change
/// even when it unwinds early.
pub struct Removed<'a, C: Counter + ?Sized> {
    counter: &'a mut C,
    rank: u8,
}

impl<'a, C: Counter + ?Sized> Removed<'a, C> {
    pub fn new(counter: &'a mut C, rank: u8) -> Removed<'a, C> {
        counter.count(rank);
        Removed { counter, rank }
    }
}

impl<C: Counter + ?Sized> Deref for Removed<'_, C> {
    type Target = C;
    fn deref(&self) -> &Self::Target {
        self.counter
    }
}

impl<C: Counter + ?Sized> Drop for Removed<'_, C> {
    fn drop(&mut self) {
        self.counter.uncount(self.rank);
    }
}
