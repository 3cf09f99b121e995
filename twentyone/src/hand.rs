use crate::statetable::HandState;

/// A concrete player or dealer hand, stored as the ranks dealt to it in
/// order. Rank 11 is an ace and rank 10 covers every ten-valued card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<u8>,
}

impl Hand {
    pub fn new(cards: &[u8]) -> Hand {
        for &card in cards {
            assert!(
                (2..=11).contains(&card),
                "Invalid card rank! It must be in [2, 11]"
            );
        }
        Hand {
            cards: cards.to_vec(),
        }
    }

    pub fn add(&mut self, card: u8) {
        assert!(
            (2..=11).contains(&card),
            "Invalid card rank! It must be in [2, 11]"
        );
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[u8] {
        &self.cards
    }

    pub fn number_of_cards(&self) -> usize {
        self.cards.len()
    }

    /// Best total of the hand, counting at most one ace as 11. Can exceed 21
    /// only when the hand is bust.
    pub fn value(&self) -> u8 {
        let (value, soft) = self.raw_value();
        if soft {
            value + 10
        } else {
            value
        }
    }

    pub fn is_soft(&self) -> bool {
        self.raw_value().1
    }

    pub fn is_bust(&self) -> bool {
        self.raw_value().0 > 21
    }

    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0] == self.cards[1]
    }

    pub fn pair_rank(&self) -> Option<u8> {
        if self.is_pair() {
            Some(self.cards[0])
        } else {
            None
        }
    }

    /// A natural: exactly two cards totalling 21.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == 21
    }

    /// The abstract state of this hand. Must not be called on a bust hand.
    pub fn state(&self) -> HandState {
        let (value, soft) = self.raw_value();
        assert!(value <= 21, "A bust hand has no state");
        if soft {
            HandState::new(value + 10, true)
        } else {
            HandState::new(value, false)
        }
    }

    /// Whether the dealer must draw another card under the house rule given
    /// by `hits_soft_17`.
    pub fn must_hit(&self, hits_soft_17: bool) -> bool {
        let value = self.value();
        value < 17 || (value == 17 && self.is_soft() && hits_soft_17)
    }

    // Minimal total (all aces as 1) and whether one ace can still count as
    // 11 without busting.
    fn raw_value(&self) -> (u8, bool) {
        let mut value: u16 = 0;
        let mut has_ace = false;
        for &card in &self.cards {
            if card == 11 {
                has_ace = true;
                value += 1;
            } else {
                value += card as u16;
            }
        }
        let soft = has_ace && value + 10 <= 21;
        // Clamp so a deeply bust hand still fits in a u8 total.
        (value.min(100) as u8, soft)
    }
}
