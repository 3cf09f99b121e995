use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

/// Face values run 1..=13 with 1 the ace. The engine only cares about
/// blackjack ranks, so jack, queen and king all map to 10 and the ace to 11.
const FACE_VALUE_TO_RANK: [u8; 13] = [11, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub face_value: u8,
    pub suit: Suit,
}

impl Card {
    pub fn rank(&self) -> u8 {
        FACE_VALUE_TO_RANK[(self.face_value - 1) as usize]
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let face = match self.face_value {
            1 => String::from("A"),
            11 => String::from("J"),
            12 => String::from("Q"),
            13 => String::from("K"),
            v => v.to_string(),
        };
        let suit = match self.suit {
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
            Suit::Spades => "♠",
        };
        write!(f, "{}{}", face, suit)
    }
}

/// A multi-deck dealing shoe with a cut card. Once the cut card is passed
/// the shoe wants a reshuffle before the next round, though it keeps dealing
/// to let the current round finish.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
    next: usize,
    cut_card_index: usize,
    rng: StdRng,
}

impl Shoe {
    /// `penetration` is the fraction of the shoe dealt before the cut card.
    pub fn new(number_of_decks: u8, penetration: f64) -> Shoe {
        assert!(
            (0.0..=1.0).contains(&penetration),
            "Invalid penetration! It must be in [0, 1]"
        );
        let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
        for _ in 0..number_of_decks {
            for suit in Suit::iter() {
                for face_value in 1..=13 {
                    cards.push(Card { face_value, suit });
                }
            }
        }
        let cut_card_index = (cards.len() as f64 * penetration) as usize;
        let mut shoe = Shoe {
            cards,
            next: 0,
            cut_card_index,
            rng: StdRng::from_entropy(),
        };
        shoe.shuffle();
        shoe
    }

    #[cfg(test)]
    pub fn with_seed(number_of_decks: u8, penetration: f64, seed: u64) -> Shoe {
        let mut shoe = Shoe::new(number_of_decks, penetration);
        shoe.rng = StdRng::seed_from_u64(seed);
        shoe.shuffle();
        shoe
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.next = 0;
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied();
        if card.is_some() {
            self.next += 1;
        }
        card
    }

    pub fn can_deal(&self) -> bool {
        self.next < self.cards.len()
    }

    pub fn reached_cut_card(&self) -> bool {
        self.next >= self.cut_card_index
    }

    pub fn cards_remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_values_map_to_blackjack_ranks() {
        let ace = Card {
            face_value: 1,
            suit: Suit::Spades,
        };
        assert_eq!(ace.rank(), 11);
        let king = Card {
            face_value: 13,
            suit: Suit::Hearts,
        };
        assert_eq!(king.rank(), 10);
        let seven = Card {
            face_value: 7,
            suit: Suit::Clubs,
        };
        assert_eq!(seven.rank(), 7);
    }

    #[test]
    fn shoe_holds_every_card_of_every_deck() {
        let mut shoe = Shoe::with_seed(2, 0.8, 7);
        let mut ten_valued = 0;
        let mut total = 0;
        while let Some(card) = shoe.deal_card() {
            if card.rank() == 10 {
                ten_valued += 1;
            }
            total += 1;
        }
        assert_eq!(total, 104);
        assert_eq!(ten_valued, 32);
        assert!(!shoe.can_deal());
    }

    #[test]
    fn cut_card_trips_at_the_penetration_point() {
        let mut shoe = Shoe::with_seed(1, 0.5, 7);
        for _ in 0..25 {
            shoe.deal_card();
        }
        assert!(!shoe.reached_cut_card());
        shoe.deal_card();
        assert!(shoe.reached_cut_card());
        assert!(shoe.can_deal());
        shoe.shuffle();
        assert!(!shoe.reached_cut_card());
        assert_eq!(shoe.cards_remaining(), 52);
    }
}
