pub mod counter;
pub mod dealer;
pub mod expectation;
pub mod hand;
pub mod pregame;
pub mod split;
mod statetable;
pub mod strategy;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
pub use counter::{Counter, HighLowCounter, NoneCounter, PerfectCounter, Removed};
pub use hand::Hand;
pub use statetable::{HandState, StateTable};

/// The house rules of one table. Everything the expectation engine needs to
/// price a round lives here.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub min_bet: u32,
    pub number_of_decks: u8,
    pub dealer_hits_soft_17: bool,
    pub double_after_split: bool,
    pub double_on: DoubleOn,
    pub resplit_limit: u8,
    pub resplit_aces: bool,
    pub hit_split_aces: bool,
    pub surrender: SurrenderPolicy,

    pub payout_blackjack: f64,
}

impl Rule {
    /// Whether the house offers a double on a two-card total.
    pub fn double_allowed(&self, value: u8, soft: bool) -> bool {
        match self.double_on {
            DoubleOn::Any => true,
            DoubleOn::NineToEleven => !soft && (9..=11).contains(&value),
            DoubleOn::TenToEleven => !soft && (10..=11).contains(&value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum DoubleOn {
    Any,
    NineToEleven,
    TenToEleven,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum SurrenderPolicy {
    None,
    Early,
    Late,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Move {
    Stand,
    Hit,
    Double,
    Split,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_on_restrictions() {
        let mut rule = Rule {
            min_bet: 10,
            number_of_decks: 6,
            dealer_hits_soft_17: false,
            double_after_split: true,
            double_on: DoubleOn::Any,
            resplit_limit: 3,
            resplit_aces: false,
            hit_split_aces: false,
            surrender: SurrenderPolicy::Late,
            payout_blackjack: 1.5,
        };
        assert!(rule.double_allowed(5, false));
        assert!(rule.double_allowed(18, true));

        rule.double_on = DoubleOn::NineToEleven;
        assert!(rule.double_allowed(9, false));
        assert!(rule.double_allowed(11, false));
        assert!(!rule.double_allowed(8, false));
        assert!(!rule.double_allowed(11, true));

        rule.double_on = DoubleOn::TenToEleven;
        assert!(!rule.double_allowed(9, false));
        assert!(rule.double_allowed(10, false));
    }

    #[test]
    fn rule_enums_round_trip_through_strings() {
        let double_on: DoubleOn = "NineToEleven".parse().unwrap();
        assert_eq!(double_on, DoubleOn::NineToEleven);
        let surrender: SurrenderPolicy = "Early".parse().unwrap();
        assert_eq!(surrender, SurrenderPolicy::Early);
        assert!("Sometimes".parse::<SurrenderPolicy>().is_err());
    }
}
