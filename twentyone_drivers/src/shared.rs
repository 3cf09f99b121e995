use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub ev_simulator: ConfigEvSimulator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub min_bet: u32,
    pub number_of_decks: u8,
    pub dealer_hits_soft_17: bool,
    pub double_after_split: bool,
    pub double_on: String,
    pub resplit_limit: u8,
    pub resplit_aces: bool,
    pub hit_split_aces: bool,
    pub surrender: String,

    pub payout_blackjack: f64,
}

impl TryInto<twentyone::Rule> for ConfigRule {
    type Error = serde::de::value::Error;

    fn try_into(self) -> Result<twentyone::Rule, Self::Error> {
        let rule = twentyone::Rule {
            min_bet: self.min_bet,
            number_of_decks: self.number_of_decks,
            dealer_hits_soft_17: self.dealer_hits_soft_17,
            double_after_split: self.double_after_split,
            double_on: self.double_on.parse()?,
            resplit_limit: self.resplit_limit,
            resplit_aces: self.resplit_aces,
            hit_split_aces: self.hit_split_aces,
            surrender: self.surrender.parse()?,
            payout_blackjack: self.payout_blackjack,
        };

        Ok(rule)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEvSimulator {
    pub initial_bankroll: f64,
    pub number_of_rounds: u64,
    pub penetration: f64,
    pub always_play: bool,
    pub counting: String,
}

/// Reads the content of a given config file and parses it to a Config.
///
/// Panics if any error occurs.
pub fn parse_config_from_file(filename: &str) -> Config {
    let file_content = fs::read_to_string(filename).unwrap();
    serde_yaml::from_str(&file_content).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_typical_config_rule() -> ConfigRule {
        ConfigRule {
            min_bet: 10,
            number_of_decks: 6,
            dealer_hits_soft_17: false,
            double_after_split: true,
            double_on: String::from("Any"),
            resplit_limit: 3,
            resplit_aces: false,
            hit_split_aces: false,
            surrender: String::from("Late"),
            payout_blackjack: 1.5,
        }
    }

    #[test]
    fn can_convert_rule() {
        let config_rule = get_typical_config_rule();
        let converted_rule: twentyone::Rule = config_rule.try_into().unwrap();
        assert_eq!(converted_rule.number_of_decks, 6);
        assert_eq!(converted_rule.double_on, twentyone::DoubleOn::Any);
        assert_eq!(converted_rule.surrender, twentyone::SurrenderPolicy::Late);
        assert_eq!(converted_rule.resplit_limit, 3);
    }

    #[test]
    fn should_return_error_when_converting_rule() {
        let mut config_rule = get_typical_config_rule();
        config_rule.double_on = String::from("Not a policy");
        let convert_result: Result<twentyone::Rule, serde::de::value::Error> =
            config_rule.try_into();
        assert!(convert_result.is_err());
    }

    #[test]
    fn can_parse_full_config() {
        let yaml = "\
rule:
  min_bet: 10
  number_of_decks: 6
  dealer_hits_soft_17: false
  double_after_split: true
  double_on: Any
  resplit_limit: 3
  resplit_aces: false
  hit_split_aces: false
  surrender: Late
  payout_blackjack: 1.5
ev_simulator:
  initial_bankroll: 1000.0
  number_of_rounds: 500
  penetration: 0.75
  always_play: true
  counting: perfect
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.ev_simulator.number_of_rounds, 500);
        assert_eq!(config.ev_simulator.counting, "perfect");
        let rule: twentyone::Rule = config.rule.try_into().unwrap();
        assert_eq!(rule.payout_blackjack, 1.5);
    }
}
