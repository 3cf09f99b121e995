use crate::shoe::Shoe;
use log::{debug, info};
use twentyone::pregame::pre_deal_ev;
use twentyone::strategy::SolutionForUpCard;
use twentyone::{
    Counter, Hand, HighLowCounter, Move, NoneCounter, PerfectCounter, Rule, SurrenderPolicy,
};
use twentyone_drivers::ConfigEvSimulator;

/// One player hand at the table, with its own stake bookkeeping.
#[derive(Debug, Clone)]
struct SeatHand {
    hand: Hand,
    doubled: bool,
    from_split: bool,
}

impl SeatHand {
    fn new(hand: Hand, from_split: bool) -> SeatHand {
        SeatHand {
            hand,
            doubled: false,
            from_split,
        }
    }
}

pub fn build_counter(counting: &str, number_of_decks: u8) -> Result<Box<dyn Counter>, String> {
    match counting {
        "perfect" => Ok(Box::new(PerfectCounter::new(number_of_decks))),
        "high_low" => Ok(Box::new(HighLowCounter::new(number_of_decks))),
        "none" => Ok(Box::new(NoneCounter::new(number_of_decks))),
        other => Err(format!(
            "Unknown counting type \"{}\". Expected perfect, high_low or none",
            other
        )),
    }
}

/// Kelly-style bet sizing: treat the round as an even-money coin flip with
/// the computed edge, cap the stake at `factor` of the bankroll, and round
/// down to a multiple of the table minimum. Negative edges size to zero.
pub fn kelly_bet(play_ev: f64, bankroll: f64, min_bet: u32, factor: f64) -> u32 {
    let p = (play_ev + 1.0) / 2.0;
    let ratio = p - (1.0 - p);
    let max_bet = (bankroll * ratio).min(bankroll * factor) as i64;
    let bet = max_bet - max_bet.rem_euclid(min_bet as i64);
    bet.max(0) as u32
}

/// The worst-case multiple of the base bet one round can consume: every
/// split adds a hand, doubling doubles each of them, and a plain double is
/// always possible.
pub fn max_bet_multiple(resplit_limit: u8, double_after_split: bool) -> u32 {
    let mut multiple = 1 + resplit_limit as u32;
    if double_after_split {
        multiple *= 2;
    }
    multiple.max(2)
}

// Money returned for one finished hand at the given stake: the stake back
// plus the win on a victory, the stake alone on a push.
fn settle_hand(hand: &Hand, dealer: &Hand, stake: f64) -> f64 {
    if hand.is_bust() {
        return 0.0;
    }
    if dealer.is_bust() || hand.value() > dealer.value() {
        2.0 * stake
    } else if hand.value() == dealer.value() {
        stake
    } else {
        0.0
    }
}

struct Table {
    shoe: Shoe,
    counter: Box<dyn Counter>,
}

impl Table {
    // Deals one rank, reshuffling a run-dry shoe first. The caller decides
    // when the card becomes visible and gets counted.
    fn draw(&mut self) -> Result<u8, String> {
        if !self.shoe.can_deal() {
            self.shoe.shuffle();
            self.counter.reset();
        }
        match self.shoe.deal_card() {
            Some(card) => Ok(card.rank()),
            None => Err(String::from("The shoe is empty right after a shuffle")),
        }
    }

    fn draw_counted(&mut self) -> Result<u8, String> {
        let rank = self.draw()?;
        self.counter.count(rank);
        Ok(rank)
    }
}

/// Plays rounds until the budget of rounds or the bankroll runs out.
/// Returns the final bankroll.
pub fn simulate_rounds(rule: &Rule, config: &ConfigEvSimulator) -> Result<f64, String> {
    let mut table = Table {
        shoe: Shoe::new(rule.number_of_decks, config.penetration),
        counter: build_counter(&config.counting, rule.number_of_decks)?,
    };
    let mut bankroll = config.initial_bankroll;
    let factor = 1.0 / max_bet_multiple(rule.resplit_limit, rule.double_after_split) as f64;

    let mut rounds_played = 0;
    let mut running_ev = 0.0;
    while rounds_played < config.number_of_rounds && bankroll >= rule.min_bet as f64 {
        if table.shoe.reached_cut_card() {
            table.shoe.shuffle();
            table.counter.reset();
        }

        let play_ev = pre_deal_ev(table.counter.as_mut(), rule);
        let mut bet = kelly_bet(play_ev, bankroll, rule.min_bet, factor) as f64;
        if bet < rule.min_bet as f64 {
            if config.always_play {
                bet = rule.min_bet as f64;
            } else {
                // Burn a few cards and wait for a better count.
                for _ in 0..6 {
                    table.draw_counted()?;
                }
                continue;
            }
        }

        rounds_played += 1;
        running_ev += play_ev;
        debug!(
            "Round {}: bankroll {:.2}, expectation {:.5}, bet {}",
            rounds_played, bankroll, play_ev, bet
        );
        bankroll -= bet;
        bankroll += play_round(&mut table, rule, bet)?;
    }

    info!(
        "Played {} rounds, final bankroll {:.2}, mean pre-deal expectation {:.5}",
        rounds_played,
        bankroll,
        if rounds_played > 0 {
            running_ev / rounds_played as f64
        } else {
            0.0
        }
    );
    Ok(bankroll)
}

// One full round for an already-debited bet. Returns the money that comes
// back to the player, extra stakes for doubles and splits included (those
// are debited in here and folded into the returned amount).
fn play_round(table: &mut Table, rule: &Rule, bet: f64) -> Result<f64, String> {
    let player = Hand::new(&[table.draw_counted()?, table.draw_counted()?]);
    let dealer_up_card = table.draw_counted()?;
    let dealer_hole_card = table.draw()?;
    let mut dealer = Hand::new(&[dealer_up_card, dealer_hole_card]);

    let solution = SolutionForUpCard::calculate(dealer_up_card, table.counter.as_ref(), rule);

    if rule.surrender == SurrenderPolicy::Early
        && solution.should_surrender(&player, table.counter.as_ref(), rule, true)
    {
        table.counter.count(dealer_hole_card);
        return Ok(bet / 2.0);
    }

    // The dealer peeks and a natural ends the round at once.
    if dealer.is_blackjack() {
        table.counter.count(dealer_hole_card);
        if player.is_blackjack() {
            return Ok(bet);
        }
        return Ok(0.0);
    }

    if rule.surrender == SurrenderPolicy::Late
        && solution.should_surrender(&player, table.counter.as_ref(), rule, false)
    {
        table.counter.count(dealer_hole_card);
        return Ok(bet / 2.0);
    }

    if player.is_blackjack() {
        table.counter.count(dealer_hole_card);
        return Ok((1.0 + rule.payout_blackjack) * bet);
    }

    let mut extra_stakes = 0.0;
    let mut num_splits: u8 = 0;
    let mut pending = vec![SeatHand::new(player, false)];
    let mut finished: Vec<SeatHand> = Vec::new();
    while let Some(mut seat) = pending.pop() {
        loop {
            if seat.hand.is_bust() {
                break;
            }
            let splits_remaining = rule.resplit_limit - num_splits;
            match solution.resolve_move(&seat.hand, rule, splits_remaining, seat.from_split) {
                Move::Hit => {
                    seat.hand.add(table.draw_counted()?);
                }
                Move::Double => {
                    seat.hand.add(table.draw_counted()?);
                    seat.doubled = true;
                    extra_stakes += bet;
                    finished.push(seat);
                    break;
                }
                Move::Split => {
                    let cards = seat.hand.cards();
                    let first = Hand::new(&[cards[0], table.draw_counted()?]);
                    let second = Hand::new(&[cards[1], table.draw_counted()?]);
                    pending.push(SeatHand::new(first, true));
                    pending.push(SeatHand::new(second, true));
                    num_splits += 1;
                    extra_stakes += bet;
                    break;
                }
                Move::Stand => {
                    finished.push(seat);
                    break;
                }
            }
        }
    }

    table.counter.count(dealer_hole_card);
    let any_live = finished.iter().any(|seat| !seat.hand.is_bust());
    if any_live {
        while dealer.must_hit(rule.dealer_hits_soft_17) {
            dealer.add(table.draw_counted()?);
        }
    }

    let mut returned = 0.0;
    for seat in &finished {
        let stake = if seat.doubled { 2.0 * bet } else { bet };
        returned += settle_hand(&seat.hand, &dealer, stake);
    }
    // Extra stakes for doubles and splits were never debited up front, so
    // they come out of the returned money here.
    Ok(returned - extra_stakes)
}
