//! Bet Settlement
//!
//! Turns a declared winning side into one signed amount per participant:
//!
//! - each winner receives `stake * losers / winners`
//! - each loser pays the flat `stake`
//! - if either side has nobody on it, nobody is paid or charged
//!
//! Winner payouts always total `stake * losers`, so every settlement nets to
//! zero across its participants.

use crate::wager::models::{Participant, Side, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    pub user_id: UserId,
    pub amount: f64,
}

/// Payouts in participant order.
pub fn compute_payouts(stake: u64, participants: &[Participant], winner: Side) -> Vec<Payout> {
    let winners = participants.iter().filter(|p| p.side == winner).count();
    let losers = participants.len() - winners;
    if winners == 0 || losers == 0 {
        return Vec::new();
    }

    let stake = stake as f64;
    let win_amount = stake * losers as f64 / winners as f64;

    participants
        .iter()
        .map(|p| Payout {
            user_id: p.user_id,
            amount: if p.side == winner { win_amount } else { -stake },
        })
        .collect()
}
