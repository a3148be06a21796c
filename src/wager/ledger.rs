//! Settlement Ledger
//!
//! Append-only list of signed entries. Entries are never modified or
//! removed; balances are derived from them on every read.

use crate::wager::models::{BetId, LedgerEntry, UserId};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        user_id: UserId,
        bet_id: BetId,
        amount: f64,
        now: DateTime<Utc>,
    ) -> LedgerEntry {
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            user_id,
            bet_id,
            amount,
            created_at: now,
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Net balance of a user across all bets.
    pub fn balance(&self, user_id: &UserId) -> f64 {
        self.entries
            .iter()
            .filter(|e| &e.user_id == user_id)
            .map(|e| e.amount)
            .sum()
    }

    /// A user's entries in the order they were recorded.
    pub fn for_user(&self, user_id: &UserId) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn for_bet(&self, bet_id: &BetId) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| &e.bet_id == bet_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
