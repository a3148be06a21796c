//! Bet Lifecycle
//!
//! Status transition rules for bets:
//!
//! ```text
//! draft -> pending -> locked -> awaiting_proof -> voting -> resolved
//!    \________\______________________________________ void
//! ```
//!
//! - Acceptance moves `draft`/`pending` forward, locking at two participants.
//! - Time checks lock a filled bet once its event date has passed and then
//!   open it for proof; an under-filled bet whose date passed becomes `void`.
//! - Proof moves `awaiting_proof` to `voting`; resolution ends in `resolved`.
//!
//! Transitions never move backward.

use crate::wager::models::{BetStatus, LOCK_PARTICIPANTS};
use chrono::{DateTime, Utc};

/// Status after an acceptance leaves `participants` on the bet.
pub fn status_after_acceptance(participants: usize) -> BetStatus {
    if participants >= LOCK_PARTICIPANTS {
        BetStatus::Locked
    } else {
        BetStatus::Pending
    }
}

/// Status the time check moves a bet to, or `None` when nothing changes.
///
/// Steps cascade: a filled pending bet past its event date ends up in
/// `awaiting_proof` in a single check.
pub fn time_progression(
    status: BetStatus,
    participants: usize,
    event_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<BetStatus> {
    if now <= event_date {
        return None;
    }

    match status {
        BetStatus::Draft | BetStatus::Pending if participants >= LOCK_PARTICIPANTS => {
            Some(BetStatus::AwaitingProof)
        }
        BetStatus::Draft | BetStatus::Pending => Some(BetStatus::Void),
        BetStatus::Locked => Some(BetStatus::AwaitingProof),
        _ => None,
    }
}

/// Whether a manual status update from `from` to `to` is allowed.
///
/// Only strictly forward moves along the main chain. `resolved` needs
/// settlement and `void` needs the time check, so neither is accepted here.
pub fn can_update_status(from: BetStatus, to: BetStatus) -> bool {
    if matches!(to, BetStatus::Resolved | BetStatus::Void) {
        return false;
    }
    match (from.rank(), to.rank()) {
        (Some(a), Some(b)) => b > a,
        _ => false,
    }
}
