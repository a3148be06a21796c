//! Wager Module - Groups, Bets & Settlement
//!
//! This module handles:
//! 1. User and group registries with invite-code membership
//! 2. The bet lifecycle state machine
//! 3. Settlement of resolved bets into an append-only IOU ledger
//!
//! Architecture:
//! - `WagerStore` owns every registry and is passed explicitly to callers
//! - `lifecycle` and `settlement` hold the pure transition and payout rules
//! - Time comes from an injected `Clock`

pub mod clock;
pub mod demo;
pub mod error;
pub mod groups;
pub mod ledger;
pub mod lifecycle;
pub mod models;
pub mod settlement;
pub mod store;
pub mod users;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{WagerError, WagerResult};
pub use models::*;
pub use store::{WagerPolicy, WagerStore};
