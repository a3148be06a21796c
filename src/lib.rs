//! Sidebet Backend Library
//!
//! Social wagering between friends: groups, bets and the IOU ledger.
//! The binary in main.rs wires these into an HTTP server.

pub mod api;
pub mod config;
pub mod middleware;
pub mod wager;
