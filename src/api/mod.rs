//! HTTP API
//! Mission: Expose the wager store over JSON endpoints

pub mod error;
pub mod extract;
pub mod routes;

pub use error::ApiError;
pub use routes::{create_router, AppState};
