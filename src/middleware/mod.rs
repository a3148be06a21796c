//! HTTP middleware.
//!
//! Request logging with a per-request id, echoed back as `x-request-id`.

pub mod logging;

pub use logging::{request_logging, REQUEST_ID_HEADER};
