//! # Verification API
//!
//! Transport-neutral request and response envelopes shared by the session
//! handlers, along with a conversion into HTTP responses for web front ends.

pub mod api;
pub mod http;

pub use self::api::*;
