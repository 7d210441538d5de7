//! # Credential Presentation Verification
//!
//! An API for verifying credential presentations through short-lived
//! verification sessions.
//!
//! A client starts a session and receives a holder-facing link (usually shown
//! as a QR code). The holder's wallet follows the link and presents a
//! credential to the verification backend out-of-band. Meanwhile the client
//! polls the session until it resolves, and on success decodes the presented
//! credential tokens into their claims.
//!
//! # Design
//!
//! ** Sessions **
//!
//! Sessions move forward through a fixed lifecycle:
//! `initiated → presented → verified`, with `failed` and `expired` as the
//! alternative outcomes. `verified`, `failed`, and `expired` are terminal.
//! The [`store`] module provides an in-memory session store that enforces the
//! lifecycle on every update.
//!
//! ** Provider **
//!
//! Implementers supply a [`provider::Provider`], combining a session store
//! with access to the verification backend. The backend is the system of
//! record for presentations: the library reads its state but never verifies
//! credential signatures itself.
//!
//! ** Polling **
//!
//! The [`poll`] module drives `check` on a fixed interval, reporting
//! intermediate statuses and supporting cancellation at every suspension
//! point.

pub mod generate;
pub mod link;
pub mod poll;
pub mod provider;
pub mod store;
pub mod token;
pub mod types;

mod error;
mod handlers;
mod state;

pub use credibil_verify_api::http;

pub use self::error::Error;
pub use self::handlers::*;
pub use self::state::{Expire, Lifetime};
pub use self::types::*;
