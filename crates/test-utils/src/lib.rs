//! # Mock Provider

pub mod backend;
pub mod checker;
pub mod token;
pub mod verifier;

pub use backend::MockBackend;
pub use checker::{CountingDelay, ScriptedChecker, Stall, Unanswered};
pub use verifier::{VERIFIER_ID, Verifier};
