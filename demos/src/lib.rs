//! Demos
//!
//! An example verifier service and a remote polling client.

pub mod client;
pub mod config;
pub mod verifier;
