//! # Verification Session Types

mod request;
mod session;

pub use self::request::*;
pub use self::session::*;
