//! Common types shared across Lockbox crates.
//!
//! Every fallible operation in the workspace returns [`Result`], so callers
//! can match on one error taxonomy regardless of which layer failed.

pub mod error;

pub use error::{Error, Result};
