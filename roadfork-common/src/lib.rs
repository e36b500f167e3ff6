//! Common utilities for the roadfork preprocessing toolkit

pub mod error;

pub use error::{Error, Result};
