//! # WKMP Common Library
//!
//! Shared code for WKMP tools:
//! - Error types
//! - TOML configuration loading and value resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
