//! # JACAMENO Common Library
//!
//! Shared code for JACAMENO services:
//! - Common error type
//! - Bootstrap configuration loading and resolution order

pub mod config;
pub mod error;

pub use error::{Error, Result};
