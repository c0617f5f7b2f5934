//! Core types shared by the PIL firmware tools
//!
//! This crate provides the error taxonomy, the ELF identification types and
//! the naming configuration used by both the parser and the split/squash
//! operations.

pub mod error;
pub mod types;
pub mod config;

pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
