//! # gamefill Common Library
//!
//! Shared code for the gamefill workspace:
//! - Error types
//! - Configuration loading and dataset location resolution
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
