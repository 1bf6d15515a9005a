//! Core types, errors, and configuration for the BIDS dataset catalog.
//!
//! This crate provides the foundational types shared by the scanner, the
//! catalog and the command-line front end:
//!
//! - Domain enums ([`Format`], [`DataType`], [`DataSource`]) and the
//!   [`Classification`] extracted from a path
//! - Configuration structures ([`Config`], [`CatalogConfig`], [`ScanConfig`])
//! - Error types ([`ConfigError`], [`ParseValueError`])
//! - Type aliases for `FxHashMap`/`FxHashSet`

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{CatalogConfig, Config, DEFAULT_DATA_DIR, ScanConfig};
pub use error::{ConfigError, ParseValueError};
pub use hash::{FxHashMap, FxHashSet};
pub use types::{Classification, DataSource, DataType, Format, OptionTags};

/// Sentinel stored in place of a subject, session or scan label that was
/// not found in a path.
pub const EMPTY: &str = "Empty";
