//! Path classifier, record index and query engine for BIDS datasets.
//!
//! This crate turns the files found by [`bids_scanner`] into a queryable
//! index. Every path is broken into tokens (`sub-01`, `ses-pre`, `T1w`,
//! `derivatives`, ...) and classified; the results are stored column-wise
//! in a [`RecordSet`] that filters, presets and tool inputs run against.
//!
//! # Overview
//!
//! - [`Catalog`]: Owns the current snapshot and rebuilds it on rescan
//! - [`Classifier`]: Path to [`Classification`](bids_core::Classification)
//! - [`RecordSet`]: Eight aligned columns, one row per file
//! - [`Filter`]: Accepted values per [`FilterKey`]
//! - [`Preset`]: Tool-specific filter settings and named [`ToolInput`]s
//! - [`resolve_inputs`]: Picks one file per tool input
//!
//! # Example
//!
//! ```ignore
//! use bids_catalog::{Catalog, Preset};
//! use bids_core::Config;
//!
//! let catalog = Catalog::new(Config::default())?;
//!
//! let mut filter = Preset::Dcm2nii.filter();
//! filter.select_subject("sub-01");
//! for record in catalog.query(&filter).iter() {
//!     println!("{}", record.file_name);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Catalog
//!     │
//!     ├── Scanner (bids-scanner)
//!     │
//!     ├── Classifier
//!     │       │
//!     │       └── TokenMatcher (regex, per path word)
//!     │
//!     └── Arc<RecordSet>
//!             │
//!             ├── query (Filter, Preset)
//!             │
//!             └── resolve_inputs (InputPattern)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod catalog;
mod classifier;
mod error;
mod filter;
mod inputs;
mod preset;
mod query;
mod record_set;

pub use catalog::{Catalog, build_index};
pub use classifier::Classifier;
pub use error::{CatalogError, QueryError};
pub use filter::{Filter, FilterKey};
pub use inputs::{InputPattern, ResolvedInput, resolve_inputs};
pub use preset::{Preset, ToolInput};
pub use record_set::{Record, RecordSet};
