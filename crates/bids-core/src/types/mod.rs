//! Domain types for the BIDS dataset catalog.
//!
//! # Module Organization
//!
//! - [`format`] - Coarse file formats
//! - [`modality`] - Modality classes and provenance tiers
//! - [`classification`] - Attributes extracted from a path
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use bids_core::{Classification, DataSource, DataType, Format};
//! ```

mod classification;
mod format;
mod modality;

pub use classification::{Classification, OptionTags};
pub use format::Format;
pub use modality::{DataSource, DataType};
