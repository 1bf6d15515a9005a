//! Fx-hashed collections.
//!
//! Filters hold their accepted values in [`FxHashSet`]s and the scanner
//! groups directory listings and series with [`FxHashMap`]s. Keys are short strings,
//! paths and small enums.
//!
//! # Examples
//!
//! ```
//! use bids_core::{DataSource, FxHashSet};
//!
//! let accepted: FxHashSet<DataSource> =
//!     [DataSource::Raw, DataSource::Derivatives].into_iter().collect();
//! assert!(accepted.contains(&DataSource::Raw));
//! assert!(!accepted.contains(&DataSource::Templates));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;
