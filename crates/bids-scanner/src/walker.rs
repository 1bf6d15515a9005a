//! Directory traversal grouped by directory.
//!
//! This module provides [`FileWalker`], which uses the `ignore` crate to walk
//! a dataset tree and returns the files of every directory as one
//! [`DirectoryListing`]. Series detection works per directory, so the walk
//! keeps siblings together.
//!
//! # Features
//!
//! - Deterministic order (entries sorted by file name)
//! - Optional skipping of hidden entries and named directories
//! - No `.gitignore` handling: a dataset is not a source tree
//! - Converts paths to UTF-8 [`Utf8PathBuf`](camino::Utf8PathBuf)
//!
//! # Examples
//!
//! ```ignore
//! use bids_scanner::FileWalker;
//! use camino::Utf8Path;
//!
//! let walker = FileWalker::new(Utf8Path::new("/mnt/data"))?;
//! for listing in walker.collect_directories()? {
//!     println!("{}: {} files", listing.dir, listing.files.len());
//! }
//! ```

use bids_core::FxHashMap;
use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::ScanError;

/// The files found directly inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// The directory, rooted at the walker's root.
    pub dir: Utf8PathBuf,
    /// File names (not paths) in walk order.
    pub files: Vec<String>,
}

impl DirectoryListing {
    fn new(dir: &Utf8Path) -> Self {
        Self {
            dir: dir.to_owned(),
            files: Vec::new(),
        }
    }
}

/// A file walker that discovers every file in a dataset tree.
///
/// # Examples
///
/// ```ignore
/// use bids_scanner::FileWalker;
/// use camino::Utf8Path;
///
/// let walker = FileWalker::new(Utf8Path::new("/mnt/data"))?
///     .with_skip_dirs(&["MRI_temp"])
///     .with_skip_hidden(true);
/// let listings = walker.collect_directories()?;
/// ```
#[derive(Debug)]
pub struct FileWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Directory names to skip.
    skip_dirs: Vec<String>,
    /// Whether to follow symbolic links.
    follow_links: bool,
    /// Whether to skip hidden files and directories.
    skip_hidden: bool,
}

impl FileWalker {
    /// Creates a new file walker for the given root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root path doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::config(format!(
                "root path does not exist: {root}"
            )));
        }
        if !root.is_dir() {
            return Err(ScanError::config(format!(
                "root path is not a directory: {root}"
            )));
        }

        Ok(Self {
            root: root.to_owned(),
            skip_dirs: Vec::new(),
            follow_links: false,
            skip_hidden: false,
        })
    }

    /// Adds directory names to skip during traversal.
    ///
    /// Names are matched against directory names below the root, never
    /// against the root itself.
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: &[&str]) -> Self {
        self.skip_dirs.extend(dirs.iter().map(ToString::to_string));
        self
    }

    /// Configures whether to follow symbolic links to directories.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Configures whether hidden (dot) entries are skipped.
    #[must_use]
    pub const fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Walks the tree and returns the files of each directory.
    ///
    /// Directories appear in the order the walk first reaches a file inside
    /// them; directories without files are omitted. Each path is yielded
    /// once; a directory reached through a link is listed under the link's
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if any directory cannot be read.
    /// Returns [`ScanError::NonUtf8Path`] if a non-UTF-8 path is encountered.
    pub fn collect_directories(&self) -> Result<Vec<DirectoryListing>, ScanError> {
        let mut listings: Vec<DirectoryListing> = Vec::new();
        let mut positions: FxHashMap<Utf8PathBuf, usize> = FxHashMap::default();

        for result in self.build_walker() {
            let entry = result?;

            // Symlinked files count as files even when links aren't followed
            let is_file = entry.file_type().is_some_and(|ft| {
                ft.is_file() || (ft.is_symlink() && entry.path().is_file())
            });
            if !is_file {
                continue;
            }

            let path = entry.path();
            let utf8_path =
                Utf8Path::from_path(path).ok_or_else(|| ScanError::NonUtf8Path(path.to_owned()))?;

            let (Some(dir), Some(name)) = (utf8_path.parent(), utf8_path.file_name()) else {
                continue;
            };

            let slot = *positions.entry(dir.to_owned()).or_insert_with(|| {
                listings.push(DirectoryListing::new(dir));
                listings.len() - 1
            });
            listings[slot].files.push(name.to_owned());
        }

        Ok(listings)
    }

    /// Builds the ignore walker with configured settings.
    fn build_walker(&self) -> ignore::Walk {
        let skip_dirs = self.skip_dirs.clone();

        WalkBuilder::new(&self.root)
            // Datasets have no .gitignore semantics; start from nothing
            .standard_filters(false)
            .hidden(self.skip_hidden)
            .follow_links(self.follow_links)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    return true;
                }
                !skip_dirs.iter().any(|d| entry.file_name() == d.as_str())
            })
            .build()
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}
