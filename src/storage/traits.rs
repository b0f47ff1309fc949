use crate::core::Item;
use crate::error::PruneError;
use anyhow::Result;
use std::path::Path;

/// Produces the candidate items of a retention target.
///
/// Implementations own the notion of "where artifacts live": a local
/// directory, a remote listing, an object store prefix. Every returned
/// item must carry a non-empty, unique path.
pub trait Finder {
    /// Human-readable finder name (e.g. "directory")
    fn name(&self) -> &str;

    fn find(&self, target: &Path) -> Result<Vec<Item>>;
}

/// Assigns a timestamp to a discovered entry.
///
/// Returning `None` drops the entry from consideration; it is not an
/// error.
pub trait TimeResolver {
    fn name(&self) -> &str;

    fn resolve(&self, path: &Path, is_directory: bool) -> Option<Item>;
}

/// Disposes of a discarded item.
pub trait Pruner {
    fn name(&self) -> &str;

    fn prune(&self, item: &Item) -> std::result::Result<(), PruneError>;
}
