use super::traits::{Finder, TimeResolver};
use crate::core::Item;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Non-recursive directory listing; one candidate per entry.
pub struct DirectoryFinder {
    resolver: Box<dyn TimeResolver>,
    exclude: Option<Regex>,
    skip: Option<PathBuf>,
}

impl DirectoryFinder {
    pub fn new(resolver: Box<dyn TimeResolver>) -> Self {
        Self {
            resolver,
            exclude: None,
            skip: None,
        }
    }

    /// Never report `path` itself, e.g. an archive directory that lives
    /// inside the target.
    pub fn with_skip(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip = Some(path.into());
        self
    }

    /// Skip entries whose file name matches `pattern`.
    pub fn with_exclude(mut self, pattern: Regex) -> Self {
        self.exclude = Some(pattern);
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(name))
    }
}

impl Finder for DirectoryFinder {
    fn name(&self) -> &str {
        "directory"
    }

    fn find(&self, target: &Path) -> Result<Vec<Item>> {
        let entries = fs::read_dir(target)
            .with_context(|| format!("Failed to read directory {}", target.display()))?;

        // Both sides resolved so `./trash` and `/srv/b/trash` compare equal.
        let skip = self.skip.as_deref().and_then(|p| fs::canonicalize(p).ok());
        let root = match skip {
            Some(_) => fs::canonicalize(target).ok(),
            None => None,
        };

        let mut items = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read entry in {}", target.display()))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let (Some(skip), Some(root)) = (&skip, &root) {
                if root.join(entry.file_name()) == *skip {
                    tracing::debug!(entry = %name, "skipping archive directory");
                    continue;
                }
            }
            if self.is_excluded(&name) {
                tracing::debug!(entry = %name, "excluded by pattern");
                continue;
            }
            let is_directory = match entry.file_type() {
                Ok(file_type) => file_type.is_dir(),
                Err(error) => {
                    tracing::warn!(entry = %name, %error, "cannot determine entry type");
                    continue;
                }
            };
            match self.resolver.resolve(&entry.path(), is_directory) {
                Some(item) => items.push(item),
                None => tracing::debug!(
                    entry = %name,
                    resolver = self.resolver.name(),
                    "no timestamp, skipping"
                ),
            }
        }
        Ok(items)
    }
}
