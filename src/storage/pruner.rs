use super::traits::Pruner;
use crate::core::Item;
use crate::error::PruneError;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Paths with fewer normal components than this are never touched.
pub const MIN_PRUNE_DEPTH: usize = 3;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PruneError + '_ {
    move |source| PruneError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Refuse `resolved` when it sits too close to the root.
fn check_depth(resolved: PathBuf) -> Result<PathBuf, PruneError> {
    let components = resolved
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    if components < MIN_PRUNE_DEPTH {
        return Err(PruneError::Unsafe {
            path: resolved,
            components,
        });
    }
    Ok(resolved)
}

/// Resolve the parent of `path` and rejoin the entry name, so a symlinked
/// entry is addressed as the link itself and never as its target.
fn guarded_path(path: &Path) -> Result<PathBuf, PruneError> {
    let Some(name) = path.file_name() else {
        return check_depth(path.to_path_buf());
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = fs::canonicalize(parent).map_err(io_error(path))?;
    check_depth(parent.join(name))
}

/// Deletes files, and directories together with their contents. Symlinks
/// are unlinked; whatever they point to is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletePruner;

impl Pruner for DeletePruner {
    fn name(&self) -> &str {
        "delete"
    }

    fn prune(&self, item: &Item) -> Result<(), PruneError> {
        let path = guarded_path(item.path())?;
        let file_type = fs::symlink_metadata(&path)
            .map_err(io_error(&path))?
            .file_type();
        let outcome = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        outcome.map_err(|source| PruneError::Io { path, source })
    }
}

/// Moves discarded items into an archive directory instead of deleting
/// them. The archive directory is created on first use. An entry whose
/// name is already taken in the archive is refused, never overwritten.
#[derive(Debug, Clone)]
pub struct MovePruner {
    destination: PathBuf,
}

impl MovePruner {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl Pruner for MovePruner {
    fn name(&self) -> &str {
        "move"
    }

    fn prune(&self, item: &Item) -> Result<(), PruneError> {
        let path = guarded_path(item.path())?;
        let Some(file_name) = path.file_name() else {
            return Err(PruneError::Unsafe {
                path,
                components: 0,
            });
        };
        fs::create_dir_all(&self.destination).map_err(io_error(&self.destination))?;
        let target = self.destination.join(file_name);
        if fs::symlink_metadata(&target).is_ok() {
            return Err(PruneError::Io {
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", target.display()),
                ),
                path,
            });
        }
        fs::rename(&path, &target).map_err(|source| PruneError::Io { path, source })
    }
}
