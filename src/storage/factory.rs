use super::finder::DirectoryFinder;
use super::pruner::{DeletePruner, MovePruner};
use super::resolver::{FilenameTimeResolver, ModifiedTimeResolver};
use super::traits::{Finder, Pruner, TimeResolver};
use crate::config::{Config, PruneAction, TimestampSource};
use anyhow::{Context, Result};
use regex::Regex;

pub fn create_resolver(source: TimestampSource) -> Box<dyn TimeResolver> {
    match source {
        TimestampSource::Modified => Box::new(ModifiedTimeResolver),
        TimestampSource::Filename => Box::new(FilenameTimeResolver),
    }
}

/// Build the finder described by `config`. The move destination, when
/// set, is never offered as a candidate.
pub fn create_finder(config: &Config) -> Result<Box<dyn Finder>> {
    let mut finder = DirectoryFinder::new(create_resolver(config.timestamp_source));
    if let Some(pattern) = config.exclude.as_deref() {
        let pattern =
            Regex::new(pattern).with_context(|| format!("Invalid exclude pattern {pattern:?}"))?;
        finder = finder.with_exclude(pattern);
    }
    if config.action == PruneAction::Move {
        if let Some(destination) = config.move_to_path() {
            finder = finder.with_skip(destination);
        }
    }
    Ok(Box::new(finder))
}

/// Build the pruner described by `config`.
pub fn create_pruner(config: &Config) -> Result<Box<dyn Pruner>> {
    match config.action {
        PruneAction::Delete => Ok(Box::new(DeletePruner)),
        PruneAction::Move => {
            let destination = config
                .move_to_path()
                .context("action = \"move\" requires move_to")?;
            Ok(Box::new(MovePruner::new(destination)))
        }
    }
}
