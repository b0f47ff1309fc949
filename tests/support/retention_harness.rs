#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use tierkeep::core::Item;
use tierkeep::error::PruneError;
use tierkeep::storage::{Finder, Pruner};

/// Finder over a fixed in-memory list.
pub struct VecFinder(pub Vec<Item>);

impl Finder for VecFinder {
    fn name(&self) -> &str {
        "vec"
    }

    fn find(&self, _target: &Path) -> anyhow::Result<Vec<Item>> {
        Ok(self.0.clone())
    }
}

/// Pruner that only remembers what it was asked to prune.
#[derive(Clone, Default)]
pub struct RecordingPruner {
    pub pruned: Rc<RefCell<Vec<PathBuf>>>,
}

impl RecordingPruner {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.pruned.borrow().clone()
    }
}

impl Pruner for RecordingPruner {
    fn name(&self) -> &str {
        "recording"
    }

    fn prune(&self, item: &Item) -> Result<(), PruneError> {
        self.pruned.borrow_mut().push(item.path().to_path_buf());
        Ok(())
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// One item per day from `newest` backwards, named after its date.
pub fn daily_items(newest: DateTime<Utc>, days: i64) -> Vec<Item> {
    (0..days)
        .map(|i| {
            let ts = newest - Duration::days(i);
            Item::file(format!("/srv/backups/{}.tar", ts.format("%Y-%m-%d")), ts)
        })
        .collect()
}

/// Temp directory nested deep enough for the prune guard, filled with
/// empty files named `names`.
pub fn backup_dir(names: &[&str]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("backups");
    fs::create_dir_all(&root).unwrap();
    for name in names {
        fs::write(root.join(name), name.as_bytes()).unwrap();
    }
    (tmp, root)
}

pub fn remaining(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
