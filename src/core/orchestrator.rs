use super::engine::PolicyEngine;
use super::grouping::{GroupKey, build_units};
use super::item::Item;
use super::policy::{PolicyConfig, Tier};
use crate::error::{Result, RetentionError};
use crate::storage::{Finder, Pruner};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// A kept item together with every tier that justified keeping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeptItem {
    pub item: Item,
    pub reasons: BTreeSet<Tier>,
}

/// Outcome of one [`Retention::apply`] call.
#[derive(Debug, Clone, Serialize)]
pub struct RetentionResult {
    pub target: PathBuf,
    pub dry_run: bool,
    pub keep: Vec<KeptItem>,
    pub prune: Vec<Item>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RetentionResult {
    pub fn is_kept(&self, path: &Path) -> bool {
        self.keep.iter().any(|k| k.item.path() == path)
    }

    pub fn reasons(&self, path: &Path) -> Option<&BTreeSet<Tier>> {
        self.keep
            .iter()
            .find(|k| k.item.path() == path)
            .map(|k| &k.reasons)
    }
}

/// Drives discovery, the policy engine and disposal for one target at a
/// time.
pub struct Retention {
    engine: PolicyEngine,
    finder: Box<dyn Finder>,
    pruner: Box<dyn Pruner>,
    grouping: Option<Box<dyn GroupKey>>,
    dry_run: bool,
}

impl Retention {
    /// `policy` is normalized here, so `keep_last` is at least 1.
    pub fn new(policy: PolicyConfig, finder: Box<dyn Finder>, pruner: Box<dyn Pruner>) -> Self {
        Self {
            engine: PolicyEngine::new(policy.normalize()),
            finder,
            pruner,
            grouping: None,
            dry_run: false,
        }
    }

    pub fn with_grouping(mut self, grouping: Box<dyn GroupKey>) -> Self {
        self.grouping = Some(grouping);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn policy(&self) -> &PolicyConfig {
        self.engine.policy()
    }

    pub fn apply(&self, target: &Path) -> Result<RetentionResult> {
        let started_at = Utc::now();
        tracing::info!(
            target = %target.display(),
            finder = self.finder.name(),
            pruner = self.pruner.name(),
            dry_run = self.dry_run,
            "retention.start"
        );

        let mut items = self
            .finder
            .find(target)
            .map_err(|source| RetentionError::Discovery {
                target: target.to_path_buf(),
                source,
            })?;
        check_contract(&items)?;
        for item in &items {
            tracing::debug!(
                path = %item.path().display(),
                timestamp = %item.timestamp(),
                "candidate"
            );
        }

        // Stable, so equal timestamps keep discovery order.
        items.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

        let units = build_units(items, self.grouping.as_deref());
        let decisions = self.engine.decide(&units);

        let mut keep = Vec::new();
        let mut prune = Vec::new();
        for (unit, decision) in units.into_iter().zip(decisions) {
            if decision.is_kept() {
                keep.extend(unit.into_members().into_iter().map(|item| KeptItem {
                    item,
                    reasons: decision.reasons.clone(),
                }));
            } else {
                prune.extend(unit.into_members());
            }
        }

        if keep.is_empty() {
            return Err(RetentionError::EmptyResult {
                target: target.to_path_buf(),
            });
        }

        for kept in &keep {
            let reasons: Vec<String> = kept.reasons.iter().map(ToString::to_string).collect();
            tracing::info!(
                path = %kept.item.path().display(),
                reasons = %reasons.join(","),
                "retention.keep"
            );
        }

        for item in &prune {
            if self.dry_run {
                tracing::info!(path = %item.path().display(), "retention.would_prune");
                continue;
            }
            tracing::info!(path = %item.path().display(), "retention.prune");
            self.pruner.prune(item)?;
        }

        let finished_at = Utc::now();
        tracing::info!(
            target = %target.display(),
            kept = keep.len(),
            pruned = prune.len(),
            duration_ms = (finished_at - started_at).num_milliseconds(),
            "retention.end"
        );

        Ok(RetentionResult {
            target: target.to_path_buf(),
            dry_run: self.dry_run,
            keep,
            prune,
            started_at,
            finished_at,
        })
    }
}

/// Reject finder output a pruner could misinterpret.
fn check_contract(items: &[Item]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.path().as_os_str().is_empty() {
            return Err(RetentionError::ContractViolation("item with empty path".into()));
        }
        if !seen.insert(item.path()) {
            return Err(RetentionError::ContractViolation(format!(
                "duplicate item {}",
                item.path().display()
            )));
        }
    }
    Ok(())
}
