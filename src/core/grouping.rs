use super::item::Item;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Maps an item's path to the key of the group it belongs to.
///
/// Items sharing a key are kept or pruned together. `None` leaves the
/// item in a unit of its own.
pub trait GroupKey {
    fn group_key(&self, path: &Path) -> Option<String>;
}

impl<F> GroupKey for F
where
    F: Fn(&Path) -> Option<String>,
{
    fn group_key(&self, path: &Path) -> Option<String> {
        self(path)
    }
}

/// Groups entries whose file names match the same regex capture.
///
/// The first capture group is the key when present, the whole match
/// otherwise. Names that do not match stay ungrouped.
#[derive(Debug, Clone)]
pub struct PatternGrouping {
    pattern: Regex,
}

impl PatternGrouping {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl GroupKey for PatternGrouping {
    fn group_key(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        let captures = self.pattern.captures(name)?;
        let key = captures.get(1).or_else(|| captures.get(0))?.as_str();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }
}

/// One atomic keep/prune decision: a single item or a whole group.
///
/// Members are ordered newest first; the first member is the
/// representative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionUnit {
    key: Option<String>,
    members: Vec<Item>,
}

impl RetentionUnit {
    pub fn single(item: Item) -> Self {
        Self {
            key: None,
            members: vec![item],
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn members(&self) -> &[Item] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Item> {
        self.members
    }

    /// Newest member; every unit has at least one.
    pub fn representative(&self) -> &Item {
        &self.members[0]
    }
}

/// Partition items, already sorted newest first, into retention units.
///
/// A group is placed at the position of its newest member, so the
/// returned units stay sorted newest first by representative timestamp.
pub fn build_units(items: Vec<Item>, grouping: Option<&dyn GroupKey>) -> Vec<RetentionUnit> {
    let Some(grouping) = grouping else {
        return items.into_iter().map(RetentionUnit::single).collect();
    };

    let mut units: Vec<RetentionUnit> = Vec::with_capacity(items.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for item in items {
        match grouping.group_key(item.path()) {
            Some(key) if !key.is_empty() => {
                if let Some(&index) = positions.get(&key) {
                    units[index].members.push(item);
                } else {
                    positions.insert(key.clone(), units.len());
                    units.push(RetentionUnit {
                        key: Some(key),
                        members: vec![item],
                    });
                }
            }
            _ => units.push(RetentionUnit::single(item)),
        }
    }
    units
}
