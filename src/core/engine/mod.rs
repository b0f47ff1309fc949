use super::grouping::RetentionUnit;
use super::item::Item;
use super::policy::{PolicyConfig, Tier};
use std::collections::{BTreeSet, HashSet};


/// Identifies one concrete hour, day, ISO week, month or year.
///
/// Fields are kept as separate integers so differently sized components
/// can never collide the way concatenated strings do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    Hour { year: i32, month: u32, day: u32, hour: u32 },
    Day { year: i32, month: u32, day: u32 },
    Week { iso_year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl PeriodKey {
    /// Period of `item` under a calendar tier; `None` for `Tier::Last`.
    pub fn of(tier: Tier, item: &Item) -> Option<Self> {
        let key = match tier {
            Tier::Last => return None,
            Tier::Hourly => Self::Hour {
                year: item.year(),
                month: item.month(),
                day: item.day_of_month(),
                hour: item.hour_of_day(),
            },
            Tier::Daily => Self::Day {
                year: item.year(),
                month: item.month(),
                day: item.day_of_month(),
            },
            Tier::Weekly => Self::Week {
                iso_year: item.iso_week_year(),
                week: item.iso_week(),
            },
            Tier::Monthly => Self::Month {
                year: item.year(),
                month: item.month(),
            },
            Tier::Yearly => Self::Year { year: item.year() },
        };
        Some(key)
    }
}

/// Outcome for one unit: the tiers that justified keeping it.
///
/// An empty reason set means the unit is pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    pub reasons: BTreeSet<Tier>,
}

impl Decision {
    pub fn is_kept(&self) -> bool {
        !self.reasons.is_empty()
    }
}

/// Periods already occupied per calendar tier, plus the last-N counter.
///
/// Lives only for one `decide` call.
#[derive(Debug, Default)]
struct Buckets {
    last: u32,
    hourly: HashSet<PeriodKey>,
    daily: HashSet<PeriodKey>,
    weekly: HashSet<PeriodKey>,
    monthly: HashSet<PeriodKey>,
    yearly: HashSet<PeriodKey>,
}

impl Buckets {
    fn seen_mut(&mut self, tier: Tier) -> Option<&mut HashSet<PeriodKey>> {
        match tier {
            Tier::Last => None,
            Tier::Hourly => Some(&mut self.hourly),
            Tier::Daily => Some(&mut self.daily),
            Tier::Weekly => Some(&mut self.weekly),
            Tier::Monthly => Some(&mut self.monthly),
            Tier::Yearly => Some(&mut self.yearly),
        }
    }
}

/// Tiered time-bucket retention.
///
/// Stateless; every call to [`PolicyEngine::decide`] starts with empty
/// buckets.
#[derive(Debug, Clone, Copy)]
pub struct PolicyEngine {
    policy: PolicyConfig,
}

impl PolicyEngine {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Decide every unit in one pass.
    ///
    /// `units` must be sorted newest first by representative timestamp.
    /// The returned decisions line up index for index with `units`.
    pub fn decide(&self, units: &[RetentionUnit]) -> Vec<Decision> {
        let mut buckets = Buckets::default();
        let mut decisions: Vec<Decision> = units
            .iter()
            .map(|unit| self.decide_unit(unit.representative(), &mut buckets))
            .collect();

        // Only reachable with a policy that skipped normalization.
        if !decisions.iter().any(Decision::is_kept) {
            if let Some(first) = decisions.first_mut() {
                first.reasons.insert(Tier::Last);
            }
        }
        decisions
    }

    fn decide_unit(&self, representative: &Item, buckets: &mut Buckets) -> Decision {
        let mut decision = Decision::default();

        if buckets.last < self.policy.keep_last {
            decision.reasons.insert(Tier::Last);
            buckets.last += 1;
        }

        for tier in Tier::PERIODIC {
            let budget = self.policy.count(tier);
            if budget == 0 {
                continue;
            }
            let (Some(key), Some(seen)) =
                (PeriodKey::of(tier, representative), buckets.seen_mut(tier))
            else {
                continue;
            };
            if seen.contains(&key) {
                continue;
            }
            // The newest unit of a period occupies it whether or not the
            // budget still allows keeping it.
            if seen.len() < usize::try_from(budget).unwrap_or(usize::MAX) {
                decision.reasons.insert(tier);
            }
            seen.insert(key);
        }

        decision
    }
}
