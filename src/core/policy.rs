use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One retention window.
///
/// Ordering follows declaration order, so sets of tiers print as
/// `last, hourly, daily, ...`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Last,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::Last,
        Tier::Hourly,
        Tier::Daily,
        Tier::Weekly,
        Tier::Monthly,
        Tier::Yearly,
    ];

    /// The five calendar tiers, i.e. everything except `last`.
    pub const PERIODIC: [Tier; 5] = [
        Tier::Hourly,
        Tier::Daily,
        Tier::Weekly,
        Tier::Monthly,
        Tier::Yearly,
    ];

    /// Option name used on the command line and in config files.
    pub fn option_name(self) -> &'static str {
        match self {
            Tier::Last => "keep-last",
            Tier::Hourly => "keep-hourly",
            Tier::Daily => "keep-daily",
            Tier::Weekly => "keep-weekly",
            Tier::Monthly => "keep-monthly",
            Tier::Yearly => "keep-yearly",
        }
    }
}

/// The six retention counts.
///
/// Absent keys deserialize to 0. Use [`PolicyConfig::normalize`] before
/// handing a policy to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PolicyConfig {
    pub keep_last: u32,
    pub keep_hourly: u32,
    pub keep_daily: u32,
    pub keep_weekly: u32,
    pub keep_monthly: u32,
    pub keep_yearly: u32,
}

impl PolicyConfig {
    /// Coerce `keep_last` to at least 1 so a run never keeps nothing.
    pub fn normalize(self) -> Self {
        Self {
            keep_last: self.keep_last.max(1),
            ..self
        }
    }

    pub fn count(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Last => self.keep_last,
            Tier::Hourly => self.keep_hourly,
            Tier::Daily => self.keep_daily,
            Tier::Weekly => self.keep_weekly,
            Tier::Monthly => self.keep_monthly,
            Tier::Yearly => self.keep_yearly,
        }
    }

    pub fn set_count(&mut self, tier: Tier, count: u32) {
        let slot = match tier {
            Tier::Last => &mut self.keep_last,
            Tier::Hourly => &mut self.keep_hourly,
            Tier::Daily => &mut self.keep_daily,
            Tier::Weekly => &mut self.keep_weekly,
            Tier::Monthly => &mut self.keep_monthly,
            Tier::Yearly => &mut self.keep_yearly,
        };
        *slot = count;
    }

    /// Build a normalized policy from named options such as
    /// `("keep-daily", "7")`.
    ///
    /// Unrecognized names are ignored with a warning. Values must be
    /// non-negative integers.
    pub fn from_options<I, K, V>(options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut policy = Self::default();
        for (name, value) in options {
            let name = name.as_ref();
            let Some(tier) = Tier::ALL.into_iter().find(|t| t.option_name() == name) else {
                tracing::warn!(option = name, "ignoring unrecognized retention option");
                continue;
            };
            let value = value.as_ref().trim();
            let count = value.parse::<u32>().map_err(|_| {
                ConfigError::Validation(format!(
                    "{name} must be a non-negative integer, got {value:?}"
                ))
            })?;
            policy.set_count(tier, count);
        }
        Ok(policy.normalize())
    }

    /// Render as `keep-last=3 keep-daily=7 ...`, omitting zero tiers.
    pub fn summary(&self) -> String {
        Tier::ALL
            .into_iter()
            .filter(|t| self.count(*t) > 0)
            .map(|t| format!("{}={}", t.option_name(), self.count(t)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
