use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tierkeep::config::{Config, PruneAction, TimestampSource};
use tierkeep::core::{PolicyConfig, Tier};

/// `tierkeep` - Tiered time-bucket retention for backups.
#[derive(Parser, Debug)]
#[command(name = "tierkeep")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Keep the right backups, prune the rest.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.tierkeep/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log decisions at debug level
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the retention policy to one or more directories
    Apply {
        /// Directories to rotate (default: `targets` from the config file)
        targets: Vec<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Show what would be pruned without touching anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Skip entries whose name matches this regex
        #[arg(long)]
        exclude: Option<String>,

        /// Keep or prune entries sharing this regex's first capture together
        #[arg(long)]
        group_pattern: Option<String>,

        /// Timestamp source (modified, filename)
        #[arg(long)]
        timestamp_source: Option<TimestampSource>,

        /// Move pruned entries into this directory instead of deleting them
        #[arg(long)]
        move_to: Option<String>,

        /// Print one JSON report per target
        #[arg(long)]
        json: bool,
    },

    /// Print the effective, normalized retention policy
    Policy {
        #[command(flatten)]
        policy: PolicyArgs,
    },
}

/// Per-tier overrides; unset flags fall back to the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct PolicyArgs {
    /// Keep the N most recent entries
    #[arg(long, value_name = "N")]
    pub keep_last: Option<u32>,

    /// Keep the newest entry of each of the last N hours
    #[arg(long, value_name = "N")]
    pub keep_hourly: Option<u32>,

    /// Keep the newest entry of each of the last N days
    #[arg(long, value_name = "N")]
    pub keep_daily: Option<u32>,

    /// Keep the newest entry of each of the last N ISO weeks
    #[arg(long, value_name = "N")]
    pub keep_weekly: Option<u32>,

    /// Keep the newest entry of each of the last N months
    #[arg(long, value_name = "N")]
    pub keep_monthly: Option<u32>,

    /// Keep the newest entry of each of the last N years
    #[arg(long, value_name = "N")]
    pub keep_yearly: Option<u32>,
}

impl PolicyArgs {
    fn get(&self, tier: Tier) -> Option<u32> {
        match tier {
            Tier::Last => self.keep_last,
            Tier::Hourly => self.keep_hourly,
            Tier::Daily => self.keep_daily,
            Tier::Weekly => self.keep_weekly,
            Tier::Monthly => self.keep_monthly,
            Tier::Yearly => self.keep_yearly,
        }
    }

    /// Overlay the flags that were given onto `policy`, then normalize.
    pub fn merge_into(&self, mut policy: PolicyConfig) -> PolicyConfig {
        for tier in Tier::ALL {
            if let Some(count) = self.get(tier) {
                policy.set_count(tier, count);
            }
        }
        policy.normalize()
    }
}

/// Overlay `apply` flags onto a loaded config.
pub struct ApplyOverrides<'a> {
    pub policy: &'a PolicyArgs,
    pub dry_run: bool,
    pub exclude: Option<&'a str>,
    pub group_pattern: Option<&'a str>,
    pub timestamp_source: Option<TimestampSource>,
    pub move_to: Option<&'a str>,
}

impl ApplyOverrides<'_> {
    pub fn apply_to(&self, config: &mut Config) {
        config.policy = self.policy.merge_into(config.policy);
        config.dry_run |= self.dry_run;
        if let Some(exclude) = self.exclude {
            config.exclude = Some(exclude.to_string());
        }
        if let Some(pattern) = self.group_pattern {
            config.group_pattern = Some(pattern.to_string());
        }
        if let Some(source) = self.timestamp_source {
            config.timestamp_source = source;
        }
        if let Some(move_to) = self.move_to {
            config.action = PruneAction::Move;
            config.move_to = Some(move_to.to_string());
        }
    }
}
