use crate::app::report::{render_policy, render_result};
use crate::cli::commands::{ApplyOverrides, Cli, Commands};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tierkeep::config::Config;
use tierkeep::core::Retention;
use tierkeep::storage;
use tracing::info;

/// Run one retention pass per target.
///
/// 1. Builds the finder and pruner from the merged configuration.
/// 2. Applies the policy to each target in turn; the first failure stops
///    the remaining targets.
/// 3. Prints a text or JSON report per target.
fn run_apply(config: &Config, targets: Vec<PathBuf>, json: bool) -> Result<()> {
    let targets = if targets.is_empty() {
        config.target_paths()
    } else {
        targets
    };
    if targets.is_empty() {
        bail!(
            "No targets given. Pass directories to `tierkeep apply` or set `targets` in the config file."
        );
    }

    let finder = storage::create_finder(config)?;
    let pruner = storage::create_pruner(config)?;
    let mut retention = Retention::new(config.policy, finder, pruner).with_dry_run(config.dry_run);
    if let Some(grouping) = config.grouping()? {
        retention = retention.with_grouping(Box::new(grouping));
    }

    info!(
        policy = %retention.policy().summary(),
        targets = targets.len(),
        "retention policy loaded"
    );

    for target in &targets {
        let result = retention
            .apply(target)
            .with_context(|| format!("Retention failed for {}", target.display()))?;
        if json {
            println!(
                "{}",
                serde_json::to_string(&result).context("Failed to serialize report")?
            );
        } else {
            println!("{}", render_result(&result));
        }
    }
    Ok(())
}

pub fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Apply {
            targets,
            policy,
            dry_run,
            exclude,
            group_pattern,
            timestamp_source,
            move_to,
            json,
        } => {
            ApplyOverrides {
                policy: &policy,
                dry_run,
                exclude: exclude.as_deref(),
                group_pattern: group_pattern.as_deref(),
                timestamp_source,
                move_to: move_to.as_deref(),
            }
            .apply_to(&mut config);
            config.validate()?;
            run_apply(&config, targets, json)
        }
        Commands::Policy { policy } => {
            println!("{}", render_policy(&policy.merge_into(config.policy)));
            Ok(())
        }
    }
}
