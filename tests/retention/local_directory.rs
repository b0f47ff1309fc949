use std::collections::BTreeSet;
use std::fs;
use std::time::{Duration, SystemTime};

use regex::Regex;

use tierkeep::RetentionError;
use tierkeep::config::{Config, PruneAction, TimestampSource};
use tierkeep::core::{PatternGrouping, PolicyConfig, Retention, Tier};
use tierkeep::storage::{
    self, DeletePruner, DirectoryFinder, FilenameTimeResolver, ModifiedTimeResolver, MovePruner,
};

use crate::retention_harness::{backup_dir, remaining};

fn by_name() -> Box<DirectoryFinder> {
    Box::new(DirectoryFinder::new(Box::new(FilenameTimeResolver)))
}

#[test]
fn deletes_files_outside_policy() {
    let (_tmp, root) = backup_dir(&[
        "db-2023-05-05.sql",
        "db-2023-05-04.sql",
        "db-2023-05-03.sql",
        "db-2023-04-30.sql",
        "db-2023-03-31.sql",
    ]);
    let policy = PolicyConfig {
        keep_last: 2,
        keep_monthly: 2,
        ..PolicyConfig::default()
    };
    let result = Retention::new(policy, by_name(), Box::new(DeletePruner))
        .apply(&root)
        .unwrap();

    assert_eq!(
        remaining(&root),
        vec!["db-2023-04-30.sql", "db-2023-05-04.sql", "db-2023-05-05.sql"]
    );
    assert_eq!(result.prune.len(), 2);
    assert_eq!(
        result.reasons(&root.join("db-2023-04-30.sql")),
        Some(&BTreeSet::from([Tier::Monthly]))
    );
}

#[test]
fn dry_run_leaves_directory_untouched() {
    let names = ["a-2023-05-05.tar", "a-2023-05-04.tar", "a-2023-05-03.tar"];
    let (_tmp, root) = backup_dir(&names);
    let result = Retention::new(PolicyConfig::default(), by_name(), Box::new(DeletePruner))
        .with_dry_run(true)
        .apply(&root)
        .unwrap();

    assert_eq!(result.keep.len(), 1);
    assert_eq!(result.prune.len(), 2);
    assert_eq!(remaining(&root).len(), 3);
}

#[test]
fn removes_directories_recursively() {
    let (_tmp, root) = backup_dir(&[]);
    for day in ["2023-05-05", "2023-05-04", "2023-05-03"] {
        let run = root.join(day);
        fs::create_dir_all(run.join("db")).unwrap();
        fs::write(run.join("db").join("dump.sql"), day).unwrap();
    }
    let policy = PolicyConfig {
        keep_last: 1,
        ..PolicyConfig::default()
    };
    let result = Retention::new(policy, by_name(), Box::new(DeletePruner))
        .apply(&root)
        .unwrap();

    assert!(result.prune.iter().all(tierkeep::core::Item::is_directory));
    assert_eq!(remaining(&root), vec!["2023-05-05"]);
}

#[test]
fn grouped_runs_are_kept_together() {
    let (_tmp, root) = backup_dir(&[
        "20230505_0300-db.sql",
        "20230505_0310-files.tar",
        "20230504_0300-db.sql",
        "20230504_0310-files.tar",
        "20230503_0300-db.sql",
    ]);
    let policy = PolicyConfig {
        keep_last: 2,
        ..PolicyConfig::default()
    };
    let grouping = PatternGrouping::new(Regex::new(r"^(\d{8})_").unwrap());
    let result = Retention::new(policy, by_name(), Box::new(DeletePruner))
        .with_grouping(Box::new(grouping))
        .apply(&root)
        .unwrap();

    assert_eq!(result.keep.len(), 4);
    assert_eq!(
        remaining(&root),
        vec![
            "20230504_0300-db.sql",
            "20230504_0310-files.tar",
            "20230505_0300-db.sql",
            "20230505_0310-files.tar",
        ]
    );
}

#[test]
fn excluded_entries_are_neither_kept_nor_pruned() {
    let (_tmp, root) = backup_dir(&[
        "db-2023-05-05.sql",
        "db-2023-05-04.sql",
        "db-2023-05-06.sql.partial",
    ]);
    let finder = DirectoryFinder::new(Box::new(FilenameTimeResolver))
        .with_exclude(Regex::new(r"\.partial$").unwrap());
    let result = Retention::new(PolicyConfig::default(), Box::new(finder), Box::new(DeletePruner))
        .apply(&root)
        .unwrap();

    assert!(result.is_kept(&root.join("db-2023-05-05.sql")));
    assert_eq!(
        remaining(&root),
        vec!["db-2023-05-05.sql", "db-2023-05-06.sql.partial"]
    );
}

#[test]
fn move_pruner_archives_discarded_entries() {
    let (tmp, root) = backup_dir(&["x-2023-05-05.tar", "x-2023-05-04.tar"]);
    let archive = tmp.path().join("trash");
    Retention::new(
        PolicyConfig::default(),
        by_name(),
        Box::new(MovePruner::new(&archive)),
    )
    .apply(&root)
    .unwrap();

    assert_eq!(remaining(&root), vec!["x-2023-05-05.tar"]);
    assert!(archive.join("x-2023-05-04.tar").exists());
}

#[test]
fn shared_archive_never_overwrites_earlier_moves() {
    let (tmp, db) = backup_dir(&["2024-01-02.tar", "2024-01-01.tar"]);
    let files = tmp.path().join("files");
    fs::create_dir(&files).unwrap();
    fs::write(files.join("2024-01-02.tar"), "files-new").unwrap();
    fs::write(files.join("2024-01-01.tar"), "files-old").unwrap();
    let archive = tmp.path().join("trash");

    let retention = Retention::new(
        PolicyConfig::default(),
        by_name(),
        Box::new(MovePruner::new(&archive)),
    );
    retention.apply(&db).unwrap();
    let err = retention.apply(&files).unwrap_err();

    assert!(matches!(err, RetentionError::Disposal { .. }));
    assert_eq!(
        fs::read_to_string(archive.join("2024-01-01.tar")).unwrap(),
        "2024-01-01.tar"
    );
    assert_eq!(remaining(&files), vec!["2024-01-01.tar", "2024-01-02.tar"]);
}

#[test]
fn archive_inside_target_is_not_a_candidate() {
    let (_tmp, root) = backup_dir(&["alpha", "beta", "gamma"]);
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    for (name, age_days) in [("alpha", 2), ("beta", 0), ("gamma", 1)] {
        let file = fs::File::options()
            .write(true)
            .open(root.join(name))
            .unwrap();
        file.set_modified(base - Duration::from_secs(age_days * 86_400))
            .unwrap();
    }
    let archive = root.join(".trash");
    fs::create_dir(&archive).unwrap();
    let config = Config {
        timestamp_source: TimestampSource::Modified,
        action: PruneAction::Move,
        move_to: Some(archive.to_string_lossy().into_owned()),
        ..Config::default()
    };

    for _ in 0..2 {
        let result = Retention::new(
            config.policy,
            storage::create_finder(&config).unwrap(),
            storage::create_pruner(&config).unwrap(),
        )
        .apply(&root)
        .unwrap();
        assert!(result.is_kept(&root.join("beta")));
        assert!(!result.is_kept(&archive));
        assert!(result.prune.iter().all(|i| i.path() != archive.as_path()));
    }

    assert_eq!(remaining(&root), vec![".trash", "beta"]);
    assert_eq!(remaining(&archive), vec!["alpha", "gamma"]);
}

#[cfg(unix)]
#[test]
fn symlinked_backup_is_unlinked_without_touching_its_target() {
    let (tmp, root) = backup_dir(&["2024-01-02.sql"]);
    let precious = tmp.path().join("precious");
    fs::create_dir(&precious).unwrap();
    fs::write(precious.join("live-db.sql"), "live").unwrap();
    std::os::unix::fs::symlink(precious.join("live-db.sql"), root.join("2024-01-01.sql"))
        .unwrap();

    let result = Retention::new(PolicyConfig::default(), by_name(), Box::new(DeletePruner))
        .apply(&root)
        .unwrap();

    assert_eq!(result.prune.len(), 1);
    assert_eq!(remaining(&root), vec!["2024-01-02.sql"]);
    assert_eq!(
        fs::read_to_string(precious.join("live-db.sql")).unwrap(),
        "live"
    );
}

#[test]
fn modification_time_orders_candidates() {
    let (_tmp, root) = backup_dir(&["alpha", "beta", "gamma"]);
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    for (name, age_days) in [("alpha", 2), ("beta", 0), ("gamma", 1)] {
        let file = fs::File::options()
            .write(true)
            .open(root.join(name))
            .unwrap();
        file.set_modified(base - Duration::from_secs(age_days * 86_400))
            .unwrap();
    }
    let policy = PolicyConfig {
        keep_last: 2,
        ..PolicyConfig::default()
    };
    let finder = DirectoryFinder::new(Box::new(ModifiedTimeResolver));
    Retention::new(policy, Box::new(finder), Box::new(DeletePruner))
        .apply(&root)
        .unwrap();

    assert_eq!(remaining(&root), vec!["beta", "gamma"]);
}

#[test]
fn empty_directory_is_an_error() {
    let (_tmp, root) = backup_dir(&[]);
    let err = Retention::new(PolicyConfig::default(), by_name(), Box::new(DeletePruner))
        .apply(&root)
        .unwrap_err();
    assert!(matches!(err, RetentionError::EmptyResult { .. }));
}

#[test]
fn missing_directory_is_a_discovery_error() {
    let (_tmp, root) = backup_dir(&[]);
    let err = Retention::new(PolicyConfig::default(), by_name(), Box::new(DeletePruner))
        .apply(&root.join("absent"))
        .unwrap_err();
    assert!(matches!(err, RetentionError::Discovery { .. }));
}

#[test]
fn second_run_keeps_the_same_set() {
    let (_tmp, root) = backup_dir(&[
        "b-2023-05-05.tar",
        "b-2023-05-04.tar",
        "b-2023-04-20.tar",
        "b-2023-04-01.tar",
        "b-2023-02-11.tar",
        "b-2022-12-31.tar",
    ]);
    let policy = PolicyConfig {
        keep_last: 1,
        keep_daily: 2,
        keep_monthly: 2,
        keep_yearly: 2,
        ..PolicyConfig::default()
    };
    let first = Retention::new(policy, by_name(), Box::new(DeletePruner))
        .apply(&root)
        .unwrap();
    let after_first = remaining(&root);

    let second = Retention::new(policy, by_name(), Box::new(DeletePruner))
        .apply(&root)
        .unwrap();
    assert!(second.prune.is_empty());
    assert_eq!(remaining(&root), after_first);
    assert_eq!(first.keep.len(), second.keep.len());
}
