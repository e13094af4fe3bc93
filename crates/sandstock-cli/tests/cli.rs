//! End-to-end runs of the CLI entry point against a temporary database.

use clap::Parser;
use sandstock_cli::app::App;
use sandstock_cli::cli::Cli;
use sandstock_cli::commands::Scale;
use sandstock_cli::run;
use sandstock_common_config::{ChangelogMode, SandstockConfig};
use sandstock_database::models::Product;
use sandstock_test_utils::{assert_err, assert_ok, temp_database};

fn config_for(path: &std::path::Path, mode: ChangelogMode) -> SandstockConfig {
    let mut config = SandstockConfig::default();
    config.database.path = path.to_string_lossy().into_owned();
    config.changelog.mode = mode;
    config.changelog.flush_interval_ms = 20;
    config.changelog.flush_threshold = 25;
    config
}

async fn sandstock(config: &SandstockConfig, args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("sandstock").chain(args.iter().copied()))?;
    run(&cli, config).await
}

async fn change_log_count(config: &SandstockConfig) -> i64 {
    let app = App::open(config).await.unwrap();
    let count = app.changelog().count().await.unwrap();
    app.shutdown().await.unwrap();
    count
}

#[tokio::test]
async fn test_migrate_reports_schema_version() {
    let (_dir, path) = temp_database();
    let config = config_for(&path, ChangelogMode::Immediate);

    let output = assert_ok!(sandstock(&config, &["migrate"]).await);
    assert!(output.contains("change_log"), "{output}");
    assert!(output.contains("Current version: 9"), "{output}");

    let output = assert_ok!(sandstock(&config, &["migrate", "--verify"]).await);
    assert!(output.contains("Schema is up to date"), "{output}");
}

#[tokio::test]
async fn test_seed_immediate_records_every_mutation() {
    let (_dir, path) = temp_database();
    let config = config_for(&path, ChangelogMode::Immediate);

    let output = assert_ok!(sandstock(&config, &["seed", "--scale", "small"]).await);
    let expected = Scale::Small.counts().expected_change_logs();
    assert!(output.contains(&format!("Change logs: {expected}")), "{output}");
    assert_eq!(change_log_count(&config).await, expected as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_seed_queued_flushes_before_exit() {
    let (_dir, path) = temp_database();
    let config = config_for(&path, ChangelogMode::Queued);

    assert_ok!(sandstock(&config, &["seed", "--scale", "small", "--seed", "7"]).await);

    let expected = Scale::Small.counts().expected_change_logs();
    assert_eq!(change_log_count(&config).await, expected as i64);
}

#[tokio::test]
async fn test_seed_refuses_populated_database() {
    let (_dir, path) = temp_database();
    let config = config_for(&path, ChangelogMode::Immediate);

    assert_ok!(sandstock(&config, &["seed", "--scale", "small"]).await);
    let err = assert_err!(sandstock(&config, &["seed", "--scale", "small"]).await);
    assert!(err.to_string().contains("already contains users"));
}

#[tokio::test]
async fn test_restock_records_update() {
    let (_dir, path) = temp_database();
    let config = config_for(&path, ChangelogMode::Immediate);
    assert_ok!(sandstock(&config, &["seed", "--scale", "small"]).await);

    let before = {
        let app = App::open(&config).await.unwrap();
        let mut uow = app.store().begin().await.unwrap();
        let product = uow.get::<Product>(1).await.unwrap();
        let quantity = product.quantity_available;
        uow.rollback().await.unwrap();
        app.shutdown().await.unwrap();
        quantity
    };

    let output = assert_ok!(sandstock(&config, &["restock", "1", "5", "--user", "2"]).await);
    assert!(output.contains(&format!("{} -> {}", before, before + 5)), "{output}");

    let app = App::open(&config).await.unwrap();
    let latest = app.changelog().list_for_table("dim_product", 1).await.unwrap();
    app.shutdown().await.unwrap();

    let log = &latest[0];
    assert_eq!(log.operation.to_string(), "UPDATE");
    let old = log.old_values().unwrap().unwrap();
    let new = log.new_values().unwrap().unwrap();
    assert_eq!(old["quantity_available"], before);
    assert_eq!(new["quantity_available"], before + 5);
    assert_eq!(new["modified_by"], 2);
    assert!(!new.contains_key("name"));
}

#[tokio::test]
async fn test_restock_missing_product_fails() {
    let (_dir, path) = temp_database();
    let config = config_for(&path, ChangelogMode::Immediate);

    let err = assert_err!(sandstock(&config, &["restock", "404", "5"]).await);
    assert!(err.to_string().contains("not found"), "{err}");
    assert_eq!(change_log_count(&config).await, 0);
}

#[tokio::test]
async fn test_changes_lists_newest_first() {
    let (_dir, path) = temp_database();
    let config = config_for(&path, ChangelogMode::Immediate);

    let output = assert_ok!(sandstock(&config, &["changes"]).await);
    assert_eq!(output.trim(), "No changes recorded");

    assert_ok!(sandstock(&config, &["seed", "--scale", "small"]).await);

    let output = assert_ok!(sandstock(&config, &["changes", "--table", "dim_user", "--limit", "2"]).await);
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.contains("INSERT dim_user")));

    let output = assert_ok!(sandstock(&config, &["changes", "--limit", "3", "--json"]).await);
    let logs: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs[0]["id"].as_i64() > logs[1]["id"].as_i64());
}
