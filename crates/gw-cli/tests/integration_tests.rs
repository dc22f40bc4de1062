//! End-to-end bootstrap tests across gw-core, gw-db, and gw-boot.

use gw_boot::{BootPhase, Coordinator, Ledger, MigrationStatus};
use gw_core::catalog;
use gw_core::config::Config;
use gw_core::resolver::MigrationDag;
use gw_db::{Database, DuckDbBackend};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn write_project(migrations: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let yaml = concat!(
        "name: integration\n",
        "database:\n",
        "  path: \":memory:\"\n",
        "lock:\n",
        "  timeout_ms: 2000\n",
        "  base_delay_ms: 10\n",
    );
    fs::write(dir.path().join("groundwork.yml"), yaml).unwrap();
    let migrations_dir = dir.path().join("migrations");
    fs::create_dir(&migrations_dir).unwrap();
    for (name, sql) in migrations {
        fs::write(migrations_dir.join(name), sql).unwrap();
    }
    dir
}

fn load_ordered(project: &TempDir, config: &Config) -> Vec<gw_core::MigrationDefinition> {
    let definitions = catalog::load(&config.migrations_dir(project.path())).unwrap();
    let dag = MigrationDag::build(&definitions);
    let order = dag.execution_order().unwrap();
    let mut by_name: HashMap<_, _> = definitions
        .into_iter()
        .map(|d| (d.filename.clone(), d))
        .collect();
    order
        .iter()
        .filter_map(|name| by_name.remove(name))
        .collect()
}

#[tokio::test]
async fn test_full_bootstrap_from_project_directory() {
    let project = write_project(&[
        (
            "0001_core.sql",
            "CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR);",
        ),
        (
            "0002_seed.sql",
            "INSERT INTO users VALUES (1, 'a@example.com') ON CONFLICT DO NOTHING;",
        ),
        (
            "0003_index.sql",
            "-- gw:depends 0001_core.sql\nCREATE UNIQUE INDEX idx_email ON users(email);",
        ),
    ]);
    let config = Config::load(&project.path().join("groundwork.yml")).unwrap();
    let ordered = load_ordered(&project, &config);
    assert_eq!(ordered.len(), 3);

    let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
    let coordinator = Coordinator::new(Arc::clone(&db), config);
    let report = coordinator.run(&ordered).await.unwrap();

    assert_eq!(report.phase, BootPhase::Ready);
    assert_eq!(report.applied.len(), 3);
    assert!(db.table_exists("users").await.unwrap());

    let ledger = Ledger::new(Arc::clone(&db));
    let records = ledger.read_all().await.unwrap();
    assert_eq!(records.len(), 3);
    assert!(records
        .values()
        .all(|r| r.status == MigrationStatus::Completed));
}

#[tokio::test]
async fn test_rerun_from_disk_detects_drift() {
    let project = write_project(&[(
        "0001_core.sql",
        "CREATE TABLE users (id INT PRIMARY KEY);",
    )]);
    let config = Config::load(&project.path().join("groundwork.yml")).unwrap();

    let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ordered = load_ordered(&project, &config);
    Coordinator::new(Arc::clone(&db), config.clone())
        .run(&ordered)
        .await
        .unwrap();

    // Edit the file on disk after it completed.
    fs::write(
        project.path().join("migrations/0001_core.sql"),
        "CREATE TABLE users (id BIGINT PRIMARY KEY);",
    )
    .unwrap();
    let drifted = load_ordered(&project, &config);

    let err = Coordinator::new(Arc::clone(&db), config)
        .run(&drifted)
        .await
        .unwrap_err();
    assert!(matches!(err, gw_boot::BootError::Drift { .. }));
}

#[tokio::test]
async fn test_formatting_only_edit_is_not_drift() {
    let project = write_project(&[(
        "0001_core.sql",
        "CREATE TABLE users (id INT PRIMARY KEY);\n",
    )]);
    let config = Config::load(&project.path().join("groundwork.yml")).unwrap();

    let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
    let ordered = load_ordered(&project, &config);
    Coordinator::new(Arc::clone(&db), config.clone())
        .run(&ordered)
        .await
        .unwrap();

    // CRLF conversion and trailing whitespace are not content changes.
    fs::write(
        project.path().join("migrations/0001_core.sql"),
        "CREATE TABLE users (id INT PRIMARY KEY);  \r\n\r\n",
    )
    .unwrap();
    let reread = load_ordered(&project, &config);

    let report = Coordinator::new(Arc::clone(&db), config)
        .run(&reread)
        .await
        .unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert!(report.applied.is_empty());
}
