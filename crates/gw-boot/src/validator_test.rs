use super::*;
use gw_db::DuckDbBackend;

async fn db_with_users() -> Arc<dyn Database> {
    let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
    db.execute_batch("CREATE TABLE users (id INT, email VARCHAR);")
        .await
        .unwrap();
    db
}

fn expect(tables: &[(&str, &[&str])], mode: ValidatorMode) -> ValidatorConfig {
    ValidatorConfig {
        mode,
        expected: tables
            .iter()
            .map(|(t, cols)| {
                (
                    t.to_string(),
                    cols.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_matching_schema_passes() {
    let db = db_with_users().await;
    let config = expect(&[("users", &["id", "email"])], ValidatorMode::Strict);
    let diff = validate(&db, &config).await.unwrap();
    assert!(diff.is_empty());
}

#[tokio::test]
async fn test_empty_expectation_passes() {
    let db = db_with_users().await;
    let config = ValidatorConfig::default();
    assert!(validate(&db, &config).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_table_strict_blocks() {
    let db = db_with_users().await;
    let config = expect(
        &[("users", &["id"]), ("projects", &["id"])],
        ValidatorMode::Strict,
    );
    let err = validate(&db, &config).await.unwrap_err();
    match err {
        BootError::Validation(diff) => {
            assert_eq!(diff.missing_tables, vec!["projects"]);
            assert!(diff.missing_columns.is_empty());
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_column_reported_per_table() {
    let db = db_with_users().await;
    let config = expect(&[("users", &["id", "email", "role"])], ValidatorMode::Strict);
    let err = validate(&db, &config).await.unwrap_err();
    match err {
        BootError::Validation(diff) => {
            assert_eq!(diff.missing_columns["users"], vec!["role"]);
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_permissive_mode_returns_diff_without_error() {
    let db = db_with_users().await;
    let config = expect(&[("projects", &["id"])], ValidatorMode::Permissive);
    let diff = validate(&db, &config).await.unwrap();
    assert_eq!(diff.missing_tables, vec!["projects"]);
}

#[test]
fn test_diff_display() {
    let mut diff = SchemaDiff::default();
    assert_eq!(diff.to_string(), "no differences");

    diff.missing_tables.push("projects".to_string());
    diff.missing_columns
        .insert("users".to_string(), vec!["role".to_string()]);
    let s = diff.to_string();
    assert!(s.contains("missing tables: projects"));
    assert!(s.contains("users missing columns: role"));
}
