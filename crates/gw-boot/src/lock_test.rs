use super::*;
use gw_db::DuckDbBackend;

fn test_db() -> Arc<dyn Database> {
    Arc::new(DuckDbBackend::in_memory().unwrap())
}

fn fast_config() -> LockConfig {
    LockConfig {
        key: "test_boot".to_string(),
        timeout_ms: 300,
        base_delay_ms: 10,
    }
}

#[tokio::test]
async fn test_acquire_uncontended() {
    let db = test_db();
    let lock = BootLock::acquire(&db, &fast_config(), "holder-a".to_string())
        .await
        .unwrap();
    assert_eq!(lock.key, "test_boot");
    assert_eq!(lock.holder, "holder-a");
    lock.release(&db).await;
}

#[tokio::test]
async fn test_acquire_times_out_when_held() {
    let db = test_db();
    let config = fast_config();
    let held = BootLock::acquire(&db, &config, "holder-a".to_string())
        .await
        .unwrap();

    let start = std::time::Instant::now();
    let err = BootLock::acquire(&db, &config, "holder-b".to_string())
        .await
        .unwrap_err();
    match err {
        BootError::LockTimeout { key, attempts, .. } => {
            assert_eq!(key, "test_boot");
            assert!(attempts >= 2, "expected retries, got {}", attempts);
        }
        other => panic!("expected LockTimeout, got {:?}", other),
    }
    // Must not have blocked far beyond the configured budget.
    assert!(start.elapsed() < std::time::Duration::from_millis(2_000));

    held.release(&db).await;
}

#[tokio::test]
async fn test_acquire_after_release() {
    let db = test_db();
    let config = fast_config();

    let first = BootLock::acquire(&db, &config, "holder-a".to_string())
        .await
        .unwrap();
    first.release(&db).await;

    BootLock::acquire(&db, &config, "holder-b".to_string())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_waiter_gets_lock_when_holder_releases() {
    let db = test_db();
    let config = LockConfig {
        key: "test_boot".to_string(),
        timeout_ms: 2_000,
        base_delay_ms: 10,
    };

    let held = BootLock::acquire(&db, &config, "holder-a".to_string())
        .await
        .unwrap();

    let db2 = Arc::clone(&db);
    let config2 = config.clone();
    let waiter = tokio::spawn(async move {
        BootLock::acquire(&db2, &config2, "holder-b".to_string()).await
    });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    held.release(&db).await;

    let lock = waiter.await.unwrap().unwrap();
    assert_eq!(lock.holder, "holder-b");
}

#[test]
fn test_holder_identity_unique() {
    let a = BootLock::holder_identity();
    let b = BootLock::holder_identity();
    assert_ne!(a, b);
    assert!(a.starts_with("gw-"));
}
