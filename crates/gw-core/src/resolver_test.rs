use super::*;
use crate::migration::MigrationDefinition;

fn def(filename: &str, sql: &str) -> MigrationDefinition {
    MigrationDefinition::from_sql(filename, sql.to_string()).unwrap()
}

#[test]
fn test_default_order_is_sequence() {
    let catalog = vec![
        def("0000_ext.sql", "SELECT 1;"),
        def("0001_core.sql", "SELECT 1;"),
        def("0002_seed.sql", "SELECT 1;"),
    ];
    let dag = MigrationDag::build(&catalog);
    assert_eq!(
        dag.execution_order().unwrap(),
        vec!["0000_ext.sql", "0001_core.sql", "0002_seed.sql"]
    );
}

#[test]
fn test_declared_dependency_reorders() {
    // B (0001) depends on A (0002): declared dependency wins over sequence.
    let catalog = vec![
        def("0000_c.sql", "SELECT 1;"),
        def(
            "0001_b.sql",
            "-- gw:depends 0002_a.sql\nSELECT 1;",
        ),
        def("0002_a.sql", "SELECT 1;"),
    ];
    let dag = MigrationDag::build(&catalog);
    let order = dag.execution_order().unwrap();

    let pos = |name: &str| order.iter().position(|f| f == name).unwrap();
    assert!(pos("0002_a.sql") < pos("0001_b.sql"));
    assert_eq!(order.len(), 3);
}

#[test]
fn test_discovery_order_does_not_matter() {
    // Files discovered as C, A, B where B depends on A: A still precedes B.
    let catalog = vec![
        def("0001_a.sql", "SELECT 1;"),
        def("0002_b.sql", "-- gw:depends 0001_a.sql\nSELECT 1;"),
        def("0003_c.sql", "SELECT 1;"),
    ];
    let dag = MigrationDag::build(&catalog);
    let order = dag.execution_order().unwrap();
    let pos = |name: &str| order.iter().position(|f| f == name).unwrap();
    assert!(pos("0001_a.sql") < pos("0002_b.sql"));
}

#[test]
fn test_cycle_detected_with_names() {
    let catalog = vec![
        def("0001_a.sql", "-- gw:depends 0002_b.sql\nSELECT 1;"),
        def("0002_b.sql", "-- gw:depends 0001_a.sql\nSELECT 1;"),
    ];
    let dag = MigrationDag::build(&catalog);
    let err = dag.execution_order().unwrap_err();
    match err {
        CoreError::CircularDependency { cycle } => {
            assert!(cycle.contains("0001_a.sql"), "cycle was: {}", cycle);
            assert!(cycle.contains("0002_b.sql"), "cycle was: {}", cycle);
        }
        other => panic!("expected CircularDependency, got {:?}", other),
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let catalog = vec![def(
        "0001_a.sql",
        "-- gw:depends 0001_a.sql\nSELECT 1;",
    )];
    let dag = MigrationDag::build(&catalog);
    assert!(matches!(
        dag.execution_order().unwrap_err(),
        CoreError::CircularDependency { .. }
    ));
}

#[test]
fn test_unknown_dependency_falls_back_to_sequence() {
    let catalog = vec![
        def("0001_a.sql", "SELECT 1;"),
        def(
            "0002_b.sql",
            "-- gw:depends 9999_never_written.sql\nSELECT 1;",
        ),
    ];
    let dag = MigrationDag::build(&catalog);
    // Does not abort; plain sequence order.
    assert_eq!(
        dag.execution_order().unwrap(),
        vec!["0001_a.sql", "0002_b.sql"]
    );
}

#[test]
fn test_dependencies_listing() {
    let catalog = vec![
        def("0001_a.sql", "SELECT 1;"),
        def("0002_b.sql", "-- gw:depends 0001_a.sql\nSELECT 1;"),
    ];
    let dag = MigrationDag::build(&catalog);
    assert_eq!(dag.dependencies("0002_b.sql"), vec!["0001_a.sql"]);
    assert!(dag.dependencies("0001_a.sql").is_empty());
    assert!(dag.dependencies("missing.sql").is_empty());
}
