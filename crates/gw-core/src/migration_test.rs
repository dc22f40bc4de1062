use super::*;

#[test]
fn test_parse_sequence_valid() {
    assert_eq!(parse_sequence("0000_ext.sql").unwrap(), 0);
    assert_eq!(parse_sequence("0042_add_users.sql").unwrap(), 42);
    assert_eq!(parse_sequence("9999_last.sql").unwrap(), 9999);
}

#[test]
fn test_parse_sequence_rejects_bad_names() {
    assert!(parse_sequence("1_short.sql").is_err());
    assert!(parse_sequence("00001_long.sql").is_err());
    assert!(parse_sequence("abcd_letters.sql").is_err());
    assert!(parse_sequence("0001.sql").is_err());
    assert!(parse_sequence("0001_.sql").is_err());
    assert!(parse_sequence("0001_noext").is_err());
    assert!(parse_sequence("readme.md").is_err());
}

#[test]
fn test_classify_ddl_is_strict() {
    assert_eq!(
        EscalationTier::classify("CREATE TABLE users (id INT);"),
        EscalationTier::Strict
    );
    assert_eq!(
        EscalationTier::classify("alter table users add column email text;"),
        EscalationTier::Strict
    );
    assert_eq!(
        EscalationTier::classify("CREATE INDEX idx ON users(id);"),
        EscalationTier::Strict
    );
}

#[test]
fn test_classify_seed_is_best_effort() {
    assert_eq!(
        EscalationTier::classify("INSERT INTO plans VALUES (1, 'free');"),
        EscalationTier::BestEffort
    );
    assert_eq!(
        EscalationTier::classify("UPDATE users SET active = true;"),
        EscalationTier::BestEffort
    );
}

#[test]
fn test_classify_ignores_comment_lines() {
    let sql = "-- CREATE TABLE mentioned in a comment only\nINSERT INTO t VALUES (1);";
    assert_eq!(EscalationTier::classify(sql), EscalationTier::BestEffort);
}

#[test]
fn test_annotations_parsed_from_header() {
    let sql = "-- gw:depends 0001_core.sql\n\
               -- gw:depends 0002_seed.sql\n\
               -- gw:on-failure retry_next_boot\n\
               INSERT INTO t VALUES (1);";
    let def = MigrationDefinition::from_sql("0003_more.sql", sql.to_string()).unwrap();
    assert_eq!(def.sequence, 3);
    assert_eq!(def.tier, EscalationTier::RetryNextBoot);
    assert!(def.depends_on.contains("0001_core.sql"));
    assert!(def.depends_on.contains("0002_seed.sql"));
    assert_eq!(def.depends_on.len(), 2);
}

#[test]
fn test_annotations_stop_at_first_statement() {
    let sql = "SELECT 1;\n-- gw:depends 0001_core.sql\n";
    let def = MigrationDefinition::from_sql("0002_x.sql", sql.to_string()).unwrap();
    assert!(def.depends_on.is_empty());
}

#[test]
fn test_tier_annotation_overrides_classification() {
    let sql = "-- gw:on-failure best_effort\nCREATE TABLE optional_cache (id INT);";
    let def = MigrationDefinition::from_sql("0004_cache.sql", sql.to_string()).unwrap();
    assert_eq!(def.tier, EscalationTier::BestEffort);
}

#[test]
fn test_invalid_tier_annotation_errors() {
    let sql = "-- gw:on-failure whatever\nSELECT 1;";
    let err = MigrationDefinition::from_sql("0005_x.sql", sql.to_string()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidTier { .. }));
}

#[test]
fn test_checksum_set_from_body() {
    let def =
        MigrationDefinition::from_sql("0001_a.sql", "SELECT 1;\n".to_string()).unwrap();
    assert_eq!(def.checksum, crate::checksum::compute_checksum("SELECT 1;"));
}
