use super::*;

#[test]
fn test_checksum_stable() {
    let a = compute_checksum("CREATE TABLE users (id INT);");
    let b = compute_checksum("CREATE TABLE users (id INT);");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
}

#[test]
fn test_checksum_changes_with_content() {
    let a = compute_checksum("CREATE TABLE users (id INT);");
    let b = compute_checksum("CREATE TABLE users (id BIGINT);");
    assert_ne!(a, b);
}

#[test]
fn test_line_endings_do_not_drift() {
    let unix = compute_checksum("SELECT 1;\nSELECT 2;\n");
    let windows = compute_checksum("SELECT 1;\r\nSELECT 2;\r\n");
    assert_eq!(unix, windows);
}

#[test]
fn test_trailing_whitespace_does_not_drift() {
    let clean = compute_checksum("SELECT 1;\nSELECT 2;");
    let padded = compute_checksum("SELECT 1;   \nSELECT 2;\t\n\n\n");
    assert_eq!(clean, padded);
}

#[test]
fn test_leading_whitespace_is_content() {
    // Indentation inside a statement is meaningful enough to keep.
    let a = compute_checksum("SELECT 1;");
    let b = compute_checksum("  SELECT 1;");
    assert_ne!(a, b);
}

#[test]
fn test_normalize_sql() {
    assert_eq!(normalize_sql("a  \r\nb\n\n"), "a\nb");
    assert_eq!(normalize_sql(""), "");
}
