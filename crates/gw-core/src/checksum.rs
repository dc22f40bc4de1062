//! SHA-256 checksums over normalized SQL for drift detection.

use sha2::{Digest, Sha256};

/// Normalize SQL text so incidental formatting does not change the checksum.
///
/// CRLF line endings become LF, trailing whitespace is stripped from each
/// line, and trailing blank lines are dropped. The content itself (including
/// comments) is untouched, so any real edit still registers as drift.
pub fn normalize_sql(sql: &str) -> String {
    let mut lines: Vec<String> = sql
        .replace("\r\n", "\n")
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Compute SHA256 checksum of normalized SQL text
pub fn compute_checksum(sql: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_sql(sql).as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
