//! Migration definition types and file-header annotation parsing.

use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Annotation prefix recognized in migration file headers.
///
/// Supported annotations:
/// - `-- gw:depends NNNN_slug.sql` (repeatable)
/// - `-- gw:on-failure strict|best_effort|retry_next_boot`
const ANNOTATION_PREFIX: &str = "-- gw:";

/// How a migration's execution failure affects the overall bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTier {
    /// Failure aborts the entire bootstrap run immediately
    Strict,
    /// Failure is recorded and logged; the run continues
    BestEffort,
    /// Like BestEffort, but named for its intent: the `failed` ledger row
    /// means the next lock holder retries this migration automatically
    RetryNextBoot,
}

impl EscalationTier {
    /// Default tier for a migration body with no explicit annotation.
    ///
    /// Anything carrying `CREATE` or `ALTER TABLE` DDL defaults to Strict;
    /// pure data-seeding statements default to BestEffort.
    pub fn classify(sql: &str) -> Self {
        let upper = sql.to_uppercase();
        let has_ddl = upper
            .lines()
            .map(str::trim_start)
            .filter(|l| !l.starts_with("--"))
            .any(|l| l.starts_with("CREATE ") || l.contains("ALTER TABLE"));
        if has_ddl {
            EscalationTier::Strict
        } else {
            EscalationTier::BestEffort
        }
    }

    /// Parse an annotation value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "strict" => Some(EscalationTier::Strict),
            "best_effort" => Some(EscalationTier::BestEffort),
            "retry_next_boot" => Some(EscalationTier::RetryNextBoot),
            _ => None,
        }
    }

    /// Whether a failure at this tier aborts the whole run
    pub fn aborts_run(&self) -> bool {
        matches!(self, EscalationTier::Strict)
    }
}

impl fmt::Display for EscalationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscalationTier::Strict => write!(f, "strict"),
            EscalationTier::BestEffort => write!(f, "best_effort"),
            EscalationTier::RetryNextBoot => write!(f, "retry_next_boot"),
        }
    }
}

/// One migration file, loaded fresh from the catalog each bootstrap run.
///
/// Immutable once constructed; ordering across the catalog follows
/// `sequence`, which is strictly increasing.
#[derive(Debug, Clone)]
pub struct MigrationDefinition {
    /// Zero-padded numeric prefix of the filename
    pub sequence: u32,

    /// Full filename, e.g. `0001_core.sql` (the ledger key)
    pub filename: String,

    /// SHA-256 over the normalized SQL body
    pub checksum: String,

    /// Raw SQL body as read from disk
    pub sql_body: String,

    /// Filenames that must run before this one
    pub depends_on: BTreeSet<String>,

    /// Failure escalation tier
    pub tier: EscalationTier,
}

impl MigrationDefinition {
    /// Build a definition from a filename and its SQL body.
    ///
    /// Parses the `NNNN_slug.sql` convention and any `-- gw:` header
    /// annotations. The checksum is computed over the normalized body.
    pub fn from_sql(filename: &str, sql_body: String) -> CoreResult<Self> {
        let sequence = parse_sequence(filename)?;
        let (depends_on, tier_override) = parse_annotations(filename, &sql_body)?;
        let tier = tier_override.unwrap_or_else(|| EscalationTier::classify(&sql_body));

        Ok(Self {
            sequence,
            filename: filename.to_string(),
            checksum: compute_checksum(&sql_body),
            sql_body,
            depends_on,
            tier,
        })
    }
}

/// Parse the `{4-digit}_{slug}.sql` filename convention, returning the sequence.
pub fn parse_sequence(filename: &str) -> CoreResult<u32> {
    let invalid = |reason: &str| CoreError::InvalidMigrationFilename {
        filename: filename.to_string(),
        reason: reason.to_string(),
    };

    let stem = filename
        .strip_suffix(".sql")
        .ok_or_else(|| invalid("missing .sql extension"))?;

    let (prefix, slug) = stem
        .split_once('_')
        .ok_or_else(|| invalid("expected NNNN_slug.sql"))?;

    if prefix.len() != 4 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("sequence prefix must be exactly 4 digits"));
    }
    if slug.is_empty() {
        return Err(invalid("slug must not be empty"));
    }

    // 4 ASCII digits always fit in u32
    Ok(prefix.parse::<u32>().expect("4-digit prefix parses as u32"))
}

/// Scan the leading comment block for `-- gw:` annotations.
///
/// Scanning stops at the first non-comment, non-blank line so annotations
/// buried inside SQL bodies are ignored rather than silently honored.
fn parse_annotations(
    filename: &str,
    sql: &str,
) -> CoreResult<(BTreeSet<String>, Option<EscalationTier>)> {
    let mut depends_on = BTreeSet::new();
    let mut tier = None;

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with("--") {
            break;
        }
        let Some(rest) = trimmed.strip_prefix(ANNOTATION_PREFIX) else {
            continue;
        };

        let (key, value) = match rest.split_once(char::is_whitespace) {
            Some((k, v)) => (k, v.trim()),
            None => (rest, ""),
        };

        match key {
            "depends" => {
                if value.is_empty() {
                    log::warn!("{}: empty gw:depends annotation ignored", filename);
                } else {
                    depends_on.insert(value.to_string());
                }
            }
            "on-failure" => {
                tier = Some(EscalationTier::parse(value).ok_or_else(|| {
                    CoreError::InvalidTier {
                        filename: filename.to_string(),
                        value: value.to_string(),
                    }
                })?);
            }
            other => {
                log::warn!("{}: unknown annotation 'gw:{}' ignored", filename, other);
            }
        }
    }

    Ok((depends_on, tier))
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
