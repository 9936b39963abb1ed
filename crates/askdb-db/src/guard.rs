//! Read-only SQL guardrail
//!
//! The agent only ever reads; any SQL that could mutate the database
//! or escape a single statement is rejected before it reaches the
//! connection.

use crate::error::{Error, Result};

const MUTATING_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "create", "alter", "drop", "replace", "truncate", "attach",
    "detach", "pragma", "vacuum", "reindex", "analyze", "begin", "commit", "rollback",
];

/// Validate that `raw_sql` is a single read-only statement.
///
/// Allowed forms: `SELECT ...`, `WITH ... SELECT ...`,
/// `EXPLAIN SELECT ...`, `EXPLAIN QUERY PLAN SELECT ...`.
pub fn validate_read_only_sql(raw_sql: &str) -> Result<()> {
    let candidate = strip_trailing_semicolons(raw_sql);
    if candidate.is_empty() {
        return Err(Error::Guardrail(
            "SQL query is empty; provide a SELECT statement".to_string(),
        ));
    }

    // Scan the statement shape only: text inside string literals is
    // data, not SQL, and must not trip the keyword or semicolon checks.
    let masked = mask_string_literals(candidate);

    if masked.contains(';') {
        return Err(Error::Guardrail(
            "Multi-statement SQL is not allowed; submit exactly one read-only statement"
                .to_string(),
        ));
    }

    let normalized = masked.to_ascii_lowercase();
    if let Some(keyword) = first_mutating_keyword(&normalized) {
        return Err(Error::Guardrail(format!(
            "Mutating SQL keyword `{keyword}` is not allowed"
        )));
    }

    let allowed = normalized.starts_with("select")
        || normalized.starts_with("with")
        || normalized.starts_with("explain select")
        || normalized.starts_with("explain query plan select");
    if !allowed {
        return Err(Error::Guardrail(
            "Only SELECT, WITH ... SELECT, and EXPLAIN ... SELECT statements are allowed"
                .to_string(),
        ));
    }

    Ok(())
}

fn strip_trailing_semicolons(raw_sql: &str) -> &str {
    let mut candidate = raw_sql.trim();
    while let Some(stripped) = candidate.strip_suffix(';') {
        candidate = stripped.trim_end();
    }
    candidate
}

/// Replace every single-quoted string literal with `''`.
///
/// SQLite escapes a quote inside a literal by doubling it, so `''`
/// within a literal does not terminate it. An unterminated literal
/// swallows the rest of the input.
fn mask_string_literals(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\'' {
            out.push(ch);
            continue;
        }
        out.push_str("''");
        loop {
            match chars.next() {
                Some('\'') => {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                    } else {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            }
        }
    }
    out
}

fn first_mutating_keyword(normalized_sql: &str) -> Option<String> {
    normalized_sql
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .find_map(|token| {
            MUTATING_KEYWORDS
                .contains(&token)
                .then_some(token.to_string())
        })
}
