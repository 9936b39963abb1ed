//! askdb-db: local database access
//!
//! Provisioning (download-on-first-use), a read-only SQLite
//! connection, schema introspection, and the guardrail that keeps the
//! agent's SQL read-only.

pub mod database;
pub mod error;
pub mod guard;
pub mod provision;

pub use database::{Database, QueryOutput};
pub use error::{Error, Result};
pub use guard::validate_read_only_sql;
pub use provision::{DEFAULT_DB_PATH, DEFAULT_DB_URL, ensure_database};
