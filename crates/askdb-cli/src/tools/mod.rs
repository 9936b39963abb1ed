//! Database tools exposed to the agent
//!
//! Mirrors the standard SQL toolkit shape: list tables, inspect
//! schemas, run a read-only query.

mod list_tables;
mod query;
mod schema;

pub use list_tables::ListTablesTool;
pub use query::{DEFAULT_ROW_CAP, QueryTool};
pub use schema::SchemaTool;
