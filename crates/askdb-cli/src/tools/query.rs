use std::sync::Arc;

use askdb_agent::{Tool, ToolResult};
use askdb_db::Database;
use async_trait::async_trait;

/// Default cap on rows returned to the model.
pub const DEFAULT_ROW_CAP: usize = 40;

/// Runs a read-only SQL query and returns the results as text.
pub struct QueryTool {
    db: Arc<Database>,
    row_cap: usize,
}

impl QueryTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_row_cap(db, DEFAULT_ROW_CAP)
    }

    pub fn with_row_cap(db: Arc<Database>, row_cap: usize) -> Self {
        Self { db, row_cap }
    }
}

#[async_trait]
impl Tool for QueryTool {
    fn name(&self) -> &str {
        "sql_db_query"
    }

    fn description(&self) -> &str {
        "Execute a read-only SQLite query and return the results. \
         If the query is incorrect, an error message is returned; \
         rewrite the query and try again."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A syntactically correct SQLite SELECT query"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> ToolResult {
        let query = match arguments.get("query").and_then(|v| v.as_str()) {
            Some(query) => query,
            None => return ToolResult::error("Missing required argument 'query'"),
        };

        tracing::debug!(query, "executing SQL query");

        match self.db.run_query(query, self.row_cap) {
            Ok(output) => ToolResult::text(output.to_text()),
            Err(e) => ToolResult::error(format!("Error: {}", e)),
        }
    }
}
