use std::sync::Arc;

use askdb_agent::{Tool, ToolResult};
use askdb_db::Database;
use async_trait::async_trait;

/// Shows the CREATE statements and sample rows for the given tables.
pub struct SchemaTool {
    db: Arc<Database>,
}

impl SchemaTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for SchemaTool {
    fn name(&self) -> &str {
        "sql_db_schema"
    }

    fn description(&self) -> &str {
        "Get the schema and sample rows for the given tables. \
         Be sure the tables exist by calling sql_db_list_tables first."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "tables": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Names of the tables to describe"
                }
            },
            "required": ["tables"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> ToolResult {
        let tables: Vec<String> = match arguments.get("tables") {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(tables) => tables,
                Err(e) => return ToolResult::error(format!("Invalid 'tables' argument: {}", e)),
            },
            None => return ToolResult::error("Missing required argument 'tables'"),
        };

        if tables.is_empty() {
            return ToolResult::error("Argument 'tables' must name at least one table");
        }

        match self.db.table_schema(&tables) {
            Ok(schema) => ToolResult::text(schema),
            Err(e) => ToolResult::error(format!("Error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::seeded_database;

    #[tokio::test]
    async fn test_schema_includes_ddl_and_samples() {
        let (_dir, db) = seeded_database();
        let tool = SchemaTool::new(db);

        let result = tool
            .execute(serde_json::json!({"tables": ["Artist"]}))
            .await;
        assert!(!result.is_error);
        let text = result.text_content();
        assert!(text.contains("CREATE TABLE \"Artist\""));
        assert!(text.contains("AC/DC"));
    }

    #[tokio::test]
    async fn test_unknown_table_reported_inline() {
        let (_dir, db) = seeded_database();
        let tool = SchemaTool::new(db);

        let result = tool
            .execute(serde_json::json!({"tables": ["Nope"]}))
            .await;
        assert!(!result.is_error);
        assert!(result.text_content().contains("'Nope' not found"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_error() {
        let (_dir, db) = seeded_database();
        let tool = SchemaTool::new(db);

        let result = tool.execute(serde_json::json!({})).await;
        assert!(result.is_error);
    }
}
