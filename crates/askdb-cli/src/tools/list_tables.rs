use std::sync::Arc;

use askdb_agent::{Tool, ToolResult};
use askdb_db::Database;
use async_trait::async_trait;

/// Lists the tables available in the database.
pub struct ListTablesTool {
    db: Arc<Database>,
}

impl ListTablesTool {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for ListTablesTool {
    fn name(&self) -> &str {
        "sql_db_list_tables"
    }

    fn description(&self) -> &str {
        "List all tables in the database. Input is ignored. Output is a comma-separated list of table names."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> ToolResult {
        match self.db.list_tables() {
            Ok(tables) => ToolResult::text(tables.join(", ")),
            Err(e) => ToolResult::error(format!("Error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::seeded_database;

    #[tokio::test]
    async fn test_lists_tables_sorted() {
        let (_dir, db) = seeded_database();
        let tool = ListTablesTool::new(db);

        let result = tool.execute(serde_json::json!({})).await;
        assert!(!result.is_error);
        assert_eq!(result.text_content(), "Album, Artist");
    }
}
