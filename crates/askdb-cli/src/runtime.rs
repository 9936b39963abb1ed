//! Session runtime
//!
//! Holds the settings for a chat session and lazily constructs the
//! agent on first use: downloads the database file if absent, opens a
//! read-only connection, and wires the SQL tools into the agent. The
//! constructed agent is kept for the life of the session so repeated
//! questions reuse the same connection and tool set.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use askdb_agent::{Agent, AgentConfig, ClientTransport};
use askdb_ai::OpenAIClient;
use askdb_db::{Database, ensure_database};

use crate::tools::{ListTablesTool, QueryTool, SchemaTool};

/// Settings resolved from CLI flags, config file, and defaults.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub api_key: String,
    pub model: String,
    pub db_path: PathBuf,
    pub db_url: String,
    pub row_cap: usize,
}

/// Lazily-initialized session state.
pub struct SessionRuntime {
    settings: SessionSettings,
    agent: Option<Arc<Agent>>,
}

impl SessionRuntime {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            agent: None,
        }
    }

    /// Get the session agent, building it on first call.
    pub async fn agent(&mut self) -> anyhow::Result<Arc<Agent>> {
        if let Some(agent) = &self.agent {
            return Ok(agent.clone());
        }

        let agent = Arc::new(self.build().await?);
        self.agent = Some(agent.clone());
        Ok(agent)
    }

    async fn build(&self) -> anyhow::Result<Agent> {
        let downloaded = ensure_database(&self.settings.db_path, &self.settings.db_url)
            .await
            .context("failed to provision database file")?;
        if downloaded {
            tracing::info!(path = %self.settings.db_path.display(), "downloaded database");
        }

        let db = Arc::new(
            Database::open(&self.settings.db_path).context("failed to open database")?,
        );

        let client = OpenAIClient::new(&self.settings.api_key);
        let transport = Arc::new(ClientTransport::new(client));

        let config = AgentConfig::new(
            build_system_prompt(self.settings.row_cap),
            &self.settings.model,
        );

        let mut agent = Agent::new(config, transport);
        agent.add_tool(Arc::new(ListTablesTool::new(db.clone())));
        agent.add_tool(Arc::new(SchemaTool::new(db.clone())));
        agent.add_tool(Arc::new(QueryTool::with_row_cap(db, self.settings.row_cap)));

        Ok(agent)
    }
}

fn build_system_prompt(row_cap: usize) -> String {
    format!(
        r#"You are an agent designed to interact with a SQLite database.
Given an input question, create a syntactically correct SQLite query to run, then look at the results of the query and return the answer.

ALWAYS start by listing the tables with sql_db_list_tables, then inspect the schema of the most relevant tables with sql_db_schema before querying.

Unless the user specifies a specific number of examples they wish to obtain, limit your query to at most {row_cap} results. You can order the results by a relevant column to return the most interesting examples in the database.

Never query for all the columns from a specific table; only ask for the relevant columns given the question.

You have access to tools for interacting with the database. Only use the given tools. Only use the information returned by the tools to construct your final answer.

DO NOT make any DML statements (INSERT, UPDATE, DELETE, DROP etc.) to the database.

If you get an error while executing a query, rewrite the query and try again. You MUST double check your query before executing it."#
    )
}
