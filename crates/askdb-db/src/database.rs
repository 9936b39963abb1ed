//! Read-only SQLite connection and schema introspection

use std::fmt::Write as _;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, types::ValueRef};

use crate::error::Result;
use crate::guard::validate_read_only_sql;

/// How many sample rows to include per table in schema output.
const SAMPLE_ROWS: usize = 3;

/// A shared, read-only handle on the local database file.
///
/// One connection behind a mutex; queries within a session never
/// overlap, the lock only makes the handle shareable.
pub struct Database {
    conn: Mutex<Connection>,
}

/// Rows returned by a query, capped at the caller's row limit.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub truncated: bool,
}

impl QueryOutput {
    /// Render as a plain text table for the model to read.
    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return "(no rows)".to_string();
        }
        let mut out = self.columns.join(" | ");
        for row in &self.rows {
            out.push('\n');
            out.push_str(&row.join(" | "));
        }
        if self.truncated {
            let _ = write!(out, "\n... (results truncated to {} rows)", self.rows.len());
        }
        out
    }
}

impl Database {
    /// Open the database file read-only.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// List user table names in alphabetical order.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Render CREATE statements plus a few sample rows for the named
    /// tables. Unknown names are reported in the output text rather
    /// than failing the whole call, so the model can correct itself.
    pub fn table_schema(&self, tables: &[String]) -> Result<String> {
        let mut sections = Vec::new();

        for name in tables {
            let ddl = self.table_ddl(name)?;
            match ddl {
                Some(ddl) => {
                    let mut section = ddl;
                    match self.sample_rows(name) {
                        Ok(sample) if !sample.rows.is_empty() => {
                            let _ = write!(
                                section,
                                "\n\n/* {} rows from {} table:\n{}\n*/",
                                sample.rows.len(),
                                name,
                                sample.to_text()
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::debug!(table = %name, "sample rows unavailable: {e}");
                        }
                    }
                    sections.push(section);
                }
                None => sections.push(format!("Error: table '{}' not found in database", name)),
            }
        }

        Ok(sections.join("\n\n"))
    }

    fn table_ddl(&self, name: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )?;
        let mut rows = stmt.query_map([name], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(sql) => Ok(Some(sql?)),
            None => Ok(None),
        }
    }

    fn sample_rows(&self, name: &str) -> Result<QueryOutput> {
        // Identifier, not a value: quote and escape it ourselves.
        let quoted = name.replace('"', "\"\"");
        self.run_query(&format!("SELECT * FROM \"{quoted}\""), SAMPLE_ROWS)
    }

    /// Execute a read-only query, returning up to `row_cap` rows.
    ///
    /// The guardrail runs first; mutating or multi-statement SQL never
    /// reaches the connection (which is itself opened read-only).
    pub fn run_query(&self, sql: &str, row_cap: usize) -> Result<QueryOutput> {
        validate_read_only_sql(sql)?;

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = stmt.query([])?;
        let mut out_rows = Vec::new();
        let mut truncated = false;

        while let Some(row) = rows.next()? {
            if out_rows.len() >= row_cap {
                truncated = true;
                break;
            }
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(render_value(row.get_ref(idx)?));
            }
            out_rows.push(values);
        }

        Ok(QueryOutput {
            columns,
            rows: out_rows,
            truncated,
        })
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Build a miniature music-store database on disk.
    fn seed_database(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("store.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE Artist (
                ArtistId INTEGER PRIMARY KEY,
                Name TEXT NOT NULL
            );
            CREATE TABLE Album (
                AlbumId INTEGER PRIMARY KEY,
                Title TEXT NOT NULL,
                ArtistId INTEGER NOT NULL REFERENCES Artist(ArtistId)
            );
            INSERT INTO Artist (ArtistId, Name) VALUES
                (1, 'AC/DC'), (2, 'Accept'), (3, 'Aerosmith'),
                (4, 'Alanis Morissette'), (5, 'Alice In Chains');
            INSERT INTO Album (AlbumId, Title, ArtistId) VALUES
                (1, 'For Those About To Rock We Salute You', 1),
                (2, 'Balls to the Wall', 2);
            "#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_list_tables_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&seed_database(&dir)).unwrap();
        assert_eq!(db.list_tables().unwrap(), vec!["Album", "Artist"]);
    }

    #[test]
    fn test_table_schema_has_ddl_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&seed_database(&dir)).unwrap();

        let schema = db.table_schema(&["Artist".to_string()]).unwrap();
        assert!(schema.contains("CREATE TABLE Artist"));
        assert!(schema.contains("AC/DC"));
        // Sample is capped at three rows.
        assert!(!schema.contains("Alanis Morissette"));
    }

    #[test]
    fn test_table_schema_unknown_table_reported_inline() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&seed_database(&dir)).unwrap();

        let schema = db
            .table_schema(&["Artist".to_string(), "Nope".to_string()])
            .unwrap();
        assert!(schema.contains("CREATE TABLE Artist"));
        assert!(schema.contains("table 'Nope' not found"));
    }

    #[test]
    fn test_run_query_rows_and_cap() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&seed_database(&dir)).unwrap();

        let out = db
            .run_query("SELECT Name FROM Artist ORDER BY ArtistId", 2)
            .unwrap();
        assert_eq!(out.columns, vec!["Name"]);
        assert_eq!(out.rows.len(), 2);
        assert!(out.truncated);

        let all = db
            .run_query("SELECT COUNT(*) AS n FROM Artist", 10)
            .unwrap();
        assert_eq!(all.rows, vec![vec!["5".to_string()]]);
        assert!(!all.truncated);
    }

    #[test]
    fn test_run_query_rejects_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&seed_database(&dir)).unwrap();

        let err = db.run_query("DELETE FROM Artist", 10).unwrap_err();
        assert!(matches!(err, crate::Error::Guardrail(_)));

        // Nothing was deleted.
        let out = db.run_query("SELECT COUNT(*) FROM Artist", 10).unwrap();
        assert_eq!(out.rows[0][0], "5");
    }

    #[test]
    fn test_query_output_to_text() {
        let out = QueryOutput {
            columns: vec!["Name".to_string(), "Albums".to_string()],
            rows: vec![vec!["AC/DC".to_string(), "1".to_string()]],
            truncated: false,
        };
        assert_eq!(out.to_text(), "Name | Albums\nAC/DC | 1");

        let empty = QueryOutput {
            columns: vec!["Name".to_string()],
            rows: vec![],
            truncated: false,
        };
        assert_eq!(empty.to_text(), "(no rows)");
    }

    #[test]
    fn test_bad_sql_is_sqlite_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&seed_database(&dir)).unwrap();
        let err = db.run_query("SELECT * FROM NoSuchTable", 10).unwrap_err();
        assert!(matches!(err, crate::Error::Sqlite(_)));
    }
}
