use std::path::Path;

use crate::error::Result;
use crate::executor::{Executor, QueryResult};
use crate::parser::Parser;
use crate::storage::StorageEngine;
use crate::tokenizer::Tokenizer;

/// The main entry point for the SQL engine.
///
/// It owns the storage engine and orchestrates the full pipeline:
/// SQL text → Tokenizer → Parser → Executor → [QueryResult].
pub struct Database {
    storage: StorageEngine,
}

impl Database {
    /// Opens (or creates) a database rooted at the given directory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or an existing
    /// table record cannot be loaded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            storage: StorageEngine::open(path)?,
        })
    }

    /// Executes a single SQL statement.
    ///
    /// This method never fails: every lexical, syntax or semantic error from
    /// the pipeline is caught here and converted into a [QueryResult] whose
    /// message is `Error: ` followed by the description. A failed statement
    /// leaves no partial mutation behind.
    ///
    /// # Example
    /// ```
    /// use minisql::Database;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let mut db = Database::open(dir.path()).unwrap();
    ///
    /// db.execute("CREATE TABLE users (id INT, name VARCHAR(50))");
    /// db.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')");
    ///
    /// let result = db.execute("SELECT * FROM users");
    /// assert_eq!(result.columns, vec!["id", "name"]);
    /// assert_eq!(result.rows.len(), 1);
    /// ```
    pub fn execute(&mut self, sql: &str) -> QueryResult {
        match self.try_execute(sql) {
            Ok(result) => result,
            Err(e) => {
                log::debug!("statement failed: {e}");
                QueryResult {
                    message: Some(format!("Error: {e}")),
                    ..QueryResult::default()
                }
            }
        }
    }

    fn try_execute(&mut self, sql: &str) -> Result<QueryResult> {
        let tokens = Tokenizer::new(sql).tokenize()?;
        let statement = Parser::new(tokens).parse()?;
        Executor::new(&mut self.storage).execute(statement)
    }

    /// Returns a list of all table names currently stored in the database.
    pub fn list_tables(&self) -> Vec<&str> {
        self.storage.list_tables()
    }

    /// Returns a human-readable description of a table's schema and row
    /// count, or a message stating that the table does not exist.
    pub fn describe_table(&self, name: &str) -> String {
        let Some(table) = self.storage.get_table(name) else {
            return format!("Table '{name}' does not exist");
        };

        let mut lines = vec![format!("Table: {name}"), "Columns:".to_string()];
        for col in &table.schema.columns {
            let mut line = format!("  - {}: {}", col.name, col.data_type);
            if let Some(size) = col.size {
                line.push_str(&format!("({size})"));
            }
            lines.push(line);
        }
        lines.push(format!("\nTotal rows: {}", table.rows.len()));
        lines.join("\n")
    }
}
