use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::table::{Row, Schema, Table};

/// File extension of persisted table records.
const TABLE_FILE_EXT: &str = "json";

/// A directory-backed collection of tables.
///
/// Every persisted record found under the root is loaded eagerly at
/// construction; create/insert operations mutate the in-memory table and
/// immediately rewrite its record in full. The engine assumes exclusive
/// ownership of the root directory for the lifetime of the process.
pub struct StorageEngine {
    root: PathBuf,
    tables: HashMap<String, Table>,
}

impl StorageEngine {
    /// Opens the storage root, creating the directory if needed, and loads
    /// every table record found there.
    ///
    /// Loaded data is trusted as previously validated; no validation is
    /// repeated on load.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or read, or if a
    /// record file is not a valid table record.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let mut tables = HashMap::new();
        for entry in fs::read_dir(&root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(TABLE_FILE_EXT) {
                continue;
            }

            let data = fs::read_to_string(&path)?;
            let table: Table = serde_json::from_str(&data)?;
            log::debug!(
                "loaded table '{}' ({} rows) from {}",
                table.name,
                table.rows.len(),
                path.display()
            );
            tables.insert(table.name.clone(), table);
        }

        log::info!(
            "storage opened at {} ({} tables)",
            root.display(),
            tables.len()
        );
        Ok(Self { root, tables })
    }

    /// The record file backing a table name.
    fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{TABLE_FILE_EXT}"))
    }

    /// Registers a new, empty table and persists it immediately.
    ///
    /// # Errors
    /// Returns an error if a table with the same name already exists.
    pub fn create_table(&mut self, name: String, schema: Schema) -> Result<()> {
        if self.tables.contains_key(&name) {
            return Err(Error::TableAlreadyExists(name));
        }

        let table = Table::new(name.clone(), schema);
        persist(&self.table_path(&name), &table)?;
        self.tables.insert(name, table);
        Ok(())
    }

    /// Retrieves a table by name. Pure lookup, no side effects.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Inserts a row into a table and rewrites its record in full.
    ///
    /// The write happens only after validation succeeded: a rejected row
    /// leaves both the row sequence and the persisted record untouched.
    ///
    /// # Errors
    /// Returns an error if the table does not exist or the row fails schema
    /// validation.
    pub fn insert_row(&mut self, table_name: &str, row: Row) -> Result<()> {
        let path = self.table_path(table_name);
        let table = self
            .tables
            .get_mut(table_name)
            .ok_or_else(|| Error::TableNotFound(table_name.to_string()))?;

        table.insert(row)?;
        persist(&path, table)
    }

    /// Returns a list of all table names currently stored in the database.
    ///
    /// The order is the in-memory iteration order, not guaranteed sorted.
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.iter().map(|m| m.0.as_str()).collect()
    }
}

/// Rewrites a table's record file in full. Not crash-safe: there is no
/// atomic rename, a failure mid-write can truncate the record.
fn persist(path: &Path, table: &Table) -> Result<()> {
    let data = serde_json::to_string_pretty(table)?;
    fs::write(path, data)?;
    log::debug!(
        "persisted table '{}' ({} rows) to {}",
        table.name,
        table.rows.len(),
        path.display()
    );
    Ok(())
}
