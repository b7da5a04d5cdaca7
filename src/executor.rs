use std::cmp::Ordering;
use std::fmt;

use crate::ast::{ColumnsSelect, ComparisonOp, CreateTable, Expr, InsertInto, Select, Statement};
use crate::error::{Error, Result};
use crate::storage::StorageEngine;
use crate::table::{Row, Schema};
use crate::value::Value;

/// The result of one executed statement.
#[derive(Debug, Default)]
pub struct QueryResult {
    /// The names of the columns included in the result set, in result order.
    pub columns: Vec<String>,
    /// The projected rows.
    pub rows: Vec<Row>,
    /// Number of rows affected by a mutation (1 for INSERT, 0 otherwise).
    pub rows_affected: usize,
    /// A human-readable status or error message. When set, it is the whole
    /// rendered output.
    pub message: Option<String>,
}

impl fmt::Display for QueryResult {
    /// Renders the result as text: the message verbatim if set, a rows
    /// affected summary when there is no data, otherwise an aligned table
    /// followed by a row count.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return write!(f, "{message}");
        }

        if self.rows.is_empty() {
            return write!(f, "({} rows affected)", self.rows_affected);
        }

        // each column is as wide as its widest value or its header
        let widths: Vec<usize> = self
            .columns
            .iter()
            .map(|col| {
                let mut width = col.chars().count();
                for row in &self.rows {
                    let cell = row.get(col).map(Value::to_string).unwrap_or_default();
                    width = width.max(cell.chars().count());
                }
                width
            })
            .collect();

        let header = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, &width)| format!("{col:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ");
        let separator = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-");

        let mut lines = vec![header, separator];
        for row in &self.rows {
            let cells = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, &width)| {
                    let cell = row.get(col).map(Value::to_string).unwrap_or_default();
                    format!("{cell:<width$}")
                })
                .collect::<Vec<_>>()
                .join(" | ");
            lines.push(cells);
        }
        lines.push(format!("\n({} rows)", self.rows.len()));

        write!(f, "{}", lines.join("\n"))
    }
}

/// Interprets AST statements against a storage engine.
pub struct Executor<'a> {
    storage: &'a mut StorageEngine,
}

impl<'a> Executor<'a> {
    pub fn new(storage: &'a mut StorageEngine) -> Self {
        Self { storage }
    }

    /// Executes one statement, dispatching on its variant.
    pub fn execute(&mut self, statement: Statement) -> Result<QueryResult> {
        match statement {
            Statement::CreateTable(create) => self.execute_create_table(create),
            Statement::InsertInto(insert) => self.execute_insert(insert),
            Statement::Select(select) => self.execute_select(select),
        }
    }

    fn execute_create_table(&mut self, create: CreateTable) -> Result<QueryResult> {
        let message = format!("Table '{}' created successfully", create.name);
        self.storage.create_table(
            create.name,
            Schema {
                columns: create.columns,
            },
        )?;

        Ok(QueryResult {
            message: Some(message),
            ..QueryResult::default()
        })
    }

    /// Builds a row by pairing column names with literal values, then
    /// delegates to the storage engine.
    ///
    /// Mismatched list lengths are rejected up front rather than silently
    /// truncating the pairing.
    fn execute_insert(&mut self, insert: InsertInto) -> Result<QueryResult> {
        let InsertInto {
            table,
            columns,
            values,
        } = insert;

        if columns.len() != values.len() {
            return Err(Error::InsertArityMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        let row: Row = columns.into_iter().zip(values).collect();
        self.storage.insert_row(&table, row)?;

        Ok(QueryResult {
            rows_affected: 1,
            message: Some(format!("1 row inserted into '{table}'")),
            ..QueryResult::default()
        })
    }

    /// Fetches the table, filters rows through the WHERE expression and
    /// projects the requested columns, in that order.
    fn execute_select(&mut self, select: Select) -> Result<QueryResult> {
        let table = self
            .storage
            .get_table(&select.table)
            .ok_or_else(|| Error::TableNotFound(select.table.clone()))?;

        let mut kept: Vec<&Row> = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let matches = match &select.where_clause {
                Some(expr) => Self::evaluate_where(row, expr)?,
                None => true,
            };
            if matches {
                kept.push(row);
            }
        }

        // Resolve which columns need to be projected
        let columns: Vec<String> = match select.columns {
            ColumnsSelect::Star => table
                .schema
                .columns
                .iter()
                .map(|col| col.name.clone())
                .collect(),
            ColumnsSelect::ColumnsNames(names) => {
                for name in &names {
                    if !table.has_column(name) {
                        return Err(Error::ColumnNotFound {
                            column: name.clone(),
                            table: select.table.clone(),
                        });
                    }
                }
                names
            }
        };

        let rows: Vec<Row> = kept
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .filter_map(|col| row.get(col).map(|value| (col.clone(), value.clone())))
                    .collect()
            })
            .collect();

        Ok(QueryResult {
            columns,
            rows,
            ..QueryResult::default()
        })
    }

    /// Evaluates a WHERE expression against a single row by recursive
    /// boolean combination.
    fn evaluate_where(row: &Row, expr: &Expr) -> Result<bool> {
        match expr {
            Expr::Comparison { column, op, value } => {
                Self::evaluate_condition(row, column, *op, value)
            }
            Expr::And { left, right } => {
                Ok(Self::evaluate_where(row, left)? && Self::evaluate_where(row, right)?)
            }
            Expr::Or { left, right } => {
                Ok(Self::evaluate_where(row, left)? || Self::evaluate_where(row, right)?)
            }
        }
    }

    /// Applies one comparison to the row's value and the literal.
    fn evaluate_condition(row: &Row, column: &str, op: ComparisonOp, value: &Value) -> Result<bool> {
        let row_value = row
            .get(column)
            .ok_or_else(|| Error::ColumnNotInRow(column.to_string()))?;

        let ordering = Self::compare_values(row_value, value)?;

        Ok(match op {
            ComparisonOp::Eq => ordering == Ordering::Equal,
            ComparisonOp::NotEq => ordering != Ordering::Equal,
            ComparisonOp::Greater => ordering == Ordering::Greater,
            ComparisonOp::GreaterEq => ordering != Ordering::Less,
            ComparisonOp::Lower => ordering == Ordering::Less,
            ComparisonOp::LowerEq => ordering != Ordering::Greater,
        })
    }

    /// Orders two values of compatible kinds.
    ///
    /// Integers and floats compare numerically with each other, text
    /// compares lexicographically with text. Mixing text with numbers is an
    /// error rather than an arbitrary boolean.
    fn compare_values(left: &Value, right: &Value) -> Result<Ordering> {
        match (left, right) {
            (Value::Int(l), Value::Int(r)) => Ok(l.cmp(r)),
            (Value::Text(l), Value::Text(r)) => Ok(l.cmp(r)),
            _ => {
                let incomparable = || Error::IncomparableTypes {
                    left: left.kind_name(),
                    right: right.kind_name(),
                };
                let (Some(l), Some(r)) = (left.as_number(), right.as_number()) else {
                    return Err(incomparable());
                };
                l.partial_cmp(&r).ok_or_else(incomparable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::tokenizer::Tokenizer;

    /// Runs one statement through the full tokenizer → parser → executor
    /// pipeline.
    fn run(storage: &mut StorageEngine, sql: &str) -> Result<QueryResult> {
        let tokens = Tokenizer::new(sql).tokenize()?;
        let statement = Parser::new(tokens).parse()?;
        Executor::new(storage).execute(statement)
    }

    fn users_storage(dir: &tempfile::TempDir) -> StorageEngine {
        let mut storage = StorageEngine::open(dir.path()).unwrap();
        run(
            &mut storage,
            "CREATE TABLE users (id INT, name VARCHAR(50), age INT)",
        )
        .unwrap();
        run(
            &mut storage,
            "INSERT INTO users (id, name, age) VALUES (1, 'Alice', 25)",
        )
        .unwrap();
        run(
            &mut storage,
            "INSERT INTO users (id, name, age) VALUES (2, 'Bob', 30)",
        )
        .unwrap();
        run(
            &mut storage,
            "INSERT INTO users (id, name, age) VALUES (3, 'Charlie', 35)",
        )
        .unwrap();
        storage
    }

    #[test]
    fn test_create_table_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = StorageEngine::open(dir.path()).unwrap();

        let result = run(&mut storage, "CREATE TABLE users (id INT)").unwrap();

        assert_eq!(
            result.message.as_deref(),
            Some("Table 'users' created successfully")
        );
        assert_eq!(result.rows_affected, 0);
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_insert_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = StorageEngine::open(dir.path()).unwrap();
        run(&mut storage, "CREATE TABLE users (id INT)").unwrap();

        let result = run(&mut storage, "INSERT INTO users (id) VALUES (1)").unwrap();

        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.message.as_deref(), Some("1 row inserted into 'users'"));
    }

    #[test]
    fn test_insert_arity_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = StorageEngine::open(dir.path()).unwrap();
        run(&mut storage, "CREATE TABLE users (id INT, age INT)").unwrap();

        let result = run(&mut storage, "INSERT INTO users (id, age) VALUES (1)");

        assert!(matches!(
            result,
            Err(Error::InsertArityMismatch {
                columns: 2,
                values: 1
            })
        ));
        assert_eq!(storage.get_table("users").unwrap().rows.len(), 0);
    }

    #[test]
    fn test_select_star_uses_schema_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        let result = run(&mut storage, "SELECT * FROM users").unwrap();

        assert_eq!(result.columns, vec!["id", "name", "age"]);
        assert_eq!(result.rows.len(), 3);
    }

    #[test]
    fn test_select_explicit_columns_keep_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        // l'ordre vient de la requête, pas du schéma
        let result = run(&mut storage, "SELECT age, id FROM users").unwrap();

        assert_eq!(result.columns, vec!["age", "id"]);
        assert!(result.rows[0].get("name").is_none());
    }

    #[test]
    fn test_select_unknown_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        let result = run(&mut storage, "SELECT salary FROM users");

        assert!(matches!(result, Err(Error::ColumnNotFound { .. })));
    }

    #[test]
    fn test_select_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = StorageEngine::open(dir.path()).unwrap();

        let result = run(&mut storage, "SELECT * FROM nonexistent");

        assert!(matches!(result, Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_where_and_intersects() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        let result = run(
            &mut storage,
            "SELECT name, age FROM users WHERE age > 26 AND age < 32",
        )
        .unwrap();

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0]["name"], Value::Text("Bob".into()));
        assert_eq!(result.rows[0]["age"], Value::Int(30));
    }

    #[test]
    fn test_where_or_unions() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        let result = run(
            &mut storage,
            "SELECT id FROM users WHERE age < 26 OR name = 'Charlie'",
        )
        .unwrap();

        let mut ids: Vec<i64> = result
            .rows
            .iter()
            .map(|row| row["id"].as_int().unwrap())
            .collect();
        ids.sort();

        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_where_filter_is_pointwise() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        let result = run(&mut storage, "SELECT * FROM users WHERE age >= 30").unwrap();

        // exactly the rows whose age satisfies the predicate, nothing else
        for row in &result.rows {
            assert!(row["age"].as_int().unwrap() >= 30);
        }
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_where_all_operators() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        for (sql, expected) in [
            ("SELECT id FROM users WHERE age = 30", 1),
            ("SELECT id FROM users WHERE age != 30", 2),
            ("SELECT id FROM users WHERE age > 30", 1),
            ("SELECT id FROM users WHERE age >= 30", 2),
            ("SELECT id FROM users WHERE age < 30", 1),
            ("SELECT id FROM users WHERE age <= 30", 2),
        ] {
            let result = run(&mut storage, sql).unwrap();
            assert_eq!(result.rows.len(), expected, "{sql}");
        }
    }

    #[test]
    fn test_where_text_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        let result = run(&mut storage, "SELECT id FROM users WHERE name = 'Bob'").unwrap();

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0]["id"], Value::Int(2));
    }

    #[test]
    fn test_where_int_against_float_literal() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        let result = run(&mut storage, "SELECT id FROM users WHERE age > 27.5").unwrap();

        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_where_text_against_number_is_incomparable() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = users_storage(&dir);

        let result = run(&mut storage, "SELECT id FROM users WHERE name > 5");

        assert!(matches!(result, Err(Error::IncomparableTypes { .. })));
    }

    #[test]
    fn test_display_message_verbatim() {
        let result = QueryResult {
            message: Some("Table 'users' created successfully".into()),
            ..QueryResult::default()
        };

        assert_eq!(result.to_string(), "Table 'users' created successfully");
    }

    #[test]
    fn test_display_rows_affected() {
        let result = QueryResult {
            rows_affected: 1,
            ..QueryResult::default()
        };

        assert_eq!(result.to_string(), "(1 rows affected)");
    }

    #[test]
    fn test_display_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = StorageEngine::open(dir.path()).unwrap();
        run(&mut storage, "CREATE TABLE users (id INT, name VARCHAR(50))").unwrap();
        run(
            &mut storage,
            "INSERT INTO users (id, name) VALUES (1, 'Alice')",
        )
        .unwrap();
        run(&mut storage, "INSERT INTO users (id, name) VALUES (2, 'Bo')").unwrap();

        let rendered = run(&mut storage, "SELECT * FROM users").unwrap().to_string();

        let expected = "\
id | name \n\
---+------\n\
1  | Alice\n\
2  | Bo   \n\
\n\
(2 rows)";
        assert_eq!(rendered, expected);
    }
}
