use std::sync::Arc;

use crate::ast::{ColumnsSelect, ComparisonOp, CreateTable, Expr, InsertInto, Select, Statement};
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::table::ColumnDef;
use crate::tokenizer::{Token, TokenKind};
use crate::value::Value;

/// A recursive-descent parser: one method per grammar rule, each verifying
/// the current token before consuming it.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses exactly one statement out of the token sequence.
    ///
    /// A trailing semicolon is consumed if present; any other trailing token
    /// is a syntax error. Multiple statements separated by `;` are not
    /// supported.
    pub fn parse(mut self) -> Result<Statement> {
        let statement = match self.current_token().kind {
            TokenKind::Create => self.parse_create_table(),
            TokenKind::Insert => self.parse_insert(),
            TokenKind::Select => self.parse_select(),
            _ => Err(self.unexpected("a statement (SELECT, INSERT or CREATE)")),
        }?;

        // semicolon is optional in SQL so skip it
        if matches!(self.current_token().kind, TokenKind::Semicolon) {
            self.advance();
        }

        // Check we are at the end of the statement
        if !self.is_at_end() {
            return Err(self.unexpected("end of statement"));
        }

        Ok(statement)
    }

    //helpers
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token().kind, TokenKind::Eof)
    }

    /// Builds a syntax error naming the expected kind, the actual kind and
    /// the source position.
    fn unexpected(&self, expected: &str) -> Error {
        let token = self.current_token();
        Error::UnexpectedToken {
            expected: expected.to_string(),
            found: format!("{:?}", token.kind),
            pos: token.pos,
        }
    }

    fn consume(&mut self, expected: TokenKind) -> Result<()> {
        if self.current_token().kind == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("{expected:?}")))
        }
    }

    fn consume_ident(&mut self) -> Result<String> {
        match &self.current_token().kind {
            TokenKind::Ident(string) => {
                let string = string.clone(); // Get the name
                self.advance();
                Ok(string)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn consume_number(&mut self) -> Result<i64> {
        match self.current_token().kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.unexpected("a number")),
        }
    }

    // --- Grammar rules ---

    /// `SELECT ( '*' | ident (',' ident)* ) FROM ident [ WHERE where_expr ]`
    fn parse_select(&mut self) -> Result<Statement> {
        self.consume(TokenKind::Select)?;

        let columns = if matches!(self.current_token().kind, TokenKind::Star) {
            self.advance();
            ColumnsSelect::Star
        } else {
            let mut names = vec![self.consume_ident()?];
            while matches!(self.current_token().kind, TokenKind::Comma) {
                self.advance();
                names.push(self.consume_ident()?);
            }
            ColumnsSelect::ColumnsNames(names)
        };

        self.consume(TokenKind::From)?;
        let table = self.consume_ident()?;

        let where_clause = if matches!(self.current_token().kind, TokenKind::Where) {
            self.advance();
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(Statement::Select(Select {
            columns,
            table,
            where_clause,
        }))
    }

    /// `INSERT INTO ident '(' ident (',' ident)* ')' VALUES '(' literal (',' literal)* ')'`
    fn parse_insert(&mut self) -> Result<Statement> {
        self.consume(TokenKind::Insert)?;
        self.consume(TokenKind::Into)?;
        let table = self.consume_ident()?;

        self.consume(TokenKind::LeftParen)?;
        let mut columns = vec![self.consume_ident()?];
        while matches!(self.current_token().kind, TokenKind::Comma) {
            self.advance();
            columns.push(self.consume_ident()?);
        }
        self.consume(TokenKind::RightParen)?;

        self.consume(TokenKind::Values)?;
        self.consume(TokenKind::LeftParen)?;
        let mut values = vec![self.parse_value()?];
        while matches!(self.current_token().kind, TokenKind::Comma) {
            self.advance();
            values.push(self.parse_value()?);
        }
        self.consume(TokenKind::RightParen)?;

        Ok(Statement::InsertInto(InsertInto {
            table,
            columns,
            values,
        }))
    }

    /// `CREATE TABLE ident '(' column_def (',' column_def)* ')'`
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.consume(TokenKind::Create)?;
        self.consume(TokenKind::Table)?;
        let name = self.consume_ident()?;
        self.consume(TokenKind::LeftParen)?;
        let mut columns = vec![];
        loop {
            columns.push(self.parse_column_def()?);
            match self.current_token().kind {
                TokenKind::RightParen => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    self.advance();
                    continue;
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
        Ok(Statement::CreateTable(CreateTable { name, columns }))
    }

    /// `ident ( INT | VARCHAR [ '(' NUMBER ')' ] )`
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.consume_ident()?;

        match self.current_token().kind {
            TokenKind::Int => {
                self.advance();
                Ok(ColumnDef {
                    name,
                    data_type: DataType::Int,
                    size: None,
                })
            }
            TokenKind::Varchar => {
                self.advance();
                // the size is optional, absence means unbounded text
                let size = if matches!(self.current_token().kind, TokenKind::LeftParen) {
                    self.advance();
                    let size = self.consume_number()?;
                    self.consume(TokenKind::RightParen)?;
                    Some(size as usize)
                } else {
                    None
                };
                Ok(ColumnDef {
                    name,
                    data_type: DataType::Varchar,
                    size,
                })
            }
            _ => Err(self.unexpected("a column type (INT or VARCHAR)")),
        }
    }

    /// `condition ( (AND|OR) condition )*`
    ///
    /// AND and OR have identical precedence and fold strictly left to right;
    /// there is no grouping with parentheses.
    fn parse_where(&mut self) -> Result<Expr> {
        let mut left = self.parse_condition()?;

        loop {
            let is_and = match self.current_token().kind {
                TokenKind::And => true,
                TokenKind::Or => false,
                _ => break,
            };
            self.advance();
            let right = self.parse_condition()?;

            left = if is_and {
                Expr::And {
                    left: Box::new(left),
                    right: Box::new(right),
                }
            } else {
                Expr::Or {
                    left: Box::new(left),
                    right: Box::new(right),
                }
            };
        }

        Ok(left)
    }

    /// `ident comparison_op literal`
    fn parse_condition(&mut self) -> Result<Expr> {
        let column = self.consume_ident()?;

        let op = match self.current_token().kind {
            TokenKind::Equal => ComparisonOp::Eq,
            TokenKind::NotEqual => ComparisonOp::NotEq,
            TokenKind::Greater => ComparisonOp::Greater,
            TokenKind::GreaterEqual => ComparisonOp::GreaterEq,
            TokenKind::Lower => ComparisonOp::Lower,
            TokenKind::LowerEqual => ComparisonOp::LowerEq,
            _ => return Err(self.unexpected("a comparison operator")),
        };
        self.advance();

        let value = self.parse_value()?;

        Ok(Expr::Comparison { column, op, value })
    }

    /// `NUMBER | STRING`
    fn parse_value(&mut self) -> Result<Value> {
        let value = match &self.current_token().kind {
            TokenKind::Number(n) => Value::Int(*n),
            TokenKind::FloatNumber(f) => Value::Float(*f),
            TokenKind::String(s) => Value::Text(Arc::from(s.as_str())),
            _ => return Err(self.unexpected("a literal value")),
        };
        self.advance();
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    fn parse(sql: &str) -> Result<Statement> {
        Parser::new(Tokenizer::new(sql).tokenize().unwrap()).parse()
    }

    #[test]
    fn test_parse_create_table() {
        let statement = parse("CREATE TABLE users (id INT, name VARCHAR(50))").unwrap();

        match statement {
            Statement::CreateTable(ct) => {
                assert_eq!(ct.name, "users");
                assert_eq!(ct.columns.len(), 2);
                assert_eq!(ct.columns[0].name, "id");
                assert_eq!(ct.columns[0].data_type, DataType::Int);
                assert_eq!(ct.columns[0].size, None);
                assert_eq!(ct.columns[1].name, "name");
                assert_eq!(ct.columns[1].data_type, DataType::Varchar);
                assert_eq!(ct.columns[1].size, Some(50));
            }
            _ => panic!("Expected CreateTable"),
        }
    }

    #[test]
    fn test_parse_varchar_without_size() {
        let statement = parse("CREATE TABLE notes (body VARCHAR)").unwrap();

        match statement {
            Statement::CreateTable(ct) => {
                assert_eq!(ct.columns[0].data_type, DataType::Varchar);
                assert_eq!(ct.columns[0].size, None);
            }
            _ => panic!("Expected CreateTable"),
        }
    }

    #[test]
    fn test_parse_insert() {
        let statement =
            parse("INSERT INTO users (id, name) VALUES (1, 'Alice')").unwrap();

        assert_eq!(
            statement,
            Statement::InsertInto(InsertInto {
                table: "users".into(),
                columns: vec!["id".into(), "name".into()],
                values: vec![Value::Int(1), Value::Text("Alice".into())],
            })
        );
    }

    #[test]
    fn test_parse_select_star() {
        let statement = parse("SELECT * FROM users").unwrap();

        assert_eq!(
            statement,
            Statement::Select(Select {
                columns: ColumnsSelect::Star,
                table: "users".into(),
                where_clause: None,
            })
        );
    }

    #[test]
    fn test_parse_select_columns_keep_order() {
        let statement = parse("SELECT name, id FROM users").unwrap();

        match statement {
            Statement::Select(select) => {
                assert_eq!(
                    select.columns,
                    ColumnsSelect::ColumnsNames(vec!["name".into(), "id".into()])
                );
            }
            _ => panic!("Expected Select"),
        }
    }

    #[test]
    fn test_parse_select_with_condition() {
        let statement = parse("SELECT * FROM users WHERE age >= 18").unwrap();

        match statement {
            Statement::Select(select) => {
                assert_eq!(
                    select.where_clause,
                    Some(Expr::Comparison {
                        column: "age".into(),
                        op: ComparisonOp::GreaterEq,
                        value: Value::Int(18),
                    })
                );
            }
            _ => panic!("Expected Select"),
        }
    }

    #[test]
    fn test_where_folds_left_to_right() {
        // a AND b OR c must parse as (a AND b) OR c, by fold order only
        let statement = parse("SELECT * FROM t WHERE a = 1 AND b = 2 OR c = 3").unwrap();

        let Statement::Select(select) = statement else {
            panic!("Expected Select");
        };
        let Some(Expr::Or { left, right }) = select.where_clause else {
            panic!("Expected OR at the root");
        };
        assert!(matches!(*left, Expr::And { .. }));
        assert!(matches!(
            *right,
            Expr::Comparison { ref column, .. } if column == "c"
        ));
    }

    #[test]
    fn test_trailing_semicolon_is_skipped() {
        assert!(parse("SELECT * FROM users;").is_ok());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let result = parse("SELECT * FROM users garbage");

        assert!(matches!(
            result,
            Err(Error::UnexpectedToken { ref expected, .. }) if expected == "end of statement"
        ));
    }

    #[test]
    fn test_missing_from_is_a_syntax_error() {
        let result = parse("SELECT name users");

        assert!(matches!(
            result,
            Err(Error::UnexpectedToken { pos: 12, .. })
        ));
    }

    #[test]
    fn test_condition_requires_operator() {
        let result = parse("SELECT * FROM users WHERE age 18");

        assert!(matches!(
            result,
            Err(Error::UnexpectedToken { ref expected, .. })
                if expected == "a comparison operator"
        ));
    }

    #[test]
    fn test_unknown_statement() {
        let result = parse("DROP TABLE users");

        assert!(result.is_err());
    }
}
