use crate::table::ColumnDef;
use crate::value::Value;

/// A single parsed SQL statement, the root of the AST.
#[derive(Debug, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    InsertInto(InsertInto),
    Select(Select),
}

#[derive(Debug, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, PartialEq)]
pub struct InsertInto {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

#[derive(Debug, PartialEq)]
pub enum ColumnsSelect {
    Star,
    ColumnsNames(Vec<String>),
}

#[derive(Debug, PartialEq)]
pub struct Select {
    pub columns: ColumnsSelect,
    pub table: String,
    pub where_clause: Option<Expr>,
}

/// Comparison operators usable inside a WHERE condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Greater,
    GreaterEq,
    Lower,
    LowerEq,
}

/// A WHERE expression tree.
///
/// AND and OR carry no precedence distinction: the parser folds conditions
/// left to right, so `a AND b OR c` is `Or(And(a, b), c)` purely by fold
/// order.
#[derive(Debug, PartialEq)]
pub enum Expr {
    Comparison {
        column: String,
        op: ComparisonOp,
        value: Value,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
}
