//! SQL semantics provided by the database server
//!
//! The checker cannot compile embedded SQL itself. It asks an oracle,
//! which in production is the server and in tests and the CLI is a
//! [`StaticOracle`] loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server type codes of select-list columns
pub mod db_type {
    pub const NULL: i32 = 0;
    pub const INT: i32 = 1;
    pub const FLOAT: i32 = 2;
    pub const DOUBLE: i32 = 3;
    pub const STRING: i32 = 4;
    pub const OBJECT: i32 = 5;
    pub const SET: i32 = 6;
    pub const TIME: i32 = 10;
    pub const TIMESTAMP: i32 = 11;
    pub const DATE: i32 = 12;
    pub const SHORT: i32 = 18;
    pub const NUMERIC: i32 = 22;
    pub const CHAR: i32 = 25;
    pub const BIGINT: i32 = 31;
    pub const DATETIME: i32 = 32;
    pub const BLOB: i32 = 33;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub db_type: i32,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, db_type: i32) -> Self {
        Self {
            name: name.into(),
            db_type,
        }
    }
}

/// What the server learned about one SQL text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlSemantics {
    /// Index of the SQL text in the request
    pub seq_no: usize,
    /// Zero on success
    pub err_code: i32,
    #[serde(default)]
    pub err_msg: String,
    /// Result columns of a query; empty for other statements
    #[serde(default)]
    pub select_list: Vec<ColumnInfo>,
}

impl SqlSemantics {
    pub fn is_error(&self) -> bool {
        self.err_code != 0
    }
}

/// Source of SQL semantics. Answers one result per input text, in order.
pub trait SqlSemanticsOracle {
    fn get_sql_semantics(&self, sqls: &[String]) -> Vec<SqlSemantics>;
}

/// An oracle that knows nothing and rejects every statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingOracle;

impl SqlSemanticsOracle for RejectingOracle {
    fn get_sql_semantics(&self, sqls: &[String]) -> Vec<SqlSemantics> {
        (0..sqls.len())
            .map(|seq_no| SqlSemantics {
                seq_no,
                err_code: -1,
                err_msg: "no SQL semantics available".into(),
                select_list: Vec::new(),
            })
            .collect()
    }
}

/// Answer for one statement in a [`StaticOracle`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatementInfo {
    #[serde(default)]
    pub err_code: i32,
    #[serde(default)]
    pub err_msg: String,
    #[serde(default)]
    pub select_list: Vec<ColumnInfo>,
}

/// A fixed table of answers.
///
/// Statements are matched after collapsing whitespace and ignoring case.
/// Built-in function queries of the form `select NAME(...) from dual` are
/// answered from `functions`, which maps a function name to the type
/// code of its result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticOracle {
    #[serde(default)]
    statements: BTreeMap<String, StatementInfo>,
    #[serde(default)]
    functions: BTreeMap<String, i32>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from its JSON form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: StaticOracle = serde_json::from_str(text)?;
        let mut oracle = StaticOracle::new();
        for (sql, info) in raw.statements {
            oracle.statements.insert(normalize_sql(&sql), info);
        }
        for (name, code) in raw.functions {
            oracle.functions.insert(name.to_ascii_uppercase(), code);
        }
        Ok(oracle)
    }

    /// Register a statement that compiles with the given select list.
    pub fn with_statement(mut self, sql: &str, select_list: Vec<ColumnInfo>) -> Self {
        self.statements.insert(
            normalize_sql(sql),
            StatementInfo {
                select_list,
                ..Default::default()
            },
        );
        self
    }

    /// Register a statement the server refuses.
    pub fn with_rejected(mut self, sql: &str, err_code: i32, err_msg: &str) -> Self {
        self.statements.insert(
            normalize_sql(sql),
            StatementInfo {
                err_code,
                err_msg: err_msg.into(),
                select_list: Vec::new(),
            },
        );
        self
    }

    /// Register a built-in function and the type code of its result.
    pub fn with_function(mut self, name: &str, db_type: i32) -> Self {
        self.functions.insert(name.to_ascii_uppercase(), db_type);
        self
    }

    fn answer(&self, sql: &str) -> StatementInfo {
        let key = normalize_sql(sql);
        if let Some(info) = self.statements.get(&key) {
            return info.clone();
        }
        if let Some(name) = queried_function(&key) {
            if let Some(code) = self.functions.get(&name) {
                return StatementInfo {
                    select_list: vec![ColumnInfo::new(name, *code)],
                    ..Default::default()
                };
            }
        }
        StatementInfo {
            err_code: -1,
            err_msg: format!("unknown statement: {}", sql.trim()),
            select_list: Vec::new(),
        }
    }
}

impl SqlSemanticsOracle for StaticOracle {
    fn get_sql_semantics(&self, sqls: &[String]) -> Vec<SqlSemantics> {
        sqls.iter()
            .enumerate()
            .map(|(seq_no, sql)| {
                let info = self.answer(sql);
                SqlSemantics {
                    seq_no,
                    err_code: info.err_code,
                    err_msg: info.err_msg,
                    select_list: info.select_list,
                }
            })
            .collect()
    }
}

fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Function name of a normalized `select f(...) from dual` query
fn queried_function(normalized: &str) -> Option<String> {
    let inner = normalized
        .strip_prefix("select ")?
        .strip_suffix(" from dual")?;
    let name = inner.split('(').next()?.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_lookup_ignores_layout() {
        let oracle = StaticOracle::new().with_statement(
            "SELECT a, b FROM t WHERE c = ?",
            vec![
                ColumnInfo::new("a", db_type::INT),
                ColumnInfo::new("b", db_type::STRING),
            ],
        );
        let out = oracle.get_sql_semantics(&["select a, b\n  from t where c = ?".into()]);
        assert_eq!(out.len(), 1);
        assert!(!out[0].is_error());
        assert_eq!(out[0].select_list.len(), 2);
    }

    #[test]
    fn test_function_query() {
        let oracle = StaticOracle::new().with_function("upper", db_type::STRING);
        let out = oracle.get_sql_semantics(&[
            "select UPPER('a') from dual".into(),
            "select LOWER('a') from dual".into(),
        ]);
        assert_eq!(out[0].select_list, vec![ColumnInfo::new("UPPER", db_type::STRING)]);
        assert_eq!(out[1].seq_no, 1);
        assert!(out[1].is_error());
    }

    #[test]
    fn test_no_paren_query() {
        let oracle = StaticOracle::new().with_function("SYSDATE", db_type::DATE);
        let out = oracle.get_sql_semantics(&["select SYSDATE from dual".into()]);
        assert_eq!(out[0].select_list[0].db_type, db_type::DATE);
    }

    #[test]
    fn test_from_json() {
        let oracle = StaticOracle::from_json(
            r#"{
                "statements": {
                    "DELETE FROM t": {},
                    "SELECT nope FROM t": { "err_code": -493, "err_msg": "unknown column nope" }
                },
                "functions": { "abs": 22 }
            }"#,
        )
        .unwrap();
        let out = oracle.get_sql_semantics(&[
            "delete from t".into(),
            "select nope from t".into(),
            "select ABS(1) from dual".into(),
        ]);
        assert!(!out[0].is_error());
        assert!(out[0].select_list.is_empty());
        assert_eq!(out[1].err_code, -493);
        assert_eq!(out[2].select_list[0].db_type, db_type::NUMERIC);
    }

    #[test]
    fn test_rejecting_oracle() {
        let out = RejectingOracle.get_sql_semantics(&["select 1 from dual".into(), "x".into()]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(SqlSemantics::is_error));
    }
}
