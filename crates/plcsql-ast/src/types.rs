//! Type annotations as written in declarations

use crate::Ident;
use serde::{Deserialize, Serialize};

/// Default precision of `NUMERIC` without arguments.
pub const DEFAULT_NUMERIC_PRECISION: u32 = 15;
/// Default length of `CHAR` without arguments.
pub const DEFAULT_CHAR_LENGTH: u32 = 1;
/// Maximum length of `VARCHAR`; `STRING` is `VARCHAR` of this length.
pub const MAX_VARCHAR_LENGTH: u32 = 1_073_741_823;
/// Maximum length of `CHAR`.
pub const MAX_CHAR_LENGTH: u32 = 2048;

/// A SQL data type name with its optional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlType {
    Boolean,
    Short,
    Int,
    Bigint,
    Numeric {
        #[serde(default)]
        precision: Option<u32>,
        #[serde(default)]
        scale: Option<u32>,
    },
    Float,
    Double,
    Char {
        #[serde(default)]
        length: Option<u32>,
    },
    Varchar {
        #[serde(default)]
        length: Option<u32>,
    },
    String,
    Date,
    Time,
    Datetime,
    Timestamp,
    SysRefcursor,
}

impl SqlType {
    /// The keyword used for this type in PL/CSQL source.
    pub fn keyword(&self) -> String {
        match self {
            SqlType::Boolean => "BOOLEAN".into(),
            SqlType::Short => "SHORT".into(),
            SqlType::Int => "INT".into(),
            SqlType::Bigint => "BIGINT".into(),
            SqlType::Numeric { precision, scale } => match (precision, scale) {
                (None, _) => "NUMERIC".into(),
                (Some(p), None) => format!("NUMERIC({})", p),
                (Some(p), Some(s)) => format!("NUMERIC({}, {})", p, s),
            },
            SqlType::Float => "FLOAT".into(),
            SqlType::Double => "DOUBLE".into(),
            SqlType::Char { length: None } => "CHAR".into(),
            SqlType::Char { length: Some(n) } => format!("CHAR({})", n),
            SqlType::Varchar { length: None } => "VARCHAR".into(),
            SqlType::Varchar { length: Some(n) } => format!("VARCHAR({})", n),
            SqlType::String => "STRING".into(),
            SqlType::Date => "DATE".into(),
            SqlType::Time => "TIME".into(),
            SqlType::Datetime => "DATETIME".into(),
            SqlType::Timestamp => "TIMESTAMP".into(),
            SqlType::SysRefcursor => "SYS_REFCURSOR".into(),
        }
    }
}

/// Declared type of a variable, constant, parameter or function result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSpec {
    Simple(SqlType),
    /// `name%TYPE`: the type of another variable, constant or parameter
    Percent(Ident),
}

impl TypeSpec {
    pub fn simple(ty: SqlType) -> Self {
        TypeSpec::Simple(ty)
    }
}
