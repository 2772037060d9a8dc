//! The value types of PL/CSQL

use plcsql_ast::{SqlType, DEFAULT_CHAR_LENGTH, DEFAULT_NUMERIC_PRECISION, MAX_CHAR_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a type in the coercion and common-type tables.
///
/// Parameterized variants share the index of their base type: CHAR(n),
/// VARCHAR(n) and STRING all sit at [`IDX_STRING`].
pub const IDX_NULL: usize = 0;
pub const IDX_OBJECT: usize = 1;
pub const IDX_BOOLEAN: usize = 2;
pub const IDX_STRING: usize = 3;
pub const IDX_SHORT: usize = 4;
pub const IDX_INT: usize = 5;
pub const IDX_BIGINT: usize = 6;
pub const IDX_NUMERIC: usize = 7;
pub const IDX_FLOAT: usize = 8;
pub const IDX_DOUBLE: usize = 9;
pub const IDX_DATE: usize = 10;
pub const IDX_TIME: usize = 11;
pub const IDX_DATETIME: usize = 12;
pub const IDX_TIMESTAMP: usize = 13;
pub const TABLE_SIZE: usize = 14;

/// A PL/CSQL type.
///
/// Equality is structural, parameters included: `CHAR(3) != CHAR(4)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Type of the `NULL` literal
    Null,
    Object,
    Boolean,
    Char(u32),
    Varchar(u32),
    /// Strings of any length, the type of `STRING` declarations
    StringAny,
    Short,
    Int,
    Bigint,
    Numeric { precision: u32, scale: u32 },
    /// Numbers of any precision
    NumericAny,
    Float,
    Double,
    Date,
    Time,
    Datetime,
    Timestamp,
    /// Type of an explicitly declared cursor
    Cursor,
    SysRefcursor,
}

impl Type {
    /// Value types that have an operator version in the runtime library.
    pub const VALUE_TYPES: [Type; 13] = [
        Type::Object,
        Type::Boolean,
        Type::StringAny,
        Type::Short,
        Type::Int,
        Type::Bigint,
        Type::NumericAny,
        Type::Float,
        Type::Double,
        Type::Date,
        Type::Time,
        Type::Datetime,
        Type::Timestamp,
    ];

    /// Type of a declaration as written in the source.
    pub fn from_sql_type(sql: &SqlType) -> Type {
        match sql {
            SqlType::Boolean => Type::Boolean,
            SqlType::Short => Type::Short,
            SqlType::Int => Type::Int,
            SqlType::Bigint => Type::Bigint,
            SqlType::Numeric { precision, scale } => Type::Numeric {
                precision: precision.unwrap_or(DEFAULT_NUMERIC_PRECISION),
                scale: scale.unwrap_or(0),
            },
            SqlType::Float => Type::Float,
            SqlType::Double => Type::Double,
            SqlType::Char { length } => Type::Char(length.unwrap_or(DEFAULT_CHAR_LENGTH)),
            SqlType::Varchar { length: Some(n) } => Type::Varchar(*n),
            SqlType::Varchar { length: None } | SqlType::String => Type::StringAny,
            SqlType::Date => Type::Date,
            SqlType::Time => Type::Time,
            SqlType::Datetime => Type::Datetime,
            SqlType::Timestamp => Type::Timestamp,
            SqlType::SysRefcursor => Type::SysRefcursor,
        }
    }

    /// Map a server column type code to a value type.
    pub fn from_db_type_code(code: i32) -> Option<Type> {
        match code {
            0 => Some(Type::Null),
            1 => Some(Type::Int),
            2 => Some(Type::Float),
            3 => Some(Type::Double),
            4 | 25 => Some(Type::StringAny),
            5 => Some(Type::Object),
            10 => Some(Type::Time),
            11 => Some(Type::Timestamp),
            12 => Some(Type::Date),
            18 => Some(Type::Short),
            22 => Some(Type::NumericAny),
            31 => Some(Type::Bigint),
            32 => Some(Type::Datetime),
            _ => None,
        }
    }

    /// Type of a string literal.
    pub fn string_literal() -> Type {
        Type::Char(MAX_CHAR_LENGTH)
    }

    /// Type of an unsigned integer literal, picked by magnitude.
    pub fn uint_literal(digits: &str) -> Type {
        if digits.parse::<i32>().is_ok() {
            Type::Int
        } else if digits.parse::<i64>().is_ok() {
            Type::Bigint
        } else {
            Type::NumericAny
        }
    }

    /// Type of a literal with a fraction or an exponent.
    pub fn float_literal(text: &str) -> Type {
        if text.contains(['e', 'E']) {
            Type::Double
        } else {
            Type::NumericAny
        }
    }

    /// Table index, or `None` for the two cursor types.
    pub fn idx(&self) -> Option<usize> {
        match self {
            Type::Null => Some(IDX_NULL),
            Type::Object => Some(IDX_OBJECT),
            Type::Boolean => Some(IDX_BOOLEAN),
            Type::Char(_) | Type::Varchar(_) | Type::StringAny => Some(IDX_STRING),
            Type::Short => Some(IDX_SHORT),
            Type::Int => Some(IDX_INT),
            Type::Bigint => Some(IDX_BIGINT),
            Type::Numeric { .. } | Type::NumericAny => Some(IDX_NUMERIC),
            Type::Float => Some(IDX_FLOAT),
            Type::Double => Some(IDX_DOUBLE),
            Type::Date => Some(IDX_DATE),
            Type::Time => Some(IDX_TIME),
            Type::Datetime => Some(IDX_DATETIME),
            Type::Timestamp => Some(IDX_TIMESTAMP),
            Type::Cursor | Type::SysRefcursor => None,
        }
    }

    /// The unparameterized representative of this type's table slot.
    pub fn generalize(&self) -> Type {
        match self {
            Type::Char(_) | Type::Varchar(_) => Type::StringAny,
            Type::Numeric { .. } => Type::NumericAny,
            other => *other,
        }
    }

    /// Inverse of [`Type::idx`] over unparameterized types.
    pub fn of_idx(idx: usize) -> Option<Type> {
        match idx {
            IDX_NULL => Some(Type::Null),
            IDX_OBJECT => Some(Type::Object),
            IDX_BOOLEAN => Some(Type::Boolean),
            IDX_STRING => Some(Type::StringAny),
            IDX_SHORT => Some(Type::Short),
            IDX_INT => Some(Type::Int),
            IDX_BIGINT => Some(Type::Bigint),
            IDX_NUMERIC => Some(Type::NumericAny),
            IDX_FLOAT => Some(Type::Float),
            IDX_DOUBLE => Some(Type::Double),
            IDX_DATE => Some(Type::Date),
            IDX_TIME => Some(Type::Time),
            IDX_DATETIME => Some(Type::Datetime),
            IDX_TIMESTAMP => Some(Type::Timestamp),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        self.idx() == Some(IDX_STRING)
    }

    pub fn is_char(&self) -> bool {
        matches!(self, Type::Char(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.idx(),
            Some(IDX_SHORT | IDX_INT | IDX_BIGINT | IDX_NUMERIC | IDX_FLOAT | IDX_DOUBLE)
        )
    }

    pub fn is_datetime(&self) -> bool {
        matches!(
            self.idx(),
            Some(IDX_DATE | IDX_TIME | IDX_DATETIME | IDX_TIMESTAMP)
        )
    }

    pub fn is_cursor(&self) -> bool {
        matches!(self, Type::Cursor | Type::SysRefcursor)
    }

    /// Types that cannot be bound to a SQL statement parameter.
    pub fn is_unbindable(&self) -> bool {
        matches!(self, Type::Boolean | Type::Cursor | Type::SysRefcursor)
    }

    /// Name as spelled in PL/CSQL, used in diagnostics.
    pub fn plc_name(&self) -> String {
        match self {
            Type::Null => "NULL".into(),
            Type::Object => "OBJECT".into(),
            Type::Boolean => "BOOLEAN".into(),
            Type::Char(n) => format!("CHAR({})", n),
            Type::Varchar(n) => format!("VARCHAR({})", n),
            Type::StringAny => "STRING".into(),
            Type::Short => "SHORT".into(),
            Type::Int => "INT".into(),
            Type::Bigint => "BIGINT".into(),
            Type::Numeric { precision, scale } => format!("NUMERIC({}, {})", precision, scale),
            Type::NumericAny => "NUMERIC".into(),
            Type::Float => "FLOAT".into(),
            Type::Double => "DOUBLE".into(),
            Type::Date => "DATE".into(),
            Type::Time => "TIME".into(),
            Type::Datetime => "DATETIME".into(),
            Type::Timestamp => "TIMESTAMP".into(),
            Type::Cursor => "CURSOR".into(),
            Type::SysRefcursor => "SYS_REFCURSOR".into(),
        }
    }

    /// Name used in the runtime library's `conv<Src>To<Dst>` functions.
    pub fn conv_name(&self) -> &'static str {
        match self {
            Type::Null => "Null",
            Type::Object => "Object",
            Type::Boolean => "Boolean",
            Type::Char(_) | Type::Varchar(_) | Type::StringAny => "String",
            Type::Short => "Short",
            Type::Int => "Int",
            Type::Bigint => "Bigint",
            Type::Numeric { .. } | Type::NumericAny => "Numeric",
            Type::Float => "Float",
            Type::Double => "Double",
            Type::Date => "Date",
            Type::Time => "Time",
            Type::Datetime => "Datetime",
            Type::Timestamp => "Timestamp",
            Type::Cursor | Type::SysRefcursor => "Query",
        }
    }

    /// Fully qualified Java type that represents values of this type.
    pub fn full_java_type(&self) -> &'static str {
        match self {
            Type::Null | Type::Object => "java.lang.Object",
            Type::Boolean => "java.lang.Boolean",
            Type::Char(_) | Type::Varchar(_) | Type::StringAny => "java.lang.String",
            Type::Short => "java.lang.Short",
            Type::Int => "java.lang.Integer",
            Type::Bigint => "java.lang.Long",
            Type::Numeric { .. } | Type::NumericAny => "java.math.BigDecimal",
            Type::Float => "java.lang.Float",
            Type::Double => "java.lang.Double",
            Type::Date => "java.sql.Date",
            Type::Time => "java.sql.Time",
            Type::Datetime | Type::Timestamp => "java.sql.Timestamp",
            Type::Cursor | Type::SysRefcursor => "com.cubrid.plcsql.predefined.sp.SpLib.Query",
        }
    }

    /// Simple Java type name as written in generated code.
    pub fn java_code(&self) -> &'static str {
        let full = self.full_java_type();
        full.rsplit('.').next().unwrap_or(full)
    }

    /// Import needed to mention this type, if any. `java.lang` types and
    /// the runtime library's nested classes need none.
    pub fn java_import(&self) -> Option<&'static str> {
        let full = self.full_java_type();
        if full.starts_with("java.lang.") || full.starts_with("com.cubrid.plcsql.predefined.sp.SpLib.")
        {
            None
        } else {
            Some(full)
        }
    }

    /// A SQL literal of this type, used to query built-in function
    /// signatures. `None` for types that have no SQL literal.
    pub fn typical_value(&self) -> Option<&'static str> {
        match self {
            Type::Null => Some("null"),
            Type::Object => Some("?"),
            Type::Char(_) | Type::Varchar(_) | Type::StringAny => Some("'a'"),
            Type::Short => Some("cast(1 as short)"),
            Type::Int => Some("1"),
            Type::Bigint => Some("cast(1 as bigint)"),
            Type::Numeric { .. } | Type::NumericAny => Some("cast(1 as numeric)"),
            Type::Float => Some("cast(1 as float)"),
            Type::Double => Some("cast(1 as double)"),
            Type::Date => Some("date'2000-01-01'"),
            Type::Time => Some("time'00:00:00'"),
            Type::Datetime => Some("datetime'2000-01-01 00:00:00.000'"),
            Type::Timestamp => Some("timestamp'2000-01-01 00:00:00'"),
            Type::Boolean | Type::Cursor | Type::SysRefcursor => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plc_name())
    }
}
