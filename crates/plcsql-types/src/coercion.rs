//! Implicit coercions between value types

use crate::ty::*;
use serde::{Deserialize, Serialize};

/// How a value of one type is turned into a value of another.
///
/// The check variants wrap an inner coercion with a runtime length or
/// precision check for parameterized targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coercion {
    Identity(Type),
    /// Java cast; used out of NULL and into OBJECT
    Cast { src: Type, dst: Type },
    /// Call of a runtime `conv<Src>To<Dst>` function
    Conversion { src: Type, dst: Type },
    CheckPrecision {
        inner: Box<Coercion>,
        precision: u32,
        scale: u32,
    },
    CheckStrLength {
        inner: Box<Coercion>,
        is_char: bool,
        length: u32,
    },
}

impl Coercion {
    /// The coercion from `src` to `dst`, if there is one.
    pub fn between(src: Type, dst: Type) -> Option<Coercion> {
        if src == dst {
            return Some(Coercion::Identity(src));
        }
        if src == Type::Null {
            return Some(Coercion::Cast { src, dst });
        }
        if src.is_cursor() || dst.is_cursor() {
            return None;
        }
        if dst == Type::Object {
            return Some(Coercion::Cast { src, dst });
        }

        let (si, di) = (src.idx()?, dst.idx()?);
        let base = if si == di {
            Coercion::Identity(src)
        } else if conversion_exists(si, di) {
            Coercion::Conversion { src, dst }
        } else {
            return None;
        };
        Some(Self::with_check(base, dst))
    }

    fn with_check(inner: Coercion, dst: Type) -> Coercion {
        match dst {
            Type::Char(length) => Coercion::CheckStrLength {
                inner: Box::new(inner),
                is_char: true,
                length,
            },
            Type::Varchar(length) => Coercion::CheckStrLength {
                inner: Box::new(inner),
                is_char: false,
                length,
            },
            Type::Numeric { precision, scale } => Coercion::CheckPrecision {
                inner: Box::new(inner),
                precision,
                scale,
            },
            _ => inner,
        }
    }

    pub fn src(&self) -> Type {
        match self {
            Coercion::Identity(t) => *t,
            Coercion::Cast { src, .. } | Coercion::Conversion { src, .. } => *src,
            Coercion::CheckPrecision { inner, .. } | Coercion::CheckStrLength { inner, .. } => {
                inner.src()
            }
        }
    }

    pub fn dst(&self) -> Type {
        match self {
            Coercion::Identity(t) => *t,
            Coercion::Cast { dst, .. } | Coercion::Conversion { dst, .. } => *dst,
            Coercion::CheckPrecision {
                precision, scale, ..
            } => Type::Numeric {
                precision: *precision,
                scale: *scale,
            },
            Coercion::CheckStrLength {
                is_char: true,
                length,
                ..
            } => Type::Char(*length),
            Coercion::CheckStrLength { length, .. } => Type::Varchar(*length),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Coercion::Identity(_))
    }

    /// The coercion that carries a value back from `dst` to `src`, used
    /// to write OUT arguments back. Coercions out of NULL have none.
    pub fn reverse(&self) -> Option<Coercion> {
        match self.src() {
            Type::Null => None,
            src => Coercion::between(self.dst(), src),
        }
    }

    pub fn is_reversible(&self) -> bool {
        self.reverse().is_some()
    }

    /// Apply the coercion to a Java expression, on one line.
    pub fn java_code(&self, expr: &str) -> String {
        match self {
            Coercion::Identity(_) => expr.to_string(),
            Coercion::Cast { dst, .. } => format!("({}) {}", dst.java_code(), expr),
            Coercion::Conversion { src, dst } => {
                format!("conv{}To{}({})", src.conv_name(), dst.conv_name(), expr)
            }
            Coercion::CheckPrecision {
                inner,
                precision,
                scale,
            } => format!(
                "checkPrecision({}, (short) {}, {})",
                precision,
                scale,
                inner.java_code(expr)
            ),
            Coercion::CheckStrLength {
                inner,
                is_char,
                length,
            } => format!(
                "checkStrLength({}, {}, {})",
                is_char,
                length,
                inner.java_code(expr)
            ),
        }
    }
}

/// Whether the runtime library has a `conv<Src>To<Dst>` function between
/// two distinct table slots.
fn conversion_exists(src: usize, dst: usize) -> bool {
    const NUMBERS: &[usize] = &[IDX_SHORT, IDX_INT, IDX_BIGINT, IDX_NUMERIC, IDX_FLOAT, IDX_DOUBLE];
    let numbers = NUMBERS.contains(&dst);
    match src {
        IDX_SHORT | IDX_INT | IDX_BIGINT | IDX_FLOAT | IDX_DOUBLE => {
            numbers || matches!(dst, IDX_STRING | IDX_TIME | IDX_TIMESTAMP)
        }
        IDX_NUMERIC => numbers || matches!(dst, IDX_STRING | IDX_TIMESTAMP),
        IDX_STRING => {
            numbers || matches!(dst, IDX_DATE | IDX_TIME | IDX_DATETIME | IDX_TIMESTAMP)
        }
        IDX_DATE => matches!(dst, IDX_STRING | IDX_DATETIME | IDX_TIMESTAMP),
        IDX_TIME => dst == IDX_STRING,
        IDX_DATETIME => matches!(dst, IDX_DATE | IDX_STRING | IDX_TIME | IDX_TIMESTAMP),
        IDX_TIMESTAMP => matches!(dst, IDX_DATE | IDX_DATETIME | IDX_STRING | IDX_TIME),
        IDX_OBJECT => dst != IDX_BOOLEAN && dst != IDX_NULL,
        _ => false,
    }
}
