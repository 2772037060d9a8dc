//! Expression nodes

use crate::{NodeId, Pos};
use serde::{Deserialize, Serialize};

/// A name occurrence. Every reference gets its own id so that name
/// resolution can be recorded per occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    #[serde(default)]
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub pos: Pos,
}

impl Ident {
    pub fn new(name: impl Into<String>, pos: Pos) -> Self {
        Self {
            id: NodeId::default(),
            name: name.into(),
            pos,
        }
    }

    /// Names are case-insensitive; this is the form used for lookup and
    /// for generated Java identifiers.
    pub fn normalized(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Pos) -> Self {
        Self {
            id: NodeId::default(),
            pos,
            kind,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Null,
    True,
    False,
    /// Unsigned integer literal, digits only
    Uint(String),
    /// Decimal or exponent literal
    Float(String),
    /// String literal, without quotes
    Str(String),
    /// `DATE 'yyyy-mm-dd'`
    Date(String),
    /// `TIME 'hh:mi:ss'`
    Time(String),
    /// `DATETIME 'yyyy-mm-dd hh:mi:ss.fff'`
    Datetime(String),
    /// `TIMESTAMP 'yyyy-mm-dd hh:mi:ss'`
    Timestamp(String),
    /// `SQL%ROWCOUNT`
    SqlRowCount,
    SqlCode,
    SqlErrm,
    /// `serial.NEXT_VALUE` / `serial.CURRENT_VALUE`
    Serial { name: String, next: bool },
    Id(Ident),
    /// `record.field` inside a FOR loop over a query
    Field { record: Ident, field: String },
    CursorAttr {
        cursor: Ident,
        attr: CursorAttribute,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Between {
        target: Box<Expr>,
        lower: Box<Expr>,
        upper: Box<Expr>,
    },
    In {
        target: Box<Expr>,
        elements: Vec<Expr>,
    },
    Like {
        target: Box<Expr>,
        pattern: Box<Expr>,
        #[serde(default)]
        escape: Option<String>,
    },
    /// Simple CASE expression
    Case {
        selector: Box<Expr>,
        arms: Vec<CaseArm>,
        #[serde(default)]
        else_expr: Option<Box<Expr>>,
    },
    /// Searched CASE expression
    Cond {
        arms: Vec<CondArm>,
        #[serde(default)]
        else_expr: Option<Box<Expr>>,
    },
    /// Function call: local, global, or a built-in SQL function
    Call { name: Ident, args: Vec<Expr> },
}

/// `WHEN value THEN result` of a simple CASE expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseArm {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub value: Expr,
    pub result: Expr,
}

/// `WHEN condition THEN result` of a searched CASE expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondArm {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub cond: Expr,
    pub result: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorAttribute {
    IsOpen,
    Found,
    NotFound,
    RowCount,
}

impl CursorAttribute {
    /// Method of the runtime `Query` object that implements the attribute.
    pub fn method(&self) -> &'static str {
        match self {
            CursorAttribute::IsOpen => "isOpen",
            CursorAttribute::Found => "found",
            CursorAttribute::NotFound => "notFound",
            CursorAttribute::RowCount => "rowCount",
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            CursorAttribute::IsOpen => "%ISOPEN",
            CursorAttribute::Found => "%FOUND",
            CursorAttribute::NotFound => "%NOTFOUND",
            CursorAttribute::RowCount => "%ROWCOUNT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
    BitCompli,
    IsNull,
}

impl UnaryOp {
    /// Operator name as it appears in the runtime library (`op<Name>`).
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "Neg",
            UnaryOp::Not => "Not",
            UnaryOp::BitCompli => "BitCompli",
            UnaryOp::IsNull => "IsNull",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Or,
    And,
    Xor,
    Eq,
    NullSafeEq,
    Neq,
    Le,
    Ge,
    Lt,
    Gt,
    BitOr,
    BitAnd,
    BitXor,
    BitShiftLeft,
    BitShiftRight,
    Add,
    Subtract,
    Concat,
    Mult,
    Div,
    DivInt,
    Mod,
}

impl BinaryOp {
    /// Operator name as it appears in the runtime library (`op<Name>`).
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Or => "Or",
            BinaryOp::And => "And",
            BinaryOp::Xor => "Xor",
            BinaryOp::Eq => "Eq",
            BinaryOp::NullSafeEq => "NullSafeEq",
            BinaryOp::Neq => "Neq",
            BinaryOp::Le => "Le",
            BinaryOp::Ge => "Ge",
            BinaryOp::Lt => "Lt",
            BinaryOp::Gt => "Gt",
            BinaryOp::BitOr => "BitOr",
            BinaryOp::BitAnd => "BitAnd",
            BinaryOp::BitXor => "BitXor",
            BinaryOp::BitShiftLeft => "BitShiftLeft",
            BinaryOp::BitShiftRight => "BitShiftRight",
            BinaryOp::Add => "Add",
            BinaryOp::Subtract => "Subtract",
            BinaryOp::Concat => "Concat",
            BinaryOp::Mult => "Mult",
            BinaryOp::Div => "Div",
            BinaryOp::DivInt => "DivInt",
            BinaryOp::Mod => "Mod",
        }
    }

    /// Source spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Or => "OR",
            BinaryOp::And => "AND",
            BinaryOp::Xor => "XOR",
            BinaryOp::Eq => "=",
            BinaryOp::NullSafeEq => "<=>",
            BinaryOp::Neq => "<>",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitShiftLeft => "<<",
            BinaryOp::BitShiftRight => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Concat => "||",
            BinaryOp::Mult => "*",
            BinaryOp::Div => "/",
            BinaryOp::DivInt => "DIV",
            BinaryOp::Mod => "MOD",
        }
    }

    /// Comparison operators get a `Char` extension when all operands are CHAR.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NullSafeEq
                | BinaryOp::Neq
                | BinaryOp::Le
                | BinaryOp::Ge
                | BinaryOp::Lt
                | BinaryOp::Gt
        )
    }
}
