//! Error types for name resolution

use plcsql_ast::Pos;
use thiserror::Error;

/// Errors from name resolution. All of them stop translation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolError {
    /// E-SYMBOL-001: Name not declared in any enclosing scope
    #[error("undeclared identifier {name}")]
    Undeclared { name: String, pos: Pos },

    /// E-SYMBOL-002: Name declared twice in one scope
    #[error("{name} has already been declared in the same scope")]
    Duplicate { name: String, pos: Pos },

    /// E-SYMBOL-003: Constant, IN parameter or loop iterator used as a target
    #[error("{name} cannot be used as a target of assignment")]
    NotAssignable { name: String, pos: Pos },

    /// E-SYMBOL-004
    #[error("{name} is not a cursor")]
    NotACursor { name: String, pos: Pos },

    /// E-SYMBOL-005
    #[error("{name} is not a SYS_REFCURSOR variable")]
    NotARefCursor { name: String, pos: Pos },

    /// E-SYMBOL-006
    #[error("{name} is not an exception")]
    NotAnException { name: String, pos: Pos },

    /// E-SYMBOL-007: Call or cursor argument list of the wrong length
    #[error("the number of arguments to {name} does not match the number of its parameters ({found} for {expected})")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        pos: Pos,
    },

    /// E-SYMBOL-008
    #[error("{name} is not a procedure")]
    NotAProcedure { name: String, pos: Pos },

    /// E-SYMBOL-009
    #[error("{name} is not a function")]
    NotAFunction { name: String, pos: Pos },

    /// E-SYMBOL-010
    #[error("undeclared label {name}")]
    UndeclaredLabel { name: String, pos: Pos },

    /// E-SYMBOL-011: Bare RAISE outside an exception handler
    #[error("RAISE without an exception name can only be used in an exception handler")]
    RaiseOutsideHandler { pos: Pos },

    /// E-SYMBOL-012: Cursor, exception, label or procedure used as a value
    #[error("{name} cannot be used as a value")]
    NotAValue { name: String, pos: Pos },

    /// E-SYMBOL-013
    #[error("{name} is not a record")]
    NotARecord { name: String, pos: Pos },

    /// E-SYMBOL-014: `%TYPE` of something without a data type
    #[error("{name} does not have a data type to be referred to with %TYPE")]
    BadPercentType { name: String, pos: Pos },

    /// E-SYMBOL-015
    #[error("{keyword} must be used inside a loop")]
    OutsideLoop { keyword: &'static str, pos: Pos },

    /// E-SYMBOL-016: Cursor parameter inside a larger host expression
    #[error("cursor parameter {name} can only be used as a whole host expression")]
    CursorParamMisuse { name: String, pos: Pos },
}

impl SymbolError {
    /// Get the source position of this error
    pub fn pos(&self) -> Pos {
        match self {
            SymbolError::Undeclared { pos, .. }
            | SymbolError::Duplicate { pos, .. }
            | SymbolError::NotAssignable { pos, .. }
            | SymbolError::NotACursor { pos, .. }
            | SymbolError::NotARefCursor { pos, .. }
            | SymbolError::NotAnException { pos, .. }
            | SymbolError::ArgumentCount { pos, .. }
            | SymbolError::NotAProcedure { pos, .. }
            | SymbolError::NotAFunction { pos, .. }
            | SymbolError::UndeclaredLabel { pos, .. }
            | SymbolError::RaiseOutsideHandler { pos }
            | SymbolError::NotAValue { pos, .. }
            | SymbolError::NotARecord { pos, .. }
            | SymbolError::BadPercentType { pos, .. }
            | SymbolError::OutsideLoop { pos, .. }
            | SymbolError::CursorParamMisuse { pos, .. } => *pos,
        }
    }

    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            SymbolError::Undeclared { .. } => "E-SYMBOL-001",
            SymbolError::Duplicate { .. } => "E-SYMBOL-002",
            SymbolError::NotAssignable { .. } => "E-SYMBOL-003",
            SymbolError::NotACursor { .. } => "E-SYMBOL-004",
            SymbolError::NotARefCursor { .. } => "E-SYMBOL-005",
            SymbolError::NotAnException { .. } => "E-SYMBOL-006",
            SymbolError::ArgumentCount { .. } => "E-SYMBOL-007",
            SymbolError::NotAProcedure { .. } => "E-SYMBOL-008",
            SymbolError::NotAFunction { .. } => "E-SYMBOL-009",
            SymbolError::UndeclaredLabel { .. } => "E-SYMBOL-010",
            SymbolError::RaiseOutsideHandler { .. } => "E-SYMBOL-011",
            SymbolError::NotAValue { .. } => "E-SYMBOL-012",
            SymbolError::NotARecord { .. } => "E-SYMBOL-013",
            SymbolError::BadPercentType { .. } => "E-SYMBOL-014",
            SymbolError::OutsideLoop { .. } => "E-SYMBOL-015",
            SymbolError::CursorParamMisuse { .. } => "E-SYMBOL-016",
        }
    }
}
