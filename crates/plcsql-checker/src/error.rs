//! Semantic errors found by type checking

use plcsql_ast::Pos;
use thiserror::Error;

/// Errors from type checking. The checker stops at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    /// E-TYPE-001: IF, searched CASE or conditional expression condition
    #[error("the condition must be of BOOLEAN type")]
    ConditionNotBoolean { found: String, pos: Pos },

    /// E-TYPE-002
    #[error("the condition of a WHILE loop must be of BOOLEAN type")]
    WhileConditionNotBoolean { found: String, pos: Pos },

    /// E-TYPE-003
    #[error("NOT NULL {name} may not have null as its initial value")]
    NullInitializer { name: String, pos: Pos },

    /// E-TYPE-004
    #[error("type {found} of the initial value is not compatible with the declared type {expected} of {name}")]
    InitializerMismatch {
        name: String,
        found: String,
        expected: String,
        pos: Pos,
    },

    /// E-TYPE-005
    #[error("lower bound or upper bound does not have a comparable type")]
    BetweenNotComparable { pos: Pos },

    /// E-TYPE-006
    #[error("operands of {op} do not have compatible types ({left}, {right})")]
    BinaryOperandsMismatch {
        op: &'static str,
        left: String,
        right: String,
        pos: Pos,
    },

    /// E-TYPE-007
    #[error("operand of {op} does not have a compatible type {operand}")]
    UnaryOperandMismatch {
        op: &'static str,
        operand: String,
        pos: Pos,
    },

    /// E-TYPE-008
    #[error("one of the values does not have a comparable type")]
    InNotComparable { pos: Pos },

    /// E-TYPE-009
    #[error("tested expression of type {found} cannot be coerced to a string type")]
    LikeTargetNotString { found: String, pos: Pos },

    /// E-TYPE-010
    #[error("pattern of type {found} cannot be coerced to a string type")]
    LikePatternNotString { found: String, pos: Pos },

    /// E-TYPE-011: CASE selector and WHEN values have no common comparison
    #[error("one of the values does not have a comparable type")]
    CaseValuesNotComparable { pos: Pos },

    /// E-TYPE-012
    #[error("expression in this case has an incompatible type {found}")]
    BranchTypeMismatch { found: String, pos: Pos },

    /// E-TYPE-013
    #[error("expression in the else part has an incompatible type {found}")]
    ElseTypeMismatch { found: String, pos: Pos },

    /// E-TYPE-014
    #[error("argument {index} to the call of {routine} has an incompatible type {found}")]
    ArgumentMismatch {
        routine: String,
        index: usize,
        found: String,
        pos: Pos,
    },

    /// E-TYPE-015: OUT/INOUT argument that cannot be written back
    #[error("OUT/INOUT parameter {index} of {routine} has a type {param} which is incompatible with the argument type {arg}")]
    OutArgumentNotReversible {
        routine: String,
        index: usize,
        param: String,
        arg: String,
        pos: Pos,
    },

    /// E-TYPE-016
    #[error("type {found} of the value is not compatible with the type {expected} of {name}")]
    AssignMismatch {
        name: String,
        found: String,
        expected: String,
        pos: Pos,
    },

    /// E-TYPE-017
    #[error("NOT NULL constraint violation: null assigned to {name}")]
    NotNullViolation { name: String, pos: Pos },

    /// E-TYPE-018
    #[error("type {found} of the return value is not compatible with the return type {expected}")]
    ReturnMismatch {
        found: String,
        expected: String,
        pos: Pos,
    },

    /// E-TYPE-019
    #[error("error codes must be an INT")]
    ErrorCodeNotInt { found: String, pos: Pos },

    /// E-TYPE-020
    #[error("error messages must be a string")]
    ErrorMessageNotString { found: String, pos: Pos },

    /// E-TYPE-021
    #[error("argument {index} to the cursor {cursor} has an incompatible type {found}")]
    CursorArgumentMismatch {
        cursor: String,
        index: usize,
        found: String,
        pos: Pos,
    },

    /// E-TYPE-022: EXECUTE IMMEDIATE or dynamic FOR loop SQL
    #[error("SQL in EXECUTE IMMEDIATE statements must be of a string type")]
    DynamicSqlNotString { found: String, pos: Pos },

    /// E-TYPE-023
    #[error("lower bounds of FOR loops must have a type compatible with INT")]
    ForLowerBound { found: String, pos: Pos },

    /// E-TYPE-024
    #[error("upper bounds of FOR loops must have a type compatible with INT")]
    ForUpperBound { found: String, pos: Pos },

    /// E-TYPE-025
    #[error("steps of FOR loops must have a type compatible with INT")]
    ForStep { found: String, pos: Pos },

    /// E-TYPE-026: Argument type has no SQL literal to send to the server
    #[error("argument {index} to the built-in function {name} has an invalid type")]
    BuiltinArgumentInvalid {
        name: String,
        index: usize,
        pos: Pos,
    },

    /// E-TYPE-027
    #[error("function {name} is undefined or given wrong number or types of arguments")]
    BuiltinUndefined { name: String, pos: Pos },

    /// E-TYPE-028
    #[error("unsupported return type (code {code}) of the built-in function {name}")]
    BuiltinReturnTypeUnsupported { name: String, code: i32, pos: Pos },

    /// E-TYPE-029
    #[error("host expressions cannot be of either BOOLEAN, CURSOR or SYS_REFCURSOR type")]
    HostExprNotBindable { found: String, pos: Pos },

    /// E-TYPE-030
    #[error("expressions in a USING clause cannot be of either BOOLEAN, CURSOR or SYS_REFCURSOR type")]
    UsingExprNotBindable { found: String, pos: Pos },

    /// E-TYPE-031: The server could not compile an embedded SQL statement
    #[error("{msg}")]
    SqlRejected { code: i32, msg: String, pos: Pos },

    /// E-TYPE-032
    #[error("the SELECT statement contains a column {column} of an unsupported type (code {code})")]
    ColumnTypeUnsupported { column: String, code: i32, pos: Pos },

    /// E-TYPE-033
    #[error("the length of the select list ({expected}) is different from the number of into-variables ({found})")]
    IntoCountMismatch {
        expected: usize,
        found: usize,
        pos: Pos,
    },

    /// E-TYPE-034
    #[error("into-variable {name} cannot be used there due to its incompatible type")]
    IntoTargetMismatch { name: String, pos: Pos },

    /// E-TYPE-035
    #[error("into-variable {name} has an incompatible type {found}")]
    DynamicIntoTargetMismatch { name: String, found: String, pos: Pos },

    /// E-TYPE-036
    #[error("type of column {column} of the cursor is not compatible with the type of variable {name}")]
    FetchTargetMismatch {
        column: usize,
        name: String,
        pos: Pos,
    },

    /// E-TYPE-037
    #[error("no such column '{name}' in the query result")]
    NoSuchColumn { name: String, pos: Pos },

    /// E-TYPE-038
    #[error("column name '{name}' is ambiguous")]
    AmbiguousColumn { name: String, pos: Pos },

    /// E-TYPE-039: The resolution given to the checker does not cover
    /// this identifier
    #[error("identifier {name} has not been resolved")]
    Unresolved { name: String, pos: Pos },
}

impl SemanticError {
    pub fn pos(&self) -> Pos {
        match self {
            SemanticError::ConditionNotBoolean { pos, .. }
            | SemanticError::WhileConditionNotBoolean { pos, .. }
            | SemanticError::NullInitializer { pos, .. }
            | SemanticError::InitializerMismatch { pos, .. }
            | SemanticError::BetweenNotComparable { pos }
            | SemanticError::BinaryOperandsMismatch { pos, .. }
            | SemanticError::UnaryOperandMismatch { pos, .. }
            | SemanticError::InNotComparable { pos }
            | SemanticError::LikeTargetNotString { pos, .. }
            | SemanticError::LikePatternNotString { pos, .. }
            | SemanticError::CaseValuesNotComparable { pos }
            | SemanticError::BranchTypeMismatch { pos, .. }
            | SemanticError::ElseTypeMismatch { pos, .. }
            | SemanticError::ArgumentMismatch { pos, .. }
            | SemanticError::OutArgumentNotReversible { pos, .. }
            | SemanticError::AssignMismatch { pos, .. }
            | SemanticError::NotNullViolation { pos, .. }
            | SemanticError::ReturnMismatch { pos, .. }
            | SemanticError::ErrorCodeNotInt { pos, .. }
            | SemanticError::ErrorMessageNotString { pos, .. }
            | SemanticError::CursorArgumentMismatch { pos, .. }
            | SemanticError::DynamicSqlNotString { pos, .. }
            | SemanticError::ForLowerBound { pos, .. }
            | SemanticError::ForUpperBound { pos, .. }
            | SemanticError::ForStep { pos, .. }
            | SemanticError::BuiltinArgumentInvalid { pos, .. }
            | SemanticError::BuiltinUndefined { pos, .. }
            | SemanticError::BuiltinReturnTypeUnsupported { pos, .. }
            | SemanticError::HostExprNotBindable { pos, .. }
            | SemanticError::UsingExprNotBindable { pos, .. }
            | SemanticError::SqlRejected { pos, .. }
            | SemanticError::ColumnTypeUnsupported { pos, .. }
            | SemanticError::IntoCountMismatch { pos, .. }
            | SemanticError::IntoTargetMismatch { pos, .. }
            | SemanticError::DynamicIntoTargetMismatch { pos, .. }
            | SemanticError::FetchTargetMismatch { pos, .. }
            | SemanticError::NoSuchColumn { pos, .. }
            | SemanticError::AmbiguousColumn { pos, .. }
            | SemanticError::Unresolved { pos, .. } => *pos,
        }
    }

    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            SemanticError::ConditionNotBoolean { .. } => "E-TYPE-001",
            SemanticError::WhileConditionNotBoolean { .. } => "E-TYPE-002",
            SemanticError::NullInitializer { .. } => "E-TYPE-003",
            SemanticError::InitializerMismatch { .. } => "E-TYPE-004",
            SemanticError::BetweenNotComparable { .. } => "E-TYPE-005",
            SemanticError::BinaryOperandsMismatch { .. } => "E-TYPE-006",
            SemanticError::UnaryOperandMismatch { .. } => "E-TYPE-007",
            SemanticError::InNotComparable { .. } => "E-TYPE-008",
            SemanticError::LikeTargetNotString { .. } => "E-TYPE-009",
            SemanticError::LikePatternNotString { .. } => "E-TYPE-010",
            SemanticError::CaseValuesNotComparable { .. } => "E-TYPE-011",
            SemanticError::BranchTypeMismatch { .. } => "E-TYPE-012",
            SemanticError::ElseTypeMismatch { .. } => "E-TYPE-013",
            SemanticError::ArgumentMismatch { .. } => "E-TYPE-014",
            SemanticError::OutArgumentNotReversible { .. } => "E-TYPE-015",
            SemanticError::AssignMismatch { .. } => "E-TYPE-016",
            SemanticError::NotNullViolation { .. } => "E-TYPE-017",
            SemanticError::ReturnMismatch { .. } => "E-TYPE-018",
            SemanticError::ErrorCodeNotInt { .. } => "E-TYPE-019",
            SemanticError::ErrorMessageNotString { .. } => "E-TYPE-020",
            SemanticError::CursorArgumentMismatch { .. } => "E-TYPE-021",
            SemanticError::DynamicSqlNotString { .. } => "E-TYPE-022",
            SemanticError::ForLowerBound { .. } => "E-TYPE-023",
            SemanticError::ForUpperBound { .. } => "E-TYPE-024",
            SemanticError::ForStep { .. } => "E-TYPE-025",
            SemanticError::BuiltinArgumentInvalid { .. } => "E-TYPE-026",
            SemanticError::BuiltinUndefined { .. } => "E-TYPE-027",
            SemanticError::BuiltinReturnTypeUnsupported { .. } => "E-TYPE-028",
            SemanticError::HostExprNotBindable { .. } => "E-TYPE-029",
            SemanticError::UsingExprNotBindable { .. } => "E-TYPE-030",
            SemanticError::SqlRejected { .. } => "E-TYPE-031",
            SemanticError::ColumnTypeUnsupported { .. } => "E-TYPE-032",
            SemanticError::IntoCountMismatch { .. } => "E-TYPE-033",
            SemanticError::IntoTargetMismatch { .. } => "E-TYPE-034",
            SemanticError::DynamicIntoTargetMismatch { .. } => "E-TYPE-035",
            SemanticError::FetchTargetMismatch { .. } => "E-TYPE-036",
            SemanticError::NoSuchColumn { .. } => "E-TYPE-037",
            SemanticError::AmbiguousColumn { .. } => "E-TYPE-038",
            SemanticError::Unresolved { .. } => "E-TYPE-039",
        }
    }
}
