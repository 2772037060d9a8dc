//! Symbol information and kinds

use plcsql_ast::{NodeId, ParamMode, Pos, RoutineKind};
use plcsql_types::Type;
use serde::Serialize;

/// Index of a symbol in a [`crate::Resolution`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

/// A declared name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub id: SymbolId,

    /// Lowercased name, as used in generated code
    pub name: String,

    pub kind: SymbolKind,

    /// Depth of the declaring scope; predefined symbols are at level 0
    pub level: u32,

    /// Declaration block whose generated class holds this symbol, or
    /// `None` for method locals such as parameters and iterators
    pub block: Option<String>,

    /// Declaration or parameter node, absent for predefined symbols
    pub decl: Option<NodeId>,

    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SymbolKind {
    Var {
        ty: Type,
        not_null: bool,
    },
    Const {
        ty: Type,
        not_null: bool,
    },
    Param {
        ty: Type,
        mode: ParamMode,
    },
    /// Parameter of an explicit cursor; only visible in the cursor's SQL
    CursorParam {
        ty: Type,
        cursor: SymbolId,
        index: usize,
    },
    /// Integer iterator of a FOR loop
    Iterator,
    /// Row variable of a FOR loop over a query
    Record(RecordSource),
    Cursor {
        params: Vec<Type>,
        /// Parameter symbols in declaration order
        param_symbols: Vec<SymbolId>,
        sql: NodeId,
    },
    Exception {
        predefined: bool,
    },
    Routine(RoutineSig),
    /// Loop label
    Label,
}

/// What a FOR-loop record iterates over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordSource {
    Cursor(SymbolId),
    StaticSql(NodeId),
    DynamicSql,
}

/// Where a callable routine lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoutineOrigin {
    /// The unit itself or a routine declared inside it
    Local,
    /// A stored routine in the database, called through JDBC
    External,
    DbmsOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSig {
    pub name: String,
    pub mode: ParamMode,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutineSig {
    /// Name as declared; external routines keep their database spelling
    pub name: String,
    pub kind: RoutineKind,
    pub params: Vec<ParamSig>,
    pub ret: Option<Type>,
    pub origin: RoutineOrigin,
}

impl RoutineSig {
    pub fn is_procedure(&self) -> bool {
        self.kind == RoutineKind::Procedure
    }
}

impl Symbol {
    /// Type of the symbol when it is used as a value.
    pub fn value_type(&self) -> Option<Type> {
        match &self.kind {
            SymbolKind::Var { ty, .. }
            | SymbolKind::Const { ty, .. }
            | SymbolKind::Param { ty, .. }
            | SymbolKind::CursorParam { ty, .. } => Some(*ty),
            SymbolKind::Iterator => Some(Type::Int),
            _ => None,
        }
    }

    /// Whether the symbol may be the target of an assignment or INTO.
    pub fn is_assignable(&self) -> bool {
        match &self.kind {
            SymbolKind::Var { .. } => true,
            SymbolKind::Param { mode, .. } => mode.is_out(),
            _ => false,
        }
    }

    pub fn is_not_null(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Var { not_null: true, .. } | SymbolKind::Const { not_null: true, .. }
        )
    }

    /// Whether the symbol holds a SYS_REFCURSOR value.
    pub fn is_ref_cursor(&self) -> bool {
        self.value_type() == Some(Type::SysRefcursor)
    }

    pub fn routine(&self) -> Option<&RoutineSig> {
        match &self.kind {
            SymbolKind::Routine(sig) => Some(sig),
            _ => None,
        }
    }

    /// Word used for this kind of symbol in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SymbolKind::Var { .. } => "variable",
            SymbolKind::Const { .. } => "constant",
            SymbolKind::Param { .. } | SymbolKind::CursorParam { .. } => "parameter",
            SymbolKind::Iterator => "loop iterator",
            SymbolKind::Record(_) => "record",
            SymbolKind::Cursor { .. } => "cursor",
            SymbolKind::Exception { .. } => "exception",
            SymbolKind::Routine(sig) if sig.is_procedure() => "procedure",
            SymbolKind::Routine(_) => "function",
            SymbolKind::Label => "label",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(kind: SymbolKind) -> Symbol {
        Symbol {
            id: SymbolId(0),
            name: "x".into(),
            kind,
            level: 1,
            block: None,
            decl: None,
            pos: Pos::IGNORED,
        }
    }

    #[test]
    fn test_assignability() {
        assert!(sym(SymbolKind::Var {
            ty: Type::Int,
            not_null: false
        })
        .is_assignable());
        assert!(!sym(SymbolKind::Const {
            ty: Type::Int,
            not_null: false
        })
        .is_assignable());
        assert!(!sym(SymbolKind::Param {
            ty: Type::Int,
            mode: ParamMode::In
        })
        .is_assignable());
        assert!(sym(SymbolKind::Param {
            ty: Type::Int,
            mode: ParamMode::InOut
        })
        .is_assignable());
        assert!(!sym(SymbolKind::Iterator).is_assignable());
    }

    #[test]
    fn test_value_types() {
        assert_eq!(sym(SymbolKind::Iterator).value_type(), Some(Type::Int));
        assert_eq!(sym(SymbolKind::Label).value_type(), None);
        assert!(sym(SymbolKind::Var {
            ty: Type::SysRefcursor,
            not_null: false
        })
        .is_ref_cursor());
    }
}
