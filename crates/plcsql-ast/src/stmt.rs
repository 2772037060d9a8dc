//! Statement nodes

use crate::{Decl, Expr, Ident, NodeId, Pos};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: Pos) -> Self {
        Self {
            id: NodeId::default(),
            pos,
            kind,
        }
    }
}

/// A statement list followed by optional exception handlers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub stmts: Vec<Stmt>,
    #[serde(default)]
    pub handlers: Vec<ExHandler>,
}

/// `WHEN e1 OR e2 THEN ...`; the name `OTHERS` catches everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExHandler {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub names: Vec<Ident>,
    pub stmts: Vec<Stmt>,
}

/// An embedded SQL statement. Host expressions have already been replaced
/// by `?` in `text` and are listed in order of appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticSql {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub text: String,
    #[serde(default)]
    pub host_exprs: Vec<Expr>,
    #[serde(default)]
    pub into: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondStmtArm {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub cond: Expr,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStmtArm {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub value: Expr,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Null,
    Assign {
        target: Ident,
        value: Expr,
    },
    /// Procedure call
    Call {
        name: Ident,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Return(Option<Expr>),
    If {
        arms: Vec<CondStmtArm>,
        #[serde(default)]
        else_stmts: Option<Vec<Stmt>>,
    },
    /// Simple CASE statement
    Case {
        selector: Expr,
        arms: Vec<CaseStmtArm>,
        #[serde(default)]
        else_stmts: Option<Vec<Stmt>>,
    },
    /// Searched CASE statement; raises CASE_NOT_FOUND without ELSE
    SearchedCase {
        arms: Vec<CondStmtArm>,
        #[serde(default)]
        else_stmts: Option<Vec<Stmt>>,
    },
    Loop {
        #[serde(default)]
        label: Option<String>,
        stmts: Vec<Stmt>,
    },
    While {
        #[serde(default)]
        label: Option<String>,
        cond: Expr,
        stmts: Vec<Stmt>,
    },
    ForIter {
        #[serde(default)]
        label: Option<String>,
        iter: Ident,
        #[serde(default)]
        reverse: bool,
        lower: Expr,
        upper: Expr,
        #[serde(default)]
        step: Option<Expr>,
        stmts: Vec<Stmt>,
    },
    ForCursor {
        #[serde(default)]
        label: Option<String>,
        record: Ident,
        cursor: Ident,
        #[serde(default)]
        args: Vec<Expr>,
        stmts: Vec<Stmt>,
    },
    ForStaticSql {
        #[serde(default)]
        label: Option<String>,
        record: Ident,
        sql: StaticSql,
        stmts: Vec<Stmt>,
    },
    ForDynamicSql {
        #[serde(default)]
        label: Option<String>,
        record: Ident,
        sql: Expr,
        #[serde(default)]
        using: Vec<Expr>,
        stmts: Vec<Stmt>,
    },
    Exit {
        #[serde(default)]
        label: Option<Ident>,
        #[serde(default)]
        when: Option<Expr>,
    },
    Continue {
        #[serde(default)]
        label: Option<Ident>,
        #[serde(default)]
        when: Option<Expr>,
    },
    Block {
        #[serde(default)]
        decls: Vec<Decl>,
        body: Body,
    },
    /// `RAISE name`, or a bare `RAISE` inside a handler
    Raise(Option<Ident>),
    RaiseAppErr {
        code: Expr,
        msg: Expr,
    },
    Commit,
    Rollback,
    OpenCursor {
        cursor: Ident,
        #[serde(default)]
        args: Vec<Expr>,
    },
    CloseCursor(Ident),
    Fetch {
        cursor: Ident,
        into: Vec<Ident>,
    },
    /// `OPEN refcursor FOR select ...`
    OpenFor {
        refcursor: Ident,
        sql: StaticSql,
    },
    /// `EXECUTE IMMEDIATE sql [INTO ...] [USING ...]`
    ExecImme {
        sql: Expr,
        #[serde(default)]
        into: Vec<Ident>,
        #[serde(default)]
        using: Vec<Expr>,
    },
    StaticSql(StaticSql),
}
