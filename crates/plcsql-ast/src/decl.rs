//! Declarations: routines, parameters and declare-section items

use crate::{Body, Expr, NodeId, Pos, SqlType, StaticSql, TypeSpec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    Procedure,
    Function,
}

impl RoutineKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            RoutineKind::Procedure => "PROCEDURE",
            RoutineKind::Function => "FUNCTION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamMode {
    #[default]
    In,
    Out,
    InOut,
}

impl ParamMode {
    /// OUT and IN OUT parameters are passed as one-element arrays.
    pub fn is_out(&self) -> bool {
        !matches!(self, ParamMode::In)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ParamMode::In => "IN",
            ParamMode::Out => "OUT",
            ParamMode::InOut => "IN OUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub name: String,
    #[serde(default)]
    pub mode: ParamMode,
    pub type_spec: TypeSpec,
}

/// A procedure or function, either the compiled unit itself or a local one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub kind: RoutineKind,
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub ret_type: Option<TypeSpec>,
    #[serde(default)]
    pub decls: Vec<Decl>,
    pub body: Body,
}

impl Routine {
    pub fn is_procedure(&self) -> bool {
        self.kind == RoutineKind::Procedure
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    #[serde(default)]
    pub id: NodeId,
    #[serde(default)]
    pub pos: Pos,
    pub kind: DeclKind,
}

impl Decl {
    pub fn new(kind: DeclKind, pos: Pos) -> Self {
        Self {
            id: NodeId::default(),
            pos,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            DeclKind::Var { name, .. }
            | DeclKind::Const { name, .. }
            | DeclKind::Cursor { name, .. }
            | DeclKind::Exception { name } => name,
            DeclKind::Procedure(r) | DeclKind::Function(r) => &r.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Var {
        name: String,
        type_spec: TypeSpec,
        #[serde(default)]
        not_null: bool,
        #[serde(default)]
        init: Option<Expr>,
    },
    Const {
        name: String,
        type_spec: TypeSpec,
        #[serde(default)]
        not_null: bool,
        value: Expr,
    },
    Cursor {
        name: String,
        #[serde(default)]
        params: Vec<Param>,
        sql: StaticSql,
    },
    Exception {
        name: String,
    },
    Procedure(Box<Routine>),
    Function(Box<Routine>),
}

/// Signature of a stored procedure or function living in the database,
/// callable from the unit through JDBC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRoutine {
    pub kind: RoutineKind,
    pub name: String,
    #[serde(default)]
    pub params: Vec<ExternalParam>,
    #[serde(default)]
    pub ret_type: Option<SqlType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalParam {
    pub name: String,
    #[serde(default)]
    pub mode: ParamMode,
    #[serde(rename = "type")]
    pub ty: SqlType,
}
