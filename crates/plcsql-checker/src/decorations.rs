//! Side table of type checking results

use plcsql_ast::NodeId;
use plcsql_types::{Coercion, Type};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Suffix that selects a specialized version of a runtime operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpExtension {
    /// All compared operands are CHAR(n): comparison ignores trailing blanks
    Char,
    /// The matched version takes TIMESTAMP operands
    Timestamp,
}

impl OpExtension {
    pub fn suffix(&self) -> &'static str {
        match self {
            OpExtension::Char => "Char",
            OpExtension::Timestamp => "Timestamp",
        }
    }
}

/// A select-list column of an embedded query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub ty: Type,
}

/// What the checker decided about a unit, keyed by node id.
///
/// Expression ids key types, coercions, op-extensions and result types.
/// INTO targets are identifiers; their coercions are keyed by the
/// identifier id. Case arms key their comparison op-extension.
#[derive(Debug, Default, Serialize)]
pub struct Decorations {
    types: HashMap<NodeId, Type>,
    coercions: HashMap<NodeId, Coercion>,
    op_exts: HashMap<NodeId, OpExtension>,
    selector_types: HashMap<NodeId, Type>,
    columns: HashMap<NodeId, Vec<Column>>,
    field_columns: HashMap<NodeId, usize>,
    imports: BTreeSet<String>,
    uses_connection: bool,
}

impl Decorations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type of an expression
    pub fn type_of(&self, expr: NodeId) -> Option<Type> {
        self.types.get(&expr).copied()
    }

    /// Coercion applied to an expression or INTO target
    pub fn coercion(&self, node: NodeId) -> Option<&Coercion> {
        self.coercions.get(&node)
    }

    pub fn op_extension(&self, node: NodeId) -> Option<OpExtension> {
        self.op_exts.get(&node).copied()
    }

    /// Type the selector of a simple CASE is compared at
    pub fn selector_type(&self, case: NodeId) -> Option<Type> {
        self.selector_types.get(&case).copied()
    }

    /// Select list of a static SQL statement that is a query
    pub fn columns(&self, sql: NodeId) -> Option<&[Column]> {
        self.columns.get(&sql).map(Vec::as_slice)
    }

    /// 1-based column index a record field reads
    pub fn field_column(&self, field: NodeId) -> Option<usize> {
        self.field_columns.get(&field).copied()
    }

    /// Fully qualified Java classes the generated code mentions
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    /// Whether the generated code needs a database connection
    pub fn uses_connection(&self) -> bool {
        self.uses_connection
    }

    // === Recording, used by the checker ===

    pub(crate) fn set_type(&mut self, expr: NodeId, ty: Type) {
        self.add_import(ty);
        self.types.insert(expr, ty);
    }

    pub(crate) fn set_coercion(&mut self, node: NodeId, c: Coercion) {
        self.add_import(c.src());
        self.add_import(c.dst());
        self.coercions.insert(node, c);
    }

    pub(crate) fn set_op_extension(&mut self, node: NodeId, ext: OpExtension) {
        self.op_exts.insert(node, ext);
    }

    pub(crate) fn set_selector_type(&mut self, case: NodeId, ty: Type) {
        self.add_import(ty);
        self.selector_types.insert(case, ty);
    }

    pub(crate) fn set_columns(&mut self, sql: NodeId, columns: Vec<Column>) {
        for c in &columns {
            self.add_import(c.ty);
        }
        self.columns.insert(sql, columns);
    }

    pub(crate) fn set_field_column(&mut self, field: NodeId, index: usize) {
        self.field_columns.insert(field, index);
    }

    pub(crate) fn add_import(&mut self, ty: Type) {
        if let Some(import) = ty.java_import() {
            self.imports.insert(import.to_string());
        }
    }

    pub(crate) fn require_connection(&mut self) {
        self.uses_connection = true;
    }
}
