//! Side table produced by name resolution

use crate::{Symbol, SymbolId, SymbolKind};
use plcsql_ast::NodeId;
use std::collections::HashMap;

/// Everything name resolution learned about a unit, keyed by node id.
#[derive(Debug, Default)]
pub struct Resolution {
    /// All symbols indexed by numeric ID
    symbols: Vec<Symbol>,

    /// Referencing identifier to the symbol it names
    refs: HashMap<NodeId, SymbolId>,

    /// Declaration or parameter node to the symbol it introduces
    decls: HashMap<NodeId, SymbolId>,

    /// Call names and bare identifiers that denote built-in SQL functions,
    /// with the uppercase function name
    builtins: HashMap<NodeId, String>,

    /// Scope level of each statement; scope-opening statements record the
    /// level of the scope they open
    levels: HashMap<NodeId, u32>,

    /// Declaration block names of routines and blocks
    blocks: HashMap<NodeId, String>,

    /// Level of the exception handler a bare RAISE re-throws from
    handler_levels: HashMap<NodeId, u32>,

    unit_routine: Option<SymbolId>,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol named by a referencing identifier
    pub fn referenced(&self, ident: NodeId) -> Option<&Symbol> {
        self.refs.get(&ident).and_then(|id| self.get(*id))
    }

    /// Identifiers that refer to `symbol`
    pub fn references_to(&self, symbol: SymbolId) -> impl Iterator<Item = NodeId> + '_ {
        self.refs
            .iter()
            .filter(move |(_, s)| **s == symbol)
            .map(|(n, _)| *n)
    }

    /// Symbol introduced by a declaration or parameter node
    pub fn declared(&self, decl: NodeId) -> Option<&Symbol> {
        self.decls.get(&decl).and_then(|id| self.get(*id))
    }

    pub fn builtin(&self, ident: NodeId) -> Option<&str> {
        self.builtins.get(&ident).map(String::as_str)
    }

    pub fn level(&self, stmt: NodeId) -> Option<u32> {
        self.levels.get(&stmt).copied()
    }

    pub fn block_name(&self, node: NodeId) -> Option<&str> {
        self.blocks.get(&node).map(String::as_str)
    }

    pub fn handler_level(&self, raise: NodeId) -> Option<u32> {
        self.handler_levels.get(&raise).copied()
    }

    /// The symbol of the compiled routine itself
    pub fn unit_routine(&self) -> Option<&Symbol> {
        self.unit_routine.and_then(|id| self.get(id))
    }

    // === Mutation, used by the resolver ===

    pub(crate) fn add(&mut self, mut symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        symbol.id = id;
        if let Some(decl) = symbol.decl {
            self.decls.insert(decl, id);
        }
        self.symbols.push(symbol);
        id
    }

    pub(crate) fn kind_mut(&mut self, id: SymbolId) -> Option<&mut SymbolKind> {
        self.symbols.get_mut(id.0 as usize).map(|s| &mut s.kind)
    }

    pub(crate) fn bind(&mut self, ident: NodeId, symbol: SymbolId) {
        self.refs.insert(ident, symbol);
    }

    pub(crate) fn bind_builtin(&mut self, ident: NodeId, name: String) {
        self.builtins.insert(ident, name);
    }

    pub(crate) fn set_level(&mut self, stmt: NodeId, level: u32) {
        self.levels.insert(stmt, level);
    }

    pub(crate) fn set_block_name(&mut self, node: NodeId, name: String) {
        self.blocks.insert(node, name);
    }

    pub(crate) fn set_handler_level(&mut self, raise: NodeId, level: u32) {
        self.handler_levels.insert(raise, level);
    }

    pub(crate) fn set_unit_routine(&mut self, id: SymbolId) {
        self.unit_routine = Some(id);
    }
}
