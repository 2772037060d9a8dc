//! PL/CSQL AST - node types for one compilation unit
//!
//! The tree is produced by an external front end and arrives as JSON.
//! After [`Unit::assign_ids`] it is never mutated; later passes record
//! their findings in side tables keyed by [`NodeId`].

mod pos;
mod types;
mod expr;
mod stmt;
mod decl;
mod ids;
pub mod printer;

pub use pos::*;
pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;

use serde::{Deserialize, Serialize};

/// One stored procedure or function submitted for translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub routine: Routine,
    #[serde(default)]
    pub autonomous_transaction: bool,
    /// Global procedures and functions the routine may call
    #[serde(default)]
    pub external_routines: Vec<ExternalRoutine>,
    /// Number of ids handed out by `assign_ids`; zero before that
    #[serde(skip)]
    node_count: u32,
}

impl Unit {
    pub fn new(routine: Routine) -> Self {
        Self {
            routine,
            autonomous_transaction: false,
            external_routines: Vec::new(),
            node_count: 0,
        }
    }

    /// Parse a unit from its JSON form and number its nodes.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut unit: Unit = serde_json::from_str(text)?;
        unit.assign_ids();
        Ok(unit)
    }

    /// Number every node in pre-order, starting at 1. Calling this again
    /// is a no-op.
    pub fn assign_ids(&mut self) {
        if self.node_count > 0 {
            return;
        }
        let mut counter = ids::IdCounter::default();
        counter.routine(&mut self.routine);
        self.node_count = counter.count();
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    /// Name of the generated Java class, e.g. `Proc_my_proc`.
    pub fn class_name(&self) -> String {
        let prefix = match self.routine.kind {
            RoutineKind::Procedure => "Proc",
            RoutineKind::Function => "Func",
        };
        format!("{}_{}", prefix, self.routine.name.to_ascii_lowercase())
    }
}
