//! Source location tracking

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line/column position in the PL/CSQL source, both 1-based.
///
/// Nodes synthesized by the front end carry [`Pos::IGNORED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub const IGNORED: Pos = Pos { line: 0, column: 0 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_ignored(&self) -> bool {
        self.line == 0 || self.column == 0
    }
}

impl Default for Pos {
    fn default() -> Self {
        Self::IGNORED
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Dense index of a node, used as the key of every side table.
///
/// Ids are absent in JSON input and filled in by [`crate::Unit::assign_ids`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
