//! plcsql-codegen - Java code generation
//!
//! Turns a resolved and type checked PL/CSQL unit into the source of one
//! Java class. Code is built as a tree of [`template::Template`]s which is
//! then resolved into indented lines, recording for every positioned node
//! the range of generated lines it produced.

pub mod template;
mod expr;
mod stmt;
mod writer;

pub use template::{CodeToResolve, Output, Substitute, Template, TemplateError, TemplateList};

use plcsql_ast::{Pos, Unit};
use plcsql_checker::Decorations;
use plcsql_symbols::Resolution;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("no {what} recorded for the node at {pos}")]
    MissingDecoration { what: &'static str, pos: Pos },

    #[error("hole '{hole}' is left unfilled in line {line} of the generated code")]
    UnresolvedHole { hole: String, line: usize },
}

impl CodegenError {
    pub fn pos(&self) -> Pos {
        match self {
            CodegenError::Template(e) => e.pos(),
            CodegenError::MissingDecoration { pos, .. } => *pos,
            CodegenError::UnresolvedHole { .. } => Pos::IGNORED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CodegenError::Template(_) => "E-CODEGEN-001",
            CodegenError::MissingDecoration { .. } => "E-CODEGEN-002",
            CodegenError::UnresolvedHole { .. } => "E-CODEGEN-003",
        }
    }
}

/// Naming and layout choices of the generated class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    /// Prepended to the `Proc_<name>` / `Func_<name>` class name
    pub class_name_prefix: String,
    /// Write a `// no ...` line for an empty stage of the unit method
    pub stage_placeholders: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            class_name_prefix: String::new(),
            stage_placeholders: true,
        }
    }
}

/// The Java class generated for a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedUnit {
    pub class_name: String,
    pub lines: Vec<String>,
    /// Provenance markers: ` (start,line,column` on entry of a node and
    /// ` )end` on exit, with 1-based generated line numbers
    pub markers: String,
}

impl GeneratedUnit {
    /// The class source, one line per element of `lines`.
    pub fn source(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Generate the Java class of a unit.
pub fn generate(
    unit: &Unit,
    resolution: &Resolution,
    decorations: &Decorations,
    options: &CodegenOptions,
) -> Result<GeneratedUnit, CodegenError> {
    writer::JavaWriter::new(unit, resolution, decorations, options).generate()
}
