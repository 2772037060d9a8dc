//! PL/CSQL translator
//!
//! This is the root workspace crate. It ties the passes of the member
//! crates into one pipeline and finds unit files for the command line
//! and the integration tests.

// Re-export main crates for convenience
pub use plcsql_ast as ast;
pub use plcsql_checker as checker;
pub use plcsql_codegen as codegen;
pub use plcsql_symbols as symbols;
pub use plcsql_types as types;

use std::fs;
use std::path::{Path, PathBuf};

use plcsql_ast::{Pos, Unit};
use plcsql_checker::{Decorations, SemanticError, SqlSemanticsOracle};
use plcsql_codegen::{CodegenError, CodegenOptions, GeneratedUnit};
use plcsql_symbols::{OperatorTable, Resolution, SymbolError};
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of the JSON files holding one unit each.
pub const UNIT_FILE_EXTENSION: &str = "json";

/// A failure of one of the translation passes.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl TranslateError {
    pub fn pos(&self) -> Pos {
        match self {
            TranslateError::Symbol(e) => e.pos(),
            TranslateError::Semantic(e) => e.pos(),
            TranslateError::Codegen(e) => e.pos(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TranslateError::Symbol(e) => e.code(),
            TranslateError::Semantic(e) => e.code(),
            TranslateError::Codegen(e) => e.code(),
        }
    }
}

/// Everything the passes learned about a unit, with its Java class.
#[derive(Debug)]
pub struct Translation {
    pub unit: Unit,
    pub resolution: Resolution,
    pub decorations: Decorations,
    pub java: GeneratedUnit,
}

/// Resolve, check and generate a unit. The first error of any pass aborts
/// the translation.
pub fn translate(
    mut unit: Unit,
    oracle: &dyn SqlSemanticsOracle,
    options: &CodegenOptions,
) -> Result<Translation, TranslateError> {
    unit.assign_ids();
    tracing::debug!(routine = %unit.routine.name, nodes = unit.node_count(), "translating");

    let resolution = plcsql_symbols::resolve(&unit)?;
    let decorations = plcsql_checker::check(&unit, &resolution, OperatorTable::shared(), oracle)?;
    let java = plcsql_codegen::generate(&unit, &resolution, &decorations, options)?;

    Ok(Translation {
        unit,
        resolution,
        decorations,
        java,
    })
}

/// A unit file that could not be read.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{}:{}: invalid unit: {source}", path.display(), source.line(), source.column())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot list {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Read a unit from its JSON file and number its nodes.
pub fn load_unit(path: &Path) -> Result<Unit, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Unit::from_json(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Expand the inputs into unit files. Files are taken as given;
/// directories are walked for `*.json` files, in sorted order.
pub fn collect_unit_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.map_err(|source| LoadError::Walk {
                path: input.clone(),
                source,
            })?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == UNIT_FILE_EXTENSION)
            {
                files.push(path.to_path_buf());
            }
        }
    }
    Ok(files)
}
