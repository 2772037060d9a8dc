use std::fs;
use std::path::{Path, PathBuf};

use plcsql::ast::Unit;
use plcsql::checker::StaticOracle;
use plcsql::codegen::CodegenOptions;

/// Get path to a file under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a test fixture from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Load a unit that is expected to translate, from tests/fixtures/units/
pub fn load_unit(name: &str) -> Unit {
    let path = fixture_path("units").join(format!("{}.json", name));
    plcsql::load_unit(&path).unwrap_or_else(|e| panic!("{}", e))
}

/// Load a unit that is expected to be rejected, from tests/fixtures/failing/
pub fn load_failing_unit(name: &str) -> Unit {
    let path = fixture_path("failing").join(format!("{}.json", name));
    plcsql::load_unit(&path).unwrap_or_else(|e| panic!("{}", e))
}

pub fn load_oracle() -> StaticOracle {
    StaticOracle::from_json(&load_fixture("oracle.json")).expect("oracle fixture is valid")
}

pub fn load_options() -> CodegenOptions {
    serde_json::from_str(&load_fixture("config.json")).expect("config fixture is valid")
}
