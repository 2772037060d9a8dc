//! End-to-end tests of the translation pipeline
//!
//! These tests take JSON units from tests/fixtures through resolution,
//! type checking and Java generation.

mod common;

use common::assertions::{assert_has_line, assert_mentions, assert_well_bracketed};
use common::fixtures::{load_failing_unit, load_options, load_oracle, load_unit};

use plcsql::ast::{ExprKind, Pos, StmtKind};
use plcsql::checker::{RejectingOracle, SemanticError};
use plcsql::codegen::{CodeToResolve, CodegenOptions, Output, Template};
use plcsql::types::{Coercion, Type};
use plcsql::{translate, TranslateError};

#[test]
fn e2e_scenario_a_identity_coercions() {
    let unit = load_unit("scenario_a");
    let t = translate(unit, &RejectingOracle, &CodegenOptions::default()).expect("translates");

    let StmtKind::Assign { value, .. } = &t.unit.routine.body.stmts[0].kind else {
        panic!("not an assignment");
    };
    let ExprKind::Binary { left, right, .. } = &value.kind else {
        panic!("not a binary expression");
    };
    for e in [value, left.as_ref(), right.as_ref()] {
        assert_eq!(t.decorations.coercion(e.id), Some(&Coercion::Identity(Type::Int)));
    }

    let java = &t.java;
    assert_eq!(java.class_name, "Proc_scenario_a");
    let assignments = java
        .lines
        .iter()
        .filter(|l| l.trim() == "scenario_a_2.x[0] =")
        .count();
    assert_eq!(assignments, 1);
    assert_has_line(java, "opAdd(");
    assert_has_line(java, "Integer.valueOf(1),");
    assert_has_line(java, "Integer.valueOf(2)");
    assert_has_line(java, "// no SQL");
}

#[test]
fn e2e_scenario_b_no_operator_matches() {
    let unit = load_failing_unit("scenario_b");
    let err = translate(unit, &RejectingOracle, &CodegenOptions::default()).unwrap_err();

    assert_eq!(err.code(), "E-TYPE-006");
    // the `+` expression, not the second statement's error
    assert_eq!(err.pos(), Pos::new(4, 8));
    match err {
        TranslateError::Semantic(SemanticError::BinaryOperandsMismatch { left, right, .. }) => {
            assert_eq!(left, "INT");
            assert!(right.starts_with("CHAR"), "{}", right);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn e2e_scenario_c_case_branches_join_to_a_string_type() {
    let unit = load_unit("scenario_c");
    let t = translate(unit, &RejectingOracle, &CodegenOptions::default()).expect("translates");

    let StmtKind::Return(Some(case)) = &t.unit.routine.body.stmts[0].kind else {
        panic!("not a return");
    };
    let ExprKind::Case { else_expr: Some(else_expr), .. } = &case.kind else {
        panic!("not a simple case");
    };
    let ty = t.decorations.type_of(case.id).expect("case is typed");
    assert_eq!(ty, Type::StringAny);
    assert_eq!(
        t.decorations.coercion(else_expr.id),
        Some(&Coercion::Cast {
            src: Type::Null,
            dst: ty
        })
    );

    assert_eq!(t.java.class_name, "Func_scenario_c");
    assert_mentions(&t.java, "invoke(");
}

#[test]
fn e2e_scenario_d_literal_out_argument() {
    let unit = load_failing_unit("scenario_d");
    let err = translate(unit, &RejectingOracle, &CodegenOptions::default()).unwrap_err();

    assert_eq!(err.code(), "E-TYPE-015");
    assert_eq!(err.pos(), Pos::new(7, 5));
}

#[test]
fn e2e_scenario_e_trailing_text_goes_to_the_last_line() {
    let nested = Template::new("Nested", Pos::IGNORED)
        .lines(&["first", "second", "third"])
        .finish()
        .unwrap();
    let code = Template::new("Outer", Pos::IGNORED)
        .big(0, "ARGS", ",")
        .fill("ARGS", nested)
        .finish()
        .unwrap();

    let mut out = Output::new();
    code.resolve(0, &mut out);
    assert_eq!(out.lines(), ["first", "second", "third,"]);

    let single = CodeToResolve::text(Pos::IGNORED, "only");
    let code = Template::new("Outer", Pos::IGNORED)
        .big(0, "ARGS", ",")
        .fill("ARGS", single)
        .finish()
        .unwrap();
    let mut out = Output::new();
    code.resolve(0, &mut out);
    assert_eq!(out.lines(), ["only,"]);
}

#[test]
fn e2e_sql_loop_with_builtin_and_dbms_output() {
    let unit = load_unit("sum_rows");
    let t = translate(unit, &load_oracle(), &CodegenOptions::default()).expect("translates");
    let java = &t.java;

    assert!(t.decorations.uses_connection());
    assert_mentions(java, "Connection conn = DriverManager.getConnection(");
    assert_mentions(java, "\"SELECT a, b FROM t\"");
    assert_mentions(java, ".executeQuery();");
    assert_mentions(java, ".getObject(1)");
    assert_mentions(java, "invokeBuiltinFunc(conn, \"UPPER\"");
    assert_has_line(java, "DBMS_OUTPUT$PUT_LINE(o0);");
    assert_has_line(java, "import java.sql.*;");
}

#[test]
fn e2e_sql_needs_its_semantics() {
    let unit = load_unit("sum_rows");
    let err = translate(unit, &RejectingOracle, &CodegenOptions::default()).unwrap_err();
    assert_eq!(err.code(), "E-TYPE-031");
    assert_eq!(err.pos(), Pos::new(4, 13));
}

#[test]
fn e2e_markers_map_back_to_source_positions() {
    let unit = load_unit("sum_rows");
    let t = translate(unit, &load_oracle(), &CodegenOptions::default()).expect("translates");
    let java = &t.java;

    let ranges = assert_well_bracketed(&java.markers, java.lines.len());
    assert_eq!(ranges.last().map(|r| (r.line, r.column)), Some((1, 1)));
    for (line, column) in [(4, 3), (5, 5), (7, 3), (8, 3)] {
        assert!(
            ranges.iter().any(|r| r.line == line && r.column == column),
            "no range for {}:{} in {}",
            line,
            column,
            java.markers
        );
    }
    let loop_range = ranges
        .iter()
        .find(|r| (r.line, r.column) == (4, 3))
        .copied()
        .unwrap();
    let body_range = ranges
        .iter()
        .find(|r| (r.line, r.column) == (5, 5))
        .copied()
        .unwrap();
    assert!(loop_range.start <= body_range.start && body_range.end <= loop_range.end);
}

#[test]
fn e2e_options_from_config() {
    let options = load_options();
    let t = translate(load_unit("scenario_a"), &RejectingOracle, &options).expect("translates");
    assert_eq!(t.java.class_name, "SpProc_scenario_a");
    assert_has_line(&t.java, "public class SpProc_scenario_a {");
    assert!(!t.java.lines.iter().any(|l| l.trim().starts_with("// no ")));
}

#[test]
fn e2e_translation_is_deterministic() {
    let first = translate(load_unit("sum_rows"), &load_oracle(), &CodegenOptions::default())
        .expect("translates");
    let second = translate(load_unit("sum_rows"), &load_oracle(), &CodegenOptions::default())
        .expect("translates");
    assert_eq!(first.java, second.java);
    assert_eq!(first.unit, second.unit);
}
