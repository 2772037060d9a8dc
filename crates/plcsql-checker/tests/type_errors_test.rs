//! Type errors reported by the checker, one unit per error code

use plcsql_ast::*;
use plcsql_checker::{
    check, db_type, ColumnInfo, Decorations, RejectingOracle, SemanticError, SqlSemanticsOracle,
    StaticOracle,
};
use plcsql_symbols::{resolve, OperatorTable, Resolution};

// === Unit builders ===

fn at(line: u32) -> Pos {
    Pos::new(line, 1)
}

fn e(kind: ExprKind) -> Expr {
    Expr::new(kind, at(5))
}

fn id(name: &str) -> Ident {
    Ident::new(name, at(5))
}

fn id_expr(name: &str) -> Expr {
    e(ExprKind::Id(id(name)))
}

fn int(n: u32) -> Expr {
    e(ExprKind::Uint(n.to_string()))
}

fn string(s: &str) -> Expr {
    e(ExprKind::Str(s.into()))
}

fn tru() -> Expr {
    e(ExprKind::True)
}

fn null() -> Expr {
    e(ExprKind::Null)
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    e(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn var(name: &str, ty: SqlType) -> Decl {
    Decl::new(
        DeclKind::Var {
            name: name.into(),
            type_spec: TypeSpec::Simple(ty),
            not_null: false,
            init: None,
        },
        at(2),
    )
}

fn var_init(name: &str, ty: SqlType, not_null: bool, init: Expr) -> Decl {
    Decl::new(
        DeclKind::Var {
            name: name.into(),
            type_spec: TypeSpec::Simple(ty),
            not_null,
            init: Some(init),
        },
        at(2),
    )
}

fn param(name: &str, mode: ParamMode, ty: SqlType) -> Param {
    Param {
        id: NodeId::default(),
        pos: at(1),
        name: name.into(),
        mode,
        type_spec: TypeSpec::Simple(ty),
    }
}

fn sql(text: &str, host_exprs: Vec<Expr>, into: &[&str]) -> StaticSql {
    StaticSql {
        id: NodeId::default(),
        pos: at(6),
        text: text.into(),
        host_exprs,
        into: into.iter().map(|n| id(n)).collect(),
    }
}

fn cursor(name: &str, params: Vec<Param>, text: &str) -> Decl {
    Decl::new(
        DeclKind::Cursor {
            name: name.into(),
            params,
            sql: sql(text, vec![], &[]),
        },
        at(2),
    )
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, at(4))
}

fn assign(target: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Assign {
        target: id(target),
        value,
    })
}

fn routine(kind: RoutineKind, name: &str, params: Vec<Param>, decls: Vec<Decl>, stmts: Vec<Stmt>) -> Routine {
    Routine {
        id: NodeId::default(),
        pos: at(1),
        kind,
        name: name.into(),
        params,
        ret_type: match kind {
            RoutineKind::Function => Some(TypeSpec::Simple(SqlType::Int)),
            RoutineKind::Procedure => None,
        },
        decls,
        body: Body {
            stmts,
            handlers: vec![],
        },
    }
}

fn proc_unit(decls: Vec<Decl>, stmts: Vec<Stmt>) -> Unit {
    let mut unit = Unit::new(routine(RoutineKind::Procedure, "t", vec![], decls, stmts));
    unit.assign_ids();
    unit
}

// === Helpers ===

fn check_with(unit: &Unit, oracle: &dyn SqlSemanticsOracle) -> Result<Decorations, SemanticError> {
    let resolution = resolve(unit).expect("unit resolves");
    check(unit, &resolution, OperatorTable::shared(), oracle)
}

fn check_unit_has_error(unit: Unit, code: &str) -> SemanticError {
    check_unit_has_error_with(unit, &RejectingOracle, code)
}

fn check_unit_has_error_with(unit: Unit, oracle: &dyn SqlSemanticsOracle, code: &str) -> SemanticError {
    match check_with(&unit, oracle) {
        Ok(_) => panic!("expected {} but the unit checked cleanly", code),
        Err(err) => {
            assert_eq!(err.code(), code, "unexpected error: {}", err);
            err
        }
    }
}

fn table_oracle() -> StaticOracle {
    StaticOracle::new()
        .with_statement(
            "select a, d from t",
            vec![
                ColumnInfo::new("a", db_type::INT),
                ColumnInfo::new("d", db_type::DATE),
            ],
        )
        .with_statement("select d from t", vec![ColumnInfo::new("d", db_type::DATE)])
        .with_statement("update t set a = ?", vec![])
}

// === Conditions and initializers ===

#[test]
fn test_if_condition_must_be_boolean() {
    let s = stmt(StmtKind::If {
        arms: vec![CondStmtArm {
            id: NodeId::default(),
            pos: at(4),
            cond: int(1),
            stmts: vec![stmt(StmtKind::Null)],
        }],
        else_stmts: None,
    });
    let err = check_unit_has_error(proc_unit(vec![], vec![s]), "E-TYPE-001");
    assert_eq!(err.pos(), at(5));
}

#[test]
fn test_while_condition_must_be_boolean() {
    let s = stmt(StmtKind::While {
        label: None,
        cond: string("x"),
        stmts: vec![stmt(StmtKind::Null)],
    });
    check_unit_has_error(proc_unit(vec![], vec![s]), "E-TYPE-002");
}

#[test]
fn test_not_null_variable_initialized_with_null() {
    let d = var_init("x", SqlType::Int, true, null());
    check_unit_has_error(proc_unit(vec![d], vec![]), "E-TYPE-003");
}

#[test]
fn test_initializer_type_mismatch() {
    let d = var_init("d", SqlType::Date, false, tru());
    let err = check_unit_has_error(proc_unit(vec![d], vec![]), "E-TYPE-004");
    assert!(err.to_string().contains("DATE"), "{}", err);
}

// === Operators ===

#[test]
fn test_between_not_comparable() {
    let b = e(ExprKind::Between {
        target: Box::new(int(1)),
        lower: Box::new(e(ExprKind::Date("2020-01-01".into()))),
        upper: Box::new(tru()),
    });
    let u = proc_unit(vec![var("b", SqlType::Boolean)], vec![assign("b", b)]);
    check_unit_has_error(u, "E-TYPE-005");
}

#[test]
fn test_binary_operands_mismatch() {
    let u = proc_unit(
        vec![var("x", SqlType::Int)],
        vec![assign("x", binary(BinaryOp::Add, tru(), int(1)))],
    );
    let err = check_unit_has_error(u, "E-TYPE-006");
    assert!(err.to_string().contains('+'), "{}", err);
}

#[test]
fn test_unary_operand_mismatch() {
    let neg = e(ExprKind::Unary {
        op: UnaryOp::Neg,
        operand: Box::new(tru()),
    });
    let u = proc_unit(vec![var("x", SqlType::Int)], vec![assign("x", neg)]);
    check_unit_has_error(u, "E-TYPE-007");
}

#[test]
fn test_in_not_comparable() {
    let in_list = e(ExprKind::In {
        target: Box::new(int(1)),
        elements: vec![tru()],
    });
    let u = proc_unit(vec![var("b", SqlType::Boolean)], vec![assign("b", in_list)]);
    check_unit_has_error(u, "E-TYPE-008");
}

#[test]
fn test_like_operands_must_be_strings() {
    let like = |target: Expr, pattern: Expr| {
        e(ExprKind::Like {
            target: Box::new(target),
            pattern: Box::new(pattern),
            escape: None,
        })
    };
    let u = proc_unit(
        vec![var("b", SqlType::Boolean)],
        vec![assign("b", like(tru(), string("a%")))],
    );
    check_unit_has_error(u, "E-TYPE-009");

    let u = proc_unit(
        vec![var("b", SqlType::Boolean)],
        vec![assign("b", like(string("abc"), tru()))],
    );
    check_unit_has_error(u, "E-TYPE-010");
}

// === CASE ===

#[test]
fn test_case_values_not_comparable() {
    let case = e(ExprKind::Case {
        selector: Box::new(int(1)),
        arms: vec![CaseArm {
            id: NodeId::default(),
            pos: at(5),
            value: tru(),
            result: int(2),
        }],
        else_expr: None,
    });
    let u = proc_unit(vec![var("x", SqlType::Int)], vec![assign("x", case)]);
    check_unit_has_error(u, "E-TYPE-011");
}

fn cond_arm(result: Expr) -> CondArm {
    CondArm {
        id: NodeId::default(),
        pos: at(5),
        cond: tru(),
        result,
    }
}

#[test]
fn test_branch_types_must_join() {
    let cond = e(ExprKind::Cond {
        arms: vec![
            cond_arm(int(1)),
            cond_arm(e(ExprKind::Date("2020-01-01".into()))),
        ],
        else_expr: None,
    });
    let u = proc_unit(vec![var("x", SqlType::Int)], vec![assign("x", cond)]);
    check_unit_has_error(u, "E-TYPE-012");

    let cond = e(ExprKind::Cond {
        arms: vec![cond_arm(int(1))],
        else_expr: Some(Box::new(tru())),
    });
    let u = proc_unit(vec![var("x", SqlType::Int)], vec![assign("x", cond)]);
    check_unit_has_error(u, "E-TYPE-013");
}

// === Calls ===

fn local_proc(params: Vec<Param>) -> Decl {
    let r = routine(RoutineKind::Procedure, "q", params, vec![], vec![stmt(StmtKind::Null)]);
    Decl::new(DeclKind::Procedure(Box::new(r)), at(2))
}

fn call_q(args: Vec<Expr>) -> Stmt {
    stmt(StmtKind::Call {
        name: id("q"),
        args,
    })
}

#[test]
fn test_argument_mismatch() {
    let u = proc_unit(
        vec![local_proc(vec![param("a", ParamMode::In, SqlType::Int)])],
        vec![call_q(vec![tru()])],
    );
    let err = check_unit_has_error(u, "E-TYPE-014");
    assert!(matches!(err, SemanticError::ArgumentMismatch { index: 1, .. }));
}

#[test]
fn test_out_argument_needs_reversible_coercion() {
    // INT converts to TIME but TIME does not convert back
    let u = proc_unit(
        vec![
            var("x", SqlType::Int),
            local_proc(vec![param("a", ParamMode::Out, SqlType::Time)]),
        ],
        vec![call_q(vec![id_expr("x")])],
    );
    check_unit_has_error(u, "E-TYPE-015");

    let u = proc_unit(
        vec![
            var("x", SqlType::Int),
            local_proc(vec![param("a", ParamMode::InOut, SqlType::Bigint)]),
        ],
        vec![call_q(vec![id_expr("x")])],
    );
    assert!(check_with(&u, &RejectingOracle).is_ok());
}

// === Assignment and return ===

#[test]
fn test_assign_mismatch() {
    let u = proc_unit(
        vec![var("d", SqlType::Date)],
        vec![assign("d", tru())],
    );
    check_unit_has_error(u, "E-TYPE-016");
}

#[test]
fn test_not_null_assigned_null() {
    let u = proc_unit(
        vec![var_init("x", SqlType::Int, true, int(1))],
        vec![assign("x", null())],
    );
    check_unit_has_error(u, "E-TYPE-017");
}

#[test]
fn test_return_mismatch() {
    let mut unit = Unit::new(routine(
        RoutineKind::Function,
        "f",
        vec![],
        vec![],
        vec![stmt(StmtKind::Return(Some(tru())))],
    ));
    unit.assign_ids();
    check_unit_has_error(unit, "E-TYPE-018");
}

#[test]
fn test_raise_application_error_arguments() {
    let raise = |code: Expr, msg: Expr| stmt(StmtKind::RaiseAppErr { code, msg });
    check_unit_has_error(
        proc_unit(vec![], vec![raise(string("x"), string("y"))]),
        "E-TYPE-019",
    );
    check_unit_has_error(
        proc_unit(vec![], vec![raise(int(1), int(2))]),
        "E-TYPE-020",
    );
}

// === Cursors and dynamic SQL ===

#[test]
fn test_cursor_argument_mismatch() {
    let c = cursor("c", vec![param("a", ParamMode::In, SqlType::Int)], "select d from t");
    let open = stmt(StmtKind::OpenCursor {
        cursor: id("c"),
        args: vec![tru()],
    });
    check_unit_has_error_with(proc_unit(vec![c], vec![open]), &table_oracle(), "E-TYPE-021");
}

#[test]
fn test_dynamic_sql_must_be_string() {
    let exec = stmt(StmtKind::ExecImme {
        sql: int(1),
        into: vec![],
        using: vec![],
    });
    check_unit_has_error(proc_unit(vec![], vec![exec]), "E-TYPE-022");
}

#[test]
fn test_for_loop_bounds_must_be_integers() {
    let for_iter = |lower: Expr, upper: Expr, step: Option<Expr>| {
        stmt(StmtKind::ForIter {
            label: None,
            iter: id("i"),
            reverse: false,
            lower,
            upper,
            step,
            stmts: vec![stmt(StmtKind::Null)],
        })
    };
    check_unit_has_error(proc_unit(vec![], vec![for_iter(tru(), int(3), None)]), "E-TYPE-023");
    check_unit_has_error(proc_unit(vec![], vec![for_iter(int(1), tru(), None)]), "E-TYPE-024");
    check_unit_has_error(
        proc_unit(vec![], vec![for_iter(int(1), int(3), Some(tru()))]),
        "E-TYPE-025",
    );
}

// === Built-in functions ===

fn upper_of(arg: Expr) -> Expr {
    e(ExprKind::Call {
        name: id("UPPER"),
        args: vec![arg],
    })
}

#[test]
fn test_builtin_argument_without_typical_value() {
    let oracle = StaticOracle::new().with_function("UPPER", db_type::STRING);
    let u = proc_unit(vec![var("s", SqlType::String)], vec![assign("s", upper_of(tru()))]);
    check_unit_has_error_with(u, &oracle, "E-TYPE-026");
}

#[test]
fn test_builtin_unknown_to_server() {
    let u = proc_unit(vec![var("s", SqlType::String)], vec![assign("s", upper_of(string("a")))]);
    check_unit_has_error(u, "E-TYPE-027");
}

#[test]
fn test_builtin_return_type_unsupported() {
    let oracle = StaticOracle::new().with_function("UPPER", db_type::SET);
    let u = proc_unit(vec![var("s", SqlType::String)], vec![assign("s", upper_of(string("a")))]);
    let err = check_unit_has_error_with(u, &oracle, "E-TYPE-028");
    assert!(matches!(err, SemanticError::BuiltinReturnTypeUnsupported { code: 6, .. }));
}

// === Static SQL ===

#[test]
fn test_host_expression_not_bindable() {
    let s = stmt(StmtKind::StaticSql(sql("update t set a = ?", vec![tru()], &[])));
    check_unit_has_error_with(proc_unit(vec![], vec![s]), &table_oracle(), "E-TYPE-029");
}

#[test]
fn test_using_expression_not_bindable() {
    let exec = stmt(StmtKind::ExecImme {
        sql: string("update t set a = ?"),
        into: vec![],
        using: vec![tru()],
    });
    check_unit_has_error(proc_unit(vec![], vec![exec]), "E-TYPE-030");
}

#[test]
fn test_sql_rejected_by_server() {
    let oracle = StaticOracle::new().with_rejected("delete from nowhere", -493, "unknown class nowhere");
    let s = stmt(StmtKind::StaticSql(sql("DELETE FROM nowhere", vec![], &[])));
    let err = check_unit_has_error_with(proc_unit(vec![], vec![s]), &oracle, "E-TYPE-031");
    assert!(err.to_string().contains("unknown class nowhere"), "{}", err);
    assert_eq!(err.pos(), at(6));
}

#[test]
fn test_column_type_unsupported() {
    let oracle = StaticOracle::new()
        .with_statement("select b from t", vec![ColumnInfo::new("b", db_type::BLOB)]);
    let s = stmt(StmtKind::StaticSql(sql("select b from t", vec![], &["x"])));
    let u = proc_unit(vec![var("x", SqlType::String)], vec![s]);
    check_unit_has_error_with(u, &oracle, "E-TYPE-032");
}

#[test]
fn test_into_count_mismatch() {
    let s = stmt(StmtKind::StaticSql(sql("select a, d from t", vec![], &["x"])));
    let u = proc_unit(vec![var("x", SqlType::Int)], vec![s]);
    let err = check_unit_has_error_with(u, &table_oracle(), "E-TYPE-033");
    assert!(matches!(
        err,
        SemanticError::IntoCountMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));

    // A query without INTO is not a statement
    let s = stmt(StmtKind::StaticSql(sql("select d from t", vec![], &[])));
    check_unit_has_error_with(proc_unit(vec![], vec![s]), &table_oracle(), "E-TYPE-033");
}

#[test]
fn test_into_target_mismatch() {
    let s = stmt(StmtKind::StaticSql(sql("select d from t", vec![], &["x"])));
    let u = proc_unit(vec![var("x", SqlType::Int)], vec![s]);
    check_unit_has_error_with(u, &table_oracle(), "E-TYPE-034");
}

#[test]
fn test_dynamic_into_target_mismatch() {
    let exec = stmt(StmtKind::ExecImme {
        sql: string("select 1 from dual"),
        into: vec![id("b")],
        using: vec![],
    });
    let u = proc_unit(vec![var("b", SqlType::Boolean)], vec![exec]);
    check_unit_has_error(u, "E-TYPE-035");
}

#[test]
fn test_fetch_target_mismatch() {
    let fetch = stmt(StmtKind::Fetch {
        cursor: id("c"),
        into: vec![id("x")],
    });
    let u = proc_unit(
        vec![var("x", SqlType::Int), cursor("c", vec![], "select d from t")],
        vec![fetch],
    );
    let err = check_unit_has_error_with(u, &table_oracle(), "E-TYPE-036");
    assert!(matches!(err, SemanticError::FetchTargetMismatch { column: 1, .. }));
}

fn for_select(text: &str, field: &str) -> Stmt {
    let read = e(ExprKind::Field {
        record: id("r"),
        field: field.into(),
    });
    stmt(StmtKind::ForStaticSql {
        label: None,
        record: id("r"),
        sql: sql(text, vec![], &[]),
        stmts: vec![assign("x", read)],
    })
}

#[test]
fn test_record_field_lookup() {
    let oracle = table_oracle().with_statement(
        "select a, a from t",
        vec![
            ColumnInfo::new("a", db_type::INT),
            ColumnInfo::new("A", db_type::INT),
        ],
    );
    let u = proc_unit(vec![var("x", SqlType::Int)], vec![for_select("select a, d from t", "b")]);
    check_unit_has_error_with(u, &oracle, "E-TYPE-037");

    let u = proc_unit(vec![var("x", SqlType::Int)], vec![for_select("select a, a from t", "a")]);
    check_unit_has_error_with(u, &oracle, "E-TYPE-038");

    let u = proc_unit(vec![var("x", SqlType::Int)], vec![for_select("select a, d from t", "A")]);
    let deco = check_with(&u, &oracle).unwrap();
    assert!(deco.uses_connection());
}

#[test]
fn test_unresolved_identifier() {
    let u = proc_unit(vec![var("x", SqlType::Int)], vec![assign("x", int(1))]);
    let err = check(&u, &Resolution::new(), OperatorTable::shared(), &RejectingOracle).unwrap_err();
    assert_eq!(err.code(), "E-TYPE-039");
}
