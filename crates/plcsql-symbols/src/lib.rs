//! plcsql-symbols: name resolution and operator overloading
//!
//! This crate binds every identifier of a unit to its declaration and
//! knows the operators of the runtime library:
//! - Resolve names through predefined, routine, block and loop scopes
//! - Classify calls as local, external, DBMS_OUTPUT or built-in
//! - Record scope levels and declaration block names for code generation
//! - Pick operator versions through their coercion schemes
//!
//! # Example
//!
//! ```ignore
//! use plcsql_ast::Unit;
//! use plcsql_symbols::resolve;
//!
//! let unit = Unit::from_json(text)?;
//! let resolution = resolve(&unit)?;
//! assert!(resolution.unit_routine().is_some());
//! ```

mod error;
mod operators;
pub mod predefined;
mod resolution;
mod resolver;
mod symbol;

pub use error::SymbolError;
pub use operators::{OpSignature, OperatorTable, OverloadSet};
pub use resolution::Resolution;
pub use symbol::{
    ParamSig, RecordSource, RoutineOrigin, RoutineSig, Symbol, SymbolId, SymbolKind,
};

use plcsql_ast::Unit;

/// Resolve all names of a unit. The first error aborts resolution.
pub fn resolve(unit: &Unit) -> Result<Resolution, SymbolError> {
    resolver::Resolver::new().run(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plcsql_ast::*;

    fn at(line: u32) -> Pos {
        Pos::new(line, 1)
    }

    fn id(name: &str) -> Ident {
        Ident::new(name, at(1))
    }

    fn id_expr(name: &str) -> Expr {
        Expr::new(ExprKind::Id(id(name)), at(1))
    }

    fn int_var(name: &str) -> Decl {
        Decl::new(
            DeclKind::Var {
                name: name.into(),
                type_spec: TypeSpec::Simple(SqlType::Int),
                not_null: false,
                init: None,
            },
            at(2),
        )
    }

    fn routine(params: Vec<Param>, decls: Vec<Decl>, stmts: Vec<Stmt>) -> Routine {
        Routine {
            id: NodeId::default(),
            pos: at(1),
            kind: RoutineKind::Procedure,
            name: "P".into(),
            params,
            ret_type: None,
            decls,
            body: Body {
                stmts,
                handlers: vec![],
            },
        }
    }

    fn unit(params: Vec<Param>, decls: Vec<Decl>, stmts: Vec<Stmt>) -> Unit {
        let mut u = Unit::new(routine(params, decls, stmts));
        u.assign_ids();
        u
    }

    fn assign(target: &str, value: Expr) -> Stmt {
        Stmt::new(
            StmtKind::Assign {
                target: id(target),
                value,
            },
            at(3),
        )
    }

    fn param(name: &str, mode: ParamMode) -> Param {
        Param {
            id: NodeId::default(),
            pos: at(1),
            name: name.into(),
            mode,
            type_spec: TypeSpec::Simple(SqlType::Int),
        }
    }

    fn first_assign_target(u: &Unit) -> NodeId {
        match &u.routine.body.stmts[0].kind {
            StmtKind::Assign { target, .. } => target.id,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_variable_reference() {
        let u = unit(
            vec![],
            vec![int_var("x")],
            vec![assign("X", id_expr("x"))],
        );
        let r = resolve(&u).unwrap();
        let sym = r.referenced(first_assign_target(&u)).unwrap();
        assert_eq!(sym.name, "x");
        assert_eq!(sym.level, 2);
        assert_eq!(sym.block.as_deref(), Some("p_2"));
        assert_eq!(r.block_name(u.routine.id), Some("p_2"));
        assert_eq!(r.unit_routine().map(|s| s.level), Some(1));
    }

    #[test]
    fn test_undeclared() {
        let u = unit(vec![], vec![], vec![assign("x", Expr::new(ExprKind::Null, at(3)))]);
        let err = resolve(&u).unwrap_err();
        assert_eq!(err.code(), "E-SYMBOL-001");
        assert_eq!(err.pos(), at(1));
    }

    #[test]
    fn test_duplicate_declaration() {
        let u = unit(vec![], vec![int_var("x"), int_var("X")], vec![]);
        let err = resolve(&u).unwrap_err();
        assert!(matches!(err, SymbolError::Duplicate { .. }));
    }

    #[test]
    fn test_in_parameter_not_assignable() {
        let u = unit(
            vec![param("a", ParamMode::In)],
            vec![],
            vec![assign("a", Expr::new(ExprKind::Null, at(3)))],
        );
        assert!(matches!(
            resolve(&u).unwrap_err(),
            SymbolError::NotAssignable { .. }
        ));

        let u = unit(
            vec![param("a", ParamMode::Out)],
            vec![],
            vec![assign("a", Expr::new(ExprKind::Null, at(3)))],
        );
        let r = resolve(&u).unwrap();
        assert_eq!(r.referenced(first_assign_target(&u)).unwrap().block, None);
    }

    #[test]
    fn test_constant_not_assignable() {
        let c = Decl::new(
            DeclKind::Const {
                name: "c".into(),
                type_spec: TypeSpec::Simple(SqlType::Int),
                not_null: false,
                value: Expr::new(ExprKind::Uint("1".into()), at(2)),
            },
            at(2),
        );
        let u = unit(vec![], vec![c], vec![assign("c", id_expr("c"))]);
        assert_eq!(resolve(&u).unwrap_err().code(), "E-SYMBOL-003");
    }

    #[test]
    fn test_percent_type() {
        let y = Decl::new(
            DeclKind::Var {
                name: "y".into(),
                type_spec: TypeSpec::Percent(id("x")),
                not_null: false,
                init: None,
            },
            at(2),
        );
        let u = unit(vec![], vec![int_var("x"), y], vec![]);
        let r = resolve(&u).unwrap();
        let y = r.declared(u.routine.decls[1].id).unwrap();
        assert_eq!(y.value_type(), Some(plcsql_types::Type::Int));

        let bad = Decl::new(
            DeclKind::Var {
                name: "z".into(),
                type_spec: TypeSpec::Percent(id("no_data_found")),
                not_null: false,
                init: None,
            },
            at(2),
        );
        let u = unit(vec![], vec![bad], vec![]);
        assert!(matches!(
            resolve(&u).unwrap_err(),
            SymbolError::BadPercentType { .. }
        ));
    }

    #[test]
    fn test_block_levels_and_names() {
        let inner = Stmt::new(
            StmtKind::Block {
                decls: vec![int_var("x")],
                body: Body {
                    stmts: vec![assign("x", id_expr("x"))],
                    handlers: vec![],
                },
            },
            at(3),
        );
        let u = unit(vec![], vec![int_var("x")], vec![inner]);
        let r = resolve(&u).unwrap();
        let block = &u.routine.body.stmts[0];
        assert_eq!(r.level(block.id), Some(3));
        assert_eq!(r.block_name(block.id), Some("block_3"));
        let StmtKind::Block { body, .. } = &block.kind else {
            unreachable!()
        };
        let StmtKind::Assign { target, .. } = &body.stmts[0].kind else {
            unreachable!()
        };
        let sym = r.referenced(target.id).unwrap();
        assert_eq!(sym.block.as_deref(), Some("block_3"));
    }

    #[test]
    fn test_loop_labels_and_exit() {
        let exit = Stmt::new(
            StmtKind::Exit {
                label: Some(id("outer")),
                when: None,
            },
            at(4),
        );
        let lp = Stmt::new(
            StmtKind::Loop {
                label: Some("OUTER".into()),
                stmts: vec![exit],
            },
            at(3),
        );
        let u = unit(vec![], vec![], vec![lp]);
        let r = resolve(&u).unwrap();
        assert_eq!(r.level(u.routine.body.stmts[0].id), Some(3));

        let bad = Stmt::new(
            StmtKind::Exit {
                label: None,
                when: None,
            },
            at(3),
        );
        let u = unit(vec![], vec![], vec![bad]);
        assert_eq!(resolve(&u).unwrap_err().code(), "E-SYMBOL-015");
    }

    #[test]
    fn test_bare_raise_needs_handler() {
        let u = unit(vec![], vec![], vec![Stmt::new(StmtKind::Raise(None), at(3))]);
        assert!(matches!(
            resolve(&u).unwrap_err(),
            SymbolError::RaiseOutsideHandler { .. }
        ));

        let mut r = routine(vec![], vec![], vec![]);
        r.body.handlers.push(ExHandler {
            id: NodeId::default(),
            pos: at(5),
            names: vec![id("OTHERS")],
            stmts: vec![Stmt::new(StmtKind::Raise(None), at(6))],
        });
        let mut u = Unit::new(r);
        u.assign_ids();
        let res = resolve(&u).unwrap();
        let raise = &u.routine.body.handlers[0].stmts[0];
        assert_eq!(res.handler_level(raise.id), Some(2));
    }

    #[test]
    fn test_call_classification() {
        let put_line = Stmt::new(
            StmtKind::Call {
                name: id("DBMS_OUTPUT.PUT_LINE"),
                args: vec![Expr::new(ExprKind::Str("hi".into()), at(3))],
            },
            at(3),
        );
        let builtin = assign(
            "x",
            Expr::new(
                ExprKind::Call {
                    name: id("upper"),
                    args: vec![Expr::new(ExprKind::Str("a".into()), at(4))],
                },
                at(4),
            ),
        );
        let sysdate = assign("x", id_expr("SYSDATE"));
        let u = unit(vec![], vec![int_var("x")], vec![put_line, builtin, sysdate]);
        let r = resolve(&u).unwrap();

        let StmtKind::Call { name, .. } = &u.routine.body.stmts[0].kind else {
            unreachable!()
        };
        let sig = r.referenced(name.id).unwrap().routine().unwrap();
        assert_eq!(sig.origin, RoutineOrigin::DbmsOutput);
        assert_eq!(sig.name, "DBMS_OUTPUT$PUT_LINE");

        let StmtKind::Assign { value, .. } = &u.routine.body.stmts[1].kind else {
            unreachable!()
        };
        let ExprKind::Call { name, .. } = &value.kind else {
            unreachable!()
        };
        assert_eq!(r.builtin(name.id), Some("UPPER"));

        let StmtKind::Assign { value, .. } = &u.routine.body.stmts[2].kind else {
            unreachable!()
        };
        let ExprKind::Id(ident) = &value.kind else {
            unreachable!()
        };
        assert_eq!(r.builtin(ident.id), Some("SYSDATE"));
    }

    #[test]
    fn test_call_argument_count() {
        let call = Stmt::new(
            StmtKind::Call {
                name: id("dbms_output.put_line"),
                args: vec![],
            },
            at(3),
        );
        let u = unit(vec![], vec![], vec![call]);
        assert!(matches!(
            resolve(&u).unwrap_err(),
            SymbolError::ArgumentCount {
                expected: 1,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_procedure_used_as_function() {
        let u = unit(vec![], vec![int_var("x")], vec![assign("x", id_expr("p"))]);
        assert!(matches!(
            resolve(&u).unwrap_err(),
            SymbolError::NotAFunction { .. }
        ));
    }

    #[test]
    fn test_out_argument_must_be_assignable() {
        let c = Decl::new(
            DeclKind::Const {
                name: "c".into(),
                type_spec: TypeSpec::Simple(SqlType::String),
                not_null: false,
                value: Expr::new(ExprKind::Str("a".into()), at(2)),
            },
            at(2),
        );
        let call = Stmt::new(
            StmtKind::Call {
                name: id("dbms_output.get_line"),
                args: vec![id_expr("c"), id_expr("c")],
            },
            at(3),
        );
        let u = unit(vec![], vec![c], vec![call]);
        assert!(matches!(
            resolve(&u).unwrap_err(),
            SymbolError::NotAssignable { .. }
        ));
    }

    #[test]
    fn test_cursor_params_only_as_whole_host_exprs() {
        let cursor = |host: Expr| {
            Decl::new(
                DeclKind::Cursor {
                    name: "c".into(),
                    params: vec![param("a", ParamMode::In)],
                    sql: StaticSql {
                        id: NodeId::default(),
                        pos: at(2),
                        text: "select * from t where x = ?".into(),
                        host_exprs: vec![host],
                        into: vec![],
                    },
                },
                at(2),
            )
        };
        let u = unit(vec![], vec![cursor(id_expr("a"))], vec![]);
        let r = resolve(&u).unwrap();
        let c = r.declared(u.routine.decls[0].id).unwrap();
        let SymbolKind::Cursor { param_symbols, .. } = &c.kind else {
            unreachable!()
        };
        assert_eq!(param_symbols.len(), 1);

        let neg = Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(id_expr("a")),
            },
            at(2),
        );
        let u = unit(vec![], vec![cursor(neg)], vec![]);
        assert_eq!(resolve(&u).unwrap_err().code(), "E-SYMBOL-016");
    }

    #[test]
    fn test_for_loop_iterator_is_read_only() {
        let lp = Stmt::new(
            StmtKind::ForIter {
                label: None,
                iter: id("i"),
                reverse: false,
                lower: Expr::new(ExprKind::Uint("1".into()), at(3)),
                upper: Expr::new(ExprKind::Uint("3".into()), at(3)),
                step: None,
                stmts: vec![assign("i", Expr::new(ExprKind::Uint("1".into()), at(4)))],
            },
            at(3),
        );
        let u = unit(vec![], vec![], vec![lp]);
        assert!(matches!(
            resolve(&u).unwrap_err(),
            SymbolError::NotAssignable { .. }
        ));
    }
}
