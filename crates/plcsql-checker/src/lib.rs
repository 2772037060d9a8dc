//! plcsql-checker: type checking of resolved PL/CSQL units
//!
//! Runs after name resolution and before code generation:
//! - Computes the type of every expression
//! - Attaches the coercion each value needs where it is used
//! - Picks operator versions and their `Char`/`Timestamp` extensions
//! - Learns the select lists of embedded SQL and the result types of
//!   built-in functions from a [`SqlSemanticsOracle`]
//!
//! Everything found is recorded in [`Decorations`], keyed by node id.
//!
//! # Example
//!
//! ```ignore
//! use plcsql_checker::{check, StaticOracle};
//! use plcsql_symbols::{resolve, OperatorTable};
//!
//! let resolution = resolve(&unit)?;
//! let oracle = StaticOracle::from_json(&fixture)?;
//! let decorations = check(&unit, &resolution, OperatorTable::shared(), &oracle)?;
//! ```

mod checker;
mod decorations;
mod error;
mod oracle;

pub use decorations::{Column, Decorations, OpExtension};
pub use error::SemanticError;
pub use oracle::{
    db_type, ColumnInfo, RejectingOracle, SqlSemantics, SqlSemanticsOracle, StatementInfo,
    StaticOracle,
};

use plcsql_ast::Unit;
use plcsql_symbols::{OperatorTable, Resolution};

/// Type check a resolved unit. The first violation aborts checking.
pub fn check(
    unit: &Unit,
    resolution: &Resolution,
    operators: &OperatorTable,
    oracle: &dyn SqlSemanticsOracle,
) -> Result<Decorations, SemanticError> {
    checker::Checker::new(resolution, operators, oracle).run(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plcsql_ast::*;
    use plcsql_symbols::resolve;
    use plcsql_types::{Coercion, Type};

    fn at(line: u32) -> Pos {
        Pos::new(line, 1)
    }

    fn expr(kind: ExprKind, line: u32) -> Expr {
        Expr::new(kind, at(line))
    }

    fn id_expr(name: &str) -> Expr {
        expr(ExprKind::Id(Ident::new(name, at(1))), 1)
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

    fn assign(target: &str, value: Expr) -> Stmt {
        Stmt::new(
            StmtKind::Assign {
                target: Ident::new(target, at(3)),
                value,
            },
            at(3),
        )
    }

    fn unit(decls: Vec<Decl>, stmts: Vec<Stmt>) -> Unit {
        let mut unit = Unit::new(Routine {
            id: NodeId::default(),
            pos: at(1),
            kind: RoutineKind::Procedure,
            name: "t".into(),
            params: vec![],
            ret_type: None,
            decls,
            body: Body {
                stmts,
                handlers: vec![],
            },
        });
        unit.assign_ids();
        unit
    }

    fn run(unit: &Unit, oracle: &dyn SqlSemanticsOracle) -> Result<Decorations, SemanticError> {
        let resolution = resolve(unit).unwrap();
        check(unit, &resolution, OperatorTable::shared(), oracle)
    }

    fn assigned_value(unit: &Unit, index: usize) -> &Expr {
        match &unit.routine.body.stmts[index].kind {
            StmtKind::Assign { value, .. } => value,
            other => panic!("not an assignment: {:?}", other),
        }
    }

    #[test]
    fn test_assignment_coerces_value() {
        let u = unit(
            vec![var("x", SqlType::Bigint)],
            vec![assign("x", expr(ExprKind::Uint("7".into()), 3))],
        );
        let deco = run(&u, &RejectingOracle).unwrap();
        let value = assigned_value(&u, 0);
        assert_eq!(deco.type_of(value.id), Some(Type::Int));
        assert_eq!(
            deco.coercion(value.id),
            Some(&Coercion::Conversion {
                src: Type::Int,
                dst: Type::Bigint
            })
        );
        assert!(!deco.uses_connection());
    }

    #[test]
    fn test_char_comparison_gets_extension() {
        let cmp = expr(
            ExprKind::Binary {
                op: BinaryOp::Eq,
                left: Box::new(id_expr("a")),
                right: Box::new(expr(ExprKind::Str("x".into()), 3)),
            },
            3,
        );
        let u = unit(
            vec![
                var("a", SqlType::Char { length: Some(4) }),
                var("b", SqlType::Boolean),
            ],
            vec![assign("b", cmp)],
        );
        let deco = run(&u, &RejectingOracle).unwrap();
        let value = assigned_value(&u, 0);
        assert_eq!(deco.op_extension(value.id), Some(OpExtension::Char));
        assert_eq!(deco.type_of(value.id), Some(Type::Boolean));
    }

    #[test]
    fn test_concat_has_no_extension() {
        let cat = expr(
            ExprKind::Binary {
                op: BinaryOp::Concat,
                left: Box::new(id_expr("a")),
                right: Box::new(id_expr("a")),
            },
            3,
        );
        let u = unit(
            vec![
                var("a", SqlType::Char { length: Some(4) }),
                var("s", SqlType::String),
            ],
            vec![assign("s", cat)],
        );
        let deco = run(&u, &RejectingOracle).unwrap();
        assert_eq!(deco.op_extension(assigned_value(&u, 0).id), None);
    }

    #[test]
    fn test_timestamp_extension() {
        let cmp = expr(
            ExprKind::Binary {
                op: BinaryOp::Lt,
                left: Box::new(id_expr("ts")),
                right: Box::new(id_expr("ts")),
            },
            3,
        );
        let u = unit(
            vec![var("ts", SqlType::Timestamp), var("b", SqlType::Boolean)],
            vec![assign("b", cmp)],
        );
        let deco = run(&u, &RejectingOracle).unwrap();
        assert_eq!(
            deco.op_extension(assigned_value(&u, 0).id),
            Some(OpExtension::Timestamp)
        );
        assert!(deco.imports().any(|i| i == "java.sql.Timestamp"));
    }

    #[test]
    fn test_all_null_case_is_null() {
        let case = expr(
            ExprKind::Cond {
                arms: vec![CondArm {
                    id: NodeId::default(),
                    pos: at(3),
                    cond: expr(ExprKind::True, 3),
                    result: expr(ExprKind::Null, 3),
                }],
                else_expr: Some(Box::new(expr(ExprKind::Null, 4))),
            },
            3,
        );
        let u = unit(vec![var("x", SqlType::Int)], vec![assign("x", case)]);
        let deco = run(&u, &RejectingOracle).unwrap();
        assert_eq!(deco.type_of(assigned_value(&u, 0).id), Some(Type::Null));
    }

    fn simple_case(results: Vec<Expr>, else_expr: Expr) -> Expr {
        let arms = results
            .into_iter()
            .enumerate()
            .map(|(i, result)| CaseArm {
                id: NodeId::default(),
                pos: at(3),
                value: expr(ExprKind::Uint((i + 1).to_string()), 3),
                result,
            })
            .collect();
        expr(
            ExprKind::Case {
                selector: Box::new(id_expr("n")),
                arms,
                else_expr: Some(Box::new(else_expr)),
            },
            3,
        )
    }

    #[test]
    fn test_case_branches_join() {
        let case = simple_case(
            vec![
                expr(ExprKind::Str("a".into()), 3),
                expr(ExprKind::Str("bb".into()), 4),
            ],
            expr(ExprKind::Null, 5),
        );
        let u = unit(
            vec![var("n", SqlType::Int), var("s", SqlType::String)],
            vec![assign("s", case)],
        );
        let deco = run(&u, &RejectingOracle).unwrap();
        let value = assigned_value(&u, 0);
        assert_eq!(deco.type_of(value.id), Some(Type::StringAny));
        let ExprKind::Case {
            else_expr: Some(else_expr),
            ..
        } = &value.kind
        else {
            panic!("not a case");
        };
        assert_eq!(
            deco.coercion(else_expr.id),
            Some(&Coercion::Cast {
                src: Type::Null,
                dst: Type::StringAny
            })
        );
    }

    #[test]
    fn test_cond_numeric_branches_widen() {
        let case = expr(
            ExprKind::Cond {
                arms: vec![CondArm {
                    id: NodeId::default(),
                    pos: at(3),
                    cond: expr(ExprKind::True, 3),
                    result: expr(ExprKind::Uint("1".into()), 3),
                }],
                else_expr: Some(Box::new(expr(ExprKind::Uint("9999999999".into()), 4))),
            },
            3,
        );
        let u = unit(vec![var("x", SqlType::Bigint)], vec![assign("x", case)]);
        let deco = run(&u, &RejectingOracle).unwrap();
        assert_eq!(deco.type_of(assigned_value(&u, 0).id), Some(Type::Bigint));
    }

    #[test]
    fn test_case_else_that_does_not_join() {
        let case = simple_case(
            vec![expr(ExprKind::Uint("1".into()), 3)],
            expr(ExprKind::True, 6),
        );
        let u = unit(
            vec![var("n", SqlType::Int), var("x", SqlType::Int)],
            vec![assign("x", case)],
        );
        let err = run(&u, &RejectingOracle).unwrap_err();
        assert!(matches!(err, SemanticError::ElseTypeMismatch { .. }), "{:?}", err);
        assert_eq!(err.pos(), at(6));
    }

    #[test]
    fn test_builtin_lookup() {
        let call = expr(
            ExprKind::Call {
                name: Ident::new("UPPER", at(3)),
                args: vec![expr(ExprKind::Str("a".into()), 3)],
            },
            3,
        );
        let u = unit(vec![var("s", SqlType::String)], vec![assign("s", call)]);
        let oracle = StaticOracle::new().with_function("UPPER", db_type::STRING);
        let deco = run(&u, &oracle).unwrap();
        assert_eq!(deco.type_of(assigned_value(&u, 0).id), Some(Type::StringAny));
        assert!(deco.uses_connection());

        let err = run(&u, &RejectingOracle).unwrap_err();
        assert_eq!(err.code(), "E-TYPE-027");
    }

    #[test]
    fn test_lone_null_builtin_argument_is_cast() {
        let call = expr(
            ExprKind::Call {
                name: Ident::new("NVL", at(3)),
                args: vec![expr(ExprKind::Null, 3)],
            },
            3,
        );
        let u = unit(vec![var("o", SqlType::String)], vec![assign("o", call)]);
        let oracle = StaticOracle::new().with_function("NVL", db_type::STRING);
        let deco = run(&u, &oracle).unwrap();
        let ExprKind::Call { args, .. } = &assigned_value(&u, 0).kind else {
            panic!("not a call");
        };
        assert_eq!(
            deco.coercion(args[0].id),
            Some(&Coercion::Cast {
                src: Type::Null,
                dst: Type::Object
            })
        );
    }

    #[test]
    fn test_errors_carry_positions() {
        let u = unit(
            vec![var("d", SqlType::Date)],
            vec![assign("d", expr(ExprKind::True, 9))],
        );
        let err = run(&u, &RejectingOracle).unwrap_err();
        assert_eq!(err.code(), "E-TYPE-016");
        assert_eq!(err.pos(), at(9));
    }
}
