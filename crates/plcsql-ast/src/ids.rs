//! Pre-order node numbering

use crate::*;

#[derive(Default)]
pub(crate) struct IdCounter {
    next: u32,
}

impl IdCounter {
    pub(crate) fn count(&self) -> u32 {
        self.next
    }

    fn fresh(&mut self, id: &mut NodeId) {
        self.next += 1;
        *id = NodeId(self.next);
    }

    pub(crate) fn routine(&mut self, r: &mut Routine) {
        self.fresh(&mut r.id);
        for p in &mut r.params {
            self.param(p);
        }
        if let Some(ts) = &mut r.ret_type {
            self.type_spec(ts);
        }
        for d in &mut r.decls {
            self.decl(d);
        }
        self.body(&mut r.body);
    }

    fn param(&mut self, p: &mut Param) {
        self.fresh(&mut p.id);
        self.type_spec(&mut p.type_spec);
    }

    fn type_spec(&mut self, ts: &mut TypeSpec) {
        if let TypeSpec::Percent(ident) = ts {
            self.ident(ident);
        }
    }

    fn ident(&mut self, i: &mut Ident) {
        self.fresh(&mut i.id);
    }

    fn decl(&mut self, d: &mut Decl) {
        self.fresh(&mut d.id);
        match &mut d.kind {
            DeclKind::Var { type_spec, init, .. } => {
                self.type_spec(type_spec);
                if let Some(e) = init {
                    self.expr(e);
                }
            }
            DeclKind::Const {
                type_spec, value, ..
            } => {
                self.type_spec(type_spec);
                self.expr(value);
            }
            DeclKind::Cursor { params, sql, .. } => {
                for p in params {
                    self.param(p);
                }
                self.static_sql(sql);
            }
            DeclKind::Exception { .. } => {}
            DeclKind::Procedure(r) | DeclKind::Function(r) => self.routine(r),
        }
    }

    fn body(&mut self, b: &mut Body) {
        self.stmts(&mut b.stmts);
        for h in &mut b.handlers {
            self.fresh(&mut h.id);
            for n in &mut h.names {
                self.ident(n);
            }
            self.stmts(&mut h.stmts);
        }
    }

    fn stmts(&mut self, stmts: &mut [Stmt]) {
        for s in stmts {
            self.stmt(s);
        }
    }

    fn opt_stmts(&mut self, stmts: &mut Option<Vec<Stmt>>) {
        if let Some(stmts) = stmts {
            self.stmts(stmts);
        }
    }

    fn exprs(&mut self, exprs: &mut [Expr]) {
        for e in exprs {
            self.expr(e);
        }
    }

    fn idents(&mut self, idents: &mut [Ident]) {
        for i in idents {
            self.ident(i);
        }
    }

    fn static_sql(&mut self, sql: &mut StaticSql) {
        self.fresh(&mut sql.id);
        self.exprs(&mut sql.host_exprs);
        self.idents(&mut sql.into);
    }

    fn cond_arms(&mut self, arms: &mut [CondStmtArm]) {
        for arm in arms {
            self.fresh(&mut arm.id);
            self.expr(&mut arm.cond);
            self.stmts(&mut arm.stmts);
        }
    }

    fn stmt(&mut self, s: &mut Stmt) {
        self.fresh(&mut s.id);
        match &mut s.kind {
            StmtKind::Null | StmtKind::Commit | StmtKind::Rollback => {}
            StmtKind::Assign { target, value } => {
                self.ident(target);
                self.expr(value);
            }
            StmtKind::Call { name, args } => {
                self.ident(name);
                self.exprs(args);
            }
            StmtKind::Return(e) => {
                if let Some(e) = e {
                    self.expr(e);
                }
            }
            StmtKind::If { arms, else_stmts } | StmtKind::SearchedCase { arms, else_stmts } => {
                self.cond_arms(arms);
                self.opt_stmts(else_stmts);
            }
            StmtKind::Case {
                selector,
                arms,
                else_stmts,
            } => {
                self.expr(selector);
                for arm in arms {
                    self.fresh(&mut arm.id);
                    self.expr(&mut arm.value);
                    self.stmts(&mut arm.stmts);
                }
                self.opt_stmts(else_stmts);
            }
            StmtKind::Loop { stmts, .. } => self.stmts(stmts),
            StmtKind::While { cond, stmts, .. } => {
                self.expr(cond);
                self.stmts(stmts);
            }
            StmtKind::ForIter {
                iter,
                lower,
                upper,
                step,
                stmts,
                ..
            } => {
                self.ident(iter);
                self.expr(lower);
                self.expr(upper);
                if let Some(step) = step {
                    self.expr(step);
                }
                self.stmts(stmts);
            }
            StmtKind::ForCursor {
                record,
                cursor,
                args,
                stmts,
                ..
            } => {
                self.ident(record);
                self.ident(cursor);
                self.exprs(args);
                self.stmts(stmts);
            }
            StmtKind::ForStaticSql {
                record, sql, stmts, ..
            } => {
                self.ident(record);
                self.static_sql(sql);
                self.stmts(stmts);
            }
            StmtKind::ForDynamicSql {
                record,
                sql,
                using,
                stmts,
                ..
            } => {
                self.ident(record);
                self.expr(sql);
                self.exprs(using);
                self.stmts(stmts);
            }
            StmtKind::Exit { label, when } | StmtKind::Continue { label, when } => {
                if let Some(label) = label {
                    self.ident(label);
                }
                if let Some(when) = when {
                    self.expr(when);
                }
            }
            StmtKind::Block { decls, body } => {
                for d in decls {
                    self.decl(d);
                }
                self.body(body);
            }
            StmtKind::Raise(name) => {
                if let Some(name) = name {
                    self.ident(name);
                }
            }
            StmtKind::RaiseAppErr { code, msg } => {
                self.expr(code);
                self.expr(msg);
            }
            StmtKind::OpenCursor { cursor, args } => {
                self.ident(cursor);
                self.exprs(args);
            }
            StmtKind::CloseCursor(cursor) => self.ident(cursor),
            StmtKind::Fetch { cursor, into } => {
                self.ident(cursor);
                self.idents(into);
            }
            StmtKind::OpenFor { refcursor, sql } => {
                self.ident(refcursor);
                self.static_sql(sql);
            }
            StmtKind::ExecImme { sql, into, using } => {
                self.expr(sql);
                self.idents(into);
                self.exprs(using);
            }
            StmtKind::StaticSql(sql) => self.static_sql(sql),
        }
    }

    fn expr(&mut self, e: &mut Expr) {
        self.fresh(&mut e.id);
        match &mut e.kind {
            ExprKind::Null
            | ExprKind::True
            | ExprKind::False
            | ExprKind::Uint(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Date(_)
            | ExprKind::Time(_)
            | ExprKind::Datetime(_)
            | ExprKind::Timestamp(_)
            | ExprKind::SqlRowCount
            | ExprKind::SqlCode
            | ExprKind::SqlErrm
            | ExprKind::Serial { .. } => {}
            ExprKind::Id(i) => self.ident(i),
            ExprKind::Field { record, .. } => self.ident(record),
            ExprKind::CursorAttr { cursor, .. } => self.ident(cursor),
            ExprKind::Unary { operand, .. } => self.expr(operand),
            ExprKind::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Between {
                target,
                lower,
                upper,
            } => {
                self.expr(target);
                self.expr(lower);
                self.expr(upper);
            }
            ExprKind::In { target, elements } => {
                self.expr(target);
                self.exprs(elements);
            }
            ExprKind::Like {
                target, pattern, ..
            } => {
                self.expr(target);
                self.expr(pattern);
            }
            ExprKind::Case {
                selector,
                arms,
                else_expr,
            } => {
                self.expr(selector);
                for arm in arms {
                    self.fresh(&mut arm.id);
                    self.expr(&mut arm.value);
                    self.expr(&mut arm.result);
                }
                if let Some(e) = else_expr {
                    self.expr(e);
                }
            }
            ExprKind::Cond { arms, else_expr } => {
                for arm in arms {
                    self.fresh(&mut arm.id);
                    self.expr(&mut arm.cond);
                    self.expr(&mut arm.result);
                }
                if let Some(e) = else_expr {
                    self.expr(e);
                }
            }
            ExprKind::Call { name, args } => {
                self.ident(name);
                self.exprs(args);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn sample_unit() -> Unit {
        let body = Body {
            stmts: vec![Stmt::new(
                StmtKind::Assign {
                    target: Ident::new("x", Pos::new(3, 3)),
                    value: Expr::new(
                        ExprKind::Binary {
                            op: BinaryOp::Add,
                            left: Box::new(Expr::new(
                                ExprKind::Id(Ident::new("x", Pos::new(3, 8))),
                                Pos::new(3, 8),
                            )),
                            right: Box::new(Expr::new(ExprKind::Uint("1".into()), Pos::new(3, 12))),
                        },
                        Pos::new(3, 8),
                    ),
                },
                Pos::new(3, 3),
            )],
            handlers: vec![],
        };
        Unit::new(Routine {
            id: NodeId::default(),
            pos: Pos::new(1, 1),
            kind: RoutineKind::Procedure,
            name: "P".into(),
            params: vec![],
            ret_type: None,
            decls: vec![Decl::new(
                DeclKind::Var {
                    name: "x".into(),
                    type_spec: TypeSpec::Simple(SqlType::Int),
                    not_null: false,
                    init: None,
                },
                Pos::new(2, 3),
            )],
            body,
        })
    }

    #[test]
    fn test_ids_are_dense_and_preorder() {
        let mut unit = sample_unit();
        unit.assign_ids();
        assert_eq!(unit.routine.id, NodeId(1));
        assert_eq!(unit.routine.decls[0].id, NodeId(2));
        let stmt = &unit.routine.body.stmts[0];
        assert_eq!(stmt.id, NodeId(3));
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                assert_eq!(target.id, NodeId(4));
                assert_eq!(value.id, NodeId(5));
            }
            other => panic!("unexpected statement {:?}", other),
        }
        assert_eq!(unit.node_count(), 8);
    }

    #[test]
    fn test_assign_ids_is_idempotent() {
        let mut unit = sample_unit();
        unit.assign_ids();
        let first = unit.clone();
        unit.assign_ids();
        assert_eq!(first, unit);
    }

    #[test]
    fn test_class_name() {
        let unit = sample_unit();
        assert_eq!(unit.class_name(), "Proc_p");
    }

    #[test]
    fn test_from_json_assigns_ids() {
        let json = r#"{
            "routine": {
                "pos": {"line": 1, "column": 1},
                "kind": "function",
                "name": "f",
                "ret_type": {"simple": "INT"},
                "body": {"stmts": [
                    {"pos": {"line": 2, "column": 3}, "kind": {"return": {"kind": {"uint": "7"}}}}
                ]}
            }
        }"#;
        let unit = Unit::from_json(json).expect("valid unit");
        assert_eq!(unit.routine.kind, RoutineKind::Function);
        assert_eq!(unit.class_name(), "Func_f");
        assert_eq!(unit.node_count(), 3);
        assert!(!unit.autonomous_transaction);
    }
}
