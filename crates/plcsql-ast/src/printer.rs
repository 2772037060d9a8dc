//! Canonical text printer for PL/CSQL AST
//!
//! Renders a unit back to PL/CSQL source with two-space indentation.
//! Used by the `print` command and for readable test failures.

use crate::{
    Body, Decl, DeclKind, Expr, ExprKind, Ident, Param, Routine, StaticSql,
    Stmt, StmtKind, TypeSpec, UnaryOp, Unit,
};

/// Trait for converting AST nodes to canonical PL/CSQL text.
pub trait ToPlcsql {
    /// Convert to canonical text with the given indentation level.
    fn to_plcsql(&self, indent: usize) -> String;
}

/// Helper to generate indentation string (two spaces per level).
fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

/// Quote a string literal, doubling embedded single quotes.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn join_exprs(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|e| e.to_plcsql(0))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_idents(idents: &[Ident]) -> String {
    idents
        .iter()
        .map(|i| i.name.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

fn stmt_lines(stmts: &[Stmt], indent: usize) -> String {
    stmts
        .iter()
        .map(|s| s.to_plcsql(indent))
        .collect::<Vec<_>>()
        .join("")
}

// ===== Unit =====

impl ToPlcsql for Unit {
    fn to_plcsql(&self, indent: usize) -> String {
        let mut out = String::new();
        out.push_str(&indent_str(indent));
        out.push_str("CREATE OR REPLACE ");
        out.push_str(self.routine.to_plcsql(indent).trim_start());
        out
    }
}

// ===== Routine =====

impl ToPlcsql for Routine {
    fn to_plcsql(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        let mut out = format!("{}{} {}", ind, self.kind.keyword(), self.name);
        if !self.params.is_empty() {
            let params = self
                .params
                .iter()
                .map(|p| p.to_plcsql(0))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("({})", params));
        }
        if let Some(ret) = &self.ret_type {
            out.push_str(&format!(" RETURN {}", ret.to_plcsql(0)));
        }
        out.push_str(" AS\n");
        for d in &self.decls {
            out.push_str(&d.to_plcsql(indent + 1));
        }
        out.push_str(&format!("{}BEGIN\n", ind));
        out.push_str(&self.body.to_plcsql(indent + 1));
        out.push_str(&format!("{}END;\n", ind));
        out
    }
}

impl ToPlcsql for Param {
    fn to_plcsql(&self, _indent: usize) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.mode.keyword(),
            self.type_spec.to_plcsql(0)
        )
    }
}

impl ToPlcsql for TypeSpec {
    fn to_plcsql(&self, _indent: usize) -> String {
        match self {
            TypeSpec::Simple(ty) => ty.keyword(),
            TypeSpec::Percent(ident) => format!("{}%TYPE", ident.name),
        }
    }
}

// ===== Declarations =====

impl ToPlcsql for Decl {
    fn to_plcsql(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        match &self.kind {
            DeclKind::Var {
                name,
                type_spec,
                not_null,
                init,
            } => {
                let mut line = format!("{}{} {}", ind, name, type_spec.to_plcsql(0));
                if *not_null {
                    line.push_str(" NOT NULL");
                }
                if let Some(init) = init {
                    line.push_str(&format!(" := {}", init.to_plcsql(0)));
                }
                line + ";\n"
            }
            DeclKind::Const {
                name,
                type_spec,
                not_null,
                value,
            } => {
                let nn = if *not_null { " NOT NULL" } else { "" };
                format!(
                    "{}{} CONSTANT {}{} := {};\n",
                    ind,
                    name,
                    type_spec.to_plcsql(0),
                    nn,
                    value.to_plcsql(0)
                )
            }
            DeclKind::Cursor { name, params, sql } => {
                let params = if params.is_empty() {
                    String::new()
                } else {
                    format!(
                        "({})",
                        params
                            .iter()
                            .map(|p| p.to_plcsql(0))
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                };
                format!("{}CURSOR {}{} IS {};\n", ind, name, params, sql.to_plcsql(0))
            }
            DeclKind::Exception { name } => format!("{}{} EXCEPTION;\n", ind, name),
            DeclKind::Procedure(r) | DeclKind::Function(r) => r.to_plcsql(indent),
        }
    }
}

impl ToPlcsql for StaticSql {
    fn to_plcsql(&self, _indent: usize) -> String {
        // host expressions are shown in place of their markers
        let mut out = String::new();
        let mut hosts = self.host_exprs.iter();
        for c in self.text.chars() {
            if c == '?' {
                if let Some(e) = hosts.next() {
                    out.push_str(&e.to_plcsql(0));
                    continue;
                }
            }
            out.push(c);
        }
        if !self.into.is_empty() {
            out.push_str(&format!(" /* INTO {} */", join_idents(&self.into)));
        }
        out
    }
}

// ===== Statements =====

impl ToPlcsql for Body {
    fn to_plcsql(&self, indent: usize) -> String {
        let mut out = stmt_lines(&self.stmts, indent);
        if !self.handlers.is_empty() {
            out.push_str(&format!("{}EXCEPTION\n", indent_str(indent.saturating_sub(1))));
            for h in &self.handlers {
                let names = h
                    .names
                    .iter()
                    .map(|n| n.name.clone())
                    .collect::<Vec<_>>()
                    .join(" OR ");
                out.push_str(&format!("{}WHEN {} THEN\n", indent_str(indent), names));
                out.push_str(&stmt_lines(&h.stmts, indent + 1));
            }
        }
        out
    }
}

fn label_prefix(label: &Option<String>, ind: &str) -> String {
    match label {
        Some(l) => format!("{}<<{}>>\n", ind, l),
        None => String::new(),
    }
}

fn exit_like(keyword: &str, label: &Option<Ident>, when: &Option<Expr>) -> String {
    let mut out = keyword.to_string();
    if let Some(l) = label {
        out.push(' ');
        out.push_str(&l.name);
    }
    if let Some(w) = when {
        out.push_str(&format!(" WHEN {}", w.to_plcsql(0)));
    }
    out
}

impl ToPlcsql for Stmt {
    fn to_plcsql(&self, indent: usize) -> String {
        let ind = indent_str(indent);
        let line = |s: String| format!("{}{};\n", ind, s);
        match &self.kind {
            StmtKind::Null => line("NULL".into()),
            StmtKind::Assign { target, value } => {
                line(format!("{} := {}", target.name, value.to_plcsql(0)))
            }
            StmtKind::Call { name, args } => {
                if args.is_empty() {
                    line(name.name.clone())
                } else {
                    line(format!("{}({})", name.name, join_exprs(args)))
                }
            }
            StmtKind::Return(None) => line("RETURN".into()),
            StmtKind::Return(Some(e)) => line(format!("RETURN {}", e.to_plcsql(0))),
            StmtKind::If { arms, else_stmts } => {
                let mut out = String::new();
                for (i, arm) in arms.iter().enumerate() {
                    let kw = if i == 0 { "IF" } else { "ELSIF" };
                    out.push_str(&format!("{}{} {} THEN\n", ind, kw, arm.cond.to_plcsql(0)));
                    out.push_str(&stmt_lines(&arm.stmts, indent + 1));
                }
                if let Some(stmts) = else_stmts {
                    out.push_str(&format!("{}ELSE\n", ind));
                    out.push_str(&stmt_lines(stmts, indent + 1));
                }
                out + &line("END IF".into())
            }
            StmtKind::Case {
                selector,
                arms,
                else_stmts,
            } => {
                let mut out = format!("{}CASE {}\n", ind, selector.to_plcsql(0));
                for arm in arms {
                    out.push_str(&format!("{}WHEN {} THEN\n", ind, arm.value.to_plcsql(0)));
                    out.push_str(&stmt_lines(&arm.stmts, indent + 1));
                }
                if let Some(stmts) = else_stmts {
                    out.push_str(&format!("{}ELSE\n", ind));
                    out.push_str(&stmt_lines(stmts, indent + 1));
                }
                out + &line("END CASE".into())
            }
            StmtKind::SearchedCase { arms, else_stmts } => {
                let mut out = format!("{}CASE\n", ind);
                for arm in arms {
                    out.push_str(&format!("{}WHEN {} THEN\n", ind, arm.cond.to_plcsql(0)));
                    out.push_str(&stmt_lines(&arm.stmts, indent + 1));
                }
                if let Some(stmts) = else_stmts {
                    out.push_str(&format!("{}ELSE\n", ind));
                    out.push_str(&stmt_lines(stmts, indent + 1));
                }
                out + &line("END CASE".into())
            }
            StmtKind::Loop { label, stmts } => {
                label_prefix(label, &ind)
                    + &format!("{}LOOP\n", ind)
                    + &stmt_lines(stmts, indent + 1)
                    + &line("END LOOP".into())
            }
            StmtKind::While { label, cond, stmts } => {
                label_prefix(label, &ind)
                    + &format!("{}WHILE {} LOOP\n", ind, cond.to_plcsql(0))
                    + &stmt_lines(stmts, indent + 1)
                    + &line("END LOOP".into())
            }
            StmtKind::ForIter {
                label,
                iter,
                reverse,
                lower,
                upper,
                step,
                stmts,
            } => {
                let rev = if *reverse { "REVERSE " } else { "" };
                let by = match step {
                    Some(s) => format!(" BY {}", s.to_plcsql(0)),
                    None => String::new(),
                };
                label_prefix(label, &ind)
                    + &format!(
                        "{}FOR {} IN {}{} .. {}{} LOOP\n",
                        ind,
                        iter.name,
                        rev,
                        lower.to_plcsql(0),
                        upper.to_plcsql(0),
                        by
                    )
                    + &stmt_lines(stmts, indent + 1)
                    + &line("END LOOP".into())
            }
            StmtKind::ForCursor {
                label,
                record,
                cursor,
                args,
                stmts,
            } => {
                let args = if args.is_empty() {
                    String::new()
                } else {
                    format!("({})", join_exprs(args))
                };
                label_prefix(label, &ind)
                    + &format!("{}FOR {} IN {}{} LOOP\n", ind, record.name, cursor.name, args)
                    + &stmt_lines(stmts, indent + 1)
                    + &line("END LOOP".into())
            }
            StmtKind::ForStaticSql {
                label,
                record,
                sql,
                stmts,
            } => {
                label_prefix(label, &ind)
                    + &format!("{}FOR {} IN ({}) LOOP\n", ind, record.name, sql.to_plcsql(0))
                    + &stmt_lines(stmts, indent + 1)
                    + &line("END LOOP".into())
            }
            StmtKind::ForDynamicSql {
                label,
                record,
                sql,
                using,
                stmts,
            } => {
                let using = if using.is_empty() {
                    String::new()
                } else {
                    format!(" USING {}", join_exprs(using))
                };
                label_prefix(label, &ind)
                    + &format!(
                        "{}FOR {} IN (EXECUTE IMMEDIATE {}{}) LOOP\n",
                        ind,
                        record.name,
                        sql.to_plcsql(0),
                        using
                    )
                    + &stmt_lines(stmts, indent + 1)
                    + &line("END LOOP".into())
            }
            StmtKind::Exit { label, when } => line(exit_like("EXIT", label, when)),
            StmtKind::Continue { label, when } => line(exit_like("CONTINUE", label, when)),
            StmtKind::Block { decls, body } => {
                let mut out = String::new();
                if !decls.is_empty() {
                    out.push_str(&format!("{}DECLARE\n", ind));
                    for d in decls {
                        out.push_str(&d.to_plcsql(indent + 1));
                    }
                }
                out.push_str(&format!("{}BEGIN\n", ind));
                out.push_str(&body.to_plcsql(indent + 1));
                out + &line("END".into())
            }
            StmtKind::Raise(None) => line("RAISE".into()),
            StmtKind::Raise(Some(name)) => line(format!("RAISE {}", name.name)),
            StmtKind::RaiseAppErr { code, msg } => line(format!(
                "RAISE_APPLICATION_ERROR({}, {})",
                code.to_plcsql(0),
                msg.to_plcsql(0)
            )),
            StmtKind::Commit => line("COMMIT".into()),
            StmtKind::Rollback => line("ROLLBACK".into()),
            StmtKind::OpenCursor { cursor, args } => {
                if args.is_empty() {
                    line(format!("OPEN {}", cursor.name))
                } else {
                    line(format!("OPEN {}({})", cursor.name, join_exprs(args)))
                }
            }
            StmtKind::CloseCursor(cursor) => line(format!("CLOSE {}", cursor.name)),
            StmtKind::Fetch { cursor, into } => {
                line(format!("FETCH {} INTO {}", cursor.name, join_idents(into)))
            }
            StmtKind::OpenFor { refcursor, sql } => {
                line(format!("OPEN {} FOR {}", refcursor.name, sql.to_plcsql(0)))
            }
            StmtKind::ExecImme { sql, into, using } => {
                let mut s = format!("EXECUTE IMMEDIATE {}", sql.to_plcsql(0));
                if !into.is_empty() {
                    s.push_str(&format!(" INTO {}", join_idents(into)));
                }
                if !using.is_empty() {
                    s.push_str(&format!(" USING {}", join_exprs(using)));
                }
                line(s)
            }
            StmtKind::StaticSql(sql) => line(sql.to_plcsql(0)),
        }
    }
}

// ===== Expressions =====

impl ToPlcsql for Expr {
    fn to_plcsql(&self, _indent: usize) -> String {
        match &self.kind {
            ExprKind::Null => "NULL".into(),
            ExprKind::True => "TRUE".into(),
            ExprKind::False => "FALSE".into(),
            ExprKind::Uint(s) | ExprKind::Float(s) => s.clone(),
            ExprKind::Str(s) => quote(s),
            ExprKind::Date(s) => format!("DATE {}", quote(s)),
            ExprKind::Time(s) => format!("TIME {}", quote(s)),
            ExprKind::Datetime(s) => format!("DATETIME {}", quote(s)),
            ExprKind::Timestamp(s) => format!("TIMESTAMP {}", quote(s)),
            ExprKind::SqlRowCount => "SQL%ROWCOUNT".into(),
            ExprKind::SqlCode => "SQLCODE".into(),
            ExprKind::SqlErrm => "SQLERRM".into(),
            ExprKind::Serial { name, next } => {
                let which = if *next { "NEXT_VALUE" } else { "CURRENT_VALUE" };
                format!("{}.{}", name, which)
            }
            ExprKind::Id(i) => i.name.clone(),
            ExprKind::Field { record, field } => format!("{}.{}", record.name, field),
            ExprKind::CursorAttr { cursor, attr } => format!("{}{}", cursor.name, attr.keyword()),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => format!("-{}", operand.to_plcsql(0)),
                UnaryOp::Not => format!("NOT ({})", operand.to_plcsql(0)),
                UnaryOp::BitCompli => format!("~{}", operand.to_plcsql(0)),
                UnaryOp::IsNull => format!("{} IS NULL", operand.to_plcsql(0)),
            },
            ExprKind::Binary { op, left, right } => format!(
                "({} {} {})",
                left.to_plcsql(0),
                op.symbol(),
                right.to_plcsql(0)
            ),
            ExprKind::Between {
                target,
                lower,
                upper,
            } => format!(
                "{} BETWEEN {} AND {}",
                target.to_plcsql(0),
                lower.to_plcsql(0),
                upper.to_plcsql(0)
            ),
            ExprKind::In { target, elements } => {
                format!("{} IN ({})", target.to_plcsql(0), join_exprs(elements))
            }
            ExprKind::Like {
                target,
                pattern,
                escape,
            } => {
                let mut s = format!("{} LIKE {}", target.to_plcsql(0), pattern.to_plcsql(0));
                if let Some(esc) = escape {
                    s.push_str(&format!(" ESCAPE {}", quote(esc)));
                }
                s
            }
            ExprKind::Case {
                selector,
                arms,
                else_expr,
            } => {
                let mut s = format!("CASE {}", selector.to_plcsql(0));
                for arm in arms {
                    s.push_str(&format!(
                        " WHEN {} THEN {}",
                        arm.value.to_plcsql(0),
                        arm.result.to_plcsql(0)
                    ));
                }
                if let Some(e) = else_expr {
                    s.push_str(&format!(" ELSE {}", e.to_plcsql(0)));
                }
                s + " END"
            }
            ExprKind::Cond { arms, else_expr } => {
                let mut s = "CASE".to_string();
                for arm in arms {
                    s.push_str(&format!(
                        " WHEN {} THEN {}",
                        arm.cond.to_plcsql(0),
                        arm.result.to_plcsql(0)
                    ));
                }
                if let Some(e) = else_expr {
                    s.push_str(&format!(" ELSE {}", e.to_plcsql(0)));
                }
                s + " END"
            }
            ExprKind::Call { name, args } => format!("{}({})", name.name, join_exprs(args)),
        }
    }
}
