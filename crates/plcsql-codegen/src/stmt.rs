//! Statements

use plcsql_ast::{
    Body, CaseStmtArm, CondStmtArm, Decl, Expr, ExprKind, Ident, Pos, StaticSql, Stmt, StmtKind,
};
use plcsql_checker::Column;
use plcsql_symbols::{RoutineOrigin, Symbol, SymbolKind};

use crate::template::{CodeToResolve, Substitute, Template, TemplateList};
use crate::writer::{java_string, missing, JavaWriter, Result};

const SQL_ERROR_CATCH: &[&str] = &[
    "} catch (SQLException e) {",
    "  Server.log(e);",
    "  throw new SQL_ERROR(e.getMessage());",
    "}",
];

/// Where the rows of an INTO clause come from
#[derive(Clone, Copy)]
enum IntoSource<'c> {
    /// Typed columns of a static query
    Columns(&'c [Column]),
    /// Untyped values of a dynamic statement
    Dynamic,
}

impl<'a> JavaWriter<'a> {
    pub(crate) fn stmt(&mut self, s: &Stmt) -> Result<CodeToResolve> {
        match &s.kind {
            StmtKind::Null => Ok(CodeToResolve::text(s.pos, ";")),
            StmtKind::Assign { target, value } => self.assign(s, target, value),
            StmtKind::Call { name, args } => self.call(s.pos, name, args, true),
            StmtKind::Return(None) => Ok(CodeToResolve::text(s.pos, "return;")),
            StmtKind::Return(Some(value)) => Ok(Template::new("StmtReturn", s.pos)
                .line("return")
                .big(1, "RETVAL", ";")
                .fill("RETVAL", self.expr(value)?)
                .finish()?),
            StmtKind::If { arms, else_stmts } => {
                let else_part: Option<Substitute> = match else_stmts {
                    Some(stmts) => Some(self.stmts(stmts)?.into()),
                    None => None,
                };
                self.if_stmt(s, arms, else_part)
            }
            StmtKind::SearchedCase { arms, else_stmts } => {
                let else_part = match else_stmts {
                    Some(stmts) => self.stmts(stmts)?.into(),
                    None => case_not_found(s.pos),
                };
                self.if_stmt(s, arms, Some(else_part))
            }
            StmtKind::Case {
                selector,
                arms,
                else_stmts,
            } => self.case_stmt(s, selector, arms, else_stmts.as_deref()),
            StmtKind::Loop { label, stmts } => {
                let level = self.level(s)?;
                Ok(Template::new("StmtBasicLoop", s.pos)
                    .line("%'OPT-LABEL'%")
                    .line("while (opNot(false)) {")
                    .big(1, "STATEMENTS", "")
                    .line("}")
                    .set("OPT-LABEL", opt_label(label.as_deref(), level))
                    .fill("STATEMENTS", self.stmts(stmts)?)
                    .finish()?)
            }
            StmtKind::While { label, cond, stmts } => {
                let level = self.level(s)?;
                let cond: Substitute = match cond.kind {
                    ExprKind::True => "opNot(Boolean.FALSE)".into(),
                    _ => self.expr(cond)?.into(),
                };
                Ok(Template::new("StmtWhileLoop", s.pos)
                    .line("%'OPT-LABEL'%")
                    .line("while (Boolean.TRUE.equals(")
                    .big(2, "EXPRESSION", ")) {")
                    .big(1, "STATEMENTS", "")
                    .line("}")
                    .set("OPT-LABEL", opt_label(label.as_deref(), level))
                    .fill("EXPRESSION", cond)
                    .fill("STATEMENTS", self.stmts(stmts)?)
                    .finish()?)
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
                let level = self.level(s)?;
                let (comment, header) = if *reverse {
                    (
                        " (reverse)",
                        "  for (%'I'%_i%'LVL'%[0] = u%'LVL'%; %'I'%_i%'LVL'%[0] >= l%'LVL'%; %'I'%_i%'LVL'%[0] -= s%'LVL'%) {",
                    )
                } else {
                    (
                        "",
                        "  for (%'I'%_i%'LVL'%[0] = l%'LVL'%; %'I'%_i%'LVL'%[0] <= u%'LVL'%; %'I'%_i%'LVL'%[0] += s%'LVL'%) {",
                    )
                };
                let step: Substitute = match step {
                    Some(step) => self.expr(step)?.into(),
                    None => "1".into(),
                };
                Ok(Template::new("StmtForIterLoop", s.pos)
                    .line(format!("{{ // for loop with integer iterator{}", comment))
                    .line("  int l%'LVL'% =")
                    .big(2, "LOWER-BOUND", ";")
                    .line("  int u%'LVL'% =")
                    .big(2, "UPPER-BOUND", ";")
                    .line("  int s%'LVL'% = checkForLoopIterStep(")
                    .big(2, "STEP", ");")
                    .line("  int[] %'I'%_i%'LVL'% = new int[1];")
                    .line("  %'OPT-LABEL'%")
                    .line(header)
                    .big(2, "STATEMENTS", "")
                    .lines(&["  }", "}"])
                    .set("LVL", level.to_string())
                    .set("I", iter.normalized())
                    .set("OPT-LABEL", opt_label(label.as_deref(), level))
                    .fill("LOWER-BOUND", self.expr(lower)?)
                    .fill("UPPER-BOUND", self.expr(upper)?)
                    .fill("STEP", step)
                    .fill("STATEMENTS", self.stmts(stmts)?)
                    .finish()?)
            }
            StmtKind::ForCursor {
                label,
                record,
                cursor,
                args,
                stmts,
            } => self.for_cursor(s, label.as_deref(), record, cursor, args, stmts),
            StmtKind::ForStaticSql {
                label,
                record,
                sql,
                stmts,
            } => {
                let level = self.level(s)?;
                Ok(Template::new("StmtForSqlLoop", s.pos)
                    .lines(&[
                        "{ // for loop with static SQL",
                        "  PreparedStatement stmt_%'LEVEL'% = null;",
                        "  try {",
                        "    String sql_%'LEVEL'% =",
                    ])
                    .big(3, "SQL", ";")
                    .line("    stmt_%'LEVEL'% = conn.prepareStatement(sql_%'LEVEL'%);")
                    .big(2, "SET-USED-EXPR", "")
                    .lines(&[
                        "    ResultSet %'RECORD'%_r%'LEVEL'% = stmt_%'LEVEL'%.executeQuery();",
                        "    %'LABEL'%",
                        "    while (%'RECORD'%_r%'LEVEL'%.next()) {",
                    ])
                    .big(3, "STATEMENTS", "")
                    .line("    }")
                    .lines(SQL_STMT_TAIL)
                    .set("RECORD", record.normalized())
                    .set("LABEL", opt_label(label.as_deref(), level))
                    .set("LEVEL", level.to_string())
                    .fill("SQL", java_string(&sql.text))
                    .fill("SET-USED-EXPR", self.set_used(&sql.host_exprs)?)
                    .fill("STATEMENTS", self.stmts(stmts)?)
                    .finish()?)
            }
            StmtKind::ForDynamicSql {
                label,
                record,
                sql,
                using,
                stmts,
            } => {
                let level = self.level(s)?;
                Ok(Template::new("StmtForSqlLoop", s.pos)
                    .lines(&[
                        "{ // for loop with dynamic SQL",
                        "  PreparedStatement stmt_%'LEVEL'% = null;",
                        "  try {",
                        "    String sql_%'LEVEL'% = checkNotNull(",
                    ])
                    .big(3, "SQL", ", \"SQL part was evaluated to NULL\");")
                    .lines(&[
                        "    stmt_%'LEVEL'% = conn.prepareStatement(sql_%'LEVEL'%);",
                        "    ResultSetMetaData rsmd_%'LEVEL'% = stmt_%'LEVEL'%.getMetaData();",
                        "    if (rsmd_%'LEVEL'% == null || rsmd_%'LEVEL'%.getColumnCount() < 1) {",
                        "      throw new SQL_ERROR(\"not a SELECT statement\");",
                        "    }",
                    ])
                    .big(2, "SET-USED-EXPR", "")
                    .lines(&[
                        "    if (!stmt_%'LEVEL'%.execute()) {",
                        "      throw new SQL_ERROR(\"use a SELECT statement\");",
                        "    }",
                        "    ResultSet %'RECORD'%_r%'LEVEL'% = stmt_%'LEVEL'%.getResultSet();",
                        "    if (%'RECORD'%_r%'LEVEL'% == null) {",
                        "      throw new SQL_ERROR(\"no result set\");",
                        "    }",
                        "    %'LABEL'%",
                        "    while (%'RECORD'%_r%'LEVEL'%.next()) {",
                    ])
                    .big(3, "STATEMENTS", "")
                    .line("    }")
                    .lines(SQL_STMT_TAIL)
                    .set("RECORD", record.normalized())
                    .set("LABEL", opt_label(label.as_deref(), level))
                    .set("LEVEL", level.to_string())
                    .fill("SQL", self.expr(sql)?)
                    .fill("SET-USED-EXPR", self.set_used(using)?)
                    .fill("STATEMENTS", self.stmts(stmts)?)
                    .finish()?)
            }
            StmtKind::Exit { label, when } => {
                self.jump(s.pos, "break", label.as_ref(), when.as_ref())
            }
            StmtKind::Continue { label, when } => {
                self.jump(s.pos, "continue", label.as_ref(), when.as_ref())
            }
            StmtKind::Block { decls, body } => self.block(s, decls, body),
            StmtKind::Raise(name) => self.raise(s, name.as_ref()),
            StmtKind::RaiseAppErr { code, msg } => Ok(Template::new("StmtRaiseAppErr", s.pos)
                .line("throw new $APP_ERROR(")
                .big(1, "ERR-CODE", ",")
                .big(1, "ERR-MSG", ");")
                .fill("ERR-CODE", self.expr(code)?)
                .fill("ERR-MSG", self.expr(msg)?)
                .finish()?),
            StmtKind::Commit => transaction(s.pos, "StmtCommit", "commit"),
            StmtKind::Rollback => transaction(s.pos, "StmtRollback", "rollback"),
            StmtKind::OpenCursor { cursor, args } => self.cursor_open(s, cursor, args),
            StmtKind::CloseCursor(cursor) => Ok(Template::new("StmtCursorClose", s.pos)
                .lines(&[
                    "// cursor close",
                    "if (%'CURSOR'% != null && %'CURSOR'%.isOpen()) {",
                    "  %'CURSOR'%.close();",
                    "} else {",
                    "  throw new INVALID_CURSOR(\"tried to close an unopened cursor\");",
                    "}",
                ])
                .set("CURSOR", self.ident_code(cursor)?)
                .finish()?),
            StmtKind::Fetch { cursor, into } => self.fetch(s, cursor, into),
            StmtKind::OpenFor { refcursor, sql } => self.open_for(s, refcursor, sql),
            StmtKind::ExecImme { sql, into, using } => {
                let sql = self.expr(sql)?;
                self.sql_stmt(s, "dynamic", sql.into(), into, IntoSource::Dynamic, using)
            }
            StmtKind::StaticSql(sql) => {
                let source = match self.deco.columns(sql.id) {
                    Some(columns) => IntoSource::Columns(columns),
                    None if sql.into.is_empty() => IntoSource::Columns(&[]),
                    None => return Err(missing("select list", sql.pos)),
                };
                let text = java_string(&sql.text);
                self.sql_stmt(s, "static", text.into(), &sql.into, source, &sql.host_exprs)
            }
        }
    }

    fn assign(&mut self, s: &Stmt, target: &Ident, value: &Expr) -> Result<CodeToResolve> {
        let not_null = self.symbol(target)?.is_not_null();
        let template = if not_null {
            Template::new("StmtAssign", s.pos)
                .line("%'TARGET'% = checkNotNull(")
                .big(1, "VALUE", ", \"NOT NULL constraint violated\");")
        } else {
            Template::new("StmtAssign", s.pos)
                .line("%'TARGET'% =")
                .big(1, "VALUE", ";")
        };
        Ok(template
            .set("TARGET", self.ident_code(target)?)
            .fill("VALUE", self.expr(value)?)
            .finish()?)
    }

    fn if_stmt(
        &mut self,
        s: &Stmt,
        arms: &[CondStmtArm],
        else_part: Option<Substitute>,
    ) -> Result<CodeToResolve> {
        let mut parts = TemplateList::with_delimiter(" else");
        for arm in arms {
            parts.push(
                Template::new("CondStmtPart", Pos::IGNORED)
                    .line("if (Boolean.TRUE.equals(")
                    .big(2, "COND", ")) {")
                    .big(1, "STATEMENTS", "")
                    .line("}")
                    .fill("COND", self.expr(&arm.cond)?)
                    .fill("STATEMENTS", self.stmts(&arm.stmts)?)
                    .finish()?,
            );
        }

        let Some(else_part) = else_part else {
            return Ok(CodeToResolve::List(parts));
        };
        Ok(Template::new("StmtIf", s.pos)
            .big(0, "COND-PARTS", " else {")
            .big(1, "ELSE-PART", "")
            .line("}")
            .fill("COND-PARTS", parts)
            .fill("ELSE-PART", else_part)
            .finish()?)
    }

    fn case_stmt(
        &mut self,
        s: &Stmt,
        selector: &Expr,
        arms: &[CaseStmtArm],
        else_stmts: Option<&[Stmt]>,
    ) -> Result<CodeToResolve> {
        let level = self.level(s)?;
        let selector_ty = self
            .deco
            .selector_type(s.id)
            .ok_or_else(|| missing("selector type", s.pos))?;

        let mut parts = TemplateList::with_delimiter(" else");
        for arm in arms {
            let ext = self.deco.op_extension(arm.id).map_or("", |e| e.suffix());
            parts.push(
                Template::new("CaseStmtPart", Pos::IGNORED)
                    .line("if (Boolean.TRUE.equals(opEq%'OP-EXTENSION'%(selector_%'LEVEL'%,")
                    .big(2, "VALUE", "))) {")
                    .big(1, "STATEMENTS", "")
                    .line("}")
                    .set("OP-EXTENSION", ext)
                    .fill("VALUE", self.expr(&arm.value)?)
                    .fill("STATEMENTS", self.stmts(&arm.stmts)?)
                    .finish()?,
            );
        }
        let else_part: Substitute = match else_stmts {
            Some(stmts) => self.stmts(stmts)?.into(),
            None => case_not_found(s.pos),
        };

        Ok(Template::new("StmtCase", s.pos)
            .lines(&["{", "  %'SELECTOR-TYPE'% selector_%'LEVEL'% ="])
            .big(2, "SELECTOR-VALUE", ";")
            .big(1, "WHEN-PARTS", " else {")
            .big(2, "ELSE-PART", "")
            .lines(&["  }", "}"])
            .set("SELECTOR-TYPE", selector_ty.java_code())
            .set("LEVEL", level.to_string())
            .fill("SELECTOR-VALUE", self.expr(selector)?)
            .fill("WHEN-PARTS", parts)
            .fill("ELSE-PART", else_part)
            .finish()?)
    }

    /// EXIT and CONTINUE, optionally labeled and conditional.
    fn jump(
        &mut self,
        pos: Pos,
        keyword: &str,
        label: Option<&Ident>,
        when: Option<&Expr>,
    ) -> Result<CodeToResolve> {
        let code = match label {
            Some(label) => {
                let symbol = self.symbol(label)?;
                format!("{} {}_{};", keyword, symbol.name, symbol.level)
            }
            None => format!("{};", keyword),
        };
        let Some(when) = when else {
            return Ok(CodeToResolve::text(pos, code));
        };
        Ok(Template::new("StmtJump", pos)
            .line("if (Boolean.TRUE.equals(")
            .big(2, "COND", ")) {")
            .line("  %'JUMP'%")
            .line("}")
            .set("JUMP", code)
            .fill("COND", self.expr(when)?)
            .finish()?)
    }

    fn block(&mut self, s: &Stmt, decls: &[Decl], body: &Body) -> Result<CodeToResolve> {
        let decl_class = self.decl_class(s.id, decls, false)?;
        Ok(Template::new("StmtBlock", s.pos)
            .line("{")
            .big(1, "DECL-CLASS", "")
            .big(1, "BODY", "")
            .line("}")
            .fill("DECL-CLASS", decl_class)
            .fill("BODY", self.body(body)?)
            .finish()?)
    }

    fn raise(&mut self, s: &Stmt, name: Option<&Ident>) -> Result<CodeToResolve> {
        let code = match name {
            None => {
                let level = self
                    .res
                    .handler_level(s.id)
                    .ok_or_else(|| missing("handler level", s.pos))?;
                format!("throw e{};", level)
            }
            Some(name) => {
                let symbol = self.symbol(name)?;
                match symbol.kind {
                    SymbolKind::Exception { predefined: true } => {
                        format!("throw new {}();", symbol.name.to_ascii_uppercase())
                    }
                    _ => format!("throw {}new {}();", self.prefix(symbol), symbol.name),
                }
            }
        };
        Ok(CodeToResolve::text(s.pos, code))
    }

    fn fetch(&mut self, s: &Stmt, cursor: &Ident, into: &[Ident]) -> Result<CodeToResolve> {
        let columns = match self.symbol(cursor)?.kind {
            SymbolKind::Cursor { sql, .. } => self.deco.columns(sql),
            _ => None,
        };

        let mut set_into = Vec::with_capacity(into.len() * 2);
        for (i, target) in into.iter().enumerate() {
            let value = match columns.and_then(|cs| cs.get(i)) {
                Some(column) => format!("({}) rs.getObject({})", column.ty.java_code(), i + 1),
                None => format!("rs.getObject({})", i + 1),
            };
            let coercion = self
                .deco
                .coercion(target.id)
                .ok_or_else(|| missing("coercion", target.pos))?;
            let code = self.ident_code(target)?;
            set_into.push(format!("{} = {};", code, coercion.java_code(&value)));
            set_into.push(format!(
                "if ({0} != null && rs.wasNull()) {{ {0} = null; }}",
                code
            ));
        }

        Ok(Template::new("StmtCursorFetch", s.pos)
            .lines(&[
                "{ // cursor fetch",
                "  if (%'CURSOR'% == null || !%'CURSOR'%.isOpen()) {",
                "    throw new INVALID_CURSOR(\"tried to fetch values with an unopened cursor\");",
                "  }",
                "  ResultSet rs = %'CURSOR'%.rs;",
                "  if (rs.next()) {",
                "    %'CURSOR'%.updateRowCount();",
            ])
            .big(2, "SET-INTO-VARIABLES", "")
            .lines(&["  } else {", "    ;", "  }", "}"])
            .set("CURSOR", self.ident_code(cursor)?)
            .fill("SET-INTO-VARIABLES", set_into)
            .finish()?)
    }

    fn open_for(&mut self, s: &Stmt, refcursor: &Ident, sql: &StaticSql) -> Result<CodeToResolve> {
        let template = Template::new("StmtOpenFor", s.pos)
            .lines(&[
                "{ // open-for statement",
                "  %'REF-CURSOR'% = new Query(%'QUERY'%);",
            ])
            .set("REF-CURSOR", self.ident_code(refcursor)?)
            .set("QUERY", java_string(&sql.text));
        let template = if sql.host_exprs.is_empty() {
            template.line("  %'REF-CURSOR'%.open(conn);")
        } else {
            template
                .line("  %'REF-CURSOR'%.open(conn,")
                .big(2, "HOST-EXPRS", ");")
                .fill("HOST-EXPRS", self.expr_list(&sql.host_exprs)?)
        };
        Ok(template.line("}").finish()?)
    }

    // === SQL ===

    /// `stmt_<level>.setObject(i, value)` for the values bound to a statement.
    fn set_used(&mut self, exprs: &[Expr]) -> Result<Substitute> {
        if exprs.is_empty() {
            return Ok(Substitute::empty());
        }
        let mut list = TemplateList::new();
        for (i, e) in exprs.iter().enumerate() {
            list.push(
                Template::new("SetObject", e.pos)
                    .line("stmt_%'LEVEL'%.setObject(%'INDEX'%,")
                    .big(1, "VALUE", "")
                    .line(");")
                    .set("INDEX", (i + 1).to_string())
                    .fill("VALUE", self.expr(e)?)
                    .finish()?,
            );
        }
        Ok(list.into())
    }

    fn sql_stmt(
        &mut self,
        s: &Stmt,
        kind: &str,
        sql: Substitute,
        into: &[Ident],
        source: IntoSource<'_>,
        used: &[Expr],
    ) -> Result<CodeToResolve> {
        // one past the scope level, clear of the loop statements around
        let level = self.level(s)? + 1;

        let (ban_into, handle_into) = if into.is_empty() {
            (Substitute::empty(), Substitute::empty())
        } else {
            let handle = Template::new("HandleIntoClause", Pos::IGNORED)
                .lines(&[
                    "ResultSet r%'LEVEL'% = stmt_%'LEVEL'%.getResultSet();",
                    "if (r%'LEVEL'% == null) {",
                    "  throw new SQL_ERROR(\"no result set\");",
                    "}",
                    "int i%'LEVEL'% = 0;",
                    "while (r%'LEVEL'%.next()) {",
                    "  i%'LEVEL'%++;",
                    "  if (i%'LEVEL'% > 1) {",
                    "    break;",
                    "  } else {",
                ])
                .big(2, "SET-RESULTS", "")
                .lines(&[
                    "  }",
                    "}",
                    "if (i%'LEVEL'% == 0) {",
                    "  throw new NO_DATA_FOUND();",
                    "} else if (i%'LEVEL'% == 1) {",
                    "  sql_rowcount[0] = 1L;",
                    "} else {",
                    "  sql_rowcount[0] = 1L;",
                    "  throw new TOO_MANY_ROWS();",
                    "}",
                ])
                .fill("SET-RESULTS", self.set_results(s, into, source)?)
                .finish()?;
            let ban: Vec<String> = [
                "ResultSetMetaData rsmd_%'LEVEL'% = stmt_%'LEVEL'%.getMetaData();",
                "if (rsmd_%'LEVEL'% == null || rsmd_%'LEVEL'%.getColumnCount() < 1) {",
                "  throw new SQL_ERROR(\"INTO clause must be used with a SELECT statement\");",
                "}",
            ]
            .iter()
            .map(|l| l.to_string())
            .collect();
            (ban.into(), handle.into())
        };

        Ok(Template::new("StmtSql", s.pos)
            .lines(&[
                "{ // %'KIND'% SQL statement",
                "  PreparedStatement stmt_%'LEVEL'% = null;",
                "  try {",
                "    String dynSql_%'LEVEL'% = checkNotNull(",
            ])
            .big(3, "SQL", ", \"SQL part was evaluated to NULL\");")
            .line("    stmt_%'LEVEL'% = conn.prepareStatement(dynSql_%'LEVEL'%);")
            .big(2, "BAN-INTO-CLAUSE", "")
            .big(2, "SET-USED-EXPR", "")
            .lines(&["    if (stmt_%'LEVEL'%.execute()) {", "      sql_rowcount[0] = 0L;"])
            .big(3, "HANDLE-INTO-CLAUSE", "")
            .lines(&[
                "    } else {",
                "      sql_rowcount[0] = (long) stmt_%'LEVEL'%.getUpdateCount();",
                "    }",
            ])
            .lines(SQL_STMT_TAIL)
            .set("KIND", kind)
            .set("LEVEL", level.to_string())
            .fill("SQL", sql)
            .fill("BAN-INTO-CLAUSE", ban_into)
            .fill("SET-USED-EXPR", self.set_used(used)?)
            .fill("HANDLE-INTO-CLAUSE", handle_into)
            .finish()?)
    }

    fn set_results(&self, s: &Stmt, into: &[Ident], source: IntoSource<'_>) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(into.len() * 3);
        for (i, target) in into.iter().enumerate() {
            let value = match source {
                IntoSource::Dynamic => format!("r%'LEVEL'%.getObject({})", i + 1),
                IntoSource::Columns(columns) => {
                    let column = columns.get(i).ok_or_else(|| missing("select list", s.pos))?;
                    format!("({}) r%'LEVEL'%.getObject({})", column.ty.java_code(), i + 1)
                }
            };
            let coercion = self
                .deco
                .coercion(target.id)
                .ok_or_else(|| missing("coercion", target.pos))?;
            let code = self.ident_code(target)?;
            lines.push(format!("{} = {};", code, coercion.java_code(&value)));
            lines.push(format!(
                "if ({0} != null && r%'LEVEL'%.wasNull()) {{ {0} = null; }}",
                code
            ));
            if self.symbol(target)?.is_not_null() {
                lines.push(format!(
                    "checkNotNull({}, \"NOT NULL constraint violated\");",
                    code
                ));
            }
        }
        Ok(lines)
    }

    // === Cursors ===

    fn cursor_open(&mut self, s: &Stmt, cursor: &Ident, args: &[Expr]) -> Result<CodeToResolve> {
        let symbol = self.symbol(cursor)?;
        let sql = self.cursor_sql(symbol, cursor.pos)?;
        let template = Template::new("StmtCursorOpen", s.pos)
            .line("{ // cursor open")
            .set("CURSOR", self.ident_code(cursor)?);
        let template = if sql.host_exprs.is_empty() {
            template.line("  %'CURSOR'%.open(conn);")
        } else {
            let (dup_args, host_exprs) = self.cursor_host_exprs(symbol, sql, args)?;
            template
                .big(1, "DUPLICATE-CURSOR-ARG", "")
                .line("  %'CURSOR'%.open(conn, new Object[] {")
                .big(2, "HOST-EXPRS", "});")
                .set("LEVEL", (self.level(s)? + 1).to_string())
                .fill("DUPLICATE-CURSOR-ARG", dup_args)
                .fill("HOST-EXPRS", host_exprs)
        };
        Ok(template.line("}").finish()?)
    }

    fn for_cursor(
        &mut self,
        s: &Stmt,
        label: Option<&str>,
        record: &Ident,
        cursor: &Ident,
        args: &[Expr],
        stmts: &[Stmt],
    ) -> Result<CodeToResolve> {
        let level = self.level(s)?;
        let symbol = self.symbol(cursor)?;
        let sql = self.cursor_sql(symbol, cursor.pos)?;

        let template = Template::new("StmtForCursorLoop", s.pos).line("try { // for loop with a cursor");
        let template = if sql.host_exprs.is_empty() {
            template.line("  %'CURSOR'%.open(conn);")
        } else {
            let (dup_args, host_exprs) = self.cursor_host_exprs(symbol, sql, args)?;
            template
                .big(1, "DUPLICATE-CURSOR-ARG", "")
                .line("  %'CURSOR'%.open(conn,")
                .big(2, "HOST-EXPRS", ");")
                .fill("DUPLICATE-CURSOR-ARG", dup_args)
                .fill("HOST-EXPRS", host_exprs)
        };
        Ok(template
            .lines(&[
                "  ResultSet %'RECORD'%_r%'LEVEL'% = %'CURSOR'%.rs;",
                "  %'LABEL'%",
                "  while (%'RECORD'%_r%'LEVEL'%.next()) {",
                "    %'CURSOR'%.updateRowCount();",
            ])
            .big(2, "STATEMENTS", "")
            .lines(&["  }", "  %'CURSOR'%.close();"])
            .lines(SQL_ERROR_CATCH)
            .set("CURSOR", self.ident_code(cursor)?)
            .set("RECORD", record.normalized())
            .set("LABEL", opt_label(label, level))
            .set("LEVEL", level.to_string())
            .fill("STATEMENTS", self.stmts(stmts)?)
            .finish()?)
    }

    fn cursor_sql(&self, symbol: &Symbol, pos: Pos) -> Result<&'a StaticSql> {
        symbol
            .decl
            .and_then(|decl| self.cursors.get(&decl).copied())
            .ok_or_else(|| missing("cursor query", pos))
    }

    /// Values for the host expressions of a cursor's query. A host
    /// expression naming a cursor parameter takes the matching argument;
    /// an argument used more than once is evaluated once into
    /// `a<index>_<level>`.
    fn cursor_host_exprs(
        &self,
        cursor: &Symbol,
        sql: &StaticSql,
        args: &[Expr],
    ) -> Result<(Substitute, TemplateList)> {
        let param_of = |e: &Expr| match &e.kind {
            ExprKind::Id(ident) => match self.res.referenced(ident.id).map(|s| &s.kind) {
                Some(SymbolKind::CursorParam {
                    cursor: owner,
                    index,
                    ..
                }) if *owner == cursor.id => Some(*index),
                _ => None,
            },
            _ => None,
        };
        let params: Vec<Option<usize>> = sql.host_exprs.iter().map(param_of).collect();
        let mut ref_counts = vec![0usize; args.len()];
        for index in params.iter().flatten() {
            if let Some(count) = ref_counts.get_mut(*index) {
                *count += 1;
            }
        }

        let mut dup_args = TemplateList::new();
        for (k, arg) in args.iter().enumerate() {
            if ref_counts[k] > 1 {
                dup_args.push(
                    Template::new("DupCursorArg", Pos::IGNORED)
                        .line("Object a%'INDEX'%_%'LEVEL'% =")
                        .big(1, "ARG", ";")
                        .set("INDEX", k.to_string())
                        .fill("ARG", self.expr(arg)?)
                        .finish()?,
                );
            }
        }

        let mut host_exprs = TemplateList::with_delimiter(",");
        for (e, param) in sql.host_exprs.iter().zip(params) {
            let code = match param {
                Some(k) if ref_counts[k] > 1 => {
                    CodeToResolve::text(Pos::IGNORED, format!("a{}_%'LEVEL'%", k))
                }
                Some(k) => {
                    let arg = args.get(k).ok_or_else(|| missing("cursor argument", e.pos))?;
                    self.expr(arg)?
                }
                None => self.expr(e)?,
            };
            host_exprs.push(code);
        }

        let dup_args = if dup_args.is_empty() {
            Substitute::empty()
        } else {
            dup_args.into()
        };
        Ok((dup_args, host_exprs))
    }

    // === Calls ===

    /// Procedure call, or function call when `as_stmt` is false.
    pub(crate) fn call(
        &self,
        pos: Pos,
        name: &Ident,
        args: &[Expr],
        as_stmt: bool,
    ) -> Result<CodeToResolve> {
        let symbol = self.symbol(name)?;
        let sig = symbol.routine().ok_or_else(|| missing("routine", name.pos))?;
        match sig.origin {
            RoutineOrigin::Local | RoutineOrigin::DbmsOutput => {
                self.local_call(pos, symbol, sig, args, as_stmt)
            }
            RoutineOrigin::External => self.global_call(pos, sig, args, as_stmt),
        }
    }
}

const SQL_STMT_TAIL: &[&str] = &[
    "  } catch (SQLException e) {",
    "    Server.log(e);",
    "    throw new SQL_ERROR(e.getMessage());",
    "  } finally {",
    "    if (stmt_%'LEVEL'% != null) {",
    "      stmt_%'LEVEL'%.close();",
    "    }",
    "  }",
    "}",
];

fn opt_label(label: Option<&str>, level: u32) -> String {
    label.map_or_else(String::new, |l| {
        format!("{}_{}:", l.to_ascii_lowercase(), level)
    })
}

fn case_not_found(pos: Pos) -> Substitute {
    CodeToResolve::text(pos, "throw new CASE_NOT_FOUND();").into()
}

fn transaction(pos: Pos, label: &'static str, method: &str) -> Result<CodeToResolve> {
    Ok(Template::new(label, pos)
        .lines(&["try {", "  conn.%'METHOD'%();", "  sql_rowcount[0] = 0L;"])
        .lines(SQL_ERROR_CATCH)
        .set("METHOD", method)
        .finish()?)
}
