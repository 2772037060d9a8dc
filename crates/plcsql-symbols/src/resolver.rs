//! Scoped name resolution over one unit
//!
//! Levels: 0 holds predefined names, 1 the unit routine itself, 2 the
//! unit routine's parameters and declarations. Every routine, block, loop
//! and CASE statement opens a scope one level deeper.

use crate::predefined::{
    dbms_output_procedures, is_builtin_function, is_no_paren_builtin, OTHERS,
    PREDEFINED_EXCEPTIONS,
};
use crate::{
    ParamSig, RecordSource, Resolution, RoutineOrigin, RoutineSig, Symbol, SymbolError, SymbolId,
    SymbolKind,
};
use plcsql_ast::*;
use plcsql_types::Type;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, SymbolError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Predefined,
    Unit,
    Routine,
    Block,
    Loop,
    Other,
}

struct Scope {
    kind: ScopeKind,
    level: u32,
    names: HashMap<String, SymbolId>,
    labels: HashMap<String, SymbolId>,
    /// Name of the declaration block, for scopes with a declaration section
    block: Option<String>,
}

pub(crate) struct Resolver {
    table: Resolution,
    scopes: Vec<Scope>,
    /// Levels of the exception handlers enclosing the current statement
    handlers: Vec<u32>,
    /// Set while resolving a whole host expression of a cursor's SQL
    cursor_param_ok: bool,
}

impl Resolver {
    pub(crate) fn new() -> Self {
        Self {
            table: Resolution::new(),
            scopes: Vec::new(),
            handlers: Vec::new(),
            cursor_param_ok: false,
        }
    }

    pub(crate) fn run(mut self, unit: &Unit) -> Result<Resolution> {
        self.push_scope(ScopeKind::Predefined, "predefined");
        self.add_predefined(&unit.external_routines)?;

        self.push_scope(ScopeKind::Unit, "unit");
        let id = self.routine(&unit.routine)?;
        self.table.set_unit_routine(id);
        self.pop_scope();

        tracing::debug!(
            routine = %unit.routine.name,
            symbols = self.table.len(),
            "names resolved"
        );
        Ok(self.table)
    }

    // === Scopes ===

    fn level(&self) -> u32 {
        self.scopes.last().map_or(0, |s| s.level)
    }

    fn push_scope(&mut self, kind: ScopeKind, name: &str) -> u32 {
        let level = self.scopes.len() as u32;
        let block = match kind {
            ScopeKind::Routine | ScopeKind::Block => Some(format!("{}_{}", name, level)),
            _ => None,
        };
        self.scopes.push(Scope {
            kind,
            level,
            names: HashMap::new(),
            labels: HashMap::new(),
            block,
        });
        level
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn current_block(&self) -> Option<String> {
        self.scopes.last().and_then(|s| s.block.clone())
    }

    fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        decl: Option<NodeId>,
        in_block: bool,
        pos: Pos,
    ) -> Result<SymbolId> {
        let key = name.to_ascii_lowercase();
        let block = if in_block { self.current_block() } else { None };
        let level = self.level();
        let Some(scope) = self.scopes.last() else {
            return Err(SymbolError::Undeclared { name: key, pos });
        };
        if scope.names.contains_key(&key) {
            return Err(SymbolError::Duplicate {
                name: name.to_string(),
                pos,
            });
        }

        let id = self.table.add(Symbol {
            id: SymbolId(0),
            name: key.clone(),
            kind,
            level,
            block,
            decl,
            pos,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.names.insert(key, id);
        }
        tracing::trace!(name, level, "declared");
        Ok(id)
    }

    fn declare_label(&mut self, label: &Option<String>, pos: Pos) {
        let Some(label) = label else { return };
        let key = label.to_ascii_lowercase();
        let id = self.table.add(Symbol {
            id: SymbolId(0),
            name: key.clone(),
            kind: SymbolKind::Label,
            level: self.level(),
            block: None,
            decl: None,
            pos,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.labels.insert(key, id);
        }
    }

    fn lookup(&self, key: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.names.get(key).copied())
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.table.get(id)
    }

    /// Scopes of the routine being resolved, innermost first.
    fn routine_scopes(&self) -> impl Iterator<Item = &Scope> {
        let mut done = false;
        self.scopes.iter().rev().take_while(move |s| {
            let take = !done;
            done = done || s.kind == ScopeKind::Routine;
            take
        })
    }

    // === Predefined names ===

    fn add_predefined(&mut self, externals: &[ExternalRoutine]) -> Result<()> {
        for name in PREDEFINED_EXCEPTIONS {
            self.declare(
                name,
                SymbolKind::Exception { predefined: true },
                None,
                false,
                Pos::IGNORED,
            )?;
        }
        for (key, sig) in dbms_output_procedures() {
            self.declare(&key, SymbolKind::Routine(sig), None, false, Pos::IGNORED)?;
        }
        for ext in externals {
            let sig = RoutineSig {
                name: ext.name.clone(),
                kind: ext.kind,
                params: ext
                    .params
                    .iter()
                    .map(|p| ParamSig {
                        name: p.name.clone(),
                        mode: p.mode,
                        ty: Type::from_sql_type(&p.ty),
                    })
                    .collect(),
                ret: ext.ret_type.as_ref().map(Type::from_sql_type),
                origin: RoutineOrigin::External,
            };
            self.declare(&ext.name, SymbolKind::Routine(sig), None, false, Pos::IGNORED)?;
        }
        Ok(())
    }

    // === Types ===

    fn type_spec(&mut self, spec: &TypeSpec) -> Result<Type> {
        match spec {
            TypeSpec::Simple(sql) => Ok(Type::from_sql_type(sql)),
            TypeSpec::Percent(ident) => {
                let id = self.lookup(&ident.normalized()).ok_or_else(|| {
                    SymbolError::Undeclared {
                        name: ident.name.clone(),
                        pos: ident.pos,
                    }
                })?;
                let ty = match self.symbol(id).map(|s| &s.kind) {
                    Some(
                        SymbolKind::Var { ty, .. }
                        | SymbolKind::Const { ty, .. }
                        | SymbolKind::Param { ty, .. },
                    ) => *ty,
                    _ => {
                        return Err(SymbolError::BadPercentType {
                            name: ident.name.clone(),
                            pos: ident.pos,
                        })
                    }
                };
                self.table.bind(ident.id, id);
                Ok(ty)
            }
        }
    }

    // === Routines and declarations ===

    fn routine_sig(&mut self, r: &Routine) -> Result<RoutineSig> {
        let mut params = Vec::with_capacity(r.params.len());
        for p in &r.params {
            params.push(ParamSig {
                name: p.name.to_ascii_lowercase(),
                mode: p.mode,
                ty: self.type_spec(&p.type_spec)?,
            });
        }
        let ret = match &r.ret_type {
            Some(spec) => Some(self.type_spec(spec)?),
            None => None,
        };
        Ok(RoutineSig {
            name: r.name.to_ascii_lowercase(),
            kind: r.kind,
            params,
            ret,
            origin: RoutineOrigin::Local,
        })
    }

    /// Declare a routine in the current scope and resolve its body.
    fn routine(&mut self, r: &Routine) -> Result<SymbolId> {
        let sig = self.routine_sig(r)?;
        let in_block = self.scopes.last().map(|s| s.kind) != Some(ScopeKind::Unit);
        let id = self.declare(
            &r.name,
            SymbolKind::Routine(sig.clone()),
            Some(r.id),
            in_block,
            r.pos,
        )?;

        let saved_handlers = std::mem::take(&mut self.handlers);
        let level = self.push_scope(ScopeKind::Routine, &sig.name);
        self.table
            .set_block_name(r.id, format!("{}_{}", sig.name, level));
        for (p, ps) in r.params.iter().zip(&sig.params) {
            self.declare(
                &p.name,
                SymbolKind::Param {
                    ty: ps.ty,
                    mode: p.mode,
                },
                Some(p.id),
                false,
                p.pos,
            )?;
        }
        self.decls(&r.decls)?;
        self.body(&r.body)?;
        self.pop_scope();
        self.handlers = saved_handlers;
        Ok(id)
    }

    fn decls(&mut self, decls: &[Decl]) -> Result<()> {
        for d in decls {
            self.decl(d)?;
        }
        Ok(())
    }

    fn decl(&mut self, d: &Decl) -> Result<()> {
        match &d.kind {
            DeclKind::Var {
                name,
                type_spec,
                not_null,
                init,
            } => {
                let ty = self.type_spec(type_spec)?;
                if let Some(init) = init {
                    self.expr(init)?;
                }
                let kind = SymbolKind::Var {
                    ty,
                    not_null: *not_null,
                };
                self.declare(name, kind, Some(d.id), true, d.pos)?;
            }
            DeclKind::Const {
                name,
                type_spec,
                not_null,
                value,
            } => {
                let ty = self.type_spec(type_spec)?;
                self.expr(value)?;
                let kind = SymbolKind::Const {
                    ty,
                    not_null: *not_null,
                };
                self.declare(name, kind, Some(d.id), true, d.pos)?;
            }
            DeclKind::Cursor { name, params, sql } => self.cursor_decl(d, name, params, sql)?,
            DeclKind::Exception { name } => {
                let kind = SymbolKind::Exception { predefined: false };
                self.declare(name, kind, Some(d.id), true, d.pos)?;
            }
            DeclKind::Procedure(r) | DeclKind::Function(r) => {
                self.routine(r)?;
            }
        }
        Ok(())
    }

    fn cursor_decl(&mut self, d: &Decl, name: &str, params: &[Param], sql: &StaticSql) -> Result<()> {
        let mut types = Vec::with_capacity(params.len());
        for p in params {
            types.push(self.type_spec(&p.type_spec)?);
        }
        let cursor = self.declare(
            name,
            SymbolKind::Cursor {
                params: types.clone(),
                param_symbols: Vec::new(),
                sql: sql.id,
            },
            Some(d.id),
            true,
            d.pos,
        )?;

        self.push_scope(ScopeKind::Other, "cursor_def");
        let mut param_symbols = Vec::with_capacity(params.len());
        for (index, (p, ty)) in params.iter().zip(types).enumerate() {
            let kind = SymbolKind::CursorParam { ty, cursor, index };
            param_symbols.push(self.declare(&p.name, kind, Some(p.id), false, p.pos)?);
        }
        for host in &sql.host_exprs {
            if let ExprKind::Id(ident) = &host.kind {
                self.cursor_param_ok = true;
                let r = self.value_ident(ident);
                self.cursor_param_ok = false;
                r?;
            } else {
                self.expr(host)?;
            }
        }
        self.pop_scope();

        if let Some(SymbolKind::Cursor {
            param_symbols: slot,
            ..
        }) = self.table.kind_mut(cursor)
        {
            *slot = param_symbols;
        }
        Ok(())
    }

    // === Statements ===

    fn body(&mut self, body: &Body) -> Result<()> {
        self.stmts(&body.stmts)?;
        let level = self.level();
        for h in &body.handlers {
            self.table.set_level(h.id, level);
            for name in &h.names {
                if name.name.eq_ignore_ascii_case(OTHERS) {
                    continue;
                }
                self.exception(name)?;
            }
            self.handlers.push(level);
            let r = self.stmts(&h.stmts);
            self.handlers.pop();
            r?;
        }
        Ok(())
    }

    fn stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for s in stmts {
            self.stmt(s)?;
        }
        Ok(())
    }

    /// Resolve `stmts` in a fresh scope opened by `s`.
    fn scoped<F>(&mut self, s: &Stmt, kind: ScopeKind, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let level = self.push_scope(kind, name);
        self.table.set_level(s.id, level);
        let r = f(self);
        self.pop_scope();
        r
    }

    fn stmt(&mut self, s: &Stmt) -> Result<()> {
        self.table.set_level(s.id, self.level());
        match &s.kind {
            StmtKind::Null | StmtKind::Commit | StmtKind::Rollback => Ok(()),
            StmtKind::Assign { target, value } => {
                self.assign_target(target)?;
                self.expr(value)
            }
            StmtKind::Call { name, args } => self.call(name, args, true),
            StmtKind::Return(value) => self.opt_expr(value.as_ref()),
            StmtKind::If { arms, else_stmts } | StmtKind::SearchedCase { arms, else_stmts } => {
                for arm in arms {
                    self.expr(&arm.cond)?;
                    self.stmts(&arm.stmts)?;
                }
                self.opt_stmts(else_stmts.as_deref())
            }
            StmtKind::Case {
                selector,
                arms,
                else_stmts,
            } => {
                self.expr(selector)?;
                self.scoped(s, ScopeKind::Other, "case_stmt", |r| {
                    for arm in arms {
                        r.expr(&arm.value)?;
                        r.stmts(&arm.stmts)?;
                    }
                    r.opt_stmts(else_stmts.as_deref())
                })
            }
            StmtKind::Loop { label, stmts } => self.scoped(s, ScopeKind::Loop, "loop", |r| {
                r.declare_label(label, s.pos);
                r.stmts(stmts)
            }),
            StmtKind::While { label, cond, stmts } => {
                self.scoped(s, ScopeKind::Loop, "while", |r| {
                    r.declare_label(label, s.pos);
                    r.expr(cond)?;
                    r.stmts(stmts)
                })
            }
            StmtKind::ForIter {
                label,
                iter,
                lower,
                upper,
                step,
                stmts,
                ..
            } => {
                self.expr(lower)?;
                self.expr(upper)?;
                self.opt_expr(step.as_ref())?;
                self.scoped(s, ScopeKind::Loop, "for_iter", |r| {
                    r.declare_label(label, s.pos);
                    let id = r.declare(&iter.name, SymbolKind::Iterator, None, false, iter.pos)?;
                    r.table.bind(iter.id, id);
                    r.stmts(stmts)
                })
            }
            StmtKind::ForCursor {
                label,
                record,
                cursor,
                args,
                stmts,
            } => {
                let cursor_id = self.explicit_cursor(cursor, args.len())?;
                self.exprs(args)?;
                self.scoped(s, ScopeKind::Loop, "for_cursor_loop", |r| {
                    r.declare_label(label, s.pos);
                    r.record(record, RecordSource::Cursor(cursor_id))?;
                    r.stmts(stmts)
                })
            }
            StmtKind::ForStaticSql {
                label,
                record,
                sql,
                stmts,
            } => {
                self.static_sql(sql)?;
                self.scoped(s, ScopeKind::Loop, "for_s_sql_loop", |r| {
                    r.declare_label(label, s.pos);
                    r.record(record, RecordSource::StaticSql(sql.id))?;
                    r.stmts(stmts)
                })
            }
            StmtKind::ForDynamicSql {
                label,
                record,
                sql,
                using,
                stmts,
            } => {
                self.expr(sql)?;
                self.exprs(using)?;
                self.scoped(s, ScopeKind::Loop, "for_d_sql_loop", |r| {
                    r.declare_label(label, s.pos);
                    r.record(record, RecordSource::DynamicSql)?;
                    r.stmts(stmts)
                })
            }
            StmtKind::Exit { label, when } => {
                self.loop_exit("EXIT", label.as_ref(), s.pos)?;
                self.opt_expr(when.as_ref())
            }
            StmtKind::Continue { label, when } => {
                self.loop_exit("CONTINUE", label.as_ref(), s.pos)?;
                self.opt_expr(when.as_ref())
            }
            StmtKind::Block { decls, body } => {
                let level = self.push_scope(ScopeKind::Block, "block");
                self.table.set_level(s.id, level);
                self.table.set_block_name(s.id, format!("block_{}", level));
                let r = self.decls(decls).and_then(|_| self.body(body));
                self.pop_scope();
                r
            }
            StmtKind::Raise(Some(name)) => self.exception(name),
            StmtKind::Raise(None) => match self.handlers.last() {
                Some(level) => {
                    self.table.set_handler_level(s.id, *level);
                    Ok(())
                }
                None => Err(SymbolError::RaiseOutsideHandler { pos: s.pos }),
            },
            StmtKind::RaiseAppErr { code, msg } => {
                self.expr(code)?;
                self.expr(msg)
            }
            StmtKind::OpenCursor { cursor, args } => {
                self.explicit_cursor(cursor, args.len())?;
                self.exprs(args)
            }
            StmtKind::CloseCursor(cursor) => self.any_cursor(cursor),
            StmtKind::Fetch { cursor, into } => {
                self.any_cursor(cursor)?;
                for target in into {
                    self.assign_target(target)?;
                }
                Ok(())
            }
            StmtKind::OpenFor { refcursor, sql } => {
                let id = self.expect_symbol(refcursor)?;
                if !self.symbol(id).is_some_and(|s| s.is_ref_cursor()) {
                    return Err(SymbolError::NotARefCursor {
                        name: refcursor.name.clone(),
                        pos: refcursor.pos,
                    });
                }
                self.table.bind(refcursor.id, id);
                self.static_sql(sql)
            }
            StmtKind::ExecImme { sql, into, using } => {
                self.expr(sql)?;
                for target in into {
                    self.assign_target(target)?;
                }
                self.exprs(using)
            }
            StmtKind::StaticSql(sql) => self.static_sql(sql),
        }
    }

    fn opt_stmts(&mut self, stmts: Option<&[Stmt]>) -> Result<()> {
        match stmts {
            Some(stmts) => self.stmts(stmts),
            None => Ok(()),
        }
    }

    fn record(&mut self, record: &Ident, source: RecordSource) -> Result<()> {
        let id = self.declare(
            &record.name,
            SymbolKind::Record(source),
            None,
            false,
            record.pos,
        )?;
        self.table.bind(record.id, id);
        Ok(())
    }

    fn loop_exit(&mut self, keyword: &'static str, label: Option<&Ident>, pos: Pos) -> Result<()> {
        if !self.routine_scopes().any(|s| s.kind == ScopeKind::Loop) {
            return Err(SymbolError::OutsideLoop { keyword, pos });
        }
        if let Some(label) = label {
            let key = label.normalized();
            let found = self
                .routine_scopes()
                .find_map(|s| s.labels.get(&key).copied());
            match found {
                Some(id) => self.table.bind(label.id, id),
                None => {
                    return Err(SymbolError::UndeclaredLabel {
                        name: label.name.clone(),
                        pos: label.pos,
                    })
                }
            }
        }
        Ok(())
    }

    fn static_sql(&mut self, sql: &StaticSql) -> Result<()> {
        self.exprs(&sql.host_exprs)?;
        for target in &sql.into {
            self.assign_target(target)?;
        }
        Ok(())
    }

    // === Identifier uses ===

    fn expect_symbol(&self, ident: &Ident) -> Result<SymbolId> {
        self.lookup(&ident.normalized())
            .ok_or_else(|| SymbolError::Undeclared {
                name: ident.name.clone(),
                pos: ident.pos,
            })
    }

    fn exception(&mut self, name: &Ident) -> Result<()> {
        let id = self.expect_symbol(name)?;
        if !self
            .symbol(id)
            .is_some_and(|s| matches!(s.kind, SymbolKind::Exception { .. }))
        {
            return Err(SymbolError::NotAnException {
                name: name.name.clone(),
                pos: name.pos,
            });
        }
        self.table.bind(name.id, id);
        Ok(())
    }

    fn assign_target(&mut self, target: &Ident) -> Result<()> {
        let id = self.expect_symbol(target)?;
        if !self.symbol(id).is_some_and(|s| s.is_assignable()) {
            return Err(SymbolError::NotAssignable {
                name: target.name.clone(),
                pos: target.pos,
            });
        }
        self.table.bind(target.id, id);
        Ok(())
    }

    /// A cursor declared with CURSOR ... IS, opened with `argc` arguments.
    fn explicit_cursor(&mut self, cursor: &Ident, argc: usize) -> Result<SymbolId> {
        let id = self.expect_symbol(cursor)?;
        match self.symbol(id).map(|s| &s.kind) {
            Some(SymbolKind::Cursor { params, .. }) => {
                if params.len() != argc {
                    return Err(SymbolError::ArgumentCount {
                        name: cursor.name.clone(),
                        expected: params.len(),
                        found: argc,
                        pos: cursor.pos,
                    });
                }
            }
            _ => {
                return Err(SymbolError::NotACursor {
                    name: cursor.name.clone(),
                    pos: cursor.pos,
                })
            }
        }
        self.table.bind(cursor.id, id);
        Ok(id)
    }

    /// An explicit cursor or a SYS_REFCURSOR variable.
    fn any_cursor(&mut self, cursor: &Ident) -> Result<()> {
        let id = self.expect_symbol(cursor)?;
        let ok = self.symbol(id).is_some_and(|s| {
            matches!(s.kind, SymbolKind::Cursor { .. }) || s.is_ref_cursor()
        });
        if !ok {
            return Err(SymbolError::NotACursor {
                name: cursor.name.clone(),
                pos: cursor.pos,
            });
        }
        self.table.bind(cursor.id, id);
        Ok(())
    }

    fn value_ident(&mut self, ident: &Ident) -> Result<()> {
        let key = ident.normalized();
        let Some(id) = self.lookup(&key) else {
            let upper = key.to_ascii_uppercase();
            if is_no_paren_builtin(&upper) {
                self.table.bind_builtin(ident.id, upper);
                return Ok(());
            }
            return Err(SymbolError::Undeclared {
                name: ident.name.clone(),
                pos: ident.pos,
            });
        };

        let Some(symbol) = self.symbol(id) else {
            return Err(SymbolError::Undeclared {
                name: ident.name.clone(),
                pos: ident.pos,
            });
        };
        match &symbol.kind {
            SymbolKind::Var { .. }
            | SymbolKind::Const { .. }
            | SymbolKind::Param { .. }
            | SymbolKind::Iterator => {}
            SymbolKind::CursorParam { .. } => {
                if !self.cursor_param_ok {
                    return Err(SymbolError::CursorParamMisuse {
                        name: ident.name.clone(),
                        pos: ident.pos,
                    });
                }
            }
            SymbolKind::Routine(sig) if sig.is_procedure() => {
                return Err(SymbolError::NotAFunction {
                    name: ident.name.clone(),
                    pos: ident.pos,
                })
            }
            SymbolKind::Routine(sig) => {
                if !sig.params.is_empty() {
                    return Err(SymbolError::ArgumentCount {
                        name: ident.name.clone(),
                        expected: sig.params.len(),
                        found: 0,
                        pos: ident.pos,
                    });
                }
            }
            _ => {
                return Err(SymbolError::NotAValue {
                    name: ident.name.clone(),
                    pos: ident.pos,
                })
            }
        }
        self.table.bind(ident.id, id);
        Ok(())
    }

    fn call(&mut self, name: &Ident, args: &[Expr], as_stmt: bool) -> Result<()> {
        let key = name.normalized();
        let wrong_kind = || {
            if as_stmt {
                SymbolError::NotAProcedure {
                    name: name.name.clone(),
                    pos: name.pos,
                }
            } else {
                SymbolError::NotAFunction {
                    name: name.name.clone(),
                    pos: name.pos,
                }
            }
        };

        let Some(id) = self.lookup(&key) else {
            let upper = key.to_ascii_uppercase();
            if !as_stmt && is_builtin_function(&upper) {
                self.table.bind_builtin(name.id, upper);
                return self.exprs(args);
            }
            return Err(SymbolError::Undeclared {
                name: name.name.clone(),
                pos: name.pos,
            });
        };

        let modes = match self.symbol(id).and_then(|s| s.routine()) {
            Some(sig) if sig.is_procedure() == as_stmt => {
                if sig.params.len() != args.len() {
                    return Err(SymbolError::ArgumentCount {
                        name: name.name.clone(),
                        expected: sig.params.len(),
                        found: args.len(),
                        pos: name.pos,
                    });
                }
                sig.params.iter().map(|p| p.mode).collect::<Vec<_>>()
            }
            _ => return Err(wrong_kind()),
        };
        self.table.bind(name.id, id);

        for (arg, mode) in args.iter().zip(modes) {
            match &arg.kind {
                ExprKind::Id(ident) if mode.is_out() => self.assign_target(ident)?,
                _ => self.expr(arg)?,
            }
        }
        Ok(())
    }

    // === Expressions ===

    fn exprs(&mut self, exprs: &[Expr]) -> Result<()> {
        for e in exprs {
            self.expr(e)?;
        }
        Ok(())
    }

    fn opt_expr(&mut self, e: Option<&Expr>) -> Result<()> {
        match e {
            Some(e) => self.expr(e),
            None => Ok(()),
        }
    }

    fn expr(&mut self, e: &Expr) -> Result<()> {
        match &e.kind {
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
            | ExprKind::Serial { .. } => Ok(()),
            ExprKind::Id(ident) => self.value_ident(ident),
            ExprKind::Field { record, .. } => {
                let id = self.expect_symbol(record)?;
                if !self
                    .symbol(id)
                    .is_some_and(|s| matches!(s.kind, SymbolKind::Record(_)))
                {
                    return Err(SymbolError::NotARecord {
                        name: record.name.clone(),
                        pos: record.pos,
                    });
                }
                self.table.bind(record.id, id);
                Ok(())
            }
            ExprKind::CursorAttr { cursor, .. } => self.any_cursor(cursor),
            ExprKind::Unary { operand, .. } => self.expr(operand),
            ExprKind::Binary { left, right, .. } => {
                self.expr(left)?;
                self.expr(right)
            }
            ExprKind::Between {
                target,
                lower,
                upper,
            } => {
                self.expr(target)?;
                self.expr(lower)?;
                self.expr(upper)
            }
            ExprKind::In { target, elements } => {
                self.expr(target)?;
                self.exprs(elements)
            }
            ExprKind::Like {
                target, pattern, ..
            } => {
                self.expr(target)?;
                self.expr(pattern)
            }
            ExprKind::Case {
                selector,
                arms,
                else_expr,
            } => {
                self.expr(selector)?;
                for arm in arms {
                    self.expr(&arm.value)?;
                    self.expr(&arm.result)?;
                }
                self.opt_expr(else_expr.as_deref())
            }
            ExprKind::Cond { arms, else_expr } => {
                for arm in arms {
                    self.expr(&arm.cond)?;
                    self.expr(&arm.result)?;
                }
                self.opt_expr(else_expr.as_deref())
            }
            ExprKind::Call { name, args } => self.call(name, args, false),
        }
    }
}
