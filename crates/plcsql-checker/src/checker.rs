//! Type checking walk over a resolved unit
//!
//! Pre-order and fail-fast: children are checked before the rule of their
//! parent, and the first violation is returned.

use crate::decorations::{Column, Decorations, OpExtension};
use crate::error::SemanticError;
use crate::oracle::{SqlSemantics, SqlSemanticsOracle};
use plcsql_ast::*;
use plcsql_symbols::predefined::is_no_paren_builtin;
use plcsql_symbols::{
    OperatorTable, RecordSource, Resolution, RoutineOrigin, RoutineSig, Symbol, SymbolKind,
};
use plcsql_types::{common_type, Coercion, Type};

type Result<T> = std::result::Result<T, SemanticError>;

pub(crate) struct Checker<'a> {
    res: &'a Resolution,
    ops: &'a OperatorTable,
    oracle: &'a dyn SqlSemanticsOracle,
    deco: Decorations,
    /// Return types of the routines being checked, innermost last
    returns: Vec<Option<Type>>,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(
        res: &'a Resolution,
        ops: &'a OperatorTable,
        oracle: &'a dyn SqlSemanticsOracle,
    ) -> Self {
        Self {
            res,
            ops,
            oracle,
            deco: Decorations::new(),
            returns: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, unit: &Unit) -> Result<Decorations> {
        self.routine(&unit.routine)?;
        tracing::debug!(
            routine = %unit.routine.name,
            imports = self.deco.imports().count(),
            connection = self.deco.uses_connection(),
            "unit type checked"
        );
        Ok(self.deco)
    }

    // === Symbols ===

    fn symbol(&self, ident: &Ident) -> Result<&'a Symbol> {
        let res = self.res;
        res.referenced(ident.id)
            .ok_or_else(|| SemanticError::Unresolved {
                name: ident.name.clone(),
                pos: ident.pos,
            })
    }

    fn routine_sig(&self, ident: &Ident) -> Result<&'a RoutineSig> {
        self.symbol(ident)?
            .routine()
            .ok_or_else(|| SemanticError::Unresolved {
                name: ident.name.clone(),
                pos: ident.pos,
            })
    }

    /// Type of a variable-like symbol named by `ident`
    fn value_type(&self, ident: &Ident) -> Result<Type> {
        self.symbol(ident)?
            .value_type()
            .ok_or_else(|| SemanticError::Unresolved {
                name: ident.name.clone(),
                pos: ident.pos,
            })
    }

    /// Select list of an explicit cursor
    fn cursor_columns(&self, symbol: &Symbol) -> Option<Vec<Column>> {
        match &symbol.kind {
            SymbolKind::Cursor { sql, .. } => self.deco.columns(*sql).map(<[Column]>::to_vec),
            _ => None,
        }
    }

    // === Routines and declarations ===

    fn routine(&mut self, r: &Routine) -> Result<()> {
        let ret = self
            .res
            .declared(r.id)
            .and_then(|s| s.routine())
            .and_then(|sig| sig.ret);
        if let Some(ret) = ret {
            self.deco.add_import(ret);
        }
        for p in &r.params {
            if let Some(ty) = self.res.declared(p.id).and_then(|s| s.value_type()) {
                self.deco.add_import(ty);
            }
        }

        self.returns.push(ret);
        let result = self.decls(&r.decls).and_then(|_| self.body(&r.body));
        self.returns.pop();
        result
    }

    fn decls(&mut self, decls: &[Decl]) -> Result<()> {
        for d in decls {
            self.decl(d)?;
        }
        Ok(())
    }

    fn declared_type(&self, d: &Decl) -> Option<Type> {
        self.res.declared(d.id).and_then(|s| s.value_type())
    }

    fn decl(&mut self, d: &Decl) -> Result<()> {
        match &d.kind {
            DeclKind::Var {
                name,
                not_null,
                init,
                ..
            } => {
                let ty = self.declared_type(d).unwrap_or(Type::Object);
                self.deco.add_import(ty);
                if let Some(init) = init {
                    self.initializer(name, ty, *not_null, init)?;
                }
                Ok(())
            }
            DeclKind::Const {
                name,
                not_null,
                value,
                ..
            } => {
                let ty = self.declared_type(d).unwrap_or(Type::Object);
                self.deco.add_import(ty);
                self.initializer(name, ty, *not_null, value)
            }
            DeclKind::Cursor { sql, .. } => {
                self.deco.require_connection();
                let columns = self.query(sql)?;
                self.deco.set_columns(sql.id, columns);
                Ok(())
            }
            DeclKind::Exception { .. } => Ok(()),
            DeclKind::Procedure(r) | DeclKind::Function(r) => self.routine(r),
        }
    }

    fn initializer(&mut self, name: &str, ty: Type, not_null: bool, value: &Expr) -> Result<()> {
        let value_ty = self.expr(value)?;
        if not_null && value_ty == Type::Null {
            return Err(SemanticError::NullInitializer {
                name: name.to_string(),
                pos: value.pos,
            });
        }
        let c = Coercion::between(value_ty, ty).ok_or_else(|| {
            SemanticError::InitializerMismatch {
                name: name.to_string(),
                found: value_ty.plc_name(),
                expected: ty.plc_name(),
                pos: value.pos,
            }
        })?;
        self.deco.set_coercion(value.id, c);
        Ok(())
    }

    // === Statements ===

    fn body(&mut self, body: &Body) -> Result<()> {
        self.stmts(&body.stmts)?;
        for h in &body.handlers {
            self.stmts(&h.stmts)?;
        }
        Ok(())
    }

    fn stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for s in stmts {
            self.stmt(s)?;
        }
        Ok(())
    }

    fn opt_stmts(&mut self, stmts: Option<&[Stmt]>) -> Result<()> {
        match stmts {
            Some(stmts) => self.stmts(stmts),
            None => Ok(()),
        }
    }

    fn stmt(&mut self, s: &Stmt) -> Result<()> {
        match &s.kind {
            StmtKind::Null | StmtKind::Raise(_) => Ok(()),
            StmtKind::Commit | StmtKind::Rollback => {
                self.deco.require_connection();
                Ok(())
            }
            StmtKind::Assign { target, value } => self.assign(target, value),
            StmtKind::Call { name, args } => {
                let sig = self.routine_sig(name)?;
                self.routine_call(sig, args)
            }
            StmtKind::Return(value) => self.return_value(value.as_ref()),
            StmtKind::If { arms, else_stmts } | StmtKind::SearchedCase { arms, else_stmts } => {
                for arm in arms {
                    self.condition(&arm.cond)?;
                    self.stmts(&arm.stmts)?;
                }
                self.opt_stmts(else_stmts.as_deref())
            }
            StmtKind::Case {
                selector,
                arms,
                else_stmts,
            } => self.case_stmt(s, selector, arms, else_stmts.as_deref()),
            StmtKind::Loop { stmts, .. } => self.stmts(stmts),
            StmtKind::While { cond, stmts, .. } => {
                let ty = self.expr(cond)?;
                if ty != Type::Boolean {
                    return Err(SemanticError::WhileConditionNotBoolean {
                        found: ty.plc_name(),
                        pos: cond.pos,
                    });
                }
                self.stmts(stmts)
            }
            StmtKind::ForIter {
                lower,
                upper,
                step,
                stmts,
                ..
            } => {
                self.int_bound(lower, |found, pos| SemanticError::ForLowerBound { found, pos })?;
                self.int_bound(upper, |found, pos| SemanticError::ForUpperBound { found, pos })?;
                if let Some(step) = step {
                    self.int_bound(step, |found, pos| SemanticError::ForStep { found, pos })?;
                }
                self.stmts(stmts)
            }
            StmtKind::ForCursor {
                cursor,
                args,
                stmts,
                ..
            } => {
                self.deco.require_connection();
                self.cursor_args(cursor, args)?;
                self.stmts(stmts)
            }
            StmtKind::ForStaticSql { sql, stmts, .. } => {
                self.deco.require_connection();
                let columns = self.query(sql)?;
                self.deco.set_columns(sql.id, columns);
                self.stmts(stmts)
            }
            StmtKind::ForDynamicSql {
                sql, using, stmts, ..
            } => {
                self.deco.require_connection();
                self.dynamic_sql(sql)?;
                self.using(using)?;
                self.stmts(stmts)
            }
            StmtKind::Exit { when, .. } | StmtKind::Continue { when, .. } => match when {
                Some(cond) => self.condition(cond),
                None => Ok(()),
            },
            StmtKind::Block { decls, body } => {
                self.decls(decls)?;
                self.body(body)
            }
            StmtKind::RaiseAppErr { code, msg } => {
                let ty = self.expr(code)?;
                if ty != Type::Int {
                    return Err(SemanticError::ErrorCodeNotInt {
                        found: ty.plc_name(),
                        pos: code.pos,
                    });
                }
                let ty = self.expr(msg)?;
                if !ty.is_string() {
                    return Err(SemanticError::ErrorMessageNotString {
                        found: ty.plc_name(),
                        pos: msg.pos,
                    });
                }
                Ok(())
            }
            StmtKind::OpenCursor { cursor, args } => {
                self.deco.require_connection();
                self.cursor_args(cursor, args)
            }
            StmtKind::CloseCursor(_) => {
                self.deco.require_connection();
                Ok(())
            }
            StmtKind::Fetch { cursor, into } => self.fetch(cursor, into),
            StmtKind::OpenFor { sql, .. } => {
                self.deco.require_connection();
                let columns = self.query(sql)?;
                self.deco.set_columns(sql.id, columns);
                Ok(())
            }
            StmtKind::ExecImme { sql, into, using } => {
                self.deco.require_connection();
                self.dynamic_sql(sql)?;
                self.using(using)?;
                for target in into {
                    let ty = self.value_type(target)?;
                    let c = Coercion::between(Type::Object, ty).ok_or_else(|| {
                        SemanticError::DynamicIntoTargetMismatch {
                            name: target.name.clone(),
                            found: ty.plc_name(),
                            pos: target.pos,
                        }
                    })?;
                    self.deco.set_coercion(target.id, c);
                }
                Ok(())
            }
            StmtKind::StaticSql(sql) => self.static_sql_stmt(sql),
        }
    }

    fn assign(&mut self, target: &Ident, value: &Expr) -> Result<()> {
        let value_ty = self.expr(value)?;
        let symbol = self.symbol(target)?;
        let ty = self.value_type(target)?;
        if symbol.is_not_null() && value_ty == Type::Null {
            return Err(SemanticError::NotNullViolation {
                name: target.name.clone(),
                pos: value.pos,
            });
        }
        let c = Coercion::between(value_ty, ty).ok_or_else(|| SemanticError::AssignMismatch {
            name: target.name.clone(),
            found: value_ty.plc_name(),
            expected: ty.plc_name(),
            pos: value.pos,
        })?;
        self.deco.set_coercion(value.id, c);
        Ok(())
    }

    fn return_value(&mut self, value: Option<&Expr>) -> Result<()> {
        let Some(value) = value else { return Ok(()) };
        let value_ty = self.expr(value)?;
        if let Some(Some(ret)) = self.returns.last().copied() {
            let c = Coercion::between(value_ty, ret).ok_or_else(|| {
                SemanticError::ReturnMismatch {
                    found: value_ty.plc_name(),
                    expected: ret.plc_name(),
                    pos: value.pos,
                }
            })?;
            self.deco.set_coercion(value.id, c);
        }
        Ok(())
    }

    fn condition(&mut self, cond: &Expr) -> Result<()> {
        let ty = self.expr(cond)?;
        if ty != Type::Boolean {
            return Err(SemanticError::ConditionNotBoolean {
                found: ty.plc_name(),
                pos: cond.pos,
            });
        }
        Ok(())
    }

    fn int_bound<F>(&mut self, e: &Expr, err: F) -> Result<()>
    where
        F: FnOnce(String, Pos) -> SemanticError,
    {
        let ty = self.expr(e)?;
        match Coercion::between(ty, Type::Int) {
            Some(c) => {
                self.deco.set_coercion(e.id, c);
                Ok(())
            }
            None => Err(err(ty.plc_name(), e.pos)),
        }
    }

    fn case_stmt(
        &mut self,
        s: &Stmt,
        selector: &Expr,
        arms: &[CaseStmtArm],
        else_stmts: Option<&[Stmt]>,
    ) -> Result<()> {
        let mut compared = vec![self.expr(selector)?];
        for arm in arms {
            compared.push(self.expr(&arm.value)?);
            self.stmts(&arm.stmts)?;
        }
        self.opt_stmts(else_stmts)?;

        if compared.iter().all(Type::is_char) {
            for arm in arms {
                self.deco.set_op_extension(arm.id, OpExtension::Char);
            }
        }
        let (selector_ty, coercions) = self
            .ops
            .resolve("In", &compared)
            .map(|(sig, cs)| (sig.params[0], cs))
            .ok_or(SemanticError::CaseValuesNotComparable { pos: s.pos })?;

        let compared_ids: Vec<NodeId> = std::iter::once(selector.id)
            .chain(arms.iter().map(|a| a.value.id))
            .collect();
        self.set_coercions(&compared_ids, coercions);
        self.deco.set_selector_type(s.id, selector_ty);
        Ok(())
    }

    fn cursor_args(&mut self, cursor: &Ident, args: &[Expr]) -> Result<()> {
        let params = match &self.symbol(cursor)?.kind {
            SymbolKind::Cursor { params, .. } => params.clone(),
            _ => Vec::new(),
        };
        for (i, (arg, param)) in args.iter().zip(params).enumerate() {
            let ty = self.expr(arg)?;
            let c = Coercion::between(ty, param).ok_or_else(|| {
                SemanticError::CursorArgumentMismatch {
                    cursor: cursor.name.clone(),
                    index: i + 1,
                    found: ty.plc_name(),
                    pos: arg.pos,
                }
            })?;
            self.deco.set_coercion(arg.id, c);
        }
        Ok(())
    }

    fn fetch(&mut self, cursor: &Ident, into: &[Ident]) -> Result<()> {
        self.deco.require_connection();
        let symbol = self.symbol(cursor)?;
        // A SYS_REFCURSOR runs a query chosen at run time
        let sources = match self.cursor_columns(symbol) {
            Some(columns) => {
                if columns.len() != into.len() {
                    return Err(SemanticError::IntoCountMismatch {
                        expected: columns.len(),
                        found: into.len(),
                        pos: cursor.pos,
                    });
                }
                columns.into_iter().map(|c| c.ty).collect()
            }
            None => vec![Type::Object; into.len()],
        };
        for (i, (target, src)) in into.iter().zip(sources).enumerate() {
            let ty = self.value_type(target)?;
            let c = Coercion::between(src, ty).ok_or_else(|| {
                SemanticError::FetchTargetMismatch {
                    column: i + 1,
                    name: target.name.clone(),
                    pos: target.pos,
                }
            })?;
            self.deco.set_coercion(target.id, c);
        }
        Ok(())
    }

    fn dynamic_sql(&mut self, sql: &Expr) -> Result<()> {
        let ty = self.expr(sql)?;
        if !ty.is_string() {
            return Err(SemanticError::DynamicSqlNotString {
                found: ty.plc_name(),
                pos: sql.pos,
            });
        }
        Ok(())
    }

    fn using(&mut self, using: &[Expr]) -> Result<()> {
        for e in using {
            let ty = self.expr(e)?;
            if ty.is_unbindable() {
                return Err(SemanticError::UsingExprNotBindable {
                    found: ty.plc_name(),
                    pos: e.pos,
                });
            }
        }
        Ok(())
    }

    // === Embedded SQL ===

    fn ask(&self, sql: &str) -> SqlSemantics {
        tracing::debug!(sql, "requesting SQL semantics");
        self.oracle
            .get_sql_semantics(&[sql.to_string()])
            .into_iter()
            .next()
            .unwrap_or(SqlSemantics {
                seq_no: 0,
                err_code: -1,
                err_msg: "no semantics returned for the SQL".into(),
                select_list: Vec::new(),
            })
    }

    /// Check host expressions and learn the select list of `sql`.
    fn static_sql(&mut self, sql: &StaticSql) -> Result<Vec<Column>> {
        self.deco.require_connection();
        for host in &sql.host_exprs {
            let ty = self.expr(host)?;
            if ty.is_unbindable() {
                return Err(SemanticError::HostExprNotBindable {
                    found: ty.plc_name(),
                    pos: host.pos,
                });
            }
        }

        let semantics = self.ask(&sql.text);
        if semantics.is_error() {
            return Err(SemanticError::SqlRejected {
                code: semantics.err_code,
                msg: semantics.err_msg,
                pos: sql.pos,
            });
        }
        semantics
            .select_list
            .into_iter()
            .map(|ci| match Type::from_db_type_code(ci.db_type) {
                Some(ty) => Ok(Column { name: ci.name, ty }),
                None => Err(SemanticError::ColumnTypeUnsupported {
                    column: ci.name,
                    code: ci.db_type,
                    pos: sql.pos,
                }),
            })
            .collect()
    }

    /// A query whose rows are consumed elsewhere; it may not have INTO.
    fn query(&mut self, sql: &StaticSql) -> Result<Vec<Column>> {
        let columns = self.static_sql(sql)?;
        if !sql.into.is_empty() {
            return Err(SemanticError::IntoCountMismatch {
                expected: 0,
                found: sql.into.len(),
                pos: sql.pos,
            });
        }
        Ok(columns)
    }

    fn static_sql_stmt(&mut self, sql: &StaticSql) -> Result<()> {
        let columns = self.static_sql(sql)?;
        if columns.len() != sql.into.len() {
            return Err(SemanticError::IntoCountMismatch {
                expected: columns.len(),
                found: sql.into.len(),
                pos: sql.pos,
            });
        }
        for (target, column) in sql.into.iter().zip(&columns) {
            let ty = self.value_type(target)?;
            let c = Coercion::between(column.ty, ty).ok_or_else(|| {
                SemanticError::IntoTargetMismatch {
                    name: target.name.clone(),
                    pos: sql.pos,
                }
            })?;
            self.deco.set_coercion(target.id, c);
        }
        self.deco.set_columns(sql.id, columns);
        Ok(())
    }

    // === Calls ===

    fn routine_call(&mut self, sig: &RoutineSig, args: &[Expr]) -> Result<()> {
        if sig.origin == RoutineOrigin::External {
            self.deco.require_connection();
        }
        for (i, (arg, param)) in args.iter().zip(&sig.params).enumerate() {
            let ty = self.expr(arg)?;
            let c = Coercion::between(ty, param.ty).ok_or_else(|| {
                SemanticError::ArgumentMismatch {
                    routine: sig.name.clone(),
                    index: i + 1,
                    found: ty.plc_name(),
                    pos: arg.pos,
                }
            })?;
            let writable = matches!(arg.kind, ExprKind::Id(_)) && c.is_reversible();
            if param.mode.is_out() && !writable {
                return Err(SemanticError::OutArgumentNotReversible {
                    routine: sig.name.clone(),
                    index: i + 1,
                    param: param.ty.plc_name(),
                    arg: ty.plc_name(),
                    pos: arg.pos,
                });
            }
            self.deco.set_coercion(arg.id, c);
        }
        Ok(())
    }

    /// Ask the server for the result type of a built-in function by
    /// compiling `select NAME(typical values) from dual`.
    fn builtin_call(&mut self, e: &Expr, name: &str, args: &[Expr]) -> Result<Type> {
        self.deco.require_connection();
        let mut values = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let ty = self.expr(arg)?;
            let value = ty.typical_value().ok_or_else(|| {
                SemanticError::BuiltinArgumentInvalid {
                    name: name.to_string(),
                    index: i + 1,
                    pos: arg.pos,
                }
            })?;
            values.push(value);
        }
        let arg_list = if values.is_empty() && is_no_paren_builtin(name) {
            String::new()
        } else {
            format!("({})", values.join(", "))
        };

        let semantics = self.ask(&format!("select {}{} from dual", name, arg_list));
        let column = match semantics.select_list.first() {
            Some(column) if !semantics.is_error() => column,
            _ => {
                return Err(SemanticError::BuiltinUndefined {
                    name: name.to_string(),
                    pos: e.pos,
                })
            }
        };
        let ret = Type::from_db_type_code(column.db_type).ok_or_else(|| {
            SemanticError::BuiltinReturnTypeUnsupported {
                name: name.to_string(),
                code: column.db_type,
                pos: e.pos,
            }
        })?;

        // A lone NULL argument needs a type for the Java compiler to pick
        // the variadic overload
        if let [arg] = args {
            if arg.is_null_literal() {
                self.deco.set_coercion(
                    arg.id,
                    Coercion::Cast {
                        src: Type::Null,
                        dst: Type::Object,
                    },
                );
            }
        }
        Ok(ret)
    }

    // === Expressions ===

    pub(crate) fn expr(&mut self, e: &Expr) -> Result<Type> {
        let ty = self.expr_kind(e)?;
        self.deco.set_type(e.id, ty);
        Ok(ty)
    }

    fn expr_kind(&mut self, e: &Expr) -> Result<Type> {
        let res = self.res;
        let ty = match &e.kind {
            ExprKind::Null => Type::Null,
            ExprKind::True | ExprKind::False => Type::Boolean,
            ExprKind::Uint(digits) => Type::uint_literal(digits),
            ExprKind::Float(text) => Type::float_literal(text),
            ExprKind::Str(_) => Type::string_literal(),
            ExprKind::Date(_) => Type::Date,
            ExprKind::Time(_) => Type::Time,
            ExprKind::Datetime(_) => Type::Datetime,
            ExprKind::Timestamp(_) => Type::Timestamp,
            ExprKind::SqlRowCount => Type::Bigint,
            ExprKind::SqlCode => Type::Int,
            ExprKind::SqlErrm => Type::StringAny,
            ExprKind::Serial { .. } => {
                self.deco.require_connection();
                Type::NumericAny
            }
            ExprKind::Id(ident) => self.ident(e, ident)?,
            ExprKind::Field { record, field } => self.field(e, record, field)?,
            ExprKind::CursorAttr { attr, .. } => match attr {
                CursorAttribute::RowCount => Type::Bigint,
                _ => Type::Boolean,
            },
            ExprKind::Unary { op, operand } => {
                let operand_ty = self.expr(operand)?;
                let (sig, mut coercions) = self
                    .ops
                    .resolve(op.name(), &[operand_ty])
                    .ok_or_else(|| SemanticError::UnaryOperandMismatch {
                        op: op.name(),
                        operand: operand_ty.plc_name(),
                        pos: e.pos,
                    })?;
                if let Some(c) = coercions.pop() {
                    self.deco.set_coercion(operand.id, c);
                }
                sig.ret
            }
            ExprKind::Binary { op, left, right } => {
                let lt = self.expr(left)?;
                let rt = self.expr(right)?;
                let (sig, coercions) = self
                    .ops
                    .resolve(op.name(), &[lt, rt])
                    .ok_or_else(|| SemanticError::BinaryOperandsMismatch {
                        op: op.symbol(),
                        left: lt.plc_name(),
                        right: rt.plc_name(),
                        pos: e.pos,
                    })?;
                let chars = op.is_comparison() && lt.is_char() && rt.is_char();
                self.set_op_extension(e.id, sig.has_timestamp_param(), chars);
                self.set_coercions(&[left.id, right.id], coercions);
                sig.ret
            }
            ExprKind::Between {
                target,
                lower,
                upper,
            } => {
                let types = [self.expr(target)?, self.expr(lower)?, self.expr(upper)?];
                let (sig, coercions) = self
                    .ops
                    .resolve("Between", &types)
                    .ok_or(SemanticError::BetweenNotComparable { pos: e.pos })?;
                let chars = types.iter().all(Type::is_char);
                self.set_op_extension(e.id, sig.has_timestamp_param(), chars);
                self.set_coercions(&[target.id, lower.id, upper.id], coercions);
                Type::Boolean
            }
            ExprKind::In { target, elements } => {
                let mut types = vec![self.expr(target)?];
                let mut ids = vec![target.id];
                for el in elements {
                    types.push(self.expr(el)?);
                    ids.push(el.id);
                }
                let (sig, coercions) = self
                    .ops
                    .resolve("In", &types)
                    .ok_or(SemanticError::InNotComparable { pos: e.pos })?;
                let chars = types.iter().all(Type::is_char);
                self.set_op_extension(e.id, sig.has_timestamp_param(), chars);
                self.set_coercions(&ids, coercions);
                Type::Boolean
            }
            ExprKind::Like {
                target, pattern, ..
            } => {
                let ty = self.expr(target)?;
                let c = Coercion::between(ty, Type::StringAny).ok_or_else(|| {
                    SemanticError::LikeTargetNotString {
                        found: ty.plc_name(),
                        pos: target.pos,
                    }
                })?;
                self.deco.set_coercion(target.id, c);
                let ty = self.expr(pattern)?;
                let c = Coercion::between(ty, Type::StringAny).ok_or_else(|| {
                    SemanticError::LikePatternNotString {
                        found: ty.plc_name(),
                        pos: pattern.pos,
                    }
                })?;
                self.deco.set_coercion(pattern.id, c);
                Type::Boolean
            }
            ExprKind::Case {
                selector,
                arms,
                else_expr,
            } => self.case_expr(e, selector, arms, else_expr.as_deref())?,
            ExprKind::Cond { arms, else_expr } => self.cond_expr(arms, else_expr.as_deref())?,
            ExprKind::Call { name, args } => match res.builtin(name.id) {
                Some(builtin) => self.builtin_call(e, builtin, args)?,
                None => {
                    let sig = self.routine_sig(name)?;
                    self.routine_call(sig, args)?;
                    sig.ret.unwrap_or(Type::Object)
                }
            },
        };
        Ok(ty)
    }

    fn set_op_extension(&mut self, id: NodeId, timestamp: bool, chars: bool) {
        if timestamp {
            self.deco.set_op_extension(id, OpExtension::Timestamp);
        } else if chars {
            self.deco.set_op_extension(id, OpExtension::Char);
        }
    }

    fn set_coercions(&mut self, ids: &[NodeId], coercions: Vec<Coercion>) {
        for (id, c) in ids.iter().zip(coercions) {
            self.deco.set_coercion(*id, c);
        }
    }

    fn ident(&mut self, e: &Expr, ident: &Ident) -> Result<Type> {
        let res = self.res;
        if let Some(builtin) = res.builtin(ident.id) {
            return self.builtin_call(e, builtin, &[]);
        }
        let symbol = self.symbol(ident)?;
        if let Some(ty) = symbol.value_type() {
            return Ok(ty);
        }
        match &symbol.kind {
            SymbolKind::Routine(sig) => {
                self.routine_call(sig, &[])?;
                Ok(sig.ret.unwrap_or(Type::Object))
            }
            SymbolKind::Cursor { .. } => Ok(Type::Cursor),
            _ => Err(SemanticError::Unresolved {
                name: ident.name.clone(),
                pos: ident.pos,
            }),
        }
    }

    fn field(&mut self, e: &Expr, record: &Ident, field: &str) -> Result<Type> {
        let columns = match &self.symbol(record)?.kind {
            SymbolKind::Record(RecordSource::DynamicSql) => return Ok(Type::Object),
            SymbolKind::Record(RecordSource::StaticSql(sql)) => {
                self.deco.columns(*sql).map(<[Column]>::to_vec)
            }
            SymbolKind::Record(RecordSource::Cursor(cursor)) => {
                self.res.get(*cursor).and_then(|c| self.cursor_columns(c))
            }
            _ => None,
        };
        let columns = columns.ok_or_else(|| SemanticError::Unresolved {
            name: record.name.clone(),
            pos: record.pos,
        })?;

        let mut found = None;
        for (i, column) in columns.iter().enumerate() {
            if column.name.eq_ignore_ascii_case(field) {
                if found.is_some() {
                    return Err(SemanticError::AmbiguousColumn {
                        name: field.to_string(),
                        pos: e.pos,
                    });
                }
                found = Some((i + 1, column.ty));
            }
        }
        let (index, ty) = found.ok_or_else(|| SemanticError::NoSuchColumn {
            name: field.to_string(),
            pos: e.pos,
        })?;
        self.deco.set_field_column(e.id, index);
        Ok(ty)
    }

    fn join(common: Option<Type>, ty: Type) -> Option<Type> {
        match common {
            None => Some(ty),
            Some(c) => common_type(c, ty),
        }
    }

    fn case_expr(
        &mut self,
        e: &Expr,
        selector: &Expr,
        arms: &[CaseArm],
        else_expr: Option<&Expr>,
    ) -> Result<Type> {
        let mut compared = vec![self.expr(selector)?];
        let mut common = None;
        let mut results = Vec::with_capacity(arms.len() + 1);
        for arm in arms {
            compared.push(self.expr(&arm.value)?);
            let ty = self.expr(&arm.result)?;
            common = Some(Self::join(common, ty).ok_or_else(|| SemanticError::BranchTypeMismatch {
                found: ty.plc_name(),
                pos: arm.result.pos,
            })?);
            results.push((arm.result.id, arm.result.pos, ty));
        }
        if let Some(else_expr) = else_expr {
            let ty = self.expr(else_expr)?;
            common = Some(Self::join(common, ty).ok_or_else(|| SemanticError::ElseTypeMismatch {
                found: ty.plc_name(),
                pos: else_expr.pos,
            })?);
            results.push((else_expr.id, else_expr.pos, ty));
        }

        if compared.iter().all(Type::is_char) {
            for arm in arms {
                self.deco.set_op_extension(arm.id, OpExtension::Char);
            }
        }
        let (selector_ty, coercions) = self
            .ops
            .resolve("In", &compared)
            .map(|(sig, cs)| (sig.params[0], cs))
            .ok_or(SemanticError::CaseValuesNotComparable { pos: e.pos })?;
        let compared_ids: Vec<NodeId> = std::iter::once(selector.id)
            .chain(arms.iter().map(|a| a.value.id))
            .collect();
        self.set_coercions(&compared_ids, coercions);
        self.deco.set_selector_type(e.id, selector_ty);

        let common = common.unwrap_or(Type::Null);
        self.branch_coercions(common, results)?;
        Ok(common)
    }

    fn cond_expr(&mut self, arms: &[CondArm], else_expr: Option<&Expr>) -> Result<Type> {
        let mut common = None;
        let mut results = Vec::with_capacity(arms.len() + 1);
        for arm in arms {
            self.condition(&arm.cond)?;
            let ty = self.expr(&arm.result)?;
            common = Some(Self::join(common, ty).ok_or_else(|| SemanticError::BranchTypeMismatch {
                found: ty.plc_name(),
                pos: arm.result.pos,
            })?);
            results.push((arm.result.id, arm.result.pos, ty));
        }
        if let Some(else_expr) = else_expr {
            let ty = self.expr(else_expr)?;
            common = Some(Self::join(common, ty).ok_or_else(|| SemanticError::ElseTypeMismatch {
                found: ty.plc_name(),
                pos: else_expr.pos,
            })?);
            results.push((else_expr.id, else_expr.pos, ty));
        }

        let common = common.unwrap_or(Type::Null);
        self.branch_coercions(common, results)?;
        Ok(common)
    }

    /// Coerce every branch result of a CASE to the joined type.
    fn branch_coercions(&mut self, common: Type, results: Vec<(NodeId, Pos, Type)>) -> Result<()> {
        for (id, pos, ty) in results {
            let c = Coercion::between(ty, common).ok_or_else(|| {
                SemanticError::BranchTypeMismatch {
                    found: ty.plc_name(),
                    pos,
                }
            })?;
            self.deco.set_coercion(id, c);
        }
        Ok(())
    }
}
