//! Expressions and routine calls

use plcsql_ast::{CaseArm, CondArm, CursorAttribute, Expr, ExprKind, Ident, ParamMode, Pos};
use plcsql_symbols::{ParamSig, RecordSource, RoutineOrigin, RoutineSig, Symbol, SymbolKind};
use plcsql_types::{Coercion, Type};

use crate::template::{CodeToResolve, Substitute, Template, TemplateList};
use crate::writer::{java_string, missing, JavaWriter, Result};

const UNOPENED_REFCURSOR: &str = "tried to retrieve an attribute from an unopened SYS_REFCURSOR";

/// Pieces of a call wrapper that depend on the arguments
#[derive(Default)]
struct CallSnippets {
    /// Parameters of the wrapper's `invoke` method
    params: Vec<String>,
    /// Statements before the call
    before: Vec<String>,
    /// Arguments of a local call, inside the wrapper
    args: Vec<String>,
    /// Statements after the call
    after: Vec<String>,
}

impl<'a> JavaWriter<'a> {
    /// An expression with the coercion the checker put on it applied.
    pub(crate) fn expr(&self, e: &Expr) -> Result<CodeToResolve> {
        let code = self.raw_expr(e)?;
        match self.deco.coercion(e.id) {
            Some(c) => self.coerce(c, code, e.pos),
            None => Ok(code),
        }
    }

    pub(crate) fn expr_list(&self, exprs: &[Expr]) -> Result<TemplateList> {
        let mut list = TemplateList::with_delimiter(",");
        for e in exprs {
            list.push(self.expr(e)?);
        }
        Ok(list)
    }

    fn coerce(&self, c: &Coercion, code: CodeToResolve, pos: Pos) -> Result<CodeToResolve> {
        let template = match c {
            Coercion::Identity(_) => return Ok(code),
            Coercion::Cast { dst, .. } => Template::new("CastCoercion", Pos::IGNORED)
                .line("(%'TYPE'%)")
                .big(1, "EXPR", "")
                .set("TYPE", dst.java_code())
                .fill("EXPR", code),
            Coercion::Conversion { src, dst } => Template::new("ConvCoercion", pos)
                .line("conv%'SRC-TYPE'%To%'DST-TYPE'%(")
                .big(1, "EXPR", ")")
                .set("SRC-TYPE", src.conv_name())
                .set("DST-TYPE", dst.conv_name())
                .fill("EXPR", code),
            Coercion::CheckPrecision {
                inner,
                precision,
                scale,
            } => Template::new("CheckPrecision", pos)
                .line("checkPrecision(%'PREC'%, (short) %'SCALE'%,")
                .big(1, "EXPR", ")")
                .set("PREC", precision.to_string())
                .set("SCALE", scale.to_string())
                .fill("EXPR", self.coerce(inner, code, pos)?),
            Coercion::CheckStrLength {
                inner,
                is_char,
                length,
            } => Template::new("CheckStrLength", pos)
                .line("checkStrLength(%'IS-CHAR'%, %'LENGTH'%,")
                .big(1, "EXPR", ")")
                .set("IS-CHAR", is_char.to_string())
                .set("LENGTH", length.to_string())
                .fill("EXPR", self.coerce(inner, code, pos)?),
        };
        Ok(template.finish()?)
    }

    fn type_of(&self, e: &Expr) -> Result<Type> {
        self.deco
            .type_of(e.id)
            .ok_or_else(|| missing("expression type", e.pos))
    }

    fn raw_expr(&self, e: &Expr) -> Result<CodeToResolve> {
        let text = |code: String| -> Result<CodeToResolve> {
            Ok(CodeToResolve::text(Pos::IGNORED, code))
        };
        match &e.kind {
            ExprKind::Null => text("null".into()),
            ExprKind::True => text("true".into()),
            ExprKind::False => text("false".into()),
            ExprKind::Uint(digits) => {
                let ty = self
                    .deco
                    .type_of(e.id)
                    .unwrap_or_else(|| Type::uint_literal(digits));
                // a leading zero makes a Java octal literal
                let decimal = match digits.trim_start_matches('0') {
                    "" => "0",
                    rest => rest,
                };
                text(match ty {
                    Type::Int => format!("Integer.valueOf({})", decimal),
                    Type::Bigint => format!("Long.valueOf({}L)", decimal),
                    _ => format!("new BigDecimal(\"{}\")", digits),
                })
            }
            ExprKind::Float(value) => text(match self.deco.type_of(e.id) {
                Some(Type::Double) => format!("Double.valueOf(\"{}\")", value),
                _ => format!("new BigDecimal(\"{}\")", value),
            }),
            ExprKind::Str(value) => text(java_string(value)),
            ExprKind::Date(value) => text(format!("Date.valueOf({})", java_string(value))),
            ExprKind::Time(value) => text(format!("Time.valueOf({})", java_string(value))),
            ExprKind::Datetime(value) | ExprKind::Timestamp(value) => {
                text(format!("Timestamp.valueOf({})", java_string(value)))
            }
            ExprKind::SqlRowCount => text("sql_rowcount[0]".into()),
            ExprKind::SqlCode => text(match self.handlers.last() {
                Some(level) => format!("e{}.getCode()", level),
                None => "Integer.valueOf(0)".into(),
            }),
            ExprKind::SqlErrm => text(match self.handlers.last() {
                Some(level) => format!("e{}.getMessage()", level),
                None => "\"no error\"".into(),
            }),
            ExprKind::Serial { name, next } => self.serial(e, name, *next),
            ExprKind::Id(ident) => {
                if let Some(builtin) = self.res.builtin(ident.id) {
                    return self.builtin_call(e, builtin, &[]);
                }
                if let SymbolKind::Routine(_) = self.symbol(ident)?.kind {
                    return self.call(e.pos, ident, &[], false);
                }
                text(self.ident_code(ident)?)
            }
            ExprKind::Field { record, field } => self.field(e, record, field),
            ExprKind::CursorAttr { cursor, attr } => {
                let code = match attr {
                    CursorAttribute::IsOpen => {
                        "((%'CURSOR'% == null) ? Boolean.FALSE : %'CURSOR'%.%'METHOD'%())"
                    }
                    _ => "((%'CURSOR'% == null) ? (%'JAVA-TYPE'%) throwInvalidCursor(\"%'SUBMSG'%\") : %'CURSOR'%.%'METHOD'%())",
                };
                Ok(Template::new("ExprCursorAttr", e.pos)
                    .line(code)
                    .set("CURSOR", self.ident_code(cursor)?)
                    .set("METHOD", attr.method())
                    .set("JAVA-TYPE", self.type_of(e)?.java_code())
                    .set("SUBMSG", UNOPENED_REFCURSOR)
                    .finish()?)
            }
            ExprKind::Unary { op, operand } => Ok(Template::new("ExprUnaryOp", e.pos)
                .line("op%'OPERATION'%(")
                .big(1, "OPERAND", "")
                .line(")")
                .set("OPERATION", op.name())
                .fill("OPERAND", self.expr(operand)?)
                .finish()?),
            ExprKind::Binary { op, left, right } => Ok(Template::new("ExprBinaryOp", e.pos)
                .line("op%'OPERATION'%%'OP-EXTENSION'%(")
                .big(1, "LEFT-OPERAND", ",")
                .big(1, "RIGHT-OPERAND", "")
                .line(")")
                .set("OPERATION", op.name())
                .set("OP-EXTENSION", self.op_extension(e))
                .fill("LEFT-OPERAND", self.expr(left)?)
                .fill("RIGHT-OPERAND", self.expr(right)?)
                .finish()?),
            ExprKind::Between {
                target,
                lower,
                upper,
            } => Ok(Template::new("ExprBetween", e.pos)
                .line("opBetween%'OP-EXTENSION'%(")
                .big(1, "TARGET", ",")
                .big(1, "LOWER-BOUND", ",")
                .big(1, "UPPER-BOUND", "")
                .line(")")
                .set("OP-EXTENSION", self.op_extension(e))
                .fill("TARGET", self.expr(target)?)
                .fill("LOWER-BOUND", self.expr(lower)?)
                .fill("UPPER-BOUND", self.expr(upper)?)
                .finish()?),
            ExprKind::In { target, elements } => Ok(Template::new("ExprIn", e.pos)
                .line("opIn%'OP-EXTENSION'%(")
                .big(1, "TARGET", ",")
                .big(1, "IN-ELEMENTS", "")
                .line(")")
                .set("OP-EXTENSION", self.op_extension(e))
                .fill("TARGET", self.expr(target)?)
                .fill("IN-ELEMENTS", self.expr_list(elements)?)
                .finish()?),
            ExprKind::Like {
                target,
                pattern,
                escape,
            } => Ok(Template::new("ExprLike", e.pos)
                .line("opLike(")
                .big(1, "TARGET", ",")
                .big(1, "PATTERN", ",")
                .line("  %'ESCAPE'%")
                .line(")")
                .set(
                    "ESCAPE",
                    escape.as_deref().map_or_else(|| "null".to_string(), java_string),
                )
                .fill("TARGET", self.expr(target)?)
                .fill("PATTERN", self.expr(pattern)?)
                .finish()?),
            ExprKind::Case {
                selector,
                arms,
                else_expr,
            } => self.case_expr(e, selector, arms, else_expr.as_deref()),
            ExprKind::Cond { arms, else_expr } => self.cond_expr(e, arms, else_expr.as_deref()),
            ExprKind::Call { name, args } => match self.res.builtin(name.id) {
                Some(builtin) => self.builtin_call(e, builtin, args),
                None => self.call(e.pos, name, args, false),
            },
        }
    }

    fn op_extension(&self, e: &Expr) -> &'static str {
        self.deco.op_extension(e.id).map_or("", |ext| ext.suffix())
    }

    fn serial(&self, e: &Expr, name: &str, next: bool) -> Result<CodeToResolve> {
        Ok(Template::new("ExprSerialVal", e.pos)
            .lines(&[
                "(new Object() {",
                "  BigDecimal getSerialVal() throws Exception {",
                "    try {",
                "      BigDecimal ret;",
                "      String dynSql = \"select %'SERIAL-NAME'%.%'SERIAL-VAL'%\";",
                "      PreparedStatement stmt = conn.prepareStatement(dynSql);",
                "      ResultSet r = stmt.executeQuery();",
                "      if (r.next()) {",
                "        ret = r.getBigDecimal(1);",
                "        if (ret != null && r.wasNull()) {",
                "          ret = null;",
                "        }",
                "      } else {",
                "        ret = null;",
                "      }",
                "      stmt.close();",
                "      return ret;",
                "    } catch (SQLException e) {",
                "      Server.log(e);",
                "      throw new SQL_ERROR(e.getMessage());",
                "    }",
                "  }",
                "}.getSerialVal())",
            ])
            .set("SERIAL-NAME", name)
            .set(
                "SERIAL-VAL",
                if next { "NEXT_VALUE" } else { "CURRENT_VALUE" },
            )
            .finish()?)
    }

    /// A column of the current row of a FOR loop over a query. Static
    /// queries are read by position, dynamic ones by column name.
    fn field(&self, e: &Expr, record: &Ident, field: &str) -> Result<CodeToResolve> {
        let rs = self.ident_code(record)?;
        let code = match self.symbol(record)?.kind {
            SymbolKind::Record(RecordSource::DynamicSql) => {
                format!("{}.getObject({})", rs, java_string(field))
            }
            _ => {
                let index = self
                    .deco
                    .field_column(e.id)
                    .ok_or_else(|| missing("record field", e.pos))?;
                format!("({}) {}.getObject({})", self.type_of(e)?.java_code(), rs, index)
            }
        };
        Ok(CodeToResolve::text(e.pos, code))
    }

    fn case_expr(
        &self,
        e: &Expr,
        selector: &Expr,
        arms: &[CaseArm],
        else_expr: Option<&Expr>,
    ) -> Result<CodeToResolve> {
        let result_ty = self.type_of(e)?;
        if result_ty == Type::Null {
            // every branch is NULL
            return Ok(CodeToResolve::text(e.pos, "null"));
        }
        let selector_ty = self
            .deco
            .selector_type(e.id)
            .ok_or_else(|| missing("selector type", e.pos))?;

        let mut parts = TemplateList::new();
        for arm in arms {
            parts.push(
                Template::new("CaseExprPart", Pos::IGNORED)
                    .line("Boolean.TRUE.equals(opEq%'OP-EXTENSION'%(selector,")
                    .big(2, "VALUE", ")) ?")
                    .big(1, "RESULT", " :")
                    .set(
                        "OP-EXTENSION",
                        self.deco.op_extension(arm.id).map_or("", |ext| ext.suffix()),
                    )
                    .fill("VALUE", self.expr(&arm.value)?)
                    .fill("RESULT", self.expr(&arm.result)?)
                    .finish()?,
            );
        }
        let else_part = self.else_part(else_expr)?;

        Ok(Template::new("ExprCase", e.pos)
            .lines(&[
                "(new Object() { %'RESULT-TYPE'% invoke(%'SELECTOR-TYPE'% selector) // simple case expression",
                "   throws Exception {",
                "  return",
            ])
            .big(2, "WHEN-PARTS", "")
            .big(2, "ELSE-PART", ";")
            .line("}}.invoke(")
            .big(1, "SELECTOR-VALUE", "))")
            .set("RESULT-TYPE", result_ty.java_code())
            .set("SELECTOR-TYPE", selector_ty.java_code())
            .fill("WHEN-PARTS", parts)
            .fill("ELSE-PART", else_part)
            .fill("SELECTOR-VALUE", self.expr(selector)?)
            .finish()?)
    }

    fn cond_expr(
        &self,
        e: &Expr,
        arms: &[CondArm],
        else_expr: Option<&Expr>,
    ) -> Result<CodeToResolve> {
        if self.type_of(e)? == Type::Null {
            return Ok(CodeToResolve::text(e.pos, "null"));
        }
        let mut parts = TemplateList::new();
        for arm in arms {
            parts.push(
                Template::new("CondExprPart", Pos::IGNORED)
                    .line("Boolean.TRUE.equals(")
                    .big(2, "COND", ") ?")
                    .big(1, "RESULT", " :")
                    .fill("COND", self.expr(&arm.cond)?)
                    .fill("RESULT", self.expr(&arm.result)?)
                    .finish()?,
            );
        }
        Ok(Template::new("ExprCond", e.pos)
            .line("(")
            .big(1, "COND-PARTS", "")
            .big(1, "ELSE-PART", ")")
            .fill("COND-PARTS", parts)
            .fill("ELSE-PART", self.else_part(else_expr)?)
            .finish()?)
    }

    fn else_part(&self, else_expr: Option<&Expr>) -> Result<Substitute> {
        Ok(match else_expr {
            Some(e) => self.expr(e)?.into(),
            None => "null".into(),
        })
    }

    // === Calls ===

    /// A built-in SQL function, evaluated by the server.
    fn builtin_call(&self, e: &Expr, name: &str, args: &[Expr]) -> Result<CodeToResolve> {
        let ty = self.type_of(e)?;
        let idx = ty.idx().ok_or_else(|| missing("result type code", e.pos))?;
        if args.is_empty() {
            return Ok(CodeToResolve::text(
                e.pos,
                format!(
                    "({}) invokeBuiltinFunc(conn, \"{}\", {})",
                    ty.java_code(),
                    name,
                    idx
                ),
            ));
        }
        Ok(Template::new("ExprBuiltinFuncCall", e.pos)
            .line("(%'RESULT-TYPE'%) invokeBuiltinFunc(conn, \"%'NAME'%\", %'RESULT-TYPE-CODE'%,")
            .big(1, "ARGS", "")
            .line(")")
            .set("RESULT-TYPE", ty.java_code())
            .set("NAME", name)
            .set("RESULT-TYPE-CODE", idx.to_string())
            .fill("ARGS", self.expr_list(args)?)
            .finish()?)
    }

    /// A call of a routine declared in the unit or of a DBMS_OUTPUT
    /// procedure, which the runtime library provides as a static method.
    pub(crate) fn local_call(
        &self,
        pos: Pos,
        symbol: &Symbol,
        sig: &RoutineSig,
        args: &[Expr],
        as_stmt: bool,
    ) -> Result<CodeToResolve> {
        let target = match sig.origin {
            RoutineOrigin::DbmsOutput => sig.name.clone(),
            _ => format!("{}{}", self.prefix(symbol), symbol.name),
        };
        if args.is_empty() {
            return Ok(if as_stmt {
                CodeToResolve::text(pos, format!("{}();", target))
            } else {
                CodeToResolve::text(pos, format!("{}()", target))
            });
        }

        let snippets = self.local_snippets(sig, args)?;
        let template = if as_stmt {
            Template::new("StmtLocalProcCall", pos)
                .lines(&[
                    "new Object() { // local procedure call: %'NAME'%",
                    "  void invoke(%'PARAMETERS'%) throws Exception {",
                ])
                .big(2, "ALLOC-COERCED-OUT-ARGS", "")
                .line("    %'TARGET'%(%'ARGS'%);")
                .big(2, "UPDATE-OUT-ARGS", "")
                .lines(&["  }", "}.invoke("])
                .big(1, "ARGUMENTS", "")
                .line(");")
        } else {
            Template::new("ExprLocalFuncCall", pos)
                .lines(&[
                    "(new Object() { // local function call: %'NAME'%",
                    "  %'RETURN-TYPE'% invoke(%'PARAMETERS'%) throws Exception {",
                ])
                .big(2, "ALLOC-COERCED-OUT-ARGS", "")
                .line("    %'RETURN-TYPE'% ret = %'TARGET'%(%'ARGS'%);")
                .big(2, "UPDATE-OUT-ARGS", "")
                .lines(&["    return ret;", "  }", "}.invoke("])
                .big(1, "ARGUMENTS", "")
                .line("))")
                .set("RETURN-TYPE", return_type(sig, pos)?)
        };
        Ok(template
            .set("NAME", symbol.name.as_str())
            .set("TARGET", target)
            .set("PARAMETERS", snippets.params.join(", "))
            .set("ARGS", snippets.args.join(", "))
            .fill("ALLOC-COERCED-OUT-ARGS", snippets.before)
            .fill("UPDATE-OUT-ARGS", snippets.after)
            .fill("ARGUMENTS", self.arguments(sig, args)?)
            .finish()?)
    }

    /// A call of a stored routine of the database, through a
    /// `CallableStatement`.
    pub(crate) fn global_call(
        &self,
        pos: Pos,
        sig: &RoutineSig,
        args: &[Expr],
        as_stmt: bool,
    ) -> Result<CodeToResolve> {
        let marks = vec!["?"; args.len()].join(", ");
        // a function's return value is bound first
        let offset = if as_stmt { 1 } else { 2 };
        let snippets = self.global_snippets(sig, args, offset)?;

        let template = if as_stmt {
            Template::new("StmtGlobalProcCall", pos)
                .lines(&[
                    "new Object() { // global procedure call: %'NAME'%",
                    "  void invoke(%'PARAMETERS'%) throws Exception {",
                    "    try {",
                    "      String dynSql = \"call %'NAME'%(%'MARKS'%)\";",
                    "      CallableStatement stmt = conn.prepareCall(dynSql);",
                ])
                .big(3, "SET-ARGS", "")
                .line("      stmt.execute();")
                .big(3, "UPDATE-OUT-ARGS", "")
                .line("      stmt.close();")
        } else {
            Template::new("ExprGlobalFuncCall", pos)
                .lines(&[
                    "(new Object() { // global function call: %'NAME'%",
                    "  %'RETURN-TYPE'% invoke(%'PARAMETERS'%) throws Exception {",
                    "    try {",
                    "      String dynSql = \"?= call %'NAME'%(%'MARKS'%)\";",
                    "      CallableStatement stmt = conn.prepareCall(dynSql);",
                    "      stmt.registerOutParameter(1, java.sql.Types.OTHER);",
                ])
                .big(3, "SET-ARGS", "")
                .lines(&[
                    "      stmt.execute();",
                    "      %'RETURN-TYPE'% ret = (%'RETURN-TYPE'%) stmt.getObject(1);",
                ])
                .big(3, "UPDATE-OUT-ARGS", "")
                .lines(&["      stmt.close();", "      return ret;"])
                .set("RETURN-TYPE", return_type(sig, pos)?)
        };
        Ok(template
            .lines(&[
                "    } catch (SQLException e) {",
                "      Server.log(e);",
                "      throw new SQL_ERROR(e.getMessage());",
                "    }",
                "  }",
                "}.invoke(",
            ])
            .big(1, "ARGUMENTS", "")
            .line(if as_stmt { ");" } else { "))" })
            .set("NAME", sig.name.as_str())
            .set("MARKS", marks)
            .set("PARAMETERS", snippets.params.join(", "))
            .fill("SET-ARGS", snippets.before)
            .fill("UPDATE-OUT-ARGS", snippets.after)
            .fill("ARGUMENTS", self.arguments(sig, args)?)
            .finish()?)
    }

    /// Values passed to a call wrapper: the array of the variable for an
    /// OUT parameter, the coerced value otherwise.
    fn arguments(&self, sig: &RoutineSig, args: &[Expr]) -> Result<TemplateList> {
        let mut list = TemplateList::with_delimiter(",");
        for (arg, param) in args.iter().zip(&sig.params) {
            if param.mode.is_out() {
                let ident = out_ident(arg)?;
                list.push(CodeToResolve::text(Pos::IGNORED, self.out_arg_code(ident)?));
            } else {
                list.push(self.expr(arg)?);
            }
        }
        Ok(list)
    }

    /// `invoke` parameter of the wrapper for the `i`th argument.
    fn wrapper_param(&self, i: usize, arg: &Expr, param: &ParamSig) -> Result<String> {
        Ok(if param.mode.is_out() {
            format!("{}[] o{}", self.type_of(arg)?.java_code(), i)
        } else {
            format!("{} o{}", param.ty.java_code(), i)
        })
    }

    /// Coercion of an OUT argument into the parameter, and back.
    fn out_coercions(&self, arg: &Expr) -> Result<(&'a Coercion, Coercion)> {
        let c = self
            .deco
            .coercion(arg.id)
            .ok_or_else(|| missing("argument coercion", arg.pos))?;
        let back = c
            .reverse()
            .ok_or_else(|| missing("reverse coercion", arg.pos))?;
        Ok((c, back))
    }

    fn not_null_check(&self, i: usize, arg: &Expr, by: &str) -> Result<Option<String>> {
        let ident = out_ident(arg)?;
        Ok(self.symbol(ident)?.is_not_null().then(|| {
            format!(
                "checkNotNull(o{}[0], \"a not-null variable {} was set NULL by {}\");",
                i, ident.name, by
            )
        }))
    }

    fn local_snippets(&self, sig: &RoutineSig, args: &[Expr]) -> Result<CallSnippets> {
        let mut s = CallSnippets::default();
        for (i, (arg, param)) in args.iter().zip(&sig.params).enumerate() {
            s.params.push(self.wrapper_param(i, arg, param)?);
            if !param.mode.is_out() {
                s.args.push(format!("o{}", i));
                continue;
            }
            let (c, back) = self.out_coercions(arg)?;
            if c.is_identity() {
                s.args.push(format!("o{}", i));
            } else {
                let ty = param.ty.java_code();
                s.before.push(format!(
                    "{0}[] p{1} = new {0}[] {{ {2} }};",
                    ty,
                    i,
                    c.java_code(&format!("o{}[0]", i))
                ));
                s.args.push(format!("p{}", i));
                s.after.push(format!(
                    "o{}[0] = {};",
                    i,
                    back.java_code(&format!("p{}[0]", i))
                ));
            }
            s.after
                .extend(self.not_null_check(i, arg, "this function call")?);
        }
        Ok(s)
    }

    fn global_snippets(
        &self,
        sig: &RoutineSig,
        args: &[Expr],
        offset: usize,
    ) -> Result<CallSnippets> {
        let mut s = CallSnippets::default();
        for (i, (arg, param)) in args.iter().zip(&sig.params).enumerate() {
            s.params.push(self.wrapper_param(i, arg, param)?);
            let k = i + offset;
            if !param.mode.is_out() {
                s.before.push(format!("stmt.setObject({}, o{});", k, i));
                continue;
            }
            let (c, back) = self.out_coercions(arg)?;
            s.before.push(format!(
                "stmt.registerOutParameter({}, java.sql.Types.OTHER);",
                k
            ));
            if param.mode == ParamMode::InOut {
                s.before.push(format!(
                    "stmt.setObject({}, {});",
                    k,
                    c.java_code(&format!("o{}[0]", i))
                ));
            }
            let value = format!("({}) stmt.getObject({})", param.ty.java_code(), k);
            s.after
                .push(format!("o{}[0] = {};", i, back.java_code(&value)));
            s.after.extend(self.not_null_check(i, arg, "this call")?);
        }
        Ok(s)
    }
}

fn out_ident(arg: &Expr) -> Result<&Ident> {
    match &arg.kind {
        ExprKind::Id(ident) => Ok(ident),
        _ => Err(missing("variable for an OUT argument", arg.pos)),
    }
}

fn return_type(sig: &RoutineSig, pos: Pos) -> Result<&'static str> {
    sig.ret
        .map(|ty| ty.java_code())
        .ok_or_else(|| missing("return type", pos))
}
