//! The Java class of a unit: its skeleton, declarations and bodies
//!
//! Names follow the layout of the generated class. Declarations of a
//! routine or block live as fields of a local class `Decl_of_<block>`,
//! instantiated as `<block>`, so a variable `x` of block `p_2` is written
//! `p_2.x[0]` outside that class and `x[0]` inside it.

use std::collections::{BTreeSet, HashMap};
use std::mem;

use plcsql_ast::{
    Body, Decl, DeclKind, ExHandler, Ident, NodeId, Param, ParamMode, Pos, Routine, StaticSql,
    Stmt, StmtKind, Unit,
};
use plcsql_checker::Decorations;
use plcsql_symbols::predefined::OTHERS;
use plcsql_symbols::{Resolution, Symbol, SymbolKind};
use plcsql_types::Type;

use crate::template::{holes_in, CodeToResolve, Output, Substitute, Template, TemplateList};
use crate::{CodegenError, CodegenOptions, GeneratedUnit};

pub(crate) type Result<T> = std::result::Result<T, CodegenError>;

const NOT_NULL_VIOLATED: &str = "\"NOT NULL constraint violated\"";

pub(crate) struct JavaWriter<'a> {
    pub(crate) unit: &'a Unit,
    pub(crate) res: &'a Resolution,
    pub(crate) deco: &'a Decorations,
    options: &'a CodegenOptions,
    /// SQL of every explicit cursor, by cursor declaration id
    pub(crate) cursors: HashMap<NodeId, &'a StaticSql>,
    /// Declaration classes whose body is being written
    open_blocks: Vec<String>,
    /// Levels of the exception handlers around the current statement
    pub(crate) handlers: Vec<u32>,
}

impl<'a> JavaWriter<'a> {
    pub(crate) fn new(
        unit: &'a Unit,
        res: &'a Resolution,
        deco: &'a Decorations,
        options: &'a CodegenOptions,
    ) -> Self {
        let mut cursors = HashMap::new();
        collect_routine_cursors(&unit.routine, &mut cursors);
        Self {
            unit,
            res,
            deco,
            options,
            cursors,
            open_blocks: Vec::new(),
            handlers: Vec::new(),
        }
    }

    pub(crate) fn generate(mut self) -> Result<GeneratedUnit> {
        let class_name = format!("{}{}", self.options.class_name_prefix, self.unit.class_name());
        let code = self.unit_code(&class_name)?;

        let mut out = Output::new();
        code.resolve(0, &mut out);
        let (mut lines, markers) = out.into_parts();
        for (i, line) in lines.iter().enumerate() {
            if let Some(hole) = holes_in(line).first() {
                return Err(CodegenError::UnresolvedHole {
                    hole: hole.to_string(),
                    line: i + 1,
                });
            }
        }

        lines.push(format!(
            "  private static List<CodeRangeMarker> codeRangeMarkerList = buildCodeRangeMarkerList(\"{}\");",
            markers
        ));
        lines.push("}".to_string());

        tracing::debug!(class = %class_name, lines = lines.len(), "java class generated");
        Ok(GeneratedUnit {
            class_name,
            lines,
            markers,
        })
    }

    // === Unit ===

    fn unit_code(&mut self, class_name: &str) -> Result<CodeToResolve> {
        let unit = self.unit;
        let routine = &unit.routine;

        let parameters: Substitute = if routine.params.is_empty() {
            self.placeholder("// no parameters")
        } else {
            self.params(&routine.params)?.into()
        };
        let connection: Substitute = if self.deco.uses_connection() {
            format!(
                "Connection conn = DriverManager.getConnection(\"jdbc:default:connection::?autonomous_transaction={}\");",
                unit.autonomous_transaction
            )
            .into()
        } else {
            self.placeholder("// no SQL")
        };
        let decl_class = self.decl_class(routine.id, &routine.decls, true)?;
        let body = self.body(&routine.body)?;

        let template = Template::new("Unit", routine.pos)
            .big(0, "IMPORTS", "")
            .lines(&[
                "import static com.cubrid.plcsql.predefined.sp.SpLib.*;",
                "",
                "public class %'CLASS-NAME'% {",
                "",
                "  public static %'RETURN-TYPE'% %'METHOD-NAME'%(",
            ])
            .big(3, "PARAMETERS", "")
            .line("    ) throws Exception {")
            .big(2, "NULLIFY-OUT-PARAMETERS", "")
            .lines(&[
                "    try {",
                "      Long[] sql_rowcount = new Long[] { null };",
            ])
            .big(3, "GET-CONNECTION", "")
            .big(3, "DECL-CLASS", "")
            .big(3, "BODY", "")
            .lines(&[
                "    } catch (PlcsqlRuntimeError e) {",
                "      Throwable c = e.getCause();",
                "      int[] pos = getPlcLineColumn(codeRangeMarkerList, c == null ? e : c, \"%'CLASS-NAME'%.java\");",
                "      throw e.setPlcLineColumn(pos);",
                "    } catch (OutOfMemoryError e) {",
                "      Server.log(e);",
                "      int[] pos = getPlcLineColumn(codeRangeMarkerList, e, \"%'CLASS-NAME'%.java\");",
                "      throw new STORAGE_ERROR().setPlcLineColumn(pos);",
                "    } catch (Throwable e) {",
                "      Server.log(e);",
                "      int[] pos = getPlcLineColumn(codeRangeMarkerList, e, \"%'CLASS-NAME'%.java\");",
                "      throw new PROGRAM_ERROR().setPlcLineColumn(pos);",
                "    }",
                "  }",
            ])
            .set("CLASS-NAME", class_name)
            .set("RETURN-TYPE", self.return_type(routine)?)
            .set("METHOD-NAME", routine.name.to_ascii_lowercase())
            .fill("IMPORTS", self.imports())
            .fill("PARAMETERS", parameters)
            .fill("NULLIFY-OUT-PARAMETERS", nullify_out_params(&routine.params))
            .fill("GET-CONNECTION", connection)
            .fill("DECL-CLASS", decl_class)
            .fill("BODY", body);
        Ok(template.finish()?)
    }

    fn imports(&self) -> Vec<String> {
        let mut imports: BTreeSet<&str> = self.deco.imports().collect();
        imports.insert("com.cubrid.jsp.Server");
        imports.insert("com.cubrid.plcsql.predefined.PlcsqlRuntimeError");
        imports.insert("java.util.List");
        if self.deco.uses_connection() {
            imports.insert("java.sql.*");
        }
        imports
            .into_iter()
            .map(|i| format!("import {};", i))
            .collect()
    }

    fn placeholder(&self, text: &str) -> Substitute {
        if self.options.stage_placeholders {
            text.into()
        } else {
            Substitute::empty()
        }
    }

    fn return_type(&self, routine: &Routine) -> Result<&'static str> {
        if routine.is_procedure() {
            return Ok("void");
        }
        self.res
            .declared(routine.id)
            .and_then(Symbol::routine)
            .and_then(|sig| sig.ret)
            .map(|ty| ty.java_code())
            .ok_or_else(|| missing("return type", routine.pos))
    }

    /// Parameters of a routine, `T name` for IN and `T[] name` otherwise.
    fn params(&self, params: &[Param]) -> Result<TemplateList> {
        let mut list = TemplateList::with_delimiter(",");
        for p in params {
            let ty = self
                .res
                .declared(p.id)
                .and_then(Symbol::value_type)
                .ok_or_else(|| missing("parameter type", p.pos))?;
            let brackets = if p.mode.is_out() { "[]" } else { "" };
            list.push(CodeToResolve::text(
                Pos::IGNORED,
                format!(
                    "{}{} {}",
                    ty.java_code(),
                    brackets,
                    p.name.to_ascii_lowercase()
                ),
            ));
        }
        Ok(list)
    }

    // === Declarations ===

    /// The local class holding the declarations of a routine or block.
    pub(crate) fn decl_class(
        &mut self,
        owner: NodeId,
        decls: &[Decl],
        placeholder: bool,
    ) -> Result<Substitute> {
        if decls.is_empty() {
            return Ok(if placeholder {
                self.placeholder("// no declarations")
            } else {
                Substitute::empty()
            });
        }
        let block = self
            .res
            .block_name(owner)
            .ok_or_else(|| missing("declaration block", Pos::IGNORED))?
            .to_string();

        self.open_blocks.push(block.clone());
        let declarations = self.decls(decls);
        self.open_blocks.pop();

        let template = Template::new("DeclClass", Pos::IGNORED)
            .lines(&[
                "class Decl_of_%'BLOCK'% {",
                "  Decl_of_%'BLOCK'%() throws Exception {};",
            ])
            .big(1, "DECLARATIONS", "")
            .lines(&[
                "}",
                "Decl_of_%'BLOCK'% %'BLOCK'% = new Decl_of_%'BLOCK'%();",
            ])
            .set("BLOCK", block)
            .fill("DECLARATIONS", declarations?);
        Ok(template.finish()?.into())
    }

    fn decls(&mut self, decls: &[Decl]) -> Result<TemplateList> {
        let mut list = TemplateList::new();
        for d in decls {
            list.push(self.decl(d)?);
        }
        Ok(list)
    }

    fn decl(&mut self, d: &Decl) -> Result<CodeToResolve> {
        match &d.kind {
            DeclKind::Var { not_null, init, .. } => {
                let ty = self.declared_type(d)?.java_code();
                let name = d.name().to_ascii_lowercase();
                let Some(init) = init else {
                    return Ok(CodeToResolve::text(
                        Pos::IGNORED,
                        format!("{}[] {} = new {}[] {{ null }};", ty, name, ty),
                    ));
                };
                let value = self.expr(init)?;
                let template = if *not_null {
                    Template::new("DeclVar", d.pos)
                        .line("%'TYPE'%[] %'NAME'% = new %'TYPE'%[] { checkNotNull(")
                        .big(1, "VALUE", &format!(", {}) }};", NOT_NULL_VIOLATED))
                } else {
                    Template::new("DeclVar", Pos::IGNORED)
                        .line("%'TYPE'%[] %'NAME'% = new %'TYPE'%[] {")
                        .big(1, "VALUE", "")
                        .line("};")
                };
                Ok(template
                    .set("TYPE", ty)
                    .set("NAME", name)
                    .fill("VALUE", value)
                    .finish()?)
            }
            DeclKind::Const {
                not_null, value, ..
            } => {
                let ty = self.declared_type(d)?.java_code();
                let value = self.expr(value)?;
                let template = if *not_null {
                    Template::new("DeclConst", d.pos)
                        .line("final %'TYPE'% %'NAME'% = checkNotNull(")
                        .big(1, "VALUE", &format!(", {});", NOT_NULL_VIOLATED))
                } else {
                    Template::new("DeclConst", Pos::IGNORED)
                        .line("final %'TYPE'% %'NAME'% =")
                        .big(1, "VALUE", ";")
                };
                Ok(template
                    .set("TYPE", ty)
                    .set("NAME", d.name().to_ascii_lowercase())
                    .fill("VALUE", value)
                    .finish()?)
            }
            DeclKind::Cursor { name, sql, .. } => Ok(CodeToResolve::text(
                Pos::IGNORED,
                format!(
                    "final Query {} = new Query({});",
                    name.to_ascii_lowercase(),
                    java_string(&sql.text)
                ),
            )),
            DeclKind::Exception { name } => Ok(CodeToResolve::text(
                Pos::IGNORED,
                format!("class {} extends $APP_ERROR {{}}", name.to_ascii_lowercase()),
            )),
            DeclKind::Procedure(r) | DeclKind::Function(r) => self.routine(r),
        }
    }

    fn declared_type(&self, d: &Decl) -> Result<Type> {
        self.res
            .declared(d.id)
            .and_then(Symbol::value_type)
            .ok_or_else(|| missing("declared type", d.pos))
    }

    /// A local procedure or function, as a method of the enclosing
    /// declaration class.
    fn routine(&mut self, r: &Routine) -> Result<CodeToResolve> {
        let params: Substitute = if r.params.is_empty() {
            Substitute::empty()
        } else {
            self.params(&r.params)?.into()
        };

        let saved = mem::take(&mut self.handlers);
        let parts = self
            .decl_class(r.id, &r.decls, false)
            .and_then(|decl_class| Ok((decl_class, self.body(&r.body)?)));
        self.handlers = saved;
        let (decl_class, body) = parts?;

        let template = Template::new("DeclRoutine", r.pos)
            .line("%'RETURN-TYPE'% %'NAME'%(")
            .big(2, "PARAMETERS", "")
            .line("  ) throws Exception {")
            .big(1, "NULLIFY-OUT-PARAMETERS", "")
            .big(1, "DECL-CLASS", "")
            .big(1, "BODY", "")
            .line("}")
            .set("RETURN-TYPE", self.return_type(r)?)
            .set("NAME", r.name.to_ascii_lowercase())
            .fill("PARAMETERS", params)
            .fill("NULLIFY-OUT-PARAMETERS", nullify_out_params(&r.params))
            .fill("DECL-CLASS", decl_class)
            .fill("BODY", body);
        Ok(template.finish()?)
    }

    // === Bodies ===

    pub(crate) fn body(&mut self, body: &Body) -> Result<CodeToResolve> {
        let stmts = self.stmts(&body.stmts)?;
        if body.handlers.is_empty() {
            return Ok(CodeToResolve::List(stmts));
        }

        let mut catches = TemplateList::new();
        for h in &body.handlers {
            catches.push(self.handler(h)?);
        }
        let template = Template::new("Body", Pos::IGNORED)
            .lines(&["try {", "  try {"])
            .big(2, "STATEMENTS", "")
            .lines(&[
                "  } catch (PlcsqlRuntimeError e) {",
                "    throw e;",
                "  } catch (OutOfMemoryError e) {",
                "    Server.log(e);",
                "    throw new STORAGE_ERROR().initCause(e);",
                "  } catch (Throwable e) {",
                "    Server.log(e);",
                "    throw new PROGRAM_ERROR().initCause(e);",
                "  }",
                "}",
            ])
            .big(0, "CATCHES", "")
            .fill("STATEMENTS", stmts)
            .fill("CATCHES", catches);
        Ok(template.finish()?)
    }

    fn handler(&mut self, h: &ExHandler) -> Result<CodeToResolve> {
        let level = self
            .res
            .level(h.id)
            .ok_or_else(|| missing("handler level", h.pos))?;

        let mut exceptions = Vec::with_capacity(h.names.len());
        for name in &h.names {
            if name.name.eq_ignore_ascii_case(OTHERS) {
                exceptions.push("PlcsqlRuntimeError".to_string());
                continue;
            }
            let symbol = self.symbol(name)?;
            exceptions.push(match (&symbol.kind, &symbol.block) {
                (SymbolKind::Exception { predefined: true }, _) => symbol.name.to_ascii_uppercase(),
                (_, Some(block)) if !self.is_open(block) => {
                    format!("Decl_of_{}.{}", block, symbol.name)
                }
                _ => symbol.name.clone(),
            });
        }

        self.handlers.push(level);
        let stmts = self.stmts(&h.stmts);
        self.handlers.pop();

        let template = Template::new("ExHandler", Pos::IGNORED)
            .line("catch (%'EXCEPTIONS'% e%'DEPTH'%) {")
            .big(1, "STATEMENTS", "")
            .line("}")
            .set("EXCEPTIONS", exceptions.join(" | "))
            .set("DEPTH", level.to_string())
            .fill("STATEMENTS", stmts?);
        Ok(template.finish()?)
    }

    pub(crate) fn stmts(&mut self, stmts: &[Stmt]) -> Result<TemplateList> {
        let mut list = TemplateList::new();
        for s in stmts {
            list.push(self.stmt(s)?);
        }
        Ok(list)
    }

    // === Names ===

    pub(crate) fn symbol(&self, ident: &Ident) -> Result<&'a Symbol> {
        self.res
            .referenced(ident.id)
            .ok_or_else(|| missing("symbol", ident.pos))
    }

    fn is_open(&self, block: &str) -> bool {
        self.open_blocks.iter().any(|b| b == block)
    }

    /// `block.` for a declaration-class member referenced from outside
    /// its class.
    pub(crate) fn prefix(&self, symbol: &Symbol) -> String {
        match &symbol.block {
            Some(block) if !self.is_open(block) => format!("{}.", block),
            _ => String::new(),
        }
    }

    /// Java expression of an identifier used as a value or an
    /// assignment target.
    pub(crate) fn ident_code(&self, ident: &Ident) -> Result<String> {
        let symbol = self.symbol(ident)?;
        let name = &symbol.name;
        Ok(match &symbol.kind {
            SymbolKind::Var { .. } => format!("{}{}[0]", self.prefix(symbol), name),
            SymbolKind::Const { .. } | SymbolKind::Cursor { .. } => {
                format!("{}{}", self.prefix(symbol), name)
            }
            SymbolKind::Param {
                mode: ParamMode::In,
                ..
            } => name.clone(),
            SymbolKind::Param { .. } => format!("{}[0]", name),
            SymbolKind::Iterator => format!("{}_i{}[0]", name, symbol.level),
            SymbolKind::Record(_) => format!("{}_r{}", name, symbol.level),
            SymbolKind::CursorParam { .. }
            | SymbolKind::Exception { .. }
            | SymbolKind::Routine(_)
            | SymbolKind::Label => name.clone(),
        })
    }

    /// The one-element array holding a variable or OUT parameter, passed
    /// for an OUT argument.
    pub(crate) fn out_arg_code(&self, ident: &Ident) -> Result<String> {
        let symbol = self.symbol(ident)?;
        Ok(match &symbol.kind {
            SymbolKind::Var { .. } => format!("{}{}", self.prefix(symbol), symbol.name),
            _ => symbol.name.clone(),
        })
    }

    /// Level of the scope a statement runs in, or opens.
    pub(crate) fn level(&self, s: &Stmt) -> Result<u32> {
        self.res
            .level(s.id)
            .ok_or_else(|| missing("scope level", s.pos))
    }
}

pub(crate) fn missing(what: &'static str, pos: Pos) -> CodegenError {
    CodegenError::MissingDecoration { what, pos }
}

fn nullify_out_params(params: &[Param]) -> Vec<String> {
    params
        .iter()
        .filter(|p| p.mode == ParamMode::Out)
        .map(|p| format!("{}[0] = null;", p.name.to_ascii_lowercase()))
        .collect()
}

/// A Java string literal with the given content. `%'` is written as a
/// unicode escape so that user text never reads as a template hole.
pub(crate) fn java_string(text: &str) -> String {
    let mut lit = String::with_capacity(text.len() + 2);
    lit.push('"');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => lit.push_str("\\\\"),
            '"' => lit.push_str("\\\""),
            '\n' => lit.push_str("\\n"),
            '\r' => lit.push_str("\\r"),
            '\t' => lit.push_str("\\t"),
            '%' if chars.peek() == Some(&'\'') => lit.push_str("\\u0025"),
            c => lit.push(c),
        }
    }
    lit.push('"');
    lit
}

fn collect_routine_cursors<'a>(r: &'a Routine, cursors: &mut HashMap<NodeId, &'a StaticSql>) {
    collect_decl_cursors(&r.decls, cursors);
    collect_body_cursors(&r.body, cursors);
}

fn collect_decl_cursors<'a>(decls: &'a [Decl], cursors: &mut HashMap<NodeId, &'a StaticSql>) {
    for d in decls {
        match &d.kind {
            DeclKind::Cursor { sql, .. } => {
                cursors.insert(d.id, sql);
            }
            DeclKind::Procedure(r) | DeclKind::Function(r) => collect_routine_cursors(r, cursors),
            _ => {}
        }
    }
}

fn collect_body_cursors<'a>(body: &'a Body, cursors: &mut HashMap<NodeId, &'a StaticSql>) {
    collect_stmt_cursors(&body.stmts, cursors);
    for h in &body.handlers {
        collect_stmt_cursors(&h.stmts, cursors);
    }
}

fn collect_stmt_cursors<'a>(stmts: &'a [Stmt], cursors: &mut HashMap<NodeId, &'a StaticSql>) {
    for s in stmts {
        match &s.kind {
            StmtKind::Block { decls, body } => {
                collect_decl_cursors(decls, cursors);
                collect_body_cursors(body, cursors);
            }
            StmtKind::If { arms, else_stmts } | StmtKind::SearchedCase { arms, else_stmts } => {
                for arm in arms {
                    collect_stmt_cursors(&arm.stmts, cursors);
                }
                if let Some(stmts) = else_stmts {
                    collect_stmt_cursors(stmts, cursors);
                }
            }
            StmtKind::Case {
                arms, else_stmts, ..
            } => {
                for arm in arms {
                    collect_stmt_cursors(&arm.stmts, cursors);
                }
                if let Some(stmts) = else_stmts {
                    collect_stmt_cursors(stmts, cursors);
                }
            }
            StmtKind::Loop { stmts, .. }
            | StmtKind::While { stmts, .. }
            | StmtKind::ForIter { stmts, .. }
            | StmtKind::ForCursor { stmts, .. }
            | StmtKind::ForStaticSql { stmts, .. }
            | StmtKind::ForDynamicSql { stmts, .. } => collect_stmt_cursors(stmts, cursors),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_string_escapes() {
        assert_eq!(java_string("it's"), "\"it's\"");
        assert_eq!(java_string("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }

    #[test]
    fn test_java_string_never_forms_a_hole() {
        let lit = java_string("%'LEVEL'%");
        assert_eq!(lit, "\"\\u0025'LEVEL'%\"");
        assert!(holes_in(&lit).is_empty());
        // a lone percent sign stays as it is
        assert_eq!(java_string("50%"), "\"50%\"");
    }

    #[test]
    fn test_nullify_only_pure_out_params() {
        let param = |name: &str, mode| Param {
            id: NodeId::default(),
            pos: Pos::IGNORED,
            name: name.into(),
            mode,
            type_spec: plcsql_ast::TypeSpec::Simple(plcsql_ast::SqlType::Int),
        };
        let params = vec![
            param("A", ParamMode::In),
            param("B", ParamMode::Out),
            param("C", ParamMode::InOut),
        ];
        assert_eq!(nullify_out_params(&params), ["b[0] = null;"]);
    }
}
