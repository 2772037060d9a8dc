//! Code templates with holes, resolved into indented lines
//!
//! A template is a list of lines. A line is either text, possibly with
//! small holes `%'NAME'%` replaced inline, or a single big hole that
//! expands to any number of lines at the line's indentation.
//!
//! Small holes a template does not fill are left for the enclosing
//! templates: every line a nested template emits is filled again with the
//! values of each template around it, innermost first.

use plcsql_ast::Pos;
use std::collections::HashMap;
use std::fmt::Write;
use thiserror::Error;

/// Spaces per indentation level
pub const INDENT_WIDTH: usize = 2;

const HOLE_OPEN: &str = "%'";
const HOLE_CLOSE: &str = "'%";

/// Bound on small-hole values that mention further holes
const MAX_NESTED_HOLES: usize = 8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("{template}: no substitute for big hole '{hole}'")]
    MissingSubstitute {
        template: &'static str,
        hole: String,
        pos: Pos,
    },

    #[error("{template}: big hole '{hole}' is filled twice")]
    DuplicateSubstitute {
        template: &'static str,
        hole: String,
        pos: Pos,
    },

    #[error("{template}: there is no big hole '{hole}' to fill")]
    UnknownHole {
        template: &'static str,
        hole: String,
        pos: Pos,
    },

    #[error("{template}: big hole '{hole}' appears on more than one line")]
    RepeatedHole {
        template: &'static str,
        hole: String,
        pos: Pos,
    },

    #[error("{template}: '{hole}' is not a valid hole name")]
    BadHoleName {
        template: &'static str,
        hole: String,
        pos: Pos,
    },
}

impl TemplateError {
    /// Position of the node the template was built for
    pub fn pos(&self) -> Pos {
        match self {
            TemplateError::MissingSubstitute { pos, .. }
            | TemplateError::DuplicateSubstitute { pos, .. }
            | TemplateError::UnknownHole { pos, .. }
            | TemplateError::RepeatedHole { pos, .. }
            | TemplateError::BadHoleName { pos, .. } => *pos,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::MissingSubstitute { .. } => "E-TEMPLATE-001",
            TemplateError::DuplicateSubstitute { .. } => "E-TEMPLATE-002",
            TemplateError::UnknownHole { .. } => "E-TEMPLATE-003",
            TemplateError::RepeatedHole { .. } => "E-TEMPLATE-004",
            TemplateError::BadHoleName { .. } => "E-TEMPLATE-005",
        }
    }
}

/// What fills a big hole
#[derive(Debug)]
pub enum Substitute {
    /// A single literal line, which may contain small holes
    Line(String),
    /// Literal lines, which may contain small holes
    Lines(Vec<String>),
    Code(CodeToResolve),
}

impl Substitute {
    /// A substitute that expands to no lines.
    pub fn empty() -> Self {
        Substitute::Lines(Vec::new())
    }
}

impl From<String> for Substitute {
    fn from(line: String) -> Self {
        Substitute::Line(line)
    }
}

impl From<&str> for Substitute {
    fn from(line: &str) -> Self {
        Substitute::Line(line.to_string())
    }
}

impl From<Vec<String>> for Substitute {
    fn from(lines: Vec<String>) -> Self {
        Substitute::Lines(lines)
    }
}

impl From<CodeToResolve> for Substitute {
    fn from(code: CodeToResolve) -> Self {
        Substitute::Code(code)
    }
}

impl From<TemplateList> for Substitute {
    fn from(list: TemplateList) -> Self {
        Substitute::Code(CodeToResolve::List(list))
    }
}

#[derive(Debug)]
enum Line {
    Text(String),
    Big {
        indent: usize,
        hole: &'static str,
        trailing: String,
    },
}

/// Builder of a code template.
///
/// ```ignore
/// let code = Template::new("ExprUnaryOp", pos)
///     .line("op%'OPERATION'%(")
///     .big(1, "OPERAND", "")
///     .line(")")
///     .set("OPERATION", "Neg")
///     .fill("OPERAND", operand)
///     .finish()?;
/// ```
#[derive(Debug)]
pub struct Template {
    label: &'static str,
    pos: Pos,
    lines: Vec<Line>,
    small: Vec<(String, String)>,
    big: HashMap<&'static str, Substitute>,
    error: Option<TemplateError>,
}

impl Template {
    /// Start a template for an AST node. Nodes at [`Pos::IGNORED`] leave
    /// no provenance marker.
    pub fn new(label: &'static str, pos: Pos) -> Self {
        Self {
            label,
            pos,
            lines: Vec::new(),
            small: Vec::new(),
            big: HashMap::new(),
            error: None,
        }
    }

    /// A text line, which may contain small holes.
    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Text(text.into()));
        self
    }

    /// Several text lines.
    pub fn lines(mut self, texts: &[&str]) -> Self {
        for text in texts {
            self.lines.push(Line::Text(text.to_string()));
        }
        self
    }

    /// A big hole, `indent` levels deeper than the template, followed by
    /// `trailing` text that goes to the end of the last line it expands to.
    pub fn big(mut self, indent: usize, hole: &'static str, trailing: &str) -> Self {
        self.check_name(hole);
        if self
            .lines
            .iter()
            .any(|l| matches!(l, Line::Big { hole: h, .. } if *h == hole))
        {
            self.fail(TemplateError::RepeatedHole {
                template: self.label,
                hole: hole.to_string(),
                pos: self.pos,
            });
        }
        self.lines.push(Line::Big {
            indent,
            hole,
            trailing: trailing.to_string(),
        });
        self
    }

    /// Value of a small hole.
    pub fn set(mut self, hole: &str, value: impl Into<String>) -> Self {
        self.check_name(hole);
        self.small.push((hole.to_string(), value.into()));
        self
    }

    /// Substitute of a big hole.
    pub fn fill(mut self, hole: &'static str, substitute: impl Into<Substitute>) -> Self {
        if self.big.insert(hole, substitute.into()).is_some() {
            self.fail(TemplateError::DuplicateSubstitute {
                template: self.label,
                hole: hole.to_string(),
                pos: self.pos,
            });
        }
        self
    }

    /// Check that every big hole is filled exactly once.
    pub fn finish(self) -> Result<CodeToResolve, TemplateError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        for line in &self.lines {
            if let Line::Big { hole, .. } = line {
                if !self.big.contains_key(hole) {
                    return Err(TemplateError::MissingSubstitute {
                        template: self.label,
                        hole: hole.to_string(),
                        pos: self.pos,
                    });
                }
            }
        }
        for hole in self.big.keys() {
            let used = self
                .lines
                .iter()
                .any(|l| matches!(l, Line::Big { hole: h, .. } if h == hole));
            if !used {
                return Err(TemplateError::UnknownHole {
                    template: self.label,
                    hole: hole.to_string(),
                    pos: self.pos,
                });
            }
        }
        Ok(CodeToResolve::Template(Box::new(Filled {
            pos: self.pos,
            lines: self.lines,
            small: self.small,
            big: self.big,
        })))
    }

    fn check_name(&mut self, hole: &str) {
        if !is_hole_name(hole) {
            self.fail(TemplateError::BadHoleName {
                template: self.label,
                hole: hole.to_string(),
                pos: self.pos,
            });
        }
    }

    fn fail(&mut self, e: TemplateError) {
        if self.error.is_none() {
            self.error = Some(e);
        }
    }
}

fn is_hole_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_uppercase() || b == b'-')
}

/// A template whose big holes are all filled
#[derive(Debug)]
pub struct Filled {
    pos: Pos,
    lines: Vec<Line>,
    small: Vec<(String, String)>,
    big: HashMap<&'static str, Substitute>,
}

/// Elements resolved one after another, with an optional delimiter
/// appended to the last line of every element but the last.
#[derive(Debug, Default)]
pub struct TemplateList {
    pub elements: Vec<CodeToResolve>,
    pub delimiter: Option<&'static str>,
}

impl TemplateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: &'static str) -> Self {
        Self {
            elements: Vec::new(),
            delimiter: Some(delimiter),
        }
    }

    pub fn push(&mut self, element: CodeToResolve) {
        self.elements.push(element);
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Code whose text is produced by resolving it into an [`Output`]
#[derive(Debug)]
pub enum CodeToResolve {
    Template(Box<Filled>),
    List(TemplateList),
}

impl CodeToResolve {
    /// A one-line template.
    pub fn text(pos: Pos, text: impl Into<String>) -> Self {
        CodeToResolve::Template(Box::new(Filled {
            pos,
            lines: vec![Line::Text(text.into())],
            small: Vec::new(),
            big: HashMap::new(),
        }))
    }

    /// Append the lines of this code at `indent` levels.
    pub fn resolve(self, indent: usize, out: &mut Output) {
        let root = Env {
            holes: &[],
            parent: None,
        };
        self.resolve_in(indent, &root, out);
    }

    fn resolve_in(self, indent: usize, env: &Env<'_>, out: &mut Output) {
        match self {
            CodeToResolve::Template(t) => (*t).resolve_in(indent, env, out),
            CodeToResolve::List(list) => {
                for (i, element) in list.elements.into_iter().enumerate() {
                    if i > 0 {
                        if let Some(delimiter) = list.delimiter {
                            out.append_to_last_line(delimiter);
                        }
                    }
                    element.resolve_in(indent, env, out);
                }
            }
        }
    }
}

impl Filled {
    fn resolve_in(self, indent: usize, parent: &Env<'_>, out: &mut Output) {
        let Filled {
            pos,
            lines,
            small,
            mut big,
        } = self;
        let env = Env {
            holes: &small,
            parent: Some(parent),
        };

        let marked = !pos.is_ignored();
        if marked {
            out.open_range(pos);
        }
        for line in lines {
            match line {
                Line::Text(text) => out.push(indent, &env.fill(&text)),
                Line::Big {
                    indent: delta,
                    hole,
                    trailing,
                } => {
                    let at = indent + delta;
                    match big.remove(hole) {
                        Some(Substitute::Line(l)) => out.push(at, &env.fill(&l)),
                        Some(Substitute::Lines(ls)) => {
                            for l in ls {
                                out.push(at, &env.fill(&l));
                            }
                        }
                        Some(Substitute::Code(code)) => code.resolve_in(at, &env, out),
                        // finish() rejects templates with unfilled big holes
                        None => {}
                    }
                    if !trailing.is_empty() {
                        out.append_to_last_line(&env.fill(&trailing));
                    }
                }
            }
        }
        if marked {
            out.close_range();
        }
    }
}

/// Small-hole values of the templates being resolved, innermost first
struct Env<'a> {
    holes: &'a [(String, String)],
    parent: Option<&'a Env<'a>>,
}

impl Env<'_> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.holes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }

    fn fill(&self, line: &str) -> String {
        self.fill_nested(line, 0)
    }

    fn fill_nested(&self, line: &str, depth: usize) -> String {
        let mut filled = String::with_capacity(line.len());
        let mut rest = line;
        while let Some((before, name, after)) = next_hole(rest) {
            filled.push_str(before);
            match self.lookup(name) {
                Some(value) if depth < MAX_NESTED_HOLES => {
                    filled.push_str(&self.fill_nested(value, depth + 1))
                }
                _ => {
                    filled.push_str(HOLE_OPEN);
                    filled.push_str(name);
                    filled.push_str(HOLE_CLOSE);
                }
            }
            rest = after;
        }
        filled.push_str(rest);
        filled
    }
}

/// Split `text` around its first well-formed small hole.
fn next_hole(text: &str) -> Option<(&str, &str, &str)> {
    let mut from = 0;
    while let Some(i) = text[from..].find(HOLE_OPEN) {
        let start = from + i;
        let name_start = start + HOLE_OPEN.len();
        if let Some(len) = text[name_start..].find(HOLE_CLOSE) {
            let name = &text[name_start..name_start + len];
            if is_hole_name(name) {
                let after = &text[name_start + len + HOLE_CLOSE.len()..];
                return Some((&text[..start], name, after));
            }
        }
        from = start + 1;
    }
    None
}

/// Names of the small holes left in a line
pub fn holes_in(line: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = line;
    while let Some((_, name, after)) = next_hole(rest) {
        names.push(name);
        rest = after;
    }
    names
}

/// Lines of generated code and the provenance markers of their ranges
#[derive(Debug, Default)]
pub struct Output {
    lines: Vec<String>,
    markers: String,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line at `indent` levels; blank lines are dropped.
    pub fn push(&mut self, indent: usize, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let mut line = " ".repeat(indent * INDENT_WIDTH);
        line.push_str(text);
        self.lines.push(line);
    }

    pub fn append_to_last_line(&mut self, text: &str) {
        if let Some(last) = self.lines.last_mut() {
            last.push_str(text);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn markers(&self) -> &str {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, String) {
        (self.lines, self.markers)
    }

    fn open_range(&mut self, pos: Pos) {
        let _ = write!(
            self.markers,
            " ({},{},{}",
            self.lines.len() + 1,
            pos.line,
            pos.column
        );
    }

    fn close_range(&mut self) {
        let _ = write!(self.markers, " ){}", self.lines.len() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(code: CodeToResolve) -> Output {
        let mut out = Output::new();
        code.resolve(0, &mut out);
        out
    }

    #[test]
    fn test_small_holes_and_blank_lines() {
        let code = Template::new("t", Pos::IGNORED)
            .line("int %'NAME'% = %'VALUE'%;")
            .line("%'EMPTY'%")
            .set("NAME", "x")
            .set("VALUE", "1")
            .set("EMPTY", "")
            .finish()
            .unwrap();
        assert_eq!(resolved(code).lines(), ["int x = 1;"]);
    }

    #[test]
    fn test_big_hole_indentation_and_trailing() {
        let code = Template::new("t", Pos::IGNORED)
            .line("f(")
            .big(1, "ARGS", ");")
            .fill("ARGS", vec!["a,".to_string(), "b".to_string()])
            .finish()
            .unwrap();
        assert_eq!(resolved(code).lines(), ["f(", "  a,", "  b);"]);
    }

    #[test]
    fn test_parent_fills_child_holes() {
        let child = Template::new("child", Pos::IGNORED)
            .line("stmt_%'LEVEL'%.close();")
            .finish()
            .unwrap();
        let parent = Template::new("parent", Pos::IGNORED)
            .line("{")
            .big(1, "BODY", "")
            .line("}")
            .set("LEVEL", "3")
            .fill("BODY", child)
            .finish()
            .unwrap();
        assert_eq!(
            resolved(parent).lines(),
            ["{", "  stmt_3.close();", "}"]
        );
    }

    #[test]
    fn test_hole_values_may_mention_holes() {
        let code = Template::new("t", Pos::IGNORED)
            .line("%'LABEL'%")
            .set("LABEL", "outer_%'LEVEL'%:")
            .set("LEVEL", "4")
            .finish()
            .unwrap();
        assert_eq!(resolved(code).lines(), ["outer_4:"]);
    }

    #[test]
    fn test_list_delimiter() {
        let mut list = TemplateList::with_delimiter(",");
        list.push(CodeToResolve::text(Pos::IGNORED, "a"));
        list.push(CodeToResolve::text(Pos::IGNORED, "b"));
        list.push(CodeToResolve::text(Pos::IGNORED, "c"));
        let out = resolved(CodeToResolve::List(list));
        assert_eq!(out.lines(), ["a,", "b,", "c"]);
    }

    #[test]
    fn test_markers() {
        let inner = CodeToResolve::text(Pos::new(3, 5), "x");
        let outer = Template::new("outer", Pos::new(2, 1))
            .line("(")
            .big(1, "E", "")
            .line(")")
            .fill("E", inner)
            .finish()
            .unwrap();
        let out = resolved(outer);
        assert_eq!(out.markers(), " (1,2,1 (2,3,5 )3 )4");
    }

    #[test]
    fn test_unfilled_big_hole() {
        let err = Template::new("t", Pos::IGNORED)
            .big(0, "BODY", "")
            .finish()
            .unwrap_err();
        assert!(matches!(err, TemplateError::MissingSubstitute { .. }));

        let err = Template::new("t", Pos::IGNORED)
            .line("x")
            .fill("BODY", "y")
            .finish()
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownHole { .. }));
    }

    #[test]
    fn test_not_a_hole() {
        // SQL text such as LIKE patterns must survive untouched
        let code = Template::new("t", Pos::IGNORED)
            .line("\"select * from t where a like '%' || b || '%'\"")
            .finish()
            .unwrap();
        let out = resolved(code);
        assert_eq!(out.lines()[0], "\"select * from t where a like '%' || b || '%'\"");
        assert!(holes_in(&out.lines()[0]).is_empty());
    }
}
