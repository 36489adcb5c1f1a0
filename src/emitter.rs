//! Emitter: documents to YAML text.
//!
//! Emission runs in two passes over the graph reachable from the root:
//!
//! 1. **Reference counting** by identity, in the order nodes are first
//!    written. Every node reached more than once gets an anchor name
//!    (`id001`, `id002`, ...). Dangling node ids are rejected here, before
//!    any output is produced.
//! 2. **Writing**. The first occurrence of an anchored node carries `&name`,
//!    later occurrences are written as `*name`. Because the anchor always
//!    precedes the node's children, cycles need no special form.
//!
//! Scalars are written in the least quoted style that reads back as the same
//! value; see [`Emitter`] for the rules.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::config::{CollectionStyle, CyclePolicy, EmitConfig, QuoteStyle};
use crate::error::EmitError;
use crate::resolver;
use crate::value::{Document, NodeId, Value};

/// Longest text written as an implicit (`key: value`) mapping key.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

/// Characters that may not start a plain scalar.
const INDICATORS: &str = "-?:,[]{}#&*!|>'\"%@`";

/// Where a node is written.
#[derive(Debug, Clone, Copy)]
enum Pos {
    /// Start of the document, column 0
    Root,
    /// After `- `, `? ` or `: `; block content continues at this column
    Inline(usize),
    /// After `key:`; nested block content goes to this column
    Value(usize),
}

/// How a string scalar is written.
#[derive(Debug)]
enum ScalarForm {
    Plain(String),
    SingleQuoted(String),
    DoubleQuoted(String),
    /// `|` block with its chomping header
    Literal {
        header: &'static str,
        lines: Vec<String>,
    },
}

/// YAML printable characters.
fn is_printable(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{7E}'
        | '\u{85}'
        | '\u{A0}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
        && c != '\u{FEFF}'
}

/// Characters that can appear unescaped on a single line.
fn is_safe_inline(c: char) -> bool {
    is_printable(c) && !matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Check whether a string can be written without quotes.
fn plain_allowed(s: &str, flow: bool) -> bool {
    let first = match s.chars().next() {
        Some(c) => c,
        None => return false,
    };
    if INDICATORS.contains(first) || first == ' ' {
        return false;
    }
    if s.starts_with("...") || s.ends_with(' ') || s.ends_with(':') {
        return false;
    }
    if s.contains(": ") || s.contains(" #") {
        return false;
    }
    if s.chars().any(|c| c == '\t' || !is_safe_inline(c)) {
        return false;
    }
    if flow && s.contains(|c: char| matches!(c, ',' | '[' | ']' | '{' | '}')) {
        return false;
    }
    resolver::is_plain_string(s)
}

/// Check whether a string can be written in single quotes.
fn single_quoted_allowed(s: &str) -> bool {
    s.chars().all(is_safe_inline)
}

/// Check whether a multi-line string can be written as a literal block.
fn literal_allowed(s: &str) -> bool {
    let body = s.trim_end_matches('\n');
    if !body.contains('\n') && body.len() == s.len() {
        return false;
    }
    if !body.chars().any(|c| !c.is_whitespace()) {
        return false;
    }
    // The first content line fixes the indentation when reading back.
    let first_line = body.split('\n').find(|line| !line.is_empty());
    if first_line.is_some_and(|line| line.starts_with([' ', '\t'])) {
        return false;
    }
    body.chars()
        .all(|c| c == '\n' || (is_safe_inline(c) && c != '\r'))
}

fn single_quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\x0B' => out.push_str("\\v"),
            '\x0C' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\x1B' => out.push_str("\\e"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if !is_printable(c) => {
                let code = c as u32;
                if code <= 0xFF {
                    out.push_str(&format!("\\x{:02X}", code));
                } else if code <= 0xFFFF {
                    out.push_str(&format!("\\u{:04X}", code));
                } else {
                    out.push_str(&format!("\\U{:08X}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn literal(s: &str) -> ScalarForm {
    let body = s.trim_end_matches('\n');
    let trailing = s.len() - body.len();
    let header = match trailing {
        0 => "|-",
        1 => "|",
        _ => "|+",
    };
    let mut lines: Vec<String> = body.split('\n').map(str::to_string).collect();
    // Keep chomping: extra line breaks become empty lines.
    for _ in 1..trailing {
        lines.push(String::new());
    }
    ScalarForm::Literal { header, lines }
}

/// Float text that always reads back as a float.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{:?}", f)
    }
}

/// Break `text` at single spaces so lines stay within `width` columns.
fn fold(text: &str, start_col: usize, width: usize, continuation: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        let single_space = c == ' '
            && i > 0
            && chars[i - 1] != ' '
            && chars.get(i + 1).is_some_and(|&n| n != ' ');
        if single_space {
            segments.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    segments.push(current);

    let mut out = String::with_capacity(text.len());
    let mut col = start_col;
    for (i, segment) in segments.iter().enumerate() {
        let len = segment.chars().count();
        if i == 0 {
            out.push_str(segment);
            col += len;
        } else if col + 1 + len > width {
            out.push('\n');
            out.push_str(&" ".repeat(continuation));
            out.push_str(segment);
            col = continuation + len;
        } else {
            out.push(' ');
            out.push_str(segment);
            col += 1 + len;
        }
    }
    out
}

/// Writes documents as YAML text.
///
/// Collections are written in block style unless [`EmitConfig::style`] asks
/// for flow style; empty collections are always `[]` / `{}`. With
/// [`QuoteStyle::Auto`] a string is written:
///
/// - plain, when it reads back as the same string and contains nothing the
///   scanner would treat as structure;
/// - single-quoted, when it is a single printable line;
/// - as a literal block (`|`, `|-` or `|+`), when it spans several lines in a
///   block value position;
/// - double-quoted with escapes otherwise.
#[derive(Debug, Clone)]
pub struct Emitter<'c> {
    config: &'c EmitConfig,
}

impl<'c> Emitter<'c> {
    /// Create an emitter, validating the configuration.
    pub fn new(config: &'c EmitConfig) -> Result<Self, EmitError> {
        if config.indent < 1 {
            return Err(EmitError::InvalidConfig {
                reason: "indent must be at least 1",
            });
        }
        if config.line_width == Some(0) {
            return Err(EmitError::InvalidConfig {
                reason: "line width must be at least 1",
            });
        }
        Ok(Self { config })
    }

    /// Write one document.
    pub fn emit(&self, doc: &Document) -> Result<String, EmitError> {
        let mut out = String::new();
        self.write_document(doc, self.config.explicit_start, false, &mut out)?;
        Ok(out)
    }

    /// Write several documents, separated by `---`.
    ///
    /// A document that carries directives is preceded by `...` so the
    /// directives do not run into the previous document.
    pub fn emit_all(&self, docs: &[Document]) -> Result<String, EmitError> {
        let mut out = String::new();
        for (i, doc) in docs.iter().enumerate() {
            self.write_document(doc, self.config.explicit_start || i > 0, i > 0, &mut out)?;
        }
        Ok(out)
    }

    fn write_document(
        &self,
        doc: &Document,
        explicit_start: bool,
        follows_document: bool,
        out: &mut String,
    ) -> Result<(), EmitError> {
        let anchors = assign_anchors(doc)?;
        if follows_document && (doc.version().is_some() || !doc.tag_directives().is_empty()) {
            out.push_str("...\n");
        }
        let mut writer = Writer {
            doc,
            config: self.config,
            out,
            anchors,
            emitted: HashSet::new(),
            in_progress: HashSet::new(),
        };

        let mut has_directives = false;
        if let Some((major, minor)) = doc.version() {
            writer.out.push_str(&format!("%YAML {}.{}\n", major, minor));
            has_directives = true;
        }
        for (handle, prefix) in doc.tag_directives() {
            writer.out.push_str(&format!("%TAG {} {}\n", handle, prefix));
            has_directives = true;
        }

        if explicit_start || has_directives {
            writer.out.push_str("---");
            writer.write_node(doc.root_id(), Pos::Value(0), 0)
        } else {
            writer.write_node(doc.root_id(), Pos::Root, 0)
        }
    }
}

/// Count references by identity and name the shared nodes.
fn assign_anchors(doc: &Document) -> Result<HashMap<NodeId, String>, EmitError> {
    let mut counts: IndexMap<NodeId, usize> = IndexMap::new();
    let mut pending = vec![doc.root_id()];

    while let Some(id) = pending.pop() {
        if let Some(count) = counts.get_mut(&id) {
            *count += 1;
            continue;
        }
        let value = doc
            .get(id)
            .ok_or(EmitError::UnrepresentableValue { node: id })?;
        counts.insert(id, 1);
        match value {
            Value::Sequence(items) => pending.extend(items.iter().rev().copied()),
            Value::Mapping(pairs) => {
                for &(k, v) in pairs.iter().rev() {
                    pending.push(v);
                    pending.push(k);
                }
            }
            _ => {}
        }
    }

    let anchors: HashMap<NodeId, String> = counts
        .iter()
        .filter(|&(_, &count)| count > 1)
        .enumerate()
        .map(|(n, (&id, _))| (id, format!("id{:03}", n + 1)))
        .collect();
    if !anchors.is_empty() {
        tracing::debug!(anchors = anchors.len(), "assigned anchors to shared nodes");
    }
    Ok(anchors)
}

/// Per-document writing state.
struct Writer<'d> {
    doc: &'d Document,
    config: &'d EmitConfig,
    out: &'d mut String,
    anchors: HashMap<NodeId, String>,
    emitted: HashSet<NodeId>,
    in_progress: HashSet<NodeId>,
}

impl<'d> Writer<'d> {
    fn value(&self, id: NodeId) -> Result<&'d Value, EmitError> {
        let doc: &'d Document = self.doc;
        doc.get(id).ok_or(EmitError::UnrepresentableValue { node: id })
    }

    /// `*name` if the node was already written.
    fn alias(&self, id: NodeId) -> Result<Option<String>, EmitError> {
        match self.anchors.get(&id) {
            Some(name) if self.emitted.contains(&id) => {
                if self.config.cycles == CyclePolicy::Reject && self.in_progress.contains(&id) {
                    return Err(EmitError::CyclicStructure { node: id });
                }
                Ok(Some(format!("*{}", name)))
            }
            _ => Ok(None),
        }
    }

    /// `name` if the node carries an anchor; marks it as written.
    fn take_anchor(&mut self, id: NodeId) -> Option<String> {
        let name = self.anchors.get(&id).cloned()?;
        self.emitted.insert(id);
        Some(name)
    }

    fn current_column(&self) -> usize {
        match self.out.rfind('\n') {
            Some(i) => self.out[i + 1..].chars().count(),
            None => self.out.chars().count(),
        }
    }

    fn indent_to(&mut self, col: usize) {
        self.out.extend(std::iter::repeat(' ').take(col));
    }

    /// Width of `-`/`?`/`:` plus the spaces after it.
    fn indicator_width(&self) -> usize {
        self.config.indent.max(2)
    }

    /// Write a single-line item followed by a newline.
    fn write_inline(&mut self, text: &str, pos: Pos) {
        if let Pos::Value(_) = pos {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Depth of the children of a collection opened at `depth`.
    fn nested(&self, id: NodeId, depth: usize) -> Result<usize, EmitError> {
        if depth >= self.config.max_depth {
            return Err(EmitError::DepthLimitExceeded {
                limit: self.config.max_depth,
                node: id,
            });
        }
        Ok(depth + 1)
    }

    /// `depth` counts the collections enclosing `id`.
    fn write_node(&mut self, id: NodeId, pos: Pos, depth: usize) -> Result<(), EmitError> {
        if let Some(alias) = self.alias(id)? {
            self.write_inline(&alias, pos);
            return Ok(());
        }
        let value = self.value(id)?;
        let block = self.config.style == CollectionStyle::Block;

        match value {
            Value::Sequence(items) if block && !items.is_empty() => {
                let depth = self.nested(id, depth)?;
                let anchor = self.take_anchor(id);
                let col = self.open_block(anchor, pos);
                self.in_progress.insert(id);
                self.write_block_sequence(items, col, pos, depth)?;
                self.in_progress.remove(&id);
            }
            Value::Mapping(pairs) if block && !pairs.is_empty() => {
                let depth = self.nested(id, depth)?;
                let anchor = self.take_anchor(id);
                let col = self.open_block(anchor, pos);
                self.in_progress.insert(id);
                self.write_block_mapping(pairs, col, pos, depth)?;
                self.in_progress.remove(&id);
            }
            Value::Sequence(_) | Value::Mapping(_) => {
                let text = self.flow_node(id, depth)?;
                self.write_inline(&text, pos);
            }
            scalar => {
                let anchor = self.take_anchor(id);
                self.write_scalar(scalar, anchor, pos)?;
            }
        }
        Ok(())
    }

    /// Write the anchor of a block collection and return the column its
    /// entries start at.
    fn open_block(&mut self, anchor: Option<String>, pos: Pos) -> usize {
        match pos {
            Pos::Root => {
                if let Some(name) = anchor {
                    self.out.push_str(&format!("&{}\n", name));
                }
                0
            }
            Pos::Inline(col) => {
                if let Some(name) = anchor {
                    self.out.push_str(&format!("&{}\n", name));
                }
                col
            }
            Pos::Value(col) => {
                if let Some(name) = anchor {
                    self.out.push_str(&format!(" &{}", name));
                }
                self.out.push('\n');
                col
            }
        }
    }

    /// Whether the first entry continues the current line (`- - a`).
    fn continues_line(&self, pos: Pos) -> bool {
        matches!(pos, Pos::Inline(_)) && !self.out.ends_with('\n')
    }

    fn write_block_sequence(
        &mut self,
        items: &[NodeId],
        col: usize,
        pos: Pos,
        depth: usize,
    ) -> Result<(), EmitError> {
        let width = self.indicator_width();
        let mut first_inline = self.continues_line(pos);
        for &item in items {
            if !first_inline {
                self.indent_to(col);
            }
            first_inline = false;
            self.out.push('-');
            self.indent_to(width - 1);
            self.write_node(item, Pos::Inline(col + width), depth)?;
        }
        Ok(())
    }

    fn write_block_mapping(
        &mut self,
        pairs: &[(NodeId, NodeId)],
        col: usize,
        pos: Pos,
        depth: usize,
    ) -> Result<(), EmitError> {
        let width = self.indicator_width();
        let mut first_inline = self.continues_line(pos);
        for &(key, value) in pairs {
            if !first_inline {
                self.indent_to(col);
            }
            first_inline = false;
            match self.simple_key(key, false)? {
                Some(text) => {
                    self.out.push_str(&text);
                    self.out.push(':');
                    self.write_node(value, Pos::Value(col + self.config.indent), depth)?;
                }
                None => {
                    self.out.push('?');
                    self.indent_to(width - 1);
                    self.write_node(key, Pos::Inline(col + width), depth)?;
                    self.indent_to(col);
                    self.out.push(':');
                    self.indent_to(width - 1);
                    self.write_node(value, Pos::Inline(col + width), depth)?;
                }
            }
        }
        Ok(())
    }

    /// Text for an implicit key, or `None` if the key needs `?`.
    ///
    /// Alias keys get a trailing space so the `:` is not read as part of the
    /// alias name.
    fn simple_key(&mut self, id: NodeId, flow: bool) -> Result<Option<String>, EmitError> {
        if let Some(alias) = self.alias(id)? {
            return Ok(Some(format!("{} ", alias)));
        }
        let value = self.value(id)?;
        if !value.is_scalar() {
            return Ok(None);
        }
        let text = match self.render_scalar(value, flow, true) {
            ScalarForm::Plain(text) | ScalarForm::SingleQuoted(text) | ScalarForm::DoubleQuoted(text) => {
                text
            }
            ScalarForm::Literal { .. } => return Ok(None),
        };
        let text = match self.anchors.get(&id) {
            Some(name) => format!("&{} {}", name, text),
            None => text,
        };
        if text.len() > MAX_SIMPLE_KEY_LENGTH {
            return Ok(None);
        }
        self.take_anchor(id);
        Ok(Some(text))
    }

    fn render_scalar(&self, value: &Value, flow: bool, key: bool) -> ScalarForm {
        match value {
            Value::Null => ScalarForm::Plain("null".to_string()),
            Value::Bool(b) => ScalarForm::Plain(b.to_string()),
            Value::Int(n) => ScalarForm::Plain(n.to_string()),
            Value::Float(f) => ScalarForm::Plain(format_float(*f)),
            Value::String(s) => self.render_string(s, flow, key),
            Value::Sequence(_) | Value::Mapping(_) => {
                unreachable!("collections are written by write_node and flow_node")
            }
        }
    }

    fn render_string(&self, s: &str, flow: bool, key: bool) -> ScalarForm {
        match self.config.quote_style {
            QuoteStyle::Double => ScalarForm::DoubleQuoted(double_quoted(s)),
            QuoteStyle::Single if single_quoted_allowed(s) => {
                ScalarForm::SingleQuoted(single_quoted(s))
            }
            QuoteStyle::Single => ScalarForm::DoubleQuoted(double_quoted(s)),
            QuoteStyle::Auto => {
                if plain_allowed(s, flow) {
                    ScalarForm::Plain(s.to_string())
                } else if single_quoted_allowed(s) {
                    ScalarForm::SingleQuoted(single_quoted(s))
                } else if !flow && !key && literal_allowed(s) {
                    literal(s)
                } else {
                    ScalarForm::DoubleQuoted(double_quoted(s))
                }
            }
        }
    }

    fn write_scalar(
        &mut self,
        value: &Value,
        anchor: Option<String>,
        pos: Pos,
    ) -> Result<(), EmitError> {
        let prefix = anchor.map(|name| format!("&{} ", name)).unwrap_or_default();
        // Column for continuation lines and literal content.
        let child_col = match pos {
            Pos::Root => self.config.indent,
            Pos::Inline(col) => col,
            Pos::Value(col) if col == 0 => self.config.indent,
            Pos::Value(col) => col,
        };

        match self.render_scalar(value, false, false) {
            ScalarForm::Literal { header, lines } => {
                self.write_inline(&format!("{}{}", prefix, header), pos);
                for line in lines {
                    if !line.is_empty() {
                        self.indent_to(child_col);
                        self.out.push_str(&line);
                    }
                    self.out.push('\n');
                }
            }
            ScalarForm::Plain(text) | ScalarForm::DoubleQuoted(text) => {
                let text = format!("{}{}", prefix, text);
                let text = match self.config.line_width {
                    Some(width) => {
                        let start = self.current_column() + usize::from(matches!(pos, Pos::Value(_)));
                        fold(&text, start, width, child_col)
                    }
                    None => text,
                };
                self.write_inline(&text, pos);
            }
            ScalarForm::SingleQuoted(text) => {
                self.write_inline(&format!("{}{}", prefix, text), pos);
            }
        }
        Ok(())
    }

    /// Render a node in flow style.
    fn flow_node(&mut self, id: NodeId, depth: usize) -> Result<String, EmitError> {
        if let Some(alias) = self.alias(id)? {
            return Ok(alias);
        }
        let value = self.value(id)?;
        let prefix = self
            .take_anchor(id)
            .map(|name| format!("&{} ", name))
            .unwrap_or_default();

        let body = match value {
            Value::Sequence(items) => {
                let depth = self.nested(id, depth)?;
                self.in_progress.insert(id);
                let mut parts = Vec::with_capacity(items.len());
                for &item in items {
                    parts.push(self.flow_node(item, depth)?);
                }
                self.in_progress.remove(&id);
                format!("[{}]", parts.join(", "))
            }
            Value::Mapping(pairs) => {
                let depth = self.nested(id, depth)?;
                self.in_progress.insert(id);
                let mut parts = Vec::with_capacity(pairs.len());
                for &(k, v) in pairs {
                    let key = match self.simple_key(k, true)? {
                        Some(text) => text,
                        None if self.value(k)?.is_scalar() => {
                            format!("? {} ", self.flow_node(k, depth)?)
                        }
                        None => self.flow_node(k, depth)?,
                    };
                    let value = self.flow_node(v, depth)?;
                    parts.push(format!("{}: {}", key, value));
                }
                self.in_progress.remove(&id);
                format!("{{{}}}", parts.join(", "))
            }
            scalar => match self.render_scalar(scalar, true, false) {
                ScalarForm::Plain(text)
                | ScalarForm::SingleQuoted(text)
                | ScalarForm::DoubleQuoted(text) => text,
                ScalarForm::Literal { .. } => {
                    unreachable!("literal blocks are only chosen outside flow context")
                }
            },
        };
        Ok(format!("{}{}", prefix, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(doc: &Document) -> String {
        Emitter::new(&EmitConfig::default()).unwrap().emit(doc).unwrap()
    }

    fn emit_with(doc: &Document, config: EmitConfig) -> String {
        Emitter::new(&config).unwrap().emit(doc).unwrap()
    }

    fn string_doc(s: &str) -> Document {
        Document::from_value(s)
    }

    #[test]
    fn test_plain_scalars() {
        assert_eq!(emit(&string_doc("hello world")), "hello world\n");
        assert_eq!(emit(&Document::from_value(42i64)), "42\n");
        assert_eq!(emit(&Document::from_value(true)), "true\n");
        assert_eq!(emit(&Document::new()), "null\n");
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        assert_eq!(emit(&string_doc("123")), "'123'\n");
        assert_eq!(emit(&string_doc("yes")), "'yes'\n");
        assert_eq!(emit(&string_doc("null")), "'null'\n");
        assert_eq!(emit(&string_doc("")), "''\n");
        assert_eq!(emit(&string_doc("- item")), "'- item'\n");
        assert_eq!(emit(&string_doc("a: b")), "'a: b'\n");
        assert_eq!(emit(&string_doc("it's")), "it's\n");
        assert_eq!(emit(&string_doc("'quoted'")), "'''quoted'''\n");
    }

    #[test]
    fn test_double_quoted_escapes() {
        assert_eq!(emit(&string_doc("\u{1}")), "\"\\x01\"\n");
        assert_eq!(emit(&string_doc("bom\u{FEFF}")), "\"bom\\uFEFF\"\n");
        assert_eq!(emit(&string_doc("a\r\nb")), "\"a\\r\\nb\"\n");
        assert_eq!(emit(&string_doc("\u{2028}")), "\"\\L\"\n");
        // Tabs are printable and survive single quotes.
        assert_eq!(emit(&string_doc("tab\there")), "'tab\there'\n");
    }

    #[test]
    fn test_floats() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(f64::INFINITY), ".inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-.inf");
        assert_eq!(format_float(f64::NAN), ".nan");
    }

    #[test]
    fn test_invalid_indent() {
        let config = EmitConfig::default().with_indent(0);
        assert!(matches!(
            Emitter::new(&config),
            Err(EmitError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_dangling_node_is_unrepresentable() {
        let mut doc = Document::new();
        let root = doc.push(Value::Sequence(vec![NodeId::from_index(99)]));
        doc.set_root(root);
        let err = Emitter::new(&EmitConfig::default())
            .unwrap()
            .emit(&doc)
            .unwrap_err();
        assert_eq!(
            err,
            EmitError::UnrepresentableValue {
                node: NodeId::from_index(99)
            }
        );
    }

    #[test]
    fn test_cycle_policy() {
        let mut doc = Document::new();
        let root = doc.push(Value::Null);
        *doc.get_mut(root).unwrap() = Value::Sequence(vec![root]);
        doc.set_root(root);

        assert_eq!(emit(&doc), "&id001\n- *id001\n");
        let config = EmitConfig::default().with_cycles(CyclePolicy::Reject);
        let err = Emitter::new(&config).unwrap().emit(&doc).unwrap_err();
        assert_eq!(err, EmitError::CyclicStructure { node: root });
    }

    #[test]
    fn test_fold_long_plain_scalar() {
        let text = "alpha beta gamma delta";
        assert_eq!(fold(text, 0, 11, 2), "alpha beta\n  gamma\n  delta");
        // Double spaces are never broken.
        assert_eq!(fold("aaaa  bbbb", 0, 4, 0), "aaaa  bbbb");
    }

    #[test]
    fn test_line_width_config() {
        let doc = string_doc("one two three four");
        let config = EmitConfig::default().with_line_width(Some(9));
        assert_eq!(emit_with(&doc, config), "one two\n  three\n  four\n");
    }

    #[test]
    fn test_literal_block_detection() {
        assert!(literal_allowed("a\nb"));
        assert!(literal_allowed("a\n"));
        assert!(!literal_allowed("single"));
        assert!(!literal_allowed(" indented\nsecond"));
        assert!(!literal_allowed("\n\n"));
        assert!(!literal_allowed("cr\r\nlf"));
    }

    #[test]
    fn test_root_literal_block() {
        assert_eq!(emit(&string_doc("a\nb\n")), "|\n  a\n  b\n");
        assert_eq!(emit(&string_doc("a\nb")), "|-\n  a\n  b\n");
        assert_eq!(emit(&string_doc("a\n\n")), "|+\n  a\n\n");
    }

    #[test]
    fn test_quote_styles() {
        let doc = string_doc("plain");
        assert_eq!(
            emit_with(&doc, EmitConfig::default().with_quote_style(QuoteStyle::Double)),
            "\"plain\"\n"
        );
        assert_eq!(
            emit_with(&doc, EmitConfig::default().with_quote_style(QuoteStyle::Single)),
            "'plain'\n"
        );
        assert_eq!(
            emit_with(
                &string_doc("a\nb"),
                EmitConfig::default().with_quote_style(QuoteStyle::Single)
            ),
            "\"a\\nb\"\n"
        );
        assert_eq!(
            emit_with(
                &Document::from_value(7i64),
                EmitConfig::default().with_quote_style(QuoteStyle::Double)
            ),
            "7\n"
        );
    }

    #[test]
    fn test_explicit_start() {
        let config = EmitConfig::default().with_explicit_start(true);
        assert_eq!(emit_with(&string_doc("x"), config), "--- x\n");
    }

    /// `levels` sequences wrapped around a null.
    fn nested_sequences(levels: usize) -> Document {
        let mut doc = Document::new();
        let mut id = doc.push(Value::Null);
        for _ in 0..levels {
            id = doc.push(Value::Sequence(vec![id]));
        }
        doc.set_root(id);
        doc
    }

    #[test]
    fn test_depth_limit() {
        let doc = nested_sequences(10_000);
        for config in [EmitConfig::block(), EmitConfig::flow()] {
            let err = Emitter::new(&config).unwrap().emit(&doc).unwrap_err();
            assert!(matches!(
                err,
                EmitError::DepthLimitExceeded { limit: 512, .. }
            ));
        }

        let shallow = nested_sequences(3);
        let config = EmitConfig::flow().with_max_depth(3);
        assert_eq!(emit_with(&shallow, config.clone()), "[[[null]]]\n");
        let err = Emitter::new(&config)
            .unwrap()
            .emit(&nested_sequences(4))
            .unwrap_err();
        assert!(matches!(
            err,
            EmitError::DepthLimitExceeded { limit: 3, .. }
        ));
    }

    #[test]
    fn test_flow_multiline_strings_are_double_quoted() {
        let doc = Document::from_value(vec!["a\nb"]);
        assert_eq!(emit_with(&doc, EmitConfig::flow()), "[\"a\\nb\"]\n");
    }

    #[test]
    fn test_directives_after_a_document_are_preceded_by_end_marker() {
        let docs = crate::parse_all("a\n...\n%YAML 1.1\n--- 1\n").unwrap();
        let config = EmitConfig::default();
        let emitter = Emitter::new(&config).unwrap();
        let text = emitter.emit_all(&docs).unwrap();
        assert_eq!(text, "a\n...\n%YAML 1.1\n--- 1\n");
        assert_eq!(crate::parse_all(&text).unwrap(), docs);

        let plain = crate::parse_all("a\n--- b\n").unwrap();
        assert_eq!(emitter.emit_all(&plain).unwrap(), "a\n--- b\n");
    }
}
