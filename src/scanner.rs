//! Scanner: YAML text to tokens.
//!
//! The scanner resolves the whitespace-sensitive parts of YAML so the parser
//! can work on a context-free token stream:
//!
//! - **Indentation**: a stack of block indentation columns. A key or `-` at a
//!   deeper column opens a block collection (`BlockMappingStart` /
//!   `BlockSequenceStart`), a line starting at a shallower column closes
//!   collections with `BlockEnd`.
//! - **Simple keys**: `key: value` has no indicator before the key, so the
//!   position of every token that could start a key is remembered. When the
//!   `:` arrives, a `Key` token (and possibly a `BlockMappingStart`) is
//!   inserted in front of it. Tokens are held back while such a candidate is
//!   pending.
//! - **Flow context**: inside `[]`/`{}` indentation is ignored.
//! - **Scalars**: all five styles are decoded here (escapes, line folding,
//!   chomping), so scalar tokens carry their final text.

use std::collections::VecDeque;

use crate::error::{Marker, ScanError, ScanErrorKind};
use crate::token::{ScalarStyle, Token, TokenKind};

/// Simple keys may not span more than this many bytes.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

/// A position that could turn out to be the start of a simple key.
#[derive(Debug, Clone, Copy, Default)]
struct SimpleKey {
    possible: bool,
    required: bool,
    token_number: usize,
    mark: Marker,
}

/// Block scalar chomping indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomping {
    /// `-`: drop the final line break
    Strip,
    /// default: keep a single final line break
    Clip,
    /// `+`: keep all trailing line breaks
    Keep,
}

#[inline]
fn is_blank(c: Option<char>) -> bool {
    matches!(c, Some(' ') | Some('\t'))
}

#[inline]
fn is_break(c: Option<char>) -> bool {
    matches!(c, Some('\n') | Some('\r'))
}

#[inline]
fn is_breakz(c: Option<char>) -> bool {
    c.is_none() || is_break(c)
}

#[inline]
fn is_blankz(c: Option<char>) -> bool {
    is_blank(c) || is_breakz(c)
}

#[inline]
fn is_flow_indicator(c: Option<char>) -> bool {
    matches!(c, Some(',') | Some('[') | Some(']') | Some('{') | Some('}'))
}

/// Lazy tokenizer over a YAML string.
///
/// Implements `Iterator<Item = Result<Token, ScanError>>`; iteration stops
/// after `StreamEnd` or after the first error. Cloning a scanner saves its
/// position; [`Scanner::new`] restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    mark: Marker,
    tokens: VecDeque<Token>,
    tokens_parsed: usize,
    stream_start_produced: bool,
    stream_end_fetched: bool,
    failed: bool,

    // Indentation tracking
    indent: isize,
    indents: Vec<isize>,
    flow_level: usize,

    // Simple key tracking (one slot per flow level)
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,

    /// Only whitespace precedes the current position on this line.
    at_line_start: bool,
    /// Last token was a quoted scalar or flow collection end, so a directly
    /// following `:` is a value indicator even without a space (`{"a":1}`).
    adjacent_value_allowed: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            mark: Marker::new(0, 1, 0),
            tokens: VecDeque::new(),
            tokens_parsed: 0,
            stream_start_produced: false,
            stream_end_fetched: false,
            failed: false,
            indent: -1,
            indents: Vec::new(),
            flow_level: 0,
            simple_key_allowed: false,
            simple_keys: Vec::new(),
            at_line_start: true,
            adjacent_value_allowed: false,
        }
    }

    /// Current position in the input.
    pub fn mark(&self) -> Marker {
        self.mark
    }

    /// Produce the next token, or `None` once `StreamEnd` has been returned.
    pub fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        if self.stream_end_fetched && self.tokens.is_empty() {
            return Ok(None);
        }
        self.fetch_more_tokens()?;
        let token = self.tokens.pop_front();
        if token.is_some() {
            self.tokens_parsed += 1;
        }
        Ok(token)
    }

    // ------------------------------------------------------------------
    // Character access
    // ------------------------------------------------------------------

    /// Get current character without advancing.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.input[self.mark.offset..].chars().next()
    }

    /// Get character `n` positions ahead of the current one.
    #[inline]
    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.mark.offset..].chars().nth(n)
    }

    /// Advance position by one character, tracking lines and columns.
    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.mark.offset += c.len_utf8();
            match c {
                '\n' => {
                    self.mark.line += 1;
                    self.mark.column = 0;
                }
                '\r' if self.peek() != Some('\n') => {
                    self.mark.line += 1;
                    self.mark.column = 0;
                }
                '\r' => {}
                _ => self.mark.column += 1,
            }
        }
    }

    /// Consume one line break (`\n`, `\r` or `\r\n`).
    fn skip_line(&mut self) {
        if self.peek() == Some('\r') && self.peek_at(1) == Some('\n') {
            self.advance();
        }
        if is_break(self.peek()) {
            self.advance();
        }
    }

    fn skip_blanks(&mut self) {
        while is_blank(self.peek()) {
            self.advance();
        }
    }

    fn skip_comment(&mut self) {
        if self.peek() == Some('#') {
            while !is_breakz(self.peek()) {
                self.advance();
            }
        }
    }

    /// Check for `---` or `...` at column 0 followed by whitespace.
    fn at_document_indicator(&self, indicator: &str) -> bool {
        self.mark.column == 0
            && self.input[self.mark.offset..].starts_with(indicator)
            && is_blankz(self.peek_at(3))
    }

    /// Check if the rest of the line holds only whitespace or a comment.
    fn rest_of_line_is_blank(&self) -> bool {
        for c in self.input[self.mark.offset..].chars() {
            match c {
                ' ' | '\t' => {}
                '\n' | '\r' | '#' => return true,
                _ => return false,
            }
        }
        true
    }

    fn error(&self, kind: ScanErrorKind) -> ScanError {
        ScanError::new(self.mark, kind)
    }

    // ------------------------------------------------------------------
    // Token queue management
    // ------------------------------------------------------------------

    fn fetch_more_tokens(&mut self) -> Result<(), ScanError> {
        loop {
            if self.stream_end_fetched {
                break;
            }
            let mut need_more = self.tokens.is_empty();
            if !need_more {
                self.stale_simple_keys()?;
                need_more = self
                    .simple_keys
                    .iter()
                    .any(|key| key.possible && key.token_number == self.tokens_parsed);
            }
            if !need_more {
                break;
            }
            self.fetch_next_token()?;
        }
        Ok(())
    }

    fn fetch_next_token(&mut self) -> Result<(), ScanError> {
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }

        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        self.unroll_indent(self.mark.column as isize);

        let c = match self.peek() {
            Some(c) => c,
            None => return self.fetch_stream_end(),
        };
        self.at_line_start = false;

        if self.mark.column == 0 {
            if c == '%' {
                return self.fetch_directive();
            }
            if self.at_document_indicator("---") {
                return self.fetch_document_indicator(TokenKind::DocumentStart);
            }
            if self.at_document_indicator("...") {
                return self.fetch_document_indicator(TokenKind::DocumentEnd);
            }
        }

        let next = self.peek_at(1);
        let adjacent_value = self.adjacent_value_allowed;
        self.adjacent_value_allowed = false;

        match c {
            '[' => self.fetch_flow_collection_start(TokenKind::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenKind::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenKind::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenKind::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if is_blankz(next) => self.fetch_block_entry(),
            '?' if is_blankz(next) => self.fetch_key(),
            ':' if is_blankz(next)
                || (self.flow_level > 0 && (is_flow_indicator(next) || adjacent_value)) =>
            {
                self.fetch_value()
            }
            '*' => self.fetch_anchor(true),
            '&' => self.fetch_anchor(false),
            '!' => self.fetch_tag(),
            '|' if self.flow_level == 0 => self.fetch_block_scalar(true),
            '>' if self.flow_level == 0 => self.fetch_block_scalar(false),
            '\'' => self.fetch_flow_scalar(true),
            '"' => self.fetch_flow_scalar(false),
            _ if self.starts_plain_scalar(c, next) => self.fetch_plain_scalar(),
            _ => Err(self.error(ScanErrorKind::UnexpectedCharacter {
                ch: c,
                context: "cannot start any token",
            })),
        }
    }

    /// Check whether `c` (followed by `next`) begins a plain scalar.
    fn starts_plain_scalar(&self, c: char, next: Option<char>) -> bool {
        match c {
            '-' | '?' | ':' => {
                !is_blankz(next) && !(self.flow_level > 0 && is_flow_indicator(next))
            }
            ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"'
            | '%' | '@' | '`' => false,
            ' ' | '\t' | '\n' | '\r' => false,
            _ => true,
        }
    }

    /// Skip whitespace, comments and line breaks up to the next token.
    fn scan_to_next_token(&mut self) -> Result<(), ScanError> {
        loop {
            loop {
                match self.peek() {
                    Some(' ') => self.advance(),
                    Some('\t') => {
                        if self.flow_level == 0
                            && self.at_line_start
                            && !self.rest_of_line_is_blank()
                        {
                            return Err(self.error(ScanErrorKind::TabIndentation));
                        }
                        self.advance();
                    }
                    _ => break,
                }
            }
            self.skip_comment();
            if is_break(self.peek()) {
                self.skip_line();
                self.at_line_start = true;
                if self.flow_level == 0 {
                    self.simple_key_allowed = true;
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, mark: Marker) {
        self.tokens.push_back(Token::new(kind, mark));
    }

    // ------------------------------------------------------------------
    // Simple keys and indentation
    // ------------------------------------------------------------------

    /// Invalidate simple key candidates that can no longer be keys.
    fn stale_simple_keys(&mut self) -> Result<(), ScanError> {
        let mark = self.mark;
        for key in self.simple_keys.iter_mut() {
            if key.possible
                && (key.mark.line < mark.line
                    || key.mark.offset + MAX_SIMPLE_KEY_LENGTH < mark.offset)
            {
                if key.required {
                    return Err(ScanError::new(
                        key.mark,
                        ScanErrorKind::MissingValueIndicator,
                    ));
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    /// Remember the current position as a potential simple key.
    fn save_simple_key(&mut self) -> Result<(), ScanError> {
        let required = self.flow_level == 0 && self.indent == self.mark.column as isize;
        if self.simple_key_allowed {
            let key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark,
            };
            self.remove_simple_key()?;
            if let Some(last) = self.simple_keys.last_mut() {
                *last = key;
            }
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScanError> {
        if let Some(key) = self.simple_keys.last_mut() {
            if key.possible && key.required {
                return Err(ScanError::new(
                    key.mark,
                    ScanErrorKind::MissingValueIndicator,
                ));
            }
            key.possible = false;
        }
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// Open a block collection if `column` is deeper than the current indent.
    ///
    /// With `number` set, the start token is inserted at that queue position
    /// (in front of a retroactively discovered simple key).
    fn roll_indent(&mut self, column: isize, number: Option<usize>, kind: TokenKind, mark: Marker) {
        if self.flow_level > 0 {
            return;
        }
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            let token = Token::new(kind, mark);
            match number {
                Some(n) => self.tokens.insert(n - self.tokens_parsed, token),
                None => self.tokens.push_back(token),
            }
        }
    }

    /// Close every block collection indented deeper than `column`.
    fn unroll_indent(&mut self, column: isize) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            self.push(TokenKind::BlockEnd, self.mark);
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    // ------------------------------------------------------------------
    // Fetchers
    // ------------------------------------------------------------------

    fn fetch_stream_start(&mut self) {
        self.indent = -1;
        self.stream_start_produced = true;
        self.simple_key_allowed = true;
        self.simple_keys.push(SimpleKey::default());
        // Byte order mark does not count as a column.
        if self.input.starts_with('\u{feff}') {
            self.mark.offset += '\u{feff}'.len_utf8();
        }
        self.push(TokenKind::StreamStart, self.mark);
    }

    fn fetch_stream_end(&mut self) -> Result<(), ScanError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.stream_end_fetched = true;
        self.push(TokenKind::StreamEnd, self.mark);
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), ScanError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        if let Some(token) = self.scan_directive()? {
            self.tokens.push_back(token);
        }
        Ok(())
    }

    fn fetch_document_indicator(&mut self, kind: TokenKind) -> Result<(), ScanError> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let mark = self.mark;
        for _ in 0..3 {
            self.advance();
        }
        self.push(kind, mark);
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, kind: TokenKind) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let mark = self.mark;
        self.advance();
        self.push(kind, mark);
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, kind: TokenKind) -> Result<(), ScanError> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let mark = self.mark;
        self.advance();
        self.push(kind, mark);
        self.adjacent_value_allowed = true;
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScanError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let mark = self.mark;
        self.advance();
        self.push(TokenKind::FlowEntry, mark);
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScanError> {
        let mark = self.mark;
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(self.error(ScanErrorKind::NotAllowed {
                    what: "block sequence entries",
                }));
            }
            self.roll_indent(
                mark.column as isize,
                None,
                TokenKind::BlockSequenceStart,
                mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        self.advance();
        self.push(TokenKind::BlockEntry, mark);
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScanError> {
        let mark = self.mark;
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(self.error(ScanErrorKind::NotAllowed {
                    what: "mapping keys",
                }));
            }
            self.roll_indent(
                mark.column as isize,
                None,
                TokenKind::BlockMappingStart,
                mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        self.advance();
        self.push(TokenKind::Key, mark);
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScanError> {
        let mark = self.mark;
        let key = self.simple_keys.last().copied().unwrap_or_default();
        if key.possible {
            // The pending candidate really was a key: announce it retroactively.
            self.tokens.insert(
                key.token_number - self.tokens_parsed,
                Token::new(TokenKind::Key, key.mark),
            );
            self.roll_indent(
                key.mark.column as isize,
                Some(key.token_number),
                TokenKind::BlockMappingStart,
                key.mark,
            );
            if let Some(last) = self.simple_keys.last_mut() {
                last.possible = false;
            }
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Err(self.error(ScanErrorKind::NotAllowed {
                        what: "mapping values",
                    }));
                }
                self.roll_indent(
                    mark.column as isize,
                    None,
                    TokenKind::BlockMappingStart,
                    mark,
                );
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        self.advance();
        self.push(TokenKind::Value, mark);
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_anchor(alias)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_tag()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> Result<(), ScanError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let token = self.scan_block_scalar(literal)?;
        self.tokens.push_back(token);
        self.at_line_start = true;
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_flow_scalar(single)?;
        self.tokens.push_back(token);
        self.adjacent_value_allowed = true;
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), ScanError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_plain_scalar()?;
        self.tokens.push_back(token);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Directives, anchors and tags
    // ------------------------------------------------------------------

    fn scan_directive(&mut self) -> Result<Option<Token>, ScanError> {
        let start = self.mark;
        self.advance(); // Skip '%'

        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error(ScanErrorKind::InvalidDirective {
                reason: "expected a directive name",
            }));
        }
        if !is_blankz(self.peek()) {
            return Err(self.error(ScanErrorKind::InvalidDirective {
                reason: "unexpected character after directive name",
            }));
        }

        let kind = match name.as_str() {
            "YAML" => {
                self.skip_blanks();
                let major = self.scan_version_number()?;
                if self.peek() != Some('.') {
                    return Err(self.error(ScanErrorKind::InvalidDirective {
                        reason: "expected '.' in %YAML version",
                    }));
                }
                self.advance();
                let minor = self.scan_version_number()?;
                Some(TokenKind::VersionDirective(major, minor))
            }
            "TAG" => {
                self.skip_blanks();
                let handle = self.scan_tag_handle(true)?;
                if !is_blank(self.peek()) {
                    return Err(self.error(ScanErrorKind::InvalidDirective {
                        reason: "expected whitespace after %TAG handle",
                    }));
                }
                self.skip_blanks();
                let prefix = self.scan_tag_uri("", true)?;
                if prefix.is_empty() {
                    return Err(self.error(ScanErrorKind::InvalidDirective {
                        reason: "expected a %TAG prefix",
                    }));
                }
                Some(TokenKind::TagDirective { handle, prefix })
            }
            _ => {
                tracing::warn!(directive = %name, line = start.line, "ignoring unknown directive");
                while !is_breakz(self.peek()) {
                    self.advance();
                }
                None
            }
        };

        self.skip_blanks();
        self.skip_comment();
        if !is_breakz(self.peek()) {
            return Err(self.error(ScanErrorKind::InvalidDirective {
                reason: "expected a comment or a line break after directive",
            }));
        }
        Ok(kind.map(|kind| Token::new(kind, start)))
    }

    fn scan_version_number(&mut self) -> Result<u32, ScanError> {
        let mut value: u32 = 0;
        let mut digits = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            digits += 1;
            if digits > 9 {
                return Err(self.error(ScanErrorKind::InvalidDirective {
                    reason: "version number is too long",
                }));
            }
            value = value * 10 + d;
            self.advance();
        }
        if digits == 0 {
            return Err(self.error(ScanErrorKind::InvalidDirective {
                reason: "expected a version number",
            }));
        }
        Ok(value)
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token, ScanError> {
        let start = self.mark;
        self.advance(); // Skip '&' or '*'

        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_blankz(Some(c)) || is_flow_indicator(Some(c)) {
                break;
            }
            name.push(c);
            self.advance();
        }
        if name.is_empty() {
            return Err(ScanError::new(
                start,
                ScanErrorKind::InvalidAnchorName {
                    what: if alias { "alias" } else { "anchor" },
                    reason: "name is empty",
                },
            ));
        }
        let kind = if alias {
            TokenKind::Alias(name)
        } else {
            TokenKind::Anchor(name)
        };
        Ok(Token::new(kind, start))
    }

    fn scan_tag(&mut self) -> Result<Token, ScanError> {
        let start = self.mark;
        let (handle, suffix) = if self.peek_at(1) == Some('<') {
            // Verbatim tag: !<tag:yaml.org,2002:str>
            self.advance();
            self.advance();
            let suffix = self.scan_tag_uri("", true)?;
            if self.peek() != Some('>') {
                return Err(self.error(ScanErrorKind::InvalidTag {
                    reason: "expected '>' to close a verbatim tag",
                }));
            }
            self.advance();
            (String::new(), suffix)
        } else {
            let handle = self.scan_tag_handle(false)?;
            if handle.len() > 1 && handle.ends_with('!') {
                let suffix = self.scan_tag_uri("", false)?;
                if suffix.is_empty() {
                    return Err(self.error(ScanErrorKind::InvalidTag {
                        reason: "expected a tag suffix after the handle",
                    }));
                }
                (handle, suffix)
            } else {
                // `!foo` is the primary handle `!` with suffix `foo`.
                let suffix = self.scan_tag_uri(&handle[1..], false)?;
                if suffix.is_empty() {
                    // Non-specific tag `!`
                    (String::new(), "!".to_string())
                } else {
                    ("!".to_string(), suffix)
                }
            }
        };

        let next = self.peek();
        if !(is_blankz(next) || (self.flow_level > 0 && is_flow_indicator(next))) {
            return Err(self.error(ScanErrorKind::InvalidTag {
                reason: "expected whitespace after tag",
            }));
        }
        Ok(Token::new(TokenKind::Tag { handle, suffix }, start))
    }

    /// Scan `!`, `!!` or `!word!`. Outside directives a bare `!word` is
    /// returned without the closing `!`.
    fn scan_tag_handle(&mut self, directive: bool) -> Result<String, ScanError> {
        if self.peek() != Some('!') {
            return Err(self.error(ScanErrorKind::InvalidTag {
                reason: "expected '!' to start a tag handle",
            }));
        }
        let mut handle = String::from("!");
        self.advance();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                handle.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('!') {
            handle.push('!');
            self.advance();
        } else if directive && handle != "!" {
            return Err(self.error(ScanErrorKind::InvalidDirective {
                reason: "expected '!' to close the tag handle",
            }));
        }
        Ok(handle)
    }

    /// Scan a tag URI, decoding `%XX` escapes.
    fn scan_tag_uri(&mut self, head: &str, verbatim: bool) -> Result<String, ScanError> {
        let mut bytes: Vec<u8> = head.as_bytes().to_vec();
        while let Some(c) = self.peek() {
            let allowed = c.is_ascii_alphanumeric()
                || ";/?:@&=+$_.!~*'()#-%".contains(c)
                || ((verbatim || self.flow_level == 0) && ",[]".contains(c));
            if !allowed {
                break;
            }
            if c == '%' {
                let hi = self.peek_at(1).and_then(|c| c.to_digit(16));
                let lo = self.peek_at(2).and_then(|c| c.to_digit(16));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => bytes.push((hi * 16 + lo) as u8),
                    _ => {
                        return Err(self.error(ScanErrorKind::InvalidTag {
                            reason: "invalid percent escape in tag URI",
                        }))
                    }
                }
                for _ in 0..3 {
                    self.advance();
                }
            } else {
                bytes.push(c as u8);
                self.advance();
            }
        }
        String::from_utf8(bytes).map_err(|_| {
            self.error(ScanErrorKind::InvalidTag {
                reason: "percent escapes do not form valid UTF-8",
            })
        })
    }

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    /// Scan a `|` or `>` block scalar.
    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, ScanError> {
        let start = self.mark;
        self.advance(); // Skip indicator

        let mut chomping = Chomping::Clip;
        let mut increment: isize = 0;

        let parse_chomping = |c: Option<char>| match c {
            Some('+') => Some(Chomping::Keep),
            Some('-') => Some(Chomping::Strip),
            _ => None,
        };

        if let Some(chomp) = parse_chomping(self.peek()) {
            chomping = chomp;
            self.advance();
            if let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
                increment = self.indentation_indicator(d)?;
                self.advance();
            }
        } else if let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            increment = self.indentation_indicator(d)?;
            self.advance();
            if let Some(chomp) = parse_chomping(self.peek()) {
                chomping = chomp;
                self.advance();
            }
        }

        self.skip_blanks();
        self.skip_comment();
        if !is_breakz(self.peek()) {
            return Err(self.error(ScanErrorKind::InvalidBlockScalarHeader {
                reason: "expected a comment or a line break",
            }));
        }
        self.skip_line();

        let mut indent: isize = 0;
        if increment > 0 {
            indent = if self.indent >= 0 {
                self.indent + increment
            } else {
                increment
            };
        }

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();

        self.block_scalar_breaks(&mut indent, &mut trailing_breaks)?;

        let mut leading_blank = false;
        while self.mark.column as isize == indent && self.peek().is_some() {
            let trailing_blank = is_blank(self.peek());
            if !literal && leading_break.starts_with('\n') && !leading_blank && !trailing_blank
            {
                // Folded: a single line break between text lines becomes a space.
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
                leading_break.clear();
            } else {
                string.push_str(&leading_break);
                leading_break.clear();
            }
            string.push_str(&trailing_breaks);
            trailing_breaks.clear();

            leading_blank = is_blank(self.peek());
            while let Some(c) = self.peek() {
                if is_break(Some(c)) {
                    break;
                }
                string.push(c);
                self.advance();
            }
            if self.peek().is_none() {
                break;
            }
            self.skip_line();
            leading_break.push('\n');

            self.block_scalar_breaks(&mut indent, &mut trailing_breaks)?;
        }

        if chomping != Chomping::Strip {
            string.push_str(&leading_break);
        }
        if chomping == Chomping::Keep {
            string.push_str(&trailing_breaks);
        }

        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        Ok(Token::new(
            TokenKind::Scalar {
                value: string,
                style,
            },
            start,
        ))
    }

    fn indentation_indicator(&self, digit: u32) -> Result<isize, ScanError> {
        if digit == 0 {
            return Err(self.error(ScanErrorKind::InvalidBlockScalarHeader {
                reason: "indentation indicator must be between 1 and 9",
            }));
        }
        Ok(digit as isize)
    }

    /// Consume indentation and empty lines inside a block scalar, detecting
    /// the content indentation when it is not yet known.
    fn block_scalar_breaks(
        &mut self,
        indent: &mut isize,
        breaks: &mut String,
    ) -> Result<(), ScanError> {
        let mut max_indent: isize = 0;
        loop {
            while (*indent == 0 || (self.mark.column as isize) < *indent)
                && self.peek() == Some(' ')
            {
                self.advance();
            }
            let column = self.mark.column as isize;
            if column > max_indent {
                max_indent = column;
            }
            if (*indent == 0 || column < *indent) && self.peek() == Some('\t') {
                return Err(self.error(ScanErrorKind::TabIndentation));
            }
            if !is_break(self.peek()) {
                break;
            }
            self.skip_line();
            breaks.push('\n');
        }
        if *indent == 0 {
            *indent = max_indent.max(self.indent + 1).max(1);
        }
        Ok(())
    }

    /// Scan a single- or double-quoted scalar.
    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token, ScanError> {
        let start = self.mark;
        let quote = if single { '\'' } else { '"' };
        self.advance(); // Skip opening quote

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();

        loop {
            if self.at_document_indicator("---") || self.at_document_indicator("...") {
                return Err(self.error(ScanErrorKind::DocumentIndicatorInScalar));
            }
            if self.peek().is_none() {
                return Err(self.error(ScanErrorKind::UnterminatedQuote { quote }));
            }

            let mut leading_blanks = false;
            while let Some(c) = self.peek() {
                if is_blankz(Some(c)) {
                    break;
                }
                if single && c == '\'' && self.peek_at(1) == Some('\'') {
                    string.push('\'');
                    self.advance();
                    self.advance();
                } else if c == quote {
                    break;
                } else if !single && c == '\\' && is_break(self.peek_at(1)) {
                    // Escaped line break joins lines without a space.
                    self.advance();
                    self.skip_line();
                    leading_blanks = true;
                    break;
                } else if !single && c == '\\' {
                    self.scan_escape(&mut string)?;
                } else {
                    string.push(c);
                    self.advance();
                }
            }

            if self.peek() == Some(quote) {
                break;
            }

            while is_blank(self.peek()) || is_break(self.peek()) {
                if let Some(c) = self.peek().filter(|c| is_blank(Some(*c))) {
                    if !leading_blanks {
                        whitespaces.push(c);
                    }
                    self.advance();
                } else {
                    self.skip_line();
                    if !leading_blanks {
                        whitespaces.clear();
                        leading_break.clear();
                        leading_break.push('\n');
                        leading_blanks = true;
                    } else {
                        trailing_breaks.push('\n');
                    }
                }
            }

            if leading_blanks {
                if leading_break.starts_with('\n') {
                    if trailing_breaks.is_empty() {
                        string.push(' ');
                    } else {
                        string.push_str(&trailing_breaks);
                    }
                } else {
                    string.push_str(&leading_break);
                    string.push_str(&trailing_breaks);
                }
                leading_break.clear();
                trailing_breaks.clear();
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        }

        self.advance(); // Skip closing quote

        let style = if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        Ok(Token::new(
            TokenKind::Scalar {
                value: string,
                style,
            },
            start,
        ))
    }

    /// Decode one escape sequence in a double-quoted scalar.
    fn scan_escape(&mut self, out: &mut String) -> Result<(), ScanError> {
        let escape_mark = self.mark;
        self.advance(); // Skip backslash

        let c = match self.peek() {
            Some(c) => c,
            None => return Err(self.error(ScanErrorKind::UnterminatedQuote { quote: '"' })),
        };
        let code_length = match c {
            '0' => {
                out.push('\0');
                0
            }
            'a' => {
                out.push('\x07'); // bell
                0
            }
            'b' => {
                out.push('\x08'); // backspace
                0
            }
            't' | '\t' => {
                out.push('\t');
                0
            }
            'n' => {
                out.push('\n');
                0
            }
            'v' => {
                out.push('\x0B'); // vertical tab
                0
            }
            'f' => {
                out.push('\x0C'); // form feed
                0
            }
            'r' => {
                out.push('\r');
                0
            }
            'e' => {
                out.push('\x1B'); // escape
                0
            }
            ' ' => {
                out.push(' ');
                0
            }
            '"' => {
                out.push('"');
                0
            }
            '/' => {
                out.push('/');
                0
            }
            '\\' => {
                out.push('\\');
                0
            }
            'N' => {
                out.push('\u{0085}'); // next line
                0
            }
            '_' => {
                out.push('\u{00A0}'); // non-breaking space
                0
            }
            'L' => {
                out.push('\u{2028}'); // line separator
                0
            }
            'P' => {
                out.push('\u{2029}'); // paragraph separator
                0
            }
            'x' => 2,
            'u' => 4,
            'U' => 8,
            other => {
                return Err(ScanError::new(
                    escape_mark,
                    ScanErrorKind::InvalidEscape {
                        sequence: format!("\\{}", other),
                    },
                ))
            }
        };
        self.advance();

        if code_length > 0 {
            let mut sequence = format!("\\{}", c);
            let mut value: u32 = 0;
            for _ in 0..code_length {
                match self.peek().and_then(|d| d.to_digit(16).map(|v| (d, v))) {
                    Some((d, v)) => {
                        sequence.push(d);
                        value = value * 16 + v;
                        self.advance();
                    }
                    None => {
                        return Err(ScanError::new(
                            escape_mark,
                            ScanErrorKind::InvalidEscape { sequence },
                        ))
                    }
                }
            }
            match char::from_u32(value) {
                Some(ch) => out.push(ch),
                None => {
                    return Err(ScanError::new(
                        escape_mark,
                        ScanErrorKind::InvalidEscape { sequence },
                    ))
                }
            }
        }
        Ok(())
    }

    /// Scan an unquoted scalar, folding line breaks into spaces.
    fn scan_plain_scalar(&mut self) -> Result<Token, ScanError> {
        let start = self.mark;
        let indent = self.indent + 1;

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks = false;

        loop {
            if self.at_document_indicator("---") || self.at_document_indicator("...") {
                break;
            }
            if self.peek() == Some('#') {
                break;
            }

            while let Some(c) = self.peek() {
                if is_blankz(Some(c)) {
                    break;
                }
                let next = self.peek_at(1);
                if c == ':'
                    && (is_blankz(next) || (self.flow_level > 0 && is_flow_indicator(next)))
                {
                    break;
                }
                if self.flow_level > 0 && is_flow_indicator(Some(c)) {
                    break;
                }

                if leading_blanks || !whitespaces.is_empty() {
                    if leading_blanks {
                        if leading_break.starts_with('\n') {
                            if trailing_breaks.is_empty() {
                                string.push(' ');
                            } else {
                                string.push_str(&trailing_breaks);
                            }
                        } else {
                            string.push_str(&leading_break);
                            string.push_str(&trailing_breaks);
                        }
                        leading_break.clear();
                        trailing_breaks.clear();
                        leading_blanks = false;
                    } else {
                        string.push_str(&whitespaces);
                        whitespaces.clear();
                    }
                }

                string.push(c);
                self.advance();
            }

            if !(is_blank(self.peek()) || is_break(self.peek())) {
                break;
            }

            while is_blank(self.peek()) || is_break(self.peek()) {
                if let Some(c) = self.peek().filter(|c| is_blank(Some(*c))) {
                    if leading_blanks && (self.mark.column as isize) < indent && c == '\t' {
                        return Err(self.error(ScanErrorKind::TabIndentation));
                    }
                    if !leading_blanks {
                        whitespaces.push(c);
                    }
                    self.advance();
                } else {
                    self.skip_line();
                    if !leading_blanks {
                        whitespaces.clear();
                        leading_break.clear();
                        leading_break.push('\n');
                        leading_blanks = true;
                    } else {
                        trailing_breaks.push('\n');
                    }
                }
            }

            if self.flow_level == 0 && (self.mark.column as isize) < indent {
                break;
            }
        }

        if leading_blanks {
            self.simple_key_allowed = true;
            self.at_line_start = true;
        }

        Ok(Token::new(
            TokenKind::Scalar {
                value: string,
                style: ScalarStyle::Plain,
            },
            start,
        ))
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
