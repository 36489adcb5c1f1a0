//! Parser: tokens to events.
//!
//! A pushdown state machine over the token stream. Each call to
//! [`Parser::next`] runs the current state, which returns exactly one event
//! and records the state to continue with. Nested nodes push their return
//! state onto `states`.
//!
//! The grammar, in terms of events:
//!
//! ```text
//! stream   := STREAM-START document* STREAM-END
//! document := DOCUMENT-START node DOCUMENT-END
//! node     := ALIAS | SCALAR | sequence | mapping
//! sequence := SEQUENCE-START node* SEQUENCE-END
//! mapping  := MAPPING-START (node node)* MAPPING-END
//! ```

use crate::error::{Error, Marker, ParseError};
use crate::event::{CollectionStyle, Event, EventKind};
use crate::scanner::Scanner;
use crate::token::{ScalarStyle, Token, TokenKind};

/// Prefix the `!!` handle expands to.
pub const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// Lazy event stream over a YAML string.
///
/// Implements `Iterator<Item = Result<Event, Error>>`. Iteration ends after
/// `StreamEnd` or after the first error.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Option<Token>,
    state: State,
    states: Vec<State>,
    /// `%TAG` directives of the current document
    tag_directives: Vec<(String, String)>,
}

impl<'a> Parser<'a> {
    /// Create a parser positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
            current: None,
            state: State::StreamStart,
            states: Vec::new(),
            tag_directives: Vec::new(),
        }
    }

    /// Produce the next event, or `None` once `StreamEnd` has been returned.
    pub fn next_event(&mut self) -> Result<Option<Event>, Error> {
        if self.state == State::End {
            return Ok(None);
        }
        match self.state_machine() {
            Ok(event) => Ok(Some(event)),
            Err(err) => {
                self.state = State::End;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    fn peek_token(&mut self) -> Result<&Token, Error> {
        let token = match self.current.take() {
            Some(token) => token,
            None => match self.scanner.next_token()? {
                Some(token) => token,
                None => Token::new(TokenKind::StreamEnd, self.scanner.mark()),
            },
        };
        Ok(self.current.insert(token))
    }

    /// Kind and position of the next token, without consuming it.
    fn peek_kind(&mut self) -> Result<(TokenKind, Marker), Error> {
        let token = self.peek_token()?;
        Ok((token.kind.clone(), token.mark))
    }

    fn take_token(&mut self) -> Result<Token, Error> {
        self.peek_token()?;
        match self.current.take() {
            Some(token) => Ok(token),
            None => Ok(Token::new(TokenKind::StreamEnd, self.scanner.mark())),
        }
    }

    fn skip_token(&mut self) {
        self.current = None;
    }

    /// Check the next token against a predicate.
    fn next_is(&mut self, f: impl Fn(&TokenKind) -> bool) -> Result<bool, Error> {
        Ok(f(&self.peek_token()?.kind))
    }

    fn pop_state(&mut self) -> State {
        self.states.pop().unwrap_or(State::End)
    }

    fn unexpected(&mut self, expected: &[&'static str], context: &'static str) -> Error {
        match self.peek_token() {
            Ok(token) => {
                ParseError::new(token.mark, expected, token.kind.describe(), context).into()
            }
            Err(err) => err,
        }
    }

    // ------------------------------------------------------------------
    // States
    // ------------------------------------------------------------------

    fn state_machine(&mut self) -> Result<Event, Error> {
        match self.state {
            State::StreamStart => self.parse_stream_start(),
            State::ImplicitDocumentStart => self.parse_document_start(true),
            State::DocumentStart => self.parse_document_start(false),
            State::DocumentContent => self.parse_document_content(),
            State::DocumentEnd => self.parse_document_end(),
            State::BlockNode => self.parse_node(true, false),
            State::BlockSequenceFirstEntry => self.parse_block_sequence_entry(true),
            State::BlockSequenceEntry => self.parse_block_sequence_entry(false),
            State::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            State::BlockMappingFirstKey => self.parse_block_mapping_key(true),
            State::BlockMappingKey => self.parse_block_mapping_key(false),
            State::BlockMappingValue => self.parse_block_mapping_value(),
            State::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            State::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            State::FlowSequenceEntryMappingKey => self.parse_flow_sequence_entry_mapping_key(),
            State::FlowSequenceEntryMappingValue => {
                self.parse_flow_sequence_entry_mapping_value()
            }
            State::FlowSequenceEntryMappingEnd => self.parse_flow_sequence_entry_mapping_end(),
            State::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            State::FlowMappingKey => self.parse_flow_mapping_key(false),
            State::FlowMappingValue => self.parse_flow_mapping_value(false),
            State::FlowMappingEmptyValue => self.parse_flow_mapping_value(true),
            State::End => Err(self.unexpected(&["end of stream"], "a stream")),
        }
    }

    fn parse_stream_start(&mut self) -> Result<Event, Error> {
        let token = self.take_token()?;
        match token.kind {
            TokenKind::StreamStart => {
                self.state = State::ImplicitDocumentStart;
                Ok(Event::new(EventKind::StreamStart, token.mark))
            }
            other => Err(ParseError::new(
                token.mark,
                &["start of stream"],
                other.describe(),
                "a stream",
            )
            .into()),
        }
    }

    fn parse_document_start(&mut self, implicit: bool) -> Result<Event, Error> {
        if !implicit {
            while self.next_is(|k| *k == TokenKind::DocumentEnd)? {
                self.skip_token();
            }
        }

        let (kind, mark) = self.peek_kind()?;
        let bare_content = !matches!(
            kind,
            TokenKind::VersionDirective(..)
                | TokenKind::TagDirective { .. }
                | TokenKind::DocumentStart
                | TokenKind::StreamEnd
        );

        if implicit && bare_content {
            self.tag_directives.clear();
            self.states.push(State::DocumentEnd);
            self.state = State::BlockNode;
            return Ok(Event::new(
                EventKind::DocumentStart {
                    implicit: true,
                    version: None,
                    tags: Vec::new(),
                },
                mark,
            ));
        }

        if kind == TokenKind::StreamEnd {
            self.skip_token();
            self.state = State::End;
            return Ok(Event::new(EventKind::StreamEnd, mark));
        }

        let (version, tags) = self.process_directives()?;
        if !self.next_is(|k| *k == TokenKind::DocumentStart)? {
            return Err(self.unexpected(&["'---'"], "a document start"));
        }
        self.skip_token();
        self.states.push(State::DocumentEnd);
        self.state = State::DocumentContent;
        Ok(Event::new(
            EventKind::DocumentStart {
                implicit: false,
                version,
                tags,
            },
            mark,
        ))
    }

    /// Collect `%YAML` and `%TAG` directives preceding a document.
    #[allow(clippy::type_complexity)]
    fn process_directives(&mut self) -> Result<(Option<(u32, u32)>, Vec<(String, String)>), Error> {
        let mut version = None;
        let mut tags: Vec<(String, String)> = Vec::new();

        loop {
            let token = self.peek_token()?;
            let mark = token.mark;
            match token.kind.clone() {
                TokenKind::VersionDirective(major, minor) => {
                    if version.is_some() {
                        return Err(ParseError::new(
                            mark,
                            &["'---'"],
                            "a second %YAML directive",
                            "directives",
                        )
                        .into());
                    }
                    if major != 1 {
                        return Err(ParseError::new(
                            mark,
                            &["%YAML 1.x"],
                            format!("%YAML {}.{}", major, minor),
                            "directives",
                        )
                        .into());
                    }
                    if minor > 2 {
                        tracing::warn!(major, minor, "document declares a newer YAML version");
                    }
                    version = Some((major, minor));
                }
                TokenKind::TagDirective { handle, prefix } => {
                    if tags.iter().any(|(h, _)| *h == handle) {
                        return Err(ParseError::new(
                            mark,
                            &["'---'"],
                            format!("a second %TAG directive for '{}'", handle),
                            "directives",
                        )
                        .into());
                    }
                    tags.push((handle, prefix));
                }
                _ => break,
            }
            self.skip_token();
        }

        self.tag_directives = tags.clone();
        Ok((version, tags))
    }

    fn parse_document_content(&mut self) -> Result<Event, Error> {
        let (kind, mark) = self.peek_kind()?;
        match kind {
            TokenKind::VersionDirective(..)
            | TokenKind::TagDirective { .. }
            | TokenKind::DocumentStart
            | TokenKind::DocumentEnd
            | TokenKind::StreamEnd => {
                self.state = self.pop_state();
                Ok(Event::new(EventKind::empty_scalar(), mark))
            }
            _ => self.parse_node(true, false),
        }
    }

    fn parse_document_end(&mut self) -> Result<Event, Error> {
        let (kind, mark) = self.peek_kind()?;
        let implicit = kind != TokenKind::DocumentEnd;
        if !implicit {
            self.skip_token();
        }
        self.tag_directives.clear();
        self.state = State::DocumentStart;
        Ok(Event::new(EventKind::DocumentEnd { implicit }, mark))
    }

    /// Expand a tag handle using the document's directives.
    fn resolve_tag(&self, handle: &str, suffix: &str, mark: Marker) -> Result<String, Error> {
        if handle.is_empty() {
            return Ok(suffix.to_string());
        }
        if let Some((_, prefix)) = self.tag_directives.iter().find(|(h, _)| h == handle) {
            return Ok(format!("{}{}", prefix, suffix));
        }
        match handle {
            "!" => Ok(format!("!{}", suffix)),
            "!!" => Ok(format!("{}{}", CORE_TAG_PREFIX, suffix)),
            _ => Err(ParseError::new(
                mark,
                &["a declared tag handle"],
                format!("undeclared tag handle '{}'", handle),
                "a node",
            )
            .into()),
        }
    }

    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> Result<Event, Error> {
        if matches!(self.peek_token()?.kind, TokenKind::Alias(_)) {
            let token = self.take_token()?;
            self.state = self.pop_state();
            let anchor = match token.kind {
                TokenKind::Alias(anchor) => anchor,
                _ => String::new(),
            };
            return Ok(Event::new(EventKind::Alias { anchor }, token.mark));
        }

        let mut start_mark = None;
        let mut anchor = None;
        let mut tag_parts: Option<(String, String, Marker)> = None;

        // Anchor and tag may come in either order.
        for _ in 0..2 {
            let (kind, mark) = self.peek_kind()?;
            match kind {
                TokenKind::Anchor(name) if anchor.is_none() => {
                    self.skip_token();
                    start_mark.get_or_insert(mark);
                    anchor = Some(name);
                }
                TokenKind::Tag { handle, suffix } if tag_parts.is_none() => {
                    self.skip_token();
                    start_mark.get_or_insert(mark);
                    tag_parts = Some((handle, suffix, mark));
                }
                _ => break,
            }
        }

        let tag = match tag_parts {
            Some((handle, suffix, mark)) => Some(self.resolve_tag(&handle, &suffix, mark)?),
            None => None,
        };

        let (kind, mark) = self.peek_kind()?;
        let start_mark = start_mark.unwrap_or(mark);

        if indentless_sequence && kind == TokenKind::BlockEntry {
            self.state = State::IndentlessSequenceEntry;
            return Ok(Event::new(
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    style: CollectionStyle::Block,
                },
                start_mark,
            ));
        }

        let event = match kind {
            TokenKind::Scalar { .. } => {
                let token = self.take_token()?;
                self.state = self.pop_state();
                match token.kind {
                    TokenKind::Scalar { value, style } => EventKind::Scalar {
                        anchor,
                        tag,
                        value,
                        style,
                    },
                    _ => EventKind::empty_scalar(),
                }
            }
            TokenKind::FlowSequenceStart => {
                self.state = State::FlowSequenceFirstEntry;
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    style: CollectionStyle::Flow,
                }
            }
            TokenKind::FlowMappingStart => {
                self.state = State::FlowMappingFirstKey;
                EventKind::MappingStart {
                    anchor,
                    tag,
                    style: CollectionStyle::Flow,
                }
            }
            TokenKind::BlockSequenceStart if block => {
                self.state = State::BlockSequenceFirstEntry;
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    style: CollectionStyle::Block,
                }
            }
            TokenKind::BlockMappingStart if block => {
                self.state = State::BlockMappingFirstKey;
                EventKind::MappingStart {
                    anchor,
                    tag,
                    style: CollectionStyle::Block,
                }
            }
            _ if anchor.is_some() || tag.is_some() => {
                // Anchored or tagged empty node
                self.state = self.pop_state();
                EventKind::Scalar {
                    anchor,
                    tag,
                    value: String::new(),
                    style: ScalarStyle::Plain,
                }
            }
            _ => {
                let context = if block { "a block node" } else { "a flow node" };
                return Err(self.unexpected(&["a node"], context));
            }
        };
        Ok(Event::new(event, start_mark))
    }

    fn parse_block_sequence_entry(&mut self, first: bool) -> Result<Event, Error> {
        if first {
            self.skip_token(); // BlockSequenceStart
        }
        let (kind, mark) = self.peek_kind()?;
        match kind {
            TokenKind::BlockEntry => {
                self.skip_token();
                if self.next_is(|k| matches!(k, TokenKind::BlockEntry | TokenKind::BlockEnd))? {
                    self.state = State::BlockSequenceEntry;
                    Ok(Event::new(EventKind::empty_scalar(), mark))
                } else {
                    self.states.push(State::BlockSequenceEntry);
                    self.parse_node(true, false)
                }
            }
            TokenKind::BlockEnd => {
                self.skip_token();
                self.state = self.pop_state();
                Ok(Event::new(EventKind::SequenceEnd, mark))
            }
            _ => Err(self.unexpected(&["'-'"], "a block sequence")),
        }
    }

    fn parse_indentless_sequence_entry(&mut self) -> Result<Event, Error> {
        let (kind, mark) = self.peek_kind()?;
        if kind != TokenKind::BlockEntry {
            self.state = self.pop_state();
            return Ok(Event::new(EventKind::SequenceEnd, mark));
        }
        self.skip_token();
        if self.next_is(|k| {
            matches!(
                k,
                TokenKind::BlockEntry | TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
            )
        })? {
            self.state = State::IndentlessSequenceEntry;
            Ok(Event::new(EventKind::empty_scalar(), mark))
        } else {
            self.states.push(State::IndentlessSequenceEntry);
            self.parse_node(true, false)
        }
    }

    fn parse_block_mapping_key(&mut self, first: bool) -> Result<Event, Error> {
        if first {
            self.skip_token(); // BlockMappingStart
        }
        let (kind, mark) = self.peek_kind()?;
        match kind {
            TokenKind::Key => {
                self.skip_token();
                if self.next_is(|k| {
                    matches!(k, TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd)
                })? {
                    self.state = State::BlockMappingValue;
                    Ok(Event::new(EventKind::empty_scalar(), mark))
                } else {
                    self.states.push(State::BlockMappingValue);
                    self.parse_node(true, true)
                }
            }
            // `: value` with an empty key
            TokenKind::Value => {
                self.state = State::BlockMappingValue;
                Ok(Event::new(EventKind::empty_scalar(), mark))
            }
            TokenKind::BlockEnd => {
                self.skip_token();
                self.state = self.pop_state();
                Ok(Event::new(EventKind::MappingEnd, mark))
            }
            _ => Err(self.unexpected(&["a mapping key"], "a block mapping")),
        }
    }

    fn parse_block_mapping_value(&mut self) -> Result<Event, Error> {
        let (kind, mark) = self.peek_kind()?;
        if kind != TokenKind::Value {
            self.state = State::BlockMappingKey;
            return Ok(Event::new(EventKind::empty_scalar(), mark));
        }
        self.skip_token();
        if self.next_is(|k| matches!(k, TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd))?
        {
            self.state = State::BlockMappingKey;
            Ok(Event::new(EventKind::empty_scalar(), mark))
        } else {
            self.states.push(State::BlockMappingKey);
            self.parse_node(true, true)
        }
    }

    fn parse_flow_sequence_entry(&mut self, first: bool) -> Result<Event, Error> {
        if first {
            self.skip_token(); // FlowSequenceStart
        }
        if !self.next_is(|k| *k == TokenKind::FlowSequenceEnd)? {
            if !first {
                if self.next_is(|k| *k == TokenKind::FlowEntry)? {
                    self.skip_token();
                } else {
                    return Err(self.unexpected(&["','", "']'"], "a flow sequence"));
                }
            }
            let (kind, mark) = self.peek_kind()?;
            if kind == TokenKind::Key {
                // Single pair mapping: `[a: b]`
                self.skip_token();
                self.state = State::FlowSequenceEntryMappingKey;
                return Ok(Event::new(
                    EventKind::MappingStart {
                        anchor: None,
                        tag: None,
                        style: CollectionStyle::Flow,
                    },
                    mark,
                ));
            }
            if kind != TokenKind::FlowSequenceEnd {
                self.states.push(State::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }
        let token = self.take_token()?;
        self.state = self.pop_state();
        Ok(Event::new(EventKind::SequenceEnd, token.mark))
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<Event, Error> {
        let (kind, mark) = self.peek_kind()?;
        if matches!(
            kind,
            TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowSequenceEnd
        ) {
            self.state = State::FlowSequenceEntryMappingValue;
            Ok(Event::new(EventKind::empty_scalar(), mark))
        } else {
            self.states.push(State::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<Event, Error> {
        let (kind, mark) = self.peek_kind()?;
        if kind == TokenKind::Value {
            self.skip_token();
            if !self.next_is(|k| matches!(k, TokenKind::FlowEntry | TokenKind::FlowSequenceEnd))? {
                self.states.push(State::FlowSequenceEntryMappingEnd);
                return self.parse_node(false, false);
            }
        }
        self.state = State::FlowSequenceEntryMappingEnd;
        Ok(Event::new(EventKind::empty_scalar(), mark))
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<Event, Error> {
        let (_, mark) = self.peek_kind()?;
        self.state = State::FlowSequenceEntry;
        Ok(Event::new(EventKind::MappingEnd, mark))
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> Result<Event, Error> {
        if first {
            self.skip_token(); // FlowMappingStart
        }
        if !self.next_is(|k| *k == TokenKind::FlowMappingEnd)? {
            if !first {
                if self.next_is(|k| *k == TokenKind::FlowEntry)? {
                    self.skip_token();
                } else {
                    return Err(self.unexpected(&["','", "'}'"], "a flow mapping"));
                }
            }
            let (kind, mark) = self.peek_kind()?;
            if kind == TokenKind::Key {
                self.skip_token();
                if self.next_is(|k| {
                    matches!(
                        k,
                        TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowMappingEnd
                    )
                })? {
                    self.state = State::FlowMappingValue;
                    return Ok(Event::new(EventKind::empty_scalar(), mark));
                }
                self.states.push(State::FlowMappingValue);
                return self.parse_node(false, false);
            }
            if kind != TokenKind::FlowMappingEnd {
                // `{a, b}`: keys without values
                self.states.push(State::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }
        let token = self.take_token()?;
        self.state = self.pop_state();
        Ok(Event::new(EventKind::MappingEnd, token.mark))
    }

    fn parse_flow_mapping_value(&mut self, empty: bool) -> Result<Event, Error> {
        let (kind, mark) = self.peek_kind()?;
        if !empty && kind == TokenKind::Value {
            self.skip_token();
            if !self.next_is(|k| matches!(k, TokenKind::FlowEntry | TokenKind::FlowMappingEnd))? {
                self.states.push(State::FlowMappingKey);
                return self.parse_node(false, false);
            }
        }
        self.state = State::FlowMappingKey;
        Ok(Event::new(EventKind::empty_scalar(), mark))
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Event, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<EventKind> {
        Parser::new(input).map(|e| e.unwrap().kind).collect()
    }

    fn parse_err(input: &str) -> Error {
        Parser::new(input)
            .find_map(|e| e.err())
            .expect("expected a parse error")
    }

    fn scalar(value: &str) -> EventKind {
        EventKind::Scalar {
            anchor: None,
            tag: None,
            value: value.into(),
            style: ScalarStyle::Plain,
        }
    }

    fn seq(style: CollectionStyle) -> EventKind {
        EventKind::SequenceStart {
            anchor: None,
            tag: None,
            style,
        }
    }

    fn map(style: CollectionStyle) -> EventKind {
        EventKind::MappingStart {
            anchor: None,
            tag: None,
            style,
        }
    }

    fn doc_start(implicit: bool) -> EventKind {
        EventKind::DocumentStart {
            implicit,
            version: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(events(""), vec![EventKind::StreamStart, EventKind::StreamEnd]);
        assert_eq!(
            events("# only a comment\n"),
            vec![EventKind::StreamStart, EventKind::StreamEnd]
        );
    }

    #[test]
    fn test_bare_scalar_document() {
        use EventKind::*;
        assert_eq!(
            events("hello"),
            vec![
                StreamStart,
                doc_start(true),
                scalar("hello"),
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_block_mapping_with_nested_sequence() {
        use EventKind::*;
        assert_eq!(
            events("a:\n  - 1\n  - 2\nb: x\n"),
            vec![
                StreamStart,
                doc_start(true),
                map(CollectionStyle::Block),
                scalar("a"),
                seq(CollectionStyle::Block),
                scalar("1"),
                scalar("2"),
                SequenceEnd,
                scalar("b"),
                scalar("x"),
                MappingEnd,
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_indentless_sequence() {
        use EventKind::*;
        assert_eq!(
            events("a:\n- 1\nb: 2\n"),
            vec![
                StreamStart,
                doc_start(true),
                map(CollectionStyle::Block),
                scalar("a"),
                seq(CollectionStyle::Block),
                scalar("1"),
                SequenceEnd,
                scalar("b"),
                scalar("2"),
                MappingEnd,
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_empty_values() {
        use EventKind::*;
        assert_eq!(
            events("a:\nb: 1\n"),
            vec![
                StreamStart,
                doc_start(true),
                map(CollectionStyle::Block),
                scalar("a"),
                scalar(""),
                scalar("b"),
                scalar("1"),
                MappingEnd,
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_flow_mapping_and_sequence() {
        use EventKind::*;
        assert_eq!(
            events("{a: [1, 2], b}"),
            vec![
                StreamStart,
                doc_start(true),
                map(CollectionStyle::Flow),
                scalar("a"),
                seq(CollectionStyle::Flow),
                scalar("1"),
                scalar("2"),
                SequenceEnd,
                scalar("b"),
                scalar(""),
                MappingEnd,
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_single_pair_mapping_in_flow_sequence() {
        use EventKind::*;
        assert_eq!(
            events("[a: 1, b]"),
            vec![
                StreamStart,
                doc_start(true),
                seq(CollectionStyle::Flow),
                map(CollectionStyle::Flow),
                scalar("a"),
                scalar("1"),
                MappingEnd,
                scalar("b"),
                SequenceEnd,
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_explicit_key() {
        use EventKind::*;
        assert_eq!(
            events("? - a\n: b\n"),
            vec![
                StreamStart,
                doc_start(true),
                map(CollectionStyle::Block),
                seq(CollectionStyle::Block),
                scalar("a"),
                SequenceEnd,
                scalar("b"),
                MappingEnd,
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_multiple_documents() {
        use EventKind::*;
        assert_eq!(
            events("--- a\n...\n--- b\n"),
            vec![
                StreamStart,
                doc_start(false),
                scalar("a"),
                DocumentEnd { implicit: false },
                doc_start(false),
                scalar("b"),
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_empty_explicit_document() {
        use EventKind::*;
        assert_eq!(
            events("---\n"),
            vec![
                StreamStart,
                doc_start(false),
                scalar(""),
                DocumentEnd { implicit: true },
                StreamEnd
            ]
        );
    }

    #[test]
    fn test_anchor_tag_and_alias() {
        let evs = events("- !!int &a 1\n- *a\n");
        assert_eq!(
            evs[3],
            EventKind::Scalar {
                anchor: Some("a".into()),
                tag: Some("tag:yaml.org,2002:int".into()),
                value: "1".into(),
                style: ScalarStyle::Plain
            }
        );
        assert_eq!(evs[4], EventKind::Alias { anchor: "a".into() });
    }

    #[test]
    fn test_tag_directive_resolution() {
        let evs = events("%TAG !e! tag:example.com,2000:app/\n--- !e!foo bar\n");
        assert_eq!(
            evs[1],
            EventKind::DocumentStart {
                implicit: false,
                version: None,
                tags: vec![("!e!".into(), "tag:example.com,2000:app/".into())]
            }
        );
        assert!(matches!(
            &evs[2],
            EventKind::Scalar { tag: Some(t), .. } if t == "tag:example.com,2000:app/foo"
        ));
    }

    #[test]
    fn test_anchored_empty_node() {
        let evs = events("a: &x\nb: *x\n");
        assert_eq!(
            evs[4],
            EventKind::Scalar {
                anchor: Some("x".into()),
                tag: None,
                value: "".into(),
                style: ScalarStyle::Plain
            }
        );
    }

    #[test]
    fn test_undeclared_tag_handle() {
        let err = parse_err("!x!foo bar");
        assert!(matches!(err, Error::Parse(ref e) if e.found.contains("'!x!'")));
    }

    #[test]
    fn test_unterminated_flow_sequence() {
        let err = parse_err("[1, 2");
        match err {
            Error::Parse(e) => {
                assert_eq!(e.expected, vec!["','", "']'"]);
                assert_eq!(e.found, "end of stream");
                assert_eq!(e.mark.offset, 5);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_yaml_version() {
        let err = parse_err("%YAML 2.0\n--- a\n");
        assert!(matches!(err, Error::Parse(ref e) if e.found == "%YAML 2.0"));
    }

    #[test]
    fn test_directive_requires_document_start() {
        let err = parse_err("%YAML 1.2\na: 1\n");
        assert!(matches!(err, Error::Parse(ref e) if e.expected == vec!["'---'"]));
    }

    #[test]
    fn test_block_sequence_after_mapping_entry() {
        let err = parse_err("a: 1\n- b\n");
        assert!(matches!(err, Error::Parse(ref e) if e.context == "a block mapping"));
    }

    #[test]
    fn test_scan_errors_pass_through() {
        assert!(matches!(parse_err("a: \"open"), Error::Scan(_)));
    }

    #[test]
    fn test_iteration_stops_after_error() {
        let mut parser = Parser::new("[1, 2");
        let results: Vec<_> = parser.by_ref().collect();
        assert!(results.last().unwrap().is_err());
        assert!(parser.next().is_none());
    }
}
