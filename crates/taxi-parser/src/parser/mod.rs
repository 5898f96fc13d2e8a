//! Event-based parser for Taxi.
//!
//! Parse functions call `open()` to start a node, `advance()` to consume
//! tokens and `close()` to finish a node with its kind. The resulting flat
//! event list is turned into a rowan green tree by `build_tree()`, so node
//! kinds can be decided after their first tokens have been seen (a `type`
//! declaration only becomes a union once the `=` is reached).
//!
//! Comments and lexer error tokens are trivia: lookahead skips them and
//! `advance()` emits them into the tree ahead of the next significant token.
//!
//! Errors follow a first-error-only strategy. Once an error is recorded,
//! parse functions bail out and the remaining input is swallowed into the
//! source file node.

pub(crate) mod items;
pub(crate) mod types;

use taxi_common::span::Span;
use taxi_common::token::Token;

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug)]
enum Event {
    /// Start a node. `kind` stays TOMBSTONE until `close()` patches it.
    Open { kind: SyntaxKind },
    Close,
    /// Consume one token (trivia included) into the current node.
    Advance,
}

/// Marker for an opened node that still needs `close()`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

pub(crate) struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    source: &'src str,
    errors: Vec<ParseError>,
    has_error: bool,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
            has_error: false,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Kind of the nth significant token ahead, or `EOF` past the end.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .map(|t| SyntaxKind::from(t.kind.clone()))
            .filter(|k| !k.is_trivia())
            .nth(n)
            .unwrap_or(SyntaxKind::EOF)
    }

    pub(crate) fn current_text(&self) -> &str {
        let pos = self.skip_trivia(self.pos);
        match self.tokens.get(pos) {
            Some(token) => &self.source[token.span.start as usize..token.span.end as usize],
            None => "",
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        let pos = self.skip_trivia(self.pos);
        match self.tokens.get(pos) {
            Some(token) => token.span,
            None => Span::empty_at(self.source.len() as u32),
        }
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Whether the current token is the identifier `word`. Used for
    /// contextual keywords such as `from`.
    pub(crate) fn at_contextual(&self, word: &str) -> bool {
        self.at(SyntaxKind::IDENT) && self.current_text() == word
    }

    // ── Nodes ──────────────────────────────────────────────────────────

    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
        });
        mark
    }

    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) {
        if let Event::Open { kind: slot } = &mut self.events[m.index] {
            *slot = kind;
        }
        self.events.push(Event::Close);
    }

    // ── Tokens ─────────────────────────────────────────────────────────

    /// Consume pending trivia and then the current significant token.
    pub(crate) fn advance(&mut self) {
        while self.pos < self.tokens.len()
            && SyntaxKind::from(self.tokens[self.pos].kind.clone()).is_trivia()
        {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// Consume the current token inside an ERROR_NODE and record `message`.
    pub(crate) fn advance_with_error(&mut self, message: &str) {
        let m = self.open();
        self.error(message);
        self.advance();
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    /// Consume `kind` or record an error describing what was expected.
    pub(crate) fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(&format!("expected {what}"));
            false
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Errors ─────────────────────────────────────────────────────────

    pub(crate) fn error(&mut self, message: &str) {
        if self.has_error {
            return;
        }
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
        self.has_error = true;
    }

    pub(crate) fn error_with_related(&mut self, message: &str, related_span: Span, related: &str) {
        if self.has_error {
            return;
        }
        let span = self.current_span();
        self.errors
            .push(ParseError::with_related(message, span, related, related_span));
        self.has_error = true;
    }

    pub(crate) fn has_error(&self) -> bool {
        self.has_error
    }

    fn skip_trivia(&self, mut pos: usize) -> usize {
        while pos < self.tokens.len() && SyntaxKind::from(self.tokens[pos].kind.clone()).is_trivia()
        {
            pos += 1;
        }
        pos
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Replay the events into a rowan green tree.
    pub(crate) fn build_tree(self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut tokens = self.tokens.iter();

        for event in &self.events {
            match event {
                Event::Open { kind } => {
                    if *kind != SyntaxKind::TOMBSTONE {
                        builder.start_node(rowan::SyntaxKind(*kind as u16));
                    }
                }
                Event::Close => builder.finish_node(),
                Event::Advance => {
                    if let Some(token) = tokens.next() {
                        let kind = SyntaxKind::from(token.kind.clone());
                        let text = &self.source[token.span.start as usize..token.span.end as usize];
                        builder.token(rowan::SyntaxKind(kind as u16), text);
                    }
                }
            }
        }

        (builder.finish(), self.errors)
    }
}

// ── Top-level parsing ──────────────────────────────────────────────────

/// Parse a whole source file into a SOURCE_FILE node.
pub(crate) fn parse_source_file(p: &mut Parser) {
    let root = p.open();

    while !p.at(SyntaxKind::EOF) && !p.has_error() {
        items::parse_item(p);
    }

    // Swallow whatever is left after an error, then EOF itself.
    while !p.at(SyntaxKind::EOF) {
        p.advance();
    }
    p.advance();

    p.close(root, SyntaxKind::SOURCE_FILE);
}
