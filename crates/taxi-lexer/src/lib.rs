// Taxi lexer -- turns schema source text into tokens.

mod cursor;

use cursor::Cursor;
use taxi_common::error::{LexError, LexErrorKind};
use taxi_common::span::Span;
use taxi_common::token::{keyword_from_str, Token, TokenKind};

/// The Taxi lexer.
///
/// Whitespace is dropped; comments are kept as `Comment` tokens so the parser
/// can carry them into the CST. Invalid input produces an `Error` token and a
/// matching [`LexError`], and lexing continues.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    emitted_eof: bool,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Tokenize the whole source. The result ends with an `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    /// Tokenize the whole source, also returning every lexer error.
    pub fn tokenize_with_errors(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.by_ref().collect();
        (tokens, lexer.errors)
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn next_token(&mut self) -> Token {
        self.cursor.eat_while(char::is_whitespace);

        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            '.' => self.single_char_token(TokenKind::Dot, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            '?' => self.single_char_token(TokenKind::Question, start),
            '=' => self.single_char_token(TokenKind::Eq, start),
            '<' => self.single_char_token(TokenKind::Lt, start),
            '>' => self.single_char_token(TokenKind::Gt, start),
            '|' => self.single_char_token(TokenKind::Bar, start),
            '@' => self.single_char_token(TokenKind::At, start),

            '[' => self.lex_bracket(start),
            '-' => self.lex_minus(start),
            '/' => self.lex_slash(start),

            '0'..='9' => self.lex_number(start),
            '"' | '\'' => self.lex_string(c, start),

            c if is_ident_start(c) => self.lex_ident(start),

            _ => {
                self.cursor.advance();
                self.error(LexErrorKind::UnexpectedCharacter(c), start)
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// Record an error covering `start..pos` and return an `Error` token for it.
    fn error(&mut self, kind: LexErrorKind, start: u32) -> Token {
        let end = self.cursor.pos();
        self.errors.push(LexError::new(kind, Span::new(start, end)));
        Token::new(TokenKind::Error, start, end)
    }

    // ── Punctuation ──────────────────────────────────────────────────────

    /// `[` -> `LBracket`, `[[ ... ]]` -> `DocComment`
    fn lex_bracket(&mut self, start: u32) -> Token {
        self.cursor.advance(); // '['
        if !self.cursor.eat('[') {
            return Token::new(TokenKind::LBracket, start, self.cursor.pos());
        }
        loop {
            match self.cursor.advance() {
                None => return self.error(LexErrorKind::UnterminatedDocComment, start),
                Some(']') if self.cursor.peek() == Some(']') => {
                    self.cursor.advance();
                    return Token::new(TokenKind::DocComment, start, self.cursor.pos());
                }
                Some(_) => {}
            }
        }
    }

    /// `->` -> `Arrow`, `-42` -> number, anything else is an error.
    fn lex_minus(&mut self, start: u32) -> Token {
        if self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance(); // '-'
            return self.lex_number(start);
        }
        self.cursor.advance(); // '-'
        if self.cursor.eat('>') {
            Token::new(TokenKind::Arrow, start, self.cursor.pos())
        } else {
            self.error(LexErrorKind::UnexpectedCharacter('-'), start)
        }
    }

    // ── Comments ─────────────────────────────────────────────────────────

    /// `// ...` and `/* ... */`. A lone `/` is an error.
    fn lex_slash(&mut self, start: u32) -> Token {
        self.cursor.advance(); // '/'
        match self.cursor.peek() {
            Some('/') => {
                self.cursor.eat_while(|c| c != '\n');
                Token::new(TokenKind::Comment, start, self.cursor.pos())
            }
            Some('*') => {
                self.cursor.advance();
                loop {
                    match self.cursor.advance() {
                        None => return self.error(LexErrorKind::UnterminatedBlockComment, start),
                        Some('*') if self.cursor.peek() == Some('/') => {
                            self.cursor.advance();
                            return Token::new(TokenKind::Comment, start, self.cursor.pos());
                        }
                        Some(_) => {}
                    }
                }
            }
            _ => self.error(LexErrorKind::UnexpectedCharacter('/'), start),
        }
    }

    // ── Literals ─────────────────────────────────────────────────────────

    /// Integer or decimal literal. A leading `-` has already been consumed.
    fn lex_number(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance(); // '.'
            self.cursor.eat_while(|c| c.is_ascii_digit());
            return Token::new(TokenKind::DecimalLiteral, start, self.cursor.pos());
        }
        Token::new(TokenKind::IntLiteral, start, self.cursor.pos())
    }

    /// A string delimited by `quote`. Backslash escapes the next character.
    fn lex_string(&mut self, quote: char, start: u32) -> Token {
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.advance() {
                None | Some('\n') => return self.error(LexErrorKind::UnterminatedString, start),
                Some('\\') => {
                    self.cursor.advance();
                }
                Some(c) if c == quote => {
                    return Token::new(TokenKind::StringLiteral, start, self.cursor.pos());
                }
                Some(_) => {}
            }
        }
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Strip the quotes from a string literal token's text and resolve escapes.
pub fn unquote(text: &str) -> String {
    let inner = text
        .get(1..text.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// The trimmed text between the `[[` and `]]` of a doc comment token.
pub fn doc_text(text: &str) -> String {
    text.strip_prefix("[[")
        .and_then(|t| t.strip_suffix("]]"))
        .unwrap_or(text)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_type_header() {
        assert_eq!(
            kinds("type Person inherits Entity {"),
            vec![
                TokenKind::Type,
                TokenKind::Ident,
                TokenKind::Inherits,
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_array_sugar_is_two_brackets() {
        assert_eq!(
            kinds("Foo[]"),
            vec![TokenKind::Ident, TokenKind::LBracket, TokenKind::RBracket, TokenKind::Eof]
        );
    }

    #[test]
    fn lex_spans() {
        let tokens = Lexer::tokenize("age : Int?");
        let spans: Vec<_> = tokens.iter().map(|t| (t.span.start, t.span.end)).collect();
        assert_eq!(spans, vec![(0, 3), (4, 5), (6, 9), (9, 10), (10, 10)]);
    }

    #[test]
    fn unquote_handles_both_quote_styles() {
        assert_eq!(unquote("'GBP'"), "GBP");
        assert_eq!(unquote(r#""a \"b\"""#), "a \"b\"");
    }

    #[test]
    fn doc_text_trims() {
        assert_eq!(doc_text("[[ A person ]]"), "A person");
    }
}
