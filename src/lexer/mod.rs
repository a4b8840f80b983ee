//! Lexical analysis for blitzweb.
//!
//! This module converts BASIC source code into a stream of [`Token`]s.
//! It handles:
//!
//! - Case-insensitive keyword recognition
//! - Builtin command recognition driven by a [`CommandTable`]
//! - Decimal, float (`.5`) and hexadecimal (`$FF`) numbers
//! - Identifiers with a type suffix (`%`, `#`, `$`)
//! - `; comments`, `.labels`, and `:` statement separators
//!
//! ## Example
//!
//! ```
//! use blitzweb::lexer::{tokenize, TokenKind};
//!
//! let (tokens, errors) = tokenize("Graphics 800, 600");
//! assert!(errors.is_empty());
//! assert_eq!(tokens[0].kind, TokenKind::Command);
//! assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
//! ```
//!
//! ## Design Notes
//!
//! The raw scanner is built on [`logos`](https://docs.rs/logos). We wrap it in
//! our own [`Lexer`] to classify words, attach line/column positions, and
//! record errors instead of dropping them. The lexer is total: every input
//! produces a token list ending in [`TokenKind::Eof`].

mod error;
mod token;

pub use error::LexError;
pub use token::{Keyword, Token, TokenKind};

use logos::Logos;

use crate::ast::Span;
use crate::commands::CommandTable;
use crate::semantic::TypeSuffix;
use token::RawToken;

/// Maps byte offsets to 1-based line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the index for `source`.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// Converts a byte offset into `(line, column)`. Columns count characters.
    pub fn position(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line, column + 1)
    }
}

/// The lexer for blitzweb source code.
///
/// Wraps a `logos` scanner and yields [`Token`]s with their positions. The
/// final token is always [`TokenKind::Eof`].
pub struct Lexer<'a> {
    /// The underlying logos lexer
    inner: logos::Lexer<'a, RawToken>,
    /// The original source (for positions)
    source: &'a str,
    /// Names that lex as builtin commands
    commands: &'a CommandTable,
    lines: LineIndex,
    errors: Vec<LexError>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer using the standard command table.
    pub fn new(source: &'a str) -> Self {
        Self::with_commands(source, CommandTable::standard())
    }

    /// Create a lexer that recognises the commands in `commands`.
    pub fn with_commands(source: &'a str, commands: &'a CommandTable) -> Self {
        Self {
            inner: RawToken::lexer(source),
            source,
            commands,
            lines: LineIndex::new(source),
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Get the original source code.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Get the next token, if any.
    ///
    /// Returns the end-of-input token exactly once, then `None`.
    /// Unrecognized characters are recorded as errors and skipped.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            let Some(result) = self.inner.next() else {
                if self.finished {
                    return None;
                }
                self.finished = true;
                let end = self.source.len();
                return Some(self.make_token(TokenKind::Eof, end..end, ""));
            };

            let span = self.inner.span();
            match result {
                Ok(raw) => return Some(self.classify(raw, span)),
                Err(()) => {
                    // One error per character so columns stay exact
                    let slice = self.inner.slice();
                    for (i, ch) in slice.char_indices() {
                        let start = span.start + i;
                        let err_span = self.span_at(start..start + ch.len_utf8());
                        self.errors.push(LexError::UnexpectedCharacter { ch, span: err_span });
                    }
                }
            }
        }
    }

    /// Consumes the lexer, returning every token and every error.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        (tokens, self.errors)
    }

    fn classify(&mut self, raw: RawToken, span: std::ops::Range<usize>) -> Token {
        let slice = &self.source[span.clone()];

        if let Some(kind) = raw.operator_kind() {
            return self.make_token(kind, span, slice);
        }

        match raw {
            RawToken::Comment => self.make_token(TokenKind::Comment, span, &slice[1..]),
            RawToken::Integer => self.make_token(TokenKind::IntegerLiteral, span, slice),
            RawToken::Float => self.make_token(TokenKind::FloatLiteral, span, slice),
            RawToken::Hex => self.make_token(TokenKind::HexLiteral, span, slice),
            RawToken::Label => self.make_token(TokenKind::Label, span, &slice[1..]),
            RawToken::String => {
                let terminated = slice.len() >= 2 && slice.ends_with('"');
                let content = if terminated {
                    &slice[1..slice.len() - 1]
                } else {
                    &slice[1..]
                };
                if !terminated {
                    let err_span = self.span_at(span.clone());
                    self.errors.push(LexError::UnterminatedString { span: err_span });
                }
                self.make_token(TokenKind::StringLiteral, span, content)
            }
            RawToken::Word => self.classify_word(slice, span),
            _ => unreachable!("operator shapes are mapped above"),
        }
    }

    /// Keyword beats command beats identifier.
    fn classify_word(&self, word: &str, span: std::ops::Range<usize>) -> Token {
        let (base, suffix) = TypeSuffix::split(word);

        if suffix.is_none()
            && let Some(keyword) = Keyword::lookup(word)
        {
            return self.make_token(TokenKind::Keyword(keyword), span, word.to_ascii_lowercase());
        }

        let folded = base.to_ascii_lowercase();
        if self.commands.contains(&folded) {
            return self.make_token(TokenKind::Command, span, folded);
        }

        self.make_token(TokenKind::Identifier, span, word)
    }

    fn make_token(&self, kind: TokenKind, span: std::ops::Range<usize>, text: impl Into<String>) -> Token {
        let (line, column) = self.lines.position(self.source, span.start);
        Token::new(kind, span, text, line, column)
    }

    fn span_at(&self, range: std::ops::Range<usize>) -> Span {
        let (line, column) = self.lines.position(self.source, range.start);
        Span::new(range.start, range.end).at(line, column)
    }
}

/// Implement Iterator so the lexer can be used with for loops and iterator adapters.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenizes source with the standard command table.
///
/// # Example
///
/// ```
/// use blitzweb::lexer::{tokenize, TokenKind};
///
/// let (tokens, errors) = tokenize("x = \"open");
/// assert_eq!(errors.len(), 1);
/// assert_eq!(tokens[2].kind, TokenKind::StringLiteral);
/// assert_eq!(tokens[2].text, "open");
/// ```
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(source).tokenize()
}

/// Tokenizes source against a custom command table.
pub fn tokenize_with(source: &str, commands: &CommandTable) -> (Vec<Token>, Vec<LexError>) {
    Lexer::with_commands(source, commands).tokenize()
}

/// Convenience function returning only the tokens.
pub fn lex(source: &str) -> Vec<Token> {
    tokenize(source).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_graphics_program_tokens() {
        let (tokens, errors) = tokenize("GRAPHICS 800,600\nCLS\nEND");
        assert!(errors.is_empty());

        let shape: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            shape,
            vec![
                (TokenKind::Command, "graphics"),
                (TokenKind::IntegerLiteral, "800"),
                (TokenKind::Comma, ","),
                (TokenKind::IntegerLiteral, "600"),
                (TokenKind::Newline, "\n"),
                (TokenKind::Command, "cls"),
                (TokenKind::Newline, "\n"),
                (TokenKind::Keyword(Keyword::End), "end"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_empty_source_yields_eof() {
        let (tokens, errors) = tokenize("");
        assert!(errors.is_empty());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_hex_literal_text() {
        let tokens = lex("x = $1aF");
        assert_eq!(tokens[2].kind, TokenKind::HexLiteral);
        assert_eq!(tokens[2].text, "$1aF");
        assert!(tokens[2].text[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_unterminated_string_recovers() {
        let (tokens, errors) = tokenize("Print \"hello\nCls");
        let strings: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::StringLiteral)
            .collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0].text, "hello");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
        // The next line still lexes
        assert_eq!(tokens[3].kind, TokenKind::Command);
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        let (tokens, errors) = tokenize("a @ b ~");
        assert_eq!(errors.len(), 2);
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
        assert_eq!(errors[0].span().column, 3);
    }

    #[test]
    fn test_classification_order() {
        // `Delete` is a keyword, `Text` a command, `Texture` an identifier
        assert_eq!(
            kinds("Delete Text Texture"),
            vec![
                TokenKind::Keyword(Keyword::Delete),
                TokenKind::Command,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keyword_shadows_command_in_custom_table() {
        use crate::commands::CommandDescriptor;

        let mut table = CommandTable::empty();
        table.insert("wend", CommandDescriptor::call("misc.wend"));
        table.insert("beep", CommandDescriptor::call("audio.beep"));
        let (tokens, _) = tokenize_with("Wend Beep", &table);
        assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Wend));
        assert_eq!(tokens[1].kind, TokenKind::Command);
    }

    #[test]
    fn test_identifier_suffix_is_kept() {
        let tokens = lex("name$ = \"x\" : hp% = 3 : speed# = 1.5");
        assert_eq!(tokens[0].text, "name$");
        assert_eq!(tokens[3].kind, TokenKind::Colon);
        assert_eq!(tokens[4].text, "hp%");
        assert_eq!(tokens[8].text, "speed#");
    }

    #[test]
    fn test_suffixed_command_name() {
        let tokens = lex("a$ = Str$(5)");
        assert_eq!(tokens[2].kind, TokenKind::Command);
        assert_eq!(tokens[2].text, "str");
    }

    #[test]
    fn test_comment_and_label() {
        let tokens = lex(".start ; entry point\nGoto start");
        assert_eq!(tokens[0].kind, TokenKind::Label);
        assert_eq!(tokens[0].text, "start");
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[1].text, " entry point");
        assert_eq!(tokens[2].kind, TokenKind::Newline);
    }

    #[test]
    fn test_two_char_operators_are_greedy() {
        assert_eq!(
            kinds("a <> b <= c >= d < e"),
            vec![
                TokenKind::Identifier,
                TokenKind::NotEquals,
                TokenKind::Identifier,
                TokenKind::LessEquals,
                TokenKind::Identifier,
                TokenKind::GreaterEquals,
                TokenKind::Identifier,
                TokenKind::LessThan,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_field_access_and_annotation() {
        assert_eq!(
            kinds("p.Player\\x"),
            vec![
                TokenKind::Identifier,
                TokenKind::Label,
                TokenKind::Backslash,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_line_and_column_positions() {
        let tokens = lex("x = 1\n  y = 2");
        let y = &tokens[4];
        assert_eq!(y.text, "y");
        assert_eq!((y.line, y.column), (2, 3));
    }

    #[test]
    fn test_every_input_ends_with_eof() {
        for source in ["", "\"", "$", "....", "@@@", "If\n\n", "a\\\\b"] {
            let tokens = lex(source);
            assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof), "{source:?}");
        }
    }
}
