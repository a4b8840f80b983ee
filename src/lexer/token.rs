//! Token definitions for the blitzweb lexer.
//!
//! Scanning happens in two layers:
//! - [`RawToken`] is the `logos`-generated scanner. It only knows the shape of
//!   lexemes (numbers, strings, words, labels, operators).
//! - [`TokenKind`] is what the parser sees. Words are classified into
//!   keywords, builtin commands and plain identifiers after scanning,
//!   because the command set comes from a [`CommandTable`](crate::commands::CommandTable)
//!   that is only known at run time.
//!
//! ## Design Notes
//!
//! BASIC is case-insensitive, so keyword lookup folds case. Keyword and
//! command token text is stored lower-cased; identifiers keep their source
//! spelling, type suffix included.

use logos::Logos;
use std::fmt;

/// A token with its location in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Byte offset range of the lexeme in the source
    pub span: std::ops::Range<usize>,
    /// Token text. Keywords and commands are lower-cased, string literals
    /// hold their content without quotes.
    pub text: String,
    /// 1-based line of the first character
    pub line: usize,
    /// 1-based column of the first character
    pub column: usize,
}

impl Token {
    /// Create a new token.
    pub fn new(
        kind: TokenKind,
        span: std::ops::Range<usize>,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            line,
            column,
        }
    }

    /// Source location as an AST span.
    pub fn location(&self) -> crate::ast::Span {
        crate::ast::Span::new(self.span.start, self.span.end).at(self.line, self.column)
    }

    /// Human-readable description used in diagnostics ("found ...").
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::StringLiteral => format!("string \"{}\"", self.text),
            TokenKind::Keyword(kw) => format!("`{}`", kw),
            _ => format!("`{}`", self.text),
        }
    }
}

/// The kinds of token the parser works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ==================== Structure ====================
    /// Newline - ends a statement
    Newline,
    /// `:` - explicit statement separator
    Colon,
    /// `; ...` comment, kept so tools can show it
    Comment,

    // ==================== Literals ====================
    /// Decimal integer: `42`
    IntegerLiteral,
    /// Float: `3.14`, `.5`, `1e3`
    FloatLiteral,
    /// Hexadecimal: `$FF`
    HexLiteral,
    /// String: `"hello"` (text holds the content)
    StringLiteral,

    // ==================== Names ====================
    /// Identifier, possibly with a type suffix (`name$`)
    Identifier,
    /// Reserved word
    Keyword(Keyword),
    /// Builtin runtime command (`Graphics`, `Cls`, ...)
    Command,
    /// `.name` label
    Label,

    // ==================== Operators ====================
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `=`
    Equals,
    /// `<>`
    NotEquals,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessEquals,
    /// `>=`
    GreaterEquals,
    /// `..`
    Range,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `\` - field access
    Backslash,

    /// End of input, always the last token
    Eof,
}

impl TokenKind {
    /// Returns true for tokens that end a statement.
    pub fn is_terminator(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Colon | TokenKind::Eof)
    }

    /// Returns true for numeric literal kinds.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            TokenKind::IntegerLiteral | TokenKind::FloatLiteral | TokenKind::HexLiteral
        )
    }

    /// Returns true for operator and punctuation kinds.
    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Caret
                | TokenKind::Equals
                | TokenKind::NotEquals
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::LessEquals
                | TokenKind::GreaterEquals
                | TokenKind::Range
                | TokenKind::LeftParen
                | TokenKind::RightParen
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Backslash
        )
    }

    /// Returns true if this is the given keyword.
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        *self == TokenKind::Keyword(keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Newline => write!(f, "end of line"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::IntegerLiteral | TokenKind::FloatLiteral | TokenKind::HexLiteral => {
                write!(f, "number")
            }
            TokenKind::StringLiteral => write!(f, "string"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Keyword(kw) => write!(f, "{}", kw),
            TokenKind::Command => write!(f, "command"),
            TokenKind::Label => write!(f, "label"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Equals => write!(f, "="),
            TokenKind::NotEquals => write!(f, "<>"),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::LessEquals => write!(f, "<="),
            TokenKind::GreaterEquals => write!(f, ">="),
            TokenKind::Range => write!(f, ".."),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Backslash => write!(f, "\\"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// Reserved words. These shadow command and identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Control flow
    If,
    Then,
    Else,
    ElseIf,
    EndIf,
    End,
    While,
    Wend,
    Repeat,
    Until,
    Forever,
    For,
    To,
    Step,
    Next,
    Each,
    Select,
    Case,
    Default,
    Goto,
    Gosub,
    Exit,
    Return,

    // Declarations
    Function,
    Type,
    Field,
    Global,
    Local,
    Dim,
    Const,

    // DATA pool
    Data,
    Read,
    Restore,

    // Operators spelled as words
    And,
    Or,
    Not,
    Xor,
    Mod,
    Shl,
    Shr,
    Sar,

    // Object lists
    New,
    Delete,
    First,
    Last,
    Before,
    After,
    Insert,

    // Constants
    Null,
    True,
    False,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: [Keyword; 51] = [
        Keyword::If,
        Keyword::Then,
        Keyword::Else,
        Keyword::ElseIf,
        Keyword::EndIf,
        Keyword::End,
        Keyword::While,
        Keyword::Wend,
        Keyword::Repeat,
        Keyword::Until,
        Keyword::Forever,
        Keyword::For,
        Keyword::To,
        Keyword::Step,
        Keyword::Next,
        Keyword::Each,
        Keyword::Select,
        Keyword::Case,
        Keyword::Default,
        Keyword::Goto,
        Keyword::Gosub,
        Keyword::Exit,
        Keyword::Return,
        Keyword::Function,
        Keyword::Type,
        Keyword::Field,
        Keyword::Global,
        Keyword::Local,
        Keyword::Dim,
        Keyword::Const,
        Keyword::Data,
        Keyword::Read,
        Keyword::Restore,
        Keyword::And,
        Keyword::Or,
        Keyword::Not,
        Keyword::Xor,
        Keyword::Mod,
        Keyword::Shl,
        Keyword::Shr,
        Keyword::Sar,
        Keyword::New,
        Keyword::Delete,
        Keyword::First,
        Keyword::Last,
        Keyword::Before,
        Keyword::After,
        Keyword::Insert,
        Keyword::Null,
        Keyword::True,
        Keyword::False,
    ];

    /// Looks up a word case-insensitively.
    pub fn lookup(word: &str) -> Option<Keyword> {
        let lower = word.to_ascii_lowercase();
        let kw = match lower.as_str() {
            "if" => Keyword::If,
            "then" => Keyword::Then,
            "else" => Keyword::Else,
            "elseif" => Keyword::ElseIf,
            "endif" => Keyword::EndIf,
            "end" => Keyword::End,
            "while" => Keyword::While,
            "wend" => Keyword::Wend,
            "repeat" => Keyword::Repeat,
            "until" => Keyword::Until,
            "forever" => Keyword::Forever,
            "for" => Keyword::For,
            "to" => Keyword::To,
            "step" => Keyword::Step,
            "next" => Keyword::Next,
            "each" => Keyword::Each,
            "select" => Keyword::Select,
            "case" => Keyword::Case,
            "default" => Keyword::Default,
            "goto" => Keyword::Goto,
            "gosub" => Keyword::Gosub,
            "exit" => Keyword::Exit,
            "return" => Keyword::Return,
            "function" => Keyword::Function,
            "type" => Keyword::Type,
            "field" => Keyword::Field,
            "global" => Keyword::Global,
            "local" => Keyword::Local,
            "dim" => Keyword::Dim,
            "const" => Keyword::Const,
            "data" => Keyword::Data,
            "read" => Keyword::Read,
            "restore" => Keyword::Restore,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            "xor" => Keyword::Xor,
            "mod" => Keyword::Mod,
            "shl" => Keyword::Shl,
            "shr" => Keyword::Shr,
            "sar" => Keyword::Sar,
            "new" => Keyword::New,
            "delete" => Keyword::Delete,
            "first" => Keyword::First,
            "last" => Keyword::Last,
            "before" => Keyword::Before,
            "after" => Keyword::After,
            "insert" => Keyword::Insert,
            "null" => Keyword::Null,
            "true" => Keyword::True,
            "false" => Keyword::False,
            _ => return None,
        };
        Some(kw)
    }

    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "If",
            Keyword::Then => "Then",
            Keyword::Else => "Else",
            Keyword::ElseIf => "ElseIf",
            Keyword::EndIf => "EndIf",
            Keyword::End => "End",
            Keyword::While => "While",
            Keyword::Wend => "Wend",
            Keyword::Repeat => "Repeat",
            Keyword::Until => "Until",
            Keyword::Forever => "Forever",
            Keyword::For => "For",
            Keyword::To => "To",
            Keyword::Step => "Step",
            Keyword::Next => "Next",
            Keyword::Each => "Each",
            Keyword::Select => "Select",
            Keyword::Case => "Case",
            Keyword::Default => "Default",
            Keyword::Goto => "Goto",
            Keyword::Gosub => "Gosub",
            Keyword::Exit => "Exit",
            Keyword::Return => "Return",
            Keyword::Function => "Function",
            Keyword::Type => "Type",
            Keyword::Field => "Field",
            Keyword::Global => "Global",
            Keyword::Local => "Local",
            Keyword::Dim => "Dim",
            Keyword::Const => "Const",
            Keyword::Data => "Data",
            Keyword::Read => "Read",
            Keyword::Restore => "Restore",
            Keyword::And => "And",
            Keyword::Or => "Or",
            Keyword::Not => "Not",
            Keyword::Xor => "Xor",
            Keyword::Mod => "Mod",
            Keyword::Shl => "Shl",
            Keyword::Shr => "Shr",
            Keyword::Sar => "Sar",
            Keyword::New => "New",
            Keyword::Delete => "Delete",
            Keyword::First => "First",
            Keyword::Last => "Last",
            Keyword::Before => "Before",
            Keyword::After => "After",
            Keyword::Insert => "Insert",
            Keyword::Null => "Null",
            Keyword::True => "True",
            Keyword::False => "False",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexeme shapes recognised by the `logos` scanner.
///
/// Words are not split into keywords here; see [`TokenKind`].
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip horizontal whitespace (but not newlines!)
pub(super) enum RawToken {
    /// `;` comment to end of line
    #[regex(r";[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,

    #[token(":")]
    Colon,

    #[regex(r"[0-9]+", priority = 2)]
    Integer,

    /// `1.5`, `.5`, `1.5e3`, `2e8`
    #[regex(r"[0-9]*\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,

    /// `$FF`
    #[regex(r"\$[0-9A-Fa-f]+")]
    Hex,

    /// Closing quote is optional so an unterminated string still scans
    #[regex(r#""[^"\n]*"?"#)]
    String,

    /// Name with an optional type suffix
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*[%#$]?")]
    Word,

    /// `.name`
    #[regex(r"\.[A-Za-z_][A-Za-z0-9_]*")]
    Label,

    #[token("<>")]
    NotEquals,
    #[token("<=")]
    LessEquals,
    #[token(">=")]
    GreaterEquals,
    #[token("..")]
    Range,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("=")]
    Equals,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(",")]
    Comma,
    #[token("\\")]
    Backslash,
}

impl RawToken {
    /// Maps operator shapes straight to their [`TokenKind`]; word, string and
    /// comment shapes need more context and return `None`.
    pub(super) fn operator_kind(self) -> Option<TokenKind> {
        let kind = match self {
            RawToken::NotEquals => TokenKind::NotEquals,
            RawToken::LessEquals => TokenKind::LessEquals,
            RawToken::GreaterEquals => TokenKind::GreaterEquals,
            RawToken::Range => TokenKind::Range,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Equals => TokenKind::Equals,
            RawToken::LessThan => TokenKind::LessThan,
            RawToken::GreaterThan => TokenKind::GreaterThan,
            RawToken::LeftParen => TokenKind::LeftParen,
            RawToken::RightParen => TokenKind::RightParen,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Backslash => TokenKind::Backslash,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Newline => TokenKind::Newline,
            _ => return None,
        };
        Some(kind)
    }
}
