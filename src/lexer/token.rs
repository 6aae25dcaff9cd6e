//! Token definitions for the script scanner.
//!
//! This module defines every token the language knows about:
//! - Literals (identifiers, numbers, strings, booleans, `null`)
//! - Keywords (`let`, `function`, `if`, ..., and the type keywords)
//! - Operators, including the compound assignment forms
//! - Punctuation and delimiters
//!
//! ## Design Notes
//!
//! Logos always picks the longest match, so `<<=` wins over `<<` which wins
//! over `<`. Keywords are literal tokens and therefore take priority over the
//! identifier regex when both match the same text.
//!
//! Numbers may carry a leading `-` when a digit follows. The scanner cannot
//! tell `a -1` from `a - 1`; the parser splits the token when it shows up in
//! operator position.

use logos::{FilterResult, Logos};
use std::fmt;

use super::error::LexErrorKind;

/// A token with its location in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Byte offsets of the token in the source
    pub span: std::ops::Range<usize>,
    /// The original text of the token
    pub text: String,
}

impl Token {
    /// Create a new token with the given kind, span, and text.
    pub fn new(kind: TokenKind, span: std::ops::Range<usize>, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// Every token kind the scanner produces.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // ==================== Trivia ====================

    /// `// ...` up to the end of the line
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    /// `/* ... */`, skipped by the callback
    #[token("/*", lex_block_comment)]
    BlockComment,

    // ==================== Literals ====================

    /// Identifier: `file`, `_tmp`, `x1`
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    /// Number: `42`, `-1`, `.5`, `0xff`
    #[regex(r"-?[0-9][0-9a-fA-FxX.]*")]
    #[regex(r"\.[0-9][0-9a-fA-FxX.]*")]
    Number,

    /// Double-quoted string with backslash escapes, kept verbatim
    #[token("\"", lex_string)]
    String,

    /// `true` or `false`
    #[token("true")]
    #[token("false")]
    Boolean,

    /// `null`
    #[token("null")]
    Null,

    // ==================== Keywords ====================

    /// `Boolean` type constructor
    #[token("Boolean")]
    BooleanKeyword,

    /// `Number` type constructor
    #[token("Number")]
    NumberKeyword,

    /// `String` type constructor
    #[token("String")]
    StringKeyword,

    #[token("let")]
    Let,

    #[token("return")]
    Return,

    #[token("function")]
    Function,

    #[token("lambda")]
    Lambda,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("for")]
    For,

    #[token("while")]
    While,

    #[token("break")]
    Break,

    #[token("continue")]
    Continue,

    // ==================== Assignment ====================

    #[token("=")]
    Assign,

    #[token("+=")]
    AddAssign,

    #[token("-=")]
    SubAssign,

    #[token("*=")]
    MulAssign,

    #[token("/=")]
    QuoAssign,

    #[token("%=")]
    RemAssign,

    #[token("&=")]
    AndAssign,

    #[token("|=")]
    OrAssign,

    #[token("^=")]
    XorAssign,

    #[token("<<=")]
    ShlAssign,

    #[token(">>=")]
    ShrAssign,

    #[token("&^=")]
    AndNotAssign,

    // ==================== Operators ====================

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("*")]
    Mul,

    #[token("/")]
    Quo,

    #[token("%")]
    Rem,

    #[token("&")]
    And,

    #[token("!")]
    Not,

    #[token("|")]
    Or,

    #[token("^")]
    Xor,

    #[token("<<")]
    Shl,

    #[token(">>")]
    Shr,

    #[token("&^")]
    AndNot,

    #[token("&&")]
    LogicalAnd,

    #[token("||")]
    LogicalOr,

    #[token("==")]
    Equal,

    #[token("!=")]
    NotEqual,

    #[token("<")]
    Lesser,

    #[token("<=")]
    LesserEqual,

    #[token(">")]
    Greater,

    #[token(">=")]
    GreaterEqual,

    // ==================== Punctuation ====================

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token(",")]
    Comma,

    #[token(".")]
    Period,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    /// `?` of the ternary operator
    #[token("?")]
    Ternary,
}

/// Consumes the body of a string literal after its opening quote.
fn lex_string(lex: &mut logos::Lexer<'_, TokenKind>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'"' => {
                lex.bump(i + 1);
                return Ok(());
            }
            _ => i += 1,
        }
    }
    lex.bump(rest.len());
    Err(LexErrorKind::UnterminatedString)
}

/// Skips a block comment after its opening `/*`.
fn lex_block_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> FilterResult<(), LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(LexErrorKind::UnterminatedComment)
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::LineComment => "comment",
            TokenKind::BlockComment => "comment",
            TokenKind::Identifier => "Identifier",
            TokenKind::Number => "Number",
            TokenKind::String => "String",
            TokenKind::Boolean => "Boolean",
            TokenKind::Null => "Null",
            TokenKind::BooleanKeyword => "Boolean",
            TokenKind::NumberKeyword => "Number",
            TokenKind::StringKeyword => "String",
            TokenKind::Let => "let",
            TokenKind::Return => "return",
            TokenKind::Function => "function",
            TokenKind::Lambda => "lambda",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Assign => "=",
            TokenKind::AddAssign => "+=",
            TokenKind::SubAssign => "-=",
            TokenKind::MulAssign => "*=",
            TokenKind::QuoAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::AndAssign => "&=",
            TokenKind::OrAssign => "|=",
            TokenKind::XorAssign => "^=",
            TokenKind::ShlAssign => "<<=",
            TokenKind::ShrAssign => ">>=",
            TokenKind::AndNotAssign => "&^=",
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Quo => "/",
            TokenKind::Rem => "%",
            TokenKind::And => "&",
            TokenKind::Not => "!",
            TokenKind::Or => "|",
            TokenKind::Xor => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AndNot => "&^",
            TokenKind::LogicalAnd => "&&",
            TokenKind::LogicalOr => "||",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Lesser => "<",
            TokenKind::LesserEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Period => ".",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Ternary => "?",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn lex_all(source: &str) -> Vec<TokenKind> {
        TokenKind::lexer(source).filter_map(|t| t.ok()).collect()
    }

    #[test]
    fn test_keywords_are_exact() {
        let tokens = lex_all("let lets Number number");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::NumberKeyword,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        let tokens = lex_all("<<= << < &^= &^ && &");
        assert_eq!(
            tokens,
            vec![
                TokenKind::ShlAssign,
                TokenKind::Shl,
                TokenKind::Lesser,
                TokenKind::AndNotAssign,
                TokenKind::AndNot,
                TokenKind::LogicalAnd,
                TokenKind::And,
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        let tokens = lex_all("42 -1 .5 0xff 3.14");
        assert_eq!(tokens, vec![TokenKind::Number; 5]);
    }

    #[test]
    fn test_minus_before_identifier() {
        let tokens = lex_all("-x - 1");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Sub,
                TokenKind::Identifier,
                TokenKind::Sub,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = lex_all("a /* b\n c */ + // d\n e");
        assert_eq!(
            tokens,
            vec![TokenKind::Identifier, TokenKind::Add, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let mut lexer = TokenKind::lexer(r#""a\"b" c"#);
        assert_eq!(lexer.next(), Some(Ok(TokenKind::String)));
        assert_eq!(lexer.slice(), r#""a\"b""#);
        assert_eq!(lexer.next(), Some(Ok(TokenKind::Identifier)));
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = TokenKind::lexer(r#""abc"#);
        assert_eq!(lexer.next(), Some(Err(LexErrorKind::UnterminatedString)));
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = TokenKind::lexer("/* open");
        assert_eq!(lexer.next(), Some(Err(LexErrorKind::UnterminatedComment)));
    }
}
