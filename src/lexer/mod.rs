//! Lexical analysis for hydrui scripts.
//!
//! This module converts script source into a stream of [`Token`]s.
//! It handles:
//!
//! - Identifiers and the fixed keyword set
//! - Numbers in any form JavaScript's `Number()` accepts (`42`, `.5`, `0xff`)
//! - Double-quoted strings with backslash escapes (kept verbatim)
//! - `//` line comments and `/* */` block comments
//!
//! ## Example
//!
//! ```
//! use hydrui_script::lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("file.size > 1000");
//! let token = Scanner::scan(&mut scanner).unwrap().unwrap();
//! assert_eq!(token.kind, TokenKind::Identifier);
//! assert_eq!(token.text, "file");
//! ```
//!
//! ## Design Notes
//!
//! The token rules are generated by [`logos`](https://docs.rs/logos). The
//! [`Scanner`] wrapper turns logos' output into located [`Token`]s and
//! located [`LexError`]s. A scanner is a single forward pass; it keeps no
//! state besides its cursor.

mod error;
mod token;

pub use error::{LexError, LexErrorKind};
pub use token::{Token, TokenKind};

use logos::Logos;

/// The scanner for script source code.
pub struct Scanner<'source> {
    /// The underlying logos lexer
    inner: logos::Lexer<'source, TokenKind>,
    /// The original source (for error reporting)
    source: &'source str,
}

impl<'source> Scanner<'source> {
    /// Create a new scanner for the given source code.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
        }
    }

    /// Get the original source code.
    pub fn source(&self) -> &'source str {
        self.source
    }

    /// Get the next token.
    ///
    /// Returns `Ok(None)` at the end of input. Whitespace and comments before
    /// the token are skipped.
    ///
    /// ```
    /// use hydrui_script::lexer::{Scanner, TokenKind};
    ///
    /// let mut scanner = Scanner::new("/* note */ 1");
    /// let token = Scanner::scan(&mut scanner).unwrap().unwrap();
    /// assert_eq!(token.kind, TokenKind::Number);
    /// assert_eq!(token.span, 11..12);
    /// assert!(Scanner::scan(&mut scanner).unwrap().is_none());
    /// ```
    pub fn scan(&mut self) -> Result<Option<Token>, LexError> {
        let Some(result) = self.inner.next() else {
            return Ok(None);
        };
        let span = self.inner.span();
        match result {
            Ok(kind) => Ok(Some(Token::new(kind, span, self.inner.slice()))),
            Err(LexErrorKind::InvalidCharacter(_)) => {
                let c = self.source[span.start..].chars().next().unwrap_or('\0');
                Err(LexError::new(span.start, LexErrorKind::InvalidCharacter(c)))
            }
            Err(kind) => Err(LexError::new(span.start, kind)),
        }
    }

    /// Get the next token, failing if the input has ended.
    pub fn must_scan(&mut self) -> Result<Token, LexError> {
        match self.scan()? {
            Some(token) => Ok(token),
            None => Err(LexError::new(
                self.source.len(),
                LexErrorKind::UnexpectedEnd,
            )),
        }
    }
}

impl<'source> Iterator for Scanner<'source> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan().transpose()
    }
}

/// Scans the whole source, stopping at the first error.
///
/// ```
/// use hydrui_script::lexer::{scan_all, TokenKind};
///
/// let tokens = scan_all("a += 1;").unwrap();
/// assert_eq!(tokens[1].kind, TokenKind::AddAssign);
/// ```
pub fn scan_all(source: &str) -> Result<Vec<Token>, LexError> {
    Scanner::new(source).collect()
}
