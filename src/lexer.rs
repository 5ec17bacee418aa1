use logos::Logos;
use std::fmt;
use thiserror::Error;

use crate::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")] // Skip whitespace
#[logos(skip r"\[[^\]]*\]")] // Skip comments, non-nesting
#[logos(error = LexerErrorKind)]
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("'")]
    Quote,
    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
    // Alphabetic runs joined by internal hyphens, a standalone underscore,
    // or a run of operator characters. Longest match keeps `-5` a number.
    #[regex(r"[a-zA-Z]+(-[a-zA-Z]+)*|_", |lex| lex.slice().to_string())]
    #[regex(r"[+\-*/<>=]+", |lex| lex.slice().to_string())]
    Symbol(String),
    #[regex(r#""([^"\\]|\\(.|\n))*.?"#, |lex| {
        let slice = lex.slice();
        // make sure string was terminated
        if slice.len() == 1 || !slice.ends_with('"') {
            return Err(LexerErrorKind::UnterminatedString);
        }
        unescape::unescape(&slice[1..slice.len()-1])
    })]
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

mod unescape {
    use super::{LexerErrorKind, LexerResult};
    // `\n`, `\\` and `\"` decode; a backslash before any other character is
    // kept verbatim together with that character. A trailing backslash means
    // the escape consumed the closing quote, so the string never terminated.
    pub fn unescape(s: &str) -> LexerResult<String> {
        let mut result = String::with_capacity(s.len());
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => result.push('\n'),
                    Some('\\') => result.push('\\'),
                    Some('"') => result.push('"'),
                    Some(other) => {
                        result.push('\\');
                        result.push(other);
                    }
                    None => return Err(LexerErrorKind::UnterminatedString),
                }
            } else {
                result.push(c);
            }
        }
        Ok(result)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Quote => write!(f, "'"),
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Symbol(s) => write!(f, "{}", s),
            TokenKind::String(s) => write!(f, "\"{}\"", s), // Display with quotes for clarity
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexerErrorKind {
    #[error("Unknown character: '{0}'")]
    UnknownCharacter(char),
    #[error("Unterminated comment")]
    UnterminatedComment,
    #[error("Unterminated string literal")]
    UnterminatedString,
}

// The derive's default error carries a placeholder character; `tokenize`
// patches in the real one from the offending slice.
impl Default for LexerErrorKind {
    fn default() -> Self {
        LexerErrorKind::UnknownCharacter('\0')
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct LexerError {
    pub error: LexerErrorKind,
    pub span: Span,
}

// Result type alias for convenience
type LexerResult<T> = Result<T, LexerErrorKind>;

// Result type alias for convenience
type LexerRangedResult<T> = Result<T, LexerError>;

// Helper function to tokenize a string directly (useful for tests and parser)
pub fn tokenize(input: &str) -> LexerRangedResult<Vec<Token>> {
    TokenKind::lexer(input)
        .spanned()
        .map(|(result, range)| match result {
            Ok(kind) => Ok(Token {
                kind,
                span: Span::new(range.start, range.end),
            }),
            Err(error) => {
                let slice = &input[range.start..range.end];
                // Classify the default error by what the failing slice looks
                // like: an unmatched `[` is a comment that ran to end of
                // input, anything else is an unrecognized character.
                let error = match error {
                    LexerErrorKind::UnknownCharacter('\0') => {
                        if slice.starts_with('[') {
                            LexerErrorKind::UnterminatedComment
                        } else {
                            LexerErrorKind::UnknownCharacter(
                                slice.chars().next().unwrap_or('\0'),
                            )
                        }
                    }
                    other => other,
                };
                Err(LexerError {
                    error,
                    span: Span::new(range.start, range.end),
                })
            }
        })
        .collect()
}
