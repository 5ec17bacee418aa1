use crate::Span;
use crate::lexer::{LexerError, Token, TokenKind};
use crate::types::{Expr, Node};
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

// Deepest allowed descent; pathological nesting becomes a structured error
// instead of exhausting the host stack.
pub const MAX_PARSE_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found '{}'", .found.kind)]
    UnexpectedToken { found: Token, expected: String },
    #[error("expected {0}, found end of input")]
    UnexpectedEof(String),
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error("expression nesting exceeds {} levels", MAX_PARSE_DEPTH)]
    NestingTooDeep(Span),
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    // We iterate over owned Tokens, consuming them.
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
        }
    }

    // Consumes the next token if available.
    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    // Peeks at the next token without consuming.
    fn peek_token(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    fn parse_expr(&mut self, depth: usize) -> ParseResult<Node> {
        let token = self.next_token();
        self.parse_expr_with_token(token, depth)
    }

    /// Parses a single expression starting from an already consumed token.
    fn parse_expr_with_token(&mut self, token: Option<Token>, depth: usize) -> ParseResult<Node> {
        if depth >= MAX_PARSE_DEPTH {
            let span = token.map(|t| t.span).unwrap_or_default();
            return Err(ParseError::NestingTooDeep(span));
        }
        match token {
            Some(Token {
                kind: TokenKind::LParen,
                span,
            }) => self.parse_list(span, depth),
            Some(Token {
                kind: TokenKind::Quote,
                span,
            }) => self.parse_quoted_expr(span, depth),
            Some(atom) => self.parse_atom(atom),
            None => Err(ParseError::UnexpectedEof("an expression".to_string())),
        }
    }

    /// Parses an atomic expression (number, string, symbol, literal keyword).
    fn parse_atom(&mut self, token: Token) -> ParseResult<Node> {
        Ok(Node::new(
            match token.kind {
                TokenKind::Number(n) => Expr::Number(n),
                TokenKind::String(s) => Expr::String(s),
                // The literal keywords are ordinary symbol tokens; the
                // parser gives them their own node kinds.
                TokenKind::Symbol(s) => match s.as_str() {
                    "true" => Expr::Boolean(true),
                    "false" => Expr::Boolean(false),
                    "nil" => Expr::Nil,
                    _ => Expr::Symbol(s),
                },
                other_token => Err(ParseError::UnexpectedToken {
                    found: Token {
                        kind: other_token,
                        span: token.span,
                    },
                    expected: "an expression".to_string(),
                })?,
            },
            token.span,
        ))
    }

    /// Parses a compound form `(...)` into a List node. Whether the first
    /// element is a special form or a callable is the evaluator's concern.
    fn parse_list(&mut self, lparen_span: Span, depth: usize) -> ParseResult<Node> {
        let mut elements = Vec::new();
        loop {
            match self.peek_token() {
                Some(Token {
                    kind: TokenKind::RParen,
                    span,
                }) => {
                    let span = lparen_span.merge(*span);
                    self.next_token();
                    return Ok(Node::new(Expr::List(elements), span));
                }
                Some(_) => elements.push(self.parse_expr(depth + 1)?),
                None => {
                    return Err(ParseError::UnexpectedEof(
                        "closing parenthesis".to_string(),
                    ));
                }
            }
        }
    }

    /// Parses a quoted expression `'expr` into a Quote node; the evaluator
    /// treats it exactly like `(quote expr)`.
    fn parse_quoted_expr(&mut self, quote_span: Span, depth: usize) -> ParseResult<Node> {
        let quoted = self.parse_expr(depth + 1)?;
        let span = quote_span.merge(quoted.span);
        Ok(Node::new(Expr::Quote(Box::new(quoted)), span))
    }

    /// Parses exactly one top-level expression, rejecting trailing tokens.
    pub fn parse(mut self) -> ParseResult<Node> {
        let expr = self.parse_expr(0)?;

        if let Some(found) = self.next_token() {
            Err(ParseError::UnexpectedToken {
                found,
                expected: "end of input".to_string(),
            })
        } else {
            Ok(expr)
        }
    }

    /// Parses the whole token stream as a sequence of top-level expressions.
    pub fn parse_program(mut self) -> ParseResult<Vec<Node>> {
        let mut expressions = Vec::new();
        while self.peek_token().is_some() {
            expressions.push(self.parse_expr(0)?);
        }
        Ok(expressions)
    }
}

// Helper function to lex and parse a string directly (useful for tests and REPL)
pub fn parse_str(input: &str) -> ParseResult<Node> {
    let tokens = crate::lexer::tokenize(input)?;
    Parser::new(tokens).parse()
}

// Same, for a whole source file.
pub fn parse_program_str(input: &str) -> ParseResult<Vec<Node>> {
    let tokens = crate::lexer::tokenize(input)?;
    Parser::new(tokens).parse_program()
}
