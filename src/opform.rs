//! A reduced reader for operator-call syntax only.
//!
//! The grammar covers numbers, symbols and `(operator operand...)` forms
//! where the operator position must hold a symbol. String and quote tokens
//! are rejected outright, and the literal keywords stay ordinary symbols.
//! It shares the main lexer, error type and nesting bound, but builds its
//! own smaller tree.

use crate::lexer::{self, Token, TokenKind};
use crate::parser::{MAX_PARSE_DEPTH, ParseError, ParseResult};
use std::iter::Peekable;
use std::vec::IntoIter;

#[derive(Debug, Clone, PartialEq)]
pub enum OpForm {
    Number(f64),
    Symbol(String),
    Operation {
        operator: String,
        operands: Vec<OpForm>,
    },
}

/// Lexes and parses one operator-call expression, rejecting trailing tokens.
pub fn parse_op_str(input: &str) -> ParseResult<OpForm> {
    let tokens = lexer::tokenize(input)?;
    OpFormParser::new(tokens).parse()
}

struct OpFormParser {
    tokens: Peekable<IntoIter<Token>>,
}

impl OpFormParser {
    fn new(tokens: Vec<Token>) -> Self {
        OpFormParser {
            tokens: tokens.into_iter().peekable(),
        }
    }

    fn parse(mut self) -> ParseResult<OpForm> {
        let form = self.parse_form(0)?;

        if let Some(found) = self.tokens.next() {
            Err(ParseError::UnexpectedToken {
                found,
                expected: "end of input".to_string(),
            })
        } else {
            Ok(form)
        }
    }

    fn parse_form(&mut self, depth: usize) -> ParseResult<OpForm> {
        let Some(token) = self.tokens.next() else {
            return Err(ParseError::UnexpectedEof("an operation".to_string()));
        };
        if depth >= MAX_PARSE_DEPTH {
            return Err(ParseError::NestingTooDeep(token.span));
        }
        match token.kind {
            TokenKind::Number(n) => Ok(OpForm::Number(n)),
            TokenKind::Symbol(s) => Ok(OpForm::Symbol(s)),
            TokenKind::LParen => self.parse_operation(depth),
            _ => Err(ParseError::UnexpectedToken {
                found: token,
                expected: "a number, symbol or operation".to_string(),
            }),
        }
    }

    fn parse_operation(&mut self, depth: usize) -> ParseResult<OpForm> {
        let operator = match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Symbol(name),
                ..
            }) => name,
            Some(found) => {
                return Err(ParseError::UnexpectedToken {
                    found,
                    expected: "an operator symbol".to_string(),
                });
            }
            None => return Err(ParseError::UnexpectedEof("an operator symbol".to_string())),
        };

        let mut operands = Vec::new();
        loop {
            match self.tokens.peek() {
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => {
                    self.tokens.next();
                    return Ok(OpForm::Operation { operator, operands });
                }
                Some(_) => operands.push(self.parse_form(depth + 1)?),
                None => {
                    return Err(ParseError::UnexpectedEof(
                        "closing parenthesis".to_string(),
                    ));
                }
            }
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn assert_op_parse(input: &str, expected: OpForm) {
        match parse_op_str(input) {
            Ok(result) => assert_eq!(result, expected, "Input: '{}'", input),
            Err(e) => panic!("Parsing failed for input '{}': {}", input, e),
        }
    }

    fn assert_op_error(input: &str, expected_error_variant: ParseError) {
        match parse_op_str(input) {
            Ok(result) => panic!(
                "Expected parsing to fail for input '{}', but got: {:?}",
                input, result
            ),
            Err(e) => {
                assert_eq!(
                    std::mem::discriminant(&e),
                    std::mem::discriminant(&expected_error_variant),
                    "Input: '{}', Expected error variant like {:?}, got: {:?}",
                    input,
                    expected_error_variant,
                    e
                );
            }
        }
    }

    fn operation(operator: &str, operands: Vec<OpForm>) -> OpForm {
        OpForm::Operation {
            operator: operator.to_string(),
            operands,
        }
    }

    #[test]
    fn test_op_parse_atoms() {
        assert_op_parse("42", OpForm::Number(42.0));
        assert_op_parse("-3.5", OpForm::Number(-3.5));
        assert_op_parse("add", OpForm::Symbol("add".to_string()));
        assert_op_parse("+", OpForm::Symbol("+".to_string()));
        // No literal keywords in this grammar
        assert_op_parse("true", OpForm::Symbol("true".to_string()));
        assert_op_parse("nil", OpForm::Symbol("nil".to_string()));
    }

    #[test]
    fn test_op_parse_operations() {
        assert_op_parse(
            "(+ 1 2)",
            operation("+", vec![OpForm::Number(1.0), OpForm::Number(2.0)]),
        );
        assert_op_parse("(f)", operation("f", vec![]));
        assert_op_parse(
            "(+ 1 (* 2 3))",
            operation(
                "+",
                vec![
                    OpForm::Number(1.0),
                    operation("*", vec![OpForm::Number(2.0), OpForm::Number(3.0)]),
                ],
            ),
        );
        assert_op_parse(
            "(max x y)",
            operation(
                "max",
                vec![
                    OpForm::Symbol("x".to_string()),
                    OpForm::Symbol("y".to_string()),
                ],
            ),
        );
    }

    #[test]
    fn test_op_parse_skips_whitespace_and_comments() {
        assert_op_parse(
            "(add [the first] 1 [the second] 2)",
            operation("add", vec![OpForm::Number(1.0), OpForm::Number(2.0)]),
        );
    }

    #[test]
    fn test_op_parse_rejects_strings_and_quotes() {
        let unexpected = ParseError::UnexpectedToken {
            found: Token {
                kind: TokenKind::RParen,
                span: crate::Span::default(),
            },
            expected: String::new(),
        };
        assert_op_error(r#""s""#, unexpected.clone());
        assert_op_error(r#"(f "s")"#, unexpected.clone());
        assert_op_error("'x", unexpected.clone());
        assert_op_error("(f 'x)", unexpected);
    }

    #[test]
    fn test_op_parse_operator_must_be_symbol() {
        let unexpected = ParseError::UnexpectedToken {
            found: Token {
                kind: TokenKind::RParen,
                span: crate::Span::default(),
            },
            expected: String::new(),
        };
        assert_op_error("(1 2)", unexpected.clone());
        assert_op_error("((f) 2)", unexpected.clone());
        assert_op_error("()", unexpected);

        match parse_op_str("(1 2)") {
            Err(e) => assert_eq!(e.to_string(), "expected an operator symbol, found '1'"),
            Ok(result) => panic!("Expected error, got {:?}", result),
        }
    }

    #[test]
    fn test_op_parse_eof_errors() {
        assert_op_error("", ParseError::UnexpectedEof(String::new()));
        assert_op_error("(+ 1", ParseError::UnexpectedEof(String::new()));
        assert_op_error("(", ParseError::UnexpectedEof(String::new()));
    }

    #[test]
    fn test_op_parse_rejects_trailing_tokens() {
        let unexpected = ParseError::UnexpectedToken {
            found: Token {
                kind: TokenKind::RParen,
                span: crate::Span::default(),
            },
            expected: String::new(),
        };
        assert_op_error("1 2", unexpected);
    }

    #[test]
    fn test_op_parse_depth_guard() {
        let mut deep = "(f ".repeat(MAX_PARSE_DEPTH + 10);
        deep.push('1');
        deep.push_str(&")".repeat(MAX_PARSE_DEPTH + 10));
        assert_op_error(&deep, ParseError::NestingTooDeep(crate::Span::default()));

        let mut ok = "(f ".repeat(50);
        ok.push('1');
        ok.push_str(&")".repeat(50));
        assert!(parse_op_str(&ok).is_ok());
    }
}
