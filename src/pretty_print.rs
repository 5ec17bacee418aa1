use crate::environment::EnvError;
use crate::evaluator::{EvalError, MAX_RECURSION_DEPTH};
use crate::interpreter::InterpretError;
use crate::parser::{MAX_PARSE_DEPTH, ParseError};
use ariadne::{Label, Report, ReportKind, Source};

// Reports carry the caller's source id ("REPL", a file path) so the same
// rendering serves both front ends.

impl ParseError {
    pub fn pretty_print(&self, source_id: &str, input: &str) {
        let report = match self {
            ParseError::UnexpectedToken { found, expected } => {
                Report::build(ReportKind::Error, (source_id, found.span.to_range()))
                    .with_message(format!("Unexpected token: {}", found.kind))
                    .with_label(
                        Label::new((source_id, found.span.to_range()))
                            .with_message(format!("Expected {expected}")),
                    )
            }
            ParseError::UnexpectedEof(expected) => {
                // EOF has no token span; point at the last character.
                let end = input.chars().count();
                let span = if end == 0 { 0..0 } else { end - 1..end };
                Report::build(ReportKind::Error, (source_id, span.clone()))
                    .with_message("Unexpected end of input")
                    .with_label(
                        Label::new((source_id, span))
                            .with_message(format!("Expected {expected}")),
                    )
            }
            ParseError::Lexer(lex_err) => {
                Report::build(ReportKind::Error, (source_id, lex_err.span.to_range()))
                    .with_message("Lexer Error")
                    .with_label(
                        Label::new((source_id, lex_err.span.to_range()))
                            .with_message(lex_err.error.to_string()),
                    )
            }
            ParseError::NestingTooDeep(span) => {
                Report::build(ReportKind::Error, (source_id, span.to_range()))
                    .with_message("Nesting too deep")
                    .with_label(Label::new((source_id, span.to_range())).with_message(format!(
                        "Expression nesting exceeds {} levels",
                        MAX_PARSE_DEPTH
                    )))
            }
        };
        report
            .finish()
            .print((source_id, Source::from(input)))
            .unwrap();
    }
}

impl EvalError {
    pub fn pretty_print(&self, source_id: &str, input: &str) {
        let report = match self {
            EvalError::Env(env_error) => match env_error {
                EnvError::UnboundSymbol(symbol, span) => {
                    Report::build(ReportKind::Error, (source_id, span.to_range()))
                        .with_message(format!("Unbound symbol `{}`", symbol))
                        .with_label(
                            Label::new((source_id, span.to_range()))
                                .with_message("This symbol is not defined in the current scope"),
                        )
                }
            },
            EvalError::WrongArity {
                operator,
                expected,
                actual,
                span,
            } => Report::build(ReportKind::Error, (source_id, span.to_range()))
                .with_message(format!("Wrong number of arguments for `{}`", operator))
                .with_label(
                    Label::new((source_id, span.to_range()))
                        .with_message(format!("Expects {}, got {}", expected, actual)),
                ),
            EvalError::TypeMismatch {
                operator,
                expected,
                found,
                span,
            } => Report::build(ReportKind::Error, (source_id, span.to_range()))
                .with_message(format!("Type mismatch in `{}`", operator))
                .with_label(
                    Label::new((source_id, span.to_range()))
                        .with_message(format!("Expected {}, found {}", expected, found)),
                ),
            EvalError::NotCallable(value, span) => {
                Report::build(ReportKind::Error, (source_id, span.to_range()))
                    .with_message(format!("Not callable: {}", value))
                    .with_label(
                        Label::new((source_id, span.to_range()))
                            .with_message("This expression cannot be called"),
                    )
            }
            EvalError::StackExhausted(span) => {
                Report::build(ReportKind::Error, (source_id, span.to_range()))
                    .with_message("Stack exhausted")
                    .with_label(Label::new((source_id, span.to_range())).with_message(format!(
                        "Recursion deeper than {} levels",
                        MAX_RECURSION_DEPTH
                    )))
            }
        };
        report
            .finish()
            .print((source_id, Source::from(input)))
            .unwrap();
    }
}

impl InterpretError {
    pub fn pretty_print(&self, source_id: &str, input: &str) {
        match self {
            InterpretError::Parse(e) => e.pretty_print(source_id, input),
            InterpretError::Eval(e) => e.pretty_print(source_id, input),
        }
    }
}
