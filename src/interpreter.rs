use crate::environment::Environment;
use crate::evaluator::{self, EvalError};
use crate::io::IoHandler;
use crate::parser::{ParseError, parse_str};
use crate::types::Value;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Everything the pipeline can fail with, so callers match on one type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Runs the full pipeline on a single expression: lex, parse, evaluate.
///
/// The environment is an explicit argument so callers control binding
/// lifetime; nothing here is process-global.
pub fn interpret(
    source: &str,
    env: Rc<RefCell<Environment>>,
    io: &mut dyn IoHandler,
) -> Result<Value, InterpretError> {
    let node = parse_str(source)?;
    Ok(evaluator::evaluate(node, env, io)?)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CaptureIoHandler;
    use crate::printer::print_value;

    fn run(source: &str) -> Result<Value, InterpretError> {
        let env = Environment::new_global_populated();
        let mut io = CaptureIoHandler::default();
        interpret(source, env, &mut io)
    }

    fn run_ok(source: &str) -> Value {
        match run(source) {
            Ok(value) => value,
            Err(e) => panic!("Interpreting '{}' failed: {}", source, e),
        }
    }

    // Renders the result of `source` in both modes and checks each.
    fn assert_renders(source: &str, machine: &str, printable: &str) {
        let value = run_ok(source);
        assert_eq!(print_value(&value, false), machine, "machine form of '{}'", source);
        assert_eq!(print_value(&value, true), printable, "printable form of '{}'", source);
    }

    // Evaluating a machine rendering must reproduce the same rendering.
    fn assert_machine_fixpoint(source: &str) {
        let value = run_ok(source);
        let rendered = print_value(&value, false);
        let again = run_ok(&rendered);
        assert_eq!(print_value(&again, false), rendered, "source '{}'", source);
    }

    #[test]
    fn test_literal_identities() {
        assert_renders("true", "true", "true");
        assert_renders("false", "false", "false");
        assert_renders("nil", "nil", "nil");
        assert_renders("3.14", "3.14", "3.14");
        assert_renders("-10", "-10", "-10");
    }

    #[test]
    fn test_quoted_symbol_renders_bare() {
        assert_renders("'pi", "pi", "pi");
    }

    #[test]
    fn test_composite_list_rendering() {
        // The quoted symbol resolves to a bare symbol element; the inner
        // lambda's body stays written out as syntax.
        let source = r#"(list true (lambda (x) (* x x)) + 3.14 'pi "pi")"#;
        let value = run_ok(source);
        assert_eq!(
            print_value(&value, false),
            r#"(true (lambda (x) (* x x)) + 3.14 pi "pi")"#
        );
    }

    #[test]
    fn test_quote_inside_lambda_body_stays_syntax() {
        let source = r#"(lambda () (list true (lambda (x) (* x x)) + 3.14 'pi "pi"))"#;
        let value = run_ok(source);
        assert_eq!(
            print_value(&value, false),
            r#"(lambda () (list true (lambda (x) (* x x)) + 3.14 (quote pi) "pi"))"#
        );
    }

    #[test]
    fn test_string_round_trip_machine() {
        // Machine form re-lexes to an equal string, so rendering the
        // evaluated literal reproduces the source text exactly.
        let sources = [
            r#""test""#,
            r#""test\ntest""#,
            r#""\"test\"""#,
            r#""\\test\\""#,
        ];
        for source in sources {
            let value = run_ok(source);
            assert_eq!(print_value(&value, false), source, "source {:?}", source);
        }
    }

    #[test]
    fn test_string_round_trip_printable() {
        let cases = [
            (r#""test""#, "test"),
            (r#""test\ntest""#, "test\ntest"),
            (r#""\"test\"""#, "\"test\""),
            (r#""\\test\\""#, "\\test\\"),
        ];
        for (source, expected) in cases {
            let value = run_ok(source);
            assert_eq!(print_value(&value, true), expected, "source {:?}", source);
        }
    }

    #[test]
    fn test_machine_rendering_is_a_fixpoint() {
        assert_machine_fixpoint("(+ 1 2)");
        assert_machine_fixpoint(r#""a\nb""#);
        assert_machine_fixpoint("true");
        assert_machine_fixpoint("nil");
        assert_machine_fixpoint("()");
        assert_machine_fixpoint("(lambda (x) (* x x))");
        // A native renders as its bound name, which resolves right back.
        assert_machine_fixpoint("+");
    }

    #[test]
    fn test_idempotence_for_atoms() {
        // Rendering and re-interpreting reproduces an equal value.
        for source in ["42", r#""hi""#, "true", "nil", "()"] {
            let value = run_ok(source);
            let again = run_ok(&print_value(&value, false));
            assert_eq!(again, value, "source '{}'", source);
        }
    }

    #[test]
    fn test_print_output_is_captured() {
        let env = Environment::new_global_populated();
        let mut io = CaptureIoHandler::default();
        let result = interpret(r#"(print "hi")"#, env, &mut io);
        assert_eq!(result, Ok(Value::Nil));
        assert_eq!(io.lines, vec!["hi".to_string()]);
    }

    #[test]
    fn test_parse_errors_surface_with_their_message() {
        let result = run("(+ 1");
        match result {
            Err(InterpretError::Parse(e)) => {
                assert_eq!(e.to_string(), "expected closing parenthesis, found end of input");
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_eval_errors_surface() {
        assert!(matches!(
            run("(no-such-symbol)"),
            Err(InterpretError::Eval(_))
        ));
        assert!(matches!(run("(1 2)"), Err(InterpretError::Eval(_))));
    }

    #[test]
    fn test_trailing_input_is_rejected() {
        assert!(matches!(run("1 2"), Err(InterpretError::Parse(_))));
    }

    #[test]
    fn test_environment_survives_failed_interpret() {
        let env = Environment::new_global_populated();
        let mut io = CaptureIoHandler::default();
        env.borrow_mut()
            .define("x".to_string(), Value::Number(9.0));

        assert!(interpret("(missing x)", env.clone(), &mut io).is_err());
        assert_eq!(
            interpret("x", env, &mut io),
            Ok(Value::Number(9.0))
        );
    }
}
