use crate::environment::{EnvError, Environment};
use crate::io::IoHandler;
use crate::source::Span;
use crate::types::{Arity, Expr, Lambda, Node, Value};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

// Deepest allowed evaluation recursion (AST descent plus lambda application
// frames). Larger than MAX_PARSE_DEPTH so any parseable tree can evaluate
// with headroom for applications.
pub const MAX_RECURSION_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Env(#[from] EnvError), // Errors from environment lookup
    #[error("'{operator}' expects {expected}, got {actual}")]
    WrongArity {
        operator: String,
        expected: Arity,
        actual: usize,
        span: Span,
    },
    #[error("'{operator}' expects {expected}, got {found}")]
    TypeMismatch {
        operator: String,
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Not callable: {0}")]
    NotCallable(Value, Span),
    #[error("Stack exhausted: recursion deeper than {} levels", MAX_RECURSION_DEPTH)]
    StackExhausted(Span),
}

// Result type alias for convenience
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Evaluates a given AST node within the specified environment. The IO
/// handler is threaded through so output natives stay testable.
pub fn evaluate(node: Node, env: Rc<RefCell<Environment>>, io: &mut dyn IoHandler) -> EvalResult {
    evaluate_with_depth(node, env, io, 0)
}

fn evaluate_with_depth(
    node: Node,
    env: Rc<RefCell<Environment>>,
    io: &mut dyn IoHandler,
    depth: usize,
) -> EvalResult {
    if depth >= MAX_RECURSION_DEPTH {
        return Err(EvalError::StackExhausted(node.span));
    }

    match &node.kind {
        // 1. Self-evaluating atoms
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Nil => Ok(Value::Nil),

        // 2. Symbols: look up in the environment
        Expr::Symbol(name) => {
            // Use the symbol's span for error reporting if lookup fails
            Ok(env.borrow().get(name, node.span)?)
        }

        // 3. 'expr is (quote expr)
        Expr::Quote(inner) => Ok(quote_node(inner)),

        // 4. Lists: special forms or applications, decided by the head
        Expr::List(elements) => {
            if let [first, rest @ ..] = &elements[..] {
                match &first.kind {
                    Expr::Symbol(sym_name) if sym_name == "quote" => {
                        evaluate_quote(rest, node.span)
                    }
                    Expr::Symbol(sym_name) if sym_name == "lambda" => {
                        evaluate_lambda(rest, env, node.span)
                    }
                    Expr::Symbol(sym_name) if sym_name == "list" => {
                        evaluate_list_form(rest, env, io, depth)
                    }
                    _ => evaluate_application(first, rest, env, io, depth, node.span),
                }
            } else {
                // The empty form evaluates to the empty list value.
                Ok(Value::List(Vec::new()))
            }
        }
    }
}

/// Converts an unevaluated node to its data representation. A nested quote
/// form becomes the two-element list (quote inner), since that is what the
/// shorthand stands for.
pub fn quote_node(node: &Node) -> Value {
    match &node.kind {
        Expr::Number(n) => Value::Number(*n),
        Expr::String(s) => Value::String(s.clone()),
        Expr::Symbol(s) => Value::Symbol(s.clone()),
        Expr::Boolean(b) => Value::Boolean(*b),
        Expr::Nil => Value::Nil,
        Expr::Quote(inner) => Value::List(vec![
            Value::Symbol("quote".to_string()),
            quote_node(inner),
        ]),
        Expr::List(items) => Value::List(items.iter().map(quote_node).collect()),
    }
}

fn evaluate_quote(operands: &[Node], span: Span) -> EvalResult {
    if let [node] = operands {
        Ok(quote_node(node))
    } else {
        Err(EvalError::WrongArity {
            operator: "quote".to_string(),
            expected: Arity::Exactly(1),
            actual: operands.len(),
            span,
        })
    }
}

fn evaluate_lambda(operands: &[Node], env: Rc<RefCell<Environment>>, span: Span) -> EvalResult {
    // (lambda (param...) body)
    let [params_node, body] = operands else {
        return Err(EvalError::WrongArity {
            operator: "lambda".to_string(),
            expected: Arity::Exactly(2),
            actual: operands.len(),
            span,
        });
    };

    let Expr::List(param_nodes) = &params_node.kind else {
        return Err(EvalError::TypeMismatch {
            operator: "lambda".to_string(),
            expected: "a parameter list".to_string(),
            found: params_node.kind.type_name().to_string(),
            span: params_node.span,
        });
    };

    let params = param_nodes
        .iter()
        .map(|param| match &param.kind {
            Expr::Symbol(name) => Ok(name.clone()),
            other => Err(EvalError::TypeMismatch {
                operator: "lambda".to_string(),
                expected: "a parameter symbol".to_string(),
                found: other.type_name().to_string(),
                span: param.span,
            }),
        })
        .collect::<EvalResult<Vec<String>>>()?;

    Ok(Value::Lambda(Lambda {
        params,
        body: Rc::new(body.clone()),
        env, // Captured by reference; closures keep it alive
    }))
}

fn evaluate_list_form(
    operands: &[Node],
    env: Rc<RefCell<Environment>>,
    io: &mut dyn IoHandler,
    depth: usize,
) -> EvalResult {
    let mut items = Vec::with_capacity(operands.len());
    for operand in operands {
        items.push(evaluate_with_depth(operand.clone(), env.clone(), io, depth + 1)?);
    }
    Ok(Value::List(items))
}

fn evaluate_application(
    operator: &Node,
    operands: &[Node],
    env: Rc<RefCell<Environment>>,
    io: &mut dyn IoHandler,
    depth: usize,
    span: Span,
) -> EvalResult {
    let operator_value = evaluate_with_depth(operator.clone(), env.clone(), io, depth + 1)?;

    // Evaluate the operands left to right
    let mut args: Vec<Value> = Vec::with_capacity(operands.len());
    for operand in operands {
        args.push(evaluate_with_depth(operand.clone(), env.clone(), io, depth + 1)?);
    }

    match operator_value {
        Value::NativeFunction(native) => {
            check_arity(&native.name, native.arity, args.len(), span)?;
            (native.func)(args, io, span)
        }
        Value::Lambda(lambda) => apply_lambda(lambda, args, io, depth, span),
        other => Err(EvalError::NotCallable(other, operator.span)),
    }
}

fn apply_lambda(
    lambda: Lambda,
    args: Vec<Value>,
    io: &mut dyn IoHandler,
    depth: usize,
    span: Span,
) -> EvalResult {
    check_arity("lambda", Arity::Exactly(lambda.params.len()), args.len(), span)?;

    // A fresh frame of the *captured* environment, not the caller's
    let call_env = Environment::new_enclosed(lambda.env.clone());
    {
        let mut frame = call_env.borrow_mut();
        for (param, arg) in lambda.params.iter().zip(args) {
            frame.define(param.clone(), arg);
        }
    }
    evaluate_with_depth((*lambda.body).clone(), call_env, io, depth + 1)
}

fn check_arity(operator: &str, expected: Arity, actual: usize, span: Span) -> EvalResult<()> {
    if expected.accepts(actual) {
        Ok(())
    } else {
        Err(EvalError::WrongArity {
            operator: operator.to_string(),
            expected,
            actual,
            span,
        })
    }
}

/// The form names the evaluator handles itself, for REPL completion.
pub fn special_form_identifiers() -> HashSet<String> {
    ["quote", "lambda", "list"]
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}
