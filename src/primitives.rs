use crate::evaluator::{EvalError, EvalResult};
use crate::io::IoHandler;
use crate::printer::print_value;
use crate::source::Span;
use crate::types::{Arity, Value};

// The evaluator enforces each native's arity policy before calling it, so
// the bodies here only validate argument *types*.

fn expect_number(value: &Value, operator: &str, position: usize, span: Span) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::TypeMismatch {
            operator: operator.to_string(),
            expected: format!("a number for argument {}", position),
            found: other.type_name().to_string(),
            span,
        }),
    }
}

fn expect_list<'a>(value: &'a Value, operator: &str, span: Span) -> EvalResult<&'a [Value]> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(EvalError::TypeMismatch {
            operator: operator.to_string(),
            expected: "a list".to_string(),
            found: other.type_name().to_string(),
            span,
        }),
    }
}

fn empty_list_error(operator: &str, span: Span) -> EvalError {
    EvalError::TypeMismatch {
        operator: operator.to_string(),
        expected: "a non-empty list".to_string(),
        found: "()".to_string(),
        span,
    }
}

fn missing_args_error(operator: &str, expected: Arity, span: Span) -> EvalError {
    EvalError::WrongArity {
        operator: operator.to_string(),
        expected,
        actual: 0,
        span,
    }
}

fn fold_numbers<F: Fn(f64, f64) -> f64>(
    args: &[Value],
    start: f64,
    func: F,
    operator: &str,
    span: Span,
) -> EvalResult {
    let mut acc = start;
    for (index, arg) in args.iter().enumerate() {
        acc = func(acc, expect_number(arg, operator, index + 1, span)?);
    }
    Ok(Value::Number(acc))
}

fn compare_numbers<F: Fn(f64, f64) -> bool>(
    args: &[Value],
    compare: F,
    operator: &str,
    span: Span,
) -> EvalResult {
    // Chained comparison: every adjacent pair must satisfy the predicate.
    let Some((first, rest)) = args.split_first() else {
        return Err(missing_args_error(operator, Arity::AtLeast(2), span));
    };
    let mut current = expect_number(first, operator, 1, span)?;
    for (index, arg) in rest.iter().enumerate() {
        let next = expect_number(arg, operator, index + 2, span)?;
        if !compare(current, next) {
            return Ok(Value::Boolean(false));
        }
        current = next;
    }
    Ok(Value::Boolean(true))
}

// --- Arithmetic ---

pub fn prim_add(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    // (+) -> 0
    // (+ 1 2 3) -> 6
    fold_numbers(&args, 0.0, |acc, val| acc + val, "+", span)
}

pub fn prim_sub(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    // (- x) -> -x
    // (- x y z) -> x - y - z
    let Some((first, rest)) = args.split_first() else {
        return Err(missing_args_error("-", Arity::AtLeast(1), span));
    };
    let first = expect_number(first, "-", 1, span)?;
    if rest.is_empty() {
        return Ok(Value::Number(-first));
    }
    let mut acc = first;
    for (index, arg) in rest.iter().enumerate() {
        acc -= expect_number(arg, "-", index + 2, span)?;
    }
    Ok(Value::Number(acc))
}

pub fn prim_mul(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    // (*) -> 1
    // (* 2 3 4) -> 24
    fold_numbers(&args, 1.0, |acc, val| acc * val, "*", span)
}

pub fn prim_div(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    // (/ x) -> 1/x
    // (/ x y z) -> x / y / z
    let div_by_zero_error = || EvalError::TypeMismatch {
        operator: "/".to_string(),
        expected: "a non-zero divisor".to_string(),
        found: "0".to_string(),
        span,
    };

    let Some((first, rest)) = args.split_first() else {
        return Err(missing_args_error("/", Arity::AtLeast(1), span));
    };
    let first = expect_number(first, "/", 1, span)?;
    if rest.is_empty() {
        if first == 0.0 {
            return Err(div_by_zero_error());
        }
        return Ok(Value::Number(1.0 / first));
    }
    let mut acc = first;
    for (index, arg) in rest.iter().enumerate() {
        let divisor = expect_number(arg, "/", index + 2, span)?;
        if divisor == 0.0 {
            return Err(div_by_zero_error());
        }
        acc /= divisor;
    }
    Ok(Value::Number(acc))
}

// --- Comparison ---

pub fn prim_equals(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    compare_numbers(&args, |left, right| left == right, "=", span)
}

pub fn prim_less_than(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    compare_numbers(&args, |left, right| left < right, "<", span)
}

pub fn prim_less_than_or_equals(
    args: Vec<Value>,
    _io: &mut dyn IoHandler,
    span: Span,
) -> EvalResult {
    compare_numbers(&args, |left, right| left <= right, "<=", span)
}

pub fn prim_greater_than(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    compare_numbers(&args, |left, right| left > right, ">", span)
}

pub fn prim_greater_than_or_equals(
    args: Vec<Value>,
    _io: &mut dyn IoHandler,
    span: Span,
) -> EvalResult {
    compare_numbers(&args, |left, right| left >= right, ">=", span)
}

// --- Lists ---

pub fn prim_head(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    // (head '(1 2 3)) -> 1
    let [list] = &args[..] else {
        return Err(missing_args_error("head", Arity::Exactly(1), span));
    };
    let items = expect_list(list, "head", span)?;
    match items.first() {
        Some(first) => Ok(first.clone()),
        None => Err(empty_list_error("head", span)),
    }
}

pub fn prim_tail(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    // (tail '(1 2 3)) -> (2 3)
    let [list] = &args[..] else {
        return Err(missing_args_error("tail", Arity::Exactly(1), span));
    };
    let items = expect_list(list, "tail", span)?;
    if items.is_empty() {
        return Err(empty_list_error("tail", span));
    }
    Ok(Value::List(items[1..].to_vec()))
}

pub fn prim_length(args: Vec<Value>, _io: &mut dyn IoHandler, span: Span) -> EvalResult {
    // (length '(1 2 3)) -> 3
    let [list] = &args[..] else {
        return Err(missing_args_error("length", Arity::Exactly(1), span));
    };
    let items = expect_list(list, "length", span)?;
    Ok(Value::Number(items.len() as f64))
}

// --- Output ---

pub fn prim_print(args: Vec<Value>, io: &mut dyn IoHandler, span: Span) -> EvalResult {
    // (print x) -> nil, writing x in printable form
    let [value] = &args[..] else {
        return Err(missing_args_error("print", Arity::Exactly(1), span));
    };
    io.write_line(&print_value(value, true));
    Ok(Value::Nil)
}
