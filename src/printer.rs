use crate::types::{Expr, Node, Value};
use std::fmt;

/// Renders a runtime value as text.
///
/// `printable` selects the human mode, where strings render as their raw
/// decoded text. Machine mode (`false`) re-escapes strings so the output
/// re-lexes to an equal value.
pub fn print_value(value: &Value, printable: bool) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if printable {
                s.clone()
            } else {
                format!("\"{}\"", escape_string(s))
            }
        }
        Value::Symbol(s) => s.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Nil => "nil".to_string(),
        Value::List(items) => {
            let rendered: Vec<String> =
                items.iter().map(|v| print_value(v, printable)).collect();
            format!("({})", rendered.join(" "))
        }
        Value::Lambda(lambda) => format!(
            "(lambda ({}) {})",
            lambda.params.join(" "),
            print_node(&lambda.body)
        ),
        Value::NativeFunction(native) => native.name.clone(),
    }
}

/// Renders an unevaluated node as source text. Lambda bodies go through
/// here: strings stay in machine form and quote forms stay written out,
/// because the body is syntax rather than a resolved value.
pub fn print_node(node: &Node) -> String {
    match &node.kind {
        Expr::Number(n) => n.to_string(),
        Expr::String(s) => format!("\"{}\"", escape_string(s)),
        Expr::Symbol(s) => s.clone(),
        Expr::Boolean(b) => b.to_string(),
        Expr::Nil => "nil".to_string(),
        Expr::Quote(inner) => format!("(quote {})", print_node(inner)),
        Expr::List(items) => {
            let rendered: Vec<String> = items.iter().map(print_node).collect();
            format!("({})", rendered.join(" "))
        }
    }
}

fn escape_string(s: &str) -> String {
    s.chars().fold(String::new(), |mut acc, char| {
        match char {
            '"' => acc.push_str("\\\""),
            '\\' => acc.push_str("\\\\"),
            '\n' => acc.push_str("\\n"),
            c => acc.push(c),
        }
        acc
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", print_value(self, false))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", print_node(self))
    }
}
