use crate::environment::Environment;
use crate::evaluator::EvalResult;
use crate::io::IoHandler;
use crate::source::Span;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: Expr, // The expression data
    pub span: Span, // The source span it covers
}

impl Node {
    pub fn new(kind: Expr, span: Span) -> Self {
        Node { kind, span }
    }
}

/// A parsed expression. Code only; evaluation produces a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    String(String),
    Symbol(String),
    Boolean(bool),
    Nil,
    Quote(Box<Node>), // 'expr, sugar for (quote expr)
    List(Vec<Node>),  // Compound forms, disambiguated by the evaluator
}

impl Expr {
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Number(_) => "number",
            Expr::String(_) => "string",
            Expr::Symbol(_) => "symbol",
            Expr::Boolean(_) => "boolean",
            Expr::Nil => "nil",
            Expr::Quote(_) => "quote form",
            Expr::List(_) => "list",
        }
    }
}

/// A runtime value. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Symbol(String),
    Boolean(bool),
    Nil,
    List(Vec<Value>),
    Lambda(Lambda),
    NativeFunction(NativeFunction),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Boolean(_) => "boolean",
            Value::Nil => "nil",
            Value::List(_) => "list",
            Value::Lambda(_) => "lambda",
            Value::NativeFunction(_) => "native function",
        }
    }
}

#[derive(Clone)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Rc<Node>,
    pub env: Rc<RefCell<Environment>>, // Captured defining environment
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The captured environment is omitted: closures make it cyclic.
        f.debug_struct("Lambda")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish()
    }
}

// Structural equality over parameters and body; the captured environment
// does not participate.
impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.body == other.body
    }
}

pub type NativeFunc = fn(Vec<Value>, &mut dyn IoHandler, Span) -> EvalResult;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String, // The symbol the root environment binds it to
    pub arity: Arity,
    pub func: NativeFunc,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

// Function pointers don't implement PartialEq directly; names identify
// natives uniquely within a root environment.
impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(1) => write!(f, "exactly 1 argument"),
            Arity::Exactly(n) => write!(f, "exactly {} arguments", n),
            Arity::AtLeast(1) => write!(f, "at least 1 argument"),
            Arity::AtLeast(n) => write!(f, "at least {} arguments", n),
        }
    }
}
