// Declare modules publicly so they are part of the library interface
pub mod environment;
pub mod evaluator;
pub mod interpreter;
pub mod io;
pub mod lexer;
pub mod opform;
pub mod parser;
pub mod pretty_print;
pub mod primitives;
pub mod printer;
pub mod source;
pub mod types;

pub use environment::{EnvError, Environment};
pub use evaluator::{EvalError, EvalResult, evaluate};
pub use interpreter::{InterpretError, interpret};
pub use io::{CaptureIoHandler, IoHandler, StdoutIoHandler};
pub use lexer::{LexerError, Token, tokenize};
pub use parser::{ParseError, Parser, parse_program_str, parse_str};
pub use printer::{print_node, print_value};
pub use source::Span;
pub use types::{Expr, Node, Value};
