use chipmunk::environment::Environment;
use chipmunk::evaluator;
use chipmunk::io::StdoutIoHandler;
use chipmunk::parser;
use chipmunk::printer::print_value;
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: chipmunk <file>");
        return ExitCode::from(2);
    };

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Cannot read {}: {}", path, e);
            return ExitCode::from(2);
        }
    };

    run_file(&path, &source)
}

/// Evaluates every top-level expression against one root environment,
/// echoing each result in machine form. Stops at the first error.
fn run_file(path: &str, source: &str) -> ExitCode {
    let nodes = match parser::parse_program_str(source) {
        Ok(nodes) => nodes,
        Err(e) => {
            e.pretty_print(path, source);
            return ExitCode::FAILURE;
        }
    };

    let env = Environment::new_global_populated();
    let mut io = StdoutIoHandler;
    for node in nodes {
        match evaluator::evaluate(node, env.clone(), &mut io) {
            Ok(value) => println!("{}", print_value(&value, false)),
            Err(e) => {
                e.pretty_print(path, source);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
