use std::cell::RefCell;
use std::rc::Rc;

use chipmunk::environment::Environment;
use chipmunk::evaluator::{evaluate, special_form_identifiers};
use chipmunk::io::StdoutIoHandler;
use chipmunk::lexer::{TokenKind, tokenize};
use chipmunk::parser::parse_str;
use chipmunk::printer::print_value;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

struct ChipmunkCompleter {
    env: Rc<RefCell<Environment>>,
}

impl ChipmunkCompleter {
    fn new(env: Rc<RefCell<Environment>>) -> Self {
        ChipmunkCompleter { env }
    }
}

impl rustyline::completion::Completer for ChipmunkCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok((
            pos,
            match tokenize(&line[..pos]) {
                Ok(tokens) => {
                    if let Some(TokenKind::Symbol(prefix)) = tokens.last().map(|t| t.kind.clone()) {
                        self.env
                            .borrow()
                            .get_identifiers()
                            .union(&special_form_identifiers())
                            .filter_map(|id| {
                                if id.starts_with(&prefix) {
                                    Some(id[prefix.len()..].to_string())
                                } else {
                                    None
                                }
                            })
                            .collect()
                    } else {
                        vec![]
                    }
                }
                Err(_) => vec![],
            },
        ))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputValidator {
    #[rustyline(Validator)]
    validator: ChipmunkValidator,
    #[rustyline(Highlighter)]
    highlighter: ChipmunkHighlighter,
    #[rustyline(Completer)]
    completer: ChipmunkCompleter,
}

struct ChipmunkValidator;

impl Validator for ChipmunkValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        // Parens are the only bracket; square brackets open comments.
        let mut depth: usize = 0;
        let mut in_string = false;
        let mut in_comment = false;
        let mut escape = false;

        for (i, c) in input.chars().enumerate() {
            if in_comment {
                if c == ']' {
                    in_comment = false;
                }
                continue;
            }
            if in_string {
                if escape {
                    escape = false;
                } else if c == '\\' {
                    escape = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }

            match c {
                '"' => in_string = true,
                '[' => in_comment = true,
                '(' => depth += 1,
                ')' => {
                    if depth == 0 {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched ')' at position {}",
                            i
                        ))));
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }

        // An open string, comment or form continues on the next line
        if in_string || in_comment || depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

struct ChipmunkHighlighter;

impl Highlighter for ChipmunkHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> std::borrow::Cow<'l, str> {
        // (index in line, position in the output) per open paren
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut highlighted = String::new();
        let mut in_string = false;
        let mut in_comment = false;
        let mut escape = false;
        let cursor = pos.checked_sub(1);

        for (i, c) in line.chars().enumerate() {
            if in_comment {
                highlighted.push_str(&format!("\x1b[90m{}\x1b[0m", c)); // Gray for comments
                if c == ']' {
                    in_comment = false;
                }
                continue;
            }
            if in_string {
                if escape {
                    escape = false;
                } else if c == '\\' {
                    escape = true;
                } else if c == '"' {
                    in_string = false;
                }
                highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for strings
                continue;
            }

            match c {
                '"' => {
                    in_string = true;
                    highlighted.push_str(&format!("\x1b[32m{}\x1b[0m", c)); // Green for strings
                }
                '[' => {
                    in_comment = true;
                    highlighted.push_str(&format!("\x1b[90m{}\x1b[0m", c)); // Gray for comments
                }
                '(' => {
                    stack.push((i, highlighted.len()));
                    highlighted.push(c);
                }
                ')' => {
                    if let Some((open_index, open_pos)) = stack.pop() {
                        if cursor == Some(i) || cursor == Some(open_index) {
                            highlighted.push_str(&format!("\x1b[34m{}\x1b[0m", c)); // Blue for the matching pair
                            highlighted
                                .replace_range(open_pos..=open_pos, "\x1b[1;34m(\x1b[0m");
                        } else {
                            highlighted.push(c);
                        }
                    } else {
                        highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // Red for unmatched closing paren
                    }
                }
                _ => {
                    highlighted.push(c);
                }
            }
        }

        std::borrow::Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn main() -> rustyline::Result<()> {
    println!("Chipmunk REPL v0.1.0");
    println!("Type 'exit' or press Ctrl-D to quit.");

    let global_env = Environment::new_global_populated();
    let mut io = StdoutIoHandler;
    let h = InputValidator {
        highlighter: ChipmunkHighlighter,
        validator: ChipmunkValidator,
        completer: ChipmunkCompleter::new(global_env.clone()),
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(rustyline::EditMode::Vi)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(h));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history("chipmunk_history.txt").is_err() {
        println!("No previous history.");
    }

    loop {
        let readline = rl.readline("chipmunk> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }
                if trimmed_input.eq_ignore_ascii_case("exit") {
                    break;
                }

                match parse_str(trimmed_input) {
                    Ok(node) => {
                        // Clone the Rc for each evaluation
                        match evaluate(node, global_env.clone(), &mut io) {
                            Ok(value) => {
                                println!("{}", print_value(&value, false));
                            }
                            Err(e) => {
                                e.pretty_print("REPL", trimmed_input);
                            }
                        }
                    }
                    Err(parse_err) => {
                        parse_err.pretty_print("REPL", trimmed_input);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history("chipmunk_history.txt")
}
