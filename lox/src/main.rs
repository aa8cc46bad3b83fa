use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use lox::builtin_functions::default_builtin_vars;
use lox_interpreter::interpreter::{InterpretResult, Interpreter};
use lox_parser::ast::Stmt;
use lox_parser::parser::Parser;
use lox_passes::resolve::Resolver;
use lox_source::Source;

fn main() {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => repl(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: lox [script]");
            process::exit(64);
        }
    }
}

fn run_file(path: &str) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Could not read {}: {}", path, err);
            process::exit(74);
        }
    };

    let source = content.as_str().into();
    let program = Parser::new(&source).parse_program();
    let mut resolver = Resolver::new(&source);
    resolver.resolve_program(&program);

    if !source.has_no_errors() {
        eprint!("{}", source);
        process::exit(65);
    }

    let mut interpreter = Interpreter::new(&default_builtin_vars());
    match interpreter.interpret(&program, resolver.into_resolved_depths()) {
        InterpretResult::Ok => {}
        InterpretResult::RuntimeError { message, span } => {
            report_runtime_error(&source, &message, span.start);
            process::exit(70);
        }
    }
}

fn repl() {
    let mut stdout = io::stdout();
    let stdin = io::stdin();

    let builtin_vars = default_builtin_vars();
    let mut interpreter = Interpreter::new(&builtin_vars);
    // Every line's tree is kept for the whole session: the interpreter's
    // resolved lookup distances and function values point into it.
    let mut session: Vec<Vec<Stmt>> = Vec::new();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            return;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => return, // EOF
            Ok(_) => {}
            Err(err) => {
                eprintln!("Could not read input: {}", err);
                return;
            }
        }

        run_line(&mut interpreter, &mut session, &input);
    }
}

fn run_line(interpreter: &mut Interpreter, session: &mut Vec<Vec<Stmt>>, input: &str) {
    let source = input.into();
    let program = Parser::new(&source).parse_program();
    let mut resolver = Resolver::new(&source);
    resolver.resolve_program(&program);

    if !source.has_no_errors() {
        eprint!("{}", source);
        return;
    }

    let result = interpreter.interpret(&program, resolver.into_resolved_depths());
    session.push(program);

    match result {
        InterpretResult::Ok => println!("{}", interpreter.last_value()),
        InterpretResult::RuntimeError { message, span } => {
            report_runtime_error(&source, &message, span.start);
        }
    }
}

fn report_runtime_error(source: &Source, message: &str, pos: usize) {
    eprintln!("[line {}] RuntimeError: {}", source.line_of(pos), message);
}
