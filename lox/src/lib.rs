pub mod builtin_functions;

/// For testing purposes only.
pub fn interpret(source: &str) {
    use lox_interpreter::interpreter::{InterpretResult, Interpreter};
    use lox_parser::parser::Parser;
    use lox_passes::resolve::Resolver;

    let builtin_vars = builtin_functions::default_builtin_vars();

    let source = source.into();
    let program = Parser::new(&source).parse_program();
    let mut resolver = Resolver::new(&source);
    resolver.resolve_program(&program);

    eprint!("{}", source);
    assert!(source.has_no_errors());

    let mut interpreter = Interpreter::new(&builtin_vars);
    assert_eq!(
        interpreter.interpret(&program, resolver.into_resolved_depths()),
        InterpretResult::Ok
    );
}
