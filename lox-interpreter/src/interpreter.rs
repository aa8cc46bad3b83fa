use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use lox_parser::ast::{Expr, Span, Stmt};
use lox_parser::lexer::Token;
use lox_passes::resolve::ResolvedDepths;
use lox_value::env::Environment;
use lox_value::object::{Function, Obj, ObjKind};
use lox_value::{BuiltinVars, Value};

/// Outcome of interpreting a program.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpretResult {
    Ok,
    /// The first runtime error aborts the rest of the program.
    RuntimeError { message: String, span: Span },
}

/// A runtime error carrying the span of the offending expression for
/// line-accurate reporting.
#[derive(Debug, Clone, PartialEq)]
struct RuntimeError {
    message: String,
    span: Span,
}

impl RuntimeError {
    fn new(message: impl ToString, span: Span) -> Self {
        Self {
            message: message.to_string(),
            span,
        }
    }
}

type EvalResult<T> = Result<T, RuntimeError>;

/// Result of executing a statement: either fall through to the next statement
/// or unwind to the nearest function call boundary carrying a return value.
/// The unwind never crosses a call boundary.
enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    /// The currently active scope.
    env: Rc<RefCell<Environment>>,
    /// Lookup distances precomputed by the resolve pass, accumulated across
    /// [`Self::interpret`] calls (the REPL feeds one program per line).
    resolved_depths: ResolvedDepths,
    /// Result of the most recently evaluated expression or print statement.
    /// Used for REPL echo and by tests.
    last_value: Value,
}

impl Interpreter {
    /// Create an interpreter whose global scope is seeded with `builtin_vars`.
    pub fn new(builtin_vars: &BuiltinVars) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        for (ident, value) in &builtin_vars.values {
            globals.borrow_mut().define(ident, value.clone());
        }
        Self {
            env: Rc::clone(&globals),
            globals,
            resolved_depths: ResolvedDepths::new(),
            last_value: Value::Nil,
        }
    }

    pub fn last_value(&self) -> &Value {
        &self.last_value
    }

    /// Executes the program against the interpreter's global state.
    ///
    /// `resolved_depths` must come from a resolve pass over the same
    /// `program`. The caller must keep `program` alive for as long as this
    /// interpreter is used: function values and lookup distances reference
    /// into the tree.
    pub fn interpret(
        &mut self,
        program: &[Stmt],
        resolved_depths: ResolvedDepths,
    ) -> InterpretResult {
        self.resolved_depths.extend(resolved_depths);
        for stmt in program {
            match self.exec_stmt(stmt) {
                Ok(Flow::Normal) => {}
                // The resolve pass rejects top-level `return`s; stop if one
                // slipped through anyway.
                Ok(Flow::Return(_)) => break,
                Err(err) => {
                    return InterpretResult::RuntimeError {
                        message: err.message,
                        span: err.span,
                    }
                }
            }
        }
        InterpretResult::Ok
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::ExprStmt(expr) => {
                self.last_value = self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::PrintStmt(expr) => {
                let value = self.eval_expr(expr)?;
                println!("{}", value);
                self.last_value = value;
                Ok(Flow::Normal)
            }
            Stmt::VarDeclaration { ident, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.eval_expr(initializer)?,
                    None => Value::Nil,
                };
                self.env.borrow_mut().define(ident, value);
                Ok(Flow::Normal)
            }
            Stmt::FunDeclaration {
                ident,
                params,
                body,
            } => {
                // The function captures the scope it is declared in. Defining
                // the name before the body ever runs is what allows recursion.
                let function = Function {
                    ident: ident.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    closure: Rc::clone(&self.env),
                };
                self.env
                    .borrow_mut()
                    .define(ident, Value::Object(Rc::new(Obj::new_fn(function))));
                Ok(Flow::Normal)
            }
            Stmt::Block(body) => {
                let block_env = Environment::with_enclosing(Rc::clone(&self.env));
                self.exec_block(body, Rc::new(RefCell::new(block_env)))
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(condition)?.is_truthy() {
                    match self.exec_stmt(body)? {
                        Flow::Normal => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::ReturnStmt { span: _, value } => {
                let value = match value {
                    Some(value) => self.eval_expr(value)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    /// Executes `body` with `env` as the active scope. The previous scope is
    /// restored on every exit path, including errors and returns.
    fn exec_block(&mut self, body: &[Stmt], env: Rc<RefCell<Environment>>) -> EvalResult<Flow> {
        let previous = mem::replace(&mut self.env, env);
        let result = self.exec_stmt_list(body);
        self.env = previous;
        result
    }

    fn exec_stmt_list(&mut self, body: &[Stmt]) -> EvalResult<Flow> {
        for stmt in body {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::NumberLit(val) => Ok(Value::Number(*val)),
            Expr::BoolLit(val) => Ok(Value::Bool(*val)),
            Expr::StringLit(val) => Ok(Value::Object(Rc::new(Obj::new_string(val.clone())))),
            Expr::NilLit => Ok(Value::Nil),
            Expr::Grouping(inner) => self.eval_expr(inner),
            Expr::Identifier { ident, span } => self.lookup_variable(expr, ident, span),
            Expr::Assign { ident, span, value } => {
                let value = self.eval_expr(value)?;
                self.assign_variable(expr, ident, span, value.clone())?;
                Ok(value)
            }
            Expr::Unary { op, span, arg } => {
                let arg = self.eval_expr(arg)?;
                match op {
                    Token::Minus => match arg {
                        Value::Number(val) => Ok(Value::Number(-val)),
                        _ => Err(RuntimeError::new("Operand must be a number.", span.clone())),
                    },
                    _ => Ok(Value::Bool(!arg.is_truthy())), // Token::LogicalNot
                }
            }
            Expr::Binary { lhs, op, span, rhs } => self.eval_binary(lhs, op, span, rhs),
            Expr::Logical { lhs, op, rhs } => {
                let lhs = self.eval_expr(lhs)?;
                let short_circuits = match op {
                    Token::Or => lhs.is_truthy(),
                    _ => !lhs.is_truthy(), // Token::And
                };
                if short_circuits {
                    // the right-hand side is never evaluated
                    Ok(lhs)
                } else {
                    self.eval_expr(rhs)
                }
            }
            Expr::Call { callee, span, args } => self.eval_call(callee, span, args),
        }
    }

    fn eval_binary(
        &mut self,
        lhs: &Expr,
        op: &Token,
        span: &Span,
        rhs: &Expr,
    ) -> EvalResult<Value> {
        let a = self.eval_expr(lhs)?;
        let b = self.eval_expr(rhs)?;

        /// Generate evaluation for a numeric binary operator.
        macro_rules! num_binary_op {
            ($op: tt, $result: path) => {{
                match (a.cast_to_number(), b.cast_to_number()) {
                    (Some(a), Some(b)) => Ok($result(a $op b)),
                    _ => Err(RuntimeError::new("Operands must be numbers.", span.clone())),
                }
            }};

            ($op: tt) => {
                num_binary_op!($op, Value::Number)
            };
        }

        match op {
            Token::Plus => {
                if let (Some(a), Some(b)) = (a.cast_to_number(), b.cast_to_number()) {
                    Ok(Value::Number(a + b))
                } else if let (Some(a), Some(b)) = (a.cast_to_str(), b.cast_to_str()) {
                    // string concatenation
                    Ok(Value::Object(Rc::new(Obj::new_string(format!(
                        "{}{}",
                        a, b
                    )))))
                } else {
                    Err(RuntimeError::new(
                        "Operands must be two numbers or two strings.",
                        span.clone(),
                    ))
                }
            }
            Token::Minus => num_binary_op!(-),
            Token::Asterisk => num_binary_op!(*),
            // division by zero follows IEEE-754 (infinity/NaN), not an error
            Token::Slash => num_binary_op!(/),
            Token::GreaterThan => num_binary_op!(>, Value::Bool),
            Token::GreaterThanEquals => num_binary_op!(>=, Value::Bool),
            Token::LessThan => num_binary_op!(<, Value::Bool),
            Token::LessThanEquals => num_binary_op!(<=, Value::Bool),
            Token::EqualsEquals => Ok(Value::Bool(a == b)),
            Token::NotEquals => Ok(Value::Bool(a != b)),
            _ => unreachable!("parser never produces binary operator {:?}", op),
        }
    }

    fn eval_call(&mut self, callee: &Expr, span: &Span, args: &[Expr]) -> EvalResult<Value> {
        let callee_value = self.eval_expr(callee)?;

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg)?); // left to right
        }

        let obj = match &callee_value {
            Value::Object(obj) => obj,
            _ => return Err(RuntimeError::new("Can only call functions.", span.clone())),
        };
        match &obj.kind {
            ObjKind::Fn(function) => {
                check_arity(function.arity(), arg_values.len(), span)?;
                self.call_function(function, arg_values)
            }
            ObjKind::NativeFn(native_fn) => {
                check_arity(native_fn.arity, arg_values.len(), span)?;
                Ok((native_fn.func)(&mut arg_values))
            }
            ObjKind::Str(_) => Err(RuntimeError::new("Can only call functions.", span.clone())),
        }
    }

    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> EvalResult<Value> {
        // The new frame's parent is the captured closure environment, not the
        // caller's environment. This is what makes lexical closures work.
        let mut fn_env = Environment::with_enclosing(Rc::clone(&function.closure));
        for (param, arg) in function.params.iter().zip(args) {
            fn_env.define(param, arg);
        }

        match self.exec_block(&function.body, Rc::new(RefCell::new(fn_env)))? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil), // fall through without a `return`
        }
    }

    fn lookup_variable(&self, expr: &Expr, ident: &str, span: &Span) -> EvalResult<Value> {
        let value = match self.resolved_depths.get(&(expr as *const Expr)) {
            Some(&depth) => Environment::get_at(&self.env, depth, ident),
            None => self.globals.borrow().get(ident),
        };
        value.ok_or_else(|| {
            RuntimeError::new(format!("Undefined variable '{}'.", ident), span.clone())
        })
    }

    fn assign_variable(
        &mut self,
        expr: &Expr,
        ident: &str,
        span: &Span,
        value: Value,
    ) -> EvalResult<()> {
        let assigned = match self.resolved_depths.get(&(expr as *const Expr)) {
            Some(&depth) => Environment::assign_at(&self.env, depth, ident, value),
            None => self.globals.borrow_mut().assign(ident, value),
        };
        if assigned {
            Ok(())
        } else {
            Err(RuntimeError::new(
                format!("Undefined variable '{}'.", ident),
                span.clone(),
            ))
        }
    }
}

fn check_arity(arity: u32, got: usize, span: &Span) -> EvalResult<()> {
    if arity as usize == got {
        Ok(())
    } else {
        Err(RuntimeError::new(
            format!("Expected {} arguments but got {}.", arity, got),
            span.clone(),
        ))
    }
}
