use std::ops::Range;
use std::rc::Rc;

use crate::lexer::Token;

/// Byte range of a node in the original source code. Used for diagnostics.
pub type Span = Range<usize>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumberLit(f64),
    BoolLit(bool),
    StringLit(String),
    NilLit,
    /// A variable reference (e.g. `foo`).
    Identifier { ident: String, span: Span },
    /// An assignment to an already declared variable (e.g. `foo = 1`).
    /// Evaluates to the assigned value.
    Assign {
        ident: String,
        span: Span,
        value: Box<Expr>,
    },
    /// A parenthesized expression.
    Grouping(Box<Expr>),
    /// A unary expression (e.g. `-x` or `!x`). `span` is the operator's span.
    Unary {
        op: Token,
        span: Span,
        arg: Box<Expr>,
    },
    /// A binary expression (e.g. `1+1`). `span` is the operator's span.
    Binary {
        lhs: Box<Expr>,
        op: Token,
        span: Span,
        rhs: Box<Expr>,
    },
    /// A short-circuiting `and` / `or` expression.
    Logical {
        lhs: Box<Expr>,
        op: Token,
        rhs: Box<Expr>,
    },
    /// A call expression (e.g. `foo(1, 2)`). `span` is the opening paren's span.
    Call {
        callee: Box<Expr>,
        span: Span,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    ExprStmt(Expr),
    PrintStmt(Expr),
    /// A `var` declaration. A missing initializer defaults to `nil`.
    VarDeclaration {
        ident: String,
        initializer: Option<Expr>,
    },
    /// A `fun` declaration. The body is reference counted so that function
    /// values can share it with the tree without cloning the statements.
    FunDeclaration {
        ident: String,
        params: Vec<String>,
        body: Rc<Vec<Stmt>>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    /// A `return` statement. `span` is the `return` keyword's span.
    ReturnStmt { span: Span, value: Option<Expr> },
}
