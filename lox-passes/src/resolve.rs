//! Variable resolution pass.
//!
//! Walks the tree once before evaluation, keeping a stack of lexical scopes,
//! to validate variable references (a variable may not be read in its own
//! initializer) and to precompute, for every local reference, how many scopes
//! separate it from its defining scope. Evaluation uses those distances to
//! skip the environment chain walk.

use std::collections::HashMap;

use lox_parser::ast::{Expr, Stmt};
use lox_parser::visitor::{walk_expr, walk_stmt, Visitor};
use lox_source::{Source, SyntaxError};

/// Maps variable references ([`Expr::Identifier`] and [`Expr::Assign`], keyed
/// by node address) to the number of scopes between the reference and its
/// defining scope. References without an entry resolve against the global
/// environment at runtime.
pub type ResolvedDepths = HashMap<*const Expr, usize>;

/// Variable resolution pass.
pub struct Resolver<'a> {
    /// Stack of lexical scopes. A name maps to `false` between its
    /// declaration and the end of its initializer, `true` afterwards.
    /// The global scope is intentionally not tracked.
    scopes: Vec<HashMap<String, bool>>,
    resolved_depths: ResolvedDepths,
    /// Number of function declarations currently being resolved.
    function_depth: u32,
    source: &'a Source<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a Source) -> Self {
        Self {
            scopes: Vec::new(),
            resolved_depths: ResolvedDepths::new(),
            function_depth: 0,
            source,
        }
    }

    /// Resolves a whole program. Must run to completion before any statement
    /// is executed; it never executes code.
    pub fn resolve_program(&mut self, program: &'a [Stmt]) {
        for stmt in program {
            self.visit_stmt(stmt);
        }
    }

    pub fn resolved_depths(&self) -> &ResolvedDepths {
        &self.resolved_depths
    }

    pub fn into_resolved_depths(self) -> ResolvedDepths {
        self.resolved_depths
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Marks a name present-but-not-ready in the current scope.
    fn declare(&mut self, ident: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(ident.to_string(), false);
        }
    }

    /// Marks a name ready for use.
    fn define(&mut self, ident: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(ident.to_string(), true);
        }
    }

    /// Records the hop distance from the innermost scope to the scope defining
    /// `ident`. A name not found in any tracked scope is assumed to be global
    /// and is left for the runtime chain walk.
    fn resolve_local(&mut self, expr: *const Expr, ident: &str) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(ident) {
                self.resolved_depths.insert(expr, depth);
                return;
            }
        }
    }
}

impl<'a> Visitor<'a> for Resolver<'a> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        match expr {
            Expr::Identifier { ident, span } => {
                if self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(ident))
                    == Some(&false)
                {
                    self.source.errors.add_error(SyntaxError::new(
                        "Cannot read local variable in its own initializer.",
                        span.clone(),
                    ));
                }
                self.resolve_local(expr as *const Expr, ident);
            }
            Expr::Assign { ident, value, .. } => {
                self.visit_expr(value);
                self.resolve_local(expr as *const Expr, ident);
            }
            _ => walk_expr(self, expr),
        }
    }

    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::VarDeclaration { ident, initializer } => {
                self.declare(ident);
                if let Some(initializer) = initializer {
                    self.visit_expr(initializer);
                }
                self.define(ident);
            }
            Stmt::FunDeclaration {
                ident,
                params,
                body,
            } => {
                // The name is ready before the body resolves so that the
                // function can call itself.
                self.declare(ident);
                self.define(ident);

                self.function_depth += 1;
                self.begin_scope();
                for param in params {
                    self.declare(param);
                    self.define(param);
                }
                for stmt in body.iter() {
                    self.visit_stmt(stmt);
                }
                self.end_scope();
                self.function_depth -= 1;
            }
            Stmt::Block(body) => {
                self.begin_scope();
                for stmt in body {
                    self.visit_stmt(stmt);
                }
                self.end_scope();
            }
            Stmt::ReturnStmt { span, value } => {
                if self.function_depth == 0 {
                    self.source.errors.add_error(SyntaxError::new(
                        "Can't return from top-level code.",
                        span.clone(),
                    ));
                }
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            _ => walk_stmt(self, stmt),
        }
    }
}
