//! Tree-walking evaluator for the Lox language.

pub mod interpreter;
