use std::cell::RefCell;
use std::rc::Rc;

use lox_parser::ast::Stmt;

use crate::env::Environment;
use crate::Value;

#[derive(Clone)]
pub struct NativeFn {
    pub ident: String,
    /// Number of arguments that the function accepts.
    pub arity: u32,
    pub func: &'static dyn Fn(&mut [Value]) -> Value,
}

/// A user defined function together with the environment that was active at
/// its definition site (the closure).
#[derive(Clone)]
pub struct Function {
    pub ident: String,
    pub params: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Rc<RefCell<Environment>>,
}

impl Function {
    /// Number of arguments that the function accepts.
    pub fn arity(&self) -> u32 {
        self.params.len() as u32
    }
}

#[derive(Clone)]
pub enum ObjKind {
    Str(String),
    Fn(Function),
    NativeFn(NativeFn),
}

impl PartialEq for ObjKind {
    /// Strings compare by value; functions are never equal.
    fn eq(&self, other: &ObjKind) -> bool {
        match self {
            Self::Str(l) => match other {
                Self::Str(r) => l == r,
                _ => false,
            },
            _ => false,
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct Obj {
    pub kind: ObjKind,
}

impl Obj {
    pub fn new_string(str: String) -> Self {
        Self {
            kind: ObjKind::Str(str),
        }
    }

    pub fn new_fn(function: Function) -> Self {
        Self {
            kind: ObjKind::Fn(function),
        }
    }

    pub fn new_native_fn(native_fn: NativeFn) -> Self {
        Self {
            kind: ObjKind::NativeFn(native_fn),
        }
    }
}
