pub mod env;
pub mod object;

use std::fmt;
use std::rc::Rc;

use object::{NativeFn, Obj, ObjKind};

/// A Lox runtime value.
///
/// Equality is strict: values of different types are never equal and there is
/// no coercion. `nil` is only equal to `nil`.
#[derive(Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Nil,
    Object(Rc<Obj>),
}

impl Value {
    /// Attempts to cast the `Value` into a `&str` or `None` if wrong type.
    pub fn cast_to_str(&self) -> Option<&str> {
        match self {
            Self::Object(obj) => match &obj.kind {
                ObjKind::Str(string) => Some(&string),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn cast_to_number(&self) -> Option<f64> {
        match self {
            Self::Number(val) => Some(*val),
            _ => None,
        }
    }

    /// Truthiness for control flow purposes. Only `false` and `nil` are falsy;
    /// everything else (including `0` and `""`) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    fn print_obj(f: &mut fmt::Formatter<'_>, obj: &Obj) -> fmt::Result {
        match &obj.kind {
            ObjKind::Str(str) => write!(f, "{}", str),
            ObjKind::Fn(function) => write!(f, "<fn {}>", function.ident),
            ObjKind::NativeFn(NativeFn { ident, .. }) => write!(f, "<native fn {}>", ident),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(val) => write!(f, "{}", val),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Nil => write!(f, "nil"),
            Value::Object(val) => Self::print_obj(f, val),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Native values that are defined in the global scope before user code runs.
pub struct BuiltinVars {
    pub values: Vec<(String, Value)>,
}

impl BuiltinVars {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn add_native_fn(
        &mut self,
        ident: &str,
        func: &'static dyn Fn(&mut [Value]) -> Value,
        arity: u32,
    ) {
        let value = Value::Object(Rc::new(Obj::new_native_fn(NativeFn {
            ident: ident.to_string(),
            arity,
            func,
        })));
        self.values.push((ident.to_string(), value));
    }
}

impl Default for BuiltinVars {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(str: &str) -> Value {
        Value::Object(Rc::new(Obj::new_string(str.to_string())))
    }

    #[test]
    fn display() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Number(4181.0).to_string(), "4181");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(string("hello").to_string(), "hello");
    }

    #[test]
    fn strict_equality() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_eq!(string("a"), string("a"));
        assert_ne!(string("a"), string("b"));
        // no coercion across types
        assert_ne!(Value::Number(1.0), string("1"));
        assert_ne!(Value::Bool(false), Value::Nil);
        assert_ne!(Value::Number(0.0), Value::Bool(false));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(string("").is_truthy());
    }
}
