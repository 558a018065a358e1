//! Dynamic value representation
//!
//! `Value` is the host value domain: primitives are stored inline, objects
//! by reference. Cloning a `Value` never copies an object.

use crate::key::Symbol;
use crate::object::ObjectRef;
use std::fmt;
use std::rc::Rc;

/// Dynamic value
#[derive(Clone, Default)]
pub enum Value {
    /// The `undefined` value
    #[default]
    Undefined,
    /// The `null` value
    Null,
    /// Boolean
    Bool(bool),
    /// IEEE 754 double
    Number(f64),
    /// Immutable string
    String(Rc<str>),
    /// Symbol
    Symbol(Symbol),
    /// Reference to an object (ordinary, function or proxy)
    Object(ObjectRef),
}

impl Value {
    /// Check if this is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if this is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is `null` or `undefined`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Check if this is an object reference
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check if this is a callable object
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Object(obj) => obj.is_callable(),
            _ => false,
        }
    }

    /// Get the object reference if this is an object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Convert into an object reference if this is an object
    pub fn into_object(self) -> Option<ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get as number if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as boolean if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value's type, as reported by `typeof`
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(obj) if obj.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }

    /// SameValue comparison
    ///
    /// `NaN` equals `NaN`, `+0` and `-0` differ, objects compare by identity.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(_) => write!(f, "{}", self),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Symbol(sym) => write!(f, "{}", sym),
            Value::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.is_nan() => write!(f, "NaN"),
            Value::Number(n) if n.is_infinite() => {
                write!(f, "{}", if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Symbol(sym) => write!(f, "{}", sym),
            Value::Object(obj) => write!(f, "[object {}]", obj.id()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Symbol> for Value {
    fn from(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<&ObjectRef> for Value {
    fn from(obj: &ObjectRef) -> Self {
        Value::Object(obj.clone())
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_value_numbers() {
        assert!(Value::from(f64::NAN).same_value(&Value::from(f64::NAN)));
        assert!(!Value::from(0.0).same_value(&Value::from(-0.0)));
        assert!(Value::from(1).same_value(&Value::from(1.0)));
        assert!(!Value::from(1).same_value(&Value::from("1")));
    }

    #[test]
    fn test_same_value_objects() {
        let a = ObjectRef::new();
        let b = ObjectRef::new();
        assert!(Value::from(&a).same_value(&Value::from(&a)));
        assert!(!Value::from(&a).same_value(&Value::from(&b)));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "object");
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::from(ObjectRef::new()).type_name(), "object");
        let f = ObjectRef::function(|_, _| Ok(Value::Undefined));
        assert_eq!(Value::from(f).type_name(), "function");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(2).to_string(), "2");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Undefined.to_string(), "undefined");
    }
}
