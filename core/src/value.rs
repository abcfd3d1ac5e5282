//! Runtime values exported by module units
//!
//! Objects and functions are reference types: cloning a [`Value`] holding
//! one shares the underlying allocation, so field mutation performed through
//! one handle is visible through every other handle to the same object.
//! That shared identity is exactly what the snapshot-vs-live observation
//! hinges on, so [`ObjectRef::ptr_eq`] exposes it directly.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use itertools::Itertools;

/// A value exported by a module unit
#[derive(Clone)]
pub enum Value {
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(ObjectRef),
    Function(FunctionRef),
}

impl Value {
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            // reference types compare by identity, not structure
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Object(obj) => write!(f, "{}", obj),
            Value::Function(func) => write!(f, "{}", func),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A shared, mutable object with observable identity
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<IndexMap<String, Value>>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a field, cloning the stored value. Reference-typed fields still
    /// share their backing allocation after the clone.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn set<K: Into<String>>(&self, key: K, value: Value) {
        self.0.borrow_mut().insert(key.into(), value);
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// True when both handles point at the same object
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.0.borrow();
        if fields.is_empty() {
            return write!(f, "{{}}");
        }
        write!(
            f,
            "{{ {} }}",
            fields.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")
        )
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A callable export. The closure owns whatever unit state it mutates;
/// a thrown error is carried as a plain message and mapped to
/// [`InvokeError::Threw`](crate::error::InvokeError) at the call site.
#[derive(Clone)]
pub struct FunctionRef {
    name: &'static str,
    body: Rc<dyn Fn() -> Result<Value, String>>,
}

impl FunctionRef {
    pub fn new<F>(name: &'static str, body: F) -> Self
    where
        F: Fn() -> Result<Value, String> + 'static,
    {
        Self {
            name,
            body: Rc::new(body),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self) -> Result<Value, String> {
        (self.body)()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[function {}]", self.name)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_identity() {
        let a = ObjectRef::new();
        a.set("foo", Value::Int(1));
        let b = a.clone();
        assert!(a.ptr_eq(&b));

        b.set("foo", Value::Int(2));
        assert_eq!(a.get("foo"), Some(Value::Int(2)));

        let c = ObjectRef::new();
        c.set("foo", Value::Int(2));
        assert!(!a.ptr_eq(&c));
        assert_ne!(Value::Object(a), Value::Object(c));
    }

    #[test]
    fn test_value_display() {
        let obj = ObjectRef::new();
        obj.set("foo", Value::Int(1));
        obj.set("update", Value::Function(FunctionRef::new("update", || Ok(Value::Undefined))));
        assert_eq!(obj.to_string(), "{ foo: 1, update: [function update] }");
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Str("hi".into()).to_string(), "\"hi\"");
    }

    #[test]
    fn test_function_throw_carries_message() {
        let f = FunctionRef::new("boom", || Err("broken".into()));
        assert_eq!(f.call().unwrap_err(), "broken");
    }
}
