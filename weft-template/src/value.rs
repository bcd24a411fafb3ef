use std::fmt;
use std::rc::Rc;

use weft_dom::Event;

use crate::context::Context;

type MethodFn = dyn Fn(&Context, Option<&Event>) -> Value;

/// A function stored in a [`Context`].
///
/// Methods are always called with the owning context as receiver, so they
/// can read and write sibling keys. Event listeners receive the dispatched
/// event; computed placeholders (`{{ key() }}`) receive `None`.
#[derive(Clone)]
pub struct Method {
    name: Option<Rc<str>>,
    f: Rc<MethodFn>,
}

impl Method {
    pub fn new(f: impl Fn(&Context, Option<&Event>) -> Value + 'static) -> Self {
        Self {
            name: None,
            f: Rc::new(f),
        }
    }

    /// A method computing a value from the context, for `{{ key() }}`.
    pub fn computed(f: impl Fn(&Context) -> Value + 'static) -> Self {
        Self::new(move |ctx, _| f(ctx))
    }

    /// A method used as an event handler.
    pub fn handler(f: impl Fn(&Context, &Event) + 'static) -> Self {
        Self::new(move |ctx, event| {
            if let Some(event) = event {
                f(ctx, event);
            }
            Value::Undefined
        })
    }

    pub fn named(mut self, name: impl Into<Rc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn call(&self, ctx: &Context, event: Option<&Event>) -> Value {
        (self.f)(ctx, event)
    }

    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "[method {name}]"),
            None => f.write_str("[method]"),
        }
    }
}

/// A value stored in a [`Context`].
///
/// Its [`Display`](fmt::Display) form is what gets substituted into
/// templates: `Undefined` renders as the empty string.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Method(Method),
}

impl Value {
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => Ok(()),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Method(m) => write!(f, "{m}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}
impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n.into())
    }
}
impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}
impl From<Method> for Value {
    fn from(m: Method) -> Self {
        Value::Method(m)
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Text(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            // Objects have no placeholder form of their own; keep their JSON text.
            obj @ Json::Object(_) => Value::Text(obj.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Value::Undefined.to_string(), "");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "1,2,3");
        assert_eq!(
            Value::from(Method::computed(|_| Value::Null).named("total")).to_string(),
            "[method total]"
        );
    }

    #[test]
    fn json_conversion() {
        let v: Value = serde_json::json!({"n": 1}).into();
        assert_eq!(v, Value::Text(r#"{"n":1}"#.to_string()));
        assert_eq!(Value::from(serde_json::json!(3)), Value::Int(3));
        assert_eq!(Value::from(serde_json::json!(0.5)), Value::Float(0.5));
    }
}
