//! The closed value model the traversal engine is written against.
//!
//! Producers (the serde adapter, hand-written conversions, the CLI) build a
//! `Value` tree; the engine never inspects anything else. Trees own their
//! children, so they are acyclic by construction.

use std::borrow::Cow;
use std::fmt;

/// Kinds of values that have no canonical byte form.
///
/// They are kept in the tree (rather than dropped by producers) so the
/// traversal can count and report them in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnsupportedKind {
    Callable,
    RawPointer,
    Channel,
    /// 128-bit integers; the canonical integer encoding is fixed at 64 bits.
    WideInteger,
    Opaque,
}

impl UnsupportedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UnsupportedKind::Callable => "callable",
            UnsupportedKind::RawPointer => "raw-pointer",
            UnsupportedKind::Channel => "channel",
            UnsupportedKind::WideInteger => "wide-integer",
            UnsupportedKind::Opaque => "opaque",
        }
    }
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named record field. The name is metadata only and never hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Cow<'static, str>,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Any signed integer, sign-extended to 64 bits.
    Int(i64),
    /// Any unsigned or address-sized integer, zero-extended to 64 bits.
    Uint(u64),
    /// Any float, widened to f64.
    Float(f64),
    Complex {
        re: f64,
        im: f64,
    },
    Text(String),
    /// A byte string. Hashes exactly like a `List` of `Uint`s.
    Bytes(Vec<u8>),
    /// Fixed-length sequence (arrays, tuples).
    Array(Vec<Value>),
    /// Variable-length sequence.
    List(Vec<Value>),
    /// Ordered named fields, in declaration order.
    Record {
        name: Cow<'static, str>,
        fields: Vec<Field>,
    },
    /// Key/value pairs in the producer's native iteration order.
    Map(Vec<(Value, Value)>),
    /// Optional or boxed reference; `None` is an absent value.
    Indirect(Option<Box<Value>>),
    Unsupported(UnsupportedKind),
}

impl Value {
    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex { re, im }
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn record<I>(name: impl Into<Cow<'static, str>>, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        Value::Record {
            name: name.into(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Collect pairs in iteration order. Iteration order only reaches the
    /// digest under `MapOrder::Iteration`.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn some(value: impl Into<Value>) -> Self {
        Value::Indirect(Some(Box::new(value.into())))
    }

    pub const fn none() -> Self {
        Value::Indirect(None)
    }

    /// Short kind name, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Complex { .. } => "complex",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Record { .. } => "record",
            Value::Map(_) => "map",
            Value::Indirect(_) => "indirect",
            Value::Unsupported(_) => "unsupported",
        }
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Uint(v as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        Value::Indirect(v.map(|inner| Box::new(inner.into())))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_conversions_widen() {
        assert_eq!(Value::from(-1i8), Value::Int(-1));
        assert_eq!(Value::from(u32::MAX), Value::Uint(u32::MAX as u64));
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
    }

    #[test]
    fn option_maps_to_indirect() {
        assert_eq!(Value::from(None::<i32>), Value::none());
        assert_eq!(Value::from(Some(3u8)), Value::some(3u8));
        assert_eq!(Value::from(Some(None::<u8>)), Value::some(Value::none()));
    }

    #[test]
    fn fixed_arrays_and_vecs_keep_their_kind() {
        assert_eq!(Value::from([1u8, 2]).kind_name(), "array");
        assert_eq!(Value::from(vec!["a", "b"]).kind_name(), "list");
    }
}
