#![forbid(unsafe_code)]

//! Dynamic values produced by a bound expression.
//!
//! [`Value`] models what a list binding can evaluate to: scalars, strings,
//! ordered lists, keyed maps, and opaque objects. Only lists (and null,
//! treated as an empty list) are diffable; the rest exist so that a differ
//! can reject them with a useful rendering.
//!
//! # Equality
//!
//! `PartialEq` follows the tracking rule used by the differ: scalars and
//! strings compare by value (with `NaN == NaN` and `-0.0 == 0.0`), lists,
//! maps and objects compare by identity.
//!
//! ```
//! use seqdiff_core::{ObjectRef, Value};
//!
//! assert_eq!(Value::from("boo"), Value::from(String::from("b") + "oo"));
//! assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
//!
//! let obj = ObjectRef::new("row");
//! assert_eq!(Value::from(obj.clone()), Value::from(obj));
//! assert_ne!(Value::from(ObjectRef::new("row")), Value::from(ObjectRef::new("row")));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::track::{RefKey, TrackKey};

/// A value observed by a list binding.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value; diffed as an empty sequence.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar.
    Number(f64),
    /// String, compared by content.
    Str(Arc<str>),
    /// Ordered sequence, compared by identity.
    List(Arc<[Value]>),
    /// Keyed mapping, compared by identity. Never diffable as a sequence.
    Map(Arc<[(Value, Value)]>),
    /// Opaque object, compared by identity.
    Object(ObjectRef),
}

impl Value {
    /// Build a list value from any sequence of convertible items.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `true` for [`Value::List`].
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The items of a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the value's kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// Key under which the differ tracks this value.
    #[must_use]
    pub fn track_key(&self) -> TrackKey {
        match self {
            Self::Null => TrackKey::Null,
            Self::Bool(b) => TrackKey::Bool(*b),
            Self::Number(n) => TrackKey::number(*n),
            Self::Str(s) => TrackKey::Str(Arc::clone(s)),
            Self::List(_) | Self::Map(_) | Self::Object(_) => {
                TrackKey::Ref(RefKey::new(self.clone()))
            }
        }
    }

    /// Allocation address of a list, map, or object.
    pub(crate) fn shared_addr(&self) -> Option<usize> {
        match self {
            Self::List(items) => Some(Arc::as_ptr(items).cast::<()>() as usize),
            Self::Map(entries) => Some(Arc::as_ptr(entries).cast::<()>() as usize),
            Self::Object(obj) => Some(obj.addr()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.track_key() == other.track_key()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(Arc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<V: Into<Value>> FromIterator<V> for Value {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::list(iter)
    }
}

/// Renders numbers the way a script engine prints them: integral values
/// without a fraction, `NaN`, and `Infinity`.
struct Number(f64);

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n.is_nan() {
            f.write_str("NaN")
        } else if n.is_infinite() {
            f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
        } else if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
            write!(f, "{}", n as i64)
        } else {
            write!(f, "{n}")
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", Number(*n)),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Map(_) => f.write_str("[object Map]"),
            Self::Object(obj) => f.write_str(obj.label()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({})", Number(*n)),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::List(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Map(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            Self::Object(obj) => write!(f, "{obj:?}"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Str(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(&k.to_string(), v)?;
                }
                map.end()
            }
            Self::Object(obj) => serializer.serialize_str(obj.label()),
        }
    }
}

/// Shared handle to an opaque object, compared by identity.
///
/// Clones share identity; two handles built with [`ObjectRef::new`] never
/// do, even with the same label.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

struct ObjectData {
    label: String,
}

impl ObjectRef {
    /// Create a new object with a display label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(Arc::new(ObjectData {
            label: label.into(),
        }))
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    /// `true` when both handles point at the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared allocation; stable while any handle is alive.
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:?}@{:#x})", self.label(), self.addr())
    }
}
