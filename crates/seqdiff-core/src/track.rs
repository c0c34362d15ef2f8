#![forbid(unsafe_code)]

//! Track-by strategies: when are two observed items the same slot?
//!
//! The differ never compares items directly. It asks a [`TrackBy`] strategy
//! for a hashable key per item and compares keys, so duplicate lookup and
//! positional matching share one equality rule.
//!
//! | Strategy           | Items            | Rule                                   |
//! |--------------------|------------------|----------------------------------------|
//! | [`ValueIdentity`]  | [`Value`]        | value for scalars, identity otherwise  |
//! | [`ByValue`]        | `T: Hash + Eq`   | `T`'s own equality                     |
//! | [`TrackByFn`]      | any `T`          | caller supplied key function           |

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::value::Value;

/// Maps an item to the key that identifies its logical slot.
pub trait TrackBy<T> {
    /// Key type stored alongside each tracked record.
    type Key: Hash + Eq + Clone;

    /// Key for `item`.
    fn track_key(&self, item: &T) -> Self::Key;
}

/// Normalized identity of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackKey {
    /// `null`.
    Null,
    /// Boolean by value.
    Bool(bool),
    /// Number by canonical bit pattern.
    Number(u64),
    /// String by content.
    Str(Arc<str>),
    /// Reference identity of a list, map, or object.
    Ref(RefKey),
}

impl TrackKey {
    /// Canonical key for a number: every `NaN` maps to one key and `-0.0`
    /// maps to `0.0`.
    #[must_use]
    pub fn number(n: f64) -> Self {
        let bits = if n.is_nan() {
            f64::NAN.to_bits()
        } else if n == 0.0 {
            0
        } else {
            n.to_bits()
        };
        Self::Number(bits)
    }
}

/// Identity of a shared [`Value`], compared and hashed by allocation address.
///
/// The key holds a handle to the value, so the address cannot be handed to
/// another allocation while the key is alive.
#[derive(Clone)]
pub struct RefKey(Value);

impl RefKey {
    pub(crate) fn new(value: Value) -> Self {
        Self(value)
    }

    /// Address of the shared allocation.
    #[must_use]
    pub fn addr(&self) -> usize {
        self.0.shared_addr().unwrap_or(0)
    }
}

impl PartialEq for RefKey {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for RefKey {}

impl Hash for RefKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.0.kind(), self.addr())
    }
}

/// Default strategy for [`Value`] items.
///
/// Scalars and strings are tracked by value so that an equal string rebuilt
/// between passes keeps its slot. Lists, maps and objects are tracked by
/// identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueIdentity;

impl TrackBy<Value> for ValueIdentity {
    type Key = TrackKey;

    fn track_key(&self, item: &Value) -> TrackKey {
        item.track_key()
    }
}

/// Track typed items by their own `Eq`/`Hash`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByValue;

impl<T: Hash + Eq + Clone> TrackBy<T> for ByValue {
    type Key = T;

    fn track_key(&self, item: &T) -> T {
        item.clone()
    }
}

/// Track items by a caller supplied key function, such as a row id.
///
/// ```
/// use seqdiff_core::{TrackBy, TrackByFn};
///
/// struct Row { id: u32, title: &'static str }
/// let by_id = TrackByFn::new(|row: &Row| row.id);
/// assert_eq!(by_id.track_key(&Row { id: 7, title: "x" }), 7);
/// ```
#[derive(Clone, Copy)]
pub struct TrackByFn<F>(F);

impl<F> TrackByFn<F> {
    /// Wrap a key function.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T, K, F> TrackBy<T> for TrackByFn<F>
where
    F: Fn(&T) -> K,
    K: Hash + Eq + Clone,
{
    type Key = K;

    fn track_key(&self, item: &T) -> K {
        (self.0)(item)
    }
}

impl<F> fmt::Debug for TrackByFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrackByFn(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectRef;

    #[test]
    fn nan_keys_collapse() {
        let quiet = f64::NAN;
        let negative = -f64::NAN;
        assert_eq!(TrackKey::number(quiet), TrackKey::number(negative));
        assert_ne!(TrackKey::number(1.0), TrackKey::number(quiet));
    }

    #[test]
    fn signed_zero_collapses() {
        assert_eq!(TrackKey::number(0.0), TrackKey::number(-0.0));
    }

    #[test]
    fn value_identity_tracks_objects_by_reference() {
        let a = ObjectRef::new("a");
        let other = ObjectRef::new("a");
        let strategy = ValueIdentity;
        let k1 = strategy.track_key(&Value::from(a.clone()));
        let k2 = strategy.track_key(&Value::from(a.clone()));
        let k3 = strategy.track_key(&Value::from(other.clone()));
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
    }

    #[test]
    fn ref_key_keeps_its_allocation_alive() {
        // Each object is dropped as soon as its key is built; the key alone
        // must keep the address from being reused.
        let k1 = ValueIdentity.track_key(&Value::from(ObjectRef::new("a")));
        let k2 = ValueIdentity.track_key(&Value::from(ObjectRef::new("b")));
        assert_ne!(k1, k2);

        let l1 = ValueIdentity.track_key(&Value::list([1]));
        let l2 = ValueIdentity.track_key(&Value::list([1]));
        assert_ne!(l1, l2);
    }

    #[test]
    fn ref_key_debug_names_kind() {
        let key = ValueIdentity.track_key(&Value::map([("k", 1)]));
        assert!(format!("{key:?}").starts_with("Ref(map@0x"));
    }

    #[test]
    fn value_identity_tracks_strings_by_content() {
        let strategy = ValueIdentity;
        assert_eq!(
            strategy.track_key(&Value::from("boo")),
            strategy.track_key(&Value::from(String::from("boo")))
        );
    }

    #[test]
    fn by_value_uses_item_equality() {
        assert_eq!(ByValue.track_key(&"a"), "a");
        assert_eq!(TrackBy::<u8>::track_key(&ByValue, &3), 3);
    }

    #[test]
    fn track_by_fn_applies_closure() {
        let by_len = TrackByFn::new(|s: &String| s.len());
        assert_eq!(by_len.track_key(&"four".to_string()), 4);
    }
}
