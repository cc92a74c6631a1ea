//! Dispatched operators
//!
//! Equality, ordering, hashing, stringification, containment and integer
//! coercion. Each operator consults the matching metamethod on object
//! receivers and falls back to the primitive rule otherwise.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::dispatch::try_dispatch;
use crate::value::Value;
use crate::{RuntimeError, RuntimeResult};

/// Metamethod names consulted by the core operators.
pub mod meta {
    /// Missed-read hook `(receiver, key)`.
    pub const GET: &str = "__get";
    /// Missed-write hook `(receiver, key, value)`.
    pub const SET: &str = "__set";
    /// Slice hook `(receiver, start, end, step)`.
    pub const SLICE: &str = "__slice";
    /// Containment hook `(receiver, needle)`.
    pub const IN: &str = "__in";
    /// Equality hook `(receiver, other)`.
    pub const EQ: &str = "__eq";
    /// Greater-than hook `(receiver, other)`.
    pub const GT: &str = "__gt";
    /// Hash hook `(receiver)`; must return a number.
    pub const HASH: &str = "__hash";
    /// Stringification hook `(receiver)`; must return a string.
    pub const STRING: &str = "__string";
    /// Numeric coercion hook `(receiver)`; must return a number.
    pub const NUMBER: &str = "__number";
}

/// Truncating integer coercion.
///
/// Numbers truncate toward zero. Objects go through `__number`; anything
/// else has no numeric meaning.
pub fn to_integer(value: &Value) -> RuntimeResult<i64> {
    match value {
        Value::Number(n) => Ok(n.trunc() as i64),
        Value::Object(_) => match try_dispatch(value, meta::NUMBER, &[value.clone()])? {
            Some(Value::Number(n)) => Ok(n.trunc() as i64),
            Some(other) => Err(RuntimeError::NumberCastWrongType {
                actual: other.type_name(),
            }),
            None => Err(RuntimeError::NumberCastWrongType {
                actual: value.type_name(),
            }),
        },
        other => Err(RuntimeError::NumberCastWrongType {
            actual: other.type_name(),
        }),
    }
}

/// Dispatched equality.
///
/// `__eq` on an object operand overrides the default; otherwise equality is
/// strict (see [`Value::eq`]): handles by identity, primitives by value,
/// `NaN != NaN`.
pub fn value_eq(left: &Value, right: &Value) -> RuntimeResult<bool> {
    if left.is_object() {
        if let Some(result) = try_dispatch(left, meta::EQ, &[left.clone(), right.clone()])? {
            return Ok(result.is_truthy());
        }
    }
    if right.is_object() {
        if let Some(result) = try_dispatch(right, meta::EQ, &[right.clone(), left.clone()])? {
            return Ok(result.is_truthy());
        }
    }
    Ok(left == right)
}

/// Three-way comparison: equality first, then the `>` rule.
pub fn compare(left: &Value, right: &Value) -> RuntimeResult<Ordering> {
    if value_eq(left, right)? {
        return Ok(Ordering::Equal);
    }
    if greater_than(left, right)? {
        Ok(Ordering::Greater)
    } else {
        Ok(Ordering::Less)
    }
}

fn greater_than(left: &Value, right: &Value) -> RuntimeResult<bool> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a > b),
        (Value::String(a), Value::String(b)) => Ok(a > b),
        _ => {
            if left.is_object() {
                if let Some(result) = try_dispatch(left, meta::GT, &[left.clone(), right.clone()])?
                {
                    return Ok(result.is_truthy());
                }
            }
            Err(RuntimeError::CantUseOperatorOnTypes {
                op: ">",
                left: left.type_name(),
                right: right.type_name(),
            })
        }
    }
}

/// Containment (`needle in receiver`).
///
/// Strings test for substrings, arrays for an equal element, objects for
/// own-key presence with an `__in` fallback. A missing `__in` is a plain
/// miss, mirroring the read path.
pub fn contains(receiver: &Value, needle: &Value) -> RuntimeResult<bool> {
    match receiver {
        Value::String(haystack) => {
            let Value::String(sub) = needle else {
                return Err(RuntimeError::CantUseOperatorOnTypes {
                    op: "in",
                    left: needle.type_name(),
                    right: receiver.type_name(),
                });
            };
            Ok(haystack.contains(&**sub))
        }
        Value::Array(arr) => {
            for item in arr.to_vec() {
                if value_eq(&item, needle)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Object(obj) => {
            if obj.has_own(needle) {
                return Ok(true);
            }
            match try_dispatch(receiver, meta::IN, &[receiver.clone(), needle.clone()])? {
                Some(result) => Ok(result.is_truthy()),
                None => Ok(false),
            }
        }
        other => Err(RuntimeError::CantUseOperatorOnTypes {
            op: "in",
            left: needle.type_name(),
            right: other.type_name(),
        }),
    }
}

/// Script-visible hash.
///
/// Primitives hash their payloads; objects may override through `__hash`
/// (which must return a number); arrays, functions and hook-less objects
/// hash their handle identity. Not stable across processes.
pub fn value_hash(value: &Value) -> RuntimeResult<u64> {
    let mut hasher = FxHasher::default();
    match value {
        Value::Undefined => 0u8.hash(&mut hasher),
        Value::Null => 1u8.hash(&mut hasher),
        Value::True => 2u8.hash(&mut hasher),
        Value::False => 3u8.hash(&mut hasher),
        Value::Number(n) => n.to_bits().hash(&mut hasher),
        Value::String(s) => s.hash(&mut hasher),
        Value::Object(obj) => match try_dispatch(value, meta::HASH, &[value.clone()])? {
            Some(Value::Number(n)) => return Ok(n.trunc() as i64 as u64),
            Some(other) => {
                return Err(RuntimeError::HashWrongType {
                    actual: other.type_name(),
                })
            }
            None => (obj.as_ptr() as usize).hash(&mut hasher),
        },
        Value::Array(arr) => (arr.as_ptr() as usize).hash(&mut hasher),
        Value::Function(func) => (Arc::as_ptr(func) as usize).hash(&mut hasher),
    }
    Ok(hasher.finish())
}

/// Script-visible stringification.
///
/// Booleans render `"true"`/`"false"`, numbers use round-trip decimal,
/// objects go through `__string` (which must return a string) or fall back
/// to the literal `"object"`; the remaining variants render their names.
pub fn to_display_string(value: &Value) -> RuntimeResult<String> {
    match value {
        Value::Undefined => Ok("undefined".to_string()),
        Value::Null => Ok("null".to_string()),
        Value::True => Ok("true".to_string()),
        Value::False => Ok("false".to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.to_string()),
        Value::Object(_) => match try_dispatch(value, meta::STRING, &[value.clone()])? {
            Some(Value::String(s)) => Ok(s.to_string()),
            Some(other) => Err(RuntimeError::StringCastWrongType {
                actual: other.type_name(),
            }),
            None => Ok("object".to_string()),
        },
        Value::Array(_) => Ok("array".to_string()),
        Value::Function(_) => Ok("function".to_string()),
    }
}
