//! Uniform indexing and assignment
//!
//! `get` and `set` accept any receiver value and key. Arrays take the
//! integer fast path; objects consult their own map, then the prototype
//! chain, then the `__get`/`__set` hooks. Function values of instance-native
//! kind are re-bound to the receiver on every read path, so methods look the
//! same whether they live on the object or a prototype.

use crate::dispatch::try_dispatch;
use crate::object::{ArrayRef, Closure};
use crate::ops::{self, meta};
use crate::proto::ProtoWalk;
use crate::value::Value;
use crate::{RuntimeError, RuntimeResult};

/// Re-bind instance-native functions to the receiver they were read from.
///
/// An instance-native retrieved from an object comes back as a fresh native
/// closure with the receiver captured; every other value passes through
/// unchanged. Fires on the own-field, prototype and `__get` read paths.
pub fn check_wrap_function(value: Value, receiver: &Value) -> Value {
    let Value::Function(func) = &value else {
        return value;
    };
    let Closure::InstanceNative(inner) = &**func else {
        return value;
    };
    let inner = inner.clone();
    let receiver = receiver.clone();
    Value::native(move |state, args| inner(state, &receiver, args))
}

/// Coerce an array key and fold negative indices from the end.
fn array_index(arr: &ArrayRef, key: &Value) -> RuntimeResult<usize> {
    let requested = ops::to_integer(key)?;
    let length = arr.len();
    let mut index = requested;
    if index < 0 {
        index += length as i64;
    }
    if index < 0 || index >= length as i64 {
        return Err(RuntimeError::IndexOutOfBounds {
            index: requested,
            length,
        });
    }
    Ok(index as usize)
}

/// Read `receiver[key]`.
///
/// Missing keys are not an error: the result is `Undefined` once the own
/// map, the prototype chain and `__get` have all passed.
pub fn get(receiver: &Value, key: &Value) -> RuntimeResult<Value> {
    if let Value::Array(arr) = receiver {
        if matches!(key, Value::Number(_) | Value::Object(_)) {
            let index = array_index(arr, key)?;
            return arr.get(index);
        }
    }
    if let Value::Object(obj) = receiver {
        if let Some(own) = obj.get_own(key) {
            return Ok(check_wrap_function(own, receiver));
        }
    }
    let mut walk = ProtoWalk::above(receiver);
    while let Some(node) = walk.next_object()? {
        if let Some(found) = node.get_own(key) {
            return Ok(check_wrap_function(found, receiver));
        }
    }
    if receiver.is_object() {
        if let Some(result) = try_dispatch(receiver, meta::GET, &[receiver.clone(), key.clone()])? {
            return Ok(check_wrap_function(result, receiver));
        }
    }
    Ok(Value::Undefined)
}

/// Write `receiver[key] = value`.
///
/// An existing key is overwritten where it lives: own map first, then the
/// nearest unlocked holder up the chain. A locked holder walls off the walk:
/// the write falls back to a fresh own field on the receiver, hiding the
/// prototype's key without touching it.
pub fn set(receiver: &Value, key: &Value, value: Value) -> RuntimeResult<()> {
    if let Value::Array(arr) = receiver {
        if matches!(key, Value::Number(_) | Value::Object(_)) {
            let index = array_index(arr, key)?;
            return arr.set(index, value);
        }
    }
    if let Value::Object(obj) = receiver {
        if obj.has_own(key) {
            return obj.insert(key.clone(), value);
        }
    }
    let mut walk = ProtoWalk::above(receiver);
    while let Some(node) = walk.next_object()? {
        if node.has_own(key) {
            if node.is_locked() {
                break;
            }
            return node.insert(key.clone(), value);
        }
    }
    let Value::Object(obj) = receiver else {
        return Err(RuntimeError::CantCreateField {
            type_name: receiver.type_name(),
        });
    };
    if obj.is_locked() {
        return Err(RuntimeError::ObjectIsLocked);
    }
    if try_dispatch(
        receiver,
        meta::SET,
        &[receiver.clone(), key.clone(), value.clone()],
    )?
    .is_some()
    {
        return Ok(());
    }
    obj.insert(key.clone(), value)
}
