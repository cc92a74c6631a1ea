//! Universal tagged value
//!
//! `Value` is the pivot of the interpreter: one enum represents every
//! scripting value. Copies are cheap: heap records (objects, arrays,
//! closures) are shared behind reference-counted handles, and equality for
//! those variants is handle identity rather than structural comparison.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::exec::{Executor, StateHandle};
use crate::object::{ArrayRef, Closure, FunctionRef, ObjectRef, ScriptClosure};
use crate::{RuntimeError, RuntimeResult};

/// A Quill value.
///
/// `True` and `False` are two distinct variants rather than a single boolean
/// carrier; equality, hashing and stringification all switch on the full
/// nine-variant set.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence marker; distinct from `Null`.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean true.
    True,
    /// Boolean false.
    False,
    /// IEEE-754 double.
    Number(f64),
    /// Immutable sequence of code points.
    String(Arc<str>),
    /// Shared object record.
    Object(ObjectRef),
    /// Shared array record.
    Array(ArrayRef),
    /// Shared closure.
    Function(FunctionRef),
}

impl Value {
    /// The undefined singleton.
    #[inline]
    pub const fn undefined() -> Self {
        Value::Undefined
    }

    /// The null singleton.
    #[inline]
    pub const fn null() -> Self {
        Value::Null
    }

    /// Boolean value (`True` or `False` variant).
    #[inline]
    pub const fn bool(b: bool) -> Self {
        if b {
            Value::True
        } else {
            Value::False
        }
    }

    /// Number value.
    #[inline]
    pub const fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// String value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// String value from an optional payload.
    ///
    /// Hosts crossing an FFI boundary may hold a nullable string; an absent
    /// payload is an argument error, not a valid value.
    pub fn string_required(s: Option<&str>) -> RuntimeResult<Self> {
        match s {
            Some(s) => Ok(Value::string(s)),
            None => Err(RuntimeError::MissingArgument { name: "value" }),
        }
    }

    /// Fresh empty object.
    pub fn object() -> Self {
        Value::Object(ObjectRef::new())
    }

    /// Fresh array holding `items`.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(items))
    }

    /// Function value wrapping an existing closure.
    pub fn function(closure: Closure) -> Self {
        Value::Function(Arc::new(closure))
    }

    /// Function value for a host function taking `(state, args)`.
    pub fn native<F>(f: F) -> Self
    where
        F: Fn(&dyn Executor, &[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        Value::function(Closure::Native(Arc::new(f)))
    }

    /// Function value for a host function taking `(state, receiver, args)`.
    ///
    /// When retrieved from an object, the function is transparently bound to
    /// that object; see [`crate::index::check_wrap_function`].
    pub fn instance_native<F>(f: F) -> Self
    where
        F: Fn(&dyn Executor, &Value, &[Value]) -> RuntimeResult<Value> + Send + Sync + 'static,
    {
        Value::function(Closure::InstanceNative(Arc::new(f)))
    }

    /// Function value for a compiled script function.
    pub fn script(func_id: usize, captures: Vec<Value>) -> Self {
        Value::function(Closure::Script(ScriptClosure { func_id, captures }))
    }

    /// Variant name, used in error messages and stringification fallbacks.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::True | Value::False => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
        }
    }

    /// True for everything except `Undefined`, `Null`, `False` and NaN.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null | Value::False => false,
            Value::Number(n) => !n.is_nan(),
            _ => true,
        }
    }

    /// Check for the `Undefined` variant.
    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check for the `Null` variant.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check for either boolean variant.
    #[inline]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Value::True | Value::False)
    }

    /// Check for the `Number` variant.
    #[inline]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Check for the `String` variant.
    #[inline]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check for the `Object` variant.
    #[inline]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check for the `Array` variant.
    #[inline]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Check for the `Function` variant.
    #[inline]
    pub const fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Whether the value can be passed to an executor's `call`.
    #[inline]
    pub const fn is_callable(&self) -> bool {
        self.is_function()
    }

    /// Extract a boolean.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::True => Some(true),
            Value::False => Some(false),
            _ => None,
        }
    }

    /// Extract a number.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow the string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the object handle.
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the array handle.
    pub const fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Borrow the function handle.
    pub const fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Live handle to the underlying object map, for host iteration.
    pub fn as_dictionary(&self) -> RuntimeResult<ObjectRef> {
        match self {
            Value::Object(obj) => Ok(obj.clone()),
            other => Err(RuntimeError::WrongType {
                expected: "object",
                actual: other.type_name(),
            }),
        }
    }

    /// Live handle to the underlying array list, for host iteration.
    pub fn as_list(&self) -> RuntimeResult<ArrayRef> {
        match self {
            Value::Array(arr) => Ok(arr.clone()),
            other => Err(RuntimeError::WrongType {
                expected: "array",
                actual: other.type_name(),
            }),
        }
    }

    /// Lock an object against further mutation. Locking is monotonic; a
    /// second lock is a no-op.
    pub fn lock(&self) -> RuntimeResult<()> {
        let obj = self.require_object()?;
        obj.lock();
        Ok(())
    }

    /// Read the opaque host payload of an object.
    pub fn user_data(&self) -> RuntimeResult<Option<Arc<dyn Any + Send + Sync>>> {
        Ok(self.require_object()?.user_data())
    }

    /// Attach or clear the opaque host payload of an object.
    ///
    /// User data is host-side bookkeeping, not script state; the lock flag
    /// does not apply to it.
    pub fn set_user_data(&self, data: Option<Arc<dyn Any + Send + Sync>>) -> RuntimeResult<()> {
        self.require_object()?.set_user_data(data);
        Ok(())
    }

    /// Attach the executor back-reference used to run this object's
    /// metamethods. Stored weakly; the record never keeps its executor alive.
    pub fn attach_state(&self, state: &StateHandle) -> RuntimeResult<()> {
        self.require_object()?.set_state(Arc::downgrade(state));
        Ok(())
    }

    fn require_object(&self) -> RuntimeResult<&ObjectRef> {
        self.as_object().ok_or(RuntimeError::WrongType {
            expected: "object",
            actual: self.type_name(),
        })
    }
}

impl PartialEq for Value {
    /// Strict, non-dispatching equality: singletons by variant, numbers and
    /// strings by value (`NaN != NaN`), objects/arrays/functions by handle
    /// identity. `__eq` overrides live in [`crate::ops::value_eq`].
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::True, Value::True) => true,
            (Value::False, Value::False) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => ObjectRef::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => ArrayRef::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Non-dispatching rendering. `__string` routing lives in
    /// [`crate::ops::to_display_string`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::True => write!(f, "true"),
            Value::False => write!(f, "false"),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(_) => write!(f, "object"),
            Value::Array(_) => write!(f, "array"),
            Value::Function(_) => write!(f, "function"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::True => write!(f, "true"),
            Value::False => write!(f, "false"),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Object(obj) => write!(f, "object({} entries)", obj.len()),
            Value::Array(arr) => write!(f, "array({} items)", arr.len()),
            Value::Function(func) => write!(f, "function({})", func.kind()),
        }
    }
}

// Conversions from Rust types

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
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

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}
