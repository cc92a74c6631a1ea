//! Object, array and closure records
//!
//! Heap records are shared through reference-counted handles; a `Value`
//! holding one of these is a cheap copy. Records are mutated in place through
//! the handle, so identity (not structure) is what equality and hashing see.
//!
//! Reference cycles through `prototype` or nested containers are possible
//! and are not collected.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use rustc_hash::FxBuildHasher;

use crate::exec::{InstanceNativeFn, NativeFn, WeakState};
use crate::value::Value;
use crate::{RuntimeError, RuntimeResult};

/// Insertion-ordered property storage.
pub type PropertyMap = IndexMap<ValueKey, Value, FxBuildHasher>;

/// Map-key wrapper giving `Value` the `Hash`/`Eq` contract.
///
/// Key equality follows value equality with two reflexivity fixes the map
/// contract requires: NaN keys equal each other, and `-0.0` folds onto
/// `0.0`. Handle variants hash and compare by identity.
#[derive(Debug, Clone)]
pub struct ValueKey(Value);

impl ValueKey {
    /// Wrap a value for use as a property key.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying value.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwrap back into a value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Number(a), Value::Number(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (a, b) => a == b,
        }
    }
}

impl Eq for ValueKey {}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Undefined => state.write_u8(0),
            Value::Null => state.write_u8(1),
            Value::True => state.write_u8(2),
            Value::False => state.write_u8(3),
            Value::Number(n) => {
                state.write_u8(4);
                // canonical bits: one NaN, one zero
                let bits = if n.is_nan() {
                    f64::NAN.to_bits()
                } else if *n == 0.0 {
                    0
                } else {
                    n.to_bits()
                };
                state.write_u64(bits);
            }
            Value::String(s) => {
                state.write_u8(5);
                s.hash(state);
            }
            Value::Object(obj) => {
                state.write_u8(6);
                state.write_usize(obj.as_ptr() as usize);
            }
            Value::Array(arr) => {
                state.write_u8(7);
                state.write_usize(arr.as_ptr() as usize);
            }
            Value::Function(func) => {
                state.write_u8(8);
                state.write_usize(Arc::as_ptr(func) as usize);
            }
        }
    }
}

/// Backing storage for an object value.
pub struct ObjectRecord {
    /// Property map, insertion-ordered for enumeration.
    values: PropertyMap,
    /// Explicit prototype link; `None` means the implicit default applies.
    prototype: Option<Value>,
    /// Monotonic lock flag; once set it never clears.
    locked: bool,
    /// Back-reference to the executor that runs this object's metamethods.
    state: Option<WeakState>,
    /// Opaque host payload, never interpreted by the core.
    user_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl ObjectRecord {
    fn new() -> Self {
        Self {
            values: PropertyMap::default(),
            prototype: None,
            locked: false,
            state: None,
            user_data: None,
        }
    }
}

impl fmt::Debug for ObjectRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRecord")
            .field("entries", &self.values.len())
            .field("locked", &self.locked)
            .field("has_prototype", &self.prototype.is_some())
            .finish()
    }
}

/// Shared handle to an [`ObjectRecord`].
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<ObjectRecord>>);

impl ObjectRef {
    /// Allocate a fresh empty object.
    pub fn new() -> Self {
        Self(Arc::new(RwLock::new(ObjectRecord::new())))
    }

    /// Handle identity.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }

    /// Number of own properties.
    pub fn len(&self) -> usize {
        self.0.read().values.len()
    }

    /// Whether the object has no own properties.
    pub fn is_empty(&self) -> bool {
        self.0.read().values.is_empty()
    }

    /// Own-property lookup; never consults the prototype chain.
    pub fn get_own(&self, key: &Value) -> Option<Value> {
        self.0.read().values.get(&ValueKey::new(key.clone())).cloned()
    }

    /// Own-key presence test.
    pub fn has_own(&self, key: &Value) -> bool {
        self.0.read().values.contains_key(&ValueKey::new(key.clone()))
    }

    /// Insert or overwrite an own property. Overwrites keep the key's
    /// original enumeration position.
    pub fn insert(&self, key: Value, value: Value) -> RuntimeResult<()> {
        let mut record = self.0.write();
        if record.locked {
            return Err(RuntimeError::ObjectIsLocked);
        }
        record.values.insert(ValueKey::new(key), value);
        Ok(())
    }

    /// Remove an own property, preserving the order of the rest.
    pub fn remove(&self, key: &Value) -> RuntimeResult<Option<Value>> {
        let mut record = self.0.write();
        if record.locked {
            return Err(RuntimeError::ObjectIsLocked);
        }
        Ok(record.values.shift_remove(&ValueKey::new(key.clone())))
    }

    /// Own keys in insertion order.
    pub fn keys(&self) -> Vec<Value> {
        self.0
            .read()
            .values
            .keys()
            .map(|k| k.value().clone())
            .collect()
    }

    /// Own entries in insertion order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0
            .read()
            .values
            .iter()
            .map(|(k, v)| (k.value().clone(), v.clone()))
            .collect()
    }

    /// Read guard over the raw property map, for host iteration.
    pub fn borrow_values(&self) -> MappedRwLockReadGuard<'_, PropertyMap> {
        RwLockReadGuard::map(self.0.read(), |record| &record.values)
    }

    /// Explicit prototype link, if one was assigned.
    pub fn prototype(&self) -> Option<Value> {
        self.0.read().prototype.clone()
    }

    pub(crate) fn set_prototype_raw(&self, prototype: Option<Value>) {
        self.0.write().prototype = prototype;
    }

    /// Set the lock flag. Locking is monotonic and idempotent.
    pub fn lock(&self) {
        self.0.write().locked = true;
    }

    /// Whether the object is locked.
    pub fn is_locked(&self) -> bool {
        self.0.read().locked
    }

    /// Executor back-reference, if attached.
    pub fn state(&self) -> Option<WeakState> {
        self.0.read().state.clone()
    }

    /// Attach the executor back-reference. Not covered by the lock flag: the
    /// shared prototypes are locked at startup yet still need a state before
    /// their metamethods can run.
    pub fn set_state(&self, state: WeakState) {
        self.0.write().state = Some(state);
    }

    /// Opaque host payload.
    pub fn user_data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.0.read().user_data.clone()
    }

    /// Attach or clear the opaque host payload.
    pub fn set_user_data(&self, data: Option<Arc<dyn Any + Send + Sync>>) {
        self.0.write().user_data = data;
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0.read())
    }
}

/// Shared handle to an array record.
#[derive(Clone)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    /// Allocate an array holding `items`.
    pub fn new(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    /// Handle identity.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Bounds-checked element read.
    pub fn get(&self, index: usize) -> RuntimeResult<Value> {
        let items = self.0.read();
        items
            .get(index)
            .cloned()
            .ok_or(RuntimeError::IndexOutOfBounds {
                index: index as i64,
                length: items.len(),
            })
    }

    /// Bounds-checked element write.
    pub fn set(&self, index: usize, value: Value) -> RuntimeResult<()> {
        let mut items = self.0.write();
        let length = items.len();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::IndexOutOfBounds {
                index: index as i64,
                length,
            }),
        }
    }

    /// Append an element; returns the new length.
    pub fn push(&self, value: Value) -> usize {
        let mut items = self.0.write();
        items.push(value);
        items.len()
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Option<Value> {
        self.0.write().pop()
    }

    /// Position of the first element strictly equal to `value`.
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.0.read().iter().position(|item| item == value)
    }

    /// Strict-equality membership test.
    pub fn includes(&self, value: &Value) -> bool {
        self.index_of(value).is_some()
    }

    /// Snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// Read guard over the raw element list, for host iteration.
    pub fn borrow(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.read()
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayRef({} items)", self.len())
    }
}

/// Callable bundle behind a function value.
pub enum Closure {
    /// Compiled script function plus captured environment.
    Script(ScriptClosure),
    /// Host function taking `(state, args)`.
    Native(NativeFn),
    /// Host function taking `(state, receiver, args)`; transparently bound
    /// to its receiver each time it is read off an object.
    InstanceNative(InstanceNativeFn),
}

/// Compiled function reference with captured values.
///
/// The function table lives in the executor; the core only carries the id.
/// Mutable capture cells are the executor's concern.
#[derive(Debug, Clone)]
pub struct ScriptClosure {
    /// Index into the executor's function table.
    pub func_id: usize,
    /// Captured variable values.
    pub captures: Vec<Value>,
}

/// Shared handle to a [`Closure`].
pub type FunctionRef = Arc<Closure>;

impl Closure {
    /// Closure kind name, for debugging and error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Closure::Script(_) => "script",
            Closure::Native(_) => "native",
            Closure::InstanceNative(_) => "instance-native",
        }
    }

    /// Borrow the script payload.
    pub const fn as_script(&self) -> Option<&ScriptClosure> {
        match self {
            Closure::Script(script) => Some(script),
            _ => None,
        }
    }

    /// Borrow the native function.
    pub const fn as_native(&self) -> Option<&NativeFn> {
        match self {
            Closure::Native(f) => Some(f),
            _ => None,
        }
    }

    /// Borrow the instance-native function.
    pub const fn as_instance_native(&self) -> Option<&InstanceNativeFn> {
        match self {
            Closure::InstanceNative(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Closure::Script(script) => f
                .debug_struct("Script")
                .field("func_id", &script.func_id)
                .field("captures", &script.captures.len())
                .finish(),
            Closure::Native(_) => write!(f, "Native"),
            Closure::InstanceNative(_) => write!(f, "InstanceNative"),
        }
    }
}
