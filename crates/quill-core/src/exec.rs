//! Executor collaboration surface
//!
//! The value core never runs bytecode itself. Metamethods and host callbacks
//! are invoked through the [`Executor`] trait; object records keep a weak
//! back-reference to the executor that owns them so that metamethod lookups
//! know where to run.

use std::sync::{Arc, Weak};

use crate::value::Value;
use crate::RuntimeResult;

/// Collaborator able to invoke function values.
///
/// The bytecode interpreter implements this; tests may substitute a direct
/// caller that only understands native closures.
pub trait Executor: Send + Sync {
    /// Invoke `callee` with `args` and return its result.
    ///
    /// Errors raised by the callee propagate transparently.
    fn call(&self, callee: &Value, args: &[Value]) -> RuntimeResult<Value>;
}

/// Shared handle to an executor.
pub type StateHandle = Arc<dyn Executor>;

/// Non-owning back-reference from object records to their executor.
pub type WeakState = Weak<dyn Executor>;

/// Host function: `(state, args) -> value`.
pub type NativeFn = Arc<dyn Fn(&dyn Executor, &[Value]) -> RuntimeResult<Value> + Send + Sync>;

/// Host function bound to a receiver on retrieval: `(state, receiver, args) -> value`.
pub type InstanceNativeFn =
    Arc<dyn Fn(&dyn Executor, &Value, &[Value]) -> RuntimeResult<Value> + Send + Sync>;
