//! Shared test executor
//!
//! The value core only needs `call` from its executor; this one runs native
//! closures directly and rejects everything else, which is all the
//! metamethod and auto-binding paths require.

use std::sync::Arc;

use quill_core::{Closure, Executor, RuntimeError, RuntimeResult, StateHandle, Value};

/// Executor that invokes native closures in place.
pub struct DirectExecutor;

impl Executor for DirectExecutor {
    fn call(&self, callee: &Value, args: &[Value]) -> RuntimeResult<Value> {
        let func = callee.as_function().ok_or(RuntimeError::WrongType {
            expected: "function",
            actual: callee.type_name(),
        })?;
        match &**func {
            Closure::Native(f) => f(self, args),
            // instance-natives must arrive pre-bound; script closures need a
            // real interpreter
            Closure::InstanceNative(_) | Closure::Script(_) => Err(RuntimeError::WrongType {
                expected: "native function",
                actual: "function",
            }),
        }
    }
}

/// Fresh executor handle.
pub fn executor() -> StateHandle {
    Arc::new(DirectExecutor)
}

/// Fresh object with the executor back-reference attached.
pub fn stateful_object(state: &StateHandle) -> Value {
    let obj = Value::object();
    obj.attach_state(state).unwrap();
    obj
}
