//! Metamethod resolution
//!
//! Resolves `__`-prefixed hooks with a direct walk over object maps and runs
//! them through the executor attached to the defining object. Two guards
//! keep `__get` from feeding on itself: the hook lookup never calls back
//! into the indexer, and a hook that is already running on an object is
//! invisible to nested lookups on that same object: a `__get` body that
//! indexes its own receiver sees a plain miss instead of recursing.

use std::cell::RefCell;

use rustc_hash::FxHashSet;

use crate::exec::WeakState;
use crate::index::check_wrap_function;
use crate::proto::ProtoWalk;
use crate::value::Value;
use crate::{RuntimeError, RuntimeResult};

thread_local! {
    /// Hooks currently executing on this thread, keyed by receiver identity
    /// and metamethod name.
    static ACTIVE: RefCell<FxHashSet<(usize, &'static str)>> =
        RefCell::new(FxHashSet::default());
}

/// Removes its key from [`ACTIVE`] when the hook invocation unwinds.
struct DispatchGuard {
    key: (usize, &'static str),
}

impl DispatchGuard {
    fn enter(key: (usize, &'static str)) -> Self {
        ACTIVE.with(|active| active.borrow_mut().insert(key));
        Self { key }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().remove(&self.key);
        });
    }
}

/// Look up the metamethod `name` on `receiver`'s chain and invoke it.
///
/// Returns `Ok(None)` when the receiver is not an object, no node in the
/// chain defines the hook, or the same hook is already running on this
/// receiver. On a hit, the callable is re-bound to `receiver` (see
/// [`check_wrap_function`]) and run through the executor attached to the
/// node it was found on; a node without an executor is an error, since
/// metamethods cannot run without one.
pub fn try_dispatch(
    receiver: &Value,
    name: &'static str,
    args: &[Value],
) -> RuntimeResult<Option<Value>> {
    let Value::Object(receiver_obj) = receiver else {
        return Ok(None);
    };
    let guard_key = (receiver_obj.as_ptr() as usize, name);
    if ACTIVE.with(|active| active.borrow().contains(&guard_key)) {
        return Ok(None);
    }
    let key = Value::string(name);

    let mut hit: Option<(Value, Option<WeakState>)> = None;
    let mut walk = ProtoWalk::including(receiver);
    while let Some(node) = walk.next_object()? {
        if let Some(found) = node.get_own(&key) {
            hit = Some((found, node.state()));
            break;
        }
    }

    let Some((callable, state)) = hit else {
        return Ok(None);
    };
    let callable = check_wrap_function(callable, receiver);
    let state = state
        .and_then(|weak| weak.upgrade())
        .ok_or(RuntimeError::DetachedState { method: name })?;

    let _guard = DispatchGuard::enter(guard_key);
    state.call(&callable, args).map(Some)
}
