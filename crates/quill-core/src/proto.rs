//! Process-wide prototype registry and prototype accessor
//!
//! Six shared prototype objects back every non-object value: missed lookups
//! on a number fall through to `NumberPrototype`, and so on. The registry is
//! built bottom-up on first use, `ValuePrototype` first and everything else
//! linking to it, then locked for the rest of the process.

use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::object::ObjectRef;
use crate::value::Value;
use crate::{RuntimeError, RuntimeResult};

/// Maximum number of links a prototype walk may traverse.
///
/// The cap doubles as the cycle detector: a chain that loops never ends, so
/// any walk past this depth reports [`RuntimeError::CircularPrototype`]
/// whether or not an actual cycle exists.
pub const PROTO_DEPTH_LIMIT: usize = 100;

/// One-shot hook run while the shared prototypes are still unlocked.
type SeedFn = Box<dyn FnOnce(&Prototypes) + Send>;

static SEED: Mutex<Option<SeedFn>> = Mutex::new(None);
static GLOBAL: OnceLock<Prototypes> = OnceLock::new();

/// The six process-wide prototype objects.
///
/// All six are locked objects. `object` links to `value`; the other four
/// link to `value` directly.
pub struct Prototypes {
    /// Root of the prototype graph; implicit prototype of the singletons.
    pub value: Value,
    /// Implicit prototype of objects without an explicit link.
    pub object: Value,
    /// Implicit prototype of arrays.
    pub array: Value,
    /// Implicit prototype of numbers.
    pub number: Value,
    /// Implicit prototype of strings.
    pub string: Value,
    /// Implicit prototype of functions.
    pub function: Value,
}

impl Prototypes {
    /// Shared registry, built and locked on first access.
    pub fn global() -> &'static Prototypes {
        GLOBAL.get_or_init(Prototypes::bootstrap)
    }

    /// Register a hook that populates the prototypes before they are locked.
    ///
    /// The standard library installs its method tables this way. Returns
    /// `false` if the registry was already built, in which case the hook is
    /// dropped unrun.
    pub fn seed(hook: SeedFn) -> bool {
        if GLOBAL.get().is_some() {
            return false;
        }
        *SEED.lock() = Some(hook);
        true
    }

    fn bootstrap() -> Self {
        let value = ObjectRef::new();
        let object = ObjectRef::new();
        let array = ObjectRef::new();
        let number = ObjectRef::new();
        let string = ObjectRef::new();
        let function = ObjectRef::new();

        let root = Value::Object(value.clone());
        for child in [&object, &array, &number, &string, &function] {
            child.set_prototype_raw(Some(root.clone()));
        }

        let protos = Prototypes {
            value: root,
            object: Value::Object(object.clone()),
            array: Value::Object(array.clone()),
            number: Value::Object(number.clone()),
            string: Value::Object(string.clone()),
            function: Value::Object(function.clone()),
        };

        if let Some(hook) = SEED.lock().take() {
            hook(&protos);
        }

        for proto in [&value, &object, &array, &number, &string, &function] {
            proto.lock();
        }
        protos
    }
}

/// Effective prototype of a value.
///
/// Objects report their explicit link, falling back to `ObjectPrototype`;
/// every other variant reports its registry prototype.
pub fn prototype_of(value: &Value) -> Value {
    let protos = Prototypes::global();
    match value {
        Value::Object(obj) => obj
            .prototype()
            .unwrap_or_else(|| protos.object.clone()),
        Value::Array(_) => protos.array.clone(),
        Value::Number(_) => protos.number.clone(),
        Value::String(_) => protos.string.clone(),
        Value::Function(_) => protos.function.clone(),
        Value::Undefined | Value::Null | Value::True | Value::False => protos.value.clone(),
    }
}

/// Assign `proto` as `target`'s prototype.
///
/// Only object receivers accept a prototype. `Undefined` clears the explicit
/// link (the implicit default applies again); `Null` pins the link to
/// `ValuePrototype`; any other non-object is a type error.
pub fn set_prototype(target: &Value, proto: &Value) -> RuntimeResult<()> {
    let Value::Object(obj) = target else {
        return Err(RuntimeError::WrongType {
            expected: "object",
            actual: target.type_name(),
        });
    };
    if obj.is_locked() {
        return Err(RuntimeError::ObjectIsLocked);
    }
    match proto {
        Value::Undefined => obj.set_prototype_raw(None),
        Value::Null => obj.set_prototype_raw(Some(Prototypes::global().value.clone())),
        Value::Object(_) => obj.set_prototype_raw(Some(proto.clone())),
        other => {
            return Err(RuntimeError::WrongType {
                expected: "object, null or undefined",
                actual: other.type_name(),
            })
        }
    }
    Ok(())
}

/// Depth-capped traversal of a prototype chain.
///
/// The receiver counts as the first node of its own chain, so a chain of 101
/// objects trips the cap even though only 100 of them are walked. The first
/// hop honors the implicit-default rule of [`prototype_of`]; every later hop
/// follows the stored link only. Applying the default at every hop would
/// turn the `ObjectPrototype`/`ValuePrototype` pair into a cycle.
pub(crate) struct ProtoWalk {
    current: Option<Value>,
    steps: usize,
    effective_first: bool,
}

impl ProtoWalk {
    /// Walk the chain above `receiver`, starting at its effective prototype.
    pub(crate) fn above(receiver: &Value) -> Self {
        Self {
            current: Some(prototype_of(receiver)),
            // the receiver itself occupies the first chain slot
            steps: 1,
            effective_first: false,
        }
    }

    /// Walk the chain starting at `receiver` itself (metamethod resolution).
    pub(crate) fn including(receiver: &Value) -> Self {
        Self {
            current: Some(receiver.clone()),
            steps: 0,
            effective_first: true,
        }
    }

    /// Next object node, or `None` when the chain ends on a non-object.
    pub(crate) fn next_object(&mut self) -> RuntimeResult<Option<ObjectRef>> {
        let Some(node) = self.current.take() else {
            return Ok(None);
        };
        let Value::Object(obj) = node else {
            return Ok(None);
        };
        self.steps += 1;
        if self.steps > PROTO_DEPTH_LIMIT {
            return Err(RuntimeError::CircularPrototype);
        }
        self.current = if self.effective_first && self.steps == 1 {
            Some(prototype_of(&Value::Object(obj.clone())))
        } else {
            obj.prototype()
        };
        Ok(Some(obj))
    }
}
