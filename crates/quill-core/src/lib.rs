//! Quill value core
//!
//! This crate provides the dynamic value layer of the Quill runtime:
//! - Tagged universal `Value` (undefined/null/true/false/number/string/object/array/function)
//! - Object model (prototype links, locking, user data, executor back-references)
//! - Uniform indexing, assignment and slicing operators
//! - Metamethod dispatch (`__get`, `__set`, `__slice`, `__eq`, ...)
//!
//! Every higher-level subsystem of the runtime (the bytecode executor, the
//! compiler, the standard library) operates in terms of these values.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod dispatch;
pub mod exec;
pub mod index;
pub mod object;
pub mod ops;
pub mod proto;
pub mod slice;
pub mod value;

pub use dispatch::try_dispatch;
pub use exec::{Executor, InstanceNativeFn, NativeFn, StateHandle, WeakState};
pub use index::{check_wrap_function, get, set};
pub use object::{
    ArrayRef, Closure, FunctionRef, ObjectRecord, ObjectRef, PropertyMap, ScriptClosure, ValueKey,
};
pub use ops::{compare, contains, to_display_string, to_integer, value_eq, value_hash};
pub use proto::{prototype_of, set_prototype, Prototypes, PROTO_DEPTH_LIMIT};
pub use slice::slice;
pub use value::Value;

/// Runtime errors raised by the value core
///
/// Each variant is a stable error code; the payload carries the formatting
/// arguments. Hosts that need their own reporting can match on the variant or
/// go through [`RuntimeError::code`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// Array read or write outside `[0, length)`
    #[error("index {index} out of bounds (length {length})")]
    IndexOutOfBounds {
        /// Requested index, before negative folding
        index: i64,
        /// Array length at the time of access
        length: usize,
    },

    /// Prototype walk exceeded the depth cap
    #[error("prototype chain exceeded {} links", proto::PROTO_DEPTH_LIMIT)]
    CircularPrototype,

    /// Mutation of a locked object
    #[error("object is locked")]
    ObjectIsLocked,

    /// Assignment on a non-object receiver that resolved nowhere
    #[error("cannot create field on {type_name} value")]
    CantCreateField {
        /// Variant name of the receiver
        type_name: &'static str,
    },

    /// Slice start endpoint out of range
    #[error("slice start {start} out of range (length {length})")]
    SliceStartBounds {
        /// Normalized start index
        start: i64,
        /// Source length
        length: usize,
    },

    /// Slice end endpoint out of range
    #[error("slice end {end} out of range (length {length})")]
    SliceEndBounds {
        /// Normalized end index
        end: i64,
        /// Source length
        length: usize,
    },

    /// Slice step of zero
    #[error("slice step must not be zero")]
    SliceStepZero,

    /// Slice endpoints disagree with the step direction
    #[error("slice range {start}..{end} does not match step {step}")]
    SliceInvalid {
        /// Normalized start index
        start: i64,
        /// Normalized end index
        end: i64,
        /// Requested step
        step: i64,
    },

    /// Slice applied to a value that supports no subranges
    #[error("cannot slice {type_name} value")]
    SliceWrongType {
        /// Variant name of the receiver
        type_name: &'static str,
    },

    /// Slice on an object without a `__slice` metamethod
    #[error("object does not implement __slice")]
    SliceMissingMethod,

    /// `__hash` metamethod returned a non-number
    #[error("__hash must return a number, got {actual}")]
    HashWrongType {
        /// Variant name of the returned value
        actual: &'static str,
    },

    /// `__string` metamethod returned a non-string
    #[error("__string must return a string, got {actual}")]
    StringCastWrongType {
        /// Variant name of the returned value
        actual: &'static str,
    },

    /// Integer coercion of a value without numeric meaning
    #[error("__number must return a number, got {actual}")]
    NumberCastWrongType {
        /// Variant name of the offending value
        actual: &'static str,
    },

    /// Operand type pair not supported by an operator
    #[error("operator {op} not supported between {left} and {right}")]
    CantUseOperatorOnTypes {
        /// Operator spelling
        op: &'static str,
        /// Variant name of the left operand
        left: &'static str,
        /// Variant name of the right operand
        right: &'static str,
    },

    /// Host-contract violation: wrong-variant accessor
    #[error("expected {expected}, got {actual}")]
    WrongType {
        /// Variant the accessor requires
        expected: &'static str,
        /// Variant that was supplied
        actual: &'static str,
    },

    /// Host-contract violation: required argument absent
    #[error("missing required argument: {name}")]
    MissingArgument {
        /// Name of the absent argument
        name: &'static str,
    },

    /// Metamethod found on an object whose executor is gone or was never set
    #[error("metamethod {method} requires an attached execution state")]
    DetachedState {
        /// Metamethod name
        method: &'static str,
    },
}

impl RuntimeError {
    /// Stable error-code string for host-side mapping
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            RuntimeError::CircularPrototype => "CircularPrototype",
            RuntimeError::ObjectIsLocked => "ObjectIsLocked",
            RuntimeError::CantCreateField { .. } => "CantCreateField",
            RuntimeError::SliceStartBounds { .. } => "SliceStartBounds",
            RuntimeError::SliceEndBounds { .. } => "SliceEndBounds",
            RuntimeError::SliceStepZero => "SliceStepZero",
            RuntimeError::SliceInvalid { .. } => "SliceInvalid",
            RuntimeError::SliceWrongType { .. } => "SliceWrongType",
            RuntimeError::SliceMissingMethod => "SliceMissingMethod",
            RuntimeError::HashWrongType { .. } => "HashWrongType",
            RuntimeError::StringCastWrongType { .. } => "StringCastWrongType",
            RuntimeError::NumberCastWrongType { .. } => "NumberCastWrongType",
            RuntimeError::CantUseOperatorOnTypes { .. } => "CantUseOperatorOnTypes",
            RuntimeError::WrongType { .. } => "WrongType",
            RuntimeError::MissingArgument { .. } => "MissingArgument",
            RuntimeError::DetachedState { .. } => "DetachedState",
        }
    }
}

/// Result alias used throughout the value core
pub type RuntimeResult<T> = Result<T, RuntimeError>;
