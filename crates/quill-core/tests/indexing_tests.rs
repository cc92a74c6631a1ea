//! Integration tests for the indexer
//!
//! Exercises the full read/write contract against live executors: prototype
//! read-through with auto-binding, the locked-prototype wall, and object
//! keys coerced through `__number`.

mod common;

use common::{executor, stateful_object};
use quill_core::{contains, get, set, set_prototype, RuntimeError, Value};

#[test]
fn test_roundtrip_invariant() {
    let obj = Value::object();
    for key in [Value::string("name"), Value::number(2.0), Value::True] {
        set(&obj, &key, Value::string("stored")).unwrap();
        assert_eq!(get(&obj, &key).unwrap(), Value::string("stored"));
        assert!(contains(&obj, &key).unwrap());
    }
}

#[test]
fn test_prototype_read_through_binds_methods() {
    let state = executor();

    let proto = Value::object();
    set(
        &proto,
        &Value::string("greet"),
        Value::instance_native(|_, receiver, _args| get(receiver, &Value::string("name"))),
    )
    .unwrap();
    proto.lock().unwrap();

    let obj = Value::object();
    set(&obj, &Value::string("name"), Value::string("x")).unwrap();
    set_prototype(&obj, &proto).unwrap();

    let method = get(&obj, &Value::string("greet")).unwrap();
    // the retrieved method is a freshly bound native, not the stored handle
    let raw = proto
        .as_object()
        .unwrap()
        .get_own(&Value::string("greet"))
        .unwrap();
    assert_ne!(method, raw);

    assert_eq!(state.call(&method, &[]).unwrap(), Value::string("x"));
}

#[test]
fn test_own_field_reads_bind_too() {
    let state = executor();
    let obj = Value::object();
    set(&obj, &Value::string("tag"), Value::string("own")).unwrap();
    set(
        &obj,
        &Value::string("describe"),
        Value::instance_native(|_, receiver, _args| get(receiver, &Value::string("tag"))),
    )
    .unwrap();

    let method = get(&obj, &Value::string("describe")).unwrap();
    assert_eq!(state.call(&method, &[]).unwrap(), Value::string("own"));
}

#[test]
fn test_bound_method_is_stable_across_calls() {
    let state = executor();
    let obj = Value::object();
    set(&obj, &Value::string("n"), Value::number(3.0)).unwrap();
    set(
        &obj,
        &Value::string("read"),
        Value::instance_native(|_, receiver, _args| get(receiver, &Value::string("n"))),
    )
    .unwrap();

    let method = get(&obj, &Value::string("read")).unwrap();
    assert_eq!(state.call(&method, &[]).unwrap(), Value::number(3.0));
    assert_eq!(state.call(&method, &[]).unwrap(), Value::number(3.0));
}

#[test]
fn test_plain_natives_pass_through_unwrapped() {
    let obj = Value::object();
    let f = Value::native(|_, _| Ok(Value::number(1.0)));
    set(&obj, &Value::string("f"), f.clone()).unwrap();

    // same handle back: only instance-natives are re-bound
    assert_eq!(get(&obj, &Value::string("f")).unwrap(), f);
}

#[test]
fn test_get_hook_results_are_bound() {
    let state = executor();
    let obj = stateful_object(&state);
    set(&obj, &Value::string("who"), Value::string("hooked")).unwrap();
    set(
        &obj,
        &Value::string("__get"),
        Value::native(|_, _args| {
            Ok(Value::instance_native(|_, receiver, _| {
                get(receiver, &Value::string("who"))
            }))
        }),
    )
    .unwrap();

    let method = get(&obj, &Value::string("anything")).unwrap();
    assert_eq!(state.call(&method, &[]).unwrap(), Value::string("hooked"));
}

#[test]
fn test_locked_wall_hides_prototype_key() {
    let proto = Value::object();
    set(&proto, &Value::string("a"), Value::number(1.0)).unwrap();
    proto.lock().unwrap();

    let obj = Value::object();
    set_prototype(&obj, &proto).unwrap();

    set(&obj, &Value::string("a"), Value::number(2.0)).unwrap();
    assert_eq!(get(&obj, &Value::string("a")).unwrap(), Value::number(2.0));
    assert_eq!(get(&proto, &Value::string("a")).unwrap(), Value::number(1.0));
}

#[test]
fn test_array_object_key_coerced_through_number_hook() {
    let state = executor();
    let key = stateful_object(&state);
    set(
        &key,
        &Value::string("__number"),
        Value::native(|_, _| Ok(Value::number(1.0))),
    )
    .unwrap();

    let arr = Value::array(vec![
        Value::number(10.0),
        Value::number(20.0),
        Value::number(30.0),
    ]);
    assert_eq!(get(&arr, &key).unwrap(), Value::number(20.0));

    set(&arr, &key, Value::number(99.0)).unwrap();
    assert_eq!(get(&arr, &Value::number(1.0)).unwrap(), Value::number(99.0));
}

#[test]
fn test_array_object_key_without_number_hook_fails() {
    let arr = Value::array(vec![Value::number(10.0)]);
    let key = Value::object();
    assert_eq!(
        get(&arr, &key).unwrap_err(),
        RuntimeError::NumberCastWrongType { actual: "object" }
    );
}

#[test]
fn test_write_through_chain_past_unlocked_into_wall() {
    // chain: obj -> middle (unlocked, no key) -> top (locked, holds key)
    let top = Value::object();
    set(&top, &Value::string("k"), Value::string("top")).unwrap();
    top.lock().unwrap();

    let middle = Value::object();
    set_prototype(&middle, &top).unwrap();

    let obj = Value::object();
    set_prototype(&obj, &middle).unwrap();

    set(&obj, &Value::string("k"), Value::string("own")).unwrap();
    // the locked holder walled the walk; middle stays empty, obj gets the field
    assert!(middle.as_object().unwrap().is_empty());
    assert_eq!(
        obj.as_object().unwrap().get_own(&Value::string("k")),
        Some(Value::string("own"))
    );
    assert_eq!(get(&top, &Value::string("k")).unwrap(), Value::string("top"));
}
