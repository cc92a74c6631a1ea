//! Subrange and stride extraction
//!
//! One slice operator covers strings (by code point) and arrays (by
//! element); objects delegate to their `__slice` metamethod. Endpoints are
//! inclusive: `slice(x, 0, len-1, 1)` is the identity and
//! `slice(x, null, null, -1)` is the reversal.

use crate::dispatch::try_dispatch;
use crate::ops::{self, meta};
use crate::value::Value;
use crate::{RuntimeError, RuntimeResult};

/// Resolved slice parameters: first source index, stride, output length.
struct SliceBounds {
    start: i64,
    step: i64,
    count: usize,
}

/// Extract `receiver[start..=end]` with stride `step`.
///
/// Absent arguments are passed as `Undefined`; absent or falsy endpoints
/// take their defaults (`0`, `len-1`, step `±1`). Objects are handed the
/// raw arguments through `__slice`.
pub fn slice(receiver: &Value, start: &Value, end: &Value, step: &Value) -> RuntimeResult<Value> {
    match receiver {
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let bounds = resolve_bounds(chars.len(), start, end, step)?;
            let mut out = String::with_capacity(bounds.count);
            for i in 0..bounds.count {
                let index = bounds.start + i as i64 * bounds.step;
                out.push(chars[index as usize]);
            }
            Ok(Value::string(out))
        }
        Value::Array(arr) => {
            let items = arr.to_vec();
            let bounds = resolve_bounds(items.len(), start, end, step)?;
            let mut out = Vec::with_capacity(bounds.count);
            for i in 0..bounds.count {
                let index = bounds.start + i as i64 * bounds.step;
                out.push(items[index as usize].clone());
            }
            Ok(Value::array(out))
        }
        Value::Object(_) => {
            let args = [
                receiver.clone(),
                start.clone(),
                end.clone(),
                step.clone(),
            ];
            match try_dispatch(receiver, meta::SLICE, &args)? {
                Some(result) => Ok(result),
                None => Err(RuntimeError::SliceMissingMethod),
            }
        }
        other => Err(RuntimeError::SliceWrongType {
            type_name: other.type_name(),
        }),
    }
}

fn resolve_bounds(
    len: usize,
    start_v: &Value,
    end_v: &Value,
    step_v: &Value,
) -> RuntimeResult<SliceBounds> {
    let length = len as i64;
    let start_given = start_v.is_truthy();
    let end_given = end_v.is_truthy();
    let step_given = step_v.is_truthy();

    let mut step = 0;
    if step_given {
        step = ops::to_integer(step_v)?;
        if step == 0 {
            return Err(RuntimeError::SliceStepZero);
        }
    }

    let mut start = if start_given {
        let mut s = ops::to_integer(start_v)?;
        if s < 0 {
            s += length;
        }
        s
    } else {
        0
    };
    let mut end = if end_given {
        let mut e = ops::to_integer(end_v)?;
        if e < 0 {
            e += length;
        }
        e
    } else {
        (length - 1).max(0)
    };

    if !step_given {
        step = if start <= end { 1 } else { -1 };
    }
    // bare negative stride reads back-to-front: [::-1] reverses
    if step < 0 && !start_given && !end_given {
        start = (length - 1).max(0);
        end = 0;
    }

    if length == 0 && !start_given && !end_given {
        return Ok(SliceBounds { start: 0, step, count: 0 });
    }
    if start < 0 || start >= length {
        return Err(RuntimeError::SliceStartBounds { start, length: len });
    }
    if end < 0 || end >= length {
        return Err(RuntimeError::SliceEndBounds { end, length: len });
    }
    if (step > 0 && start > end) || (step < 0 && start < end) {
        return Err(RuntimeError::SliceInvalid { start, end, step });
    }

    let range = end - start + step.signum();
    let mut count = range / step;
    if range % step != 0 {
        count += 1;
    }
    Ok(SliceBounds {
        start,
        step,
        count: count as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(items: &[f64]) -> Value {
        Value::array(items.iter().map(|n| Value::number(*n)).collect())
    }

    fn collect(value: &Value) -> Vec<f64> {
        value
            .as_array()
            .unwrap()
            .to_vec()
            .iter()
            .map(|v| v.as_number().unwrap())
            .collect()
    }

    #[test]
    fn test_identity_slice() {
        let arr = numbers(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = slice(&arr, &Value::number(0.0), &Value::number(4.0), &Value::number(1.0))
            .unwrap();
        assert_eq!(collect(&out), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_default_arguments() {
        let arr = numbers(&[1.0, 2.0, 3.0]);
        let out = slice(&arr, &Value::Undefined, &Value::Undefined, &Value::Undefined).unwrap();
        assert_eq!(collect(&out), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reverse() {
        let arr = numbers(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = slice(&arr, &Value::Null, &Value::Null, &Value::number(-1.0)).unwrap();
        assert_eq!(collect(&out), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_stride() {
        let arr = numbers(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = slice(&arr, &Value::number(0.0), &Value::number(4.0), &Value::number(2.0))
            .unwrap();
        assert_eq!(collect(&out), vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_step_zero() {
        let arr = numbers(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(
            slice(&arr, &Value::number(0.0), &Value::number(4.0), &Value::number(0.0))
                .unwrap_err(),
            RuntimeError::SliceStepZero
        );
    }

    #[test]
    fn test_negative_endpoints_fold() {
        let arr = numbers(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = slice(
            &arr,
            &Value::number(-4.0),
            &Value::number(-2.0),
            &Value::Undefined,
        )
        .unwrap();
        assert_eq!(collect(&out), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_direction_mismatch() {
        let arr = numbers(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(
            slice(&arr, &Value::number(4.0), &Value::number(1.0), &Value::number(1.0))
                .unwrap_err(),
            RuntimeError::SliceInvalid { start: 4, end: 1, step: 1 }
        );
        assert_eq!(
            slice(&arr, &Value::number(1.0), &Value::number(4.0), &Value::number(-1.0))
                .unwrap_err(),
            RuntimeError::SliceInvalid { start: 1, end: 4, step: -1 }
        );
    }

    #[test]
    fn test_endpoint_bounds() {
        let arr = numbers(&[1.0, 2.0, 3.0]);
        assert_eq!(
            slice(&arr, &Value::number(5.0), &Value::Undefined, &Value::Undefined).unwrap_err(),
            RuntimeError::SliceStartBounds { start: 5, length: 3 }
        );
        assert_eq!(
            slice(&arr, &Value::Undefined, &Value::number(3.0), &Value::Undefined).unwrap_err(),
            RuntimeError::SliceEndBounds { end: 3, length: 3 }
        );
    }

    #[test]
    fn test_empty_source_with_defaults() {
        let arr = numbers(&[]);
        let out = slice(&arr, &Value::Undefined, &Value::Undefined, &Value::Undefined).unwrap();
        assert_eq!(collect(&out), Vec::<f64>::new());

        let reversed = slice(&arr, &Value::Null, &Value::Null, &Value::number(-1.0)).unwrap();
        assert_eq!(collect(&reversed), Vec::<f64>::new());
    }

    #[test]
    fn test_empty_source_with_explicit_endpoint() {
        let arr = numbers(&[]);
        assert_eq!(
            slice(&arr, &Value::number(0.0), &Value::Undefined, &Value::Undefined).unwrap_err(),
            RuntimeError::SliceStartBounds { start: 0, length: 0 }
        );
    }

    #[test]
    fn test_single_element_slice() {
        let arr = numbers(&[1.0, 2.0, 3.0]);
        let out = slice(&arr, &Value::number(1.0), &Value::number(1.0), &Value::Undefined)
            .unwrap();
        assert_eq!(collect(&out), vec![2.0]);
    }

    #[test]
    fn test_string_slice() {
        let s = Value::string("hello");
        let out = slice(&s, &Value::number(1.0), &Value::number(3.0), &Value::Undefined)
            .unwrap();
        assert_eq!(out, Value::string("ell"));
    }

    #[test]
    fn test_string_reverse() {
        let s = Value::string("abc");
        let out = slice(&s, &Value::Null, &Value::Null, &Value::number(-1.0)).unwrap();
        assert_eq!(out, Value::string("cba"));
    }

    #[test]
    fn test_string_slice_is_code_point_based() {
        let s = Value::string("aßc");
        let out = slice(&s, &Value::number(1.0), &Value::number(1.0), &Value::Undefined)
            .unwrap();
        assert_eq!(out, Value::string("ß"));
    }

    #[test]
    fn test_wrong_receiver() {
        assert_eq!(
            slice(
                &Value::number(5.0),
                &Value::Undefined,
                &Value::Undefined,
                &Value::Undefined
            )
            .unwrap_err(),
            RuntimeError::SliceWrongType { type_name: "number" }
        );
    }

    #[test]
    fn test_object_without_slice_method() {
        let obj = Value::object();
        assert_eq!(
            slice(&obj, &Value::Undefined, &Value::Undefined, &Value::Undefined).unwrap_err(),
            RuntimeError::SliceMissingMethod
        );
    }
}
