//! Patch application.
//!
//! Operations run in order against a private copy of the document. The first
//! failure aborts the sequence and the copy is dropped.

use serde_json::{Number, Value};

use crate::error::{PatchError, PatchErrorKind};
use crate::op::{PatchOp, PatchSequence};
use crate::pointer::{parse_index, Pointer, APPEND};

/// Apply `patch` to `doc`, returning the patched document.
///
/// `doc` is never modified.
pub fn apply(doc: &Value, patch: &PatchSequence) -> Result<Value, PatchError> {
    let mut working = doc.clone();
    for (index, op) in patch.iter().enumerate() {
        apply_op(&mut working, op).map_err(|kind| PatchError {
            index,
            op: op.kind(),
            path: op.path().to_string(),
            kind,
        })?;
    }
    Ok(working)
}

fn apply_op(doc: &mut Value, op: &PatchOp) -> Result<(), PatchErrorKind> {
    match op {
        PatchOp::Add { path, value } => add(doc, path, value.clone()),
        PatchOp::Remove { path } => remove(doc, path).map(drop),
        PatchOp::Replace { path, value } => replace(doc, path, value.clone()),
        PatchOp::Move { from, path } => move_value(doc, from, path),
        PatchOp::Copy { from, path } => {
            let value = lookup(doc, from)
                .cloned()
                .ok_or_else(|| PatchErrorKind::PathNotFound(from.to_string()))?;
            add(doc, path, value)
        }
        PatchOp::Test { path, value } => match lookup(doc, path) {
            Some(found) if deep_equal(found, value) => Ok(()),
            _ => Err(PatchErrorKind::AssertionFailed(path.to_string())),
        },
    }
}

fn add(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchErrorKind> {
    let Some((parent, last)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };
    match container_mut(doc, parent, path)? {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            if last == APPEND {
                items.push(value);
                return Ok(());
            }
            let index = list_index(path, last)?;
            if index > items.len() {
                return Err(out_of_bounds(path, index, items.len()));
            }
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchErrorKind::PathNotFound(path.to_string())),
    }
}

fn remove(doc: &mut Value, path: &Pointer) -> Result<Value, PatchErrorKind> {
    // The root itself cannot be removed; there would be no document left.
    let (parent, last) = path
        .split_last()
        .ok_or_else(|| PatchErrorKind::PathNotFound(path.to_string()))?;
    match container_mut(doc, parent, path)? {
        Value::Object(map) => map
            .remove(last)
            .ok_or_else(|| PatchErrorKind::PathNotFound(path.to_string())),
        Value::Array(items) => {
            let index = existing_index(path, last, items.len())?;
            Ok(items.remove(index))
        }
        _ => Err(PatchErrorKind::PathNotFound(path.to_string())),
    }
}

fn replace(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PatchErrorKind> {
    let Some((parent, last)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };
    let slot = match container_mut(doc, parent, path)? {
        Value::Object(map) => map
            .get_mut(last)
            .ok_or_else(|| PatchErrorKind::PathNotFound(path.to_string()))?,
        Value::Array(items) => {
            let index = existing_index(path, last, items.len())?;
            &mut items[index]
        }
        _ => return Err(PatchErrorKind::PathNotFound(path.to_string())),
    };
    *slot = value;
    Ok(())
}

fn move_value(doc: &mut Value, from: &Pointer, path: &Pointer) -> Result<(), PatchErrorKind> {
    if from == path {
        return lookup(doc, from)
            .map(|_| ())
            .ok_or_else(|| PatchErrorKind::PathNotFound(from.to_string()));
    }
    if path.is_descendant_of(from) {
        return Err(PatchErrorKind::StructuralConflict {
            from: from.to_string(),
            path: path.to_string(),
        });
    }
    let value = remove(doc, from)?;
    add(doc, path, value)
}

/// Resolve a pointer to a value, if present.
fn lookup<'a>(doc: &'a Value, path: &Pointer) -> Option<&'a Value> {
    path.tokens().iter().try_fold(doc, |node, token| match node {
        Value::Object(map) => map.get(token),
        Value::Array(items) => parse_index(token).and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Walk to the container holding the final segment of `path`.
fn container_mut<'a>(
    doc: &'a mut Value,
    parent: &[String],
    path: &Pointer,
) -> Result<&'a mut Value, PatchErrorKind> {
    let mut node = doc;
    for token in parent {
        let next = match node {
            Value::Object(map) => map.get_mut(token),
            Value::Array(items) => parse_index(token).and_then(|i| items.get_mut(i)),
            _ => None,
        };
        node = next.ok_or_else(|| PatchErrorKind::PathNotFound(path.to_string()))?;
    }
    Ok(node)
}

fn list_index(path: &Pointer, token: &str) -> Result<usize, PatchErrorKind> {
    parse_index(token).ok_or_else(|| PatchErrorKind::InvalidIndex {
        path: path.to_string(),
        segment: token.to_string(),
    })
}

/// Index of an element that must already exist. `-` never does.
fn existing_index(path: &Pointer, token: &str, len: usize) -> Result<usize, PatchErrorKind> {
    if token == APPEND {
        return Err(PatchErrorKind::PathNotFound(path.to_string()));
    }
    let index = list_index(path, token)?;
    if index >= len {
        return Err(out_of_bounds(path, index, len));
    }
    Ok(index)
}

fn out_of_bounds(path: &Pointer, index: usize, len: usize) -> PatchErrorKind {
    PatchErrorKind::OutOfBounds {
        path: path.to_string(),
        index,
        len,
    }
}

/// Structural equality where numbers compare by numeric value (`1 == 1.0`).
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| deep_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (integer(x), integer(y)) {
        (Some(a), Some(b)) => a == b,
        (Some(i), None) => y.as_f64().is_some_and(|f| float_is_integer(f, i)),
        (None, Some(i)) => x.as_f64().is_some_and(|f| float_is_integer(f, i)),
        (None, None) => matches!((x.as_f64(), y.as_f64()), (Some(a), Some(b)) if a == b),
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison. No rounding of `i` to the nearest float.
fn float_is_integer(f: f64, i: i128) -> bool {
    // 2^64 bounds every i64/u64 and is exactly representable.
    const LIMIT: f64 = 18_446_744_073_709_551_616.0;
    f.fract() == 0.0 && f > -LIMIT && f < LIMIT && f as i128 == i
}
