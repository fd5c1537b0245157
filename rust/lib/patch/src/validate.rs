//! Structural validation of an incoming patch.
//!
//! Only the shape is checked here. Whether a path exists in the target
//! document is decided by the engine at application time.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::op::{OpKind, PatchOp, PatchSequence};
use crate::pointer::Pointer;

const MEMBERS: [&str; 4] = ["op", "path", "value", "from"];

/// Check a raw JSON patch and convert it into a typed sequence.
///
/// Fails on the first offending element.
pub fn validate(raw: &Value) -> Result<PatchSequence, ValidationError> {
    let items = raw.as_array().ok_or(ValidationError::NotAnArray)?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            validate_op(item).map_err(|reason| ValidationError::Invalid { index, reason })
        })
        .collect()
}

fn validate_op(item: &Value) -> Result<PatchOp, String> {
    let obj = item
        .as_object()
        .ok_or_else(|| "operation must be a JSON object".to_string())?;

    if let Some(unknown) = obj.keys().find(|k| !MEMBERS.contains(&k.as_str())) {
        return Err(format!("\"{}\" is not allowed", unknown));
    }

    let op = match obj.get("op") {
        None => return Err("\"op\" is required".to_string()),
        Some(Value::String(name)) => OpKind::parse(name).ok_or_else(|| {
            format!(
                "\"op\" must be one of [{}], got \"{}\"",
                vocabulary(),
                name
            )
        })?,
        Some(_) => return Err("\"op\" must be a string".to_string()),
    };

    let path = pointer_member(obj, "path")?;

    let value = obj.get("value").cloned();
    if op.needs_value() && value.is_none() {
        return Err(format!("\"value\" is required for {}", op));
    }

    let from = if op.needs_from() {
        Some(pointer_member(obj, "from")?)
    } else {
        if obj.get("from").is_some_and(|f| !f.is_string()) {
            return Err("\"from\" must be a string".to_string());
        }
        None
    };

    let op = match (op, value, from) {
        (OpKind::Add, Some(value), _) => PatchOp::Add { path, value },
        (OpKind::Remove, _, _) => PatchOp::Remove { path },
        (OpKind::Replace, Some(value), _) => PatchOp::Replace { path, value },
        (OpKind::Move, _, Some(from)) => PatchOp::Move { from, path },
        (OpKind::Copy, _, Some(from)) => PatchOp::Copy { from, path },
        (OpKind::Test, Some(value), _) => PatchOp::Test { path, value },
        (op, _, _) => return Err(format!("incomplete {} operation", op)),
    };
    Ok(op)
}

fn pointer_member(obj: &Map<String, Value>, name: &str) -> Result<Pointer, String> {
    match obj.get(name) {
        None => Err(format!("\"{}\" is required", name)),
        Some(Value::String(s)) if s.is_empty() => Err(format!("\"{}\" must not be empty", name)),
        Some(Value::String(s)) => Pointer::parse(s).map_err(|e| format!("\"{}\": {}", name, e)),
        Some(_) => Err(format!("\"{}\" must be a string", name)),
    }
}

fn vocabulary() -> String {
    OpKind::ALL
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason(raw: Value) -> (usize, String) {
        match validate(&raw).unwrap_err() {
            ValidationError::Invalid { index, reason } => (index, reason),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn accepts_full_vocabulary() {
        let patch = validate(&json!([
            {"op": "test", "path": "/name", "value": "Acme"},
            {"op": "replace", "path": "/name", "value": "Acme Corp"},
            {"op": "add", "path": "/addresses/-", "value": {
                "street": "456 Oak Ave", "city": "Boston", "state": "MA",
                "zip": "02101", "country": "USA"
            }},
            {"op": "copy", "from": "/addresses/0", "path": "/addresses/-"},
            {"op": "move", "from": "/addresses/1", "path": "/addresses/0"},
            {"op": "remove", "path": "/addresses/2"},
        ]))
        .unwrap();

        let kinds: Vec<OpKind> = patch.iter().map(PatchOp::kind).collect();
        assert_eq!(
            kinds,
            vec![
                OpKind::Test,
                OpKind::Replace,
                OpKind::Add,
                OpKind::Copy,
                OpKind::Move,
                OpKind::Remove,
            ]
        );
        match patch.iter().nth(3).unwrap() {
            PatchOp::Copy { from, path } => {
                assert_eq!(from.as_str(), "/addresses/0");
                assert_eq!(path.as_str(), "/addresses/-");
            }
            other => panic!("expected copy, got {other:?}"),
        }
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(validate(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn unknown_op_rejected() {
        let (index, reason) = reason(json!([
            {"op": "replace", "path": "/name", "value": "ok"},
            {"op": "delete-field", "path": "/name"},
        ]));
        assert_eq!(index, 1);
        assert!(reason.contains("must be one of [add, remove, replace, move, copy, test]"));
        assert!(reason.contains("delete-field"));
    }

    #[test]
    fn not_an_array_rejected() {
        assert_eq!(
            validate(&json!({"op": "add"})).unwrap_err(),
            ValidationError::NotAnArray
        );
    }

    #[test]
    fn element_must_be_object() {
        let (index, reason) = reason(json!(["replace"]));
        assert_eq!(index, 0);
        assert_eq!(reason, "operation must be a JSON object");
    }

    #[test]
    fn op_is_required_and_must_be_string() {
        assert_eq!(reason(json!([{"path": "/name"}])).1, "\"op\" is required");
        assert_eq!(
            reason(json!([{"op": 1, "path": "/name"}])).1,
            "\"op\" must be a string"
        );
    }

    #[test]
    fn path_is_required_non_empty_pointer() {
        assert_eq!(reason(json!([{"op": "remove"}])).1, "\"path\" is required");
        assert_eq!(
            reason(json!([{"op": "remove", "path": ""}])).1,
            "\"path\" must not be empty"
        );
        assert_eq!(
            reason(json!([{"op": "remove", "path": 3}])).1,
            "\"path\" must be a string"
        );
        assert!(reason(json!([{"op": "remove", "path": "name"}]))
            .1
            .contains("must start with '/'"));
    }

    #[test]
    fn value_required_for_add_replace_test() {
        for op in ["add", "replace", "test"] {
            let (_, reason) = reason(json!([{"op": op, "path": "/name"}]));
            assert_eq!(reason, format!("\"value\" is required for {}", op));
        }
    }

    #[test]
    fn null_value_counts_as_present() {
        let patch = validate(&json!([{"op": "replace", "path": "/name", "value": null}])).unwrap();
        assert_eq!(
            patch.iter().next().unwrap(),
            &PatchOp::Replace {
                path: Pointer::parse("/name").unwrap(),
                value: Value::Null,
            }
        );
    }

    #[test]
    fn from_required_for_move_and_copy() {
        for op in ["move", "copy"] {
            let (_, reason) = reason(json!([{"op": op, "path": "/addresses/0"}]));
            assert_eq!(reason, "\"from\" is required");
        }
    }

    #[test]
    fn stray_from_must_still_be_a_string() {
        assert!(validate(&json!([{"op": "remove", "path": "/a", "from": "/b"}])).is_ok());
        assert_eq!(
            reason(json!([{"op": "remove", "path": "/a", "from": 7}])).1,
            "\"from\" must be a string"
        );
    }

    #[test]
    fn unknown_members_rejected() {
        let (index, reason) =
            reason(json!([{"op": "replace", "path": "/name", "value": "x", "extra": true}]));
        assert_eq!(index, 0);
        assert_eq!(reason, "\"extra\" is not allowed");
    }

    #[test]
    fn reports_first_offending_element() {
        let (index, _) = reason(json!([
            {"op": "test", "path": "/name", "value": "a"},
            {"op": "add", "path": "/x"},
            {"op": "bogus", "path": "/y"},
        ]));
        assert_eq!(index, 1);
    }
}
