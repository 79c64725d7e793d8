//! JSON payload mapping onto core input types.
//!
//! Request bodies for membership writes are taken as raw `serde_json::Value`
//! so that shape errors (`memberIds` not a list) and per-element errors are
//! reported by the core in its own order.

use mpk_core::{MemberIdsInput, RawMemberId};
use serde_json::Value;

/// Extracts `memberIds` from a `PUT /proposals/:id/members` body.
pub fn member_ids_input(body: &Value) -> MemberIdsInput {
    match body.get("memberIds") {
        Some(Value::Array(items)) => {
            MemberIdsInput::List(items.iter().map(raw_member_id).collect())
        }
        Some(other) => MemberIdsInput::NotAList {
            found: json_kind(other),
        },
        None => MemberIdsInput::NotAList { found: "nothing" },
    }
}

/// Maps one JSON value onto the tagged member id input.
pub fn raw_member_id(value: &Value) -> RawMemberId {
    match value {
        // Every JSON number has an f64 reading unless serde_json runs with
        // `arbitrary_precision`.
        Value::Number(number) => number
            .as_f64()
            .map(RawMemberId::Number)
            .unwrap_or(RawMemberId::Unsupported("number")),
        Value::String(text) => RawMemberId::Text(text.clone()),
        other => RawMemberId::Unsupported(json_kind(other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
