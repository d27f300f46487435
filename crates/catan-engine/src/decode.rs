//! Turning decision-maker text into an index into the legal action list.
//!
//! Decision-makers backed by text generators answer with something that
//! *should* be `{"action_index": 3}`. This module recovers that object from
//! loosely formatted replies and, when no usable index can be found, picks a
//! safe default from the action list instead.

use crate::actions::{Action, ActionKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Key holding the chosen index in a response object
pub const INDEX_KEY: &str = "action_index";

/// Reply a response source gives when it could not produce a real answer.
///
/// It decodes to index 0 like any other reply but is recorded as a fallback.
pub const FAILURE_REPLY: &str = r#"{"action_index": 0}"#;

/// Why a response could not be turned into an index
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("No JSON object found in response")]
    NoJson,

    #[error("Response has no `action_index` field")]
    MissingIndex,

    #[error("`action_index` is not a non-negative integer: {0}")]
    NotAnIndex(String),

    #[error("Index {index} out of range for {len} actions")]
    OutOfRange { index: usize, len: usize },
}

/// The index a decision-maker settled on, and how it got there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub index: usize,
    /// The decision-maker itself produced an in-range index
    pub valid_index: bool,
    /// The index came from [`fallback_index`]
    pub used_fallback: bool,
}

impl Decision {
    pub fn direct(index: usize) -> Self {
        Self {
            index,
            valid_index: true,
            used_fallback: false,
        }
    }

    pub fn fallback(index: usize) -> Self {
        Self {
            index,
            valid_index: false,
            used_fallback: true,
        }
    }
}

/// Recover a JSON value from a response.
///
/// Tries the trimmed text as-is, then with markdown code fences removed,
/// then the span from the first `{` to the last `}`.
pub fn extract_json(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw.trim()) {
        return Some(value);
    }

    if let Ok(value) = serde_json::from_str(strip_fences(raw).trim()) {
        return Some(value);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

/// Remove ```` ``` ```` and ```` ```json ```` markers
fn strip_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out
}

/// Parse `action_index` out of a response and range-check it against `len`.
///
/// Integer values and digit-only strings are both accepted.
pub fn decode_index(raw: &str, len: usize) -> Result<usize, DecodeError> {
    let value = extract_json(raw).ok_or(DecodeError::NoJson)?;
    let field = value.get(INDEX_KEY).ok_or(DecodeError::MissingIndex)?;

    let index = match field {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| DecodeError::NotAnIndex(n.to_string()))?,
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
            .parse::<u64>()
            .map_err(|_| DecodeError::NotAnIndex(s.clone()))?,
        other => return Err(DecodeError::NotAnIndex(other.to_string())),
    };

    let index = usize::try_from(index).map_err(|_| DecodeError::NotAnIndex(index.to_string()))?;
    if index >= len {
        return Err(DecodeError::OutOfRange { index, len });
    }
    Ok(index)
}

/// Safe default choice: the first build, else the first bank trade, else the
/// first discard, else the first `EndTurn`, else index 0.
///
/// Returns `None` only for an empty list.
pub fn fallback_index(actions: &[Action]) -> Option<usize> {
    if actions.is_empty() {
        return None;
    }

    let first = |kind: ActionKind| actions.iter().position(|a| a.kind() == kind);

    actions
        .iter()
        .position(|a| a.kind().is_build())
        .or_else(|| first(ActionKind::BankTrade))
        .or_else(|| first(ActionKind::Discard))
        .or_else(|| first(ActionKind::EndTurn))
        .or(Some(0))
}

/// Decode a response against `actions`, falling back when it is unusable.
///
/// The returned index is always inside `actions` unless `actions` is empty,
/// in which case it is 0 and flagged as a fallback.
pub fn resolve(raw: &str, actions: &[Action]) -> Decision {
    if raw.trim() == FAILURE_REPLY {
        tracing::debug!("source returned its failure reply");
        return Decision {
            index: 0,
            valid_index: false,
            used_fallback: true,
        };
    }

    match decode_index(raw, actions.len()) {
        Ok(index) => Decision::direct(index),
        Err(err) => {
            tracing::debug!(error = %err, "undecodable response, using fallback");
            Decision::fallback(fallback_index(actions).unwrap_or(0))
        }
    }
}

/// Numbered one-line descriptions of `actions`, as shown to decision-makers
pub fn describe_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .enumerate()
        .map(|(i, action)| format!("{i}: {action}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Path, Resource};
    use pretty_assertions::assert_eq;

    fn sample_actions() -> Vec<Action> {
        vec![
            Action::GiftTrade {
                to: 1,
                resource: Resource::Ore,
            },
            Action::BankTrade {
                give: Resource::Ore,
                receive: Resource::Brick,
            },
            Action::BuildRoad {
                path: Path::after(4),
            },
            Action::EndTurn,
        ]
    }

    #[test]
    fn test_extract_plain_json() {
        let value = extract_json(r#"  {"action_index": 3}  "#).unwrap();
        assert_eq!(value[INDEX_KEY], 3);
    }

    #[test]
    fn test_extract_fenced_json() {
        let value = extract_json("```json\n{\"action_index\": 2}\n```").unwrap();
        assert_eq!(value[INDEX_KEY], 2);

        let value = extract_json("```JSON {\"action_index\": 1} ```").unwrap();
        assert_eq!(value[INDEX_KEY], 1);
    }

    #[test]
    fn test_extract_embedded_json() {
        let raw = r#"I choose the road. {"action_index": 2} because it expands."#;
        assert_eq!(extract_json(raw).unwrap()[INDEX_KEY], 2);
    }

    #[test]
    fn test_extract_nothing() {
        assert_eq!(extract_json("end my turn please"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_decode_index_variants() {
        assert_eq!(decode_index(r#"{"action_index": 1}"#, 4), Ok(1));
        assert_eq!(decode_index(r#"{"action_index": "3"}"#, 4), Ok(3));
        assert_eq!(
            decode_index(r#"{"action_index": 4}"#, 4),
            Err(DecodeError::OutOfRange { index: 4, len: 4 })
        );
        assert_eq!(
            decode_index(r#"{"action_index": -1}"#, 4),
            Err(DecodeError::NotAnIndex("-1".to_string()))
        );
        assert_eq!(
            decode_index(r#"{"action_index": "two"}"#, 4),
            Err(DecodeError::NotAnIndex("\"two\"".to_string()))
        );
        assert_eq!(
            decode_index(r#"{"choice": 1}"#, 4),
            Err(DecodeError::MissingIndex)
        );
        assert_eq!(decode_index("no idea", 4), Err(DecodeError::NoJson));
    }

    #[test]
    fn test_fallback_priority() {
        let actions = sample_actions();
        assert_eq!(fallback_index(&actions), Some(2));
        assert_eq!(fallback_index(&actions[..2]), Some(1));
        assert_eq!(fallback_index(&actions[..1]), Some(0));
        assert_eq!(fallback_index(&[]), None);

        let discards = vec![
            Action::EndTurn,
            Action::Discard {
                resource: Resource::Wool,
                count: 4,
            },
        ];
        assert_eq!(fallback_index(&discards), Some(1));

        let only_gifts_and_end = vec![sample_actions()[0].clone(), Action::EndTurn];
        assert_eq!(fallback_index(&only_gifts_and_end), Some(1));
    }

    #[test]
    fn test_resolve_direct_and_fallback() {
        let actions = sample_actions();
        assert_eq!(resolve(r#"{"action_index": 1}"#, &actions), Decision::direct(1));
        assert_eq!(resolve(r#"{"action_index": 99}"#, &actions), Decision::fallback(2));
        assert_eq!(resolve("garbage", &[]), Decision::fallback(0));
    }

    #[test]
    fn test_failure_reply_counts_as_fallback() {
        let actions = sample_actions();
        let failed = Decision {
            index: 0,
            valid_index: false,
            used_fallback: true,
        };
        assert_eq!(resolve(FAILURE_REPLY, &actions), failed);
        assert_eq!(resolve("  {\"action_index\": 0}\n", &actions), failed);

        // Same index in any other form is a real answer
        assert_eq!(resolve(r#"{"action_index":0}"#, &actions), Decision::direct(0));
        assert_eq!(resolve(r#"{"action_index": "0"}"#, &actions), Decision::direct(0));
    }

    #[test]
    fn test_describe_actions() {
        let text = describe_actions(&sample_actions()[1..]);
        assert_eq!(
            text,
            "0: BANK_TRADE give 4 ore for 1 brick\n1: BUILD_ROAD along path=(4, 5)\n2: END_TURN"
        );
    }
}
