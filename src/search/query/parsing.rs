//! Select response parsing and hit grouping

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::search::entity::EntityId;
use crate::search::errors::{SearchError, SearchResult};
use crate::utils::{ENTRY_TYPE_FIELD, ID_FIELD};

/// One document returned by the select endpoint, before rehydration
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub id: EntityId,
    pub entry_type: String,
    pub score: Option<f64>,
}

#[derive(Deserialize)]
struct SelectEnvelope {
    response: Option<SelectBody>,
}

#[derive(Deserialize)]
struct SelectBody {
    docs: Option<Vec<RawDoc>>,
}

#[derive(Deserialize)]
struct RawDoc {
    id: Option<Value>,
    entry_type: Option<Value>,
    score: Option<f64>,
}

/// Parse a `wt=json` select response into hits, in server ranking order
///
/// `id` may be a string or a number; either field may be a single-element
/// array, which is how multi-valued stored fields come back.
///
/// # Errors
///
/// `MalformedResponse` when the body is not JSON, lacks `response.docs`,
/// or a doc lacks a usable `id` or `entry_type`. No partial result is
/// returned.
pub fn parse_select_response(body: &str) -> SearchResult<Vec<RawHit>> {
    let envelope: SelectEnvelope = serde_json::from_str(body)
        .map_err(|e| SearchError::MalformedResponse(format!("invalid select response: {e}")))?;

    let docs = envelope
        .response
        .and_then(|body| body.docs)
        .ok_or_else(|| SearchError::MalformedResponse("missing response.docs".to_string()))?;

    docs.into_iter()
        .enumerate()
        .map(|(position, doc)| {
            let id = doc
                .id
                .as_ref()
                .and_then(scalar_text)
                .ok_or_else(|| missing_field(position, ID_FIELD))?;
            let entry_type = doc
                .entry_type
                .as_ref()
                .and_then(scalar_text)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| missing_field(position, ENTRY_TYPE_FIELD))?;

            Ok(RawHit {
                id: EntityId::from(id),
                entry_type,
                score: doc.score,
            })
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.len() == 1 => items.first().and_then(scalar_text),
        _ => None,
    }
}

fn missing_field(position: usize, field: &str) -> SearchError {
    SearchError::MalformedResponse(format!("doc {position} has no usable '{field}' field"))
}

/// Group hit ids by discriminator
///
/// Groups appear in order of their first hit; ids keep hit order inside
/// each group.
#[must_use]
pub fn group_hits(hits: Vec<RawHit>) -> IndexMap<String, Vec<EntityId>> {
    let mut groups: IndexMap<String, Vec<EntityId>> = IndexMap::new();
    for hit in hits {
        groups.entry(hit.entry_type).or_default().push(hit.id);
    }
    groups
}
