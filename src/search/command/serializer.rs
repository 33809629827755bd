//! Wire serialization of index commands
//!
//! Pure functions producing the XML update documents the search server
//! accepts on its update endpoint:
//!
//! ```text
//! <add><doc><field name="id">t1</field><field name="title">Rust</field>...</doc></add>
//! <delete><query>id:t1</query></delete>
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::search::entity::{EntityId, SearchEntry};
use crate::utils::ID_FIELD;

/// Characters with meaning in the Lucene query syntax
const QUERY_SPECIALS: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/', ' ',
];

/// Serialize an add/replace command for one document
///
/// One `<field>` element per mapping entry in insertion order; list values
/// repeat the element once per item under the same name. An entry without
/// an `id` field gets one from `id` so the document stays addressable.
/// Code points XML 1.0 cannot carry are dropped.
#[must_use]
pub fn serialize_upsert(id: &EntityId, entry: &SearchEntry) -> String {
    let mut xml = String::with_capacity(64 + entry.len() * 48);
    xml.push_str("<add><doc>");

    if entry.get(ID_FIELD).is_none() {
        let _ = write!(
            xml,
            "<field name=\"{ID_FIELD}\">{}</field>",
            html_escape::encode_text(&xml_chars(id.as_str()))
        );
    }

    for (name, value) in entry.iter() {
        let name = xml_chars(name);
        let name = html_escape::encode_double_quoted_attribute(&name);
        for scalar in value.scalars() {
            let text = scalar.render();
            let _ = write!(
                xml,
                "<field name=\"{name}\">{}</field>",
                html_escape::encode_text(&xml_chars(&text))
            );
        }
    }

    xml.push_str("</doc></add>");
    tracing::trace!(entity_id = %id, bytes = xml.len(), "Serialized upsert command");
    xml
}

/// Serialize a delete-by-query command matching `id:<identity>`
#[must_use]
pub fn serialize_delete(id: &EntityId) -> String {
    let query = format!("{ID_FIELD}:{}", escape_query_term(&xml_chars(id.as_str())));
    format!(
        "<delete><query>{}</query></delete>",
        html_escape::encode_text(&query)
    )
}

/// Whether XML 1.0 allows `ch` in character data
fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
        || ch >= '\u{10000}'
}

/// `text` without the code points XML 1.0 forbids
pub(crate) fn xml_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|ch| is_xml_char(*ch)).collect())
    }
}

/// Backslash-escape query syntax characters in a single term
#[must_use]
pub fn escape_query_term(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if QUERY_SPECIALS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
