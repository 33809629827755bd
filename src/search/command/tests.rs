//! Unit tests for command construction and XML serialization

use super::*;

struct Question {
    id: &'static str,
    title: &'static str,
    topics: Vec<&'static str>,
}

impl Indexable for Question {
    fn identity(&self) -> EntityId {
        EntityId::from(self.id)
    }

    fn entry_type(&self) -> &str {
        "Question"
    }

    fn search_entry(&self) -> SearchEntry {
        SearchEntry::for_entity(self)
            .field("title", self.title)
            .field("topics", self.topics.clone())
    }
}

struct Blank;

impl Indexable for Blank {
    fn identity(&self) -> EntityId {
        EntityId::from("b1")
    }

    fn entry_type(&self) -> &str {
        "Blank"
    }

    fn search_entry(&self) -> SearchEntry {
        SearchEntry::new()
    }
}

#[test]
fn test_upsert_xml_field_per_entry_in_order() {
    let entry = SearchEntry::new()
        .field("id", "t1")
        .field("title", "Rust")
        .field("questions_count", 3);
    let xml = serialize_upsert(&EntityId::from("t1"), &entry);
    assert_eq!(
        xml,
        "<add><doc>\
         <field name=\"id\">t1</field>\
         <field name=\"title\">Rust</field>\
         <field name=\"questions_count\">3</field>\
         </doc></add>"
    );
}

#[test]
fn test_upsert_escapes_markup() {
    let entry = SearchEntry::new().field("body", "a < b & \"c\"");
    let xml = serialize_upsert(&EntityId::from("q1"), &entry);
    assert!(xml.contains("<field name=\"body\">a &lt; b &amp; \"c\"</field>"));
}

#[test]
fn test_upsert_list_repeats_field() {
    let question = Question {
        id: "q9",
        title: "Borrowing",
        topics: vec!["rust", "memory"],
    };
    let xml = IndexCommand::upsert_for(&question)
        .map(|c| c.to_xml())
        .unwrap_or_default();
    assert!(xml.contains(
        "<field name=\"topics\">rust</field><field name=\"topics\">memory</field>"
    ));
    assert!(xml.contains("<field name=\"entry_type\">Question</field>"));
}

#[test]
fn test_delete_xml() {
    assert_eq!(
        serialize_delete(&EntityId::from("t1")),
        "<delete><query>id:t1</query></delete>"
    );
}

#[test]
fn test_delete_escapes_query_syntax() {
    assert_eq!(
        serialize_delete(&EntityId::from("a:b")),
        "<delete><query>id:a\\:b</query></delete>"
    );
    assert_eq!(escape_query_term("x y"), "x\\ y");
}

#[test]
fn test_empty_projection_is_unimplemented() {
    let result = IndexCommand::upsert_for(&Blank);
    assert!(matches!(
        result,
        Err(SearchError::UnimplementedProjection { ref entry_type }) if entry_type == "Blank"
    ));
}

#[test]
fn test_command_accessors() {
    let delete = IndexCommand::delete(EntityId::from("x"));
    assert_eq!(delete.kind(), CommandKind::Delete);
    assert_eq!(delete.id().as_str(), "x");
    assert_eq!(CommandKind::Upsert.to_string(), "upsert");
}

#[test]
fn test_command_replays_through_json() {
    let command = IndexCommand::Upsert {
        id: EntityId::from("t1"),
        entry: SearchEntry::new().field("title", "Rust"),
    };
    let json = serde_json::to_string(&command).unwrap_or_default();
    assert!(json.contains("\"op\":\"upsert\""));
    let replayed: Option<IndexCommand> = serde_json::from_str(&json).ok();
    assert_eq!(replayed.map(|c| c.to_xml()), Some(command.to_xml()));
    assert_eq!(
        command.to_xml(),
        "<add><doc><field name=\"id\">t1</field><field name=\"title\">Rust</field></doc></add>"
    );
}

/// Projection that skips `SearchEntry::for_entity`
struct Bare;

impl Indexable for Bare {
    fn identity(&self) -> EntityId {
        EntityId::from("b1")
    }

    fn entry_type(&self) -> &str {
        "Bookmark"
    }

    fn search_entry(&self) -> SearchEntry {
        SearchEntry::new().field("title", "Rust").field("id", "other")
    }
}

#[test]
fn test_upsert_always_carries_identity_fields() {
    let xml = IndexCommand::upsert_for(&Bare)
        .map(|c| c.to_xml())
        .unwrap_or_default();
    assert_eq!(
        xml,
        "<add><doc>\
         <field name=\"id\">b1</field>\
         <field name=\"entry_type\">Bookmark</field>\
         <field name=\"title\">Rust</field>\
         </doc></add>"
    );
}

#[test]
fn test_control_characters_are_dropped() {
    let entry = SearchEntry::new()
        .field("id", "q1")
        .field("title", "a\u{0}b\u{1b}c\td\u{fffe}");
    let xml = serialize_upsert(&EntityId::from("q1"), &entry);
    assert!(xml.contains("<field name=\"title\">abc\td</field>"));
    assert!(!xml.chars().any(|ch| ch < ' ' && ch != '\t'));

    assert_eq!(
        serialize_delete(&EntityId::from("x\u{7}1")),
        "<delete><query>id:x1</query></delete>"
    );
    assert_eq!(serializer::xml_chars("plain"), "plain");
}
