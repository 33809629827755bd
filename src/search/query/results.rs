//! Typed search results grouped by entity kind

use convert_case::{Case, Casing};
use indexmap::IndexMap;

/// Rehydrated entities per discriminator, in first-hit order
#[derive(Debug, Clone)]
pub struct SearchResultSet<E> {
    groups: IndexMap<String, Vec<E>>,
}

impl<E> Default for SearchResultSet<E> {
    fn default() -> Self {
        Self {
            groups: IndexMap::new(),
        }
    }
}

impl<E> SearchResultSet<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, entry_type: String, entities: Vec<E>) {
        self.groups.insert(entry_type, entities);
    }

    /// Entities for a discriminator such as `"Question"`
    #[must_use]
    pub fn get(&self, entry_type: &str) -> Option<&[E]> {
        self.groups.get(entry_type).map(Vec::as_slice)
    }

    /// Entities by collection key such as `"questions"`
    #[must_use]
    pub fn collection(&self, key: &str) -> Option<&[E]> {
        self.groups
            .iter()
            .find(|(entry_type, _)| collection_key(entry_type) == key)
            .map(|(_, entities)| entities.as_slice())
    }

    pub fn entry_types(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[E])> {
        self.groups
            .iter()
            .map(|(entry_type, entities)| (entry_type.as_str(), entities.as_slice()))
    }

    /// Total number of entities across all groups
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Vec<E>> {
        self.groups
    }
}

/// Pluralized snake-case collection name for a discriminator
///
/// `"Question"` becomes `"questions"`, `"QuestionList"` becomes
/// `"question_lists"`.
#[must_use]
pub fn collection_key(entry_type: &str) -> String {
    pluralize(&entry_type.to_case(Case::Snake))
}

fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    format!("{word}s")
}
