//! Request capability tables
//!
//! Every filterable request type exposes a static table of
//! [`FieldDescriptor`]s mapping a tag to an extractor. The query chain walks
//! that table instead of reflecting over the request at runtime.

use super::types::FieldValue;

/// Reserved field name that carries free-text search terms
pub const SEARCH_WORD_COLUMN: &str = "search_word";

/// Column reported for a field declared without a tag
pub const UNMAPPED_COLUMN: &str = "-";

/// One filterable field of a request type
pub struct FieldDescriptor<R: ?Sized> {
    /// Declared tag, e.g. `"user_id,omitempty"`
    pub tag: &'static str,
    pub extract: fn(&R) -> FieldValue<'_>,
}

impl<R: ?Sized> FieldDescriptor<R> {
    pub const fn new(tag: &'static str, extract: fn(&R) -> FieldValue<'_>) -> Self {
        Self { tag, extract }
    }

    /// Column name: first comma-separated segment of the tag
    pub fn column(&self) -> &'static str {
        column_from_tag(self.tag)
    }

    pub fn value<'r>(&self, req: &'r R) -> FieldValue<'r> {
        (self.extract)(req)
    }
}

pub fn column_from_tag(tag: &'static str) -> &'static str {
    match tag.split(',').next() {
        Some(name) if !name.is_empty() => name,
        _ => UNMAPPED_COLUMN,
    }
}

/// A request whose fields can be turned into WHERE predicates
pub trait FilterRequest: 'static {
    fn fields() -> &'static [FieldDescriptor<Self>];

    fn sort_key(&self) -> Option<&str> {
        None
    }

    fn reverse(&self) -> bool {
        false
    }
}

/// A request carrying paging values
pub trait Paginated {
    fn offset(&self) -> u32;
    fn limit(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_is_first_tag_segment() {
        assert_eq!(column_from_tag("user_id,omitempty"), "user_id");
        assert_eq!(column_from_tag("email"), "email");
    }

    #[test]
    fn empty_tag_is_unmapped() {
        assert_eq!(column_from_tag(""), UNMAPPED_COLUMN);
        assert_eq!(column_from_tag(",omitempty"), UNMAPPED_COLUMN);
    }

    struct Team {
        name: String,
    }

    #[test]
    fn descriptor_extracts_value() {
        let desc: FieldDescriptor<Team> =
            FieldDescriptor::new("name,omitempty", |t| FieldValue::Str(&t.name));
        let team = Team {
            name: "ops".to_string(),
        };
        assert_eq!(desc.column(), "name");
        assert_eq!(desc.value(&team), FieldValue::Str("ops"));
    }
}
