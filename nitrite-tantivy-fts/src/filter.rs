//! FTS filters for querying text in Nitrite collections.
//!
//! This module provides filter types for full-text search queries:
//! - `TextSearchFilter` - finds documents matching a text query
//! - `PhraseFilter` - finds documents containing an exact phrase

use std::any::Any;
use std::fmt::{self, Display};
use std::sync::Arc;

use nitrite::collection::Document;
use nitrite::common::Value;
use nitrite::errors::NitriteResult;
use nitrite::filter::{Filter, FilterProvider};

use parking_lot::RwLock;

/// The index type name for FTS indexes.
pub const FTS_INDEX: &str = "tantivy-fts";

/// Base trait for FTS filters.
pub trait FtsFilter: Send + Sync {
    /// Returns the query string for this filter.
    fn query_string(&self) -> String;

    /// Returns the field name this filter applies to.
    fn field_name(&self) -> String;
}

/// Filter that finds documents matching a text query.
///
/// Uses Tantivy's query parser to match documents containing
/// the specified search terms.
#[derive(Clone)]
pub struct TextSearchFilter {
    inner: Arc<TextSearchFilterInner>,
}

struct TextSearchFilterInner {
    field: RwLock<String>,
    query: String,
}

impl TextSearchFilter {
    /// Creates a new text search filter.
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TextSearchFilterInner {
                field: RwLock::new(field.into()),
                query: query.into(),
            }),
        }
    }

    /// Returns the search query.
    pub fn query(&self) -> &str {
        &self.inner.query
    }
}

impl FtsFilter for TextSearchFilter {
    fn query_string(&self) -> String {
        self.inner.query.clone()
    }

    fn field_name(&self) -> String {
        self.inner.field.read().clone()
    }
}

impl FilterProvider for TextSearchFilter {
    fn apply(&self, entry: &Document) -> NitriteResult<bool> {
        let field = self.inner.field.read();
        let value = entry.get(&field)?;

        match value {
            Value::String(s) => {
                // Simple contains check for document-level filtering
                // The actual FTS search is done via the index
                let query_lower = self.inner.query.to_lowercase();
                let text_lower = s.to_lowercase();
                
                // Check if any query term is in the text
                for term in query_lower.split_whitespace() {
                    if text_lower.contains(term) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Value::Null => Ok(false),
            _ => Ok(false),
        }
    }

    fn has_field(&self) -> bool {
        true
    }

    fn get_field_name(&self) -> NitriteResult<String> {
        Ok(self.inner.field.read().clone())
    }

    fn set_field_name(&self, field_name: String) -> NitriteResult<()> {
        *self.inner.field.write() = field_name;
        Ok(())
    }

    fn is_index_only_filter(&self) -> bool {
        true
    }

    fn supported_index_type(&self) -> NitriteResult<String> {
        Ok(FTS_INDEX.to_string())
    }

    fn can_be_grouped(&self, other: Filter) -> NitriteResult<bool> {
        // Can be grouped with other FTS filters on the same field
        if let Some(other_fts) = other.as_any().downcast_ref::<TextSearchFilter>() {
            let self_field = self.inner.field.read();
            let other_field = other_fts.inner.field.read();
            return Ok(*self_field == *other_field);
        }
        if let Some(other_phrase) = other.as_any().downcast_ref::<PhraseFilter>() {
            let self_field = self.inner.field.read();
            let other_field = other_phrase.inner.field.read();
            return Ok(*self_field == *other_field);
        }
        Ok(false)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for TextSearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.inner.field.read();
        write!(f, "TextSearchFilter({}: '{}')", field, self.inner.query)
    }
}

/// Filter that finds documents containing an exact phrase.
#[derive(Clone)]
pub struct PhraseFilter {
    inner: Arc<PhraseFilterInner>,
}

struct PhraseFilterInner {
    field: RwLock<String>,
    phrase: String,
}

impl PhraseFilter {
    /// Creates a new phrase filter.
    pub fn new(field: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(PhraseFilterInner {
                field: RwLock::new(field.into()),
                phrase: phrase.into(),
            }),
        }
    }

    /// Returns the phrase to match.
    pub fn phrase(&self) -> &str {
        &self.inner.phrase
    }
}

impl FtsFilter for PhraseFilter {
    fn query_string(&self) -> String {
        // Wrap phrase in quotes for Tantivy phrase query
        format!("\"{}\"", self.inner.phrase)
    }

    fn field_name(&self) -> String {
        self.inner.field.read().clone()
    }
}

impl FilterProvider for PhraseFilter {
    fn apply(&self, entry: &Document) -> NitriteResult<bool> {
        let field = self.inner.field.read();
        let value = entry.get(&field)?;

        match value {
            Value::String(s) => {
                let text_lower = s.to_lowercase();
                let phrase_lower = self.inner.phrase.to_lowercase();
                Ok(text_lower.contains(&phrase_lower))
            }
            Value::Null => Ok(false),
            _ => Ok(false),
        }
    }

    fn has_field(&self) -> bool {
        true
    }

    fn get_field_name(&self) -> NitriteResult<String> {
        Ok(self.inner.field.read().clone())
    }

    fn set_field_name(&self, field_name: String) -> NitriteResult<()> {
        *self.inner.field.write() = field_name;
        Ok(())
    }

    fn is_index_only_filter(&self) -> bool {
        true
    }

    fn supported_index_type(&self) -> NitriteResult<String> {
        Ok(FTS_INDEX.to_string())
    }

    fn can_be_grouped(&self, other: Filter) -> NitriteResult<bool> {
        if let Some(other_fts) = other.as_any().downcast_ref::<TextSearchFilter>() {
            let self_field = self.inner.field.read();
            let other_field = other_fts.inner.field.read();
            return Ok(*self_field == *other_field);
        }
        if let Some(other_phrase) = other.as_any().downcast_ref::<PhraseFilter>() {
            let self_field = self.inner.field.read();
            let other_field = other_phrase.inner.field.read();
            return Ok(*self_field == *other_field);
        }
        Ok(false)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for PhraseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.inner.field.read();
        write!(f, "PhraseFilter({}: \"{}\")", field, self.inner.phrase)
    }
}

/// Checks if a filter is an FTS filter.
pub fn is_fts_filter(filter: &Filter) -> bool {
    filter.as_any().is::<TextSearchFilter>() || filter.as_any().is::<PhraseFilter>()
}

/// Attempts to cast a filter to an FtsFilter trait object.
pub fn as_fts_filter(filter: &Filter) -> Option<&dyn FtsFilter> {
    if let Some(text_filter) = filter.as_any().downcast_ref::<TextSearchFilter>() {
        return Some(text_filter);
    }
    if let Some(phrase_filter) = filter.as_any().downcast_ref::<PhraseFilter>() {
        return Some(phrase_filter);
    }
    None
}
