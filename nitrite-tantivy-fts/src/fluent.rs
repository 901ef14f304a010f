//! Fluent API for FTS queries.
//!
//! This module provides a builder-pattern API for constructing FTS filters
//! in a readable and intuitive way.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nitrite_tantivy_fts::fts_field;
//!
//! // Simple text search
//! let filter = fts_field("content").matches("search terms");
//!
//! // Phrase search
//! let filter = fts_field("content").phrase("exact phrase");
//! ```

use nitrite::filter::Filter;

use crate::filter::{PhraseFilter, TextSearchFilter};

/// Entry point for building FTS queries on a field.
///
/// ## Example
///
/// ```rust,ignore
/// use nitrite_tantivy_fts::fts_field;
///
/// let filter = fts_field("content").matches("hello world");
/// ```
pub fn fts_field(field: &str) -> FtsFluentFilter {
    FtsFluentFilter::new(field)
}

/// Fluent builder for FTS filters.
pub struct FtsFluentFilter {
    field: String,
}

impl FtsFluentFilter {
    /// Creates a new fluent filter for the given field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Creates a text search filter that matches documents containing
    /// any of the specified search terms.
    ///
    /// The query is parsed by Tantivy's query parser, which supports:
    /// - Multiple terms (OR by default)
    /// - Required terms with `+` prefix
    /// - Excluded terms with `-` prefix
    /// - Boolean operators (AND, OR, NOT)
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use nitrite_tantivy_fts::fts_field;
    ///
    /// // Match documents containing "hello" OR "world"
    /// let filter = fts_field("content").matches("hello world");
    ///
    /// // Match documents containing "hello" AND "world"
    /// let filter = fts_field("content").matches("+hello +world");
    /// ```
    pub fn matches(self, query: impl Into<String>) -> Filter {
        Filter::new(TextSearchFilter::new(self.field, query))
    }

    /// Creates a phrase filter that matches documents containing
    /// the exact phrase specified.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use nitrite_tantivy_fts::fts_field;
    ///
    /// // Match documents containing the exact phrase "hello world"
    /// let filter = fts_field("content").phrase("hello world");
    /// ```
    pub fn phrase(self, phrase: impl Into<String>) -> Filter {
        Filter::new(PhraseFilter::new(self.field, phrase))
    }

    /// Alias for `matches` - creates a text search filter.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use nitrite_tantivy_fts::fts_field;
    ///
    /// let filter = fts_field("content").contains("search terms");
    /// ```
    pub fn contains(self, query: impl Into<String>) -> Filter {
        self.matches(query)
    }

    /// Alias for `matches` - creates a text search filter.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use nitrite_tantivy_fts::fts_field;
    ///
    /// let filter = fts_field("content").text("search terms");
    /// ```
    pub fn text(self, query: impl Into<String>) -> Filter {
        self.matches(query)
    }
}
