use std::{any::Any, fmt::Display};

use crate::{
    collection::Document,
    errors::NitriteResult,
};

use super::{Filter, FilterProvider};

/// A filter that applies logical AND operation on multiple filters.
///
/// This filter matches documents that satisfy all of the provided filters simultaneously.
/// It uses short-circuit evaluation, returning false immediately when any filter fails.
/// The filters are evaluated in the order they were provided.
///
/// # Responsibilities
///
/// * **Conjunction Evaluation**: Matches documents satisfying all filters
/// * **Filter Composition**: Combines multiple filters into a single condition
/// * **Short-Circuit Logic**: Optimizes evaluation by stopping at first failure
pub(crate) struct AndFilter {
    filters: Vec<Filter>,
}

impl AndFilter {
    /// Creates a new AND filter combining multiple filters.
    ///
    /// # Arguments
    ///
    /// * `filters` - A vector of filters that must all be satisfied
    ///
    /// # Returns
    ///
    /// An `AndFilter` that matches documents satisfying all provided filters
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        AndFilter { filters }
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut filters = String::with_capacity(self.filters.len() * 16);
        for (i, filter) in self.filters.iter().enumerate() {
            filters.push_str(&format!("{}", filter));
            if i < self.filters.len() - 1 {
                filters.push_str(" && ");
            }
        }
        write!(f, "({})", filters)
    }
}

impl FilterProvider for AndFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> NitriteResult<bool> {
        for filter in &self.filters {
            if !filter.apply(entry)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn logical_filters(&self) -> NitriteResult<Vec<Filter>> {
        Ok(self.filters.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that applies logical OR operation on multiple filters.
///
/// This filter matches documents that satisfy at least one of the provided filters.
/// It uses short-circuit evaluation, returning true immediately when any filter succeeds.
/// The filters are evaluated in the order they were provided.
///
/// # Responsibilities
///
/// * **Disjunction Evaluation**: Matches documents satisfying at least one filter
/// * **Filter Composition**: Combines multiple filters with OR logic
/// * **Short-Circuit Logic**: Optimizes evaluation by stopping at first success
pub(crate) struct OrFilter {
    filters: Vec<Filter>,
}

impl OrFilter {
    /// Creates a new OR filter combining multiple filters.
    ///
    /// # Arguments
    ///
    /// * `filters` - A vector of filters where at least one must be satisfied
    ///
    /// # Returns
    ///
    /// An `OrFilter` that matches documents satisfying at least one provided filter
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        OrFilter { filters }
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut filters = String::with_capacity(self.filters.len() * 16);
        for (i, filter) in self.filters.iter().enumerate() {
            filters.push_str(&format!("{}", filter));
            if i < self.filters.len() - 1 {
                filters.push_str(" || ");
            }
        }
        write!(f, "({})", filters)
    }
}

impl FilterProvider for OrFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> NitriteResult<bool> {
        for filter in &self.filters {
            if filter.apply(entry)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn logical_filters(&self) -> NitriteResult<Vec<Filter>> {
        Ok(self.filters.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that applies logical NOT operation on a filter.
///
/// This filter inverts the result of another filter, matching documents that do not satisfy
/// the provided filter. It negates both the matching condition and any internal short-circuit behavior.
///
/// # Responsibilities
///
/// * **Negation**: Inverts the matching condition of the wrapped filter
/// * **Filter Composition**: Combines a single filter with NOT logic
/// * **Result Inversion**: Returns the logical opposite of the wrapped filter's result
pub(crate) struct NotFilter {
    filter: Filter,
}

impl NotFilter {
    /// Creates a new NOT filter inverting the provided filter.
    ///
    /// # Arguments
    ///
    /// * `filter` - The filter to negate
    ///
    /// # Returns
    ///
    /// A `NotFilter` that matches documents not matching the provided filter
    pub(crate) fn new(filter: Filter) -> Self {
        NotFilter { filter }
    }
}

impl Display for NotFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(not {})", self.filter)
    }
}

impl FilterProvider for NotFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> NitriteResult<bool> {
        Ok(!self.filter.apply(entry)?)
    }

    fn logical_filters(&self) -> NitriteResult<Vec<Filter>> {
        Ok(vec![self.filter.clone()])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
