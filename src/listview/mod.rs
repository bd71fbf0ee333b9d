//! Client-side sort and search over a fetched collection.
//!
//! The displayed rows are always `filter(search, sort(collection, state))`,
//! derived from the latest snapshot; the collection itself is never reordered.

pub mod error;
pub mod sort;
pub mod types;

pub use error::ListViewError;
pub use sort::{compare, matches, parse_sort, resolve_column, sort};
pub use types::{Column, FieldValue, ListRecord, SortDirection, SortState};

/// Rows ready to render, or a distinct loading marker
#[derive(Debug)]
pub enum DerivedView<'a, R> {
    Loading,
    Ready { rows: Vec<&'a R>, total: usize },
}

impl<'a, R> DerivedView<'a, R> {
    pub fn is_loading(&self) -> bool {
        matches!(self, DerivedView::Loading)
    }

    /// Rows for rendering; empty while loading
    pub fn rows(&self) -> &[&'a R] {
        match self {
            DerivedView::Loading => &[],
            DerivedView::Ready { rows, .. } => rows,
        }
    }

    /// "Showing {shown} of {total} entries"
    pub fn counts(&self) -> (usize, usize) {
        match self {
            DerivedView::Loading => (0, 0),
            DerivedView::Ready { rows, total } => (rows.len(), *total),
        }
    }
}

/// Local search and sort state of one list screen
#[derive(Debug, Clone, Default)]
pub struct ListView {
    search: String,
    sort: SortState,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Column header click
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort.toggle(key);
    }

    /// Derive the visible rows from the snapshot passed in. `None` means the
    /// collection is still loading. Nothing is carried over between calls.
    pub fn derive<'a, R: ListRecord>(&self, collection: Option<&'a [R]>) -> DerivedView<'a, R> {
        match collection {
            None => DerivedView::Loading,
            Some(collection) => DerivedView::Ready {
                rows: derive(collection, &self.search, &self.sort),
                total: collection.len(),
            },
        }
    }
}

/// `filter(search, sort(collection))` without reordering the collection
pub fn derive<'a, R: ListRecord>(collection: &'a [R], search: &str, state: &SortState) -> Vec<&'a R> {
    let mut rows: Vec<&R> = collection.iter().collect();
    sort(&mut rows, state);
    rows.retain(|r| matches(*r, search));
    rows
}
