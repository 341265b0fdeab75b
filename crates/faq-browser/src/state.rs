use serde::Serialize;

use crate::model::ALL_CATEGORY;
use crate::pagination::Pagination;
use crate::selection::Selection;

/// Everything a render depends on besides the collection itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserState {
    /// Label of the selected chip
    pub active_category: String,
    /// Current search-box text, untrimmed
    pub search_text: String,
    pub pagination: Pagination,
    pub selection: Selection,
    /// Page URL; the `device` query parameter mirrors `active_category`
    pub page_url: String,
}

impl BrowserState {
    pub fn new(selection: Selection, page_url: impl Into<String>) -> Self {
        Self {
            active_category: ALL_CATEGORY.to_string(),
            search_text: String::new(),
            pagination: Pagination::default(),
            selection,
            page_url: page_url.into(),
        }
    }

    /// Pagination key and filter selector for the current render.
    pub fn category_key(&self) -> &str {
        if self.active_category.is_empty() {
            ALL_CATEGORY
        } else {
            &self.active_category
        }
    }

    pub fn search_term(&self) -> &str {
        self.search_text.trim()
    }
}
