use std::collections::BTreeMap;

use serde::Serialize;

/// Page size: how many more items each "load more" reveals.
pub const STEP: usize = 8;

/// Per-category visible counts. A category without an entry shows one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    visible: BTreeMap<String, usize>,
}

impl Pagination {
    pub fn get(&self, key: &str) -> Option<usize> {
        self.visible.get(key).copied()
    }

    pub fn visible(&self, key: &str) -> usize {
        self.get(key).unwrap_or(STEP)
    }

    /// Creates the entry for `key` on first view.
    pub fn ensure(&mut self, key: &str) -> usize {
        *self.visible.entry(key.to_string()).or_insert(STEP)
    }

    pub fn reset(&mut self, key: &str) {
        self.visible.insert(key.to_string(), STEP);
    }

    pub fn advance(&mut self, key: &str) -> usize {
        let next = self.visible(key) + STEP;
        self.visible.insert(key.to_string(), next);
        next
    }
}
