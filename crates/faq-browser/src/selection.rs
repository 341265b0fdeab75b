/// Category chip selection and its mirror in the page URL.
///
/// The `device` query parameter holds the lower-cased active category and is
/// absent while `All` is selected, so a URL reproduces the selection it was
/// written for.
use serde::Serialize;
use tracing::debug;

use faq_common::url::{read_query_param, PageUrl};

use crate::model::{Category, Chip, ALL_CATEGORY};

pub const DEVICE_PARAM: &str = "device";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    chips: Vec<Chip>,
}

impl Selection {
    /// Declared chips in order. `All` is always present and first; blanks and
    /// case-insensitive duplicates are dropped.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut chips = vec![Chip::new(ALL_CATEGORY)];
        for label in labels {
            let label: String = label.into();
            let key = label.trim().to_lowercase();
            if key.is_empty() || chips.iter().any(|c| c.label.trim().to_lowercase() == key) {
                continue;
            }
            chips.push(Chip::new(label));
        }
        Self { chips }
    }

    pub fn from_categories(categories: &[Category]) -> Self {
        Self::new(categories.iter().map(|c| c.label.clone()))
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    /// Chip whose trimmed label equals `label` case-insensitively.
    pub fn find(&self, label: &str) -> Option<&Chip> {
        let wanted = label.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.chips
            .iter()
            .find(|c| c.label.trim().to_lowercase() == wanted)
    }

    /// Makes the matching chip the only active one and returns its trimmed label.
    pub fn activate(&mut self, label: &str) -> Option<String> {
        let wanted = self.find(label)?.label.clone();
        for chip in &mut self.chips {
            chip.active = chip.label == wanted;
        }
        Some(wanted.trim().to_string())
    }
}

/// Category requested by the page URL, if it names a declared chip.
pub fn requested_category(selection: &Selection, href: &str) -> Option<String> {
    let requested = read_query_param(href, DEVICE_PARAM)?;
    let chip = selection.find(&requested)?;
    Some(chip.label.trim().to_string())
}

/// `href` with the `device` parameter rewritten for `category`.
/// Returns `None` when `href` cannot be parsed; the caller keeps the old URL.
pub fn url_for_category(href: &str, category: &str) -> Option<String> {
    let mut url = PageUrl::parse(href)
        .inspect_err(|e| debug!(error = %e, "page url not updated"))
        .ok()?;
    let category = category.trim();
    if category.is_empty() || category == ALL_CATEGORY {
        url.remove_query_param(DEVICE_PARAM);
    } else {
        url.set_query_param(DEVICE_PARAM, &category.to_lowercase());
    }
    Some(url.to_string())
}
