use crate::model::{Item, ALL_CATEGORY};

/// Items matching both the category selector and the search term, in collection order.
///
/// The selector matches whole categories, ignoring case and surrounding whitespace;
/// `All` or a blank selector disables the category filter. A non-empty term is a
/// case-insensitive substring test over question, answer and space-joined tags.
pub fn filter_items<'a>(items: &'a [Item], category: &str, search_term: &str) -> Vec<&'a Item> {
    let wanted = category_key(category);
    let term = search_term.to_lowercase();

    items
        .iter()
        .filter(|item| match &wanted {
            Some(wanted) => item.category.trim().to_lowercase() == *wanted,
            None => true,
        })
        .filter(|item| term.is_empty() || haystack(item).contains(&term))
        .collect()
}

/// Lower-cased selector, or `None` when it does not restrict categories.
fn category_key(category: &str) -> Option<String> {
    let trimmed = category.trim();
    if trimmed.is_empty() || trimmed == ALL_CATEGORY {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn haystack(item: &Item) -> String {
    format!("{} {} {}", item.question, item.answer, item.tags.join(" ")).to_lowercase()
}
