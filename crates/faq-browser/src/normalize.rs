use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::AppError;
use crate::model::{Category, Item, RawEntry};

const FLAT_KEYS: [&str; 2] = ["kb", "KB"];
const BY_CATEGORY_KEYS: [&str; 2] = ["by_category", "dataByCategory"];

/// The raw knowledge base in whichever shapes the source provides.
#[derive(Debug, Clone, Default)]
pub struct RawSource {
    /// Ordered entries, each carrying its own category
    pub flat: Option<Vec<Value>>,
    /// Category label → ordered entries; the key supplies the category
    pub by_category: Option<Map<String, Value>>,
}

impl RawSource {
    /// Accepts a top-level array (flat), an object with `kb` / `by_category`
    /// members, or any other object (treated as a category mapping).
    pub fn from_document(document: Value) -> Self {
        match document {
            Value::Array(entries) => Self {
                flat: Some(entries),
                by_category: None,
            },
            Value::Object(mut map) => {
                let flat = take_member(&mut map, &FLAT_KEYS).and_then(|v| match v {
                    Value::Array(entries) => Some(entries),
                    other => {
                        warn!(kind = value_kind(&other), "flat knowledge base is not an array, ignoring");
                        None
                    }
                });
                let by_category =
                    take_member(&mut map, &BY_CATEGORY_KEYS).and_then(|v| match v {
                        Value::Object(m) => Some(m),
                        other => {
                            warn!(kind = value_kind(&other), "category mapping is not an object, ignoring");
                            None
                        }
                    });
                if flat.is_none() && by_category.is_none() {
                    Self {
                        flat: None,
                        by_category: Some(map),
                    }
                } else {
                    Self { flat, by_category }
                }
            }
            other => {
                warn!(kind = value_kind(&other), "unsupported knowledge base document");
                Self::default()
            }
        }
    }
}

/// Reads and normalizes a JSON knowledge base file.
pub fn load_source(path: &Path) -> Result<Vec<Item>, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::Source {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let document: Value = serde_json::from_str(&content).map_err(|e| AppError::Source {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(normalize(RawSource::from_document(document)))
}

/// Like [`load_source`], but an absent or malformed source yields an empty collection.
pub fn load_or_empty(path: Option<&Path>) -> Vec<Item> {
    let Some(path) = path else {
        info!("no knowledge base configured, starting with an empty collection");
        return Vec::new();
    };
    load_source(path)
        .inspect_err(|e| warn!(error = %e, "knowledge base unavailable, starting with an empty collection"))
        .unwrap_or_default()
}

/// Builds the collection, preferring a non-empty flat list over the category mapping.
pub fn normalize(source: RawSource) -> Vec<Item> {
    match source {
        RawSource {
            flat: Some(entries),
            ..
        } if !entries.is_empty() => normalize_flat(entries),
        RawSource {
            by_category: Some(map),
            ..
        } => normalize_by_category(map),
        _ => Vec::new(),
    }
}

pub fn normalize_flat(entries: Vec<Value>) -> Vec<Item> {
    let mut seen_per_category: HashMap<String, usize> = HashMap::new();
    let mut items = Vec::with_capacity(entries.len());

    for (position, value) in entries.into_iter().enumerate() {
        let Some(entry) = parse_entry(value, position) else {
            continue;
        };
        let category = entry.category.as_deref().unwrap_or("").trim().to_string();
        let seq = seen_per_category
            .entry(category.to_lowercase())
            .and_modify(|n| *n += 1)
            .or_insert(1);
        let fallback_id = synthesize_id(&category, *seq);
        items.push(to_item(entry, category, fallback_id));
    }

    info!(items = items.len(), "normalized flat knowledge base");
    items
}

pub fn normalize_by_category(map: Map<String, Value>) -> Vec<Item> {
    let mut items = Vec::new();

    for (key, list) in map {
        let entries = match list {
            Value::Array(entries) => entries,
            Value::Null => Vec::new(),
            other => {
                warn!(category = %key, kind = value_kind(&other), "category entries are not a list, skipping");
                continue;
            }
        };
        let category = key.trim().to_string();
        for (index, value) in entries.into_iter().enumerate() {
            let Some(entry) = parse_entry(value, index) else {
                continue;
            };
            let fallback_id = synthesize_id(&category, index + 1);
            items.push(to_item(entry, category.clone(), fallback_id));
        }
    }

    info!(items = items.len(), "normalized category-keyed knowledge base");
    items
}

/// `<first 4 chars of the lower-cased category>_<seq, zero-padded to 2 digits>`.
pub fn synthesize_id(category: &str, seq: usize) -> String {
    let prefix: String = category.to_lowercase().chars().take(4).collect();
    format!("{prefix}_{seq:02}")
}

/// Distinct non-empty categories in first-seen order, with their item counts.
pub fn categories(items: &[Item]) -> Vec<Category> {
    let mut out: Vec<Category> = Vec::new();
    for item in items {
        if item.category.is_empty() {
            continue;
        }
        match out.iter_mut().find(|c| c.label == item.category) {
            Some(category) => category.item_count += 1,
            None => out.push(Category {
                label: item.category.clone(),
                item_count: 1,
            }),
        }
    }
    out
}

fn to_item(entry: RawEntry, category: String, fallback_id: String) -> Item {
    Item {
        id: entry.id.filter(|id| !id.is_empty()).unwrap_or(fallback_id),
        category,
        question: entry.question.unwrap_or_default(),
        answer: entry.answer.unwrap_or_default(),
        tags: entry.tags,
    }
}

fn parse_entry(value: Value, position: usize) -> Option<RawEntry> {
    if !value.is_object() {
        warn!(position, kind = value_kind(&value), "skipping knowledge base entry that is not an object");
        return None;
    }
    serde_json::from_value(value)
        .inspect_err(|e| warn!(position, error = %e, "skipping malformed knowledge base entry"))
        .ok()
}

fn take_member(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|k| map.remove(*k))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
