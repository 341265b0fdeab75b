use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Category selector meaning "no category restriction".
pub const ALL_CATEGORY: &str = "All";

/// A normalized question/answer entry. Never mutated once the collection is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Source id, or `<4-char category prefix>_<NN>` when the source had none
    pub id: String,
    /// Trimmed category label; empty when the source had none
    pub category: String,
    /// Question text, unescaped
    pub question: String,
    /// Answer text, unescaped; this is what the copy action writes
    pub answer: String,
    pub tags: Vec<String>,
}

/// An entry as it appears in the raw data source.
///
/// Field names follow both the long form and the short keys (`q`, `a`, `cat`)
/// that hand-written data files use. When both spellings are present the long
/// one wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "EntryFields")]
pub struct RawEntry {
    pub id: Option<String>,
    pub category: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
struct EntryFields {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    cat: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    question: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    q: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    answer: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    a: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    tags: Vec<String>,
}

impl From<EntryFields> for RawEntry {
    fn from(fields: EntryFields) -> Self {
        Self {
            id: fields.id,
            category: fields.category.or(fields.cat),
            question: fields.question.or(fields.q),
            answer: fields.answer.or(fields.a),
            tags: fields.tags,
        }
    }
}

/// A declared category and how many items carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub label: String,
    pub item_count: usize,
}

/// A selectable category control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    /// Category label attached to the chip
    pub label: String,
    pub active: bool,
}

impl Chip {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            active: false,
        }
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Value::deserialize(deserializer)? {
        Value::Array(values) => values.into_iter().filter_map(scalar_to_string).collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    };
    Ok(tags)
}
