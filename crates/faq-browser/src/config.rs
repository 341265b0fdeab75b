use std::path::PathBuf;

use crate::error::AppError;
use crate::surface::DEFAULT_TEMPLATE;

pub const DEFAULT_PAGE_URL: &str = "file:///faq/index.html";

/// Application configuration loaded explicitly from environment variables.
///
/// Nothing here is required: without a knowledge base the browser starts empty,
/// and without an HTML output path only the terminal surface is drawn.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON knowledge base (flat list or category mapping).
    pub kb_path: Option<PathBuf>,
    /// Page URL whose `device` parameter selects the initial category.
    pub page_url: String,
    /// Declared chip labels; derived from the collection when empty.
    pub categories: Vec<String>,
    /// Where the HTML surface writes the page on every draw.
    pub html_out: Option<PathBuf>,
    /// Page template used by the HTML surface.
    pub html_template: String,
    /// Command that receives copied text on stdin.
    pub clipboard_cmd: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `FAQ_KB_PATH`: knowledge base JSON file
    /// - `FAQ_PAGE_URL`: initial page URL (default: `file:///faq/index.html`)
    /// - `FAQ_CATEGORIES`: comma-separated chip labels
    /// - `FAQ_HTML_OUT`: HTML page output path
    /// - `FAQ_HTML_TEMPLATE`: HTML page template (must be readable when set)
    /// - `FAQ_CLIPBOARD_CMD`: clipboard command, e.g. "xclip -selection clipboard"
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let html_template = match var("FAQ_HTML_TEMPLATE") {
            Some(path) => std::fs::read_to_string(&path).map_err(|e| {
                AppError::Config(format!("FAQ_HTML_TEMPLATE {path} is not readable: {e}"))
            })?,
            None => DEFAULT_TEMPLATE.to_string(),
        };

        let categories = var("FAQ_CATEGORIES")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            kb_path: var("FAQ_KB_PATH").map(PathBuf::from),
            page_url: var("FAQ_PAGE_URL").unwrap_or_else(|| DEFAULT_PAGE_URL.to_string()),
            categories,
            html_out: var("FAQ_HTML_OUT").map(PathBuf::from),
            html_template,
            clipboard_cmd: var("FAQ_CLIPBOARD_CMD"),
        })
    }
}
