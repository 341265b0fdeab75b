/// Rendering surfaces: the imperative step that draws a [`ViewModel`].
use std::io::Write;
use std::path::PathBuf;

use askama::Template;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::model::Chip;
use crate::view::{CardView, ViewModel};

pub const CHIPS_MARKER: &str = "<!-- faq:chips -->";
pub const SEARCH_MARKER: &str = "<!-- faq:search -->";
pub const RESULTS_MARKER: &str = "<!-- faq:results -->";
pub const COUNT_MARKER: &str = "<!-- faq:count -->";
pub const EMPTY_MARKER: &str = "<!-- faq:empty -->";
pub const LOAD_MORE_MARKER: &str = "<!-- faq:load-more -->";
pub const TOAST_MARKER: &str = "<!-- faq:toast -->";

pub const DEFAULT_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Help &amp; FAQ</title>
</head>
<body>
<div id="chipsWrap"><!-- faq:chips --></div>
<div class="search"><!-- faq:search --></div>
<p class="stat"><span id="statCount"><!-- faq:count --></span> results</p>
<div id="qaList"><!-- faq:results --></div>
<!-- faq:empty -->
<div id="loadMoreWrap"><!-- faq:load-more --></div>
<!-- faq:toast -->
</body>
</html>
"#;

pub trait Surface {
    fn name(&self) -> &'static str;

    fn draw(&mut self, view: &ViewModel) -> Result<(), AppError>;
}

/// Plain-text surface, one frame per draw.
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Surface for TextSurface<W> {
    fn name(&self) -> &'static str {
        "text"
    }

    fn draw(&mut self, view: &ViewModel) -> Result<(), AppError> {
        let frame = render_text(view);
        self.out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| AppError::Surface(e.to_string()))
    }
}

pub fn render_text(view: &ViewModel) -> String {
    let mut out = String::new();

    let chips: Vec<String> = view
        .chips
        .iter()
        .map(|c| if c.active { format!("[{}*]", c.label) } else { format!("[{}]", c.label) })
        .collect();
    out.push_str(&chips.join(" "));
    out.push('\n');
    out.push_str(&format!("search: {}\n", view.search_text));
    out.push_str(&format!("{} results\n", view.total));

    if view.empty {
        out.push_str("  (no matching questions)\n");
    }
    for (i, card) in view.cards.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}  [Copy] [{}]\n", i + 1, card.question, card.toggle_label()));
        out.push_str(&format!("     {} · {}\n", card.category, card.tags.join(", ")));
        if card.revealed {
            for line in card.answer.lines() {
                out.push_str(&format!("     > {line}\n"));
            }
        }
    }
    if let Some(more) = &view.load_more {
        out.push_str(&format!("[{}]\n", more.label));
    }
    if let Some(note) = &view.notification {
        out.push_str(&format!("! {}\n", note.message));
    }
    out.push('\n');
    out
}

/// HTML page surface. Fills the markers of a page template and rewrites `out_path`
/// on each draw. Without the results or count marker nothing is written; any
/// other missing marker only drops that part.
pub struct HtmlSurface {
    template: String,
    out_path: PathBuf,
}

impl HtmlSurface {
    pub fn new(template: impl Into<String>, out_path: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            out_path: out_path.into(),
        }
    }
}

impl Surface for HtmlSurface {
    fn name(&self) -> &'static str {
        "html"
    }

    fn draw(&mut self, view: &ViewModel) -> Result<(), AppError> {
        let Some(page) = render_page(&self.template, view)? else {
            warn!(path = %self.out_path.display(), "page template lacks results or count marker, skipping render");
            return Ok(());
        };
        std::fs::write(&self.out_path, page).map_err(|e| {
            AppError::Surface(format!("failed to write {}: {e}", self.out_path.display()))
        })?;
        debug!(path = %self.out_path.display(), cards = view.shown(), "html page written");
        Ok(())
    }
}

#[derive(Template)]
#[template(
    source = r#"{% for chip in chips %}<button type="button" class="chip{% if chip.active %} active{% endif %}" data-cat="{{ chip.label }}">{{ chip.label }}</button>{% endfor %}"#,
    ext = "html"
)]
struct ChipsFragment<'a> {
    chips: &'a [Chip],
}

#[derive(Template)]
#[template(
    source = r#"<input id="searchBox" type="search" value="{{ text }}"><button id="searchBtn" type="button">Search</button>"#,
    ext = "html"
)]
struct SearchFragment<'a> {
    text: &'a str,
}

struct CardRow<'a> {
    card: &'a CardView,
    tags: String,
    /// Percent-encoded raw answer
    copy: String,
}

#[derive(Template)]
#[template(
    source = r#"{% for row in rows %}<div class="card-fix" data-cat="{{ row.card.category }}">
  <div class="qa-title">{{ row.card.question }}</div>
  <div class="qa-meta">{{ row.card.category }} · {{ row.tags }}</div>
  <button class="btn btn-sm btn-outline-light" data-copy="{{ row.copy }}">Copy</button>
  <button class="btn btn-sm btn-outline-secondary btn-show" data-id="{{ row.card.id }}">{{ row.card.toggle_label() }}</button>
  <div id="ans_{{ row.card.id }}" class="answer" style="display:{% if row.card.revealed %}block{% else %}none{% endif %};">{{ row.card.answer }}</div>
</div>
{% endfor %}"#,
    ext = "html"
)]
struct CardsFragment<'a> {
    rows: Vec<CardRow<'a>>,
}

#[derive(Template)]
#[template(
    source = r#"<div id="emptyNote" style="display:{% if visible %}block{% else %}none{% endif %};">No matching questions.</div>"#,
    ext = "html"
)]
struct EmptyFragment {
    visible: bool,
}

#[derive(Template)]
#[template(
    source = r#"<button type="button" class="btn btn-outline-light">{{ label }}</button>"#,
    ext = "html"
)]
struct LoadMoreFragment<'a> {
    label: &'a str,
}

#[derive(Template)]
#[template(source = r#"<div class="toast" data-ms="{{ duration_ms }}">{{ message }}</div>"#, ext = "html")]
struct ToastFragment<'a> {
    message: &'a str,
    duration_ms: u64,
}

/// The filled-in page, or `None` when a required marker is missing.
///
/// Fragments are rendered (and escaped) by askama; the page shell itself is
/// user-supplied, so its markers are substituted at runtime.
pub fn render_page(template: &str, view: &ViewModel) -> Result<Option<String>, AppError> {
    if !template.contains(RESULTS_MARKER) || !template.contains(COUNT_MARKER) {
        return Ok(None);
    }

    let chips = ChipsFragment { chips: &view.chips }.render()?;
    let search = SearchFragment { text: &view.search_text }.render()?;
    let results = CardsFragment {
        rows: view
            .cards
            .iter()
            .map(|card| CardRow {
                card,
                tags: card.tags.join(", "),
                copy: urlencoding::encode(&card.answer).into_owned(),
            })
            .collect(),
    }
    .render()?;
    let empty = EmptyFragment { visible: view.empty }.render()?;
    let load_more = match &view.load_more {
        Some(more) => LoadMoreFragment { label: &more.label }.render()?,
        None => String::new(),
    };
    let toast = match &view.notification {
        Some(note) => ToastFragment {
            message: &note.message,
            duration_ms: note.duration_ms,
        }
        .render()?,
        None => String::new(),
    };

    Ok(Some(
        template
            .replace(CHIPS_MARKER, &chips)
            .replace(SEARCH_MARKER, &search)
            .replace(RESULTS_MARKER, &results)
            .replace(COUNT_MARKER, &view.total.to_string())
            .replace(EMPTY_MARKER, &empty)
            .replace(LOAD_MORE_MARKER, &load_more)
            .replace(TOAST_MARKER, &toast),
    ))
}
