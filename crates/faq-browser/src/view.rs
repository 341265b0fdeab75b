/// Declarative view-model: what a render shows, computed without any surface.
use serde::Serialize;

use faq_common::notify::Notification;

use crate::error::AppError;
use crate::filter::filter_items;
use crate::model::{Chip, Item};
use crate::state::BrowserState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: String,
    pub category: String,
    pub question: String,
    pub answer: String,
    pub tags: Vec<String>,
    /// Whether the answer panel is open
    pub revealed: bool,
}

impl CardView {
    fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            category: item.category.clone(),
            question: item.question.clone(),
            answer: item.answer.clone(),
            tags: item.tags.clone(),
            revealed: false,
        }
    }

    /// Label of the reveal toggle.
    pub fn toggle_label(&self) -> &'static str {
        if self.revealed {
            "Hide"
        } else {
            "Show"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadMore {
    pub label: String,
    pub remaining: usize,
}

impl LoadMore {
    fn new(remaining: usize) -> Self {
        Self {
            label: format!("Load more ({remaining})"),
            remaining,
        }
    }
}

/// A card addressed either by its 1-based position in the visible list or by id.
///
/// Only canonical decimals (`7`, not `007`) parse as positions, so zero-padded
/// ids keep their spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRef {
    Position(usize),
    Id(String),
}

impl CardRef {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<usize>() {
            Ok(n) if n.to_string() == raw => CardRef::Position(n),
            _ => CardRef::Id(raw.to_string()),
        }
    }
}

impl std::fmt::Display for CardRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardRef::Position(n) => write!(f, "#{n}"),
            CardRef::Id(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub chips: Vec<Chip>,
    pub active_category: String,
    pub search_text: String,
    pub cards: Vec<CardView>,
    /// Category+search matches before pagination; the status counter
    pub total: usize,
    /// Show the "no results" indicator
    pub empty: bool,
    pub load_more: Option<LoadMore>,
    pub notification: Option<Notification>,
}

impl ViewModel {
    pub fn shown(&self) -> usize {
        self.cards.len()
    }

    fn position_of(&self, card: &CardRef) -> Option<usize> {
        match card {
            CardRef::Position(n) if (1..=self.cards.len()).contains(n) => Some(n - 1),
            CardRef::Position(n) => {
                let id = n.to_string();
                self.cards.iter().position(|c| c.id == id)
            }
            CardRef::Id(id) => self.cards.iter().position(|c| &c.id == id).or_else(|| {
                id.parse::<usize>()
                    .ok()
                    .filter(|n| (1..=self.cards.len()).contains(n))
                    .map(|n| n - 1)
            }),
        }
    }

    pub fn card(&self, card: &CardRef) -> Result<&CardView, AppError> {
        self.position_of(card)
            .map(|i| &self.cards[i])
            .ok_or_else(|| AppError::ItemNotFound(card.to_string()))
    }

    /// Flips one card's answer panel; the rest of the view is untouched.
    pub fn toggle(&mut self, card: &CardRef) -> Result<&CardView, AppError> {
        let index = self
            .position_of(card)
            .ok_or_else(|| AppError::ItemNotFound(card.to_string()))?;
        let card = &mut self.cards[index];
        card.revealed = !card.revealed;
        Ok(card)
    }
}

/// Builds the view for `state`. With a search term every match is shown;
/// otherwise the active category's page count limits the list.
pub fn build_view(items: &[Item], state: &BrowserState) -> ViewModel {
    let key = state.category_key();
    let term = state.search_term();
    let matches = filter_items(items, key, term);

    let shown = if term.is_empty() {
        state.pagination.visible(key).min(matches.len())
    } else {
        matches.len()
    };
    let cards: Vec<CardView> = matches[..shown].iter().map(|i| CardView::from_item(i)).collect();

    let load_more = (term.is_empty() && matches.len() > shown).then(|| LoadMore::new(matches.len() - shown));

    ViewModel {
        chips: state.selection.chips().to_vec(),
        active_category: key.to_string(),
        search_text: state.search_text.clone(),
        empty: cards.is_empty(),
        cards,
        total: matches.len(),
        load_more,
        notification: None,
    }
}
