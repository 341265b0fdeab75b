/// Event dispatch for the FAQ browser.
///
/// State changes go through [`reduce`], a pure function from (state, event) to the
/// next state. [`App`] owns the immutable collection, applies reduced states,
/// renders them into a [`ViewModel`] and presents it on every surface. Per-card
/// interactions (reveal, copy) and notifications act on the last view only.
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use faq_common::clipboard::{Clipboard, CopyOutcome};
use faq_common::notify::Notification;

use crate::error::AppError;
use crate::model::{Category, Item, ALL_CATEGORY};
use crate::normalize::categories;
use crate::selection::{requested_category, url_for_category};
use crate::state::BrowserState;
use crate::surface::Surface;
use crate::view::{build_view, CardRef, ViewModel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A chip was activated
    SelectCategory(String),
    /// The search box now holds this text; nothing is re-rendered
    TypeSearch(String),
    /// Search trigger or confirm key in the search box
    SubmitSearch,
    LoadMore,
    ToggleAnswer(CardRef),
    CopyAnswer(CardRef),
    Render,
}

/// What the host must do after a reduced event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Render,
}

/// Applies a state-changing event. Card-level events leave the state untouched.
pub fn reduce(mut state: BrowserState, event: &Event) -> Result<(BrowserState, Effect), AppError> {
    match event {
        Event::SelectCategory(label) => {
            let category = state
                .selection
                .activate(label)
                .ok_or_else(|| AppError::UnknownCategory(label.clone()))?;
            state.pagination.reset(&category);
            state.search_text.clear();
            if let Some(url) = url_for_category(&state.page_url, &category) {
                state.page_url = url;
            }
            state.active_category = category;
            Ok((state, Effect::Render))
        }
        Event::TypeSearch(text) => {
            state.search_text = text.clone();
            Ok((state, Effect::None))
        }
        Event::SubmitSearch => {
            let key = state.category_key().to_string();
            state.pagination.reset(&key);
            Ok((state, Effect::Render))
        }
        Event::LoadMore => {
            let key = state.category_key().to_string();
            state.pagination.advance(&key);
            Ok((state, Effect::Render))
        }
        Event::Render => Ok((state, Effect::Render)),
        Event::ToggleAnswer(_) | Event::CopyAnswer(_) => Ok((state, Effect::None)),
    }
}

/// Startup selection: the chip named by the URL's `device` parameter, else `All`.
pub fn initial_state(state: BrowserState) -> BrowserState {
    if let Some(category) = requested_category(&state.selection, &state.page_url) {
        match reduce(state.clone(), &Event::SelectCategory(category)) {
            Ok((selected, _)) => return selected,
            Err(e) => warn!(error = %e, "requested category could not be selected"),
        }
    }

    let mut state = state;
    state.selection.activate(ALL_CATEGORY);
    state.active_category = ALL_CATEGORY.to_string();
    state.pagination.reset(ALL_CATEGORY);
    state
}

/// Read-only view of the loaded collection for inspection and tests.
#[derive(Debug, Clone, Serialize)]
pub struct FaqHandle {
    pub raw_count: usize,
    pub categories: Vec<Category>,
    pub kb: Arc<[Item]>,
}

pub struct App {
    items: Arc<[Item]>,
    state: BrowserState,
    view: Option<ViewModel>,
    notification: Option<Notification>,
    surfaces: Vec<Box<dyn Surface>>,
    clipboard: Clipboard,
    notices: mpsc::UnboundedSender<Notification>,
}

impl App {
    pub fn new(
        items: Vec<Item>,
        state: BrowserState,
        surfaces: Vec<Box<dyn Surface>>,
        clipboard: Clipboard,
        notices: mpsc::UnboundedSender<Notification>,
    ) -> Self {
        Self {
            items: items.into(),
            state,
            view: None,
            notification: None,
            surfaces,
            clipboard,
            notices,
        }
    }

    /// Applies the URL's selection and draws the first frame.
    pub fn start(&mut self) {
        self.state = initial_state(self.state.clone());
        info!(
            items = self.items.len(),
            category = %self.state.active_category,
            url = %self.state.page_url,
            "faq browser started"
        );
        self.render();
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn view(&self) -> Option<&ViewModel> {
        self.view.as_ref()
    }

    pub fn handle_info(&self) -> FaqHandle {
        FaqHandle {
            raw_count: self.items.len(),
            categories: categories(&self.items),
            kb: Arc::clone(&self.items),
        }
    }

    pub fn dispatch(&mut self, event: Event) -> Result<(), AppError> {
        match &event {
            Event::ToggleAnswer(card) => return self.toggle_answer(card),
            Event::CopyAnswer(card) => return self.copy_answer(card),
            Event::LoadMore if self.view.as_ref().is_some_and(|v| v.load_more.is_none()) => {
                debug!("load more ignored, no control shown");
                return Ok(());
            }
            _ => {}
        }

        let previous_url = self.state.page_url.clone();
        let (state, effect) = reduce(self.state.clone(), &event)?;
        self.state = state;
        if self.state.page_url != previous_url {
            info!(url = %self.state.page_url, "page url replaced");
        }
        if effect == Effect::Render {
            self.render();
        }
        Ok(())
    }

    /// Recomputes the view from state and draws it. Every card starts hidden.
    pub fn render(&mut self) -> &ViewModel {
        let key = self.state.category_key().to_string();
        self.state.pagination.ensure(&key);

        let view = build_view(&self.items, &self.state);
        debug!(
            category = %view.active_category,
            shown = view.shown(),
            total = view.total,
            "rendered"
        );
        self.view = Some(view);
        self.present()
    }

    /// Shows a notification without re-rendering the list.
    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
        self.present();
    }

    /// When the shown notification should disappear, if one is shown.
    pub fn notification_deadline(&self) -> Option<Instant> {
        self.notification.as_ref().map(Notification::expires_at)
    }

    /// Redraws without the notification once it has expired.
    pub fn expire_notification(&mut self) {
        if self.notification.as_ref().is_some_and(Notification::is_expired) {
            debug!("notification expired");
            self.present();
        }
    }

    fn toggle_answer(&mut self, card: &CardRef) -> Result<(), AppError> {
        let view = self.view.as_mut().ok_or_else(|| AppError::ItemNotFound(card.to_string()))?;
        let toggled = view.toggle(card)?;
        debug!(id = %toggled.id, revealed = toggled.revealed, "answer toggled");
        self.present();
        Ok(())
    }

    fn copy_answer(&mut self, card: &CardRef) -> Result<(), AppError> {
        let view = self.view.as_ref().ok_or_else(|| AppError::ItemNotFound(card.to_string()))?;
        let answer = view.card(card)?.answer.clone();

        let clipboard = self.clipboard.clone();
        let notices = self.notices.clone();
        tokio::spawn(async move {
            let outcome = clipboard.copy(&answer).await;
            if outcome != CopyOutcome::Copied {
                warn!(outcome = ?outcome, "copy did not complete");
            }
            let _ = notices.send(outcome.notification());
        });
        Ok(())
    }

    fn present(&mut self) -> &ViewModel {
        if self.notification.as_ref().is_some_and(Notification::is_expired) {
            self.notification = None;
        }
        let view = self.view.get_or_insert_with(|| build_view(&self.items, &self.state));
        view.notification = self.notification.clone();

        for surface in &mut self.surfaces {
            if let Err(e) = surface.draw(view) {
                warn!(surface = surface.name(), error = %e, "surface draw failed");
            }
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::pagination::STEP;
    use crate::selection::Selection;

    /// Records every frame it is asked to draw.
    #[derive(Clone, Default)]
    struct Recorder {
        frames: Rc<RefCell<Vec<ViewModel>>>,
    }

    impl Surface for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn draw(&mut self, view: &ViewModel) -> Result<(), AppError> {
            self.frames.borrow_mut().push(view.clone());
            Ok(())
        }
    }

    fn item(id: &str, category: &str, question: &str) -> Item {
        Item {
            id: id.to_string(),
            category: category.to_string(),
            question: question.to_string(),
            answer: format!("answer to {question}"),
            tags: Vec::new(),
        }
    }

    fn kb() -> Vec<Item> {
        let mut items: Vec<Item> = (1..=10)
            .map(|i| item(&format!("phon_{i:02}"), "Phones", &format!("phone question {i}")))
            .collect();
        items.push(item("lapt_01", "Laptops", "battery lasts two hours"));
        items.push(item("lapt_02", "Laptops", "hinge squeaks"));
        items.push(item("tv_01", "TV", "remote battery died"));
        items
    }

    fn app_at(url: &str) -> (App, Recorder, mpsc::UnboundedReceiver<Notification>) {
        let recorder = Recorder::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let state = BrowserState::new(Selection::new(["Phones", "Laptops", "TV"]), url);
        let app = App::new(
            kb(),
            state,
            vec![Box::new(recorder.clone())],
            Clipboard::new(Some("cat")),
            tx,
        );
        (app, recorder, rx)
    }

    fn started(url: &str) -> (App, Recorder, mpsc::UnboundedReceiver<Notification>) {
        let (mut app, recorder, rx) = app_at(url);
        app.start();
        (app, recorder, rx)
    }

    fn view(app: &App) -> &ViewModel {
        app.view().expect("rendered")
    }

    #[test]
    fn starts_on_all_without_param() {
        let (app, recorder, _rx) = started("https://shop.example/help");
        assert_eq!(app.state().active_category, "All");
        assert_eq!(app.state().pagination.get("All"), Some(STEP));
        assert_eq!(view(&app).chips[0].label, "All");
        assert!(view(&app).chips[0].active);
        assert_eq!(view(&app).shown(), STEP);
        assert_eq!(view(&app).total, 13);
        assert_eq!(recorder.frames.borrow().len(), 1);
    }

    #[test]
    fn url_param_selects_chip() {
        let (app, _, _rx) = started("https://shop.example/help?device=LAPTOPS");
        assert_eq!(app.state().active_category, "Laptops");
        assert_eq!(app.state().page_url, "https://shop.example/help?device=laptops");
        let active: Vec<&str> = view(&app).chips.iter().filter(|c| c.active).map(|c| c.label.as_str()).collect();
        assert_eq!(active, ["Laptops"]);
        assert_eq!(view(&app).total, 2);
    }

    #[test]
    fn unknown_or_malformed_param_falls_back_to_all() {
        for url in ["https://shop.example/?device=radios", "garbage url"] {
            let (app, _, _rx) = started(url);
            assert_eq!(app.state().active_category, "All");
            assert_eq!(app.state().page_url, url);
        }
    }

    #[test]
    fn chip_selection_updates_url_and_clears_search() {
        let (mut app, _, _rx) = started("https://shop.example/help");
        app.dispatch(Event::TypeSearch("battery".to_string())).unwrap();
        app.dispatch(Event::SelectCategory("Laptops".to_string())).unwrap();
        assert_eq!(app.state().page_url, "https://shop.example/help?device=laptops");
        assert_eq!(app.state().search_text, "");

        app.dispatch(Event::SelectCategory("All".to_string())).unwrap();
        assert_eq!(app.state().page_url, "https://shop.example/help");

        let (reloaded, _, _rx) = started("https://shop.example/help?device=laptops");
        assert_eq!(reloaded.state().active_category, "Laptops");
    }

    #[test]
    fn unknown_chip_is_an_error_and_changes_nothing() {
        let (mut app, recorder, _rx) = started("https://shop.example/");
        let before = app.state().clone();
        assert!(matches!(
            app.dispatch(Event::SelectCategory("Radios".to_string())),
            Err(AppError::UnknownCategory(_))
        ));
        assert_eq!(app.state(), &before);
        assert_eq!(recorder.frames.borrow().len(), 1);
    }

    #[test]
    fn load_more_walkthrough() {
        let (mut app, _, _rx) = started("https://shop.example/?device=phones");
        assert_eq!(view(&app).shown(), 8);
        assert_eq!(view(&app).load_more.as_ref().map(|m| m.label.as_str()), Some("Load more (2)"));

        app.dispatch(Event::LoadMore).unwrap();
        assert_eq!(app.state().pagination.get("Phones"), Some(16));
        assert_eq!(view(&app).shown(), 10);
        assert!(view(&app).load_more.is_none());

        app.dispatch(Event::LoadMore).unwrap();
        assert_eq!(app.state().pagination.get("Phones"), Some(16));
    }

    #[test]
    fn typing_does_not_render_until_submit() {
        let (mut app, recorder, _rx) = started("https://shop.example/");
        app.dispatch(Event::TypeSearch("battery".to_string())).unwrap();
        assert_eq!(recorder.frames.borrow().len(), 1);
        assert_eq!(view(&app).total, 13);

        app.dispatch(Event::SubmitSearch).unwrap();
        assert_eq!(recorder.frames.borrow().len(), 2);
        let ids: Vec<&str> = view(&app).cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["lapt_01", "tv_01"]);
        assert!(view(&app).load_more.is_none());
        assert_eq!(app.state().active_category, "All");
    }

    #[test]
    fn search_submit_resets_the_page() {
        let (mut app, _, _rx) = started("https://shop.example/");
        app.dispatch(Event::LoadMore).unwrap();
        assert_eq!(app.state().pagination.get("All"), Some(16));
        app.dispatch(Event::SubmitSearch).unwrap();
        assert_eq!(app.state().pagination.get("All"), Some(STEP));
    }

    #[test]
    fn render_is_idempotent() {
        let (mut app, recorder, _rx) = started("https://shop.example/?device=phones");
        app.dispatch(Event::Render).unwrap();
        app.dispatch(Event::Render).unwrap();
        let frames = recorder.frames.borrow();
        assert_eq!(frames[frames.len() - 1], frames[frames.len() - 2]);
    }

    #[test]
    fn reveal_toggles_and_resets_on_render() {
        let (mut app, recorder, _rx) = started("https://shop.example/");
        app.dispatch(Event::ToggleAnswer(CardRef::Position(2))).unwrap();
        assert!(view(&app).cards[1].revealed);
        assert_eq!(recorder.frames.borrow().len(), 2);

        app.dispatch(Event::ToggleAnswer(CardRef::Id("phon_02".to_string()))).unwrap();
        assert!(!view(&app).cards[1].revealed);

        app.dispatch(Event::ToggleAnswer(CardRef::Position(1))).unwrap();
        app.dispatch(Event::Render).unwrap();
        assert!(view(&app).cards.iter().all(|c| !c.revealed));

        assert!(app.dispatch(Event::ToggleAnswer(CardRef::Position(99))).is_err());
    }

    #[test]
    fn handle_exposes_collection() {
        let (app, _, _rx) = started("https://shop.example/");
        let handle = app.handle_info();
        assert_eq!(handle.raw_count, 13);
        assert_eq!(handle.kb.len(), 13);
        assert_eq!(handle.categories.len(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn copy_reports_through_notification() {
        let (mut app, recorder, mut rx) = started("https://shop.example/");
        app.dispatch(Event::CopyAnswer(CardRef::Position(1))).unwrap();
        let notice = rx.recv().await.expect("copy outcome");
        assert_eq!(notice.message, "Answer copied to clipboard");

        app.notify(notice);
        let frames = recorder.frames.borrow();
        let last = frames.last().unwrap();
        assert_eq!(
            last.notification.as_ref().map(|n| n.message.as_str()),
            Some("Answer copied to clipboard")
        );
        assert_eq!(last.shown(), STEP);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn copy_writes_the_raw_answer() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clipboard.txt");
        let answer = "Hold <b>power</b> & \"volume\" for 10's\nthen release.";

        let mut items = kb();
        items[0].answer = answer.to_string();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(
            items,
            BrowserState::new(Selection::new(["Phones", "Laptops", "TV"]), "https://shop.example/"),
            Vec::new(),
            Clipboard::new(Some(format!("tee {}", target.display()).as_str())),
            tx,
        );
        app.start();

        app.dispatch(Event::CopyAnswer(CardRef::Id("phon_01".to_string()))).unwrap();
        let notice = rx.recv().await.expect("copy outcome");
        assert_eq!(notice.message, "Answer copied to clipboard");
        assert_eq!(std::fs::read_to_string(&target).unwrap(), answer);
    }

    #[test]
    fn expired_notification_is_cleared_from_surfaces() {
        let (mut app, recorder, _rx) = started("https://shop.example/");
        app.notify(Notification::with_duration("Copy failed", 60_000));
        app.expire_notification();
        assert_eq!(recorder.frames.borrow().len(), 2);
        assert!(app.notification_deadline().is_some());

        app.notify(Notification::with_duration("Copy failed", 20));
        assert!(app.notification_deadline().is_some());
        std::thread::sleep(std::time::Duration::from_millis(40));
        app.expire_notification();
        let frames = recorder.frames.borrow();
        assert_eq!(frames.len(), 4);
        assert!(frames[3].notification.is_none());
        assert!(app.notification_deadline().is_none());
    }

    #[test]
    fn copy_of_missing_card_fails_fast() {
        let (mut app, _, _rx) = started("https://shop.example/");
        assert!(matches!(
            app.dispatch(Event::CopyAnswer(CardRef::Id("nope".to_string()))),
            Err(AppError::ItemNotFound(_))
        ));
    }

    fn arb_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            prop::sample::select(vec!["All", "Phones", "Laptops", "TV"])
                .prop_map(|c| Event::SelectCategory(c.to_string())),
            prop::sample::select(vec!["", "battery", "phone", "zzz", " Question "])
                .prop_map(|t| Event::TypeSearch(t.to_string())),
            Just(Event::SubmitSearch),
            Just(Event::LoadMore),
            Just(Event::Render),
        ]
    }

    proptest! {
        #[test]
        fn rendered_views_respect_pagination_rules(events in prop::collection::vec(arb_event(), 0..25)) {
            let items = kb();
            let mut state = initial_state(BrowserState::new(
                Selection::new(["Phones", "Laptops", "TV"]),
                "https://shop.example/",
            ));
            for event in &events {
                let before = state.pagination.visible(state.category_key());
                let (next, _) = reduce(state, event).unwrap();
                state = next;
                if *event == Event::LoadMore {
                    prop_assert_eq!(state.pagination.visible(state.category_key()), before + STEP);
                }

                let view = build_view(&items, &state);
                prop_assert!(view.shown() <= view.total);
                prop_assert_eq!(view.empty, view.shown() == 0);
                if state.search_term().is_empty() {
                    let expected = state.pagination.visible(state.category_key()).min(view.total);
                    prop_assert_eq!(view.shown(), expected);
                    prop_assert_eq!(view.load_more.is_some(), view.total > view.shown());
                } else {
                    prop_assert_eq!(view.shown(), view.total);
                    prop_assert!(view.load_more.is_none());
                }
                prop_assert_eq!(&build_view(&items, &state), &view);
            }
        }
    }
}
