//! Picker session for quickfiler.
//!
//! [Session] is the single-threaded driver of one open-to-close picker lifetime. It owns the
//! [NavState], the query line, the rows on screen and the open prompt, and talks to the worker
//! threads through [Workers]. Resolutions and file operations run on the workers; [Session::tick]
//! collects their responses and applies only those belonging to the latest request.
//!
//! Side effects requested by the navigation state machine (opening files, diffs, clipboard,
//! persisting the root) are carried out here through the [EditorHost] and [StateStore]
//! collaborators.

use crate::app::editor::EditorHost;
use crate::app::nav::{Effect, Event, NavState};
use crate::app::prompt::{InputLine, Prompt, PromptOutcome};
use crate::app::search_state::SearchState;
use crate::app::store::{StateStore, restore_last_dir};
use crate::core::cache::ResultCache;
use crate::core::fm::FileSystem;
use crate::core::item::{ItemKind, ListItem, menu_items};
use crate::core::listing::{ListingRequest, Resolver};
use crate::core::ops::{FileOp, OpOutcome};
use crate::core::query::QueryOptions;
use crate::core::worker::{WorkerResponse, WorkerTask, Workers};
use crate::core::workspace::Workspace;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use log::{debug, info, warn};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

const NOTIFICATION_TIME: Duration = Duration::from_secs(3);

/// Per-session behaviour taken from the configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub query_options: QueryOptions,
    pub debounce: Duration,
    pub use_trash: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            query_options: QueryOptions::default(),
            debounce: Duration::from_millis(300),
            use_trash: true,
        }
    }
}

pub struct Session {
    nav: NavState,
    search: SearchState,
    workers: Workers,
    fs: Arc<dyn FileSystem>,
    editor: Box<dyn EditorHost>,
    store: Box<dyn StateStore>,
    options: SessionOptions,

    query: InputLine,
    listing: Vec<ListItem>,
    items: Vec<ListItem>,
    visible: Vec<usize>,
    selected: usize,

    title: Option<String>,
    placeholder: String,
    loading: bool,
    loaded: bool,
    op_request_id: u64,
    pending_ops: usize,
    prompt: Option<Prompt>,
    notification: Option<(String, Instant)>,
    handed_over: bool,
    closed: bool,
}

impl Session {
    /// Opens a session and requests the first listing.
    ///
    /// The session starts in `start` when given, otherwise in the stored last directory, otherwise
    /// in the workspace-root view.
    pub fn new(
        resolver: Arc<Resolver>,
        cache: Arc<ResultCache>,
        editor: Box<dyn EditorHost>,
        store: Box<dyn StateStore>,
        options: SessionOptions,
        start: Option<PathBuf>,
    ) -> Self {
        let fs = Arc::clone(resolver.fs());
        let workspace = Arc::clone(resolver.workspace());
        let root = start.or_else(|| restore_last_dir(store.as_ref(), fs.as_ref()));
        let nav = NavState::new(workspace, root);
        info!("Session started at {:?}", nav.root());

        let mut session = Self {
            placeholder: nav.placeholder(),
            nav,
            search: SearchState::default(),
            workers: Workers::spawn(resolver, cache),
            fs,
            editor,
            store,
            options,
            query: InputLine::default(),
            listing: vec![ListItem::loading()],
            items: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            title: None,
            loading: false,
            loaded: false,
            op_request_id: 0,
            pending_ops: 0,
            prompt: None,
            notification: None,
            handed_over: false,
            closed: false,
        };
        session.rebuild();
        session.request_listing();
        session
    }

    // Getters / Accessors

    #[inline]
    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    #[inline]
    pub fn workspace(&self) -> &Arc<Workspace> {
        self.nav.workspace()
    }

    #[inline]
    pub fn query(&self) -> &InputLine {
        &self.query
    }

    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[inline]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    #[inline]
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// A listing request is in flight.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// A listing is in flight or a typed query is waiting out the debounce.
    pub fn is_searching(&self) -> bool {
        self.loading || self.search.is_pending()
    }

    /// At least one listing has been applied.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// A file operation is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.pending_ops > 0
    }

    #[inline]
    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    #[inline]
    pub fn prompt_mut(&mut self) -> Option<&mut Prompt> {
        self.prompt.as_mut()
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification.as_ref().map(|(msg, _)| msg.as_str())
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// True once after the editor had the terminal, so the screen must be fully redrawn.
    pub fn take_handed_over(&mut self) -> bool {
        std::mem::take(&mut self.handed_over)
    }

    /// Rows of the resolved listing, without the menu section.
    #[inline]
    pub fn listing(&self) -> &[ListItem] {
        &self.listing
    }

    /// Rows that pass the presentation filter, in display order.
    pub fn visible_items(&self) -> impl Iterator<Item = &ListItem> {
        self.visible.iter().filter_map(|&i| self.items.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Position of the selection within [Session::visible_items].
    #[inline]
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&ListItem> {
        self.visible
            .get(self.selected)
            .and_then(|&i| self.items.get(i))
    }

    pub fn describe(&self, item: &ListItem) -> String {
        item.description(self.nav.workspace(), self.nav.root())
    }

    // Query line

    pub fn insert_char(&mut self, ch: char) {
        self.query.insert_at_cursor(ch);
        self.query_changed();
    }

    pub fn backspace(&mut self) {
        if self.query.backspace_at_cursor() {
            self.query_changed();
        }
    }

    pub fn delete(&mut self) {
        if self.query.delete_at_cursor() {
            self.query_changed();
        }
    }

    pub fn query_cursor_left(&mut self) {
        self.query.move_cursor_left();
    }

    pub fn query_cursor_right(&mut self) {
        self.query.move_cursor_right();
    }

    pub fn query_cursor_home(&mut self) {
        self.query.cursor_home();
    }

    pub fn query_cursor_end(&mut self) {
        self.query.cursor_end();
    }

    /// Replaces the whole query, as a paste would.
    pub fn set_query(&mut self, text: &str) {
        self.query = InputLine::new(text);
        self.query_changed();
    }

    fn query_changed(&mut self) {
        self.search.set_debounce(self.options.debounce);
        self.apply_filter();
    }

    pub fn toggle_case_sensitive(&mut self) {
        let case_sensitive = !self.options.query_options.case_sensitive;
        self.options.query_options = QueryOptions::new(case_sensitive);
        self.notify(if case_sensitive {
            "Case sensitive search"
        } else {
            "Case insensitive search"
        });
        self.apply_filter();
        self.request_listing();
    }

    // Selection

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.move_selection(-1);
    }

    pub fn select_page_down(&mut self, page: usize) {
        self.move_selection(page.max(1) as isize);
    }

    pub fn select_page_up(&mut self, page: usize) {
        self.move_selection(-(page.max(1) as isize));
    }

    /// Moves by `delta` rows, skipping separators. Stops at the ends.
    fn move_selection(&mut self, delta: isize) {
        let len = self.visible.len() as isize;
        if len == 0 {
            return;
        }
        let step = delta.signum();
        let mut target = (self.selected as isize + delta).clamp(0, len - 1);
        while (0..len).contains(&target) && self.is_separator_at(target as usize) {
            target += step;
        }
        if !(0..len).contains(&target) {
            // nothing selectable past the separator, look back the other way
            target = (self.selected as isize + delta).clamp(0, len - 1);
            while (0..len).contains(&target) && self.is_separator_at(target as usize) {
                target -= step;
            }
        }
        if (0..len).contains(&target) {
            self.selected = target as usize;
        }
    }

    fn is_separator_at(&self, visible_index: usize) -> bool {
        self.visible
            .get(visible_index)
            .and_then(|&i| self.items.get(i))
            .is_some_and(ListItem::is_separator)
    }

    // Accepting rows

    /// Accepts the selected row.
    pub fn accept(&mut self) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        if item.is_separator() || item.kind() == ItemKind::Empty {
            return;
        }
        self.clear_query();
        self.apply_event(Event::Accept(item));
    }

    /// Enters the selected directory even while a target is being selected.
    pub fn descend(&mut self) {
        let event = match self.selected_item() {
            Some(ListItem::Directory { path, .. }) => Event::Descend(path.clone()),
            Some(root @ ListItem::Root { .. }) => Event::Accept(root.clone()),
            _ => return,
        };
        self.clear_query();
        self.apply_event(event);
    }

    /// Empties the query line. A listing for the empty query follows unless a refresh is issued
    /// first.
    fn clear_query(&mut self) {
        if !self.query.is_empty() {
            self.query.clear();
            self.search.set_debounce(self.options.debounce);
            self.apply_filter();
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.search.reset();
        info!("Session closed");
    }

    // Prompts

    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match prompt.submit(self.fs.as_ref(), self.options.use_trash) {
            PromptOutcome::Rejected => {
                debug!("Prompt input rejected: {:?}", prompt.error());
            }
            PromptOutcome::Run(op) => {
                self.prompt = None;
                self.send_op(op);
            }
            PromptOutcome::Dismissed => {
                self.prompt = None;
                self.apply_event(Event::PromptCancelled);
            }
        }
    }

    pub fn cancel_prompt(&mut self) {
        if self.prompt.take().is_some() {
            self.apply_event(Event::PromptCancelled);
        }
    }

    fn send_op(&mut self, op: FileOp) {
        self.op_request_id = self.op_request_id.wrapping_add(1);
        self.pending_ops += 1;
        debug!("Sending {:?} as operation {}", op, self.op_request_id);
        if self
            .workers
            .fileop_tx()
            .send(WorkerTask::FileOp {
                op,
                request_id: self.op_request_id,
            })
            .is_err()
        {
            self.pending_ops -= 1;
            self.notify("File operation worker is not running");
            self.apply_event(Event::OperationFailed);
        }
    }

    // Worker handling

    /// Issues a listing request for the current root, query and action.
    fn request_listing(&mut self) {
        let (request_id, cancel) = self.search.begin();
        let request = ListingRequest::new(self.nav.root().map(Path::to_path_buf))
            .with_query(self.query.text())
            .with_copy_target(self.nav.action().copy_target().map(Path::to_path_buf))
            .with_options(self.options.query_options);
        self.search.mark_issued(self.query.text());
        self.loading = true;

        debug!("Requesting listing {} for {:?}", request_id, request);
        if self
            .workers
            .listing_tx()
            .send(WorkerTask::LoadListing {
                request,
                cancel,
                request_id,
            })
            .is_err()
        {
            self.loading = false;
            self.notify("Listing worker is not running");
        }
    }

    /// Runs the debounce, expires notifications and applies worker responses.
    ///
    /// Returns true if anything visible changed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;

        if let Some((_, expiry)) = &self.notification
            && Instant::now() >= *expiry
        {
            self.notification = None;
            changed = true;
        }

        if self.search.take_query(self.query.text()).is_some() {
            self.request_listing();
            changed = true;
        }

        while let Ok(response) = self.workers.response_rx().try_recv() {
            match response {
                WorkerResponse::ListingLoaded {
                    items, request_id, ..
                } => {
                    if !self.search.is_current(request_id) {
                        debug!("Discarding stale listing {}", request_id);
                        continue;
                    }
                    self.loading = false;
                    self.loaded = true;
                    self.listing = items;
                    self.rebuild();
                }
                WorkerResponse::ListingFailed { error, request_id } => {
                    if !self.search.is_current(request_id) {
                        continue;
                    }
                    self.loading = false;
                    self.loaded = true;
                    self.listing = Vec::new();
                    self.notify(error.to_string());
                    self.rebuild();
                }
                WorkerResponse::OperationComplete {
                    outcome,
                    request_id,
                } => {
                    self.pending_ops = self.pending_ops.saturating_sub(1);
                    debug!("Operation {} complete: {:?}", request_id, outcome);
                    self.notify(outcome.message());
                    self.apply_event(outcome_event(outcome));
                }
                WorkerResponse::OperationFailed {
                    error,
                    partially_applied,
                    request_id,
                } => {
                    self.pending_ops = self.pending_ops.saturating_sub(1);
                    warn!(
                        "Operation {} failed (partially applied: {}): {}",
                        request_id, partially_applied, error
                    );
                    self.notify(error.to_string());
                    self.apply_event(Event::OperationFailed);
                }
            }
            changed = true;
        }

        changed
    }

    // Navigation effects

    fn apply_event(&mut self, event: Event) {
        let effects = self.nav.dispatch(event);
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Refresh => {
                self.rebuild();
                self.request_listing();
            }
            Effect::SetTitle(title) => self.title = title,
            Effect::SetPlaceholder(placeholder) => self.placeholder = placeholder,
            Effect::PersistRoot(root) => {
                if let Err(e) = self.store.set_last_open_dir(root.as_deref()) {
                    warn!("Could not persist last directory: {}", e);
                }
            }
            Effect::Open { path, beside } => {
                let column = beside.then(|| self.editor.active_column().map_or(2, |c| c + 1));
                self.handed_over = true;
                if let Err(e) = self.editor.open(&path, column) {
                    self.notify(format!("Could not open {}: {}", path.display(), e));
                }
            }
            Effect::Diff { left, right } => {
                self.handed_over = true;
                if let Err(e) = self.editor.diff(&left, &right) {
                    self.notify(format!("Could not compare files: {}", e));
                }
            }
            Effect::CopyToClipboard(text) => match self.editor.write_clipboard(&text) {
                Ok(()) => self.notify(format!("Copied {}", text)),
                Err(e) => self.notify(format!("Could not copy to clipboard: {}", e)),
            },
            Effect::Prompt(request) => self.prompt = Some(Prompt::new(request)),
            Effect::Paste { source, dest_dir } => self.send_op(FileOp::Copy {
                src: source,
                dest_dir,
            }),
            Effect::Close => self.close(),
        }
    }

    fn notify(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!("Notification: {}", msg);
        self.notification = Some((msg, Instant::now() + NOTIFICATION_TIME));
    }

    // Presentation

    /// Rebuilds the row list from the listing and the menu section.
    fn rebuild(&mut self) {
        let hidden = self.nav.action().trigger();
        let documents = self.editor.open_documents();
        let mut items = self.listing.clone();
        items.extend(menu_items(hidden, &documents));
        self.items = items;
        self.apply_filter();
    }

    /// Applies the query as a fuzzy filter over labels and descriptions.
    ///
    /// Rows that always show survive; a separator survives if it always shows or a row of its
    /// group does.
    fn apply_filter(&mut self) {
        let pattern = filter_pattern(self.query.text());
        let matcher = if self.options.query_options.case_sensitive {
            SkimMatcherV2::default().respect_case()
        } else {
            SkimMatcherV2::default().ignore_case()
        };

        let keep: Vec<bool> = self
            .items
            .iter()
            .map(|item| {
                pattern.is_empty()
                    || item.always_show()
                    || (!item.is_separator() && self.matches(&matcher, item, &pattern))
            })
            .collect();

        let mut visible = Vec::with_capacity(self.items.len());
        for (i, item) in self.items.iter().enumerate() {
            if item.is_separator() && !pattern.is_empty() && !item.always_show() {
                let group_visible = self.items[i + 1..]
                    .iter()
                    .zip(&keep[i + 1..])
                    .take_while(|(row, _)| !row.is_separator())
                    .any(|(_, &k)| k);
                if !group_visible {
                    continue;
                }
            } else if !keep[i] {
                continue;
            }
            visible.push(i);
        }

        self.visible = visible;
        self.selected = 0;
        if self.is_separator_at(0) {
            self.move_selection(1);
        }
    }

    fn matches(&self, matcher: &SkimMatcherV2, item: &ListItem, pattern: &str) -> bool {
        let text = format!("{} {}", item.label(), self.describe(item));
        matcher.fuzzy_match(&text, pattern).is_some()
    }
}

/// Query text as used by the fuzzy filter: word separators, wildcards and a leading `/` removed.
fn filter_pattern(query: &str) -> String {
    query
        .trim_start()
        .trim_start_matches('/')
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | '*') && !c.is_whitespace())
        .collect()
}

fn outcome_event(outcome: OpOutcome) -> Event {
    match outcome {
        OpOutcome::FileCreated(path) => Event::FileCreated(path),
        OpOutcome::FolderCreated(path) => Event::FolderCreated(path),
        OpOutcome::Renamed { path, is_dir } => Event::Renamed { path, is_dir },
        OpOutcome::Deleted(path) => Event::Deleted(path),
        OpOutcome::Pasted { dir, .. } => Event::Pasted { dir },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_pattern_strips_separators() {
        assert_eq!(filter_pattern("/foo_bar baz-qux*"), "foobarbazqux");
        assert_eq!(filter_pattern("   "), "");
        assert_eq!(filter_pattern("FooBar"), "FooBar");
    }
}
