use crate::item::{Item, ItemKind};
use crate::query::{PendingSearch, Response, Router};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, warn};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Search,
    Help,
}

/// Application state
pub struct App {
    router: Router,
    pub query: String,
    pub items: Vec<Item>,
    pub selected: usize,
    pub mode: Mode,
    pub status_message: String,
    /// Query changed since it was last routed
    dirty: bool,
    /// Build waiting for the placeholder to be drawn
    pending: Option<PendingSearch>,
}

impl App {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            query: String::new(),
            items: Vec::new(),
            selected: 0,
            mode: Mode::Search,
            status_message: String::new(),
            dirty: true,
            pending: None,
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.dirty = true;
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.dirty = true;
    }

    pub fn pop_char(&mut self) {
        if self.query.pop().is_some() {
            self.dirty = true;
        }
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.dirty = true;
    }

    /// Delete word backward from query (Ctrl+w)
    pub fn delete_word(&mut self) {
        let trimmed = self.query.trim_end();
        let keep = trimmed.rfind(char::is_whitespace).map_or(0, |i| i + 1);
        self.query.truncate(keep);
        self.dirty = true;
    }

    /// A build is waiting to run
    pub fn is_building(&self) -> bool {
        self.pending.is_some()
    }

    /// Route the query if it changed. A pending build leaves its placeholder
    /// in place to be drawn before [`App::run_pending`] blocks.
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        match self.router.route(&self.query) {
            Ok(Response::Items(items)) => {
                self.status_message = status_for(&items);
                self.set_items(items);
            }
            Ok(Response::Pending(pending)) => {
                if let Some(edit) = pending.edit {
                    // Rewriting the buffer is not a user edit
                    self.query = edit.apply(&self.query);
                }
                self.status_message = format!("Building {} index...", pending.dataset);
                self.set_items(pending.placeholder.clone());
                self.pending = Some(pending);
            }
            Err(e) => {
                self.status_message = e.to_string();
                self.set_items(vec![e.to_item()]);
            }
        }
    }

    /// Run the pending build and search (blocking)
    pub fn run_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        let dataset = pending.dataset.clone();
        let start = Instant::now();
        match self.router.resume(pending) {
            Ok(items) => {
                self.status_message = format!(
                    "{} index built in {:.1}s, {}",
                    dataset,
                    start.elapsed().as_secs_f64(),
                    status_for(&items)
                );
                self.set_items(items);
            }
            Err(e) => {
                self.status_message = e.to_string();
                self.set_items(vec![e.to_item()]);
            }
        }

        // Typed while building
        if self.dirty {
            self.refresh();
        }
    }

    fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.selected = 0;
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.items.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Fill the input with the selected row's completion (Tab)
    pub fn autocomplete(&mut self) {
        let completion = self.selected_item().and_then(|i| i.autocomplete.clone());
        if let Some(completion) = completion {
            self.set_query(&completion);
        }
    }

    /// Enter: datasets complete into the input, references open in the browser
    pub fn primary_action(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };

        match item.kind {
            ItemKind::Dataset => self.autocomplete(),
            ItemKind::Reference => {
                if let Some(url) = item.url().map(str::to_string) {
                    self.status_message = match open_url(&url) {
                        Ok(()) => format!("Opened {url}"),
                        Err(e) => format!("Could not open {url}: {e}"),
                    };
                }
            }
            ItemKind::Placeholder | ItemKind::Error => {}
        }
    }

    /// URL of the selected row, for the clipboard
    pub fn selected_url(&self) -> Option<String> {
        self.selected_item().and_then(Item::url).map(str::to_string)
    }

    pub fn show_help(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn hide_help(&mut self) {
        self.mode = Mode::Search;
    }
}

fn status_for(items: &[Item]) -> String {
    match items.first().map(|i| i.kind) {
        Some(ItemKind::Dataset) => format!("{} datasets, Tab to pick one", items.len()),
        _ => format!("{} results", items.len()),
    }
}

/// Open a URL in the default browser, detached from the terminal
fn open_url(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    debug!(url, "opening url");
    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .inspect_err(|e| warn!(url, error = %e, "failed to open url"))
}
