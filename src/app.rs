use std::collections::BTreeSet;

use keychenga::config::Config;
use keychenga::generator::TokenSource;
use keychenga::session::{DrillUpdate, RawKeyEvent, Worker};
use tracing::{error, info, warn};

use crate::event::DrillFeedback;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Drill,
    Select,
}

/// What the drill screen shows, rebuilt from worker updates.
#[derive(Clone, Debug, Default)]
pub struct DrillView {
    pub question: String,
    pub answer: String,
    pub aim: usize,
    pub miss: Option<String>,
    pub penalties: usize,
    pub nothing_to_practice: bool,
    pub error: Option<String>,
}

impl DrillView {
    pub fn apply(&mut self, update: DrillUpdate) {
        match update {
            DrillUpdate::Question { text } => {
                self.question = text;
                self.answer.clear();
                self.aim = 0;
                self.miss = None;
                self.nothing_to_practice = false;
            }
            DrillUpdate::Progress {
                answer,
                aim,
                miss,
                penalties,
            } => {
                self.answer = answer;
                self.aim = aim;
                self.miss = miss;
                self.penalties = penalties;
                self.error = None;
            }
            DrillUpdate::NothingToPractice => {
                *self = Self {
                    nothing_to_practice: true,
                    ..Self::default()
                };
            }
            DrillUpdate::Error(message) => self.error = Some(message),
        }
    }
}

/// Checkbox list of drill categories.
pub struct CategoryList {
    pub names: Vec<String>,
    pub checked: BTreeSet<String>,
    pub selected: usize,
}

impl CategoryList {
    pub fn new(names: Vec<String>, active: &[String]) -> Self {
        Self {
            checked: active.iter().filter(|n| names.contains(n)).cloned().collect(),
            names,
            selected: 0,
        }
    }

    pub fn next(&mut self) {
        if !self.names.is_empty() {
            self.selected = (self.selected + 1) % self.names.len();
        }
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.names.len().saturating_sub(1);
        }
    }

    pub fn toggle(&mut self) {
        let Some(name) = self.names.get(self.selected) else {
            return;
        };
        if !self.checked.remove(name) {
            self.checked.insert(name.clone());
        }
    }

    pub fn is_checked(&self, name: &str) -> bool {
        self.checked.contains(name)
    }

    /// Checked names in display order.
    pub fn selection(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| self.checked.contains(*name))
            .cloned()
            .collect()
    }
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: Theme,
    pub view: DrillView,
    pub categories: CategoryList,
    pub should_quit: bool,
    source: TokenSource,
    feedback: DrillFeedback,
    worker: Option<Worker>,
}

impl App {
    pub fn new(config: Config, feedback: DrillFeedback) -> Self {
        let theme = Theme::load(&config.theme).unwrap_or_default();
        let source = TokenSource::new(Some(Config::drills_dir())).with_exclusions(config.exclude.clone());
        let categories = CategoryList::new(source.available(), &config.categories);

        Self {
            screen: AppScreen::Drill,
            config,
            theme,
            view: DrillView::default(),
            categories,
            should_quit: false,
            source,
            feedback,
            worker: None,
        }
    }

    /// (Re)starts the drill worker for the configured categories with
    /// fresh penalties.
    pub fn start_drill(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
        self.view = DrillView::default();

        let lines = self.source.merged(&self.config.categories);
        info!(categories = ?self.config.categories, lines = lines.len(), "starting drill");
        match Worker::spawn(lines, &self.config, self.feedback.clone()) {
            Ok(worker) => self.worker = Some(worker),
            Err(err) => {
                error!(%err, "failed to start drill worker");
                self.view.error = Some(format!("could not start drill: {err}"));
            }
        }
    }

    pub fn offer(&self, event: RawKeyEvent) {
        if let Some(worker) = &self.worker {
            worker.offer(event);
        }
    }

    pub fn open_selection(&mut self) {
        self.categories = CategoryList::new(self.source.available(), &self.config.categories);
        self.screen = AppScreen::Select;
    }

    pub fn close_selection(&mut self) {
        self.screen = AppScreen::Drill;
    }

    /// Saves the checked categories and restarts the drill with them.
    pub fn apply_selection(&mut self) {
        self.config.categories = self.categories.selection();
        if let Err(err) = self.config.save() {
            warn!(%err, "failed to save config");
        }
        self.screen = AppScreen::Drill;
        self.start_drill();
    }

    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
    }
}
