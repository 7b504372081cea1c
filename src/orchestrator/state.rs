use crate::client::UploadFile;
use crate::history::HistoryEntry;
use crate::model::{CompactionMode, CompactionResult, DEFAULT_MAX_FLASHCARDS, DetailLevel, LanguageCode};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveTab {
    #[default]
    Current,
    History,
}

/// The most recent successful compaction of this session.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentResult {
    pub mode: CompactionMode,
    pub language: LanguageCode,
    /// Input snapshot the result was produced from.
    pub input: String,
    pub result: CompactionResult,
}

/// What the result panel shows, whichever tab it comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shown<'a> {
    pub mode: CompactionMode,
    pub language: LanguageCode,
    pub input: &'a str,
    pub result: &'a CompactionResult,
}

/// All transient state of one session.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub input_text: String,
    pub mode: CompactionMode,
    pub language: LanguageCode,
    pub max_flashcards: u32,
    pub detail_level: DetailLevel,
    pub loading: bool,
    pub error: Option<String>,
    pub current: Option<CurrentResult>,
    pub upload: Option<UploadFile>,
    pub active_tab: ActiveTab,
    pub selected_history_id: Option<Uuid>,
    pub history: Vec<HistoryEntry>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            input_text: String::new(),
            mode: CompactionMode::default(),
            language: LanguageCode::default(),
            max_flashcards: DEFAULT_MAX_FLASHCARDS,
            detail_level: DetailLevel::default(),
            loading: false,
            error: None,
            current: None,
            upload: None,
            active_tab: ActiveTab::default(),
            selected_history_id: None,
            history: Vec::new(),
        }
    }
}

impl ViewState {
    pub fn selected_history(&self) -> Option<&HistoryEntry> {
        let id = self.selected_history_id?;
        self.history.iter().find(|e| e.id == id)
    }

    pub fn shown(&self) -> Option<Shown<'_>> {
        match self.active_tab {
            ActiveTab::Current => self.current.as_ref().map(|c| Shown {
                mode: c.mode,
                language: c.language,
                input: &c.input,
                result: &c.result,
            }),
            ActiveTab::History => self.selected_history().map(|e| Shown {
                mode: e.mode,
                language: e.language,
                input: &e.input_text,
                result: &e.result,
            }),
        }
    }

    /// Input shown next to the result. On the current tab an unsubmitted
    /// draft is shown when there is no result yet.
    pub fn shown_input(&self) -> &str {
        match (self.active_tab, self.shown()) {
            (_, Some(shown)) if !shown.input.is_empty() => shown.input,
            (ActiveTab::Current, _) => &self.input_text,
            (ActiveTab::History, _) => "",
        }
    }
}
