use super::state::{ActiveTab, CurrentResult, Shown, ViewState};
use crate::ads::{AdNetwork, AdPlacement, AdSlot};
use crate::client::{Compaction, SummarizationApi, UploadFile};
use crate::clipboard::ClipboardSink;
use crate::config::AdsSection;
use crate::consent::{ConsentChoice, ConsentGate, ConsentState, ConsentStore};
use crate::errors::ClientError;
use crate::format::{self, DisplayFragment};
use crate::history::{self, HistoryEntry, HistoryStore};
use crate::model::{CompactOptions, CompactionMode, DetailLevel, LanguageCode, clamp_flashcards};
use crate::storage::KeyValueStore;
use std::sync::Arc;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text or upload a file first.";
pub const NO_FILE_MESSAGE: &str = "Please choose a file first.";

/// Drives one session: holds the view state, talks to the API, records
/// history and keeps the ad slots in line with consent.
pub struct Orchestrator<A: SummarizationApi> {
    api: A,
    history_store: HistoryStore,
    consent: ConsentGate,
    ad_network: Arc<dyn AdNetwork>,
    ad_slots: Vec<AdSlot>,
    state: ViewState,
}

impl<A: SummarizationApi> Orchestrator<A> {
    pub fn new(
        api: A,
        storage: Arc<dyn KeyValueStore>,
        ad_network: Arc<dyn AdNetwork>,
        ads: &AdsSection,
    ) -> Self {
        let history_store = HistoryStore::new(storage.clone());
        let consent = ConsentGate::load(ConsentStore::new(storage));
        let state = ViewState {
            history: history_store.load(),
            ..Default::default()
        };
        let ad_slots = vec![
            AdSlot::new(ads.publisher_id.clone(), ads.top_slot_id.clone()),
            AdSlot::new(ads.publisher_id.clone(), ads.side_slot_id.clone()),
        ];

        let mut orchestrator = Self {
            api,
            history_store,
            consent,
            ad_network,
            ad_slots,
            state,
        };
        orchestrator.sync_ads();
        orchestrator
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.state.input_text = text.into();
    }

    pub fn set_mode(&mut self, mode: CompactionMode) {
        self.state.mode = mode;
    }

    pub fn set_language(&mut self, language: LanguageCode) {
        self.state.language = language;
    }

    pub fn set_max_flashcards(&mut self, max: u32) {
        self.state.max_flashcards = clamp_flashcards(max);
    }

    pub fn set_detail_level(&mut self, level: DetailLevel) {
        self.state.detail_level = level;
    }

    pub fn set_upload(&mut self, file: Option<UploadFile>) {
        self.state.upload = file;
    }

    /// Compact the current input text.
    pub async fn submit_text(&mut self) -> Result<(), ClientError> {
        self.ensure_idle()?;
        if self.state.input_text.trim().is_empty() {
            return Err(self.reject(ClientError::Validation(EMPTY_INPUT_MESSAGE.into())));
        }

        let text = self.state.input_text.clone();
        let (mode, language) = (self.state.mode, self.state.language);
        let options = CompactOptions::for_mode(mode, self.state.max_flashcards, self.state.detail_level);
        self.begin();
        let outcome = self.api.compact_text(&text, mode, language, &options).await;
        self.finish(mode, language, outcome, |_| text)
    }

    /// Compact the uploaded file. On success the server-extracted text
    /// becomes the new input.
    pub async fn submit_file(&mut self) -> Result<(), ClientError> {
        self.ensure_idle()?;
        let Some(file) = self.state.upload.clone() else {
            return Err(self.reject(ClientError::Validation(NO_FILE_MESSAGE.into())));
        };

        let (mode, language) = (self.state.mode, self.state.language);
        self.begin();
        let outcome = self.api.compact_file(&file, mode, language).await;
        if let Ok(Compaction {
            extracted_text: Some(extracted),
            ..
        }) = &outcome
        {
            self.state.input_text = extracted.clone();
        }
        self.finish(mode, language, outcome, |compaction| {
            compaction
                .extracted_text
                .clone()
                .unwrap_or_else(|| format!("File: {}", file.name))
        })
    }

    fn ensure_idle(&self) -> Result<(), ClientError> {
        if self.state.loading {
            tracing::debug!("Rejecting submit while a request is in flight");
            return Err(ClientError::Busy);
        }
        Ok(())
    }

    fn reject(&mut self, err: ClientError) -> ClientError {
        self.state.error = Some(err.user_message());
        err
    }

    fn begin(&mut self) {
        self.state.loading = true;
        self.state.error = None;
        self.state.active_tab = ActiveTab::Current;
        self.state.selected_history_id = None;
    }

    fn finish(
        &mut self,
        mode: CompactionMode,
        language: LanguageCode,
        outcome: Result<Compaction, ClientError>,
        input_snapshot: impl FnOnce(&Compaction) -> String,
    ) -> Result<(), ClientError> {
        self.state.loading = false;
        match outcome {
            Ok(compaction) => {
                let input = input_snapshot(&compaction);
                let entry = HistoryEntry::new(mode, language, input.clone(), compaction.result.clone());
                tracing::info!(id = %entry.short_id(), %mode, %language, "Compaction stored");
                self.state.history = self.history_store.append(&self.state.history, entry);
                self.state.current = Some(CurrentResult {
                    mode,
                    language,
                    input,
                    result: compaction.result,
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Compaction failed");
                Err(self.reject(err))
            }
        }
    }

    /// Show a past entry. Accepts a full id or a unique prefix.
    pub fn select_history(&mut self, id: &str) -> Option<&HistoryEntry> {
        let found = history::find(&self.state.history, id)?.id;
        self.state.active_tab = ActiveTab::History;
        self.state.selected_history_id = Some(found);
        self.state.selected_history()
    }

    pub fn show_current(&mut self) {
        self.state.active_tab = ActiveTab::Current;
    }

    pub fn show_result(&self) -> Option<Shown<'_>> {
        self.state.shown()
    }

    pub fn show_input(&self) -> &str {
        self.state.shown_input()
    }

    pub fn plain_text(&self) -> String {
        self.show_result()
            .map(|s| format::to_plain_text(s.result, s.mode))
            .unwrap_or_default()
    }

    /// Copy the shown result as plain text. `Ok(false)` when there is
    /// nothing to copy. A clipboard failure lands in the error field.
    pub fn copy_result(&mut self, clipboard: &mut dyn ClipboardSink) -> Result<bool, ClientError> {
        let text = self.plain_text();
        if text.is_empty() {
            return Ok(false);
        }
        match clipboard.set_text(&text) {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, "Copy failed");
                Err(self.reject(ClientError::Clipboard {
                    detail: e.to_string(),
                }))
            }
        }
    }

    pub fn display_fragment(&self) -> DisplayFragment {
        match self.show_result() {
            Some(s) => format::to_display_fragment(s.result, s.mode),
            None => DisplayFragment::Placeholder(format::PLACEHOLDER),
        }
    }

    pub fn consent(&self) -> ConsentState {
        self.consent.state()
    }

    pub fn consent_gate(&mut self) -> &mut ConsentGate {
        &mut self.consent
    }

    /// Record a consent choice and bring the ad slots in line with it.
    pub fn choose_consent(&mut self, choice: ConsentChoice) -> Option<ConsentState> {
        let next = self.consent.choose(choice);
        self.sync_ads();
        next
    }

    /// Run the interactive consent prompt, then re-sync the ad slots.
    pub fn prompt_consent(&mut self) -> anyhow::Result<Option<ConsentState>> {
        let next = self.consent.prompt()?;
        self.sync_ads();
        Ok(next)
    }

    pub fn sync_ads(&mut self) -> Vec<AdPlacement> {
        let consent = self.consent.state();
        self.ad_slots
            .iter_mut()
            .filter_map(|slot| slot.sync(consent, self.ad_network.as_ref()))
            .collect()
    }

    pub fn ad_placements(&mut self) -> Vec<AdPlacement> {
        self.sync_ads()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::{AdQueue, SIDE_SLOT_ID, TOP_SLOT_ID};
    use crate::consent::CONSENT_KEY;
    use crate::errors::COPY_FAILED;
    use crate::history::HISTORY_KEY;
    use crate::model::{CompactionResult, Flashcard};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Responder = Box<dyn Fn(CompactionMode) -> Result<Compaction, ClientError> + Send + Sync>;

    struct FakeApi {
        respond: Responder,
        calls: AtomicUsize,
        last_options: Mutex<Option<CompactOptions>>,
        last_text: Mutex<Option<String>>,
    }

    impl FakeApi {
        fn new(respond: impl Fn(CompactionMode) -> Result<Compaction, ClientError> + Send + Sync + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                calls: AtomicUsize::new(0),
                last_options: Mutex::new(None),
                last_text: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SummarizationApi for FakeApi {
        async fn compact_text(
            &self,
            text: &str,
            mode: CompactionMode,
            _language: LanguageCode,
            options: &CompactOptions,
        ) -> Result<Compaction, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_text.lock().unwrap() = Some(text.to_string());
            *self.last_options.lock().unwrap() = Some(options.clone());
            (self.respond)(mode)
        }

        async fn compact_file(
            &self,
            _file: &UploadFile,
            mode: CompactionMode,
            _language: LanguageCode,
        ) -> Result<Compaction, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.respond)(mode)
        }
    }

    fn bullets(items: &[&str]) -> Compaction {
        Compaction {
            result: CompactionResult::Bullets {
                items: items.iter().map(|s| s.to_string()).collect(),
            },
            extracted_text: None,
        }
    }

    fn setup(api: FakeApi) -> (Orchestrator<FakeApi>, Arc<MemoryStore>, AdQueue) {
        let storage = Arc::new(MemoryStore::new());
        let queue = AdQueue::new();
        let orchestrator = Orchestrator::new(
            api,
            storage.clone(),
            Arc::new(queue.clone()),
            &AdsSection::default(),
        );
        (orchestrator, storage, queue)
    }

    #[tokio::test]
    async fn test_bullets_submit_records_history() {
        let (mut orch, storage, _) = setup(FakeApi::new(|_| Ok(bullets(&["a", "b"]))));
        orch.set_input_text("Hello world");
        orch.set_mode(CompactionMode::Bullets);
        orch.set_language(LanguageCode::En);

        orch.submit_text().await.unwrap();

        assert_eq!(orch.plain_text(), "a\nb");
        assert_eq!(orch.history().len(), 1);
        let entry = &orch.history()[0];
        assert_eq!(entry.mode, CompactionMode::Bullets);
        assert_eq!(entry.input_text, "Hello world");
        assert!(!orch.state().loading);
        assert!(orch.state().error.is_none());
        assert!(storage.get(HISTORY_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_input_is_sent_and_recorded_verbatim() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        let input = "  indented line\n  second\n";
        orch.set_input_text(input);

        orch.submit_text().await.unwrap();

        assert_eq!(orch.api.last_text.lock().unwrap().as_deref(), Some(input));
        assert_eq!(orch.history()[0].input_text, input);
        assert_eq!(orch.show_input(), input);
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_api() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        orch.set_input_text("   \n ");

        let err = orch.submit_text().await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(orch.state().error.as_deref(), Some(EMPTY_INPUT_MESSAGE));
        assert_eq!(orch.api.calls(), 0);
        assert!(!orch.state().loading);
        assert!(orch.history().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_keeps_history_and_result() {
        let (mut orch, _, _) = setup(FakeApi::new(|mode| match mode {
            CompactionMode::Bullets => Ok(bullets(&["kept"])),
            _ => Err(ClientError::Network {
                detail: "connection refused".into(),
            }),
        }));
        orch.set_input_text("first");
        orch.set_mode(CompactionMode::Bullets);
        orch.submit_text().await.unwrap();

        orch.set_input_text("second");
        orch.set_mode(CompactionMode::Summary);
        let err = orch.submit_text().await.unwrap_err();

        assert!(matches!(err, ClientError::Network { .. }));
        assert_eq!(
            orch.state().error.as_deref(),
            Some(crate::errors::NETWORK_UNREACHABLE)
        );
        assert_eq!(orch.history().len(), 1);
        assert_eq!(orch.plain_text(), "kept");
        assert!(!orch.state().loading);
    }

    #[tokio::test]
    async fn test_server_failure_message_is_surfaced() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| {
            Err(ClientError::request(None, Some("Mode 'x' is not implemented.".into())))
        }));
        orch.set_input_text("text");
        orch.submit_text().await.unwrap_err();
        assert_eq!(orch.state().error.as_deref(), Some("Mode 'x' is not implemented."));
    }

    #[tokio::test]
    async fn test_error_cleared_by_next_submit() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        orch.submit_text().await.unwrap_err();
        assert!(orch.state().error.is_some());

        orch.set_input_text("now with text");
        orch.submit_text().await.unwrap();
        assert!(orch.state().error.is_none());
    }

    #[tokio::test]
    async fn test_submit_while_loading_is_busy() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        orch.set_input_text("text");
        orch.state.loading = true;

        assert_eq!(orch.submit_text().await.unwrap_err(), ClientError::Busy);
        assert_eq!(orch.api.calls(), 0);
    }

    #[tokio::test]
    async fn test_twenty_first_submit_evicts_oldest() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        for i in 0..21 {
            orch.set_input_text(format!("input {}", i));
            orch.submit_text().await.unwrap();
        }
        assert_eq!(orch.history().len(), 20);
        assert_eq!(orch.history()[0].input_text, "input 20");
        assert_eq!(orch.history()[19].input_text, "input 1");
    }

    #[tokio::test]
    async fn test_flashcard_options_sent_only_for_card_modes() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| {
            Ok(Compaction {
                result: CompactionResult::Cards {
                    cards: vec![Flashcard {
                        question: "Q".into(),
                        answer: "A".into(),
                    }],
                },
                extracted_text: None,
            })
        }));
        orch.set_input_text("text");
        orch.set_mode(CompactionMode::Flashcards);
        orch.set_max_flashcards(99);
        orch.submit_text().await.unwrap();

        let sent = orch.api.last_options.lock().unwrap().clone().unwrap();
        assert_eq!(sent.max_flashcards, Some(50));
        assert_eq!(orch.plain_text(), "Card 1\nQuestion: Q\nAnswer: A");

        orch.set_mode(CompactionMode::Summary);
        orch.submit_text().await.unwrap();
        let sent = orch.api.last_options.lock().unwrap().clone().unwrap();
        assert_eq!(sent, CompactOptions::default());
    }

    #[tokio::test]
    async fn test_file_submit_without_file_is_validation_error() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        let err = orch.submit_file().await.unwrap_err();
        assert_eq!(err, ClientError::Validation(NO_FILE_MESSAGE.into()));
        assert_eq!(orch.api.calls(), 0);
    }

    #[tokio::test]
    async fn test_file_submit_adopts_extracted_text() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| {
            Ok(Compaction {
                result: CompactionResult::Text { text: "short".into() },
                extracted_text: Some("extracted source".into()),
            })
        }));
        orch.set_upload(Some(UploadFile {
            name: "notes.pdf".into(),
            mime: "application/pdf".into(),
            bytes: vec![1, 2, 3],
        }));
        orch.submit_file().await.unwrap();

        assert_eq!(orch.state().input_text, "extracted source");
        assert_eq!(orch.history()[0].input_text, "extracted source");
    }

    #[tokio::test]
    async fn test_file_submit_without_extracted_text_uses_file_name() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        orch.set_input_text("draft");
        orch.set_upload(Some(UploadFile {
            name: "notes.txt".into(),
            mime: "text/plain".into(),
            bytes: b"hello".to_vec(),
        }));
        orch.submit_file().await.unwrap();

        assert_eq!(orch.history()[0].input_text, "File: notes.txt");
        assert_eq!(orch.state().input_text, "draft");
    }

    #[tokio::test]
    async fn test_history_selection_and_return_to_current() {
        let (mut orch, _, _) = setup(FakeApi::new(|mode| match mode {
            CompactionMode::Bullets => Ok(bullets(&["old"])),
            _ => Ok(Compaction {
                result: CompactionResult::Text { text: "new".into() },
                extracted_text: None,
            }),
        }));
        orch.set_input_text("one");
        orch.set_mode(CompactionMode::Bullets);
        orch.submit_text().await.unwrap();
        let old_id = orch.history()[0].id.to_string();

        orch.set_input_text("two");
        orch.set_mode(CompactionMode::Summary);
        orch.submit_text().await.unwrap();

        assert!(orch.select_history(&old_id[..8]).is_some());
        assert_eq!(orch.plain_text(), "old");
        assert_eq!(orch.show_input(), "one");

        orch.show_current();
        assert_eq!(orch.plain_text(), "new");
        assert!(orch.select_history("does-not-exist").is_none());
    }

    #[tokio::test]
    async fn test_submit_deselects_history() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        orch.set_input_text("one");
        orch.submit_text().await.unwrap();
        let id = orch.history()[0].id.to_string();
        orch.select_history(&id);

        orch.submit_text().await.unwrap();
        assert_eq!(orch.state().active_tab, ActiveTab::Current);
        assert!(orch.state().selected_history_id.is_none());
    }

    #[derive(Default)]
    struct FakeClipboard {
        copied: Vec<String>,
        fail: bool,
    }

    impl ClipboardSink for FakeClipboard {
        fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("no display");
            }
            self.copied.push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_copy_without_result_copies_nothing() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        let mut clipboard = FakeClipboard::default();

        assert_eq!(orch.copy_result(&mut clipboard), Ok(false));
        assert!(clipboard.copied.is_empty());
        assert!(orch.state().error.is_none());
    }

    #[tokio::test]
    async fn test_copy_puts_plain_text_on_clipboard() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["a", "b"]))));
        orch.set_input_text("text");
        orch.set_mode(CompactionMode::Bullets);
        orch.submit_text().await.unwrap();
        let mut clipboard = FakeClipboard::default();

        assert_eq!(orch.copy_result(&mut clipboard), Ok(true));
        assert_eq!(clipboard.copied, vec!["a\nb".to_string()]);
    }

    #[tokio::test]
    async fn test_copy_failure_is_surfaced() {
        let (mut orch, _, _) = setup(FakeApi::new(|_| Ok(bullets(&["a"]))));
        orch.set_input_text("text");
        orch.set_mode(CompactionMode::Bullets);
        orch.submit_text().await.unwrap();
        let mut clipboard = FakeClipboard {
            fail: true,
            ..Default::default()
        };

        let err = orch.copy_result(&mut clipboard).unwrap_err();

        assert!(matches!(err, ClientError::Clipboard { .. }));
        assert_eq!(orch.state().error.as_deref(), Some(COPY_FAILED));
        assert_eq!(orch.history().len(), 1);
    }

    #[test]
    fn test_consent_accept_mounts_ads_once() {
        let (mut orch, storage, queue) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        assert_eq!(orch.consent(), ConsentState::Unset);
        assert!(orch.ad_placements().is_empty());
        assert!(queue.pushed().is_empty());

        assert_eq!(
            orch.choose_consent(ConsentChoice::AcceptAll),
            Some(ConsentState::Accepted)
        );
        let slots: Vec<_> = orch.ad_placements().into_iter().map(|p| p.slot_id).collect();
        assert_eq!(slots, vec![TOP_SLOT_ID, SIDE_SLOT_ID]);
        assert_eq!(queue.pushed().len(), 2);
        assert_eq!(storage.get(CONSENT_KEY).unwrap().as_deref(), Some("accepted"));

        assert_eq!(orch.choose_consent(ConsentChoice::OnlyNecessary), None);
        assert_eq!(queue.pushed().len(), 2);
    }

    #[test]
    fn test_necessary_consent_never_mounts_ads() {
        let (mut orch, _, queue) = setup(FakeApi::new(|_| Ok(bullets(&["x"]))));
        orch.choose_consent(ConsentChoice::OnlyNecessary);
        assert!(orch.ad_placements().is_empty());
        assert!(queue.pushed().is_empty());
    }

    #[test]
    fn test_persisted_state_is_loaded() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(CONSENT_KEY, "accepted").unwrap();
        let queue = AdQueue::new();
        let orch = Orchestrator::new(
            FakeApi::new(|_| Ok(bullets(&["x"]))),
            storage,
            Arc::new(queue.clone()),
            &AdsSection::default(),
        );
        assert_eq!(orch.consent(), ConsentState::Accepted);
        assert_eq!(queue.pushed().len(), 2);
        assert!(matches!(orch.display_fragment(), DisplayFragment::Placeholder(_)));
    }
}
