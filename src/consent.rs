//! Consent flag for optional (advertising) services, and the gate that asks
//! for it.

use crate::storage::KeyValueStore;
use std::sync::Arc;

pub const CONSENT_KEY: &str = "wk_cookie_consent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentState {
    #[default]
    Unset,
    Necessary,
    Accepted,
}

impl ConsentState {
    pub fn is_decided(self) -> bool {
        !matches!(self, ConsentState::Unset)
    }

    fn stored_value(self) -> Option<&'static str> {
        match self {
            ConsentState::Unset => None,
            ConsentState::Necessary => Some("necessary"),
            ConsentState::Accepted => Some("accepted"),
        }
    }

    fn from_stored(raw: &str) -> Self {
        match raw {
            "accepted" => ConsentState::Accepted,
            "necessary" => ConsentState::Necessary,
            _ => ConsentState::Unset,
        }
    }
}

impl std::fmt::Display for ConsentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stored_value().unwrap_or("unset"))
    }
}

/// Persists the consent flag. Never fails: storage problems read as
/// `Unset` and writes that fail are logged.
#[derive(Clone)]
pub struct ConsentStore {
    storage: Arc<dyn KeyValueStore>,
}

impl ConsentStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> ConsentState {
        match self.storage.get(CONSENT_KEY) {
            Ok(Some(raw)) => ConsentState::from_stored(raw.trim()),
            Ok(None) => ConsentState::Unset,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read consent, treating as unset");
                ConsentState::Unset
            }
        }
    }

    /// Persist `value`. Saving `Unset` removes the key.
    pub fn save(&self, value: ConsentState) {
        let result = match value.stored_value() {
            Some(raw) => self.storage.set(CONSENT_KEY, raw),
            None => self.storage.remove(CONSENT_KEY),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, consent = %value, "Could not persist consent");
        }
    }

    pub fn clear(&self) {
        self.save(ConsentState::Unset);
    }
}

/// The two answers the gate offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentChoice {
    OnlyNecessary,
    AcceptAll,
}

impl ConsentChoice {
    pub fn label(self) -> &'static str {
        match self {
            ConsentChoice::OnlyNecessary => "Only necessary",
            ConsentChoice::AcceptAll => "Accept all",
        }
    }

    fn target(self) -> ConsentState {
        match self {
            ConsentChoice::OnlyNecessary => ConsentState::Necessary,
            ConsentChoice::AcceptAll => ConsentState::Accepted,
        }
    }
}

pub const BANNER_TEXT: &str = "Cookies & privacy - we use technically necessary storage and, \
with your consent, third-party services (e.g. advertising) to run and finance this service.";

/// Gate state machine: `Unset -> Necessary` and `Unset -> Accepted` are the
/// only edges, and both are terminal.
pub struct ConsentGate {
    store: ConsentStore,
    state: ConsentState,
}

impl ConsentGate {
    /// Read the persisted flag once.
    pub fn load(store: ConsentStore) -> Self {
        let state = store.load();
        Self { store, state }
    }

    pub fn state(&self) -> ConsentState {
        self.state
    }

    /// The banner is shown only while nothing has been decided.
    pub fn is_visible(&self) -> bool {
        !self.state.is_decided()
    }

    pub fn choices(&self) -> &'static [ConsentChoice] {
        if self.is_visible() {
            &[ConsentChoice::OnlyNecessary, ConsentChoice::AcceptAll]
        } else {
            &[]
        }
    }

    /// Record a choice. Returns the new state, or `None` when a decision
    /// already exists (the gate cannot be re-answered).
    pub fn choose(&mut self, choice: ConsentChoice) -> Option<ConsentState> {
        if self.state.is_decided() {
            tracing::debug!(current = %self.state, "Ignoring consent choice, already decided");
            return None;
        }
        let next = choice.target();
        self.store.save(next);
        self.state = next;
        tracing::info!(consent = %next, "Consent recorded");
        Some(next)
    }

    /// Ask interactively on the terminal. Returns `None` if the prompt was
    /// dismissed or there is nothing to ask.
    pub fn prompt(&mut self) -> anyhow::Result<Option<ConsentState>> {
        use dialoguer::{Select, theme::ColorfulTheme};

        if !self.is_visible() {
            return Ok(None);
        }

        println!();
        println!("{}", console::style(BANNER_TEXT).dim());
        let choices = self.choices();
        let labels: Vec<&str> = choices.iter().map(|c| c.label()).collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Cookies & privacy")
            .items(&labels)
            .default(0)
            .interact_opt()?;

        Ok(selection.and_then(|idx| self.choose(choices[idx])))
    }
}
