//! Bounded, newest-first history of past compactions.

use crate::model::{CompactionMode, CompactionResult, LanguageCode};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const HISTORY_KEY: &str = "wk_history";
pub const HISTORY_MAX_ITEMS: usize = 20;

/// One finished compaction. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub mode: CompactionMode,
    pub language: LanguageCode,
    pub input_text: String,
    pub result: CompactionResult,
}

impl HistoryEntry {
    pub fn new(
        mode: CompactionMode,
        language: LanguageCode,
        input_text: impl Into<String>,
        result: CompactionResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            mode,
            language,
            input_text: input_text.into(),
            result,
        }
    }

    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// First line of the input, cut to `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> String {
        let first_line = self.input_text.trim().lines().next().unwrap_or("");
        if first_line.chars().count() > max_chars {
            let cut: String = first_line.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{}…", cut)
        } else {
            first_line.to_string()
        }
    }
}

/// Persists the history list. Persistence is best-effort: read failures
/// yield an empty list and write failures are logged.
#[derive(Clone)]
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    max_items: usize,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            max_items: HISTORY_MAX_ITEMS,
        }
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn load(&self) -> Vec<HistoryEntry> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read history, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(self.max_items);
                entries
            }
            Err(e) => {
                tracing::warn!(error = %e, "History is not a valid list, starting empty");
                Vec::new()
            }
        }
    }

    /// Prepend `entry` to `current`, cap the list, persist it, and return it.
    pub fn append(&self, current: &[HistoryEntry], entry: HistoryEntry) -> Vec<HistoryEntry> {
        let mut updated = Vec::with_capacity(self.max_items);
        updated.push(entry);
        updated.extend(current.iter().take(self.max_items - 1).cloned());
        self.persist(&updated);
        updated
    }

    fn persist(&self, entries: &[HistoryEntry]) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Could not encode history");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_KEY, &json) {
            tracing::warn!(error = %e, "Could not persist history");
        }
    }
}

/// Find an entry by full id or by an unambiguous id prefix.
pub fn find<'a>(entries: &'a [HistoryEntry], id: &str) -> Option<&'a HistoryEntry> {
    let id = id.trim().to_lowercase();
    if id.is_empty() {
        return None;
    }
    let mut matches = entries
        .iter()
        .filter(|e| e.id.to_string().starts_with(&id));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}
