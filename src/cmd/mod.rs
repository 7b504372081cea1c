//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                                   |
//! |-----------------|-----------------------------------------------------|
//! | `compact`       | `Compact`, `CompactFile`                           |
//! | `history`       | `History`                                          |
//! | `export`        | `Export` (and `--export` after a compaction)       |
//! | `copy`          | `Copy`                                             |
//! | `consent`       | `Consent`                                          |
//! | `config`        | `Config`                                           |

pub mod compact;
pub mod config;
pub mod consent;
pub mod copy;
pub mod export;
pub mod history;

pub use compact::{cmd_compact, cmd_compact_file};
pub use config::cmd_config;
pub use consent::cmd_consent;
pub use copy::cmd_copy;
pub use export::cmd_export;
pub use history::cmd_history;

use anyhow::Result;
use kompaktor::ads::AdQueue;
use kompaktor::client::{HttpClient, SummarizationApi};
use kompaktor::config::{Overrides, Settings};
use kompaktor::orchestrator::Orchestrator;
use kompaktor::storage::{FileStore, KeyValueStore};
use std::path::PathBuf;
use std::sync::Arc;

use super::Cli;

/// Everything a command needs, resolved once from flags, environment and
/// `kompaktor.toml`.
pub struct AppContext {
    pub settings: Settings,
    pub storage: Arc<dyn KeyValueStore>,
    pub plain: bool,
    /// A person is at the terminal, so prompts and spinners make sense.
    pub interactive: bool,
}

impl AppContext {
    pub fn new(cli: &Cli, data_dir: PathBuf) -> Result<Self> {
        let overrides = Overrides {
            api_base: cli.api_base.clone(),
            development: cli.dev,
            environment: Overrides::environment_from_env(),
        };
        let settings = Settings::load(data_dir, &overrides)?;
        tracing::debug!(
            data_dir = %settings.data_dir.display(),
            api_base = %settings.api_base,
            environment = %settings.environment,
            "Settings resolved"
        );
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(&settings.data_dir));
        let interactive = !cli.plain && console::Term::stdout().is_term();

        Ok(Self {
            settings,
            storage,
            plain: cli.plain,
            interactive,
        })
    }

    /// A session over the persisted state, seeded with the configured defaults.
    pub fn orchestrator(&self) -> Orchestrator<HttpClient> {
        let mut orchestrator = Orchestrator::new(
            HttpClient::new(self.settings.api_base.clone()),
            self.storage.clone(),
            Arc::new(AdQueue::new()),
            &self.settings.file.ads,
        );
        let defaults = &self.settings.file.defaults;
        orchestrator.set_mode(defaults.mode);
        orchestrator.set_language(defaults.language);
        orchestrator.set_max_flashcards(defaults.max_flashcards);
        orchestrator.set_detail_level(defaults.detail_level);
        orchestrator
    }
}

/// Show the history entry `entry` names, or the newest one. `Ok(false)`
/// when there is no history at all; an unknown id is an error.
pub fn select_entry<A: SummarizationApi>(
    orchestrator: &mut Orchestrator<A>,
    entry: Option<&str>,
) -> Result<bool> {
    let id = match entry {
        Some(id) => id.to_string(),
        None => match orchestrator.history().first() {
            Some(latest) => latest.id.to_string(),
            None => return Ok(false),
        },
    };
    if orchestrator.select_history(&id).is_none() {
        anyhow::bail!("No history entry matches '{}'", id);
    }
    Ok(true)
}
