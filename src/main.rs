use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use kompaktor::export::ExportFormat;
use kompaktor::model::{CompactionMode, DetailLevel, LanguageCode};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "kompaktor")]
#[command(version, about = "Compact text into summaries, bullet points and flashcards")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding storage, config and logs
    #[arg(long, global = true, env = "KOMPAKTOR_HOME")]
    pub data_dir: Option<PathBuf>,

    /// API base URL. Overrides kompaktor.toml and --dev.
    #[arg(long, global = true, env = "KOMPAKTOR_API_BASE")]
    pub api_base: Option<String>,

    /// Talk to the local development backend
    #[arg(long, global = true)]
    pub dev: bool,

    /// Unstyled output, no prompts or spinners
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Mode and language selection shared by both compact commands.
#[derive(Args, Clone, Debug)]
pub struct CompactArgs {
    /// summary, bullets, flashcards, kids, short, exam, quiz, cheatsheet
    #[arg(short, long)]
    pub mode: Option<CompactionMode>,

    /// Output language: de, en, es, fr, tr, ar, ja, zh
    #[arg(short, long)]
    pub language: Option<LanguageCode>,

    /// Export the result afterwards (repeatable or comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub export: Vec<ExportFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compact text given as an argument or on stdin
    Compact {
        text: Option<String>,

        #[command(flatten)]
        args: CompactArgs,

        /// Number of cards for flashcard and quiz modes (3-50)
        #[arg(long)]
        max_flashcards: Option<u32>,

        /// Card detail: compact, normal, verbose
        #[arg(long)]
        detail_level: Option<DetailLevel>,
    },
    /// Upload a file (PDF, text, ...) and compact its content
    CompactFile {
        path: PathBuf,

        #[command(flatten)]
        args: CompactArgs,
    },
    /// Browse past compactions
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },
    /// Export the latest result or a history entry
    Export {
        format: ExportFormat,

        /// History entry id or unique prefix (defaults to the latest)
        #[arg(long)]
        entry: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the exported file afterwards
        #[arg(long)]
        open: bool,
    },
    /// Copy the latest result or a history entry to the clipboard
    Copy {
        /// History entry id or unique prefix (defaults to the latest)
        #[arg(long)]
        entry: Option<String>,
    },
    /// Show or record the cookie and ads consent
    Consent {
        #[command(subcommand)]
        command: Option<ConsentCommands>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum HistoryCommands {
    /// List entries, newest first
    List,
    /// Show one entry's result
    Show {
        /// Entry id or unique prefix
        id: String,
        /// Also print the input the result was produced from
        #[arg(long)]
        input: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConsentCommands {
    /// Print the current consent state
    Show,
    /// Accept all cookies, including advertising
    Accept,
    /// Allow only technically necessary storage
    Necessary,
    /// Forget the decision so the banner is shown again
    Reset,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default kompaktor.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let data_dir = kompaktor::config::resolve_data_dir(cli.data_dir.clone());
    let _log_guard = kompaktor::logging::init(&kompaktor::config::log_dir(&data_dir), cli.verbose);
    let ctx = cmd::AppContext::new(&cli, data_dir)?;

    match &cli.command {
        Commands::Compact {
            text,
            args,
            max_flashcards,
            detail_level,
        } => {
            cmd::cmd_compact(&ctx, text.clone(), args, *max_flashcards, *detail_level).await?
        }
        Commands::CompactFile { path, args } => cmd::cmd_compact_file(&ctx, path, args).await?,
        Commands::History { command } => cmd::cmd_history(&ctx, command.clone())?,
        Commands::Export {
            format,
            entry,
            output,
            open,
        } => cmd::cmd_export(&ctx, *format, entry.as_deref(), output.as_deref(), *open)?,
        Commands::Copy { entry } => cmd::cmd_copy(&ctx, entry.as_deref())?,
        Commands::Consent { command } => cmd::cmd_consent(&ctx, command.clone())?,
        Commands::Config { command } => cmd::cmd_config(&ctx, command.clone())?,
    }

    Ok(())
}
