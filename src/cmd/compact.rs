//! Text and file compaction — `kompaktor compact`, `kompaktor compact-file`.

use anyhow::{Context, Result};
use console::style;
use kompaktor::client::{HttpClient, UploadFile};
use kompaktor::errors::ClientError;
use kompaktor::format::{char_count, word_count};
use kompaktor::model::DetailLevel;
use kompaktor::orchestrator::Orchestrator;
use kompaktor::ui::icons::{AD, COOKIE, SPARKLE, UPLOAD};
use kompaktor::ui::{RequestSpinner, panel_width, render_panel};
use std::io::{IsTerminal, Read};
use std::path::Path;

use super::super::CompactArgs;
use super::AppContext;
use super::export::export_shown;

pub async fn cmd_compact(
    ctx: &AppContext,
    text: Option<String>,
    args: &CompactArgs,
    max_flashcards: Option<u32>,
    detail_level: Option<DetailLevel>,
) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => read_stdin()?,
    };

    let mut orchestrator = prepare(ctx, args);
    if let Some(max) = max_flashcards {
        orchestrator.set_max_flashcards(max);
    }
    if let Some(level) = detail_level {
        orchestrator.set_detail_level(level);
    }
    orchestrator.set_input_text(text);

    if !ctx.plain {
        let input = &orchestrator.state().input_text;
        eprintln!(
            "{}",
            style(format!(
                "{} characters · {} words · {} · {}",
                char_count(input),
                word_count(input),
                orchestrator.state().mode.label(),
                orchestrator.state().language.label()
            ))
            .dim()
        );
    }

    let spinner = RequestSpinner::start("Compacting...", !ctx.interactive);
    let outcome = orchestrator.submit_text().await;
    conclude(ctx, &mut orchestrator, spinner, outcome, args)
}

pub async fn cmd_compact_file(ctx: &AppContext, path: &Path, args: &CompactArgs) -> Result<()> {
    let file = UploadFile::from_path(path).await?;
    let mut orchestrator = prepare(ctx, args);

    if !ctx.plain {
        eprintln!(
            "{}{} {}",
            UPLOAD,
            file.name,
            style(format!("({} bytes, {})", file.bytes.len(), file.mime)).dim()
        );
    }
    orchestrator.set_upload(Some(file));

    let spinner = RequestSpinner::start("Uploading and compacting...", !ctx.interactive);
    let outcome = orchestrator.submit_file().await;
    conclude(ctx, &mut orchestrator, spinner, outcome, args)
}

/// Build the session, apply mode/language flags and settle consent.
fn prepare(ctx: &AppContext, args: &CompactArgs) -> Orchestrator<HttpClient> {
    let mut orchestrator = ctx.orchestrator();
    if let Some(mode) = args.mode {
        orchestrator.set_mode(mode);
    }
    if let Some(language) = args.language {
        orchestrator.set_language(language);
    }

    if ctx.interactive && orchestrator.consent_gate().is_visible() {
        eprintln!("{}", COOKIE);
        if let Err(e) = orchestrator.prompt_consent() {
            tracing::warn!(error = %e, "Consent prompt failed, continuing without a decision");
        }
    }
    orchestrator
}

fn conclude(
    ctx: &AppContext,
    orchestrator: &mut Orchestrator<HttpClient>,
    spinner: RequestSpinner,
    outcome: Result<(), ClientError>,
    args: &CompactArgs,
) -> Result<()> {
    if let Err(err) = outcome {
        spinner.failure(&err.user_message());
        anyhow::bail!(err.user_message());
    }
    spinner.success("Done");

    let Some(shown) = orchestrator.show_result() else {
        anyhow::bail!("Compaction finished without a result");
    };
    let title = format!("{}{}", SPARKLE, shown.mode.label());
    let fragment = orchestrator.display_fragment();
    println!("{}", render_panel(&title, &fragment, panel_width(), ctx.plain));

    if !ctx.plain {
        for placement in orchestrator.ad_placements() {
            eprintln!("{}{}", AD, style(placement.label()).dim());
        }
    }

    for format in &args.export {
        export_shown(ctx, orchestrator, *format, None);
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf)
}
