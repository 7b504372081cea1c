//! Export of the latest result or a history entry — `kompaktor export`.

use anyhow::Result;
use console::style;
use kompaktor::client::SummarizationApi;
use kompaktor::export::{self, ExportFormat, ResultPanel};
use kompaktor::orchestrator::Orchestrator;
use kompaktor::ui::icons::{FILE_NEW, WARN};
use std::path::{Path, PathBuf};

use super::{AppContext, select_entry};

pub fn cmd_export(
    ctx: &AppContext,
    format: ExportFormat,
    entry: Option<&str>,
    output: Option<&Path>,
    open_after: bool,
) -> Result<()> {
    let mut orchestrator = ctx.orchestrator();
    if !select_entry(&mut orchestrator, entry)? {
        println!("Nothing to export yet. Run 'kompaktor compact' first.");
        return Ok(());
    }

    if let Some(path) = export_shown(ctx, &orchestrator, format, output)
        && open_after
        && let Err(e) = open::that(&path)
    {
        tracing::warn!(error = %e, path = %path.display(), "Could not open exported file");
    }
    Ok(())
}

/// Export whatever the orchestrator currently shows. Failures are logged
/// and reported, never returned: an export problem does not fail the command.
pub fn export_shown<A: SummarizationApi>(
    ctx: &AppContext,
    orchestrator: &Orchestrator<A>,
    format: ExportFormat,
    output: Option<&Path>,
) -> Option<PathBuf> {
    let Some(shown) = orchestrator.show_result() else {
        println!("Nothing to export yet.");
        return None;
    };
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.settings.export_path(&format.default_filename()));

    let outcome = match format {
        ExportFormat::Txt => export::export_text(&orchestrator.plain_text(), &path),
        ExportFormat::Pdf => export::export_pdf(&orchestrator.plain_text(), &path),
        ExportFormat::Png => {
            let panel = ResultPanel {
                title: format!("Wissen-Kompaktor · {}", shown.mode.label()),
                fragment: orchestrator.display_fragment(),
                width: 72,
            };
            Ok(export::export_image(&panel, &path))
        }
    };

    match outcome {
        Ok(Some(written)) => {
            if ctx.plain {
                println!("{}", written.display());
            } else {
                println!("{}Exported {}", FILE_NEW, style(written.display()).cyan());
            }
            Some(written)
        }
        Ok(None) => {
            println!("{}Nothing exported, {} was not written.", WARN, path.display());
            None
        }
        Err(e) => {
            tracing::error!(error = %e, format = format.extension(), "Export failed");
            eprintln!("{}Export failed: {}", WARN, e);
            None
        }
    }
}
