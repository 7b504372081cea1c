//! Past compactions — `kompaktor history`.

use anyhow::Result;
use console::style;
use kompaktor::ui::icons::HISTORY;
use kompaktor::ui::{panel_width, render_panel};

use super::super::HistoryCommands;
use super::AppContext;

const PREVIEW_CHARS: usize = 48;

pub fn cmd_history(ctx: &AppContext, command: Option<HistoryCommands>) -> Result<()> {
    let mut orchestrator = ctx.orchestrator();

    match command {
        None | Some(HistoryCommands::List) => {
            let entries = orchestrator.history();
            if entries.is_empty() {
                println!("No history entries yet.");
                return Ok(());
            }

            if !ctx.plain {
                println!();
                println!("{}History ({} entries)", HISTORY, entries.len());
                println!();
            }
            for entry in entries {
                let when = entry
                    .timestamp
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M");
                if ctx.plain {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        entry.id,
                        entry.timestamp.to_rfc3339(),
                        entry.mode,
                        entry.language,
                        entry.preview(PREVIEW_CHARS)
                    );
                } else {
                    println!(
                        "  {}  {}  {:<22} {}  {}",
                        style(entry.short_id()).yellow(),
                        style(when).dim(),
                        entry.mode.label(),
                        entry.language,
                        entry.preview(PREVIEW_CHARS)
                    );
                }
            }
            if !ctx.plain {
                println!();
                println!("Run 'kompaktor history show <ID>' to view an entry.");
            }
        }
        Some(HistoryCommands::Show { id, input }) => {
            let Some(entry) = orchestrator.select_history(&id) else {
                anyhow::bail!("No history entry matches '{}'", id);
            };
            let title = format!(
                "{} · {} · {}",
                entry.mode.label(),
                entry.language.label(),
                entry.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
            );

            let width = panel_width();
            if input {
                let input_text = orchestrator.show_input();
                if ctx.plain {
                    println!("{}", input_text);
                    println!();
                } else {
                    println!("{}", style("Input").bold());
                    println!("{}", textwrap::fill(input_text, width));
                    println!();
                }
            }
            let fragment = orchestrator.display_fragment();
            println!("{}", render_panel(&title, &fragment, width, ctx.plain));
        }
    }

    Ok(())
}
