//! Copy of the latest result or a history entry — `kompaktor copy`.

use anyhow::Result;
use kompaktor::clipboard::SystemClipboard;
use kompaktor::ui::icons::CLIPBOARD;

use super::{AppContext, select_entry};

pub fn cmd_copy(ctx: &AppContext, entry: Option<&str>) -> Result<()> {
    let mut orchestrator = ctx.orchestrator();
    if !select_entry(&mut orchestrator, entry)? {
        println!("Nothing to copy yet. Run 'kompaktor compact' first.");
        return Ok(());
    }

    let mut clipboard = SystemClipboard::new();
    match orchestrator.copy_result(&mut clipboard) {
        Ok(true) => {
            let chars = orchestrator.plain_text().chars().count();
            if ctx.plain {
                println!("Copied {} characters to the clipboard.", chars);
            } else {
                println!("{}Copied {} characters to the clipboard.", CLIPBOARD, chars);
            }
            Ok(())
        }
        Ok(false) => {
            println!("Nothing to copy yet.");
            Ok(())
        }
        Err(err) => anyhow::bail!(err.user_message()),
    }
}
