//! Cookie and ads consent — `kompaktor consent`.

use anyhow::Result;
use console::style;
use kompaktor::consent::{BANNER_TEXT, ConsentChoice, ConsentState, ConsentStore};
use kompaktor::ui::icons::{AD, CHECK, COOKIE};

use super::super::ConsentCommands;
use super::AppContext;

pub fn cmd_consent(ctx: &AppContext, command: Option<ConsentCommands>) -> Result<()> {
    let choice = match command {
        None | Some(ConsentCommands::Show) => {
            let state = ConsentStore::new(ctx.storage.clone()).load();
            if ctx.plain {
                println!("{}", state);
            } else {
                println!("{}Consent: {}", COOKIE, style(state).bold());
                if state == ConsentState::Unset {
                    println!("{}", style(BANNER_TEXT).dim());
                    println!("Run 'kompaktor consent accept' or 'kompaktor consent necessary'.");
                }
            }
            return Ok(());
        }
        Some(ConsentCommands::Reset) => {
            ConsentStore::new(ctx.storage.clone()).clear();
            println!("Consent cleared. The banner will be shown again.");
            return Ok(());
        }
        Some(ConsentCommands::Accept) => ConsentChoice::AcceptAll,
        Some(ConsentCommands::Necessary) => ConsentChoice::OnlyNecessary,
    };

    let mut orchestrator = ctx.orchestrator();
    match orchestrator.choose_consent(choice) {
        Some(state) => {
            println!("{}Consent recorded: {}", CHECK, state);
            if !ctx.plain {
                for placement in orchestrator.ad_placements() {
                    println!("{}{}", AD, style(placement.label()).dim());
                }
            }
        }
        None => {
            println!(
                "Consent already decided ({}). Run 'kompaktor consent reset' to choose again.",
                orchestrator.consent()
            );
        }
    }
    Ok(())
}
