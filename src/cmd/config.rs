//! Configuration view and validation commands — `kompaktor config`.

use anyhow::Result;
use kompaktor::config::KompaktorToml;

use super::super::ConfigCommands;
use super::AppContext;

pub fn cmd_config(ctx: &AppContext, command: Option<ConfigCommands>) -> Result<()> {
    let settings = &ctx.settings;
    let config_path = settings.config_path();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Kompaktor Configuration");
            println!("=======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No kompaktor.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let toml = &settings.file;
            println!("[api]");
            println!("  environment = \"{}\"", toml.api.environment);
            if let Some(url) = &toml.api.base_url {
                println!("  base_url = \"{}\"", url);
            }
            println!();

            println!("[defaults]");
            println!("  mode = \"{}\"", toml.defaults.mode);
            println!("  language = \"{}\"", toml.defaults.language);
            println!("  max_flashcards = {}", toml.defaults.max_flashcards);
            println!("  detail_level = \"{}\"", toml.defaults.detail_level);
            println!();

            println!("[ads]");
            println!("  publisher_id = \"{}\"", toml.ads.publisher_id);
            println!("  top_slot_id = \"{}\"", toml.ads.top_slot_id);
            println!("  side_slot_id = \"{}\"", toml.ads.side_slot_id);
            println!();

            if let Some(dir) = &toml.export.output_dir {
                println!("[export]");
                println!("  output_dir = \"{}\"", dir.display());
                println!();
            }

            println!("Effective values (with env/CLI overrides):");
            println!("  data_dir = \"{}\"", settings.data_dir.display());
            println!("  environment = \"{}\"", settings.environment);
            println!("  api_base = \"{}\"", settings.api_base);
            println!();

            if !config_path.exists() {
                println!("Run 'kompaktor config init' to create a kompaktor.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No kompaktor.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = KompaktorToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("kompaktor.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            KompaktorToml::default().save(&config_path)?;

            println!("Created kompaktor.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] environment, base_url");
            println!("  - [defaults] mode, language, max_flashcards, detail_level");
            println!("  - [export] output_dir");
            println!();
        }
    }

    Ok(())
}
