//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::{find_config_file, Context};

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force, format } => init_config(force, &format, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match find_config_file(&ctx.cwd) {
        Some(path) => ctx.output.debug(&format!("Loaded from {}", path.display())),
        None => ctx.output.debug("No config file found, using defaults"),
    }

    ctx.output.info("[store]");
    ctx.output.kv("data_dir", &ctx.config.store.data_dir);
    ctx.output
        .kv("resolved", &ctx.resolve_path(&ctx.config.store.data_dir).display().to_string());

    ctx.output.info("[pos]");
    ctx.output.kv("currency", &ctx.config.pos.currency);
    ctx.output.kv("register", &ctx.config.pos.register);

    ctx.output.info("[logging]");
    ctx.output.kv("level", &ctx.config.logging.level);

    Ok(())
}

fn init_config(force: bool, format: &str, ctx: &Context) -> Result<()> {
    let config_path = match format {
        "toml" => ctx.cwd.join("storedesk.toml"),
        "json" => ctx.cwd.join("storedesk.json"),
        other => bail!("Unknown config format: {} (expected toml or json)", other),
    };

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if format == "json" {
        CliConfig::default().save(&config_path.to_string_lossy())?;
    } else {
        fs::write(&config_path, generate_default_config())?;
    }

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
