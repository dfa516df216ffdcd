use crate::output::print_json;
use crate::session::load_config;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use turnover_core::config::Config;
use turnover_core::paths;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (file plus environment)
    Show,

    /// Write a default .turnover/config.yaml if none exists
    Init,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Init => init(root),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut config = load_config(root)?;
    if !config.remote.anon_key.is_empty() {
        config.remote.anon_key = "********".to_string();
    }

    if json {
        return print_json(&config);
    }
    print!("{}", serde_yaml::to_string(&config)?);
    if !config.remote.is_configured() {
        println!("# remote store not configured; running local-only");
    }
    Ok(())
}

fn init(root: &Path) -> anyhow::Result<()> {
    let path = paths::config_path(root);
    if path.exists() {
        println!("{} already exists", path.display());
        return Ok(());
    }
    Config::default()
        .save(root)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
