use crate::cli::ConfigCommands;
use crate::config::SwapConfig;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run(cmd: &ConfigCommands, config_path: &Path, data_dir: Option<PathBuf>) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(config_path, data_dir),
        ConfigCommands::Show => show(config_path, data_dir),
    }
}

fn validate(config_path: &Path, data_dir: Option<PathBuf>) -> Result<()> {
    let config = SwapConfig::load(config_path)?.with_data_dir(data_dir);
    let errors = config.validate();
    if errors.is_empty() {
        println!("✅ {} is valid.", config_path.display());
        return Ok(());
    }

    println!("❌ Validation errors in {}:", config_path.display());
    for e in &errors {
        println!("  - {}", e);
    }
    anyhow::bail!("{} validation error(s)", errors.len())
}

fn show(config_path: &Path, data_dir: Option<PathBuf>) -> Result<()> {
    let config = SwapConfig::load_or_default(config_path).with_data_dir(data_dir);
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
