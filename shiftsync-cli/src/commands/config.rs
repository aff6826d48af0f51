use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use shiftsync_core::Settings;

pub fn run(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        Settings::create_default_config(config_path)?;
        println!("{}", "Created default config".green());
    }

    let settings = Settings::load(config_path)?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  State:   {}", settings.state_path().display());

    Ok(())
}
