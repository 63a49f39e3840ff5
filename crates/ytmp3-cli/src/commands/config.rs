use anyhow::Result;
use std::path::Path;
use ytmp3_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytmp3 configuration\n");
    print!("{}", toml::to_string_pretty(&config)?);

    if config.paths.yt_dlp.is_none() {
        println!("# paths.yt_dlp unset: auto-detected from PATH");
    }
    if config.paths.ffmpeg.is_none() {
        println!("# paths.ffmpeg unset: yt-dlp searches PATH");
    }

    // Later sources override earlier ones
    println!("\nConfig sources (lowest to highest precedence):");
    println!("  1. Built-in defaults");
    if let Some(default_config) = Config::default_config_path() {
        println!("  2. {}", default_config.display());
    }
    if let Some(p) = config_path {
        println!("  3. {} (specified)", p.display());
    }
    println!("  4. Environment variables (YTMP3_*, e.g. YTMP3_BATCH__WORKERS=8)");

    Ok(())
}
