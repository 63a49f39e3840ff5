use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use ytmp3_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytmp3 dependency check\n");

    let mut all_ok = true;

    // yt-dlp
    print!("yt-dlp:  ");
    match config.yt_dlp_path() {
        Ok(path) => all_ok &= report_version(&path, "--version", yt_dlp_version),
        Err(_) => {
            println!("NOT FOUND");
            println!("         See https://github.com/yt-dlp/yt-dlp#installation");
            all_ok = false;
        }
    }

    // FFmpeg, used by yt-dlp for the MP3 conversion
    print!("ffmpeg:  ");
    match ffmpeg_path(&config) {
        Some(path) => all_ok &= report_version(&path, "-version", ffmpeg_version),
        None => {
            println!("NOT FOUND");
            println!("         See https://ffmpeg.org/download.html");
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

fn ffmpeg_path(config: &Config) -> Option<PathBuf> {
    config
        .ffmpeg_path()
        .or_else(|| which::which("ffmpeg").ok())
}

fn report_version(path: &Path, version_arg: &str, parse: fn(&str) -> String) -> bool {
    match Command::new(path).arg(version_arg).output() {
        Ok(out) if out.status.success() => {
            println!("OK ({})", parse(&String::from_utf8_lossy(&out.stdout)));
            true
        }
        _ => {
            println!("FOUND but failed to get version ({})", path.display());
            false
        }
    }
}

fn yt_dlp_version(stdout: &str) -> String {
    stdout.trim().to_string()
}

/// "ffmpeg version 6.1.1 Copyright ..." -> "6.1.1"
fn ffmpeg_version(stdout: &str) -> String {
    stdout
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(2))
        .unwrap_or("unknown")
        .to_string()
}
