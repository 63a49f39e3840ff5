use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ytmp3_core::Bitrate;

#[derive(Parser)]
#[command(name = "ytmp3")]
#[command(author, version, about = "Download audio from a list of YouTube URLs as MP3")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub batch: BatchArgs,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that yt-dlp and ffmpeg are installed
    Doctor,

    /// Show configuration
    Config,
}

#[derive(Args, Clone, Debug)]
pub struct BatchArgs {
    /// Path to list of YouTube URLs, one per line
    #[arg(short, long, default_value = "list.txt")]
    pub list: PathBuf,

    /// Output directory [default: downloads]
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Concurrent downloads [default: 4]
    #[arg(short, long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// MP3 bitrate [default: 192K]
    #[arg(short, long)]
    pub bitrate: Option<Bitrate>,
}

fn parse_workers(s: &str) -> Result<usize, String> {
    let workers: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if workers == 0 {
        return Err("at least one worker is required".to_string());
    }
    Ok(workers)
}
