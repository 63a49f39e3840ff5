use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::args::BatchArgs;
use ytmp3_core::{
    config::Config,
    downloader::Downloader,
    list::read_list,
    Batch, Outcome, OutcomeStatus, Summary,
};

const LABEL_WIDTH: usize = 60;
const DETAIL_WIDTH: usize = 120;

pub async fn run(args: &BatchArgs, config_path: Option<&Path>) -> Result<()> {
    // A missing list is fatal before anything else happens
    let items = read_list(&args.list).await?;

    let config = Config::load(config_path)?;
    let bitrate = match args.bitrate {
        Some(bitrate) => bitrate,
        None => config.bitrate()?,
    };
    let workers = args.workers.unwrap_or(config.batch.workers);
    let output_dir = args
        .out
        .clone()
        .unwrap_or_else(|| config.output.default_directory.clone());

    fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let downloader = Downloader::from_config(&config, bitrate)?;
    debug!("Using {:?}", downloader);

    println!(
        "{}",
        style(format!("Downloading {} videos → {} MP3s", items.len(), bitrate)).green()
    );

    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "Progress {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}<{eta_precise}]",
        )?
        .progress_chars("=>-"),
    );

    let batch = Batch::new(Arc::new(downloader), output_dir, workers);
    let summary = batch
        .run(items, |_, outcome| {
            // suspend() prints even when the bar is hidden (non-tty)
            pb.suspend(|| println!("{}", outcome_line(outcome)));
            pb.inc(1);
        })
        .await;

    pb.finish_and_clear();
    print_summary(&summary);

    Ok(())
}

fn outcome_line(outcome: &Outcome) -> String {
    let tag = outcome.status.to_string();
    match outcome.status {
        OutcomeStatus::Success => format!("{}: {}", style(tag).green(), outcome.label),
        OutcomeStatus::Skipped => format!("{}: {}", style(tag).cyan(), outcome.label),
        OutcomeStatus::Failed => format!(
            "{}: {} — {}",
            style(tag).red(),
            outcome.label,
            outcome.detail
        ),
    }
}

fn print_summary(summary: &Summary) {
    println!("\n{}", "=".repeat(40));
    println!("{}", style("Summary").magenta());
    println!(
        "Success: {} | Skipped: {} | Failed: {}",
        summary.succeeded, summary.skipped, summary.failed
    );

    for failure in &summary.failures {
        println!("{}", failure_line(failure));
    }
}

fn failure_line(failure: &Outcome) -> String {
    let detail = failure.detail.lines().next().unwrap_or_default();
    format!(
        " - {} : {}",
        truncate(&failure.label, LABEL_WIDTH),
        truncate(detail, DETAIL_WIDTH)
    )
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
