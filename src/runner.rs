//! High-level runner API for the NC program splitter.
//!
//! This module provides the public interface that wires together the input
//! stream, the split pass, the bounded concurrent writer, and progress
//! reporting. It is the primary API for external users and for the CLI.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::info;

use crate::error::SplitterError;
use crate::splitter::{SplitConfig, Splitter};
use crate::telemetry::{ProgressStats, TelemetryEvent};
use crate::writer::{WriteFailure, WriteOptions, Writer};

/// Arguments for running a split operation
#[derive(Debug, Clone)]
pub struct SplitArgs {
    /// Source file containing concatenated programs
    pub input: PathBuf,
    /// Directory to write one file per program into (created if missing)
    pub output_dir: PathBuf,
    /// Case-sensitive keyword that terminates a program
    pub keyword: String,
    /// Append one blank line after the keyword line in each program
    pub append_blank_line: bool,
    /// Frame each output file between `%` sentinel lines
    pub wrap_percent: bool,
    /// Suppress the progress display
    pub quiet: bool,
}

/// Result of a completed split operation
#[derive(Debug)]
pub struct SplitResult {
    pub programs_found: usize,
    pub lines_processed: u64,
    pub files_written: u64,
    pub files_failed: u64,
    /// Derived output names in program order
    pub file_names: Vec<String>,
    pub failures: Vec<WriteFailure>,
    pub duration: Duration,
}

/// Run a split operation with the specified arguments
///
/// This is the main entry point. It handles all the internal setup:
/// - Opening the input stream (fatal if unreadable, before any output)
/// - Running the single-pass splitter
/// - Fanning records out to the bounded concurrent writer
/// - Aggregating telemetry into the final summary
///
/// # Example
///
/// ```no_run
/// use nc_splitter::runner::{run_split, SplitArgs};
///
/// # async fn example() -> anyhow::Result<()> {
/// let args = SplitArgs {
///     input: "all_programs.txt".into(),
///     output_dir: "programs/".into(),
///     keyword: "M30".to_string(),
///     append_blank_line: false,
///     wrap_percent: false,
///     quiet: true,
/// };
///
/// let result = run_split(args).await?;
/// println!("Wrote {} files in {:?}", result.files_written, result.duration);
/// # Ok(())
/// # }
/// ```
pub async fn run_split(args: SplitArgs) -> Result<SplitResult> {
    let start_time = Instant::now();

    // Open the input up front; nothing downstream is meaningful without it
    let file = tokio::fs::File::open(&args.input).await.map_err(|source| {
        SplitterError::InputUnavailable {
            path: args.input.clone(),
            source,
        }
    })?;
    let input_size = file
        .metadata()
        .await
        .map(|m| m.len())
        .unwrap_or_default();
    info!(
        "Splitting '{}' ({} bytes) on keyword '{}'",
        args.input.display(),
        input_size,
        args.keyword
    );

    // Telemetry channel feeds the progress task; both stages send into it
    let (telemetry_tx, telemetry_rx) = mpsc::unbounded_channel::<TelemetryEvent>();
    let progress_jh = spawn_progress_task(telemetry_rx, args.quiet);

    let splitter = Splitter::new(SplitConfig {
        keyword: args.keyword.clone(),
        append_blank_line: args.append_blank_line,
    })
    .with_telemetry(telemetry_tx.clone());

    let records = splitter.split(BufReader::new(file)).await?;
    drop(splitter);
    let programs_found = records.len();
    info!("Found {} programs", programs_found);

    let writer = Writer::new(
        &args.output_dir,
        WriteOptions {
            wrap_percent: args.wrap_percent,
        },
    )
    .with_telemetry(telemetry_tx.clone());

    let summary = writer.write_all(records).await?;
    drop(writer);

    // Drop the runner's sender so the progress task sees the channel close
    drop(telemetry_tx);
    let stats = progress_jh.await.unwrap_or_default();

    info!(
        "Split complete: {} programs, {} files written, {} failed in {:.2}s",
        programs_found,
        summary.files_written,
        summary.files_failed,
        start_time.elapsed().as_secs_f64()
    );

    Ok(SplitResult {
        programs_found,
        lines_processed: stats.lines_processed,
        files_written: summary.files_written,
        files_failed: summary.files_failed,
        file_names: summary.file_names,
        failures: summary.failures,
        duration: start_time.elapsed(),
    })
}

/// Spawn the task that aggregates telemetry and, unless quiet, renders a
/// progress line. Returns the final aggregated stats on join.
fn spawn_progress_task(
    mut telemetry_rx: mpsc::UnboundedReceiver<TelemetryEvent>,
    quiet: bool,
) -> tokio::task::JoinHandle<ProgressStats> {
    let bar = if quiet {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("[{elapsed_precise}] {spinner} {msg}")
                .unwrap(),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Some(bar)
    };

    tokio::spawn(async move {
        let mut stats = ProgressStats::new();
        let mut last_program = String::new();

        while let Some(event) = telemetry_rx.recv().await {
            if let TelemetryEvent::ProgramDetected { ref number } = event {
                last_program = format!(" (last O{})", number);
            }
            stats.update(&event);

            if let Some(ref bar) = bar {
                bar.set_message(format!(
                    "{} lines | {} programs{} | {} written, {} failed",
                    stats.lines_processed,
                    stats.programs_found,
                    last_program,
                    stats.files_written,
                    stats.files_failed
                ));
            }
        }

        if let Some(bar) = bar {
            bar.finish_with_message(format!(
                "{} lines | {} programs | {} written, {} failed",
                stats.lines_processed, stats.programs_found, stats.files_written, stats.files_failed
            ));
        }

        stats
    })
}
