//! Bounded concurrent output writer
//!
//! Serializes each program record to `O<number>.nc` in the destination
//! directory. Writes fan out with a fixed cap on in-flight files; one file
//! failing never aborts its siblings. The summary reflects every record
//! regardless of completion order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::warn;

use crate::config::{MAX_CONCURRENT_WRITES, OUTPUT_EXTENSION};
use crate::error::SplitterError;
use crate::splitter::ProgramRecord;
use crate::telemetry::TelemetryEvent;

/// Options recognized by the writer
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Frame each file's content between `%` sentinel lines, trimming
    /// trailing whitespace from the content first
    pub wrap_percent: bool,
}

/// One output file that could not be written
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub file_name: String,
    pub error: String,
}

/// Result of writing all records to the destination
#[derive(Debug, Default)]
pub struct WriteSummary {
    pub files_written: u64,
    pub files_failed: u64,
    /// Derived file names in record order, one per input record
    pub file_names: Vec<String>,
    pub failures: Vec<WriteFailure>,
}

/// Derive the output file name for a program number.
///
/// Pure function of the number, used verbatim: `7` and `007` yield distinct
/// names. Records that repeat a number collide on one name and resolve
/// last-writer-wins in record order.
pub fn output_file_name(number: &str) -> String {
    format!("O{}.{}", number, OUTPUT_EXTENSION)
}

/// Render the bytes for one output file per the options
fn render_content(record: &ProgramRecord, options: &WriteOptions) -> String {
    if options.wrap_percent {
        format!("%\n{}\n%\n", record.content.trim_end())
    } else {
        record.content.clone()
    }
}

/// The writer: destination directory plus rendering options and an optional
/// telemetry sender.
pub struct Writer {
    output_dir: PathBuf,
    options: WriteOptions,
    telemetry_tx: Option<mpsc::UnboundedSender<TelemetryEvent>>,
}

impl Writer {
    pub fn new(output_dir: impl AsRef<Path>, options: WriteOptions) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            options,
            telemetry_tx: None,
        }
    }

    /// Attach a telemetry channel; events are dropped if the receiver is gone
    pub fn with_telemetry(mut self, tx: mpsc::UnboundedSender<TelemetryEvent>) -> Self {
        self.telemetry_tx = Some(tx);
        self
    }

    fn send(&self, event: TelemetryEvent) {
        if let Some(tx) = &self.telemetry_tx {
            let _ = tx.send(event);
        }
    }

    /// Write every record to the destination and aggregate the summary.
    ///
    /// The destination directory is created if absent; failure to create it
    /// is fatal and happens before any write starts. Individual write
    /// failures are caught, counted, and reported in the summary while the
    /// remaining files proceed. Returns only after every record has reached
    /// a terminal state.
    pub async fn write_all(&self, records: Vec<ProgramRecord>) -> Result<WriteSummary> {
        tokio::fs::create_dir_all(&self.output_dir).await.map_err(|source| {
            SplitterError::OutputDirectoryUnwritable {
                path: self.output_dir.clone(),
                source,
            }
        })?;

        let mut summary = WriteSummary::default();
        let mut join_set: JoinSet<(String, Result<()>)> = JoinSet::new();
        // Names with a write in flight; a repeated name waits for the earlier
        // write so duplicate numbers resolve last-writer-wins
        let mut in_flight: HashSet<String> = HashSet::new();

        for record in records {
            let file_name = output_file_name(&record.number);
            summary.file_names.push(file_name.clone());

            // Drain until below the cap and until this name is free
            while join_set.len() >= MAX_CONCURRENT_WRITES || in_flight.contains(&file_name) {
                match join_set.join_next().await {
                    Some(Ok((done_name, result))) => {
                        in_flight.remove(&done_name);
                        self.record_outcome(&mut summary, done_name, result);
                    }
                    Some(Err(e)) => return Err(anyhow!("Write task panicked: {}", e)),
                    None => break,
                }
            }

            in_flight.insert(file_name.clone());
            let path = self.output_dir.join(&file_name);
            let content = render_content(&record, &self.options);

            join_set.spawn(async move {
                let result = tokio::fs::write(&path, content.as_bytes())
                    .await
                    .map_err(|e| anyhow!("Failed to write '{}': {}", path.display(), e));
                (file_name, result)
            });
        }

        // Wait for remaining writes
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((done_name, outcome)) => {
                    in_flight.remove(&done_name);
                    self.record_outcome(&mut summary, done_name, outcome);
                }
                Err(e) => return Err(anyhow!("Write task panicked: {}", e)),
            }
        }

        Ok(summary)
    }

    fn record_outcome(&self, summary: &mut WriteSummary, file_name: String, result: Result<()>) {
        match result {
            Ok(()) => {
                summary.files_written += 1;
                self.send(TelemetryEvent::FileWritten { file_name });
            }
            Err(e) => {
                warn!("{:#}", e);
                summary.files_failed += 1;
                self.send(TelemetryEvent::FileFailed {
                    file_name: file_name.clone(),
                });
                summary.failures.push(WriteFailure {
                    file_name,
                    error: format!("{:#}", e),
                });
            }
        }
    }
}
