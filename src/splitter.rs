//! Single-pass program splitter
//!
//! Scans the input line by line and cuts it into programs. A program starts
//! at a header line (`O` followed by decimal digits at the start of line) and
//! ends either when the split keyword appears in a line or when the next
//! header arrives. The pass keeps only one program's lines in memory at a
//! time beyond the finished records it has already emitted.

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::PROGRESS_LINE_INTERVAL;
use crate::telemetry::TelemetryEvent;

/// One complete program cut out of the input.
///
/// `number` is the digit run captured from the header line, kept verbatim as
/// an opaque token: `007` and `7` are distinct programs and map to distinct
/// output names. `content` holds the accumulated lines, newline-terminated,
/// in original order, with the header line first. Both are always non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRecord {
    pub number: String,
    pub content: String,
}

/// Options recognized by the splitter. Exactly these two; nothing else
/// affects how the input is cut.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Case-sensitive substring that ends the current program when it occurs
    /// anywhere in a non-header line. Must be non-empty; an empty keyword
    /// would match every line and is rejected before the pass starts.
    pub keyword: String,
    /// Append one blank line after the keyword line in the emitted content
    pub append_blank_line: bool,
}

/// Accumulator for the program currently being assembled.
///
/// Reset to empty on every flush and at end of stream. A flush produces a
/// record only when both a program number and buffered content exist; lines
/// read before the first header accumulate here but are never emitted.
#[derive(Debug, Default)]
struct Accumulator {
    number: Option<String>,
    buffer: String,
}

impl Accumulator {
    fn push_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    fn take_record(&mut self) -> Option<ProgramRecord> {
        let record = match (&self.number, self.buffer.is_empty()) {
            (Some(number), false) => Some(ProgramRecord {
                number: number.clone(),
                content: std::mem::take(&mut self.buffer),
            }),
            _ => None,
        };
        self.number = None;
        self.buffer.clear();
        record
    }
}

/// Extract the program number from a header line.
///
/// A header is the literal character `O` at the very start of the line,
/// immediately followed by one or more ASCII digits. Leading whitespace
/// disqualifies the line. Only the leading digit run is captured; trailing
/// characters do not affect matching but stay in the content verbatim.
fn parse_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('O')?;
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        None
    } else {
        Some(&rest[..digits])
    }
}

/// The splitter itself: configuration plus an optional telemetry sender.
pub struct Splitter {
    config: SplitConfig,
    telemetry_tx: Option<mpsc::UnboundedSender<TelemetryEvent>>,
}

impl Splitter {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            config,
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

    /// Run the single forward pass and return the records in flush order.
    ///
    /// The input is consumed once and never rewound. Malformed lines are not
    /// errors (a line that is not a header simply is not one); a stream-level
    /// read failure aborts the whole pass.
    pub async fn split<R>(&self, reader: R) -> Result<Vec<ProgramRecord>>
    where
        R: AsyncBufRead + Unpin,
    {
        if self.config.keyword.is_empty() {
            return Err(anyhow!("Split keyword must not be empty"));
        }

        let mut records = Vec::new();
        let mut acc = Accumulator::default();
        let mut lines_processed = 0u64;
        let mut programs_found = 0u64;

        let mut lines = reader.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read line from input stream")?
        {
            lines_processed += 1;

            if let Some(number) = parse_header(&line) {
                // Close the previous program; it never saw its keyword
                if let Some(record) = acc.take_record() {
                    records.push(record);
                }

                acc.number = Some(number.to_string());
                acc.push_line(&line);

                programs_found += 1;
                debug!("Found program: O{}", number);
                self.send(TelemetryEvent::ProgramDetected {
                    number: number.to_string(),
                });
            } else {
                acc.push_line(&line);

                // Keyword is never tested against header lines; the header
                // branch above takes precedence
                if line.contains(&self.config.keyword) {
                    if self.config.append_blank_line {
                        acc.buffer.push('\n');
                    }
                    if let Some(record) = acc.take_record() {
                        records.push(record);
                    }
                }
            }

            if lines_processed % PROGRESS_LINE_INTERVAL == 0 {
                self.send(TelemetryEvent::LinesProcessed {
                    lines_processed,
                    programs_found,
                });
            }
        }

        // Final program may end at EOF without ever hitting the keyword
        if let Some(record) = acc.take_record() {
            records.push(record);
        }

        self.send(TelemetryEvent::LinesProcessed {
            lines_processed,
            programs_found,
        });

        Ok(records)
    }
}
