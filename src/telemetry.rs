/// Telemetry events sent from the splitter and writer for progress tracking
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// A program header was detected in the input
    ProgramDetected { number: String },
    /// Coarse line-count checkpoint, emitted every few thousand lines and
    /// once at end of stream
    LinesProcessed {
        lines_processed: u64,
        programs_found: u64,
    },
    /// An output file was written successfully
    FileWritten { file_name: String },
    /// An output file could not be written
    FileFailed { file_name: String },
}

/// Statistics aggregated from telemetry events
#[derive(Debug, Default, Clone)]
pub struct ProgressStats {
    pub lines_processed: u64,
    pub programs_found: u64,
    pub files_written: u64,
    pub files_failed: u64,
}

impl ProgressStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a telemetry event
    pub fn update(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::ProgramDetected { .. } => {
                self.programs_found += 1;
            }
            TelemetryEvent::LinesProcessed {
                lines_processed, ..
            } => {
                // Checkpoints carry cumulative counts; programs_found is
                // already tracked per ProgramDetected event
                self.lines_processed = *lines_processed;
            }
            TelemetryEvent::FileWritten { .. } => {
                self.files_written += 1;
            }
            TelemetryEvent::FileFailed { .. } => {
                self.files_failed += 1;
            }
        }
    }
}
