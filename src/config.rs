//! Configuration constants for the splitter
//!
//! This module centralizes all tunable parameters and constants used throughout
//! the application.

// ============================================================================
// Split Configuration
// ============================================================================

/// Keyword that terminates a program when no settings file overrides it
pub const DEFAULT_KEYWORD: &str = "M30";

/// Built-in keyword suggestions used when no settings file is present
/// (or when the settings file cannot be parsed)
pub const BUILTIN_KEYWORDS: &[&str] = &[
    "M30", "M02", "M01", "M00", "END", "ENDSUB", "%", "G28", "REWIND", "STOP",
];

// ============================================================================
// Writer Configuration
// ============================================================================

/// Maximum number of output files with writes in flight at once
///
/// Caps open file handles so a source with tens of thousands of programs does
/// not exhaust descriptors. Completion order is irrelevant; the summary is
/// aggregated after every write reaches a terminal state.
pub const MAX_CONCURRENT_WRITES: usize = 10;

/// Extension given to every output file
pub const OUTPUT_EXTENSION: &str = "nc";

// ============================================================================
// Telemetry Configuration
// ============================================================================

/// Emit a progress checkpoint every this many input lines
///
/// Coarse enough that checkpoint events stay negligible next to line I/O on
/// multi-gigabyte inputs, fine enough that a progress display stays live.
pub const PROGRESS_LINE_INTERVAL: u64 = 10_000;
