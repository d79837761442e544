use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures that abort a split run before any partial output is useful.
///
/// Individual output-file failures are not represented here: they are caught
/// per item, counted, and reported in the write summary without aborting
/// sibling writes.
#[derive(Debug, Error)]
pub enum SplitterError {
    /// The input stream could not be opened or read; surfaced before any
    /// records are produced.
    #[error("input file '{path}' could not be read")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination directory could not be created; surfaced before any
    /// writes are attempted.
    #[error("output directory '{path}' could not be created")]
    OutputDirectoryUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
