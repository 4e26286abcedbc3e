//! Unified error type for stickerforge.
//!
//! Every conversion step funnels its failures into [`Error`]. The variants
//! mirror the stages of a conversion job so callers can tell a missing tool
//! apart from an oversized sticker without parsing messages.

use std::fmt;

/// Unified error type covering all failure modes of a conversion job.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The scratch directory for a job could not be created or removed.
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// An external tool (ffmpeg, convert, webpmux, ...) failed.
    #[error("Tool error [{tool}]: {stderr}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Captured standard error, or the spawn failure.
        stderr: String,
    },

    /// The adaptive reducer ran out of quality/fps budget.
    #[error("Sticker does not fit in {ceiling} bytes after {attempts} attempts")]
    SizeBudgetExceeded {
        /// The size ceiling in bytes.
        ceiling: usize,
        /// How many encode attempts were made.
        attempts: u32,
    },

    /// Raster input could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Raster output could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Embedding pack metadata into the container failed.
    #[error("Mux error: {0}")]
    Mux(String),

    /// Every fallback strategy failed.
    #[error("All strategies failed: {}", summarize(.0))]
    StrategiesExhausted(Vec<StrategyFailure>),

    /// Input or configuration failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// One failed attempt inside a fallback chain.
#[derive(Debug)]
pub struct StrategyFailure {
    /// Strategy name, e.g. `"webm"`.
    pub strategy: String,
    /// Why it failed.
    pub error: Error,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

fn summarize(failures: &[StrategyFailure]) -> String {
    if failures.is_empty() {
        return "no strategies configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, stderr: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            stderr: stderr.into(),
        }
    }

    /// Convenience constructor for [`Error::Workspace`].
    pub fn workspace(message: impl Into<String>) -> Self {
        Error::Workspace(message.into())
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Whether this error came from an external process.
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, Error::Tool { .. })
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
