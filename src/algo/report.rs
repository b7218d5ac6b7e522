//! User-facing diagnostics for engine calls.
//!
//! Engines never print. They hand leveled messages to a [`Reporter`], which
//! forwards them to a caller-supplied callback and also emits them as
//! `tracing` events, so a subscriber sees them without extra wiring.
//!
//! # Example
//!
//! ```
//! use meshcast::algo::report::{Level, Reporter};
//!
//! let reporter = Reporter::new(|level, message| {
//!     eprintln!("[{level}] {message}");
//! });
//! reporter.warning("Mesh: #1 has 3 vertices that failed to be projected");
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// The whole operation was aborted.
    Error,
    /// A mesh was skipped or only partly processed.
    Warning,
    /// Progress and timing.
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
        })
    }
}

/// A message sink that receives leveled reports during an operation.
pub struct Reporter {
    callback: Box<dyn Fn(Level, &str) + Send + Sync>,
}

impl Reporter {
    /// Create a reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Level, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Send a message at `level`.
    pub fn report(&self, level: Level, message: &str) {
        match level {
            Level::Error => tracing::error!(target: "meshcast::report", "{message}"),
            Level::Warning => tracing::warn!(target: "meshcast::report", "{message}"),
            Level::Info => tracing::info!(target: "meshcast::report", "{message}"),
        }
        (self.callback)(level, message);
    }

    /// Send an error.
    #[inline]
    pub fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }

    /// Send a warning.
    #[inline]
    pub fn warning(&self, message: &str) {
        self.report(Level::Warning, message);
    }

    /// Send an informational message.
    #[inline]
    pub fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    /// A reporter whose callback discards everything (tracing still fires).
    pub fn none() -> Self {
        Self::new(|_, _| {})
    }

    /// A reporter that appends every message to a shared list.
    ///
    /// Returns the reporter and the list handle.
    pub fn collecting() -> (Self, Arc<Mutex<Vec<(Level, String)>>>) {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let reporter = Self::new(move |level, message| {
            if let Ok(mut list) = sink.lock() {
                list.push((level, message.to_owned()));
            }
        });
        (reporter, messages)
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}
