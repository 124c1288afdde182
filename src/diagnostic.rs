//! The error-reporting capability handed to applications.
//!
//! Every [`Environment`](crate::Environment) carries a [`DiagnosticSink`].
//! Writing to it is fire-and-forget: nothing is returned, no newline is
//! appended and the in-flight response is unaffected.
//!
//! ```rust
//! use std::sync::Arc;
//! use http_app_kit::{Environment, Method};
//! use http_app_kit::diagnostic::{DiagnosticSink, MemorySink};
//!
//! let sink = Arc::new(MemorySink::new());
//! let env = Environment::builder(Method::Get)
//!     .diagnostics(Arc::clone(&sink))
//!     .build();
//!
//! env.log_error("cache miss for key 42");
//! assert_eq!(sink.messages(), ["cache miss for key 42"]);
//! ```
use alloc::sync::Arc;

/// A sink for diagnostic messages.
pub trait DiagnosticSink: Send + Sync {
    /// Records `message` verbatim.
    fn log_error(&self, message: &str);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn log_error(&self, message: &str) {
        (**self).log_error(message)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn log_error(&self, message: &str) {
        (**self).log_error(message)
    }
}

/// Forwards messages to `tracing` as error events.
///
/// This is the sink an environment gets unless the server installs another.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log_error(&self, message: &str) {
        tracing::error!(target: "http_app_kit::diagnostic", "{message}");
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn log_error(&self, _message: &str) {}
}

#[cfg(feature = "std")]
pub use self::std_sinks::{MemorySink, WriterSink};

#[cfg(feature = "std")]
mod std_sinks {
    extern crate std;

    use alloc::{string::String, vec::Vec};
    use std::io::Write;
    use std::sync::{Mutex, PoisonError};

    use super::DiagnosticSink;

    /// Keeps every message in memory.
    #[derive(Debug, Default)]
    pub struct MemorySink {
        messages: Mutex<Vec<String>>,
    }

    impl MemorySink {
        /// Creates an empty sink.
        pub fn new() -> Self {
            Self::default()
        }

        /// A copy of the recorded messages, oldest first.
        pub fn messages(&self) -> Vec<String> {
            self.messages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl DiagnosticSink for MemorySink {
        fn log_error(&self, message: &str) {
            self.messages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(String::from(message));
        }
    }

    /// Writes the raw message bytes to an [`std::io::Write`].
    ///
    /// Nothing is added between messages; callers that want line-oriented
    /// output include the newline themselves. Write failures are dropped.
    #[derive(Debug)]
    pub struct WriterSink<W> {
        writer: Mutex<W>,
    }

    impl<W: Write + Send> WriterSink<W> {
        /// Wraps `writer`.
        pub fn new(writer: W) -> Self {
            Self {
                writer: Mutex::new(writer),
            }
        }

        /// Returns the writer.
        pub fn into_inner(self) -> W {
            self.writer
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl<W: Write + Send> DiagnosticSink for WriterSink<W> {
        fn log_error(&self, message: &str) {
            let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(error) = writer
                .write_all(message.as_bytes())
                .and_then(|()| writer.flush())
            {
                tracing::debug!(%error, "diagnostic write failed");
            }
        }
    }
}
