//! Verbose diagnostics sink.
//!
//! Provisioning is expected to explain itself: every resolution step,
//! discovery result, and strategy attempt is streamed to a [`Diagnostics`]
//! sink when verbose mode is on. The sink is an owned, injectable writer
//! rather than process-global state, so embedders and tests can capture
//! the stream independently. Everything is mirrored to [`tracing`] at
//! debug/warn level regardless of the verbose flag.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Destination for step-by-step provisioning diagnostics.
///
/// # Examples
///
/// ```
/// use reportlink_core::Diagnostics;
///
/// let (mut diag, buffer) = Diagnostics::capture(true);
/// diag.step("Looking for driver directory...");
/// assert!(buffer.contents().contains("Looking for driver directory"));
/// ```
pub struct Diagnostics {
    verbose: bool,
    sink: Box<dyn Write + Send>,
}

impl Diagnostics {
    /// Verbose diagnostics writing to standard error.
    pub fn stderr(verbose: bool) -> Self {
        Self::with_sink(verbose, Box::new(io::stderr()))
    }

    /// Non-verbose diagnostics that discard everything. Steps still reach
    /// `tracing` subscribers.
    pub fn quiet() -> Self {
        Self::with_sink(false, Box::new(io::sink()))
    }

    /// Diagnostics writing to an arbitrary sink.
    pub fn with_sink(verbose: bool, sink: Box<dyn Write + Send>) -> Self {
        Self { verbose, sink }
    }

    /// Verbose diagnostics captured into an in-memory buffer, for tests
    /// and embedders that present the stream themselves.
    pub fn capture(verbose: bool) -> (Self, DiagnosticsBuffer) {
        let buffer = DiagnosticsBuffer::default();
        let sink = BufferSink(Arc::clone(&buffer.0));
        (Self::with_sink(verbose, Box::new(sink)), buffer)
    }

    /// Whether step lines reach the sink.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Records one resolution/discovery/strategy step.
    ///
    /// Sink write failures are ignored; diagnostics must never fail the
    /// pipeline they describe.
    pub fn step(&mut self, message: impl fmt::Display) {
        tracing::debug!("{message}");
        if self.verbose {
            let _ = writeln!(self.sink, "{message}");
        }
    }

    /// Records a non-blocking warning.
    pub fn warn(&mut self, message: impl fmt::Display) {
        tracing::warn!("{message}");
        if self.verbose {
            let _ = writeln!(self.sink, "WARNING: {message}");
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

/// Shared handle onto the buffer behind [`Diagnostics::capture`].
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsBuffer(Arc<Mutex<Vec<u8>>>);

impl DiagnosticsBuffer {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// The captured lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

struct BufferSink(Arc<Mutex<Vec<u8>>>);

impl Write for BufferSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
