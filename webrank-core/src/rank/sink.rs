//! Line-oriented destinations for simulation traces.

use std::io::{self, Write};

/// Accepts rendered trace output one line at a time.
///
/// The engine never decides where lines end up; terminals, files and
/// in-memory buffers are all just sinks.
pub trait LineSink {
    /// Appends one line of text, without a trailing newline.
    fn append_line(&mut self, line: &str);
}

impl LineSink for Vec<String> {
    fn append_line(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn append_line(&mut self, line: &str) {
        (**self).append_line(line);
    }
}

/// Adapts any [`Write`] implementation into a [`LineSink`].
///
/// Write failures are latched: the first error stops further output and is
/// returned by [`IoSink::finish`].
///
/// # Examples
/// ```
/// use webrank_core::{IoSink, LineSink};
///
/// let mut sink = IoSink::new(Vec::new());
/// sink.append_line("first");
/// sink.append_line("second");
/// let bytes = sink.finish().expect("writing to a Vec cannot fail");
/// assert_eq!(bytes, b"first\nsecond\n");
/// ```
#[derive(Debug)]
pub struct IoSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> IoSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Flushes the writer and hands it back.
    ///
    /// # Errors
    /// Returns the first write error seen by [`LineSink::append_line`], or the
    /// flush error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> LineSink for IoSink<W> {
    fn append_line(&mut self, line: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = writeln!(self.writer, "{line}") {
            self.error = Some(error);
        }
    }
}

/// The optional destinations of one simulation run.
///
/// A missing sink disables the corresponding trace.
#[derive(Default)]
pub struct TraceSinks<'a> {
    pub(crate) focus: Option<&'a mut dyn LineSink>,
    pub(crate) factors: Option<&'a mut dyn LineSink>,
}

impl<'a> TraceSinks<'a> {
    /// Creates an empty set of sinks; no trace is rendered.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Routes the focused-page trace to `sink`.
    #[must_use]
    pub fn with_focus(mut self, sink: &'a mut dyn LineSink) -> Self {
        self.focus = Some(sink);
        self
    }

    /// Routes the contributor table to `sink`.
    #[must_use]
    pub fn with_factors(mut self, sink: &'a mut dyn LineSink) -> Self {
        self.factors = Some(sink);
        self
    }
}
