//! Trace destinations shared by the `run` command and the shell.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use webrank_core::{Graph, IoSink, LineSink, Simulation, SimulationReport, TraceSinks};

use super::commands::{CliError, TraceTarget};

/// Where one trace is collected while a simulation runs.
///
/// Screen traces are buffered and written once the run ends so the focus and
/// factors traces never interleave on the terminal.
#[derive(Debug)]
pub(super) enum TraceOutput {
    Screen(Vec<String>),
    File {
        path: PathBuf,
        sink: IoSink<BufWriter<File>>,
    },
}

impl TraceOutput {
    pub(super) fn screen() -> Self {
        Self::Screen(Vec::new())
    }

    pub(super) fn file(path: &Path) -> Result<Self, CliError> {
        let file = File::create(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::File {
            path: path.to_path_buf(),
            sink: IoSink::new(BufWriter::new(file)),
        })
    }

    pub(super) fn open(target: &TraceTarget) -> Result<Self, CliError> {
        match target {
            TraceTarget::Stdout => Ok(Self::screen()),
            TraceTarget::File(path) => Self::file(path),
        }
    }

    /// Returns the file receiving the trace, if any.
    pub(super) fn path(&self) -> Option<&Path> {
        match self {
            Self::Screen(_) => None,
            Self::File { path, .. } => Some(path),
        }
    }

    fn sink(&mut self) -> &mut dyn LineSink {
        match self {
            Self::Screen(lines) => lines,
            Self::File { sink, .. } => sink,
        }
    }

    /// Flushes the trace, returning the file it went to if any.
    fn finish(self, screen: &mut dyn Write) -> Result<Option<PathBuf>, CliError> {
        match self {
            Self::Screen(lines) => {
                for line in lines {
                    writeln!(screen, "{line}").map_err(CliError::Terminal)?;
                }
                Ok(None)
            }
            Self::File { path, sink } => match sink.finish() {
                Ok(_) => Ok(Some(path)),
                Err(source) => Err(CliError::Io { path, source }),
            },
        }
    }
}

/// Outcome of [`simulate_into`].
#[derive(Debug)]
pub(super) struct TracedRun {
    pub(super) report: SimulationReport,
    pub(super) written: Vec<PathBuf>,
}

/// Runs `simulation` on `graph`, feeding the requested traces and flushing
/// them afterwards: screen traces to `screen`, file traces to disk.
pub(super) fn simulate_into(
    simulation: &Simulation,
    graph: &mut Graph,
    mut focus: Option<TraceOutput>,
    mut factors: Option<TraceOutput>,
    screen: &mut dyn Write,
) -> Result<TracedRun, CliError> {
    let mut sinks = TraceSinks::none();
    if let Some(output) = focus.as_mut() {
        sinks = sinks.with_focus(output.sink());
    }
    if let Some(output) = factors.as_mut() {
        sinks = sinks.with_factors(output.sink());
    }
    let report = simulation.run_traced(graph, sinks);

    let mut written = Vec::new();
    for output in [focus, factors].into_iter().flatten() {
        if let Some(path) = output.finish(screen)? {
            debug!(path = %path.display(), "trace written");
            written.push(path);
        }
    }
    Ok(TracedRun { report, written })
}
