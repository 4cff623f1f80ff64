//! Command implementations and argument parsing for the webrank CLI.

use std::convert::Infallible;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{Span, field, info, instrument};
use webrank_core::{
    DEFAULT_GENERATIONS, ExecutionStrategy, Graph, IngestError, RankConfig, SimulationBuilder,
    SimulationError, SnapshotError, TopologyError, ingest, snapshot,
    topology::{MAX_OUT_LINKS, MIN_OUT_LINKS, TopologyParams, randomize_links},
};

use super::output::{TraceOutput, simulate_into};
use super::shell::Session;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "webrank",
    version,
    about = "Simulate PageRank over a graph of web pages."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Read a page list, link the pages at random and save a snapshot.
    Build(BuildCommand),
    /// Rank a graph and print its pages ordered by rank.
    Run(RunCommand),
    /// Show or change the ranking settings stored in a snapshot.
    Config(ConfigCommand),
    /// Open the interactive simulation menu.
    Shell(ShellCommand),
}

/// Selects the graph a command works on.
#[derive(Debug, Args, Clone, Default)]
#[group(required = true, multiple = false)]
pub struct GraphInput {
    /// Snapshot written by `webrank build` or saved from the shell.
    #[arg(long, value_name = "SNAPSHOT")]
    pub graph: Option<PathBuf>,
    /// Whitespace-separated page URLs; links are generated on load.
    #[arg(long, value_name = "PAGE_LIST")]
    pub pages: Option<PathBuf>,
}

/// Random link generation settings used when a page list is loaded.
#[derive(Debug, Args, Clone)]
pub struct LinkArgs {
    /// Seed for the link generator; omit for a fresh topology every time.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Fewest out-links drawn per page.
    #[arg(long, default_value_t = MIN_OUT_LINKS)]
    pub min_out: usize,
    /// Most out-links drawn per page.
    #[arg(long, default_value_t = MAX_OUT_LINKS)]
    pub max_out: usize,
}

impl Default for LinkArgs {
    fn default() -> Self {
        Self {
            seed: None,
            min_out: MIN_OUT_LINKS,
            max_out: MAX_OUT_LINKS,
        }
    }
}

impl LinkArgs {
    fn params(&self) -> Result<TopologyParams, TopologyError> {
        let params = TopologyParams::new(self.min_out, self.max_out)?;
        Ok(match self.seed {
            Some(seed) => params.with_rng_seed(seed),
            None => params,
        })
    }
}

/// Options accepted by the `build` command.
#[derive(Debug, Args, Clone)]
pub struct BuildCommand {
    /// Whitespace-separated page URLs.
    #[arg(value_name = "PAGE_LIST")]
    pub pages: PathBuf,
    /// Where the snapshot is written.
    #[arg(long, short)]
    pub output: PathBuf,
    /// Link generation settings.
    #[command(flatten)]
    pub links: LinkArgs,
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Graph to rank.
    #[command(flatten)]
    pub input: GraphInput,
    /// Link generation settings for `--pages`.
    #[command(flatten)]
    pub links: LinkArgs,
    /// Generations to compute; a negative count leaves the graph untouched.
    #[arg(long, default_value_t = DEFAULT_GENERATIONS, allow_negative_numbers = true)]
    pub generations: i64,
    /// URL of the page whose rank is traced.
    #[arg(long)]
    pub focus: Option<String>,
    /// Destination of the per-generation focus trace, `-` for stdout.
    #[arg(long, value_name = "PATH|-", requires = "focus")]
    pub trace_focus: Option<TraceTarget>,
    /// Destination of the factors table, `-` for stdout.
    #[arg(long, value_name = "PATH|-", requires = "focus")]
    pub trace_factors: Option<TraceTarget>,
    /// Replaces the spam lower bound stored with the graph.
    #[arg(long)]
    pub lower_bound: Option<f64>,
    /// Replaces the sibling factor stored with the graph.
    #[arg(long)]
    pub sibling_factor: Option<f64>,
    /// How each generation is evaluated.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,
    /// Saves the ranked graph to this snapshot path.
    #[arg(long, value_name = "SNAPSHOT")]
    pub save: Option<PathBuf>,
}

/// Options accepted by the `config` command.
#[derive(Debug, Args, Clone)]
pub struct ConfigCommand {
    /// Snapshot to inspect; it is rewritten when a setting changes.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,
    /// New spam lower bound, at least zero.
    #[arg(long)]
    pub lower_bound: Option<f64>,
    /// New sibling factor, greater than zero and at most one.
    #[arg(long)]
    pub sibling_factor: Option<f64>,
}

/// Options accepted by the `shell` command.
#[derive(Debug, Args, Clone)]
pub struct ShellCommand {
    /// Graph the session starts with.
    #[command(flatten)]
    pub input: GraphInput,
    /// Link generation settings for `--pages`.
    #[command(flatten)]
    pub links: LinkArgs,
}

/// Evaluation strategy choices exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StrategyArg {
    /// Parallel for large graphs when available, sequential otherwise.
    #[default]
    Auto,
    /// Always on the calling thread.
    Sequential,
    /// Always on the Rayon pool.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Destination of a trace: standard output (`-`) or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceTarget {
    /// Written to standard output after the run.
    Stdout,
    /// Written to the file at this path.
    File(PathBuf),
}

impl FromStr for TraceTarget {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw {
            "-" => Self::Stdout,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

/// Errors emitted by the CLI.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// Opening, creating or writing a file failed.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading from or writing to the terminal failed.
    #[error("terminal i/o failed: {0}")]
    Terminal(#[source] io::Error),
    /// Both traces were sent to the same file.
    #[error("--trace-focus and --trace-factors both name `{path}`; give each trace its own file")]
    SharedTraceFile {
        /// The file named twice.
        path: PathBuf,
    },
    /// Neither a snapshot nor a page list was named.
    #[error("either --graph or --pages must name the input graph")]
    MissingInput,
    /// A ranking setting was outside its accepted range.
    #[error("{setting} {value} is out of range; expected {expected}")]
    InvalidSetting {
        /// Name of the setting.
        setting: &'static str,
        /// Rejected value.
        value: f64,
        /// Accepted range.
        expected: &'static str,
    },
    /// Reading or writing a snapshot failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// Reading a page list failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Generating links failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// Building the simulation failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl CliError {
    /// Returns the stable code of the library error behind this failure.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Snapshot(err) => Some(err.code().as_str()),
            Self::Ingest(err) => Some(err.code().as_str()),
            Self::Topology(err) => Some(err.code().as_str()),
            Self::Simulation(err) => Some(err.code().as_str()),
            _ => None,
        }
    }
}

/// Result of a `build` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Pages read from the list.
    pub pages: usize,
    /// Links generated.
    pub edges: usize,
    /// Snapshot path.
    pub output: PathBuf,
}

/// Result of a `run` command.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Pages in the graph.
    pub pages: usize,
    /// Links in the graph.
    pub edges: usize,
    /// Generations computed.
    pub generations: usize,
    /// Whether the run was skipped and the graph left untouched.
    pub skipped: bool,
    /// Pages and ranks, highest rank first.
    pub ranking: Vec<(String, f64)>,
    /// Trace files written.
    pub traces: Vec<PathBuf>,
    /// Snapshot written with the final ranks, if requested.
    pub saved: Option<PathBuf>,
}

/// Result of a `config` command.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSummary {
    /// Spam lower bound now stored in the snapshot.
    pub lower_bound: f64,
    /// Sibling factor now stored in the snapshot.
    pub sibling_factor: f64,
    /// Whether the snapshot was rewritten.
    pub updated: bool,
}

/// Summary returned once a command completes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionSummary {
    /// A snapshot was built.
    Build(BuildSummary),
    /// A graph was ranked.
    Run(RunSummary),
    /// A snapshot's settings were shown or changed.
    Config(ConfigSummary),
    /// An interactive session ended after this many menu choices.
    Shell {
        /// Menu choices handled, including the final exit.
        choices: usize,
    },
}

/// Executes the parsed command.
///
/// # Errors
/// Returns [`CliError`] when an input cannot be read, a setting is out of
/// range or an output cannot be written.
///
/// # Examples
/// ```no_run
/// use clap::Parser;
/// use webrank_cli::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["webrank", "config", "graph.snap"]);
/// run_cli(cli)?;
/// # Ok::<(), webrank_cli::cli::CliError>(())
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Build(build) => {
            span.record("command", field::display("build"));
            build_snapshot(&build).map(ExecutionSummary::Build)
        }
        Command::Run(run) => {
            span.record("command", field::display("run"));
            let stdout = io::stdout();
            run_command(&run, &mut stdout.lock()).map(ExecutionSummary::Run)
        }
        Command::Config(config) => {
            span.record("command", field::display("config"));
            configure_snapshot(&config).map(ExecutionSummary::Config)
        }
        Command::Shell(shell) => {
            span.record("command", field::display("shell"));
            let graph = load_graph(&shell.input, &shell.links)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            let choices = Session::new(graph, stdin.lock(), stdout.lock()).run()?;
            Ok(ExecutionSummary::Shell { choices })
        }
    }
}

#[instrument(
    name = "cli.build",
    err,
    skip(command),
    fields(pages = field::Empty, output = %command.output.display()),
)]
pub(super) fn build_snapshot(command: &BuildCommand) -> Result<BuildSummary, CliError> {
    let params = command.links.params()?;
    let mut graph = Graph::new();
    ingest::pages_from_reader(&mut graph, open_reader(&command.pages)?)?;
    Span::current().record("pages", graph.len());
    let edges = randomize_links(&mut graph, &params)?;
    save_graph(&graph, &command.output)?;
    info!(pages = graph.len(), edges, "snapshot built");
    Ok(BuildSummary {
        pages: graph.len(),
        edges,
        output: command.output.clone(),
    })
}

#[instrument(
    name = "cli.simulate",
    err,
    skip(command, screen),
    fields(
        generations = command.generations,
        focus = command.focus.as_deref().unwrap_or_default(),
        strategy = ?command.strategy,
    ),
)]
pub(super) fn run_command(
    command: &RunCommand,
    screen: &mut dyn Write,
) -> Result<RunSummary, CliError> {
    if let (Some(TraceTarget::File(focus)), Some(TraceTarget::File(factors))) =
        (&command.trace_focus, &command.trace_factors)
        && focus == factors
    {
        return Err(CliError::SharedTraceFile {
            path: focus.clone(),
        });
    }
    let simulation = SimulationBuilder::new()
        .with_generations(command.generations)
        .with_optional_focus(command.focus.clone())
        .with_execution_strategy(command.strategy.into())
        .build()?;
    let mut graph = load_graph(&command.input, &command.links)?;
    apply_settings(&mut graph, command.lower_bound, command.sibling_factor)?;

    let focus = command.trace_focus.as_ref().map(TraceOutput::open).transpose()?;
    let factors = command
        .trace_factors
        .as_ref()
        .map(TraceOutput::open)
        .transpose()?;
    let run = simulate_into(&simulation, &mut graph, focus, factors, screen)?;

    if let Some(path) = &command.save {
        save_graph(&graph, path)?;
    }
    info!(
        pages = graph.len(),
        generations = run.report.generations_run(),
        "command completed"
    );
    Ok(RunSummary {
        pages: graph.len(),
        edges: graph.edge_count(),
        generations: run.report.generations_run(),
        skipped: run.report.was_skipped(),
        ranking: run
            .report
            .ranking()
            .into_iter()
            .map(|(url, rank)| (url.to_owned(), rank))
            .collect(),
        traces: run.written,
        saved: command.save.clone(),
    })
}

#[instrument(
    name = "cli.config",
    err,
    skip(command),
    fields(snapshot = %command.snapshot.display()),
)]
pub(super) fn configure_snapshot(command: &ConfigCommand) -> Result<ConfigSummary, CliError> {
    let mut graph = load_snapshot(&command.snapshot)?;
    apply_settings(&mut graph, command.lower_bound, command.sibling_factor)?;
    let updated = command.lower_bound.is_some() || command.sibling_factor.is_some();
    if updated {
        save_graph(&graph, &command.snapshot)?;
        info!("snapshot settings updated");
    }
    Ok(ConfigSummary {
        lower_bound: graph.lower_bound(),
        sibling_factor: graph.sibling_factor(),
        updated,
    })
}

/// Loads the graph named by `input`, generating links for a page list.
#[instrument(
    name = "cli.load_graph",
    err,
    skip(input, links),
    fields(source = field::Empty, path = field::Empty),
)]
pub(super) fn load_graph(input: &GraphInput, links: &LinkArgs) -> Result<Graph, CliError> {
    let span = Span::current();
    match (&input.graph, &input.pages) {
        (Some(path), _) => {
            span.record("source", "snapshot");
            span.record("path", field::display(path.display()));
            load_snapshot(path)
        }
        (None, Some(path)) => {
            span.record("source", "pages");
            span.record("path", field::display(path.display()));
            let params = links.params()?;
            let mut graph = Graph::new();
            ingest::pages_from_reader(&mut graph, open_reader(path)?)?;
            randomize_links(&mut graph, &params)?;
            Ok(graph)
        }
        (None, None) => Err(CliError::MissingInput),
    }
}

pub(super) fn load_snapshot(path: &Path) -> Result<Graph, CliError> {
    Ok(snapshot::load(open_reader(path)?)?)
}

pub(super) fn save_graph(graph: &Graph, path: &Path) -> Result<(), CliError> {
    let file = File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    snapshot::save(graph, BufWriter::new(file))?;
    Ok(())
}

#[instrument(name = "cli.open_reader", err, skip(path), fields(path = %path.display()))]
fn open_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Applies the optional overrides, rejecting out-of-range values before
/// anything changes.
pub(super) fn apply_settings(
    graph: &mut Graph,
    lower_bound: Option<f64>,
    sibling_factor: Option<f64>,
) -> Result<(), CliError> {
    let mut config: RankConfig = *graph.config();
    if let Some(value) = lower_bound
        && !config.set_lower_bound(value)
    {
        return Err(CliError::InvalidSetting {
            setting: "lower bound",
            value,
            expected: "a finite value of at least 0",
        });
    }
    if let Some(value) = sibling_factor
        && !config.set_sibling_factor(value)
    {
        return Err(CliError::InvalidSetting {
            setting: "sibling factor",
            value,
            expected: "a value in (0, 1]",
        });
    }
    graph.set_config(config);
    Ok(())
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// use webrank_cli::cli::{ConfigSummary, ExecutionSummary, render_summary};
///
/// let summary = ExecutionSummary::Config(ConfigSummary {
///     lower_bound: 0.25,
///     sibling_factor: 1.0,
///     updated: false,
/// });
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer).expect("writing to memory succeeds");
/// assert_eq!(
///     String::from_utf8(buffer).expect("utf-8"),
///     "lower bound: 0.25\nsibling factor: 1\n"
/// );
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Build(build) => {
            writeln!(writer, "pages: {}", build.pages)?;
            writeln!(writer, "edges: {}", build.edges)?;
            writeln!(writer, "snapshot: {}", build.output.display())?;
        }
        ExecutionSummary::Run(run) => {
            writeln!(writer, "pages: {}", run.pages)?;
            writeln!(writer, "edges: {}", run.edges)?;
            if run.skipped {
                writeln!(writer, "simulation skipped; graph left untouched")?;
            } else {
                writeln!(writer, "generations: {}", run.generations)?;
                for (position, (url, rank)) in run.ranking.iter().enumerate() {
                    writeln!(writer, "{}\t{rank:.4}\t{url}", position + 1)?;
                }
            }
            for path in &run.traces {
                writeln!(writer, "trace: {}", path.display())?;
            }
            if let Some(path) = &run.saved {
                writeln!(writer, "snapshot: {}", path.display())?;
            }
        }
        ExecutionSummary::Config(config) => {
            writeln!(writer, "lower bound: {}", config.lower_bound)?;
            writeln!(writer, "sibling factor: {}", config.sibling_factor)?;
            if config.updated {
                writeln!(writer, "snapshot updated")?;
            }
        }
        ExecutionSummary::Shell { .. } => {}
    }
    Ok(())
}
