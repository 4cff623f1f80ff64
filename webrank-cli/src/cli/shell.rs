//! Interactive simulation menu.
//!
//! The session reads one answer per line and keeps the graph, its settings
//! and the focused page between choices. End of input behaves like choosing
//! to exit.

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{info, instrument, warn};
use webrank_core::{Graph, SimulationBuilder};

use super::commands::{CliError, load_snapshot, save_graph};
use super::output::{TraceOutput, simulate_into};

const BANNER: &str =
    "<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<< Page Rank Simulation Program >>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>";

const MENU: [&str; 12] = [
    "",
    "------------------------------ Page Rank Simulation Menu ------------------------------",
    " 1) Set the focused page",
    " 2) Simulate and print the rank progress of the focused page",
    " 3) Simulate and print the factors affecting the focused page",
    " 4) Simulate and print both",
    " 5) Load another graph from a snapshot",
    " 6) Save the graph to a snapshot",
    " 7) Change the sibling factor",
    " 8) Change the lower bound for spam pages",
    " 9) Print the configuration",
    "10) Exit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Interactive menu over a graph, reading answers from `input` and writing
/// prompts, traces and messages to `output`.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use webrank_cli::cli::Session;
/// use webrank_core::Graph;
///
/// let mut output = Vec::new();
/// let choices = Session::new(Graph::new(), Cursor::new("7\n0.5\n10\n"), &mut output)
///     .run()
///     .expect("in-memory i/o succeeds");
/// assert_eq!(choices, 2);
/// let text = String::from_utf8(output).expect("utf-8");
/// assert!(text.contains("The sibling factor is now 0.5."));
/// ```
#[derive(Debug)]
pub struct Session<R, W> {
    graph: Graph,
    focus: Option<String>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Opens a session on `graph`.
    #[must_use]
    pub fn new(graph: Graph, input: R, output: W) -> Self {
        Self {
            graph,
            focus: None,
            input,
            output,
        }
    }

    /// Returns the graph in its current state.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the focused URL, if one was set.
    #[must_use]
    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Runs the menu until the user exits or the input ends, returning the
    /// number of menu choices handled.
    ///
    /// # Errors
    /// Returns [`CliError::Terminal`] when reading the input or writing the
    /// output fails. Problems with files named during the session are
    /// reported to the user and do not end it.
    #[instrument(name = "cli.shell", err, skip(self), fields(pages = self.graph.len()))]
    pub fn run(&mut self) -> Result<usize, CliError> {
        self.say(BANNER)?;
        let mut choices = 0_usize;
        loop {
            for line in MENU {
                self.say(line)?;
            }
            let Some(answer) = self.prompt("Give your choice : ")? else {
                break;
            };
            let Ok(choice) = answer.parse::<u32>() else {
                self.say(&format!("`{answer}` is not a number. Try again."))?;
                continue;
            };
            choices += 1;
            let flow = match choice {
                1 => self.set_focus()?,
                2 => self.simulate(true, false)?,
                3 => self.simulate(false, true)?,
                4 => self.simulate(true, true)?,
                5 => self.load()?,
                6 => self.save()?,
                7 => self.change_sibling_factor()?,
                8 => self.change_lower_bound()?,
                9 => self.print_config()?,
                10 => {
                    self.say("Exiting the page rank simulation.")?;
                    Flow::Exit
                }
                _ => {
                    self.say("Undefined option. Try again.")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                break;
            }
        }
        info!(choices, "shell session ended");
        Ok(choices)
    }

    fn say(&mut self, line: &str) -> Result<(), CliError> {
        writeln!(self.output, "{line}").map_err(CliError::Terminal)
    }

    /// Prints `text` and reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>, CliError> {
        write!(self.output, "{text}").map_err(CliError::Terminal)?;
        self.output.flush().map_err(CliError::Terminal)?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(CliError::Terminal)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn set_focus(&mut self) -> Result<Flow, CliError> {
        let Some(url) = self.prompt("Give the URL of the page to focus on : ")? else {
            return Ok(Flow::Exit);
        };
        if self.graph.get_page(&url).is_none() {
            self.say(&format!(
                "Note: {url} is not in the graph, so no trace can be printed for it yet."
            ))?;
        }
        self.say(&format!("The focused page is now {url}."))?;
        self.focus = Some(url);
        Ok(Flow::Continue)
    }

    fn simulate(&mut self, focus_trace: bool, factors_trace: bool) -> Result<Flow, CliError> {
        let focus = self
            .focus
            .clone()
            .filter(|url| self.graph.get_page(url).is_some());
        let Some(focus) = focus else {
            self.say("The focused URL doesn't exist in the graph. Set a valid one with option 1.")?;
            return Ok(Flow::Continue);
        };

        let mut focus_output = None;
        if focus_trace {
            let Some(output) = self.choose_output("rank progress", None)? else {
                return Ok(Flow::Exit);
            };
            focus_output = Some(output);
        }
        let mut factors_output = None;
        if factors_trace {
            let taken = focus_output.as_ref().and_then(TraceOutput::path);
            let Some(output) = self.choose_output("factors", taken)? else {
                return Ok(Flow::Exit);
            };
            factors_output = Some(output);
        }

        let simulation = SimulationBuilder::new().with_focus(focus.as_str()).build()?;
        let run = match simulate_into(
            &simulation,
            &mut self.graph,
            focus_output,
            factors_output,
            &mut self.output,
        ) {
            Ok(run) => run,
            Err(err @ CliError::Io { .. }) => {
                warn!(error = %err, "trace not written");
                self.say(&format!("Could not write the output: {err}"))?;
                return Ok(Flow::Continue);
            }
            Err(err) => return Err(err),
        };
        for path in &run.written {
            self.say(&format!("The output was written to {}.", path.display()))?;
        }
        if let Some(rank) = run.report.rank_of(&focus) {
            self.say(&format!(
                "Page rank of {focus} after {} generations : {rank:.2}",
                run.report.generations_run()
            ))?;
        }
        Ok(Flow::Continue)
    }

    /// Asks whether a trace goes to the screen or a file other than `taken`;
    /// `None` at end of input.
    fn choose_output(
        &mut self,
        what: &str,
        taken: Option<&Path>,
    ) -> Result<Option<TraceOutput>, CliError> {
        loop {
            let Some(answer) = self.prompt(&format!("Print the {what} on the screen? (yes/no) : "))?
            else {
                return Ok(None);
            };
            match answer.to_ascii_lowercase().as_str() {
                "yes" | "y" => return Ok(Some(TraceOutput::screen())),
                "no" | "n" => {
                    let Some(name) = self.prompt("Give the file name : ")? else {
                        return Ok(None);
                    };
                    if taken == Some(Path::new(&name)) {
                        self.say(&format!(
                            "{name} already receives the other trace. Choose another file."
                        ))?;
                        continue;
                    }
                    match TraceOutput::file(Path::new(&name)) {
                        Ok(output) => return Ok(Some(output)),
                        Err(err) => self.say(&format!("Could not open the file: {err}"))?,
                    }
                }
                _ => self.say("Please answer yes or no.")?,
            }
        }
    }

    fn load(&mut self) -> Result<Flow, CliError> {
        let Some(name) = self.prompt("Give the snapshot file name : ")? else {
            return Ok(Flow::Exit);
        };
        match load_snapshot(Path::new(&name)) {
            Ok(graph) => {
                self.graph = graph;
                self.say(&format!(
                    "Loaded {} pages and {} links from {name}.",
                    self.graph.len(),
                    self.graph.edge_count()
                ))?;
            }
            Err(err) => {
                warn!(error = %err, "snapshot not loaded");
                self.say(&format!("Could not load the graph: {err}"))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn save(&mut self) -> Result<Flow, CliError> {
        let Some(name) = self.prompt("Give the snapshot file name : ")? else {
            return Ok(Flow::Exit);
        };
        match save_graph(&self.graph, Path::new(&name)) {
            Ok(()) => self.say(&format!("The graph was saved to {name}."))?,
            Err(err) => {
                warn!(error = %err, "snapshot not saved");
                self.say(&format!("Could not save the graph: {err}"))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn change_sibling_factor(&mut self) -> Result<Flow, CliError> {
        let Some(raw) = self.prompt("Give a new floating point number for the sibling factor : ")?
        else {
            return Ok(Flow::Exit);
        };
        let message = match raw.parse::<f64>() {
            Ok(value) if self.graph.set_sibling_factor(value) => {
                format!("The sibling factor is now {value}.")
            }
            Ok(_) => "The sibling factor must be greater than 0 and at most 1.".to_owned(),
            Err(_) => format!("`{raw}` is not a floating point number."),
        };
        self.say(&message)?;
        Ok(Flow::Continue)
    }

    fn change_lower_bound(&mut self) -> Result<Flow, CliError> {
        let Some(raw) = self.prompt("Give a new floating point number for the lower bound : ")?
        else {
            return Ok(Flow::Exit);
        };
        let message = match raw.parse::<f64>() {
            Ok(value) if self.graph.set_lower_bound(value) => {
                format!("The lower bound for spam pages is now {value}.")
            }
            Ok(_) => "The lower bound must be a finite number of at least 0.".to_owned(),
            Err(_) => format!("`{raw}` is not a floating point number."),
        };
        self.say(&message)?;
        Ok(Flow::Continue)
    }

    fn print_config(&mut self) -> Result<Flow, CliError> {
        let lines = [
            format!(">> Lower bound for spam pages : {}", self.graph.lower_bound()),
            format!(">> Sibling factor : {}", self.graph.sibling_factor()),
            format!(">> Focused page : {}", self.focus.as_deref().unwrap_or("none")),
            format!(
                ">> Graph : {} pages, {} links",
                self.graph.len(),
                self.graph.edge_count()
            ),
        ];
        for line in &lines {
            self.say(line)?;
        }
        Ok(Flow::Continue)
    }
}
