//! Command-line interface orchestration for the webrank simulator.
//!
//! `build` turns a page list into a snapshot with random links, `run`
//! simulates a graph and prints its ranking, `config` edits the ranking
//! settings stored in a snapshot and `shell` opens the interactive menu.

mod commands;
mod output;
mod shell;

pub use commands::{
    BuildCommand, BuildSummary, Cli, CliError, Command, ConfigCommand, ConfigSummary,
    ExecutionSummary, GraphInput, LinkArgs, RunCommand, RunSummary, ShellCommand, StrategyArg, TraceTarget,
    render_summary, run_cli,
};
pub use shell::Session;

#[cfg(test)]
mod test_helpers;
