//! Fixtures for the CLI command tests.

use std::fs;
use std::io;
use std::path::PathBuf;

use tempfile::TempDir;

use super::{Cli, CliError, run_cli};

/// Writes `contents` as `pages.txt` in a fresh directory. The directory lives
/// as long as the returned guard.
pub(super) fn page_list(contents: &str) -> io::Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let pages = dir.path().join("pages.txt");
    fs::write(&pages, contents)?;
    Ok((dir, pages))
}

/// Runs `cli`, panicking with `reason` if it succeeds.
pub(super) fn expect_failure(cli: Cli, reason: &str) -> CliError {
    match run_cli(cli) {
        Ok(summary) => panic!("{reason}; got {summary:?}"),
        Err(err) => err,
    }
}
