//! Support library for the `webrank` binary.
//!
//! Exposes the command pipeline and the interactive shell so integration
//! tests can drive them without spawning a subprocess.

pub mod cli;
pub mod logging;
