//! The ranking engine and its trace output.
//!
//! [`Simulation`] drives the generations. The focused-page breakdown and the
//! contributor table are rendered line by line into [`LineSink`]s.

mod engine;
mod sink;
mod trace;

pub use self::{
    engine::{Simulation, SimulationReport},
    sink::{IoSink, LineSink, TraceSinks},
    trace::{Contribution, FactorRow, FactorSample, FactorsTrace, render_generation},
};

/// Damping factor applied to the summed contributions of a page.
pub const DAMPING: f64 = 0.85;
