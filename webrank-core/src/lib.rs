//! Webrank core library: a PageRank simulator with spam exclusion and
//! same-domain link weighting.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod error;
mod graph;
pub mod ingest;
mod page;
mod rank;
pub mod snapshot;
pub mod topology;

pub use crate::{
    builder::{DEFAULT_GENERATIONS, ExecutionStrategy, SimulationBuilder},
    error::{
        IngestError, IngestErrorCode, PageError, PageErrorCode, RankSign, SimulationError,
        SimulationErrorCode, SnapshotError, SnapshotErrorCode, TopologyError, TopologyErrorCode,
    },
    graph::{DEFAULT_LOWER_BOUND, DEFAULT_SIBLING_FACTOR, Graph, OutLink, RankConfig},
    page::{INITIAL_RANK, Page},
    rank::{
        Contribution, DAMPING, FactorRow, FactorSample, FactorsTrace, IoSink, LineSink,
        Simulation, SimulationReport, TraceSinks, render_generation,
    },
};
