//! End-to-end tests for ingestion, topology, persistence and ranking.
#![expect(clippy::expect_used, reason = "tests rely on contextual panics")]

mod common;

use std::io::Cursor;

use common::{RecordingLayer, graph_with};
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use webrank_core::{
    ExecutionStrategy, Graph, SimulationBuilder, TraceSinks, ingest::pages_from_reader, snapshot,
    topology::{TopologyParams, randomize_links},
};

fn built_graph() -> Graph {
    let mut graph = Graph::new();
    let text = "alpha.org/index alpha.org/about beta.net/home\nbeta.net/blog gamma.io/ alpha.org/index\n";
    let added = pages_from_reader(&mut graph, Cursor::new(text)).expect("text is readable");
    assert_eq!(added, 5);
    randomize_links(&mut graph, &TopologyParams::default().with_rng_seed(2024))
        .expect("graph has enough pages");
    graph
}

#[rstest]
fn persisted_graph_ranks_like_its_source() {
    let mut source = built_graph();
    assert!(source.set_lower_bound(0.3));
    assert!(source.set_sibling_factor(0.8));

    let mut bytes = Vec::new();
    snapshot::save(&source, &mut bytes).expect("save succeeds");
    let mut restored = snapshot::load(bytes.as_slice()).expect("load succeeds");

    let simulation = SimulationBuilder::new()
        .with_generations(10)
        .with_focus("beta.net/home")
        .build()
        .expect("default strategy is available");

    let mut left_focus: Vec<String> = Vec::new();
    let mut right_focus: Vec<String> = Vec::new();
    let left = simulation.run_traced(&mut source, TraceSinks::none().with_focus(&mut left_focus));
    let right =
        simulation.run_traced(&mut restored, TraceSinks::none().with_focus(&mut right_focus));

    assert_eq!(left.ranks(), right.ranks());
    assert_eq!(left.factors(), right.factors());
    assert_eq!(left_focus, right_focus);
    assert_eq!(left_focus.len(), 12);
}

#[rstest]
fn scores_stay_above_the_floor_after_many_generations() {
    let mut graph = built_graph();
    let report = SimulationBuilder::new()
        .build()
        .expect("default strategy is available")
        .run(&mut graph);
    assert_eq!(report.generations_run(), 15);
    assert!(report.ranks().iter().all(|(_, rank)| *rank >= 0.15 - 1e-12));
}

#[rstest]
fn simulation_span_carries_run_parameters() {
    let mut graph = graph_with(&["a/1", "b/1"], &[("a/1", "b/1"), ("b/1", "a/1")]);
    let simulation = SimulationBuilder::new()
        .with_generations(3)
        .with_focus("a/1")
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("sequential is always available");

    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    tracing::subscriber::with_default(subscriber, || simulation.run(&mut graph));

    let span = layer.span("core.simulate");
    assert_eq!(span.fields.get("pages"), Some(&"2".to_owned()));
    assert_eq!(span.fields.get("edges"), Some(&"2".to_owned()));
    assert_eq!(span.fields.get("generations"), Some(&"3".to_owned()));
    assert_eq!(span.fields.get("focus"), Some(&"a/1".to_owned()));
    assert_eq!(span.fields.get("strategy"), Some(&"Sequential".to_owned()));
    assert!(layer.saw_message(Level::INFO, "simulation completed"));
}

#[rstest]
fn skipped_runs_are_reported_as_warnings() {
    let mut graph = Graph::new();
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let report = tracing::subscriber::with_default(subscriber, || {
        SimulationBuilder::new()
            .build()
            .expect("default strategy is available")
            .run(&mut graph)
    });
    assert!(report.was_skipped());
    assert!(layer.saw_message(Level::WARN, "nothing to simulate, graph left untouched"));
}

#[rstest]
fn topology_and_snapshot_spans_are_recorded() {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    tracing::subscriber::with_default(subscriber, || {
        let graph = built_graph();
        let mut bytes = Vec::new();
        snapshot::save(&graph, &mut bytes).expect("save succeeds");
        snapshot::load(bytes.as_slice()).expect("load succeeds");
    });

    assert_eq!(
        layer.span("core.ingest").fields.get("existing"),
        Some(&"0".to_owned())
    );
    assert_eq!(
        layer.span("core.randomize_links").fields.get("pages"),
        Some(&"5".to_owned())
    );
    assert_eq!(
        layer.span("core.snapshot.save").fields.get("pages"),
        Some(&"5".to_owned())
    );
    layer.span("core.snapshot.load");
}
