//! Unit tests for the synchronous ranking engine.

use proptest::{prop_assert, proptest};
use rstest::{fixture, rstest};

use super::*;
use crate::{
    Page, SimulationBuilder,
    rank::FactorRow,
    topology::{TopologyParams, randomize_links},
};

const EPSILON: f64 = 1e-9;

fn page(url: &str) -> Page {
    Page::with_default_rank(url).expect("test urls are non-empty")
}

fn graph_with(urls: &[&str], edges: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::new();
    for url in urls {
        assert!(graph.add_page(page(url)));
    }
    for (from, to) in edges {
        assert!(graph.add_directed_weighted_edge(from, to, 1.0));
    }
    graph
}

fn simulation(generations: i64, focus: Option<&str>) -> Simulation {
    SimulationBuilder::new()
        .with_generations(generations)
        .with_optional_focus(focus.map(str::to_owned))
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("sequential is always available")
}

fn rank(graph: &Graph, url: &str) -> f64 {
    graph.get_page(url).map(Page::rank).expect("page exists")
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

#[fixture]
fn triangle() -> Graph {
    graph_with(
        &["A/x", "A/y", "B/z"],
        &[("A/x", "A/y"), ("A/x", "B/z"), ("A/y", "A/x")],
    )
}

/// `b/1` is linked from `a/1` (out-degree 1) and `a/2` (out-degree 3).
#[fixture]
fn fan_in() -> Graph {
    graph_with(
        &["a/1", "a/2", "b/1", "c/1"],
        &[
            ("a/1", "b/1"),
            ("a/2", "b/1"),
            ("a/2", "a/1"),
            ("a/2", "c/1"),
            ("b/1", "a/2"),
            ("c/1", "a/2"),
        ],
    )
}

#[rstest]
fn single_generation_applies_sibling_factor(mut triangle: Graph) {
    assert!(triangle.set_sibling_factor(0.5));
    let report = simulation(1, None).run(&mut triangle);

    assert!(!report.was_skipped());
    assert_eq!(report.generations_run(), 1);
    assert_close(rank(&triangle, "A/y"), 0.3625);
    assert_close(rank(&triangle, "B/z"), 0.575);
    assert_close(rank(&triangle, "A/x"), 0.575);
    assert_eq!(report.rank_of("A/y"), Some(rank(&triangle, "A/y")));
}

#[rstest]
fn generations_are_committed_as_a_batch(mut fan_in: Graph) {
    simulation(2, None).run(&mut fan_in);
    // after one generation: a/1 = c/1 = 0.15 + 0.85 / 3, a/2 = 1.85
    let a1_after_first = 0.15 + 0.85 / 3.0;
    let a2_share: f64 = 1.85 / 3.0;
    assert_close(rank(&fan_in, "a/1"), 0.15 + 0.85 * a2_share);
    assert_close(
        rank(&fan_in, "b/1"),
        0.15 + 0.85 * (a1_after_first + a2_share),
    );
}

#[rstest]
fn spam_sources_contribute_nothing(mut triangle: Graph) {
    assert!(triangle.set_lower_bound(1.5));
    simulation(1, None).run(&mut triangle);
    for url in ["A/x", "A/y", "B/z"] {
        assert_close(rank(&triangle, url), 1.0 - DAMPING);
    }
}

#[rstest]
fn lower_bound_at_rank_is_not_spam(mut triangle: Graph) {
    assert!(triangle.set_lower_bound(1.0));
    simulation(1, None).run(&mut triangle);
    assert_close(rank(&triangle, "B/z"), 0.575);
}

#[rstest]
fn pages_without_in_links_settle_at_the_floor() {
    let mut graph = graph_with(&["p/1", "q/1"], &[("p/1", "q/1")]);
    simulation(3, None).run(&mut graph);
    assert_close(rank(&graph, "p/1"), 1.0 - DAMPING);
}

#[rstest]
fn every_run_resets_ranks_first(mut fan_in: Graph) {
    simulation(4, None).run(&mut fan_in);
    let report = simulation(0, None).run(&mut fan_in);
    assert_eq!(report.generations_run(), 0);
    assert!(!report.was_skipped());
    for page in fan_in.pages() {
        assert_eq!(page.rank(), INITIAL_RANK);
    }
}

#[rstest]
fn negative_generations_leave_the_graph_untouched(mut fan_in: Graph) {
    simulation(1, None).run(&mut fan_in);
    let before = fan_in.ranks();
    let report = simulation(-1, Some("b/1")).run(&mut fan_in);
    assert!(report.was_skipped());
    assert!(report.factors().is_none());
    assert_eq!(fan_in.ranks(), before);
}

#[rstest]
fn empty_graph_is_a_noop() {
    let mut graph = Graph::new();
    let mut lines: Vec<String> = Vec::new();
    let report =
        simulation(3, Some("a/1")).run_traced(&mut graph, TraceSinks::none().with_focus(&mut lines));
    assert!(report.was_skipped());
    assert!(report.ranks().is_empty());
    assert!(lines.is_empty());
}

#[rstest]
fn focus_trace_renders_every_generation(mut fan_in: Graph) {
    assert!(fan_in.set_lower_bound(0.5));
    let mut lines: Vec<String> = Vec::new();
    simulation(2, Some("b/1")).run_traced(&mut fan_in, TraceSinks::none().with_focus(&mut lines));
    assert_eq!(
        lines,
        [
            "++++++++++++++++++++  Focused webPage is b/1 ++++++++++++++++++++ ",
            "Initial Page Rank : 1.0",
            "I : 0 --> (1 - 0.85) + 0.85*( (1.00 *(1.00 / 1)) + (1.00 *(1.00 / 3)) ) = 1.28",
            "I : 1 --> (1 - 0.85) + 0.85*( 0 + (1.00 *(1.85 / 3)) ) = 0.67",
        ]
    );
}

#[rstest]
fn factors_trace_skips_the_final_generation(mut fan_in: Graph) {
    assert!(fan_in.set_lower_bound(0.5));
    let mut lines: Vec<String> = Vec::new();
    let report = simulation(2, Some("b/1"))
        .run_traced(&mut fan_in, TraceSinks::none().with_factors(&mut lines));
    assert_eq!(
        lines,
        [
            "",
            "-------------------------- Page Ranks calculations of the factors that affect web page with URL : b/1 --------------------------",
            "",
            "a/1 : 0/ 1.0     1/ 0.43    ",
            "a/2 : 0/ 1.0     0/ 1.85    ",
            "<< Note >>  ( isSpam/ pageRank of each iteration )",
        ]
    );

    let factors = report.factors().expect("focus is present");
    assert_eq!(factors.focus(), "b/1");
    let rows: Vec<&str> = factors.rows().iter().map(FactorRow::url).collect();
    assert_eq!(rows, ["a/1", "a/2"]);
    assert!(factors.rows().iter().all(|row| row.samples().len() == 2));
    let first = factors.rows()[0].samples();
    assert!(!first[0].is_spam);
    assert!(first[1].is_spam);
}

#[rstest]
fn missing_focus_disables_traces_but_still_runs(mut triangle: Graph) {
    let mut focus_lines: Vec<String> = Vec::new();
    let mut factor_lines: Vec<String> = Vec::new();
    let report = simulation(1, Some("nowhere/0")).run_traced(
        &mut triangle,
        TraceSinks::none()
            .with_focus(&mut focus_lines)
            .with_factors(&mut factor_lines),
    );
    assert!(focus_lines.is_empty());
    assert!(factor_lines.is_empty());
    assert!(report.factors().is_none());
    assert_close(rank(&triangle, "A/y"), 0.575);
}

#[rstest]
fn focus_without_contributors_renders_an_empty_table() {
    let mut graph = graph_with(&["p/1", "q/1"], &[("p/1", "q/1")]);
    let mut lines: Vec<String> = Vec::new();
    simulation(3, Some("p/1")).run_traced(&mut graph, TraceSinks::none().with_factors(&mut lines));
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines.last().map(String::as_str),
        Some("<< Note >>  ( isSpam/ pageRank of each iteration )")
    );
}

#[rstest]
fn ranking_orders_pages_by_rank(mut fan_in: Graph) {
    let report = simulation(5, None).run(&mut fan_in);
    let ranking = report.ranking();
    assert_eq!(ranking.len(), 4);
    assert!(ranking.windows(2).all(|pair| pair[0].1 >= pair[1].1));
}

#[cfg(feature = "parallel")]
#[rstest]
fn parallel_and_sequential_runs_agree() {
    let mut sequential = Graph::new();
    for index in 0..Simulation::PARALLEL_THRESHOLD + 10 {
        assert!(sequential.add_page(page(&format!("site{}/{index}", index % 7))));
    }
    randomize_links(&mut sequential, &TopologyParams::default().with_rng_seed(11))
        .expect("graph has enough pages");
    assert!(sequential.set_lower_bound(0.4));
    assert!(sequential.set_sibling_factor(0.6));
    let mut parallel = sequential.clone();

    let run = |graph: &mut Graph, strategy| {
        SimulationBuilder::new()
            .with_generations(6)
            .with_execution_strategy(strategy)
            .build()
            .expect("strategy is available")
            .run(graph)
    };
    let left = run(&mut sequential, ExecutionStrategy::Sequential);
    let right = run(&mut parallel, ExecutionStrategy::Parallel);
    assert_eq!(left.ranks(), right.ranks());
}

proptest! {
    #[test]
    fn ranks_never_fall_below_one_minus_damping(
        pages in 2_usize..40,
        seed in 0_u64..1_000,
        generations in 0_i64..8,
        lower_bound in 0.0_f64..2.0,
    ) {
        let mut graph = Graph::new();
        for index in 0..pages {
            graph.add_page(page(&format!("d{}/{index}", index % 3)));
        }
        randomize_links(&mut graph, &TopologyParams::default().with_rng_seed(seed))
            .expect("graph has enough pages");
        prop_assert!(graph.set_lower_bound(lower_bound));
        simulation(generations, None).run(&mut graph);
        for page in graph.pages() {
            prop_assert!(page.rank() >= 1.0 - DAMPING - EPSILON);
        }
    }
}
