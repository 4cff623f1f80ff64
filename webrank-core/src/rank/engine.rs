//! Synchronous rank iteration over a [`Graph`].

use tracing::{debug, info, instrument, warn};

use super::{
    DAMPING,
    sink::TraceSinks,
    trace::{Contribution, FactorSample, FactorsTrace, FocusTracer},
};
use crate::{
    builder::ExecutionStrategy,
    graph::{Graph, VertexIndex},
    page::INITIAL_RANK,
};

/// A configured ranking run. Construct it with
/// [`SimulationBuilder`](crate::SimulationBuilder).
///
/// Every run starts by resetting all ranks to [`INITIAL_RANK`]. Each
/// generation then reads only the ranks committed by the previous one and
/// commits its own results as a batch:
///
/// ```text
/// rank'(v) = (1 - d) + d * sum(contribution(u, v) for u linking to v)
/// contribution(u, v) = 0                                  if rank(u) < lower_bound
///                    = S(v, u) * rank(u) / out_degree(u)  otherwise
/// ```
///
/// # Examples
/// ```
/// use webrank_core::{Graph, Page, SimulationBuilder};
///
/// let mut graph = Graph::new();
/// for url in ["a.org/1", "b.org/2"] {
///     graph.add_page(Page::with_default_rank(url).expect("valid url"));
/// }
/// graph.add_directed_weighted_edge("a.org/1", "b.org/2", 1.0);
///
/// let report = SimulationBuilder::new()
///     .with_generations(1)
///     .build()
///     .expect("default strategy is available")
///     .run(&mut graph);
/// assert_eq!(report.generations_run(), 1);
/// let rank = graph.get_page("b.org/2").map(Page::rank).expect("page exists");
/// assert!((rank - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    generations: i64,
    focus: Option<String>,
    execution_strategy: ExecutionStrategy,
}

impl Simulation {
    /// Page count from which [`ExecutionStrategy::Auto`] evaluates
    /// generations on the Rayon pool.
    pub const PARALLEL_THRESHOLD: usize = 512;

    pub(crate) fn new(
        generations: i64,
        focus: Option<String>,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            generations,
            focus,
            execution_strategy,
        }
    }

    /// Returns the configured number of generations.
    #[must_use]
    pub fn generations(&self) -> i64 {
        self.generations
    }

    /// Returns the focused URL, if any.
    #[must_use]
    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Returns the execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Runs the simulation without rendering any trace.
    pub fn run(&self, graph: &mut Graph) -> SimulationReport {
        self.run_traced(graph, TraceSinks::none())
    }

    /// Runs the simulation, rendering the focused-page trace and the
    /// contributor table into the supplied sinks.
    ///
    /// An empty graph or a negative generation count leaves the graph
    /// untouched. A focused URL that is not in the graph disables both
    /// traces; the ranks are still computed.
    #[instrument(
        name = "core.simulate",
        skip(self, graph, sinks),
        fields(
            pages = graph.len(),
            edges = graph.edge_count(),
            generations = self.generations,
            focus = self.focus.as_deref().unwrap_or_default(),
            strategy = ?self.execution_strategy,
        ),
    )]
    pub fn run_traced(&self, graph: &mut Graph, sinks: TraceSinks<'_>) -> SimulationReport {
        if graph.is_empty() || self.generations < 0 {
            warn!("nothing to simulate, graph left untouched");
            return SimulationReport::skipped(graph);
        }
        let generations = usize::try_from(self.generations).unwrap_or_default();
        let parallel = self.use_parallel(graph.len());

        graph.reset_ranks(INITIAL_RANK);

        let focus = self.focus.as_deref().and_then(|url| {
            let index = graph.index_of(url);
            if index.is_none() {
                warn!(url, "focused page not found, traces disabled");
            }
            index.map(|index| (url, index))
        });

        let TraceSinks {
            focus: focus_sink,
            factors: factors_sink,
        } = sinks;
        let mut tracer = match (focus, focus_sink) {
            (Some((url, index)), Some(sink)) => {
                let initial = graph
                    .vertex_at(index)
                    .map_or(INITIAL_RANK, |vertex| vertex.page.rank());
                Some(FocusTracer::start(sink, url, initial))
            }
            _ => None,
        };
        let mut factors = focus.map(|(url, index)| Factors::new(graph, url, index));

        for generation in 0..generations {
            let next = {
                let snapshot = Generation::capture(graph);
                if let (Some(tracer), Some((_, index))) = (tracer.as_mut(), focus) {
                    let contributions: Vec<Contribution> =
                        snapshot.contributions(index).collect();
                    tracer.record(generation, &contributions, snapshot.next_rank(index));
                }
                snapshot.next_ranks(parallel)
            };
            graph.commit_ranks(&next);
            debug!(generation, "generation committed");

            if generation + 1 < generations
                && let Some(factors) = factors.as_mut()
            {
                factors.sample(graph);
            }
        }

        let factors = factors.map(|factors| factors.trace);
        if let (Some(trace), Some(sink)) = (factors.as_ref(), factors_sink) {
            trace.render(sink);
        }
        info!(generations, parallel, "simulation completed");
        SimulationReport {
            skipped: false,
            generations_run: generations,
            ranks: rank_table(graph),
            factors,
        }
    }

    fn use_parallel(&self, pages: usize) -> bool {
        match self.execution_strategy {
            ExecutionStrategy::Sequential => false,
            ExecutionStrategy::Parallel => cfg!(feature = "parallel"),
            ExecutionStrategy::Auto => {
                cfg!(feature = "parallel") && pages >= Self::PARALLEL_THRESHOLD
            }
        }
    }
}

/// The ranks and spam flags a generation reads from.
struct Generation<'g> {
    graph: &'g Graph,
    ranks: Vec<f64>,
    spam: Vec<bool>,
}

impl<'g> Generation<'g> {
    fn capture(graph: &'g Graph) -> Self {
        let ranks = graph.ranks();
        let config = graph.config();
        let spam = ranks.iter().map(|&rank| config.is_spam(rank)).collect();
        Self { graph, ranks, spam }
    }

    /// Contributions to `target`, ordered by in-neighbour insertion index.
    fn contributions(&self, target: VertexIndex) -> impl Iterator<Item = Contribution> + '_ {
        let target_url = self
            .graph
            .vertex_at(target)
            .map_or("", |vertex| vertex.page.url());
        self.graph
            .in_links_of(target)
            .iter()
            .filter_map(move |&source| {
                let vertex = self.graph.vertex_at(source)?;
                let rank = self.ranks.get(source).copied()?;
                if self.spam.get(source).copied().unwrap_or_default() {
                    return Some(Contribution::Spam);
                }
                Some(Contribution::Share {
                    sibling_factor: self
                        .graph
                        .sibling_factor_for_urls(target_url, vertex.page.url()),
                    rank,
                    out_degree: vertex.out_degree(),
                })
            })
    }

    fn next_rank(&self, target: VertexIndex) -> f64 {
        let sum: f64 = self
            .contributions(target)
            .map(|contribution| contribution.value())
            .sum();
        sum * DAMPING + (1.0 - DAMPING)
    }

    #[cfg(feature = "parallel")]
    fn next_ranks(&self, parallel: bool) -> Vec<f64> {
        use rayon::prelude::*;

        if parallel {
            (0..self.ranks.len())
                .into_par_iter()
                .map(|target| self.next_rank(target))
                .collect()
        } else {
            self.next_ranks_sequential()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn next_ranks(&self, _parallel: bool) -> Vec<f64> {
        self.next_ranks_sequential()
    }

    fn next_ranks_sequential(&self) -> Vec<f64> {
        (0..self.ranks.len())
            .map(|target| self.next_rank(target))
            .collect()
    }
}

/// Tracks the in-neighbours of the focused page across generations.
struct Factors {
    contributors: Vec<VertexIndex>,
    trace: FactorsTrace,
}

impl Factors {
    fn new(graph: &Graph, url: &str, index: VertexIndex) -> Self {
        let contributors = graph.in_links_of(index).to_vec();
        let urls = contributors
            .iter()
            .filter_map(|&source| graph.vertex_at(source))
            .map(|vertex| vertex.page.url().to_owned());
        let mut factors = Self {
            trace: FactorsTrace::new(url, urls),
            contributors,
        };
        factors.sample(graph);
        factors
    }

    fn sample(&mut self, graph: &Graph) {
        let config = graph.config();
        let samples = self
            .contributors
            .iter()
            .filter_map(|&source| graph.vertex_at(source))
            .map(|vertex| {
                let rank = vertex.page.rank();
                FactorSample {
                    is_spam: config.is_spam(rank),
                    rank,
                }
            });
        self.trace.push_samples(samples);
    }
}

fn rank_table(graph: &Graph) -> Vec<(String, f64)> {
    graph
        .pages()
        .map(|page| (page.url().to_owned(), page.rank()))
        .collect()
}

/// The outcome of one [`Simulation`] run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationReport {
    skipped: bool,
    generations_run: usize,
    ranks: Vec<(String, f64)>,
    factors: Option<FactorsTrace>,
}

impl SimulationReport {
    fn skipped(graph: &Graph) -> Self {
        Self {
            skipped: true,
            generations_run: 0,
            ranks: rank_table(graph),
            factors: None,
        }
    }

    /// Returns whether the run left the graph untouched.
    #[must_use]
    pub fn was_skipped(&self) -> bool {
        self.skipped
    }

    /// Returns the number of committed generations.
    #[must_use]
    pub fn generations_run(&self) -> usize {
        self.generations_run
    }

    /// Returns the final ranks in page insertion order.
    #[must_use]
    pub fn ranks(&self) -> &[(String, f64)] {
        &self.ranks
    }

    /// Returns the final rank of `url`.
    #[must_use]
    pub fn rank_of(&self, url: &str) -> Option<f64> {
        self.ranks
            .iter()
            .find(|(candidate, _)| candidate == url)
            .map(|&(_, rank)| rank)
    }

    /// Returns the ranks sorted from highest to lowest; ties keep insertion
    /// order.
    #[must_use]
    pub fn ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .ranks
            .iter()
            .map(|(url, rank)| (url.as_str(), *rank))
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    /// Returns the contributor history of the focused page, when the focus
    /// was present in the graph.
    #[must_use]
    pub fn factors(&self) -> Option<&FactorsTrace> {
        self.factors.as_ref()
    }
}

#[cfg(test)]
mod tests;
