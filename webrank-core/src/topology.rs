//! Random link topology generation.
//!
//! Every page receives a uniformly drawn number of out-links towards
//! distinct pages other than itself, each weighted `1 / k` where `k` is the
//! number drawn for that page.

use rand::{Rng, SeedableRng, rngs::SmallRng, seq::index};
use tracing::{debug, instrument};

use crate::{error::TopologyError, graph::Graph};

/// Default lower bound on the number of out-links drawn per page.
pub const MIN_OUT_LINKS: usize = 1;

/// Default upper bound on the number of out-links drawn per page.
pub const MAX_OUT_LINKS: usize = 30;

/// Bounds and seeding for [`randomize_links`].
///
/// # Examples
/// ```
/// use webrank_core::topology::TopologyParams;
///
/// let params = TopologyParams::new(2, 5).expect("bounds are ordered").with_rng_seed(7);
/// assert_eq!(params.min_out(), 2);
/// assert_eq!(params.max_out(), 5);
/// assert_eq!(params.rng_seed(), Some(7));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyParams {
    min_out: usize,
    max_out: usize,
    rng_seed: Option<u64>,
}

impl TopologyParams {
    /// Creates parameters drawing between `min_out` and `max_out` links per
    /// page, inclusive.
    ///
    /// # Errors
    /// Returns [`TopologyError::InvalidParameters`] when `min_out` is zero or
    /// exceeds `max_out`.
    pub fn new(min_out: usize, max_out: usize) -> Result<Self, TopologyError> {
        if min_out == 0 {
            return Err(TopologyError::InvalidParameters {
                reason: "min_out must be greater than zero".into(),
            });
        }
        if min_out > max_out {
            return Err(TopologyError::InvalidParameters {
                reason: format!("min_out ({min_out}) must be <= max_out ({max_out})"),
            });
        }
        Ok(Self {
            min_out,
            max_out,
            rng_seed: None,
        })
    }

    /// Seeds the generator so the topology is reproducible.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Returns the lower out-link bound.
    #[must_use]
    pub fn min_out(&self) -> usize {
        self.min_out
    }

    /// Returns the upper out-link bound.
    #[must_use]
    pub fn max_out(&self) -> usize {
        self.max_out
    }

    /// Returns the seed, if one was set.
    #[must_use]
    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    fn rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self {
            min_out: MIN_OUT_LINKS,
            max_out: MAX_OUT_LINKS,
            rng_seed: None,
        }
    }
}

/// Adds random out-links to every page of `graph`, returning the number of
/// edges created.
///
/// The out-link count of each page is capped at `pages - 1`. Running this
/// again on a graph that already has links adds to them; a drawn target that
/// is already linked is skipped.
///
/// # Errors
/// Returns [`TopologyError::EmptyGraph`] for an empty graph and
/// [`TopologyError::TooFewPages`] when the graph holds a single page.
///
/// # Examples
/// ```
/// use webrank_core::{Graph, Page, topology::{TopologyParams, randomize_links}};
///
/// let mut graph = Graph::new();
/// for url in ["a.org/1", "a.org/2", "b.org/1"] {
///     graph.add_page(Page::with_default_rank(url).expect("valid url"));
/// }
/// let added = randomize_links(&mut graph, &TopologyParams::default().with_rng_seed(3))
///     .expect("graph has enough pages");
/// assert_eq!(added, graph.edge_count());
/// assert!(graph.pages().all(|page| {
///     graph.out_links(page.url()).is_some_and(|links| !links.is_empty())
/// }));
/// ```
pub fn randomize_links(graph: &mut Graph, params: &TopologyParams) -> Result<usize, TopologyError> {
    let mut rng = params.rng();
    randomize_links_with_rng(graph, params, &mut rng)
}

/// Variant of [`randomize_links`] drawing from a caller-supplied generator.
///
/// # Errors
/// See [`randomize_links`].
#[instrument(
    name = "core.randomize_links",
    err,
    skip(graph, params, rng),
    fields(pages = graph.len(), min_out = params.min_out, max_out = params.max_out),
)]
pub fn randomize_links_with_rng<R: Rng + ?Sized>(
    graph: &mut Graph,
    params: &TopologyParams,
    rng: &mut R,
) -> Result<usize, TopologyError> {
    let pages = graph.len();
    match pages {
        0 => return Err(TopologyError::EmptyGraph),
        1 => return Err(TopologyError::TooFewPages { pages }),
        _ => {}
    }
    let max_out = params.max_out.min(pages - 1);
    let min_out = params.min_out.min(max_out);

    let mut added = 0;
    for source in 0..pages {
        let count = rng.gen_range(min_out..=max_out);
        #[expect(clippy::cast_precision_loss, reason = "count is at most pages - 1")]
        let weight = 1.0 / count as f64;
        // draw from every index except `source` by shifting the upper half
        for drawn in index::sample(rng, pages - 1, count) {
            let target = if drawn >= source { drawn + 1 } else { drawn };
            if graph.insert_edge(source, target, weight) {
                added += 1;
            }
        }
    }
    debug!(added, edges = graph.edge_count(), "random links generated");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use proptest::{prop_assert, prop_assert_eq, proptest};
    use rstest::rstest;

    use super::*;
    use crate::Page;

    fn graph_of(pages: usize) -> Graph {
        let mut graph = Graph::new();
        for index in 0..pages {
            assert!(graph.add_page(
                Page::with_default_rank(format!("site{}/{index}", index % 4))
                    .expect("url is non-empty")
            ));
        }
        graph
    }

    #[rstest]
    #[case::zero_min(0, 3)]
    #[case::inverted(5, 2)]
    fn invalid_bounds_are_rejected(#[case] min_out: usize, #[case] max_out: usize) {
        let err = TopologyParams::new(min_out, max_out).expect_err("bounds are invalid");
        assert!(matches!(err, TopologyError::InvalidParameters { .. }));
    }

    #[rstest]
    #[case::empty(0, TopologyError::EmptyGraph)]
    #[case::single(1, TopologyError::TooFewPages { pages: 1 })]
    fn small_graphs_are_rejected(#[case] pages: usize, #[case] expected: TopologyError) {
        let mut graph = graph_of(pages);
        let err = randomize_links(&mut graph, &TopologyParams::default())
            .expect_err("graph is too small");
        assert_eq!(err, expected);
        assert_eq!(graph.edge_count(), 0);
    }

    #[rstest]
    fn two_pages_link_to_each_other() {
        let mut graph = graph_of(2);
        let added = randomize_links(&mut graph, &TopologyParams::default().with_rng_seed(1))
            .expect("two pages suffice");
        assert_eq!(added, 2);
        assert_eq!(graph.edge_weight("site0/0", "site1/1"), Some(1.0));
        assert_eq!(graph.edge_weight("site1/1", "site0/0"), Some(1.0));
    }

    #[rstest]
    fn same_seed_gives_same_topology() {
        let params = TopologyParams::default().with_rng_seed(99);
        let mut left = graph_of(20);
        let mut right = graph_of(20);
        randomize_links(&mut left, &params).expect("enough pages");
        randomize_links(&mut right, &params).expect("enough pages");
        for page in left.pages() {
            assert_eq!(left.out_links(page.url()), right.out_links(page.url()));
        }
    }

    #[rstest]
    fn reinvocation_only_adds_links() {
        let mut graph = graph_of(3);
        let params = TopologyParams::new(2, 2).expect("bounds are ordered").with_rng_seed(5);
        assert_eq!(randomize_links(&mut graph, &params).expect("enough pages"), 6);
        assert_eq!(randomize_links(&mut graph, &params).expect("enough pages"), 0);
        assert_eq!(graph.edge_count(), 6);
    }

    proptest! {
        #[test]
        fn generated_links_respect_bounds(pages in 2_usize..60, seed in 0_u64..10_000) {
            let mut graph = graph_of(pages);
            let params = TopologyParams::default().with_rng_seed(seed);
            let added = randomize_links(&mut graph, &params).expect("enough pages");
            prop_assert_eq!(added, graph.edge_count());

            for page in graph.pages() {
                let links = graph.out_links(page.url()).expect("page exists");
                let count = links.len();
                prop_assert!((MIN_OUT_LINKS..=MAX_OUT_LINKS.min(pages - 1)).contains(&count));
                let mut targets: Vec<usize> = links.iter().map(|link| link.target()).collect();
                targets.sort_unstable();
                targets.dedup();
                prop_assert_eq!(targets.len(), count);
                prop_assert!(graph.edge_weight(page.url(), page.url()).is_none());
                for link in links {
                    prop_assert!((link.weight() - 1.0 / count as f64).abs() < 1e-12);
                }
            }
        }
    }
}
