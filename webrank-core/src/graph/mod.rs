//! The web-page graph: vertices keyed by URL, weighted out-links and the
//! ranking configuration.
//!
//! Vertices live in a `Vec` in insertion order and are addressed by index
//! internally. A URL lookup table and a reverse-adjacency index are kept in
//! step with every structural edit, so in-neighbour queries never scan the
//! whole edge set.

mod config;
mod vertex;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::page::{Page, domain_of};

pub use self::{
    config::{DEFAULT_LOWER_BOUND, DEFAULT_SIBLING_FACTOR, RankConfig},
    vertex::OutLink,
};
pub(crate) use self::vertex::{Vertex, VertexIndex};

/// A directed, weighted graph of web pages.
///
/// # Examples
/// ```
/// use webrank_core::{Graph, Page};
///
/// let mut graph = Graph::new();
/// assert!(graph.add_page(Page::with_default_rank("a.org/x").expect("valid url")));
/// assert!(graph.add_page(Page::with_default_rank("b.org/y").expect("valid url")));
/// assert!(!graph.add_page(Page::with_default_rank("a.org/x").expect("valid url")));
///
/// assert!(graph.add_directed_weighted_edge("a.org/x", "b.org/y", 1.0));
/// assert!(!graph.add_directed_weighted_edge("a.org/x", "a.org/x", 1.0));
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    lookup: HashMap<String, VertexIndex>,
    /// Sources linking to each vertex, sorted by insertion index.
    in_links: Vec<Vec<VertexIndex>>,
    edge_count: usize,
    config: RankConfig,
}

impl Graph {
    /// Creates an empty graph with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns whether the graph holds no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Removes every page and edge and restores the default configuration.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Iterates over the pages in insertion order.
    pub fn pages(&self) -> impl ExactSizeIterator<Item = &Page> + '_ {
        self.vertices.iter().map(|vertex| &vertex.page)
    }

    /// Adds a page with no outgoing links.
    ///
    /// Returns `false` when a page with the same URL is already present.
    pub fn add_page(&mut self, page: Page) -> bool {
        if self.lookup.contains_key(page.url()) {
            debug!(url = page.url(), "duplicate page ignored");
            return false;
        }
        let index = self.vertices.len();
        self.lookup.insert(page.url().to_owned(), index);
        self.vertices.push(Vertex::new(page));
        self.in_links.push(Vec::new());
        true
    }

    /// Adds a directed edge `from -> to` with the given weight.
    ///
    /// Returns `false` when either URL is unknown, the edge would be a
    /// self-loop, the weight is negative or NaN, or the edge already exists.
    pub fn add_directed_weighted_edge(&mut self, from: &str, to: &str, weight: f64) -> bool {
        if from == to || !(weight >= 0.0) {
            return false;
        }
        let (Some(source), Some(target)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        self.insert_edge(source, target, weight)
    }

    pub(crate) fn insert_edge(
        &mut self,
        source: VertexIndex,
        target: VertexIndex,
        weight: f64,
    ) -> bool {
        if source == target {
            return false;
        }
        let Some(vertex) = self.vertices.get_mut(source) else {
            return false;
        };
        if vertex.links_to(target) {
            return false;
        }
        let Some(sources) = self.in_links.get_mut(target) else {
            return false;
        };
        vertex.out_links.push(OutLink::new(target, weight));
        if let Err(position) = sources.binary_search(&source) {
            sources.insert(position, source);
        }
        self.edge_count += 1;
        true
    }

    /// Removes the directed edge `from -> to`, returning whether it existed.
    pub fn remove_directed_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(source), Some(target)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        let removed = self
            .vertices
            .get_mut(source)
            .is_some_and(|vertex| vertex.unlink(target));
        if removed {
            if let Some(sources) = self.in_links.get_mut(target) {
                sources.retain(|&candidate| candidate != source);
            }
            self.edge_count -= 1;
        }
        removed
    }

    /// Removes a page together with its outgoing links and every link
    /// pointing at it, returning the removed page.
    pub fn delete_page(&mut self, url: &str) -> Option<Page> {
        let removed_index = self.lookup.remove(url)?;
        let removed = self.vertices.remove(removed_index);
        self.in_links.remove(removed_index);

        for vertex in &mut self.vertices {
            vertex.unlink(removed_index);
            for link in &mut vertex.out_links {
                if link.target() > removed_index {
                    link.retarget(link.target() - 1);
                }
            }
        }
        for index in self.lookup.values_mut() {
            if *index > removed_index {
                *index -= 1;
            }
        }
        self.rebuild_in_links();
        debug!(url, edges = self.edge_count, "page deleted");
        Some(removed.page)
    }

    fn rebuild_in_links(&mut self) {
        let mut in_links = vec![Vec::new(); self.vertices.len()];
        let mut edge_count = 0;
        for (source, vertex) in self.vertices.iter().enumerate() {
            for link in &vertex.out_links {
                if let Some(sources) = in_links.get_mut(link.target()) {
                    sources.push(source);
                }
                edge_count += 1;
            }
        }
        self.in_links = in_links;
        self.edge_count = edge_count;
    }

    /// Returns the page with the given URL.
    #[must_use]
    pub fn get_page(&self, url: &str) -> Option<&Page> {
        self.vertex(url).map(|vertex| &vertex.page)
    }

    /// Returns the pages `url` links to, in link insertion order.
    #[must_use]
    pub fn get_outgoing_pages(&self, url: &str) -> Option<Vec<&Page>> {
        let vertex = self.vertex(url)?;
        Some(
            vertex
                .out_links
                .iter()
                .filter_map(|link| self.vertices.get(link.target()))
                .map(|target| &target.page)
                .collect(),
        )
    }

    /// Returns the pages linking to `url`, in page insertion order.
    #[must_use]
    pub fn in_linking_pages(&self, url: &str) -> Option<Vec<&Page>> {
        let index = self.index_of(url)?;
        Some(
            self.in_links_of(index)
                .iter()
                .filter_map(|&source| self.vertices.get(source))
                .map(|source| &source.page)
                .collect(),
        )
    }

    /// Returns the outgoing links of `url`.
    #[must_use]
    pub fn out_links(&self, url: &str) -> Option<&[OutLink]> {
        self.vertex(url).map(|vertex| vertex.out_links.as_slice())
    }

    /// Returns the weight of the edge `from -> to`, if present.
    #[must_use]
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        let target = self.index_of(to)?;
        self.vertex(from)?.link_to(target).map(OutLink::weight)
    }

    /// Returns the ranking configuration.
    #[must_use]
    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Replaces the ranking configuration wholesale.
    pub fn set_config(&mut self, config: RankConfig) {
        self.config = config;
    }

    /// Returns the spam threshold.
    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        self.config.lower_bound()
    }

    /// Sets the spam threshold; rejects negative values.
    pub fn set_lower_bound(&mut self, value: f64) -> bool {
        let accepted = self.config.set_lower_bound(value);
        if !accepted {
            warn!(value, "lower bound rejected");
        }
        accepted
    }

    /// Returns the sibling factor.
    #[must_use]
    pub fn sibling_factor(&self) -> f64 {
        self.config.sibling_factor()
    }

    /// Sets the sibling factor; accepts values in `(0, 1]`.
    pub fn set_sibling_factor(&mut self, value: f64) -> bool {
        let accepted = self.config.set_sibling_factor(value);
        if !accepted {
            warn!(value, "sibling factor rejected");
        }
        accepted
    }

    /// Returns whether two pages share a domain.
    #[must_use]
    pub fn sibling_of(&self, a: &Page, b: &Page) -> bool {
        a.is_sibling_of(b)
    }

    /// Returns the configured sibling factor for sibling pages and `1.0` otherwise.
    #[must_use]
    pub fn sibling_factor_between(&self, a: &Page, b: &Page) -> f64 {
        self.sibling_factor_for_urls(a.url(), b.url())
    }

    pub(crate) fn sibling_factor_for_urls(&self, a: &str, b: &str) -> f64 {
        if domain_of(a) == domain_of(b) {
            self.config.sibling_factor()
        } else {
            1.0
        }
    }

    pub(crate) fn index_of(&self, url: &str) -> Option<VertexIndex> {
        self.lookup.get(url).copied()
    }

    fn vertex(&self, url: &str) -> Option<&Vertex> {
        self.index_of(url).and_then(|index| self.vertices.get(index))
    }

    pub(crate) fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub(crate) fn vertex_at(&self, index: VertexIndex) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    pub(crate) fn in_links_of(&self, index: VertexIndex) -> &[VertexIndex] {
        self.in_links
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sets every rank to `rank`, which must be positive.
    pub(crate) fn reset_ranks(&mut self, rank: f64) {
        for vertex in &mut self.vertices {
            let accepted = vertex.page.set_rank(rank);
            debug_assert!(accepted, "reset rank must be positive");
        }
    }

    pub(crate) fn ranks(&self) -> Vec<f64> {
        self.pages().map(Page::rank).collect()
    }

    /// Commits a full generation of ranks, indexed like the vertices.
    pub(crate) fn commit_ranks(&mut self, ranks: &[f64]) {
        debug_assert_eq!(ranks.len(), self.vertices.len());
        for (vertex, &rank) in self.vertices.iter_mut().zip(ranks) {
            let accepted = vertex.page.set_rank(rank);
            debug_assert!(accepted, "computed ranks are always >= 1 - d");
        }
    }
}
