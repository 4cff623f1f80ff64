//! Vertices and their weighted out-links.

use crate::page::Page;

/// Index of a vertex inside its [`crate::Graph`], in insertion order.
pub(crate) type VertexIndex = usize;

/// A weighted directed reference to another vertex of the same graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutLink {
    target: VertexIndex,
    weight: f64,
}

impl OutLink {
    pub(crate) fn new(target: VertexIndex, weight: f64) -> Self {
        Self { target, weight }
    }

    /// Returns the insertion index of the target vertex.
    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Returns the edge weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub(crate) fn retarget(&mut self, target: VertexIndex) {
        self.target = target;
    }
}

/// A page together with the links it owns.
#[derive(Clone, Debug)]
pub(crate) struct Vertex {
    pub(crate) page: Page,
    pub(crate) out_links: Vec<OutLink>,
}

impl Vertex {
    pub(crate) fn new(page: Page) -> Self {
        Self {
            page,
            out_links: Vec::new(),
        }
    }

    pub(crate) fn out_degree(&self) -> usize {
        self.out_links.len()
    }

    pub(crate) fn links_to(&self, target: VertexIndex) -> bool {
        self.out_links.iter().any(|link| link.target == target)
    }

    pub(crate) fn link_to(&self, target: VertexIndex) -> Option<&OutLink> {
        self.out_links.iter().find(|link| link.target == target)
    }

    /// Removes the link to `target`, returning whether one existed.
    pub(crate) fn unlink(&mut self, target: VertexIndex) -> bool {
        let before = self.out_links.len();
        self.out_links.retain(|link| link.target != target);
        self.out_links.len() != before
    }
}
