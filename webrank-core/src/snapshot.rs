//! Binary persistence of a whole [`Graph`].
//!
//! A snapshot is the magic bytes `WRNK`, a format version and a `bincode`
//! body holding the pages in insertion order, each page's out-links and the
//! ranking configuration. Loading rebuilds the graph through its regular
//! mutation API and rejects data that would violate a graph invariant.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::SnapshotError,
    graph::{Graph, RankConfig},
    page::Page,
};

const MAGIC: [u8; 4] = *b"WRNK";

/// Version of the snapshot layout written by this build.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotBody {
    pages: Vec<(String, f64)>,
    links: Vec<Vec<(usize, f64)>>,
    lower_bound: f64,
    sibling_factor: f64,
}

impl SnapshotBody {
    fn capture(graph: &Graph) -> Self {
        Self {
            pages: graph
                .pages()
                .map(|page| (page.url().to_owned(), page.rank()))
                .collect(),
            links: graph
                .vertices()
                .iter()
                .map(|vertex| {
                    vertex
                        .out_links
                        .iter()
                        .map(|link| (link.target(), link.weight()))
                        .collect()
                })
                .collect(),
            lower_bound: graph.lower_bound(),
            sibling_factor: graph.sibling_factor(),
        }
    }

    fn rebuild(self) -> Result<Graph, SnapshotError> {
        let config = RankConfig::new(self.lower_bound, self.sibling_factor).ok_or_else(|| {
            corrupt(format!(
                "configuration out of range (lower bound {}, sibling factor {})",
                self.lower_bound, self.sibling_factor
            ))
        })?;
        if self.links.len() != self.pages.len() {
            return Err(corrupt(format!(
                "{} link lists for {} pages",
                self.links.len(),
                self.pages.len()
            )));
        }

        let mut graph = Graph::new();
        for (index, (url, rank)) in self.pages.into_iter().enumerate() {
            let page = Page::new(url, rank)
                .map_err(|err| corrupt(format!("page {index} is invalid: {err}")))?;
            if !graph.add_page(page) {
                return Err(corrupt(format!("page {index} repeats an earlier url")));
            }
        }
        let pages = graph.len();
        for (source, links) in self.links.into_iter().enumerate() {
            for (target, weight) in links {
                if target >= pages {
                    return Err(corrupt(format!(
                        "page {source} links to missing page {target}"
                    )));
                }
                if !(weight >= 0.0) {
                    return Err(corrupt(format!(
                        "link {source} -> {target} has invalid weight {weight}"
                    )));
                }
                if !graph.insert_edge(source, target, weight) {
                    return Err(corrupt(format!(
                        "link {source} -> {target} is a self-loop or a duplicate"
                    )));
                }
            }
        }
        graph.set_config(config);
        Ok(graph)
    }
}

fn corrupt(reason: String) -> SnapshotError {
    SnapshotError::Corrupt { reason }
}

/// Writes `graph` to `writer`.
///
/// # Errors
/// Returns [`SnapshotError::Io`] when writing fails and
/// [`SnapshotError::Encode`] when encoding fails.
///
/// # Examples
/// ```
/// use webrank_core::{Graph, Page, snapshot};
///
/// let mut graph = Graph::new();
/// graph.add_page(Page::with_default_rank("a.org/1").expect("valid url"));
/// graph.add_page(Page::with_default_rank("b.org/1").expect("valid url"));
/// graph.add_directed_weighted_edge("a.org/1", "b.org/1", 1.0);
/// graph.set_lower_bound(0.3);
///
/// let mut bytes = Vec::new();
/// snapshot::save(&graph, &mut bytes).expect("writing to memory succeeds");
/// let restored = snapshot::load(bytes.as_slice()).expect("snapshot is valid");
/// assert_eq!(restored.edge_weight("a.org/1", "b.org/1"), Some(1.0));
/// assert_eq!(restored.lower_bound(), 0.3);
/// ```
#[instrument(
    name = "core.snapshot.save",
    err,
    skip(graph, writer),
    fields(pages = graph.len(), edges = graph.edge_count()),
)]
pub fn save<W: Write>(graph: &Graph, mut writer: W) -> Result<(), SnapshotError> {
    writer.write_all(&MAGIC)?;
    bincode::serialize_into(&mut writer, &FORMAT_VERSION)
        .map_err(|source| SnapshotError::Encode { source })?;
    bincode::serialize_into(&mut writer, &SnapshotBody::capture(graph))
        .map_err(|source| SnapshotError::Encode { source })?;
    writer.flush()?;
    Ok(())
}

/// Reads a graph previously written by [`save`].
///
/// # Errors
/// Returns [`SnapshotError::BadMagic`] when the stream is not a snapshot,
/// [`SnapshotError::UnsupportedVersion`] for another format version,
/// [`SnapshotError::Decode`] when the body cannot be decoded,
/// [`SnapshotError::Corrupt`] when it violates a graph invariant and
/// [`SnapshotError::Io`] when reading fails.
#[instrument(name = "core.snapshot.load", err, skip(reader))]
pub fn load<R: Read>(mut reader: R) -> Result<Graph, SnapshotError> {
    let mut magic = [0_u8; MAGIC.len()];
    reader.read_exact(&mut magic).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => SnapshotError::BadMagic,
        _ => SnapshotError::Io(err),
    })?;
    if magic != MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    let found: u32 = bincode::deserialize_from(&mut reader)
        .map_err(|source| SnapshotError::Decode { source })?;
    if found != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }
    let body: SnapshotBody = bincode::deserialize_from(&mut reader)
        .map_err(|source| SnapshotError::Decode { source })?;
    let graph = body.rebuild()?;
    debug!(
        pages = graph.len(),
        edges = graph.edge_count(),
        "snapshot loaded"
    );
    Ok(graph)
}
