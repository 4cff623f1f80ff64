//! Page list ingestion from whitespace-delimited text.

use std::io::BufRead;

use tracing::{debug, instrument};

use crate::{error::IngestError, graph::Graph, page::Page};

/// Reads URLs from `reader` and adds each as a page with the initial rank.
///
/// URLs are separated by any whitespace, including newlines. URLs already in
/// the graph are skipped. Returns the number of pages added.
///
/// # Errors
/// Returns [`IngestError::Io`] when reading fails and
/// [`IngestError::EmptyInput`] when the text holds no URL at all.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use webrank_core::{Graph, ingest::pages_from_reader};
///
/// let mut graph = Graph::new();
/// let added = pages_from_reader(&mut graph, Cursor::new("a.org/1 b.org/2\na.org/1\n"))
///     .expect("input is readable");
/// assert_eq!(added, 2);
/// assert_eq!(graph.len(), 2);
/// ```
#[instrument(name = "core.ingest", err, skip(graph, reader), fields(existing = graph.len()))]
pub fn pages_from_reader<R: BufRead>(graph: &mut Graph, reader: R) -> Result<usize, IngestError> {
    let mut tokens = 0_usize;
    let mut added = 0_usize;
    for line in reader.lines() {
        let line = line?;
        for url in line.split_whitespace() {
            tokens += 1;
            let Ok(page) = Page::with_default_rank(url) else {
                continue;
            };
            if graph.add_page(page) {
                added += 1;
            }
        }
    }
    if tokens == 0 {
        return Err(IngestError::EmptyInput);
    }
    debug!(tokens, added, "page list ingested");
    Ok(added)
}
