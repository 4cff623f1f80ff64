//! Shared helpers for the webrank-core integration tests.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id},
};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};
use webrank_core::{Graph, Page};

/// Builds a graph from page URLs and unit-weight edges.
pub fn graph_with(urls: &[&str], edges: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::new();
    for url in urls {
        assert!(graph.add_page(Page::with_default_rank(*url).expect("test urls are non-empty")));
    }
    for (from, to) in edges {
        assert!(graph.add_directed_weighted_edge(from, to, 1.0));
    }
    graph
}

/// Captures closed spans and events for later assertions.
#[derive(Clone, Default)]
pub struct RecordingLayer {
    spans: Arc<Mutex<Vec<Recorded>>>,
    events: Arc<Mutex<Vec<(Level, Recorded)>>>,
}

/// A span or event name with its recorded fields.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub name: String,
    pub fields: HashMap<String, String>,
}

impl RecordingLayer {
    pub fn spans(&self) -> Vec<Recorded> {
        self.spans.lock().expect("lock poisoned").clone()
    }

    pub fn events(&self) -> Vec<(Level, Recorded)> {
        self.events.lock().expect("lock poisoned").clone()
    }

    /// Returns the first closed span called `name`.
    pub fn span(&self, name: &str) -> Recorded {
        self.spans()
            .into_iter()
            .find(|span| span.name == name)
            .unwrap_or_else(|| panic!("span {name} must be recorded"))
    }

    /// Returns whether an event at `level` carried `message`.
    pub fn saw_message(&self, level: Level, message: &str) -> bool {
        self.events().iter().any(|(event_level, event)| {
            *event_level == level && event.fields.get("message").is_some_and(|m| m == message)
        })
    }
}

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut data = Recorded {
                name: attrs.metadata().name().to_owned(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldRecorder(&mut data.fields));
            span.extensions_mut().insert(data);
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        if let Some(data) = span.extensions_mut().remove::<Recorded>() {
            self.spans.lock().expect("lock poisoned").push(data);
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldRecorder(&mut fields));
        self.events.lock().expect("lock poisoned").push((
            *event.metadata().level(),
            Recorded {
                name: event.metadata().name().to_owned(),
                fields,
            },
        ));
    }
}

struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldRecorder<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }
}
