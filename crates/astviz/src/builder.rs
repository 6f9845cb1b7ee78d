//! Reconstruction of a labeled parent/child graph from the intermediate
//! record form.

use log::trace;

use astviz_core::{
    graph::{AstGraph, NodeId},
    label::sanitize_label,
};
use astviz_parser::{Record, Value, ValueExt, value::TYPE_KEY};

/// Record keys whose values are appended to a node label, in this order.
pub const DETAIL_KEYS: [&str; 7] = ["module", "n", "s", "id", "name", "attr", "arg"];

/// Where the next child node hangs from.
#[derive(Debug, Clone, Copy)]
enum Parent<'a> {
    /// The root context; its node is created on first use.
    Root(&'a str),
    Node(NodeId),
}

impl Parent<'_> {
    fn resolve(self, graph: &mut AstGraph) -> NodeId {
        match self {
            Self::Root(label) => graph.add_root(label),
            Self::Node(id) => id,
        }
    }
}

/// Adds the nodes and edges described by `record` to `graph`.
///
/// The value of the first top-level entry names the root context. It does
/// not become an enriched node itself; the root node carrying that label is
/// created the first time a child hangs from it, so an otherwise empty
/// record leaves `graph` untouched.
///
/// Each [`TYPE_KEY`] entry below the root context adds one node labeled with
/// the type tag enriched by the record's [`DETAIL_KEYS`], connected to the
/// current parent. That node is the parent for the rest of its record.
/// Nested records and sequences keep the current parent; primitives add
/// nothing.
pub fn build_graph(record: &Value, graph: &mut AstGraph) {
    let Some(record) = record.as_object() else {
        return;
    };

    let mut entries = record.iter();
    let Some((_, root)) = entries.next() else {
        return;
    };

    let root_label = sanitize_label(Some(&root.label_text()));
    walk_entries(record, entries, Parent::Root(&root_label), graph);

    trace!(nodes = graph.node_count(), edges = graph.edge_count(); "Built syntax graph");
}

fn walk_entries<'a, 'r>(
    record: &'r Record,
    entries: impl Iterator<Item = (&'r String, &'r Value)>,
    mut parent: Parent<'a>,
    graph: &mut AstGraph,
) {
    for (key, value) in entries {
        if key == TYPE_KEY {
            let label = sanitize_label(Some(&enrich(value, record)));
            let from = parent.resolve(graph);
            parent = Parent::Node(graph.add_child(from, label));
            continue;
        }
        walk_value(value, parent, graph);
    }
}

fn walk_value(value: &Value, parent: Parent<'_>, graph: &mut AstGraph) {
    match value {
        Value::Object(record) => walk_entries(record, record.iter(), parent, graph),
        Value::Array(items) => {
            for item in items {
                walk_value(item, parent, graph);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// Appends `\n<key>: <value>` for every detail key present in `record`.
fn enrich(type_tag: &Value, record: &Record) -> String {
    let mut label = type_tag.label_text();
    for key in DETAIL_KEYS {
        if let Some(value) = record.get(key) {
            label.push_str(&format!("\n{key}: {}", value.label_text()));
        }
    }
    label
}
