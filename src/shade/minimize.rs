//! Dead-code elimination over bundled classes.
//!
//! A bundled class entry is kept only if it is reachable from the
//! project's own entries through the reference graph: entry A references
//! class B when A's bytes contain B's internal name (slash form) or its
//! dot-form equivalent. Project entries and bundled non-class entries
//! (resources, service registrations) are always retained.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::shade::archive::Entry;

/// Drop bundled class entries unreachable from the project's own code.
///
/// Entry order is preserved for the survivors.
pub fn minimize(entries: Vec<Entry>) -> Vec<Entry> {
    // Candidates for elimination: bundled classes, indexed by internal name.
    let candidates: Vec<(usize, String, String)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_bundled() && e.is_class())
        .map(|(i, e)| {
            let internal = e.path.trim_end_matches(".class").to_string();
            let dotted = internal.replace('/', ".");
            (i, internal, dotted)
        })
        .collect();

    if candidates.is_empty() {
        return entries;
    }

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let root = graph.add_node(usize::MAX);
    let nodes: Vec<NodeIndex> = (0..entries.len()).map(|i| graph.add_node(i)).collect();
    let candidate_nodes: HashMap<usize, NodeIndex> =
        candidates.iter().map(|(i, _, _)| (*i, nodes[*i])).collect();

    // Roots: everything that is not itself a candidate for elimination.
    for (i, entry) in entries.iter().enumerate() {
        if !(entry.is_bundled() && entry.is_class()) {
            graph.add_edge(root, nodes[i], ());
        }
    }

    // Reference edges: scanning every entry against every candidate name.
    for (i, entry) in entries.iter().enumerate() {
        for (candidate, internal, dotted) in &candidates {
            if i == *candidate {
                continue;
            }
            if contains(&entry.data, internal.as_bytes())
                || contains(&entry.data, dotted.as_bytes())
            {
                graph.add_edge(nodes[i], candidate_nodes[candidate], ());
            }
        }
    }

    let mut reachable = vec![false; entries.len()];
    let mut dfs = Dfs::new(&graph, root);
    while let Some(node) = dfs.next(&graph) {
        let index = graph[node];
        if index != usize::MAX {
            reachable[index] = true;
        }
    }

    let before = entries.len();
    let retained: Vec<Entry> = entries
        .into_iter()
        .enumerate()
        .filter(|(i, _)| reachable[*i])
        .map(|(_, e)| e)
        .collect();

    tracing::debug!(
        "minimize: dropped {} of {} entries",
        before - retained.len(),
        before
    );

    retained
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}
