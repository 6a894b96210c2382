/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Visibility propagation: cluster, then node, then edge.
//!
//! Runs after every query/filter/mode/collapse mutation and leaves the
//! model in a consistent state: an edge is visible only when both of its
//! endpoints are. There is no externally observable intermediate state;
//! callers hold the model exclusively while this runs.

use std::collections::HashSet;

use crate::model::{AtlasModel, NodeKey};
use crate::search::FilterChip;

/// Inputs the propagator needs beyond the model itself.
pub struct VisibilityInput<'a> {
    /// Matched node keys from the query engine, canonical order.
    pub matched: &'a [NodeKey],

    pub filter: FilterChip,

    /// True when the raw query text was empty.
    pub query_is_empty: bool,

    /// True when a `repo:` prefix is active.
    pub repo_scoped: bool,

    /// True when collapse has settled and nodes are retracted into
    /// their clusters; node cards stay hidden whatever the chip says.
    pub nodes_retracted: bool,
}

/// Derive show/hide state for every cluster, node, and edge.
pub fn propagate(model: &mut AtlasModel, input: &VisibilityInput<'_>) {
    let matched: HashSet<NodeKey> = input.matched.iter().copied().collect();

    match input.filter {
        FilterChip::Repos => {
            // Repos view: no node cards at all. Clusters show when they
            // own a match, or all of them on a blank, unscoped query.
            let show_all_clusters = input.query_is_empty && !input.repo_scoped;
            let keys: Vec<NodeKey> = model.nodes().map(|(key, _)| key).collect();
            for key in keys {
                if let Some(node) = model.node_mut(key) {
                    node.visible = false;
                }
            }
            for cluster in &mut model.clusters {
                cluster.visible =
                    show_all_clusters || cluster.nodes.iter().any(|key| matched.contains(key));
            }
        },
        FilterChip::All | FilterChip::Nodes | FilterChip::Status(_) => {
            let keys: Vec<NodeKey> = model.nodes().map(|(key, _)| key).collect();
            for key in keys {
                let visible = matched.contains(&key) && !input.nodes_retracted;
                if let Some(node) = model.node_mut(key) {
                    node.visible = visible;
                }
            }
            // Cluster visibility follows match state, not retraction:
            // a collapsed cluster whose nodes match stays on screen.
            for cluster in &mut model.clusters {
                cluster.visible = cluster.nodes.iter().any(|key| matched.contains(key));
            }
        },
    }

    enforce_edge_rule(model);
}

/// Edge visibility is never independently true; it is the conjunction
/// of its endpoints' visibility.
fn enforce_edge_rule(model: &mut AtlasModel) {
    let edges: Vec<(crate::model::EdgeKey, bool)> = model
        .edges()
        .map(|view| {
            let visible = model.node(view.from).is_some_and(|n| n.visible)
                && model.node(view.to).is_some_and(|n| n.visible);
            (view.key, visible)
        })
        .collect();
    for (key, visible) in edges {
        if let Some(link) = model.edge_link_mut(key) {
            link.visible = visible;
        }
    }
}

/// Check that no visible edge has a hidden endpoint. Cheap enough to
/// call from tests after every mutation.
pub fn edge_invariant_holds(model: &AtlasModel) -> bool {
    model.edges().all(|view| {
        let link_visible = model.edge_link(view.key).is_some_and(|l| l.visible);
        if !link_visible {
            return true;
        }
        model.node(view.from).is_some_and(|n| n.visible)
            && model.node(view.to).is_some_and(|n| n.visible)
    })
}
