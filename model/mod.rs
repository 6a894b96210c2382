/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Canonical atlas model.
//!
//! Core structures:
//! - `AtlasModel`: model container backed by petgraph::StableGraph
//! - `Node`: one component/asset of a project, with position and status
//! - `ProjectCluster`: spatial grouping owning an ordered set of nodes
//!
//! Boundary: topology mutators are `pub(crate)`. The model is built by
//! ingestion once per data load and replaced wholesale on the next load;
//! only positions and visibility flags mutate in between.

use euclid::default::Point3D;
use petgraph::Directed;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use std::collections::{BTreeMap, HashMap};

/// Stable node handle (petgraph NodeIndex; ascending index order is the
/// canonical ingestion order since the model never removes nodes)
pub type NodeKey = NodeIndex;

/// Stable edge handle (petgraph EdgeIndex)
pub type EdgeKey = EdgeIndex;

/// Normalized health status for nodes and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Shipping and green.
    Healthy,

    /// Under active development.
    Active,

    /// Failing or degraded.
    Broken,

    /// Parked; no current signal.
    Backlogged,
}

impl NodeStatus {
    /// Filter-vocabulary token for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Healthy => "healthy",
            NodeStatus::Active => "active",
            NodeStatus::Broken => "broken",
            NodeStatus::Backlogged => "backlogged",
        }
    }

    /// Render-contract color key.
    pub fn color_key(&self) -> &'static str {
        match self {
            NodeStatus::Healthy => "green",
            NodeStatus::Active => "orange",
            NodeStatus::Broken => "red",
            NodeStatus::Backlogged => "gray",
        }
    }

    /// Parse a status token. Accepts both the normalized vocabulary and
    /// the legacy color strings.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "healthy" | "green" | "stable" | "done" => Some(NodeStatus::Healthy),
            "active" | "orange" | "building" | "in-progress" => Some(NodeStatus::Active),
            "broken" | "red" | "failed" | "error" => Some(NodeStatus::Broken),
            "backlogged" | "gray" | "grey" | "idle" | "parked" => Some(NodeStatus::Backlogged),
            _ => None,
        }
    }
}

/// A visual unit representing one component/asset within a project.
#[derive(Debug, Clone)]
pub struct Node {
    /// Globally unique id, derived as `<project>-<rawId>` at ingestion.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Component kind label ("service", "library", ...) as ingested.
    pub kind: String,

    pub status: NodeStatus,

    /// Normalized quality in [0, 1]; 0.5 when the source had no signal.
    pub quality: f32,

    /// Id of the owning cluster. Every node has exactly one owner.
    pub project_id: String,

    /// Position in atlas space. Mutated in place by layout and drag.
    pub position: Point3D<f32>,

    /// Derived show/hide state; owned by the visibility propagator.
    pub visible: bool,

    pub metadata: BTreeMap<String, String>,
}

/// Edge payload: relationship kind plus strength.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLink {
    pub kind: String,
    pub strength: f32,

    /// Derived: true only when both endpoints are visible.
    pub visible: bool,
}

/// Read-only view of an edge (built from petgraph edge references)
#[derive(Debug, Clone, Copy)]
pub struct EdgeView {
    pub key: EdgeKey,
    pub from: NodeKey,
    pub to: NodeKey,
}

/// Spatial grouping of all nodes belonging to one ingested project.
#[derive(Debug, Clone)]
pub struct ProjectCluster {
    pub id: String,
    pub name: String,
    pub status: NodeStatus,

    /// Owned node keys in canonical ingestion order.
    pub nodes: Vec<NodeKey>,

    /// Cluster center position. Mutated in place by layout and drag.
    pub center: Point3D<f32>,

    /// Derived show/hide state; owned by the visibility propagator.
    pub visible: bool,

    /// Opaque stats passthrough from the project descriptor.
    pub stats: Option<serde_json::Value>,
}

/// Ingestion diagnostics; never fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Edges whose endpoints did not resolve to ingested nodes.
    pub dropped_edges: u32,

    /// Projects retained as empty clusters.
    pub empty_projects: u32,

    /// Nodes/projects whose status fell back to the default.
    pub defaulted_statuses: u32,
}

/// Canonical, schema-agnostic in-memory model of ingested project data.
pub struct AtlasModel {
    pub(crate) inner: StableGraph<Node, EdgeLink, Directed>,

    /// Global node id to key mapping.
    id_to_node: HashMap<String, NodeKey>,

    /// Clusters in ingestion order.
    pub clusters: Vec<ProjectCluster>,

    /// Cluster id to `clusters` index mapping.
    cluster_index: HashMap<String, usize>,

    pub diagnostics: Diagnostics,
}

impl AtlasModel {
    pub fn new() -> Self {
        Self {
            inner: StableGraph::new(),
            id_to_node: HashMap::new(),
            clusters: Vec::new(),
            cluster_index: HashMap::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Register a cluster, returning its index. A duplicate cluster id
    /// returns the existing index unchanged.
    pub(crate) fn add_cluster(&mut self, cluster: ProjectCluster) -> usize {
        if let Some(&idx) = self.cluster_index.get(&cluster.id) {
            return idx;
        }
        let idx = self.clusters.len();
        self.cluster_index.insert(cluster.id.clone(), idx);
        self.clusters.push(cluster);
        idx
    }

    /// Add a node under its owning cluster. Returns `None` when the node
    /// id is already taken or the owning cluster is unknown.
    pub(crate) fn add_node(&mut self, node: Node) -> Option<NodeKey> {
        if self.id_to_node.contains_key(&node.id) {
            return None;
        }
        let cluster_idx = *self.cluster_index.get(&node.project_id)?;
        let id = node.id.clone();
        let key = self.inner.add_node(node);
        self.id_to_node.insert(id, key);
        self.clusters[cluster_idx].nodes.push(key);
        Some(key)
    }

    /// Add an edge between two node ids. Returns `None` when either
    /// endpoint is unknown; callers decide whether to count the drop.
    pub(crate) fn add_edge(&mut self, from: &str, to: &str, link: EdgeLink) -> Option<EdgeKey> {
        let from_key = *self.id_to_node.get(from)?;
        let to_key = *self.id_to_node.get(to)?;
        Some(self.inner.add_edge(from_key, to_key, link))
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.inner.node_weight(key)
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.inner.node_weight_mut(key)
    }

    pub fn node_key(&self, id: &str) -> Option<NodeKey> {
        self.id_to_node.get(id).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<(NodeKey, &Node)> {
        let key = self.node_key(id)?;
        Some((key, self.inner.node_weight(key)?))
    }

    /// Iterate all nodes as (key, node) pairs in canonical order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.inner
            .node_indices()
            .map(move |idx| (idx, &self.inner[idx]))
    }

    /// Iterate all edges as read-only views.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView> + '_ {
        self.inner.edge_references().map(|e| EdgeView {
            key: e.id(),
            from: e.source(),
            to: e.target(),
        })
    }

    pub fn edge_link(&self, key: EdgeKey) -> Option<&EdgeLink> {
        self.inner.edge_weight(key)
    }

    pub(crate) fn edge_link_mut(&mut self, key: EdgeKey) -> Option<&mut EdgeLink> {
        self.inner.edge_weight_mut(key)
    }

    pub fn edge_endpoints(&self, key: EdgeKey) -> Option<(NodeKey, NodeKey)> {
        self.inner.edge_endpoints(key)
    }

    pub fn cluster(&self, idx: usize) -> Option<&ProjectCluster> {
        self.clusters.get(idx)
    }

    pub fn cluster_by_id(&self, id: &str) -> Option<(usize, &ProjectCluster)> {
        let idx = *self.cluster_index.get(id)?;
        Some((idx, &self.clusters[idx]))
    }

    /// Owning cluster of a node.
    pub fn cluster_of(&self, key: NodeKey) -> Option<&ProjectCluster> {
        let node = self.node(key)?;
        self.cluster_by_id(&node.project_id).map(|(_, c)| c)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0 && self.clusters.is_empty()
    }

    pub fn visible_node_count(&self) -> usize {
        self.nodes().filter(|(_, n)| n.visible).count()
    }

    pub fn visible_cluster_count(&self) -> usize {
        self.clusters.iter().filter(|c| c.visible).count()
    }

    pub fn visible_edge_count(&self) -> usize {
        self.edges()
            .filter(|view| self.edge_link(view.key).is_some_and(|l| l.visible))
            .count()
    }
}

impl Default for AtlasModel {
    fn default() -> Self {
        Self::new()
    }
}
