/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Ingestion and normalization of heterogeneous project descriptors.
//!
//! Three historical schema generations are accepted: legacy string
//! statuses, `{phase}` objects, and `{state, progress}` objects, with a
//! `nodes` or `assets` array per project. Everything malformed degrades
//! to defaults; nothing in here returns an error. Missing input yields
//! an explicit no-data signal so the host can render an empty state.

use euclid::default::Point3D;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::model::{AtlasModel, EdgeLink, Node, NodeStatus, ProjectCluster};

/// Default quality when the source carries no progress signal.
const DEFAULT_QUALITY: f32 = 0.5;

/// One project as it arrives from the host, any schema generation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDescriptor {
    #[serde(alias = "projectName", alias = "name")]
    pub project_name: String,

    #[serde(default)]
    pub status: Option<RawStatus>,

    /// v1/v3 call these `nodes`, v2 calls them `assets`.
    #[serde(default, alias = "assets")]
    pub nodes: Vec<RawNode>,

    #[serde(default)]
    pub edges: Vec<RawEdge>,

    /// Opaque stats blob, passed through to the cluster.
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
}

/// The three historical status shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawStatus {
    /// v1: bare color string (`"green" | "orange" | "red" | "gray"`).
    Legacy(String),

    /// v2: `{ "phase": "building" }`.
    Phase { phase: String },

    /// v3: `{ "state": "broken", "progress": 0.4 }`.
    State {
        state: String,
        #[serde(default)]
        progress: Option<f32>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    /// Raw id; may be a string or number in the wild. Falls back to the
    /// node's index within its project when absent.
    #[serde(default)]
    pub id: Option<serde_json::Value>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, alias = "type", alias = "assetType")]
    pub kind: Option<String>,

    #[serde(default)]
    pub status: Option<RawStatus>,

    #[serde(default)]
    pub quality: Option<f32>,

    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    pub from: serde_json::Value,
    pub to: serde_json::Value,

    #[serde(default, alias = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub strength: Option<f32>,
}

/// Result of a data load. `NoData` is a signal, not a failure.
pub enum IngestOutcome {
    NoData,
    Loaded(AtlasModel),
}

/// Parse a JSON document into project descriptors. This is the only
/// fallible step of ingestion; past it, everything normalizes.
pub fn parse_projects(json: &str) -> Result<Vec<ProjectDescriptor>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Normalize descriptors into the canonical model.
pub fn normalize(projects: Vec<ProjectDescriptor>) -> IngestOutcome {
    if projects.is_empty() {
        return IngestOutcome::NoData;
    }

    let mut model = AtlasModel::new();
    // Edges resolve against the full node set, so they are deferred
    // until every project's nodes are in.
    let mut pending_edges: Vec<(String, RawEdge)> = Vec::new();

    for project in projects {
        let project_id = project.project_name.clone();
        let (status, _, defaulted) = normalize_status(project.status.as_ref());
        if defaulted {
            model.diagnostics.defaulted_statuses += 1;
        }

        model.add_cluster(ProjectCluster {
            id: project_id.clone(),
            name: project.project_name.clone(),
            status,
            nodes: Vec::new(),
            center: Point3D::origin(),
            visible: true,
            stats: project.stats,
        });

        if project.nodes.is_empty() {
            model.diagnostics.empty_projects += 1;
            debug!("ingest: project '{project_id}' has no parsable nodes, kept as empty cluster");
        }

        for (index, raw) in project.nodes.into_iter().enumerate() {
            let raw_id = raw
                .id
                .as_ref()
                .and_then(id_string)
                .unwrap_or_else(|| index.to_string());
            let node_id = format!("{project_id}-{raw_id}");

            let (status, quality, defaulted) = normalize_status(raw.status.as_ref());
            if defaulted {
                model.diagnostics.defaulted_statuses += 1;
            }
            let quality = raw.quality.unwrap_or(quality).clamp(0.0, 1.0);

            let node = Node {
                name: raw.name.unwrap_or_else(|| raw_id.clone()),
                kind: raw.kind.unwrap_or_else(|| "component".to_string()),
                status,
                quality,
                project_id: project_id.clone(),
                id: node_id.clone(),
                position: Point3D::origin(),
                visible: true,
                metadata: flatten_metadata(raw.metadata),
            };
            if model.add_node(node).is_none() {
                warn!("ingest: duplicate node id '{node_id}' dropped");
            }
        }

        for edge in project.edges {
            pending_edges.push((project_id.clone(), edge));
        }
    }

    for (project_id, edge) in pending_edges {
        let Some(from) = resolve_endpoint(&model, &project_id, &edge.from) else {
            model.diagnostics.dropped_edges += 1;
            debug!("ingest: edge in '{project_id}' dropped, unresolved source endpoint");
            continue;
        };
        let Some(to) = resolve_endpoint(&model, &project_id, &edge.to) else {
            model.diagnostics.dropped_edges += 1;
            debug!("ingest: edge in '{project_id}' dropped, unresolved target endpoint");
            continue;
        };
        let link = EdgeLink {
            kind: edge.kind.unwrap_or_else(|| "related".to_string()),
            strength: edge.strength.unwrap_or(1.0),
            visible: true,
        };
        model.add_edge(&from, &to, link);
    }

    IngestOutcome::Loaded(model)
}

/// Normalize any status shape into (status, quality, defaulted-flag).
fn normalize_status(raw: Option<&RawStatus>) -> (NodeStatus, f32, bool) {
    match raw {
        None => (NodeStatus::Backlogged, DEFAULT_QUALITY, true),
        Some(RawStatus::Legacy(token)) | Some(RawStatus::Phase { phase: token }) => {
            match NodeStatus::from_token(token) {
                Some(status) => (status, DEFAULT_QUALITY, false),
                None => {
                    debug!("ingest: unknown status token '{token}', defaulting");
                    (NodeStatus::Backlogged, DEFAULT_QUALITY, true)
                },
            }
        },
        Some(RawStatus::State { state, progress }) => {
            let quality = progress.unwrap_or(DEFAULT_QUALITY).clamp(0.0, 1.0);
            match NodeStatus::from_token(state) {
                Some(status) => (status, quality, false),
                None => {
                    debug!("ingest: unknown status state '{state}', defaulting");
                    (NodeStatus::Backlogged, quality, true)
                },
            }
        },
    }
}

/// Edge endpoints are accepted either as full global node ids or as raw
/// ids local to the declaring project.
fn resolve_endpoint(
    model: &AtlasModel,
    project_id: &str,
    endpoint: &serde_json::Value,
) -> Option<String> {
    let raw = id_string(endpoint)?;
    if model.node_key(&raw).is_some() {
        return Some(raw);
    }
    let qualified = format!("{project_id}-{raw}");
    if model.node_key(&qualified).is_some() {
        return Some(qualified);
    }
    None
}

fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flatten_metadata(raw: BTreeMap<String, serde_json::Value>) -> BTreeMap<String, String> {
    raw.into_iter()
        .map(|(k, v)| {
            let flat = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, flat)
        })
        .collect()
}
