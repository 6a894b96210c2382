/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Selection controller.
//!
//! The host performs its own picking/raycasting and hands over an
//! entity id; this module projects it into a read-only detail payload
//! for the host's panel. No side effects on the canonical model.

use std::collections::BTreeMap;

use crate::model::{AtlasModel, NodeStatus};

/// Detail payload for a picked entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDetail {
    pub name: String,
    pub kind: String,
    pub status: NodeStatus,

    /// Owning project name. For a cluster pick this is its own name.
    pub project: String,

    pub metadata: BTreeMap<String, String>,
}

/// Resolve a picked entity id. Node ids win over cluster ids; an
/// unknown id resolves to `None` rather than an error, since stale
/// picks are routine while a load is in flight.
pub fn detail(model: &AtlasModel, id: &str) -> Option<SelectionDetail> {
    if let Some((_, node)) = model.node_by_id(id) {
        let project = model
            .cluster_by_id(&node.project_id)
            .map(|(_, c)| c.name.clone())
            .unwrap_or_else(|| node.project_id.clone());
        return Some(SelectionDetail {
            name: node.name.clone(),
            kind: node.kind.clone(),
            status: node.status,
            project,
            metadata: node.metadata.clone(),
        });
    }

    if let Some((_, cluster)) = model.cluster_by_id(id) {
        return Some(SelectionDetail {
            name: cluster.name.clone(),
            kind: "project".to_string(),
            status: cluster.status,
            project: cluster.name.clone(),
            metadata: BTreeMap::new(),
        });
    }

    None
}
