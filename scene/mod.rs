/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Render collaborator contract.
//!
//! The engine emits plain per-entity data; meshes, labels, materials,
//! and post-processing are entirely the renderer's concern.

use euclid::default::Point3D;

use crate::model::AtlasModel;

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterVisual {
    pub id: String,
    pub position: Point3D<f32>,
    pub visible: bool,
    pub status_color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub id: String,
    pub position: Point3D<f32>,
    pub visible: bool,
    pub status_color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeVisual {
    pub from_id: String,
    pub to_id: String,
    pub visible: bool,

    /// Style key derived from the relationship kind.
    pub color_key: String,
}

/// One frame's worth of renderable state, in stable order: clusters in
/// ingestion order, nodes canonical, edges by insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneFrame {
    pub clusters: Vec<ClusterVisual>,
    pub nodes: Vec<NodeVisual>,
    pub edges: Vec<EdgeVisual>,
}

/// Project the model into renderable data.
pub fn build(model: &AtlasModel) -> SceneFrame {
    let clusters = model
        .clusters
        .iter()
        .map(|cluster| ClusterVisual {
            id: cluster.id.clone(),
            position: cluster.center,
            visible: cluster.visible,
            status_color: cluster.status.color_key(),
        })
        .collect();

    let nodes = model
        .nodes()
        .map(|(_, node)| NodeVisual {
            id: node.id.clone(),
            position: node.position,
            visible: node.visible,
            status_color: node.status.color_key(),
        })
        .collect();

    let edges = model
        .edges()
        .filter_map(|view| {
            let link = model.edge_link(view.key)?;
            let from = model.node(view.from)?;
            let to = model.node(view.to)?;
            Some(EdgeVisual {
                from_id: from.id.clone(),
                to_id: to.id.clone(),
                visible: link.visible,
                color_key: link.kind.clone(),
            })
        })
        .collect();

    SceneFrame {
        clusters,
        nodes,
        edges,
    }
}
