/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Spatial layout engine.
//!
//! Pure function of `(mode, model, collapsed)`: proposes target positions
//! and never mutates the model. Identical input yields bit-identical
//! targets; the timeline jitter is a hash of the node id, not randomness,
//! so positions are stable across reloads.

use euclid::default::{Point3D, Vector3D};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::f32::consts::TAU;
use std::hash::{Hash, Hasher};

use crate::config::AtlasConfig;
use crate::model::{AtlasModel, NodeKey};
use crate::transform::TransformMode;

/// Proposed target positions, keyed by cluster index and node key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutTargets {
    pub clusters: HashMap<usize, Point3D<f32>>,
    pub nodes: HashMap<NodeKey, Point3D<f32>>,
}

impl LayoutTargets {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.nodes.is_empty()
    }
}

/// Compute target positions for every cluster and node.
///
/// Zero entities produce empty targets, never an error. An empty cluster
/// still receives a position. When `collapsed`, every node's target is
/// its owning cluster's target center.
pub fn compute(
    mode: TransformMode,
    model: &AtlasModel,
    collapsed: bool,
    config: &AtlasConfig,
) -> LayoutTargets {
    let mut targets = match mode {
        TransformMode::Free3D => free3d(model, config),
        TransformMode::Locked2D => locked2d(model, config),
        TransformMode::Timeline => timeline(model, config),
        TransformMode::Quantum => current(model),
    };

    if collapsed {
        for (key, node) in model.nodes() {
            let center = model
                .cluster_by_id(&node.project_id)
                .and_then(|(idx, _)| targets.clusters.get(&idx).copied())
                .unwrap_or(node.position);
            targets.nodes.insert(key, center);
        }
    }

    targets
}

/// Clusters evenly on a ring whose radius scales with cluster count,
/// alternating depth; each cluster's nodes on a smaller concentric ring
/// that grows mildly with node count.
fn free3d(model: &AtlasModel, config: &AtlasConfig) -> LayoutTargets {
    let mut targets = LayoutTargets::default();
    let cluster_count = model.cluster_count();
    if cluster_count == 0 {
        return targets;
    }

    let ring_radius =
        config.free3d_base_radius + config.free3d_radius_per_cluster * cluster_count as f32;

    for (idx, cluster) in model.clusters.iter().enumerate() {
        let angle = idx as f32 * TAU / cluster_count as f32;
        let z = if idx % 2 == 0 {
            config.free3d_z_offset
        } else {
            -config.free3d_z_offset
        };
        let center = Point3D::new(ring_radius * angle.cos(), ring_radius * angle.sin(), z);
        targets.clusters.insert(idx, center);

        let node_count = cluster.nodes.len();
        if node_count == 0 {
            continue;
        }
        let node_ring =
            config.node_ring_radius * (1.0 + config.node_ring_growth * node_count as f32);
        for (j, &key) in cluster.nodes.iter().enumerate() {
            let node_angle = j as f32 * TAU / node_count as f32;
            let position = Point3D::new(
                center.x + node_ring * node_angle.cos(),
                center.y + node_ring * node_angle.sin(),
                center.z,
            );
            targets.nodes.insert(key, position);
        }
    }

    targets
}

/// All visible entities (clusters first, then nodes, canonical order)
/// packed row-major on a square grid. `cols = ceil(sqrt(N))`, fixed
/// spacing, so overlap is impossible by construction.
fn locked2d(model: &AtlasModel, config: &AtlasConfig) -> LayoutTargets {
    enum Slot {
        Cluster(usize),
        Node(NodeKey),
    }

    let mut slots: Vec<Slot> = Vec::new();
    for (idx, cluster) in model.clusters.iter().enumerate() {
        if cluster.visible {
            slots.push(Slot::Cluster(idx));
        }
    }
    for (key, node) in model.nodes() {
        if node.visible {
            slots.push(Slot::Node(key));
        }
    }

    let mut targets = LayoutTargets::default();
    let n = slots.len();
    if n == 0 {
        return targets;
    }

    let cols = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    let spacing = config.grid_spacing;
    let origin_x = -((cols - 1) as f32) * spacing * 0.5;
    let origin_y = -((rows - 1) as f32) * spacing * 0.5;

    for (i, slot) in slots.into_iter().enumerate() {
        let col = i % cols;
        let row = i / cols;
        let position = Point3D::new(
            origin_x + col as f32 * spacing,
            origin_y + row as f32 * spacing,
            0.0,
        );
        match slot {
            Slot::Cluster(idx) => {
                targets.clusters.insert(idx, position);
            },
            Slot::Node(key) => {
                targets.nodes.insert(key, position);
            },
        }
    }

    targets
}

/// Nodes along a spiral over canonical ingestion order: three turns,
/// radius shrinking and height climbing linearly with the normalized
/// index. Clusters keep their current centers.
fn timeline(model: &AtlasModel, config: &AtlasConfig) -> LayoutTargets {
    let mut targets = LayoutTargets::default();
    for (idx, cluster) in model.clusters.iter().enumerate() {
        targets.clusters.insert(idx, cluster.center);
    }

    let n = model.node_count();
    if n == 0 {
        return targets;
    }

    for (i, (key, node)) in model.nodes().enumerate() {
        let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
        let angle = t * config.spiral_turns * TAU;
        let radius =
            config.spiral_start_radius + (config.spiral_end_radius - config.spiral_start_radius) * t;
        let jitter = stable_jitter(&node.id, config.spiral_jitter);
        let position = Point3D::new(
            radius * angle.cos() + jitter.x,
            radius * angle.sin() + jitter.y,
            config.spiral_height * t + jitter.z,
        );
        targets.nodes.insert(key, position);
    }

    targets
}

/// Quantum reuses whatever positions the model currently has; the mode
/// switch itself is a restyling concern outside the engine.
fn current(model: &AtlasModel) -> LayoutTargets {
    let mut targets = LayoutTargets::default();
    for (idx, cluster) in model.clusters.iter().enumerate() {
        targets.clusters.insert(idx, cluster.center);
    }
    for (key, node) in model.nodes() {
        targets.nodes.insert(key, node.position);
    }
    targets
}

/// Deterministic jitter derived from the node id. DefaultHasher is
/// seeded with fixed keys, so the offset is stable across processes.
fn stable_jitter(id: &str, amplitude: f32) -> Vector3D<f32> {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let bits = hasher.finish();
    let unit = |chunk: u64| (chunk & 0xFFFF) as f32 / 65535.0 * 2.0 - 1.0;
    Vector3D::new(
        unit(bits) * amplitude,
        unit(bits >> 16) * amplitude,
        unit(bits >> 32) * amplitude,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{self, IngestOutcome};
    use serde_json::json;

    fn model_with(clusters: usize, nodes_per_cluster: usize) -> AtlasModel {
        let projects: Vec<serde_json::Value> = (0..clusters)
            .map(|c| {
                let nodes: Vec<serde_json::Value> = (0..nodes_per_cluster)
                    .map(|i| json!({"id": format!("n{i}"), "status": "green"}))
                    .collect();
                json!({"projectName": format!("proj{c}"), "status": "green", "nodes": nodes})
            })
            .collect();
        let descriptors = serde_json::from_value(json!(projects)).unwrap();
        match ingest::normalize(descriptors) {
            IngestOutcome::Loaded(model) => model,
            IngestOutcome::NoData => panic!("expected data"),
        }
    }

    #[test]
    fn test_empty_model_yields_empty_targets() {
        let model = AtlasModel::new();
        let config = AtlasConfig::default();
        for mode in [
            TransformMode::Free3D,
            TransformMode::Locked2D,
            TransformMode::Timeline,
            TransformMode::Quantum,
        ] {
            assert!(compute(mode, &model, false, &config).is_empty());
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let model = model_with(3, 4);
        let config = AtlasConfig::default();
        for mode in [
            TransformMode::Free3D,
            TransformMode::Locked2D,
            TransformMode::Timeline,
        ] {
            let first = compute(mode, &model, false, &config);
            let second = compute(mode, &model, false, &config);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_free3d_alternates_z_offset() {
        let model = model_with(4, 1);
        let config = AtlasConfig::default();
        let targets = compute(TransformMode::Free3D, &model, false, &config);

        assert_eq!(targets.clusters[&0].z, config.free3d_z_offset);
        assert_eq!(targets.clusters[&1].z, -config.free3d_z_offset);
        assert_eq!(targets.clusters[&2].z, config.free3d_z_offset);
        assert_eq!(targets.clusters[&3].z, -config.free3d_z_offset);
    }

    #[test]
    fn test_free3d_node_ring_grows_with_count() {
        let small = model_with(1, 2);
        let large = model_with(1, 12);
        let config = AtlasConfig::default();

        let ring_spread = |model: &AtlasModel| {
            let targets = compute(TransformMode::Free3D, model, false, &config);
            let center = targets.clusters[&0];
            let (key, _) = model.nodes().next().unwrap();
            let p = targets.nodes[&key];
            ((p.x - center.x).powi(2) + (p.y - center.y).powi(2)).sqrt()
        };

        assert!(ring_spread(&large) > ring_spread(&small));
    }

    #[test]
    fn test_empty_cluster_still_positioned() {
        let descriptors = serde_json::from_value(json!([
            {"projectName": "empty", "nodes": []},
            {"projectName": "full", "nodes": [{"id": "a"}]}
        ]))
        .unwrap();
        let IngestOutcome::Loaded(model) = ingest::normalize(descriptors) else {
            panic!("expected data");
        };
        let targets = compute(TransformMode::Free3D, &model, false, &AtlasConfig::default());
        assert!(targets.clusters.contains_key(&0));
        assert!(targets.clusters.contains_key(&1));
    }

    #[test]
    fn test_locked2d_ten_entities_pack_four_columns() {
        // 2 clusters + 8 nodes = 10 placed entities.
        let model = model_with(2, 4);
        let config = AtlasConfig::default();
        let targets = compute(TransformMode::Locked2D, &model, false, &config);

        let mut xs: Vec<i64> = targets
            .clusters
            .values()
            .chain(targets.nodes.values())
            .map(|p| (p.x / config.grid_spacing).round() as i64)
            .collect();
        xs.sort_unstable();
        xs.dedup();
        assert_eq!(xs.len(), 4);
    }

    #[test]
    fn test_locked2d_has_no_overlaps() {
        let model = model_with(3, 5);
        let targets = compute(TransformMode::Locked2D, &model, false, &AtlasConfig::default());

        let mut seen: Vec<(i64, i64)> = targets
            .clusters
            .values()
            .chain(targets.nodes.values())
            .map(|p| ((p.x * 10.0) as i64, (p.y * 10.0) as i64))
            .collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn test_timeline_height_grows_with_order() {
        let model = model_with(1, 6);
        let config = AtlasConfig::default();
        let targets = compute(TransformMode::Timeline, &model, false, &config);

        let keys: Vec<NodeKey> = model.nodes().map(|(k, _)| k).collect();
        let first = targets.nodes[&keys[0]];
        let last = targets.nodes[&keys[5]];
        // Jitter is bounded by the configured amplitude, so ordering of
        // the spiral height survives it.
        assert!(last.z > first.z + config.spiral_height * 0.5);
    }

    #[test]
    fn test_timeline_jitter_is_stable_per_id() {
        let a = stable_jitter("alpha-api", 1.0);
        let b = stable_jitter("alpha-api", 1.0);
        let c = stable_jitter("alpha-db", 1.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.x.abs() <= 1.0 && a.y.abs() <= 1.0 && a.z.abs() <= 1.0);
    }

    #[test]
    fn test_quantum_reuses_current_positions() {
        let mut model = model_with(2, 2);
        let keys: Vec<NodeKey> = model.nodes().map(|(k, _)| k).collect();
        model.node_mut(keys[0]).unwrap().position = Point3D::new(7.0, 8.0, 9.0);

        let targets = compute(TransformMode::Quantum, &model, false, &AtlasConfig::default());
        assert_eq!(targets.nodes[&keys[0]], Point3D::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn test_collapsed_targets_converge_on_cluster_centers() {
        let model = model_with(2, 3);
        let config = AtlasConfig::default();
        let targets = compute(TransformMode::Free3D, &model, true, &config);

        for (idx, cluster) in model.clusters.iter().enumerate() {
            let center = targets.clusters[&idx];
            for key in &cluster.nodes {
                assert_eq!(targets.nodes[key], center);
            }
        }
    }
}
