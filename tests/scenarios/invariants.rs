/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Property checks for the cross-cutting invariants: edge visibility
//! implication and the cluster/node ownership partition, held across
//! arbitrary intent sequences.

use graph_atlas::{
    AtlasApp, AtlasConfig, AtlasIntent, FilterChip, NodeStatus, ProjectDescriptor, TransformMode,
    visibility,
};
use proptest::prelude::*;
use serde_json::json;

const STATUS_TOKENS: [&str; 4] = ["green", "orange", "red", "gray"];

/// Build descriptors from a compact shape: one status index per node,
/// one node list per project, plus edge seeds over the global node pool.
fn build_projects(
    shape: &[Vec<u8>],
    edge_seeds: &[(usize, usize)],
) -> Vec<ProjectDescriptor> {
    let mut pool: Vec<String> = Vec::new();
    for (p, statuses) in shape.iter().enumerate() {
        for i in 0..statuses.len() {
            pool.push(format!("p{p}-n{i}"));
        }
    }

    let projects: Vec<serde_json::Value> = shape
        .iter()
        .enumerate()
        .map(|(p, statuses)| {
            let nodes: Vec<serde_json::Value> = statuses
                .iter()
                .enumerate()
                .map(|(i, &s)| {
                    json!({
                        "id": format!("n{i}"),
                        "name": format!("node {i} of {p}"),
                        "type": if i % 2 == 0 { "service" } else { "library" },
                        "status": STATUS_TOKENS[s as usize % STATUS_TOKENS.len()],
                    })
                })
                .collect();
            let edges: Vec<serde_json::Value> = if p == 0 && !pool.is_empty() {
                edge_seeds
                    .iter()
                    .map(|&(a, b)| {
                        json!({
                            "from": pool[a % pool.len()].clone(),
                            "to": pool[b % pool.len()].clone(),
                        })
                    })
                    .collect()
            } else {
                Vec::new()
            };
            json!({
                "projectName": format!("p{p}"),
                "status": STATUS_TOKENS[p % STATUS_TOKENS.len()],
                "nodes": nodes,
                "edges": edges,
            })
        })
        .collect();

    serde_json::from_value(json!(projects)).unwrap()
}

fn apply_op(app: &mut AtlasApp, op: u8) {
    match op % 10 {
        0 => app.apply_intents([AtlasIntent::SetFilter {
            filter: FilterChip::All,
        }]),
        1 => app.apply_intents([AtlasIntent::SetFilter {
            filter: FilterChip::Repos,
        }]),
        2 => app.apply_intents([AtlasIntent::SetFilter {
            filter: FilterChip::Nodes,
        }]),
        3 => app.apply_intents([AtlasIntent::SetFilter {
            filter: FilterChip::Status(NodeStatus::Broken),
        }]),
        4 => app.apply_intents([AtlasIntent::SetSearchQuery {
            query: "service".to_string(),
        }]),
        5 => app.apply_intents([AtlasIntent::SetSearchQuery {
            query: "repo:p0".to_string(),
        }]),
        6 => app.apply_intents([AtlasIntent::SetSearchQuery {
            query: String::new(),
        }]),
        7 => app.apply_intents([AtlasIntent::SetTransformMode {
            mode: TransformMode::Locked2D,
        }]),
        8 => app.apply_intents([AtlasIntent::SetCollapsed {
            collapsed: !app.transform.collapsed(),
        }]),
        _ => {
            for _ in 0..4 {
                app.tick(250.0);
            }
        },
    }
}

fn partition_holds(app: &AtlasApp) -> bool {
    let owned: usize = app.model.clusters.iter().map(|c| c.nodes.len()).sum();
    owned == app.model.node_count()
}

proptest! {
    #[test]
    fn invariants_hold_across_intent_sequences(
        shape in prop::collection::vec(prop::collection::vec(0u8..4, 0..5), 1..4),
        edge_seeds in prop::collection::vec((0usize..64, 0usize..64), 0..8),
        ops in prop::collection::vec(0u8..10, 1..16),
    ) {
        let mut app = AtlasApp::new(AtlasConfig::default());
        app.apply_intents([AtlasIntent::LoadProjects {
            projects: build_projects(&shape, &edge_seeds),
        }]);

        prop_assert!(partition_holds(&app));
        prop_assert!(visibility::edge_invariant_holds(&app.model));

        for &op in &ops {
            apply_op(&mut app, op);
            prop_assert!(partition_holds(&app), "partition broken after op {op}");
            prop_assert!(
                visibility::edge_invariant_holds(&app.model),
                "edge invariant broken after op {op}"
            );
        }

        // Drain any in-flight animation and re-check the settled state.
        for _ in 0..8 {
            app.tick(250.0);
        }
        prop_assert!(visibility::edge_invariant_holds(&app.model));
    }
}
