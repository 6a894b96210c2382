/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Transform state machine: mode, collapse, and animated transitions.
//!
//! A mode or collapse request computes targets through the layout
//! engine, then animates every currently visible entity toward them
//! with a cubic ease-out. Requests supersede each other: each one bumps
//! a generation token and a superseded transition never mutates the
//! model again. Collapse captures pre-collapse positions lazily so
//! expand can restore them exactly.

use euclid::default::Point3D;
use std::collections::HashMap;
use std::str::FromStr;

use crate::config::AtlasConfig;
use crate::layout::{self, LayoutTargets};
use crate::model::{AtlasModel, NodeKey};

/// Active layout/interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    /// Clusters on a ring in depth, nodes orbiting their cluster.
    Free3D,

    /// Flat grid; the only mode with drag repositioning.
    Locked2D,

    /// Spiral over ingestion order.
    Timeline,

    /// Restyle-only mode; positions are left as they are.
    Quantum,
}

impl TransformMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformMode::Free3D => "free3d",
            TransformMode::Locked2D => "locked2d",
            TransformMode::Timeline => "timeline",
            TransformMode::Quantum => "quantum",
        }
    }
}

/// An unrecognized transform-mode identifier. Callers must not silently
/// fall back to a default; that masks host bugs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeParseError(pub String);

impl std::fmt::Display for ModeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown transform mode '{}'", self.0)
    }
}

impl std::error::Error for ModeParseError {}

impl FromStr for TransformMode {
    type Err = ModeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free3d" => Ok(TransformMode::Free3D),
            "locked2d" => Ok(TransformMode::Locked2D),
            "timeline" => Ok(TransformMode::Timeline),
            "quantum" => Ok(TransformMode::Quantum),
            _ => Err(ModeParseError(raw.to_string())),
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Animating,

    /// The transition finished this tick; visibility wants a refresh.
    Completed,
}

#[derive(Debug, Clone, Copy)]
enum EntityRef {
    Cluster(usize),
    Node(NodeKey),
}

#[derive(Debug, Clone)]
struct TransitionEntry {
    entity: EntityRef,
    from: Point3D<f32>,
    to: Point3D<f32>,
}

#[derive(Debug, Clone)]
struct Transition {
    generation: u64,
    elapsed_ms: f32,
    duration_ms: f32,
    entries: Vec<TransitionEntry>,

    /// Set on expand transitions: once settled, the captured positions
    /// have been consumed and the next collapse re-captures fresh ones.
    clear_captured_on_complete: bool,
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Mode plus collapse flag plus the in-flight transition, if any.
pub struct TransformState {
    mode: TransformMode,
    collapsed: bool,

    /// Bumped on every request; the live transition must carry the
    /// current value or it is superseded and dropped without effect.
    generation: u64,

    transition: Option<Transition>,

    /// Pre-collapse node positions, captured lazily on first collapse.
    captured: HashMap<NodeKey, Point3D<f32>>,
}

impl TransformState {
    pub fn new() -> Self {
        Self {
            mode: TransformMode::Free3D,
            collapsed: false,
            generation: 0,
            transition: None,
            captured: HashMap::new(),
        }
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Drag repositioning is a Locked2D affordance only.
    pub fn drag_enabled(&self) -> bool {
        matches!(self.mode, TransformMode::Locked2D)
    }

    /// True once collapse has settled: node cards are retracted into
    /// their clusters and stay hidden.
    pub fn nodes_retracted(&self) -> bool {
        self.collapsed && self.transition.is_none()
    }

    /// Switch mode, animating visible entities to the new layout.
    /// Transforming with zero entities is a no-op.
    pub(crate) fn request_mode(
        &mut self,
        model: &mut AtlasModel,
        mode: TransformMode,
        config: &AtlasConfig,
    ) {
        if model.is_empty() {
            return;
        }
        self.mode = mode;
        let targets = layout::compute(mode, model, self.collapsed, config);
        self.begin_transition(model, targets, config);
    }

    /// Collapse nodes into their cluster centers, or expand them back
    /// to their captured positions. Redundant requests are no-ops.
    pub(crate) fn set_collapsed(
        &mut self,
        model: &mut AtlasModel,
        collapsed: bool,
        config: &AtlasConfig,
    ) {
        if collapsed == self.collapsed || model.is_empty() {
            return;
        }
        if collapsed {
            // Lazy capture: an interrupted expand keeps its original
            // capture rather than recording mid-flight positions.
            let positions: Vec<(NodeKey, Point3D<f32>)> =
                model.nodes().map(|(key, node)| (key, node.position)).collect();
            for (key, position) in positions {
                self.captured.entry(key).or_insert(position);
            }
            self.collapsed = true;
            let targets = layout::compute(self.mode, model, true, config);
            self.begin_transition(model, targets, config);
        } else {
            self.collapsed = false;
            self.generation = self.generation.wrapping_add(1);
            // Every node animates back, hidden or not; the propagator
            // decides what actually shows.
            let entries: Vec<TransitionEntry> = model
                .nodes()
                .map(|(key, node)| TransitionEntry {
                    entity: EntityRef::Node(key),
                    from: node.position,
                    to: self.captured.get(&key).copied().unwrap_or(node.position),
                })
                .collect();
            if entries.is_empty() {
                self.captured.clear();
                self.transition = None;
                return;
            }
            self.transition = Some(Transition {
                generation: self.generation,
                elapsed_ms: 0.0,
                duration_ms: config.clamped_transition_duration_ms(),
                entries,
                clear_captured_on_complete: true,
            });
        }
    }

    /// Replace-the-world entry point for a fresh data load: cancel any
    /// in-flight animation (stale keys must never touch the new model),
    /// drop captures, uncollapse, and snap the current mode's layout.
    pub(crate) fn reset_for_load(&mut self, model: &mut AtlasModel, config: &AtlasConfig) {
        self.generation = self.generation.wrapping_add(1);
        self.transition = None;
        self.captured.clear();
        self.collapsed = false;

        let targets = layout::compute(self.mode, model, false, config);
        for (&idx, &center) in &targets.clusters {
            if let Some(cluster) = model.clusters.get_mut(idx) {
                cluster.center = center;
            }
        }
        for (&key, &position) in &targets.nodes {
            if let Some(node) = model.node_mut(key) {
                node.position = position;
            }
        }
    }

    /// Advance the in-flight transition by `dt_ms`. Host-driven; never
    /// blocks. Superseded transitions are dropped without touching the
    /// model.
    pub(crate) fn tick(&mut self, model: &mut AtlasModel, dt_ms: f32) -> TickOutcome {
        let Some(mut transition) = self.transition.take() else {
            return TickOutcome::Idle;
        };
        if transition.generation != self.generation {
            return TickOutcome::Idle;
        }

        transition.elapsed_ms += dt_ms;
        let t = (transition.elapsed_ms / transition.duration_ms).clamp(0.0, 1.0);
        let done = t >= 1.0;
        let progress = ease_out_cubic(t);

        for entry in &transition.entries {
            // Land exactly on the target; lerp roundoff must not leak
            // into the settled positions.
            let position = if done {
                entry.to
            } else {
                entry.from.lerp(entry.to, progress)
            };
            match entry.entity {
                EntityRef::Cluster(idx) => {
                    if let Some(cluster) = model.clusters.get_mut(idx) {
                        cluster.center = position;
                    }
                },
                EntityRef::Node(key) => {
                    if let Some(node) = model.node_mut(key) {
                        node.position = position;
                    }
                },
            }
        }

        if done {
            if transition.clear_captured_on_complete {
                self.captured.clear();
            }
            TickOutcome::Completed
        } else {
            self.transition = Some(transition);
            TickOutcome::Animating
        }
    }

    /// Animate visible entities toward `targets`; hidden ones snap
    /// immediately so they do not surface mid-flight at stale spots.
    fn begin_transition(
        &mut self,
        model: &mut AtlasModel,
        targets: LayoutTargets,
        config: &AtlasConfig,
    ) {
        self.generation = self.generation.wrapping_add(1);

        let mut entries = Vec::new();
        let mut cluster_snaps: Vec<(usize, Point3D<f32>)> = Vec::new();
        let mut node_snaps: Vec<(NodeKey, Point3D<f32>)> = Vec::new();

        for (idx, cluster) in model.clusters.iter().enumerate() {
            let Some(&to) = targets.clusters.get(&idx) else {
                continue;
            };
            if cluster.visible {
                entries.push(TransitionEntry {
                    entity: EntityRef::Cluster(idx),
                    from: cluster.center,
                    to,
                });
            } else {
                cluster_snaps.push((idx, to));
            }
        }
        for (key, node) in model.nodes() {
            let Some(&to) = targets.nodes.get(&key) else {
                continue;
            };
            if node.visible {
                entries.push(TransitionEntry {
                    entity: EntityRef::Node(key),
                    from: node.position,
                    to,
                });
            } else {
                node_snaps.push((key, to));
            }
        }

        for (idx, to) in cluster_snaps {
            model.clusters[idx].center = to;
        }
        for (key, to) in node_snaps {
            if let Some(node) = model.node_mut(key) {
                node.position = to;
            }
        }

        self.transition = if entries.is_empty() {
            None
        } else {
            Some(Transition {
                generation: self.generation,
                elapsed_ms: 0.0,
                duration_ms: config.clamped_transition_duration_ms(),
                entries,
                clear_captured_on_complete: false,
            })
        };
    }
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new()
    }
}
