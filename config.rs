/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Engine configuration, injected at construction.
//!
//! Every tunable the layout and transform paths read lives here so hosts
//! can override them without recompiling. Defaults match the reference
//! visual tuning.

/// Transition durations outside this window read as either instant or
/// sluggish; requests are clamped into it.
pub const TRANSITION_DURATION_MIN_MS: f32 = 800.0;
pub const TRANSITION_DURATION_MAX_MS: f32 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AtlasConfig {
    /// Free3D: cluster ring radius floor.
    pub free3d_base_radius: f32,

    /// Free3D: ring radius added per cluster.
    pub free3d_radius_per_cluster: f32,

    /// Free3D: alternating depth offset between neighboring clusters.
    pub free3d_z_offset: f32,

    /// Free3D: base radius of the per-cluster node ring.
    pub node_ring_radius: f32,

    /// Free3D: node ring growth factor per owned node.
    pub node_ring_growth: f32,

    /// Locked2D: fixed grid cell spacing.
    pub grid_spacing: f32,

    /// Timeline: number of full spiral turns.
    pub spiral_turns: f32,

    /// Timeline: spiral radius at t = 0.
    pub spiral_start_radius: f32,

    /// Timeline: spiral radius at t = 1.
    pub spiral_end_radius: f32,

    /// Timeline: total height climbed across the spiral.
    pub spiral_height: f32,

    /// Timeline: amplitude of the deterministic per-node jitter.
    pub spiral_jitter: f32,

    /// Mode/collapse transition duration in milliseconds.
    pub transition_duration_ms: f32,

    /// Maximum number of committed search queries retained.
    pub history_limit: usize,
}

impl AtlasConfig {
    /// Transition duration clamped into the supported window.
    pub fn clamped_transition_duration_ms(&self) -> f32 {
        self.transition_duration_ms
            .clamp(TRANSITION_DURATION_MIN_MS, TRANSITION_DURATION_MAX_MS)
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            free3d_base_radius: 12.0,
            free3d_radius_per_cluster: 2.0,
            free3d_z_offset: 3.0,
            node_ring_radius: 3.0,
            node_ring_growth: 0.08,
            grid_spacing: 5.0,
            spiral_turns: 3.0,
            spiral_start_radius: 20.0,
            spiral_end_radius: 4.0,
            spiral_height: 15.0,
            spiral_jitter: 0.75,
            transition_duration_ms: 900.0,
            history_limit: 10,
        }
    }
}
