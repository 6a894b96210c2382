/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! graph-atlas: spatial layout, query/filter, and transform-state engine
//! for project metadata graphs.
//!
//! The engine is an embedded library. It ingests heterogeneous project
//! descriptors into a canonical model, computes positions per transform
//! mode, derives cluster/node/edge visibility from the active search
//! state, and animates mode/collapse transitions. All rendering, picking,
//! and storage are host concerns; the engine emits plain data.

pub mod app;
pub mod config;
pub mod ingest;
pub mod layout;
pub mod model;
pub mod scene;
pub mod search;
pub mod selection;
pub mod transform;
pub mod visibility;

pub use app::{AtlasApp, AtlasIntent};
pub use config::AtlasConfig;
pub use ingest::{IngestOutcome, ProjectDescriptor};
pub use model::{AtlasModel, NodeKey, NodeStatus};
pub use scene::SceneFrame;
pub use search::{FilterChip, FilterParseError, HistoryStore};
pub use selection::SelectionDetail;
pub use transform::{ModeParseError, TransformMode};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
