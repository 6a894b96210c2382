/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Engine state management for the project atlas.
//!
//! `AtlasApp` owns the canonical model, search state, and transform
//! state machine. All mutation flows through `AtlasIntent`s so state
//! updates stay deterministic, and every intent leaves the visibility
//! invariant re-established before returning. The host event loop calls
//! `apply_intents` for discrete events and `tick` once per frame.

use log::debug;

use euclid::default::Point3D;

use crate::config::AtlasConfig;
use crate::ingest::{self, IngestOutcome, ProjectDescriptor};
use crate::model::{AtlasModel, NodeKey};
use crate::scene::{self, SceneFrame};
use crate::search::{FilterChip, FilterParseError, HistoryStore, Query, SearchState, matches};
use crate::selection::{self, SelectionDetail};
use crate::transform::{ModeParseError, TickOutcome, TransformMode, TransformState};
use crate::visibility::{self, VisibilityInput};

/// Deterministic mutation intent boundary for engine state updates.
#[derive(Debug, Clone)]
pub enum AtlasIntent {
    /// Replace the whole model with a fresh data load.
    LoadProjects { projects: Vec<ProjectDescriptor> },

    /// Live query text change (per keystroke).
    SetSearchQuery { query: String },

    /// Explicit execute (Enter); feeds the bounded history.
    CommitSearchQuery,

    SetFilter { filter: FilterChip },

    SetTransformMode { mode: TransformMode },

    SetCollapsed { collapsed: bool },

    /// Host-driven drag reposition; honored in Locked2D only and only
    /// for the dragged entity.
    DragEntity { id: String, position: Point3D<f32> },
}

/// Main engine state.
pub struct AtlasApp {
    /// The canonical model; replaced wholesale on load.
    pub model: AtlasModel,

    pub search: SearchState,

    pub transform: TransformState,

    config: AtlasConfig,

    /// External key/value home for committed queries.
    history_store: Option<Box<dyn HistoryStore>>,

    /// Cached match set from the last visibility refresh.
    matched: Vec<NodeKey>,

    /// Distinguishes "loaded nothing yet / no-data" from a loaded but
    /// fully filtered-out model.
    has_data: bool,
}

impl AtlasApp {
    pub fn new(config: AtlasConfig) -> Self {
        Self {
            model: AtlasModel::new(),
            search: SearchState::new(),
            transform: TransformState::new(),
            config,
            history_store: None,
            matched: Vec::new(),
            has_data: false,
        }
    }

    /// Construct with an external history store; previously committed
    /// queries are loaded back immediately.
    pub fn with_history_store(config: AtlasConfig, store: Box<dyn HistoryStore>) -> Self {
        let mut app = Self::new(config);
        if let Some(history) = store.load() {
            app.search.history = history;
            app.search.history.truncate(app.config.history_limit);
        }
        app.history_store = Some(store);
        app
    }

    /// True when the last load produced a model (possibly all filtered
    /// out); false before any load and after a no-data load.
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Matched node keys from the last query evaluation, canonical order.
    pub fn matched(&self) -> &[NodeKey] {
        &self.matched
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn apply_intents<I>(&mut self, intents: I)
    where
        I: IntoIterator<Item = AtlasIntent>,
    {
        for intent in intents {
            self.apply_intent(intent);
        }
    }

    fn apply_intent(&mut self, intent: AtlasIntent) {
        match intent {
            AtlasIntent::LoadProjects { projects } => self.load_projects(projects),
            AtlasIntent::SetSearchQuery { query } => {
                self.search.query = query;
                self.refresh_visibility();
            },
            AtlasIntent::CommitSearchQuery => {
                if self.search.commit(self.config.history_limit)
                    && let Some(store) = self.history_store.as_mut()
                {
                    store.save(&self.search.history);
                }
            },
            AtlasIntent::SetFilter { filter } => {
                self.search.filter = filter;
                self.refresh_visibility();
            },
            AtlasIntent::SetTransformMode { mode } => {
                self.transform
                    .request_mode(&mut self.model, mode, &self.config);
                self.refresh_visibility();
            },
            AtlasIntent::SetCollapsed { collapsed } => {
                self.transform
                    .set_collapsed(&mut self.model, collapsed, &self.config);
                self.refresh_visibility();
            },
            AtlasIntent::DragEntity { id, position } => self.drag_entity(&id, position),
        }
    }

    /// Parse-and-apply helper for hosts that carry the filter chip as a
    /// string. Unknown identifiers are rejected, never defaulted.
    pub fn set_filter_from_str(&mut self, raw: &str) -> Result<(), FilterParseError> {
        let filter: FilterChip = raw.parse()?;
        self.apply_intent(AtlasIntent::SetFilter { filter });
        Ok(())
    }

    /// Parse-and-apply helper for string transform-mode identifiers.
    pub fn set_mode_from_str(&mut self, raw: &str) -> Result<(), ModeParseError> {
        let mode: TransformMode = raw.parse()?;
        self.apply_intent(AtlasIntent::SetTransformMode { mode });
        Ok(())
    }

    /// Advance the in-flight transition, if any. Drives per-frame
    /// position updates; yielding between frames belongs to the host.
    pub fn tick(&mut self, dt_ms: f32) {
        if self.transform.tick(&mut self.model, dt_ms) == TickOutcome::Completed {
            // Collapse settle hides node cards; expand settle restores
            // them. Either way the propagator owns the flags.
            self.refresh_visibility();
        }
    }

    /// Render collaborator contract: plain per-entity data.
    pub fn scene(&self) -> SceneFrame {
        scene::build(&self.model)
    }

    /// Interaction collaborator contract: picked id to detail payload.
    pub fn selection_detail(&self, id: &str) -> Option<SelectionDetail> {
        selection::detail(&self.model, id)
    }

    fn load_projects(&mut self, projects: Vec<ProjectDescriptor>) {
        match ingest::normalize(projects) {
            IngestOutcome::NoData => {
                debug!("load: no data, rendering empty state");
                self.model = AtlasModel::new();
                self.has_data = false;
            },
            IngestOutcome::Loaded(model) => {
                self.model = model;
                self.has_data = true;
            },
        }
        self.transform.reset_for_load(&mut self.model, &self.config);
        self.refresh_visibility();
    }

    fn drag_entity(&mut self, id: &str, position: Point3D<f32>) {
        if !self.transform.drag_enabled() {
            debug!("drag: ignored outside Locked2D for '{id}'");
            return;
        }
        if let Some(key) = self.model.node_key(id) {
            if let Some(node) = self.model.node_mut(key) {
                node.position = position;
            }
            return;
        }
        if let Some((idx, _)) = self.model.cluster_by_id(id) {
            self.model.clusters[idx].center = position;
            return;
        }
        debug!("drag: unknown entity '{id}'");
    }

    /// Re-evaluate the query and propagate visibility. Total over an
    /// empty or partial model; runs after every mutation so no caller
    /// ever observes a state violating the edge invariant.
    fn refresh_visibility(&mut self) {
        let query = Query::parse(&self.search.query);
        self.matched = matches(&self.model, &query, self.search.filter);
        visibility::propagate(
            &mut self.model,
            &VisibilityInput {
                matched: &self.matched,
                filter: self.search.filter,
                query_is_empty: query.is_empty(),
                repo_scoped: query.is_repo_scoped(),
                nodes_retracted: self.transform.nodes_retracted(),
            },
        );
    }
}
