/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Query and filter engine.
//!
//! Grammar: a `repo:<substr>` prefix scopes the query to project names
//! and takes precedence over any active status filter; anything else is
//! case-insensitive containment against node name or kind. Matching is
//! total over empty or partial models and returns keys in canonical
//! order. Committed queries feed a bounded, de-duplicated history that
//! is mirrored to an injected store.

use std::str::FromStr;

use crate::model::{AtlasModel, NodeKey, NodeStatus};

/// Query scope prefix. Matching on the prefix itself is case-insensitive.
const REPO_PREFIX: &str = "repo:";

/// Active filter chip. `All`/`Repos`/`Nodes` are view-mode toggles
/// consumed by the visibility propagator; `Status` narrows the match set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChip {
    All,
    Repos,
    Nodes,
    Status(NodeStatus),
}

impl FilterChip {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterChip::All => "all",
            FilterChip::Repos => "repos",
            FilterChip::Nodes => "nodes",
            FilterChip::Status(status) => status.as_str(),
        }
    }
}

/// An unrecognized filter-chip identifier. Callers must not silently
/// fall back to a default; that masks host bugs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParseError(pub String);

impl std::fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown filter chip '{}'", self.0)
    }
}

impl std::error::Error for FilterParseError {}

impl FromStr for FilterChip {
    type Err = FilterParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = raw.trim().to_ascii_lowercase();
        match token.as_str() {
            "all" => Ok(FilterChip::All),
            "repos" => Ok(FilterChip::Repos),
            "nodes" => Ok(FilterChip::Nodes),
            _ => NodeStatus::from_token(&token)
                .map(FilterChip::Status)
                .ok_or(FilterParseError(raw.to_string())),
        }
    }
}

/// Parsed query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Empty,

    /// Free text, lowercased; matches node name or kind.
    Text(String),

    /// `repo:` scoped, lowercased; matches project names and overrides
    /// any status filter.
    RepoScoped(String),
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Query::Empty;
        }
        let lower = trimmed.to_lowercase();
        if let Some(rest) = lower.strip_prefix(REPO_PREFIX) {
            // Bare "repo:" keeps the empty-matches-all rule uniform.
            return Query::RepoScoped(rest.trim().to_string());
        }
        Query::Text(lower)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Query::Empty)
    }

    pub fn is_repo_scoped(&self) -> bool {
        matches!(self, Query::RepoScoped(_))
    }
}

/// Evaluate the query and filter against the model. Returns matched
/// node keys in canonical ingestion order; an empty query matches all.
pub fn matches(model: &AtlasModel, query: &Query, filter: FilterChip) -> Vec<NodeKey> {
    let status_filter = match filter {
        FilterChip::Status(status) => Some(status),
        _ => None,
    };

    model
        .nodes()
        .filter(|(key, node)| match query {
            Query::Empty => status_filter.is_none_or(|s| node.status == s),
            Query::Text(text) => {
                let hit = node.name.to_lowercase().contains(text)
                    || node.kind.to_lowercase().contains(text);
                hit && status_filter.is_none_or(|s| node.status == s)
            },
            // repo: scope overrides the status filter by design contract.
            Query::RepoScoped(substr) => model
                .cluster_of(*key)
                .is_some_and(|cluster| cluster.name.to_lowercase().contains(substr)),
        })
        .map(|(key, _)| key)
        .collect()
}

/// External key/value home for committed queries. The engine only ever
/// calls get/set; the medium is the host's business.
pub trait HistoryStore {
    fn load(&self) -> Option<Vec<String>>;
    fn save(&mut self, entries: &[String]);
}

/// Live search state: query text, active chip, committed history.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub query: String,
    pub filter: FilterChip,

    /// Most-recent-first, de-duplicated, bounded.
    pub history: Vec<String>,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            filter: FilterChip::All,
            history: Vec::new(),
        }
    }

    /// Commit the current query to history. Blank queries are ignored.
    /// Returns true when the history changed.
    pub fn commit(&mut self, limit: usize) -> bool {
        let entry = self.query.trim().to_string();
        if entry.is_empty() {
            return false;
        }
        self.history.retain(|existing| existing != &entry);
        self.history.insert(0, entry);
        self.history.truncate(limit);
        true
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}
