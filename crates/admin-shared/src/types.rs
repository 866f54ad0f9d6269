//! Common types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where menu records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// How parent/child edges are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TreeStrategy {
    /// `parent_id` column only; ancestry is walked.
    #[default]
    Adjacency,
    /// `parent_id` column plus an ancestor/descendant table.
    Closure,
}

/// Range within which two menu nodes may not share a permission code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodeScope {
    /// Unique across the whole menu forest.
    #[default]
    Global,
    /// Unique within one top-level module (the tree under a root).
    Module,
    /// Unique among nodes sharing the same parent.
    Siblings,
    /// No uniqueness check.
    Disabled,
}

impl CodeScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            CodeScope::Global => "global",
            CodeScope::Module => "module",
            CodeScope::Siblings => "siblings",
            CodeScope::Disabled => "disabled",
        }
    }
}

impl fmt::Display for CodeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}
