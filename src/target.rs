// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::LabelDefinition;
use crate::diff::File;

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Kind of entity a run evaluates against. Built-ins declare the kinds they
/// support; an empty declaration means all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TargetKind {
    PullRequest,
    Issue,
    Discussion,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetKind::PullRequest => "pull request",
            TargetKind::Issue => "issue",
            TargetKind::Discussion => "discussion",
        })
    }
}

/// Identity of the entity under evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetEntity {
    pub kind: TargetKind,
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// Label as known to the code host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Failure reported by a [`Target`] implementation.
#[derive(Debug, Error)]
pub enum CodeHostError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("code host request failed: {0}")]
    Api(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl CodeHostError {
    /// Whether the failure means the addressed object does not exist. Label
    /// removal and the pre-run label check treat this case as recoverable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CodeHostError::NotFound(_))
    }
}

pub type HostResult<T> = Result<T, CodeHostError>;

/// Code-host seam. One implementation per platform, injected by the caller;
/// the core never talks to the network itself.
///
/// Queries may be served from a cache; mutations must be applied before
/// returning. Every method may fail with [`CodeHostError`].
pub trait Target {
    fn entity(&self) -> &TargetEntity;

    // Queries.
    fn author(&self) -> HostResult<String>;
    fn title(&self) -> HostResult<String>;
    fn description(&self) -> HostResult<String>;
    fn labels(&self) -> HostResult<Vec<Label>>;
    fn assignees(&self) -> HostResult<Vec<String>>;
    fn requested_reviewers(&self) -> HostResult<Vec<String>>;
    fn comments(&self) -> HostResult<Vec<String>>;
    fn is_draft(&self) -> HostResult<bool>;
    fn created_at(&self) -> HostResult<DateTime<Utc>>;
    fn last_event_at(&self) -> HostResult<DateTime<Utc>>;
    fn head(&self) -> HostResult<String>;
    fn base(&self) -> HostResult<String>;
    /// Changed files with parsed patches. Only meaningful for pull requests.
    fn files(&self) -> HostResult<Vec<File>>;

    // Repository-level label administration.
    fn repo_label(&self, name: &str) -> HostResult<Label>;
    fn create_repo_label(&self, label: &LabelDefinition) -> HostResult<()>;

    // Mutations.
    fn add_label(&self, name: &str) -> HostResult<()>;
    fn remove_label(&self, name: &str) -> HostResult<()>;
    fn add_comment(&self, body: &str) -> HostResult<()>;
    fn assign_assignees(&self, logins: &[String]) -> HostResult<()>;
    fn request_reviewers(&self, logins: &[String]) -> HostResult<()>;
    fn close(&self) -> HostResult<()>;
    fn merge(&self, method: &str) -> HostResult<()>;
}
