//! Pull request records exchanged with the code host and stored in the cache.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a pull request.
///
/// Accepts the upper-case names `gh` prints as well as the lower-case form
/// written to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    #[serde(alias = "OPEN")]
    Open,
    #[serde(alias = "CLOSED")]
    Closed,
    #[serde(alias = "MERGED")]
    Merged,
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::Merged => "merged",
        };
        f.write_str(label)
    }
}

/// A pull request as known to the code host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub number: u64,
    pub state: PrState,
    pub title: String,
    pub url: String,
    /// Source branch
    pub head_ref: String,
    /// Target branch
    pub base_ref: String,
}

impl PullRequestRecord {
    pub fn is_open(&self) -> bool {
        self.state == PrState::Open
    }
}

/// Everything needed to open a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    /// Target branch, without any `origin/` prefix
    pub base: String,
    pub body: String,
}

/// One commit of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub oid: String,
    pub headline: String,
}
