//! Code-host integration for pull requests.
//!
//! - [`types`] - Pull request records
//! - [`cli`] - [`CodeHost`] backed by the GitHub CLI

mod cli;
mod types;

pub use cli::{extract_pr_url, GhCli};
pub use types::{CommitSummary, NewPullRequest, PrState, PullRequestRecord};

use crate::error::Result;
use crate::git::RepoInfo;

/// Pull request operations the reconciliation workflow needs.
pub trait CodeHost {
    /// Most recent pull request (any state) whose head is `branch`.
    fn find_pull_request(&self, repo: &RepoInfo, branch: &str)
        -> Result<Option<PullRequestRecord>>;

    fn create_pull_request(
        &self,
        repo: &RepoInfo,
        request: &NewPullRequest,
    ) -> Result<PullRequestRecord>;

    fn reopen_pull_request(&self, repo: &RepoInfo, number: u64) -> Result<PullRequestRecord>;

    fn pull_request_commits(&self, repo: &RepoInfo, number: u64) -> Result<Vec<CommitSummary>>;
}
