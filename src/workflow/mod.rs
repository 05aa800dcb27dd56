//! Developer workflows: issue → branch → pull request.
//!
//! - [`setup_branch`] - get onto the right branch (reuse, stash, create)
//! - [`pull_request`] - push and reconcile the branch's pull request
//! - [`branch_from_issue`] - branch named after a tracker issue
//! - [`create_issue`] - create a tracker issue interactively
//! - [`devflow`] - guided combination of the above
//!
//! Every workflow runs on a [`Workflow`], which borrows the collaborators
//! for the duration of one command.

pub mod branch_from_issue;
pub mod create_issue;
pub mod devflow;
pub mod pull_request;
pub mod setup_branch;

pub use create_issue::{resolve_issue_type, IssueRequest, IssueTypeMatch};
pub use devflow::{DevflowChoice, DevflowOutcome};
pub use pull_request::PullRequestOutcome;
pub use setup_branch::{BranchSetupOutcome, PullRecovery};

use std::path::Path;

use crate::browser::Browser;
use crate::context::AppContext;
use crate::gh::CodeHost;
use crate::git::Git;
use crate::issues::{Issue, IssueTracker};
use crate::output::print_warning;
use crate::prompt::Prompter;

/// State carried through one workflow run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowContext {
    /// Target branch
    pub branch_name: String,
    /// Explicit base on input; the base actually used once a branch is created
    pub base_branch: Option<String>,
    pub issue: Option<Issue>,
    pub commit_message: Option<String>,
    pub pr_description: Option<String>,
}

impl WorkflowContext {
    pub fn for_branch(name: impl Into<String>) -> Self {
        Self {
            branch_name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base_branch = base;
        self
    }
}

/// Collaborators for one command.
pub struct Workflow<'a> {
    pub(crate) git: &'a dyn Git,
    pub(crate) host: &'a dyn CodeHost,
    pub(crate) tracker: &'a dyn IssueTracker,
    pub(crate) prompter: &'a mut dyn Prompter,
    pub(crate) browser: &'a dyn Browser,
    pub(crate) app: &'a mut AppContext,
    pub(crate) repo_dir: &'a Path,
}

impl<'a> Workflow<'a> {
    pub fn new(
        git: &'a dyn Git,
        host: &'a dyn CodeHost,
        tracker: &'a dyn IssueTracker,
        prompter: &'a mut dyn Prompter,
        browser: &'a dyn Browser,
        app: &'a mut AppContext,
        repo_dir: &'a Path,
    ) -> Self {
        Self {
            git,
            host,
            tracker,
            prompter,
            browser,
            app,
            repo_dir,
        }
    }

    /// Open `url`; a failure only warns.
    pub(crate) fn open_in_browser(&self, url: &str) {
        if let Err(e) = self.browser.open(url) {
            print_warning(&format!("Could not open {} in a browser: {}", url, e));
        }
    }
}
