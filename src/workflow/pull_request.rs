//! Pull request reconciliation for the current branch.
//!
//! Push (escalating to `--force-with-lease`, then `--force`, only with the
//! operator's consent), find the branch's pull request, then reuse, reopen
//! or create one.

use serde_json::json;
use tracing::debug;

use crate::base_branch::{infer_base_branch, strip_remote};
use crate::branch::{branch_type, commit_message_from_branch, is_protected};
use crate::error::{DevflowError, Result};
use crate::gh::{NewPullRequest, PrState, PullRequestRecord};
use crate::git::{PushMode, RepoInfo};
use crate::issues::{issue_key_from_branch, Issue};
use crate::output::{
    print_existing_pr, print_info, print_pr_cancelled, print_pr_commits, print_pr_created,
    print_pr_reopened, print_pr_reused, print_push_success, print_pushing_branch, print_warning,
};
use crate::template::{load_template, render};

use super::{Workflow, WorkflowContext};

/// Commits listed under a reused pull request.
const MAX_COMMITS_DISPLAY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestOutcome {
    Created(PullRequestRecord),
    /// An open pull request already existed for the branch.
    Reused(PullRequestRecord),
    Reopened(PullRequestRecord),
    /// The operator declined a step; nothing was created or reused.
    Cancelled(String),
}

impl PullRequestOutcome {
    pub fn pull_request(&self) -> Option<&PullRequestRecord> {
        match self {
            PullRequestOutcome::Created(pr)
            | PullRequestOutcome::Reused(pr)
            | PullRequestOutcome::Reopened(pr) => Some(pr),
            PullRequestOutcome::Cancelled(_) => None,
        }
    }
}

/// Cache location of a branch's pull request.
fn cache_path<'a>(repo: &'a RepoInfo, branch: &'a str) -> [&'a str; 5] {
    [
        "pull_requests",
        repo.host_provider.as_str(),
        repo.owner.as_str(),
        repo.repo.as_str(),
        branch,
    ]
}

impl Workflow<'_> {
    /// Push the current branch and make sure it has an open pull request.
    ///
    /// `ctx.base_branch` overrides base inference; `ctx.issue` and
    /// `ctx.pr_description`, when set, feed the body.
    pub fn pull_request(&mut self, ctx: &mut WorkflowContext) -> Result<PullRequestOutcome> {
        let branch = self.git.current_branch()?;
        if is_protected(&branch) {
            return Err(DevflowError::ProtectedBranchViolation(branch));
        }
        ctx.branch_name = branch.clone();

        if !self.push_branch(&branch)? {
            let reason = "branch was not pushed".to_string();
            print_pr_cancelled(&reason);
            return Ok(PullRequestOutcome::Cancelled(reason));
        }

        let repo = self.git.repo_info()?;
        let outcome = match self.find_existing(&repo, &branch)? {
            Some(pr) if pr.is_open() => PullRequestOutcome::Reused(pr),
            Some(pr) => self.reconcile_closed(&repo, ctx, pr)?,
            None => PullRequestOutcome::Created(self.create(&repo, ctx)?),
        };

        self.finish(&repo, &outcome);
        Ok(outcome)
    }

    /// Push `branch`, escalating on rejection. `false` when the operator
    /// declined an escalation.
    fn push_branch(&mut self, branch: &str) -> Result<bool> {
        for mode in [PushMode::Normal, PushMode::ForceWithLease, PushMode::Force] {
            if let Some(flag) = mode.flag() {
                let question = format!("Do you want to push {} the branch?", flag);
                if !self.prompter.yes_no(&question, false) {
                    return Ok(false);
                }
            }

            print_pushing_branch(branch, mode.flag());
            match self.git.push(branch, mode) {
                Ok(()) => {
                    print_push_success();
                    return Ok(true);
                }
                Err(err @ DevflowError::GitCommandFailed { .. }) if mode != PushMode::Force => {
                    print_warning(&format!("Push rejected: {}", err));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(false)
    }

    /// The branch's pull request, from the cache when it is known to be
    /// open, otherwise from the code host.
    fn find_existing(
        &mut self,
        repo: &RepoInfo,
        branch: &str,
    ) -> Result<Option<PullRequestRecord>> {
        let path = cache_path(repo, branch);
        if let Some(pr) = self.app.cache.lookup_as::<PullRequestRecord>(&path) {
            if pr.is_open() {
                debug!(number = pr.number, "open pull request found in cache");
                return Ok(Some(pr));
            }
        }

        match self.host.find_pull_request(repo, branch)? {
            Some(pr) => {
                self.app.cache.set_as(&path, &pr)?;
                Ok(Some(pr))
            }
            None => {
                self.app.cache.reset(&path);
                Ok(None)
            }
        }
    }

    /// Decide what to do with a pull request that is closed or merged.
    fn reconcile_closed(
        &mut self,
        repo: &RepoInfo,
        ctx: &WorkflowContext,
        existing: PullRequestRecord,
    ) -> Result<PullRequestOutcome> {
        print_existing_pr(&existing);

        if self
            .prompter
            .yes_no("Continue and create a new Pull Request?", false)
        {
            return Ok(PullRequestOutcome::Created(self.create(repo, ctx)?));
        }

        if existing.state == PrState::Closed
            && self
                .prompter
                .yes_no("Would you like to reopen the existing PR instead?", false)
        {
            let pr = self.host.reopen_pull_request(repo, existing.number)?;
            self.app
                .cache
                .set_as(&cache_path(repo, &ctx.branch_name), &pr)?;
            return Ok(PullRequestOutcome::Reopened(pr));
        }

        let reason = "no new Pull Request will be created".to_string();
        print_pr_cancelled(&reason);
        Ok(PullRequestOutcome::Cancelled(reason))
    }

    fn create(&mut self, repo: &RepoInfo, ctx: &WorkflowContext) -> Result<PullRequestRecord> {
        let branch = ctx.branch_name.as_str();
        let title = commit_message_from_branch(branch);

        let base = match ctx.base_branch.as_deref().filter(|b| !b.trim().is_empty()) {
            Some(base) => base.trim().to_string(),
            None => infer_base_branch(self.git)?,
        };
        let base = strip_remote(&base).to_string();

        let issue = match &ctx.issue {
            Some(issue) => Some(issue.clone()),
            None => self.issue_for_branch(branch),
        };
        let description = ctx
            .pr_description
            .clone()
            .or_else(|| {
                issue
                    .as_ref()
                    .map(|i| i.description.clone())
                    .filter(|d| !d.trim().is_empty())
            })
            .unwrap_or_else(|| title.clone());

        let (template, source) = load_template(self.repo_dir, self.app.app_dir());
        debug!(?source, "pull request template");
        let body = render(
            &template,
            branch_type(branch),
            issue.as_ref(),
            Some(&description),
        );

        print_info(&format!("Creating pull request {} → {}", branch, base));
        let pr = self.host.create_pull_request(
            repo,
            &NewPullRequest {
                title,
                head: branch.to_string(),
                base,
                body,
            },
        )?;
        self.app.cache.set_as(&cache_path(repo, branch), &pr)?;
        Ok(pr)
    }

    /// The issue named in the branch, if the tracker knows it.
    fn issue_for_branch(&self, branch: &str) -> Option<Issue> {
        let key = issue_key_from_branch(branch)?;
        match self.tracker.fetch_issue(&key) {
            Ok(issue) => Some(issue),
            Err(e) => {
                print_warning(&format!("Could not load issue {}: {}", key, e));
                None
            }
        }
    }

    fn finish(&mut self, repo: &RepoInfo, outcome: &PullRequestOutcome) {
        let Some(pr) = outcome.pull_request() else {
            return;
        };

        match outcome {
            PullRequestOutcome::Created(pr) => print_pr_created(pr),
            PullRequestOutcome::Reopened(pr) => print_pr_reopened(pr),
            PullRequestOutcome::Reused(pr) => {
                print_pr_reused(pr);
                match self.host.pull_request_commits(repo, pr.number) {
                    Ok(commits) => print_pr_commits(&commits, MAX_COMMITS_DISPLAY),
                    Err(e) => debug!(error = %e, "could not list pull request commits"),
                }
            }
            PullRequestOutcome::Cancelled(_) => {}
        }

        self.app.cache.set(
            &["workflows", "last_pull_request"],
            json!({
                "number": pr.number,
                "url": pr.url,
                "branch": pr.head_ref,
            }),
        );
        self.open_in_browser(&pr.url);
    }
}
