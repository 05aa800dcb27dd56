//! Branch setup: get from wherever HEAD is onto the target branch.
//!
//! ```text
//! Start ─ target is current ──────────────────────────────► AlreadyOnBranch
//!   └─ DirtyCheck ─ [Stash] ─ exists? ─ yes ─ Checkout ─ Pull ─► Reused
//!                               └─ no ─ DetermineBase ─ CheckoutBase ─ Pull
//!                                       ─ CreateNew ─ EmptyCommit ─► Created
//! ```

use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde_json::json;
use tracing::debug;

use crate::base_branch::{infer_base_branch, strip_remote};
use crate::branch::commit_message_from_branch;
use crate::error::{DevflowError, Result};
use crate::output::{
    print_branch_created, print_branch_reused, print_info, print_stashed, print_switching_branch,
    print_warning,
};

use super::{Workflow, WorkflowContext};

/// What to do when `git pull --rebase` fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullRecovery {
    /// Abort the rebase and fail with the git error.
    Abort,
    /// Abort the rebase and carry on without pulling.
    SkipPull,
    /// Ask the operator: continue without pulling, or abort.
    #[default]
    Prompt,
}

impl FromStr for PullRecovery {
    type Err = DevflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "abort" => Ok(PullRecovery::Abort),
            "skip" => Ok(PullRecovery::SkipPull),
            "prompt" => Ok(PullRecovery::Prompt),
            other => Err(DevflowError::Config(format!(
                "Unknown pull recovery '{}'. Use prompt, skip or abort",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSetupOutcome {
    /// Target was already checked out; nothing changed.
    AlreadyOnBranch,
    /// Existing branch checked out. `pulled` is false when there was no
    /// remote counterpart or the pull was skipped.
    Reused { pulled: bool },
    /// New branch created from `base` with an empty commit.
    Created {
        base: String,
        commit_message: String,
    },
}

/// Message for the automatic stash taken before leaving a dirty branch.
pub fn stash_message(branch: &str, at: DateTime<Local>) -> String {
    format!(
        "Auto-stash from {} - {}",
        branch,
        at.format("%Y-%m-%d %H:%M:%S")
    )
}

impl Workflow<'_> {
    /// Put HEAD on `ctx.branch_name`, creating it from `ctx.base_branch`
    /// (or a chosen/inferred base) when it does not exist.
    pub fn setup_branch(
        &mut self,
        ctx: &mut WorkflowContext,
        recovery: PullRecovery,
    ) -> Result<BranchSetupOutcome> {
        let target = ctx.branch_name.clone();
        let state = self.git.branch_state(&target)?;

        if state.is_current {
            print_info(&format!("Already on branch '{}'", target));
            return Ok(BranchSetupOutcome::AlreadyOnBranch);
        }

        let current = self.git.current_branch()?;
        if self.git.changes_pending()? {
            let message = stash_message(&current, Local::now());
            self.git.stash(&message)?;
            print_stashed(&message);
        }

        if state.exists_locally || state.exists_remotely {
            print_switching_branch(&current, &target);
            self.git.checkout(&target)?;
            let pulled = state.exists_remotely && self.pull_with_recovery(recovery)?;
            print_branch_reused(&target, pulled);
            return Ok(BranchSetupOutcome::Reused { pulled });
        }

        let base = self.determine_base(ctx.base_branch.as_deref())?;
        if base != current {
            print_switching_branch(&current, &base);
            self.git.checkout(&base)?;
        }
        if self.git.remote_branch_exists(&base)? {
            self.pull_with_recovery(recovery)?;
        }

        self.git.create_branch(&target)?;
        let commit_message = commit_message_from_branch(&target);
        self.git.commit(&commit_message, true)?;
        print_branch_created(&target, &base, &commit_message);

        self.app.cache.set(
            &["workflows", "last_branch"],
            json!({
                "branch": target,
                "base": base,
                "created_at": Utc::now().to_rfc3339(),
            }),
        );

        ctx.base_branch = Some(base.clone());
        ctx.commit_message = Some(commit_message.clone());
        Ok(BranchSetupOutcome::Created {
            base,
            commit_message,
        })
    }

    /// Explicit base, else the operator's pick among recent branches, else
    /// inference. Always without `origin/`.
    fn determine_base(&mut self, explicit: Option<&str>) -> Result<String> {
        if let Some(base) = explicit.filter(|b| !b.trim().is_empty()) {
            return Ok(strip_remote(base.trim()).to_string());
        }

        let recent = self.git.recent_branches()?;
        let base = if recent.is_empty() {
            debug!("no recent branches, inferring base");
            infer_base_branch(self.git)?
        } else {
            let main = self.git.main_branch()?;
            self.prompter
                .select("Select the base branch", &recent, Some(main.as_str()))
        };

        if base.trim().is_empty() {
            return Err(DevflowError::NoBaseBranchFound);
        }
        Ok(strip_remote(base.trim()).to_string())
    }

    /// `git pull --rebase`, resolving a failure per `recovery`.
    /// Returns whether the pull happened.
    fn pull_with_recovery(&mut self, recovery: PullRecovery) -> Result<bool> {
        let err = match self.git.pull(true) {
            Ok(()) => return Ok(true),
            Err(err @ DevflowError::GitCommandFailed { .. }) => err,
            Err(other) => return Err(other),
        };

        print_warning(&format!("Pull failed: {}", err));
        let recovery = match recovery {
            PullRecovery::Prompt => {
                if self
                    .prompter
                    .yes_no("Pull failed. Continue without pulling?", false)
                {
                    PullRecovery::SkipPull
                } else {
                    PullRecovery::Abort
                }
            }
            decided => decided,
        };

        self.abort_pending_rebase();
        match recovery {
            PullRecovery::SkipPull => Ok(false),
            _ => Err(err),
        }
    }

    fn abort_pending_rebase(&self) {
        if !self.git.changes_pending().unwrap_or(false) {
            return;
        }
        if let Err(e) = self.git.abort_rebase() {
            debug!(error = %e, "no rebase to abort");
        }
    }
}
