use tracing::debug;

use crate::branch::branch_name_for_issue;
use crate::error::{DevflowError, Result};
use crate::issues::Issue;
use crate::output::print_issue_summary;

use super::{BranchSetupOutcome, PullRecovery, Workflow, WorkflowContext};

impl Workflow<'_> {
    /// Set up the branch for a tracker issue, asking for the key when none
    /// is given. The fetched issue is left in `ctx.issue`.
    pub fn branch_from_issue(
        &mut self,
        ctx: &mut WorkflowContext,
        key: Option<&str>,
        recovery: PullRecovery,
    ) -> Result<BranchSetupOutcome> {
        let key = match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => key.to_string(),
            None => self.prompter.ask("Issue key", None).trim().to_string(),
        };
        if key.is_empty() {
            return Err(DevflowError::Cancelled("no issue key given".to_string()));
        }

        let issue = self.tracker.fetch_issue(&key.to_uppercase())?;
        self.branch_for_issue(ctx, issue, recovery)
    }

    /// Set up the branch named after an already fetched issue.
    pub fn branch_for_issue(
        &mut self,
        ctx: &mut WorkflowContext,
        issue: Issue,
        recovery: PullRecovery,
    ) -> Result<BranchSetupOutcome> {
        print_issue_summary(&issue);

        ctx.branch_name = branch_name_for_issue(&issue.key, &issue.title, &issue.issue_type);
        debug!(branch = %ctx.branch_name, "branch for issue");
        ctx.issue = Some(issue);

        self.setup_branch(ctx, recovery)
    }
}
