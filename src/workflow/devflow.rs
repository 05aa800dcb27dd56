//! Guided flow: issue, branch, and optionally the pull request, in one go.

use crate::error::{DevflowError, Result};
use crate::output::{print_detail, print_info, print_step_banner, print_success, BannerColor};

use super::{
    BranchSetupOutcome, IssueRequest, PullRecovery, PullRequestOutcome, Workflow, WorkflowContext,
};

/// What the operator wants to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevflowChoice {
    NewIssue,
    ExistingIssue,
    BranchOnly,
    Cancel,
}

impl DevflowChoice {
    pub const ALL: [DevflowChoice; 4] = [
        DevflowChoice::NewIssue,
        DevflowChoice::ExistingIssue,
        DevflowChoice::BranchOnly,
        DevflowChoice::Cancel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DevflowChoice::NewIssue => "Create new issue → branch",
            DevflowChoice::ExistingIssue => "Use existing issue → branch",
            DevflowChoice::BranchOnly => "Create branch only (no issue)",
            DevflowChoice::Cancel => "Cancel",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevflowOutcome {
    Cancelled,
    Completed {
        branch: String,
        setup: BranchSetupOutcome,
        /// `None` when the operator chose not to open a pull request now.
        pull_request: Option<PullRequestOutcome>,
    },
}

impl Workflow<'_> {
    pub fn devflow(&mut self, recovery: PullRecovery) -> Result<DevflowOutcome> {
        print_step_banner("DEVELOPMENT WORKFLOW", BannerColor::Cyan);
        print_detail("This will guide you through the full development process");

        let options: Vec<String> = DevflowChoice::ALL
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        let answer = self.prompter.select(
            "What would you like to do?",
            &options,
            Some(DevflowChoice::ExistingIssue.label()),
        );
        let choice = DevflowChoice::from_label(&answer).ok_or_else(|| {
            DevflowError::Cancelled(format!("unknown choice '{}'", answer))
        })?;

        let mut ctx = WorkflowContext::default();
        let setup = match choice {
            DevflowChoice::Cancel => {
                print_step_banner("WORKFLOW CANCELLED", BannerColor::Yellow);
                return Ok(DevflowOutcome::Cancelled);
            }
            DevflowChoice::NewIssue => {
                let issue = self.create_issue(IssueRequest::default())?;
                self.branch_for_issue(&mut ctx, issue, recovery)?
            }
            DevflowChoice::ExistingIssue => self.branch_from_issue(&mut ctx, None, recovery)?,
            DevflowChoice::BranchOnly => {
                let name = self.prompter.ask("Branch name", None).trim().to_string();
                if name.is_empty() {
                    return Err(DevflowError::Cancelled("no branch name given".to_string()));
                }
                ctx.branch_name = name;
                self.setup_branch(&mut ctx, recovery)?
            }
        };

        let pull_request = if self.prompter.yes_no("Create pull request now?", true) {
            Some(self.pull_request(&mut ctx)?)
        } else {
            print_info("You can create the PR later with: devflow pr");
            None
        };

        print_success("Development workflow setup complete!");
        Ok(DevflowOutcome::Completed {
            branch: ctx.branch_name,
            setup,
            pull_request,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{board, issue, FakeGit, FakeTracker, Harness};

    #[test]
    fn test_labels_round_trip() {
        for choice in DevflowChoice::ALL {
            assert_eq!(DevflowChoice::from_label(choice.label()), Some(choice));
        }
        assert_eq!(DevflowChoice::from_label("Something else"), None);
    }

    #[test]
    fn test_cancel_touches_nothing() {
        let mut h = Harness::new(FakeGit::on("main")).answers(&["Cancel"]);
        let outcome = h.run(|wf| wf.devflow(PullRecovery::Abort)).unwrap();

        assert_eq!(outcome, DevflowOutcome::Cancelled);
        assert!(h.git.mutations().is_empty());
    }

    #[test]
    fn test_existing_issue_is_the_default_choice() {
        let git = FakeGit::on("main").with_local(&["feat/KRAFT-42-add-login"]);
        let tracker = FakeTracker::new().with_issue(issue("KRAFT-42", "Add login", "story"));
        let mut h = Harness::new(git).tracker(tracker).answers(&["", "KRAFT-42", "n"]);

        let outcome = h.run(|wf| wf.devflow(PullRecovery::Abort)).unwrap();

        assert_eq!(
            outcome,
            DevflowOutcome::Completed {
                branch: "feat/KRAFT-42-add-login".to_string(),
                setup: BranchSetupOutcome::Reused { pulled: false },
                pull_request: None,
            }
        );
        assert_eq!(
            h.prompter.questions(),
            [
                "What would you like to do?",
                "Issue key",
                "Create pull request now?"
            ]
        );
    }

    #[test]
    fn test_branch_only_then_pull_request() {
        let git = FakeGit::on("main").with_recent(&["main"]);
        let mut h = Harness::new(git).answers(&[
            "Create branch only (no issue)",
            "chore/cleanup-logs",
            "main",
            "y",
        ]);

        let outcome = h.run(|wf| wf.devflow(PullRecovery::Abort)).unwrap();

        let DevflowOutcome::Completed { pull_request, .. } = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert!(matches!(pull_request, Some(PullRequestOutcome::Created(_))));
        let created = &h.host.created()[0];
        assert_eq!(created.head, "chore/cleanup-logs");
        assert_eq!(created.base, "main");
    }

    #[test]
    fn test_new_issue_then_branch() {
        let tracker = FakeTracker::new()
            .with_boards(vec![board(4, "kanban", "KRAFT")])
            .with_issue_types(&["Story"]);
        let git = FakeGit::on("main").with_recent(&["main"]);
        let mut h = Harness::new(git).tracker(tracker).answers(&[
            "Create new issue → branch",
            "Add login",
            "KRAFT",
            "Story",
            "",
            "main",
            "n",
        ]);

        let outcome = h.run(|wf| wf.devflow(PullRecovery::Abort)).unwrap();

        let DevflowOutcome::Completed { branch, setup, .. } = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(branch, "feat/KRAFT-101-add-login");
        assert!(matches!(setup, BranchSetupOutcome::Created { .. }));
        assert_eq!(h.tracker.created().len(), 1);
        assert_eq!(h.tracker.count("fetch_issue"), 0);
    }
}
