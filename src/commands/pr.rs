//! Pull request command handler.

use crate::context::AppContext;
use crate::error::Result;
use crate::output::{print_step_banner, BannerColor};
use crate::workflow::{PullRequestOutcome, WorkflowContext};

use super::Session;

/// Push the current branch and create, reuse or reopen its pull request.
pub fn pr_command(app: &mut AppContext, session: &mut Session, base: Option<String>) -> Result<()> {
    print_step_banner("PULL REQUEST", BannerColor::Cyan);

    let mut ctx = WorkflowContext::default().with_base(base);
    let outcome = session.workflow(app).pull_request(&mut ctx)?;

    match outcome {
        PullRequestOutcome::Cancelled(_) => {
            print_step_banner("PULL REQUEST CANCELLED", BannerColor::Yellow)
        }
        _ => print_step_banner("PULL REQUEST READY", BannerColor::Green),
    }
    Ok(())
}
