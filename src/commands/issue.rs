//! Issue command handler.

use crate::context::AppContext;
use crate::error::Result;
use crate::output::{print_step_banner, BannerColor};
use crate::workflow::{PullRecovery, WorkflowContext};

use super::Session;

/// Set up the branch for tracker issue `key` (asked for when missing).
pub fn issue_command(
    app: &mut AppContext,
    session: &mut Session,
    key: Option<String>,
    recovery: PullRecovery,
) -> Result<()> {
    print_step_banner("BRANCH FROM ISSUE", BannerColor::Cyan);

    let mut ctx = WorkflowContext::default();
    session
        .workflow(app)
        .branch_from_issue(&mut ctx, key.as_deref(), recovery)?;

    print_step_banner("BRANCH READY", BannerColor::Green);
    Ok(())
}
