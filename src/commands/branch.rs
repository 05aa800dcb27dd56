//! Branch command handler.

use crate::context::AppContext;
use crate::error::{DevflowError, Result};
use crate::output::{print_step_banner, BannerColor};
use crate::workflow::{PullRecovery, WorkflowContext};

use super::Session;

/// Switch to `name`, creating it from `base` when it does not exist.
/// Asks for the name when none is given.
pub fn branch_command(
    app: &mut AppContext,
    session: &mut Session,
    name: Option<String>,
    base: Option<String>,
    recovery: PullRecovery,
) -> Result<()> {
    print_step_banner("SETUP BRANCH", BannerColor::Cyan);

    let mut workflow = session.workflow(app);
    let name = match name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => workflow.prompter.ask("Branch name", None).trim().to_string(),
    };
    if name.is_empty() {
        return Err(DevflowError::Cancelled("no branch name given".to_string()));
    }

    let mut ctx = WorkflowContext::for_branch(name).with_base(base);
    workflow.setup_branch(&mut ctx, recovery)?;

    print_step_banner("BRANCH READY", BannerColor::Green);
    Ok(())
}
