//! Guided flow command handler.

use crate::context::AppContext;
use crate::error::Result;
use crate::workflow::PullRecovery;

use super::Session;

pub fn flow_command(app: &mut AppContext, session: &mut Session) -> Result<()> {
    session.workflow(app).devflow(PullRecovery::Prompt)?;
    Ok(())
}
