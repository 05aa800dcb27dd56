//! Create-issue command handler.

use crate::context::AppContext;
use crate::error::Result;
use crate::workflow::IssueRequest;

use super::Session;

pub fn create_issue_command(
    app: &mut AppContext,
    session: &mut Session,
    request: IssueRequest,
) -> Result<()> {
    session.workflow(app).create_issue(request)?;
    Ok(())
}
