//! Interactive issue creation.
//!
//! Missing fields are asked for, with defaults from the active issue
//! provider's config. Only the board lookup and the creation itself are
//! critical; the assignee and sprint lookups fall back to an unassigned
//! backlog issue.

use serde_json::json;

use crate::error::{DevflowError, Result};
use crate::issues::{
    board_for_project, issue_types_for_project, project_keys, sprint_field_id, user_account_id,
    Board, Issue, NewIssue,
};
use crate::output::{
    print_detail, print_info, print_issue_created, print_step_banner, print_warning, BannerColor,
};

use super::Workflow;

/// Field values already known before prompting (from command-line flags).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueRequest {
    pub title: Option<String>,
    pub project: Option<String>,
    pub issue_type: Option<String>,
    pub assignee: Option<String>,
}

/// How a requested issue type matched the project's types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueTypeMatch {
    /// Same name ignoring case
    Exact(String),
    /// First type whose name contains the request
    Partial(String),
    /// Nothing matched, or the project's types are unknown
    Unvalidated(String),
}

impl IssueTypeMatch {
    pub fn name(&self) -> &str {
        match self {
            IssueTypeMatch::Exact(name)
            | IssueTypeMatch::Partial(name)
            | IssueTypeMatch::Unvalidated(name) => name,
        }
    }
}

/// Match `requested` against `available`: exact (case-insensitive), then
/// substring, else the request as given.
pub fn resolve_issue_type(requested: &str, available: &[String]) -> IssueTypeMatch {
    let wanted = requested.trim().to_lowercase();

    if let Some(exact) = available.iter().find(|t| t.to_lowercase() == wanted) {
        return IssueTypeMatch::Exact(exact.clone());
    }
    if let Some(partial) = available
        .iter()
        .find(|t| t.to_lowercase().contains(&wanted))
    {
        return IssueTypeMatch::Partial(partial.clone());
    }
    IssueTypeMatch::Unvalidated(requested.trim().to_string())
}

/// Where the new issue lands on its board.
fn placement(board: &Board, in_sprint: bool) -> &'static str {
    match (board.is_scrum(), in_sprint) {
        (true, true) => "Issue added to active sprint",
        (true, false) => "Issue added to project backlog",
        (false, _) => "Issue added to Kanban board",
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Workflow<'_> {
    /// Create a tracker issue, prompting for whatever `request` leaves out.
    pub fn create_issue(&mut self, request: IssueRequest) -> Result<Issue> {
        let title = match non_empty(request.title) {
            Some(title) => title,
            None => self.prompter.ask("Issue title", None).trim().to_string(),
        };
        if title.is_empty() {
            return Err(DevflowError::Cancelled("Issue title is required".to_string()));
        }

        let project = match non_empty(request.project) {
            Some(project) => project,
            None => self.choose_project(),
        }
        .to_uppercase();
        if project.is_empty() {
            return Err(DevflowError::Cancelled("Project key is required".to_string()));
        }

        let types = match issue_types_for_project(self.tracker, &mut self.app.cache, &project) {
            Ok(types) => types,
            Err(e) => {
                print_warning(&format!("Could not load issue types: {}", e));
                Vec::new()
            }
        };
        let requested_type = match non_empty(request.issue_type) {
            Some(issue_type) => issue_type,
            None => self.choose_issue_type(&types),
        };
        if requested_type.is_empty() {
            return Err(DevflowError::Cancelled("Issue type is required".to_string()));
        }
        let issue_type = self.validate_issue_type(&project, &requested_type, &types);

        let assignee = match non_empty(request.assignee) {
            Some(assignee) => assignee,
            None => {
                let default = self.app.provider_setting("default_assignee_name").map(str::to_string);
                self.prompter
                    .ask("Assignee name", default.as_deref())
                    .trim()
                    .to_string()
            }
        };

        print_step_banner("CREATING ISSUE", BannerColor::Cyan);
        print_detail(&format!("- Project Key: {}", project));
        print_detail(&format!("- Title: {}", title));
        print_detail(&format!("- Type: {}", issue_type));
        print_detail(&format!("- Assignee: {}", assignee));

        let board = self.project_board(&project)?;
        let assignee_id = self.assignee_id(&assignee);
        let sprint = if board.is_scrum() {
            self.sprint_for(&board)
        } else {
            None
        };
        let in_sprint = sprint.is_some();

        let issue = self.tracker.create_issue(&NewIssue {
            project_key: project,
            title,
            issue_type,
            assignee_id,
            sprint,
        })?;

        self.app.cache.set(
            &["workflows", "last_issue_created"],
            json!({ "key": issue.key, "url": issue.url }),
        );
        print_issue_created(&issue, placement(&board, in_sprint));
        self.open_in_browser(&issue.url);
        Ok(issue)
    }

    fn choose_project(&mut self) -> String {
        let default = self.app.provider_setting("default_project_key").map(str::to_string);
        let keys = match project_keys(self.tracker, &mut self.app.cache) {
            Ok(keys) => keys,
            Err(e) => {
                print_warning(&format!("Could not load projects: {}", e));
                Vec::new()
            }
        };

        let answer = if keys.is_empty() {
            self.prompter.ask("Project key", default.as_deref())
        } else {
            self.prompter.select("Project key", &keys, default.as_deref())
        };
        answer.trim().to_string()
    }

    fn choose_issue_type(&mut self, types: &[String]) -> String {
        let default = self.app.provider_setting("default_issue_type").map(str::to_string);
        let answer = if types.is_empty() {
            self.prompter.ask("Issue type", default.as_deref())
        } else {
            self.prompter.select("Issue type", types, default.as_deref())
        };
        answer.trim().to_string()
    }

    fn validate_issue_type(&self, project: &str, requested: &str, types: &[String]) -> String {
        if types.is_empty() {
            print_warning("Unable to validate issue type, using without validation");
            return requested.to_string();
        }

        let resolved = resolve_issue_type(requested, types);
        match &resolved {
            IssueTypeMatch::Exact(_) => {}
            IssueTypeMatch::Partial(name) => {
                print_info(&format!("Issue type found: '{}' (partial match)", name));
            }
            IssueTypeMatch::Unvalidated(name) => {
                print_warning(&format!("Issue type '{}' not found", name));
                print_detail(&format!("Available types for project '{}':", project));
                for t in types {
                    print_detail(&format!("- {}", t));
                }
                print_warning(&format!("Using specified type without validation: '{}'", name));
            }
        }
        resolved.name().to_string()
    }

    /// The project's board. An unknown project is fatal.
    fn project_board(&mut self, project: &str) -> Result<Board> {
        if let Some(board) = board_for_project(self.tracker, &mut self.app.cache, project)? {
            return Ok(board);
        }

        print_detail("Available projects:");
        for key in project_keys(self.tracker, &mut self.app.cache).unwrap_or_default() {
            print_detail(&format!("- {}", key));
        }
        Err(DevflowError::RemoteLookupFailed(format!(
            "Project '{}' not found",
            project
        )))
    }

    fn assignee_id(&mut self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        match user_account_id(self.tracker, &mut self.app.cache, name) {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                print_warning(&format!("User '{}' not found, issue will be unassigned", name));
                None
            }
            Err(e) => {
                print_warning(&format!("Could not look up user '{}': {}", name, e));
                None
            }
        }
    }

    /// Sprint field and active sprint of a scrum board, when both are known.
    fn sprint_for(&mut self, board: &Board) -> Option<(String, u64)> {
        let field = match sprint_field_id(self.tracker, &mut self.app.cache) {
            Ok(Some(field)) => field,
            Ok(None) => {
                print_warning("Sprint field ID not found");
                print_detail("Issue will be created in backlog");
                return None;
            }
            Err(e) => {
                print_warning(&format!("Error searching for sprint field ID: {}", e));
                print_detail("Issue will be created in backlog");
                return None;
            }
        };

        match self.tracker.active_sprint(board.id) {
            Ok(Some(sprint)) => {
                print_info(&format!("Active sprint: {}", sprint.name));
                Some((field, sprint.id))
            }
            Ok(None) => {
                print_info("No active sprint found");
                print_detail("Issue will be created in backlog");
                None
            }
            Err(e) => {
                print_warning(&format!("Error searching for active sprint: {}", e));
                print_detail("Issue will be created in backlog");
                None
            }
        }
    }
}
