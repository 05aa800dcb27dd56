//! Issue-tracker integration.
//!
//! - [`jira`] - [`IssueTracker`] over the Jira REST API
//! - [`lookup`] - cache-first lookups of boards, users, issue types and fields

mod jira;
mod lookup;

pub use jira::JiraClient;
pub use lookup::{
    board_for_project, issue_types_for_project, normalize_key, project_keys, refresh_boards,
    sprint_field_id, user_account_id,
};

use crate::config::Config;
use crate::error::{DevflowError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An issue as the workflows see it. Raw tracker payloads never leave this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    /// Summary without any leading `[Tag]`
    pub title: String,
    /// Lower-cased type name, `feat` when the tracker has none
    pub issue_type: String,
    pub description: String,
    /// Browser URL of the issue
    pub url: String,
}

/// Agile board, keyed in the cache by its normalized project key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    #[serde(rename = "type")]
    pub board_type: String,
    pub name: String,
    pub project_key: String,
}

impl Board {
    pub fn is_scrum(&self) -> bool {
        self.board_type.eq_ignore_ascii_case("scrum")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub account_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprint {
    pub id: u64,
    pub name: String,
}

/// Fields for a new issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub project_key: String,
    pub title: String,
    pub issue_type: String,
    pub assignee_id: Option<String>,
    /// Sprint custom-field id and sprint id, when the issue goes into a sprint
    pub sprint: Option<(String, u64)>,
}

/// Issue-tracker operations the workflows need.
pub trait IssueTracker {
    /// Fails with `IssueNotFound` when the key does not exist.
    fn fetch_issue(&self, key: &str) -> Result<Issue>;
    fn create_issue(&self, issue: &NewIssue) -> Result<Issue>;
    fn boards(&self) -> Result<Vec<Board>>;
    /// Users whose display name matches `query`.
    fn find_users(&self, query: &str) -> Result<Vec<User>>;
    /// Issue type names available in a project; empty when the project is unknown.
    fn issue_types(&self, project_key: &str) -> Result<Vec<String>>;
    /// Id of the custom field holding an issue's sprint.
    fn sprint_field_id(&self) -> Result<Option<String>>;
    fn active_sprint(&self, board_id: u64) -> Result<Option<Sprint>>;
}

/// Stands in for the tracker when no issue provider is configured.
/// Every call fails with the configuration problem, so optional lookups
/// degrade and critical ones report it.
#[derive(Debug, Clone)]
pub struct UnconfiguredTracker {
    reason: String,
}

impl UnconfiguredTracker {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(DevflowError::Config(self.reason.clone()))
    }
}

impl IssueTracker for UnconfiguredTracker {
    fn fetch_issue(&self, _key: &str) -> Result<Issue> {
        self.fail()
    }

    fn create_issue(&self, _issue: &NewIssue) -> Result<Issue> {
        self.fail()
    }

    fn boards(&self) -> Result<Vec<Board>> {
        self.fail()
    }

    fn find_users(&self, _query: &str) -> Result<Vec<User>> {
        self.fail()
    }

    fn issue_types(&self, _project_key: &str) -> Result<Vec<String>> {
        self.fail()
    }

    fn sprint_field_id(&self) -> Result<Option<String>> {
        self.fail()
    }

    fn active_sprint(&self, _board_id: u64) -> Result<Option<Sprint>> {
        self.fail()
    }
}

/// The tracker named by the `issue_provider` setting.
pub fn tracker_from_config(config: &Config) -> Box<dyn IssueTracker> {
    let provider = config.get_str(&["issue_provider"]).unwrap_or("jira");
    if provider != "jira" {
        return Box::new(UnconfiguredTracker::new(format!(
            "Unsupported issue provider '{}'",
            provider
        )));
    }
    match JiraClient::from_config(config) {
        Ok(client) => Box::new(client),
        Err(e) => {
            debug!(error = %e, "jira not configured");
            Box::new(UnconfiguredTracker::new(e.to_string()))
        }
    }
}

/// The first `LETTERS-DIGITS` issue key in a branch name, upper-cased.
pub fn issue_key_from_branch(branch: &str) -> Option<String> {
    let re = Regex::new(r"([A-Za-z]+)-(\d+)").unwrap();
    re.captures(branch)
        .map(|caps| format!("{}-{}", caps[1].to_uppercase(), &caps[2]))
}
