//! Jira REST client (blocking).

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::branch::strip_bracket_prefix;
use crate::config::Config;
use crate::error::{DevflowError, Result};

use super::{Board, Issue, IssueTracker, NewIssue, Sprint, User};

/// Description given to issues created from the command line.
const CREATED_DESCRIPTION: &str = "Issue created automatically via devflow";

#[derive(Debug, Clone)]
pub struct JiraClient {
    base_url: Url,
    email: String,
    token: String,
    http: Client,
}

impl JiraClient {
    pub fn new(base_url: Url, email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url,
            email: email.into(),
            token: token.into(),
            http: Client::new(),
        }
    }

    /// Build from the `jira.url`, `jira.email` and `jira.token` settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let raw_url = config.require_str(&["jira", "url"])?;
        let email = config.require_str(&["jira", "email"])?;
        let token = config.require_str(&["jira", "token"])?;

        let base_url = Url::parse(raw_url).map_err(|e| {
            DevflowError::Config(format!("Invalid jira.url '{}': {}", raw_url, e))
        })?;
        if !base_url
            .host_str()
            .is_some_and(|host| host.ends_with(".atlassian.net"))
        {
            warn!(url = %raw_url, "Jira URL doesn't appear to be a standard Atlassian URL");
        }

        Ok(Self::new(base_url, email, token))
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.join(path).map_err(|e| {
            DevflowError::RemoteLookupFailed(format!("Invalid Jira endpoint {}: {}", path, e))
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Perform the request. Only transport failures are errors here; the
    /// status is left to the caller.
    fn exchange(&self, request: RequestBuilder, what: &str) -> Result<(StatusCode, Value)> {
        let response = request
            .basic_auth(&self.email, Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .map_err(|e| DevflowError::RemoteLookupFailed(format!("{}: {}", what, e)))?;

        let status = response.status();
        debug!(request = what, status = status.as_u16(), "jira response");

        let body: Value = response.json().unwrap_or(Value::Null);
        Ok((status, body))
    }

    fn send(&self, request: RequestBuilder, what: &str) -> Result<Value> {
        let (status, body) = self.exchange(request, what)?;
        check_status(status, what, body)
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(path, query)?;
        self.send(self.http.get(url), path)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path, &[])?;
        self.send(self.http.post(url).json(body), path)
    }

    /// `https://host/browse/KEY`, derived from the issue's API `self` link.
    fn browse_url(&self, self_link: Option<&str>, key: &str) -> String {
        let origin = self_link
            .and_then(|link| Url::parse(link).ok())
            .unwrap_or_else(|| self.base_url.clone());
        format!(
            "{}://{}/browse/{}",
            origin.scheme(),
            origin.host_str().unwrap_or_default(),
            key
        )
    }

    fn map_issue(&self, raw: &Value) -> Issue {
        let key = raw["key"].as_str().unwrap_or_default().to_string();
        let fields = &raw["fields"];
        let summary = fields["summary"].as_str().unwrap_or_default();
        let description = fields["description"]
            .as_str()
            .filter(|d| !d.is_empty())
            .unwrap_or(summary);

        Issue {
            url: self.browse_url(raw["self"].as_str(), &key),
            title: strip_bracket_prefix(summary),
            issue_type: fields["issuetype"]["name"]
                .as_str()
                .map(str::to_lowercase)
                .unwrap_or_else(|| crate::branch::DEFAULT_BRANCH_TYPE.to_string()),
            description: description.to_string(),
            key,
        }
    }
}

/// The body of a successful response, or a `RemoteLookupFailed` carrying the
/// status and Jira's own error message.
fn check_status(status: StatusCode, what: &str, body: Value) -> Result<Value> {
    if status.is_success() {
        return Ok(body);
    }
    let message = api_error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(DevflowError::RemoteLookupFailed(format!(
        "Jira API error ({}) on {}: {}",
        status.as_u16(),
        what,
        message
    )))
}

/// Like [`check_status`], with a 404 reported as the issue being unknown.
fn issue_response(key: &str, status: StatusCode, what: &str, body: Value) -> Result<Value> {
    if status == StatusCode::NOT_FOUND {
        return Err(DevflowError::IssueNotFound(key.to_string()));
    }
    check_status(status, what, body)
}

/// `message` or the first of `errorMessages` / `errors` in a Jira error body.
fn api_error_message(body: &Value) -> Option<String> {
    if let Some(message) = body["message"].as_str() {
        return Some(message.to_string());
    }
    if let Some(first) = body["errorMessages"].as_array().and_then(|m| m.first()) {
        return first.as_str().map(str::to_string);
    }
    body["errors"]
        .as_object()
        .and_then(|errors| errors.iter().next())
        .map(|(field, message)| format!("{}: {}", field, message.as_str().unwrap_or_default()))
}

/// Payload for `POST /rest/api/2/issue`.
fn create_payload(issue: &NewIssue) -> Value {
    let mut fields = json!({
        "project": { "key": issue.project_key },
        "summary": issue.title,
        "description": CREATED_DESCRIPTION,
        "issuetype": { "name": issue.issue_type },
    });
    if let Some(account_id) = &issue.assignee_id {
        fields["assignee"] = json!({ "id": account_id });
    }
    if let Some((field_id, sprint_id)) = &issue.sprint {
        fields[field_id.as_str()] = json!(sprint_id);
    }
    json!({ "fields": fields })
}

fn parse_board(raw: &Value) -> Option<Board> {
    Some(Board {
        id: raw["id"].as_u64()?,
        board_type: raw["type"].as_str().unwrap_or_default().to_string(),
        name: raw["name"].as_str().unwrap_or_default().to_string(),
        project_key: raw["location"]["projectKey"].as_str()?.to_string(),
    })
}

impl IssueTracker for JiraClient {
    fn fetch_issue(&self, key: &str) -> Result<Issue> {
        let path = format!("/rest/api/2/issue/{}", key);
        let url = self.url(&path, &[])?;
        let (status, body) = self.exchange(self.http.get(url), &path)?;
        let raw = issue_response(key, status, &path, body)?;
        Ok(self.map_issue(&raw))
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        let created = self.post("/rest/api/2/issue", &create_payload(issue))?;
        let key = created["key"]
            .as_str()
            .ok_or_else(|| {
                DevflowError::RemoteLookupFailed("Jira did not return an issue key".to_string())
            })?
            .to_string();

        Ok(Issue {
            url: self.browse_url(created["self"].as_str(), &key),
            title: issue.title.clone(),
            issue_type: issue.issue_type.to_lowercase(),
            description: String::new(),
            key,
        })
    }

    fn boards(&self) -> Result<Vec<Board>> {
        let raw = self.get("/rest/agile/1.0/board", &[])?;
        Ok(raw["values"]
            .as_array()
            .map(|values| values.iter().filter_map(parse_board).collect())
            .unwrap_or_default())
    }

    fn find_users(&self, query: &str) -> Result<Vec<User>> {
        let raw = self.get("/rest/api/3/user/search", &[("query", query)])?;
        Ok(raw
            .as_array()
            .map(|users| {
                users
                    .iter()
                    .filter_map(|u| {
                        Some(User {
                            account_id: u["accountId"].as_str()?.to_string(),
                            display_name: u["displayName"].as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn issue_types(&self, project_key: &str) -> Result<Vec<String>> {
        let raw = self.get(
            "/rest/api/2/issue/createmeta",
            &[
                ("projectKeys", project_key),
                ("expand", "projects.issuetypes"),
            ],
        )?;
        let types = raw["projects"][0]["issuetypes"]
            .as_array()
            .map(|types| {
                types
                    .iter()
                    .filter_map(|t| t["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(types)
    }

    fn sprint_field_id(&self) -> Result<Option<String>> {
        let raw = self.get("/rest/api/2/field", &[])?;
        Ok(raw.as_array().and_then(|fields| {
            fields
                .iter()
                .find(|f| f["name"].as_str() == Some("Sprint"))
                .and_then(|f| f["id"].as_str().map(str::to_string))
        }))
    }

    fn active_sprint(&self, board_id: u64) -> Result<Option<Sprint>> {
        let path = format!("/rest/agile/1.0/board/{}/sprint", board_id);
        let raw = self.get(&path, &[("state", "active")])?;
        let first = &raw["values"][0];
        Ok(first["id"].as_u64().map(|id| Sprint {
            id,
            name: first["name"].as_str().unwrap_or_default().to_string(),
        }))
    }
}
