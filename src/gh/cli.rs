//! [`CodeHost`] implementation that drives the `gh` binary.

use std::path::PathBuf;
use std::process::{Command, Output};

use serde::Deserialize;
use tracing::debug;

use crate::error::{DevflowError, Result};
use crate::git::RepoInfo;

use super::types::{CommitSummary, NewPullRequest, PrState, PullRequestRecord};
use super::CodeHost;

const PR_FIELDS: &str = "number,state,title,url,headRefName,baseRefName";

/// Pull request JSON as printed by `gh ... --json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhPullRequest {
    number: u64,
    state: PrState,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    head_ref_name: String,
    #[serde(default)]
    base_ref_name: String,
}

impl From<GhPullRequest> for PullRequestRecord {
    fn from(pr: GhPullRequest) -> Self {
        PullRequestRecord {
            number: pr.number,
            state: pr.state,
            title: pr.title,
            url: pr.url,
            head_ref: pr.head_ref_name,
            base_ref: pr.base_ref_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhCommits {
    #[serde(default)]
    commits: Vec<GhCommit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhCommit {
    oid: String,
    #[serde(default)]
    message_headline: String,
}

#[derive(Debug, Clone, Default)]
pub struct GhCli {
    dir: Option<PathBuf>,
}

impl GhCli {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new("gh");
        cmd.args(args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| {
            DevflowError::RemoteLookupFailed(format!(
                "GitHub CLI (gh) could not be started: {}. Install from https://cli.github.com",
                e
            ))
        })?;
        debug!(
            command = %format!("gh {}", args.join(" ")),
            status = ?output.status.code(),
            "gh command finished"
        );
        Ok(output)
    }

    /// Run `gh` and return stdout, mapping a non-zero exit to `RemoteLookupFailed`.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DevflowError::RemoteLookupFailed(format!(
                "`gh {}` failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn view(&self, repo: &RepoInfo, selector: &str) -> Result<PullRequestRecord> {
        let slug = repo.slug();
        let stdout = self.run(&["pr", "view", selector, "--repo", &slug, "--json", PR_FIELDS])?;
        parse_pull_request(&stdout)
    }
}

fn parse_pull_request(json: &str) -> Result<PullRequestRecord> {
    let pr: GhPullRequest = serde_json::from_str(json)?;
    Ok(pr.into())
}

/// First pull request in a `gh pr list --json` array.
fn parse_pull_request_list(json: &str) -> Result<Option<PullRequestRecord>> {
    if json.is_empty() {
        return Ok(None);
    }
    let prs: Vec<GhPullRequest> = serde_json::from_str(json)?;
    Ok(prs.into_iter().next().map(PullRequestRecord::from))
}

/// The pull request URL printed by `gh pr create`.
pub fn extract_pr_url(output: &str) -> Option<String> {
    for line in output.lines().rev() {
        let line = line.trim();
        if line.starts_with("https://") && line.contains("/pull/") {
            return Some(line.to_string());
        }
    }

    for word in output.split_whitespace().rev() {
        if word.starts_with("https://") && word.contains("/pull/") {
            let url = word.trim_end_matches(|c: char| !c.is_alphanumeric());
            return Some(url.to_string());
        }
    }

    None
}

impl CodeHost for GhCli {
    fn find_pull_request(
        &self,
        repo: &RepoInfo,
        branch: &str,
    ) -> Result<Option<PullRequestRecord>> {
        let slug = repo.slug();
        let stdout = self.run(&[
            "pr", "list", "--repo", &slug, "--head", branch, "--state", "all", "--limit", "1",
            "--json", PR_FIELDS,
        ])?;
        parse_pull_request_list(&stdout)
    }

    fn create_pull_request(
        &self,
        repo: &RepoInfo,
        request: &NewPullRequest,
    ) -> Result<PullRequestRecord> {
        let slug = repo.slug();
        let stdout = self.run(&[
            "pr",
            "create",
            "--repo",
            &slug,
            "--title",
            &request.title,
            "--head",
            &request.head,
            "--base",
            &request.base,
            "--body",
            &request.body,
        ])?;

        let selector = extract_pr_url(&stdout).unwrap_or_else(|| request.head.clone());
        self.view(repo, &selector)
    }

    fn reopen_pull_request(&self, repo: &RepoInfo, number: u64) -> Result<PullRequestRecord> {
        let slug = repo.slug();
        let number = number.to_string();
        self.run(&["pr", "reopen", &number, "--repo", &slug])?;
        self.view(repo, &number)
    }

    fn pull_request_commits(&self, repo: &RepoInfo, number: u64) -> Result<Vec<CommitSummary>> {
        let slug = repo.slug();
        let number = number.to_string();
        let stdout = self.run(&["pr", "view", &number, "--repo", &slug, "--json", "commits"])?;
        let parsed: GhCommits = serde_json::from_str(&stdout)?;
        Ok(parsed
            .commits
            .into_iter()
            .map(|c| CommitSummary {
                oid: c.oid,
                headline: c.message_headline,
            })
            .collect())
    }
}
