use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevflowError {
    #[error("Git command failed: `{command}` (exit status: {}){}", format_status(.exit_status), format_stderr(.stderr))]
    GitCommandFailed {
        command: String,
        exit_status: Option<i32>,
        stderr: String,
    },

    #[error("Current branch '{0}' is protected. Please switch to another branch or create a new one.")]
    ProtectedBranchViolation(String),

    #[error("No base branch found among remote branches. Specify one with --base")]
    NoBaseBranchFound,

    #[error("Remote lookup failed: {0}")]
    RemoteLookupFailed(String),

    #[error("Issue with key '{0}' not found")]
    IssueNotFound(String),

    #[error("Cache file is corrupt: {0}")]
    CacheCorrupt(String),

    #[error("Unable to parse repository information from remote URL: {0}")]
    InvalidRemoteUrl(String),

    #[error("No git repository found in {0} or its subdirectories")]
    NotAGitRepository(PathBuf),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl DevflowError {
    /// Build a `GitCommandFailed` from the arguments and finished process output.
    pub fn git_failed(args: &[&str], output: &std::process::Output) -> Self {
        DevflowError::GitCommandFailed {
            command: format!("git {}", args.join(" ")),
            exit_status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DevflowError>;
