//! CLI command handlers for devflow.
//!
//! # Commands
//!
//! - [`branch`] - Switch to or create a branch
//! - [`issue`] - Branch for a tracker issue
//! - [`pr`] - Push and open (or reuse) the pull request
//! - [`create_issue`] - Create a tracker issue
//! - [`flow`] - Guided issue → branch → pull request
//! - [`cache`] - Inspect or clear the cache
//! - [`config`] - Show configuration
//! - [`init`] - Create the app directory, config and default PR template

mod branch;
mod cache;
mod config;
mod create_issue;
mod flow;
mod init;
mod issue;
mod pr;

pub use branch::branch_command;
pub use cache::{cache_reset_command, cache_show_command};
pub use config::config_display_command;
pub use create_issue::create_issue_command;
pub use flow::flow_command;
pub use init::init_command;
pub use issue::issue_command;
pub use pr::pr_command;

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::browser::{Browser, NoBrowser, SystemBrowser};
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;
use crate::gh::GhCli;
use crate::git::{discover_repo, GitCli};
use crate::issues::{tracker_from_config, IssueTracker};
use crate::prompt::TerminalPrompter;
use crate::workflow::Workflow;

/// The real collaborators for a command that runs inside a repository.
pub struct Session {
    repo_dir: PathBuf,
    git: GitCli,
    host: GhCli,
    tracker: Box<dyn IssueTracker>,
    prompter: TerminalPrompter,
    browser: Box<dyn Browser>,
}

impl Session {
    /// Locate the repository from the working directory and wire up git,
    /// `gh`, the configured tracker and the terminal.
    pub fn discover(config: &Config, open_browser: bool) -> Result<Self> {
        let cwd = env::current_dir()?;
        let repo_dir = discover_repo(&cwd)?;
        debug!(repo = %repo_dir.display(), "repository found");

        let browser: Box<dyn Browser> = if open_browser {
            Box::new(SystemBrowser)
        } else {
            Box::new(NoBrowser)
        };

        Ok(Self {
            git: GitCli::in_dir(&repo_dir),
            host: GhCli::in_dir(&repo_dir),
            tracker: tracker_from_config(config),
            prompter: TerminalPrompter::new(),
            browser,
            repo_dir,
        })
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// A workflow over these collaborators and `app`.
    pub fn workflow<'a>(&'a mut self, app: &'a mut AppContext) -> Workflow<'a> {
        Workflow::new(
            &self.git,
            &self.host,
            self.tracker.as_ref(),
            &mut self.prompter,
            self.browser.as_ref(),
            app,
            &self.repo_dir,
        )
    }
}
