use crate::branch::is_protected;
use crate::error::{DevflowError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use tracing::debug;

/// Host `gh` assumes when `--repo` carries no host.
const DEFAULT_HOST: &str = "github.com";

/// Repository coordinates parsed from the `origin` remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    /// Host of the remote, e.g. `github.com`
    pub host_provider: String,
    pub owner: String,
    pub repo: String,
}

impl RepoInfo {
    /// Parse an SSH (`git@host:owner/repo.git`) or HTTPS
    /// (`https://host/owner/repo.git`) remote URL.
    pub fn parse(remote_url: &str) -> Result<Self> {
        static SSH: OnceLock<Regex> = OnceLock::new();
        static HTTPS: OnceLock<Regex> = OnceLock::new();

        let ssh = SSH.get_or_init(|| {
            Regex::new(r"^git@([^:]+):([^/]+)/(.+?)(?:\.git)?/?$").expect("valid regex")
        });
        let https = HTTPS.get_or_init(|| {
            Regex::new(r"^https?://(?:[^@/]+@)?([^/]+)/([^/]+)/(.+?)(?:\.git)?/?$")
                .expect("valid regex")
        });

        let url = remote_url.trim();
        let caps = ssh
            .captures(url)
            .or_else(|| https.captures(url))
            .ok_or_else(|| DevflowError::InvalidRemoteUrl(url.to_string()))?;

        Ok(RepoInfo {
            host_provider: caps[1].to_string(),
            owner: caps[2].to_string(),
            repo: caps[3].to_string(),
        })
    }

    /// The `gh --repo` selector: `owner/repo` on github.com,
    /// `host/owner/repo` on any other host.
    pub fn slug(&self) -> String {
        if self.host_provider == DEFAULT_HOST {
            format!("{}/{}", self.owner, self.repo)
        } else {
            format!("{}/{}/{}", self.host_provider, self.owner, self.repo)
        }
    }
}

/// Live facts about a branch. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchState {
    pub name: String,
    pub exists_locally: bool,
    pub exists_remotely: bool,
    pub is_current: bool,
    pub is_protected: bool,
}

/// How hard a push is allowed to overwrite the remote branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    Normal,
    ForceWithLease,
    Force,
}

impl PushMode {
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            PushMode::Normal => None,
            PushMode::ForceWithLease => Some("--force-with-lease"),
            PushMode::Force => Some("--force"),
        }
    }
}

/// Git plumbing used by the workflows.
///
/// Every method blocks until the underlying command finishes. Failures are
/// reported as [`DevflowError::GitCommandFailed`]; nothing is retried here.
pub trait Git {
    fn current_branch(&self) -> Result<String>;
    fn branch_exists(&self, name: &str) -> Result<bool>;
    fn remote_branch_exists(&self, name: &str) -> Result<bool>;
    /// Remote-tracking branches in short form (`origin/feature`), in `git branch -r` order.
    fn remote_branches(&self) -> Result<Vec<String>>;
    fn changes_pending(&self) -> Result<bool>;
    fn checkout(&self, name: &str) -> Result<()>;
    /// Create `name` from the current HEAD and switch to it.
    fn create_branch(&self, name: &str) -> Result<()>;
    fn stash(&self, message: &str) -> Result<()>;
    fn pull(&self, rebase: bool) -> Result<()>;
    fn push(&self, branch: &str, mode: PushMode) -> Result<()>;
    fn commit(&self, message: &str, allow_empty: bool) -> Result<()>;
    fn abort_rebase(&self) -> Result<()>;
    /// Commits on HEAD not reachable from the merge-base with `branch`.
    /// `None` when the histories share no merge-base.
    fn merge_base_distance(&self, branch: &str) -> Result<Option<usize>>;
    fn remote_url(&self) -> Result<String>;
    fn main_branch(&self) -> Result<String>;
    fn recent_branches(&self) -> Result<Vec<String>>;

    fn repo_info(&self) -> Result<RepoInfo> {
        RepoInfo::parse(&self.remote_url()?)
    }

    fn branch_state(&self, name: &str) -> Result<BranchState> {
        Ok(BranchState {
            name: name.to_string(),
            exists_locally: self.branch_exists(name)?,
            exists_remotely: self.remote_branch_exists(name)?,
            is_current: self.current_branch()? == name,
            is_protected: is_protected(name),
        })
    }
}

/// [`Git`] implementation that shells out to the `git` binary.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    /// Directory commands run in; the process working directory when `None`.
    dir: Option<PathBuf>,
}

impl GitCli {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        let output = self.command(args).output()?;
        debug!(
            command = %format!("git {}", args.join(" ")),
            status = ?output.status.code(),
            "git command finished"
        );
        Ok(output)
    }

    /// Run a command that must succeed.
    fn run(&self, args: &[&str]) -> Result<Output> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(DevflowError::git_failed(args, &output));
        }
        Ok(output)
    }

    /// Run a command that must succeed and return its trimmed stdout.
    fn read(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a command whose exit status is the answer.
    fn succeeds(&self, args: &[&str]) -> Result<bool> {
        Ok(self.output(args)?.status.success())
    }

    fn lines(&self, args: &[&str]) -> Result<Vec<String>> {
        Ok(self
            .read(args)?
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

/// True for remote listing entries that are not real branches
/// (`origin/HEAD`, or the bare `origin` newer gits print for it).
pub fn is_remote_head_entry(branch: &str) -> bool {
    branch.contains("HEAD") || !branch.contains('/')
}

impl Git for GitCli {
    fn current_branch(&self) -> Result<String> {
        self.read(&["branch", "--show-current"])
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        let reference = format!("refs/heads/{}", name);
        self.succeeds(&["show-ref", "--verify", "--quiet", &reference])
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        let reference = format!("refs/remotes/origin/{}", name);
        self.succeeds(&["show-ref", "--verify", "--quiet", &reference])
    }

    fn remote_branches(&self) -> Result<Vec<String>> {
        self.lines(&["branch", "-r", "--format=%(refname:short)"])
    }

    fn changes_pending(&self) -> Result<bool> {
        let output = self.run(&["status", "--porcelain"])?;
        Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.run(&["checkout", name]).map(|_| ())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.run(&["checkout", "-b", name]).map(|_| ())
    }

    fn stash(&self, message: &str) -> Result<()> {
        self.run(&["stash", "push", "--include-untracked", "-m", message])
            .map(|_| ())
    }

    fn pull(&self, rebase: bool) -> Result<()> {
        if rebase {
            self.run(&["pull", "--rebase"]).map(|_| ())
        } else {
            self.run(&["pull"]).map(|_| ())
        }
    }

    fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        let mut args = vec!["push"];
        if let Some(flag) = mode.flag() {
            args.push(flag);
        }
        args.extend(["--set-upstream", "origin", branch]);
        self.run(&args).map(|_| ())
    }

    fn commit(&self, message: &str, allow_empty: bool) -> Result<()> {
        self.run(&["add", "--all"])?;
        let mut args = vec!["commit", "-m", message];
        if allow_empty {
            args.push("--allow-empty");
        }
        self.run(&args).map(|_| ())
    }

    fn abort_rebase(&self) -> Result<()> {
        self.run(&["rebase", "--abort"]).map(|_| ())
    }

    fn merge_base_distance(&self, branch: &str) -> Result<Option<usize>> {
        let output = self.output(&["merge-base", "HEAD", branch])?;
        let merge_base = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() || merge_base.is_empty() {
            return Ok(None);
        }

        let range = format!("{}..HEAD", merge_base);
        let count = self.read(&["rev-list", "--count", &range])?;
        Ok(count.parse::<usize>().ok())
    }

    fn remote_url(&self) -> Result<String> {
        self.read(&["config", "--get", "remote.origin.url"])
    }

    fn main_branch(&self) -> Result<String> {
        let output = self.output(&["symbolic-ref", "refs/remotes/origin/HEAD"])?;
        let head = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() && !head.is_empty() {
            if let Some(name) = head.strip_prefix("refs/remotes/origin/") {
                return Ok(name.to_string());
            }
        }

        let remotes = self.remote_branches().unwrap_or_default();
        if remotes.iter().any(|b| b == "origin/main") {
            return Ok("main".to_string());
        }
        if remotes.iter().any(|b| b == "origin/master") {
            return Ok("master".to_string());
        }

        let current = self.current_branch().unwrap_or_default();
        if current.is_empty() {
            Ok("main".to_string())
        } else {
            Ok(current)
        }
    }

    fn recent_branches(&self) -> Result<Vec<String>> {
        let local = self.lines(&[
            "for-each-ref",
            "--sort=-committerdate",
            "refs/heads/",
            "--format=%(refname:short)",
            "--count=10",
        ])?;

        let remote = self.lines(&[
            "for-each-ref",
            "--sort=-committerdate",
            "refs/remotes/",
            "--format=%(refname:short)",
        ])?;

        let mut branches = local;
        for entry in remote {
            if is_remote_head_entry(&entry) {
                continue;
            }
            let name = entry.strip_prefix("origin/").unwrap_or(&entry).to_string();
            if self.branch_exists(&name)? {
                branches.push(name);
            }
        }

        branches.sort();
        branches.dedup();
        Ok(branches)
    }
}

/// Find the git repository to work in: `dir` itself, or the first immediate
/// subdirectory (in name order) that contains a `.git` entry.
pub fn discover_repo(dir: &Path) -> Result<PathBuf> {
    if dir.join(".git").exists() {
        return Ok(dir.to_path_buf());
    }

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();

    subdirs
        .into_iter()
        .find(|path| path.join(".git").exists())
        .ok_or_else(|| DevflowError::NotAGitRepository(dir.to_path_buf()))
}
