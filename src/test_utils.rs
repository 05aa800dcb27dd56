//! Test utilities shared across modules.
//!
//! In-memory stand-ins for every collaborator the workflows talk to, plus a
//! [`Harness`] that owns one of each and builds a [`Workflow`] over them.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

use tempfile::TempDir;

use crate::browser::Browser;
use crate::cache::Cache;
use crate::config::Config;
use crate::context::AppContext;
use crate::error::{DevflowError, Result};
use crate::gh::{CodeHost, CommitSummary, NewPullRequest, PrState, PullRequestRecord};
use crate::git::{Git, PushMode, RepoInfo};
use crate::issues::{Board, Issue, IssueTracker, NewIssue, Sprint, User};
use crate::prompt::Prompter;
use crate::workflow::Workflow;

fn git_error(command: &str, stderr: &str) -> DevflowError {
    DevflowError::GitCommandFailed {
        command: command.to_string(),
        exit_status: Some(1),
        stderr: stderr.to_string(),
    }
}

// ============================================================================
// Git
// ============================================================================

/// Calls that change the repository.
const MUTATIONS: &[&str] = &[
    "checkout",
    "create_branch",
    "stash",
    "pull",
    "push",
    "commit",
    "abort_rebase",
];

/// [`Git`] over an in-memory repository description. Records every call.
pub struct FakeGit {
    current: RefCell<String>,
    local: RefCell<Vec<String>>,
    remote: Vec<String>,
    dirty: Cell<bool>,
    distances: HashMap<String, usize>,
    recent: Vec<String>,
    main: String,
    remote_url: String,
    rejected_pushes: Vec<PushMode>,
    pull_fails: bool,
    calls: RefCell<Vec<String>>,
}

impl FakeGit {
    /// Clean repository with a single local branch, checked out.
    pub fn on(current: &str) -> Self {
        Self {
            current: RefCell::new(current.to_string()),
            local: RefCell::new(vec![current.to_string()]),
            remote: Vec::new(),
            dirty: Cell::new(false),
            distances: HashMap::new(),
            recent: Vec::new(),
            main: "main".to_string(),
            remote_url: "git@github.com:acme/widgets.git".to_string(),
            rejected_pushes: Vec::new(),
            pull_fails: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_local(self, branches: &[&str]) -> Self {
        self.local
            .borrow_mut()
            .extend(branches.iter().map(|b| b.to_string()));
        self
    }

    /// Remote-tracking branches in short form, e.g. `origin/develop`.
    pub fn with_remote(mut self, branches: &[&str]) -> Self {
        self.remote.extend(branches.iter().map(|b| b.to_string()));
        self
    }

    pub fn with_distance(mut self, branch: &str, distance: usize) -> Self {
        self.distances.insert(branch.to_string(), distance);
        self
    }

    pub fn with_recent(mut self, branches: &[&str]) -> Self {
        self.recent = branches.iter().map(|b| b.to_string()).collect();
        self
    }

    pub fn with_main(mut self, main: &str) -> Self {
        self.main = main.to_string();
        self
    }

    pub fn with_remote_url(mut self, url: &str) -> Self {
        self.remote_url = url.to_string();
        self
    }

    pub fn dirty(self) -> Self {
        self.dirty.set(true);
        self
    }

    /// Pushes in these modes are rejected by the remote.
    pub fn rejecting(mut self, modes: &[PushMode]) -> Self {
        self.rejected_pushes = modes.to_vec();
        self
    }

    pub fn failing_pull(mut self) -> Self {
        self.pull_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Only the calls that would change the repository.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                let verb = c.split_whitespace().next().unwrap_or_default();
                MUTATIONS.contains(&verb)
            })
            .collect()
    }

    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn has_remote(&self, name: &str) -> bool {
        self.remote.iter().any(|r| r == &format!("origin/{}", name))
    }
}

impl Git for FakeGit {
    fn current_branch(&self) -> Result<String> {
        self.record("current_branch");
        Ok(self.current())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        self.record(format!("branch_exists {}", name));
        Ok(self.local.borrow().iter().any(|b| b == name))
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool> {
        self.record(format!("remote_branch_exists {}", name));
        Ok(self.has_remote(name))
    }

    fn remote_branches(&self) -> Result<Vec<String>> {
        self.record("remote_branches");
        Ok(self.remote.clone())
    }

    fn changes_pending(&self) -> Result<bool> {
        self.record("changes_pending");
        Ok(self.dirty.get())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.record(format!("checkout {}", name));
        let known = self.local.borrow().iter().any(|b| b == name) || self.has_remote(name);
        if !known {
            return Err(git_error(
                &format!("git checkout {}", name),
                "pathspec did not match",
            ));
        }
        if !self.local.borrow().iter().any(|b| b == name) {
            self.local.borrow_mut().push(name.to_string());
        }
        *self.current.borrow_mut() = name.to_string();
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.record(format!("create_branch {}", name));
        if self.local.borrow().iter().any(|b| b == name) {
            return Err(git_error(
                &format!("git checkout -b {}", name),
                "already exists",
            ));
        }
        self.local.borrow_mut().push(name.to_string());
        *self.current.borrow_mut() = name.to_string();
        Ok(())
    }

    fn stash(&self, message: &str) -> Result<()> {
        self.record(format!("stash {}", message));
        self.dirty.set(false);
        Ok(())
    }

    fn pull(&self, rebase: bool) -> Result<()> {
        self.record(if rebase { "pull --rebase" } else { "pull" });
        if self.pull_fails {
            return Err(git_error("git pull --rebase", "CONFLICT (content)"));
        }
        Ok(())
    }

    fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        match mode.flag() {
            Some(flag) => self.record(format!("push {} {}", flag, branch)),
            None => self.record(format!("push {}", branch)),
        }
        if self.rejected_pushes.contains(&mode) {
            return Err(git_error("git push", "rejected (non-fast-forward)"));
        }
        Ok(())
    }

    fn commit(&self, message: &str, allow_empty: bool) -> Result<()> {
        let flag = if allow_empty { " --allow-empty" } else { "" };
        self.record(format!("commit{} {}", flag, message));
        Ok(())
    }

    fn abort_rebase(&self) -> Result<()> {
        self.record("abort_rebase");
        Ok(())
    }

    fn merge_base_distance(&self, branch: &str) -> Result<Option<usize>> {
        self.record(format!("merge_base_distance {}", branch));
        Ok(self.distances.get(branch).copied())
    }

    fn remote_url(&self) -> Result<String> {
        self.record("remote_url");
        Ok(self.remote_url.clone())
    }

    fn main_branch(&self) -> Result<String> {
        self.record("main_branch");
        Ok(self.main.clone())
    }

    fn recent_branches(&self) -> Result<Vec<String>> {
        self.record("recent_branches");
        Ok(self.recent.clone())
    }
}

// ============================================================================
// Prompter
// ============================================================================

/// [`Prompter`] that replays canned answers in order and panics when it runs out.
///
/// `yes_no` reads `y`/`n`; `select` and `ask` return the answer verbatim, or
/// the default when the answer is empty.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            questions: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, question: &str) -> String {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {question}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str, default: Option<&str>) -> String {
        let answer = self.next(question);
        if answer.is_empty() {
            default.unwrap_or_default().to_string()
        } else {
            answer
        }
    }

    fn select(&mut self, question: &str, options: &[String], default: Option<&str>) -> String {
        let answer = self.next(question);
        if answer.is_empty() {
            return default
                .map(str::to_string)
                .or_else(|| options.first().cloned())
                .unwrap_or_default();
        }
        answer
    }

    fn yes_no(&mut self, question: &str, default: bool) -> bool {
        match self.next(question).as_str() {
            "y" => true,
            "n" => false,
            _ => default,
        }
    }
}

// ============================================================================
// Code host
// ============================================================================

pub fn pull_request(number: u64, state: PrState, branch: &str) -> PullRequestRecord {
    PullRequestRecord {
        number,
        state,
        title: format!("PR {}", number),
        url: format!("https://github.com/acme/widgets/pull/{}", number),
        head_ref: branch.to_string(),
        base_ref: "main".to_string(),
    }
}

/// [`CodeHost`] holding at most one pull request.
#[derive(Debug, Default)]
pub struct FakeHost {
    existing: RefCell<Option<PullRequestRecord>>,
    created: RefCell<Vec<NewPullRequest>>,
    calls: RefCell<Vec<String>>,
    unavailable: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pull_request(self, pr: PullRequestRecord) -> Self {
        *self.existing.borrow_mut() = Some(pr);
        self
    }

    /// Every call fails with `RemoteLookupFailed`.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn created(&self) -> Vec<NewPullRequest> {
        self.created.borrow().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.borrow_mut().push(call);
        if self.unavailable {
            return Err(DevflowError::RemoteLookupFailed(
                "code host unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl CodeHost for FakeHost {
    fn find_pull_request(
        &self,
        repo: &RepoInfo,
        branch: &str,
    ) -> Result<Option<PullRequestRecord>> {
        self.record(format!("find {} {}", repo.slug(), branch))?;
        Ok(self
            .existing
            .borrow()
            .clone()
            .filter(|pr| pr.head_ref == branch))
    }

    fn create_pull_request(
        &self,
        repo: &RepoInfo,
        request: &NewPullRequest,
    ) -> Result<PullRequestRecord> {
        self.record(format!("create {} {}", repo.slug(), request.head))?;
        self.created.borrow_mut().push(request.clone());
        let pr = PullRequestRecord {
            number: 100,
            state: PrState::Open,
            title: request.title.clone(),
            url: "https://github.com/acme/widgets/pull/100".to_string(),
            head_ref: request.head.clone(),
            base_ref: request.base.clone(),
        };
        *self.existing.borrow_mut() = Some(pr.clone());
        Ok(pr)
    }

    fn reopen_pull_request(&self, repo: &RepoInfo, number: u64) -> Result<PullRequestRecord> {
        self.record(format!("reopen {} {}", repo.slug(), number))?;
        let mut existing = self.existing.borrow_mut();
        let pr = existing
            .as_mut()
            .filter(|pr| pr.number == number)
            .ok_or_else(|| DevflowError::RemoteLookupFailed(format!("no PR #{}", number)))?;
        pr.state = PrState::Open;
        Ok(pr.clone())
    }

    fn pull_request_commits(&self, repo: &RepoInfo, number: u64) -> Result<Vec<CommitSummary>> {
        self.record(format!("commits {} {}", repo.slug(), number))?;
        Ok(vec![CommitSummary {
            oid: "0123456789abcdef".to_string(),
            headline: "Initial commit".to_string(),
        }])
    }
}

// ============================================================================
// Issue tracker
// ============================================================================

pub fn board(id: u64, board_type: &str, project_key: &str) -> Board {
    Board {
        id,
        board_type: board_type.to_string(),
        name: format!("{} board", project_key),
        project_key: project_key.to_string(),
    }
}

pub fn issue(key: &str, title: &str, issue_type: &str) -> Issue {
    Issue {
        key: key.to_string(),
        title: title.to_string(),
        issue_type: issue_type.to_string(),
        description: format!("Details for {}", key),
        url: format!("https://acme.atlassian.net/browse/{}", key),
    }
}

/// [`IssueTracker`] over fixed data. Counts calls per operation.
#[derive(Debug, Default)]
pub struct FakeTracker {
    issues: HashMap<String, Issue>,
    boards: Vec<Board>,
    users: Vec<User>,
    issue_types: Vec<String>,
    sprint_field: Option<String>,
    sprint: Option<Sprint>,
    created: RefCell<Vec<NewIssue>>,
    calls: RefCell<Vec<String>>,
    unavailable: bool,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.issues.insert(issue.key.clone(), issue);
        self
    }

    pub fn with_boards(mut self, boards: Vec<Board>) -> Self {
        self.boards = boards;
        self
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_issue_types(mut self, types: &[&str]) -> Self {
        self.issue_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_sprint_field(mut self, id: &str) -> Self {
        self.sprint_field = Some(id.to_string());
        self
    }

    pub fn with_active_sprint(mut self, id: u64) -> Self {
        self.sprint = Some(Sprint {
            id,
            name: format!("Sprint {}", id),
        });
        self
    }

    /// Every call fails with `RemoteLookupFailed`.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    pub fn created(&self) -> Vec<NewIssue> {
        self.created.borrow().clone()
    }

    fn record(&self, operation: &str) -> Result<()> {
        self.calls.borrow_mut().push(operation.to_string());
        if self.unavailable {
            return Err(DevflowError::RemoteLookupFailed(
                "tracker unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl IssueTracker for FakeTracker {
    fn fetch_issue(&self, key: &str) -> Result<Issue> {
        self.record("fetch_issue")?;
        self.issues
            .get(key)
            .cloned()
            .ok_or_else(|| DevflowError::IssueNotFound(key.to_string()))
    }

    fn create_issue(&self, new: &NewIssue) -> Result<Issue> {
        self.record("create_issue")?;
        self.created.borrow_mut().push(new.clone());
        let key = format!("{}-{}", new.project_key, 100 + self.created.borrow().len());
        Ok(Issue {
            url: format!("https://acme.atlassian.net/browse/{}", key),
            title: new.title.clone(),
            issue_type: new.issue_type.to_lowercase(),
            description: String::new(),
            key,
        })
    }

    fn boards(&self) -> Result<Vec<Board>> {
        self.record("boards")?;
        Ok(self.boards.clone())
    }

    fn find_users(&self, _query: &str) -> Result<Vec<User>> {
        self.record("find_users")?;
        Ok(self.users.clone())
    }

    fn issue_types(&self, _project_key: &str) -> Result<Vec<String>> {
        self.record("issue_types")?;
        Ok(self.issue_types.clone())
    }

    fn sprint_field_id(&self) -> Result<Option<String>> {
        self.record("sprint_field_id")?;
        Ok(self.sprint_field.clone())
    }

    fn active_sprint(&self, _board_id: u64) -> Result<Option<Sprint>> {
        self.record("active_sprint")?;
        Ok(self.sprint.clone())
    }
}

// ============================================================================
// Browser
// ============================================================================

#[derive(Debug, Default)]
pub struct RecordingBrowser {
    opened: RefCell<Vec<String>>,
    failing: bool,
}

impl RecordingBrowser {
    pub fn failing() -> Self {
        Self {
            opened: RefCell::new(Vec::new()),
            failing: true,
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl Browser for RecordingBrowser {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        if self.failing {
            return Err(DevflowError::Io(std::io::Error::other("no browser")));
        }
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// One of each fake plus a scratch app directory holding config and cache.
pub struct Harness {
    pub dir: TempDir,
    pub app: AppContext,
    pub git: FakeGit,
    pub host: FakeHost,
    pub tracker: FakeTracker,
    pub prompter: ScriptedPrompter,
    pub browser: RecordingBrowser,
}

impl Harness {
    pub fn new(git: FakeGit) -> Self {
        Self::with_config(git, Config::default())
    }

    pub fn with_config(git: FakeGit, config: Config) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let cache = Cache::open(dir.path().join("tmp/cache.json"));
        let app = AppContext::new(config, cache, Some(dir.path().to_path_buf()));
        Self {
            dir,
            app,
            git,
            host: FakeHost::new(),
            tracker: FakeTracker::new(),
            prompter: ScriptedPrompter::default(),
            browser: RecordingBrowser::default(),
        }
    }

    pub fn answers(mut self, answers: &[&str]) -> Self {
        self.prompter = ScriptedPrompter::new(answers);
        self
    }

    pub fn host(mut self, host: FakeHost) -> Self {
        self.host = host;
        self
    }

    pub fn tracker(mut self, tracker: FakeTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn browser(mut self, browser: RecordingBrowser) -> Self {
        self.browser = browser;
        self
    }

    pub fn repo_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Run `f` against a workflow wired to this harness.
    pub fn run<T>(&mut self, f: impl FnOnce(&mut Workflow<'_>) -> T) -> T {
        let mut workflow = Workflow::new(
            &self.git,
            &self.host,
            &self.tracker,
            &mut self.prompter,
            &self.browser,
            &mut self.app,
            self.dir.path(),
        );
        f(&mut workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_git_tracks_mutations_separately() {
        let git = FakeGit::on("main").with_local(&["feat/x"]);
        git.current_branch().unwrap();
        git.checkout("feat/x").unwrap();
        assert_eq!(git.mutations(), vec!["checkout feat/x"]);
        assert_eq!(git.current(), "feat/x");
    }

    #[test]
    fn test_scripted_prompter_replays_answers() {
        let mut prompter = ScriptedPrompter::new(&["y", "", "KRAFT"]);
        assert!(prompter.yes_no("Proceed?", false));
        assert_eq!(prompter.ask("Name?", Some("fallback")), "fallback");
        assert_eq!(prompter.select("Project?", &[], None), "KRAFT");
        assert_eq!(prompter.remaining(), 0);
        assert_eq!(prompter.questions().len(), 3);
    }

    #[test]
    #[should_panic(expected = "unexpected prompt")]
    fn test_scripted_prompter_panics_when_exhausted() {
        ScriptedPrompter::default().yes_no("Anything?", true);
    }
}
