//! Pull request operation output.

use super::colors::*;
use crate::gh::{CommitSummary, PullRequestRecord};

fn print_panel(color: &str, icon: &str, title: &str, pr: &PullRequestRecord) {
    let label = format!("{} {}", icon, title);
    println!();
    println!("{color}{BOLD}╔════════════════════════════════════════════════════════╗{RESET}");
    println!("{color}{BOLD}║  {:<54}║{RESET}", label);
    println!("{color}{BOLD}╚════════════════════════════════════════════════════════╝{RESET}");
    println!();
    println!("{color}{BOLD}  {}{RESET}", pr.url);
    println!("  {GRAY}#{} {}{RESET}", pr.number, pr.title);
    println!();
}

/// Print a prominent success message for a created PR.
pub fn print_pr_created(pr: &PullRequestRecord) {
    print_panel(GREEN, "✓", "Pull Request Created", pr);
}

/// Print a prominent message when an open PR already exists for the branch.
pub fn print_pr_reused(pr: &PullRequestRecord) {
    print_panel(CYAN, "ℹ", "Pull Request Already Exists", pr);
}

pub fn print_pr_reopened(pr: &PullRequestRecord) {
    print_panel(GREEN, "✓", "Pull Request Reopened", pr);
}

/// Print a found-but-not-open PR before asking what to do with it.
pub fn print_existing_pr(pr: &PullRequestRecord) {
    println!(
        "{YELLOW}Found existing Pull Request #{} ({}){RESET}",
        pr.number, pr.state
    );
    println!("  {GRAY}Title:{RESET} {}", pr.title);
    println!("  {GRAY}URL:{RESET}   {}", pr.url);
}

pub fn print_pr_cancelled(reason: &str) {
    println!("{GRAY}Pull request step cancelled: {}{RESET}", reason);
}

/// Print a status message when pushing branch to remote.
pub fn print_pushing_branch(branch: &str, flag: Option<&str>) {
    match flag {
        Some(flag) => println!("{CYAN}Pushing branch '{}' with {}...{RESET}", branch, flag),
        None => println!("{CYAN}Pushing branch '{}'...{RESET}", branch),
    }
}

/// Print a success message when branch push completes.
pub fn print_push_success() {
    println!("{GREEN}Branch pushed successfully.{RESET}");
}

/// Print the commits of a PR, newest last, at most `max_display`.
pub fn print_pr_commits(commits: &[CommitSummary], max_display: usize) {
    println!("{BLUE}Commits:{RESET} {}", commits.len());
    for commit in commits.iter().take(max_display) {
        let short = commit.oid.get(..7).unwrap_or(&commit.oid);
        println!("  {GRAY}{}{RESET} {}", short, commit.headline);
    }
    if commits.len() > max_display {
        println!("  {DIM}... and {} more{RESET}", commits.len() - max_display);
    }
}
