//! Branch setup and issue output.

use super::colors::*;
use crate::issues::Issue;

/// Print a message when local changes were stashed before switching.
pub fn print_stashed(message: &str) {
    println!("{YELLOW}Stashed local changes:{RESET} {}", message);
}

/// Print a message when switching to a different branch.
pub fn print_switching_branch(from_branch: &str, to_branch: &str) {
    println!(
        "{CYAN}Switching{RESET} from {GRAY}{}{RESET} to {CYAN}{}{RESET}...",
        from_branch, to_branch
    );
}

pub fn print_branch_reused(branch: &str, pulled: bool) {
    let note = if pulled { "" } else { " (not pulled)" };
    println!("{GREEN}Now on existing branch:{RESET} {}{GRAY}{}{RESET}", branch, note);
}

pub fn print_branch_created(branch: &str, base: &str, commit_message: &str) {
    println!(
        "{GREEN}Created branch{RESET} {BOLD}{}{RESET} from {CYAN}{}{RESET}",
        branch, base
    );
    println!("  {GRAY}Initial commit:{RESET} {}", commit_message);
}

/// Print the key facts of an issue.
pub fn print_issue_summary(issue: &Issue) {
    println!();
    println!("{BLUE}Issue:{RESET} {BOLD}{}{RESET} {}", issue.key, issue.title);
    println!("  {GRAY}Type:{RESET} {}", issue.issue_type);
    println!("  {GRAY}URL:{RESET}  {}", issue.url);
    println!();
}

pub fn print_issue_created(issue: &Issue, placement: &str) {
    println!();
    println!("{GREEN}{BOLD}✓ Issue created:{RESET} {BOLD}{}{RESET}", issue.key);
    println!("  {GRAY}URL:{RESET} {}", issue.url);
    println!("  {GRAY}{}{RESET}", placement);
    println!();
}
