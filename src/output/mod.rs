//! Terminal output formatting for devflow.
//!
//! Functions are organized by domain:
//!
//! - [`banner`] - Workflow step banners
//! - [`messages`] - Error, warning, info and success messages
//! - [`branch`] - Branch setup and issue output
//! - [`pr`] - Pull request operation output

pub mod banner;
pub mod branch;
pub mod messages;
pub mod pr;

/// ANSI color codes for terminal output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
}

pub use colors::*;

pub use banner::{print_step_banner, BannerColor};
pub use branch::{
    print_branch_created, print_branch_reused, print_issue_created, print_issue_summary,
    print_stashed, print_switching_branch,
};
pub use messages::{print_detail, print_error, print_info, print_success, print_warning};
pub use pr::{
    print_existing_pr, print_pr_cancelled, print_pr_commits, print_pr_created, print_pr_reopened,
    print_pr_reused, print_push_success, print_pushing_branch,
};
