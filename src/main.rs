//! devflow CLI entry point.
//!
//! Parses command-line arguments and dispatches to the appropriate command handler.

use clap::{Parser, Subcommand};
use devflow::commands::{
    branch_command, cache_reset_command, cache_show_command, config_display_command,
    create_issue_command, flow_command, init_command, issue_command, pr_command, Session,
};
use devflow::output::{print_error, print_warning};
use devflow::workflow::{IssueRequest, PullRecovery};
use devflow::{AppContext, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "devflow")]
#[command(
    version,
    about = "Issue → branch → pull request, without the busywork",
    after_help = "EXAMPLES:
    # Guided flow: pick or create an issue, branch, open the PR
    devflow flow

    # Branch for an existing Jira issue
    devflow issue KRAFT-42

    # Create or switch to a branch, forking from develop
    devflow branch feat/KRAFT-42-add-login --base develop

    # Push the current branch and open its pull request
    devflow pr"
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Never open URLs in a browser
    #[arg(long, global = true)]
    no_browser: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Switch to a branch, creating it when it does not exist
    #[command(after_help = "EXAMPLES:
    devflow branch feat/KRAFT-42-add-login
    devflow branch fix/typo --base origin/develop
    devflow branch                       # asks for the name

BASE BRANCH:
    Without --base, devflow offers the recently used branches, and falls back
    to the remote branch closest to HEAD when there are none.")]
    Branch {
        /// Branch name, e.g. feat/KRAFT-42-add-login
        name: Option<String>,

        /// Branch to fork from when creating
        #[arg(long)]
        base: Option<String>,

        /// What to do when `git pull --rebase` fails: prompt, skip or abort
        #[arg(long, default_value = "prompt")]
        on_pull_conflict: PullRecovery,
    },

    /// Create or switch to the branch for a tracker issue
    Issue {
        /// Issue key, e.g. KRAFT-42
        key: Option<String>,

        /// What to do when `git pull --rebase` fails: prompt, skip or abort
        #[arg(long, default_value = "prompt")]
        on_pull_conflict: PullRecovery,
    },

    /// Push the current branch and create, reuse or reopen its pull request
    Pr {
        /// Target branch (inferred when omitted)
        #[arg(long)]
        base: Option<String>,
    },

    /// Create a tracker issue
    CreateIssue {
        #[arg(long)]
        title: Option<String>,

        /// Project key, e.g. KRAFT
        #[arg(long)]
        project: Option<String>,

        /// Issue type, e.g. Story
        #[arg(long = "type")]
        issue_type: Option<String>,

        /// Assignee display name (or part of it)
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Guided issue → branch → pull request
    Flow,

    /// Inspect or clear the cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show file locations and the loaded configuration
    Config,

    /// Create the app directory, config skeleton and default PR template
    Init,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the cache, or the entry at PATH
    Show {
        /// Key path segments, e.g. `jira boards`
        path: Vec<String>,
    },
    /// Remove the entry at PATH, or everything
    Reset { path: Vec<String> },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run(cli: Cli, app: &mut AppContext) -> Result<()> {
    let open_browser = !cli.no_browser;

    match cli.command {
        Commands::Init => init_command(),
        Commands::Config => config_display_command(app),
        Commands::Cache {
            action: CacheAction::Show { path },
        } => cache_show_command(app, &path),
        Commands::Cache {
            action: CacheAction::Reset { path },
        } => cache_reset_command(app, &path),

        Commands::Branch {
            name,
            base,
            on_pull_conflict,
        } => {
            let mut session = Session::discover(&app.config, open_browser)?;
            branch_command(app, &mut session, name, base, on_pull_conflict)
        }
        Commands::Issue {
            key,
            on_pull_conflict,
        } => {
            let mut session = Session::discover(&app.config, open_browser)?;
            issue_command(app, &mut session, key, on_pull_conflict)
        }
        Commands::Pr { base } => {
            let mut session = Session::discover(&app.config, open_browser)?;
            pr_command(app, &mut session, base)
        }
        Commands::CreateIssue {
            title,
            project,
            issue_type,
            assignee,
        } => {
            let mut session = Session::discover(&app.config, open_browser)?;
            let request = IssueRequest {
                title,
                project,
                issue_type,
                assignee,
            };
            create_issue_command(app, &mut session, request)
        }
        Commands::Flow => {
            let mut session = Session::discover(&app.config, open_browser)?;
            flow_command(app, &mut session)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut app = match AppContext::load() {
        Ok(app) => app,
        Err(e) => {
            print_error(&format!("Failed to load configuration: {}", e));
            std::process::exit(1);
        }
    };

    let result = run(cli, &mut app);

    if let Err(e) = app.save() {
        print_warning(&format!("Could not save the cache: {}", e));
    }

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
