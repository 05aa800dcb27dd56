//! Init command handler.
//!
//! Creates the devflow app directory and installs the starter files.

use std::fs;
use std::path::Path;

use crate::config::{config_path, ensure_app_dir, DEFAULT_CONFIG};
use crate::error::Result;
use crate::output::{BOLD, CYAN, GRAY, GREEN, RESET};
use crate::template::{DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_PATH};

/// Initialize the devflow app directory.
///
/// Creates, when missing:
/// - `~/.config/devflow/` - app directory (or `$DEVFLOW_HOME`)
/// - `config.json` - configuration skeleton
/// - `resources/default_pull_request_template.md` - default PR body
/// - `tmp/` - cache directory
///
/// Existing files are left untouched.
pub fn init_command() -> Result<()> {
    println!("Initializing devflow...");
    println!();

    let (app_dir, created) = ensure_app_dir()?;
    report(&app_dir, created);

    let config_file = config_path()?;
    let created = write_if_missing(&config_file, DEFAULT_CONFIG)?;
    report(&config_file, created);

    let template = app_dir.join(DEFAULT_TEMPLATE_PATH);
    let created = write_if_missing(&template, DEFAULT_TEMPLATE)?;
    report(&template, created);

    let tmp = app_dir.join("tmp");
    let created = !tmp.exists();
    fs::create_dir_all(&tmp)?;
    report(&tmp, created);

    println!();
    println!("{GREEN}Initialization complete!{RESET}");
    println!();
    println!("{BOLD}Next steps:{RESET}");
    println!(
        "  Fill in your Jira credentials in {CYAN}{}{RESET}",
        config_file.display()
    );
    println!("  Run {CYAN}devflow flow{RESET} inside a repository");

    Ok(())
}

fn report(path: &Path, created: bool) {
    if created {
        println!("  {GREEN}Created{RESET} {}", path.display());
    } else {
        println!("  {GRAY}Exists{RESET}  {}", path.display());
    }
}

/// Write `content` to `path` unless it already exists. Returns whether it wrote.
fn write_if_missing(path: &Path, content: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, content)?;
    Ok(true)
}
