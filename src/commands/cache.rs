//! Cache command handlers.
//!
//! Paths are given as separate segments: `devflow cache show jira boards`.

use serde_json::Value;

use crate::context::AppContext;
use crate::error::Result;
use crate::output::{print_success, BOLD, GRAY, RESET, YELLOW};

/// Print the cached value at `path` (the whole cache when empty).
pub fn cache_show_command(app: &mut AppContext, path: &[String]) -> Result<()> {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();

    println!("{BOLD}# Cache{RESET}");
    println!("{GRAY}# {}{RESET}", app.cache.path().display());
    println!();

    let value = if segments.is_empty() {
        Some(app.cache.snapshot())
    } else {
        app.cache.lookup(&segments)
    };

    match value {
        Some(value) => println!("{}", render(&value)?),
        None => println!("{YELLOW}(no entry at {}){RESET}", segments.join(" / ")),
    }
    Ok(())
}

/// Remove the entry at `path` (everything when empty).
pub fn cache_reset_command(app: &mut AppContext, path: &[String]) -> Result<()> {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    app.cache.reset(&segments);
    app.save()?;

    if segments.is_empty() {
        print_success("Cache cleared");
    } else {
        print_success(&format!("Cache entry {} removed", segments.join(" / ")));
    }
    Ok(())
}

fn render(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
