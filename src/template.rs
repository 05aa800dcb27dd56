//! Pull request body rendering.
//!
//! A template is plain markdown. Rendering ticks the change-type checkbox
//! matching the branch type and fills the `Ticket` and `Description`
//! sections. Headings may carry an emoji (`## 📔 Ticket(s)`).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::issues::Issue;

/// Used when no template file can be read.
pub const FALLBACK_TEMPLATE: &str = "## Description\n";

/// Shipped default, installed into the app directory by `devflow init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("../resources/default_pull_request_template.md");

/// Location of the installed default, relative to the app directory.
pub const DEFAULT_TEMPLATE_PATH: &str = "resources/default_pull_request_template.md";

/// Repository template locations, in lookup order.
pub const PR_TEMPLATE_PATHS: &[&str] = &[
    "pull_request_template.md",
    ".github/pull_request_template.md",
    ".github/PULL_REQUEST_TEMPLATE.md",
];

fn ticket_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*##\s*(?:[^\w\s]+\s*)?ticket").expect("valid regex"))
}

fn description_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*##\s*(?:[^\w\s]+\s*)?description").expect("valid regex")
    })
}

/// Checkbox keywords for a branch type.
fn checkbox_keywords(branch_type: &str) -> &'static [&'static str] {
    match branch_type {
        "fix" => &["bug"],
        "bump" => &["gem", "dependenc"],
        _ => &["feature", "nouvelle"],
    }
}

/// Render a pull request body from `template`.
pub fn render(
    template: &str,
    branch_type: &str,
    issue: Option<&Issue>,
    description: Option<&str>,
) -> String {
    let mut body = mark_checkbox(template, checkbox_keywords(branch_type));

    if let Some(issue) = issue {
        let link = format!("- [{}]({})", issue.key, issue.url);
        body = fill_section(&body, ticket_heading(), &link);
    }

    if let Some(description) = description {
        let cleaned = strip_tracker_markup(description);
        if !cleaned.is_empty() {
            body = fill_section(&body, description_heading(), &cleaned);
        }
    }

    body
}

/// Tick the first unchecked box whose label contains one of `keywords`.
fn mark_checkbox(template: &str, keywords: &[&str]) -> String {
    let mut marked = false;
    template
        .split('\n')
        .map(|line| {
            if marked || !line.trim_start().starts_with("- [ ]") {
                return line.to_string();
            }
            let lower = line.to_lowercase();
            if keywords.iter().any(|k| lower.contains(k)) {
                marked = true;
                line.replacen("[ ]", "[x]", 1)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Blank or dash-only line left in a template as a placeholder.
fn is_placeholder(line: &str) -> bool {
    line.trim().chars().all(|c| c == '-')
}

/// Put `content` right under the first heading matching `heading`,
/// replacing the placeholder lines that follow it.
fn fill_section(body: &str, heading: &Regex, content: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let Some(index) = lines.iter().position(|line| heading.is_match(line)) else {
        return body.to_string();
    };

    let mut end = index + 1;
    while end < lines.len() && is_placeholder(lines[end]) {
        end += 1;
    }

    let mut out: Vec<&str> = lines[..=index].to_vec();
    out.extend(["", content, ""]);
    if end < lines.len() {
        out.extend_from_slice(&lines[end..]);
    } else {
        out.push("");
    }
    out.join("\n")
}

/// Remove `{code}`-style tracker markup.
fn strip_tracker_markup(text: &str) -> String {
    let re = Regex::new(r"\{[^}]+\}").unwrap();
    re.replace_all(text, "").trim().to_string()
}

/// Where a template was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Repository(PathBuf),
    Default(PathBuf),
    Bundled,
    Fallback,
}

/// Find the template to render: the repository's own, then the installed
/// default under `app_dir`, then the bundled [`DEFAULT_TEMPLATE`], then
/// [`FALLBACK_TEMPLATE`].
///
/// A file that exists but cannot be read is skipped with a warning.
pub fn load_template(repo_dir: &Path, app_dir: Option<&Path>) -> (String, TemplateSource) {
    for relative in PR_TEMPLATE_PATHS {
        let path = repo_dir.join(relative);
        if let Some(content) = read_candidate(&path) {
            debug!(path = %path.display(), "using repository PR template");
            return (content, TemplateSource::Repository(path));
        }
    }

    if let Some(app_dir) = app_dir {
        let path = app_dir.join(DEFAULT_TEMPLATE_PATH);
        if let Some(content) = read_candidate(&path) {
            debug!(path = %path.display(), "using default PR template");
            return (content, TemplateSource::Default(path));
        }
    }

    bundled_or_fallback(DEFAULT_TEMPLATE)
}

fn bundled_or_fallback(bundled: &str) -> (String, TemplateSource) {
    if !bundled.trim().is_empty() {
        debug!("using bundled PR template");
        return (bundled.to_string(), TemplateSource::Bundled);
    }

    debug!("using fallback PR template");
    (FALLBACK_TEMPLATE.to_string(), TemplateSource::Fallback)
}

fn read_candidate(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read PR template");
            None
        }
    }
}
