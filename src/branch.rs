//! Branch naming rules: protected names, commit messages derived from branch
//! names, and branch names derived from issues.

use regex::Regex;

/// Branch names that never receive a pull request or a forced push from devflow.
pub const PROTECTED_BRANCHES: &[&str] = &[
    "main",
    "master",
    "develop",
    "dev",
    "development",
    "staging",
    "stage",
    "production",
    "prod",
    "release",
    "hotfix",
    "integration",
];

/// Branch type used when a branch name has no `prefix/` segment.
pub const DEFAULT_BRANCH_TYPE: &str = "feat";

pub fn is_protected(branch: &str) -> bool {
    PROTECTED_BRANCHES.contains(&branch)
}

/// The `prefix/` segment of a branch name (`fix` for `fix/KRAFT-7-typo`).
pub fn branch_type(branch: &str) -> &str {
    match branch.split_once('/') {
        Some((prefix, _)) if !prefix.is_empty() => prefix,
        _ => DEFAULT_BRANCH_TYPE,
    }
}

/// Turn a branch name into a human commit message / PR title.
///
/// - `feat/KRAFT-42-add-login` → `[FEAT] KRAFT-42 - Add login`
/// - `chore/cleanup-logs` → `[CHORE] Cleanup logs`
/// - `random-name` → `Random name`
pub fn commit_message_from_branch(branch: &str) -> String {
    let mut result = branch.to_string();

    if let Some((prefix, rest)) = result.split_once('/') {
        if !prefix.is_empty() {
            result = format!("[{}] {}", prefix.to_uppercase(), rest);
        }
    }

    let key_re = Regex::new(r"^(\[.+?\]\s+)?([A-Z]+-\d+)-(.+)").unwrap();
    if let Some(caps) = key_re.captures(&result) {
        let tag = caps.get(1).map_or("", |m| m.as_str());
        result = format!("{}{} - {}", tag, &caps[2], &caps[3]);
    }

    let parts_re = Regex::new(r"^(\[.+?\]\s+)?(.*?\s-\s)?(.*)").unwrap();
    if let Some(caps) = parts_re.captures(&result) {
        let tag = caps.get(1).map_or("", |m| m.as_str());
        let key = caps.get(2).map_or("", |m| m.as_str());
        let remaining = caps.get(3).map_or("", |m| m.as_str());

        if !remaining.is_empty() {
            let spaced = remaining.replace('-', " ");
            let mut words: Vec<String> = spaced.split_whitespace().map(str::to_string).collect();
            if let Some(first) = words.first_mut() {
                *first = capitalize(first);
            }
            result = format!("{}{}{}", tag, key, words.join(" "));
        }
    }

    result
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Remove a leading `[Tag]` marker from an issue title.
pub fn strip_bracket_prefix(title: &str) -> String {
    let re = Regex::new(r"^\[.*?\]\s*").unwrap();
    re.replace(title.trim(), "").to_string()
}

/// Branch name for an issue: `fix/` for bugs, `feat/` otherwise, then the
/// issue key and a slug of the title.
pub fn branch_name_for_issue(key: &str, title: &str, issue_type: &str) -> String {
    let prefix = if issue_type.eq_ignore_ascii_case("bug") {
        "fix/"
    } else {
        "feat/"
    };

    let lowered = strip_bracket_prefix(&title.to_lowercase());
    let whitespace = Regex::new(r"\s+").unwrap();
    let dashes = Regex::new(r"-+").unwrap();

    let slug = whitespace.replace_all(&lowered, "-");
    let slug: String = slug.chars().filter(|c| *c != '\'' && *c != '"').collect();
    let slug = dashes.replace_all(&slug, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        format!("{}{}", prefix, key.to_uppercase())
    } else {
        format!("{}{}-{}", prefix, key.to_uppercase(), slug)
    }
}
