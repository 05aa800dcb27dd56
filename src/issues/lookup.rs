//! Cache-first tracker lookups.
//!
//! Each helper answers from the cache when it can and otherwise asks the
//! tracker, writing what it learns back under `jira/...`.

use tracing::debug;

use crate::cache::Cache;
use crate::error::Result;

use super::{Board, IssueTracker, User};

const BOARDS: [&str; 2] = ["jira", "boards"];
const USERS: [&str; 2] = ["jira", "users"];
const ISSUE_TYPES: [&str; 2] = ["jira", "issue_types"];
const SPRINT_FIELD: [&str; 2] = ["jira", "sprint_field_id"];

/// Cache identifier for project keys and display names: lower-cased,
/// whitespace runs replaced by `_`.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Fetch all boards and cache each one under its normalized project key.
pub fn refresh_boards(tracker: &dyn IssueTracker, cache: &mut Cache) -> Result<Vec<Board>> {
    let boards = tracker.boards()?;
    for board in &boards {
        let key = normalize_key(&board.project_key);
        cache.set_as(&[BOARDS[0], BOARDS[1], key.as_str()], board)?;
    }
    debug!(count = boards.len(), "boards cached");
    Ok(boards)
}

pub fn board_for_project(
    tracker: &dyn IssueTracker,
    cache: &mut Cache,
    project_key: &str,
) -> Result<Option<Board>> {
    let key = normalize_key(project_key);
    let path = [BOARDS[0], BOARDS[1], key.as_str()];

    if let Some(board) = cache.lookup_as::<Board>(&path) {
        debug!(project = %project_key, "board found in cache");
        return Ok(Some(board));
    }

    refresh_boards(tracker, cache)?;
    Ok(cache.lookup_as::<Board>(&path))
}

/// Project keys of every known board, sorted.
pub fn project_keys(tracker: &dyn IssueTracker, cache: &mut Cache) -> Result<Vec<String>> {
    let mut cached = cache.keys(&BOARDS);
    if cached.is_empty() {
        refresh_boards(tracker, cache)?;
        cached = cache.keys(&BOARDS);
    }

    let mut keys: Vec<String> = cached
        .iter()
        .filter_map(|k| cache.lookup_as::<Board>(&[BOARDS[0], BOARDS[1], k.as_str()]))
        .map(|board| board.project_key)
        .collect();
    keys.sort();
    keys.dedup();
    Ok(keys)
}

/// Account id of the first user whose display name contains `name`
/// (case-insensitive). The match is cached under both the query and the
/// full display name.
pub fn user_account_id(
    tracker: &dyn IssueTracker,
    cache: &mut Cache,
    name: &str,
) -> Result<Option<String>> {
    let key = normalize_key(name);
    if let Some(user) = cache.lookup_as::<User>(&[USERS[0], USERS[1], key.as_str()]) {
        debug!(user = %name, "user found in cache");
        return Ok(Some(user.account_id));
    }

    let needle = name.to_lowercase();
    let found = tracker
        .find_users(name)?
        .into_iter()
        .find(|u| u.display_name.to_lowercase().contains(&needle));

    let Some(user) = found else {
        return Ok(None);
    };
    cache.set_as(&[USERS[0], USERS[1], key.as_str()], &user)?;
    let full_name = normalize_key(&user.display_name);
    if full_name != key {
        cache.set_as(&[USERS[0], USERS[1], full_name.as_str()], &user)?;
    }
    Ok(Some(user.account_id))
}

pub fn issue_types_for_project(
    tracker: &dyn IssueTracker,
    cache: &mut Cache,
    project_key: &str,
) -> Result<Vec<String>> {
    let path = [ISSUE_TYPES[0], ISSUE_TYPES[1], project_key];
    if let Some(types) = cache.lookup_as::<Vec<String>>(&path) {
        return Ok(types);
    }

    let types = tracker.issue_types(project_key)?;
    if !types.is_empty() {
        cache.set_as(&path, &types)?;
    }
    Ok(types)
}

pub fn sprint_field_id(tracker: &dyn IssueTracker, cache: &mut Cache) -> Result<Option<String>> {
    if let Some(id) = cache.lookup_as::<String>(&SPRINT_FIELD) {
        return Ok(Some(id));
    }

    let id = tracker.sprint_field_id()?;
    if let Some(id) = &id {
        cache.set_as(&SPRINT_FIELD, id)?;
    }
    Ok(id)
}
