//! Infer which remote branch the current branch was forked from.

use crate::error::{DevflowError, Result};
use crate::git::{is_remote_head_entry, Git};
use tracing::debug;

/// The remote branch whose merge-base with HEAD is closest to HEAD.
///
/// `HEAD` entries and `origin/<current>` are never candidates. On equal
/// distance the branch listed first by `git branch -r` wins.
pub fn infer_base_branch(git: &dyn Git) -> Result<String> {
    let current = git.current_branch()?;
    let own_remote = format!("origin/{}", current);

    let mut best: Option<(String, usize)> = None;
    for candidate in git.remote_branches()? {
        if is_remote_head_entry(&candidate) || candidate == own_remote {
            continue;
        }

        let Some(distance) = git.merge_base_distance(&candidate)? else {
            debug!(branch = %candidate, "no merge-base with HEAD");
            continue;
        };
        debug!(branch = %candidate, distance, "merge-base distance");

        if best.as_ref().is_none_or(|(_, min)| distance < *min) {
            best = Some((candidate, distance));
        }
    }

    best.map(|(branch, _)| branch)
        .ok_or(DevflowError::NoBaseBranchFound)
}

/// Drop a leading `origin/` so the name can be checked out or sent to the code host.
pub fn strip_remote(branch: &str) -> &str {
    branch.strip_prefix("origin/").unwrap_or(branch)
}
