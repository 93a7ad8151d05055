//! Branch name sanitization

/// Longest branch name kept after sanitization
pub const MAX_BRANCH_NAME_LENGTH: usize = 255;

const REMOVED: [char; 10] = [':', '=', '+', '$', '&', '#', '!', '@', '*', ' '];
const REPLACED: [char; 6] = ['/', '\\', '{', '}', '[', ']'];

/// Make `branch` safe to use as a git branch name.
///
/// Characters git or hosting platforms reject are dropped, path-like
/// separators become `_`, and the result is capped at
/// [`MAX_BRANCH_NAME_LENGTH`] characters.
pub fn sanitize_branch_name(branch: &str) -> String {
    branch
        .chars()
        .filter(|c| !REMOVED.contains(c))
        .map(|c| if REPLACED.contains(&c) { '_' } else { c })
        .take(MAX_BRANCH_NAME_LENGTH)
        .collect()
}
