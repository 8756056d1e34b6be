use crate::artifacts::objects::commit::TrackedFiles;
use crate::errors::RepositoryError;

/// Working files that are untracked by the current commit but tracked by the target
pub fn untracked_overwritten<'w>(
    workspace_files: &'w [String],
    current: &TrackedFiles,
    target: &TrackedFiles,
) -> Vec<&'w str> {
    workspace_files
        .iter()
        .filter(|file_name| {
            !current.contains_key(file_name.as_str()) && target.contains_key(file_name.as_str())
        })
        .map(String::as_str)
        .collect()
}

/// Warning listing the untracked files standing in the way of a checkout
pub fn untracked_overwritten_message(file_names: &[&str]) -> String {
    let mut message =
        String::from("The following untracked working tree files would be overwritten:");
    for file_name in file_names {
        message.push_str("\n\t");
        message.push_str(file_name);
    }
    message.push_str("\nPlease move or remove them before checking out another commit.");

    message
}

/// Fail when moving from `current` to `target` would overwrite untracked files
pub fn ensure_no_untracked_overwritten(
    workspace_files: &[String],
    current: &TrackedFiles,
    target: &TrackedFiles,
) -> anyhow::Result<()> {
    let conflicts = untracked_overwritten(workspace_files, current, target);
    if conflicts.is_empty() {
        return Ok(());
    }

    tracing::warn!("{}", untracked_overwritten_message(&conflicts));

    Err(RepositoryError::UntrackedFileInTheWay.into())
}
