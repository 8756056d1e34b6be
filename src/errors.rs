//! Repository errors
//!
//! Every precondition a command checks is reported through [`RepositoryError`].
//! Commands propagate it inside `anyhow::Error`; callers that need to branch on
//! the failure use `downcast_ref::<RepositoryError>()` and [`RepositoryError::kind`].

use thiserror::Error;

/// Broad classification of repository failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A blob, commit, branch or working file is missing
    NotFound,
    /// A branch or the repository itself already exists
    AlreadyExists,
    /// The repository is not in a state that allows the operation
    InvalidState,
    /// The working directory would lose data
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("A Bitlet version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("Not in an initialized Bitlet directory.")]
    NotInitialized,

    #[error("File does not exist.")]
    FileNotFound,

    #[error("File does not exist in that commit.")]
    FileNotInCommit,

    #[error("No commit with that id exists.")]
    UnknownCommit,

    #[error("Found no commit with that message.")]
    NoCommitWithMessage,

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("Please enter a commit message.")]
    EmptyCommitMessage,

    #[error("No reason to remove the file.")]
    NoReasonToRemove,

    #[error("A branch with that name already exists.")]
    BranchExists,

    #[error("A branch with that name does not exist.")]
    UnknownBranch,

    #[error("No such branch exists.")]
    NoSuchBranch,

    #[error("No need to switch to the current branch.")]
    AlreadyOnBranch,

    #[error("Cannot remove the current branch.")]
    CurrentBranch,

    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileInTheWay,

    #[error("No common ancestor between {0} and {1}; the branch references may be corrupted.")]
    NoCommonAncestor(String, String),

    #[error("Invalid branch name: {0}")]
    InvalidBranchName(String),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::AlreadyInitialized | RepositoryError::BranchExists => {
                ErrorKind::AlreadyExists
            }
            RepositoryError::NotInitialized
            | RepositoryError::FileNotFound
            | RepositoryError::FileNotInCommit
            | RepositoryError::UnknownCommit
            | RepositoryError::NoCommitWithMessage
            | RepositoryError::UnknownBranch
            | RepositoryError::NoSuchBranch => ErrorKind::NotFound,
            RepositoryError::NothingToCommit
            | RepositoryError::EmptyCommitMessage
            | RepositoryError::NoReasonToRemove
            | RepositoryError::AlreadyOnBranch
            | RepositoryError::CurrentBranch
            | RepositoryError::MergeWithSelf
            | RepositoryError::UncommittedChanges
            | RepositoryError::NoCommonAncestor(_, _)
            | RepositoryError::InvalidBranchName(_) => ErrorKind::InvalidState,
            RepositoryError::UntrackedFileInTheWay => ErrorKind::Conflict,
        }
    }
}

/// Extract the [`ErrorKind`] of a repository failure carried by an `anyhow::Error`
pub fn error_kind(error: &anyhow::Error) -> Option<ErrorKind> {
    error
        .downcast_ref::<RepositoryError>()
        .map(RepositoryError::kind)
}
