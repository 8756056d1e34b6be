use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Commit, commit_timestamp};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;

impl Repository {
    /// Record the staged changes on top of the current branch
    ///
    /// The new commit starts from the tracked files of its parent, takes every
    /// staged addition and drops every staged removal. Both stages are cleared
    /// and the current branch advances to the new commit.
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<ObjectId> {
        self.ensure_initialized()?;

        if message.trim().is_empty() {
            return Err(RepositoryError::EmptyCommitMessage.into());
        }

        let stage = self.stage();
        let mut stage = stage.lock().await;

        stage.rehydrate()?;
        if stage.is_empty() {
            return Err(RepositoryError::NothingToCommit.into());
        }

        let (parent_oid, parent) = self.head_commit()?;
        let mut commit = Commit::child_of(
            parent_oid,
            &parent,
            None,
            message.to_string(),
            commit_timestamp(),
        );

        for (file_name, blob_oid) in stage.addition() {
            commit.track(file_name.clone(), blob_oid.clone());
        }
        for file_name in stage.removal().keys() {
            commit.untrack(file_name);
        }

        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        stage.clear();
        stage.write_updates()?;

        tracing::info!(%commit_oid, files = commit.tracked_files().len(), "created commit");

        Ok(commit_oid)
    }
}
