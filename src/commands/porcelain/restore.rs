use crate::areas::repository::Repository;
use crate::errors::RepositoryError;

impl Repository {
    /// Write the version of `file_name` recorded in a commit into the working directory
    ///
    /// Without a commit ID the current head commit is used; abbreviated IDs are
    /// accepted. The stage is left untouched.
    pub fn restore(&mut self, commit_id: Option<&str>, file_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let (commit_oid, commit) = match commit_id {
            Some(commit_id) => self.database().find_commit(commit_id)?,
            None => self.head_commit()?,
        };

        let blob_oid = commit
            .tracked_blob(file_name)
            .ok_or(RepositoryError::FileNotInCommit)?;
        let blob = self.database().load_blob(blob_oid)?;
        self.workspace().write_file(file_name, blob.content())?;

        tracing::debug!(file_name, %commit_oid, %blob_oid, "restored file");

        Ok(())
    }
}
