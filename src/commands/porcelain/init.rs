use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::errors::RepositoryError;
use crate::{DEFAULT_BRANCH, INITIAL_COMMIT_MESSAGE};
use anyhow::Context;
use std::fs;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(RepositoryError::AlreadyInitialized.into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .bitlet/objects directory")?;

        fs::create_dir_all(self.refs().branches_path())
            .context("Failed to create .bitlet/branches directory")?;

        let root = Commit::root(INITIAL_COMMIT_MESSAGE.to_string());
        let root_oid = self.database().store(&root)?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH.to_string())?;
        self.refs()
            .create_branch(&default_branch, &root_oid)
            .context("Failed to create default branch")?;
        self.refs()
            .set_head_branch(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.clear();
        stage.write_updates()?;

        tracing::info!(path = %self.path().display(), %root_oid, "initialized repository");

        Ok(())
    }
}
