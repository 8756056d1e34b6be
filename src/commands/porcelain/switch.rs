use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::conflict::ensure_no_untracked_overwritten;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::commit::Commit;
use crate::errors::RepositoryError;

impl Repository {
    /// Check out another branch
    ///
    /// Files tracked by the current commit but not by the branch head are
    /// deleted, every file tracked by the branch head is written, HEAD moves to
    /// the branch and the stage is cleared.
    pub async fn switch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch_name = BranchName::try_parse(branch_name.to_string())
            .map_err(|_| RepositoryError::NoSuchBranch)?;
        let target_oid = self
            .refs()
            .read_branch(&branch_name)?
            .ok_or(RepositoryError::NoSuchBranch)?;

        if self.refs().is_current_branch(&branch_name)? {
            return Err(RepositoryError::AlreadyOnBranch.into());
        }

        let (_, current) = self.head_commit()?;
        let target = self.database().load_commit(&target_oid)?;

        self.replace_tracked_files(&current, &target)?;
        self.refs().set_head_branch(&branch_name)?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.clear();
        stage.write_updates()?;

        Ok(())
    }

    /// Turn the working files of `current` into those of `target`
    ///
    /// Fails without touching the working directory when an untracked file would
    /// be overwritten.
    pub(crate) fn replace_tracked_files(
        &self,
        current: &Commit,
        target: &Commit,
    ) -> anyhow::Result<()> {
        let workspace_files = self.workspace().list_files()?;
        ensure_no_untracked_overwritten(
            &workspace_files,
            current.tracked_files(),
            target.tracked_files(),
        )?;

        let migration = Migration::between(current.tracked_files(), target.tracked_files());
        self.workspace()
            .apply_migration(&migration, self.database())?;

        Ok(())
    }
}
