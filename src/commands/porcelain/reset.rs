use crate::areas::repository::Repository;

impl Repository {
    /// Move the current branch to an arbitrary commit and check it out
    ///
    /// Abbreviated commit IDs are accepted; the branch stores the full ID.
    pub async fn reset(&mut self, commit_id: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let (target_oid, target) = self.database().find_commit(commit_id)?;
        let (_, current) = self.head_commit()?;

        self.replace_tracked_files(&current, &target)?;
        self.refs().update_head(&target_oid)?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.clear();
        stage.write_updates()?;

        Ok(())
    }
}
