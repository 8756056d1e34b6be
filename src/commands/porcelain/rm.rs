use crate::areas::repository::Repository;

impl Repository {
    pub async fn rm(&mut self, file_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let (_, head) = self.head_commit()?;
        let file_exists = self.workspace().file_exists(file_name);

        let stage = self.stage();
        let mut stage = stage.lock().await;

        stage.rehydrate()?;
        let delete_working_file =
            stage.remove(file_name, head.tracked_blob(file_name), file_exists)?;
        stage.write_updates()?;

        if delete_working_file {
            self.workspace().remove_file(file_name)?;
        }

        Ok(())
    }
}
