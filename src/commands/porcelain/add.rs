use crate::areas::repository::Repository;
use crate::areas::stage::AddOutcome;

impl Repository {
    pub async fn add(&mut self, file_name: &str) -> anyhow::Result<AddOutcome> {
        self.ensure_initialized()?;

        let blob = self.workspace().parse_blob(file_name)?;
        // The blob is stored even when the stage ends up unchanged
        let blob_oid = self.database().store(&blob)?;
        let (_, head) = self.head_commit()?;

        let stage = self.stage();
        let mut stage = stage.lock().await;

        // Load the stage files from the disk
        stage.rehydrate()?;
        let outcome = stage.add(file_name, &blob_oid, head.tracked_blob(file_name));
        stage.write_updates()?;

        Ok(outcome)
    }
}
