use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub async fn status(&self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let current_branch = self.refs().head_branch()?;
        let branches = self.refs().list_branches()?;

        let stage = self.stage();
        let mut stage = stage.lock().await;
        stage.rehydrate()?;

        let mut writer = self.writer();

        writeln!(writer, "=== Branches ===")?;
        for branch in branches {
            let marker = if branch == current_branch { "*" } else { "" };
            writeln!(writer, "{}{}", marker, branch)?;
        }
        writeln!(writer)?;

        writeln!(writer, "=== Staged Files ===")?;
        for file_name in stage.addition().keys() {
            writeln!(writer, "{}", file_name)?;
        }
        writeln!(writer)?;

        writeln!(writer, "=== Removed Files ===")?;
        for file_name in stage.removal().keys() {
            writeln!(writer, "{}", file_name)?;
        }
        writeln!(writer)?;

        writeln!(writer, "=== Modifications Not Staged For Commit ===")?;
        writeln!(writer)?;

        writeln!(writer, "=== Untracked Files ===")?;
        writeln!(writer)?;

        Ok(())
    }
}
