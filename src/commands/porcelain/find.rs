use crate::areas::repository::Repository;
use crate::errors::RepositoryError;
use std::io::Write;

impl Repository {
    /// Print the ID of every commit with exactly the given message
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let mut matches = Vec::new();
        for commit_oid in self.database().list_commits()? {
            if self.database().load_commit(&commit_oid)?.message() == message {
                matches.push(commit_oid);
            }
        }

        if matches.is_empty() {
            return Err(RepositoryError::NoCommitWithMessage.into());
        }

        let mut writer = self.writer();
        for commit_oid in matches {
            writeln!(writer, "{}", commit_oid)?;
        }

        Ok(())
    }
}
