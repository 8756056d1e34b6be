use crate::REPOSITORY_DIR;
use crate::areas::database::Database;
use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::objects::blob::Blob;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Working directory holding the user's files
///
/// Tracked files are plain files at the top level of the directory.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    pub fn file_exists(&self, file_name: &str) -> bool {
        self.file_path(file_name).is_file()
    }

    /// Names of the plain files in the working directory, in ascending order
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        let mut files = std::fs::read_dir(&self.path)
            .with_context(|| format!("Unable to list working directory {:?}", self.path))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|file_name| file_name != REPOSITORY_DIR)
            .collect::<Vec<_>>();

        files.sort();
        Ok(files)
    }

    pub fn read_file(&self, file_name: &str) -> anyhow::Result<Bytes> {
        if !self.file_exists(file_name) {
            return Err(RepositoryError::FileNotFound.into());
        }

        let file_path = self.file_path(file_name);
        let content = std::fs::read(&file_path)
            .with_context(|| format!("Unable to read file {:?}", file_path))?;

        Ok(Bytes::from(content))
    }

    /// Snapshot a working file as a blob named after it
    pub fn parse_blob(&self, file_name: &str) -> anyhow::Result<Blob> {
        let data = self.read_file(file_name)?;
        Ok(Blob::new(data, file_name))
    }

    pub fn write_file(&self, file_name: &str, content: &[u8]) -> anyhow::Result<()> {
        let file_path = self.file_path(file_name);

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)
            .with_context(|| format!("Failed to open file: {:?}", file_path))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))?;

        Ok(())
    }

    /// Delete a working file; a missing file is not an error
    pub fn remove_file(&self, file_name: &str) -> anyhow::Result<()> {
        let file_path = self.file_path(file_name);

        if file_path.is_file() {
            std::fs::remove_file(&file_path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        Ok(())
    }

    // Deletions are applied before writes so that every target file ends up on disk.
    pub fn apply_migration(&self, migration: &Migration, database: &Database) -> anyhow::Result<()> {
        self.apply_migration_action_set(migration, database, ActionType::Delete)?;
        self.apply_migration_action_set(migration, database, ActionType::Modify)?;
        self.apply_migration_action_set(migration, database, ActionType::Add)?;

        Ok(())
    }

    fn apply_migration_action_set(
        &self,
        migration: &Migration,
        database: &Database,
        action: ActionType,
    ) -> anyhow::Result<()> {
        migration
            .actions()
            .get(&action)
            .ok_or_else(|| anyhow::anyhow!("Invalid action type"))?
            .iter()
            .map(|(file_name, blob_oid)| match (&action, blob_oid) {
                (ActionType::Delete, None) => self.remove_file(file_name),
                (ActionType::Add | ActionType::Modify, Some(blob_oid)) => {
                    let blob = database.load_blob(blob_oid)?;
                    self.write_file(file_name, blob.content())
                }
                _ => Err(anyhow::anyhow!("Invalid action and entry combination")),
            })
            .collect::<Result<Vec<()>, _>>()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::TrackedFiles;
    use crate::errors::{ErrorKind, error_kind};
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn workspace_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    #[rstest]
    fn lists_only_top_level_files(workspace_dir: TempDir) {
        workspace_dir.child("b.txt").write_str("b").unwrap();
        workspace_dir.child("a.txt").write_str("a").unwrap();
        workspace_dir.child("nested").create_dir_all().unwrap();
        workspace_dir.child(".bitlet/HEAD").write_str("main").unwrap();

        let workspace = Workspace::new(workspace_dir.path().into());

        assert_eq!(
            workspace.list_files().unwrap(),
            vec!["a.txt".to_string(), "b.txt".to_string()]
        );
    }

    #[rstest]
    fn reading_missing_file_is_not_found(workspace_dir: TempDir) {
        let workspace = Workspace::new(workspace_dir.path().into());

        let error = workspace.parse_blob("ghost.txt").unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::NotFound));
        assert_eq!(error.to_string(), "File does not exist.");
    }

    #[rstest]
    fn migration_replaces_tracked_files(workspace_dir: TempDir) {
        let database = Database::new(workspace_dir.path().join(".bitlet/objects").into());
        let workspace = Workspace::new(workspace_dir.path().into());

        workspace_dir.child("gone.txt").write_str("old").unwrap();
        workspace_dir.child("both.txt").write_str("old").unwrap();
        let gone = database.store(&Blob::new("old", "gone.txt")).unwrap();
        let both_old = database.store(&Blob::new("old", "both.txt")).unwrap();
        let both_new = database.store(&Blob::new("new", "both.txt")).unwrap();
        let added = database.store(&Blob::new("added", "added.txt")).unwrap();

        let current = TrackedFiles::from([
            ("gone.txt".to_string(), gone),
            ("both.txt".to_string(), both_old),
        ]);
        let target = TrackedFiles::from([
            ("both.txt".to_string(), both_new),
            ("added.txt".to_string(), added),
        ]);

        workspace
            .apply_migration(&Migration::between(&current, &target), &database)
            .unwrap();

        workspace_dir.child("gone.txt").assert(predicates::path::missing());
        workspace_dir.child("both.txt").assert("new");
        workspace_dir.child("added.txt").assert("added");
    }
}
