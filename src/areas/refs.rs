//! References (branches and HEAD)
//!
//! Branches are mutable names pointing at commits; HEAD names the branch that is
//! currently checked out. Resolving HEAD to a commit always goes through the
//! branch table.
//!
//! ## File Format
//!
//! - `branches/<name>`: the 40-character commit ID the branch points at
//! - `HEAD`: the name of the current branch

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;

/// Name of the file holding the current branch name
pub const HEAD_REF_NAME: &str = "HEAD";

/// Name of the directory holding the branch table
const BRANCHES_DIR: &str = "branches";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (typically `.bitlet`)
    path: Box<Path>,
}

impl Refs {
    /// Name of the currently checked-out branch
    pub fn head_branch(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        BranchName::try_parse(content.trim().to_string())
    }

    pub fn set_head_branch(&self, branch_name: &BranchName) -> anyhow::Result<()> {
        self.update_ref_file(&self.head_path(), branch_name.as_ref())?;
        tracing::debug!(branch = %branch_name, "moved HEAD");

        Ok(())
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.head_branch()? == branch_name)
    }

    /// Commit the current branch points at
    pub fn read_head(&self) -> anyhow::Result<ObjectId> {
        self.branch_head(&self.head_branch()?)
    }

    /// Advance the current branch to `oid`
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.set_branch_head(&self.head_branch()?, oid)
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).exists()
    }

    pub fn read_branch(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(branch_name);
        if !branch_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read branch file at {:?}", branch_path))?;

        Ok(Some(ObjectId::try_parse(content.trim().to_string())?))
    }

    /// Commit a branch points at, failing for unknown branches
    pub fn branch_head(&self, branch_name: &BranchName) -> anyhow::Result<ObjectId> {
        self.read_branch(branch_name)?
            .ok_or_else(|| RepositoryError::UnknownBranch.into())
    }

    pub fn set_branch_head(&self, branch_name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(&self.branch_path(branch_name), oid.as_ref())?;
        tracing::debug!(branch = %branch_name, %oid, "updated branch");

        Ok(())
    }

    pub fn create_branch(&self, branch_name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(branch_name) {
            return Err(RepositoryError::BranchExists.into());
        }

        self.set_branch_head(branch_name, oid)
    }

    /// Delete a branch other than the current one, returning the commit it pointed at
    pub fn delete_branch(&self, branch_name: &BranchName) -> anyhow::Result<ObjectId> {
        let oid = self.branch_head(branch_name)?;

        if self.is_current_branch(branch_name)? {
            return Err(RepositoryError::CurrentBranch.into());
        }

        let branch_path = self.branch_path(branch_name);
        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        tracing::debug!(branch = %branch_name, %oid, "deleted branch");

        Ok(oid)
    }

    /// Names of all branches, in ascending order
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let branches_path = self.branches_path();
        if !branches_path.exists() {
            return Ok(Vec::new());
        }

        let mut branches = std::fs::read_dir(&branches_path)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| BranchName::try_parse(entry.file_name().to_string_lossy().to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        branches.sort();
        Ok(branches)
    }

    /// Overwrite a ref file while holding an exclusive lock on it
    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn branches_path(&self) -> Box<Path> {
        self.path.join(BRANCHES_DIR).into_boxed_path()
    }

    fn branch_path(&self, branch_name: &BranchName) -> Box<Path> {
        self.branches_path()
            .join(branch_name.as_ref())
            .into_boxed_path()
    }
}
