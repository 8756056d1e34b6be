//! Staging area
//!
//! Two mappings (file name -> blob ID) hold the changes pending for the next
//! commit: files staged for addition and files staged for removal.
//!
//! The stage is loaded from disk with [`Stage::rehydrate`] at the start of a
//! command and persisted with [`Stage::write_updates`] at the end of it.

use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::stage::checksum::Checksum;
use crate::artifacts::stage::stage_entry::{ENTRY_FIXED_SIZE, StageEntry};
use crate::artifacts::stage::stage_header::StageHeader;
use crate::artifacts::stage::HEADER_SIZE;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::collections::BTreeMap;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Staged files keyed by file name
pub type StagedFiles = BTreeMap<String, ObjectId>;

const ADDITION_FILE: &str = "addition";
const REMOVAL_FILE: &str = "removal";

/// Effect of staging a file for addition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The file was staged for removal with this content; the removal is dropped
    RemovalUnstaged,
    /// The file is now staged for addition
    Staged,
    /// The file matches the head commit again and is no longer staged
    AdditionUnstaged,
    /// Nothing to do
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct Stage {
    /// Directory holding both stage files (typically `.bitlet/stage`)
    path: Box<Path>,
    addition: StagedFiles,
    removal: StagedFiles,
    changed: bool,
}

impl Stage {
    /// Create a stage that has not been persisted yet
    pub fn new(path: Box<Path>) -> Self {
        Stage {
            path,
            addition: StagedFiles::new(),
            removal: StagedFiles::new(),
            changed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn addition(&self) -> &StagedFiles {
        &self.addition
    }

    pub fn removal(&self) -> &StagedFiles {
        &self.removal
    }

    pub fn is_empty(&self) -> bool {
        self.addition.is_empty() && self.removal.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Reset both stages to empty
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.changed = true;
        }
        self.addition.clear();
        self.removal.clear();
    }

    /// Stage `file_name` with content `blob_oid`
    ///
    /// `head_blob` is the blob the head commit tracks under that name. Rules apply
    /// in order: a removal staged with the same content is dropped; content that is
    /// neither staged nor committed yet is staged; a staged file whose content
    /// matches the head commit again is unstaged.
    pub fn add(
        &mut self,
        file_name: &str,
        blob_oid: &ObjectId,
        head_blob: Option<&ObjectId>,
    ) -> AddOutcome {
        let outcome = if self.removal.values().any(|oid| oid == blob_oid) {
            self.removal.remove(file_name);
            AddOutcome::RemovalUnstaged
        } else if !self.addition.values().any(|oid| oid == blob_oid)
            && head_blob != Some(blob_oid)
        {
            self.addition
                .insert(file_name.to_string(), blob_oid.clone());
            AddOutcome::Staged
        } else if self.addition.contains_key(file_name) && head_blob == Some(blob_oid) {
            self.addition.remove(file_name);
            AddOutcome::AdditionUnstaged
        } else {
            AddOutcome::Unchanged
        };

        if outcome != AddOutcome::Unchanged {
            self.changed = true;
        }
        tracing::debug!(file_name, %blob_oid, ?outcome, "staged file for addition");

        outcome
    }

    /// Unstage `file_name` and stage it for removal
    ///
    /// A tracked file is always staged for removal. A file only staged for
    /// addition is staged for removal when it is already gone from the working
    /// directory, with the content it was added with.
    ///
    /// Returns whether the working copy of the file must be deleted, which is the
    /// case when the file is tracked and still present.
    pub fn remove(
        &mut self,
        file_name: &str,
        head_blob: Option<&ObjectId>,
        file_exists: bool,
    ) -> anyhow::Result<bool> {
        if !self.addition.contains_key(file_name) && head_blob.is_none() {
            return Err(RepositoryError::NoReasonToRemove.into());
        }

        let staged_blob = self.addition.remove(file_name);
        self.changed = true;

        let removed_blob = match (head_blob, staged_blob) {
            (Some(blob_oid), _) => Some(blob_oid.clone()),
            (None, Some(blob_oid)) if !file_exists => Some(blob_oid),
            (None, _) => None,
        };

        match removed_blob {
            Some(blob_oid) => {
                tracing::debug!(file_name, %blob_oid, "staged file for removal");
                self.removal.insert(file_name.to_string(), blob_oid);
                Ok(head_blob.is_some() && file_exists)
            }
            None => Ok(false),
        }
    }

    /// Load both stages from disk
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on each stage file while reading it.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.addition = Self::read_stage_file(&self.stage_file_path(ADDITION_FILE))?;
        self.removal = Self::read_stage_file(&self.stage_file_path(REMOVAL_FILE))?;
        self.changed = false;

        Ok(())
    }

    /// Persist both stages to disk unless nothing changed since the last load
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on each stage file while writing it.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("Unable to create stage directory {:?}", self.path))?;

        Self::write_stage_file(&self.stage_file_path(ADDITION_FILE), &self.addition)?;
        Self::write_stage_file(&self.stage_file_path(REMOVAL_FILE), &self.removal)?;
        self.changed = false;

        tracing::debug!(
            additions = self.addition.len(),
            removals = self.removal.len(),
            "persisted stage"
        );

        Ok(())
    }

    fn stage_file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    fn read_stage_file(path: &Path) -> anyhow::Result<StagedFiles> {
        if !path.exists() {
            return Ok(StagedFiles::new());
        }

        let mut stage_file = std::fs::OpenOptions::new()
            .read(true)
            .open(path)
            .with_context(|| format!("Unable to open stage file {:?}", path))?;
        let mut lock = file_guard::lock(&mut stage_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(StagedFiles::new());
        }

        let mut reader = Checksum::new(lock);
        let header = StageHeader::parse(&reader.read(HEADER_SIZE)?)?;

        let mut staged_files = StagedFiles::new();
        for _ in 0..header.entries_count {
            let (oid, name_length) = StageEntry::parse_fixed(&reader.read(ENTRY_FIXED_SIZE)?)?;
            let name = String::from_utf8(reader.read(name_length)?.to_vec())
                .with_context(|| format!("Invalid file name in stage file {:?}", path))?;

            staged_files.insert(name, oid);
        }

        reader.verify()?;

        Ok(staged_files)
    }

    fn write_stage_file(path: &Path, staged_files: &StagedFiles) -> anyhow::Result<()> {
        let mut stage_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Unable to open stage file {:?}", path))?;
        let lock = file_guard::lock(&mut stage_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);
        writer.write(&StageHeader::with_count(staged_files.len() as u32).serialize()?)?;

        for (name, oid) in staged_files {
            writer.write(&StageEntry::new(name.clone(), oid.clone()).serialize()?)?;
        }

        writer.write_checksum()
    }
}
