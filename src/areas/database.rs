//! Object store
//!
//! Content-addressed storage for blobs and commits. Objects are zlib-compressed
//! and laid out as `<objects>/<namespace>/<2 hex>/<38 hex>`, where the namespace
//! is `blobs` or `commits`. Stored objects are never rewritten.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Directory holding every object of the given type
    pub fn namespace_path(&self, object_type: ObjectType) -> PathBuf {
        self.path.join(object_type.namespace())
    }

    /// Store an object unless an object with the same ID already exists
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object.object_path()?);

        if object_path.exists() {
            tracing::trace!(%object_id, "object already stored");
            return Ok(object_id);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(object_path, object.serialize()?)?;
        tracing::debug!(%object_id, object_type = %object.object_type(), "stored object");

        Ok(object_id)
    }

    pub fn contains(&self, object_type: ObjectType, object_id: &ObjectId) -> bool {
        self.namespace_path(object_type)
            .join(object_id.to_path())
            .exists()
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let object_reader = self.parse_object_as_bytes(ObjectType::Blob, object_id)?;
        Blob::deserialize(object_reader)
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let object_reader = self.parse_object_as_bytes(ObjectType::Commit, object_id)?;
        Commit::deserialize(object_reader)
    }

    /// Resolve a full or abbreviated commit ID
    ///
    /// Abbreviations are matched against every stored commit; an abbreviation
    /// matching none or several commits is reported as an unknown commit.
    pub fn resolve_commit_id(&self, id: &str) -> anyhow::Result<ObjectId> {
        if id.len() == OBJECT_ID_LENGTH {
            let object_id =
                ObjectId::try_parse(id.to_string()).map_err(|_| RepositoryError::UnknownCommit)?;

            return if self.contains(ObjectType::Commit, &object_id) {
                Ok(object_id)
            } else {
                Err(RepositoryError::UnknownCommit.into())
            };
        }

        if id.is_empty() || id.len() > OBJECT_ID_LENGTH {
            return Err(RepositoryError::UnknownCommit.into());
        }

        let mut matches = self.find_commits_by_prefix(id)?;
        if matches.len() != 1 {
            tracing::debug!(prefix = id, candidates = matches.len(), "unresolvable commit prefix");
            return Err(RepositoryError::UnknownCommit.into());
        }

        matches.pop().ok_or_else(|| RepositoryError::UnknownCommit.into())
    }

    /// Resolve a full or abbreviated commit ID and load the commit
    pub fn find_commit(&self, id: &str) -> anyhow::Result<(ObjectId, Commit)> {
        let object_id = self.resolve_commit_id(id)?;
        let commit = self.load_commit(&object_id)?;

        Ok((object_id, commit))
    }

    /// Find all commits whose ID starts with the given prefix
    pub fn find_commits_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        Ok(self
            .list_commits()?
            .into_iter()
            .filter(|oid| oid.starts_with(prefix))
            .collect())
    }

    /// IDs of every stored commit, in ascending order
    pub fn list_commits(&self) -> anyhow::Result<Vec<ObjectId>> {
        let commits_path = self.namespace_path(ObjectType::Commit);
        if !commits_path.exists() {
            return Ok(Vec::new());
        }

        let mut commit_ids = WalkDir::new(&commits_path)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_string_lossy().to_string();
                let dir_name = entry
                    .path()
                    .parent()?
                    .file_name()?
                    .to_string_lossy()
                    .to_string();

                ObjectId::try_parse(format!("{dir_name}{file_name}")).ok()
            })
            .collect::<Vec<_>>();

        commit_ids.sort();
        Ok(commit_ids)
    }

    fn parse_object_as_bytes(
        &self,
        expected_type: ObjectType,
        object_id: &ObjectId,
    ) -> anyhow::Result<impl BufRead> {
        let object_path = self
            .namespace_path(expected_type)
            .join(object_id.to_path());

        if !object_path.exists() {
            return Err(match expected_type {
                ObjectType::Commit => RepositoryError::UnknownCommit.into(),
                ObjectType::Blob => anyhow::anyhow!("No blob with id {} found", object_id),
            });
        }

        let object_content = self.read_object(object_path)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;
        if object_type != expected_type {
            anyhow::bail!(
                "object {} is a {}, expected a {}",
                object_id,
                object_type,
                expected_type
            );
        }

        Ok(object_reader)
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
