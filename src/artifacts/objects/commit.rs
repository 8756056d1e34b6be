//! Commit object
//!
//! Commits are immutable snapshots of the tracked-file mapping. They contain:
//! - Up to two parent commit IDs (the second one only for merge commits)
//! - The commit timestamp with its timezone
//! - The tracked files (file name -> blob ID)
//! - The commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-sha>
//! parent <second-parent-sha>
//! date <unix-seconds> <timezone>
//! file <blob-sha> <file name>
//!
//! <commit message>
//! ```
//!
//! The commit ID is the hash of the whole payload, so it covers the tracked files.

use crate::COMMIT_DATE_ENV;
use crate::artifacts::objects::object::{Object, Packable, Unpackable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::BTreeMap;
use std::io::BufRead;

/// Tracked files of a commit, keyed by file name
pub type TrackedFiles = BTreeMap<String, ObjectId>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parent: Option<ObjectId>,
    second_parent: Option<ObjectId>,
    timestamp: DateTime<FixedOffset>,
    tracked_files: TrackedFiles,
    message: String,
}

impl Commit {
    /// Create the root commit: no parents, nothing tracked, stamped at the Unix epoch
    pub fn root(message: String) -> Self {
        Commit {
            parent: None,
            second_parent: None,
            timestamp: DateTime::<Utc>::UNIX_EPOCH.fixed_offset(),
            tracked_files: TrackedFiles::new(),
            message,
        }
    }

    /// Create a commit on top of `parent`
    ///
    /// The new commit starts from its own copy of the parent's tracked files;
    /// callers apply staged changes on top of it.
    pub fn child_of(
        parent_oid: ObjectId,
        parent: &Commit,
        second_parent: Option<ObjectId>,
        message: String,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Commit {
            parent: Some(parent_oid),
            second_parent,
            timestamp,
            tracked_files: parent.tracked_files.clone(),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.second_parent.as_ref()
    }

    /// First parent followed by the second one, when present
    pub fn parents(&self) -> impl Iterator<Item = &ObjectId> {
        self.parent.iter().chain(self.second_parent.iter())
    }

    pub fn is_merge(&self) -> bool {
        self.second_parent.is_some()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Format timestamp like "Thu Jan 1 00:00:00 1970 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn tracked_files(&self) -> &TrackedFiles {
        &self.tracked_files
    }

    pub fn tracked_blob(&self, file_name: &str) -> Option<&ObjectId> {
        self.tracked_files.get(file_name)
    }

    pub fn is_tracked(&self, file_name: &str) -> bool {
        self.tracked_files.contains_key(file_name)
    }

    /// Track `blob_oid` under `file_name`, replacing any previous version
    pub fn track(&mut self, file_name: String, blob_oid: ObjectId) {
        if self.tracked_files.get(&file_name) != Some(&blob_oid) {
            self.tracked_files.insert(file_name, blob_oid);
        }
    }

    pub fn untrack(&mut self, file_name: &str) -> Option<ObjectId> {
        self.tracked_files.remove(file_name)
    }
}

/// Timestamp for a new commit
///
/// Reads `BITLET_COMMIT_DATE` (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`) and falls
/// back to the current local time.
pub fn commit_timestamp() -> DateTime<FixedOffset> {
    std::env::var(COMMIT_DATE_ENV)
        .ok()
        .and_then(|date_str| {
            DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        })
        .unwrap_or_else(|| chrono::Local::now().fixed_offset())
}

fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<FixedOffset>> {
    let (seconds, timezone) = value
        .split_once(' ')
        .context("Invalid commit object: malformed date line")?;
    let seconds = seconds
        .parse::<i64>()
        .context("Invalid commit object: invalid timestamp")?;

    let offset = *DateTime::parse_from_str(
        &format!("1970-01-01 00:00:00 {timezone}"),
        "%Y-%m-%d %H:%M:%S %z",
    )
    .context("Invalid commit object: invalid timezone")?
    .offset();

    let utc = DateTime::from_timestamp(seconds, 0)
        .context("Invalid commit object: timestamp out of range")?;

    Ok(utc.with_timezone(&offset))
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        for parent in self.parents() {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        object_content.push(format!(
            "date {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for (file_name, blob_oid) in &self.tracked_files {
            object_content.push(format!("file {} {}", blob_oid.as_ref(), file_name));
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");

        Ok(with_header(self.object_type(), object_content.as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        let (header, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;

        let mut parents = Vec::new();
        let mut timestamp = None;
        let mut tracked_files = TrackedFiles::new();

        for line in header.lines() {
            if let Some(parent_oid) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(parent_oid.to_string())?);
            } else if let Some(date) = line.strip_prefix("date ") {
                timestamp = Some(parse_timestamp(date)?);
            } else if let Some(entry) = line.strip_prefix("file ") {
                let (blob_oid, file_name) = entry
                    .split_once(' ')
                    .context("Invalid commit object: malformed file line")?;
                tracked_files.insert(
                    file_name.to_string(),
                    ObjectId::try_parse(blob_oid.to_string())?,
                );
            } else {
                anyhow::bail!("Invalid commit object: unexpected line {line:?}");
            }
        }

        if parents.len() > 2 {
            anyhow::bail!("Invalid commit object: more than two parents");
        }
        let mut parents = parents.into_iter();

        Ok(Commit {
            parent: parents.next(),
            second_parent: parents.next(),
            timestamp: timestamp.context("Invalid commit object: missing date line")?,
            tracked_files,
            message: message.to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
