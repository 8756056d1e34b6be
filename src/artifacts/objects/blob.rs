//! Blob object
//!
//! Blobs store the bytes of one file. Unlike the payload, the identity of a blob
//! also covers the name of the file it was read from:
//! `id = SHA-1(content ++ utf8(file name))`.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::{Object, Packable, Unpackable, hash_bytes, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::io::BufRead;

/// Snapshot of a file's content
///
/// A blob read back from the database does not know its file name; its id is
/// the key it was loaded by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    content: Bytes,
    file_name: String,
}

impl Blob {
    pub fn new(content: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Blob {
            content: content.into(),
            file_name: file_name.into(),
        }
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(with_header(self.object_type(), &self.content))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        Ok(Self::new(Bytes::from(content), String::new()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn object_id(&self) -> anyhow::Result<ObjectId> {
        let mut keyed_content = Vec::with_capacity(self.content.len() + self.file_name.len());
        keyed_content.extend_from_slice(&self.content);
        keyed_content.extend_from_slice(self.file_name.as_bytes());

        hash_bytes(&keyed_content)
    }
}
