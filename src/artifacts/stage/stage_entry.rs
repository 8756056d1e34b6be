use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::anyhow;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

/// Size of the fixed part of an entry: binary blob ID and name length
pub const ENTRY_FIXED_SIZE: usize = 22;

/// One staged file: its name and the blob ID it is staged with
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StageEntry {
    pub name: String,
    pub oid: ObjectId,
}

impl StageEntry {
    /// Parse the fixed part of an entry, returning the blob ID and the name length
    pub(crate) fn parse_fixed(bytes: &[u8]) -> anyhow::Result<(ObjectId, usize)> {
        if bytes.len() < ENTRY_FIXED_SIZE {
            return Err(anyhow!("Invalid stage entry size"));
        }

        let oid = ObjectId::read_h40_from(&mut &bytes[..20])?;
        let name_length = byteorder::NetworkEndian::read_u16(&bytes[20..22]) as usize;

        Ok((oid, name_length))
    }
}

impl Packable for StageEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let name_length = u16::try_from(self.name.len())
            .map_err(|_| anyhow!("File name too long to stage: {}", self.name))?;

        let mut bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + self.name.len());
        self.oid.write_h40_to(&mut bytes)?;
        bytes.write_u16::<byteorder::NetworkEndian>(name_length)?;
        bytes.write_all(self.name.as_bytes())?;

        Ok(Bytes::from(bytes))
    }
}
