//! Stage file format
//!
//! Each of the two stages (addition and removal) is persisted as its own file:
//!
//! - Header: signature, version and entry count
//! - Entries: blob ID (20 bytes), name length (u16) and file name, in name order
//! - Checksum: SHA-1 of everything above, verified on load

pub mod checksum;
pub mod stage_entry;
pub mod stage_header;

pub const SIGNATURE: &str = "STGE";
pub const VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 12;
pub const CHECKSUM_SIZE: usize = 20;
