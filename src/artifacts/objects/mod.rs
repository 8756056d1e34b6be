//! Object types and operations
//!
//! Two kinds of immutable objects are stored, each identified by a SHA-1 hash:
//!
//! - **Blob**: the bytes of one file at one point in time
//! - **Commit**: tracked-file mapping plus message, timestamp and parent links
//!
//! All objects serialize to `<type> <size>\0<content>` before compression.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of the abbreviated form printed for merge parents
pub const SHORT_OBJECT_ID_LENGTH: usize = 7;
