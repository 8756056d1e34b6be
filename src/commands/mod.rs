//! Command implementations
//!
//! - `porcelain`: user-facing version control workflows (add, commit, merge, etc.)

pub mod porcelain;
