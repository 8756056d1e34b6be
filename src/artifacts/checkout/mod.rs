//! Working tree replacement
//!
//! Moving the working directory from one commit to another (switch, reset,
//! fast-forward merge) happens in two steps:
//! - Detect untracked files the target commit would overwrite
//! - Plan and apply the file system changes as a [`migration::Migration`]
//!
//! Conflicts are detected before any file is touched.

pub mod conflict;
pub mod migration;
