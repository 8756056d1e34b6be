//! Commit history traversal
//!
//! - `history`: lazy first-parent walk from a commit down to the root commit

pub mod history;
