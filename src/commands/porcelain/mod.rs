//! Porcelain commands
//!
//! Each command is an `impl Repository` block. Commands check their
//! preconditions first and only then touch the stores, so a rejected command
//! leaves the repository unchanged. Output goes to the repository writer.
//!
//! ## Commands
//!
//! - `init`: Create the repository with its root commit
//! - `add` / `rm`: Stage files for addition or removal
//! - `commit`: Record the staged changes
//! - `log` / `global_log` / `find`: Inspect commits
//! - `status`: Show branches and staged files
//! - `restore`: Bring back a file version from a commit
//! - `branch` / `rm_branch`: Create or delete branches
//! - `switch` / `reset`: Move the working tree to another commit
//! - `merge`: Three-way merge of another branch into the current one

pub mod add;
pub mod branch;
pub mod commit;
pub mod find;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod restore;
pub mod rm;
pub mod status;
pub mod switch;
