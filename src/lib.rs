//! A small, single-user version-control engine.
//!
//! The crate is split the same way the on-disk repository is:
//!
//! - `areas`: the stores backing a repository (objects, refs, stage, workspace)
//! - `artifacts`: data structures and algorithms operating on those stores
//! - `commands`: user-facing operations composed from areas and artifacts
//! - `errors`: the typed failures reported back to the command layer

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

/// Name of the repository directory created inside the working directory
pub const REPOSITORY_DIR: &str = ".bitlet";

/// Branch created by `init` and checked out afterwards
pub const DEFAULT_BRANCH: &str = "main";

/// Message of the root commit created by `init`
pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// Environment variable overriding the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "BITLET_COMMIT_DATE";

/// Environment variable holding the `tracing` filter used by the binary
pub const LOG_FILTER_ENV: &str = "BITLET_LOG";
