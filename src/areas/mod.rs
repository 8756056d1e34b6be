//! Core repository components
//!
//! - `database`: Object store for blobs and commits
//! - `refs`: Branch table and HEAD
//! - `stage`: Addition and removal stages
//! - `repository`: Coordinates the stores for the commands
//! - `workspace`: Working directory file operations

pub mod database;
pub mod refs;
pub mod repository;
pub mod stage;
pub mod workspace;
