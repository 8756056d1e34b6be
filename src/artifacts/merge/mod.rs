//! Merge machinery
//!
//! - `split_point`: common ancestor search used as the merge base
//! - `three_way`: per-file classification of a three-way merge

pub mod split_point;
pub mod three_way;
