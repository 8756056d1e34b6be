//! Data structures and algorithms
//!
//! - `branch`: Branch name validation
//! - `checkout`: Working tree replacement and untracked-file protection
//! - `log`: Commit history traversal
//! - `merge`: Split point search and three-way classification
//! - `objects`: Blob and commit objects
//! - `stage`: On-disk format of the addition/removal stages

pub mod branch;
pub mod checkout;
pub mod log;
pub mod merge;
pub mod objects;
pub mod stage;
