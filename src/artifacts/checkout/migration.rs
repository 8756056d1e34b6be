//! Working tree migration
//!
//! A migration lists the file system actions needed to turn the working files of
//! one commit into those of another:
//! - `Delete`: tracked by the current commit, absent from the target
//! - `Add`: tracked by the target only
//! - `Modify`: tracked by both; the target version is written back

use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    Delete,
    Add,
    Modify,
}

/// Planned actions keyed by type, each a file name and the blob to write
pub type Actions = BTreeMap<ActionType, Vec<(String, Option<ObjectId>)>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    actions: Actions,
}

impl Migration {
    pub fn between(current: &TrackedFiles, target: &TrackedFiles) -> Self {
        let mut actions = Actions::from([
            (ActionType::Delete, Vec::new()),
            (ActionType::Add, Vec::new()),
            (ActionType::Modify, Vec::new()),
        ]);

        for file_name in current.keys().filter(|name| !target.contains_key(*name)) {
            actions
                .entry(ActionType::Delete)
                .or_default()
                .push((file_name.clone(), None));
        }

        for (file_name, blob_oid) in target {
            let action = if current.contains_key(file_name) {
                ActionType::Modify
            } else {
                ActionType::Add
            };

            actions
                .entry(action)
                .or_default()
                .push((file_name.clone(), Some(blob_oid.clone())));
        }

        Migration { actions }
    }

    pub fn actions(&self) -> &Actions {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.values().all(Vec::is_empty)
    }
}
