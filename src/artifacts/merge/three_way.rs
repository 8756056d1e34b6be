//! Three-way file classification
//!
//! Compares the files tracked by the split point (`s`), the current head (`h`) and
//! the merged-in commit (`o`). Only changes coming from the other side produce an
//! action; everything else keeps the head version.
//!
//! | h vs s    | o vs s    | h vs o | action                    |
//! |-----------|-----------|--------|---------------------------|
//! | unchanged | unchanged |        | keep                      |
//! | unchanged | changed   |        | take other                |
//! | changed   | unchanged |        | keep                      |
//! | changed   | changed   | equal  | keep                      |
//! | changed   | changed   | differ | conflict                  |
//! | unchanged | absent    |        | delete                    |
//! | absent    | unchanged |        | keep (stays absent)       |
//! | changed   | absent    |        | conflict                  |
//! | absent    | changed   |        | conflict                  |
//!
//! Files absent from the split point are taken from the other side when the head
//! does not track them, and conflict when both sides added different content.

use crate::artifacts::objects::commit::TrackedFiles;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

pub const CONFLICT_HEAD_MARKER: &str = "<<<<<<< HEAD\n";
pub const CONFLICT_SEPARATOR: &str = "=======\n";
pub const CONFLICT_END_MARKER: &str = ">>>>>>>\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAction {
    /// Restore the other side's blob into the working tree and track it
    TakeOther(ObjectId),
    /// Remove the file from the working tree and stop tracking it
    Delete,
    /// Both sides changed the file differently; `None` marks a deleted side
    Conflict {
        head: Option<ObjectId>,
        other: Option<ObjectId>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    actions: BTreeMap<String, MergeAction>,
}

impl MergePlan {
    pub fn classify(split: &TrackedFiles, head: &TrackedFiles, other: &TrackedFiles) -> Self {
        let mut actions = BTreeMap::new();

        for (file_name, split_oid) in split {
            let action = Self::classify_tracked(
                split_oid,
                head.get(file_name),
                other.get(file_name),
            );

            if let Some(action) = action {
                actions.insert(file_name.clone(), action);
            }
        }

        for (file_name, other_oid) in other.iter().filter(|(name, _)| !split.contains_key(*name)) {
            let action = match head.get(file_name) {
                None => Some(MergeAction::TakeOther(other_oid.clone())),
                Some(head_oid) if head_oid != other_oid => Some(MergeAction::Conflict {
                    head: Some(head_oid.clone()),
                    other: Some(other_oid.clone()),
                }),
                Some(_) => None,
            };

            if let Some(action) = action {
                actions.insert(file_name.clone(), action);
            }
        }

        tracing::debug!(actions = ?actions, "classified merge");

        MergePlan { actions }
    }

    fn classify_tracked(
        split: &ObjectId,
        head: Option<&ObjectId>,
        other: Option<&ObjectId>,
    ) -> Option<MergeAction> {
        let head_changed = head != Some(split);
        let other_changed = other != Some(split);

        match (head, other) {
            (_, _) if !other_changed => None,
            (Some(_), Some(other)) if !head_changed => Some(MergeAction::TakeOther(other.clone())),
            (Some(_), None) if !head_changed => Some(MergeAction::Delete),
            (None, None) => None,
            (head, other) if head == other => None,
            (head, other) => Some(MergeAction::Conflict {
                head: head.cloned(),
                other: other.cloned(),
            }),
        }
    }

    pub fn actions(&self) -> &BTreeMap<String, MergeAction> {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        self.conflicts().next().is_some()
    }

    /// Names of the conflicted files, in ascending order
    pub fn conflicts(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(|(_, action)| matches!(action, MergeAction::Conflict { .. }))
            .map(|(file_name, _)| file_name.as_str())
    }
}

/// Both versions of a conflicted file wrapped in conflict markers
///
/// A missing side contributes no content. Each non-empty side is terminated by a
/// newline so the markers always start a line.
pub fn conflict_content(head: &[u8], other: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(
        head.len() + other.len() + CONFLICT_HEAD_MARKER.len() + CONFLICT_SEPARATOR.len() + 32,
    );

    content.extend_from_slice(CONFLICT_HEAD_MARKER.as_bytes());
    push_line_terminated(&mut content, head);
    content.extend_from_slice(CONFLICT_SEPARATOR.as_bytes());
    push_line_terminated(&mut content, other);
    content.extend_from_slice(CONFLICT_END_MARKER.as_bytes());

    content
}

fn push_line_terminated(content: &mut Vec<u8>, side: &[u8]) {
    content.extend_from_slice(side);
    if side.last().is_some_and(|byte| *byte != b'\n') {
        content.push(b'\n');
    }
}
