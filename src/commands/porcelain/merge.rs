use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::conflict::ensure_no_untracked_overwritten;
use crate::artifacts::merge::split_point::SplitPointFinder;
use crate::artifacts::merge::three_way::{MergeAction, MergePlan, conflict_content};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, commit_timestamp};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use bytes::Bytes;
use std::io::Write;

/// Result of merging a branch into the current one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The current branch was an ancestor and now points at the given branch
    FastForwarded,
    /// The given branch is already contained in the current branch
    AncestorOfCurrent,
    /// A merge commit was created; `conflicts` lists the files holding conflict markers
    Merged {
        commit: ObjectId,
        conflicts: Vec<String>,
    },
}

impl Repository {
    /// Merge the given branch into the current branch
    ///
    /// Preconditions are checked in order: the branch exists, differs from the
    /// current branch, nothing is staged and no untracked file would be
    /// overwritten. Content conflicts do not abort the merge: the conflicted
    /// files are written with conflict markers and tracked by the merge commit.
    pub async fn merge(&mut self, branch_name: &str) -> anyhow::Result<MergeOutcome> {
        self.ensure_initialized()?;

        let other_branch = BranchName::try_parse(branch_name.to_string())
            .map_err(|_| RepositoryError::UnknownBranch)?;
        let other_oid = self.refs().branch_head(&other_branch)?;

        let head_branch = self.refs().head_branch()?;
        if head_branch == other_branch {
            return Err(RepositoryError::MergeWithSelf.into());
        }

        let stage = self.stage();
        let mut stage = stage.lock().await;

        stage.rehydrate()?;
        if !stage.is_empty() {
            return Err(RepositoryError::UncommittedChanges.into());
        }

        let head_oid = self.refs().branch_head(&head_branch)?;
        let head = self.database().load_commit(&head_oid)?;
        let other = self.database().load_commit(&other_oid)?;

        ensure_no_untracked_overwritten(
            &self.workspace().list_files()?,
            head.tracked_files(),
            other.tracked_files(),
        )?;

        let split_oid = {
            let database = self.database();
            let split_point_finder = SplitPointFinder::new(|oid: &ObjectId| {
                Ok(database.load_commit(oid)?.parents().cloned().collect())
            });

            split_point_finder
                .find_split_point(&head_oid, &other_oid)?
                .ok_or_else(|| {
                    RepositoryError::NoCommonAncestor(
                        head_branch.to_string(),
                        other_branch.to_string(),
                    )
                })?
        };

        if split_oid == head_oid {
            self.replace_tracked_files(&head, &other)?;
            self.refs().set_branch_head(&head_branch, &other_oid)?;
            writeln!(self.writer(), "Current branch fast-forwarded.")?;

            return Ok(MergeOutcome::FastForwarded);
        }

        if split_oid == other_oid {
            writeln!(
                self.writer(),
                "Given branch is an ancestor of the current branch."
            )?;

            return Ok(MergeOutcome::AncestorOfCurrent);
        }

        let split = self.database().load_commit(&split_oid)?;
        let plan = MergePlan::classify(
            split.tracked_files(),
            head.tracked_files(),
            other.tracked_files(),
        );

        let message = format!("Merged {} into {}.", other_branch, head_branch);
        let mut merge_commit = Commit::child_of(
            head_oid.clone(),
            &head,
            Some(other_oid.clone()),
            message,
            commit_timestamp(),
        );
        self.apply_merge_plan(&plan, &mut merge_commit)?;

        let conflicts = plan.conflicts().map(str::to_string).collect::<Vec<_>>();
        if !conflicts.is_empty() {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        let commit_oid = self.database().store(&merge_commit)?;
        self.refs().set_branch_head(&head_branch, &commit_oid)?;

        stage.clear();
        stage.write_updates()?;

        tracing::info!(
            %commit_oid,
            %split_oid,
            conflicts = conflicts.len(),
            "created merge commit"
        );

        Ok(MergeOutcome::Merged {
            commit: commit_oid,
            conflicts,
        })
    }

    fn apply_merge_plan(&self, plan: &MergePlan, merge_commit: &mut Commit) -> anyhow::Result<()> {
        for (file_name, action) in plan.actions() {
            match action {
                MergeAction::TakeOther(blob_oid) => {
                    let blob = self.database().load_blob(blob_oid)?;
                    self.workspace().write_file(file_name, blob.content())?;
                    merge_commit.track(file_name.clone(), blob_oid.clone());
                }
                MergeAction::Delete => {
                    self.workspace().remove_file(file_name)?;
                    merge_commit.untrack(file_name);
                }
                MergeAction::Conflict { head, other } => {
                    let content = conflict_content(
                        &self.blob_content(head.as_ref())?,
                        &self.blob_content(other.as_ref())?,
                    );
                    self.workspace().write_file(file_name, &content)?;

                    let blob_oid = self
                        .database()
                        .store(&Blob::new(content, file_name.as_str()))?;
                    merge_commit.track(file_name.clone(), blob_oid);

                    tracing::debug!(%file_name, "wrote conflict markers");
                }
            }
        }

        Ok(())
    }

    // A missing side of a conflict has no content
    fn blob_content(&self, blob_oid: Option<&ObjectId>) -> anyhow::Result<Bytes> {
        match blob_oid {
            Some(blob_oid) => Ok(self.database().load_blob(blob_oid)?.content().clone()),
            None => Ok(Bytes::new()),
        }
    }
}
