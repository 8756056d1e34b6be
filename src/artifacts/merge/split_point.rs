//! Split point search
//!
//! The split point of two commits is the common ancestor used as the base of a
//! three-way merge. It is found in two breadth-first passes over the commit graph,
//! both following first and second parents:
//!
//! 1. Collect every ancestor of the `head` commit (the commit itself included).
//! 2. Walk breadth-first from the `other` commit and return the first commit that
//!    was collected in the first pass.
//!
//! This is not a true lowest common ancestor: ties between several candidates are
//! broken by the discovery order of the second pass, so the result is not
//! symmetric in its arguments.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let finder = SplitPointFinder::new(|commit_id| {
//!     let commit = database.load_commit(commit_id)?;
//!     Ok(commit.parents().cloned().collect())
//! });
//!
//! let split_point = finder.find_split_point(&head_oid, &other_oid)?;
//! ```

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

/// Breadth-first split point finder
///
/// # Type Parameters
///
/// * `ParentsLoaderFn` - Returns the parents of a commit, first parent first. Root
///   commits have no parents.
#[derive(Debug, Clone)]
pub struct SplitPointFinder<ParentsLoaderFn>
where
    ParentsLoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    parents_loader: ParentsLoaderFn,
}

impl<ParentsLoaderFn> SplitPointFinder<ParentsLoaderFn>
where
    ParentsLoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(parents_loader: ParentsLoaderFn) -> Self {
        Self { parents_loader }
    }

    /// Every commit reachable from `commit_id`, itself included
    pub fn ancestors(&self, commit_id: &ObjectId) -> anyhow::Result<HashSet<ObjectId>> {
        let mut ancestors = HashSet::new();
        let mut queue = VecDeque::from([commit_id.clone()]);

        while let Some(current) = queue.pop_front() {
            if !ancestors.insert(current.clone()) {
                continue;
            }

            queue.extend((self.parents_loader)(&current)?);
        }

        Ok(ancestors)
    }

    /// First ancestor of `other_id`, in breadth-first order, that is also an
    /// ancestor of `head_id`
    ///
    /// Returns `None` when the two histories never converge.
    pub fn find_split_point(
        &self,
        head_id: &ObjectId,
        other_id: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let head_ancestors = self.ancestors(head_id)?;
        tracing::trace!(%head_id, ancestors = head_ancestors.len(), "collected head ancestors");

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([other_id.clone()]);

        while let Some(current) = queue.pop_front() {
            if head_ancestors.contains(&current) {
                tracing::debug!(%head_id, %other_id, split_point = %current, "found split point");
                return Ok(Some(current));
            }

            if !visited.insert(current.clone()) {
                continue;
            }

            queue.extend((self.parents_loader)(&current)?);
        }

        tracing::debug!(%head_id, %other_id, "histories never converge");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::collections::HashMap;

    /// In-memory commit graph for testing
    #[derive(Debug, Clone, Default)]
    struct InMemoryCommitStore {
        commits: HashMap<ObjectId, Vec<ObjectId>>,
    }

    impl InMemoryCommitStore {
        fn add_commit(&mut self, commit_id: ObjectId, parents: Vec<ObjectId>) {
            self.commits.insert(commit_id, parents);
        }

        fn finder(
            &self,
        ) -> SplitPointFinder<impl Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>> + '_> {
            SplitPointFinder::new(|commit_id: &ObjectId| {
                self.commits
                    .get(commit_id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("unknown commit {}", commit_id))
            })
        }
    }

    fn create_oid(id: &str) -> ObjectId {
        // Create a deterministic 40-character hex ObjectId from string for testing
        let mut hex_string = id
            .as_bytes()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<String>();

        hex_string.truncate(40);
        while hex_string.len() < 40 {
            hex_string.push('0');
        }

        ObjectId::try_parse(hex_string).unwrap()
    }

    #[fixture]
    fn linear_history() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();

        // Linear history: A <- B <- C <- D
        store.add_commit(create_oid("commit_a"), vec![]);
        store.add_commit(create_oid("commit_b"), vec![create_oid("commit_a")]);
        store.add_commit(create_oid("commit_c"), vec![create_oid("commit_b")]);
        store.add_commit(create_oid("commit_d"), vec![create_oid("commit_c")]);

        store
    }

    #[fixture]
    fn simple_divergence() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();

        //     A
        //    / \
        //   B   C
        //   |   |
        //   D   E
        store.add_commit(create_oid("commit_a"), vec![]);
        store.add_commit(create_oid("commit_b"), vec![create_oid("commit_a")]);
        store.add_commit(create_oid("commit_c"), vec![create_oid("commit_a")]);
        store.add_commit(create_oid("commit_d"), vec![create_oid("commit_b")]);
        store.add_commit(create_oid("commit_e"), vec![create_oid("commit_c")]);

        store
    }

    #[fixture]
    fn criss_cross_merge() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();

        //     A
        //    / \
        //   B   C
        //   |\ /|
        //   | X |
        //   |/ \|
        //   D   E
        //
        // D = merge(B, C), E = merge(C, B)
        store.add_commit(create_oid("commit_a"), vec![]);
        store.add_commit(create_oid("commit_b"), vec![create_oid("commit_a")]);
        store.add_commit(create_oid("commit_c"), vec![create_oid("commit_a")]);
        store.add_commit(
            create_oid("commit_d"),
            vec![create_oid("commit_b"), create_oid("commit_c")],
        );
        store.add_commit(
            create_oid("commit_e"),
            vec![create_oid("commit_c"), create_oid("commit_b")],
        );

        store
    }

    #[rstest]
    #[case("commit_d", "commit_b", "commit_b")]
    #[case("commit_b", "commit_d", "commit_b")]
    #[case("commit_c", "commit_c", "commit_c")]
    #[case("commit_a", "commit_d", "commit_a")]
    fn split_point_in_linear_history(
        linear_history: InMemoryCommitStore,
        #[case] head: &str,
        #[case] other: &str,
        #[case] expected: &str,
    ) {
        let split_point = linear_history
            .finder()
            .find_split_point(&create_oid(head), &create_oid(other))
            .unwrap();

        assert_eq!(split_point, Some(create_oid(expected)));
    }

    #[rstest]
    fn split_point_of_diverged_branches(simple_divergence: InMemoryCommitStore) {
        let finder = simple_divergence.finder();

        assert_eq!(
            finder
                .find_split_point(&create_oid("commit_d"), &create_oid("commit_e"))
                .unwrap(),
            Some(create_oid("commit_a"))
        );
        assert_eq!(
            finder
                .find_split_point(&create_oid("commit_e"), &create_oid("commit_d"))
                .unwrap(),
            Some(create_oid("commit_a"))
        );
    }

    #[rstest]
    fn split_point_follows_other_side_discovery_order(criss_cross_merge: InMemoryCommitStore) {
        let finder = criss_cross_merge.finder();

        // E's first parent is C, so C is discovered before B
        assert_eq!(
            finder
                .find_split_point(&create_oid("commit_d"), &create_oid("commit_e"))
                .unwrap(),
            Some(create_oid("commit_c"))
        );
        // D's first parent is B
        assert_eq!(
            finder
                .find_split_point(&create_oid("commit_e"), &create_oid("commit_d"))
                .unwrap(),
            Some(create_oid("commit_b"))
        );
    }

    #[rstest]
    fn split_point_follows_second_parents() {
        let mut store = InMemoryCommitStore::default();

        //   A   X
        //   |   |
        //   B   Y
        //    \ /
        //     M (merge of B and Y)
        store.add_commit(create_oid("commit_a"), vec![]);
        store.add_commit(create_oid("commit_b"), vec![create_oid("commit_a")]);
        store.add_commit(create_oid("commit_x"), vec![]);
        store.add_commit(create_oid("commit_y"), vec![create_oid("commit_x")]);
        store.add_commit(
            create_oid("commit_m"),
            vec![create_oid("commit_b"), create_oid("commit_y")],
        );

        assert_eq!(
            store
                .finder()
                .find_split_point(&create_oid("commit_m"), &create_oid("commit_y"))
                .unwrap(),
            Some(create_oid("commit_y"))
        );
    }

    #[rstest]
    fn disconnected_histories_have_no_split_point() {
        let mut store = InMemoryCommitStore::default();
        store.add_commit(create_oid("commit_a"), vec![]);
        store.add_commit(create_oid("commit_x"), vec![]);

        assert_eq!(
            store
                .finder()
                .find_split_point(&create_oid("commit_a"), &create_oid("commit_x"))
                .unwrap(),
            None
        );
    }

    #[rstest]
    fn ancestors_include_both_parents(criss_cross_merge: InMemoryCommitStore) {
        let ancestors = criss_cross_merge
            .finder()
            .ancestors(&create_oid("commit_d"))
            .unwrap();

        assert_eq!(
            ancestors,
            HashSet::from([
                create_oid("commit_a"),
                create_oid("commit_b"),
                create_oid("commit_c"),
                create_oid("commit_d"),
            ])
        );
    }

    #[rstest]
    fn unknown_commit_is_reported(linear_history: InMemoryCommitStore) {
        assert!(
            linear_history
                .finder()
                .find_split_point(&create_oid("commit_d"), &create_oid("commit_z"))
                .is_err()
        );
    }
}
