use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;

/// First-parent history of a commit, newest first
///
/// The walk is lazy and ends at the root commit. Cloning a `History` yields an
/// independent walk from the same position, so a history can be restarted.
#[derive(Debug, Clone)]
pub struct History<'d> {
    database: &'d Database,
    next_oid: Option<ObjectId>,
}

impl<'d> History<'d> {
    pub fn new(database: &'d Database, start_oid: ObjectId) -> Self {
        History {
            database,
            next_oid: Some(start_oid),
        }
    }
}

impl Iterator for History<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.next_oid.take()?;

        match self.database.load_commit(&commit_oid) {
            Ok(commit) => {
                // Move to the first parent for the next iteration
                self.next_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            Err(error) => Some(Err(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct LinearHistory {
        _dir: TempDir,
        database: Database,
        oids: Vec<ObjectId>,
    }

    #[fixture]
    fn linear_history() -> LinearHistory {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let database = Database::new(dir.path().join("objects").into_boxed_path());

        let root = Commit::root("initial commit".to_string());
        let root_oid = database.store(&root).unwrap();
        let mut oids = vec![root_oid.clone()];

        let mut parent = (root_oid, root);
        for (index, message) in ["first", "second"].iter().enumerate() {
            let timestamp = DateTime::parse_from_rfc2822("Sun, 1 Jan 2023 12:00:00 +0000")
                .unwrap()
                + chrono::Duration::minutes(index as i64);
            let child = Commit::child_of(
                parent.0.clone(),
                &parent.1,
                None,
                message.to_string(),
                timestamp,
            );
            let child_oid = database.store(&child).unwrap();
            oids.push(child_oid.clone());
            parent = (child_oid, child);
        }

        LinearHistory {
            _dir: dir,
            database,
            oids,
        }
    }

    #[rstest]
    fn walks_from_start_to_root(linear_history: LinearHistory) {
        let start = linear_history.oids.last().unwrap().clone();
        let messages = History::new(&linear_history.database, start)
            .map(|entry| entry.map(|(_, commit)| commit.message().to_string()))
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();

        assert_eq!(messages, vec!["second", "first", "initial commit"]);
    }

    #[rstest]
    fn cloned_history_restarts_independently(linear_history: LinearHistory) {
        let start = linear_history.oids.last().unwrap().clone();
        let mut history = History::new(&linear_history.database, start);
        let restarted = history.clone();

        history.next();
        assert_eq!(history.count(), 2);
        assert_eq!(restarted.count(), 3);
    }

    #[rstest]
    fn unknown_start_yields_an_error(linear_history: LinearHistory) {
        let unknown = ObjectId::try_parse("f".repeat(40)).unwrap();
        let mut history = History::new(&linear_history.database, unknown);

        assert!(history.next().unwrap().is_err());
        assert!(history.next().is_none());
    }
}
