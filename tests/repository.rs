use crate::common::SharedBuffer;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use bitlet::areas::repository::Repository;
use bitlet::areas::stage::AddOutcome;
use bitlet::commands::porcelain::merge::MergeOutcome;
use bitlet::errors::{ErrorKind, RepositoryError, error_kind};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

mod common;

struct TestRepository {
    dir: TempDir,
    output: SharedBuffer,
    repository: Repository,
}

impl TestRepository {
    fn write(&self, file_name: &str, content: &str) {
        self.dir.child(file_name).write_str(content).unwrap();
    }

    async fn commit_file(&mut self, file_name: &str, content: &str, message: &str) {
        self.write(file_name, content);
        self.repository.add(file_name).await.unwrap();
        self.repository.commit(message).await.unwrap();
    }
}

#[fixture]
fn test_repository() -> TestRepository {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = SharedBuffer::default();
    let repository =
        Repository::new(&dir.path().to_string_lossy(), Box::new(output.clone())).unwrap();

    TestRepository {
        dir,
        output,
        repository,
    }
}

#[rstest]
#[tokio::test]
async fn add_then_rm_leaves_file_staged_for_removal(test_repository: TestRepository) {
    let mut test_repository = test_repository;
    test_repository.repository.init().await.unwrap();
    test_repository.commit_file("f.txt", "v1", "c1").await;

    test_repository.write("f.txt", "v2");
    let outcome = test_repository.repository.add("f.txt").await.unwrap();
    assert_eq!(outcome, AddOutcome::Staged);

    test_repository.repository.rm("f.txt").await.unwrap();

    let stage = test_repository.repository.stage();
    let mut stage = stage.lock().await;
    stage.rehydrate().unwrap();
    assert!(stage.addition().is_empty());
    assert_eq!(
        stage.removal().keys().collect::<Vec<_>>(),
        vec![&"f.txt".to_string()]
    );
}

#[rstest]
#[tokio::test]
async fn commit_empties_the_stage_and_advances_the_branch(test_repository: TestRepository) {
    let mut test_repository = test_repository;
    test_repository.repository.init().await.unwrap();
    let (parent_oid, _) = test_repository.repository.head_commit().unwrap();

    test_repository.write("f.txt", "v1");
    test_repository.repository.add("f.txt").await.unwrap();
    let commit_oid = test_repository.repository.commit("c1").await.unwrap();

    let (head_oid, head) = test_repository.repository.head_commit().unwrap();
    assert_eq!(head_oid, commit_oid);
    assert_eq!(head.parent(), Some(&parent_oid));
    assert!(head.is_tracked("f.txt"));

    let stage = test_repository.repository.stage();
    let mut stage = stage.lock().await;
    stage.rehydrate().unwrap();
    assert!(stage.is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_commit_write_keeps_stage_and_branch(test_repository: TestRepository) {
    let mut test_repository = test_repository;
    test_repository.repository.init().await.unwrap();
    let (parent_oid, _) = test_repository.repository.head_commit().unwrap();

    test_repository.write("f.txt", "v1");
    test_repository.repository.add("f.txt").await.unwrap();

    let commits_dir = test_repository.dir.path().join(".bitlet/objects/commits");
    let moved_dir = test_repository.dir.path().join("commits.moved");
    std::fs::rename(&commits_dir, &moved_dir).unwrap();
    std::fs::write(&commits_dir, "not a directory").unwrap();

    assert!(test_repository.repository.commit("c1").await.is_err());

    std::fs::remove_file(&commits_dir).unwrap();
    std::fs::rename(&moved_dir, &commits_dir).unwrap();

    let (head_oid, _) = test_repository.repository.head_commit().unwrap();
    assert_eq!(head_oid, parent_oid);

    let stage = test_repository.repository.stage();
    let mut stage = stage.lock().await;
    stage.rehydrate().unwrap();
    assert_eq!(
        stage.addition().keys().collect::<Vec<_>>(),
        vec![&"f.txt".to_string()]
    );
}

#[rstest]
#[tokio::test]
async fn rejected_commit_reports_invalid_state(test_repository: TestRepository) {
    let mut test_repository = test_repository;
    test_repository.repository.init().await.unwrap();

    let error = test_repository.repository.commit("nothing").await.unwrap_err();

    assert_eq!(error_kind(&error), Some(ErrorKind::InvalidState));
    assert_eq!(
        error.downcast_ref::<RepositoryError>(),
        Some(&RepositoryError::NothingToCommit)
    );
}

#[rstest]
#[tokio::test]
async fn feature_branch_merge_scenario(test_repository: TestRepository) {
    let mut test_repository = test_repository;
    test_repository.repository.init().await.unwrap();

    test_repository.commit_file("f.txt", "v1", "c1").await;
    let (c1_oid, _) = test_repository.repository.head_commit().unwrap();
    test_repository.commit_file("f.txt", "v2", "c2").await;
    test_repository
        .repository
        .reset(&c1_oid.to_short_oid())
        .await
        .unwrap();

    test_repository.repository.branch("feature").unwrap();
    test_repository.repository.switch("feature").await.unwrap();
    test_repository.commit_file("f.txt", "v3", "c3").await;
    test_repository.repository.switch("main").await.unwrap();
    test_repository.commit_file("g.txt", "g", "c4").await;

    let outcome = test_repository.repository.merge("feature").await.unwrap();

    let MergeOutcome::Merged { commit, conflicts } = outcome else {
        panic!("expected a merge commit, got {:?}", outcome);
    };
    assert!(conflicts.is_empty());

    let (head_oid, head) = test_repository.repository.head_commit().unwrap();
    assert_eq!(head_oid, commit);
    assert!(head.is_merge());
    test_repository.dir.child("f.txt").assert("v3");
    assert_eq!(test_repository.output.contents(), "");
}

#[rstest]
#[tokio::test]
async fn fast_forward_creates_no_commit(test_repository: TestRepository) {
    let mut test_repository = test_repository;
    test_repository.repository.init().await.unwrap();
    test_repository.repository.branch("feature").unwrap();
    test_repository.repository.switch("feature").await.unwrap();
    test_repository.commit_file("f.txt", "v1", "c1").await;
    let (feature_oid, _) = test_repository.repository.head_commit().unwrap();
    test_repository.repository.switch("main").await.unwrap();

    let outcome = test_repository.repository.merge("feature").await.unwrap();

    assert_eq!(outcome, MergeOutcome::FastForwarded);
    assert_eq!(
        test_repository.repository.head_commit().unwrap().0,
        feature_oid
    );
    assert_eq!(
        test_repository.output.contents(),
        "Current branch fast-forwarded.\n"
    );
}

#[rstest]
#[tokio::test]
async fn conflicting_merge_reports_conflicted_files(test_repository: TestRepository) {
    let mut test_repository = test_repository;
    test_repository.repository.init().await.unwrap();
    test_repository.commit_file("file.txt", "base", "base").await;
    test_repository.repository.branch("feature").unwrap();
    test_repository.commit_file("file.txt", "A", "ours").await;
    test_repository.repository.switch("feature").await.unwrap();
    test_repository.commit_file("file.txt", "B", "theirs").await;
    test_repository.repository.switch("main").await.unwrap();

    let outcome = test_repository.repository.merge("feature").await.unwrap();

    let MergeOutcome::Merged { conflicts, .. } = outcome else {
        panic!("expected a merge commit, got {:?}", outcome);
    };
    assert_eq!(conflicts, vec!["file.txt".to_string()]);

    let (_, head) = test_repository.repository.head_commit().unwrap();
    let blob = test_repository
        .repository
        .database()
        .load_blob(head.tracked_blob("file.txt").unwrap())
        .unwrap();
    assert_eq!(
        blob.content().as_ref(),
        b"<<<<<<< HEAD\nA\n=======\nB\n>>>>>>>\n"
    );
    assert_eq!(
        test_repository.output.contents(),
        "Encountered a merge conflict.\n"
    );
}

#[rstest]
#[tokio::test]
async fn untracked_file_in_the_way_is_a_conflict(test_repository: TestRepository) {
    let mut test_repository = test_repository;
    test_repository.repository.init().await.unwrap();
    test_repository.repository.branch("feature").unwrap();
    test_repository.repository.switch("feature").await.unwrap();
    test_repository.commit_file("f.txt", "theirs", "c1").await;
    test_repository.repository.switch("main").await.unwrap();
    test_repository.write("f.txt", "mine");

    let error = test_repository.repository.merge("feature").await.unwrap_err();

    assert_eq!(error_kind(&error), Some(ErrorKind::Conflict));
    test_repository.dir.child("f.txt").assert("mine");
}
