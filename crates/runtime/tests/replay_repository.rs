//! Replay persistence on disk and in memory.

mod common;

use battle_core::{BattleAction, BattleSetup};
use battle_runtime::repository::{StoredReplay, read_replay, write_replay};
use battle_runtime::{
    FileReplayRepository, InMemoryReplayRepository, ReplayFormat, ReplayLog, ReplayRepository,
    RepositoryError,
};
use common::army;
use tempfile::TempDir;

fn sample() -> ReplayLog {
    let setup = BattleSetup::new(army(&[("footman", 10)]), army(&[("pikeman", 10)])).with_seed(9);
    ReplayLog::with_actions(setup, vec![BattleAction::Wait, BattleAction::Guard])
}

#[test]
fn file_repository_round_trips_both_formats() {
    for format in [ReplayFormat::Json, ReplayFormat::Bincode] {
        let dir = TempDir::new().unwrap();
        let repo = FileReplayRepository::new(dir.path(), format).unwrap();

        assert!(!repo.exists("duel"));
        assert_eq!(repo.load("duel").unwrap(), None);

        repo.save("duel", &sample()).unwrap();
        assert!(repo.exists("duel"));
        assert!(repo.replay_path("duel").ends_with(format!("duel.{}", format.extension())));
        assert_eq!(repo.load("duel").unwrap(), Some(sample()), "{format}");
    }
}

#[test]
fn file_repository_lists_and_deletes() {
    let dir = TempDir::new().unwrap();
    let repo = FileReplayRepository::new(dir.path(), ReplayFormat::Json).unwrap();
    repo.save("b", &sample()).unwrap();
    repo.save("a", &sample()).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a replay").unwrap();

    assert_eq!(repo.list().unwrap(), vec!["a".to_string(), "b".to_string()]);

    repo.delete("a").unwrap();
    repo.delete("missing").unwrap();
    assert_eq!(repo.list().unwrap(), vec!["b".to_string()]);
}

#[test]
fn names_cannot_escape_the_directory() {
    let dir = TempDir::new().unwrap();
    let repo = FileReplayRepository::new(dir.path().join("replays"), ReplayFormat::Bincode).unwrap();

    let err = repo.save("../outside", &sample()).unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidName(_)));
    assert!(!repo.exists("../outside"));
}

#[test]
fn tampered_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("duel.json");
    let mut stored = StoredReplay::seal(sample()).unwrap();
    stored.log.actions.pop();
    std::fs::write(&path, ReplayFormat::Json.encode(&stored).unwrap()).unwrap();

    let err = read_replay(&path).unwrap_err();
    assert!(matches!(err, RepositoryError::CorruptedData(_)));
}

#[test]
fn replay_files_pick_their_format_from_the_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("duel.bin");
    write_replay(&path, &sample(), ReplayFormat::Bincode).unwrap();
    assert_eq!(read_replay(&path).unwrap(), sample());

    let unknown = dir.path().join("duel.yaml");
    std::fs::copy(&path, &unknown).unwrap();
    assert!(matches!(read_replay(&unknown), Err(RepositoryError::UnknownFormat(_))));
}

#[test]
fn memory_repository_behaves_like_a_store() {
    let repo = InMemoryReplayRepository::new();
    repo.save("second", &sample()).unwrap();
    repo.save("first", &ReplayLog::new(BattleSetup::default())).unwrap();

    assert!(repo.exists("first"));
    assert_eq!(repo.list().unwrap(), vec!["first".to_string(), "second".to_string()]);
    assert_eq!(repo.load("second").unwrap(), Some(sample()));

    repo.delete("second").unwrap();
    assert_eq!(repo.load("second").unwrap(), None);
    assert!(matches!(repo.save("", &sample()), Err(RepositoryError::InvalidName(_))));
}
