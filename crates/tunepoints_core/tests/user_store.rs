use rusqlite::{ffi, Connection};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tunepoints_core::db::{open_db, open_db_in_memory};
use tunepoints_core::{
    Achievement, Clock, RepoError, RepoResult, SqliteUserProgressRepository, UserProgress,
    UserProgressRepository, UserProgressStore,
};

const NOW_MS: i64 = 1_700_000_000_000;

fn store(conn: &Connection) -> UserProgressStore<SqliteUserProgressRepository<'_>> {
    let repo = SqliteUserProgressRepository::try_new(conn).unwrap();
    UserProgressStore::restore(repo, Clock::fixed(NOW_MS))
}

#[test]
fn fresh_store_starts_from_zero_defaults() {
    let conn = open_db_in_memory().unwrap();
    let user = store(&conn);
    assert_eq!(user.progress(), &UserProgress::default());
    assert!(user.achievements().is_empty());
}

#[test]
fn complete_challenge_credits_first_call_only() {
    let conn = open_db_in_memory().unwrap();
    let mut user = store(&conn);

    assert!(user.complete_challenge("1", 100).unwrap());
    user.clock_mut().advance(5_000);
    assert!(!user.complete_challenge("1", 100).unwrap());

    let progress = user.progress();
    assert_eq!(progress.total_points, 100);
    assert_eq!(progress.current_streak, 1);
    assert_eq!(progress.completed_challenge_ids, vec!["1".to_string()]);
    assert_eq!(progress.last_played_at, Some(NOW_MS));
}

#[test]
fn distinct_completions_accumulate_in_order() {
    let conn = open_db_in_memory().unwrap();
    let mut user = store(&conn);

    user.complete_challenge("3", 200).unwrap();
    user.clock_mut().advance(1_000);
    user.complete_challenge("1", 100).unwrap();

    let progress = user.progress();
    assert_eq!(progress.total_points, 300);
    assert_eq!(progress.current_streak, 2);
    assert_eq!(
        progress.completed_challenge_ids,
        vec!["3".to_string(), "1".to_string()]
    );
    assert_eq!(progress.last_played_at, Some(NOW_MS + 1_000));
}

#[test]
fn add_points_does_not_touch_completions() {
    let conn = open_db_in_memory().unwrap();
    let mut user = store(&conn);

    user.add_points(40).unwrap();
    assert_eq!(user.progress().total_points, 40);
    assert_eq!(user.progress().current_streak, 0);

    user.complete_challenge("2", 150).unwrap();
    assert_eq!(user.progress().total_points, 190);
}

#[test]
fn reset_progress_restores_defaults_and_allows_recredit() {
    let conn = open_db_in_memory().unwrap();
    let mut user = store(&conn);
    user.complete_challenge("1", 100).unwrap();

    user.reset_progress().unwrap();
    assert_eq!(user.progress(), &UserProgress::default());
    assert_eq!(store(&conn).progress(), &UserProgress::default());

    assert!(user.complete_challenge("1", 100).unwrap());
    assert_eq!(user.progress().total_points, 100);
}

#[test]
fn progress_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user.db");

    {
        let conn = open_db(&path).unwrap();
        let mut user = store(&conn);
        user.complete_challenge("1", 100).unwrap();
        user.complete_challenge("2", 150).unwrap();
        user.complete_challenge("4", 250).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let mut user = store(&conn);
    let progress = user.progress();
    assert_eq!(progress.total_points, 500);
    assert_eq!(progress.current_streak, 3);
    assert_eq!(
        progress.completed_challenge_ids,
        vec!["1".to_string(), "2".to_string(), "4".to_string()]
    );
    assert_eq!(
        user.achievements(),
        vec![
            Achievement::FirstChallengeComplete,
            Achievement::TripleThreat,
            Achievement::PointsMaster,
        ]
    );

    assert!(!user.complete_challenge("2", 150).unwrap());
    assert_eq!(user.progress().total_points, 500);
}

#[test]
fn corrupt_record_falls_back_to_defaults() {
    let conn = open_db_in_memory().unwrap();
    {
        let mut user = store(&conn);
        user.complete_challenge("1", 100).unwrap();
    }
    conn.execute("UPDATE user_progress SET total_points = -5;", [])
        .unwrap();

    let user = store(&conn);
    assert_eq!(user.progress(), &UserProgress::default());

    let repo = SqliteUserProgressRepository::try_new(&conn).unwrap();
    assert_eq!(repo.load_progress().unwrap(), None);
}

#[derive(Default)]
struct ScriptedUserState {
    loads: RefCell<VecDeque<RepoResult<Option<UserProgress>>>>,
    saved: RefCell<Vec<UserProgress>>,
    clears: Cell<usize>,
}

struct ScriptedUserRepo(Rc<ScriptedUserState>);

impl UserProgressRepository for ScriptedUserRepo {
    fn load_progress(&self) -> RepoResult<Option<UserProgress>> {
        self.0.loads.borrow_mut().pop_front().unwrap_or(Ok(None))
    }

    fn save_progress(&self, progress: &UserProgress) -> RepoResult<()> {
        self.0.saved.borrow_mut().push(progress.clone());
        Ok(())
    }

    fn clear_progress(&self) -> RepoResult<()> {
        self.0.clears.set(self.0.clears.get() + 1);
        Ok(())
    }
}

fn locked() -> RepoError {
    RepoError::from(rusqlite::Error::SqliteFailure(
        ffi::Error::new(ffi::SQLITE_LOCKED),
        None,
    ))
}

#[test]
fn locked_database_on_restore_never_overwrites_stored_totals() {
    let stored = UserProgress {
        total_points: 300,
        completed_challenge_ids: vec!["1".to_string()],
        current_streak: 1,
        last_played_at: Some(NOW_MS - 60_000),
    };
    let state = Rc::new(ScriptedUserState::default());
    state
        .loads
        .borrow_mut()
        .extend([Err(locked()), Ok(Some(stored))]);

    let mut user = UserProgressStore::restore(
        ScriptedUserRepo(Rc::clone(&state)),
        Clock::fixed(NOW_MS),
    );
    assert_eq!(user.progress(), &UserProgress::default());
    assert_eq!(state.clears.get(), 0);

    assert!(user.complete_challenge("2", 150).unwrap());
    assert_eq!(user.progress().total_points, 450);
    assert_eq!(
        user.progress().completed_challenge_ids,
        vec!["1".to_string(), "2".to_string()]
    );

    let saved = state.saved.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].total_points, 450);
    assert_eq!(state.clears.get(), 0);
}

#[test]
fn write_fails_while_stored_record_stays_unreadable() {
    let state = Rc::new(ScriptedUserState::default());
    state
        .loads
        .borrow_mut()
        .extend([Err(locked()), Err(locked())]);

    let mut user = UserProgressStore::restore(
        ScriptedUserRepo(Rc::clone(&state)),
        Clock::fixed(NOW_MS),
    );
    assert!(user.add_points(10).is_err());
    assert!(state.saved.borrow().is_empty());
    assert_eq!(state.clears.get(), 0);
}
