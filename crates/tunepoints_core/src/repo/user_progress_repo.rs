//! User progress repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the single cumulative user record and its completion set.
//!
//! # Invariants
//! - At most one `user_progress` row exists (`id = 1`).
//! - `completed_challenges.seq` preserves first-completion order.
//! - `save_progress` replaces the whole record in one transaction.

use crate::model::user_progress::UserProgress;
use crate::repo::{ensure_connection_ready, non_negative, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

const USER_PROGRESS_ROW_ID: i64 = 1;

/// Repository interface for the user progress record.
pub trait UserProgressRepository {
    /// Loads the persisted record, or `None` when nothing was saved yet.
    fn load_progress(&self) -> RepoResult<Option<UserProgress>>;
    /// Replaces the persisted record.
    fn save_progress(&self, progress: &UserProgress) -> RepoResult<()>;
    /// Removes the persisted record.
    fn clear_progress(&self) -> RepoResult<()>;
}

/// SQLite-backed user progress repository.
pub struct SqliteUserProgressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserProgressRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserProgressRepository for SqliteUserProgressRepository<'_> {
    fn load_progress(&self) -> RepoResult<Option<UserProgress>> {
        let header = self
            .conn
            .query_row(
                "SELECT total_points, current_streak, last_played_at
                 FROM user_progress
                 WHERE id = ?1;",
                [USER_PROGRESS_ROW_ID],
                |row| {
                    Ok((
                        row.get::<_, i64>("total_points")?,
                        row.get::<_, i64>("current_streak")?,
                        row.get::<_, Option<i64>>("last_played_at")?,
                    ))
                },
            )
            .optional()?;

        let Some((total_points, current_streak, last_played_at)) = header else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT challenge_id FROM completed_challenges ORDER BY seq ASC, challenge_id ASC;",
        )?;
        let completed_challenge_ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(UserProgress {
            total_points: non_negative(total_points, "user_progress.total_points")?,
            completed_challenge_ids,
            current_streak: non_negative(current_streak, "user_progress.current_streak")?,
            last_played_at,
        }))
    }

    fn save_progress(&self, progress: &UserProgress) -> RepoResult<()> {
        let total_points = i64::try_from(progress.total_points).unwrap_or(i64::MAX);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO user_progress (id, total_points, current_streak, last_played_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                total_points = excluded.total_points,
                current_streak = excluded.current_streak,
                last_played_at = excluded.last_played_at;",
            params![
                USER_PROGRESS_ROW_ID,
                total_points,
                progress.current_streak,
                progress.last_played_at,
            ],
        )?;
        tx.execute("DELETE FROM completed_challenges;", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO completed_challenges (challenge_id, seq) VALUES (?1, ?2);")?;
            for (seq, challenge_id) in (0_i64..).zip(&progress.completed_challenge_ids) {
                stmt.execute(params![challenge_id.as_str(), seq])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_progress(&self) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM completed_challenges;", [])?;
        tx.execute("DELETE FROM user_progress;", [])?;
        tx.commit()?;
        Ok(())
    }
}
