//! Challenge catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the full challenge catalog in catalog order.
//! - Persist per-challenge progress/completion state on every mutation.
//!
//! # Invariants
//! - Catalog order is the order records were inserted (`catalog_position`).
//! - Static fields (title, reward, duration, ...) are written only on insert.

use crate::model::challenge::{Challenge, Difficulty};
use crate::repo::{
    bool_to_int, ensure_connection_ready, int_to_bool, non_negative, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row};

const CHALLENGE_SELECT_SQL: &str = "SELECT
    id,
    title,
    artist,
    description,
    audio_url,
    image_url,
    duration_secs,
    points,
    difficulty,
    progress,
    completed,
    completed_at
FROM challenges";

/// Repository interface for the challenge catalog.
pub trait ChallengeRepository {
    /// Returns every challenge in catalog order.
    fn list_challenges(&self) -> RepoResult<Vec<Challenge>>;
    /// Returns the number of persisted challenges.
    fn count_challenges(&self) -> RepoResult<u64>;
    /// Appends records to the catalog in one transaction.
    fn insert_challenges(&self, challenges: &[Challenge]) -> RepoResult<()>;
    /// Writes the mutable state (`progress`, `completed`, `completed_at`).
    fn save_challenge_state(&self, challenge: &Challenge) -> RepoResult<()>;
    /// Removes every record. Used when persisted state cannot be restored.
    fn clear_challenges(&self) -> RepoResult<()>;
}

/// SQLite-backed challenge repository.
pub struct SqliteChallengeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChallengeRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ChallengeRepository for SqliteChallengeRepository<'_> {
    fn list_challenges(&self) -> RepoResult<Vec<Challenge>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHALLENGE_SELECT_SQL} ORDER BY catalog_position ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut challenges = Vec::new();
        while let Some(row) = rows.next()? {
            challenges.push(parse_challenge_row(row)?);
        }
        Ok(challenges)
    }

    fn count_challenges(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM challenges;", [], |row| row.get(0))?;
        non_negative(count, "COUNT(challenges)")
    }

    fn insert_challenges(&self, challenges: &[Challenge]) -> RepoResult<()> {
        for challenge in challenges {
            challenge.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let next_position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(catalog_position) + 1, 0) FROM challenges;",
            [],
            |row| row.get(0),
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO challenges (
                    id,
                    catalog_position,
                    title,
                    artist,
                    description,
                    audio_url,
                    image_url,
                    duration_secs,
                    points,
                    difficulty,
                    progress,
                    completed,
                    completed_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            )?;
            for (offset, challenge) in (0_i64..).zip(challenges) {
                stmt.execute(params![
                    challenge.id.as_str(),
                    next_position + offset,
                    challenge.title.as_str(),
                    challenge.artist.as_str(),
                    challenge.description.as_str(),
                    challenge.audio_url.as_str(),
                    challenge.image_url.as_deref(),
                    challenge.duration_secs,
                    challenge.points,
                    challenge.difficulty.as_str(),
                    challenge.progress,
                    bool_to_int(challenge.completed),
                    challenge.completed_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn save_challenge_state(&self, challenge: &Challenge) -> RepoResult<()> {
        challenge.validate()?;

        let changed = self.conn.execute(
            "UPDATE challenges
             SET
                progress = ?1,
                completed = ?2,
                completed_at = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                challenge.progress,
                bool_to_int(challenge.completed),
                challenge.completed_at,
                challenge.id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(challenge.id.clone()));
        }
        Ok(())
    }

    fn clear_challenges(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM challenges;", [])?;
        Ok(())
    }
}

fn parse_challenge_row(row: &Row<'_>) -> RepoResult<Challenge> {
    let id: String = row.get("id")?;

    let difficulty_text: String = row.get("difficulty")?;
    let difficulty = Difficulty::parse(&difficulty_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid difficulty `{difficulty_text}` in challenges.difficulty for `{id}`"
        ))
    })?;

    let challenge = Challenge {
        title: row.get("title")?,
        artist: row.get("artist")?,
        description: row.get("description")?,
        audio_url: row.get("audio_url")?,
        image_url: row.get("image_url")?,
        duration_secs: non_negative(row.get("duration_secs")?, "challenges.duration_secs")?,
        points: non_negative(row.get("points")?, "challenges.points")?,
        difficulty,
        progress: row.get("progress")?,
        completed: int_to_bool(row.get("completed")?, "challenges.completed")?,
        completed_at: row.get("completed_at")?,
        id,
    };
    challenge.validate()?;
    Ok(challenge)
}
