//! Listening session use-cases.
//!
//! # Responsibility
//! - Open both stores on a shared connection and seed the catalog.
//! - Start, feed and stop counting sessions by challenge id.
//! - Expose the profile summary shown to users.
//!
//! # Invariants
//! - Sessions only start for challenges present in the catalog.
//! - All store writes go through the engine or the stores' own contracts.

use crate::engine::{PlaybackSnapshot, PlaybackSource, ProgressEngine, TickOutcome};
use crate::model::challenge::ChallengeId;
use crate::model::session::SessionConfig;
use crate::model::user_progress::Achievement;
use crate::repo::challenge_repo::{ChallengeRepository, SqliteChallengeRepository};
use crate::repo::user_progress_repo::{SqliteUserProgressRepository, UserProgressRepository};
use crate::repo::RepoError;
use crate::store::challenge_store::ChallengeStore;
use crate::store::user_store::UserProgressStore;
use crate::store::StoreError;
use crate::time::Clock;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for listening use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Requested challenge is not in the catalog.
    ChallengeNotFound(ChallengeId),
    /// Store or persistence failure.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChallengeNotFound(id) => write!(f, "challenge not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::ChallengeNotFound(_) => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Store(StoreError::Persistence(value))
    }
}

/// Profile numbers shown on the account screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub total_points: u64,
    pub completed_count: usize,
    pub current_streak: u32,
    pub achievements: Vec<Achievement>,
}

/// Facade over the catalog store, user store and progress engine.
pub struct ListeningService<C: ChallengeRepository, U: UserProgressRepository> {
    catalog: ChallengeStore<C>,
    user: UserProgressStore<U>,
    engine: ProgressEngine,
}

/// Service backed by SQLite repositories on one connection.
pub type SqliteListeningService<'conn> =
    ListeningService<SqliteChallengeRepository<'conn>, SqliteUserProgressRepository<'conn>>;

impl<'conn> SqliteListeningService<'conn> {
    /// Restores both stores from `conn` and seeds the catalog if empty.
    pub fn open(conn: &'conn Connection, clock: Clock) -> ServiceResult<Self> {
        let catalog = ChallengeStore::restore(SqliteChallengeRepository::try_new(conn)?, clock);
        let user = UserProgressStore::restore(SqliteUserProgressRepository::try_new(conn)?, clock);
        let mut service = Self::new(catalog, user);
        service.catalog.load()?;
        Ok(service)
    }
}

impl<C: ChallengeRepository, U: UserProgressRepository> ListeningService<C, U> {
    pub fn new(catalog: ChallengeStore<C>, user: UserProgressStore<U>) -> Self {
        Self {
            catalog,
            user,
            engine: ProgressEngine::new(),
        }
    }

    /// Starts counting for a catalog challenge with its declared reward.
    pub fn start_challenge(&mut self, challenge_id: &str) -> ServiceResult<Uuid> {
        let challenge = self
            .catalog
            .get(challenge_id)
            .ok_or_else(|| ServiceError::ChallengeNotFound(challenge_id.to_string()))?;
        let config = SessionConfig::for_challenge(challenge);
        Ok(self.engine.start_counting(config))
    }

    /// Resets a challenge and starts a fresh session on it.
    pub fn retry_challenge(&mut self, challenge_id: &str) -> ServiceResult<Uuid> {
        if self.catalog.get(challenge_id).is_none() {
            return Err(ServiceError::ChallengeNotFound(challenge_id.to_string()));
        }
        self.catalog.reset(challenge_id)?;
        self.start_challenge(challenge_id)
    }

    /// Feeds one playback update into the engine.
    pub fn handle_playback(&mut self, snapshot: PlaybackSnapshot) -> ServiceResult<TickOutcome> {
        Ok(self
            .engine
            .on_playback_update(snapshot, &mut self.catalog, &mut self.user)?)
    }

    /// Reads and evaluates the current state of `source`.
    pub fn poll(&mut self, source: &impl PlaybackSource) -> ServiceResult<TickOutcome> {
        Ok(self.engine.poll(source, &mut self.catalog, &mut self.user)?)
    }

    pub fn stop(&mut self) {
        self.engine.stop_counting();
    }

    /// Clears the user record and every challenge's progress.
    pub fn reset_everything(&mut self) -> ServiceResult<()> {
        self.engine.stop_counting();
        self.user.reset_progress()?;
        self.catalog.reset_all()?;
        Ok(())
    }

    pub fn profile(&self) -> ProfileSummary {
        let progress = self.user.progress();
        ProfileSummary {
            total_points: progress.total_points,
            completed_count: progress.completed_count(),
            current_streak: progress.current_streak,
            achievements: progress.achievements(),
        }
    }

    pub fn catalog(&self) -> &ChallengeStore<C> {
        &self.catalog
    }

    pub fn user(&self) -> &UserProgressStore<U> {
        &self.user
    }

    pub fn engine(&self) -> &ProgressEngine {
        &self.engine
    }
}
