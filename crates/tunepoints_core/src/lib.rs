//! Core of the TunePoints listening-rewards app.
//!
//! Owns the challenge catalog, the user's cumulative progress and the
//! engine that converts playback progress into points. Rendering, audio
//! playback and navigation live in the host app.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod store;
pub mod time;

pub use config::CoreConfig;
pub use engine::{
    ChallengeProgressSink, CompletionSink, PlaybackSnapshot, PlaybackSource, ProgressEngine,
    ScriptedPlayback, SkipReason, TickOutcome, TickReport, COMPLETION_THRESHOLD_PERCENT,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::challenge::{Challenge, ChallengeId, ChallengeValidationError, Difficulty};
pub use model::session::SessionConfig;
pub use model::user_progress::{Achievement, UserProgress};
pub use repo::challenge_repo::{ChallengeRepository, SqliteChallengeRepository};
pub use repo::user_progress_repo::{SqliteUserProgressRepository, UserProgressRepository};
pub use repo::{RepoError, RepoResult};
pub use service::listening_service::{
    ListeningService, ProfileSummary, ServiceError, ServiceResult, SqliteListeningService,
};
pub use store::challenge_store::ChallengeStore;
pub use store::user_store::UserProgressStore;
pub use store::{StoreError, StoreResult};
pub use time::Clock;

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
