//! Progress engine: playback position in, points and completion out.
//!
//! # Responsibility
//! - Hold the active session config and local point counters.
//! - Evaluate each playback update and write progress/completion into stores.
//!
//! # Invariants
//! - `points_earned` never decreases within a session and never exceeds the
//!   session's `total_points`.
//! - The completion latch is set before any completion write, so a session
//!   fires at most one completion even when stores report errors.
//! - Both completion writes are attempted even when the other one fails.
//! - Repeating an identical snapshot produces no additional writes.
//! - Starting a session while one is active supersedes it.

use crate::engine::playback::{PlaybackSnapshot, PlaybackSource};
use crate::model::session::SessionConfig;
use crate::store::StoreResult;
use log::{debug, info, warn};
use uuid::Uuid;

/// Percent listened at which a challenge counts as completed.
pub const COMPLETION_THRESHOLD_PERCENT: f64 = 95.0;

const PERCENT: f64 = 100.0;

/// Catalog-side writes performed by the engine.
pub trait ChallengeProgressSink {
    fn update_progress(&mut self, challenge_id: &str, progress: f64) -> StoreResult<bool>;
    fn mark_complete(&mut self, challenge_id: &str) -> StoreResult<bool>;
}

/// User-side completion transition performed by the engine.
pub trait CompletionSink {
    fn complete_challenge(&mut self, challenge_id: &str, points: u32) -> StoreResult<bool>;
}

/// Why an update produced no evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No session started, or it was stopped.
    Inactive,
    /// Playback duration is 0 (media not loaded yet) or the session has none.
    DurationUnknown,
    /// Source reports paused/stopped/failed playback.
    NotPlaying,
}

/// Result of one evaluated update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// `min(position / duration * 100, 100)`.
    pub progress: f64,
    /// Points earned so far in this session.
    pub points_earned: u32,
    /// Whether this update raised `points_earned` (and persisted progress).
    pub points_changed: bool,
    /// Whether this update fired the completion transition.
    pub completed: bool,
}

/// What one playback update did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Evaluated(TickReport),
}

#[derive(Debug, Clone)]
struct ActiveSession {
    id: Uuid,
    config: SessionConfig,
}

/// Per-session points counter.
#[derive(Debug, Default)]
pub struct ProgressEngine {
    session: Option<ActiveSession>,
    points_earned: u32,
    completion_latched: bool,
    last_progress: f64,
}

impl ProgressEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a session for `config`, replacing any active one.
    ///
    /// Resets the point counter and clears the completion latch. Returns the
    /// new session id used in log events.
    pub fn start_counting(&mut self, config: SessionConfig) -> Uuid {
        let session_id = Uuid::new_v4();
        if let Some(previous) = &self.session {
            warn!(
                "event=session_supersede module=engine status=ok previous_session_id={} previous_challenge_id={} session_id={session_id}",
                previous.id, previous.config.challenge_id
            );
        }
        info!(
            "event=session_start module=engine status=ok session_id={session_id} challenge_id={} total_points={} duration_secs={}",
            config.challenge_id, config.total_points, config.duration_secs
        );

        self.session = Some(ActiveSession {
            id: session_id,
            config,
        });
        self.points_earned = 0;
        self.completion_latched = false;
        self.last_progress = 0.0;
        session_id
    }

    /// Ends the session. Earned points stay readable until the next start.
    pub fn stop_counting(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                "event=session_stop module=engine status=ok session_id={} challenge_id={} points_earned={}",
                session.id, session.config.challenge_id, self.points_earned
            );
        }
    }

    /// Zeroes counters and clears the latch, keeping the session config.
    pub fn reset_progress(&mut self) {
        self.points_earned = 0;
        self.completion_latched = false;
        self.last_progress = 0.0;
        debug!("event=session_reset module=engine status=ok");
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.session.as_ref().map(|session| &session.config)
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|session| session.id)
    }

    pub fn points_earned(&self) -> u32 {
        self.points_earned
    }

    /// Whether this session already fired its completion.
    pub fn is_completed(&self) -> bool {
        self.completion_latched
    }

    /// Percent listened as of the last update with a known duration.
    ///
    /// Reads 0 when no session is active.
    pub fn progress(&self) -> f64 {
        if self.session.is_none() {
            return 0.0;
        }
        self.last_progress
    }

    /// Reads the current snapshot from `source` and evaluates it.
    pub fn poll<S, C, U>(
        &mut self,
        source: &S,
        catalog: &mut C,
        user: &mut U,
    ) -> StoreResult<TickOutcome>
    where
        S: PlaybackSource + ?Sized,
        C: ChallengeProgressSink + ?Sized,
        U: CompletionSink + ?Sized,
    {
        self.on_playback_update(source.snapshot(), catalog, user)
    }

    /// Evaluates one playback update against the active session.
    ///
    /// # Errors
    /// Returns the first store write failure. The latch and point counter keep
    /// the values they had reached, so a retry never double-credits.
    pub fn on_playback_update<C, U>(
        &mut self,
        snapshot: PlaybackSnapshot,
        catalog: &mut C,
        user: &mut U,
    ) -> StoreResult<TickOutcome>
    where
        C: ChallengeProgressSink + ?Sized,
        U: CompletionSink + ?Sized,
    {
        let Some(session) = &self.session else {
            return Ok(TickOutcome::Skipped(SkipReason::Inactive));
        };
        let session_id = session.id;
        let challenge_id = session.config.challenge_id.clone();
        let total_points = session.config.total_points;

        let duration_known = snapshot.duration_secs > 0.0 && snapshot.duration_secs.is_finite();
        if session.config.duration_secs == 0 || !duration_known {
            return Ok(TickOutcome::Skipped(SkipReason::DurationUnknown));
        }

        let position = snapshot.position_secs.max(0.0);
        let progress = (position / snapshot.duration_secs * PERCENT).min(PERCENT);
        self.last_progress = progress;

        if !snapshot.is_playing {
            return Ok(TickOutcome::Skipped(SkipReason::NotPlaying));
        }

        let earned = points_for(progress, total_points);
        let mut report = TickReport {
            progress,
            points_earned: self.points_earned,
            points_changed: false,
            completed: false,
        };

        if earned > self.points_earned {
            self.points_earned = earned;
            report.points_earned = earned;
            report.points_changed = true;
            debug!(
                "event=points_earned module=engine status=ok session_id={session_id} challenge_id={challenge_id} points={earned} progress={progress:.1}"
            );
            catalog.update_progress(&challenge_id, progress)?;
        }

        if progress >= COMPLETION_THRESHOLD_PERCENT && !self.completion_latched {
            self.completion_latched = true;
            report.completed = true;
            info!(
                "event=session_complete module=engine status=ok session_id={session_id} challenge_id={challenge_id} total_points={total_points}"
            );
            // Both writes run even if one fails; the latch blocks any retry.
            let catalog_result = catalog.mark_complete(&challenge_id);
            let user_result = user.complete_challenge(&challenge_id, total_points);
            catalog_result?;
            user_result?;
        }

        Ok(TickOutcome::Evaluated(report))
    }
}

/// `floor(progress / 100 * total_points)`, bounded by `total_points`.
fn points_for(progress: f64, total_points: u32) -> u32 {
    let raw = (progress / PERCENT * f64::from(total_points)).floor();
    if raw <= 0.0 {
        return 0;
    }
    (raw as u32).min(total_points)
}

#[cfg(test)]
mod tests {
    use super::points_for;

    #[test]
    fn points_for_floors_and_bounds() {
        assert_eq!(points_for(0.0, 100), 0);
        assert_eq!(points_for(49.99, 100), 49);
        assert_eq!(points_for(50.0, 100), 50);
        assert_eq!(points_for(100.0, 100), 100);
        assert_eq!(points_for(33.3, 7), 2);
        assert_eq!(points_for(-10.0, 100), 0);
        assert_eq!(points_for(100.0, 0), 0);
    }
}
