//! User progress store.
//!
//! # Responsibility
//! - Own the cumulative user record and credit completions.
//!
//! # Invariants
//! - `complete_challenge` credits a given id at most once between resets,
//!   independently of any guard on the caller side.
//! - Stored state is cleared only when it is corrupt, never after a database
//!   failure.

use crate::engine::CompletionSink;
use crate::model::user_progress::{Achievement, UserProgress};
use crate::repo::user_progress_repo::UserProgressRepository;
use crate::store::StoreResult;
use crate::time::Clock;
use log::{debug, info, warn};

/// Write-through holder of the user record.
pub struct UserProgressStore<R: UserProgressRepository> {
    repo: R,
    clock: Clock,
    progress: UserProgress,
    /// Set while the persisted record could not be read; writes re-read first
    /// so a transient failure never overwrites stored totals.
    restore_pending: bool,
}

impl<R: UserProgressRepository> UserProgressStore<R> {
    /// Restores the persisted record, falling back to defaults when absent
    /// or unreadable.
    ///
    /// Only a corrupt record is cleared from storage.
    pub fn restore(repo: R, clock: Clock) -> Self {
        let mut store = Self {
            repo,
            clock,
            progress: UserProgress::default(),
            restore_pending: true,
        };
        if let Err(err) = store.reload() {
            warn!(
                "event=user_restore module=store status=fallback error_code=user_unavailable error={err}"
            );
        }
        store
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        self.progress.achievements()
    }

    /// Credits a first completion of `challenge_id`.
    ///
    /// Returns `Ok(false)` without touching state when the id was already
    /// credited.
    pub fn complete_challenge(&mut self, challenge_id: &str, points: u32) -> StoreResult<bool> {
        self.ensure_restored()?;
        let mut next = self.progress.clone();
        if !next.record_completion(challenge_id, points, self.clock.now_ms()) {
            debug!(
                "event=user_complete_challenge module=store status=skip reason=already_completed challenge_id={challenge_id}"
            );
            return Ok(false);
        }

        self.repo.save_progress(&next)?;
        self.progress = next;
        info!(
            "event=user_complete_challenge module=store status=ok challenge_id={challenge_id} points={points} total_points={} streak={}",
            self.progress.total_points, self.progress.current_streak
        );
        Ok(true)
    }

    /// Adds points that do not come from a challenge completion.
    pub fn add_points(&mut self, points: u32) -> StoreResult<()> {
        self.ensure_restored()?;
        let mut next = self.progress.clone();
        next.add_points(points);
        self.repo.save_progress(&next)?;
        self.progress = next;
        debug!(
            "event=user_add_points module=store status=ok points={points} total_points={}",
            self.progress.total_points
        );
        Ok(())
    }

    /// Restores every field to its zero default.
    pub fn reset_progress(&mut self) -> StoreResult<()> {
        self.repo.clear_progress()?;
        self.progress = UserProgress::default();
        self.restore_pending = false;
        info!("event=user_reset module=store status=ok");
        Ok(())
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn reload(&mut self) -> StoreResult<()> {
        match self.repo.load_progress() {
            Ok(Some(progress)) => {
                info!(
                    "event=user_restore module=store status=ok total_points={} completed={}",
                    progress.total_points,
                    progress.completed_count()
                );
                self.progress = progress;
            }
            Ok(None) => {
                debug!("event=user_restore module=store status=skip reason=no_record");
                self.progress = UserProgress::default();
            }
            Err(err) if err.is_corrupt_data() => {
                warn!(
                    "event=user_restore module=store status=fallback error_code=user_corrupt error={err}"
                );
                self.repo.clear_progress()?;
                self.progress = UserProgress::default();
            }
            Err(err) => return Err(err.into()),
        }
        self.restore_pending = false;
        Ok(())
    }

    fn ensure_restored(&mut self) -> StoreResult<()> {
        if self.restore_pending {
            self.reload()?;
        }
        Ok(())
    }
}

impl<R: UserProgressRepository> CompletionSink for UserProgressStore<R> {
    fn complete_challenge(&mut self, challenge_id: &str, points: u32) -> StoreResult<bool> {
        UserProgressStore::complete_challenge(self, challenge_id, points)
    }
}
