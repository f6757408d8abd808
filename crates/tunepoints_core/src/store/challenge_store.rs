//! Challenge catalog store.
//!
//! # Responsibility
//! - Own the ordered challenge list and its progress/completion fields.
//! - Seed the catalog once and never overwrite existing progress.
//!
//! # Invariants
//! - `completed` only flips back to `false` through `reset`/`reset_all`.
//! - Progress written here is clamped to `[0, 100]`.
//! - Stored state is cleared only when it is corrupt, never after a database
//!   failure.

use crate::engine::ChallengeProgressSink;
use crate::model::challenge::{Challenge, ChallengeId};
use crate::repo::challenge_repo::ChallengeRepository;
use crate::seed::sample_challenges;
use crate::store::{StoreError, StoreResult};
use crate::time::Clock;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Write-through catalog of challenges.
pub struct ChallengeStore<R: ChallengeRepository> {
    repo: R,
    clock: Clock,
    challenges: Vec<Challenge>,
    /// Set while the persisted catalog could not be read; writes re-read first.
    restore_pending: bool,
}

impl<R: ChallengeRepository> ChallengeStore<R> {
    /// Restores the persisted catalog, starting empty when it cannot be read.
    ///
    /// Corrupt rows are discarded so the next `load()` can re-seed. A database
    /// failure (busy, locked, I/O) leaves storage untouched and is retried
    /// before the next write.
    pub fn restore(repo: R, clock: Clock) -> Self {
        let mut store = Self {
            repo,
            clock,
            challenges: Vec::new(),
            restore_pending: true,
        };
        if let Err(err) = store.reload() {
            warn!(
                "event=catalog_restore module=store status=fallback error_code=catalog_unavailable error={err}"
            );
        }
        store
    }

    /// Seeds the sample catalog when empty. Returns the number of new records.
    pub fn load(&mut self) -> StoreResult<usize> {
        self.load_with(sample_challenges())
    }

    /// Seeds `seed` when the catalog is empty; otherwise a no-op.
    ///
    /// A catalog persisted by another handle since `restore` is adopted
    /// instead of seeded twice.
    pub fn load_with(&mut self, seed: Vec<Challenge>) -> StoreResult<usize> {
        self.ensure_restored()?;
        if !self.challenges.is_empty() {
            debug!(
                "event=catalog_seed module=store status=skip reason=already_loaded count={}",
                self.challenges.len()
            );
            return Ok(0);
        }

        let persisted = self.repo.count_challenges()?;
        if persisted > 0 {
            self.challenges = self.repo.list_challenges()?;
            debug!(
                "event=catalog_seed module=store status=skip reason=already_persisted count={persisted}"
            );
            return Ok(0);
        }

        if let Some(duplicate) = first_duplicate_id(&seed) {
            return Err(StoreError::DuplicateChallengeId(duplicate));
        }

        self.repo.insert_challenges(&seed)?;
        let count = seed.len();
        self.challenges = seed;
        info!("event=catalog_seed module=store status=ok count={count}");
        Ok(count)
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn get(&self, challenge_id: &str) -> Option<&Challenge> {
        self.challenges
            .iter()
            .find(|challenge| challenge.id == challenge_id)
    }

    /// Challenges not yet completed, in catalog order.
    pub fn active_challenges(&self) -> Vec<&Challenge> {
        self.challenges
            .iter()
            .filter(|challenge| challenge.is_active())
            .collect()
    }

    /// Completed challenges, in catalog order.
    pub fn completed_challenges(&self) -> Vec<&Challenge> {
        self.challenges
            .iter()
            .filter(|challenge| challenge.completed)
            .collect()
    }

    /// Sets clamped progress. Returns `Ok(false)` for unknown ids or no change.
    pub fn update_progress(&mut self, challenge_id: &str, progress: f64) -> StoreResult<bool> {
        let changed = self.mutate(challenge_id, |challenge| challenge.set_progress(progress))?;
        if changed {
            debug!(
                "event=challenge_progress module=store status=ok challenge_id={challenge_id} progress={progress:.1}"
            );
        }
        Ok(changed)
    }

    /// Marks the challenge completed. Repeat calls are no-ops.
    pub fn mark_complete(&mut self, challenge_id: &str) -> StoreResult<bool> {
        let now_ms = self.clock.now_ms();
        let changed = self.mutate(challenge_id, |challenge| challenge.mark_complete(now_ms))?;
        if changed {
            info!(
                "event=challenge_complete module=store status=ok challenge_id={challenge_id} completed_at={now_ms}"
            );
        }
        Ok(changed)
    }

    /// Reverts one challenge to its unattempted state for a re-run.
    pub fn reset(&mut self, challenge_id: &str) -> StoreResult<bool> {
        let changed = self.mutate(challenge_id, |challenge| {
            let before = challenge.clone();
            challenge.reset_attempt();
            *challenge != before
        })?;
        if changed {
            info!("event=challenge_reset module=store status=ok challenge_id={challenge_id}");
        }
        Ok(changed)
    }

    /// Reverts every challenge. Returns how many records changed.
    pub fn reset_all(&mut self) -> StoreResult<usize> {
        self.ensure_restored()?;
        let ids: Vec<_> = self
            .challenges
            .iter()
            .map(|challenge| challenge.id.clone())
            .collect();

        let mut reset_count = 0;
        for challenge_id in ids {
            if self.reset(&challenge_id)? {
                reset_count += 1;
            }
        }
        info!("event=catalog_reset module=store status=ok count={reset_count}");
        Ok(reset_count)
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    fn reload(&mut self) -> StoreResult<()> {
        match self.repo.list_challenges() {
            Ok(challenges) => {
                info!(
                    "event=catalog_restore module=store status=ok count={}",
                    challenges.len()
                );
                self.challenges = challenges;
            }
            Err(err) if err.is_corrupt_data() => {
                warn!(
                    "event=catalog_restore module=store status=fallback error_code=catalog_corrupt error={err}"
                );
                self.repo.clear_challenges()?;
                self.challenges.clear();
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

    fn mutate(
        &mut self,
        challenge_id: &str,
        apply: impl FnOnce(&mut Challenge) -> bool,
    ) -> StoreResult<bool> {
        self.ensure_restored()?;
        let Some(index) = self
            .challenges
            .iter()
            .position(|challenge| challenge.id == challenge_id)
        else {
            debug!(
                "event=challenge_mutate module=store status=skip reason=unknown_id challenge_id={challenge_id}"
            );
            return Ok(false);
        };

        let mut next = self.challenges[index].clone();
        if !apply(&mut next) {
            return Ok(false);
        }

        self.repo.save_challenge_state(&next)?;
        self.challenges[index] = next;
        Ok(true)
    }
}

fn first_duplicate_id(challenges: &[Challenge]) -> Option<ChallengeId> {
    let mut seen = HashSet::new();
    challenges
        .iter()
        .find(|challenge| !seen.insert(challenge.id.as_str()))
        .map(|challenge| challenge.id.clone())
}

impl<R: ChallengeRepository> ChallengeProgressSink for ChallengeStore<R> {
    fn update_progress(&mut self, challenge_id: &str, progress: f64) -> StoreResult<bool> {
        ChallengeStore::update_progress(self, challenge_id, progress)
    }

    fn mark_complete(&mut self, challenge_id: &str) -> StoreResult<bool> {
        ChallengeStore::mark_complete(self, challenge_id)
    }
}
