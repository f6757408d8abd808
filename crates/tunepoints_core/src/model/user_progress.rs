//! Cumulative account record.
//!
//! # Invariants
//! - `completed_challenge_ids` has set semantics; insertion order is kept.
//! - A challenge id credits points and streak at most once between resets.
//! - `total_points` only decreases through an explicit reset.

use crate::model::challenge::ChallengeId;
use serde::{Deserialize, Serialize};

/// Completions needed for [`Achievement::TripleThreat`].
pub const TRIPLE_THREAT_COMPLETIONS: usize = 3;
/// Points needed for [`Achievement::PointsMaster`].
pub const POINTS_MASTER_THRESHOLD: u64 = 500;

/// Milestones derived from the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstChallengeComplete,
    TripleThreat,
    PointsMaster,
}

impl Achievement {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstChallengeComplete => "First Challenge Complete",
            Self::TripleThreat => "Triple Threat",
            Self::PointsMaster => "Points Master",
        }
    }
}

/// Aggregate user statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub total_points: u64,
    pub completed_challenge_ids: Vec<ChallengeId>,
    /// Count of distinct challenges completed to date.
    pub current_streak: u32,
    /// Unix epoch milliseconds of the most recent completion.
    pub last_played_at: Option<i64>,
}

impl UserProgress {
    pub fn has_completed(&self, challenge_id: &str) -> bool {
        self.completed_challenge_ids
            .iter()
            .any(|id| id.as_str() == challenge_id)
    }

    /// Credits a first-time completion. Returns `false` for a repeat id.
    pub fn record_completion(&mut self, challenge_id: &str, points: u32, now_ms: i64) -> bool {
        if self.has_completed(challenge_id) {
            return false;
        }
        self.completed_challenge_ids.push(challenge_id.to_string());
        self.total_points = self.total_points.saturating_add(u64::from(points));
        self.current_streak = self.current_streak.saturating_add(1);
        self.last_played_at = Some(now_ms);
        true
    }

    /// Adds points earned outside challenge completion.
    pub fn add_points(&mut self, points: u32) {
        self.total_points = self.total_points.saturating_add(u64::from(points));
    }

    pub fn completed_count(&self) -> usize {
        self.completed_challenge_ids.len()
    }

    /// Unlocked milestones, in unlock-rule order.
    pub fn achievements(&self) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        if self.completed_count() == 0 {
            return unlocked;
        }
        unlocked.push(Achievement::FirstChallengeComplete);
        if self.completed_count() >= TRIPLE_THREAT_COMPLETIONS {
            unlocked.push(Achievement::TripleThreat);
        }
        if self.total_points >= POINTS_MASTER_THRESHOLD {
            unlocked.push(Achievement::PointsMaster);
        }
        unlocked
    }
}
