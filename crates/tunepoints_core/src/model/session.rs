//! Playback session value object.

use crate::model::challenge::{Challenge, ChallengeId};
use serde::{Deserialize, Serialize};

/// Target of one counting session, held from start until stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub challenge_id: ChallengeId,
    /// Points awarded for listening to the whole track.
    pub total_points: u32,
    /// Nominal duration. A zero value never accrues.
    pub duration_secs: u32,
}

impl SessionConfig {
    pub fn new(challenge_id: impl Into<ChallengeId>, total_points: u32, duration_secs: u32) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            total_points,
            duration_secs,
        }
    }

    /// Session targeting a catalog entry with its declared reward.
    pub fn for_challenge(challenge: &Challenge) -> Self {
        Self::new(
            challenge.id.clone(),
            challenge.points,
            challenge.duration_secs,
        )
    }
}
