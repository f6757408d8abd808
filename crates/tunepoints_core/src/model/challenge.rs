//! Challenge domain model.
//!
//! # Responsibility
//! - Define the listening task record shared by catalog, engine and storage.
//! - Own progress clamping and the completion/reset transitions.
//!
//! # Invariants
//! - `id` is non-empty, at most 64 chars of `[A-Za-z0-9_-]`.
//! - `duration_secs > 0`.
//! - `progress` is finite and within `[0, 100]`.
//! - `completed_at` is set only while `completed` is true.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static CHALLENGE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid challenge id regex"));

/// Upper bound of challenge progress, in percent.
pub const PROGRESS_MAX: f64 = 100.0;

/// Stable identifier of a challenge.
///
/// Kept as a type alias so seeded ids (`"1"`, `"2"`, ...) stay readable.
pub type ChallengeId = String;

/// Difficulty tier shown next to each challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parses the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

/// Model invariant violations reported by [`Challenge::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChallengeValidationError {
    InvalidId(String),
    ZeroDuration(ChallengeId),
    ProgressOutOfRange { id: ChallengeId, progress: f64 },
    CompletedAtWithoutCompletion(ChallengeId),
}

impl Display for ChallengeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(f, "invalid challenge id `{value}`"),
            Self::ZeroDuration(id) => write!(f, "challenge `{id}` must have a positive duration"),
            Self::ProgressOutOfRange { id, progress } => write!(
                f,
                "challenge `{id}` progress {progress} is outside [0, {PROGRESS_MAX}]"
            ),
            Self::CompletedAtWithoutCompletion(id) => {
                write!(f, "challenge `{id}` has completed_at but is not completed")
            }
        }
    }
}

impl Error for ChallengeValidationError {}

/// One playback-based task with a point reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: String,
    pub artist: String,
    pub description: String,
    /// Media locator handed to the playback source. Opaque to the core.
    pub audio_url: String,
    pub image_url: Option<String>,
    /// Nominal track length in seconds.
    pub duration_secs: u32,
    /// Reward credited once on completion.
    pub points: u32,
    pub difficulty: Difficulty,
    /// Percent listened, `0..=100`.
    pub progress: f64,
    pub completed: bool,
    /// Unix epoch milliseconds of the first completion.
    pub completed_at: Option<i64>,
}

impl Challenge {
    /// Creates a not-yet-attempted challenge.
    ///
    /// Text fields beyond title/artist start empty; progress starts at 0.
    pub fn new(
        id: impl Into<ChallengeId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_secs: u32,
        points: u32,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            description: String::new(),
            audio_url: String::new(),
            image_url: None,
            duration_secs,
            points,
            difficulty,
            progress: 0.0,
            completed: false,
            completed_at: None,
        }
    }

    /// Checks record invariants. Storage calls this on every write and read.
    pub fn validate(&self) -> Result<(), ChallengeValidationError> {
        if !CHALLENGE_ID_RE.is_match(&self.id) {
            return Err(ChallengeValidationError::InvalidId(self.id.clone()));
        }
        if self.duration_secs == 0 {
            return Err(ChallengeValidationError::ZeroDuration(self.id.clone()));
        }
        if !self.progress.is_finite() || !(0.0..=PROGRESS_MAX).contains(&self.progress) {
            return Err(ChallengeValidationError::ProgressOutOfRange {
                id: self.id.clone(),
                progress: self.progress,
            });
        }
        if self.completed_at.is_some() && !self.completed {
            return Err(ChallengeValidationError::CompletedAtWithoutCompletion(
                self.id.clone(),
            ));
        }
        Ok(())
    }

    /// Sets progress clamped to `[0, 100]`. Returns whether the value changed.
    ///
    /// Completed records hold 100 until `reset_attempt`; writes are ignored.
    pub fn set_progress(&mut self, progress: f64) -> bool {
        if self.completed {
            return false;
        }
        let clamped = clamp_progress(progress);
        if clamped == self.progress {
            return false;
        }
        self.progress = clamped;
        true
    }

    /// One-way completion. Returns `false` when already completed.
    ///
    /// A repeated call leaves the record untouched, including `completed_at`.
    pub fn mark_complete(&mut self, now_ms: i64) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.progress = PROGRESS_MAX;
        self.completed_at = Some(now_ms);
        true
    }

    /// Reverts to the initial attempt state for a re-run.
    pub fn reset_attempt(&mut self) {
        self.completed = false;
        self.progress = 0.0;
        self.completed_at = None;
    }

    /// Whether the challenge still awaits completion.
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Clamps a progress percentage to `[0, 100]`; NaN maps to 0.
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, PROGRESS_MAX)
}

#[cfg(test)]
mod tests {
    use super::{clamp_progress, Challenge, ChallengeValidationError, Difficulty};

    fn sample() -> Challenge {
        Challenge::new("calm-1", "Morning Calm", "Lo-Fi Lab", 120, 100, Difficulty::Easy)
    }

    #[test]
    fn clamp_progress_bounds_and_nan() {
        assert_eq!(clamp_progress(-4.0), 0.0);
        assert_eq!(clamp_progress(42.5), 42.5);
        assert_eq!(clamp_progress(180.0), 100.0);
        assert_eq!(clamp_progress(f64::NAN), 0.0);
        assert_eq!(clamp_progress(f64::INFINITY), 100.0);
    }

    #[test]
    fn set_progress_reports_change() {
        let mut challenge = sample();
        assert!(challenge.set_progress(50.0));
        assert!(!challenge.set_progress(50.0));
        assert!(challenge.set_progress(250.0));
        assert_eq!(challenge.progress, 100.0);
    }

    #[test]
    fn set_progress_is_ignored_once_completed() {
        let mut challenge = sample();
        challenge.mark_complete(1_000);
        assert!(!challenge.set_progress(12.0));
        assert_eq!(challenge.progress, 100.0);

        challenge.reset_attempt();
        assert!(challenge.set_progress(12.0));
    }

    #[test]
    fn mark_complete_is_one_way_and_keeps_first_timestamp() {
        let mut challenge = sample();
        assert!(challenge.mark_complete(1_000));
        assert!(!challenge.mark_complete(2_000));
        assert!(challenge.completed);
        assert_eq!(challenge.progress, 100.0);
        assert_eq!(challenge.completed_at, Some(1_000));
    }

    #[test]
    fn reset_attempt_restores_initial_state() {
        let mut challenge = sample();
        challenge.mark_complete(1_000);
        challenge.reset_attempt();
        assert!(challenge.is_active());
        assert_eq!(challenge.progress, 0.0);
        assert_eq!(challenge.completed_at, None);
    }

    #[test]
    fn validate_rejects_broken_records() {
        let mut bad_id = sample();
        bad_id.id = "has space".to_string();
        assert!(matches!(
            bad_id.validate(),
            Err(ChallengeValidationError::InvalidId(_))
        ));

        let mut zero = sample();
        zero.duration_secs = 0;
        assert!(matches!(
            zero.validate(),
            Err(ChallengeValidationError::ZeroDuration(_))
        ));

        let mut stray = sample();
        stray.completed_at = Some(5);
        assert!(matches!(
            stray.validate(),
            Err(ChallengeValidationError::CompletedAtWithoutCompletion(_))
        ));

        assert!(sample().validate().is_ok());
    }

    #[test]
    fn difficulty_roundtrips_storage_names() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(Difficulty::parse(difficulty.as_str()), Some(difficulty));
        }
        assert_eq!(Difficulty::parse("legendary"), None);
        assert_eq!(Difficulty::Hard.label(), "Hard");
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let mut challenge = sample();
        challenge.mark_complete(1_700_000_000_000);

        let value = serde_json::to_value(&challenge).expect("serialize challenge");
        assert_eq!(value["durationSecs"], 120);
        assert_eq!(value["difficulty"], "easy");
        assert_eq!(value["completedAt"], 1_700_000_000_000_i64);
        assert!(value.get("duration_secs").is_none());

        let back: Challenge = serde_json::from_value(value).expect("deserialize challenge");
        assert_eq!(back, challenge);
    }
}
