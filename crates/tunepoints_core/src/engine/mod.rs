//! Points-accrual engine and its playback collaborator.
//!
//! # Responsibility
//! - Turn playback snapshots into incremental points for one session.
//! - Fire the completion transition into both stores at most once per session.
//!
//! # Invariants
//! - The engine owns no persistent data; stores are the systems of record.
//! - Stores are reached only through the sink traits below.

pub mod playback;
pub mod progress_engine;

pub use playback::{PlaybackSnapshot, PlaybackSource, ScriptedPlayback};
pub use progress_engine::{
    ChallengeProgressSink, CompletionSink, ProgressEngine, SkipReason, TickOutcome, TickReport,
    COMPLETION_THRESHOLD_PERCENT,
};
