//! Playback source contract.
//!
//! The audio layer lives outside the core. It reports position, duration and
//! play state; a source that fails to load media reports `is_playing = false`.

use std::collections::VecDeque;

/// Point-in-time playback report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackSnapshot {
    /// Seconds from track start.
    pub position_secs: f64,
    /// Track length in seconds; `0` while media is not loaded.
    pub duration_secs: f64,
    pub is_playing: bool,
}

impl PlaybackSnapshot {
    pub fn playing(position_secs: f64, duration_secs: f64) -> Self {
        Self {
            position_secs,
            duration_secs,
            is_playing: true,
        }
    }

    pub fn paused(position_secs: f64, duration_secs: f64) -> Self {
        Self {
            position_secs,
            duration_secs,
            is_playing: false,
        }
    }
}

/// External collaborator that reports live playback state.
pub trait PlaybackSource {
    fn snapshot(&self) -> PlaybackSnapshot;
}

/// Replays a fixed list of snapshots, one per `advance()`.
///
/// Used by the CLI simulator and by tests in place of a real audio backend.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayback {
    pending: VecDeque<PlaybackSnapshot>,
    current: PlaybackSnapshot,
}

impl ScriptedPlayback {
    pub fn new(frames: impl IntoIterator<Item = PlaybackSnapshot>) -> Self {
        Self {
            pending: frames.into_iter().collect(),
            current: PlaybackSnapshot::default(),
        }
    }

    /// Uninterrupted listen from 0 to `duration_secs` in `step_secs` ticks,
    /// followed by a stopped frame at the end position.
    pub fn full_listen(duration_secs: f64, step_secs: f64) -> Self {
        let mut frames = Vec::new();
        if duration_secs > 0.0 && step_secs > 0.0 {
            let mut position = 0.0;
            while position < duration_secs {
                frames.push(PlaybackSnapshot::playing(position, duration_secs));
                position += step_secs;
            }
            frames.push(PlaybackSnapshot::playing(duration_secs, duration_secs));
        }
        frames.push(PlaybackSnapshot::paused(
            duration_secs.max(0.0),
            duration_secs.max(0.0),
        ));
        Self::new(frames)
    }

    /// Moves to the next frame. Returns `false` once the script is exhausted.
    pub fn advance(&mut self) -> bool {
        match self.pending.pop_front() {
            Some(frame) => {
                self.current = frame;
                true
            }
            None => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl PlaybackSource for ScriptedPlayback {
    fn snapshot(&self) -> PlaybackSnapshot {
        self.current
    }
}
