//! Domain records for the rewards core.
//!
//! # Responsibility
//! - Define the catalog entry (`Challenge`), the cumulative account record
//!   (`UserProgress`) and the per-session value object (`SessionConfig`).
//! - Keep state transitions that must hold everywhere (progress clamping,
//!   one-way completion) on the records themselves.
//!
//! # Invariants
//! - A challenge id never changes after creation.
//! - Progress is always within `[0, 100]`.

pub mod challenge;
pub mod session;
pub mod user_progress;
