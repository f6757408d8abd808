//! State containers that act as systems of record.
//!
//! # Responsibility
//! - Hold the in-memory catalog and user record for the process lifetime.
//! - Write every accepted mutation through to the repository layer.
//!
//! # Invariants
//! - A mutation is applied in memory only after persistence succeeds.
//! - Unknown challenge ids are ignored, never reported as errors.
//! - Restoring corrupt persisted state falls back to defaults.

pub mod challenge_store;
pub mod user_store;

use crate::model::challenge::ChallengeId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a store mutation.
#[derive(Debug)]
pub enum StoreError {
    /// Seed catalog contains the same id twice.
    DuplicateChallengeId(ChallengeId),
    /// Write-through to the repository failed; in-memory state is unchanged.
    Persistence(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateChallengeId(id) => write!(f, "duplicate challenge id in catalog: {id}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::DuplicateChallengeId(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}
