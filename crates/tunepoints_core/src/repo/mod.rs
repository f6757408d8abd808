//! Repository layer: persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage contracts the catalog and user stores write through.
//! - Keep SQL details out of store and engine code.
//!
//! # Invariants
//! - Challenge writes call `Challenge::validate()` before SQL mutations.
//! - Read paths reject invalid persisted rows with `RepoError::InvalidData`
//!   instead of masking them; stores decide how to recover.

pub mod challenge_repo;
pub mod user_progress_repo;

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::challenge::{ChallengeId, ChallengeValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog and user-progress persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ChallengeValidationError),
    Db(DbError),
    NotFound(ChallengeId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "challenge not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
        }
    }
}

impl RepoError {
    /// Whether the error comes from persisted rows that can never be read
    /// back, as opposed to a failure of the database itself (busy, locked,
    /// I/O) that may succeed on retry.
    pub fn is_corrupt_data(&self) -> bool {
        match self {
            Self::Validation(_) | Self::InvalidData(_) => true,
            Self::Db(DbError::Sqlite(
                rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::IntegralValueOutOfRange(..),
            )) => true,
            Self::Db(_) | Self::NotFound(_) | Self::UninitializedConnection { .. } => false,
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<ChallengeValidationError> for RepoError {
    fn from(value: ChallengeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that did not go through `db::open_db*`.
fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn non_negative<T: TryFrom<i64>>(value: i64, column: &str) -> RepoResult<T> {
    T::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid value `{value}` in {column}")))
}
