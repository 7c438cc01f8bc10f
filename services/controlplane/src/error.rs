//! Core operation errors.
//!
//! # Purpose
//! One error surface for every domain operation, shared by the HTTP layer and
//! the direct (transport) layer. Client-addressable kinds carry user-visible
//! messages; store and transport faults are logged by the layer that maps
//! them outward and never leak driver detail to callers.
use crate::store::StoreError;
use thiserror::Error;

pub type OpsResult<T> = Result<T, OpsError>;

#[derive(Debug, Error)]
pub enum OpsError {
    /// Bad user input (names, types, ranges).
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Already exists, or the caller lost a uniqueness race.
    #[error("{0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// Recognized schema type that is not functionally supported yet.
    #[error("{0}")]
    Unsupported(String),
    /// Schema type outside the recognized set.
    #[error("{0}")]
    UnsupportedType(String),
    /// Schema content failed to parse; carries the compiler diagnostic.
    #[error("{0}")]
    SchemaValidation(String),
    #[error("storage failure")]
    Store(#[source] StoreError),
    #[error("transport failure")]
    Transport(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl From<StoreError> for OpsError {
    fn from(err: StoreError) -> Self {
        OpsError::Store(err)
    }
}

impl OpsError {
    /// Whether the error is addressed to the caller rather than an operator.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            OpsError::Store(_) | OpsError::Transport(_) | OpsError::Internal(_)
        )
    }
}
