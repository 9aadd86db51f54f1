//! Error types for the digest service.
//!
//! This module defines the central [`Error`] enum, which captures every
//! recoverable failure the core can report to a caller. None of them are
//! fatal: the service keeps running and the boundary layer decides how to
//! surface each case.
//!
//! ## Error Cases
//! - `NotFound`: No completed digest exists for the identifier, either because
//!   it was never issued or because its task has not finished yet.
//! - `InvalidInput`: The caller supplied an empty secret or an identifier that
//!   could not be parsed.
//! - `ServiceShutdown`: A submission arrived after shutdown was triggered.

use crate::id::Identifier;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the digest service.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No completed record exists for `id`.
    ///
    /// Unknown and still-pending identifiers are deliberately reported the
    /// same way.
    #[error("id not found: {id}")]
    NotFound { id: Identifier },

    /// The request was malformed.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The service is draining or stopped and refuses new work.
    #[error("Service is shutting down")]
    ServiceShutdown,
}
