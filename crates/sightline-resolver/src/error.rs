//! Resolution error types.
//!
//! Only two situations are fatal to a `resolve` call: the data boundary
//! failing, and the caller cancelling. Everything else in the taxonomy —
//! an unknown or inactive actor, a cyclic manager chain, a target holding
//! both an ALLOW and a DENY — resolves deterministically without an error
//! (see the resolver module).

use sightline_store::StoreError;
use thiserror::Error;

/// Error type for visibility resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The directory store could not serve a snapshot. Fail-closed:
    /// callers must treat this as "deny all", never as an empty result.
    #[error("directory data unavailable: {0}")]
    DataUnavailable(#[from] StoreError),

    /// The caller cancelled the resolution (timeout or shutdown). No
    /// partial result is surfaced.
    #[error("resolution cancelled by caller")]
    Cancelled,
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
