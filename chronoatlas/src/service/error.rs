//! Service error types.

use thiserror::Error;

use crate::boundary::BoundaryError;
use crate::config::ConfigFileError;
use crate::patch::PatchError;
use crate::resolution::InputError;
use crate::resolver::ResolverError;
use crate::settlement::SettlementError;

/// Fatal startup errors.
///
/// Dataset loading is the only phase with I/O; if any dataset fails to
/// load the service never starts. Partial initialization is not a
/// valid state, and these errors cannot occur mid-request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigFileError),
    #[error("Boundary dataset unavailable: {0}")]
    Boundary(#[from] BoundaryError),
    #[error("Settlement catalog unavailable: {0}")]
    Settlement(#[from] SettlementError),
    #[error("Patch dataset unavailable: {0}")]
    Patch(#[from] PatchError),
}

/// Per-request errors.
///
/// Only malformed input and pathological data conditions fail a
/// request; degraded resolution (fallback index, patches, folds and
/// gaps) succeeds with downgraded confidence instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Resolver(#[from] ResolverError),
    /// The indexes produced a zone the compiled tz database does not
    /// know. Dataset validation at load makes this unreachable in
    /// practice.
    #[error("Zone '{0}' is missing from the tz database")]
    MissingZoneData(String),
    /// Neither index produced a zone. The settlement catalog is
    /// validated non-empty at load, so this is defensive only.
    #[error("No zone coverage for the requested coordinate")]
    NoCoverage,
}
