//! Request and response contract of the resolution core.
//!
//! [`ResolutionRequest`] is what the API layer hands in;
//! [`ResolutionResult`] is the sole output contract, carrying the
//! resolved instant together with confidence, warnings, and a full
//! provenance trail for audit.

mod types;

pub use types::{
    parse_local_datetime, Confidence, InputError, Provenance, ResolutionRequest, ResolutionResult,
    Source, Warning, MAX_OFFSET_SECONDS,
};
