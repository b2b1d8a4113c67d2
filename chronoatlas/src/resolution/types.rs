//! Request and response types for the resolution core.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{CoordError, Coordinate};
use crate::profile::{FoldPolicy, ParityProfile, UnknownProfileError};

/// Largest magnitude a caller-supplied UTC offset may have, in seconds
/// (UTC±18:00, the widest offset the IANA database has ever carried).
pub const MAX_OFFSET_SECONDS: i32 = 18 * 3600;

/// Input errors, rejected before any lookup runs.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Coordinate(#[from] CoordError),
    #[error("Invalid local datetime: '{0}' (expected e.g. 1943-06-15T14:30:00)")]
    InvalidDatetime(String),
    #[error(transparent)]
    UnknownProfile(#[from] UnknownProfileError),
    #[error("Invalid UTC offset: {0} seconds (must be within ±{MAX_OFFSET_SECONDS})")]
    InvalidOffset(i32),
    #[error("Unknown zone identifier: '{0}'")]
    UnknownZone(String),
}

/// Parse a civil local datetime without offset.
///
/// Accepts ISO `1943-06-15T14:30:00` and the space-separated variant,
/// with optional fractional seconds.
pub fn parse_local_datetime(s: &str) -> Result<NaiveDateTime, InputError> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| InputError::InvalidDatetime(s.to_string()))
}

/// One resolution request, as handed over by the API layer.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    /// Civil local datetime, no attached offset. May be invalid
    /// relative to the zone's transition schedule; that is the point.
    pub local: NaiveDateTime,
    pub coordinate: Coordinate,
    pub profile: ParityProfile,
    /// Caller-supplied explicit offset, honored only by `AsEntered`.
    pub entered_offset_seconds: Option<i32>,
    /// Caller-supplied explicit zone, honored only by `AsEntered`.
    pub entered_zone: Option<String>,
}

impl ResolutionRequest {
    pub fn new(local: NaiveDateTime, coordinate: Coordinate, profile: ParityProfile) -> Self {
        Self {
            local,
            coordinate,
            profile,
            entered_offset_seconds: None,
            entered_zone: None,
        }
    }

    pub fn with_entered_offset(mut self, offset_seconds: i32) -> Self {
        self.entered_offset_seconds = Some(offset_seconds);
        self
    }

    pub fn with_entered_zone(mut self, zone: impl Into<String>) -> Self {
        self.entered_zone = Some(zone.into());
        self
    }
}

/// Confidence tier of a resolution.
///
/// Ordered so that downgrades compose with `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Subsystems consulted while producing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    BoundaryIndex,
    SettlementFallback,
    PatchRegistry,
    TzDatabase,
    CallerInput,
}

/// Degradation warnings attached to an otherwise successful result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The local time fell inside a spring-forward gap and was shifted
    /// forward by exactly the gap length.
    NonExistentLocalTime { shifted_by_seconds: i64 },
    /// The local time was valid under two offsets; the fold policy
    /// chose one, the other was rejected.
    AmbiguousLocalTime {
        chosen_offset_seconds: i32,
        rejected_offset_seconds: i32,
        policy: FoldPolicy,
    },
    /// The caller's explicit offset/zone was echoed without resolution.
    TrustedUserInput,
}

/// Audit trail: which data and which subsystems produced the answer.
#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    /// IANA tzdb release compiled into the process.
    pub tzdb_version: String,
    /// Version string of the loaded boundary dataset.
    pub boundary_dataset_version: String,
    /// The parity profile the caller selected.
    pub resolution_mode: ParityProfile,
    pub sources: Vec<Source>,
    /// Matched patch ids; at most one entry, since patches never stack.
    pub patches_applied: Vec<String>,
}

/// The sole output contract to external callers.
///
/// Created fresh per request and never mutated after assembly.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    /// The resolved absolute instant. Downstream consumers treat this
    /// as opaque and must not re-derive it from local time.
    pub utc: DateTime<Utc>,
    pub zone_id: String,
    pub offset_seconds: i32,
    pub dst_active: bool,
    pub confidence: Confidence,
    /// Short human-readable summary of which path produced the answer.
    pub reason: String,
    pub notes: Vec<String>,
    pub warnings: Vec<Warning>,
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_datetime() {
        let dt = parse_local_datetime("1943-06-15T14:30:00").unwrap();
        assert_eq!(dt.to_string(), "1943-06-15 14:30:00");
    }

    #[test]
    fn test_parse_space_separated_datetime() {
        assert!(parse_local_datetime("2021-11-07 01:30:00").is_ok());
    }

    #[test]
    fn test_parse_without_seconds() {
        assert!(parse_local_datetime("2021-11-07T01:30").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["yesterday", "2021-13-01T00:00:00", "2021-02-30T00:00:00", ""] {
            assert!(
                matches!(parse_local_datetime(bad), Err(InputError::InvalidDatetime(_))),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert_eq!(Confidence::High.min(Confidence::Medium), Confidence::Medium);
    }

    #[test]
    fn test_confidence_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Confidence::High).unwrap(), "\"high\"");
    }

    #[test]
    fn test_warning_serialization_is_tagged() {
        let w = Warning::NonExistentLocalTime {
            shifted_by_seconds: 3600,
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "non_existent_local_time");
        assert_eq!(json["shifted_by_seconds"], 3600);
    }
}
