//! Result Assembler — combines pipeline outputs into the final answer.
//!
//! Confidence tier rules:
//! - `High` only for a clean boundary-index match with no patch and no
//!   fold/gap warning.
//! - `Medium` when a patch was applied or the settlement fallback was
//!   used; a patch's own curator confidence can lower this further.
//! - `Low` for the AsEntered trust path, or whenever a fold/gap
//!   warning was emitted.

use crate::cache::LookupVia;
use crate::patch::{Patch, PatchEffect};
use crate::profile::ParityProfile;
use crate::resolution::{Confidence, Provenance, ResolutionResult, Source, Warning};
use crate::resolver::LocalResolution;

/// Everything the assembler needs about one resolved request.
pub(crate) struct ResolutionContext<'a> {
    pub profile: ParityProfile,
    pub boundary_dataset_version: &'a str,
    pub zone_id: String,
    pub resolution: LocalResolution,
    /// How the spatial lookup found the zone; `None` on the trusted
    /// caller-input path, which skips the indexes entirely.
    pub via: Option<&'a LookupVia>,
    pub patch: Option<&'a Patch>,
    /// Whether the registry was consulted at all (it is skipped when
    /// the plan disables patches).
    pub patches_consulted: bool,
    /// Whether a zone ruleset (rather than a fixed offset) produced the
    /// conversion.
    pub used_tzdb: bool,
    pub trusted_input: bool,
}

/// Build the immutable result from a resolved request.
pub(crate) fn assemble(ctx: ResolutionContext<'_>) -> ResolutionResult {
    let mut warnings = Vec::new();
    if ctx.trusted_input {
        warnings.push(Warning::TrustedUserInput);
    }
    if let Some(warning) = &ctx.resolution.warning {
        warnings.push(warning.clone());
    }

    let mut notes = Vec::new();
    if let Some(LookupVia::Settlement { name, distance_km }) = ctx.via {
        notes.push(format!(
            "nearest settlement '{name}' at {distance_km:.1} km used as fallback"
        ));
    }
    if let Some(patch) = ctx.patch {
        match &patch.note {
            Some(note) => notes.push(format!("patch '{}': {note}", patch.id)),
            None => notes.push(format!("patch '{}' applied", patch.id)),
        }
    }

    // Everything derived from the context is computed before the
    // struct literal takes ownership of its fields.
    let confidence = confidence_tier(
        ctx.trusted_input,
        ctx.via,
        ctx.patch,
        ctx.resolution.warning.as_ref(),
    );
    let reason = reason(&ctx);
    let sources = sources(&ctx);

    ResolutionResult {
        utc: ctx.resolution.utc,
        zone_id: ctx.zone_id,
        offset_seconds: ctx.resolution.offset_seconds,
        dst_active: ctx.resolution.dst_active,
        confidence,
        reason,
        notes,
        warnings,
        provenance: Provenance {
            tzdb_version: chrono_tz::IANA_TZDB_VERSION.to_string(),
            boundary_dataset_version: ctx.boundary_dataset_version.to_string(),
            resolution_mode: ctx.profile,
            sources,
            patches_applied: ctx.patch.iter().map(|p| p.id.clone()).collect(),
        },
    }
}

fn confidence_tier(
    trusted: bool,
    via: Option<&LookupVia>,
    patch: Option<&Patch>,
    warning: Option<&Warning>,
) -> Confidence {
    if trusted {
        return Confidence::Low;
    }

    let mut tier = Confidence::High;
    if matches!(via, Some(LookupVia::Settlement { .. })) {
        tier = tier.min(Confidence::Medium);
    }
    if let Some(patch) = patch {
        tier = tier.min(Confidence::Medium).min(patch.confidence);
    }
    if warning.is_some() {
        tier = tier.min(Confidence::Low);
    }
    tier
}

fn reason(ctx: &ResolutionContext<'_>) -> String {
    if ctx.trusted_input {
        return if ctx.used_tzdb {
            "caller-supplied zone trusted".to_string()
        } else {
            "caller-supplied offset trusted verbatim".to_string()
        };
    }
    if let Some(patch) = ctx.patch {
        return match &patch.effect {
            PatchEffect::ZoneOverride { zone_id } => {
                format!("patch '{}' overrode zone to {zone_id}", patch.id)
            }
            PatchEffect::FixedOffsetOverride { .. } => {
                format!("patch '{}' pinned a fixed offset", patch.id)
            }
        };
    }
    match ctx.via {
        Some(LookupVia::Settlement { .. }) => {
            "nearest-settlement fallback (boundary lookup inconclusive)".to_string()
        }
        _ => "boundary index match".to_string(),
    }
}

fn sources(ctx: &ResolutionContext<'_>) -> Vec<Source> {
    let mut sources = Vec::new();
    if ctx.trusted_input {
        sources.push(Source::CallerInput);
    } else {
        sources.push(Source::BoundaryIndex);
        if matches!(ctx.via, Some(LookupVia::Settlement { .. })) {
            sources.push(Source::SettlementFallback);
        }
        if ctx.patches_consulted {
            sources.push(Source::PatchRegistry);
        }
    }
    if ctx.used_tzdb {
        sources.push(Source::TzDatabase);
    }
    sources
}

/// Label for a raw caller-supplied offset with no zone name, e.g.
/// `UTC+05:30`.
pub(crate) fn offset_label(offset_seconds: i32) -> String {
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let magnitude = offset_seconds.unsigned_abs();
    format!("UTC{sign}{:02}:{:02}", magnitude / 3600, magnitude % 3600 / 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn resolution() -> LocalResolution {
        LocalResolution {
            utc: DateTime::<Utc>::from_timestamp(1623758400, 0).unwrap(),
            offset_seconds: -4 * 3600,
            dst_active: true,
            warning: None,
        }
    }

    #[test]
    fn test_assemble_clean_boundary_result() {
        let via = LookupVia::Boundary;
        let result = assemble(ResolutionContext {
            profile: ParityProfile::StrictHistory,
            boundary_dataset_version: "test.1",
            zone_id: "America/New_York".to_string(),
            resolution: resolution(),
            via: Some(&via),
            patch: None,
            patches_consulted: true,
            used_tzdb: true,
            trusted_input: false,
        });

        assert_eq!(result.zone_id, "America/New_York");
        assert_eq!(result.offset_seconds, -4 * 3600);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.reason, "boundary index match");
        assert_eq!(
            result.provenance.sources,
            vec![Source::BoundaryIndex, Source::PatchRegistry, Source::TzDatabase]
        );
        assert_eq!(result.provenance.boundary_dataset_version, "test.1");
        assert!(result.warnings.is_empty());
        assert!(result.notes.is_empty());
    }

    #[test]
    fn test_assemble_settlement_fallback_result() {
        let via = LookupVia::Settlement {
            name: "Amsterdam".to_string(),
            distance_km: 112.4,
        };
        let result = assemble(ResolutionContext {
            profile: ParityProfile::StrictHistory,
            boundary_dataset_version: "test.1",
            zone_id: "Europe/Amsterdam".to_string(),
            resolution: resolution(),
            via: Some(&via),
            patch: None,
            patches_consulted: true,
            used_tzdb: true,
            trusted_input: false,
        });

        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.provenance.sources.contains(&Source::SettlementFallback));
        assert!(result.notes.iter().any(|n| n.contains("Amsterdam")));
    }

    #[test]
    fn test_offset_label() {
        assert_eq!(offset_label(0), "UTC+00:00");
        assert_eq!(offset_label(19800), "UTC+05:30");
        assert_eq!(offset_label(-14400), "UTC-04:00");
        assert_eq!(offset_label(1172), "UTC+00:19");
    }

    #[test]
    fn test_clean_boundary_hit_is_high() {
        let tier = confidence_tier(false, Some(&LookupVia::Boundary), None, None);
        assert_eq!(tier, Confidence::High);
    }

    #[test]
    fn test_fallback_caps_at_medium() {
        let via = LookupVia::Settlement {
            name: "Amsterdam".to_string(),
            distance_km: 42.0,
        };
        assert_eq!(
            confidence_tier(false, Some(&via), None, None),
            Confidence::Medium
        );
    }

    #[test]
    fn test_warning_forces_low() {
        let warning = Warning::NonExistentLocalTime {
            shifted_by_seconds: 3600,
        };
        assert_eq!(
            confidence_tier(false, Some(&LookupVia::Boundary), None, Some(&warning)),
            Confidence::Low
        );
    }

    #[test]
    fn test_trusted_input_is_always_low() {
        assert_eq!(confidence_tier(true, None, None, None), Confidence::Low);
    }
}
