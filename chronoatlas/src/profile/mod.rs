//! Parity Profile Selector.
//!
//! A parity profile is a named pipeline configuration balancing
//! historical accuracy against compatibility with an external reference
//! tool. Each profile expands, through the single dispatch point
//! [`ParityProfile::plan`], into a [`ResolutionPlan`] describing which
//! subsystems are consulted and which fold policy applies. Adding a
//! profile means adding a variant and a plan arm; nothing else in the
//! pipeline branches on the profile directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for an unrecognized profile name.
///
/// Selecting an unknown profile is an input error, never a silent
/// default.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unknown parity profile: '{0}' (expected strict_history, astro_compat, future_compat, or as_entered)")]
pub struct UnknownProfileError(pub String);

/// The closed set of resolution pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParityProfile {
    /// Full pipeline: boundary/fallback index, all patches, default
    /// fold policy. The reference mode.
    StrictHistory,
    /// Boundary/fallback index only; patches disabled; fold policy
    /// matched to the mirrored astronomical reference tool.
    AstroCompat,
    /// Boundary/fallback index plus announced future convention
    /// changes; current-era historical patches excluded.
    FutureCompat,
    /// Trust a caller-supplied offset or zone verbatim; without one,
    /// behaves as `StrictHistory`.
    AsEntered,
}

impl ParityProfile {
    /// Stable snake_case name, used in provenance.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrictHistory => "strict_history",
            Self::AstroCompat => "astro_compat",
            Self::FutureCompat => "future_compat",
            Self::AsEntered => "as_entered",
        }
    }

    /// Expand the profile into a concrete pipeline plan.
    ///
    /// `default_fold` is the operator-configured fold policy; profiles
    /// that mirror an external tool override it.
    pub fn plan(&self, default_fold: FoldPolicy) -> ResolutionPlan {
        match self {
            Self::StrictHistory => ResolutionPlan {
                patch_filter: PatchFilter::All,
                use_boundary_index: true,
                fold_policy: default_fold,
                trust_caller_offset: false,
            },
            Self::AstroCompat => ResolutionPlan {
                patch_filter: PatchFilter::Disabled,
                use_boundary_index: true,
                // The mirrored reference tool always takes the first
                // occurrence of a doubled local time.
                fold_policy: FoldPolicy::PreferEarlierInstant,
                trust_caller_offset: false,
            },
            Self::FutureCompat => ResolutionPlan {
                patch_filter: PatchFilter::ForwardOnly,
                use_boundary_index: true,
                fold_policy: default_fold,
                trust_caller_offset: false,
            },
            Self::AsEntered => ResolutionPlan {
                patch_filter: PatchFilter::All,
                use_boundary_index: true,
                fold_policy: default_fold,
                trust_caller_offset: true,
            },
        }
    }
}

impl FromStr for ParityProfile {
    type Err = UnknownProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict_history" => Ok(Self::StrictHistory),
            "astro_compat" => Ok(Self::AstroCompat),
            "future_compat" => Ok(Self::FutureCompat),
            "as_entered" => Ok(Self::AsEntered),
            other => Err(UnknownProfileError(other.to_string())),
        }
    }
}

impl fmt::Display for ParityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a doubled local time (clocks set back) is disambiguated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldPolicy {
    /// Pick the occurrence under the zone's standard offset.
    #[default]
    PreferStandardTime,
    /// Pick the occurrence under the daylight-saving offset.
    PreferDaylightTime,
    /// Pick whichever occurrence maps to the earlier UTC instant.
    PreferEarlierInstant,
}

impl FoldPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreferStandardTime => "prefer_standard_time",
            Self::PreferDaylightTime => "prefer_daylight_time",
            Self::PreferEarlierInstant => "prefer_earlier_instant",
        }
    }
}

impl FromStr for FoldPolicy {
    type Err = UnknownProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefer_standard_time" => Ok(Self::PreferStandardTime),
            "prefer_daylight_time" => Ok(Self::PreferDaylightTime),
            "prefer_earlier_instant" => Ok(Self::PreferEarlierInstant),
            other => Err(UnknownProfileError(other.to_string())),
        }
    }
}

/// Which patch subset a plan consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchFilter {
    /// Historical and forward patches.
    All,
    /// Only announced future convention changes.
    ForwardOnly,
    /// Patch registry not consulted.
    Disabled,
}

/// Concrete pipeline configuration produced by [`ParityProfile::plan`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionPlan {
    pub patch_filter: PatchFilter,
    /// Whether the spatial indexes resolve the zone. True for every
    /// current profile; part of the plan contract so embedders can
    /// inspect what a profile consults.
    pub use_boundary_index: bool,
    pub fold_policy: FoldPolicy,
    pub trust_caller_offset: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_history_plan() {
        let plan = ParityProfile::StrictHistory.plan(FoldPolicy::default());
        assert_eq!(plan.patch_filter, PatchFilter::All);
        assert!(plan.use_boundary_index);
        assert_eq!(plan.fold_policy, FoldPolicy::PreferStandardTime);
        assert!(!plan.trust_caller_offset);
    }

    #[test]
    fn test_astro_compat_disables_patches_and_overrides_fold() {
        let plan = ParityProfile::AstroCompat.plan(FoldPolicy::PreferDaylightTime);
        assert_eq!(plan.patch_filter, PatchFilter::Disabled);
        assert_eq!(plan.fold_policy, FoldPolicy::PreferEarlierInstant);
    }

    #[test]
    fn test_future_compat_restricts_patches() {
        let plan = ParityProfile::FutureCompat.plan(FoldPolicy::default());
        assert_eq!(plan.patch_filter, PatchFilter::ForwardOnly);
    }

    #[test]
    fn test_as_entered_trusts_caller() {
        let plan = ParityProfile::AsEntered.plan(FoldPolicy::default());
        assert!(plan.trust_caller_offset);
        // Fall-through behavior matches StrictHistory
        assert_eq!(plan.patch_filter, PatchFilter::All);
    }

    #[test]
    fn test_profile_round_trip_names() {
        for profile in [
            ParityProfile::StrictHistory,
            ParityProfile::AstroCompat,
            ParityProfile::FutureCompat,
            ParityProfile::AsEntered,
        ] {
            assert_eq!(profile.as_str().parse::<ParityProfile>().unwrap(), profile);
        }
    }

    #[test]
    fn test_unknown_profile_is_an_error() {
        let result = "maximum_effort".parse::<ParityProfile>();
        assert!(matches!(result, Err(UnknownProfileError(_))));
    }

    #[test]
    fn test_unknown_fold_policy_is_an_error() {
        assert!("prefer_chaos".parse::<FoldPolicy>().is_err());
    }
}
