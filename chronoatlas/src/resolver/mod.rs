//! Ambiguity Resolver — local civil time to UTC within a known zone.
//!
//! Three cases against the zone's transition schedule:
//!
//! - **Normal**: exactly one valid offset, deterministic conversion.
//! - **Gap**: the local time was skipped (clocks set forward). The wall
//!   clock is shifted forward by the exact gap length, measured from
//!   the offsets on either side of the transition, and a
//!   `non_existent_local_time` warning is emitted. This is an explicit
//!   policy, not rounding.
//! - **Fold**: the local time occurred twice (clocks set back). The
//!   configured [`FoldPolicy`] picks one occurrence and the warning
//!   names both the chosen and the rejected offset.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use thiserror::Error;

use crate::profile::FoldPolicy;
use crate::resolution::Warning;

/// How far around a gap the resolver probes for a valid offset, in
/// hours. No real transition schedule has gaps anywhere near this wide.
const GAP_PROBE_LIMIT_HOURS: i64 = 48;

/// Resolver failures. These indicate pathological zone data, not
/// degraded resolution; degraded paths return a warning instead.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Could not resolve local time {local} in zone {zone}: no valid offset near the transition")]
    Unresolvable { local: NaiveDateTime, zone: Tz },
}

/// Outcome of resolving one local datetime.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalResolution {
    pub utc: DateTime<Utc>,
    pub offset_seconds: i32,
    pub dst_active: bool,
    pub warning: Option<Warning>,
}

/// Resolve a local civil datetime within an IANA zone.
pub fn resolve_in_zone(
    local: NaiveDateTime,
    tz: Tz,
    policy: FoldPolicy,
) -> Result<LocalResolution, ResolverError> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(from_zoned(dt, None)),
        LocalResult::Ambiguous(earlier, later) => Ok(resolve_fold(earlier, later, policy)),
        LocalResult::None => resolve_gap(local, tz),
    }
}

/// Resolve against a fixed offset, bypassing the zone database.
///
/// Used for `FixedOffsetOverride` patches and the `AsEntered` trust
/// path. Never ambiguous.
pub fn resolve_fixed(local: NaiveDateTime, offset_seconds: i32, dst: bool) -> LocalResolution {
    let utc = DateTime::<Utc>::from_naive_utc_and_offset(
        local - Duration::seconds(i64::from(offset_seconds)),
        Utc,
    );
    LocalResolution {
        utc,
        offset_seconds,
        dst_active: dst,
        warning: None,
    }
}

fn from_zoned(dt: DateTime<Tz>, warning: Option<Warning>) -> LocalResolution {
    LocalResolution {
        utc: dt.with_timezone(&Utc),
        offset_seconds: dt.offset().fix().local_minus_utc(),
        dst_active: !dt.offset().dst_offset().is_zero(),
        warning,
    }
}

/// Pick one of the two occurrences of a doubled local time.
///
/// `earlier` and `later` are ordered by UTC instant; during a fall-back
/// fold the earlier instant carries the daylight offset.
fn resolve_fold(earlier: DateTime<Tz>, later: DateTime<Tz>, policy: FoldPolicy) -> LocalResolution {
    let earlier_is_dst = !earlier.offset().dst_offset().is_zero();
    let later_is_dst = !later.offset().dst_offset().is_zero();

    // If neither side matches the requested kind (e.g. a base-offset
    // change where both sides are standard time), the earlier instant
    // is chosen so the outcome stays deterministic.
    let chosen_earlier = match policy {
        FoldPolicy::PreferEarlierInstant => true,
        FoldPolicy::PreferStandardTime => !earlier_is_dst || later_is_dst,
        FoldPolicy::PreferDaylightTime => earlier_is_dst || !later_is_dst,
    };

    let (chosen, rejected) = if chosen_earlier {
        (earlier, later)
    } else {
        (later, earlier)
    };

    let warning = Warning::AmbiguousLocalTime {
        chosen_offset_seconds: chosen.offset().fix().local_minus_utc(),
        rejected_offset_seconds: rejected.offset().fix().local_minus_utc(),
        policy,
    };
    from_zoned(chosen, Some(warning))
}

/// Shift a skipped local time forward across the gap.
fn resolve_gap(local: NaiveDateTime, tz: Tz) -> Result<LocalResolution, ResolverError> {
    let err = || ResolverError::Unresolvable { local, zone: tz };

    let pre_offset = probe_offset(tz, local, -1).ok_or_else(err)?;
    let post_offset = probe_offset(tz, local, 1).ok_or_else(err)?;

    let gap_seconds = i64::from(post_offset - pre_offset);
    if gap_seconds <= 0 {
        return Err(err());
    }

    let shifted = local + Duration::seconds(gap_seconds);
    let warning = Some(Warning::NonExistentLocalTime {
        shifted_by_seconds: gap_seconds,
    });

    match tz.from_local_datetime(&shifted) {
        LocalResult::Single(dt) => Ok(LocalResolution {
            warning,
            ..from_zoned(dt, None)
        }),
        // The shifted time landing on the transition instant itself can
        // report as ambiguous; the earlier instant is the correct one.
        LocalResult::Ambiguous(earlier, _) => Ok(LocalResolution {
            warning,
            ..from_zoned(earlier, None)
        }),
        LocalResult::None => Err(err()),
    }
}

/// Find the UTC offset in effect just before (`direction = -1`) or
/// after (`direction = 1`) a skipped local time, by stepping away in
/// one-hour increments until the zone maps the probe unambiguously.
fn probe_offset(tz: Tz, local: NaiveDateTime, direction: i64) -> Option<i32> {
    for hours in 1..=GAP_PROBE_LIMIT_HOURS {
        let probe = local + Duration::hours(direction * hours);
        if let LocalResult::Single(dt) = tz.from_local_datetime(&probe) {
            return Some(dt.offset().fix().local_minus_utc());
        }
    }
    None
}
