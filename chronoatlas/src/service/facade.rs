//! Resolver service facade: composition and per-request pipeline.

use std::sync::Arc;

use chrono_tz::Tz;

use super::assembler::{assemble, offset_label, ResolutionContext};
use super::error::{ResolveError, ServiceError};
use crate::boundary::BoundaryIndex;
use crate::cache::{
    get_or_compute, CacheStats, LookupVia, LruZoneCache, NoOpZoneCache, ZoneCache, ZoneLookup,
};
use crate::config::Settings;
use crate::patch::{PatchEffect, PatchRegistry};
use crate::profile::{FoldPolicy, ParityProfile, PatchFilter};
use crate::resolution::{InputError, ResolutionRequest, ResolutionResult, MAX_OFFSET_SECONDS};
use crate::resolver::{resolve_fixed, resolve_in_zone, LocalResolution};
use crate::settlement::SettlementIndex;

/// Top-level resolution service.
///
/// Owns the three startup-loaded, immutable indexes and the one piece
/// of mutable shared state, the coordinate lookup cache. Request
/// handlers share it by reference; everything is `Send + Sync` and
/// requests run independently with no ordering guarantees.
///
/// # Example
///
/// ```ignore
/// use chronoatlas::config::Settings;
/// use chronoatlas::service::ResolverService;
/// use chronoatlas::coord::Coordinate;
/// use chronoatlas::profile::ParityProfile;
/// use chronoatlas::resolution::{parse_local_datetime, ResolutionRequest};
///
/// let service = ResolverService::new(&Settings::default())?;
/// let request = ResolutionRequest::new(
///     parse_local_datetime("1943-06-15T14:30:00")?,
///     Coordinate::new(40.7128, -74.0060)?,
///     ParityProfile::StrictHistory,
/// );
/// let result = service.resolve(&request)?;
/// println!("{} ({:?})", result.utc, result.confidence);
/// ```
pub struct ResolverService {
    boundary: BoundaryIndex,
    settlements: SettlementIndex,
    patches: PatchRegistry,
    cache: Arc<dyn ZoneCache>,
    default_fold: FoldPolicy,
}

impl ResolverService {
    /// Load all datasets and wire the service together.
    ///
    /// This is the only phase with I/O. Any dataset failure aborts
    /// startup; the service never runs partially initialized.
    pub fn new(settings: &Settings) -> Result<Self, ServiceError> {
        let boundary = BoundaryIndex::load(&settings.datasets.boundary_path)?;
        let settlements = SettlementIndex::load(&settings.datasets.settlement_path)?;
        let patches = PatchRegistry::load(&settings.datasets.patch_path)?;

        let cache: Arc<dyn ZoneCache> = if settings.cache.enabled {
            Arc::new(LruZoneCache::new(settings.cache.capacity))
        } else {
            Arc::new(NoOpZoneCache)
        };

        tracing::info!(
            tzdb = chrono_tz::IANA_TZDB_VERSION,
            boundary_version = boundary.version(),
            features = boundary.feature_count(),
            settlements = settlements.settlement_count(),
            patches = patches.patch_count(),
            cache_enabled = settings.cache.enabled,
            "Resolver service ready"
        );

        Ok(Self {
            boundary,
            settlements,
            patches,
            cache,
            default_fold: settings.resolver.fold_policy,
        })
    }

    /// Replace the lookup cache. Used by tests to verify cache
    /// transparency and by embedders that share a cache between
    /// services.
    pub fn with_cache(mut self, cache: Arc<dyn ZoneCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Snapshot of the lookup cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The IANA tzdb release compiled into this binary.
    pub fn tzdb_version() -> &'static str {
        chrono_tz::IANA_TZDB_VERSION
    }

    /// Resolve one request.
    ///
    /// Input validation happens before any lookup; degraded resolution
    /// paths (fallback index, patches, folds, gaps) succeed with
    /// downgraded confidence rather than failing.
    pub fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionResult, ResolveError> {
        if let Some(offset) = request.entered_offset_seconds {
            if offset.abs() > MAX_OFFSET_SECONDS {
                return Err(InputError::InvalidOffset(offset).into());
            }
        }

        let plan = request.profile.plan(self.default_fold);

        if plan.trust_caller_offset {
            if let Some(offset) = request.entered_offset_seconds {
                return Ok(self.assemble_trusted_offset(request, offset));
            }
            if let Some(zone) = &request.entered_zone {
                return self.resolve_trusted_zone(request, zone, plan.fold_policy);
            }
            // No explicit input to trust; fall through to the full
            // pipeline while keeping as_entered in provenance.
        }

        let lookup = get_or_compute(self.cache.as_ref(), &request.coordinate, || {
            self.lookup_zone(request)
        })?;

        let patch = if plan.patch_filter == PatchFilter::Disabled {
            None
        } else {
            self.patches.find_match(
                &request.coordinate,
                &request.local,
                Some(&lookup.zone_id),
                plan.patch_filter,
            )
        };

        let (zone_id, resolution, used_tzdb) = match patch.map(|p| &p.effect) {
            Some(PatchEffect::FixedOffsetOverride {
                offset_seconds,
                dst,
            }) => (
                lookup.zone_id.clone(),
                resolve_fixed(request.local, *offset_seconds, *dst),
                false,
            ),
            Some(PatchEffect::ZoneOverride { zone_id }) => (
                zone_id.clone(),
                self.resolve_zone_ruleset(request, zone_id, plan.fold_policy)?,
                true,
            ),
            None => (
                lookup.zone_id.clone(),
                self.resolve_zone_ruleset(request, &lookup.zone_id, plan.fold_policy)?,
                true,
            ),
        };

        tracing::debug!(
            zone = %zone_id,
            offset = resolution.offset_seconds,
            profile = %request.profile,
            patched = patch.is_some(),
            "Resolved local time"
        );

        Ok(assemble(ResolutionContext {
            profile: request.profile,
            boundary_dataset_version: self.boundary.version(),
            zone_id,
            resolution,
            via: Some(&lookup.via),
            patch,
            patches_consulted: plan.patch_filter != PatchFilter::Disabled,
            used_tzdb,
            trusted_input: false,
        }))
    }

    /// Boundary lookup with settlement fallback. Runs on cache miss.
    fn lookup_zone(&self, request: &ResolutionRequest) -> Result<ZoneLookup, ResolveError> {
        if let Some(zone_id) = self.boundary.lookup(&request.coordinate) {
            return Ok(ZoneLookup {
                zone_id: zone_id.to_string(),
                via: LookupVia::Boundary,
            });
        }

        let nearest = self
            .settlements
            .nearest(&request.coordinate)
            .ok_or(ResolveError::NoCoverage)?;
        tracing::debug!(
            settlement = %nearest.name,
            distance_km = nearest.distance_km,
            "Boundary lookup inconclusive, using settlement fallback"
        );
        Ok(ZoneLookup {
            zone_id: nearest.zone_id,
            via: LookupVia::Settlement {
                name: nearest.name,
                distance_km: nearest.distance_km,
            },
        })
    }

    fn resolve_zone_ruleset(
        &self,
        request: &ResolutionRequest,
        zone_id: &str,
        fold_policy: FoldPolicy,
    ) -> Result<LocalResolution, ResolveError> {
        // Zone ids are validated against the tz database at dataset
        // load, so a parse failure here means inconsistent data.
        let tz: Tz = zone_id
            .parse()
            .map_err(|_| ResolveError::MissingZoneData(zone_id.to_string()))?;
        Ok(resolve_in_zone(request.local, tz, fold_policy)?)
    }

    fn assemble_trusted_offset(
        &self,
        request: &ResolutionRequest,
        offset: i32,
    ) -> ResolutionResult {
        let zone_id = request
            .entered_zone
            .clone()
            .unwrap_or_else(|| offset_label(offset));
        assemble(ResolutionContext {
            profile: request.profile,
            boundary_dataset_version: self.boundary.version(),
            zone_id,
            resolution: resolve_fixed(request.local, offset, false),
            via: None,
            patch: None,
            patches_consulted: false,
            used_tzdb: false,
            trusted_input: true,
        })
    }

    fn resolve_trusted_zone(
        &self,
        request: &ResolutionRequest,
        zone: &str,
        fold_policy: FoldPolicy,
    ) -> Result<ResolutionResult, ResolveError> {
        let tz: Tz = zone
            .parse()
            .map_err(|_| InputError::UnknownZone(zone.to_string()))?;
        let resolution = resolve_in_zone(request.local, tz, fold_policy)?;
        Ok(assemble(ResolutionContext {
            profile: request.profile,
            boundary_dataset_version: self.boundary.version(),
            zone_id: zone.to_string(),
            resolution,
            via: None,
            patch: None,
            patches_consulted: false,
            used_tzdb: true,
            trusted_input: true,
        }))
    }
}
