//! ChronoAtlas - Historical local-time to UTC resolution
//!
//! Given a local civil datetime and a geographic coordinate, this
//! library determines the corresponding UTC instant, the governing
//! time-zone identity, offset, and daylight-saving status — with
//! explicit handling of historical irregularities (wartime clocks,
//! pre-standardization zones, regional exceptions) and of calendar
//! ambiguity (clock folds and gaps).
//!
//! The base IANA zone database is authoritative but historically
//! underspecified; a small, curated patch registry corrects it for
//! specific places and intervals. Every answer carries a confidence
//! tier, warnings, and a provenance trail naming the subsystems and
//! patches that produced it.
//!
//! # High-Level API
//!
//! The [`service`] module provides the composed pipeline:
//!
//! ```ignore
//! use chronoatlas::config::Settings;
//! use chronoatlas::coord::Coordinate;
//! use chronoatlas::profile::ParityProfile;
//! use chronoatlas::resolution::{parse_local_datetime, ResolutionRequest};
//! use chronoatlas::service::ResolverService;
//!
//! let service = ResolverService::new(&Settings::default())?;
//! let request = ResolutionRequest::new(
//!     parse_local_datetime("1943-06-15T14:30:00")?,
//!     Coordinate::new(40.7128, -74.0060)?,
//!     ParityProfile::StrictHistory,
//! );
//! let result = service.resolve(&request)?;
//! ```

pub mod boundary;
pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod patch;
pub mod profile;
pub mod resolution;
pub mod resolver;
pub mod service;
pub mod settlement;
