//! Historical Patch Registry.
//!
//! Hand-curated region+interval override rules correcting the base zone
//! database where it is historically underspecified: wartime clock
//! regimes, pre-standardization local solar and railway time, regional
//! adoption lag. Loaded once at startup, immutable thereafter; a
//! malformed patch set is a fatal startup error.
//!
//! At most one patch applies to any (coordinate, datetime): matching
//! returns the first hit in a fixed, tested priority order.

mod registry;
mod types;

pub use registry::{PatchError, PatchRegistry};
pub use types::{Patch, PatchEffect, PatchEra, PatchRegion};
