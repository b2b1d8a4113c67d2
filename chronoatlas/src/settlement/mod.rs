//! Nearest-Settlement Fallback Index.
//!
//! A spatial nearest-neighbor structure over a fixed catalog of named
//! settlements with known zone identifiers. Consulted only when the
//! boundary index returns no match (open ocean, dataset gaps). Results
//! from this path are capped at `Medium` confidence and always carry
//! the matched settlement name and distance for audit.

mod index;

pub use index::{NearestSettlement, SettlementError, SettlementIndex};
