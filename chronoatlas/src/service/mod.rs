//! High-level resolution service.
//!
//! Wires the boundary index, settlement fallback, patch registry,
//! lookup cache, and ambiguity resolver into a single facade with one
//! operation: [`ResolverService::resolve`]. The facade owns composition
//! so callers never assemble the pipeline themselves.

mod assembler;
mod error;
mod facade;

pub use error::{ResolveError, ServiceError};
pub use facade::ResolverService;
