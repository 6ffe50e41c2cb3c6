//! Shared domain types for the Chimera creature builder.
//!
//! Dependency-light crate holding the part/animal catalog, persisted record
//! shapes, generation step and event types, configuration, and error enums.
//! Business logic lives in `chimera-core`; storage implementations in
//! `chimera-infra`.

pub mod catalog;
pub mod config;
pub mod credits;
pub mod error;
pub mod generation;
pub mod part;
pub mod snapshot;
