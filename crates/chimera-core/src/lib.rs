//! Builder state engine for the Chimera creature builder.
//!
//! The core is a small family of collaborating state machines:
//!
//! - [`storage`] — the `KvStore` trait, an in-memory implementation, and
//!   the best-effort typed persistence gateway.
//! - [`credits`] — the credits ledger with its one-way ever-topped-up flag.
//! - [`policy`] — pure freemium lock predicates.
//! - [`session`] — the part/animal assignment store.
//! - [`selection`] — the generation selection validator.
//! - [`generation`] — the single-flight simulated generation pipeline.
//! - [`coordinator`] — the paid-generation orchestration on top of all of
//!   the above.
//!
//! Everything is single-flight and cooperatively scheduled: the only
//! suspension points are the timed sleeps between generation steps.

pub mod coordinator;
pub mod credits;
pub mod generation;
pub mod policy;
pub mod selection;
pub mod session;
pub mod storage;
