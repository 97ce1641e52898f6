//! # Relation Index Engine
//!
//! | Part | Module | Role |
//! |------|--------|------|
//! | Class cache | `cache` | Interns label classes, memoizes evaluator answers per class |
//! | Builder | `builder` | One full indexing pass for one claimed net |
//! | Scheduler | `scheduler` | Claims jobs, runs builders, applies the failure policy |
//!
//! The lifecycle itself (`IndexStatus` and its transition table) lives in
//! `model::status`; the store enforces it.

pub mod cache;
pub mod builder;
pub mod scheduler;

pub use builder::{BuildReport, RelationIndexBuilder};
pub use cache::{ClassArena, ClassId, SymmetricCache, UnaryCache};
pub use scheduler::{FailurePolicy, IndexScheduler, JobOutcome};
