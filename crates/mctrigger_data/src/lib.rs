//! # mctrigger data
//!
//! Plain data model shared by the trigger engine: tallies and their
//! accumulators, scores, filters, structured meshes, triggers and the
//! eigenvalue estimate. Everything here is owned by external collaborators
//! (the tally accumulation loop, the input parser) and only read by the
//! engine.

pub mod data;

pub use data::mesh::{MeshId, MeshSurface, StructuredMesh};
pub use data::problem::{EigenvalueState, Problem, RunMode};
pub use data::tally::{
    Accumulator, Filter, Score, ScoreKind, Tally, TallyId, TallyKind, TallyResults,
};
pub use data::trigger::{Trigger, TriggerMetric};
