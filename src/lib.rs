//! # mctrigger
//!
//! Convergence triggers for batch-based Monte Carlo transport runs: decides
//! after each eligible batch whether every tally (and the k-effective
//! estimate) is within its uncertainty threshold, and predicts the batch
//! count needed when it is not.
//!
//! The engine lives in `mctrigger_core`; this crate wires it to files and
//! the command line.

pub mod app;
pub mod model;
