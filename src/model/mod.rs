pub use mctrigger_data::{MeshId, Problem, RunMode, TallyId};

pub mod data {
    pub use mctrigger_data::*;
}
pub mod config {
    pub use mctrigger_core::config::*;
}
pub mod uncertainty {
    pub use mctrigger_core::uncertainty::*;
}
pub mod surface_current {
    pub use mctrigger_core::surface_current::*;
}
pub mod checker {
    pub use mctrigger_core::checker::*;
}
pub mod evaluator {
    pub use mctrigger_core::evaluator::*;
}
pub mod cadence {
    pub use mctrigger_core::cadence::*;
}
pub mod report {
    pub use mctrigger_core::report::*;
}
