pub mod mesh;
pub mod problem;
pub mod tally;
pub mod trigger;
