pub mod context;
pub mod dispatcher;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod dispatcher_tests;

pub use context::SimulationContext;
pub use dispatcher::{Assignment, Dispatcher};
pub use scoring::{CandidateFloor, ScoreBreakdown, ScoringEngine};
pub use service::{DispatchOutcome, ElevatorService};
