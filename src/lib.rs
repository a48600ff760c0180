//! Multi-elevator dispatch simulator.
//!
//! Passengers queue on floors, a scoring-based dispatcher assigns idle cars,
//! and every committed car is driven floor by floor on its own thread while
//! status changes are broadcast on an event bus.

/* Modules */
pub mod building;
pub mod config;
pub mod coordinator;
pub mod elevator;
pub mod events;
pub mod shared;

pub use config::Config;
pub use coordinator::{DispatchOutcome, ElevatorService};
pub use events::{ElevatorEvent, Event, PassengerEvent, PassengerStatus};
pub use shared::{Direction, ElevatorId, ElevatorSnapshot, Passenger, Status};
