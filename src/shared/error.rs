/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use super::structs::{ElevatorId, PassengerId};

/// Invariant violations inside the elevator state machine.
///
/// These are internal errors: they mean a caller broke the car's contract, and
/// are never used to steer normal control flow.
#[derive(Debug, Error, PartialEq)]
pub enum ElevatorError {
    #[error("elevator {elevator} is full ({capacity} passengers)")]
    CapacityExceeded { elevator: ElevatorId, capacity: usize },

    #[error("passenger {passenger:?} wants floor {destination}, outside the range of elevator {elevator}")]
    DestinationOutOfRange {
        elevator: ElevatorId,
        passenger: PassengerId,
        destination: i32,
    },

    #[error("passenger {passenger:?} is not in elevator {elevator}")]
    PassengerNotOnboard {
        elevator: ElevatorId,
        passenger: PassengerId,
    },
}

/// A passenger request that cannot be served by this building.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("floor {floor} is outside {min_floor}..={max_floor}")]
    FloorOutOfRange { floor: i32, min_floor: i32, max_floor: i32 },

    #[error("destination is the starting floor ({0})")]
    SameFloor(i32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
