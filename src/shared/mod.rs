pub mod error;
pub mod macros;
pub mod structs;

pub use error::ConfigError;
pub use error::ElevatorError;
pub use error::RequestError;
pub use structs::Direction;
pub use structs::ElevatorId;
pub use structs::ElevatorSnapshot;
pub use structs::FloorQueueInfo;
pub use structs::Passenger;
pub use structs::PassengerId;
pub use structs::Status;
