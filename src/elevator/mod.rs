pub mod fleet;
pub mod fsm;
pub mod movement;


pub use fleet::Fleet;
pub use fleet::SharedElevator;
pub use fsm::Elevator;
pub use movement::Movement;
