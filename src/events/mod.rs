pub mod bus;


pub use bus::ElevatorEvent;
pub use bus::Event;
pub use bus::EventBus;
pub use bus::PassengerEvent;
pub use bus::PassengerStatus;
