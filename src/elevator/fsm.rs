/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::debug;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::BuildingConfig;
use crate::shared::{Direction, ElevatorError, ElevatorId, ElevatorSnapshot, Passenger, PassengerId, Status};

/**
 * State machine of a single car.
 *
 * Only the dispatcher (while the car is `Stationary`) and the car's own
 * movement thread (otherwise) mutate it, always behind the car's mutex.
 *
 * # Fields
 * - `id`:          Assigned once by the fleet.
 * - `floor`:       Current floor, always inside the building.
 * - `status`:      Stationary, Moving or DoorsOpen.
 * - `direction`:   Committed direction of travel, `None` when idle.
 * - `capacity`:    Maximum number of passengers onboard.
 * - `passengers`:  Passengers currently riding, in boarding order.
 * - `target`:      Floor the car committed to; `None` while stationary.
 * - `min_floor`/`max_floor`: Clamp range for movement.
 */
#[derive(Debug)]
pub struct Elevator {
    id: ElevatorId,
    floor: i32,
    status: Status,
    direction: Direction,
    capacity: usize,
    passengers: Vec<Passenger>,
    target: Option<i32>,
    min_floor: i32,
    max_floor: i32,
}

impl Elevator {
    pub fn new(id: ElevatorId, capacity: usize, building: &BuildingConfig) -> Elevator {
        Elevator::at_floor(id, capacity, building, building.min_floor)
    }

    pub fn at_floor(id: ElevatorId, capacity: usize, building: &BuildingConfig, floor: i32) -> Elevator {
        Elevator {
            id,
            floor: building.clamp(floor),
            status: Status::Stationary,
            direction: Direction::None,
            capacity: capacity.max(1),
            passengers: Vec::new(),
            target: None,
            min_floor: building.min_floor,
            max_floor: building.max_floor,
        }
    }

    /***************************************/
    /*              Accessors              */
    /***************************************/
    pub fn id(&self) -> ElevatorId {
        self.id
    }

    pub fn floor(&self) -> i32 {
        self.floor
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn target(&self) -> Option<i32> {
        self.target
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn onboard(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.passengers.len() >= self.capacity
    }

    pub fn is_available(&self) -> bool {
        self.status == Status::Stationary && self.direction == Direction::None
    }

    pub fn available_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.passengers.len())
    }

    /// Share of the capacity in use, between 0 and 1.
    pub fn load_factor(&self) -> f64 {
        self.passengers.len() as f64 / self.capacity as f64
    }

    pub fn destinations(&self) -> impl Iterator<Item = i32> + '_ {
        self.passengers.iter().map(Passenger::destination)
    }

    pub fn snapshot(&self) -> ElevatorSnapshot {
        ElevatorSnapshot {
            id: self.id,
            floor: self.floor,
            status: self.status,
            direction: self.direction,
            capacity: self.capacity,
            onboard: self.passengers.len(),
            destinations: self.destinations().collect(),
            target: self.target,
        }
    }

    /***************************************/
    /*             Transitions             */
    /***************************************/

    /// Commits the car to `target`. A target on the current floor opens the
    /// doors right away instead of moving.
    pub fn commit(&mut self, target: i32) -> Status {
        let target = target.clamp(self.min_floor, self.max_floor);
        self.target = Some(target);
        self.direction = Direction::towards(self.floor, target);
        self.status = match self.direction {
            Direction::None => Status::DoorsOpen,
            _ => Status::Moving,
        };
        debug!(
            "Elevator {} committed to floor {} ({}, {})",
            self.id, target, self.direction, self.status
        );
        self.status
    }

    /// Floor the car runs to before stopping: the furthest onboard destination in
    /// the committed direction, or the dispatch target for an empty car.
    pub fn end_floor(&self) -> i32 {
        let furthest = match self.direction {
            Direction::Up => self.destinations().filter(|d| *d > self.floor).max(),
            Direction::Down => self.destinations().filter(|d| *d < self.floor).min(),
            Direction::None => None,
        };
        furthest
            .or(self.target)
            .unwrap_or(self.floor)
            .clamp(self.min_floor, self.max_floor)
    }

    /// Moves one floor towards `end`, clamped to the building.
    pub fn step_towards(&mut self, end: i32) -> i32 {
        self.direction = Direction::towards(self.floor, end);
        self.floor = (self.floor + self.direction.delta()).clamp(self.min_floor, self.max_floor);
        self.status = Status::Moving;
        self.floor
    }

    /// True if someone onboard wants to get off at `floor`.
    pub fn should_stop_at(&self, floor: i32) -> bool {
        self.destinations().any(|d| d == floor)
    }

    pub fn open_doors(&mut self) {
        self.status = Status::DoorsOpen;
    }

    /// Lets out everyone whose destination is the current floor, in boarding order.
    pub fn unload_arrivals(&mut self) -> Result<Vec<Passenger>, ElevatorError> {
        let floor = self.floor;
        let arriving: Vec<PassengerId> = self
            .passengers
            .iter()
            .filter(|p| p.destination() == floor)
            .map(Passenger::id)
            .collect();
        arriving.into_iter().map(|id| self.unload(id)).collect()
    }

    pub fn unload(&mut self, passenger: PassengerId) -> Result<Passenger, ElevatorError> {
        let position = self
            .passengers
            .iter()
            .position(|p| p.id() == passenger)
            .ok_or(ElevatorError::PassengerNotOnboard {
                elevator: self.id,
                passenger,
            })?;
        Ok(self.passengers.remove(position))
    }

    pub fn load(&mut self, passenger: Passenger) -> Result<(), ElevatorError> {
        let destination = passenger.destination();
        if !(self.min_floor..=self.max_floor).contains(&destination) {
            return Err(ElevatorError::DestinationOutOfRange {
                elevator: self.id,
                passenger: passenger.id(),
                destination,
            });
        }
        if self.is_full() {
            return Err(ElevatorError::CapacityExceeded {
                elevator: self.id,
                capacity: self.capacity,
            });
        }
        self.passengers.push(passenger);
        Ok(())
    }

    /// Picks the direction from onboard destinations: up first, then down,
    /// otherwise none.
    pub fn recompute_direction(&mut self) -> Direction {
        let floor = self.floor;
        self.direction = if self.destinations().any(|d| d > floor) {
            Direction::Up
        } else if self.destinations().any(|d| d < floor) {
            Direction::Down
        } else {
            Direction::None
        };
        self.direction
    }

    /// Resumes travel towards the onboard passengers' destinations.
    pub fn continue_with_passengers(&mut self) -> i32 {
        let end = self.end_floor();
        self.target = Some(end);
        if self.direction != Direction::None {
            self.status = Status::Moving;
        }
        end
    }

    pub fn settle(&mut self) {
        self.status = Status::Stationary;
        self.direction = Direction::None;
        self.target = None;
    }
}
