/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElevatorId(pub u32);

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassengerId(pub u64);

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Stationary,
    Moving,
    DoorsOpen,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    None,
}

impl Direction {
    /// Direction of travel needed to get from `from` to `to`.
    pub fn towards(from: i32, to: i32) -> Direction {
        if to > from {
            Direction::Up
        } else if to < from {
            Direction::Down
        } else {
            Direction::None
        }
    }

    pub fn delta(&self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::None => 0,
        }
    }

    /// True if `floor` lies strictly ahead of `current` when travelling this way.
    pub fn is_ahead(&self, current: i32, floor: i32) -> bool {
        match self {
            Direction::Up => floor > current,
            Direction::Down => floor < current,
            Direction::None => true,
        }
    }
}

/**
 * A person waiting for, or riding in, an elevator.
 *
 * Passengers are never cloned by the simulation; they move by value from a floor
 * queue into a car and out again.
 *
 * # Fields
 * - `id`:              Identifier minted by the service.
 * - `origin`:          Floor the passenger called from.
 * - `destination`:     Floor the passenger wants to reach.
 * - `queued_at`:       When the passenger entered the floor queue.
 */
#[derive(Debug, PartialEq)]
pub struct Passenger {
    id: PassengerId,
    origin: i32,
    destination: i32,
    queued_at: Instant,
}

impl Passenger {
    pub fn new(id: PassengerId, origin: i32, destination: i32) -> Passenger {
        Passenger::queued_at(id, origin, destination, Instant::now())
    }

    pub fn queued_at(id: PassengerId, origin: i32, destination: i32, queued_at: Instant) -> Passenger {
        Passenger {
            id,
            origin,
            destination,
            queued_at,
        }
    }

    pub fn id(&self) -> PassengerId {
        self.id
    }

    pub fn origin(&self) -> i32 {
        self.origin
    }

    pub fn destination(&self) -> i32 {
        self.destination
    }

    /// Seconds spent waiting as of `now`.
    pub fn waited_secs(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.queued_at).as_secs_f64()
    }
}

/// Read-only view of one car, for display and tests.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElevatorSnapshot {
    pub id: ElevatorId,
    pub floor: i32,
    pub status: Status,
    pub direction: Direction,
    pub capacity: usize,
    pub onboard: usize,
    pub destinations: Vec<i32>,
    pub target: Option<i32>,
}

impl ElevatorSnapshot {
    pub fn is_available(&self) -> bool {
        self.status == Status::Stationary && self.direction == Direction::None
    }
}

/// Waiting passengers on one floor.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloorQueueInfo {
    pub floor: i32,
    pub passenger_count: usize,
    pub destinations: Vec<i32>,
}

/***************************************/
/*              Display                */
/***************************************/
impl fmt::Display for ElevatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Stationary => "Stationary",
            Status::Moving => "Moving",
            Status::DoorsOpen => "DoorsOpen",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::None => "None",
        };
        write!(f, "{}", name)
    }
}
