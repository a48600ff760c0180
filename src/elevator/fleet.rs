/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::sync::{Arc, Mutex};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{BuildingConfig, FleetConfig};
use crate::elevator::Elevator;
use crate::lock;
use crate::shared::{ElevatorId, ElevatorSnapshot};

pub type SharedElevator = Arc<Mutex<Elevator>>;

/**
 * The fixed set of cars in the building.
 *
 * The fleet hands out ids 1..=n when it is built; cars are never added or
 * removed afterwards. Each car sits behind its own mutex and no method here
 * holds more than one of them at a time.
 */
#[derive(Debug)]
pub struct Fleet {
    elevators: Vec<SharedElevator>,
}

impl Fleet {
    /// Builds `n_elevators` cars parked on the lowest floor.
    pub fn new(fleet: &FleetConfig, building: &BuildingConfig) -> Fleet {
        let start_floors = vec![building.min_floor; fleet.n_elevators];
        Fleet::with_start_floors(&start_floors, fleet.capacity, building)
    }

    /// Builds one car per entry of `start_floors`.
    pub fn with_start_floors(start_floors: &[i32], capacity: usize, building: &BuildingConfig) -> Fleet {
        let elevators = start_floors
            .iter()
            .zip(1u32..)
            .map(|(floor, id)| {
                Arc::new(Mutex::new(Elevator::at_floor(ElevatorId(id), capacity, building, *floor)))
            })
            .collect();
        Fleet { elevators }
    }

    pub fn len(&self) -> usize {
        self.elevators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevators.is_empty()
    }

    pub fn get(&self, id: ElevatorId) -> Option<&SharedElevator> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.elevators.get(index))
    }

    /// Snapshot of every car, in id order. Cars are locked one at a time, so the
    /// result is not an atomic picture of the whole fleet.
    pub fn snapshot(&self) -> Vec<ElevatorSnapshot> {
        self.elevators.iter().map(|e| lock!(e).snapshot()).collect()
    }
}
