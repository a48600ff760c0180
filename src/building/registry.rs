/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, warn};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::BuildingConfig;
use crate::lock;
use crate::shared::{FloorQueueInfo, Passenger};

/***************************************/
/*       Public data structures        */
/***************************************/
/// A landing with its own FIFO queue of waiting passengers.
#[derive(Debug)]
pub struct Floor {
    number: i32,
    waiting: Mutex<VecDeque<Passenger>>,
}

/**
 * Holds the waiting-passenger queue of every floor that has been referenced.
 *
 * The map itself is only write-locked the first time a floor is referenced.
 * After that, enqueueing and dequeueing only lock the queue of the floor in
 * question, so traffic on different floors never contends.
 *
 * # Fields
 * - `building`:    Floor range of the building.
 * - `floors`:      Floor number -> floor, ordered by floor number.
 */
#[derive(Debug)]
pub struct FloorRegistry {
    building: BuildingConfig,
    floors: RwLock<BTreeMap<i32, Arc<Floor>>>,
}

/***************************************/
/*             Public API              */
/***************************************/
impl Floor {
    fn new(number: i32) -> Floor {
        Floor {
            number,
            waiting: Mutex::new(VecDeque::new()),
        }
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn enqueue(&self, passenger: Passenger) {
        lock!(self.waiting).push_back(passenger);
    }

    /// Removes up to `max` passengers in arrival order.
    pub fn dequeue_up_to(&self, max: usize) -> Vec<Passenger> {
        let mut waiting = lock!(self.waiting);
        let n = max.min(waiting.len());
        waiting.drain(..n).collect()
    }

    pub fn waiting_count(&self) -> usize {
        lock!(self.waiting).len()
    }

    pub fn has_waiting(&self) -> bool {
        !lock!(self.waiting).is_empty()
    }

    /// Seconds each waiting passenger has been queued, in queue order.
    pub fn wait_times(&self, now: Instant) -> Vec<f64> {
        lock!(self.waiting).iter().map(|p| p.waited_secs(now)).collect()
    }

    pub fn queue_info(&self) -> FloorQueueInfo {
        let waiting = lock!(self.waiting);
        FloorQueueInfo {
            floor: self.number,
            passenger_count: waiting.len(),
            destinations: waiting.iter().map(Passenger::destination).collect(),
        }
    }
}

impl FloorRegistry {
    pub fn new(building: &BuildingConfig) -> FloorRegistry {
        FloorRegistry {
            building: building.clone(),
            floors: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the floor, creating it on first reference. `None` if out of range.
    pub fn floor(&self, number: i32) -> Option<Arc<Floor>> {
        if !self.building.contains(number) {
            return None;
        }

        if let Some(floor) = self.existing(number) {
            return Some(floor);
        }

        let mut floors = self.floors.write().unwrap_or_else(PoisonError::into_inner);
        let floor = floors
            .entry(number)
            .or_insert_with(|| {
                debug!("Creating floor {}", number);
                Arc::new(Floor::new(number))
            })
            .clone();
        Some(floor)
    }

    /// Returns the floor only if it has already been referenced.
    pub fn existing(&self, number: i32) -> Option<Arc<Floor>> {
        self.floors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&number)
            .cloned()
    }

    /// Queues the passenger on `number`. Returns false, leaving the registry
    /// untouched, when the floor or the passenger's destination is outside the
    /// building.
    pub fn enqueue(&self, number: i32, passenger: Passenger) -> bool {
        if !self.building.contains(passenger.destination()) {
            warn!(
                "Dropping passenger {:?} bound for floor {} outside [{}, {}]",
                passenger.id(),
                passenger.destination(),
                self.building.min_floor,
                self.building.max_floor
            );
            return false;
        }
        match self.floor(number) {
            Some(floor) => {
                floor.enqueue(passenger);
                true
            }
            None => {
                warn!(
                    "Dropping passenger for floor {} outside [{}, {}]",
                    number, self.building.min_floor, self.building.max_floor
                );
                false
            }
        }
    }

    pub fn waiting_count(&self, number: i32) -> usize {
        self.existing(number).map_or(0, |floor| floor.waiting_count())
    }

    /// Floors that currently have waiting passengers, ascending.
    pub fn floors_with_waiting(&self) -> Vec<i32> {
        self.snapshot_floors()
            .into_iter()
            .filter(|floor| floor.has_waiting())
            .map(|floor| floor.number())
            .collect()
    }

    pub fn any_waiting(&self) -> bool {
        self.snapshot_floors().iter().any(|floor| floor.has_waiting())
    }

    pub fn queue_infos(&self) -> Vec<FloorQueueInfo> {
        self.snapshot_floors()
            .iter()
            .map(|floor| floor.queue_info())
            .filter(|info| info.passenger_count > 0)
            .collect()
    }

    // Clone the Arcs out so no queue lock is taken while holding the map lock
    fn snapshot_floors(&self) -> Vec<Arc<Floor>> {
        self.floors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}
