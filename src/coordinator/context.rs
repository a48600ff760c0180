/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, error};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::building::FloorRegistry;
use crate::config::Config;
use crate::coordinator::scoring::ScoringEngine;
use crate::elevator::{Fleet, Movement, SharedElevator};
use crate::events::EventBus;
use crate::lock;
use crate::shared::{PassengerId, Status};

/**
 * State shared by the service, the dispatcher thread and every movement thread.
 *
 * # Fields
 * - `config`:          Building, fleet, scoring and timing settings.
 * - `registry`:        Waiting passengers per floor.
 * - `fleet`:           The cars.
 * - `bus`:             Event fan-out.
 * - `running`:         Cleared on shutdown; movement threads stop at their next step.
 * - `dispatch_lock`:   Serializes every decision that claims a floor for a car.
 * - `movements`:       Handles of movement threads that may still be running.
 * - `next_passenger`:  Passenger id generator.
 */
pub struct SimulationContext {
    pub config: Config,
    pub registry: FloorRegistry,
    pub fleet: Fleet,
    pub bus: EventBus,
    running: AtomicBool,
    dispatch_lock: Mutex<()>,
    movements: Mutex<Vec<JoinHandle<()>>>,
    next_passenger: AtomicU64,
}

impl SimulationContext {
    pub fn new(config: Config, fleet: Fleet) -> SimulationContext {
        SimulationContext {
            registry: FloorRegistry::new(&config.building),
            config,
            fleet,
            bus: EventBus::new(),
            running: AtomicBool::new(true),
            dispatch_lock: Mutex::new(()),
            movements: Mutex::new(Vec::new()),
            next_passenger: AtomicU64::new(1),
        }
    }

    pub fn engine(&self) -> ScoringEngine<'_> {
        ScoringEngine::new(&self.config.scoring, &self.config.building)
    }

    pub fn next_passenger_id(&self) -> PassengerId {
        PassengerId(self.next_passenger.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Runs `f` while holding the dispatch lock. Must not be called with an
    /// elevator lock held.
    pub fn with_dispatch_lock<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = lock!(self.dispatch_lock);
        f()
    }

    /// Starts the movement thread for a freshly committed car. If no thread can
    /// be started the car is settled again, releasing its floor, and false is
    /// returned.
    pub fn spawn_movement(self: &Arc<Self>, elevator: SharedElevator) -> bool {
        if self.is_running() {
            let movement = Movement::new(self.clone(), elevator.clone());
            let mut movements = lock!(self.movements);
            movements.retain(|handle| !handle.is_finished());
            match movement.spawn() {
                Ok(handle) => {
                    movements.push(handle);
                    return true;
                }
                Err(e) => error!("Failed to spawn movement thread: {}", e),
            }
        }

        let mut car = lock!(elevator);
        car.settle();
        self.bus.elevator_status(car.id(), Status::Stationary, car.floor());
        false
    }

    /// Stops movement threads at their next step and waits for them.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let handles: Vec<JoinHandle<()>> = lock!(self.movements).drain(..).collect();
        debug!("Waiting for {} movement threads", handles.len());
        for handle in handles {
            if handle.join().is_err() {
                error!("A movement thread panicked");
            }
        }
    }
}
