/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{error, info, warn};
use std::io;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::Config;
use crate::coordinator::context::SimulationContext;
use crate::coordinator::dispatcher::{self, Assignment, Dispatcher};
use crate::elevator::Fleet;
use crate::events::{ElevatorEvent, Event, PassengerEvent, PassengerStatus};
use crate::shared::{ConfigError, ElevatorId, ElevatorSnapshot, FloorQueueInfo, Passenger, RequestError};

/// Result of an explicit dispatch request.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// At least one idle car was committed during the pass.
    Assigned(Vec<Assignment>),
    /// The requested floor is already the end floor of a travelling car.
    AlreadyAssigned(ElevatorId),
    /// Nobody is waiting on the requested floor.
    NoWork,
    /// Passengers are waiting but no car can take them right now. They stay
    /// queued for a later pass.
    NoElevatorAvailable,
}

/**
 * Entry point for drivers of the simulation.
 *
 * Owns the shared state and, once started, the dispatcher thread. Dropping the
 * service shuts it down.
 *
 * # Fields
 * - `ctx`:                 Shared simulation state.
 * - `dispatcher_thread`:   Handle of the dispatcher, while running.
 * - `terminate_tx`:        Stops the dispatcher.
 */
pub struct ElevatorService {
    ctx: Arc<SimulationContext>,
    dispatcher_thread: Option<JoinHandle<()>>,
    terminate_tx: Option<cbc::Sender<()>>,
}

impl ElevatorService {
    /// Builds the fleet described by `config`, every car parked on the lowest floor.
    pub fn new(config: Config) -> Result<ElevatorService, ConfigError> {
        let fleet = Fleet::new(&config.fleet, &config.building);
        ElevatorService::with_fleet(config, fleet)
    }

    /// Fails if `config` does not pass `Config::validate`.
    pub fn with_fleet(config: Config, fleet: Fleet) -> Result<ElevatorService, ConfigError> {
        config.validate()?;
        Ok(ElevatorService {
            ctx: Arc::new(SimulationContext::new(config, fleet)),
            dispatcher_thread: None,
            terminate_tx: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    /// Starts the dispatcher thread. From then on every queued passenger
    /// triggers a dispatch pass, and a pass also runs on every idle tick.
    pub fn start(&mut self) -> io::Result<()> {
        if self.dispatcher_thread.is_some() {
            return Ok(());
        }

        let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();
        let dispatcher = Dispatcher::new(self.ctx.clone(), terminate_rx);

        let dispatcher_thread = Builder::new().name("dispatcher".into());
        let handle = dispatcher_thread.spawn(move || dispatcher.run())?;

        self.dispatcher_thread = Some(handle);
        self.terminate_tx = Some(terminate_tx);
        info!(
            "Started simulation with {} elevators on floors {}..={}",
            self.ctx.fleet.len(),
            self.ctx.config.building.min_floor,
            self.ctx.config.building.max_floor
        );
        Ok(())
    }

    /// Stops the dispatcher and every movement thread. Cars that were
    /// travelling stay where they are.
    pub fn shutdown(&mut self) {
        if let Some(terminate_tx) = self.terminate_tx.take() {
            let _ = terminate_tx.send(());
        }
        if let Some(handle) = self.dispatcher_thread.take() {
            if handle.join().is_err() {
                error!("Dispatcher thread panicked");
            }
        }
        self.ctx.stop();
    }

    pub fn create_passenger(&self, origin: i32, destination: i32) -> Result<Passenger, RequestError> {
        self.ctx.config.building.check_request(origin, destination)?;
        Ok(Passenger::new(self.ctx.next_passenger_id(), origin, destination))
    }

    /// Queues `passenger` on `floor` and announces it. A floor outside the
    /// building is logged and ignored.
    pub fn add_passenger_to_queue(&self, floor: i32, passenger: Passenger) {
        if passenger.origin() != floor {
            warn!(
                "Passenger {:?} called from floor {} but is queued on floor {}",
                passenger.id(),
                passenger.origin(),
                floor
            );
        }
        if self.ctx.registry.enqueue(floor, passenger) {
            self.ctx
                .bus
                .passenger_status(None, floor, 1, PassengerStatus::AddedToQueue);
        }
    }

    /// Runs one dispatch pass and reports what it means for `requested_floor`.
    pub fn dispatch_elevator(&self, requested_floor: i32) -> DispatchOutcome {
        let assignments = dispatcher::run_pass(&self.ctx);
        if !assignments.is_empty() {
            return DispatchOutcome::Assigned(assignments);
        }

        let waiting = self.ctx.registry.waiting_count(requested_floor);
        if waiting == 0 {
            return DispatchOutcome::NoWork;
        }

        let serving = self
            .ctx
            .fleet
            .snapshot()
            .into_iter()
            .find(|s| s.target == Some(requested_floor));
        if let Some(elevator) = serving {
            return DispatchOutcome::AlreadyAssigned(elevator.id);
        }

        warn!(
            "No elevator available for floor {} ({} waiting)",
            requested_floor, waiting
        );
        self.ctx
            .bus
            .passenger_status(None, requested_floor, waiting, PassengerStatus::RequestFailed);
        DispatchOutcome::NoElevatorAvailable
    }

    pub fn subscribe(&self) -> cbc::Receiver<Event> {
        self.ctx.bus.subscribe()
    }

    pub fn elevator_status_changes(&self) -> cbc::Receiver<ElevatorEvent> {
        self.ctx.bus.subscribe_elevator_status()
    }

    pub fn passenger_activity(&self) -> cbc::Receiver<PassengerEvent> {
        self.ctx.bus.subscribe_passenger_activity()
    }

    pub fn elevators(&self) -> Vec<ElevatorSnapshot> {
        self.ctx.fleet.snapshot()
    }

    pub fn waiting_passengers(&self) -> Vec<FloorQueueInfo> {
        self.ctx.registry.queue_infos()
    }

    /// True when nobody waits and every car is parked.
    pub fn is_idle(&self) -> bool {
        !self.ctx.registry.any_waiting() && self.elevators().iter().all(ElevatorSnapshot::is_available)
    }
}

impl Drop for ElevatorService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
