/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, error, info};
use std::io;
use std::sync::Arc;
use std::thread::{sleep, Builder, JoinHandle};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::coordinator::dispatcher::next_floor_for;
use crate::coordinator::SimulationContext;
use crate::elevator::SharedElevator;
use crate::events::PassengerStatus;
use crate::lock;
use crate::shared::{ElevatorError, ElevatorId, Status};

/***************************************/
/*               Enums                 */
/***************************************/
enum NextMove {
    Continue,
    Settle,
}

/**
 * Drives one committed car floor by floor until it has nothing left to do.
 *
 * Each run lives on its own thread. The only place it suspends is the sleep
 * between two floors, and the car's lock is never held across that sleep.
 * A run cannot be redirected; it only stops early when the service shuts down.
 *
 * # Fields
 * - `ctx`:         Shared simulation state.
 * - `elevator`:    The car being driven.
 * - `id`:          Cached id of the car.
 */
pub struct Movement {
    ctx: Arc<SimulationContext>,
    elevator: SharedElevator,
    id: ElevatorId,
}

impl Movement {
    pub fn new(ctx: Arc<SimulationContext>, elevator: SharedElevator) -> Movement {
        let id = lock!(elevator).id();
        Movement { ctx, elevator, id }
    }

    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        let movement_thread = Builder::new().name(format!("elevator_{}", self.id));
        movement_thread.spawn(move || self.run())
    }

    pub fn run(self) {
        if let Err(e) = self.drive() {
            error!("Elevator {} stopped: {}", self.id, e);
        }
    }

    fn drive(&self) -> Result<(), ElevatorError> {
        loop {
            if !self.travel() {
                debug!("Elevator {} halted by shutdown", self.id);
                return Ok(());
            }

            match self.handle_arrival()? {
                NextMove::Continue => continue,
                NextMove::Settle => return Ok(()),
            }
        }
    }

    /// Steps towards the end floor. Returns false if the service shut down on the way.
    fn travel(&self) -> bool {
        let time_per_floor = self.ctx.config.simulation.time_per_floor();
        let end = lock!(self.elevator).end_floor();

        loop {
            if lock!(self.elevator).floor() == end {
                return true;
            }

            sleep(time_per_floor);
            if !self.ctx.is_running() {
                return false;
            }

            let (floor, stop_here) = {
                let mut elevator = lock!(self.elevator);
                let floor = elevator.step_towards(end);
                (floor, elevator.should_stop_at(floor))
            };
            debug!("Elevator {} moved to floor {}", self.id, floor);
            self.ctx.bus.elevator_status(self.id, Status::Moving, floor);

            if stop_here {
                return true;
            }
        }
    }

    /// Opens the doors, lets passengers out and in, then decides what comes next.
    fn handle_arrival(&self) -> Result<NextMove, ElevatorError> {
        let bus = &self.ctx.bus;
        let previous_direction;
        {
            let mut elevator = lock!(self.elevator);
            let floor = elevator.floor();

            if elevator.status() != Status::DoorsOpen {
                elevator.open_doors();
                bus.elevator_status(self.id, Status::DoorsOpen, floor);
            }

            let departed = elevator.unload_arrivals()?;
            if !departed.is_empty() {
                info!("{} passengers left elevator {} at floor {}", departed.len(), self.id, floor);
                bus.passenger_status(Some(self.id), floor, departed.len(), PassengerStatus::DepartedElevator);
            }

            if let Some(queue) = self.ctx.registry.existing(floor) {
                let boarding = queue.dequeue_up_to(elevator.available_capacity());
                let boarded = boarding.len();
                for passenger in boarding {
                    elevator.load(passenger)?;
                }
                if boarded > 0 {
                    info!("{} passengers boarded elevator {} at floor {}", boarded, self.id, floor);
                    bus.passenger_status(Some(self.id), floor, boarded, PassengerStatus::BoardedElevator);
                }
            }

            previous_direction = elevator.direction();
            elevator.recompute_direction();
            if !elevator.is_empty() {
                let end = elevator.continue_with_passengers();
                if elevator.status() == Status::Moving {
                    bus.elevator_status(self.id, Status::Moving, floor);
                }
                debug!("Elevator {} continues {} to floor {}", self.id, elevator.direction(), end);
                return Ok(NextMove::Continue);
            }
        }

        // Empty car: look for more work before settling
        let recommitted = self.ctx.with_dispatch_lock(|| {
            next_floor_for(&self.ctx, &self.elevator, previous_direction).map(|floor| {
                let mut elevator = lock!(self.elevator);
                let status = elevator.commit(floor);
                bus.elevator_status(self.id, status, elevator.floor());
                floor
            })
        });
        if let Some(floor) = recommitted {
            info!("Elevator {} picks up waiting passengers at floor {}", self.id, floor);
            return Ok(NextMove::Continue);
        }

        let mut elevator = lock!(self.elevator);
        elevator.settle();
        info!("Elevator {} is idle at floor {}", self.id, elevator.floor());
        bus.elevator_status(self.id, Status::Stationary, elevator.floor());
        Ok(NextMove::Settle)
    }
}
