/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::coordinator::context::SimulationContext;
use crate::coordinator::scoring::{filter_by_direction, CandidateFloor};
use crate::elevator::SharedElevator;
use crate::events::{PassengerEvent, PassengerStatus};
use crate::lock;
use crate::shared::{Direction, ElevatorId, ElevatorSnapshot, Status};

/***************************************/
/*               Enums                 */
/***************************************/
enum Event {
    PassengerAdded(i32),
    Tick,
    Terminate,
    NoEvent,
}

/// One car committed to one floor during a dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub elevator: ElevatorId,
    pub floor: i32,
    pub score: f64,
}

/***************************************/
/*          Dispatch decisions         */
/***************************************/

/// Runs one dispatch pass over the stationary cars.
///
/// Every idle car ranks the unclaimed floors with waiting passengers. The pair
/// with the strictly highest score is committed first (ties go to the lower
/// car id), its floor is claimed, and the remaining idle cars are ranked
/// again. Cars that are already travelling are left alone.
pub fn run_pass(ctx: &Arc<SimulationContext>) -> Vec<Assignment> {
    ctx.with_dispatch_lock(|| {
        let waiting = ctx.registry.floors_with_waiting();
        if waiting.is_empty() {
            return Vec::new();
        }

        let now = Instant::now();
        let candidates = build_candidates(ctx, &waiting, now);
        let mut fleet_view = ctx.fleet.snapshot();
        let mut claimed: Vec<i32> = fleet_view.iter().filter_map(|s| s.target).collect();
        let mut idle: Vec<ElevatorId> = fleet_view
            .iter()
            .filter(|s| s.status == Status::Stationary)
            .map(|s| s.id)
            .collect();

        let mut assignments = Vec::new();
        loop {
            let mut best: Option<(Assignment, &SharedElevator)> = None;

            for id in &idle {
                let Some(shared) = ctx.fleet.get(*id) else {
                    continue;
                };
                let elevator = lock!(shared);
                if elevator.status() != Status::Stationary {
                    continue;
                }

                let allowed = filter_by_direction(elevator.direction(), elevator.floor(), &waiting);
                let ranked: Vec<CandidateFloor> = candidates
                    .iter()
                    .filter(|c| allowed.contains(&c.floor) && !claimed.contains(&c.floor))
                    .cloned()
                    .collect();
                let others = other_floors(&fleet_view, *id);

                if let Some((floor, score)) = ctx.engine().best_floor(&elevator, &ranked, &others) {
                    let better = best.as_ref().map_or(true, |(b, _)| score > b.score);
                    if better {
                        best = Some((
                            Assignment {
                                elevator: *id,
                                floor,
                                score,
                            },
                            shared,
                        ));
                    }
                }
            }

            let Some((assignment, shared)) = best else {
                break;
            };

            idle.retain(|id| *id != assignment.elevator);
            if !commit(ctx, shared, assignment.floor) {
                continue;
            }
            info!(
                "Dispatched elevator {} to floor {} (score {:.2})",
                assignment.elevator, assignment.floor, assignment.score
            );

            claimed.push(assignment.floor);
            if let Some(view) = fleet_view.iter_mut().find(|s| s.id == assignment.elevator) {
                view.target = Some(assignment.floor);
            }
            assignments.push(assignment);
        }

        assignments
    })
}

/// Picks the next floor for a car whose doors are open and which has just
/// become empty. Floors ahead in `preferred` are tried first, then all of
/// them. Floors claimed by other cars are skipped.
pub fn next_floor_for(ctx: &SimulationContext, elevator: &SharedElevator, preferred: Direction) -> Option<i32> {
    let waiting = ctx.registry.floors_with_waiting();
    if waiting.is_empty() {
        return None;
    }

    let fleet_view = ctx.fleet.snapshot();
    let now = Instant::now();
    let candidates = build_candidates(ctx, &waiting, now);

    let elevator = lock!(elevator);
    let id = elevator.id();
    let claimed: Vec<i32> = fleet_view
        .iter()
        .filter(|s| s.id != id)
        .filter_map(|s| s.target)
        .collect();
    let unclaimed: Vec<CandidateFloor> = candidates
        .into_iter()
        .filter(|c| !claimed.contains(&c.floor))
        .collect();
    let others = other_floors(&fleet_view, id);

    let ahead = filter_by_direction(preferred, elevator.floor(), &waiting);
    let ahead: Vec<CandidateFloor> = unclaimed
        .iter()
        .filter(|c| preferred != Direction::None && ahead.contains(&c.floor))
        .cloned()
        .collect();

    let pool = if ahead.is_empty() { unclaimed } else { ahead };
    if pool.is_empty() {
        return None;
    }
    Some(ctx.engine().next_floor(&elevator, &pool, &others))
}

/// Commits a car, publishes its new status and starts its movement. Returns
/// false if the movement could not be started and the car was settled again.
pub fn commit(ctx: &Arc<SimulationContext>, shared: &SharedElevator, floor: i32) -> bool {
    let (id, status, current) = {
        let mut elevator = lock!(shared);
        let status = elevator.commit(floor);
        (elevator.id(), status, elevator.floor())
    };
    ctx.bus.elevator_status(id, status, current);
    ctx.spawn_movement(shared.clone())
}

fn build_candidates(ctx: &SimulationContext, floors: &[i32], now: Instant) -> Vec<CandidateFloor> {
    floors
        .iter()
        .filter_map(|floor| ctx.registry.existing(*floor))
        .map(|floor| CandidateFloor::new(floor.number(), floor.wait_times(now)))
        .filter(|candidate| candidate.waiting_count() > 0)
        .collect()
}

fn other_floors(fleet_view: &[ElevatorSnapshot], id: ElevatorId) -> Vec<i32> {
    fleet_view
        .iter()
        .filter(|s| s.id != id)
        .map(|s| s.floor)
        .collect()
}

/***************************************/
/*          Dispatcher thread          */
/***************************************/

/**
 * Background thread that runs the dispatch loop.
 *
 * A pass runs on every `AddedToQueue` event and on every tick without events,
 * so passengers left behind by a full or busy car are picked up later.
 *
 * # Fields
 * - `ctx`:             Shared simulation state.
 * - `passenger_rx`:    Passenger activity from the event bus.
 * - `terminate_rx`:    Stops the loop.
 * - `tick`:            Interval between passes when nothing happens.
 */
pub struct Dispatcher {
    ctx: Arc<SimulationContext>,
    passenger_rx: cbc::Receiver<PassengerEvent>,
    terminate_rx: cbc::Receiver<()>,
    tick: Duration,
}

impl Dispatcher {
    pub fn new(ctx: Arc<SimulationContext>, terminate_rx: cbc::Receiver<()>) -> Dispatcher {
        let passenger_rx = ctx.bus.subscribe_passenger_activity();
        let tick = ctx.config.simulation.dispatch_tick();
        Dispatcher {
            ctx,
            passenger_rx,
            terminate_rx,
            tick,
        }
    }

    pub fn run(self) {
        // Main loop
        loop {
            match self.wait_for_event() {
                Event::PassengerAdded(floor) => {
                    debug!("Passenger added on floor {}, running dispatch pass", floor);
                    run_pass(&self.ctx);
                }
                Event::Tick => {
                    run_pass(&self.ctx);
                }
                Event::Terminate => {
                    info!("Dispatcher terminated");
                    return;
                }
                Event::NoEvent => {}
            }
        }
    }

    fn wait_for_event(&self) -> Event {
        cbc::select! {
            recv(self.passenger_rx) -> event => {
                match event {
                    Ok(PassengerEvent { status: PassengerStatus::AddedToQueue, floor, .. }) => Event::PassengerAdded(floor),
                    Ok(_) => Event::NoEvent,
                    Err(_) => Event::Terminate,
                }
            },
            recv(self.terminate_rx) -> _ => Event::Terminate,
            default(self.tick) => Event::Tick,
        }
    }
}
