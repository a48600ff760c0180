/*
 * Tests for dispatch passes and explicit dispatch requests
 *
 * The unit tests follows the Arrange, Act, Assert pattern. Cars travel slowly
 * here so that assignments can be inspected before anyone arrives.
 *
 * Tests:
 * - test_pass_without_waiting_is_noop
 * - test_equal_scores_go_to_lower_id
 * - test_closer_car_wins
 * - test_pass_assigns_one_car_per_floor
 * - test_claimed_floor_is_skipped
 * - test_pass_after_stop_settles_cars
 * - test_next_floor_prefers_direction
 * - test_next_floor_skips_claimed
 * - test_dispatch_reports_no_work
 * - test_dispatch_reports_already_assigned
 * - test_dispatch_reports_no_elevator_available
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod dispatcher_tests {
    use std::sync::Arc;

    use crate::config::Config;
    use crate::coordinator::dispatcher::{next_floor_for, run_pass};
    use crate::coordinator::{DispatchOutcome, ElevatorService, SimulationContext};
    use crate::elevator::Fleet;
    use crate::events::{PassengerEvent, PassengerStatus};
    use crate::lock;
    use crate::shared::{Direction, ElevatorId, Passenger, Status};

    fn slow_config(floors_per_second: f64) -> Config {
        let mut config = Config::default();
        config.simulation.floors_per_second = floors_per_second;
        config
    }

    fn setup_context(start_floors: &[i32]) -> Arc<SimulationContext> {
        let config = slow_config(2.0);
        let fleet = Fleet::with_start_floors(start_floors, 10, &config.building);
        Arc::new(SimulationContext::new(config, fleet))
    }

    fn setup_service(start_floors: &[i32]) -> ElevatorService {
        let config = slow_config(2.0);
        let fleet = Fleet::with_start_floors(start_floors, 10, &config.building);
        ElevatorService::with_fleet(config, fleet).unwrap()
    }

    fn queue(ctx: &SimulationContext, origin: i32, destination: i32) {
        let passenger = Passenger::new(ctx.next_passenger_id(), origin, destination);
        assert!(ctx.registry.enqueue(origin, passenger));
    }

    #[test]
    fn test_pass_without_waiting_is_noop() {
        // Arrange
        let ctx = setup_context(&[1, 9]);
        let events_rx = ctx.bus.subscribe();
        let before = ctx.fleet.snapshot();

        // Act
        let assignments = run_pass(&ctx);

        // Assert
        assert!(assignments.is_empty());
        assert_eq!(ctx.fleet.snapshot(), before);
        assert!(events_rx.try_recv().is_err());
        ctx.stop();
    }

    #[test]
    fn test_equal_scores_go_to_lower_id() {
        // Purpose: Verify that two equally good cars resolve to the lower id, and only one moves

        // Arrange
        let ctx = setup_context(&[1, 9]);
        queue(&ctx, 5, 2);

        // Act
        let assignments = run_pass(&ctx);

        // Assert
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].elevator, ElevatorId(1));
        assert_eq!(assignments[0].floor, 5);
        assert!((assignments[0].score - 0.6).abs() < 1e-6);

        let snapshots = ctx.fleet.snapshot();
        assert_eq!(snapshots[0].status, Status::Moving);
        assert_eq!(snapshots[0].target, Some(5));
        assert!(snapshots[1].is_available());
        ctx.stop();
    }

    #[test]
    fn test_closer_car_wins() {
        // Arrange
        let ctx = setup_context(&[1, 6]);
        queue(&ctx, 5, 2);

        // Act
        let assignments = run_pass(&ctx);

        // Assert
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].elevator, ElevatorId(2));
        assert!((assignments[0].score - 19.35).abs() < 1e-6);
        assert!(ctx.fleet.snapshot()[0].is_available());
        ctx.stop();
    }

    #[test]
    fn test_pass_assigns_one_car_per_floor() {
        // Purpose: Verify that the best pair is committed first and the rest are ranked again

        // Arrange
        let ctx = setup_context(&[1, 9]);
        queue(&ctx, 2, 5);
        queue(&ctx, 8, 4);

        // Act
        let assignments = run_pass(&ctx);

        // Assert
        let pairs: Vec<(ElevatorId, i32)> = assignments.iter().map(|a| (a.elevator, a.floor)).collect();
        assert_eq!(pairs, vec![(ElevatorId(1), 2), (ElevatorId(2), 8)]);
        ctx.stop();
    }

    #[test]
    fn test_claimed_floor_is_skipped() {
        // Arrange
        let ctx = setup_context(&[1, 9]);
        queue(&ctx, 5, 2);
        let first = run_pass(&ctx);

        // Act
        let second = run_pass(&ctx);

        // Assert
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(ctx.fleet.snapshot()[1].is_available());
        assert_eq!(ctx.registry.waiting_count(5), 1);
        ctx.stop();
    }

    #[test]
    fn test_pass_after_stop_settles_cars() {
        // Purpose: Verify that a car whose movement cannot start does not keep its floor

        // Arrange
        let ctx = setup_context(&[1]);
        ctx.stop();
        let status_rx = ctx.bus.subscribe_elevator_status();
        queue(&ctx, 5, 2);

        // Act
        let assignments = run_pass(&ctx);

        // Assert
        assert!(assignments.is_empty());
        let snapshot = &ctx.fleet.snapshot()[0];
        assert!(snapshot.is_available());
        assert_eq!(snapshot.target, None);
        assert_eq!(ctx.registry.waiting_count(5), 1);
        let statuses: Vec<(Status, i32)> = status_rx.try_iter().map(|e| (e.status, e.floor)).collect();
        assert_eq!(statuses, vec![(Status::Moving, 1), (Status::Stationary, 1)]);
    }

    #[test]
    fn test_next_floor_prefers_direction() {
        // Arrange
        let ctx = setup_context(&[5, 1]);
        queue(&ctx, 3, 1);
        queue(&ctx, 8, 9);
        let car = ctx.fleet.get(ElevatorId(1)).unwrap();

        // Act
        let up = ctx.with_dispatch_lock(|| next_floor_for(&ctx, car, Direction::Up));
        let down = ctx.with_dispatch_lock(|| next_floor_for(&ctx, car, Direction::Down));
        let any = ctx.with_dispatch_lock(|| next_floor_for(&ctx, car, Direction::None));

        // Assert
        assert_eq!(up, Some(8));
        assert_eq!(down, Some(3));
        assert_eq!(any, Some(8));
    }

    #[test]
    fn test_next_floor_skips_claimed() {
        // Arrange
        let ctx = setup_context(&[5, 1]);
        queue(&ctx, 3, 1);
        queue(&ctx, 8, 9);
        lock!(ctx.fleet.get(ElevatorId(2)).unwrap()).commit(8);
        let car = ctx.fleet.get(ElevatorId(1)).unwrap();

        // Act
        let next = ctx.with_dispatch_lock(|| next_floor_for(&ctx, car, Direction::Up));

        // Assert
        assert_eq!(next, Some(3));
    }

    #[test]
    fn test_next_floor_without_waiting() {
        let ctx = setup_context(&[5]);
        let car = ctx.fleet.get(ElevatorId(1)).unwrap();

        assert_eq!(next_floor_for(&ctx, car, Direction::Up), None);
    }

    #[test]
    fn test_dispatch_reports_no_work() {
        let service = setup_service(&[1]);

        assert_eq!(service.dispatch_elevator(4), DispatchOutcome::NoWork);
        assert!(service.elevators()[0].is_available());
    }

    #[test]
    fn test_dispatch_reports_already_assigned() {
        // Arrange
        let service = setup_service(&[1]);
        let passenger = service.create_passenger(5, 9).unwrap();
        service.add_passenger_to_queue(5, passenger);

        // Act
        let first = service.dispatch_elevator(5);
        let second = service.dispatch_elevator(5);

        // Assert
        assert!(matches!(first, DispatchOutcome::Assigned(ref a) if a.len() == 1 && a[0].floor == 5));
        assert_eq!(second, DispatchOutcome::AlreadyAssigned(ElevatorId(1)));
    }

    #[test]
    fn test_dispatch_reports_no_elevator_available() {
        // Purpose: Verify that a request nobody can serve is reported and left queued

        // Arrange
        let service = setup_service(&[1]);
        let activity_rx = service.passenger_activity();
        let far = service.create_passenger(9, 1).unwrap();
        service.add_passenger_to_queue(9, far);
        service.dispatch_elevator(9);
        let near = service.create_passenger(3, 6).unwrap();
        service.add_passenger_to_queue(3, near);
        let before = service.elevators();

        // Act
        let outcome = service.dispatch_elevator(3);

        // Assert
        assert_eq!(outcome, DispatchOutcome::NoElevatorAvailable);
        let after = service.elevators();
        assert_eq!(after[0].target, before[0].target);
        assert_eq!(after[0].target, Some(9));
        assert_eq!(service.waiting_passengers().len(), 2);

        let failed: Vec<PassengerEvent> = activity_rx
            .try_iter()
            .filter(|e| e.status == PassengerStatus::RequestFailed)
            .collect();
        assert_eq!(
            failed,
            vec![PassengerEvent {
                elevator: None,
                floor: 3,
                count: 1,
                status: PassengerStatus::RequestFailed,
            }]
        );
    }
}
