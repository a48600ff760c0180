/*
 * Unit tests for the floor registry
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod registry_tests {
    use crate::building::FloorRegistry;
    use crate::config::BuildingConfig;
    use crate::shared::{Passenger, PassengerId};
    use std::sync::Arc;
    use std::thread::spawn;
    use std::time::{Duration, Instant};

    fn setup_registry() -> FloorRegistry {
        FloorRegistry::new(&BuildingConfig {
            min_floor: 1,
            max_floor: 9,
        })
    }

    #[test]
    fn test_floors_are_created_lazily() {
        // Purpose: Verify that a floor only exists after it has been referenced

        // Arrange
        let registry = setup_registry();

        // Act
        let before = registry.existing(4);
        let created = registry.floor(4);
        let after = registry.existing(4);

        // Assert
        assert!(before.is_none());
        assert_eq!(created.map(|f| f.number()), Some(4));
        assert!(after.is_some());
    }

    #[test]
    fn test_out_of_range_enqueue_is_a_no_op() {
        // Purpose: Verify that a floor outside the building is rejected without side effects

        // Arrange
        let registry = setup_registry();

        // Act
        let accepted = registry.enqueue(12, Passenger::new(PassengerId(1), 12, 3));

        // Assert
        assert!(!accepted);
        assert!(registry.existing(12).is_none());
        assert!(!registry.any_waiting());
    }

    #[test]
    fn test_unreachable_destination_is_rejected() {
        // Arrange
        let registry = setup_registry();

        // Act
        let accepted = registry.enqueue(5, Passenger::new(PassengerId(1), 5, 20));

        // Assert
        assert!(!accepted);
        assert_eq!(registry.waiting_count(5), 0);
        assert!(!registry.any_waiting());
    }

    #[test]
    fn test_dequeue_preserves_arrival_order() {
        // Purpose: Verify that passengers leave a floor in the order they arrived

        // Arrange
        let registry = setup_registry();
        for id in 1..=5 {
            registry.enqueue(3, Passenger::new(PassengerId(id), 3, 7));
        }
        let floor = registry.floor(3).unwrap();

        // Act
        let first = floor.dequeue_up_to(2);
        let rest = floor.dequeue_up_to(10);

        // Assert
        let first_ids: Vec<u64> = first.iter().map(|p| p.id().0).collect();
        let rest_ids: Vec<u64> = rest.iter().map(|p| p.id().0).collect();
        assert_eq!(first_ids, vec![1, 2]);
        assert_eq!(rest_ids, vec![3, 4, 5]);
        assert_eq!(floor.waiting_count(), 0);
    }

    #[test]
    fn test_floors_with_waiting_are_ascending() {
        // Arrange
        let registry = setup_registry();
        registry.enqueue(8, Passenger::new(PassengerId(1), 8, 1));
        registry.enqueue(2, Passenger::new(PassengerId(2), 2, 5));
        registry.enqueue(5, Passenger::new(PassengerId(3), 5, 9));
        registry.floor(6);

        // Act
        let floors = registry.floors_with_waiting();

        // Assert
        assert_eq!(floors, vec![2, 5, 8]);
    }

    #[test]
    fn test_wait_times_are_measured_from_enqueue() {
        // Arrange
        let registry = setup_registry();
        let now = Instant::now();
        let earlier = now - Duration::from_secs(30);
        registry.enqueue(2, Passenger::queued_at(PassengerId(1), 2, 5, earlier));
        registry.enqueue(2, Passenger::queued_at(PassengerId(2), 2, 6, now));

        // Act
        let waits = registry.floor(2).unwrap().wait_times(now);

        // Assert
        assert_eq!(waits.len(), 2);
        assert!((waits[0] - 30.0).abs() < 1e-6);
        assert_eq!(waits[1], 0.0);
    }

    #[test]
    fn test_concurrent_enqueue_keeps_every_passenger() {
        // Purpose: Verify that producers on several threads never lose passengers

        // Arrange
        let registry = Arc::new(setup_registry());

        // Act
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let registry = registry.clone();
                spawn(move || {
                    for i in 0..50 {
                        let floor = 1 + (i % 9) as i32;
                        let destination = if floor == 9 { 1 } else { 9 };
                        registry.enqueue(floor, Passenger::new(PassengerId(t * 100 + i), floor, destination));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Assert
        let total: usize = registry.queue_infos().iter().map(|q| q.passenger_count).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn test_queue_infos_skip_empty_floors() {
        // Arrange
        let registry = setup_registry();
        registry.enqueue(4, Passenger::new(PassengerId(1), 4, 1));
        registry.enqueue(4, Passenger::new(PassengerId(2), 4, 9));
        registry.floor(7);

        // Act
        let infos = registry.queue_infos();

        // Assert
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].floor, 4);
        assert_eq!(infos[0].passenger_count, 2);
        assert_eq!(infos[0].destinations, vec![1, 9]);
    }
}
