/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::trace;
use serde::Serialize;
use std::sync::Mutex;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::lock;
use crate::shared::{ElevatorId, Status};

/***************************************/
/*               Enums                 */
/***************************************/
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerStatus {
    AddedToQueue,
    BoardedElevator,
    DepartedElevator,
    RequestFailed,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElevatorEvent {
    pub elevator: ElevatorId,
    pub status: Status,
    pub floor: i32,
}

/// `elevator` is `None` while no car is involved yet (queueing, failed requests).
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassengerEvent {
    pub elevator: Option<ElevatorId>,
    pub floor: i32,
    pub count: usize,
    pub status: PassengerStatus,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum Event {
    ElevatorStatusChanged(ElevatorEvent),
    PassengerStatusChanged(PassengerEvent),
}

enum Subscriber {
    All(cbc::Sender<Event>),
    ElevatorStatus(cbc::Sender<ElevatorEvent>),
    PassengerActivity(cbc::Sender<PassengerEvent>),
}

/**
 * Fan-out of simulation events to any number of subscribers.
 *
 * Every subscriber owns an unbounded channel, so publishing never waits on a
 * slow reader. Publishing is serialized, which gives every subscriber the same
 * order. Subscribers whose receiver was dropped are removed the next time an event
 * they would receive is published.
 */
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

/***************************************/
/*             Public API              */
/***************************************/
impl EventBus {
    pub fn new() -> EventBus {
        EventBus::default()
    }

    pub fn subscribe(&self) -> cbc::Receiver<Event> {
        let (tx, rx) = cbc::unbounded();
        lock!(self.subscribers).push(Subscriber::All(tx));
        rx
    }

    pub fn subscribe_elevator_status(&self) -> cbc::Receiver<ElevatorEvent> {
        let (tx, rx) = cbc::unbounded();
        lock!(self.subscribers).push(Subscriber::ElevatorStatus(tx));
        rx
    }

    pub fn subscribe_passenger_activity(&self) -> cbc::Receiver<PassengerEvent> {
        let (tx, rx) = cbc::unbounded();
        lock!(self.subscribers).push(Subscriber::PassengerActivity(tx));
        rx
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        lock!(self.subscribers).len()
    }

    pub fn publish(&self, event: Event) {
        trace!("Publishing {:?}", event);
        let mut subscribers = lock!(self.subscribers);
        subscribers.retain(|subscriber| subscriber.deliver(&event));
    }

    pub fn elevator_status(&self, elevator: ElevatorId, status: Status, floor: i32) {
        self.publish(Event::ElevatorStatusChanged(ElevatorEvent {
            elevator,
            status,
            floor,
        }));
    }

    pub fn passenger_status(
        &self,
        elevator: Option<ElevatorId>,
        floor: i32,
        count: usize,
        status: PassengerStatus,
    ) {
        self.publish(Event::PassengerStatusChanged(PassengerEvent {
            elevator,
            floor,
            count,
            status,
        }));
    }
}

impl Subscriber {
    // Returns false once the receiving side is gone
    fn deliver(&self, event: &Event) -> bool {
        match (self, event) {
            (Subscriber::All(tx), _) => tx.send(event.clone()).is_ok(),
            (Subscriber::ElevatorStatus(tx), Event::ElevatorStatusChanged(e)) => tx.send(e.clone()).is_ok(),
            (Subscriber::PassengerActivity(tx), Event::PassengerStatusChanged(p)) => {
                tx.send(p.clone()).is_ok()
            }
            // Not interested; a dropped receiver is noticed on the next matching event
            (Subscriber::ElevatorStatus(_), _) | (Subscriber::PassengerActivity(_), _) => true,
        }
    }
}
