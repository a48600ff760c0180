/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{BuildingConfig, ScoringConfig};
use crate::elevator::Elevator;
use crate::shared::Direction;

/***************************************/
/*             Constants               */
/***************************************/
pub const BASE_SCORE: f64 = 20.0;
pub const DENSITY_BONUS_PER_PASSENGER: f64 = 5.0;
pub const NATURAL_STOP_BONUS: f64 = 15.0;
pub const ITINERARY_PROXIMITY_BONUS: f64 = 20.0;
pub const DISTANCE_PENALTY: f64 = 50.0;
pub const COMPETITION_PENALTY: f64 = 10.0;

/***************************************/
/*       Public data structures        */
/***************************************/
/// A floor with waiting passengers, as seen by the scoring engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFloor {
    pub floor: i32,
    /// Seconds each waiting passenger has been queued.
    pub wait_times: Vec<f64>,
}

/// Every term of an attractiveness score, kept apart for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub density_bonus: f64,
    pub destination_bonus: f64,
    pub distance_factor: f64,
    pub competition_factor: f64,
    pub wait_severity: f64,
    pub total: f64,
}

/**
 * Ranks candidate floors for one car.
 *
 * Pure: the same car, candidates and competitor positions always give the same
 * answer. Wait times are measured by the caller and passed in.
 */
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine<'a> {
    scoring: &'a ScoringConfig,
    building: &'a BuildingConfig,
}

/***************************************/
/*             Public API              */
/***************************************/
impl CandidateFloor {
    pub fn new(floor: i32, wait_times: Vec<f64>) -> CandidateFloor {
        CandidateFloor { floor, wait_times }
    }

    pub fn waiting_count(&self) -> usize {
        self.wait_times.len()
    }

    pub fn average_wait(&self) -> f64 {
        if self.wait_times.is_empty() {
            0.0
        } else {
            self.wait_times.iter().sum::<f64>() / self.wait_times.len() as f64
        }
    }
}

/// SCAN-style filter: only floors ahead of the car once it has a direction.
pub fn filter_by_direction(direction: Direction, current_floor: i32, floors: &[i32]) -> Vec<i32> {
    floors
        .iter()
        .copied()
        .filter(|floor| direction.is_ahead(current_floor, *floor))
        .collect()
}

impl<'a> ScoringEngine<'a> {
    pub fn new(scoring: &'a ScoringConfig, building: &'a BuildingConfig) -> ScoringEngine<'a> {
        ScoringEngine { scoring, building }
    }

    /// Attractiveness of sending `elevator` to `candidate`, given the floors of
    /// every other car.
    pub fn score(&self, elevator: &Elevator, candidate: &CandidateFloor, other_floors: &[i32]) -> ScoreBreakdown {
        let density_bonus = self.density_bonus(elevator, candidate);
        let destination_bonus = self.destination_bonus(elevator, candidate.floor);
        let distance_factor = self.distance_factor(elevator, candidate.floor);
        let competition_factor = self.competition_factor(candidate.floor, other_floors);
        let wait_severity = self.wait_severity(elevator, candidate);

        let total = BASE_SCORE
            + density_bonus
            + destination_bonus
            + distance_factor
            + competition_factor
            + wait_severity * self.scoring.wait_time_priority;

        ScoreBreakdown {
            base: BASE_SCORE,
            density_bonus,
            destination_bonus,
            distance_factor,
            competition_factor,
            wait_severity,
            total,
        }
    }

    /// Best candidate and its score, or `None` when there are no candidates.
    /// Candidates are taken in the given order; a later floor only wins with a
    /// strictly higher score.
    pub fn best_floor(
        &self,
        elevator: &Elevator,
        candidates: &[CandidateFloor],
        other_floors: &[i32],
    ) -> Option<(i32, f64)> {
        let mut best: Option<(i32, f64)> = None;
        for candidate in candidates {
            let score = self.score(elevator, candidate, other_floors).total;
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate.floor, score)),
            }
        }
        best
    }

    /// Like `best_floor`, but stays put on the car's current floor when there
    /// is nothing to do.
    pub fn next_floor(&self, elevator: &Elevator, candidates: &[CandidateFloor], other_floors: &[i32]) -> i32 {
        self.best_floor(elevator, candidates, other_floors)
            .map_or(elevator.floor(), |(floor, _)| floor)
    }

    /***************************************/
    /*            Score terms              */
    /***************************************/
    fn density_bonus(&self, elevator: &Elevator, candidate: &CandidateFloor) -> f64 {
        candidate.waiting_count().min(elevator.available_capacity()) as f64 * DENSITY_BONUS_PER_PASSENGER
    }

    fn destination_bonus(&self, elevator: &Elevator, floor: i32) -> f64 {
        if elevator.is_empty() {
            return 0.0;
        }
        if elevator.should_stop_at(floor) {
            return NATURAL_STOP_BONUS;
        }
        let total_distance: i32 = elevator.destinations().map(|d| (d - floor).abs()).sum();
        ITINERARY_PROXIMITY_BONUS - total_distance as f64 / elevator.onboard() as f64
    }

    fn distance_factor(&self, elevator: &Elevator, floor: i32) -> f64 {
        let distance = (elevator.floor() - floor).abs() as f64;
        -DISTANCE_PENALTY * distance / self.building.height() as f64
    }

    fn competition_factor(&self, floor: i32, other_floors: &[i32]) -> f64 {
        let nearby = other_floors
            .iter()
            .filter(|other| (*other - floor).abs() <= self.scoring.proximity_threshold)
            .count();
        -COMPETITION_PENALTY * nearby as f64
    }

    /// Load-adjusted wait: a fuller car tolerates less extra waiting.
    fn wait_severity(&self, elevator: &Elevator, candidate: &CandidateFloor) -> f64 {
        let threshold = self.dynamic_wait_threshold(elevator);
        let normalized_wait = (candidate.average_wait() / threshold).min(self.scoring.normalized_wait_cap);
        let density = candidate.waiting_count().min(self.scoring.density_cap) as f64;
        normalized_wait * self.scoring.wait_time_weight + density * self.scoring.density_weight
    }

    pub fn dynamic_wait_threshold(&self, elevator: &Elevator) -> f64 {
        self.scoring.max_wait_threshold - elevator.load_factor() * self.scoring.load_sensitivity
    }
}
