/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{ConfigError, RequestError};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub building: BuildingConfig,
    pub fleet: FleetConfig,
    pub scoring: ScoringConfig,
    pub simulation: SimulationConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BuildingConfig {
    pub min_floor: i32,
    pub max_floor: i32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FleetConfig {
    pub n_elevators: usize,
    pub capacity: usize,
}

/**
 * Weights and thresholds used by the scoring engine.
 *
 * # Fields
 * - `proximity_threshold`:     Floors within which another car counts as competition.
 * - `density_cap`:             Upper bound on the waiting-count term of the wait severity.
 * - `wait_time_weight`:        Weight of the normalized average wait.
 * - `density_weight`:          Weight of the capped waiting count.
 * - `max_wait_threshold`:      Seconds of waiting an empty car treats as "long".
 * - `load_sensitivity`:        Seconds removed from the threshold for a full car.
 * - `wait_time_priority`:      Multiplier applied to the whole wait severity.
 * - `normalized_wait_cap`:     Upper bound on the normalized average wait.
 */
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub proximity_threshold: i32,
    pub density_cap: usize,
    pub wait_time_weight: f64,
    pub density_weight: f64,
    pub max_wait_threshold: f64,
    pub load_sensitivity: f64,
    pub wait_time_priority: f64,
    pub normalized_wait_cap: f64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub floors_per_second: f64,
    pub dispatch_tick_ms: u64,
}

/***************************************/
/*              Defaults               */
/***************************************/
impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            min_floor: 1,
            max_floor: 9,
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        FleetConfig {
            n_elevators: 3,
            capacity: 10,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            proximity_threshold: 2,
            density_cap: 5,
            wait_time_weight: 0.7,
            density_weight: 0.6,
            max_wait_threshold: 60.0,
            load_sensitivity: 30.0,
            wait_time_priority: 1.0,
            normalized_wait_cap: 2.0,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            floors_per_second: 1.0,
            dispatch_tick_ms: 500,
        }
    }
}

/***************************************/
/*             Public API              */
/***************************************/
impl BuildingConfig {
    pub fn contains(&self, floor: i32) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }

    pub fn clamp(&self, floor: i32) -> i32 {
        floor.clamp(self.min_floor, self.max_floor)
    }

    pub fn height(&self) -> i32 {
        self.max_floor - self.min_floor
    }

    /// Checks that a trip starts and ends inside the building and goes somewhere.
    pub fn check_request(&self, origin: i32, destination: i32) -> Result<(), RequestError> {
        for floor in [origin, destination] {
            if !self.contains(floor) {
                return Err(RequestError::FloorOutOfRange {
                    floor,
                    min_floor: self.min_floor,
                    max_floor: self.max_floor,
                });
            }
        }
        if origin == destination {
            return Err(RequestError::SameFloor(origin));
        }
        Ok(())
    }
}

impl SimulationConfig {
    pub fn time_per_floor(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.floors_per_second)
    }

    pub fn dispatch_tick(&self) -> Duration {
        Duration::from_millis(self.dispatch_tick_ms)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.building.min_floor >= self.building.max_floor {
            return Err(ConfigError::Invalid(format!(
                "min_floor ({}) must be below max_floor ({})",
                self.building.min_floor, self.building.max_floor
            )));
        }
        if self.fleet.n_elevators == 0 {
            return Err(ConfigError::Invalid("fleet needs at least one elevator".into()));
        }
        if self.fleet.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".into()));
        }
        if !(self.simulation.floors_per_second > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "floors_per_second must be positive, got {}",
                self.simulation.floors_per_second
            )));
        }
        // A full car must still have a positive wait threshold
        let full_load_threshold = self.scoring.max_wait_threshold - self.scoring.load_sensitivity;
        if !(full_load_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_wait_threshold - load_sensitivity must be positive, got {}",
                full_load_threshold
            )));
        }
        Ok(())
    }
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&config_str)
}

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        // Purpose: Verify that the built-in constants describe a usable building

        // Arrange
        let config = Config::default();

        // Act
        let result = config.validate();

        // Assert
        assert!(result.is_ok());
        assert_eq!(config.building.height(), 8);
        assert_eq!(config.simulation.time_per_floor(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        // Purpose: Verify that missing sections and fields take their default values

        // Arrange
        let config_str = "[fleet]\ncapacity = 4\n\n[building]\nmax_floor = 12\n";

        // Act
        let config = parse_config(config_str).unwrap();

        // Assert
        assert_eq!(config.fleet.capacity, 4);
        assert_eq!(config.fleet.n_elevators, 3);
        assert_eq!(config.building.min_floor, 1);
        assert_eq!(config.building.max_floor, 12);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_degenerate_building_is_rejected() {
        // Purpose: Verify that validation catches an empty floor range

        // Arrange
        let config_str = "[building]\nmin_floor = 5\nmax_floor = 5\n";

        // Act
        let result = parse_config(config_str);

        // Assert
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_wait_threshold_is_rejected() {
        // Purpose: Verify that a full car can never end up with a zero wait threshold

        // Arrange
        let config_str = "[scoring]\nmax_wait_threshold = 30.0\nload_sensitivity = 30.0\n";

        // Act
        let result = parse_config(config_str);

        // Assert
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        // Arrange
        let config_str = "[fleet\ncapacity = ";

        // Act
        let result = parse_config(config_str);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_shipped_config_file_loads() {
        // Purpose: Verify that the config.toml at the repository root stays in sync with the structs
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml");

        let config = load_config(&path).unwrap();

        assert_eq!(config, Config::default());
    }
}
