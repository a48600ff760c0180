/* 3rd party libraries */
use clap::{Arg, Command};
use crossbeam_channel as cbc;
use log::{info, warn};
use std::path::Path;
use std::thread::Builder;
use std::time::{Duration, Instant};

/* Custom libraries */
use elevator_dispatch::config::{self, Config};
use elevator_dispatch::unwrap_or_exit;
use elevator_dispatch::{ElevatorService, Event, PassengerStatus, Status};

/* Main */
fn main() {
    let matches = Command::new("elevator-dispatch")
        .about("Multi-elevator dispatch simulator")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the TOML configuration file"),
        )
        .arg(
            Arg::new("passenger")
                .long("passenger")
                .short('p')
                .takes_value(true)
                .multiple_occurrences(true)
                .help("Passenger request as ORIGIN:DESTINATION, may be repeated"),
        )
        .arg(
            Arg::new("duration")
                .long("duration")
                .short('d')
                .takes_value(true)
                .default_value("120")
                .help("Maximum number of seconds to run"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the final fleet snapshot as JSON"),
        )
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load the configuration
    let config_path = matches.value_of("config").unwrap_or("config.toml");
    let config = if Path::new(config_path).exists() {
        unwrap_or_exit!(config::load_config(Path::new(config_path)))
    } else {
        warn!("{} not found, using built-in defaults", config_path);
        Config::default()
    };

    let duration_secs: u64 = unwrap_or_exit!(matches
        .value_of("duration")
        .unwrap_or("120")
        .parse::<u64>()
        .map_err(|e| format!("invalid --duration: {}", e)));

    // Validate requests before they reach the simulation
    let requests: Vec<(i32, i32)> = matches
        .values_of("passenger")
        .map(|values| values.collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| match parse_request(raw, &config) {
            Ok(request) => Some(request),
            Err(e) => {
                warn!("Ignoring passenger '{}': {}", raw, e);
                None
            }
        })
        .collect();

    // Start the simulation
    let mut service = unwrap_or_exit!(ElevatorService::new(config));
    let events_rx = service.subscribe();
    let display_thread = Builder::new().name("display".into());
    unwrap_or_exit!(display_thread.spawn(move || display(events_rx)));
    unwrap_or_exit!(service.start());

    for (origin, destination) in requests {
        match service.create_passenger(origin, destination) {
            Ok(passenger) => service.add_passenger_to_queue(origin, passenger),
            Err(e) => warn!("Ignoring passenger {}:{}: {}", origin, destination, e),
        }
    }

    // Wait until all work is done or time runs out
    let deadline = Instant::now() + Duration::from_secs(duration_secs);
    std::thread::sleep(Duration::from_millis(100));
    while !service.is_idle() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(100));
    }

    let elevators = service.elevators();
    service.shutdown();

    if matches.is_present("json") {
        println!("{}", unwrap_or_exit!(serde_json::to_string_pretty(&elevators)));
    } else {
        for elevator in elevators {
            println!(
                "Elevator {}: floor {}, {}, direction {}, {}/{} onboard",
                elevator.id, elevator.floor, elevator.status, elevator.direction, elevator.onboard, elevator.capacity
            );
        }
    }
}

fn parse_request(raw: &str, config: &Config) -> Result<(i32, i32), String> {
    let (origin, destination) = raw
        .split_once(':')
        .ok_or_else(|| "expected ORIGIN:DESTINATION".to_string())?;
    let origin: i32 = origin.trim().parse().map_err(|_| format!("invalid origin '{}'", origin))?;
    let destination: i32 = destination
        .trim()
        .parse()
        .map_err(|_| format!("invalid destination '{}'", destination))?;

    config
        .building
        .check_request(origin, destination)
        .map_err(|e| e.to_string())?;
    Ok((origin, destination))
}

fn display(events_rx: cbc::Receiver<Event>) {
    for event in events_rx.iter() {
        match event {
            Event::ElevatorStatusChanged(e) => match e.status {
                Status::Moving => info!("Elevator {}: moved to floor {}", e.elevator, e.floor),
                status => info!("Elevator {}: {} (floor {})", e.elevator, status, e.floor),
            },
            Event::PassengerStatusChanged(p) => {
                let elevator = p.elevator.map_or("-".to_string(), |id| id.to_string());
                match p.status {
                    PassengerStatus::AddedToQueue => info!("Passenger queued at floor {}", p.floor),
                    PassengerStatus::BoardedElevator => info!(
                        "{} passengers boarded elevator {} at floor {}",
                        p.count, elevator, p.floor
                    ),
                    PassengerStatus::DepartedElevator => info!(
                        "{} passengers left elevator {} at floor {}",
                        p.count, elevator, p.floor
                    ),
                    PassengerStatus::RequestFailed => warn!(
                        "No elevator available for {} passengers at floor {}",
                        p.count, p.floor
                    ),
                }
            }
        }
    }
}
