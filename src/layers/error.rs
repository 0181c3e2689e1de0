use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Please add at least 2 cities before starting the simulation (found {found})")]
    NotEnoughCities { found: usize },
    #[error("Simulation is already running, clear it first")]
    SimulationRunning,
    #[error("Invalid city coordinates ({x}, {y})")]
    InvalidCoordinates { x: f64, y: f64 },
    #[error("Invalid ACO configuration: {0}")]
    InvalidConfig(String),
    #[error("Simulation state lock poisoned")]
    StatePoisoned,
    #[error("Cannot read file")]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
