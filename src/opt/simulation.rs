use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::layers::{city::City, error::Error};

use super::aco::{AcoConfig, Ant, Colony};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No cities placed
    Empty,
    /// Cities placed, not running
    Ready,
    /// Iterations are being scheduled
    Running,
}

/// Everything a renderer needs after an iteration or a state transition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: Phase,
    pub iteration: u64,
    pub cities: Vec<City>,
    pub ants: Vec<Ant>,
    pub best_tour: Option<Ant>,
    pub pheromones: Vec<Vec<f64>>,
}

/// The ACO engine and its lifecycle.
///
/// Cities are append-only until `clear`. `start` creates a fresh `Colony`, and every `step`
/// advances it by exactly one iteration. `epoch` changes on every start and clear, so a tick that
/// was scheduled for an earlier run can be recognised and dropped.
pub struct Simulation {
    params: AcoConfig,
    cities: Vec<City>,
    colony: Option<Colony>,
    rng: StdRng,
    epoch: u64,
}

impl Simulation {
    pub fn new(params: AcoConfig) -> Result<Simulation, Error> {
        params.validate()?;
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Simulation {
            params,
            cities: Vec::new(),
            colony: None,
            rng,
            epoch: 0,
        })
    }

    pub fn params(&self) -> &AcoConfig {
        &self.params
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn colony(&self) -> Option<&Colony> {
        self.colony.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn phase(&self) -> Phase {
        if self.colony.is_some() {
            Phase::Running
        } else if self.cities.is_empty() {
            Phase::Empty
        } else {
            Phase::Ready
        }
    }

    /// Place a city. Only allowed while no run is in progress.
    pub fn add_city(&mut self, city: City) -> Result<usize, Error> {
        if self.colony.is_some() {
            return Err(Error::SimulationRunning);
        }
        City::new(city.x, city.y)?;
        self.cities.push(city);
        log::info!(
            "City {} placed at ({:.1}, {:.1})",
            self.cities.len(),
            city.x,
            city.y
        );
        Ok(self.cities.len() - 1)
    }

    /// Initialize pheromones and the ant population for the placed cities.
    ///
    /// # Returns
    /// The epoch of the new run, to be carried by its scheduled ticks.
    pub fn start(&mut self) -> Result<u64, Error> {
        if self.colony.is_some() {
            return Err(Error::SimulationRunning);
        }
        if self.cities.len() < 2 {
            return Err(Error::NotEnoughCities {
                found: self.cities.len(),
            });
        }
        self.colony = Some(Colony::init(self.cities.len(), &self.params));
        self.epoch += 1;
        log::info!(
            "Simulation started with {} cities and {} ants (epoch {})",
            self.cities.len(),
            self.params.num_ants,
            self.epoch
        );
        Ok(self.epoch)
    }

    /// Advance the run by one iteration. A no-op when nothing is running.
    pub fn step(&mut self) -> Option<Snapshot> {
        let colony = self.colony.as_mut()?;
        colony.iterate(&self.cities, &self.params, &mut self.rng);
        Some(self.snapshot())
    }

    /// Scheduled iteration. Ticks from an earlier epoch are ignored.
    pub fn tick(&mut self, epoch: u64) -> Option<Snapshot> {
        if epoch != self.epoch {
            log::debug!(
                "Ignoring outdated tick for epoch {} (currently at {})",
                epoch,
                self.epoch
            );
            return None;
        }
        self.step()
    }

    /// Drop cities, pheromones, ants and the best tour, and invalidate pending ticks
    pub fn clear(&mut self) {
        self.cities.clear();
        self.colony = None;
        self.epoch += 1;
        log::info!("Simulation cleared (epoch {})", self.epoch);
    }

    pub fn snapshot(&self) -> Snapshot {
        let (iteration, ants, best_tour, pheromones) = match &self.colony {
            Some(colony) => (
                colony.iteration(),
                colony.ants().to_vec(),
                colony.best().cloned(),
                colony.pheromone().rows(),
            ),
            None => (0, vec![], None, vec![]),
        };
        Snapshot {
            phase: self.phase(),
            iteration,
            cities: self.cities.clone(),
            ants,
            best_tour,
            pheromones,
        }
    }
}
