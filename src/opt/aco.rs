use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

use crate::layers::{
    city::City,
    error::Error,
    geo_util::{guarded_distance, tour_distance},
};

use super::pheromone::PheromoneMatrix;

// struct to store all the tunable parameters for the ACO algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct AcoConfig {
    pub num_ants: usize,
    pub evaporation_rate: f64,
    pub init_pheromone: f64,
    // fixed seed for reproducible runs, entropy otherwise
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        AcoConfig {
            num_ants: 10,
            evaporation_rate: 0.5,
            init_pheromone: 1.0,
            seed: None,
        }
    }
}

impl AcoConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.num_ants == 0 {
            return Err(Error::InvalidConfig("num_ants must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return Err(Error::InvalidConfig(format!(
                "evaporation_rate must be within [0, 1], got {}",
                self.evaporation_rate
            )));
        }
        if !self.init_pheromone.is_finite() || self.init_pheromone <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "init_pheromone must be positive, got {}",
                self.init_pheromone
            )));
        }
        Ok(())
    }

    pub fn print_stats(&self) {
        log::info!("ACO Parameters:");
        log::info!("  num_ants: {}", self.num_ants);
        log::info!("  evaporation_rate: {}", self.evaporation_rate);
        log::info!("  init_pheromone: {}", self.init_pheromone);
        match self.seed {
            Some(seed) => log::info!("  seed: {}", seed),
            None => log::info!("  seed: entropy"),
        }
    }
}

/// One ant's closed tour over every city and its length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ant {
    pub tour: Vec<usize>,
    pub distance: f64,
}

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Roulette wheel selection with a single draw `r`.
///
/// Weights are normalized to probabilities and scanned left to right; the first index whose
/// cumulative probability is `>= r` wins. A zero or non-finite total falls back to a uniform
/// pick, and a rounding shortfall at the end of the scan picks the last index.
///
/// # Panics
/// If `weights` is empty.
pub fn select_by_weight(weights: &[f64], r: f64) -> usize {
    let last = weights.len() - 1;
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return ((r * weights.len() as f64) as usize).min(last);
    }

    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight / total;
        if cumulative >= r {
            return i;
        }
    }
    last
}

/// Build one ant's tour against a fixed pheromone snapshot.
///
/// The start city is drawn uniformly, then each next city is chosen from the remaining ones with
/// weight `pheromone[current][next] / distance(current, next)`.
pub fn construct_tour<R: RandomSource + ?Sized>(
    pheromone: &PheromoneMatrix,
    cities: &[City],
    rng: &mut R,
) -> Ant {
    let n = cities.len();
    if n == 0 {
        return Ant {
            tour: vec![],
            distance: 0.0,
        };
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    let start = ((rng.next_unit() * n as f64) as usize).min(n - 1);
    let mut curr = remaining.remove(start);
    let mut tour = Vec::with_capacity(n);
    tour.push(curr);

    let mut weights = Vec::with_capacity(n);
    while !remaining.is_empty() {
        weights.clear();
        for &next in remaining.iter() {
            let heuristic = guarded_distance(&cities[curr], &cities[next]);
            weights.push(pheromone.get(curr, next) / heuristic);
        }
        let chosen = select_by_weight(&weights, rng.next_unit());
        curr = remaining.remove(chosen);
        tour.push(curr);
    }

    let distance = tour_distance(&tour, cities);
    Ant { tour, distance }
}

/// State of one run: pheromone trails, the latest ants and the best tour seen so far.
#[derive(Debug, Clone)]
pub struct Colony {
    pheromone: PheromoneMatrix,
    ants: Vec<Ant>,
    best: Option<Ant>,
    iteration: u64,
}

impl Colony {
    pub fn init(num_cities: usize, params: &AcoConfig) -> Colony {
        Colony {
            pheromone: PheromoneMatrix::new(num_cities, params.init_pheromone),
            ants: Vec::with_capacity(params.num_ants),
            best: None,
            iteration: 0,
        }
    }

    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn best(&self) -> Option<&Ant> {
        self.best.as_ref()
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Run one full iteration: every ant builds a tour from the same pheromone snapshot,
    /// trails evaporate and are reinforced, then the global best is updated.
    pub fn iterate<R: RandomSource + ?Sized>(
        &mut self,
        cities: &[City],
        params: &AcoConfig,
        rng: &mut R,
    ) {
        let ants: Vec<Ant> = (0..params.num_ants)
            .map(|_| construct_tour(&self.pheromone, cities, rng))
            .collect();

        self.update_pheromone(&ants, params.evaporation_rate);

        // first minimum wins ties
        let gen_best = ants
            .iter()
            .fold(None::<&Ant>, |best, ant| match best {
                Some(b) if b.distance <= ant.distance => Some(b),
                _ => Some(ant),
            });
        if let Some(gen_best) = gen_best {
            let improved = match &self.best {
                Some(best) => gen_best.distance < best.distance,
                None => true,
            };
            if improved {
                log::debug!("    New best tour found: {:.3}", gen_best.distance);
                self.best = Some(gen_best.clone());
            }
        }

        self.ants = ants;
        self.iteration += 1;
        log::debug!(
            "Iteration {}: best {:.3}",
            self.iteration,
            self.best.as_ref().map_or(f64::NAN, |b| b.distance)
        );
    }

    /// Evaporate every trail, then reinforce each ant's directed edges
    pub fn update_pheromone(&mut self, ants: &[Ant], evaporation_rate: f64) {
        self.pheromone.evaporate(evaporation_rate);
        for ant in ants {
            self.pheromone.reinforce(&ant.tour, ant.distance);
        }
    }
}
