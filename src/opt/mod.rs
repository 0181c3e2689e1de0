pub mod aco;
pub mod pheromone;
pub mod simulation;
