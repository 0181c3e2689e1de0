use crate::layers::geo_util::MIN_DISTANCE;

/// Directed pheromone levels between every pair of cities, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl PheromoneMatrix {
    pub fn new(size: usize, initial: f64) -> PheromoneMatrix {
        PheromoneMatrix {
            size,
            cells: vec![initial; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells[from * self.size + to]
    }

    fn update(&mut self, from: usize, to: usize, f: impl Fn(f64) -> f64) {
        let cell = &mut self.cells[from * self.size + to];
        *cell = f(*cell);
    }

    /// Uniform decay of every cell by `rate`, clamped so no cell goes negative
    pub fn evaporate(&mut self, rate: f64) {
        let keep = (1.0 - rate).max(0.0);
        for val in self.cells.iter_mut() {
            *val *= keep;
        }
    }

    /// Deposit `1 / distance` on every directed edge of a closed tour.
    /// The reverse edges are left untouched.
    pub fn reinforce(&mut self, tour: &[usize], distance: f64) {
        let deposit = 1.0 / distance.max(MIN_DISTANCE);
        for (i, &from) in tour.iter().enumerate() {
            let to = tour[(i + 1) % tour.len()];
            self.update(from, to, |x| x + deposit);
        }
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        if self.size == 0 {
            return Vec::new();
        }
        self.cells.chunks(self.size).map(|row| row.to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uniform() {
        let m = PheromoneMatrix::new(3, 1.0);
        assert_eq!(m.size(), 3);
        assert!(m.rows().iter().flatten().all(|&v| v == 1.0));
    }

    #[test]
    fn evaporation_then_reinforcement() {
        let distance = 10.0 + 10.0 + 200f64.sqrt();
        let mut m = PheromoneMatrix::new(3, 1.0);
        m.evaporate(0.5);
        m.reinforce(&[0, 1, 2], distance);

        let expected = 0.5 + 1.0 / distance;
        assert!((m.get(0, 1) - expected).abs() < 1e-12);
        assert!((m.get(0, 1) - 0.5293).abs() < 1e-4);
        assert!((m.get(1, 2) - expected).abs() < 1e-12);
        // wrap edge
        assert!((m.get(2, 0) - expected).abs() < 1e-12);
        // reverse edges only evaporate
        assert_eq!(m.get(1, 0), 0.5);
        assert_eq!(m.get(0, 2), 0.5);
        assert_eq!(m.get(0, 0), 0.5);
    }

    #[test]
    fn shared_edges_accumulate() {
        let mut m = PheromoneMatrix::new(2, 0.0);
        m.reinforce(&[0, 1], 4.0);
        m.reinforce(&[0, 1], 4.0);
        assert!((m.get(0, 1) - 0.5).abs() < 1e-12);
        assert!((m.get(1, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_length_tour_deposits_finite_amount() {
        let mut m = PheromoneMatrix::new(2, 1.0);
        m.reinforce(&[0, 1], 0.0);
        assert!(m.get(0, 1).is_finite());
    }

    #[test]
    fn full_evaporation_never_goes_negative() {
        let mut m = PheromoneMatrix::new(2, 3.0);
        m.evaporate(1.0);
        assert!(m.rows().iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_matrix_has_no_rows() {
        assert!(PheromoneMatrix::new(0, 1.0).rows().is_empty());
    }
}
