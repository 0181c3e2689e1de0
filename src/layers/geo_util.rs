use geo::{Distance, Euclidean, Point};

use super::city::City;

/// Smallest distance used as a divisor. Coincident cities are treated as this far apart.
pub const MIN_DISTANCE: f64 = 1e-6;

/// Straight-line distance between two cities.
///
/// # Returns
/// `sqrt((ax - bx)^2 + (ay - by)^2)`, which is 0 only when the cities coincide.
pub fn euclidean(a: &City, b: &City) -> f64 {
    Euclidean::distance(Point::from(*a), Point::from(*b))
}

/// Distance that is safe to divide by.
///
/// # Returns
/// The euclidean distance, or `MIN_DISTANCE` when the cities are (nearly) coincident.
pub fn guarded_distance(a: &City, b: &City) -> f64 {
    euclidean(a, b).max(MIN_DISTANCE)
}

/// Length of a closed tour, including the edge from the last city back to the first.
///
/// # Parameters
/// - `tour`: city indices in visiting order
/// - `cities`: the city list the indices refer to
pub fn tour_distance(tour: &[usize], cities: &[City]) -> f64 {
    tour.iter()
        .enumerate()
        .map(|(i, &from)| {
            let to = tour[(i + 1) % tour.len()];
            euclidean(&cities[from], &cities[to])
        })
        .sum()
}
