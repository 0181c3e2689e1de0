use geo_types::Point;
use serde::{Deserialize, Serialize};

use super::error::Error;

/// A city placed on the canvas. Its identity is its index in the city list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub x: f64,
    pub y: f64,
}

impl City {
    /// Create a city, rejecting coordinates that are NaN or infinite
    pub fn new(x: f64, y: f64) -> Result<City, Error> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidCoordinates { x, y });
        }
        Ok(City { x, y })
    }

    pub fn print_stats(cities: &[City]) {
        log::info!("Cities: {}", cities.len());
        for (i, city) in cities.iter().enumerate() {
            // labels are 1-based, like the canvas renders them
            log::debug!("  {}: ({:.1}, {:.1})", i + 1, city.x, city.y);
        }
    }
}

impl From<City> for Point<f64> {
    fn from(city: City) -> Self {
        Point::new(city.x, city.y)
    }
}
