use serde::{Deserialize, Serialize};

use crate::error::{invalid_input_error, Error};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parses the textual pair sent in a point registration form.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, Error> {
        let latitude = parse_degrees(latitude, "latitude", 90.0)?;
        let longitude = parse_degrees(longitude, "longitude", 180.0)?;

        Ok(Self::new(latitude, longitude))
    }
}

fn parse_degrees(value: &str, field: &str, bound: f64) -> Result<f64, Error> {
    let degrees: f64 = value
        .trim()
        .parse()
        .map_err(|_| invalid_input_error(format!("{} must be a number", field)))?;

    if !degrees.is_finite() || degrees.abs() > bound {
        return Err(invalid_input_error(format!("{} is out of range", field)));
    }

    Ok(degrees)
}
