use serde::{Deserialize, Serialize};

use crate::entities::{parse_item_ids, Coordinates};
use crate::error::{invalid_input_error, Error};

/// A registered waste-collection location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub uf: String,
    pub city: String,
    pub image_url: Option<String>,
    pub items: Vec<i32>,
}

/// A validated registration, ready to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPoint {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub coordinates: Coordinates,
    pub uf: String,
    pub city: String,
    pub items: Vec<i32>,
    pub image: Option<String>,
}

/// Text fields of a registration exactly as they arrived.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub uf: Option<String>,
    pub city: Option<String>,
    pub items: Option<String>,
}

impl PointForm {
    /// Records a named text field; unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "whatsapp" => &mut self.whatsapp,
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            "uf" => &mut self.uf,
            "city" => &mut self.city,
            "items" => &mut self.items,
            _ => {
                tracing::debug!("ignoring unknown field {}", name);
                return;
            }
        };

        *slot = Some(value);
    }

    pub fn validate(self) -> Result<NewPoint, Error> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let whatsapp = required(self.whatsapp, "whatsapp")?;
        let latitude = required(self.latitude, "latitude")?;
        let longitude = required(self.longitude, "longitude")?;
        let uf = required(self.uf, "uf")?.to_uppercase();
        let city = required(self.city, "city")?;
        let items = parse_item_ids(&required(self.items, "items")?)?;

        if !email.contains('@') {
            return Err(invalid_input_error("email is invalid"));
        }

        if uf.chars().count() != 2 || !uf.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid_input_error("uf must be a two-letter code"));
        }

        if items.is_empty() {
            return Err(invalid_input_error("at least one item is required"));
        }

        Ok(NewPoint {
            name,
            email,
            whatsapp,
            coordinates: Coordinates::parse(&latitude, &longitude)?,
            uf,
            city,
            items,
            image: None,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, Error> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(invalid_input_error(format!("{} is required", field))),
    }
}

/// Narrows `GET /points`; every present criterion must match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointFilter {
    pub city: Option<String>,
    pub uf: Option<String>,
    /// Matches points accepting any of these items.
    pub items: Option<Vec<i32>>,
}
