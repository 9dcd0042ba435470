//! Create-point form state.
//!
//! [`FormState`] is a plain value; every user or network event is a method
//! taking the state by value and returning the next one.

use crate::entities::{Coordinates, Item};

/// Generic message shown when a submission is rejected for any reason.
pub const SUBMIT_ERROR: &str = "Erro!";

const WHATSAPP_MAX_LEN: usize = 11;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    LoadingCatalog,
    Editing,
    Submitting,
    Succeeded,
    /// Editable again, with the error notification up.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Whatsapp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The multipart payload of a registration, as text fields plus the image.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: String,
    pub longitude: String,
    pub uf: String,
    pub city: String,
    pub items: String,
    pub image: Option<ImageFile>,
}

impl Submission {
    pub fn text_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("whatsapp", self.whatsapp.as_str()),
            ("latitude", self.latitude.as_str()),
            ("longitude", self.longitude.as_str()),
            ("uf", self.uf.as_str()),
            ("city", self.city.as_str()),
            ("items", self.items.as_str()),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    pub phase: Phase,
    pub items: Vec<Item>,
    pub ufs: Vec<String>,
    pub cities: Vec<String>,
    pub selected_uf: Option<String>,
    pub selected_city: Option<String>,
    pub initial_position: Coordinates,
    pub selected_position: Coordinates,
    /// In click order.
    pub selected_items: Vec<i32>,
    pub file: Option<ImageFile>,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub notification: Option<&'static str>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.phase, Phase::Editing | Phase::Failed)
    }

    pub fn is_item_selected(&self, id: i32) -> bool {
        self.selected_items.contains(&id)
    }

    #[must_use]
    pub fn catalog_loaded(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        if self.phase == Phase::LoadingCatalog {
            self.phase = Phase::Editing;
        }
        self
    }

    #[must_use]
    pub fn ufs_loaded(mut self, ufs: Vec<String>) -> Self {
        self.ufs = ufs;
        self
    }

    #[must_use]
    pub fn position_located(mut self, position: Coordinates) -> Self {
        self.initial_position = position;
        self
    }

    /// The city list stays until the new state's list arrives.
    #[must_use]
    pub fn select_uf(mut self, uf: impl Into<String>) -> Self {
        self.selected_uf = Some(uf.into());
        self.edited()
    }

    /// Applies a city list, unless it belongs to a state no longer selected.
    #[must_use]
    pub fn cities_loaded(mut self, uf: &str, cities: Vec<String>) -> Self {
        if self.selected_uf.as_deref() != Some(uf) {
            tracing::debug!("discarding stale city list for {}", uf);
            return self;
        }

        if !self
            .selected_city
            .as_ref()
            .map_or(false, |city| cities.contains(city))
        {
            self.selected_city = None;
        }
        self.cities = cities;
        self
    }

    /// Drops the previous state's cities once the selected state's list failed to load.
    #[must_use]
    pub fn cities_failed(mut self, uf: &str) -> Self {
        if self.selected_uf.as_deref() == Some(uf) {
            self.cities.clear();
            self.selected_city = None;
        }
        self
    }

    #[must_use]
    pub fn select_city(mut self, city: impl Into<String>) -> Self {
        self.selected_city = Some(city.into());
        self.edited()
    }

    #[must_use]
    pub fn select_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.selected_position = Coordinates::new(latitude, longitude);
        self.edited()
    }

    #[must_use]
    pub fn toggle_item(mut self, id: i32) -> Self {
        match self.selected_items.iter().position(|&selected| selected == id) {
            Some(index) => {
                self.selected_items.remove(index);
            }
            None => self.selected_items.push(id),
        }
        self.edited()
    }

    #[must_use]
    pub fn change_input(mut self, field: Field, value: &str) -> Self {
        match field {
            Field::Name => self.name = value.to_string(),
            Field::Email => self.email = value.to_string(),
            Field::Whatsapp => self.whatsapp = value.chars().take(WHATSAPP_MAX_LEN).collect(),
        }
        self.edited()
    }

    #[must_use]
    pub fn select_file(mut self, file: ImageFile) -> Self {
        self.file = Some(file);
        self.edited()
    }

    /// Assembles the payload from whatever is currently entered.
    pub fn submission(&self) -> Submission {
        let items: Vec<String> = self.selected_items.iter().map(|id| id.to_string()).collect();

        Submission {
            name: self.name.clone(),
            email: self.email.clone(),
            whatsapp: self.whatsapp.clone(),
            latitude: self.selected_position.latitude.to_string(),
            longitude: self.selected_position.longitude.to_string(),
            uf: self.selected_uf.clone().unwrap_or_default(),
            city: self.selected_city.clone().unwrap_or_default(),
            items: items.join(","),
            image: self.file.clone(),
        }
    }

    #[must_use]
    pub fn begin_submit(mut self) -> Self {
        self.phase = Phase::Submitting;
        self.notification = None;
        self
    }

    #[must_use]
    pub fn submit_succeeded(mut self) -> Self {
        self.phase = Phase::Succeeded;
        self
    }

    #[must_use]
    pub fn submit_failed(mut self) -> Self {
        self.phase = Phase::Failed;
        self.notification = Some(SUBMIT_ERROR);
        self
    }

    #[must_use]
    pub fn dismiss_notification(mut self) -> Self {
        self.notification = None;
        self
    }

    fn edited(mut self) -> Self {
        if self.phase == Phase::Failed {
            self.phase = Phase::Editing;
        }
        self
    }
}
