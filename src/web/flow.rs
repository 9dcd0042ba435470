use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::entities::{Coordinates, Item, Point};
use crate::error::Error;
use crate::external::IbgeClient;
use crate::web::client::EcoletaClient;
use crate::web::form::{Field, FormState, ImageFile, Submission};
use crate::web::routes::Page;

/// Best-effort device position; `None` when denied or unavailable.
#[async_trait]
pub trait Geolocator {
    async fn current_position(&self) -> Option<Coordinates>;
}

/// A position fixed up front, e.g. read from configuration.
pub struct FixedPosition(pub Option<Coordinates>);

#[async_trait]
impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Option<Coordinates> {
        self.0
    }
}

/// Everything the create-point page reads from or writes to.
#[async_trait]
pub trait Sources {
    async fn list_items(&self) -> Result<Vec<Item>, Error>;
    async fn list_ufs(&self) -> Result<Vec<String>, Error>;
    async fn list_cities(&self, uf: &str) -> Result<Vec<String>, Error>;
    async fn current_position(&self) -> Option<Coordinates>;
    async fn create_point(&self, submission: Submission) -> Result<Point, Error>;
}

pub struct RemoteSources {
    pub api: EcoletaClient,
    pub ibge: IbgeClient,
    pub geolocator: Box<dyn Geolocator + Send + Sync>,
}

#[async_trait]
impl Sources for RemoteSources {
    async fn list_items(&self) -> Result<Vec<Item>, Error> {
        self.api.list_items().await
    }

    async fn list_ufs(&self) -> Result<Vec<String>, Error> {
        self.ibge.list_ufs().await
    }

    async fn list_cities(&self, uf: &str) -> Result<Vec<String>, Error> {
        self.ibge.list_cities(uf).await
    }

    async fn current_position(&self) -> Option<Coordinates> {
        self.geolocator.current_position().await
    }

    async fn create_point(&self, submission: Submission) -> Result<Point, Error> {
        self.api.create_point(submission).await
    }
}

/// Drives the create-point page: fetches, user events and submission.
pub struct CreatePointFlow<S> {
    sources: Arc<S>,
    state: Arc<Mutex<FormState>>,
    city_request: Mutex<Option<JoinHandle<()>>>,
}

impl<S> CreatePointFlow<S>
where
    S: Sources + Send + Sync + 'static,
{
    pub fn new(sources: S) -> Self {
        Self {
            sources: Arc::new(sources),
            state: Arc::new(Mutex::new(FormState::new())),
            city_request: Mutex::new(None),
        }
    }

    pub async fn snapshot(&self) -> FormState {
        self.state.lock().await.clone()
    }

    /// Loads catalog, state list and position concurrently; each lands as it arrives.
    #[tracing::instrument(skip(self))]
    pub async fn mount(&self) {
        let catalog = async {
            let items = self.sources.list_items().await.unwrap_or_else(|err| {
                tracing::warn!("could not load item catalog: {}", err);
                vec![]
            });
            update(&self.state, |s| s.catalog_loaded(items)).await;
        };

        let ufs = async {
            match self.sources.list_ufs().await {
                Ok(ufs) => update(&self.state, |s| s.ufs_loaded(ufs)).await,
                Err(err) => tracing::warn!("could not load states: {}", err),
            }
        };

        let position = async {
            match self.sources.current_position().await {
                Some(position) => update(&self.state, |s| s.position_located(position)).await,
                None => tracing::debug!("geolocation unavailable, keeping default position"),
            }
        };

        tokio::join!(catalog, ufs, position);
    }

    /// Selects a state and refetches its cities, aborting the previous fetch.
    #[tracing::instrument(skip(self))]
    pub async fn select_uf(&self, uf: &str) {
        let mut pending = self.city_request.lock().await;

        update(&self.state, |s| s.select_uf(uf)).await;

        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let sources = self.sources.clone();
        let state = self.state.clone();
        let uf = uf.to_string();

        *pending = Some(tokio::spawn(async move {
            match sources.list_cities(&uf).await {
                Ok(cities) => update(&state, |s| s.cities_loaded(&uf, cities)).await,
                Err(err) => {
                    tracing::warn!("could not load cities of {}: {}", uf, err);
                    update(&state, |s| s.cities_failed(&uf)).await;
                }
            }
        }));
    }

    /// Waits for the latest city fetch, if any, to finish.
    pub async fn cities_settled(&self) {
        let handle = self.city_request.lock().await.take();

        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::debug!("city fetch did not complete: {}", err);
            }
        }
    }

    pub async fn select_city(&self, city: &str) {
        update(&self.state, |s| s.select_city(city)).await;
    }

    pub async fn click_map(&self, latitude: f64, longitude: f64) {
        update(&self.state, |s| s.select_position(latitude, longitude)).await;
    }

    pub async fn click_item(&self, id: i32) {
        update(&self.state, |s| s.toggle_item(id)).await;
    }

    pub async fn change_input(&self, field: Field, value: &str) {
        update(&self.state, |s| s.change_input(field, value)).await;
    }

    pub async fn select_file(&self, file: ImageFile) {
        update(&self.state, |s| s.select_file(file)).await;
    }

    pub async fn dismiss_notification(&self) {
        update(&self.state, |s| s.dismiss_notification()).await;
    }

    /// Posts the form once. Returns the page to navigate to on success.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self) -> Option<Page> {
        let submission = {
            let mut state = self.state.lock().await;
            if !state.is_editable() {
                tracing::debug!("ignoring submit in phase {:?}", state.phase);
                return None;
            }

            let next = std::mem::take(&mut *state).begin_submit();
            let submission = next.submission();
            *state = next;
            submission
        };

        match self.sources.create_point(submission).await {
            Ok(point) => {
                tracing::info!("registered point {}", point.id);
                update(&self.state, |s| s.submit_succeeded()).await;
                Some(Page::Success)
            }
            Err(err) => {
                tracing::warn!("registration failed: {}", err);
                update(&self.state, |s| s.submit_failed()).await;
                None
            }
        }
    }
}

async fn update<F>(state: &Mutex<FormState>, transition: F)
where
    F: FnOnce(FormState) -> FormState,
{
    let mut state = state.lock().await;
    let current = std::mem::take(&mut *state);
    *state = transition(current);
}
