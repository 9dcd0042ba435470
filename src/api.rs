use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{Item, NewPoint, Point, PointFilter};
use crate::error::Error;

#[async_trait]
pub trait ItemAPI {
    /// All item categories, ordered by id.
    async fn list_items(&self) -> Result<Vec<Item>, Error>;
}

#[async_trait]
pub trait PointAPI {
    async fn list_points(&self, filter: PointFilter) -> Result<Vec<Point>, Error>;

    /// Persists the point and its item associations; every item id must exist.
    async fn create_point(&self, point: NewPoint) -> Result<Point, Error>;

    async fn find_point(&self, id: i32) -> Result<Point, Error>;
}

pub trait API: ItemAPI + PointAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
