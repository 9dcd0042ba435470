use axum::extract::{Extension, Json};

use crate::api::DynAPI;
use crate::entities::Item;
use crate::error::Error;

pub async fn list(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Item>>, Error> {
    let items = api.list_items().await?;

    Ok(items.into())
}
