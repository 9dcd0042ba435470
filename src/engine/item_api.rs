use super::Engine;

use async_trait::async_trait;
use sqlx::{Executor, Row};

use crate::{api::ItemAPI, entities::Item, error::Error, uploads::upload_url};

#[async_trait]
impl ItemAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn list_items(&self) -> Result<Vec<Item>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(sqlx::query("SELECT id, title, image FROM items ORDER BY id"))
            .await?;

        let mut items = Vec::with_capacity(rows.len());

        for row in rows.iter() {
            let image: String = row.try_get("image")?;

            items.push(Item {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                image_url: upload_url(&self.public_url, &image),
            });
        }

        Ok(items)
    }
}
