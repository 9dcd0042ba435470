use super::Database;

use sqlx::{pool::PoolConnection, postgres::PgRow, Executor, Row};
use std::collections::HashMap;

use crate::{entities::Point, error::Error, uploads::upload_url};

pub const POINT_COLUMNS: &str =
    "p.id, p.image, p.name, p.email, p.whatsapp, p.latitude, p.longitude, p.city, p.uf";

/// Item ids per point, ascending.
#[tracing::instrument(skip(conn))]
pub async fn fetch_point_items(
    conn: &mut PoolConnection<Database>,
    point_ids: &[i32],
) -> Result<HashMap<i32, Vec<i32>>, Error> {
    let rows = conn
        .fetch_all(
            sqlx::query(
                "SELECT point_id, item_id FROM point_items WHERE point_id = ANY($1) ORDER BY point_id, item_id",
            )
            .bind(point_ids),
        )
        .await?;

    let mut items: HashMap<i32, Vec<i32>> = HashMap::new();

    for row in rows.iter() {
        let point_id: i32 = row.try_get("point_id")?;
        let item_id: i32 = row.try_get("item_id")?;

        items.entry(point_id).or_default().push(item_id);
    }

    Ok(items)
}

pub fn point_from_row(row: &PgRow, public_url: &str, items: Vec<i32>) -> Result<Point, Error> {
    let image: Option<String> = row.try_get("image")?;

    Ok(Point {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        whatsapp: row.try_get("whatsapp")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        uf: row.try_get("uf")?,
        city: row.try_get("city")?,
        image_url: image.map(|name| upload_url(public_url, &name)),
        items,
    })
}
