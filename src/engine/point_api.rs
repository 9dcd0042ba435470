use super::helpers::{fetch_point_items, point_from_row, POINT_COLUMNS};
use super::Engine;

use async_trait::async_trait;
use sqlx::{Executor, Row};

use crate::{
    api::PointAPI,
    entities::{NewPoint, Point, PointFilter},
    error::{not_found_error, unknown_item_error, Error},
    uploads::upload_url,
};

#[async_trait]
impl PointAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn list_points(&self, filter: PointFilter) -> Result<Vec<Point>, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = format!(
            "SELECT DISTINCT {} FROM points p
                LEFT JOIN point_items pi ON pi.point_id = p.id
            WHERE
                ($1::VARCHAR IS NULL OR p.city = $1)
                AND ($2::VARCHAR IS NULL OR UPPER(p.uf) = UPPER($2))
                AND ($3::INT4[] IS NULL OR pi.item_id = ANY($3))
            ORDER BY p.id",
            POINT_COLUMNS
        );

        let rows = conn
            .fetch_all(
                sqlx::query(&query)
                    .bind(filter.city)
                    .bind(filter.uf)
                    .bind(filter.items),
            )
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            ids.push(row.try_get::<i32, _>("id")?);
        }

        let mut items = fetch_point_items(&mut conn, &ids).await?;

        let mut points = Vec::with_capacity(rows.len());
        for (row, id) in rows.iter().zip(ids) {
            let point_items = items.remove(&id).unwrap_or_default();
            points.push(point_from_row(row, &self.public_url, point_items)?);
        }

        Ok(points)
    }

    #[tracing::instrument(skip(self), fields(name = %point.name))]
    async fn create_point(&self, point: NewPoint) -> Result<Point, Error> {
        let mut tx = self.pool.begin().await?;

        let known: Vec<i32> = sqlx::query_scalar("SELECT id FROM items WHERE id = ANY($1)")
            .bind(&point.items)
            .fetch_all(&mut tx)
            .await?;

        if let Some(missing) = point.items.iter().find(|id| !known.contains(id)) {
            tx.rollback().await?;
            return Err(unknown_item_error(*missing));
        }

        let id: i32 = sqlx::query_scalar(
            "INSERT INTO points (image, name, email, whatsapp, latitude, longitude, city, uf)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&point.image)
        .bind(&point.name)
        .bind(&point.email)
        .bind(&point.whatsapp)
        .bind(point.coordinates.latitude)
        .bind(point.coordinates.longitude)
        .bind(&point.city)
        .bind(&point.uf)
        .fetch_one(&mut tx)
        .await?;

        for item_id in point.items.iter() {
            tx.execute(
                sqlx::query("INSERT INTO point_items (point_id, item_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(item_id),
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!("created point {} with {} items", id, point.items.len());

        Ok(Point {
            id,
            name: point.name,
            email: point.email,
            whatsapp: point.whatsapp,
            latitude: point.coordinates.latitude,
            longitude: point.coordinates.longitude,
            uf: point.uf,
            city: point.city,
            image_url: point.image.map(|name| upload_url(&self.public_url, &name)),
            items: point.items,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn find_point(&self, id: i32) -> Result<Point, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = format!("SELECT {} FROM points p WHERE p.id = $1", POINT_COLUMNS);

        let row = conn
            .fetch_optional(sqlx::query(&query).bind(id))
            .await?
            .ok_or_else(|| not_found_error("point"))?;

        let mut items = fetch_point_items(&mut conn, &[id]).await?;

        point_from_row(&row, &self.public_url, items.remove(&id).unwrap_or_default())
    }
}
