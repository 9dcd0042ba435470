mod helpers;
mod item_api;
mod point_api;


use sqlx::{Executor, Pool, Postgres};

use crate::{api::API, error::Error};

type Database = Postgres;

/// Item icons shipped in the uploads directory.
const SEED_ITEMS: [(&str, &str); 6] = [
    ("Lâmpadas", "lampadas.svg"),
    ("Pilhas e Baterias", "baterias.svg"),
    ("Papéis e Papelão", "papeis-papelao.svg"),
    ("Resíduos Eletrônicos", "eletronicos.svg"),
    ("Resíduos Orgânicos", "organicos.svg"),
    ("Óleo de Cozinha", "oleo.svg"),
];

pub struct Engine {
    pool: Pool<Database>,
    public_url: String,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>, public_url: impl Into<String>) -> Result<Self, Error> {
        // item catalog
        pool.execute(
            "CREATE TABLE IF NOT EXISTS items (id SERIAL PRIMARY KEY, title VARCHAR NOT NULL, image VARCHAR NOT NULL UNIQUE)",
        )
        .await?;

        // point registration
        pool.execute("CREATE TABLE IF NOT EXISTS points (id SERIAL PRIMARY KEY, image VARCHAR, name VARCHAR NOT NULL, email VARCHAR NOT NULL, whatsapp VARCHAR NOT NULL, latitude DOUBLE PRECISION NOT NULL, longitude DOUBLE PRECISION NOT NULL, city VARCHAR NOT NULL, uf VARCHAR(2) NOT NULL)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS point_items (point_id INT4 NOT NULL, item_id INT4 NOT NULL, PRIMARY KEY (point_id, item_id), CONSTRAINT fk_point_item_point FOREIGN KEY(point_id) REFERENCES points(id), CONSTRAINT fk_point_item_item FOREIGN KEY(item_id) REFERENCES items(id))")
            .await?;

        for (title, image) in SEED_ITEMS {
            pool.execute(
                sqlx::query("INSERT INTO items (title, image) VALUES ($1, $2) ON CONFLICT (image) DO NOTHING")
                    .bind(title)
                    .bind(image),
            )
            .await?;
        }

        tracing::info!("schema ready, {} seed items", SEED_ITEMS.len());

        Ok(Self {
            pool,
            public_url: public_url.into(),
        })
    }
}

impl API for Engine {}
