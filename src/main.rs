use ecoleta::config::Config;
use ecoleta::db::PgPool;
use ecoleta::engine::Engine;
use ecoleta::error::Error;
use ecoleta::server::serve;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let PgPool(pool) = PgPool::new(&config.database_url, config.database_max_connections).await?;

    let engine = Engine::new(pool, config.public_url.clone()).await?;

    serve(engine, &config).await
}
