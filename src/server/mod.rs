mod handlers;
#[cfg(test)]
pub(crate) mod tests;

use std::io;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, get_service},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::api::{DynAPI, API};
use crate::config::Config;
use crate::error::{server_error, Error};
use crate::server::handlers::{items, points};
use crate::uploads::Uploads;

pub fn router(api: DynAPI, uploads: Uploads) -> Router {
    let static_files = get_service(ServeDir::new(uploads.dir())).handle_error(|err: io::Error| async move {
        tracing::error!("could not serve upload: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    });

    Router::new()
        .route("/items", get(items::list))
        .route("/points", get(points::list).post(points::create))
        // POST lookup is kept for clients of the first release
        .route("/points/:id", get(points::find).post(points::find))
        .nest("/uploads", static_files)
        .layer(Extension(api))
        .layer(Extension(uploads))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, config: &Config) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;
    let app = router(api, Uploads::new(&config.uploads_dir));

    tracing::info!("listening on {}", config.bind_addr);

    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await
        .map_err(server_error)
}
