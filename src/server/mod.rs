//! HTTP transport: multipart in, finished deck out.

pub mod error;
pub mod routes;

use crate::config::AppConfig;
use crate::llm::LlmClient;
use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, web};
use tracing_actix_web::TracingLogger;

/// Shared per-worker state. The one [`LlmClient`] serves every request;
/// credentials arrive with each upload.
pub struct AppState {
    pub config: AppConfig,
    pub llm: LlmClient,
}

/// Run the server until shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let llm = LlmClient::with_timeout(config.llm_timeout()).map_err(std::io::Error::other)?;
    let bind_address = config.bind_address();
    let static_dir = config.static_dir.clone();
    let state = web::Data::new(AppState { config, llm });

    tracing::info!(%bind_address, "starting server");
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .service(routes::generate)
            .route("/", web::get().to(index))
            .service(Files::new("/static", static_dir.clone()).index_file("index.html"))
    })
    .bind(bind_address)?
    .run()
    .await
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("hello, go to /static")
}
