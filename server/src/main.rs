// atelier_server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use atelier_server::startup::build_state;
use atelier_server::web::{configure_app_routes, configure_uploads};
use atelier_server::AppConfig;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting atelier server...");

  let app_config = AppConfig::from_env().map_err(|e| {
    tracing::error!(error = %e, "Failed to load application configuration.");
    e
  })?;
  let server_address = app_config.bind_address();
  let upload_dir = app_config.upload_dir.clone();

  let app_state = build_state(&app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialise application state.");
    e
  })?;

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
      .configure(configure_uploads(upload_dir.clone()))
  })
  .bind(&server_address)?
  .run()
  .await?;

  Ok(())
}
