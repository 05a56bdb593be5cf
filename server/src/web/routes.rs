// atelier_server/src/web/routes.rs

use actix_web::middleware::DefaultHeaders;
use actix_web::web;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::startup::UPLOADS_PATH;
use crate::web::handlers::{order_handlers, quote_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Registers every `/api` route. Static `/uploads` serving is mounted separately.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .app_data(
        web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {}", err)).into()),
      )
      .route("/health", web::get().to(health_check_handler))
      .route("/order", web::post().to(order_handlers::submit_order_handler))
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      )
      .route("/quote", web::post().to(quote_handlers::quote_handler))
      .route("/rates", web::get().to(quote_handlers::rates_handler)),
  );
}

/// Serves stored images under `/uploads`. Responses may not be sniffed or run script.
pub fn configure_uploads(upload_dir: PathBuf) -> impl FnOnce(&mut web::ServiceConfig) {
  move |cfg: &mut web::ServiceConfig| {
    cfg.service(
      web::scope(UPLOADS_PATH)
        .wrap(
          DefaultHeaders::new()
            .add(("X-Content-Type-Options", "nosniff"))
            .add(("Content-Security-Policy", "default-src 'none'; sandbox")),
        )
        .service(actix_files::Files::new("", upload_dir)),
    );
  }
}
