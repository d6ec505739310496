// api/src/web/routes.rs

use actix_web::{web, HttpResponse};
use commerce_core::Store;

use crate::errors::AppError;
use crate::web::handlers::order_handlers::{
  create_order_handler, delete_order_handler, get_order_handler, list_orders_handler, update_order_handler,
  user_orders_handler,
};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed bodies and path segments are client errors reported in the same JSON
/// shape as every other error.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Malformed JSON body: {}", err)).into()),
    )
    .app_data(
      web::PathConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid path parameter: {}", err)).into()),
    );
}

pub fn configure_app_routes<S: Store>(cfg: &mut web::ServiceConfig) {
  extractor_configs(cfg);
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(create_order_handler::<S>))
          .route("", web::get().to(list_orders_handler::<S>))
          .route("/{order_id}", web::get().to(get_order_handler::<S>))
          .route("/{order_id}", web::put().to(update_order_handler::<S>))
          .route("/{order_id}", web::delete().to(delete_order_handler::<S>)),
      )
      .route("/users/{user_id}/orders", web::get().to(user_orders_handler::<S>)),
  );
}
