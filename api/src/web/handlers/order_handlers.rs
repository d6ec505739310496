// api/src/web/handlers/order_handlers.rs

use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse};
use commerce_core::{OrderDraft, OrderId, OrderRevision, Store, UserId};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(
  name = "handler::create_order",
  skip_all,
  fields(caller = auth.0.user_id, role = %auth.0.role)
)]
pub async fn create_order_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  auth: AuthenticatedUser,
  body: web::Json<Option<OrderDraft>>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.order_book.create_order(body.into_inner()).await?;
  info!(order_id = order.id, user_id = order.user_id, "Order created.");
  Ok(
    HttpResponse::Created()
      .insert_header((LOCATION, format!("/api/v1/orders/{}", order.id)))
      .json(order),
  )
}

#[instrument(name = "handler::list_orders", skip_all, fields(caller = auth.0.user_id, role = %auth.0.role))]
pub async fn list_orders_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.order_book.all_orders().await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_order", skip_all, fields(caller = auth.0.user_id, role = %auth.0.role, order_id = *path))]
pub async fn get_order_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  auth: AuthenticatedUser,
  path: web::Path<OrderId>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.order_book.order(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::update_order", skip_all, fields(caller = auth.0.user_id, role = %auth.0.role, order_id = *path))]
pub async fn update_order_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  auth: AuthenticatedUser,
  path: web::Path<OrderId>,
  body: web::Json<Option<OrderRevision>>,
) -> Result<HttpResponse, AppError> {
  let revision = body
    .into_inner()
    .ok_or_else(|| AppError::Validation("Order data is invalid.".to_string()))?;
  let order = app_state.order_book.update_order(path.into_inner(), revision).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::delete_order", skip_all, fields(caller = auth.0.user_id, role = %auth.0.role, order_id = *path))]
pub async fn delete_order_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  auth: AuthenticatedUser,
  path: web::Path<OrderId>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.order_book.delete_order(path.into_inner()).await?;
  info!(order_id = order.id, "Order deleted.");
  Ok(HttpResponse::Ok().json(json!({"deleted": true})))
}

#[instrument(name = "handler::user_orders", skip_all, fields(caller = auth.0.user_id, role = %auth.0.role, user_id = *path))]
pub async fn user_orders_handler<S: Store>(
  app_state: web::Data<AppState<S>>,
  auth: AuthenticatedUser,
  path: web::Path<UserId>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.order_book.orders_for_user(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(orders))
}
