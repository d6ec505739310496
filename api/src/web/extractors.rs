// api/src/web/extractors.rs

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::services::auth_service::{Caller, TokenVerifier};

/// The verified caller of a request, read from `Authorization: Bearer <jwt>`.
/// Any handler taking this argument answers 401 without a valid token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Caller);

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
  let header = req
    .headers()
    .get(AUTHORIZATION)
    .ok_or_else(|| AppError::Auth("Missing Authorization header.".to_string()))?;
  let value = header
    .to_str()
    .map_err(|_| AppError::Auth("Malformed Authorization header.".to_string()))?;
  match value.split_once(' ') {
    Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => Ok(token.trim()),
    _ => Err(AppError::Auth("Authorization header must use the Bearer scheme.".to_string())),
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let Some(verifier) = req.app_data::<web::Data<TokenVerifier>>() else {
      return ready(Err(AppError::Internal("Token verifier is not configured.".to_string())));
    };
    let outcome = bearer_token(req).and_then(|token| verifier.verify(token));
    if let Err(err) = &outcome {
      warn!(path = %req.path(), error = %err, "Request not authenticated.");
    }
    ready(outcome.map(AuthenticatedUser))
  }
}
