// api/src/services/auth_service.rs

//! Credential hashing (argon2) and bearer-token verification (HS256 JWT).
//!
//! Tokens are issued elsewhere; this service only checks them. The order workflow
//! never sees a credential or a token, only the verified caller.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use commerce_core::{Role, UserId};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

/// Hashes a plain-text password into an argon2 PHC string.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty for hashing.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// Checks a plain-text password against a stored argon2 hash. A mismatch is
/// `Ok(false)`; a malformed stored hash is an error.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display), fields(hash_len = stored_hash.len()))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other) => Err(AppError::Internal(format!("Password verification process failed: {}", other))),
  }
}

/// Registered and private claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// Decimal user id.
  pub sub: String,
  #[serde(default)]
  pub role: Role,
  pub iss: String,
  pub aud: String,
  pub exp: u64,
}

/// The caller a verified token speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
  pub user_id: UserId,
  pub role: Role,
}

pub struct TokenVerifier {
  key: DecodingKey,
  validation: Validation,
}

impl TokenVerifier {
  pub fn new(secret: &SecretString, issuer: &str, audience: &str) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);
    validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
    Self {
      key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
      validation,
    }
  }

  /// Verifies signature, expiry, issuer and audience, then reads the caller.
  pub fn verify(&self, token: &str) -> Result<Caller, AppError> {
    let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
      warn!(error = %e, "Bearer token rejected.");
      AppError::Auth("Invalid or expired bearer token.".to_string())
    })?;
    let user_id = data
      .claims
      .sub
      .parse::<UserId>()
      .map_err(|_| AppError::Auth("Bearer token subject is not a user id.".to_string()))?;
    Ok(Caller {
      user_id,
      role: data.claims.role,
    })
  }
}
