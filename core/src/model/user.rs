// core/src/model/user.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UserId;

/// Access level carried by a user and by the bearer tokens issued for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  #[default]
  Customer,
  Admin,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Customer => "customer",
      Role::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "customer" => Ok(Role::Customer),
      "admin" => Ok(Role::Admin),
      other => Err(format!("unknown role '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: UserId,
  pub name: String,
  pub email: Option<String>,
  #[serde(skip_serializing, default)] // Never send the credential hash to a client
  pub credential_hash: String,
  pub role: Role,
}

/// Insert shape for a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  pub email: Option<String>,
  pub credential_hash: String,
  pub role: Role,
}
