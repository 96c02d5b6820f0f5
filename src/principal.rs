/// Principal model
///
/// A principal is an authenticated identity with a coarse permission tier.
/// The stored record carries at most one valid refresh credential at a time,
/// kept as a one-way hash in `refresh_hash`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission tier used for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Regular,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Regular => "regular",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Role::Regular),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Persisted principal record
///
/// `password_hash` and `refresh_hash` are opaque and never serialized
/// outward. `refresh_hash` is `None` until the first login; every issuance
/// overwrites it whole, so the previous refresh token stops matching.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub refresh_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    pub fn new(username: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            username,
            email,
            password_hash,
            role,
            refresh_hash: None,
            created_at: Utc::now(),
        }
    }
}
