/// Authentication module
///
/// Token encoding/validation, password hashing, pair issuance with
/// refresh-token rotation, and role-gated authorization checks.

mod claims;
mod guard;
mod issuer;
mod password;
mod rotation;
mod service;
mod token;

pub use claims::TokenClaims;
pub use guard::{authorize, Policy};
pub use issuer::{TokenIssuer, TokenPair};
pub use password::{hash_password, verify_password};
pub use rotation::RefreshRotator;
pub use service::AuthService;
pub use token::{DecodeError, TokenCodec};
