/// Credential store
///
/// Single abstract capability interface over principal persistence; the
/// auth components hold no copy of stored truth and only read or overwrite
/// the one `refresh_hash` field through it. Implementations are injected at
/// construction time (Postgres in production, in-memory in tests).

mod memory;
mod postgres;

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::principal::{Principal, Role};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new principal; fails with `DuplicatePrincipal` when the
    /// username or email is taken.
    async fn insert(&self, principal: &Principal) -> Result<(), AuthError>;

    /// Find a principal by username or email.
    async fn find(&self, identifier: &str) -> Result<Option<Principal>, AuthError>;

    /// Read the stored refresh-token hash, `None` when none has been issued.
    async fn get_refresh_hash(&self, username: &str) -> Result<Option<String>, AuthError>;

    /// Overwrite the stored refresh-token hash in a single atomic write.
    /// Returns `false` when the principal does not exist.
    async fn set_refresh_hash(&self, username: &str, hash: &str) -> Result<bool, AuthError>;

    /// Returns `false` when the principal does not exist.
    async fn update_role(&self, username: &str, role: Role) -> Result<bool, AuthError>;

    /// Delete the principal record. The outstanding refresh token dies with
    /// it: the hash it would be compared against is gone.
    async fn delete(&self, username: &str) -> Result<bool, AuthError>;
}
