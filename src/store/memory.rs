/// In-memory credential store
///
/// HashMap-backed implementation keyed by username, used by tests and
/// fixtures. The RwLock keeps each read-modify-write of `refresh_hash`
/// atomic with respect to concurrent rotations of the same principal.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::principal::{Principal, Role};
use crate::store::CredentialStore;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    principals: RwLock<HashMap<String, Principal>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, principal: &Principal) -> Result<(), AuthError> {
        let mut guard = self.principals.write().unwrap_or_else(|e| e.into_inner());

        if guard.contains_key(&principal.username) {
            return Err(AuthError::DuplicatePrincipal("username".to_string()));
        }
        if guard.values().any(|p| p.email == principal.email) {
            return Err(AuthError::DuplicatePrincipal("email".to_string()));
        }

        guard.insert(principal.username.clone(), principal.clone());
        Ok(())
    }

    async fn find(&self, identifier: &str) -> Result<Option<Principal>, AuthError> {
        let guard = self.principals.read().unwrap_or_else(|e| e.into_inner());

        if let Some(principal) = guard.get(identifier) {
            return Ok(Some(principal.clone()));
        }
        Ok(guard.values().find(|p| p.email == identifier).cloned())
    }

    async fn get_refresh_hash(&self, username: &str) -> Result<Option<String>, AuthError> {
        let guard = self.principals.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get(username).and_then(|p| p.refresh_hash.clone()))
    }

    async fn set_refresh_hash(&self, username: &str, hash: &str) -> Result<bool, AuthError> {
        let mut guard = self.principals.write().unwrap_or_else(|e| e.into_inner());
        match guard.get_mut(username) {
            Some(principal) => {
                principal.refresh_hash = Some(hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_role(&self, username: &str, role: Role) -> Result<bool, AuthError> {
        let mut guard = self.principals.write().unwrap_or_else(|e| e.into_inner());
        match guard.get_mut(username) {
            Some(principal) => {
                principal.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, username: &str) -> Result<bool, AuthError> {
        let mut guard = self.principals.write().unwrap_or_else(|e| e.into_inner());
        Ok(guard.remove(username).is_some())
    }
}
