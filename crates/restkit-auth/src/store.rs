//! User stores and the model-binding registry.
//!
//! The toolkit never hard-codes a user backend. A [`UserStore`] answers
//! identifier lookups and ambient request authentication; the
//! [`StoreRegistry`] resolves the configured `app_label.ModelName` binding to
//! a registered store. An unknown binding is a configuration error, reported
//! as such rather than evaluated or guessed at.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use restkit_core::error::{ApiError, ApiResult};
use restkit_http::ApiRequest;

/// A user record as the auth layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// The stable user identifier carried in tokens.
    pub id: i64,
    /// The login name.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// Inactive users cannot authenticate.
    pub is_active: bool,
    /// When the user last obtained a token pair, if recorded.
    pub last_login: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// Creates an active user with no recorded login.
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            is_active: true,
            last_login: None,
        }
    }
}

/// Backend access to user records.
///
/// Implementations wrap whatever persistence the host application uses; the
/// toolkit ships [`MemoryUserStore`] for tests and small deployments.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by the identifier carried in tokens.
    async fn get_by_id(&self, id: i64) -> ApiResult<Option<AuthUser>>;

    /// Authenticates a request from ambient state, without credentials in
    /// the body.
    ///
    /// Returns `Ok(None)` when the request carries no authenticatable
    /// identity. Inactive users never authenticate.
    async fn authenticate_request(&self, request: &ApiRequest) -> ApiResult<Option<AuthUser>>;

    /// Records a login timestamp for the user.
    async fn update_last_login(&self, id: i64, when: DateTime<Utc>) -> ApiResult<()>;
}

/// An in-memory [`UserStore`].
///
/// Ambient authentication reads the `REMOTE_USER` META entry, as set by a
/// fronting server or an upstream middleware, and matches it against
/// usernames.
///
/// # Examples
///
/// ```
/// use restkit_auth::store::{AuthUser, MemoryUserStore};
///
/// let store = MemoryUserStore::new();
/// store.add_user(AuthUser::new(1, "alice", "alice@example.com")).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<Vec<AuthUser>>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given users.
    pub fn with_users(users: Vec<AuthUser>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    /// Adds a user to the store.
    pub fn add_user(&self, user: AuthUser) -> ApiResult<()> {
        self.write()?.push(user);
        Ok(())
    }

    fn read(&self) -> ApiResult<std::sync::RwLockReadGuard<'_, Vec<AuthUser>>> {
        self.users
            .read()
            .map_err(|_| ApiError::Unexpected("User store lock poisoned".to_string()))
    }

    fn write(&self) -> ApiResult<std::sync::RwLockWriteGuard<'_, Vec<AuthUser>>> {
        self.users
            .write()
            .map_err(|_| ApiError::Unexpected("User store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_by_id(&self, id: i64) -> ApiResult<Option<AuthUser>> {
        Ok(self.read()?.iter().find(|u| u.id == id).cloned())
    }

    async fn authenticate_request(&self, request: &ApiRequest) -> ApiResult<Option<AuthUser>> {
        let Some(remote_user) = request.meta().get("REMOTE_USER") else {
            return Ok(None);
        };
        Ok(self
            .read()?
            .iter()
            .find(|u| u.is_active && u.username == *remote_user)
            .cloned())
    }

    async fn update_last_login(&self, id: i64, when: DateTime<Utc>) -> ApiResult<()> {
        if let Some(user) = self.write()?.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(when);
        }
        Ok(())
    }
}

/// Maps `app_label.ModelName` bindings to registered stores.
///
/// The configured `user_model` setting is resolved here; bindings are plain
/// lookup keys with no runtime evaluation attached.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    stores: HashMap<String, Arc<dyn UserStore>>,
}

impl StoreRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a store under a binding.
    pub fn register(&mut self, binding: impl Into<String>, store: Arc<dyn UserStore>) {
        self.stores.insert(binding.into(), store);
    }

    /// Resolves a binding to its store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ImproperlyConfigured`] for an unknown binding.
    pub fn resolve(&self, binding: &str) -> ApiResult<Arc<dyn UserStore>> {
        self.stores.get(binding).cloned().ok_or_else(|| {
            ApiError::ImproperlyConfigured(format!("No user store registered for {binding:?}"))
        })
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut bindings: Vec<&String> = self.stores.keys().collect();
        bindings.sort();
        f.debug_struct("StoreRegistry")
            .field("bindings", &bindings)
            .finish()
    }
}
