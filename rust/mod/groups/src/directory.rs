//! User resolution and profile projection collaborator.
//!
//! The group service does not own user identity; it consults this trait
//! for "does this user exist" and "what does their profile look like".

use std::sync::Arc;

use roster_core::ServiceError;
use roster_sql::SQLStore;
use roster_store::{EntityStore, StoreError};

use crate::model::{Profile, User};

/// Resolves users by numeric id and projects their public profiles.
pub trait UserDirectory: Send + Sync {
    /// Look up a user by id. Absence is not an error.
    fn resolve(&self, user_id: i64) -> Result<Option<User>, ServiceError>;

    /// Project a user's public profile. The user is expected to exist;
    /// a missing row is a persistence-level failure.
    fn profile(&self, user_id: i64) -> Result<Profile, ServiceError>;
}

/// Directory backed by the `users` table through the entity store.
pub struct SqlUserDirectory {
    store: EntityStore,
}

impl SqlUserDirectory {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self {
            store: EntityStore::new(sql),
        }
    }

    /// Insert a user row, returning it with its generated id.
    pub fn create_user(&self, username: &str, name: Option<&str>) -> Result<User, ServiceError> {
        let mut user = User {
            user_id: None,
            username: Some(username.to_string()),
            name: name.map(|s| s.to_string()),
        };
        self.store.save(&mut user).map_err(wrap_store)?;
        Ok(user)
    }
}

impl UserDirectory for SqlUserDirectory {
    fn resolve(&self, user_id: i64) -> Result<Option<User>, ServiceError> {
        self.store.get_by_key(Some(user_id)).map_err(wrap_store)
    }

    fn profile(&self, user_id: i64) -> Result<Profile, ServiceError> {
        let user = self
            .resolve(user_id)?
            .ok_or_else(|| ServiceError::Database(format!("user row {} missing", user_id)))?;
        Ok(Profile {
            user_id: user.user_id.unwrap_or(user_id),
            username: user.username.unwrap_or_default(),
            name: user.name,
        })
    }
}

fn wrap_store(e: StoreError) -> ServiceError {
    ServiceError::Database(e.to_string())
}
