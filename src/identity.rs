use crate::model::UserIdentity;
use crate::sync_error::{Result, SyncError};
use async_trait::async_trait;

/// Source of the authenticated user. Resolved once at startup; view-models
/// receive the resulting [`UserIdentity`] by value rather than reading any
/// ambient context.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current user, or [`SyncError::Auth`] when nobody is signed in.
    async fn current_user(&self) -> Result<UserIdentity>;
}

const USER_VAR: &str = "ALBUMSYNC_USER";

/// Identity from the environment, matching how the store client picks up its
/// credentials.
pub struct EnvIdentity;

#[async_trait]
impl IdentityProvider for EnvIdentity {
    async fn current_user(&self) -> Result<UserIdentity> {
        match std::env::var(USER_VAR) {
            Ok(username) if !username.trim().is_empty() => Ok(UserIdentity::new(username)),
            _ => Err(SyncError::Auth(format!("env {} not set", USER_VAR))),
        }
    }
}
