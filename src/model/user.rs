use serde::{Deserialize, Serialize};

/// The authenticated user. Only the username is consumed; it scopes
/// subscriptions and stamps ownership onto created records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub username: String,
}

impl UserIdentity {
    pub fn new(username: impl Into<String>) -> Self {
        UserIdentity { username: username.into() }
    }
}
