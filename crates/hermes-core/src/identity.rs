//! Caller identity.
//!
//! The transport layer authenticates callers; Hermes only consumes the
//! result. [`CallerIdentity`] is what permission checks look at.

use serde::{Deserialize, Serialize};

/// The authenticated identity of a caller.
///
/// # Example
///
/// ```
/// use hermes_core::CallerIdentity;
///
/// let identity = CallerIdentity::user("u-1").with_roles(["admin"]);
/// assert!(identity.is_authenticated());
/// assert_eq!(identity.log_id(), "user:u-1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallerIdentity {
    /// No credentials were presented.
    #[default]
    Anonymous,
    /// An end user.
    User {
        /// Stable user id.
        user_id: String,
        /// Roles granted to the user.
        #[serde(default)]
        roles: Vec<String>,
    },
    /// An API key.
    ApiKey {
        /// Key id (never the secret).
        key_id: String,
        /// Scopes granted to the key.
        #[serde(default)]
        scopes: Vec<String>,
    },
    /// Another service.
    Service {
        /// Service name.
        name: String,
    },
}

impl CallerIdentity {
    /// An authenticated user without roles.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
            roles: Vec::new(),
        }
    }

    /// An API key without scopes.
    #[must_use]
    pub fn api_key(key_id: impl Into<String>) -> Self {
        Self::ApiKey {
            key_id: key_id.into(),
            scopes: Vec::new(),
        }
    }

    /// A calling service.
    #[must_use]
    pub fn service(name: impl Into<String>) -> Self {
        Self::Service { name: name.into() }
    }

    /// Replaces the roles (or scopes, for API keys). No-op otherwise.
    #[must_use]
    pub fn with_roles<I, S>(mut self, granted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let granted: Vec<String> = granted.into_iter().map(Into::into).collect();
        match &mut self {
            Self::User { roles, .. } => *roles = granted,
            Self::ApiKey { scopes, .. } => *scopes = granted,
            Self::Anonymous | Self::Service { .. } => {}
        }
        self
    }

    /// Returns true for every identity except [`CallerIdentity::Anonymous`].
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// Identifier suitable for logs.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::User { user_id, .. } => format!("user:{user_id}"),
            Self::ApiKey { key_id, .. } => format!("apikey:{key_id}"),
            Self::Service { name } => format!("service:{name}"),
        }
    }

    /// Roles (users) or scopes (API keys).
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        match self {
            Self::User { roles, .. } => roles.iter().map(String::as_str).collect(),
            Self::ApiKey { scopes, .. } => scopes.iter().map(String::as_str).collect(),
            Self::Anonymous | Self::Service { .. } => Vec::new(),
        }
    }

    /// Returns true if the identity carries the role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles().contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_default_and_unauthenticated() {
        let identity = CallerIdentity::default();
        assert_eq!(identity, CallerIdentity::Anonymous);
        assert!(!identity.is_authenticated());
        assert_eq!(identity.log_id(), "anonymous");
        assert!(identity.roles().is_empty());
    }

    #[test]
    fn test_user_roles() {
        let identity = CallerIdentity::user("42").with_roles(["editor", "viewer"]);
        assert!(identity.is_authenticated());
        assert!(identity.has_role("editor"));
        assert!(!identity.has_role("admin"));
        assert_eq!(identity.log_id(), "user:42");
    }

    #[test]
    fn test_api_key_scopes() {
        let identity = CallerIdentity::api_key("k1").with_roles(["read"]);
        assert_eq!(identity.roles(), vec!["read"]);
        assert_eq!(identity.log_id(), "apikey:k1");
    }

    #[test]
    fn test_service_ignores_roles() {
        let identity = CallerIdentity::service("billing").with_roles(["x"]);
        assert!(identity.roles().is_empty());
        assert_eq!(identity.log_id(), "service:billing");
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_value(CallerIdentity::user("7")).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["user_id"], "7");
    }
}
