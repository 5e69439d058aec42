//! Permission decisions.

use std::fmt;

/// Outcome of evaluating one permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    allowed: bool,
    permission: String,
    reason: Option<String>,
}

impl PolicyDecision {
    /// The permission granted access.
    #[must_use]
    pub fn allow(permission: impl Into<String>) -> Self {
        Self {
            allowed: true,
            permission: permission.into(),
            reason: None,
        }
    }

    /// The permission refused access.
    #[must_use]
    pub fn deny(permission: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            permission: permission.into(),
            reason: Some(reason.into()),
        }
    }

    /// Builds a decision from a predicate result.
    #[must_use]
    pub fn from_bool(permission: impl Into<String>, allowed: bool) -> Self {
        if allowed {
            Self::allow(permission)
        } else {
            Self::deny(permission, "permission predicate returned false")
        }
    }

    /// Returns true if access is granted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Name of the permission that decided.
    #[must_use]
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Why access was refused.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl fmt::Display for PolicyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            None => write!(f, "{}: allow", self.permission),
            Some(reason) => write!(f, "{}: deny ({reason})", self.permission),
        }
    }
}
