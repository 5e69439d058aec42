//! Permission capability and built-in permissions.
//!
//! A [`Permission`] is a plain predicate over the caller and, for
//! object-level checks, the object an endpoint resolved. Endpoints hold two
//! lists: section permissions, checked before any input is parsed, and
//! object permissions, checked once a specific object is known.

use std::fmt;
use std::sync::Arc;

use hermes_core::CallerIdentity;
use hermes_schema::{ResolverChain, Value};
use tracing::debug;

use crate::decision::PolicyDecision;
use crate::error::{AuthzError, AuthzResult};

/// What a permission can look at.
#[derive(Debug, Clone, Copy)]
pub struct PermissionContext<'a> {
    identity: &'a CallerIdentity,
    path: &'a str,
    object: Option<&'a Value>,
}

impl<'a> PermissionContext<'a> {
    /// Context for a section-level check.
    #[must_use]
    pub const fn new(identity: &'a CallerIdentity, path: &'a str) -> Self {
        Self {
            identity,
            path,
            object: None,
        }
    }

    /// Adds the resolved object for an object-level check.
    #[must_use]
    pub const fn with_object(mut self, object: &'a Value) -> Self {
        self.object = Some(object);
        self
    }

    /// The calling identity.
    #[must_use]
    pub const fn identity(&self) -> &'a CallerIdentity {
        self.identity
    }

    /// Endpoint path.
    #[must_use]
    pub const fn path(&self) -> &'a str {
        self.path
    }

    /// The resolved object, if any.
    #[must_use]
    pub const fn object(&self) -> Option<&'a Value> {
        self.object
    }

    /// Reads an attribute of the resolved object.
    #[must_use]
    pub fn object_attribute(&self, name: &str) -> Option<Value> {
        self.object
            .and_then(|object| ResolverChain::default().resolve(object, name))
    }
}

/// A permission predicate.
pub trait Permission: fmt::Debug + Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns true if access is granted.
    fn has_permissions(&self, ctx: &PermissionContext<'_>) -> bool;

    /// Evaluates the predicate into a decision.
    fn evaluate(&self, ctx: &PermissionContext<'_>) -> PolicyDecision {
        PolicyDecision::from_bool(self.name(), self.has_permissions(ctx))
    }

    /// Error raised when the decision denies access.
    fn denial(&self, decision: &PolicyDecision) -> AuthzError {
        AuthzError::forbidden(
            decision.permission(),
            decision.reason().unwrap_or("access denied"),
        )
    }
}

/// Runs every permission in order; the first denial wins.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use hermes_authz::{check_permissions, LoginRequired, Permission, PermissionContext};
/// use hermes_core::CallerIdentity;
///
/// let permissions: Vec<Arc<dyn Permission>> = vec![Arc::new(LoginRequired)];
///
/// let anonymous = CallerIdentity::Anonymous;
/// let ctx = PermissionContext::new(&anonymous, "/notes/list");
/// assert!(check_permissions(&permissions, &ctx).is_err());
///
/// let user = CallerIdentity::user("u-1");
/// let ctx = PermissionContext::new(&user, "/notes/list");
/// assert!(check_permissions(&permissions, &ctx).is_ok());
/// ```
pub fn check_permissions(
    permissions: &[Arc<dyn Permission>],
    ctx: &PermissionContext<'_>,
) -> AuthzResult<()> {
    for permission in permissions {
        let decision = permission.evaluate(ctx);
        if !decision.is_allowed() {
            debug!(
                path = ctx.path(),
                caller = %ctx.identity().log_id(),
                decision = %decision,
                "permission denied"
            );
            return Err(permission.denial(&decision));
        }
    }
    Ok(())
}

/// Grants access unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Permission for AllowAll {
    fn name(&self) -> &str {
        "AllowAll"
    }

    fn has_permissions(&self, _ctx: &PermissionContext<'_>) -> bool {
        true
    }
}

/// Refuses access unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Permission for DenyAll {
    fn name(&self) -> &str {
        "DenyAll"
    }

    fn has_permissions(&self, _ctx: &PermissionContext<'_>) -> bool {
        false
    }
}

/// Requires an authenticated caller. Fails with `AuthRequired`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginRequired;

impl Permission for LoginRequired {
    fn name(&self) -> &str {
        "LoginRequired"
    }

    fn has_permissions(&self, ctx: &PermissionContext<'_>) -> bool {
        ctx.identity().is_authenticated()
    }

    fn denial(&self, decision: &PolicyDecision) -> AuthzError {
        AuthzError::auth_required(decision.permission())
    }
}

/// Requires the caller to carry a role (or scope, for API keys).
#[derive(Debug, Clone)]
pub struct RoleRequired {
    role: String,
}

impl RoleRequired {
    /// Requires `role`.
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl Permission for RoleRequired {
    fn name(&self) -> &str {
        "RoleRequired"
    }

    fn has_permissions(&self, ctx: &PermissionContext<'_>) -> bool {
        ctx.identity().has_role(&self.role)
    }

    fn evaluate(&self, ctx: &PermissionContext<'_>) -> PolicyDecision {
        if self.has_permissions(ctx) {
            PolicyDecision::allow(self.name())
        } else {
            PolicyDecision::deny(self.name(), format!("missing role {}", self.role))
        }
    }
}

/// A permission backed by a closure.
///
/// ```rust
/// use hermes_authz::{FnPermission, Permission, PermissionContext};
/// use hermes_core::CallerIdentity;
/// use hermes_schema::Value;
///
/// let visible = FnPermission::new("Visible", |ctx| {
///     ctx.object_attribute("hidden").and_then(|v| v.as_bool()) != Some(true)
/// });
///
/// let mut row = indexmap::IndexMap::new();
/// row.insert("hidden".to_string(), Value::Bool(true));
/// let object = Value::Map(row);
///
/// let caller = CallerIdentity::Anonymous;
/// let ctx = PermissionContext::new(&caller, "/notes/get").with_object(&object);
/// assert!(!visible.has_permissions(&ctx));
/// ```
#[derive(Clone)]
pub struct FnPermission {
    name: String,
    predicate: Arc<dyn Fn(&PermissionContext<'_>) -> bool + Send + Sync>,
}

impl FnPermission {
    /// Wraps a predicate.
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&PermissionContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for FnPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPermission")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Permission for FnPermission {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permissions(&self, ctx: &PermissionContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn owned_by(owner: &str) -> Value {
        let mut row = IndexMap::new();
        row.insert("owner".to_string(), Value::from(owner));
        Value::Map(row)
    }

    fn owner_only() -> FnPermission {
        FnPermission::new("OwnerOnly", |ctx| match ctx.identity() {
            CallerIdentity::User { user_id, .. } => {
                ctx.object_attribute("owner").and_then(|v| v.as_str().map(str::to_string))
                    == Some(user_id.clone())
            }
            _ => false,
        })
    }

    #[test]
    fn test_allow_and_deny_all() {
        let caller = CallerIdentity::Anonymous;
        let ctx = PermissionContext::new(&caller, "/x");
        assert!(AllowAll.has_permissions(&ctx));
        assert!(!DenyAll.has_permissions(&ctx));
    }

    #[test]
    fn test_login_required_fails_with_auth_required() {
        let caller = CallerIdentity::Anonymous;
        let ctx = PermissionContext::new(&caller, "/x");
        let permissions: Vec<Arc<dyn Permission>> = vec![Arc::new(LoginRequired)];

        let err = check_permissions(&permissions, &ctx).unwrap_err();
        assert_eq!(err, AuthzError::auth_required("LoginRequired"));
    }

    #[test]
    fn test_first_denial_wins() {
        let caller = CallerIdentity::service("cron");
        let ctx = PermissionContext::new(&caller, "/x");
        let permissions: Vec<Arc<dyn Permission>> = vec![
            Arc::new(LoginRequired),
            Arc::new(DenyAll),
            Arc::new(RoleRequired::new("admin")),
        ];

        let err = check_permissions(&permissions, &ctx).unwrap_err();
        assert_eq!(err.permission(), "DenyAll");
    }

    #[test]
    fn test_role_required() {
        let admin = CallerIdentity::user("u-1").with_roles(["admin"]);
        let guest = CallerIdentity::user("u-2");
        let permission = RoleRequired::new("admin");

        assert!(permission.evaluate(&PermissionContext::new(&admin, "/x")).is_allowed());
        let denied = permission.evaluate(&PermissionContext::new(&guest, "/x"));
        assert_eq!(denied.reason(), Some("missing role admin"));
    }

    #[test]
    fn test_object_permission() {
        let object = owned_by("u-1");
        let owner = CallerIdentity::user("u-1");
        let stranger = CallerIdentity::user("u-9");
        let permissions: Vec<Arc<dyn Permission>> = vec![Arc::new(owner_only())];

        let ctx = PermissionContext::new(&owner, "/notes/get").with_object(&object);
        assert!(check_permissions(&permissions, &ctx).is_ok());

        let ctx = PermissionContext::new(&stranger, "/notes/get").with_object(&object);
        let err = check_permissions(&permissions, &ctx).unwrap_err();
        assert_eq!(err.to_http_error().http_code(), 403);
    }

    #[test]
    fn test_object_attribute_without_object() {
        let caller = CallerIdentity::Anonymous;
        let ctx = PermissionContext::new(&caller, "/x");
        assert!(ctx.object().is_none());
        assert!(ctx.object_attribute("owner").is_none());
    }
}
