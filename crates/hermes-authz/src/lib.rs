//! # Hermes Authz
//!
//! Permission checks consulted by the request pipeline.
//!
//! Permissions come in two granularities:
//!
//! - **section** permissions gate the whole endpoint before any input is
//!   parsed (e.g. [`LoginRequired`], failing with `AuthRequired`);
//! - **object** permissions run once an endpoint has resolved a specific
//!   object (failing with `Forbidden`).
//!
//! ```text
//!   CallerIdentity ─┐
//!   path ───────────┼──▶ PermissionContext ──▶ Permission::evaluate ──▶ PolicyDecision
//!   object? ────────┘                                                    │ deny
//!                                                                        ▼
//!                                                              AuthzError ──▶ HttpError
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-authz/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod decision;
mod error;
mod permission;

pub use decision::PolicyDecision;
pub use error::{AuthzError, AuthzResult};
pub use permission::{
    check_permissions, AllowAll, DenyAll, FnPermission, LoginRequired, Permission,
    PermissionContext, RoleRequired,
};
