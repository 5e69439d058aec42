//! Object-level permission checks against stored rows.

use std::sync::Arc;

use hermes_authz::{
    check_permissions, AuthzError, FnPermission, LoginRequired, Permission, PermissionContext,
};
use hermes_core::{CallerIdentity, HttpErrorKind};
use hermes_schema::{MemoryStore, ModelDescriptor, ModelField, StorageKind, Value};
use indexmap::IndexMap;

fn store() -> MemoryStore {
    let descriptor = ModelDescriptor::new("Document")
        .field(ModelField::new("id", StorageKind::Auto))
        .field(ModelField::new("public", StorageKind::Boolean));
    let store = MemoryStore::new(descriptor);
    for public in [true, false] {
        let mut values = IndexMap::new();
        values.insert("public".to_string(), Value::Bool(public));
        store.model().source().insert(values).unwrap();
    }
    store
}

fn public_only() -> Arc<dyn Permission> {
    Arc::new(FnPermission::new("PublicOnly", |ctx| {
        ctx.object_attribute("public").and_then(|v| v.as_bool()) == Some(true)
    }))
}

#[test]
fn test_row_visibility() {
    let store = store();
    let caller = CallerIdentity::user("reader");
    let permissions = vec![public_only()];

    let rows = store.model().objects().fetch().unwrap();
    let decisions: Vec<bool> = rows
        .into_iter()
        .map(|row| {
            let object = row.into_value();
            let ctx = PermissionContext::new(&caller, "/documents/get").with_object(&object);
            check_permissions(&permissions, &ctx).is_ok()
        })
        .collect();

    assert_eq!(decisions, vec![true, false]);
}

#[test]
fn test_section_check_runs_before_object_check() {
    let store = store();
    let object = store.model().objects().first().unwrap().unwrap().into_value();
    let permissions: Vec<Arc<dyn Permission>> = vec![Arc::new(LoginRequired), public_only()];

    let anonymous = CallerIdentity::Anonymous;
    let ctx = PermissionContext::new(&anonymous, "/documents/get").with_object(&object);
    let err = check_permissions(&permissions, &ctx).unwrap_err();

    assert!(matches!(err, AuthzError::AuthRequired { .. }));
    assert_eq!(err.to_http_error().kind(), HttpErrorKind::AuthRequired);
}
