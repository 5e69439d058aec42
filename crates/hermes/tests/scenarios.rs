//! End-to-end scenarios through an assembled application.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use hermes::prelude::*;
use hermes::schema::FixedClock;
use hermes_test::TestClient;
use http::StatusCode;
use indexmap::IndexMap;
use serde_json::json;

const RESTRICTED: &str = "without_permissions";

fn some_store() -> MemoryStore {
    MemoryStore::with_clock(
        ModelDescriptor::new("SomeModel")
            .field(ModelField::new("id", StorageKind::Auto))
            .field(ModelField::new("i", StorageKind::Integer))
            .field(ModelField::new("f", StorageKind::Float))
            .field(ModelField::new("nullable", StorageKind::Char).null().blank().max_length(64))
            .field(ModelField::new("created", StorageKind::DateTime).auto_now_add()),
        FixedClock(Utc.with_ymd_and_hms(2020, 2, 28, 16, 0, 0).unwrap()),
    )
}

fn insert(store: &MemoryStore, id: i64, nullable: &str) {
    let mut values = IndexMap::new();
    values.insert("id".to_string(), Value::from(id));
    values.insert("i".to_string(), Value::from(id * 10));
    values.insert("f".to_string(), Value::from(1.5));
    values.insert("nullable".to_string(), Value::from(nullable));
    store.model().source().insert(values).unwrap();
}

fn hide_restricted() -> FnPermission {
    FnPermission::new("HideRestricted", |ctx| {
        ctx.object_attribute("nullable")
            .map_or(true, |v| v.as_str() != Some(RESTRICTED))
    })
}

fn divide() -> ApiView {
    ApiView::define(
        "Divide",
        MetaLayer::new()
            .method(HttpMethod::Get)
            .tags(["math"])
            .set("query_form", Form::new("DivideQuery").with_field("by", FormField::integer())),
        |ctx| {
            let by = ctx.request_query().and_then(|q| q.get_i64("by")).unwrap_or_default();
            Ok(Value::from(100 / by))
        },
    )
    .unwrap()
}

fn broken() -> ApiView {
    ApiView::define(
        "Broken",
        MetaLayer::new().method(HttpMethod::Get).tags(["math"]),
        |_| Err(ApiError::fault(anyhow::anyhow!("storage unavailable"))),
    )
    .unwrap()
}

fn app(store: &MemoryStore, debug: bool) -> App {
    let model = store.model();
    let serializer = ModelSerializer::new("SomeSerializer")
        .model(model.descriptor().clone())
        .build()
        .unwrap();
    let model_form = ModelForm::builder("SomeForm", model.clone()).build().unwrap();
    let layer = || {
        MetaLayer::new()
            .tags(["some"])
            .set("model", model.clone())
            .set("serializer", serializer.clone())
    };

    let settings = Settings {
        debug,
        ..Settings::default()
    };

    AppBuilder::new(settings)
        .log_config(LogConfig::disabled())
        .endpoint(
            "/some/create",
            CreateView::define("CreateSome", layer().set("model_form", model_form)).unwrap(),
        )
        .unwrap()
        .endpoint(
            "/some/get",
            GetView::define("GetSome", layer()).unwrap().object_permission(hide_restricted()),
        )
        .unwrap()
        .endpoint(
            "/some/list",
            ListView::define("ListSome", layer().set("paginator", FromIdPaginator::asc())).unwrap(),
        )
        .unwrap()
        .endpoint("/divide", divide())
        .unwrap()
        .endpoint("/broken", broken())
        .unwrap()
        .build()
        .unwrap()
}

fn client(app: App) -> TestClient {
    let app = Arc::new(app);
    TestClient::new(move |request| app.handle(request).expect("no fault in production mode"))
}

#[test]
fn test_missing_body_fields_are_form_errors() {
    let store = some_store();
    let client = client(app(&store, false));

    client
        .post("/some/create")
        .json(&json!({"nullable": "x"}))
        .send()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_json(&json!({
            "status": "bad_request",
            "message": "Bad request",
            "data": {},
            "field_problems": {
                "i": ["This field is required."],
                "f": ["This field is required."]
            }
        }));
    assert!(store.is_empty());
}

#[test]
fn test_created_object_is_serialized() {
    let store = some_store();
    let client = client(app(&store, false));

    let response = client
        .post("/some/create")
        .json(&json!({"i": 7, "f": 0.5}))
        .send();
    response.assert_status(StatusCode::OK).assert_envelope_status("ok");
    let data = response.data().unwrap();
    assert_eq!(data["i"], 7);
    assert_eq!(data["created"], "2020-02-28T16:00:00+00:00");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_unknown_object_is_not_found() {
    let store = some_store();
    let client = client(app(&store, false));

    client
        .get("/some/get")
        .query("id", 42)
        .send()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_json(&json!({"status": "not_found", "message": "Not Found", "data": {}}));
}

#[test]
fn test_object_permission_is_forbidden() {
    let store = some_store();
    insert(&store, 1, "visible");
    insert(&store, 2, RESTRICTED);
    let client = client(app(&store, false));

    client
        .get("/some/get")
        .query("id", 1)
        .send()
        .assert_status(StatusCode::OK);

    client
        .get("/some/get")
        .query("id", 2)
        .send()
        .assert_status(StatusCode::FORBIDDEN)
        .assert_json(&json!({"status": "forbidden", "message": "Forbidden", "data": {}}));
}

#[test]
fn test_cursor_pagination_skips_from_id() {
    let store = some_store();
    insert(&store, 2, "a");
    insert(&store, 3, "b");
    let client = client(app(&store, false));

    let data = client.get("/some/list").query("from_id", 2).send().data().unwrap();
    let ids: Vec<i64> = data
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|row| row["id"].as_i64())
        .collect();
    assert_eq!(ids, [3]);
}

#[test]
fn test_fault_is_masked_in_production() {
    let store = some_store();
    let client = client(app(&store, false));
    let internal = json!({"status": "internal_error", "message": "Internal server error", "data": {}});

    client
        .get("/divide")
        .query("by", 0)
        .send()
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json(&internal);

    client
        .get("/broken")
        .send()
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json(&internal);

    let data = client.get("/divide").query("by", 4).send().data().unwrap();
    assert_eq!(data, 25);
}

#[test]
fn test_fault_propagates_in_debug() {
    let store = some_store();
    let app = app(&store, true);

    let request = ApiRequest::new(http::Method::GET, "/divide").query_param("by", "0");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| app.handle(request)));
    assert!(outcome.is_err());

    let err = app.handle(ApiRequest::new(http::Method::GET, "/broken")).unwrap_err();
    assert_eq!(err.to_string(), "storage unavailable");
}

#[test]
fn test_unknown_path_and_wrong_method() {
    let store = some_store();
    let client = client(app(&store, false));

    client
        .get("/nowhere")
        .send()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_envelope_status("not_found");

    client
        .post("/some/get")
        .send()
        .assert_status(StatusCode::METHOD_NOT_ALLOWED)
        .assert_envelope_status("not_implemented");
}
