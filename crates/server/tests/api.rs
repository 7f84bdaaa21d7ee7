use axum::{
    body::{to_bytes, Body},
    http::{
        header::{ALLOW, CONTENT_TYPE, HOST, LOCATION},
        HeaderMap, Method, Request, StatusCode,
    },
    Router,
};
use configs::StoreConfig;
use serde_json::{json, Value};
use server::{build_router, AppOptions, AppState};
use service::Services;
use tower::ServiceExt;

const STORES: [&str; 2] = ["memory://", "sqlite::memory:"];

async fn app(uri: &str, testing: bool) -> anyhow::Result<Router> {
    let services = Services::connect(&StoreConfig::with_uri(uri)).await?;
    Ok(build_router(AppState::from(services), AppOptions { testing }))
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn send_raw(app: &Router, method: Method, uri: &str, content_type: Option<&str>, body: &str) -> anyhow::Result<Reply> {
    let mut req = Request::builder().method(method).uri(uri).header(HOST, "example.test");
    if let Some(ct) = content_type {
        req = req.header(CONTENT_TYPE, ct);
    }
    let res = app.clone().oneshot(req.body(Body::from(body.to_string()))?).await?;
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok(Reply { status, headers, body })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<Reply> {
    match body {
        Some(v) => send_raw(app, method, uri, Some("application/json"), &v.to_string()).await,
        None => send_raw(app, method, uri, None, "").await,
    }
}

fn fido() -> Value {
    json!({"name": "fido", "category": "dog", "available": true, "gender": "Male"})
}

fn assert_error_body(r: &Reply, code: u16) {
    assert_eq!(r.status.as_u16(), code, "body: {}", r.body);
    assert_eq!(r.body["status"], code);
    assert!(r.body["error"].is_string());
    assert!(r.body["message"].is_string());
}

#[tokio::test]
async fn index_describes_the_service() -> anyhow::Result<()> {
    let app = app("memory://", false).await?;
    let r = send(&app, Method::GET, "/", None).await?;
    assert_eq!(r.status, StatusCode::OK);
    assert_eq!(r.body["name"], "Pet Demo REST API Service");
    assert_eq!(r.body["paths"][0], "http://example.test/pets");

    let r = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(r.body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn pet_round_trip() -> anyhow::Result<()> {
    for uri in STORES {
        let app = app(uri, false).await?;
        let r = send(&app, Method::POST, "/pets", Some(fido())).await?;
        assert_eq!(r.status, StatusCode::CREATED);
        let id = r.body["id"].as_i64().expect("id");
        assert_eq!(r.headers[LOCATION], format!("http://example.test/pets/{id}").as_str());

        let got = send(&app, Method::GET, &format!("/pets/{id}"), None).await?;
        assert_eq!(got.status, StatusCode::OK);
        assert_eq!(got.body, r.body);
        assert_eq!(got.body["gender"], "Male");
        assert_eq!(got.body["available"], true);
    }
    Ok(())
}

#[tokio::test]
async fn pet_update_keeps_identity() -> anyhow::Result<()> {
    for uri in STORES {
        let app = app(uri, false).await?;
        let id = send(&app, Method::POST, "/pets", Some(fido())).await?.body["id"].clone();
        let mut body = fido();
        body["id"] = json!(12345);
        body["category"] = json!("wolf");
        let r = send(&app, Method::PUT, &format!("/pets/{id}"), Some(body)).await?;
        assert_eq!(r.status, StatusCode::OK);
        assert_eq!(r.body["id"], id);
        assert_eq!(r.body["category"], "wolf");
    }
    Ok(())
}

#[tokio::test]
async fn invalid_pets_are_rejected_with_field_names() -> anyhow::Result<()> {
    for uri in STORES {
        let app = app(uri, false).await?;
        let r = send(&app, Method::POST, "/pets", Some(json!({"category": "dog", "available": true}))).await?;
        assert_error_body(&r, 400);
        assert!(r.body["message"].as_str().unwrap_or_default().contains("name"));

        let mut body = fido();
        body["available"] = json!("true");
        let r = send(&app, Method::POST, "/pets", Some(body)).await?;
        assert_error_body(&r, 400);
        assert!(r.body["message"].as_str().unwrap_or_default().contains("available"));

        let mut body = fido();
        body["gender"] = json!("male");
        assert_error_body(&send(&app, Method::POST, "/pets", Some(body)).await?, 400);

        // nothing was stored
        let r = send(&app, Method::GET, "/pets", None).await?;
        assert_eq!(r.body, json!([]));
    }
    Ok(())
}

#[tokio::test]
async fn content_type_and_json_are_enforced() -> anyhow::Result<()> {
    let app = app("memory://", false).await?;
    let body = fido().to_string();
    let r = send_raw(&app, Method::POST, "/pets", Some("text/plain"), &body).await?;
    assert_error_body(&r, 415);
    let r = send_raw(&app, Method::POST, "/pets", None, &body).await?;
    assert_error_body(&r, 415);
    let r = send_raw(&app, Method::POST, "/pets", Some("application/json; charset=utf-8"), &body).await?;
    assert_eq!(r.status, StatusCode::CREATED);
    let r = send_raw(&app, Method::POST, "/pets", Some("application/json"), "{not json").await?;
    assert_error_body(&r, 400);
    Ok(())
}

#[tokio::test]
async fn missing_resources_are_404() -> anyhow::Result<()> {
    for uri in STORES {
        let app = app(uri, false).await?;
        assert_error_body(&send(&app, Method::PUT, "/pets/999999", Some(fido())).await?, 404);
        assert_error_body(&send(&app, Method::GET, "/pets/999999", None).await?, 404);
        assert_error_body(&send(&app, Method::PUT, "/counters/bar", None).await?, 404);
        assert_error_body(&send(&app, Method::PUT, "/counters/bar/reset", None).await?, 404);
        assert_error_body(&send(&app, Method::GET, "/counters/bar", None).await?, 404);
        assert_error_body(&send(&app, Method::GET, "/no/such/route", None).await?, 404);
    }
    Ok(())
}

#[tokio::test]
async fn deletes_are_idempotent() -> anyhow::Result<()> {
    for uri in STORES {
        let app = app(uri, false).await?;
        let id = send(&app, Method::POST, "/pets", Some(fido())).await?.body["id"].clone();
        let path = format!("/pets/{id}");
        assert_eq!(send(&app, Method::DELETE, &path, None).await?.status, StatusCode::NO_CONTENT);
        assert_eq!(send(&app, Method::DELETE, &path, None).await?.status, StatusCode::NO_CONTENT);
        assert_error_body(&send(&app, Method::GET, &path, None).await?, 404);

        assert_eq!(send(&app, Method::DELETE, "/counters/ghost", None).await?.status, StatusCode::NO_CONTENT);
    }
    Ok(())
}

#[tokio::test]
async fn counter_lifecycle() -> anyhow::Result<()> {
    for uri in STORES {
        let app = app(uri, false).await?;
        let r = send(&app, Method::POST, "/counters/foo", None).await?;
        assert_eq!(r.status, StatusCode::CREATED);
        assert_eq!(r.body, json!({"name": "foo", "counter": 0}));
        assert_eq!(r.headers[LOCATION], "http://example.test/counters/foo");

        assert_error_body(&send(&app, Method::POST, "/counters/foo", None).await?, 409);

        let mut last = Value::Null;
        for _ in 0..3 {
            let r = send(&app, Method::PUT, "/counters/foo", None).await?;
            assert_eq!(r.status, StatusCode::OK);
            last = r.body;
        }
        assert_eq!(last["counter"], 3);

        let r = send(&app, Method::PUT, "/counters/foo/reset", None).await?;
        assert_eq!(r.body, json!({"name": "foo", "counter": 0}));

        let r = send(&app, Method::GET, "/counters", None).await?;
        assert_eq!(r.body.as_array().map(Vec::len), Some(1));

        assert_eq!(send(&app, Method::DELETE, "/counters/foo", None).await?.status, StatusCode::NO_CONTENT);
        assert_error_body(&send(&app, Method::GET, "/counters/foo", None).await?, 404);
        // a deleted name can be created again
        assert_eq!(send(&app, Method::POST, "/counters/foo", None).await?.status, StatusCode::CREATED);
    }
    Ok(())
}

#[tokio::test]
async fn counter_location_is_percent_encoded() -> anyhow::Result<()> {
    let app = app("memory://", false).await?;
    let r = send(&app, Method::POST, "/counters/a%20b", None).await?;
    assert_eq!(r.status, StatusCode::CREATED);
    assert_eq!(r.body["name"], "a b");
    assert_eq!(r.headers[LOCATION], "http://example.test/counters/a%20b");

    let r = send(&app, Method::POST, "/counters/caf%C3%A9%25", None).await?;
    assert_eq!(r.body["name"], "café%");
    assert_eq!(r.headers[LOCATION], "http://example.test/counters/caf%C3%A9%25");

    let followed = send(&app, Method::GET, "/counters/a%20b", None).await?;
    assert_eq!(followed.body["name"], "a b");
    Ok(())
}

#[tokio::test]
async fn wrong_method_is_405_with_allow() -> anyhow::Result<()> {
    let app = app("memory://", false).await?;
    let r = send(&app, Method::GET, "/counters/foo/reset", None).await?;
    assert_error_body(&r, 405);
    assert!(r.headers.contains_key(ALLOW));

    // remove-all is only mounted in testing mode
    assert_error_body(&send(&app, Method::DELETE, "/pets", None).await?, 405);
    assert_error_body(&send(&app, Method::DELETE, "/counters", None).await?, 405);
    Ok(())
}

#[tokio::test]
async fn testing_mode_removes_everything() -> anyhow::Result<()> {
    for uri in STORES {
        let app = app(uri, true).await?;
        send(&app, Method::POST, "/pets", Some(fido())).await?;
        send(&app, Method::POST, "/counters/foo", None).await?;
        assert_eq!(send(&app, Method::DELETE, "/pets", None).await?.status, StatusCode::NO_CONTENT);
        assert_eq!(send(&app, Method::DELETE, "/counters", None).await?.status, StatusCode::NO_CONTENT);
        assert_eq!(send(&app, Method::GET, "/pets", None).await?.body, json!([]));
        assert_eq!(send(&app, Method::GET, "/counters", None).await?.body, json!([]));
    }
    Ok(())
}

#[tokio::test]
async fn list_filters() -> anyhow::Result<()> {
    for uri in STORES {
        let app = app(uri, false).await?;
        send(&app, Method::POST, "/pets", Some(fido())).await?;
        send(&app, Method::POST, "/pets", Some(json!({"name": "kitty", "category": "cat", "available": false}))).await?;

        let r = send(&app, Method::GET, "/pets?category=cat", None).await?;
        assert_eq!(r.body.as_array().map(Vec::len), Some(1));
        assert_eq!(r.body[0]["gender"], "Unknown");

        let r = send(&app, Method::GET, "/pets?available=true&gender=Male", None).await?;
        assert_eq!(r.body[0]["name"], "fido");

        let r = send(&app, Method::GET, "/pets?name=nobody", None).await?;
        assert_eq!(r.body, json!([]));

        assert_error_body(&send(&app, Method::GET, "/pets?available=maybe", None).await?, 400);
    }
    Ok(())
}

#[tokio::test]
async fn bad_path_values_are_400() -> anyhow::Result<()> {
    let app = app("memory://", false).await?;
    assert_error_body(&send(&app, Method::GET, "/pets/abc", None).await?, 400);
    assert_error_body(&send(&app, Method::POST, "/counters/a*b", None).await?, 400);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let app = app("memory://", false).await?;
    let r = send(&app, Method::GET, "/openapi.json", None).await?;
    assert_eq!(r.status, StatusCode::OK);
    assert!(r.body["paths"]["/pets/{id}"].is_object());
    Ok(())
}
