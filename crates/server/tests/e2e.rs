use std::net::SocketAddr;

use configs::StoreConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};
use server::{build_router, AppOptions, AppState};
use service::Services;
use tokio::net::TcpListener;

struct TestApp {
    base_url: String,
}

async fn start_server(uri: &str) -> anyhow::Result<TestApp> {
    let services = Services::connect(&StoreConfig::with_uri(uri)).await?;
    let app = build_router(AppState::from(services), AppOptions { testing: true });
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {e}");
        }
    });
    Ok(TestApp { base_url: format!("http://{}:{}", addr.ip(), addr.port()) })
}

#[tokio::test]
async fn e2e_pets_and_counters_over_http() -> anyhow::Result<()> {
    let tmp = std::env::temp_dir().join(format!("petstore_e2e_{}.json", uuid::Uuid::new_v4()));
    let file_uri = format!("file://{}", tmp.display());

    for uri in ["memory://", "sqlite::memory:", file_uri.as_str()] {
        let app = start_server(uri).await?;
        let client = reqwest::Client::new();

        let res = client
            .post(format!("{}/pets", app.base_url))
            .json(&json!({"name": "fido", "category": "dog", "available": true}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        let location = res
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .expect("location header");
        let created: Value = res.json().await?;
        assert_eq!(created["gender"], "Unknown");

        // the Location header is directly fetchable
        let fetched: Value = client.get(&location).send().await?.json().await?;
        assert_eq!(fetched, created);

        let res = client.post(format!("{}/counters/visits", app.base_url)).send().await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = client.put(format!("{}/counters/visits", app.base_url)).send().await?;
        let body: Value = res.json().await?;
        assert_eq!(body["counter"], 1);

        let res = client
            .post(format!("{}/pets", app.base_url))
            .header("content-type", "text/plain")
            .body("name=fido")
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        assert_eq!(client.delete(format!("{}/pets", app.base_url)).send().await?.status(), StatusCode::NO_CONTENT);
        assert_eq!(client.delete(format!("{}/counters", app.base_url)).send().await?.status(), StatusCode::NO_CONTENT);
    }

    let _ = tokio::fs::remove_file(&tmp).await;
    Ok(())
}
