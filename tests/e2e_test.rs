/// E2E test against a real server bound to an ephemeral loopback port
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use tuiter::config::Config;
use tuiter::db;
use tuiter::routes;
use tuiter::state::AppState;

/// Serve the app in the background and return its base URL.
async fn spawn_server(temp: &TempDir) -> Result<String, Box<dyn std::error::Error>> {
    let pool = db::create_pool(&temp.path().join("e2e.db"))?;
    db::run_migrations(&pool)?;

    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;

    let app = routes::app(AppState::new(pool, config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {e}");
        }
    });

    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn test_session_driven_like_flow() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let base = spawn_server(&temp).await?;
    let client = Client::builder().cookie_store(true).build()?;

    // Sign up; the cookie store keeps the session from here on
    let response = client
        .post(format!("{base}/api/auth/signup"))
        .json(&json!({ "username": "alice", "password": "secret", "email": "a@example.com" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.cookies().any(|c| c.name() == "tuiter_session"));
    let alice: Value = response.json().await?;

    let profile: Value = client
        .get(format!("{base}/api/auth/profile"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(profile["id"], alice["id"]);
    assert_eq!(profile["email"], "a@example.com");

    let tuit: Value = client
        .post(format!("{base}/api/users/me/tuits"))
        .json(&json!({ "tuit": "first tuit" }))
        .send()
        .await?
        .json()
        .await?;
    let tid = tuit["id"].as_str().ok_or("tuit id missing")?;
    assert_eq!(tuit["postedBy"]["username"], "alice");

    let toggled: Value = client
        .put(format!("{base}/api/users/me/likes/{tid}"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(toggled["current"], "liked");
    assert_eq!(toggled["stats"]["likes"], 1);

    let toggled: Value = client
        .put(format!("{base}/api/users/me/dislikes/{tid}"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(toggled["current"], "disliked");

    let count: Value = client
        .get(format!("{base}/api/tuits/{tid}/dislikes/count"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(count, json!({ "dislikes": 1 }));

    let missing = client
        .put(format!("{base}/api/users/me/likes/doesnotexist"))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let logout = client.post(format!("{base}/api/auth/logout")).send().await?;
    assert_eq!(logout.status(), StatusCode::OK);

    let after = client.get(format!("{base}/api/auth/profile")).send().await?;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
