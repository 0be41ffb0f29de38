//! In-process Webdis-compatible server for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::{CacheStore, HttpStore, HttpStoreConfig};

/// Raw key/value contents of a fake server.
pub(crate) type Shared = Arc<Mutex<HashMap<String, String>>>;

async fn ping() -> Json<Value> {
    Json(json!({ "PING": [true, "PONG"] }))
}

async fn get_key(State(data): State<Shared>, Path(key): Path<String>) -> Json<Value> {
    let value = data.lock().unwrap().get(&key).cloned();
    Json(json!({ "GET": value }))
}

async fn set_key(State(data): State<Shared>, Path(key): Path<String>, body: String) -> Json<Value> {
    data.lock().unwrap().insert(key, body);
    Json(json!({ "SET": [true, "OK"] }))
}

async fn keys(State(data): State<Shared>, Path(pattern): Path<String>) -> Json<Value> {
    let prefix = pattern.trim_end_matches('*').replace('\\', "");
    let keys: Vec<String> = data
        .lock()
        .unwrap()
        .keys()
        .filter(|k| k.starts_with(&prefix))
        .cloned()
        .collect();
    Json(json!({ "KEYS": keys }))
}

async fn del(State(data): State<Shared>, Path(keys): Path<String>) -> Json<Value> {
    let mut data = data.lock().unwrap();
    let removed = keys
        .trim_start_matches('/')
        .split('/')
        .filter(|k| data.remove(*k).is_some())
        .count();
    Json(json!({ "DEL": removed }))
}

/// Serve `data` on an ephemeral port and return the base URL.
pub(crate) async fn serve(data: Shared) -> String {
    let app = Router::new()
        .route("/PING", get(ping))
        .route("/GET/:key", get(get_key))
        .route("/SET/:key", put(set_key))
        .route("/KEYS/:pattern", get(keys))
        .route("/DEL/*keys", get(del))
        .with_state(data);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// An initialized [`HttpStore`] talking to a fresh fake server.
pub(crate) async fn connected_store() -> (HttpStore, Shared) {
    let data: Shared = Arc::default();
    let url = serve(data.clone()).await;
    let store = HttpStore::new(HttpStoreConfig::new(url).with_delete_batch(2)).unwrap();
    store.init().await.unwrap();
    (store, data)
}
