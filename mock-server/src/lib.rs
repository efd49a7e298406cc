use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, RawQuery},
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, Method, StatusCode,
    },
    response::{AppendHeaders, IntoResponse, Redirect},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// PNG signature followed by an IHDR chunk header; enough to look like an image.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
];
pub const MP4_BYTES: &[u8] = &[
    0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70, 0x6d, 0x70, 0x34, 0x32,
];
pub const OCTET_BYTES: &[u8] = &[0x7b, 0x00, 0xff, 0x7d];
pub const PLAIN_TEXT: &str = "plain text, not json";

/// What `/echo` saw of the request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/delay/{ms}", get(delay))
        .route("/image", get(image))
        .route("/video", get(video))
        .route("/octet", get(octet))
        .route("/text", get(text))
        .route("/redirect", get(redirect))
        .route("/multi-header", get(multi_header))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, RawQuery(query): RawQuery, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    tracing::debug!(%method, ?query, "echo");
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(serde_json::json!({ "code": code })))
}

async fn delay(Path(ms): Path<u64>) -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(serde_json::json!({ "delayed_ms": ms }))
}

async fn image() -> impl IntoResponse {
    ([(CONTENT_TYPE, "image/png")], PNG_BYTES)
}

async fn video() -> impl IntoResponse {
    ([(CONTENT_TYPE, "video/mp4")], MP4_BYTES)
}

async fn octet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/octet-stream")], OCTET_BYTES)
}

async fn text() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], PLAIN_TEXT)
}

async fn redirect() -> Redirect {
    Redirect::temporary("/echo")
}

async fn multi_header() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, "session=abc"), (SET_COOKIE, "theme=dark")]),
        Json(serde_json::json!({ "cookies": 2 })),
    )
}
