use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use index::VectorIndex;
use matcher::Searcher;
use semantic::{MultiModalEncoder, StubImageEmbedder, StubTextEmbedder};
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use store::{InMemoryStore, Restaurant, VibeMention};
use tower::ServiceExt;

const TEXT_DIM: usize = 16;
const IMAGE_DIM: usize = 8;
const NEIGHBORHOODS: [&str; 3] = ["East Village", "Lower East Side", "SoHo"];

fn app() -> Router {
    let encoder = MultiModalEncoder::new(
        Arc::new(StubTextEmbedder::new(TEXT_DIM)),
        Some(Arc::new(StubImageEmbedder::new(IMAGE_DIM))),
        IMAGE_DIM,
    )
    .unwrap();

    let store = InMemoryStore::new();
    let mut entries = Vec::new();
    for id in 1..=30i64 {
        let vibe = if id % 2 == 0 { "cozy" } else { "lively" };
        store
            .insert(
                Restaurant::new(id, format!("Restaurant {id}"))
                    .with_neighborhood(NEIGHBORHOODS[id as usize % 3])
                    .with_price_level(id % 4 + 1)
                    .with_rating(3.0 + (id % 20) as f64 / 10.0)
                    .with_vibes(vec![VibeMention::new(vibe, id)]),
            )
            .unwrap();
        let vector = encoder
            .encode(&format!("restaurant {id}"), None)
            .unwrap()
            .into_inner();
        entries.push((id, vector));
    }
    let index = VectorIndex::from_entries(TEXT_DIM + IMAGE_DIM, entries).unwrap();
    let searcher = Searcher::new(encoder, Arc::new(index), Arc::new(store)).unwrap();

    build_router(Arc::new(ServerState::new(ServerConfig::default(), searcher)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 7) as u8, (y * 9) as u8, 128]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn multipart_request(text_fields: &[(&str, &str)], image: Option<&[u8]>) -> Request<Body> {
    let boundary = "vibecheck-test-boundary";
    let mut body = Vec::new();
    for (name, value) in text_fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"q.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/search")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_and_readiness() {
    let (status, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(app(), get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["index"]["entries"], 30);
    assert_eq!(body["index"]["dimension"], 24);
    assert_eq!(body["encoder"]["image_search"], true);
}

#[tokio::test]
async fn json_search_filters_by_neighborhood() {
    let (status, body) = send(
        app(),
        json_post(
            "/api/search",
            json!({"query": "cheap ramen in the east village", "k": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert!(results.len() <= 5);
    for hit in results {
        assert_eq!(hit["neighborhood"], "East Village");
        assert!(hit["similarity_score"].is_number());
        assert!(hit["id"].is_i64());
    }
}

#[tokio::test]
async fn json_search_defaults_to_twenty_and_applies_price() {
    let (status, body) = send(app(), json_post("/api/search", json!({"query": "dinner"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 20);

    let (status, body) = send(
        app(),
        json_post("/api/search", json!({"query": "dinner", "k": 4, "price_level": [1, 2]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for hit in body["results"].as_array().unwrap() {
        let level = hit["price_level"].as_i64().unwrap();
        assert!(level == 1 || level == 2);
    }
}

#[tokio::test]
async fn missing_query_is_rejected() {
    let (status, body) = send(app(), json_post("/api/search", json!({"k": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Please provide text or image query");

    let (status, _) = send(app(), json_post("/api/search", json!({"query": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app(), json_post("/api/search", json!({"query": "x", "k": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app(),
        json_post("/api/search", json!({"query": "x", "price_level": "cheap"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn multipart_search_with_image() {
    let png = png_bytes();
    let (status, body) = send(
        app(),
        multipart_request(&[("text", "rooftop drinks"), ("top_k", "2")], Some(&png)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (status, body) = send(app(), multipart_request(&[], Some(&png))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn multipart_corrupt_image_degrades_to_text() {
    let (status, body) = send(
        app(),
        multipart_request(&[("text", "brunch"), ("top_k", "3")], Some(b"definitely not a png")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn multipart_validation() {
    let (status, _) = send(app(), multipart_request(&[("top_k", "3")], None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app(),
        multipart_request(&[("text", "ramen"), ("price_level", "1,x")], None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn urlencoded_search() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/search")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("text=late+night+tacos&top_k=3&price_level=2"))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    for hit in body["results"].as_array().unwrap() {
        assert_eq!(hit["price_level"], 2);
    }
}

#[tokio::test]
async fn restaurant_detail() {
    let (status, body) = send(app(), get("/api/restaurant/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Restaurant 7");
    assert_eq!(body["neighborhood"], "Lower East Side");

    let (status, body) = send(app(), get("/api/restaurant/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Restaurant not found");

    let (status, _) = send(app(), get("/api/restaurant/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vibe_stats_and_alias() {
    let (status, body) = send(app(), get("/api/vibe-stats")).await;
    assert_eq!(status, StatusCode::OK);
    let vibes = body["vibes"].as_array().unwrap();
    assert_eq!(vibes.len(), 2);
    // Even ids (2..=30) mention "cozy" id times: 240 vs 225 for "lively".
    assert_eq!(vibes[0]["name"], "cozy");
    assert_eq!(vibes[0]["count"], 240);
    assert_eq!(vibes[0]["restaurants"].as_array().unwrap().len(), 5);
    assert_eq!(vibes[0]["restaurants"][0]["id"], 30);

    let (status, alias) = send(app(), get("/api/top-vibes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alias, body);
}

#[tokio::test]
async fn unknown_route_and_request_id() {
    let (status, body) = send(app(), get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let response = app().oneshot(get("/health")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
