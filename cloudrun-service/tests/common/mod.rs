#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use cloudrun_service::config::CloudrunConfig;
use cloudrun_service::models::ResponsePart;
use cloudrun_service::services::providers::mock::MockImageProvider;
use cloudrun_service::services::providers::ProviderError;
use cloudrun_service::services::{metrics, InMemoryCounterStore};
use cloudrun_service::startup::{build_router, AppState};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

/// Router over an in-memory counter and a mock image provider.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryCounterStore>,
    pub provider: Arc<MockImageProvider>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_provider(MockImageProvider::new())
    }

    pub fn with_provider(provider: MockImageProvider) -> Self {
        Self::with_config(CloudrunConfig::in_memory(), provider)
    }

    pub fn with_config(config: CloudrunConfig, provider: MockImageProvider) -> Self {
        metrics::init_metrics().expect("Failed to init metrics");

        let store = Arc::new(InMemoryCounterStore::new());
        let provider = Arc::new(provider);
        let state = AppState::new(config, store.clone(), provider.clone());

        Self {
            router: build_router(state),
            store,
            provider,
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with_provider(MockImageProvider::failing(error))
    }

    pub fn returning(parts: Vec<ResponsePart>) -> Self {
        Self::with_provider(MockImageProvider::with_parts(parts))
    }

    pub async fn request(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).expect("Response is not JSON");
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, "").await
    }

    pub async fn post(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.request(Method::POST, uri, body).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post(uri, &body.to_string()).await
    }

    pub async fn get_raw(&self, uri: &str) -> (StatusCode, String, String) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Encode a solid-colour bitmap in the given format.
pub fn bitmap(width: u32, height: u32, rgb: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb(rgb)));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format)
        .expect("Failed to encode test image");
    buffer.into_inner()
}

pub fn png_base64() -> String {
    general_purpose::STANDARD.encode(bitmap(4, 4, [255, 0, 0], ImageFormat::Png))
}

pub fn decode_base64(data: &str) -> Vec<u8> {
    general_purpose::STANDARD
        .decode(data)
        .expect("Response image is not base64")
}
