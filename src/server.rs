//! HTTP surface: `POST /scrape_resources` and `GET /health`.

use crate::models::{HealthStatus, ScrapeRequest, ScrapeResponse};
use crate::pipeline::ResourceScout;
use crate::utils::truncate_for_log;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct AppState {
    scout: Arc<ResourceScout>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
}

pub fn create_router(scout: Arc<ResourceScout>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scrape_resources", post(scrape_resources))
        .layer(CorsLayer::very_permissive())
        .with_state(AppState { scout })
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::default())
}

/// Validate the body, then run one ranking run. Nothing is fetched for an
/// invalid request.
async fn scrape_resources(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, Response> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Malformed request body");
        bad_request(rejection.body_text())
    })?;

    let request = body.validate().map_err(|e| {
        warn!(
            topic = %truncate_for_log(&body.topic, 80),
            level = %truncate_for_log(&body.level, 40),
            error = %e,
            "Rejected request"
        );
        bad_request(e.to_string())
    })?;

    Ok(Json(state.scout.scout(&request).await))
}

/// Serve until the process is stopped.
#[instrument(level = "info", skip(scout))]
pub async fn run_server(scout: Arc<ResourceScout>, bind: &str) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, create_router(scout)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingSettings;
    use crate::models::{CandidateResource, Category, RankingRequest};
    use crate::orchestrator::ScrapeOrchestrator;
    use crate::ranking::RankingEngine;
    use crate::scrapers::SourceFetcher;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    struct CountingDocs {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SourceFetcher for CountingDocs {
        fn category(&self) -> Category {
            Category::Doc
        }

        async fn fetch(&self, request: &RankingRequest) -> Vec<CandidateResource> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![CandidateResource::new(
                Category::Doc,
                &format!("The {} Tutorial", request.topic()),
                "https://docs.python.org/3/tutorial/index.html",
                "An informal introduction for beginners.",
                "python",
                200,
            )]
        }
    }

    fn app() -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingDocs {
            calls: Arc::clone(&calls),
        };
        let scout = ResourceScout::new(
            ScrapeOrchestrator::new(vec![Arc::new(fetcher)], Duration::from_secs(5)),
            RankingEngine::new(Arc::new(RankingSettings::default())),
        );
        (create_router(Arc::new(scout)), calls)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/scrape_resources")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "learning-scout");
    }

    #[tokio::test]
    async fn test_scrape_resources_ok() {
        let (app, calls) = app();
        let resp = app
            .oneshot(post_json(r#"{"topic":"Python","level":"Beginner"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let json = body_json(resp).await;
        assert_eq!(json["content"], "Learning resources for Python at beginner level");
        let resources = json["resources"].as_array().unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0]["type"], "doc");
        assert_eq!(resources[0]["link"], "https://docs.python.org/3/tutorial/index.html");
        assert!(resources[0]["score"].as_f64().unwrap() >= 0.4);
    }

    #[tokio::test]
    async fn test_blank_topic_rejected_before_fetching() {
        let (app, calls) = app();
        let resp = app
            .oneshot(post_json(r#"{"topic":"   ","level":"beginner"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("topic"));
    }

    #[tokio::test]
    async fn test_overlong_topic_rejected_before_fetching() {
        let (app, calls) = app();
        let body = serde_json::json!({ "topic": "x".repeat(5000), "level": "beginner" });
        let resp = app.oneshot(post_json(&body.to_string())).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("at most 200 characters"));
    }

    #[tokio::test]
    async fn test_unknown_level_rejected() {
        let (app, calls) = app();
        let resp = app
            .oneshot(post_json(r#"{"topic":"Rust","level":"guru"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("guru"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (app, _) = app();
        let resp = app.oneshot(post_json(r#"{"topic":"Rust"}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].is_string());
    }
}
