use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    health_handler, redirect_handler, root_handler, shorten_handler, url_info_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/shorten", post(shorten_handler))
            .route("/api/urls/{code}", get(url_info_handler))
            .route("/{code}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use blink_cache::MokaUrlCache;
    use blink_core::{ReadRepository, ShortCode};
    use blink_generator::SeqGenerator;
    use blink_shortener::{ShortenerService, ShortenerSettings, MAX_URL_LENGTH};
    use blink_storage::InMemoryRepository;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_router() -> (Router, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ShortenerService::new(
            Arc::clone(&repo),
            MokaUrlCache::new(),
            SeqGenerator::with_prefix("g"),
            ShortenerSettings::builder()
                .base_url("http://localhost:3000")
                .build(),
        );
        (App::router(AppState::new(Arc::new(service))), repo)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
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

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let (router, _repo) = test_router();

        let response = router.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn root_banner() {
        let (router, _repo) = test_router();

        let response = router.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn shorten_with_custom_slug_then_redirect() {
        let (router, _repo) = test_router();

        let response = router
            .clone()
            .oneshot(post_json(
                "/shorten",
                json!({ "url": "https://example.com/page", "custom_slug": "mypage" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "short_url": "http://localhost:3000/mypage" })
        );

        let response = router.oneshot(get("/mypage")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/page"
        );
    }

    #[tokio::test]
    async fn shorten_with_generated_code() {
        let (router, _repo) = test_router();

        let response = router
            .oneshot(post_json("/shorten", json!({ "url": "https://example.com" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "short_url": "http://localhost:3000/g000000" })
        );
    }

    #[tokio::test]
    async fn invalid_url_is_bad_request() {
        let (router, repo) = test_router();

        let response = router
            .oneshot(post_json("/shorten", json!({ "url": "not-a-url" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn url_with_newline_is_bad_request_and_never_redirects() {
        let (router, repo) = test_router();

        let response = router
            .clone()
            .oneshot(post_json(
                "/shorten",
                json!({ "url": "https://example.com/a\nb", "custom_slug": "ctrl" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
        assert!(repo.is_empty());

        let response = router.oneshot(get("/ctrl")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_url_is_bad_request() {
        let (router, repo) = test_router();
        let url = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));

        let response = router
            .oneshot(post_json("/shorten", json!({ "url": url })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn short_slug_is_bad_request() {
        let (router, _repo) = test_router();

        let response = router
            .oneshot(post_json(
                "/shorten",
                json!({ "url": "https://example.com", "custom_slug": "ab" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (router, _repo) = test_router();

        let request = Request::builder()
            .method("POST")
            .uri("/shorten")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn missing_url_field_is_bad_request() {
        let (router, _repo) = test_router();

        let response = router
            .oneshot(post_json("/shorten", json!({ "custom_slug": "abc" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_slug_is_conflict() {
        let (router, _repo) = test_router();
        let body = json!({ "url": "https://example.com", "custom_slug": "taken" });

        let first = router
            .clone()
            .oneshot(post_json("/shorten", body.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router.oneshot(post_json("/shorten", body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (router, _repo) = test_router();

        let response = router.oneshot(get("/unknown-code")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "short URL not found" })
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn redirects_are_counted_and_reported() {
        let (router, repo) = test_router();
        router
            .clone()
            .oneshot(post_json(
                "/shorten",
                json!({ "url": "https://example.com", "custom_slug": "stats" }),
            ))
            .await
            .unwrap();

        for _ in 0..2 {
            let response = router.clone().oneshot(get("/stats")).await.unwrap();
            assert_eq!(response.status(), StatusCode::FOUND);
        }

        let code = ShortCode::new_unchecked("stats");
        awaitility::at_most(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(10))
            .until_async(|| async {
                let record = repo.find_by_code(&code).await.unwrap().unwrap();
                record.click_count == 2
            })
            .await;

        let response = router.oneshot(get("/api/urls/stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "short_code": "stats",
                "original_url": "https://example.com",
                "click_count": 2,
                "custom_slug": "stats"
            })
        );
    }

    #[tokio::test]
    async fn url_info_for_unknown_code_is_not_found() {
        let (router, _repo) = test_router();

        let response = router.oneshot(get("/api/urls/nothing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let (router, _repo) = test_router();

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://somewhere.example")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
