mod api;
mod pages;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/submissions", get(api::submissions))
        .route("/submissions/:code", get(api::submission))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(pages::index))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Submission codes are interpolated into upstream URLs, so only plain
/// alphanumeric codes are accepted.
fn validate_code(code: &str) -> Result<(), AppError> {
    if !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(AppError::InvalidCode(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::fixtures::text_response;
    use crate::config::tests::test_config;
    use crate::pretalx::fixtures::{mount_pages, review_json, submission_json};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn app(pretalx: &MockServer, gemini: &MockServer) -> Router {
        let config = Arc::new(test_config(&pretalx.uri(), &gemini.uri()));
        router(Arc::new(AppState::new(config).unwrap()))
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn mount_detail(server: &MockServer) {
        let mut detail = submission_json("ABC123", "2024-03-01T09:05:30+08:00");
        detail["abstract"] = json!("Abstract text");
        detail["description"] = json!("Description text");
        Mock::given(method("GET"))
            .and(path("/submissions/ABC123/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail))
            .mount(server)
            .await;
        mount_pages(
            server,
            "/reviews/",
            vec![vec![
                review_json("ABC123", "alice", json!("1.00"), "Good"),
                review_json("OTHER1", "bob", json!("0.00"), "Unrelated"),
                review_json("ABC123", "carol", json!("2.00"), "Great"),
            ]],
        )
        .await;
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("ABC123").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("../reviews").is_err());
        assert!(validate_code("AB C").is_err());
    }

    #[tokio::test]
    async fn test_list_view_renders_sorted_table() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;
        mount_pages(
            &pretalx,
            "/submissions/",
            vec![vec![
                submission_json("SECOND", "2024-03-02T10:00:00+08:00"),
                submission_json("FIRST", "2024-03-01T09:00:00+08:00"),
            ]],
        )
        .await;

        let (status, body) = get_body(app(&pretalx, &gemini).await, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("PyCon MY 2024 Submissions"));
        let first = body.find("?code=FIRST").unwrap();
        let second = body.find("?code=SECOND").unwrap();
        assert!(first < second);
        assert!(body.contains("09:00:00"));
    }

    #[tokio::test]
    async fn test_list_view_shows_error_on_upstream_failure() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/submissions/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&pretalx)
            .await;

        let (status, body) = get_body(app(&pretalx, &gemini).await, "/").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_detail_view_with_judgment() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;
        mount_detail(&pretalx).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Accept it. Final score: 2")))
            .mount(&gemini)
            .await;

        let (status, body) = get_body(app(&pretalx, &gemini).await, "/?code=ABC123").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Abstract text"));
        assert!(body.contains("Description text"));
        assert!(body.contains("alice"));
        assert!(body.contains("carol"));
        assert!(!body.contains("Unrelated"));
        assert!(body.contains("Total Score from 2 reviewers: 3. Average Score: 1.50"));
        assert!(body.contains("Accept it. Final score: 2"));
    }

    #[tokio::test]
    async fn test_detail_view_survives_judgment_failure() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;
        mount_detail(&pretalx).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "quota exceeded"}
            })))
            .mount(&gemini)
            .await;

        let (status, body) = get_body(app(&pretalx, &gemini).await, "/?code=ABC123").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ApiError: HTTP 403: quota exceeded"));
        assert!(body.contains("Average Score: 1.50"));
    }

    #[tokio::test]
    async fn test_detail_view_without_reviews_says_so_once() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;
        let mut detail = submission_json("NEW1", "2024-03-01T09:05:30+08:00");
        detail["abstract"] = json!("Fresh abstract");
        detail["description"] = json!("Fresh description");
        Mock::given(method("GET"))
            .and(path("/submissions/NEW1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail))
            .mount(&pretalx)
            .await;
        mount_pages(&pretalx, "/reviews/", vec![vec![]]).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Too early to say.")))
            .mount(&gemini)
            .await;

        let (status, body) = get_body(app(&pretalx, &gemini).await, "/?code=NEW1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("No reviews yet").count(), 1);
        assert!(!body.contains("Average Score"));
    }

    #[tokio::test]
    async fn test_api_submission_list_in_rank_order() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;
        mount_pages(
            &pretalx,
            "/submissions/",
            vec![
                vec![submission_json("LATE", "2024-03-02T10:00:00+08:00")],
                vec![
                    submission_json("EARLY", "2024-03-01T09:00:00+08:00"),
                    submission_json("MIDDLE", "2024-03-01T12:00:00+08:00"),
                ],
            ],
        )
        .await;

        let (status, body) = get_body(app(&pretalx, &gemini).await, "/api/submissions").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["total"], 3);
        let results = value["results"].as_array().unwrap();
        let codes: Vec<&str> = results.iter().map(|r| r["code"].as_str().unwrap()).collect();
        assert_eq!(codes, vec!["EARLY", "MIDDLE", "LATE"]);
        let ranks: Vec<u64> = results.iter().map(|r| r["rank"].as_u64().unwrap()).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(results[0]["created"], "01/03/24 09:00:00");
        assert!(gemini.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_code_is_rejected_without_fetching() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;

        let (status, _) = get_body(app(&pretalx, &gemini).await, "/?code=..%2Fevil").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(pretalx.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_submission_report() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;
        mount_detail(&pretalx).await;

        let (status, body) = get_body(app(&pretalx, &gemini).await, "/api/submissions/ABC123").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["submission"]["code"], "ABC123");
        assert_eq!(value["reviews"].as_array().unwrap().len(), 2);
        assert_eq!(value["summary"]["status"], "scored");
        assert_eq!(value["summary"]["average"], 1.5);
        assert!(gemini.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_reports_upstream_errors_as_json() {
        let pretalx = MockServer::start().await;
        let gemini = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/submissions/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&pretalx)
            .await;

        let (status, body) = get_body(app(&pretalx, &gemini).await, "/api/submissions").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "error");
    }
}
