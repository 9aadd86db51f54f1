//! HTTP routes for the digest service.
//!
//! | Route        | Method | Response                                         |
//! |--------------|--------|--------------------------------------------------|
//! | `/hash`      | POST   | identifier as plain text (form field `password`) |
//! | `/hash/{id}` | GET    | digest as plain text                             |
//! | `/stats`     | GET    | `{"total": n, "average": ms}`                    |
//! | `/shutdown`  | GET    | starts draining, returns immediately             |
//!
//! Requests with any other method on these paths get `405 Method Not
//! Allowed` from the router.

use crate::server::{
    error::ApiError,
    telemetry::{
        increment_query_misses, increment_rejected_submissions, increment_shutdown_requests,
        increment_submissions,
    },
};
use axum::{
    Form, Json, Router,
    extract::{Path, State, rejection::FormRejection},
    routing::{get, post},
};
use hashd::{Error, HashService, Identifier, StatsSnapshot};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub password: Option<String>,
}

/// Builds the router with every route bound to `service`.
pub fn router(service: HashService) -> Router {
    Router::new()
        .route("/hash", post(submit_hash))
        .route("/hash/{id}", get(get_hash))
        .route("/stats", get(get_stats))
        .route("/shutdown", get(shutdown))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

/// Accepts a secret and replies with its identifier before the digest
/// exists.
async fn submit_hash(
    State(service): State<HashService>,
    form: Result<Form<SubmitForm>, FormRejection>,
) -> Result<String, ApiError> {
    let password = match form {
        Ok(Form(SubmitForm {
            password: Some(password),
        })) => password,
        Ok(_) => {
            increment_rejected_submissions();
            return Err(Error::InvalidInput {
                reason: "password parameter is required".to_string(),
            }
            .into());
        }
        Err(rejection) => {
            increment_rejected_submissions();
            return Err(Error::InvalidInput {
                reason: rejection.body_text(),
            }
            .into());
        }
    };

    match service.submit(password) {
        Ok(id) => {
            increment_submissions();
            Ok(id.to_string())
        }
        Err(e) => {
            increment_rejected_submissions();
            tracing::debug!("Submission rejected: {e}");
            Err(e.into())
        }
    }
}

async fn get_hash(
    State(service): State<HashService>,
    Path(raw): Path<String>,
) -> Result<String, ApiError> {
    let id: Identifier = raw.parse().map_err(|_| {
        increment_query_misses();
        ApiError::InvalidId(raw.clone())
    })?;

    service.query(id).map_err(|e| {
        increment_query_misses();
        e.into()
    })
}

async fn get_stats(State(service): State<HashService>) -> Json<StatsSnapshot> {
    Json(service.stats())
}

/// Triggers the drain. The listener stops accepting connections once the
/// service reports draining; see `main`.
async fn shutdown(State(service): State<HashService>) -> &'static str {
    increment_shutdown_requests();
    if service.initiate_shutdown() {
        tracing::info!(
            outstanding = service.outstanding(),
            "Received shutdown request, no longer accepting submissions"
        );
    }
    "Shutting down\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use core::time::Duration;
    use hashd::{Digester, ServiceConfig, Sha512Digester, ShutdownState};
    use tower::ServiceExt;

    fn service() -> HashService {
        HashService::new(ServiceConfig::with_delay(Duration::from_millis(20)))
    }

    fn submit_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/hash")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(service: &HashService, request: Request<Body>) -> (StatusCode, String) {
        let response = router(service.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn submit_returns_the_identifier() {
        let service = service();

        let (status, body) = send(&service, submit_request("password=angryMonkey")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1");

        let (status, body) = send(&service, submit_request("password=baloo1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "2");
    }

    #[tokio::test]
    async fn submit_requires_a_password() {
        let service = service();

        let (status, _) = send(&service, submit_request("somePostParam=someValue")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&service, submit_request("password=")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // nothing was scheduled, so the first accepted id is still 1
        let (_, body) = send(&service, submit_request("password=x")).await;
        assert_eq!(body, "1");
    }

    #[tokio::test]
    async fn wrong_methods_are_rejected() {
        let service = service();

        let cases = [
            (Method::GET, "/hash"),
            (Method::POST, "/hash/1"),
            (Method::POST, "/stats"),
            (Method::POST, "/shutdown"),
        ];
        for (method, uri) in cases {
            let request = Request::builder()
                .method(method.clone())
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, _) = send(&service, request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn get_hash_before_and_after_completion() {
        let service = service();
        send(&service, submit_request("password=angryMonkey")).await;

        let (status, _) = send(&service, get_request("/hash/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        service.initiate_shutdown();
        service.await_stopped().await;

        let (status, body) = send(&service, get_request("/hash/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Sha512Digester.digest("angryMonkey"));
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let service = service();

        for uri in ["/hash/0", "/hash/-1", "/hash/abc", "/hash/1/2", "/hash/99"] {
            let (status, _) = send(&service, get_request(uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn stats_report_json() {
        let service = service();

        let (status, body) = send(&service, get_request("/stats")).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json, serde_json::json!({"total": 0, "average": 0}));

        send(&service, submit_request("password=angryMonkey")).await;
        send(&service, submit_request("password=baloo1")).await;
        service.initiate_shutdown();
        service.await_stopped().await;

        let (_, body) = send(&service, get_request("/stats")).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["total"], 2);
        assert!(json["average"].as_u64().unwrap() >= 20);
    }

    #[tokio::test]
    async fn shutdown_drains_and_rejects_new_submissions() {
        let service = service();
        send(&service, submit_request("password=angryMonkey")).await;

        let (status, _) = send(&service, get_request("/shutdown")).await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(service.state(), ShutdownState::Running);

        let (status, _) = send(&service, submit_request("password=late")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        service.await_stopped().await;
        let (status, _) = send(&service, get_request("/hash/1")).await;
        assert_eq!(status, StatusCode::OK);

        // idempotent
        let (status, _) = send(&service, get_request("/shutdown")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(service.state(), ShutdownState::Stopped);
    }
}
