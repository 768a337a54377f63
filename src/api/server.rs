//! API server for cfseeker

use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{SeekerError, SeekerResult};
use crate::seeker::Seeker;

use super::routes::{
    cache_status, convert, find_apps, invalidate_cache, meta, not_found, AppState,
};

/// API server
pub struct ApiServer {
    seeker: Arc<Seeker>,
    host: String,
    port: u16,
}

/// Build the router; split out so handlers can be driven without a socket
pub fn router(seeker: Arc<Seeker>) -> Router {
    let app_state = Arc::new(AppState { seeker });

    Router::new()
        .route("/v1/apps", get(find_apps))
        .route("/v1/convert", get(convert))
        .route("/v1/cache/bosh", get(cache_status).delete(invalidate_cache))
        .route("/v1/meta", get(meta))
        .fallback(not_found)
        .with_state(app_state)
}

impl ApiServer {
    pub fn new(seeker: Arc<Seeker>, host: impl Into<String>, port: u16) -> Self {
        Self {
            seeker,
            host: host.into(),
            port,
        }
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> SeekerResult<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| SeekerError::ServerBind {
                addr: addr.clone(),
                source,
            })?;

        info!(
            "Starting cfseeker server on {} (BOSH {})",
            addr,
            if self.seeker.bosh_configured() {
                "enabled"
            } else {
                "disabled"
            }
        );

        axum::serve(listener, router(self.seeker))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| SeekerError::io("serving HTTP", e))?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fakes::{vm, FakeCloudController, FakeDirector};
    use crate::clients::Director;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(with_bosh: bool) -> Router {
        let director: Option<Arc<dyn Director>> = with_bosh.then(|| {
            Arc::new(FakeDirector::default().with_deployment(
                "cf",
                vec![
                    vm("diego-cell", 0, &["10.0.16.5"]),
                    vm("diego-cell", 1, &["10.0.16.6"]),
                ],
            )) as Arc<dyn Director>
        });
        let seeker = Seeker::with_clients(
            Arc::new(FakeCloudController::with_web_app()),
            director,
            vec!["cf".to_string()],
        );
        router(Arc::new(seeker))
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn find_by_guid_with_vms() {
        let (status, body) = send(app(true), Method::GET, "/v1/apps?app_guid=app-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contents"]["count"], 2);
        assert_eq!(body["contents"]["instances"][1]["vm_name"], "diego-cell/1");
        assert!(body.get("meta").is_none());
    }

    #[tokio::test]
    async fn find_without_bosh_warns() {
        let (status, body) = send(
            app(false),
            Method::GET,
            "/v1/apps?org_name=acme&space_name=prod&app_name=web",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["warning"], crate::api::routes::NO_BOSH_WARNING);
        assert!(body["contents"]["instances"][0].get("vm_name").is_none());
    }

    #[tokio::test]
    async fn find_partial_names_is_bad_request() {
        let (status, body) = send(app(true), Method::GET, "/v1/apps?org_name=acme").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["meta"]["error"]
            .as_str()
            .unwrap()
            .contains("no space name specified"));
    }

    #[tokio::test]
    async fn repeated_query_parameter_is_bad_request() {
        let (status, body) = send(
            app(true),
            Method::GET,
            "/v1/apps?app_guid=app-1&app_guid=app-2",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["meta"]["error"]
            .as_str()
            .unwrap()
            .contains("app_guid"));
        assert!(body.get("contents").is_none());

        let (status, body) = send(app(false), Method::GET, "/v1/convert?guid=a&guid=b").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["meta"]["error"].is_string());
    }

    #[tokio::test]
    async fn find_missing_app_is_server_error() {
        let (status, body) = send(
            app(true),
            Method::GET,
            "/v1/apps?org_name=acme&space_name=prod&app_name=ghost",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["meta"]["error"]
            .as_str()
            .unwrap()
            .starts_with("While looking up given app"));
    }

    #[tokio::test]
    async fn convert_space_guid() {
        let (status, body) = send(app(false), Method::GET, "/v1/convert?guid=space-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contents"]["type"], "space");
        assert_eq!(body["contents"]["org_name"], "acme");
        assert!(body["contents"].get("app_guid").is_none());
    }

    #[tokio::test]
    async fn convert_unknown_guid_is_not_found() {
        let (status, _) = send(app(false), Method::GET, "/v1/convert?guid=nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn convert_mixed_input_is_bad_request() {
        let (status, body) = send(
            app(false),
            Method::GET,
            "/v1/convert?guid=x&org_name=acme",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["meta"]["error"],
            "Invalid combination of convert input arguments"
        );
    }

    #[tokio::test]
    async fn cache_invalidate_and_status() {
        let app = app(true);
        let (_, body) = send(app.clone(), Method::GET, "/v1/apps?app_guid=app-1").await;
        assert_eq!(body["contents"]["count"], 2);

        let (status, body) = send(app.clone(), Method::GET, "/v1/cache/bosh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contents"][0]["name"], "cf");
        assert_eq!(body["contents"][0]["hosts"], 2);

        let (status, body) = send(app.clone(), Method::DELETE, "/v1/cache/bosh").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["meta"]["message"].as_str().unwrap().contains("invalidated"));

        let (_, body) = send(app, Method::GET, "/v1/cache/bosh").await;
        assert_eq!(body["contents"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn meta_reports_version() {
        let (status, body) = send(app(true), Method::GET, "/v1/meta").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contents"]["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["contents"]["bosh_configured"], true);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, body) = send(app(true), Method::GET, "/v2/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["meta"]["error"], "endpoint not found");
    }
}
