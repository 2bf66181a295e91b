use axum::{
    debug_handler,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{future::Future, io, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    permissions::{
        ApplyConditionsRequest, ApplyConditionsResponse, Permission, PermissionAction,
        PermissionAttributes, PermissionKind, PermissionMetadata, PermissionRegistry,
        PermissionRuleMetadata,
    },
    utils::logging::Logger,
};

pub const PERMISSION_METADATA_PATH: &str = "/.well-known/backstage/permissions/metadata";
pub const APPLY_CONDITIONS_PATH: &str = "/.well-known/backstage/permissions/apply-conditions";

#[derive(OpenApi)]
#[openapi(
    paths(health_check, permission_metadata, apply_conditions),
    components(schemas(
        HealthResponse,
        PermissionMetadata,
        Permission,
        PermissionKind,
        PermissionAction,
        PermissionAttributes,
        PermissionRuleMetadata,
        ApplyConditionsResponse,
        ErrorBody
    ))
)]
struct ApiDoc;

#[derive(Serialize, ToSchema)]
struct HealthResponse {
    #[schema(example = "ok")]
    status: String,
}

#[derive(Serialize, ToSchema)]
struct ErrorBody {
    name: String,
    message: String,
}

pub struct WebServerState {
    pub port: u16,
    pub logger: Arc<dyn Logger>,
    pub permissions: PermissionRegistry,
}

impl WebServerState {
    pub fn new(port: Option<u16>, logger: Arc<dyn Logger>) -> Self {
        Self {
            port: port.unwrap_or(3000), // Default to port 3000 if none specified
            logger,
            permissions: PermissionRegistry::default(),
        }
    }
}

fn input_error(message: String) -> Response {
    let error = ErrorBody {
        name: "InputError".to_string(),
        message,
    };
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(serde_json::json!({
            "error": error,
            "response": { "statusCode": 400 }
        })),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
#[debug_handler]
async fn health_check(State(state): State<Arc<WebServerState>>) -> Response {
    state.logger.log("PONG!");

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/.well-known/backstage/permissions/metadata",
    responses(
        (status = 200, description = "Registered permissions and rules", body = PermissionMetadata)
    )
)]
#[debug_handler]
async fn permission_metadata(State(state): State<Arc<WebServerState>>) -> Response {
    (StatusCode::OK, Json(state.permissions.metadata())).into_response()
}

#[utoipa::path(
    post,
    path = "/.well-known/backstage/permissions/apply-conditions",
    responses(
        (status = 200, description = "Conditional decisions", body = ApplyConditionsResponse),
        (status = 400, description = "Request references unknown rules or resource types", body = ErrorBody)
    )
)]
#[debug_handler]
async fn apply_conditions(
    State(state): State<Arc<WebServerState>>,
    Json(request): Json<ApplyConditionsRequest>,
) -> Response {
    match state.permissions.apply_conditions(&request) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            state
                .logger
                .log(&format!("Rejected permission conditions: {}", e));
            input_error(e.to_string())
        }
    }
}

pub fn create_router(state: Arc<WebServerState>) -> Router {
    state.logger.log("Initializing Kubernetes resources routes");

    Router::new()
        .route("/health", get(health_check))
        .route(PERMISSION_METADATA_PATH, get(permission_metadata))
        .route(APPLY_CONDITIONS_PATH, post(apply_conditions))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .with_state(state)
}

pub async fn start_web_server(
    state: Arc<WebServerState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    let addr = format!("0.0.0.0:{}", state.port);
    let logger = Arc::clone(&state.logger);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        logger.log(&format!("Failed to bind to address {}: {}", addr, e));
        e
    })?;
    logger.log(&format!("Web server listening on {}", addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| {
            logger.log(&format!("Server error: {}", e));
            e
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::test_support::RecordingLogger;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> (Arc<WebServerState>, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::default());
        let state = Arc::new(WebServerState::new(None, logger.clone()));
        (state, logger)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (state, logger) = test_state();
        let router = create_router(state);

        let request = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
        // info level, not debug
        assert_eq!(
            logger.messages(),
            vec![
                "Initializing Kubernetes resources routes".to_string(),
                "PONG!".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn permission_metadata_lists_permissions() {
        let (state, _) = test_state();
        let router = create_router(state);

        let request = Request::builder()
            .method("GET")
            .uri(PERMISSION_METADATA_PATH)
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["permissions"].as_array().unwrap().len(), 4);
        assert_eq!(json["rules"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn apply_conditions_rejects_unknown_rules() {
        let (state, logger) = test_state();
        let router = create_router(state);

        let payload = serde_json::json!({
            "items": [{
                "id": "1",
                "resourceRef": "component:default/x",
                "resourceType": "catalog-entity",
                "conditions": {"rule": "HAS_LABEL", "params": {"label": "x"}}
            }]
        });
        let request = Request::builder()
            .method("POST")
            .uri(APPLY_CONDITIONS_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["name"], "InputError");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("catalog-entity"));
        assert!(logger
            .messages()
            .iter()
            .any(|m| m.starts_with("Rejected permission conditions")));
    }

    #[tokio::test]
    async fn apply_conditions_accepts_empty_batch() {
        let (state, _) = test_state();
        let router = create_router(state);

        let request = Request::builder()
            .method("POST")
            .uri(APPLY_CONDITIONS_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"items": []}"#))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"items": []}));
    }

    #[tokio::test]
    async fn serves_openapi_document() {
        let (state, _) = test_state();
        let router = create_router(state);

        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["paths"].get("/health").is_some());
        assert!(json["paths"].get(PERMISSION_METADATA_PATH).is_some());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (state, _) = test_state();
        let router = create_router(state);

        let request = Request::builder()
            .uri("/api/credentials")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
