//! Axum router configuration with middleware.
//!
//! Layers are added innermost first, so requests pass through tracing,
//! panic containment, CORS, rate limiting and authentication before any
//! route handler runs. Unknown paths and wrong methods still go through
//! the full pipeline.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::http::error::AppError;
use crate::http::extractors::json::MAX_BODY_BYTES;
use crate::http::handlers;
use crate::http::middleware;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let chat_routes = Router::new()
        .route(
            "/v1/chat",
            get(handlers::chat::list_titles)
                .post(handlers::chat::send_message)
                .delete(handlers::chat::delete_chat),
        )
        .route("/v1/chat/{id}", get(handlers::chat::chat_history));

    let auth_routes = Router::new()
        .route("/v1/auth/google/login", get(handlers::auth::google_login))
        .route("/v1/auth/google/callback", get(handlers::auth::google_callback))
        .route(
            "/v1/auth/google/revoke",
            axum::routing::delete(handlers::auth::google_revoke),
        )
        .route("/user", get(handlers::user::current_user));

    Router::new()
        .merge(chat_routes)
        .merge(auth_routes)
        .route("/health", get(health_check))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(from_fn_with_state(state.clone(), middleware::cors::cors))
        .layer(CatchPanicLayer::custom(middleware::panic::handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> AppError {
    AppError::NotFound
}

async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use parley_core::llm::{BoxLlmProvider, LlmProvider, ProviderFactory, ProviderRegistry};
    use parley_core::storage::BoxKvStore;
    use parley_core::user::UserRepository;
    use parley_infra::kv::MemoryKvStore;
    use parley_infra::oauth::GoogleOAuthClient;
    use parley_infra::sqlite::pool::DatabasePool;
    use parley_infra::sqlite::user::SqliteUserRepository;
    use parley_types::config::{RuntimeEnvironment, ServerConfig};
    use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderKind};
    use parley_types::user::User;

    const REPLY: &str = "Hello from the model";
    const ORIGIN: &str = "https://chat.example.com";

    struct CannedProvider;

    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: REPLY.to_string(),
                model: request.model.clone(),
            })
        }
    }

    struct NoCallerKeys;

    impl ProviderFactory for NoCallerKeys {
        fn create(&self, _kind: ProviderKind, _api_key: &str) -> Result<BoxLlmProvider, LlmError> {
            Err(LlmError::AuthenticationFailed)
        }
    }

    struct TestApp {
        router: Router,
        state: AppState,
        pool: DatabasePool,
    }

    impl TestApp {
        async fn new() -> Self {
            Self::with_config(test_config()).await
        }

        async fn with_config(config: ServerConfig) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());
            // Leak tempdir so it lives for the test
            std::mem::forget(dir);
            let pool = DatabasePool::new(&url).await.unwrap();

            let mut providers = ProviderRegistry::new(NoCallerKeys);
            providers.register(ProviderKind::OpenAi, BoxLlmProvider::new(CannedProvider));
            let identity = GoogleOAuthClient::new(&config.google).unwrap();

            let state = AppState::from_parts(
                pool.clone(),
                BoxKvStore::new(MemoryKvStore::new()),
                providers,
                identity,
                &config,
            );
            Self {
                router: build_router(state.clone()),
                state,
                pool,
            }
        }

        async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }

        /// Store a user and return a live session token for them.
        async fn sign_in(&self, id: &str) -> String {
            let user = User {
                id: id.to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                picture: String::new(),
                refresh_token: "refresh-secret".to_string(),
            };
            SqliteUserRepository::new(self.pool.clone())
                .upsert(&user)
                .await
                .unwrap();
            self.state
                .sessions
                .issue(&user, std::time::Duration::from_secs(60))
                .await
                .unwrap()
                .plaintext
        }
    }

    fn test_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.trusted_origins = vec![ORIGIN.to_string()];
        config.google.client_id = "test-client".to_string();
        config.google.redirect_url = "http://localhost:4000/v1/auth/google/callback".to_string();
        config
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn authed(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = TestApp::new().await;
        let response = app.send(get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_envelope() {
        let app = TestApp::new().await;
        let response = app.send(get("/v2/nothing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"error": "the requested resource could not be found"})
        );
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let app = TestApp::new().await;
        let request = Request::put("/v1/chat").body(Body::empty()).unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(response).await["error"],
            "the PUT method is not supported for this resource"
        );
    }

    #[tokio::test]
    async fn test_cors_preflight_short_circuits() {
        let app = TestApp::new().await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/v1/chat")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
            .body(Body::empty())
            .unwrap();

        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            middleware::cors::ALLOWED_METHODS
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Authorization, Content-Type, Api-Key"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_cors_untrusted_origin_gets_no_allow_header() {
        let app = TestApp::new().await;
        let request = Request::get("/health")
            .header(header::ORIGIN, "https://evil.example.com")
            .body(Body::empty())
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );

        let request = Request::get("/health")
            .header(header::ORIGIN, ORIGIN)
            .body(Body::empty())
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    }

    #[tokio::test]
    async fn test_protected_routes_require_authentication() {
        let app = TestApp::new().await;
        for uri in ["/v1/chat", "/v1/chat/1", "/user"] {
            let response = app.send(get(uri)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(
                body_json(response).await["error"],
                "you must be authenticated to access this resource"
            );
        }
    }

    #[tokio::test]
    async fn test_bad_credentials_are_rejected_with_challenge() {
        let app = TestApp::new().await;
        for value in [
            "Token abc",
            "Bearer short",
            "Bearer AAAAAAAAAAAAAAAAAAAAAAAAAA",
        ] {
            let request = Request::get("/user")
                .header(header::AUTHORIZATION, value)
                .body(Body::empty())
                .unwrap();
            let response = app.send(request).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{value}");
            assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
            assert_eq!(
                body_json(response).await["error"],
                "invalid or missing authentication token"
            );
        }
    }

    #[tokio::test]
    async fn test_current_user_hides_refresh_token() {
        let app = TestApp::new().await;
        let token = app.sign_in("sub-1").await;

        let response = app.send(authed(Method::GET, "/user", &token, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["id"], "sub-1");
        assert!(body["user"].get("refresh_token").is_none());
    }

    #[tokio::test]
    async fn test_anonymous_title_request_is_not_persisted() {
        let app = TestApp::new().await;
        let response = app
            .send(post_json(
                "/v1/chat",
                r#"{"id":-1,"model_type":"OpenAI","prompt":"Tell me a joke"}"#,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["chat"]["id"], 0);
        assert_eq!(body["chat"]["title"], REPLY);
        assert_eq!(body["chat"]["message"], json!([{ "text": REPLY }]));
    }

    #[tokio::test]
    async fn test_anonymous_follow_up_has_no_title() {
        let app = TestApp::new().await;
        let response = app
            .send(post_json(
                "/v1/chat",
                r#"{"id":0,"model_type":"OpenAI","prompt":"And another"}"#,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["chat"]["id"], 0);
        assert!(body["chat"].get("title").is_none());
    }

    #[tokio::test]
    async fn test_signed_in_conversation_lifecycle() {
        let app = TestApp::new().await;
        let token = app.sign_in("sub-1").await;

        let response = app
            .send(authed(
                Method::POST,
                "/v1/chat",
                &token,
                Some(json!({"id": 0, "model_type": "OpenAI", "prompt": "Hi there"})),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let chat = body_json(response).await["chat"].clone();
        let chat_id = chat["id"].as_i64().unwrap();
        assert!(chat_id >= 1);
        assert_eq!(chat["title"], REPLY);

        let response = app.send(authed(Method::GET, "/v1/chat", &token, None)).await;
        assert_eq!(
            body_json(response).await,
            json!({"titles": [{"id": chat_id, "title": REPLY}]})
        );

        let uri = format!("/v1/chat/{chat_id}");
        let response = app.send(authed(Method::GET, &uri, &token, None)).await;
        assert_eq!(
            body_json(response).await,
            json!({"chatHistory": [
                {"role": "human", "text": "Hi there"},
                {"role": "assistant", "text": REPLY},
            ]})
        );

        let response = app
            .send(authed(
                Method::DELETE,
                "/v1/chat",
                &token,
                Some(json!({ "id": chat_id })),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await["message"],
            "Chat Deletion Successful!"
        );

        let response = app.send(authed(Method::GET, "/v1/chat", &token, None)).await;
        assert_eq!(body_json(response).await, json!({"titles": []}));
    }

    #[tokio::test]
    async fn test_invalid_chat_input_is_422_field_map() {
        let app = TestApp::new().await;
        let response = app
            .send(post_json(
                "/v1/chat",
                r#"{"id":0,"model_type":"Mistral","model":"large","prompt":""}"#,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let errors = body_json(response).await["error"].clone();
        assert_eq!(errors["prompt"], "Empty prompt");
        assert_eq!(errors["model_type"], "Invalid model type");
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_400() {
        let app = TestApp::new().await;
        for body in [
            r#"{"id":0,"#,
            r#"{"id":"zero","model_type":"OpenAI","prompt":"x"}"#,
            r#"{"id":0,"model_type":"OpenAI","prompt":"x","extra":true}"#,
        ] {
            let response = app.send(post_json("/v1/chat", body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert!(body_json(response).await["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_history_rejects_bad_id() {
        let app = TestApp::new().await;
        let token = app.sign_in("sub-1").await;
        let response = app
            .send(authed(Method::GET, "/v1/chat/abc", &token, None))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid ID parameter");
    }

    #[tokio::test]
    async fn test_missing_shared_provider_is_400() {
        let app = TestApp::new().await;
        let response = app
            .send(post_json(
                "/v1/chat",
                r#"{"id":-1,"model_type":"Anthropic","prompt":"hi"}"#,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_returns_google_consent_url() {
        let app = TestApp::new().await;
        let response = app.send(get("/v1/auth/google/login")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let url = body_json(response).await["auth_url"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("state="));
    }

    #[tokio::test]
    async fn test_login_when_signed_in_returns_user() {
        let app = TestApp::new().await;
        let token = app.sign_in("sub-1").await;
        let response = app
            .send(authed(Method::GET, "/v1/auth/google/login", &token, None))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["user"]["id"], "sub-1");
        assert!(body.get("auth_url").is_none());
    }

    #[tokio::test]
    async fn test_callback_with_unknown_state_is_401() {
        let app = TestApp::new().await;
        let response = app
            .send(get("/v1/auth/google/callback?state=forged&code=abc"))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "invalid state token");
    }

    #[tokio::test]
    async fn test_rate_limit_applies_in_production() {
        let mut config = test_config();
        config.environment = RuntimeEnvironment::Production;
        config.rate_limit.burst = 2;
        config.rate_limit.rate_per_second = 0.001;
        let app = TestApp::with_config(config).await;

        let from = |ip: &str| {
            Request::get("/health")
                .header("x-forwarded-for", ip)
                .body(Body::empty())
                .unwrap()
        };

        assert_eq!(app.send(from("203.0.113.1")).await.status(), StatusCode::OK);
        assert_eq!(app.send(from("203.0.113.1")).await.status(), StatusCode::OK);
        let response = app.send(from("203.0.113.1")).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(response).await["error"], "rate limit exceeded");

        assert_eq!(app.send(from("203.0.113.2")).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_off_in_development() {
        let mut config = test_config();
        config.rate_limit.burst = 1;
        let app = TestApp::with_config(config).await;
        for _ in 0..5 {
            assert_eq!(app.send(get("/health")).await.status(), StatusCode::OK);
        }
    }
}
