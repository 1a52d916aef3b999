//! HTTP routes served to browsers on the LAN.
//!
//! | Method | Path       | Effect                                              |
//! |--------|------------|-----------------------------------------------------|
//! | GET    | `/`        | The page template with `{{HOST}}`/`{{PORT}}` filled |
//! | GET    | `/content` | The outbound snapshot text, `text/plain`            |
//! | POST   | `/content` | Form field `content` into the inbound queue         |
//!
//! Anything else is `404 Not Found`.  Every request is independent: a bad
//! body is answered with a 4xx on that request only and never reaches the
//! queue or the listener.
//!
//! A middleware in front of every route answers `503 Service Unavailable`
//! unless the server state is `Running`, so nothing is routed while the
//! listener is starting or shutting down.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{ConnectInfo, DefaultBodyLimit, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use lanpaste_core::ServerState;
use serde::Deserialize;
use tracing::debug;

use crate::application::SyncService;
use crate::infrastructure::server::{BoundAddress, ServerStateCell};
use crate::infrastructure::template::TemplateRenderer;

/// Everything a request handler needs.  Cloned per request; all fields are
/// cheap handles.
#[derive(Clone)]
pub struct RouterState {
    pub service: Arc<SyncService>,
    pub renderer: Arc<TemplateRenderer>,
    pub bound: BoundAddress,
    pub server_state: ServerStateCell,
}

/// Body of `POST /content`.
#[derive(Debug, Deserialize)]
struct SubmitForm {
    content: Option<String>,
}

/// Builds the router for one running listener.
///
/// `max_body_bytes` caps the size of a submission; larger bodies are
/// answered with `413 Payload Too Large`.
pub fn build_router(state: RouterState, max_body_bytes: usize) -> Router {
    let gate = state.server_state.clone();
    Router::new()
        .route("/", get(page_handler).fallback(not_found))
        .route(
            "/content",
            get(get_content_handler)
                .post(post_content_handler)
                .fallback(not_found),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn_with_state(gate, require_running))
        .with_state(state)
}

// ── Middleware ────────────────────────────────────────────────────────────────

async fn require_running(
    State(server_state): State<ServerStateCell>,
    request: Request,
    next: Next,
) -> Response {
    let current = server_state.get();
    if current != ServerState::Running {
        debug!("refusing {} {} while server is {current}", request.method(), request.uri());
        return (StatusCode::SERVICE_UNAVAILABLE, "server is not running").into_response();
    }
    next.run(request).await
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /`
async fn page_handler(State(state): State<RouterState>, headers: HeaderMap) -> Html<String> {
    let host_header = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let host = state.bound.page_host(host_header);
    Html(state.renderer.render(&host, state.bound.port()).await)
}

/// `GET /content`
async fn get_content_handler(State(state): State<RouterState>) -> String {
    state.service.outbound().text
}

/// `POST /content`
async fn post_content_handler(
    State(state): State<RouterState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    form: Result<Form<SubmitForm>, FormRejection>,
) -> Response {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!("rejected submission from {peer:?}: {rejection}");
            return (rejection.status(), rejection.body_text()).into_response();
        }
    };

    match state.service.submit(form.content, peer) {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            debug!("rejected submission from {peer:?}: {e}");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::EventBus;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request as HttpRequest};
    use lanpaste_core::{SourceTag, FAIL_SAFE_HTML_TEMPLATE};
    use tower::util::ServiceExt;

    const FORM: &str = "application/x-www-form-urlencoded";

    struct Harness {
        router: Router,
        service: Arc<SyncService>,
        state: ServerStateCell,
    }

    fn harness_with(max_body_bytes: usize, capacity: usize) -> Harness {
        harness_bound("127.0.0.1:2234", max_body_bytes, capacity)
    }

    fn harness_bound(bound: &str, max_body_bytes: usize, capacity: usize) -> Harness {
        let bus = Arc::new(EventBus::default());
        let service = Arc::new(SyncService::new(capacity, bus));
        let state = ServerStateCell::new(ServerState::Running);
        let router = build_router(
            RouterState {
                service: Arc::clone(&service),
                renderer: Arc::new(TemplateRenderer::new(
                    "/nonexistent/lanpaste/index.html",
                    FAIL_SAFE_HTML_TEMPLATE,
                )),
                bound: BoundAddress::new(bound.parse().unwrap()),
                server_state: state.clone(),
            },
            max_body_bytes,
        );
        Harness {
            router,
            service,
            state,
        }
    }

    fn harness() -> Harness {
        harness_with(64 * 1024, 16)
    }

    fn post_form(body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method(Method::POST)
            .uri("/content")
            .header(header::CONTENT_TYPE, FORM)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_get_root_renders_fail_safe_page_with_real_address() {
        let h = harness();

        let response = h.router.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let html = body_text(response).await;
        assert!(html.contains(r#"action="http://127.0.0.1:2234/content""#));
        assert!(!html.contains("{{HOST}}"));
        assert!(!html.contains("{{PORT}}"));
    }

    #[tokio::test]
    async fn test_get_root_on_wildcard_bind_uses_host_header() {
        let h = harness_bound("0.0.0.0:2234", 64 * 1024, 16);
        let request = HttpRequest::builder()
            .uri("/")
            .header(header::HOST, "192.168.1.40:2234")
            .body(Body::empty())
            .unwrap();

        let html = body_text(h.router.oneshot(request).await.unwrap()).await;

        assert!(html.contains(r#"action="http://192.168.1.40:2234/content""#));
    }

    #[tokio::test]
    async fn test_get_root_does_not_reflect_markup_from_host_header() {
        // Arrange
        let h = harness_bound("0.0.0.0:2234", 64 * 1024, 16);
        let request = HttpRequest::builder()
            .uri("/")
            .header(header::HOST, r#"x"><script>alert(1)</script><a"#)
            .body(Body::empty())
            .unwrap();

        // Act
        let response = h.router.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"action="http://127.0.0.1:2234/content""#));
    }

    #[tokio::test]
    async fn test_get_content_is_empty_before_publish() {
        let h = harness();
        let response = h.router.oneshot(get("/content")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_get_content_returns_published_text() {
        let h = harness();
        h.service.publish_outbound("Ready");

        let response = h.router.oneshot(get("/content")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Ready");
    }

    #[tokio::test]
    async fn test_post_content_enqueues_and_redirects() {
        // Arrange
        let h = harness();

        // Act
        let response = h.router.oneshot(post_form("content=Hello")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert_eq!(h.service.queue_info().count(), 1);
        assert_eq!(h.service.accept_oldest().unwrap().text, "Hello");
    }

    #[tokio::test]
    async fn test_post_content_decodes_form_encoding() {
        let h = harness();
        h.router
            .oneshot(post_form("content=caf%C3%A9+au+lait%21"))
            .await
            .unwrap();
        assert_eq!(h.service.accept_oldest().unwrap().text, "café au lait!");
    }

    #[tokio::test]
    async fn test_post_content_missing_field_is_bad_request() {
        let h = harness();
        let response = h.router.oneshot(post_form("other=value")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.service.queue_info().count(), 0);
    }

    #[tokio::test]
    async fn test_post_content_empty_field_is_bad_request() {
        let h = harness();
        let response = h.router.oneshot(post_form("content=")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.service.queue_info().count(), 0);
    }

    #[tokio::test]
    async fn test_post_without_form_content_type_is_client_error() {
        let h = harness();
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri("/content")
            .body(Body::from("content=Hello"))
            .unwrap();

        let response = h.router.oneshot(request).await.unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(h.service.queue_info().count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let h = harness_with(32, 16);
        let body = format!("content={}", "x".repeat(100));

        let response = h.router.oneshot(post_form(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(h.service.queue_info().count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let h = harness();
        let response = h.router.oneshot(get("/admin")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_method_on_known_path_is_not_found() {
        let h = harness();
        let request = HttpRequest::builder()
            .method(Method::DELETE)
            .uri("/content")
            .body(Body::empty())
            .unwrap();
        let response = h.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_root_is_not_found() {
        let h = harness();
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = h.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_requests_refused_unless_running() {
        // Arrange
        let h = harness();
        h.state.set(ServerState::Stopping);

        // Act
        let response = h
            .router
            .clone()
            .oneshot(post_form("content=late"))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(h.service.queue_info().count(), 0);
    }

    #[tokio::test]
    async fn test_post_publishes_queue_count_event() {
        let h = harness();
        let mut rx = h.service.bus().receiver();

        h.router.oneshot(post_form("content=A")).await.unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.source, SourceTag::ServerInfo);
        assert_eq!(event.text, "1 item waiting");
    }
}
