//! Gateway assembly and request dispatch.
//!
//! # Responsibilities
//! - Collect routes, channels and asset sources before serving
//! - Build the Axum router with middleware (tracing, request ID, timeout)
//! - Dispatch each request to a routed handler or to static assets
//! - Serve until the shutdown signal fires
//!
//! # Data Flow
//! ```text
//! Request → normalize path → PathRouter
//!     hit  → read JSON body → handler(query, body, responder) → JSON reply
//!     miss → AssetResolver (blocking pool) → asset 200 | empty 404
//! Upgrade on socket path → websocket.rs
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::assets::{AssetResolver, DirectorySource, ResourceSource};
use crate::config::GatewayConfig;
use crate::http::handler::{ChannelHandler, HttpHandler};
use crate::http::request::{normalize_path, read_json_body, RequestQuery};
use crate::http::response::{asset_response, internal_error, json_response, not_found, Responder};
use crate::http::websocket::{ws_handler, SocketHub};
use crate::observability::metrics::{self, RequestKind};
use crate::routing::PathRouter;
use crate::socket::{ConnectionRegistry, FieldExtractor, IdentityExtractor, JsonObject};

type Routes = PathRouter<Arc<dyn HttpHandler>>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<Routes>,
    pub assets: Arc<AssetResolver>,
    pub hub: Arc<SocketHub>,
    pub max_body_size: usize,
}

/// Single-port gateway for routed JSON calls, static assets and sockets.
///
/// Register everything first, then call [`run`](Self::run) or
/// [`into_router`](Self::into_router). Keep a [`registry`](Self::registry)
/// clone to push events once serving has started.
pub struct Gateway {
    config: GatewayConfig,
    routes: Routes,
    assets: AssetResolver,
    hub: SocketHub,
}

impl Gateway {
    /// Create a gateway from configuration.
    ///
    /// A configured asset root becomes the first resource source, and the
    /// configured identity field becomes the identity extractor.
    pub fn new(config: GatewayConfig) -> Self {
        let mut assets = AssetResolver::new(config.assets.index_path.clone());
        if let Some(root) = &config.assets.root {
            let source = DirectorySource::new(root);
            if !source.root().is_dir() {
                tracing::warn!(root = %root, "Asset root is not a directory");
            }
            assets.push_source(source);
        }

        let extractor = Arc::new(FieldExtractor::new(config.socket.identity_field.clone()));
        let hub = SocketHub::new(extractor, ConnectionRegistry::new());

        Self {
            config,
            routes: PathRouter::new(),
            assets,
            hub,
        }
    }

    /// Replace the identity extractor.
    pub fn with_extractor(mut self, extractor: impl IdentityExtractor) -> Self {
        self.hub.set_extractor(Arc::new(extractor));
        self
    }

    /// Append a resource source after those already configured.
    pub fn add_source(&mut self, source: impl ResourceSource + 'static) -> &mut Self {
        self.assets.push_source(source);
        self
    }

    /// Route `pattern` to `handler`. A trailing `*` matches any suffix.
    pub fn register(&mut self, pattern: &str, handler: impl HttpHandler) -> &mut Self {
        self.routes.register(pattern, Arc::new(handler));
        self
    }

    /// Handle inbound socket events on `channel`.
    pub fn register_channel(&mut self, channel: &str, handler: impl ChannelHandler) -> &mut Self {
        self.hub.register_channel(channel, Arc::new(handler));
        self
    }

    /// Shared registry of bound identities.
    pub fn registry(&self) -> ConnectionRegistry {
        self.hub.registry().clone()
    }

    /// Send an event to the connection bound to `identity`, if any.
    pub fn send(&self, identity: i64, channel: &str, payload: Option<&JsonObject>) -> bool {
        self.hub.send(identity, channel, payload)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn into_router(self) -> Router {
        let request_timeout = Duration::from_secs(self.config.timeouts.request_secs);
        let socket_path = self.config.socket.path.clone();

        let state = AppState {
            routes: Arc::new(self.routes),
            assets: Arc::new(self.assets),
            hub: Arc::new(self.hub),
            max_body_size: self.config.security.max_body_size,
        };

        Router::new()
            .route(&socket_path, any(ws_handler))
            .fallback(gateway_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.len(),
            channels = self.hub.channel_count(),
            asset_sources = self.assets.source_count(),
            socket_path = %self.config.socket.path,
            "Gateway starting"
        );

        let app = self.into_router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Fallback handler: routed JSON endpoints first, static assets second.
pub(crate) async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let path = normalize_path(request.uri().path()).to_string();

    if let Some((pattern, handler)) = state.routes.resolve_entry(request.uri().path()) {
        let handler = Arc::clone(handler);
        tracing::debug!(
            request_id = %request_id,
            method = %request.method(),
            path = %path,
            pattern = %pattern,
            "Routing request"
        );

        let query = RequestQuery::from_parts(request.method(), request.uri());
        let body = read_json_body(request.into_body(), state.max_body_size).await;
        let (responder, reply) = Responder::channel();
        handler.handle(query, body, responder);

        let response = match reply.await {
            Ok(reply) => json_response(reply),
            Err(_) => {
                tracing::warn!(request_id = %request_id, path = %path, "Handler dropped responder without replying");
                internal_error()
            }
        };
        metrics::record_request(RequestKind::Routed, response.status().as_u16(), start_time);
        return response;
    }

    let assets = Arc::clone(&state.assets);
    let lookup_path = path.clone();
    match tokio::task::spawn_blocking(move || assets.resolve(&lookup_path)).await {
        Ok(Some(asset)) => {
            tracing::debug!(request_id = %request_id, path = %path, mime_type = %asset.mime_type, "Serving asset");
            metrics::record_request(RequestKind::Static, 200, start_time);
            asset_response(asset)
        }
        Ok(None) => {
            tracing::debug!(request_id = %request_id, path = %path, "No route or asset");
            metrics::record_request(RequestKind::NotFound, 404, start_time);
            not_found()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Asset lookup failed");
            metrics::record_request(RequestKind::Static, 500, start_time);
            internal_error()
        }
    }
}
