//! # Coachline API
//!
//! The web server for the Coachline coaching site. It serves the coach and
//! client screens as JSON views, gates every route by role, and forwards
//! all writes to the hosted backend.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define endpoints and URL structure per audience
//! - **Handlers**: Read views through the cache and forward actions
//! - **Middleware**: Session transport, route access and error mapping
//! - **Cache / Signals**: Per-user view cache and its single invalidation path
//! - **Config**: Environment configuration

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement the screens and actions
pub mod handlers;
/// Middleware for sessions, access control and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

pub mod cache;
pub mod in_flight;
pub mod signals;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
};
use coachline_remote::{
    AuthApi, BackendClient, BookingRepo, LessonRepo, MessageRepo, ProfileRepo, ScheduleRepo,
};
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::{cache::ViewCache, config::ApiConfig, in_flight::InFlight, signals::ChangeSignals};

/// Buffered change events per subscriber before it starts lagging.
const SIGNAL_CAPACITY: usize = 256;

/// The backend behind each repository seam.
#[derive(Clone)]
pub struct Backends {
    pub auth: Arc<dyn AuthApi>,
    pub profiles: Arc<dyn ProfileRepo>,
    pub schedule: Arc<dyn ScheduleRepo>,
    pub bookings: Arc<dyn BookingRepo>,
    pub lessons: Arc<dyn LessonRepo>,
    pub messages: Arc<dyn MessageRepo>,
}

impl Backends {
    /// Every seam served by the one hosted backend client.
    pub fn from_client(client: BackendClient) -> Self {
        let client = Arc::new(client);
        Self {
            auth: client.clone(),
            profiles: client.clone(),
            schedule: client.clone(),
            bookings: client.clone(),
            lessons: client.clone(),
            messages: client,
        }
    }
}

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use coachline_api::{ApiState, Backends, config::ApiConfig};
/// use coachline_remote::create_client;
///
/// fn example() -> eyre::Result<()> {
///     let config = ApiConfig::from_env()?;
///     let client = create_client(config.remote_config())?;
///     let state = Arc::new(ApiState::new(config, Backends::from_client(client)));
///     let _app = coachline_api::build_router(state);
///     Ok(())
/// }
/// ```
pub struct ApiState {
    pub config: ApiConfig,
    pub auth: Arc<dyn AuthApi>,
    pub profiles: Arc<dyn ProfileRepo>,
    pub schedule: Arc<dyn ScheduleRepo>,
    pub bookings: Arc<dyn BookingRepo>,
    pub lessons: Arc<dyn LessonRepo>,
    pub messages: Arc<dyn MessageRepo>,
    pub cache: ViewCache,
    pub signals: ChangeSignals,
    pub in_flight: InFlight,
}

impl ApiState {
    pub fn new(config: ApiConfig, backends: Backends) -> Self {
        let cache = ViewCache::new(config.cache_ttl());
        let signals = ChangeSignals::new(cache.clone(), SIGNAL_CAPACITY);
        Self {
            config,
            auth: backends.auth,
            profiles: backends.profiles,
            schedule: backends.schedule,
            bookings: backends.bookings,
            lessons: backends.lessons,
            messages: backends.messages,
            cache,
            signals,
            in_flight: InFlight::default(),
        }
    }
}

/// Assembles every route behind the access middleware.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Sign-in, sign-up and account completion
        .merge(routes::auth::routes())
        // Coach screens and actions
        .merge(routes::coach::routes())
        // Client screens and actions
        .merge(routes::client::routes())
        // Settings, change stream and webhooks
        .merge(routes::shared::routes())
        .layer(from_fn_with_state(state.clone(), middleware::access::require_access))
        .with_state(state)
}

/// Starts the API server with the provided configuration and backend
///
/// This function initializes logging, wires the backend into shared state,
/// configures routes and layers, and serves until the process stops.
///
/// # Example
///
/// ```no_run
/// use coachline_api::{Backends, config::ApiConfig, start_server};
/// use coachline_remote::create_client;
///
/// async fn run() -> eyre::Result<()> {
///     let config = ApiConfig::from_env()?;
///     let client = create_client(config.remote_config())?;
///     start_server(config, Backends::from_client(client)).await
/// }
/// ```
pub async fn start_server(config: ApiConfig, backends: Backends) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let addr = config.server_addr();
    let cors_origins = config.cors_origins.clone();
    let request_timeout = Duration::from_secs(config.request_timeout);

    let state = Arc::new(ApiState::new(config, backends));
    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Invalid API_CORS_ORIGINS entry")?;
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request tracing and timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(request_timeout)),
    );

    // Start the HTTP server
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
