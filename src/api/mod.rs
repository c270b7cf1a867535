use crate::cli::globals::Config;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Extension, Router,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub(crate) mod email;
pub(crate) mod error;
pub(crate) mod handlers;
mod openapi;
pub(crate) mod store;

pub use email::{EmailSender, LogEmailSender};
pub use handlers::auth::{Role, TokenKeys};

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, config: Config) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let token_keys = Arc::new(TokenKeys::new(&config));
    let sender: Arc<dyn EmailSender> = Arc::new(LogEmailSender);

    let app = router(pool, token_keys, sender);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Build the application router with all routes and layers registered.
#[must_use]
pub fn router(pool: PgPool, token_keys: Arc<TokenKeys>, sender: Arc<dyn EmailSender>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/login", post(handlers::auth::login::login))
        .route(
            "/auth/forgot-password",
            post(handlers::auth::recovery::forgot_password),
        )
        .route(
            "/auth/verify-otp",
            post(handlers::auth::recovery::verify_otp),
        )
        .route(
            "/auth/reset-password",
            post(handlers::auth::recovery::reset_password),
        )
        .route(
            "/attendance/check-in",
            post(handlers::attendance::stamp::check_in),
        )
        .route(
            "/attendance/check-out",
            post(handlers::attendance::stamp::check_out),
        )
        .route(
            "/attendance/mine",
            get(handlers::attendance::reports::my_attendance),
        )
        .route(
            "/attendance/logs",
            get(handlers::attendance::reports::logs),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(pool))
                .layer(Extension(token_keys))
                .layer(Extension(sender)),
        )
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
