use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    response::Response,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CorsConfig;

/// Creates the complete middleware stack for the application
pub fn create_middleware_stack(cors: &CorsConfig) -> Result<ServiceBuilder<
    tower::layer::util::Stack<
        CorsLayer,
        tower::layer::util::Stack<
            TraceLayer<
                tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
                DefaultMakeSpan,
                DefaultOnRequest,
                DefaultOnResponse,
            >,
            tower::layer::util::Identity,
        >,
    >,
>> {
    Ok(ServiceBuilder::new()
        // Request/response logging with tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS headers for the front-end origin
        .layer(create_cors_layer(cors)?))
}

/// Builds the CORS layer from the configured origin, methods and headers.
/// Requests from other origins are still served, they just do not get the allow headers.
pub fn create_cors_layer(cors: &CorsConfig) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(&cors.allowed_origin)
        .with_context(|| format!("Invalid CORS origin '{}'", cors.allowed_origin))?;

    let methods = cors
        .allowed_methods
        .iter()
        .map(|m| {
            Method::from_bytes(m.as_bytes()).with_context(|| format!("Invalid CORS method '{}'", m))
        })
        .collect::<Result<Vec<_>>>()?;

    let headers = cors
        .allowed_headers
        .iter()
        .map(|h| {
            HeaderName::from_bytes(h.as_bytes()).with_context(|| format!("Invalid CORS header '{}'", h))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(false))
}

/// Drops the allowed methods and headers from responses that carry no
/// `Access-Control-Allow-Origin`, i.e. requests from an origin outside the policy.
/// Must wrap the CORS layer.
pub async fn strip_unmatched_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    if !headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN) {
        headers.remove(header::ACCESS_CONTROL_ALLOW_METHODS);
        headers.remove(header::ACCESS_CONTROL_ALLOW_HEADERS);
    }
    response
}

/// Initialize structured logging with JSON format
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    // Create environment filter for log levels
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
        )
        .try_init()?;

    tracing::info!("Structured logging initialized with JSON format");
    Ok(())
}
