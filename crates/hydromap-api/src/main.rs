//! hydromap-api - HTTP API server for the hydromap catalog

mod handlers;

use std::net::SocketAddr;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use hydromap_core::{ApiConfig, NullModelTypePolicy};
use hydromap_db::Database;

use handlers::{
    perceptual_models::{
        get_perceptual_model, get_perceptual_model_citation, get_perceptual_model_location,
        get_perceptual_model_model_type, get_perceptual_model_process_taxonomies,
        get_perceptual_model_recursive, get_perceptual_model_spatial_zone_type,
        get_perceptual_model_temporal_zone_type, list_perceptual_models,
        list_perceptual_models_recursive, perceptual_model_geojson, perceptual_models_geojson,
    },
    statistics::{model_count, model_type_count},
    taxonomy::{list_process_taxonomies, list_spatial_zones, list_temporal_zones},
};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically, which helps
/// log correlation and debugging.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Database,
    /// What `model_type_count` does with models whose model type is null.
    null_model_type_policy: NullModelTypePolicy,
}

/// OpenAPI documentation, served through Swagger UI at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "HydroMap Catalog API",
        version = "0.3.0",
        description = "Read-only catalog of perceptual models of hydrological processes: \
                       geotagged field observations linked to citations, process taxonomies, \
                       and zone/model classifications"
    ),
    paths(
        handlers::perceptual_models::list_perceptual_models,
        handlers::perceptual_models::get_perceptual_model,
        handlers::perceptual_models::list_perceptual_models_recursive,
        handlers::perceptual_models::get_perceptual_model_recursive,
        handlers::perceptual_models::perceptual_models_geojson,
        handlers::perceptual_models::perceptual_model_geojson,
        handlers::perceptual_models::get_perceptual_model_location,
        handlers::perceptual_models::get_perceptual_model_citation,
        handlers::perceptual_models::get_perceptual_model_spatial_zone_type,
        handlers::perceptual_models::get_perceptual_model_temporal_zone_type,
        handlers::perceptual_models::get_perceptual_model_model_type,
        handlers::perceptual_models::get_perceptual_model_process_taxonomies,
        handlers::taxonomy::list_process_taxonomies,
        handlers::taxonomy::list_spatial_zones,
        handlers::taxonomy::list_temporal_zones,
        handlers::statistics::model_type_count,
        handlers::statistics::model_count,
    ),
    components(schemas(
        hydromap_core::PerceptualModel,
        hydromap_core::PerceptualModelBundle,
        hydromap_core::Location,
        hydromap_core::Citation,
        hydromap_core::SpatialZoneType,
        hydromap_core::TemporalZoneType,
        hydromap_core::ModelType,
        hydromap_core::FunctionType,
        hydromap_core::ProcessTaxonomy,
        hydromap_core::ProcessTaxonomyEntry,
        hydromap_core::ProcessAltName,
        hydromap_core::LinkedProcessTaxonomy,
        hydromap_core::ModelTypeCountRequest,
        hydromap_geo::Feature,
        hydromap_geo::FeatureCollection,
        hydromap_geo::GeoJsonGeometry,
    )),
    tags(
        (name = "Perceptual models", description = "Catalog reads and GeoJSON projection"),
        (name = "Lookups", description = "Process taxonomy and zone type tables"),
        (name = "Statistics", description = "Filtered counting endpoints"),
        (name = "System", description = "Health checks")
    )
)]
struct ApiDoc;

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Development origins used when the configured whitelist is empty.
const DEFAULT_DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Convert the configured origin whitelist into header values.
///
/// Origins that fail to parse are logged and skipped; an empty result falls
/// back to the local development origins. Wildcards are never used.
fn parse_origin_values(origins: &[String]) -> Vec<HeaderValue> {
    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if values.is_empty() {
        return DEFAULT_DEV_ORIGINS
            .iter()
            .map(|origin| HeaderValue::from_static(origin))
            .collect();
    }
    values
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_origin_values(origins)))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router.
///
/// Collection endpoints answer with and without the trailing slash; the
/// published paths carry it.
fn build_router(state: AppState, config: &ApiConfig) -> Router {
    let mut openapi = ApiDoc::openapi();
    if let Some(base_url) = &config.public_base_url {
        openapi.servers = Some(vec![utoipa::openapi::Server::new(base_url)]);
    }

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi))
        // Perceptual models
        .route("/perceptual_model", get(list_perceptual_models))
        .route("/perceptual_model/", get(list_perceptual_models))
        .route(
            "/perceptual_model/recursive",
            get(list_perceptual_models_recursive),
        )
        .route(
            "/perceptual_model/recursive/:id",
            get(get_perceptual_model_recursive),
        )
        .route("/perceptual_model/geojson", get(perceptual_models_geojson))
        .route(
            "/perceptual_model/geojson/:id",
            get(perceptual_model_geojson),
        )
        .route("/perceptual_model/:id", get(get_perceptual_model))
        .route(
            "/perceptual_model/:id/location",
            get(get_perceptual_model_location),
        )
        .route(
            "/perceptual_model/:id/citation",
            get(get_perceptual_model_citation),
        )
        .route(
            "/perceptual_model/:id/spatial_zone_type",
            get(get_perceptual_model_spatial_zone_type),
        )
        .route(
            "/perceptual_model/:id/temporal_zone_type",
            get(get_perceptual_model_temporal_zone_type),
        )
        .route(
            "/perceptual_model/:id/model_type",
            get(get_perceptual_model_model_type),
        )
        .route(
            "/perceptual_model/:id/process_taxonomies",
            get(get_perceptual_model_process_taxonomies),
        )
        // Lookup tables
        .route("/process_taxonomy", get(list_process_taxonomies))
        .route("/process_taxonomy/", get(list_process_taxonomies))
        .route("/spatial_zone", get(list_spatial_zones))
        .route("/spatial_zone/", get(list_spatial_zones))
        .route("/temporal_zone", get(list_temporal_zones))
        .route("/temporal_zone/", get(list_temporal_zones))
        // Filter pickers for the visualization client
        .route("/filters/process_taxonomies", get(list_process_taxonomies))
        .route("/filters/spatial_zones", get(list_spatial_zones))
        .route("/filters/temporal_zones", get(list_temporal_zones))
        // Statistics
        .route("/statistics/model_type_count", post(model_type_count))
        .route("/statistics/model_count", get(model_count))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "hydromap_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hydromap_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("hydromap-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Read configuration once; components receive it at construction
    let config = ApiConfig::from_env()?;
    info!(
        host = %config.host,
        port = config.port,
        null_model_type_policy = ?config.null_model_type_policy,
        "Configuration loaded"
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    hydromap_db::log_pool_metrics(&db.pool);
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    let state = AppState {
        db,
        null_model_type_policy: config.null_model_type_policy.clone(),
    };
    let app = build_router(state, &config);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Database(hydromap_core::Error),
    NotFound(String),
    BadRequest(String),
    DataIntegrity(String),
}

impl From<hydromap_core::Error> for ApiError {
    fn from(err: hydromap_core::Error) -> Self {
        match err {
            hydromap_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            hydromap_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            hydromap_core::Error::DataIntegrity(msg) => ApiError::DataIntegrity(msg),
            hydromap_core::Error::Geometry(msg) => ApiError::DataIntegrity(msg),
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::DataIntegrity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydromap_core::Error;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DataIntegrity("x".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Database(Error::Internal("x".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_errors_map_to_client_visible_statuses() {
        let err: ApiError = Error::NotFound("perceptual model 42 not found".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = Error::DataIntegrity("location 7 has no geometry".into()).into();
        assert!(matches!(err, ApiError::DataIntegrity(_)));

        // Undecodable geometry is a data problem, not a server fault
        let err: ApiError = Error::Geometry("truncated WKB buffer".into()).into();
        assert!(matches!(err, ApiError::DataIntegrity(_)));

        let err: ApiError = Error::InvalidInput("bad id".into()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_parse_origin_values_keeps_valid_origins() {
        let origins = vec![
            "https://hydromap.org".to_string(),
            "http://localhost:5173".to_string(),
        ];
        let values = parse_origin_values(&origins);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].to_str().unwrap(), "https://hydromap.org");
    }

    #[test]
    fn test_parse_origin_values_skips_invalid_and_defaults_when_empty() {
        let values = parse_origin_values(&["bad\norigin".to_string()]);
        assert_eq!(
            values
                .iter()
                .map(|v| v.to_str().unwrap())
                .collect::<Vec<_>>(),
            DEFAULT_DEV_ORIGINS.to_vec()
        );

        let values = parse_origin_values(&[]);
        assert_eq!(values.len(), DEFAULT_DEV_ORIGINS.len());
    }

    #[test]
    fn test_request_ids_are_uuid_v7() {
        let mut maker = MakeRequestUuidV7;
        let request = axum::http::Request::new(());
        let id = maker.make_request_id(&request).expect("request id");
        let parsed = Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }
}
