//! Simulated EHR host server.
//!
//! ## Purpose
//! Runs the REST backend the simulated EHR page talks to: launch-context
//! decoding, order catalogs, and order placement against the configured
//! FHIR server.

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ehr_core::{config, CoreError, EhrConfig, OrderSelection, OrderService, Session};
use fhir::{catalog, OrderKind};
use fhir_client::HttpFhirClient;

/// Application state shared across REST API handlers.
#[derive(Clone)]
struct AppState {
    cfg: Arc<EhrConfig>,
    orders: Arc<OrderService<HttpFhirClient>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, smart_config, launch_context, catalog_keys, place_orders, place_phq9_order),
    components(schemas(
        HealthRes,
        SmartConfigRes,
        LaunchContextRes,
        CatalogRes,
        PlaceOrdersReq,
        PlaceOrdersRes,
        Phq9OrderReq,
        ErrorRes
    ))
)]
struct ApiDoc;

/// Main entry point for the simulated EHR host server.
///
/// # Environment Variables
/// - `EHR_ADDR`: server address (default: "0.0.0.0:3000")
/// - `EHR_FHIR_BASE_URL`: FHIR server the orders go to
/// - `EHR_CLIENT_ID`: SMART client id registered for the embedded app
/// - `EHR_SCOPE`: SMART scopes requested for launched sessions
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or FHIR base URL is invalid, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ehr_run=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("EHR_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(EhrConfig::new(
        std::env::var("EHR_FHIR_BASE_URL")
            .unwrap_or_else(|_| config::DEFAULT_FHIR_BASE_URL.into()),
        std::env::var("EHR_CLIENT_ID").unwrap_or_else(|_| config::DEFAULT_CLIENT_ID.into()),
        std::env::var("EHR_SCOPE").unwrap_or_else(|_| config::DEFAULT_SCOPE.into()),
    )?);

    tracing::info!("++ Starting simulated EHR host on {}", addr);
    tracing::info!("++ FHIR server: {}", cfg.fhir_base_url());

    let client = HttpFhirClient::new(cfg.fhir_base_url())?;
    let state = AppState {
        cfg,
        orders: Arc::new(OrderService::new(client)),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/smart/config", get(smart_config))
        .route("/launch/context", get(launch_context))
        .route("/catalog/:kind", get(catalog_keys))
        .route("/orders", post(place_orders))
        .route("/orders/phq9", post(place_phq9_order))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Request/response types
// ============================================================================

#[derive(serde::Serialize, utoipa::ToSchema)]
struct HealthRes {
    ok: bool,
    message: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct SmartConfigRes {
    fhir_base_url: String,
    client_id: String,
    scope: String,
}

#[derive(serde::Deserialize, utoipa::IntoParams)]
struct LaunchQuery {
    /// The token from the embedded app's `launch` query parameter.
    launch: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct LaunchContextRes {
    patients: Vec<String>,
    providers: Vec<String>,
    encounter: String,
    /// Pre-selected patient id, present when the context names exactly one.
    #[serde(skip_serializing_if = "Option::is_none")]
    preselected_patient: Option<String>,
    /// Pre-selected provider id, present when the context names exactly one.
    #[serde(skip_serializing_if = "Option::is_none")]
    preselected_provider: Option<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct CatalogRes {
    kind: String,
    keys: Vec<String>,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
struct PlaceOrdersReq {
    subject_id: String,
    requester_id: String,
    #[serde(default)]
    tests: Vec<String>,
    #[serde(default)]
    treatments: Vec<String>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct PlaceOrdersRes {
    /// The created resources as the FHIR server returned them.
    #[schema(value_type = Vec<Object>)]
    created: Vec<serde_json::Value>,
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
struct Phq9OrderReq {
    subject_id: String,
    requester_id: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
struct ErrorRes {
    error: String,
}

fn error_res(message: impl Into<String>) -> Json<ErrorRes> {
    Json(ErrorRes {
        error: message.into(),
    })
}

/// Map an orchestration error to a response status.
///
/// Validation problems are the caller's to fix (422), upstream rejections
/// surface as a bad gateway, and anything else is internal.
fn order_error_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Order(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::Client(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the host server.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Simulated EHR host is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/smart/config",
    responses(
        (status = 200, description = "SMART client settings for the page", body = SmartConfigRes)
    )
)]
/// The settings the page bootstraps its SMART-on-FHIR client with.
async fn smart_config(State(state): State<AppState>) -> Json<SmartConfigRes> {
    Json(SmartConfigRes {
        fhir_base_url: state.cfg.fhir_base_url().to_string(),
        client_id: state.cfg.client_id().to_string(),
        scope: state.cfg.scope().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/launch/context",
    params(LaunchQuery),
    responses(
        (status = 200, description = "Decoded launch context", body = LaunchContextRes),
        (status = 400, description = "Malformed launch token", body = ErrorRes)
    )
)]
/// Decode a launch token into the context the page pre-populates from.
///
/// A malformed token is reported with its failure detail; the page then
/// skips pre-selection rather than guessing.
async fn launch_context(
    State(_state): State<AppState>,
    Query(query): Query<LaunchQuery>,
) -> Result<Json<LaunchContextRes>, (StatusCode, Json<ErrorRes>)> {
    let ctx = launch::decode(&query.launch)
        .map_err(|e| (StatusCode::BAD_REQUEST, error_res(e.to_string())))?;

    let session = Session::from_launch(&ctx);
    Ok(Json(LaunchContextRes {
        preselected_patient: session.patient().map(|p| p.id.clone()),
        preselected_provider: session.user().map(|u| u.id.clone()),
        patients: ctx.patient_ids,
        providers: ctx.provider_ids,
        encounter: ctx.encounter.to_wire().to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/catalog/{kind}",
    params(
        ("kind" = String, Path, description = "Order kind: diagnostic or therapeutic")
    ),
    responses(
        (status = 200, description = "Catalog keys in definition order", body = CatalogRes),
        (status = 400, description = "Unknown order kind", body = ErrorRes)
    )
)]
/// List the orderable catalog keys for one kind.
async fn catalog_keys(
    State(_state): State<AppState>,
    AxumPath(kind): AxumPath<String>,
) -> Result<Json<CatalogRes>, (StatusCode, Json<ErrorRes>)> {
    let kind = OrderKind::from_wire(&kind).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            error_res(format!("unknown order kind: {kind:?}")),
        )
    })?;

    Ok(Json(CatalogRes {
        kind: kind.to_wire().to_string(),
        keys: catalog::keys(kind).into_iter().map(String::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = PlaceOrdersReq,
    responses(
        (status = 200, description = "All orders created", body = PlaceOrdersRes),
        (status = 422, description = "Unknown catalog key or missing identifier", body = ErrorRes),
        (status = 502, description = "FHIR server rejected a create; batch failed", body = ErrorRes)
    )
)]
/// Place the clinician's selected orders.
///
/// All-or-nothing: the whole selection is validated and built before any
/// create is issued, and an upstream failure fails the batch.
async fn place_orders(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrdersReq>,
) -> Result<Json<PlaceOrdersRes>, (StatusCode, Json<ErrorRes>)> {
    let selection = OrderSelection {
        tests: req.tests,
        treatments: req.treatments,
    };

    match state
        .orders
        .place_orders(&selection, &req.subject_id, &req.requester_id)
        .await
    {
        Ok(created) => Ok(Json(PlaceOrdersRes { created })),
        Err(e) => {
            tracing::error!("Place orders error: {:?}", e);
            Err((order_error_status(&e), error_res(e.to_string())))
        }
    }
}

#[utoipa::path(
    post,
    path = "/orders/phq9",
    request_body = Phq9OrderReq,
    responses(
        (status = 200, description = "PHQ-9 order created", body = PlaceOrdersRes),
        (status = 422, description = "Missing identifier", body = ErrorRes),
        (status = 502, description = "FHIR server rejected the create", body = ErrorRes)
    )
)]
/// Place a PHQ-9 questionnaire order for the patient in context.
async fn place_phq9_order(
    State(state): State<AppState>,
    Json(req): Json<Phq9OrderReq>,
) -> Result<Json<PlaceOrdersRes>, (StatusCode, Json<ErrorRes>)> {
    match state
        .orders
        .place_phq9_order(&req.subject_id, &req.requester_id)
        .await
    {
        Ok(created) => Ok(Json(PlaceOrdersRes {
            created: vec![created],
        })),
        Err(e) => {
            tracing::error!("Place PHQ-9 order error: {:?}", e);
            Err((order_error_status(&e), error_res(e.to_string())))
        }
    }
}
