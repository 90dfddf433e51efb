//! Axum routes for the imprint service.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aggregate::{aggregate, contingency, Aggregate, AggregateQuery, ContingencyTable, Preset};
use crate::catalog::DatasetSnapshot;
use crate::filter;
use crate::graph::{build_subgraph, GraphSelection, GraphStatus, PrinterNetwork};
use crate::types::{
    Dimension, FilterRequest, FilterSpec, InvalidFilterError, Printer, PublicationRecord, Relation,
};
use crate::IMPRINT_KERNEL_SCHEMA_VERSION;

use super::state::ServiceState;

/// Default year bin width for interval presets.
pub const DEFAULT_INTERVAL: i32 = 5;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Why a filter selection produced an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidFilter {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&InvalidFilterError> for InvalidFilter {
    fn from(err: &InvalidFilterError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Filtered rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResponse {
    /// Rows after filtering and deduplication.
    pub rows: Vec<PublicationRecord>,
    /// Number of rows.
    pub row_count: usize,
    /// Number of distinct works.
    pub work_count: usize,
    /// Fingerprint of the resolved selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Set when the selection could not be evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_filter: Option<InvalidFilter>,
}

/// Aggregation request: a filter plus a preset or an explicit query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRequest {
    /// Filter selection.
    #[serde(default)]
    pub filter: FilterRequest,
    /// Named chart preset.
    #[serde(default)]
    pub preset: Option<Preset>,
    /// Explicit query. Takes precedence over `preset`.
    #[serde(default)]
    pub query: Option<AggregateQuery>,
    /// Year bin width for interval presets.
    #[serde(default)]
    pub interval: Option<i32>,
}

/// Aggregation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// Groups and counts.
    pub aggregate: Aggregate,
    /// Set when the selection could not be evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_filter: Option<InvalidFilter>,
}

/// Contingency request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContingencyRequest {
    /// Filter selection.
    #[serde(default)]
    pub filter: FilterRequest,
    /// Row dimension.
    pub rows: Dimension,
    /// Column dimension.
    pub cols: Dimension,
}

/// Contingency result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContingencyResponse {
    /// The table.
    pub table: ContingencyTable,
    /// Whether the table is large enough for correspondence analysis.
    pub sufficient: bool,
    /// Set when the selection could not be evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_filter: Option<InvalidFilter>,
}

/// Network result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphResponse {
    /// Nodes, edges, layout and metrics.
    pub network: PrinterNetwork,
    /// Resolved printer selection.
    pub selected_printers: Vec<String>,
    /// Set when the selection could not be evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_filter: Option<InvalidFilter>,
}

/// Map printers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintersResponse {
    /// Visible printers, sorted by name.
    pub printers: Vec<Printer>,
    /// Set when the selection could not be evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_filter: Option<InvalidFilter>,
}

/// Selector options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    /// Dimension the options belong to.
    pub dimension: Dimension,
    /// Sorted distinct values.
    pub options: Vec<String>,
}

/// Service health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub schema_version: String,
    /// Loaded dataset.
    pub dataset: DatasetSnapshot,
    /// Engine configuration fingerprint.
    pub config_hash: String,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(code = %self.code, error = %self.error, "Request error");
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Resolve a loose request against the dataset bounds.
fn resolve(state: &ServiceState, request: FilterRequest) -> Result<FilterSpec, InvalidFilter> {
    request
        .into_spec(state.catalog.year_bounds())
        .map_err(|err| {
            tracing::warn!(error = %err, code = err.code(), "Invalid filter, returning empty result");
            InvalidFilter::from(&err)
        })
}

/// Filtered rows.
async fn filter_handler(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<FilterRequest>,
) -> Json<FilterResponse> {
    let response = match resolve(&state, request) {
        Ok(spec) => {
            let filtered = filter::apply(state.catalog.relation(), &spec);
            FilterResponse {
                row_count: filtered.len(),
                work_count: filtered.distinct_works(),
                rows: filtered.into_rows(),
                fingerprint: Some(spec.fingerprint()),
                invalid_filter: None,
            }
        }
        Err(invalid) => FilterResponse {
            rows: Vec::new(),
            row_count: 0,
            work_count: 0,
            fingerprint: None,
            invalid_filter: Some(invalid),
        },
    };
    Json(response)
}

/// Grouped counts.
async fn aggregate_handler(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<AggregateRequest>,
) -> Result<Json<AggregateResponse>, ErrorResponse> {
    let query = match (request.query, request.preset) {
        (Some(query), _) => query,
        (None, Some(preset)) => preset.query(request.interval.unwrap_or(DEFAULT_INTERVAL)),
        (None, None) => {
            return Err(ErrorResponse::new(
                "MISSING_QUERY",
                "Either `query` or `preset` is required",
            ))
        }
    };
    query
        .validate()
        .map_err(|e| ErrorResponse::new(e.code(), e.to_string()))?;

    let (relation, invalid_filter) = match resolve(&state, request.filter) {
        Ok(spec) => (filter::apply(state.catalog.relation(), &spec), None),
        Err(invalid) => (Relation::empty(), Some(invalid)),
    };

    let aggregate = aggregate(&relation, &query)
        .map_err(|e| ErrorResponse::new(e.code(), e.to_string()))?;

    Ok(Json(AggregateResponse {
        aggregate,
        invalid_filter,
    }))
}

/// Contingency table.
async fn contingency_handler(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<ContingencyRequest>,
) -> Result<Json<ContingencyResponse>, ErrorResponse> {
    if request.rows == Dimension::Year || request.cols == Dimension::Year {
        return Err(ErrorResponse::new(
            "NOT_CATEGORICAL",
            "Contingency tables need two categorical dimensions",
        )
        .with_details(format!("rows={}, cols={}", request.rows, request.cols)));
    }

    let (relation, invalid_filter) = match resolve(&state, request.filter) {
        Ok(spec) => (filter::apply(state.catalog.relation(), &spec), None),
        Err(invalid) => (Relation::empty(), Some(invalid)),
    };

    let table = contingency(&relation, request.rows, request.cols);
    Ok(Json(ContingencyResponse {
        sufficient: table.is_sufficient(state.config.min_contingency_dim),
        table,
        invalid_filter,
    }))
}

/// Printer–author network.
async fn graph_handler(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<FilterRequest>,
) -> Json<GraphResponse> {
    let response = match resolve(&state, request) {
        Ok(spec) => {
            let selection = GraphSelection::resolve(&state.catalog, &spec);
            let filtered = filter::apply(state.catalog.relation(), &spec);
            GraphResponse {
                network: build_subgraph(&filtered, &selection.printers, &state.config.layout),
                selected_printers: selection.printers.into_iter().collect(),
                invalid_filter: None,
            }
        }
        Err(invalid) => GraphResponse {
            network: PrinterNetwork::degenerate(GraphStatus::Empty),
            selected_printers: Vec::new(),
            invalid_filter: Some(invalid),
        },
    };
    Json(response)
}

/// Printers visible on the map.
async fn printers_handler(
    State(state): State<Arc<ServiceState>>,
    Json(request): Json<FilterRequest>,
) -> Json<PrintersResponse> {
    let response = match resolve(&state, request) {
        Ok(spec) => PrintersResponse {
            printers: state.catalog.directory().visible(&spec),
            invalid_filter: None,
        },
        Err(invalid) => PrintersResponse {
            printers: Vec::new(),
            invalid_filter: Some(invalid),
        },
    };
    Json(response)
}

/// Selector options for a dimension.
async fn options_handler(
    State(state): State<Arc<ServiceState>>,
    Path(dimension): Path<String>,
) -> Result<Json<OptionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let parsed = Dimension::parse_name(&dimension).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "UNKNOWN_DIMENSION",
                format!("Unknown dimension: {}", dimension),
            )),
        )
    })?;

    Ok(Json(OptionsResponse {
        dimension: parsed,
        options: state.catalog.options(parsed),
    }))
}

/// Health check endpoint (detailed).
async fn health_handler(State(state): State<Arc<ServiceState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: IMPRINT_KERNEL_SCHEMA_VERSION.to_string(),
        dataset: state.catalog.snapshot().clone(),
        config_hash: state.config_hash(),
    })
}

/// Liveness probe endpoint.
///
/// Returns 200 if the process is alive.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the imprint service.
pub fn create_router(state: ServiceState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/filter", post(filter_handler))
        .route("/api/aggregate", post(aggregate_handler))
        .route("/api/contingency", post(contingency_handler))
        .route("/api/graph", post(graph_handler))
        .route("/api/printers", post(printers_handler))
        .route("/api/options/:dimension", get(options_handler))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .with_state(state)
}
