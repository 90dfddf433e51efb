//! Imprint Kernel REST Service
//!
//! Exposes the filter, aggregation and network computations over HTTP.
//! Every request recomputes from the shared catalog; no per-request state
//! survives the response.
//!
//! ## Endpoints
//!
//! - `POST /api/filter` - Filtered publication rows
//! - `POST /api/aggregate` - Grouped counts (preset or explicit query)
//! - `POST /api/contingency` - Cross-tabulation for correspondence analysis
//! - `POST /api/graph` - Printer–author network with metrics and layout
//! - `POST /api/printers` - Printers visible on the map
//! - `GET /api/options/:dimension` - Selector options
//! - `GET /health` - Dataset and configuration summary
//! - `GET /health/live` - Liveness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{normalize_path, request_logging_middleware};
pub use routes::create_router;
pub use state::ServiceState;
