//! JobRec HTTP server
//!
//! Exposes the job category classifier over HTTP:
//! - `GET /` liveness message
//! - `POST /recommend` ranked category probabilities
//! - `GET /metrics` Prometheus exposition

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use app::{build_router, run_server};
pub use config::{AppConfig, ServerConfig};
pub use error::AppError;
pub use state::AppState;
