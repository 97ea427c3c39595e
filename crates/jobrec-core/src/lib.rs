//! JobRec Core
//!
//! Types and errors shared across JobRec components.
//!
//! This crate provides:
//! - The workspace-wide error type and `Result` alias
//! - Wire types for the recommendation API

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{RecommendRequest, RecommendResponse, Recommendations, StatusMessage};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{RecommendRequest, RecommendResponse, Recommendations};
}
