/*
 * TSI Client - Rust client for the Azure Time Series Insights hierarchies API
 */

// Internal modules
mod client;
pub mod models;  // Make models public
mod apis;
mod error;
mod auth;
mod query;
mod config;


// Re-export public types and interfaces
pub use client::{TsiClient, APPLICATION_NAME_HEADER, CONTINUATION_HEADER};
pub use models::*;
pub use apis::*;
pub use error::{TsiError, TsiResult};
pub use auth::{BearerToken, TokenProvider};
pub use query::{ApiVersion, QueryStringBuilder, DEFAULT_API_VERSION};
pub use config::{
    TsiConfig, DEFAULT_TIMEOUT, ENV_API_VERSION, ENV_APPLICATION_NAME, ENV_ENVIRONMENT_ID,
    ENV_TIMEOUT_SECS,
};

// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        TsiClient, TsiConfig,
        BearerToken, TokenProvider,
        ApiVersion, QueryStringBuilder,
        TsiError, TsiResult,
        // Common model types
        Hierarchy, HierarchyListResult,
        HierarchyBatchRequest, HierarchyBatchResponse,
    };
}
