//! Client for the Instamojo offer-management API.
//!
//! Every operation maps onto a single HTTP call. The only state carried
//! between calls is the bearer token returned by `auth/`.

pub mod client;
pub mod config;
mod session;
pub mod transport;
pub mod types;

use std::path::PathBuf;

use thiserror::Error;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use transport::Method;
pub use types::OfferFields;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No token loaded. Run 'instamojo auth login <username>' first.")]
    NoToken,

    #[error("Unable to decode response ({reason}). Expected JSON, got this:\n\n{body}")]
    ResponseDecode { body: String, reason: String },

    #[error("Unable to open file for saving token: {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to open file for loading token: {}", path.display())]
    TokenLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed token file {}: {reason}", path.display())]
    TokenFile { path: PathBuf, reason: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unable to make an API call for \"{0}\" method")]
    UnsupportedMethod(Method),

    #[error("Unable to read file for upload: {}", path.display())]
    UploadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to get file upload url from API. Got this instead: {0}")]
    UploadUrlUnavailable(serde_json::Value),
}

pub type ApiResult<T> = Result<T, ApiError>;
