use std::time::Duration;

use super::transport::Method;

pub const DEFAULT_ENDPOINT: &str = "https://staging.instamojo.com/api/1/";
pub const DEFAULT_APP_ID: &str = "test";
pub const DEFAULT_AUTH_HEADER: &str = "X-Auth-Token";
pub const APP_ID_HEADER: &str = "X-App-Id";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Per-client settings. Passed to the constructor; nothing here is global.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL, always ending in `/`.
    pub endpoint: String,
    pub app_id: String,
    /// Header carrying the bearer token. Deployments disagree on the name.
    pub auth_header: String,
    pub allowed_methods: Vec<Method>,
    /// Treat an unreadable token file as an error instead of "no session".
    pub strict_token_load: bool,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            app_id: DEFAULT_APP_ID.to_string(),
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            allowed_methods: Method::ALL.to_vec(),
            strict_token_load: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = normalize_endpoint(endpoint);
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    /// Join a relative API path onto the endpoint.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path.trim_start_matches('/'))
    }

    pub fn allows(&self, method: Method) -> bool {
        self.allowed_methods.contains(&method)
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
