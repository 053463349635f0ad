use std::fs::File;
use std::path::Path;

use log::debug;
use serde_json::Value;

use super::config::{ClientConfig, APP_ID_HEADER};
use super::session;
use super::transport::{ApiRequest, FileUpload, HttpTransport, Method, Transport};
use super::types::{AuthResponse, StatusResponse};
use super::{ApiError, ApiResult};

/// Multipart field name the upload endpoint expects.
const UPLOAD_FIELD: &str = "fileUpload";

/// Truncate a string at a UTF-8 character boundary.
fn safe_prefix(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max_len)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// Placeholder logged in place of secrets.
const REDACTED: &str = "<redacted>";

/// Truncate a string for log output, appending "..." if truncated.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", safe_prefix(s, max_len))
    }
}

/// Blank out a `token` field in a JSON response body.
fn redact_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut map)) if map.contains_key("token") => {
            map.insert("token".to_string(), Value::String(REDACTED.to_string()));
            Value::Object(map).to_string()
        }
        _ => body.to_string(),
    }
}

/// Percent-encode a value used as a single path segment.
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub struct ApiClient<T = HttpTransport> {
    config: ClientConfig,
    token: Option<String>,
    transport: T,
}

impl ApiClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            token: None,
            transport,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The held token, or [`ApiError::NoToken`] if there is none.
    pub fn require_token(&self) -> ApiResult<&str> {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ApiError::NoToken),
        }
    }

    /// Replace the held token wherever it appears in `text`.
    fn redact(&self, text: &str) -> String {
        match self.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => text.replace(token, REDACTED).replace(&segment(token), REDACTED),
            None => text.to_string(),
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![(APP_ID_HEADER.to_string(), self.config.app_id.clone())];
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            headers.push((self.config.auth_header.clone(), token.to_string()));
        }
        headers
    }

    /// Build, send and decode a single API call.
    fn request(&self, method: Method, path: &str, params: Vec<(String, String)>) -> ApiResult<Value> {
        if !self.config.allows(method) {
            return Err(ApiError::UnsupportedMethod(method));
        }

        let request = ApiRequest {
            method,
            url: self.config.url_for(path),
            headers: self.headers(),
            params,
        };

        debug!("{} {}", request.method, self.redact(&request.url));
        debug!(
            "  parameters: [{}]",
            request
                .params
                .iter()
                .map(|(k, _)| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        debug!(
            "  headers: [{}]",
            request
                .headers
                .iter()
                .map(|(k, _)| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let response = self.transport.send(&request)?;
        debug!(
            "  response preview: {}",
            truncate_for_log(&self.redact(&redact_body(&response.body)), 200)
        );

        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!("  decode error (HTTP {}): {}", response.status, e);
                Err(ApiError::ResponseDecode {
                    body: response.body,
                    reason: e.to_string(),
                })
            }
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub fn debug(&self) -> ApiResult<Value> {
        self.request(Method::Get, "debug/", Vec::new())
    }

    /// Exchange credentials for a token.
    ///
    /// The token is stored only when the server reports success. A failed
    /// login is not an error: the response is returned and any previously
    /// held token is kept.
    pub fn authenticate(&mut self, username: &str, password: &str) -> ApiResult<Value> {
        let params = vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        let response = self.request(Method::Post, "auth/", params)?;

        match AuthResponse::issued_token(&response) {
            Some(token) => {
                debug!("Authenticated as {} ({} char token)", username, token.len());
                self.token = Some(token);
            }
            None => debug!("Authentication for {} did not succeed", username),
        }

        Ok(response)
    }

    /// Revoke the held token server-side. Clears it locally on success.
    pub fn revoke_token(&mut self) -> ApiResult<Value> {
        let path = format!("auth/{}/", segment(self.require_token()?));
        let response = self.request(Method::Delete, &path, Vec::new())?;

        if StatusResponse::succeeded(&response) {
            self.token = None;
        }
        Ok(response)
    }

    pub fn save_token(&self, path: &Path) -> ApiResult<()> {
        session::save(path, self.token.as_deref())
    }

    /// Restore a token saved by [`save_token`](Self::save_token).
    ///
    /// Returns whether a token is held afterwards. A missing or unreadable
    /// file leaves the session untouched unless `strict_token_load` is set.
    pub fn load_token(&mut self, path: &Path) -> ApiResult<bool> {
        if let Some(token) = session::load(path, self.config.strict_token_load)? {
            self.token = token.filter(|t| !t.is_empty());
        }
        Ok(self.require_token().is_ok())
    }

    // ========================================================================
    // Offers
    // ========================================================================

    pub fn list_offers(&self) -> ApiResult<Value> {
        self.require_token()?;
        self.request(Method::Get, "offer", Vec::new())
    }

    pub fn get_offer(&self, slug: &str) -> ApiResult<Value> {
        self.require_token()?;
        self.request(Method::Get, &format!("offer/{}/", segment(slug)), Vec::new())
    }

    pub fn delete_offer(&self, slug: &str) -> ApiResult<Value> {
        self.require_token()?;
        self.request(Method::Delete, &format!("offer/{}/", segment(slug)), Vec::new())
    }

    /// Create an offer from arbitrary form fields, sent in iteration order.
    pub fn create_offer<I, K, V>(&self, fields: I) -> ApiResult<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.require_token()?;
        let params = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.request(Method::Post, "offer/", params)
    }

    // ========================================================================
    // File uploads
    // ========================================================================

    pub fn get_file_upload_url(&self) -> ApiResult<Value> {
        self.request(Method::Get, "offer/get_file_upload_url/", Vec::new())
    }

    /// Stream a local file to `upload_url` and return the body undecoded.
    ///
    /// The body is a file reference owned by the server; callers hand it
    /// back verbatim as `file_upload_json`.
    pub fn upload_file(&self, upload_url: &str, file_path: &Path) -> ApiResult<String> {
        let upload_error = |source: std::io::Error| ApiError::UploadFile {
            path: file_path.to_path_buf(),
            source,
        };
        let file = File::open(file_path).map_err(upload_error)?;
        let length = file.metadata().map_err(upload_error)?.len();
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let upload = FileUpload {
            field: UPLOAD_FIELD,
            file_name,
            file,
            length,
        };
        let response = self.transport.upload(upload_url, upload)?;
        Ok(response.body)
    }

    /// Ask the API for an upload URL, then upload `file_path` to it.
    pub fn upload_offer_file(&self, file_path: &Path) -> ApiResult<String> {
        let response = self.get_file_upload_url()?;
        let upload_url = StatusResponse::upload_url(&response)
            .ok_or(ApiError::UploadUrlUnavailable(response))?;
        self.upload_file(&upload_url, file_path)
    }
}
