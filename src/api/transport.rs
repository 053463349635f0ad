//! HTTP transport seam for the API client.
//!
//! `ApiClient` only builds requests and interprets responses; the bytes go
//! over the wire through a [`Transport`]. The real implementation is a
//! blocking reqwest client, tests swap in a recording mock.

use std::fmt;
use std::fs::File;
use std::time::{Duration, Instant};

use log::debug;
use reqwest::blocking::{multipart, Client};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult};

/// HTTP verbs the client knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Put, Method::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built API request: absolute URL, headers and form parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
}

#[cfg(test)]
impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An opened local file to be streamed as a single multipart field.
#[derive(Debug)]
pub struct FileUpload {
    pub field: &'static str,
    pub file_name: String,
    pub file: File,
    pub length: u64,
}

/// Status and undecoded body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub trait Transport {
    /// Send a request built by the client and return the raw response.
    fn send(&self, request: &ApiRequest) -> ApiResult<RawResponse>;

    /// POST a file as `multipart/form-data` to an absolute URL.
    fn upload(&self, url: &str, upload: FileUpload) -> ApiResult<RawResponse>;
}

/// Blocking reqwest transport used by the CLI.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("instamojo/{}", env!("INSTAMOJO_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn finish(
        response: reqwest::Result<reqwest::blocking::Response>,
        start: Instant,
    ) -> ApiResult<RawResponse> {
        // URLs can carry the session token
        let response = response.map_err(|e| {
            let e = e.without_url();
            debug!("  network error after {:?}: {}", start.elapsed(), e);
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ApiError::Transport(format!("failed to read body: {}", e.without_url())))?;
        debug!(
            "  response: {} in {:?} ({} bytes)",
            status,
            start.elapsed(),
            body.len()
        );

        Ok(RawResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.params.is_empty() {
            builder = builder.form(&request.params);
        }

        let start = Instant::now();
        Self::finish(builder.send(), start)
    }

    fn upload(&self, url: &str, upload: FileUpload) -> ApiResult<RawResponse> {
        debug!(
            "POST {} (multipart field '{}', {} bytes)",
            url,
            upload.field,
            upload.length
        );

        let part =
            multipart::Part::reader_with_length(upload.file, upload.length).file_name(upload.file_name);
        let form = multipart::Form::new().part(upload.field, part);

        let start = Instant::now();
        Self::finish(self.client.post(url).multipart(form).send(), start)
    }
}

/// Transport that records every request and replays canned responses in order.
#[cfg(test)]
#[derive(Default)]
pub struct MockTransport {
    responses: std::cell::RefCell<std::collections::VecDeque<RawResponse>>,
    pub requests: std::cell::RefCell<Vec<ApiRequest>>,
    pub uploads: std::cell::RefCell<Vec<(String, RecordedUpload)>>,
}

/// What [`MockTransport`] saw of an upload, with the file contents read out.
#[cfg(test)]
#[derive(Debug)]
pub struct RecordedUpload {
    pub field: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
impl MockTransport {
    /// Queue a 200 response with the given body.
    pub fn respond(self, body: &str) -> Self {
        self.responses.borrow_mut().push_back(RawResponse {
            status: 200,
            body: body.to_string(),
        });
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.borrow().len() + self.uploads.borrow().len()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests.borrow().last().cloned().expect("no request recorded")
    }

    fn next_response(&self) -> ApiResult<RawResponse> {
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ApiError::Transport("mock transport has no queued response".to_string()))
    }
}

#[cfg(test)]
impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
        self.requests.borrow_mut().push(request.clone());
        self.next_response()
    }

    fn upload(&self, url: &str, mut upload: FileUpload) -> ApiResult<RawResponse> {
        use std::io::Read;

        let mut bytes = Vec::new();
        upload
            .file
            .read_to_end(&mut bytes)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let recorded = RecordedUpload {
            field: upload.field,
            file_name: upload.file_name,
            bytes,
        };
        self.uploads.borrow_mut().push((url.to_string(), recorded));
        self.next_response()
    }
}
