//! HTTP client for the clubs backend.
//!
//! Authenticated requests read the token from the injected session right
//! before sending. Without a token, nothing is sent. A 401/403 answer
//! clears the session.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::ClientError;
use crate::auth::SessionStore;
use crate::config::ApiConfig;

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Bearer,
    Anonymous,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

/// Multipart form, kept as plain data so it can be built before sending.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    pub text: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl FilePart {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            field: field.into(),
            file_name,
            bytes,
            mime,
        }
    }

    /// Read an upload from disk.
    pub fn from_path(field: impl Into<String>, path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(field, file_name, bytes))
    }
}

impl MultipartBody {
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    fn into_form(self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (name, value) in self.text {
            form = form.text(name, value);
        }
        for file in self.files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime)?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

/// Build an API path from raw segments, percent-encoding each one.
///
/// `endpoint(&["api", "clubs", "C#"])` is `/api/clubs/C%23`. Empty, `.` and
/// `..` segments are rejected since they cannot name a resource.
pub fn endpoint(segments: &[&str]) -> Result<String, ClientError> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(ClientError::Request(format!("Invalid path segment: {:?}", bad)));
    }
    let mut url = Url::parse("http://localhost/").map_err(|e| ClientError::Request(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Request("URL cannot carry a path".to_string()))?
        .extend(segments);
    Ok(url.path().to_string())
}

/// A single backend call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
    pub auth: Auth,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            auth: Auth::Bearer,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn anonymous(mut self) -> Self {
        self.auth = Auth::Anonymous;
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Abort the request if it has not completed within `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct ApiClient {
    base_url: String,
    http: Client,
    session: Arc<dyn SessionStore>,
    ranking_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("clubhub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            session,
            ranking_timeout: config.ranking_timeout(),
        })
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ranking_timeout(&self) -> Duration {
        self.ranking_timeout
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request and decode the JSON response.
    ///
    /// An empty success body decodes as JSON `null`, so `()`, `Option<_>`
    /// and `Value` all accept it.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let token = match request.auth {
            Auth::Bearer => match self.session.get() {
                Some(token) => Some(token),
                None => {
                    debug!(path = %request.path, "No session token, request not sent");
                    return Err(ClientError::Unauthenticated);
                }
            },
            Auth::Anonymous => None,
        };

        let url = self.url(&request.path);
        let mut builder = self.http.request(request.method.clone(), &url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(body) => builder.multipart(body.into_form()?),
        };

        debug!(method = %request.method, url = %url, "Sending request");
        let response = builder.send().await?;
        let status = response.status();

        if request.auth == Auth::Bearer
            && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
        {
            warn!(%status, path = %request.path, "Backend rejected session token");
            self.session.clear();
            return Err(ClientError::Unauthenticated);
        }

        let body = response.text().await?;
        if !status.is_success() {
            debug!(%status, path = %request.path, "Request failed");
            return Err(ClientError::from_response(status, &body));
        }

        decode(&body)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.execute(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(ApiRequest::delete(path)).await
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    let source = if body.trim().is_empty() { "null" } else { body };
    Ok(serde_json::from_str(source)?)
}
