//! Validate-then-send for every form.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::{validate, FieldErrors, Fields, FormSpec};
use crate::api::{ApiClient, ApiRequest, ClientError, FilePart, MultipartBody, RequestBody};

#[derive(Debug, Clone)]
pub enum Payload {
    Json,
    /// Multipart form with file uploads alongside the text fields
    Multipart(Vec<FilePart>),
}

/// One form submission.
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub method: Method,
    pub endpoint: String,
    pub fields: &'a Fields,
    pub spec: &'a FormSpec,
    pub payload: Payload,
    pub anonymous: bool,
}

impl<'a> Submission<'a> {
    pub fn new(
        method: Method,
        endpoint: impl Into<String>,
        fields: &'a Fields,
        spec: &'a FormSpec,
    ) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            fields,
            spec,
            payload: Payload::Json,
            anonymous: false,
        }
    }

    pub fn post(endpoint: impl Into<String>, fields: &'a Fields, spec: &'a FormSpec) -> Self {
        Self::new(Method::POST, endpoint, fields, spec)
    }

    pub fn patch(endpoint: impl Into<String>, fields: &'a Fields, spec: &'a FormSpec) -> Self {
        Self::new(Method::PATCH, endpoint, fields, spec)
    }

    /// Send as multipart, attaching `files`.
    pub fn with_files(mut self, files: Vec<FilePart>) -> Self {
        self.payload = Payload::Multipart(files);
        self
    }

    /// Send without the session token (login, signup, public contact).
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    fn body(&self) -> RequestBody {
        match &self.payload {
            Payload::Json => RequestBody::Json(Value::Object(self.json_fields())),
            Payload::Multipart(files) => {
                let mut body = MultipartBody::default();
                for (name, value) in self.non_empty() {
                    body = body.text(name.as_str(), value.trim());
                }
                for file in files {
                    body = body.file(file.clone());
                }
                RequestBody::Multipart(body)
            }
        }
    }

    fn non_empty(&self) -> impl Iterator<Item = (&String, &String)> {
        self.fields.iter().filter(|(_, v)| !v.trim().is_empty())
    }

    fn json_fields(&self) -> Map<String, Value> {
        self.non_empty()
            .map(|(name, value)| {
                let value = value.trim();
                let numeric = self.spec.get(name).map(|f| f.is_numeric()).unwrap_or(false);
                let json = if numeric {
                    number(value).unwrap_or_else(|| Value::String(value.to_string()))
                } else {
                    Value::String(value.to_string())
                };
                (name.clone(), json)
            })
            .collect()
    }
}

fn number(value: &str) -> Option<Value> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Client-side validation failed; nothing was sent
    #[error("{0}")]
    Fields(FieldErrors),
    /// Session missing or rejected; go to the login page
    #[error("authentication required")]
    Unauthenticated,
    /// Banner text: the server's message or the generic fallback
    #[error("{0}")]
    Global(String),
}

impl From<ClientError> for SubmitError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthenticated => SubmitError::Unauthenticated,
            other => SubmitError::Global(other.banner()),
        }
    }
}

/// Validate the submission's fields and, if they pass, send it.
pub async fn submit<T: DeserializeOwned>(
    client: &ApiClient,
    submission: Submission<'_>,
) -> Result<T, SubmitError> {
    if let Err(errors) = validate(submission.fields, submission.spec) {
        debug!(endpoint = %submission.endpoint, fields = errors.len(), "Form validation failed");
        return Err(SubmitError::Fields(errors));
    }

    let mut request =
        ApiRequest::new(submission.method.clone(), submission.endpoint.clone()).body(submission.body());
    if submission.anonymous {
        request = request.anonymous();
    }

    Ok(client.execute(request).await?)
}
