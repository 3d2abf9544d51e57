mod client;
pub mod error;

pub use client::{endpoint, ApiClient, ApiRequest, Auth, FilePart, MultipartBody, RequestBody};
pub use error::{ClientError, GENERIC_FAILURE};
