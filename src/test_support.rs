//! In-process fake backend for tests.

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::Router;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::SessionStore;
use crate::config::ApiConfig;

/// A request seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// Axum router served on an ephemeral localhost port, recording every hit.
pub struct FakeBackend {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeBackend {
    pub async fn start(router: Router) -> Self {
        let requests: Arc<Mutex<Vec<Recorded>>> = Arc::default();
        let log = requests.clone();
        let router = router.layer(middleware::from_fn(move |req: Request, next: Next| {
            let log = log.clone();
            async move {
                log.lock().push(Recorded {
                    method: req.method().to_string(),
                    path: req.uri().path().to_string(),
                    authorization: req
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                });
                next.run(req).await
            }
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn hits_to(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }
}

pub fn client_for(backend: &FakeBackend, session: Arc<dyn SessionStore>) -> ApiClient {
    let config = ApiConfig {
        base_url: backend.base_url.clone(),
        ..Default::default()
    };
    ApiClient::new(&config, session).unwrap()
}
