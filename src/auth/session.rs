//! Bearer token storage.
//!
//! Pages never reach for ambient storage: the session is handed to the
//! [`ApiClient`](crate::api::ApiClient) and the [`Gate`](crate::auth::Gate)
//! as an `Arc<dyn SessionStore>`, so tests swap in [`MemorySession`].

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Holds the bearer token used for every authenticated backend call.
///
/// `clear` must be idempotent: two requests failing with 401 at nearly the
/// same time both clear the session.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// In-process session, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySession {
    fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    fn clear(&self) {
        self.token.write().take();
    }
}

/// Session persisted as a single token file, surviving between runs.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    token: RwLock<Option<String>>,
}

impl FileSession {
    /// Open the session file at `path`, reading any token already stored.
    ///
    /// A missing, unreadable or blank file is an absent session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = read_token(&path);
        debug!(path = %path.display(), present = token.is_some(), "Opened session file");
        Self {
            path,
            token: RwLock::new(token),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_token(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let token = content.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Write the token readable by the owner only.
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    std::fs::write(path, token)?;

    // Set proper permissions on the token file (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

impl SessionStore for FileSession {
    fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set(&self, token: &str) {
        let mut guard = self.token.write();
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Failed to create session directory");
            }
        }
        if let Err(e) = write_private(&self.path, token) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist session token");
        }
        *guard = Some(token.to_string());
        info!("Session started");
    }

    fn clear(&self) {
        let mut guard = self.token.write();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove session file");
            }
        }
        if guard.take().is_some() {
            info!("Session cleared");
        }
    }
}
