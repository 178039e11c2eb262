//! VR session bootstrap
//!
//! The VR runtime is started once at process start. It shares nothing with
//! the HTTP service; whether its failure stops the process is decided by the
//! caller (see `Config::strict_startup`).

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// VR runtime errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VrError {
    #[error("no VR system available: {0}")]
    NoSystem(String),

    #[error("failed to create VR session: {0}")]
    Session(String),

    #[error("VR bootstrap task aborted: {0}")]
    Aborted(String),
}

/// Handle to an initialized VR session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub system_id: u64,
    pub application_name: String,
}

/// A VR runtime able to start a session
pub trait VrRuntime: Send + Sync {
    fn initialize_session(&self) -> Result<SessionHandle, VrError>;
}

/// In-process runtime used when no headset runtime is attached
pub struct HeadlessRuntime {
    application_name: String,
    next_system_id: AtomicU64,
}

impl HeadlessRuntime {
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            next_system_id: AtomicU64::new(1),
        }
    }
}

impl VrRuntime for HeadlessRuntime {
    fn initialize_session(&self) -> Result<SessionHandle, VrError> {
        if self.application_name.trim().is_empty() {
            return Err(VrError::NoSystem("application name is empty".to_string()));
        }

        let system_id = self.next_system_id.fetch_add(1, Ordering::Relaxed);
        tracing::info!(system_id, application = %self.application_name, "VR system initialized");

        let handle = SessionHandle {
            system_id,
            application_name: self.application_name.clone(),
        };
        tracing::info!(system_id, "VR session created");
        Ok(handle)
    }
}

/// Run the runtime's session initialization off the async executor.
pub async fn bootstrap<R>(runtime: R) -> Result<SessionHandle, VrError>
where
    R: VrRuntime + 'static,
{
    tokio::task::spawn_blocking(move || runtime.initialize_session())
        .await
        .map_err(|e| VrError::Aborted(e.to_string()))?
}
