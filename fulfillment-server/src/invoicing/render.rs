//! Render engine pool
//!
//! One shared HTML-to-PDF worker process per server process. The worker
//! is an external sidecar launched on demand and spoken to over a local
//! HTTP endpoint; every render request is an isolated call, the process
//! itself is reused.
//!
//! Initialization is single-flight: the pool's async mutex is held
//! across the launch, so concurrent first-callers wait for the same
//! launch instead of each spawning their own engine. Before reuse the
//! engine is liveness-checked (child exit status + TCP probe) and
//! relaunched when dead.
//!
//! The pool is an owned service with an explicit [`RenderPool::shutdown`]
//! wired into graceful shutdown, so the worker process does not outlive
//! the server.

use async_trait::async_trait;
use serde_json::json;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch render engine: {0}")]
    Launch(String),

    #[error("Render engine unavailable: {0}")]
    Unavailable(String),

    #[error("Render timed out after {0}ms")]
    Timeout(u64),

    #[error("Render rejected: {0}")]
    Rejected(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Seam for the pipeline: anything that can turn HTML into PDF bytes.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Render an HTML document to A4 PDF bytes
    async fn render_pdf(&self, html: &str) -> RenderResult<Vec<u8>>;
}

/// Render engine configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Worker executable
    pub bin: String,
    /// Local port the worker serves on
    pub port: u16,
    /// How long to wait for the worker to accept connections after launch
    pub ready_timeout: Duration,
}

impl RenderConfig {
    pub fn from_config(config: &crate::core::Config) -> Self {
        Self {
            bin: config.renderer_bin.clone(),
            port: config.renderer_port,
            ready_timeout: Duration::from_secs(10),
        }
    }
}

/// A running render worker process
struct RenderEngine {
    child: Mutex<Child>,
    client: reqwest::Client,
    base_url: String,
    port: u16,
}

impl RenderEngine {
    /// Spawn the worker and wait until it accepts connections
    async fn launch(config: &RenderConfig) -> RenderResult<Self> {
        let child = Command::new(&config.bin)
            .arg("--port")
            .arg(config.port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RenderError::Launch(format!("{}: {}", config.bin, e)))?;

        let engine = Self {
            child: Mutex::new(child),
            client: reqwest::Client::new(),
            base_url: format!("http://127.0.0.1:{}", config.port),
            port: config.port,
        };

        let deadline = tokio::time::Instant::now() + config.ready_timeout;
        while tokio::time::Instant::now() < deadline {
            if probe(engine.port).await {
                tracing::info!(port = engine.port, "Render engine ready");
                return Ok(engine);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        engine.shutdown().await;
        Err(RenderError::Launch(format!(
            "{} did not become ready within {:?}",
            config.bin, config.ready_timeout
        )))
    }

    /// Still running and accepting connections?
    async fn is_alive(&self) -> bool {
        {
            let mut child = self.child.lock().await;
            match child.try_wait() {
                Ok(None) => {}
                Ok(Some(status)) => {
                    tracing::warn!(%status, "Render engine process exited");
                    return false;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to poll render engine process");
                    return false;
                }
            }
        }
        probe(self.port).await
    }

    /// One isolated render call on the shared engine
    async fn render_page(&self, html: &str) -> RenderResult<Vec<u8>> {
        let resp = self
            .client
            .post(format!("{}/render", self.base_url))
            .json(&json!({ "html": html, "format": "A4" }))
            .send()
            .await
            .map_err(|e| RenderError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RenderError::Rejected(format!("{}: {}", status, body)));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| RenderError::Unavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn shutdown(&self) {
        let mut child = self.child.lock().await;
        if let Err(e) = child.start_kill() {
            tracing::debug!(error = %e, "Render engine already stopped");
            return;
        }
        if let Err(e) = child.wait().await {
            tracing::warn!(error = %e, "Failed to reap render engine process");
        }
    }
}

async fn probe(port: u16) -> bool {
    matches!(
        tokio::time::timeout(
            Duration::from_millis(500),
            TcpStream::connect(("127.0.0.1", port)),
        )
        .await,
        Ok(Ok(_))
    )
}

/// Shared handle to the render engine, lazily launched
pub struct RenderPool {
    engine: Mutex<Option<Arc<RenderEngine>>>,
    config: RenderConfig,
}

impl RenderPool {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            engine: Mutex::new(None),
            config,
        }
    }

    /// Get the live engine, launching or relaunching as needed.
    ///
    /// The lock is held across the launch: concurrent first-callers
    /// share one in-progress launch.
    async fn acquire(&self) -> RenderResult<Arc<RenderEngine>> {
        let mut slot = self.engine.lock().await;
        if let Some(engine) = slot.as_ref() {
            if engine.is_alive().await {
                return Ok(engine.clone());
            }
            tracing::warn!("Render engine connection lost, relaunching");
            engine.shutdown().await;
            *slot = None;
        }

        let engine = Arc::new(RenderEngine::launch(&self.config).await?);
        *slot = Some(engine.clone());
        Ok(engine)
    }

    /// Stop the worker process. Part of graceful shutdown.
    pub async fn shutdown(&self) {
        if let Some(engine) = self.engine.lock().await.take() {
            engine.shutdown().await;
            tracing::info!("Render engine stopped");
        }
    }
}

impl std::fmt::Debug for RenderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPool")
            .field("bin", &self.config.bin)
            .field("port", &self.config.port)
            .finish()
    }
}

#[async_trait]
impl DocumentRenderer for RenderPool {
    async fn render_pdf(&self, html: &str) -> RenderResult<Vec<u8>> {
        let engine = self.acquire().await?;
        engine.render_page(html).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_launch_failure_surfaces_as_error() {
        let pool = RenderPool::new(RenderConfig {
            bin: "/nonexistent/render-worker".to_string(),
            port: 59999,
            ready_timeout: Duration::from_millis(100),
        });
        let err = pool.render_pdf("<html></html>").await.unwrap_err();
        assert!(matches!(err, RenderError::Launch(_)));
    }

    #[tokio::test]
    async fn test_shutdown_without_launch_is_noop() {
        let pool = RenderPool::new(RenderConfig {
            bin: "true".to_string(),
            port: 59998,
            ready_timeout: Duration::from_millis(100),
        });
        pool.shutdown().await;
    }
}
