//! Subprocess bridge to the service control facility.
//!
//! All control-plane traffic goes through `sc` / `taskkill`. Failure is a
//! non-zero exit status or diagnostic text on stderr.

use crate::error::SvcError;
use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

/// Command seam for status queries and control operations.
#[async_trait]
pub trait ScBridge: Send + Sync {
    /// Raw text of a "list all services" status query.
    async fn query_all(&self) -> Result<String, SvcError>;

    /// Raw text of a status query scoped to one named service.
    async fn query_one(&self, name: &str) -> Result<String, SvcError>;

    /// Request a service start. Fire-and-forget; completion is observed by
    /// later status queries.
    async fn start(&self, name: &str) -> Result<(), SvcError>;

    /// Request a graceful service stop.
    async fn stop(&self, name: &str) -> Result<(), SvcError>;

    /// Forcibly terminate the backing process.
    async fn kill_pid(&self, pid: u32) -> Result<(), SvcError>;
}

/// `ScBridge` backed by the real `sc` and `taskkill` binaries.
#[derive(Default)]
pub struct SystemSc;

impl SystemSc {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<String, SvcError> {
        let rendered = format!("{} {}", program, args.join(" "));
        debug!("exec: {rendered}");
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|source| SvcError::Exec {
                command: rendered.clone(),
                source,
            })?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !output.status.success() || !stderr.is_empty() {
            let detail = if stderr.is_empty() {
                format!("exit status {}", output.status)
            } else {
                stderr.to_string()
            };
            return Err(SvcError::CommandFailed {
                command: rendered,
                detail,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ScBridge for SystemSc {
    async fn query_all(&self) -> Result<String, SvcError> {
        self.run("sc", &["queryex", "state=", "all"]).await
    }

    async fn query_one(&self, name: &str) -> Result<String, SvcError> {
        self.run("sc", &["queryex", name]).await
    }

    async fn start(&self, name: &str) -> Result<(), SvcError> {
        self.run("sc", &["start", name]).await.map(drop)
    }

    async fn stop(&self, name: &str) -> Result<(), SvcError> {
        self.run("sc", &["stop", name]).await.map(drop)
    }

    async fn kill_pid(&self, pid: u32) -> Result<(), SvcError> {
        let pid = pid.to_string();
        self.run("taskkill", &["/PID", &pid, "/F"]).await.map(drop)
    }
}
