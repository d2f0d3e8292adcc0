//! Power backend adapter.
//!
//! The backend is an opaque capability: "set node power to X" and "query
//! node power". The default implementation shells out to the `powerman`
//! CLI; the trait exists so tests and alternative hosts can substitute
//! their own transport.

use async_trait::async_trait;
use tokio::process::Command;

use fleetpower_core::PowerState;

use crate::error::{ControlError, Result};

/// The out-of-band power-control capability.
///
/// Each call is a blocking invocation of an external process or service with
/// no built-in retry or timeout; callers decide concurrency and the external
/// scheduler owns deadlines.
#[async_trait]
pub trait PowerBackend: Send + Sync {
    /// Power the named node on.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Backend` wrapping the backend's failure detail.
    async fn power_on(&self, endpoint: &str, node: &str) -> Result<()>;

    /// Power the named node off.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Backend` wrapping the backend's failure detail.
    async fn power_off(&self, endpoint: &str, node: &str) -> Result<()>;

    /// Query the node's current power state.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Backend` if the invocation fails, or
    /// `ControlError::QueryParse` if the result shape is unexpected.
    async fn query_state(&self, endpoint: &str, node: &str) -> Result<PowerState>;
}

/// Parse the output of a `powerman -Q` membership query.
///
/// The output must be exactly three lines: the ON membership list, the OFF
/// membership list, and the UNKNOWN membership list, in that order. The
/// node's state is determined by which list contains its name, checked in
/// that fixed order. Membership is a substring check because powerman prints
/// folded host ranges.
///
/// # Errors
///
/// Returns `ControlError::QueryParse` if the output does not have exactly
/// three lines or the node appears in none of them. Absence is never
/// defaulted to a power state.
pub fn parse_query(stdout: &str, node: &str) -> Result<PowerState> {
    let lines: Vec<&str> = stdout.trim_end_matches('\n').split('\n').collect();
    if lines.len() != 3 {
        return Err(ControlError::QueryParse {
            node: node.to_string(),
            reason: format!("expected 3 result lines, got {}", lines.len()),
        });
    }

    if lines[0].contains(node) {
        Ok(PowerState::On)
    } else if lines[1].contains(node) {
        Ok(PowerState::Off)
    } else if lines[2].contains(node) {
        Ok(PowerState::Unknown)
    } else {
        Err(ControlError::QueryParse {
            node: node.to_string(),
            reason: "node not present in any membership line".to_string(),
        })
    }
}

/// Backend that drives the `powerman` command-line client.
#[derive(Debug, Clone)]
pub struct PowermanBackend {
    program: String,
}

impl Default for PowermanBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PowermanBackend {
    /// Create a backend invoking `powerman` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "powerman".to_string(),
        }
    }

    /// Create a backend invoking a specific program, for hosts that wrap or
    /// relocate the powerman client.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run the client with the given flag and node, capturing stdout.
    async fn run(
        &self,
        action: &'static str,
        endpoint: &str,
        flag: &str,
        node: &str,
    ) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        if !endpoint.is_empty() {
            cmd.arg("-h").arg(endpoint);
        }
        cmd.arg(flag).arg(node);

        let output = cmd.output().await.map_err(|e| ControlError::Backend {
            action,
            node: node.to_string(),
            detail: e.to_string(),
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ControlError::Backend {
                action,
                node: node.to_string(),
                detail: format!("{}: {}", output.status, stderr.trim()),
            })
        }
    }
}

#[async_trait]
impl PowerBackend for PowermanBackend {
    async fn power_on(&self, endpoint: &str, node: &str) -> Result<()> {
        self.run("power-on", endpoint, "-1", node).await?;
        Ok(())
    }

    async fn power_off(&self, endpoint: &str, node: &str) -> Result<()> {
        self.run("power-off", endpoint, "-0", node).await?;
        Ok(())
    }

    async fn query_state(&self, endpoint: &str, node: &str) -> Result<PowerState> {
        let stdout = self.run("query", endpoint, "-Q", node).await?;
        parse_query(&stdout, node)
    }
}

/// A no-op backend for hosts without powerman wired up.
///
/// Control actions log a warning and succeed; queries report `Unknown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl NoopBackend {
    /// Create a new no-op backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PowerBackend for NoopBackend {
    async fn power_on(&self, endpoint: &str, node: &str) -> Result<()> {
        tracing::warn!(
            node = %node,
            endpoint = %endpoint,
            "NoopBackend: power_on called but no backend configured"
        );
        Ok(())
    }

    async fn power_off(&self, endpoint: &str, node: &str) -> Result<()> {
        tracing::warn!(
            node = %node,
            endpoint = %endpoint,
            "NoopBackend: power_off called but no backend configured"
        );
        Ok(())
    }

    async fn query_state(&self, endpoint: &str, node: &str) -> Result<PowerState> {
        tracing::warn!(
            node = %node,
            endpoint = %endpoint,
            "NoopBackend: query_state called but no backend configured"
        );
        Ok(PowerState::Unknown)
    }
}
