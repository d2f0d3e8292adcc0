//! Controller configuration.
//!
//! Configuration is handed over by the host as a structured object; there is
//! no file format or CLI surface here.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the power controller.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlConfig {
    /// Names of the nodes this controller may control. A node absent from
    /// this list is inadmissible even if it passes the platform predicate.
    #[serde(default)]
    pub allow_list: Vec<String>,

    /// Platform tag a node must carry to be managed by this controller.
    #[serde(default = "ControlConfig::default_platform")]
    pub platform: String,

    /// Attribute path holding the node's powerman name.
    #[serde(default = "ControlConfig::default_name_path")]
    pub name_path: String,

    /// Attribute path holding the node's powerman server endpoint.
    #[serde(default = "ControlConfig::default_endpoint_path")]
    pub endpoint_path: String,

    /// Attribute path holding the node's platform tag.
    #[serde(default = "ControlConfig::default_platform_path")]
    pub platform_path: String,

    /// Maximum number of concurrently in-flight backend calls.
    #[serde(default = "ControlConfig::default_max_inflight")]
    pub max_inflight: usize,

    /// Interval between discovery sweeps in seconds.
    #[serde(default = "ControlConfig::default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl ControlConfig {
    fn default_platform() -> String {
        "powerman".to_string()
    }

    fn default_name_path() -> String {
        "/Powerman/Name".to_string()
    }

    fn default_endpoint_path() -> String {
        "/Powerman/Server".to_string()
    }

    fn default_platform_path() -> String {
        "/Platform".to_string()
    }

    const fn default_max_inflight() -> usize {
        16
    }

    const fn default_sweep_interval() -> u64 {
        60
    }

    /// Whether the named node is on the allow-list.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.allow_list.iter().any(|n| n == name)
    }

    /// Get the sweep interval as a `Duration`.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            allow_list: Vec::new(),
            platform: Self::default_platform(),
            name_path: Self::default_name_path(),
            endpoint_path: Self::default_endpoint_path(),
            platform_path: Self::default_platform_path(),
            max_inflight: Self::default_max_inflight(),
            sweep_interval_seconds: Self::default_sweep_interval(),
        }
    }
}
