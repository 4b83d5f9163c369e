// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use simprobe_core::error::ProbeResult;
use simprobe_core::monitoring::MetricDescription;

/// How reconfiguration events are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconfigurationMode {
    /// Trigger a time probe and record one marker per event.
    #[default]
    Record,
    /// Trigger a time probe without recording anything.
    ProbeOnly,
    /// Ignore reconfiguration events.
    Disabled,
}

/// Configuration of the probe framework listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeFrameworkConfig {
    /// The metric wired as response time
    pub response_time_metric: MetricDescription,
    /// Label of the measuring point reconfiguration markers are recorded at
    pub reconfiguration_measuring_point: String,
    /// How reconfiguration events are measured
    pub reconfiguration_mode: ReconfigurationMode,
    /// Abort setup when a decorator fails instead of only reporting it
    pub fail_on_decorator_error: bool,
}

impl Default for ProbeFrameworkConfig {
    fn default() -> Self {
        Self {
            response_time_metric: MetricDescription::response_time(),
            reconfiguration_measuring_point: "Reconfiguration".to_string(),
            reconfiguration_mode: ReconfigurationMode::Record,
            fail_on_decorator_error: false,
        }
    }
}

impl ProbeFrameworkConfig {
    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> ProbeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ProbeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to JSON file
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> ProbeResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
