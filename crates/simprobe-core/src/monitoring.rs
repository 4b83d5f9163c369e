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

//! The monitoring configuration: monitors, measurement specifications, metrics
//! and processing types.
//!
//! This configuration is owned by an external collaborator and is read-only
//! from the instrumentation layer's point of view. It can be loaded from JSON.

use crate::error::{ProbeError, ProbeResult};
use crate::model::ModelElement;
use crate::probe::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// The identifier of the response-time metric.
pub const RESPONSE_TIME_METRIC_ID: &str = "response_time";
/// The identifier of the reconfiguration-time metric.
pub const RECONFIGURATION_TIME_METRIC_ID: &str = "reconfiguration_time";

/// Describes a metric. Two descriptions denote the same metric when their ids
/// are equal; names are informative only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDescription {
    /// The metric id.
    pub id: String,
    /// A human-readable name.
    #[serde(default)]
    pub name: String,
}

impl MetricDescription {
    /// Creates a metric description.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The response-time metric.
    pub fn response_time() -> Self {
        Self::new(RESPONSE_TIME_METRIC_ID, "Response Time")
    }

    /// The reconfiguration-time metric.
    pub fn reconfiguration_time() -> Self {
        Self::new(RECONFIGURATION_TIME_METRIC_ID, "Reconfiguration Time")
    }

    /// Returns `true` if both descriptions denote the same metric.
    pub fn same_metric(&self, other: &MetricDescription) -> bool {
        self.id == other.id
    }
}

/// How the measurements of a specification are processed before storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessingType {
    /// Every measurement is stored as is.
    #[default]
    FeedThrough,
    /// A sliding window over a fixed number of measurements.
    FixedSizeAggregation {
        /// The number of measurements in the window.
        window_length: usize,
        /// The number of new measurements between two aggregated values.
        window_increment: usize,
    },
    /// A sliding window over a span of simulated time.
    TimeDrivenAggregation {
        /// The window span in simulated time units.
        window_length: SimTime,
        /// The simulated time between two aggregated values.
        window_increment: SimTime,
    },
    /// A window whose size adapts to the measurement rate.
    VariableSizeAggregation {
        /// The simulated time between two aggregated values.
        window_increment: SimTime,
    },
}

impl ProcessingType {
    /// Returns the classification of this processing type.
    pub fn kind(&self) -> ProcessingKind {
        match self {
            ProcessingType::FeedThrough => ProcessingKind::FeedThrough,
            ProcessingType::FixedSizeAggregation { .. } => ProcessingKind::FixedSizeAggregation,
            ProcessingType::TimeDrivenAggregation { .. } => ProcessingKind::TimeDrivenAggregation,
            ProcessingType::VariableSizeAggregation { .. } => {
                ProcessingKind::VariableSizeAggregation
            }
        }
    }
}

/// The classification of processing types.
///
/// [`ProcessingKind::Any`] is the abstract supertype and classifies every
/// processing type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessingKind {
    /// Any processing type.
    Any,
    /// [`ProcessingType::FeedThrough`].
    FeedThrough,
    /// [`ProcessingType::FixedSizeAggregation`].
    FixedSizeAggregation,
    /// [`ProcessingType::TimeDrivenAggregation`].
    TimeDrivenAggregation,
    /// [`ProcessingType::VariableSizeAggregation`].
    VariableSizeAggregation,
}

impl ProcessingKind {
    /// Returns `true` if `processing_type` belongs to this classification.
    pub fn classifies(self, processing_type: &ProcessingType) -> bool {
        self == ProcessingKind::Any || self == processing_type.kind()
    }

    /// The canonical name of this classification.
    pub fn name(self) -> &'static str {
        match self {
            ProcessingKind::Any => "ProcessingType",
            ProcessingKind::FeedThrough => "FeedThrough",
            ProcessingKind::FixedSizeAggregation => "FixedSizeAggregation",
            ProcessingKind::TimeDrivenAggregation => "TimeDrivenAggregation",
            ProcessingKind::VariableSizeAggregation => "VariableSizeAggregation",
        }
    }
}

impl Display for ProcessingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProcessingKind {
    type Err = ProbeError;

    /// Parses a canonical name; snake_case spellings are accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ProcessingType" | "processing_type" => Ok(ProcessingKind::Any),
            "FeedThrough" | "feed_through" => Ok(ProcessingKind::FeedThrough),
            "FixedSizeAggregation" | "fixed_size_aggregation" => {
                Ok(ProcessingKind::FixedSizeAggregation)
            }
            "TimeDrivenAggregation" | "time_driven_aggregation" => {
                Ok(ProcessingKind::TimeDrivenAggregation)
            }
            "VariableSizeAggregation" | "variable_size_aggregation" => {
                Ok(ProcessingKind::VariableSizeAggregation)
            }
            other => Err(ProbeError::InvalidArgument(format!(
                "'{other}' does not denote a processing type"
            ))),
        }
    }
}

/// A metric, a monitored element and a processing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementSpecification {
    /// The specification id.
    pub id: String,
    /// A human-readable name.
    #[serde(default)]
    pub name: String,
    /// The measured metric.
    pub metric: MetricDescription,
    /// How measurements are processed.
    #[serde(default)]
    pub processing_type: ProcessingType,
    /// The monitored element. `None` models a dangling reference in the
    /// configuration.
    #[serde(default)]
    pub monitored_element: Option<ModelElement>,
}

impl MeasurementSpecification {
    /// Creates a feed-through specification for an element.
    pub fn new(id: impl Into<String>, metric: MetricDescription, element: ModelElement) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            metric,
            processing_type: ProcessingType::FeedThrough,
            monitored_element: Some(element),
        }
    }

    /// Replaces the processing type.
    pub fn with_processing_type(mut self, processing_type: ProcessingType) -> Self {
        self.processing_type = processing_type;
        self
    }
}

/// An activatable group of measurement specifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
    /// The monitor id.
    pub id: String,
    /// A human-readable name.
    #[serde(default)]
    pub name: String,
    /// Only specifications of activated monitors are honored.
    #[serde(default = "default_activated")]
    pub activated: bool,
    /// The specifications of this monitor.
    #[serde(default)]
    pub measurement_specifications: Vec<MeasurementSpecification>,
}

fn default_activated() -> bool {
    true
}

impl Monitor {
    /// Creates an activated monitor without specifications.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            activated: true,
            measurement_specifications: Vec::new(),
        }
    }

    /// Sets the activation flag.
    pub fn activated(mut self, activated: bool) -> Self {
        self.activated = activated;
        self
    }

    /// Adds a specification.
    pub fn with_specification(mut self, specification: MeasurementSpecification) -> Self {
        self.measurement_specifications.push(specification);
        self
    }

    /// Returns `true` if this monitor is active.
    pub fn is_active(&self) -> bool {
        self.activated
    }
}

/// The queryable collection of monitors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorRepository {
    /// All monitors, active or not.
    #[serde(default)]
    pub monitors: Vec<Monitor>,
}

impl MonitorRepository {
    /// Creates a repository from a list of monitors.
    pub fn new(monitors: Vec<Monitor>) -> Self {
        Self { monitors }
    }

    /// Load a monitor repository from a JSON string
    pub fn from_json(json: &str) -> ProbeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a monitor repository from a JSON file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ProbeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save the monitor repository to a JSON file
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> ProbeResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Iterates over the monitors whose activation flag is set.
    pub fn active_monitors(&self) -> impl Iterator<Item = &Monitor> {
        self.monitors.iter().filter(|monitor| monitor.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKey, UsageScenario};

    const REPOSITORY_JSON: &str = r#"{
        "monitors": [
            {
                "id": "m-active",
                "measurement_specifications": [
                    {
                        "id": "rt-browse",
                        "metric": { "id": "response_time" },
                        "processing_type": { "kind": "fixed_size_aggregation", "window_length": 10, "window_increment": 5 },
                        "monitored_element": { "kind": "usage_scenario", "key": "_browse" }
                    }
                ]
            },
            {
                "id": "m-inactive",
                "activated": false,
                "measurement_specifications": [
                    {
                        "id": "rt-buy",
                        "metric": { "id": "response_time" }
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_repository_from_json() {
        let repository = MonitorRepository::from_json(REPOSITORY_JSON).unwrap();
        assert_eq!(repository.monitors.len(), 2);
        assert_eq!(repository.active_monitors().count(), 1);

        let spec = &repository.monitors[0].measurement_specifications[0];
        assert!(spec.metric.same_metric(&MetricDescription::response_time()));
        assert_eq!(
            spec.processing_type,
            ProcessingType::FixedSizeAggregation {
                window_length: 10,
                window_increment: 5
            }
        );
        assert_eq!(
            spec.monitored_element,
            Some(ModelElement::UsageScenario(UsageScenario {
                key: EntityKey::new("_browse"),
                name: String::new(),
            }))
        );

        let dangling = &repository.monitors[1].measurement_specifications[0];
        assert!(dangling.monitored_element.is_none());
        assert_eq!(dangling.processing_type, ProcessingType::FeedThrough);
    }

    #[test]
    fn test_repository_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitors.json");

        let repository = MonitorRepository::from_json(REPOSITORY_JSON).unwrap();
        repository.to_file(&path).unwrap();

        let loaded = MonitorRepository::from_file(&path).unwrap();
        assert_eq!(loaded.monitors.len(), 2);
        assert!(!loaded.monitors[1].is_active());
    }

    #[test]
    fn test_processing_kind_parsing() {
        assert_eq!(
            "FeedThrough".parse::<ProcessingKind>().unwrap(),
            ProcessingKind::FeedThrough
        );
        assert_eq!(
            "time_driven_aggregation".parse::<ProcessingKind>().unwrap(),
            ProcessingKind::TimeDrivenAggregation
        );
        assert!(matches!(
            "ResponseTime".parse::<ProcessingKind>(),
            Err(ProbeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_abstract_kind_classifies_everything() {
        let fixed = ProcessingType::FixedSizeAggregation {
            window_length: 3,
            window_increment: 1,
        };
        assert!(ProcessingKind::Any.classifies(&fixed));
        assert!(ProcessingKind::Any.classifies(&ProcessingType::FeedThrough));
        assert!(ProcessingKind::FixedSizeAggregation.classifies(&fixed));
        assert!(!ProcessingKind::FeedThrough.classifies(&fixed));
    }
}
