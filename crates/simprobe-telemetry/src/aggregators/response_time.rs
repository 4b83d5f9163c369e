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

use super::AggregatorStats;
use crate::calculators::{CalculatedMeasurement, CalculatorListener};
use crate::storage::{ChannelDescriptor, MeasurementBackend};
use simprobe_core::error::ProbeResult;
use simprobe_core::measurement::RuntimeMeasurement;
use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::model::EntityKey;
use simprobe_core::monitoring::MeasurementSpecification;
use std::sync::Arc;

/// Forwards every response time of one specification to its store channel.
#[derive(Debug)]
pub struct ResponseTimeAggregator {
    channel: String,
    element: EntityKey,
    backend: Arc<dyn MeasurementBackend>,
    stats: AggregatorStats,
}

impl ResponseTimeAggregator {
    /// Opens the channel of `specification` in `backend`.
    ///
    /// Fails if the store rejects the specification's processing type; nothing
    /// is recorded for a specification whose channel could not be opened.
    pub fn open(
        specification: &MeasurementSpecification,
        element: EntityKey,
        measuring_point: MeasuringPoint,
        backend: Arc<dyn MeasurementBackend>,
    ) -> ProbeResult<Arc<Self>> {
        backend.open_channel(ChannelDescriptor {
            id: specification.id.clone(),
            metric: specification.metric.clone(),
            processing_type: specification.processing_type.clone(),
            measuring_point,
        })?;

        Ok(Arc::new(Self {
            channel: specification.id.clone(),
            element,
            backend,
            stats: AggregatorStats::default(),
        }))
    }

    /// The store channel written to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Counters of forwarded measurements.
    pub fn stats(&self) -> &AggregatorStats {
        &self.stats
    }
}

impl CalculatorListener for ResponseTimeAggregator {
    fn on_calculated(&self, measurement: &CalculatedMeasurement<'_>) {
        let result = self.backend.record(RuntimeMeasurement::duration(
            self.channel.as_str(),
            self.element.clone(),
            measurement.measuring_point.clone(),
            measurement.duration(),
            measurement.stop,
        ));
        self.stats.count(&result);
        if let Err(e) = result {
            log::error!(
                "Failed to record response time for '{}' in channel '{}': {e}",
                self.element,
                self.channel
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryBackend;
    use simprobe_core::error::ProbeError;
    use simprobe_core::measurement::MeasurementKind;
    use simprobe_core::model::{ModelElement, UsageScenario};
    use simprobe_core::monitoring::{MetricDescription, ProcessingType};
    use simprobe_core::probe::ExecutionContext;

    fn specification(processing_type: ProcessingType) -> MeasurementSpecification {
        MeasurementSpecification::new(
            "rt-us",
            MetricDescription::response_time(),
            ModelElement::UsageScenario(UsageScenario {
                key: EntityKey::new("_us"),
                name: String::new(),
            }),
        )
        .with_processing_type(processing_type)
    }

    fn point() -> MeasuringPoint {
        MeasuringPoint::UsageScenario {
            usage_scenario: EntityKey::new("_us"),
        }
    }

    #[test]
    fn test_forwards_durations() {
        let backend = Arc::new(InMemoryBackend::new());
        let aggregator = ResponseTimeAggregator::open(
            &specification(ProcessingType::FeedThrough),
            EntityKey::new("_us"),
            point(),
            backend.clone(),
        )
        .unwrap();
        assert_eq!(aggregator.channel(), "rt-us");

        let mp = point();
        aggregator.on_calculated(&CalculatedMeasurement {
            measuring_point: &mp,
            context: ExecutionContext::new(1),
            start: 2.0,
            stop: 5.0,
        });

        let history = backend.history("rt-us").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].value, 3.0);
        assert_eq!(history[0].point_in_time, 5.0);
        assert_eq!(history[0].kind, MeasurementKind::Duration);
        assert_eq!(aggregator.stats().recorded(), 1);
    }

    #[test]
    fn test_open_fails_on_unsupported_processing() {
        let backend = Arc::new(InMemoryBackend::new());
        let result = ResponseTimeAggregator::open(
            &specification(ProcessingType::VariableSizeAggregation {
                window_increment: 1.0,
            }),
            EntityKey::new("_us"),
            point(),
            backend,
        );
        assert!(matches!(
            result,
            Err(ProbeError::UnsupportedProcessingType { .. })
        ));
    }

    #[test]
    fn test_store_rejection_is_counted() {
        let backend = Arc::new(InMemoryBackend::new());
        let aggregator = ResponseTimeAggregator::open(
            &specification(ProcessingType::FeedThrough),
            EntityKey::new("_us"),
            point(),
            backend.clone(),
        )
        .unwrap();
        backend.clear_all().unwrap();

        let mp = point();
        aggregator.on_calculated(&CalculatedMeasurement {
            measuring_point: &mp,
            context: ExecutionContext::new(1),
            start: 0.0,
            stop: 1.0,
        });
        assert_eq!(aggregator.stats().recorded(), 0);
        assert_eq!(aggregator.stats().rejected(), 1);
    }
}
