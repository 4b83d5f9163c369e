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
use crate::probes::{ProbeId, ProbeListener};
use crate::storage::{ChannelDescriptor, MeasurementBackend};
use simprobe_core::error::ProbeResult;
use simprobe_core::measurement::RuntimeMeasurement;
use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::model::EntityKey;
use simprobe_core::monitoring::{MetricDescription, ProcessingType};
use simprobe_core::probe::Observation;
use std::sync::Arc;

/// Records every observation of a single probe as a point-in-time marker.
///
/// Used for events with no stop counterpart, such as reconfigurations.
#[derive(Debug)]
pub struct MarkerAggregator {
    channel: String,
    element: EntityKey,
    measuring_point: MeasuringPoint,
    backend: Arc<dyn MeasurementBackend>,
    stats: AggregatorStats,
}

impl MarkerAggregator {
    /// Opens a feed-through channel named after `measuring_point`.
    pub fn open(
        metric: MetricDescription,
        measuring_point: MeasuringPoint,
        backend: Arc<dyn MeasurementBackend>,
    ) -> ProbeResult<Arc<Self>> {
        let channel = measuring_point.string_representation();
        backend.open_channel(ChannelDescriptor {
            id: channel.clone(),
            metric,
            processing_type: ProcessingType::FeedThrough,
            measuring_point: measuring_point.clone(),
        })?;

        Ok(Arc::new(Self {
            element: EntityKey::new(channel.as_str()),
            channel,
            measuring_point,
            backend,
            stats: AggregatorStats::default(),
        }))
    }

    /// The store channel written to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Counters of forwarded markers.
    pub fn stats(&self) -> &AggregatorStats {
        &self.stats
    }
}

impl ProbeListener for MarkerAggregator {
    fn on_observation(&self, _source: ProbeId, observation: &Observation) {
        let result = self.backend.record(RuntimeMeasurement::marker(
            self.channel.as_str(),
            self.element.clone(),
            self.measuring_point.clone(),
            observation.value,
        ));
        self.stats.count(&result);
        if let Err(e) = result {
            log::error!("Failed to record marker in channel '{}': {e}", self.channel);
        }
    }
}
