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

use simprobe_core::error::{ProbeError, ProbeResult};
use simprobe_core::measurement::{MeasurementKind, RuntimeMeasurement};
use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::monitoring::{MetricDescription, ProcessingType};
use simprobe_core::probe::SimTime;
use std::fmt::Debug;

/// Describes a measurement channel, one per measurement specification.
#[derive(Debug, Clone)]
pub struct ChannelDescriptor {
    /// The channel id, the id of the owning specification.
    pub id: String,
    /// The metric recorded in this channel.
    pub metric: MetricDescription,
    /// How recorded values are processed before they are stored.
    pub processing_type: ProcessingType,
    /// Where the values are measured.
    pub measuring_point: MeasuringPoint,
}

/// A value as stored after processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredValue {
    /// The measured or aggregated value.
    pub value: f64,
    /// The simulation time the value refers to.
    pub point_in_time: SimTime,
    /// The kind of the measurements the value was derived from.
    pub kind: MeasurementKind,
}

/// Trait defining the interface for runtime measurement stores.
///
/// This is the sink the calculators and aggregators write into. It is passed
/// explicitly to whatever wires them.
pub trait MeasurementBackend: Send + Sync + Debug + 'static {
    /// Get a reference to this object as Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Opens a channel. Opening an already open channel with the same
    /// processing type is a no-op.
    ///
    /// Fails with [`ProbeError::UnsupportedProcessingType`] if the store cannot
    /// apply the requested processing.
    fn open_channel(&self, descriptor: ChannelDescriptor) -> ProbeResult<()>;

    /// Check if a channel is open
    fn contains_channel(&self, id: &str) -> bool;

    /// Records a measurement into its channel.
    fn record(&self, measurement: RuntimeMeasurement) -> ProbeResult<()>;

    /// Returns all stored values of a channel, oldest first.
    fn history(&self, channel: &str) -> ProbeResult<Vec<StoredValue>>;

    /// Get the ids of all open channels
    fn channel_ids(&self) -> Vec<String>;

    /// Closes every channel and drops all stored values.
    fn clear_all(&self) -> ProbeResult<()>;

    /// Get the number of open channels
    fn channel_count(&self) -> usize;

    /// Returns the most recently stored value of a channel.
    fn current_value(&self, channel: &str) -> ProbeResult<Option<StoredValue>> {
        Ok(self.history(channel)?.last().copied())
    }

    /// Records a batch of measurements, stopping at the first failure.
    fn record_all(&self, measurements: Vec<RuntimeMeasurement>) -> ProbeResult<()> {
        measurements
            .into_iter()
            .try_for_each(|measurement| self.record(measurement))
    }
}

/// Statistics about a measurement backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Number of open channels
    pub total_channels: usize,
    /// Channels storing every value unchanged
    pub feed_through_channels: usize,
    /// Channels storing window aggregates
    pub aggregated_channels: usize,
    /// Measurements received across all channels
    pub recorded_measurements: u64,
    /// Values currently held across all channels
    pub stored_values: usize,
}

pub(crate) fn unknown_channel(id: &str) -> ProbeError {
    ProbeError::UnknownChannel(id.to_string())
}
