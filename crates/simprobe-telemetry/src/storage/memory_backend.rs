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

use crate::storage::backend::{
    unknown_channel, BackendStats, ChannelDescriptor, MeasurementBackend, StoredValue,
};
use crate::storage::processing::ChannelProcessor;
use simprobe_core::error::{ProbeError, ProbeResult};
use simprobe_core::measurement::RuntimeMeasurement;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug)]
struct Channel {
    descriptor: ChannelDescriptor,
    processor: ChannelProcessor,
    values: Vec<StoredValue>,
    recorded: u64,
}

/// In-memory measurement store using `RwLock<HashMap>`.
///
/// Channels are keyed by specification id. Processing is applied when a
/// measurement is recorded, so the history holds exactly what was stored.
#[derive(Debug)]
pub struct InMemoryBackend {
    channels: RwLock<HashMap<String, Channel>>,
}

impl InMemoryBackend {
    /// Create a new in-memory backend
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new in-memory backend with room for `capacity` channels
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Returns the descriptor of an open channel.
    pub fn descriptor(&self, id: &str) -> Option<ChannelDescriptor> {
        let channels = self.channels.read().ok()?;
        channels.get(id).map(|channel| channel.descriptor.clone())
    }

    /// Returns the number of measurements received by a channel.
    pub fn recorded_count(&self, id: &str) -> ProbeResult<u64> {
        let channels = self.read_lock()?;
        channels
            .get(id)
            .map(|channel| channel.recorded)
            .ok_or_else(|| unknown_channel(id))
    }

    /// Get statistics about this backend
    pub fn get_stats(&self) -> BackendStats {
        let Ok(channels) = self.channels.read() else {
            return BackendStats::default();
        };

        let mut stats = BackendStats {
            total_channels: channels.len(),
            ..BackendStats::default()
        };
        for channel in channels.values() {
            if channel.processor.is_aggregating() {
                stats.aggregated_channels += 1;
            } else {
                stats.feed_through_channels += 1;
            }
            stats.recorded_measurements += channel.recorded;
            stats.stored_values += channel.values.len();
        }
        stats
    }

    fn read_lock(
        &self,
    ) -> ProbeResult<std::sync::RwLockReadGuard<'_, HashMap<String, Channel>>> {
        self.channels
            .read()
            .map_err(|_| ProbeError::Storage("Failed to acquire read lock".to_string()))
    }

    fn write_lock(
        &self,
    ) -> ProbeResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Channel>>> {
        self.channels
            .write()
            .map_err(|_| ProbeError::Storage("Failed to acquire write lock".to_string()))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementBackend for InMemoryBackend {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn open_channel(&self, descriptor: ChannelDescriptor) -> ProbeResult<()> {
        let processor = ChannelProcessor::new(&descriptor.id, &descriptor.processing_type)?;
        let mut channels = self.write_lock()?;

        if let Some(existing) = channels.get(&descriptor.id) {
            if existing.descriptor.processing_type == descriptor.processing_type {
                return Ok(());
            }
            return Err(ProbeError::Storage(format!(
                "channel '{}' is already open with processing type {}",
                descriptor.id,
                existing.descriptor.processing_type.kind()
            )));
        }

        log::debug!(
            "Opened measurement channel '{}' ({}) at {}.",
            descriptor.id,
            descriptor.processing_type.kind(),
            descriptor.measuring_point
        );
        channels.insert(
            descriptor.id.clone(),
            Channel {
                descriptor,
                processor,
                values: Vec::new(),
                recorded: 0,
            },
        );
        Ok(())
    }

    fn contains_channel(&self, id: &str) -> bool {
        if let Ok(channels) = self.channels.read() {
            channels.contains_key(id)
        } else {
            false
        }
    }

    fn record(&self, measurement: RuntimeMeasurement) -> ProbeResult<()> {
        let mut channels = self.write_lock()?;
        let channel = channels
            .get_mut(&measurement.channel)
            .ok_or_else(|| unknown_channel(&measurement.channel))?;

        channel.recorded += 1;
        let stored = channel.processor.process(&measurement);
        channel.values.extend(stored);
        Ok(())
    }

    fn history(&self, channel: &str) -> ProbeResult<Vec<StoredValue>> {
        let channels = self.read_lock()?;
        channels
            .get(channel)
            .map(|channel| channel.values.clone())
            .ok_or_else(|| unknown_channel(channel))
    }

    fn channel_ids(&self) -> Vec<String> {
        if let Ok(channels) = self.channels.read() {
            channels.keys().cloned().collect()
        } else {
            Vec::new()
        }
    }

    fn clear_all(&self) -> ProbeResult<()> {
        let mut channels = self.write_lock()?;
        channels.clear();
        Ok(())
    }

    fn channel_count(&self) -> usize {
        if let Ok(channels) = self.channels.read() {
            channels.len()
        } else {
            0
        }
    }
}
