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

//! Measurements produced for the runtime measurement store.

use crate::measuring_point::MeasuringPoint;
use crate::model::EntityKey;
use crate::probe::SimTime;
use serde::{Deserialize, Serialize};

/// What a runtime measurement represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// The time between a start and a stop observation.
    Duration,
    /// An instantaneous occurrence; the value is its point in time.
    Marker,
}

/// One measurement routed to the runtime measurement store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeMeasurement {
    /// The channel the measurement belongs to, usually a specification id.
    pub channel: String,
    /// The element the measurement was taken at.
    pub element: EntityKey,
    /// Where, in model terms, the measurement was taken.
    pub measuring_point: MeasuringPoint,
    /// What the value represents.
    pub kind: MeasurementKind,
    /// The value.
    pub value: f64,
    /// The simulation time the measurement was completed at.
    pub point_in_time: SimTime,
}

impl RuntimeMeasurement {
    /// Creates a duration measurement completed at `point_in_time`.
    pub fn duration(
        channel: impl Into<String>,
        element: EntityKey,
        measuring_point: MeasuringPoint,
        duration: SimTime,
        point_in_time: SimTime,
    ) -> Self {
        Self {
            channel: channel.into(),
            element,
            measuring_point,
            kind: MeasurementKind::Duration,
            value: duration,
            point_in_time,
        }
    }

    /// Creates a marker measurement at `point_in_time`.
    pub fn marker(
        channel: impl Into<String>,
        element: EntityKey,
        measuring_point: MeasuringPoint,
        point_in_time: SimTime,
    ) -> Self {
        Self {
            channel: channel.into(),
            element,
            measuring_point,
            kind: MeasurementKind::Marker,
            value: point_in_time,
            point_in_time,
        }
    }
}
