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

//! Foundational crate of the simulation instrumentation layer: model element
//! identities, measuring points, the monitoring configuration, and the
//! contracts of probes, the simulation control and interpreter listeners.
//!
//! Implementations of the probe framework live in `simprobe-telemetry`.

#![warn(missing_docs)]

pub mod error;
pub mod interpreter;
pub mod measurement;
pub mod measuring_point;
pub mod model;
pub mod monitoring;
pub mod probe;
pub mod simulation;

pub use error::{ProbeError, ProbeResult, WiringFailure};
pub use measurement::{MeasurementKind, RuntimeMeasurement};
pub use measuring_point::MeasuringPoint;
pub use model::{EntityKey, ModelElement};
pub use monitoring::{
    MeasurementSpecification, MetricDescription, Monitor, MonitorRepository, ProcessingKind,
    ProcessingType,
};
pub use probe::{ExecutionContext, Observation, Probe, SimTime};
pub use simulation::{SharedSimulationControl, SimulationControl};
