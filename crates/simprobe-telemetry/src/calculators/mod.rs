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

//! Calculators derive metric values from probe observations.

pub mod response_time;

pub use self::response_time::ResponseTimeCalculator;

use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::probe::{ExecutionContext, SimTime};

/// A completed start/stop observation pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatedMeasurement<'a> {
    /// Where the pair was observed.
    pub measuring_point: &'a MeasuringPoint,
    /// The invocation the pair belongs to.
    pub context: ExecutionContext,
    /// Simulation time of the start observation.
    pub start: SimTime,
    /// Simulation time of the stop observation.
    pub stop: SimTime,
}

impl CalculatedMeasurement<'_> {
    /// The elapsed simulation time between start and stop.
    pub fn duration(&self) -> SimTime {
        self.stop - self.start
    }
}

/// Receives every measurement a calculator produces.
pub trait CalculatorListener: Send + Sync {
    /// Called once per completed pair.
    fn on_calculated(&self, measurement: &CalculatedMeasurement<'_>);
}
