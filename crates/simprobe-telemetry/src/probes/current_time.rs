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

//! A probe reading the current simulation time.

use simprobe_core::probe::{ExecutionContext, Observation, Probe};
use simprobe_core::simulation::SimulationControl;
use std::sync::Arc;

/// Observes the simulation time at the moment it is triggered.
#[derive(Debug, Clone)]
pub struct CurrentSimulationTimeProbe {
    simulation: Arc<dyn SimulationControl>,
}

impl CurrentSimulationTimeProbe {
    /// Creates a probe reading the clock of `simulation`.
    pub fn new(simulation: Arc<dyn SimulationControl>) -> Self {
        Self { simulation }
    }
}

impl Probe for CurrentSimulationTimeProbe {
    fn take_measurement(&self, context: ExecutionContext) -> Observation {
        Observation::new(self.simulation.current_time(), context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simprobe_core::simulation::SharedSimulationControl;

    #[test]
    fn test_reads_simulation_clock() {
        let control = Arc::new(SharedSimulationControl::new());
        let probe = CurrentSimulationTimeProbe::new(control.clone());

        control.set_time(1.25);
        let first = probe.take_measurement(ExecutionContext::new(3));
        control.advance(2.0);
        let second = probe.take_measurement(ExecutionContext::new(3));

        assert_eq!(first.value, 1.25);
        assert_eq!(second.value, 3.25);
        assert_eq!(second.context, ExecutionContext::new(3));
    }
}
