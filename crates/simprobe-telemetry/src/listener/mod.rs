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

//! The probe framework listener: dispatches interpretation events to probes.

mod builder;
pub mod reconfiguration;

pub use self::builder::ProbeFrameworkListenerBuilder;
pub use self::reconfiguration::{
    IgnoreReconfigurations, ReconfigurationMeasurement, ReconfigurationProbe,
};

use crate::config::ProbeFrameworkConfig;
use crate::extension::DecoratorFailure;
use crate::filter::MeasurementSpecificationFilter;
use crate::probes::ProbeRegistry;
use crate::storage::MeasurementBackend;
use crate::wiring::{CalculatorWiring, WiredCalculator};
use simprobe_core::interpreter::{
    InterpreterListener, ModelElementPassedEvent, ReconfigurationEvent,
};
use simprobe_core::monitoring::MonitorRepository;
use simprobe_core::simulation::SimulationControl;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Triggers the probes of instrumented elements as the interpreter passes them.
///
/// All instrumentation happens in [`ProbeFrameworkListenerBuilder::build`];
/// afterwards the listener only reads its registry. An event fires a probe
/// only if its element is instrumented and the simulation is running at that
/// moment. Everything else is a silent no-op.
pub struct ProbeFrameworkListener {
    repository: Arc<MonitorRepository>,
    simulation: Arc<dyn SimulationControl>,
    registry: ProbeRegistry,
    wiring: CalculatorWiring,
    reconfiguration: Arc<dyn ReconfigurationMeasurement>,
    decorator_failures: Vec<DecoratorFailure>,
    config: ProbeFrameworkConfig,
    observed_generation: AtomicU64,
}

impl ProbeFrameworkListener {
    /// Starts building a listener over `repository`, recording into `backend`.
    pub fn builder(
        repository: Arc<MonitorRepository>,
        simulation: Arc<dyn SimulationControl>,
        backend: Arc<dyn MeasurementBackend>,
    ) -> ProbeFrameworkListenerBuilder {
        ProbeFrameworkListenerBuilder::new(repository, simulation, backend)
    }

    /// The probe registry.
    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// The response-time calculators wired at setup.
    pub fn calculators(&self) -> &[WiredCalculator] {
        self.wiring.calculators()
    }

    /// The measurement store.
    pub fn backend(&self) -> &Arc<dyn MeasurementBackend> {
        self.wiring.backend()
    }

    /// A filter over the monitoring configuration the listener was built from.
    pub fn filter(&self) -> MeasurementSpecificationFilter<'_> {
        MeasurementSpecificationFilter::new(&self.repository)
    }

    /// Decorators that failed during setup.
    pub fn decorator_failures(&self) -> &[DecoratorFailure] {
        &self.decorator_failures
    }

    /// The configuration the listener was built with.
    pub fn config(&self) -> &ProbeFrameworkConfig {
        &self.config
    }

    /// Discards every start still waiting for its stop.
    ///
    /// Call when the simulation ends. The listener also does this on its own
    /// before the first event of every new run generation, so a start from one
    /// run is never paired with a stop from another.
    pub fn simulation_stopped(&self) -> usize {
        self.observed_generation
            .store(self.simulation.run_generation(), Ordering::SeqCst);
        self.wiring.discard_pending_starts()
    }

    /// Reads the running flag; never cached.
    fn is_running(&self) -> bool {
        let generation = self.simulation.run_generation();
        if self.observed_generation.swap(generation, Ordering::SeqCst) != generation {
            let discarded = self.wiring.discard_pending_starts();
            log::debug!(
                "Run generation changed to {generation}, discarded {discarded} pending start(s)."
            );
        }
        self.simulation.is_running()
    }

    fn start_measurement(&self, event: &ModelElementPassedEvent) {
        if !self.is_running() {
            return;
        }
        if let Some(pair) = self.registry.pair_for(&event.element) {
            log::trace!("Start of '{}' for {}.", event.element, event.context);
            pair.start().trigger(event.context);
        }
    }

    fn end_measurement(&self, event: &ModelElementPassedEvent) {
        if !self.is_running() {
            return;
        }
        if let Some(pair) = self.registry.pair_for(&event.element) {
            log::trace!("End of '{}' for {}.", event.element, event.context);
            pair.stop().trigger(event.context);
        }
    }
}

impl InterpreterListener for ProbeFrameworkListener {
    fn begin_usage_scenario_interpretation(&self, event: &ModelElementPassedEvent) {
        self.start_measurement(event);
    }

    fn end_usage_scenario_interpretation(&self, event: &ModelElementPassedEvent) {
        self.end_measurement(event);
    }

    fn begin_entry_level_system_call_interpretation(&self, event: &ModelElementPassedEvent) {
        self.start_measurement(event);
    }

    fn end_entry_level_system_call_interpretation(&self, event: &ModelElementPassedEvent) {
        self.end_measurement(event);
    }

    fn begin_external_call_interpretation(&self, event: &ModelElementPassedEvent) {
        self.start_measurement(event);
    }

    fn end_external_call_interpretation(&self, event: &ModelElementPassedEvent) {
        self.end_measurement(event);
    }

    fn begin_system_operation_call_interpretation(&self, event: &ModelElementPassedEvent) {
        self.start_measurement(event);
    }

    fn end_system_operation_call_interpretation(&self, event: &ModelElementPassedEvent) {
        self.end_measurement(event);
    }

    fn reconfiguration_interpretation(&self, event: &ReconfigurationEvent) {
        if self.is_running() {
            self.reconfiguration.on_reconfiguration(event);
        }
    }
}

impl fmt::Debug for ProbeFrameworkListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeFrameworkListener")
            .field("registry.len()", &self.registry.len())
            .field("calculators.len()", &self.wiring.calculators().len())
            .field("decorator_failures", &self.decorator_failures)
            .field("config", &self.config)
            .finish()
    }
}
