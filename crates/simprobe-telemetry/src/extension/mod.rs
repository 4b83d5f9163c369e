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

//! Extension hook for externally supplied measurement wiring.
//!
//! Decorators are listed explicitly when the listener is built. Each one gets
//! an [`ExtensionContext`] that can add instrumentation but never remove it.

use crate::filter::MeasurementSpecificationFilter;
use crate::probes::{ProbeListener, ProbePair, ProbeRegistry};
use crate::storage::MeasurementBackend;
use crate::wiring::CalculatorWiring;
use simprobe_core::error::{ProbeError, ProbeResult};
use simprobe_core::model::EntityKey;
use simprobe_core::monitoring::{MeasurementSpecification, MetricDescription, MonitorRepository};
use simprobe_core::simulation::SimulationControl;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Adds measurements to a probe framework listener during setup.
pub trait ProbeFrameworkListenerDecorator: Send + Sync {
    /// A name identifying the decorator in logs and failure reports.
    fn name(&self) -> &str;

    /// Registers additional instrumentation.
    fn register_measurements(&self, context: &mut ExtensionContext<'_>) -> anyhow::Result<()>;
}

/// The registration handle handed to decorators.
pub struct ExtensionContext<'a> {
    repository: &'a MonitorRepository,
    simulation: &'a Arc<dyn SimulationControl>,
    registry: &'a mut ProbeRegistry,
    wiring: &'a mut CalculatorWiring,
}

impl<'a> ExtensionContext<'a> {
    pub(crate) fn new(
        repository: &'a MonitorRepository,
        simulation: &'a Arc<dyn SimulationControl>,
        registry: &'a mut ProbeRegistry,
        wiring: &'a mut CalculatorWiring,
    ) -> Self {
        Self {
            repository,
            simulation,
            registry,
            wiring,
        }
    }

    /// A filter over the monitoring configuration.
    pub fn filter(&self) -> MeasurementSpecificationFilter<'a> {
        MeasurementSpecificationFilter::new(self.repository)
    }

    /// Active specifications measuring `metric`.
    pub fn specifications_by_metric(
        &self,
        metric: &MetricDescription,
    ) -> Vec<&'a MeasurementSpecification> {
        self.filter().by_metric(metric)
    }

    /// Active specifications whose processing type is classified by `kind`.
    pub fn specifications_by_processing_kind(
        &self,
        kind: &str,
    ) -> ProbeResult<Vec<&'a MeasurementSpecification>> {
        self.filter().by_processing_kind(kind)
    }

    /// Instruments `key`, reusing its pair if it already has one.
    pub fn register_pair(&mut self, key: &EntityKey) -> ProbePair {
        self.registry.register_pair(key)
    }

    /// Returns `true` if `key` is instrumented.
    pub fn is_instrumented(&self, key: &EntityKey) -> bool {
        self.registry.is_instrumented(key)
    }

    /// Wires a response-time calculator for `specification`.
    pub fn wire_response_time(
        &mut self,
        specification: &MeasurementSpecification,
    ) -> ProbeResult<()> {
        self.wiring.wire_response_time(self.registry, specification)
    }

    /// Attaches `listener` to both probes of an instrumented element.
    ///
    /// The listener tells start from stop by the probe ids of
    /// [`ProbePair::start`] and [`ProbePair::stop`].
    pub fn attach_probe_listener(
        &self,
        key: &EntityKey,
        listener: Arc<dyn ProbeListener>,
    ) -> ProbeResult<ProbePair> {
        let pair = self
            .registry
            .pair_for(key)
            .ok_or_else(|| ProbeError::NotInstrumented(key.clone()))?;
        pair.start().add_listener(listener.clone());
        pair.stop().add_listener(listener);
        Ok(pair.clone())
    }

    /// The measurement store shared by all aggregators.
    pub fn backend(&self) -> &Arc<dyn MeasurementBackend> {
        self.wiring.backend()
    }

    /// The simulation the probes read their clock from.
    pub fn simulation(&self) -> &Arc<dyn SimulationControl> {
        self.simulation
    }
}

impl fmt::Debug for ExtensionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("monitors.len()", &self.repository.monitors.len())
            .field("registry.len()", &self.registry.len())
            .field("calculators.len()", &self.wiring.calculators().len())
            .finish()
    }
}

/// A decorator that failed to register its measurements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorFailure {
    /// The decorator name.
    pub decorator: String,
    /// The reported error or panic message.
    pub reason: String,
    /// Whether the decorator panicked rather than returning an error.
    pub panicked: bool,
}

impl From<DecoratorFailure> for ProbeError {
    fn from(failure: DecoratorFailure) -> Self {
        ProbeError::Decorator {
            name: failure.decorator,
            reason: failure.reason,
        }
    }
}

/// Runs every decorator in order, isolating their failures.
///
/// A decorator that errors or panics is logged and reported; the remaining
/// decorators still run.
pub(crate) fn run_decorators(
    decorators: &[Arc<dyn ProbeFrameworkListenerDecorator>],
    context: &mut ExtensionContext<'_>,
) -> Vec<DecoratorFailure> {
    let mut failures = Vec::new();

    for decorator in decorators {
        let name = decorator.name().to_string();
        let result = catch_unwind(AssertUnwindSafe(|| decorator.register_measurements(context)));

        let failure = match result {
            Ok(Ok(())) => {
                log::info!("Decorator '{name}' registered its measurements.");
                continue;
            }
            Ok(Err(e)) => DecoratorFailure {
                decorator: name,
                reason: format!("{e:#}"),
                panicked: false,
            },
            Err(payload) => DecoratorFailure {
                decorator: name,
                reason: panic_message(payload.as_ref()),
                panicked: true,
            },
        };
        log::error!(
            "Decorator '{}' failed to register its measurements: {}",
            failure.decorator,
            failure.reason
        );
        failures.push(failure);
    }

    failures
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}
