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

use super::reconfiguration::{
    IgnoreReconfigurations, ReconfigurationMeasurement, ReconfigurationProbe,
};
use super::ProbeFrameworkListener;
use crate::config::{ProbeFrameworkConfig, ReconfigurationMode};
use crate::extension::{run_decorators, ExtensionContext, ProbeFrameworkListenerDecorator};
use crate::filter::MeasurementSpecificationFilter;
use crate::probes::ProbeRegistry;
use crate::storage::MeasurementBackend;
use crate::wiring::CalculatorWiring;
use simprobe_core::error::{ProbeError, ProbeResult};
use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::monitoring::{MetricDescription, MonitorRepository};
use simprobe_core::simulation::SimulationControl;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Assembles a [`ProbeFrameworkListener`].
///
/// The monitoring configuration, simulation control and measurement store are
/// required; decorators and the reconfiguration strategy are optional.
pub struct ProbeFrameworkListenerBuilder {
    repository: Arc<MonitorRepository>,
    simulation: Arc<dyn SimulationControl>,
    backend: Arc<dyn MeasurementBackend>,
    config: ProbeFrameworkConfig,
    decorators: Vec<Arc<dyn ProbeFrameworkListenerDecorator>>,
    reconfiguration: Option<Arc<dyn ReconfigurationMeasurement>>,
}

impl ProbeFrameworkListenerBuilder {
    pub(super) fn new(
        repository: Arc<MonitorRepository>,
        simulation: Arc<dyn SimulationControl>,
        backend: Arc<dyn MeasurementBackend>,
    ) -> Self {
        Self {
            repository,
            simulation,
            backend,
            config: ProbeFrameworkConfig::default(),
            decorators: Vec::new(),
            reconfiguration: None,
        }
    }

    /// Replaces the default configuration.
    pub fn with_config(mut self, config: ProbeFrameworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a decorator. Decorators run in the order they were added.
    pub fn with_decorator(mut self, decorator: Arc<dyn ProbeFrameworkListenerDecorator>) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Overrides the reconfiguration strategy derived from the configuration.
    pub fn with_reconfiguration_strategy(
        mut self,
        strategy: Arc<dyn ReconfigurationMeasurement>,
    ) -> Self {
        self.reconfiguration = Some(strategy);
        self
    }

    /// Instruments every active response-time specification, runs the
    /// decorators and returns the listener.
    ///
    /// Fails with [`ProbeError::WiringFailed`] if any specification cannot be
    /// wired. Decorator failures are collected on the listener, or returned as
    /// [`ProbeError::Decorator`] when `fail_on_decorator_error` is set.
    pub fn build(self) -> ProbeResult<ProbeFrameworkListener> {
        let Self {
            repository,
            simulation,
            backend,
            config,
            decorators,
            reconfiguration,
        } = self;

        let mut registry = ProbeRegistry::new(simulation.clone());
        let mut wiring =
            CalculatorWiring::new(backend.clone(), config.response_time_metric.clone());

        let specifications = MeasurementSpecificationFilter::new(&repository)
            .by_metric(&config.response_time_metric);
        log::info!(
            "Found {} active '{}' specification(s).",
            specifications.len(),
            config.response_time_metric.id
        );
        wiring.wire_all(&mut registry, specifications)?;

        let decorator_failures = {
            let mut context =
                ExtensionContext::new(&repository, &simulation, &mut registry, &mut wiring);
            run_decorators(&decorators, &mut context)
        };
        if config.fail_on_decorator_error {
            if let Some(failure) = decorator_failures.first() {
                return Err(ProbeError::from(failure.clone()));
            }
        }

        let reconfiguration = reconfiguration
            .unwrap_or_else(|| default_reconfiguration(&config, &simulation, &backend));

        log::info!(
            "Probe framework listener ready: {} instrumented element(s), {} calculator(s), {} decorator(s) failed.",
            registry.len(),
            wiring.calculators().len(),
            decorator_failures.len()
        );

        let observed_generation = AtomicU64::new(simulation.run_generation());
        Ok(ProbeFrameworkListener {
            repository,
            simulation,
            registry,
            wiring,
            reconfiguration,
            decorator_failures,
            config,
            observed_generation,
        })
    }
}

fn default_reconfiguration(
    config: &ProbeFrameworkConfig,
    simulation: &Arc<dyn SimulationControl>,
    backend: &Arc<dyn MeasurementBackend>,
) -> Arc<dyn ReconfigurationMeasurement> {
    let measuring_point = MeasuringPoint::text(config.reconfiguration_measuring_point.as_str());
    match config.reconfiguration_mode {
        ReconfigurationMode::Record => Arc::new(ReconfigurationProbe::recording(
            simulation.clone(),
            measuring_point,
            MetricDescription::reconfiguration_time(),
            backend.clone(),
        )),
        ReconfigurationMode::ProbeOnly => Arc::new(ReconfigurationProbe::probe_only(
            simulation.clone(),
            measuring_point,
        )),
        ReconfigurationMode::Disabled => Arc::new(IgnoreReconfigurations),
    }
}
