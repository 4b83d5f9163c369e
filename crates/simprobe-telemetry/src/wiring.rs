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

//! Wiring of response-time calculators and aggregators at setup time.

use crate::aggregators::ResponseTimeAggregator;
use crate::calculators::ResponseTimeCalculator;
use crate::probes::ProbeRegistry;
use crate::resolver::MeasuringPointResolver;
use crate::storage::MeasurementBackend;
use simprobe_core::error::{ProbeError, ProbeResult, WiringFailure};
use simprobe_core::model::EntityKey;
use simprobe_core::monitoring::{MeasurementSpecification, MetricDescription};
use std::sync::Arc;

/// A calculator wired for one measurement specification.
#[derive(Debug, Clone)]
pub struct WiredCalculator {
    /// The specification id.
    pub specification: String,
    /// The instrumented element.
    pub element: EntityKey,
    /// The calculator attached to the element's probe pair.
    pub calculator: Arc<ResponseTimeCalculator>,
    /// The aggregator attached to the calculator.
    pub aggregator: Arc<ResponseTimeAggregator>,
}

/// Builds one calculator and aggregator per response-time specification.
///
/// The measurement store is injected here and shared by every aggregator.
#[derive(Debug)]
pub struct CalculatorWiring {
    backend: Arc<dyn MeasurementBackend>,
    resolver: MeasuringPointResolver,
    response_time_metric: MetricDescription,
    calculators: Vec<WiredCalculator>,
}

impl CalculatorWiring {
    /// Creates a wiring that records into `backend`.
    pub fn new(
        backend: Arc<dyn MeasurementBackend>,
        response_time_metric: MetricDescription,
    ) -> Self {
        Self {
            backend,
            resolver: MeasuringPointResolver::new(),
            response_time_metric,
            calculators: Vec::new(),
        }
    }

    /// Wires a response-time calculator for `specification`.
    ///
    /// The measuring point is resolved and the store channel opened before the
    /// element is instrumented, so a failed specification leaves no probes
    /// behind. Wiring an already wired specification is a no-op.
    pub fn wire_response_time(
        &mut self,
        registry: &mut ProbeRegistry,
        specification: &MeasurementSpecification,
    ) -> ProbeResult<()> {
        if !specification.metric.same_metric(&self.response_time_metric) {
            return Err(ProbeError::InvalidArgument(format!(
                "specification '{}' measures '{}', not '{}'",
                specification.id, specification.metric.id, self.response_time_metric.id
            )));
        }
        if self.is_wired(&specification.id) {
            log::debug!("Specification '{}' is already wired.", specification.id);
            return Ok(());
        }

        let element = specification.monitored_element.as_ref();
        let measuring_point = self.resolver.resolve(element)?;
        let key = element.map(|element| element.key()).ok_or_else(|| {
            ProbeError::InvalidArgument(format!(
                "specification '{}' has no monitored element",
                specification.id
            ))
        })?;

        let aggregator = ResponseTimeAggregator::open(
            specification,
            key.clone(),
            measuring_point.clone(),
            self.backend.clone(),
        )?;
        let pair = registry.register_pair(&key);
        let calculator = ResponseTimeCalculator::attach(measuring_point, &pair);
        calculator.add_listener(aggregator.clone());

        log::info!(
            "Wired response time calculator for '{}' at {}.",
            specification.id,
            calculator.measuring_point()
        );
        self.calculators.push(WiredCalculator {
            specification: specification.id.clone(),
            element: key,
            calculator,
            aggregator,
        });
        Ok(())
    }

    /// Wires every specification, returning how many were wired.
    ///
    /// Each specification is wired independently. If any fail, the others stay
    /// wired and all failures are reported together as
    /// [`ProbeError::WiringFailed`].
    pub fn wire_all<'s>(
        &mut self,
        registry: &mut ProbeRegistry,
        specifications: impl IntoIterator<Item = &'s MeasurementSpecification>,
    ) -> ProbeResult<usize> {
        let mut wired = 0;
        let mut failures = Vec::new();

        for specification in specifications {
            match self.wire_response_time(registry, specification) {
                Ok(()) => wired += 1,
                Err(e) => {
                    log::error!("Failed to wire specification '{}': {e}", specification.id);
                    failures.push(WiringFailure::new(specification.id.as_str(), e));
                }
            }
        }

        if failures.is_empty() {
            Ok(wired)
        } else {
            Err(ProbeError::WiringFailed(failures))
        }
    }

    /// Returns `true` if a calculator exists for the specification id.
    pub fn is_wired(&self, specification: &str) -> bool {
        self.calculators
            .iter()
            .any(|wired| wired.specification == specification)
    }

    /// Drops the pending starts of every calculator.
    pub fn discard_pending_starts(&self) -> usize {
        self.calculators
            .iter()
            .map(|wired| wired.calculator.discard_pending())
            .sum()
    }

    /// The wired calculators, in wiring order.
    pub fn calculators(&self) -> &[WiredCalculator] {
        &self.calculators
    }

    /// The injected measurement store.
    pub fn backend(&self) -> &Arc<dyn MeasurementBackend> {
        &self.backend
    }

    /// The metric treated as response time.
    pub fn response_time_metric(&self) -> &MetricDescription {
        &self.response_time_metric
    }
}
