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

//! Queries over the active part of a monitoring configuration.

use simprobe_core::error::ProbeResult;
use simprobe_core::monitoring::{
    MeasurementSpecification, MetricDescription, MonitorRepository, ProcessingKind,
};

/// Selects measurement specifications of activated monitors.
///
/// Specifications of deactivated monitors are never returned. Results borrow
/// from the repository and are empty, not absent, when nothing matches.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementSpecificationFilter<'a> {
    repository: &'a MonitorRepository,
}

impl<'a> MeasurementSpecificationFilter<'a> {
    /// Creates a filter over `repository`.
    pub fn new(repository: &'a MonitorRepository) -> Self {
        Self { repository }
    }

    /// Returns all specifications of active monitors measuring `metric`.
    pub fn by_metric(&self, metric: &MetricDescription) -> Vec<&'a MeasurementSpecification> {
        self.active_specifications()
            .filter(|spec| spec.metric.same_metric(metric))
            .collect()
    }

    /// Returns all specifications of active monitors whose processing type is
    /// classified by `kind`.
    ///
    /// `kind` is a processing-type name such as `"FixedSizeAggregation"`; the
    /// abstract `"ProcessingType"` matches every specification.
    pub fn by_processing_kind(&self, kind: &str) -> ProbeResult<Vec<&'a MeasurementSpecification>> {
        let kind: ProcessingKind = kind.parse()?;
        Ok(self.by_processing_type(kind))
    }

    /// Typed variant of [`Self::by_processing_kind`].
    pub fn by_processing_type(&self, kind: ProcessingKind) -> Vec<&'a MeasurementSpecification> {
        self.active_specifications()
            .filter(|spec| kind.classifies(&spec.processing_type))
            .collect()
    }

    fn active_specifications(&self) -> impl Iterator<Item = &'a MeasurementSpecification> {
        self.repository
            .active_monitors()
            .flat_map(|monitor| monitor.measurement_specifications.iter())
    }
}
