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

//! Resolution of model elements to measuring points.

use simprobe_core::error::{ProbeError, ProbeResult};
use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::model::{InterfaceProvidingEntity, ModelElement, NamedEntity, ProvidedRole};

/// Only the first replica of a resource is measured.
const DEFAULT_REPLICA_ID: u32 = 0;

/// Maps structural model elements to the canonical [`MeasuringPoint`] used to
/// build calculators.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeasuringPointResolver;

impl MeasuringPointResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolves `element` to its measuring point.
    ///
    /// A missing element fails with [`ProbeError::InvalidArgument`] before any
    /// kind is inspected.
    pub fn resolve(&self, element: Option<&ModelElement>) -> ProbeResult<MeasuringPoint> {
        let element = element.ok_or_else(|| {
            ProbeError::InvalidArgument("model element must not be null".to_string())
        })?;

        match element {
            ModelElement::ResourceContainer(container) => {
                let resource = container.active_resources.first().ok_or_else(|| {
                    ProbeError::InvalidModelReference(format!(
                        "resource container '{}' declares no active resource",
                        container.key
                    ))
                })?;
                Ok(MeasuringPoint::ActiveResource {
                    active_resource: resource.key.clone(),
                    replica_id: DEFAULT_REPLICA_ID,
                })
            }
            // The calling assembly context is only known once the simulation runs.
            ModelElement::ExternalCall(call) => Ok(MeasuringPoint::AssemblyOperation {
                assembly: None,
                role: call.role.key.clone(),
                operation_signature: call.called_service.key.clone(),
            }),
            ModelElement::EntryLevelSystemCall(call) => {
                let system = providing_system(&call.provided_role).ok_or_else(|| {
                    ProbeError::InvalidModelReference(format!(
                        "entry level system call '{}' does not reference a system",
                        call.key
                    ))
                })?;
                Ok(MeasuringPoint::SystemOperation {
                    system: system.key.clone(),
                    role: call.provided_role.key.clone(),
                    operation_signature: call.operation_signature.key.clone(),
                })
            }
            ModelElement::SystemOperation(operation) => {
                let system = providing_system(&operation.provided_role).ok_or_else(|| {
                    ProbeError::InvalidModelReference(format!(
                        "system operation '{}' is not provided by a system",
                        operation.signature.key
                    ))
                })?;
                Ok(MeasuringPoint::SystemOperation {
                    system: system.key.clone(),
                    role: operation.provided_role.key.clone(),
                    operation_signature: operation.signature.key.clone(),
                })
            }
            ModelElement::UsageScenario(scenario) => Ok(MeasuringPoint::UsageScenario {
                usage_scenario: scenario.key.clone(),
            }),
            ModelElement::Text { label } => Ok(MeasuringPoint::text(label.as_str())),
            ModelElement::Unclassified(other) => Err(ProbeError::UnsupportedModelElement(
                format!("no measuring point mapping for {} '{}'", other.element_kind, other.key),
            )),
        }
    }
}

fn providing_system(role: &ProvidedRole) -> Option<&NamedEntity> {
    match &role.providing_entity {
        InterfaceProvidingEntity::System(system) => Some(system),
        InterfaceProvidingEntity::Component(_) => None,
    }
}
