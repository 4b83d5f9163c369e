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

//! Measuring points: what is measured, and where, in model terms.

use crate::model::EntityKey;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The model-level description of a place where observations are taken.
///
/// A measuring point is immutable once resolved. For a given metric it is
/// one-to-one with the monitored model element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasuringPoint {
    /// A processing resource of a resource container.
    ActiveResource {
        /// The active resource specification.
        active_resource: EntityKey,
        /// The replica of the resource. Only replica `0` is ever resolved.
        replica_id: u32,
    },
    /// An operation called through a required role.
    AssemblyOperation {
        /// The calling assembly context, when known.
        assembly: Option<EntityKey>,
        /// The role the operation is reached through.
        role: EntityKey,
        /// The called operation signature.
        operation_signature: EntityKey,
    },
    /// An operation offered at the system boundary.
    SystemOperation {
        /// The system offering the operation.
        system: EntityKey,
        /// The providing role.
        role: EntityKey,
        /// The offered operation signature.
        operation_signature: EntityKey,
    },
    /// A usage scenario.
    UsageScenario {
        /// The scenario.
        usage_scenario: EntityKey,
    },
    /// A free-form label for measurements with no structural counterpart.
    Text {
        /// The label.
        label: String,
    },
}

impl MeasuringPoint {
    /// Creates a textual measuring point.
    pub fn text(label: impl Into<String>) -> Self {
        MeasuringPoint::Text {
            label: label.into(),
        }
    }

    /// Returns a canonical string form, stable across runs.
    pub fn string_representation(&self) -> String {
        match self {
            MeasuringPoint::ActiveResource {
                active_resource,
                replica_id,
            } => format!("ActiveResource[{active_resource}]#{replica_id}"),
            MeasuringPoint::AssemblyOperation {
                assembly,
                role,
                operation_signature,
            } => match assembly {
                Some(assembly) => {
                    format!("AssemblyOperation[{assembly}/{role}/{operation_signature}]")
                }
                None => format!("AssemblyOperation[{role}/{operation_signature}]"),
            },
            MeasuringPoint::SystemOperation {
                system,
                role,
                operation_signature,
            } => format!("SystemOperation[{system}/{role}/{operation_signature}]"),
            MeasuringPoint::UsageScenario { usage_scenario } => {
                format!("UsageScenario[{usage_scenario}]")
            }
            MeasuringPoint::Text { label } => label.clone(),
        }
    }
}

impl Display for MeasuringPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_representation())
    }
}
