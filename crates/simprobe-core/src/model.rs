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

//! Structural model elements and their stable identities.
//!
//! The instrumentation layer never holds on to model objects owned by the
//! modeling framework. Every element is described by a plain value carrying an
//! [`EntityKey`], assigned once when the model is loaded. Probes are keyed by
//! that identity, so repeated lookups across a run always resolve to the same
//! registration.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The stable, opaque identity of a structural model element.
///
/// Keys compare by value, never by the memory identity of the element they
/// were taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Creates a key from any string-like identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityKey {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A keyed, named model element without further structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    /// The element identity.
    pub key: EntityKey,
    /// A human-readable name, used in log and error messages only.
    #[serde(default)]
    pub name: String,
}

impl NamedEntity {
    /// Creates a named entity.
    pub fn new(key: impl Into<EntityKey>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// A processing resource declared on a resource container (CPU, HDD, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveResourceSpecification {
    /// The identity of the resource specification.
    pub key: EntityKey,
    /// The resource type, e.g. `"CPU"`.
    #[serde(default)]
    pub resource_type: String,
}

/// A container of processing resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContainer {
    /// The container identity.
    pub key: EntityKey,
    /// The container name.
    #[serde(default)]
    pub name: String,
    /// Active resources in declaration order.
    #[serde(default)]
    pub active_resources: Vec<ActiveResourceSpecification>,
}

/// An external service call issued from inside a component behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCallAction {
    /// The action identity.
    pub key: EntityKey,
    /// The action name.
    #[serde(default)]
    pub name: String,
    /// The operation signature being called.
    pub called_service: NamedEntity,
    /// The required role the call goes through.
    pub role: NamedEntity,
}

/// The entity that provides a role: either the system itself or a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterfaceProvidingEntity {
    /// The top-level system.
    System(NamedEntity),
    /// A component inside the system.
    Component(NamedEntity),
}

impl InterfaceProvidingEntity {
    /// Returns the identity of the providing entity.
    pub fn key(&self) -> &EntityKey {
        match self {
            InterfaceProvidingEntity::System(entity)
            | InterfaceProvidingEntity::Component(entity) => &entity.key,
        }
    }
}

/// A provided role together with the entity that provides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidedRole {
    /// The role identity.
    pub key: EntityKey,
    /// The role name.
    #[serde(default)]
    pub name: String,
    /// The entity offering this role.
    pub providing_entity: InterfaceProvidingEntity,
}

/// A call from the usage model into an operation offered by the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLevelSystemCall {
    /// The call identity.
    pub key: EntityKey,
    /// The call name.
    #[serde(default)]
    pub name: String,
    /// The operation signature being called.
    pub operation_signature: NamedEntity,
    /// The role the call enters the system through.
    pub provided_role: ProvidedRole,
}

/// A usage scenario of the usage model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageScenario {
    /// The scenario identity.
    pub key: EntityKey,
    /// The scenario name.
    #[serde(default)]
    pub name: String,
}

/// An operation offered at the system boundary.
///
/// System operation calls are observed per operation signature, so the
/// signature key is the identity of this element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemOperation {
    /// The operation signature.
    pub signature: NamedEntity,
    /// The role providing the operation.
    pub provided_role: ProvidedRole,
}

/// An element kind the instrumentation layer does not know how to measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnclassifiedElement {
    /// The element identity.
    pub key: EntityKey,
    /// The element kind as reported by the model, e.g. `"BranchAction"`.
    pub element_kind: String,
}

/// A structural model element that can be the target of a measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelElement {
    /// A resource container.
    ResourceContainer(ResourceContainer),
    /// An external call action.
    ExternalCall(ExternalCallAction),
    /// An entry-level system call.
    EntryLevelSystemCall(EntryLevelSystemCall),
    /// A usage scenario.
    UsageScenario(UsageScenario),
    /// An operation at the system boundary.
    SystemOperation(SystemOperation),
    /// A free-form textual point for non-structural events.
    Text {
        /// The label of the point; also its identity.
        label: String,
    },
    /// Any other element.
    Unclassified(UnclassifiedElement),
}

impl ModelElement {
    /// Returns the stable identity used to key probes for this element.
    pub fn key(&self) -> EntityKey {
        match self {
            ModelElement::ResourceContainer(container) => container.key.clone(),
            ModelElement::ExternalCall(call) => call.key.clone(),
            ModelElement::EntryLevelSystemCall(call) => call.key.clone(),
            ModelElement::UsageScenario(scenario) => scenario.key.clone(),
            ModelElement::SystemOperation(operation) => operation.signature.key.clone(),
            ModelElement::Text { label } => EntityKey::new(label.as_str()),
            ModelElement::Unclassified(element) => element.key.clone(),
        }
    }

    /// Returns a short name of the element kind.
    pub fn kind_name(&self) -> &str {
        match self {
            ModelElement::ResourceContainer(_) => "ResourceContainer",
            ModelElement::ExternalCall(_) => "ExternalCallAction",
            ModelElement::EntryLevelSystemCall(_) => "EntryLevelSystemCall",
            ModelElement::UsageScenario(_) => "UsageScenario",
            ModelElement::SystemOperation(_) => "SystemOperation",
            ModelElement::Text { .. } => "Text",
            ModelElement::Unclassified(element) => &element.element_kind,
        }
    }
}

impl Display for ModelElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind_name(), self.key())
    }
}
