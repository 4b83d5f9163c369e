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

//! The interpreter listener contract.
//!
//! The model interpreter reports the begin and end of every interpretable
//! construct, plus every reconfiguration, to its listeners. Notifications are
//! delivered synchronously on the simulation timeline, one at a time.

mod notification;

pub use self::notification::EventNotificationHelper;

use crate::model::EntityKey;
use crate::probe::{ExecutionContext, SimTime};
use std::fmt::{self, Display};

/// Whether a construct is being entered or left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Interpretation of the construct starts.
    Begin,
    /// Interpretation of the construct ends.
    End,
}

/// The kinds of interpretable constructs reported by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstructKind {
    /// A usage scenario.
    UsageScenario,
    /// An entry-level system call.
    EntryLevelSystemCall,
    /// An external call action.
    ExternalCall,
    /// A call of an operation at the system boundary.
    SystemOperationCall,
    /// Any other construct, named by its model kind.
    Unknown(String),
}

impl Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructKind::UsageScenario => f.write_str("UsageScenario"),
            ConstructKind::EntryLevelSystemCall => f.write_str("EntryLevelSystemCall"),
            ConstructKind::ExternalCall => f.write_str("ExternalCall"),
            ConstructKind::SystemOperationCall => f.write_str("SystemOperationCall"),
            ConstructKind::Unknown(kind) => write!(f, "Unknown({kind})"),
        }
    }
}

/// The notification that a model element is being passed.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelElementPassedEvent {
    /// The element being interpreted.
    pub element: EntityKey,
    /// Begin or end.
    pub event_type: EventType,
    /// The context of the simulated process passing the element.
    pub context: ExecutionContext,
}

impl ModelElementPassedEvent {
    /// Creates a begin notification.
    pub fn begin(element: impl Into<EntityKey>, context: ExecutionContext) -> Self {
        Self {
            element: element.into(),
            event_type: EventType::Begin,
            context,
        }
    }

    /// Creates an end notification.
    pub fn end(element: impl Into<EntityKey>, context: ExecutionContext) -> Self {
        Self {
            element: element.into(),
            event_type: EventType::End,
            context,
        }
    }
}

/// The notification that a reconfiguration took place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconfigurationEvent {
    /// The simulation time the reconfiguration was reported at.
    pub point_in_time: SimTime,
}

impl ReconfigurationEvent {
    /// Creates a reconfiguration notification.
    pub fn new(point_in_time: SimTime) -> Self {
        Self { point_in_time }
    }
}

/// Receives interpretation notifications.
///
/// All methods have default no-op implementations, so a listener only
/// overrides the notifications it cares about.
pub trait InterpreterListener: Send + Sync {
    /// A usage scenario is entered.
    fn begin_usage_scenario_interpretation(&self, _event: &ModelElementPassedEvent) {}

    /// A usage scenario is left.
    fn end_usage_scenario_interpretation(&self, _event: &ModelElementPassedEvent) {}

    /// An entry-level system call is entered.
    fn begin_entry_level_system_call_interpretation(&self, _event: &ModelElementPassedEvent) {}

    /// An entry-level system call is left.
    fn end_entry_level_system_call_interpretation(&self, _event: &ModelElementPassedEvent) {}

    /// An external call is entered.
    fn begin_external_call_interpretation(&self, _event: &ModelElementPassedEvent) {}

    /// An external call is left.
    fn end_external_call_interpretation(&self, _event: &ModelElementPassedEvent) {}

    /// A system operation call is entered. The element is the operation
    /// signature.
    fn begin_system_operation_call_interpretation(&self, _event: &ModelElementPassedEvent) {}

    /// A system operation call is left.
    fn end_system_operation_call_interpretation(&self, _event: &ModelElementPassedEvent) {}

    /// A construct of an unclassified kind is entered.
    fn begin_unknown_element_interpretation(&self, _kind: &str, _event: &ModelElementPassedEvent) {}

    /// A construct of an unclassified kind is left.
    fn end_unknown_element_interpretation(&self, _kind: &str, _event: &ModelElementPassedEvent) {}

    /// A reconfiguration took place.
    fn reconfiguration_interpretation(&self, _event: &ReconfigurationEvent) {}
}

/// Routes a notification to the typed callback matching `kind` and the
/// event's [`EventType`].
pub fn dispatch_interpretation_event<L>(
    listener: &L,
    kind: &ConstructKind,
    event: &ModelElementPassedEvent,
) where
    L: InterpreterListener + ?Sized,
{
    match (kind, event.event_type) {
        (ConstructKind::UsageScenario, EventType::Begin) => {
            listener.begin_usage_scenario_interpretation(event)
        }
        (ConstructKind::UsageScenario, EventType::End) => {
            listener.end_usage_scenario_interpretation(event)
        }
        (ConstructKind::EntryLevelSystemCall, EventType::Begin) => {
            listener.begin_entry_level_system_call_interpretation(event)
        }
        (ConstructKind::EntryLevelSystemCall, EventType::End) => {
            listener.end_entry_level_system_call_interpretation(event)
        }
        (ConstructKind::ExternalCall, EventType::Begin) => {
            listener.begin_external_call_interpretation(event)
        }
        (ConstructKind::ExternalCall, EventType::End) => {
            listener.end_external_call_interpretation(event)
        }
        (ConstructKind::SystemOperationCall, EventType::Begin) => {
            listener.begin_system_operation_call_interpretation(event)
        }
        (ConstructKind::SystemOperationCall, EventType::End) => {
            listener.end_system_operation_call_interpretation(event)
        }
        (ConstructKind::Unknown(name), EventType::Begin) => {
            listener.begin_unknown_element_interpretation(name, event)
        }
        (ConstructKind::Unknown(name), EventType::End) => {
            listener.end_unknown_element_interpretation(name, event)
        }
    }
}
