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

use super::{
    dispatch_interpretation_event, ConstructKind, InterpreterListener, ModelElementPassedEvent,
    ReconfigurationEvent,
};
use std::sync::Arc;

/// Fans interpretation notifications out to every registered listener.
///
/// There is one helper per simulation run. Listeners are notified in
/// registration order.
#[derive(Default)]
pub struct EventNotificationHelper {
    listeners: Vec<Arc<dyn InterpreterListener>>,
}

impl EventNotificationHelper {
    /// Creates a helper without listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn add_listener(&mut self, listener: Arc<dyn InterpreterListener>) {
        self.listeners.push(listener);
        log::debug!(
            "Interpreter listener registered ({} total).",
            self.listeners.len()
        );
    }

    /// Unregisters a listener previously passed to [`add_listener`](Self::add_listener).
    ///
    /// Returns `false` if the listener was not registered.
    pub fn remove_listener(&mut self, listener: &Arc<dyn InterpreterListener>) -> bool {
        let before = self.listeners.len();
        self.listeners
            .retain(|registered| !Arc::ptr_eq(registered, listener));
        before != self.listeners.len()
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Forwards a begin or end notification of a construct of `kind`.
    pub fn fire_interpretation(&self, kind: &ConstructKind, event: &ModelElementPassedEvent) {
        log::trace!("{:?} {} '{}' ({})", event.event_type, kind, event.element, event.context);
        for listener in &self.listeners {
            dispatch_interpretation_event(listener.as_ref(), kind, event);
        }
    }

    /// Forwards a reconfiguration notification.
    pub fn fire_reconfiguration(&self, event: &ReconfigurationEvent) {
        log::trace!("Reconfiguration at {}", event.point_in_time);
        for listener in &self.listeners {
            listener.reconfiguration_interpretation(event);
        }
    }
}
