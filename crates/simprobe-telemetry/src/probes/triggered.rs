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

//! Probes whose observations are published to listeners.

use simprobe_core::probe::{ExecutionContext, Observation, Probe};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

static NEXT_PROBE_ID: AtomicU64 = AtomicU64::new(1);

/// A process-wide unique probe identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeId(u64);

impl ProbeId {
    fn next() -> Self {
        Self(NEXT_PROBE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe#{}", self.0)
    }
}

/// Receives the observations of the probes it is attached to.
pub trait ProbeListener: Send + Sync {
    /// Called once per observation taken by the probe `source`.
    fn on_observation(&self, source: ProbeId, observation: &Observation);
}

/// A probe together with the listeners its observations are published to.
///
/// Listeners are attached during setup; triggering only reads them.
pub struct TriggeredProbe {
    id: ProbeId,
    probe: Box<dyn Probe>,
    listeners: RwLock<Vec<Arc<dyn ProbeListener>>>,
}

impl TriggeredProbe {
    /// Wraps a probe and assigns it a fresh [`ProbeId`].
    pub fn new(probe: impl Probe + 'static) -> Self {
        Self {
            id: ProbeId::next(),
            probe: Box::new(probe),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Returns the identity of this probe.
    pub fn id(&self) -> ProbeId {
        self.id
    }

    /// Attaches a listener.
    pub fn add_listener(&self, listener: Arc<dyn ProbeListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Returns the number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Takes an observation for `context` and publishes it.
    pub fn trigger(&self, context: ExecutionContext) -> Observation {
        let observation = self.probe.take_measurement(context);
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.on_observation(self.id, &observation);
        }
        observation
    }
}

impl fmt::Debug for TriggeredProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggeredProbe")
            .field("id", &self.id)
            .field("probe", &self.probe)
            .field("listeners.len()", &self.listener_count())
            .finish()
    }
}
