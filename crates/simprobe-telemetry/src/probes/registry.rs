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

//! Registry of the probe pairs of instrumented model elements.

use super::current_time::CurrentSimulationTimeProbe;
use super::pair::ProbePair;
use super::triggered::TriggeredProbe;
use simprobe_core::error::{ProbeError, ProbeResult};
use simprobe_core::model::EntityKey;
use simprobe_core::simulation::SimulationControl;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the mapping from instrumented element to its [`ProbePair`].
///
/// At most one pair exists per [`EntityKey`]. The registry is populated during
/// setup and only read afterwards, so lookups take no locks.
#[derive(Debug)]
pub struct ProbeRegistry {
    simulation: Arc<dyn SimulationControl>,
    pairs: HashMap<EntityKey, ProbePair>,
}

impl ProbeRegistry {
    /// Creates an empty registry whose probes read the clock of `simulation`.
    pub fn new(simulation: Arc<dyn SimulationControl>) -> Self {
        Self {
            simulation,
            pairs: HashMap::new(),
        }
    }

    /// Returns the pair of `key`, creating it on first request.
    ///
    /// A second request for the same key returns the existing pair and
    /// allocates nothing.
    pub fn register_pair(&mut self, key: &EntityKey) -> ProbePair {
        if let Some(pair) = self.pairs.get(key) {
            log::debug!("Entity '{key}' is already instrumented, reusing its probes.");
            return pair.clone();
        }

        let pair = ProbePair::new(
            TriggeredProbe::new(CurrentSimulationTimeProbe::new(self.simulation.clone())),
            TriggeredProbe::new(CurrentSimulationTimeProbe::new(self.simulation.clone())),
        );
        self.pairs.insert(key.clone(), pair.clone());
        log::info!("Registered start/stop probes for entity '{key}'.");
        pair
    }

    /// Returns `true` if a pair exists for `key`.
    pub fn is_instrumented(&self, key: &EntityKey) -> bool {
        self.pairs.contains_key(key)
    }

    /// Returns the pair of `key`, if any.
    pub fn pair_for(&self, key: &EntityKey) -> Option<&ProbePair> {
        self.pairs.get(key)
    }

    /// Returns the start probe of `key`.
    pub fn start_probe_for(&self, key: &EntityKey) -> ProbeResult<&Arc<TriggeredProbe>> {
        self.pairs
            .get(key)
            .map(ProbePair::start)
            .ok_or_else(|| ProbeError::NotInstrumented(key.clone()))
    }

    /// Returns the stop probe of `key`.
    pub fn stop_probe_for(&self, key: &EntityKey) -> ProbeResult<&Arc<TriggeredProbe>> {
        self.pairs
            .get(key)
            .map(ProbePair::stop)
            .ok_or_else(|| ProbeError::NotInstrumented(key.clone()))
    }

    /// Iterates over all instrumented keys, in no particular order.
    pub fn instrumented_keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.pairs.keys()
    }

    /// Returns the number of instrumented elements.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if nothing is instrumented.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the simulation the probes read their clock from.
    pub fn simulation(&self) -> &Arc<dyn SimulationControl> {
        &self.simulation
    }
}
