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

use super::{CalculatedMeasurement, CalculatorListener};
use crate::probes::{ProbeId, ProbeListener, ProbePair};
use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::probe::{ExecutionContext, Observation, SimTime};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Turns the observations of a start/stop [`ProbePair`] into durations.
///
/// Starts are kept per execution context, so interleaved invocations by
/// different simulated processes never mix. Within one context the innermost
/// start is paired first. A stop without a pending start is dropped.
pub struct ResponseTimeCalculator {
    measuring_point: MeasuringPoint,
    start_probe: ProbeId,
    stop_probe: ProbeId,
    pending: Mutex<HashMap<ExecutionContext, Vec<SimTime>>>,
    listeners: RwLock<Vec<Arc<dyn CalculatorListener>>>,
}

impl ResponseTimeCalculator {
    /// Creates a calculator and attaches it to both probes of `pair`.
    pub fn attach(measuring_point: MeasuringPoint, pair: &ProbePair) -> Arc<Self> {
        let calculator = Arc::new(Self {
            measuring_point,
            start_probe: pair.start().id(),
            stop_probe: pair.stop().id(),
            pending: Mutex::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
        });
        pair.start().add_listener(calculator.clone());
        pair.stop().add_listener(calculator.clone());
        calculator
    }

    /// The measuring point this calculator measures.
    pub fn measuring_point(&self) -> &MeasuringPoint {
        &self.measuring_point
    }

    /// Attaches a listener for calculated measurements.
    pub fn add_listener(&self, listener: Arc<dyn CalculatorListener>) {
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

    /// Returns the number of starts still waiting for their stop.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Drops every pending start and returns how many were dropped.
    pub fn discard_pending(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let discarded = pending.values().map(Vec::len).sum();
        pending.clear();
        if discarded > 0 {
            log::warn!(
                "Discarded {discarded} unfinished measurement(s) at {}.",
                self.measuring_point
            );
        }
        discarded
    }

    fn on_start(&self, observation: &Observation) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(observation.context)
            .or_default()
            .push(observation.value);
    }

    fn on_stop(&self, observation: &Observation) {
        let start = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            let start = pending
                .get_mut(&observation.context)
                .and_then(|starts| starts.pop());
            if pending
                .get(&observation.context)
                .is_some_and(|starts| starts.is_empty())
            {
                pending.remove(&observation.context);
            }
            start
        };

        let Some(start) = start else {
            log::warn!(
                "Dropped stop observation at {} for {}: no pending start.",
                self.measuring_point,
                observation.context
            );
            return;
        };

        if observation.value < start {
            log::warn!(
                "Dropped negative response time at {} for {} ({start} > {}).",
                self.measuring_point,
                observation.context,
                observation.value
            );
            return;
        }

        let measurement = CalculatedMeasurement {
            measuring_point: &self.measuring_point,
            context: observation.context,
            start,
            stop: observation.value,
        };
        log::trace!(
            "Response time {} at {} for {}.",
            measurement.duration(),
            self.measuring_point,
            observation.context
        );

        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.on_calculated(&measurement);
        }
    }
}

impl ProbeListener for ResponseTimeCalculator {
    fn on_observation(&self, source: ProbeId, observation: &Observation) {
        if source == self.start_probe {
            self.on_start(observation);
        } else if source == self.stop_probe {
            self.on_stop(observation);
        }
    }
}

impl fmt::Debug for ResponseTimeCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseTimeCalculator")
            .field("measuring_point", &self.measuring_point)
            .field("start_probe", &self.start_probe)
            .field("stop_probe", &self.stop_probe)
            .field("pending", &self.pending_count())
            .finish()
    }
}
