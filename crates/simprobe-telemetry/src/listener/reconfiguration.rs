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

//! Pluggable measurement of reconfiguration events.

use crate::aggregators::MarkerAggregator;
use crate::probes::{CurrentSimulationTimeProbe, TriggeredProbe};
use crate::storage::MeasurementBackend;
use simprobe_core::interpreter::ReconfigurationEvent;
use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::monitoring::MetricDescription;
use simprobe_core::probe::ExecutionContext;
use simprobe_core::simulation::SimulationControl;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Measures reconfiguration events.
///
/// Invoked by the listener for every reconfiguration while the simulation is
/// running. Closures taking a [`ReconfigurationEvent`] implement this trait.
pub trait ReconfigurationMeasurement: Send + Sync {
    /// Called once per reconfiguration event.
    fn on_reconfiguration(&self, event: &ReconfigurationEvent);
}

impl<F> ReconfigurationMeasurement for F
where
    F: Fn(&ReconfigurationEvent) + Send + Sync,
{
    fn on_reconfiguration(&self, event: &ReconfigurationEvent) {
        self(event)
    }
}

struct MarkerSink {
    metric: MetricDescription,
    backend: Arc<dyn MeasurementBackend>,
}

/// Triggers a single simulation-time probe per reconfiguration.
///
/// The probe is created on the first event and reused afterwards. When built
/// with [`ReconfigurationProbe::recording`] each observation is stored as a
/// marker at the probe's measuring point.
pub struct ReconfigurationProbe {
    simulation: Arc<dyn SimulationControl>,
    measuring_point: MeasuringPoint,
    sink: Option<MarkerSink>,
    probe: OnceLock<Arc<TriggeredProbe>>,
    probes_created: AtomicUsize,
}

impl ReconfigurationProbe {
    /// A probe whose observations are recorded into `backend`.
    pub fn recording(
        simulation: Arc<dyn SimulationControl>,
        measuring_point: MeasuringPoint,
        metric: MetricDescription,
        backend: Arc<dyn MeasurementBackend>,
    ) -> Self {
        Self {
            sink: Some(MarkerSink { metric, backend }),
            ..Self::probe_only(simulation, measuring_point)
        }
    }

    /// A probe whose observations are not forwarded anywhere.
    pub fn probe_only(
        simulation: Arc<dyn SimulationControl>,
        measuring_point: MeasuringPoint,
    ) -> Self {
        Self {
            simulation,
            measuring_point,
            sink: None,
            probe: OnceLock::new(),
            probes_created: AtomicUsize::new(0),
        }
    }

    /// The measuring point the probe is bound to.
    pub fn measuring_point(&self) -> &MeasuringPoint {
        &self.measuring_point
    }

    /// The probe, once the first reconfiguration has been observed.
    pub fn probe(&self) -> Option<&Arc<TriggeredProbe>> {
        self.probe.get()
    }

    /// How many probes were created so far. Never more than one.
    pub fn probes_created(&self) -> usize {
        self.probes_created.load(Ordering::Relaxed)
    }

    fn create_probe(&self) -> Arc<TriggeredProbe> {
        let probe = Arc::new(TriggeredProbe::new(CurrentSimulationTimeProbe::new(
            self.simulation.clone(),
        )));
        self.probes_created.fetch_add(1, Ordering::Relaxed);

        if let Some(sink) = &self.sink {
            match MarkerAggregator::open(
                sink.metric.clone(),
                self.measuring_point.clone(),
                sink.backend.clone(),
            ) {
                Ok(aggregator) => probe.add_listener(aggregator),
                Err(e) => log::error!(
                    "Reconfiguration markers at {} will not be recorded: {e}",
                    self.measuring_point
                ),
            }
        }

        log::info!("Created reconfiguration probe at {}.", self.measuring_point);
        probe
    }
}

impl ReconfigurationMeasurement for ReconfigurationProbe {
    fn on_reconfiguration(&self, event: &ReconfigurationEvent) {
        let probe = self.probe.get_or_init(|| self.create_probe());
        let observation = probe.trigger(ExecutionContext::EMPTY);
        log::debug!(
            "Reconfiguration observed at {} (event time {}).",
            observation.value,
            event.point_in_time
        );
    }
}

impl fmt::Debug for ReconfigurationProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconfigurationProbe")
            .field("measuring_point", &self.measuring_point)
            .field("recording", &self.sink.is_some())
            .field("probe", &self.probe.get())
            .finish()
    }
}

/// Ignores reconfiguration events.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreReconfigurations;

impl ReconfigurationMeasurement for IgnoreReconfigurations {
    fn on_reconfiguration(&self, _event: &ReconfigurationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryBackend;
    use simprobe_core::simulation::SharedSimulationControl;
    use std::sync::Mutex;

    #[test]
    fn test_probe_is_created_lazily_once() {
        let control = Arc::new(SharedSimulationControl::new());
        let strategy =
            ReconfigurationProbe::probe_only(control, MeasuringPoint::text("Reconfiguration"));
        assert!(strategy.probe().is_none());
        assert_eq!(strategy.probes_created(), 0);

        strategy.on_reconfiguration(&ReconfigurationEvent::new(1.0));
        let first = strategy.probe().unwrap().id();
        strategy.on_reconfiguration(&ReconfigurationEvent::new(2.0));

        assert_eq!(strategy.probes_created(), 1);
        assert_eq!(strategy.probe().unwrap().id(), first);
    }

    #[test]
    fn test_recording_stores_markers() {
        let control = Arc::new(SharedSimulationControl::new());
        let backend = Arc::new(InMemoryBackend::new());
        let strategy = ReconfigurationProbe::recording(
            control.clone(),
            MeasuringPoint::text("Reconfiguration"),
            MetricDescription::reconfiguration_time(),
            backend.clone(),
        );

        control.set_time(5.0);
        strategy.on_reconfiguration(&ReconfigurationEvent::new(5.0));
        control.set_time(9.0);
        strategy.on_reconfiguration(&ReconfigurationEvent::new(9.0));

        let times: Vec<f64> = backend
            .history("Reconfiguration")
            .unwrap()
            .iter()
            .map(|value| value.point_in_time)
            .collect();
        assert_eq!(times, vec![5.0, 9.0]);
    }

    #[test]
    fn test_probe_only_stores_nothing() {
        let control = Arc::new(SharedSimulationControl::new());
        let strategy =
            ReconfigurationProbe::probe_only(control, MeasuringPoint::text("Reconfiguration"));
        strategy.on_reconfiguration(&ReconfigurationEvent::new(1.0));
        assert_eq!(strategy.probe().unwrap().listener_count(), 0);
    }

    #[test]
    fn test_closure_strategy() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let strategy = move |event: &ReconfigurationEvent| {
            sink.lock().unwrap().push(event.point_in_time);
        };

        strategy.on_reconfiguration(&ReconfigurationEvent::new(3.0));
        assert_eq!(*seen.lock().unwrap(), vec![3.0]);
    }
}
