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

use anyhow::Result;
use simprobe_core::interpreter::{
    ConstructKind, EventNotificationHelper, InterpreterListener, ModelElementPassedEvent,
    ReconfigurationEvent,
};
use simprobe_core::measuring_point::MeasuringPoint;
use simprobe_core::model::{
    EntityKey, EntryLevelSystemCall, ExternalCallAction, InterfaceProvidingEntity, ModelElement,
    NamedEntity, ProvidedRole, SystemOperation, UsageScenario,
};
use simprobe_core::monitoring::{
    MeasurementSpecification, MetricDescription, Monitor, MonitorRepository,
};
use simprobe_core::probe::ExecutionContext;
use simprobe_core::simulation::SharedSimulationControl;
use simprobe_core::ProbeError;
use simprobe_telemetry::{
    ExtensionContext, InMemoryBackend, MeasurementBackend, ProbeFrameworkListener,
    ProbeFrameworkListenerDecorator, ReconfigurationProbe,
};
use std::sync::Arc;
use tempfile::tempdir;

// --- Test Setup: a small shop model ---
fn scenario() -> ModelElement {
    ModelElement::UsageScenario(UsageScenario {
        key: EntityKey::new("_browse"),
        name: "Browse".to_string(),
    })
}

fn external_call() -> ModelElement {
    ModelElement::ExternalCall(ExternalCallAction {
        key: EntityKey::new("_lookup"),
        name: "lookup".to_string(),
        called_service: NamedEntity::new("_sigLookup", "lookup"),
        role: NamedEntity::new("_reqCatalog", "Catalog"),
    })
}

fn entry_call(provider: InterfaceProvidingEntity) -> ModelElement {
    ModelElement::EntryLevelSystemCall(EntryLevelSystemCall {
        key: EntityKey::new("_buy"),
        name: "buy".to_string(),
        operation_signature: NamedEntity::new("_sigBuy", "buy"),
        provided_role: ProvidedRole {
            key: EntityKey::new("_provShop"),
            name: "Shop".to_string(),
            providing_entity: provider,
        },
    })
}

fn system_operation() -> ModelElement {
    ModelElement::SystemOperation(SystemOperation {
        signature: NamedEntity::new("_sigCheckout", "checkout"),
        provided_role: ProvidedRole {
            key: EntityKey::new("_provShop"),
            name: "Shop".to_string(),
            providing_entity: InterfaceProvidingEntity::System(NamedEntity::new("_shop", "Shop")),
        },
    })
}

fn response_time(id: &str, element: ModelElement) -> MeasurementSpecification {
    MeasurementSpecification::new(id, MetricDescription::response_time(), element)
}

struct Simulation {
    control: Arc<SharedSimulationControl>,
    backend: Arc<InMemoryBackend>,
    listener: Arc<ProbeFrameworkListener>,
    notifier: EventNotificationHelper,
}

impl Simulation {
    fn new(repository: MonitorRepository) -> Result<Self> {
        let control = Arc::new(SharedSimulationControl::new());
        let backend = Arc::new(InMemoryBackend::new());
        let listener = Arc::new(
            ProbeFrameworkListener::builder(Arc::new(repository), control.clone(), backend.clone())
                .build()?,
        );
        let mut notifier = EventNotificationHelper::new();
        notifier.add_listener(listener.clone());
        Ok(Self {
            control,
            backend,
            listener,
            notifier,
        })
    }

    fn begin(&self, kind: ConstructKind, element: &str, ctx: u64, at: f64) {
        self.control.set_time(at);
        let event = ModelElementPassedEvent::begin(element, ExecutionContext::new(ctx));
        self.notifier.fire_interpretation(&kind, &event);
    }

    fn end(&self, kind: ConstructKind, element: &str, ctx: u64, at: f64) {
        self.control.set_time(at);
        let event = ModelElementPassedEvent::end(element, ExecutionContext::new(ctx));
        self.notifier.fire_interpretation(&kind, &event);
    }

    fn durations(&self, channel: &str) -> Vec<f64> {
        self.backend
            .history(channel)
            .map(|history| history.iter().map(|value| value.value).collect())
            .unwrap_or_default()
    }
}
// ---

#[test]
fn test_register_pair_is_idempotent_across_specifications() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .with_specification(response_time("rt-1", scenario()))
        .with_specification(response_time("rt-2", scenario()))]);
    let sim = Simulation::new(repository)?;

    let registry = sim.listener.registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(sim.listener.calculators().len(), 2);

    // Both calculators listen to the one shared pair.
    let pair = registry.pair_for(&EntityKey::new("_browse")).unwrap();
    assert_eq!(pair.start().listener_count(), 2);
    assert_eq!(pair.stop().listener_count(), 2);
    Ok(())
}

#[test]
fn test_one_measurement_per_completed_pair() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .with_specification(response_time("rt-call", external_call()))]);
    let sim = Simulation::new(repository)?;
    sim.control.set_running(true);

    sim.begin(ConstructKind::ExternalCall, "_lookup", 1, 10.0);
    sim.end(ConstructKind::ExternalCall, "_lookup", 1, 10.0);
    sim.begin(ConstructKind::ExternalCall, "_lookup", 1, 11.0);
    sim.end(ConstructKind::ExternalCall, "_lookup", 1, 14.5);

    let durations = sim.durations("rt-call");
    assert_eq!(durations, vec![0.0, 3.5]);
    assert!(durations.iter().all(|duration| *duration >= 0.0));
    Ok(())
}

#[test]
fn test_nothing_is_measured_while_not_running() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .with_specification(response_time("rt-us", scenario()))]);
    let sim = Simulation::new(repository)?;

    sim.begin(ConstructKind::UsageScenario, "_browse", 1, 0.0);
    sim.end(ConstructKind::UsageScenario, "_browse", 1, 5.0);
    sim.notifier.fire_reconfiguration(&ReconfigurationEvent::new(5.0));

    assert!(sim.durations("rt-us").is_empty());
    assert!(!sim.backend.contains_channel("Reconfiguration"));
    Ok(())
}

#[test]
fn test_inactive_monitor_is_never_wired() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .activated(false)
        .with_specification(response_time("rt-us", scenario()))]);
    let sim = Simulation::new(repository)?;
    sim.control.set_running(true);

    sim.begin(ConstructKind::UsageScenario, "_browse", 1, 0.0);
    sim.end(ConstructKind::UsageScenario, "_browse", 1, 5.0);

    assert!(sim.listener.registry().is_empty());
    assert!(!sim.backend.contains_channel("rt-us"));
    assert!(sim
        .listener
        .filter()
        .by_metric(&MetricDescription::response_time())
        .is_empty());
    Ok(())
}

#[test]
fn test_interleaved_invocations_are_paired_by_context() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .with_specification(response_time("rt-us", scenario()))]);
    let sim = Simulation::new(repository)?;
    sim.control.set_running(true);

    sim.begin(ConstructKind::UsageScenario, "_browse", 1, 0.0);
    sim.begin(ConstructKind::UsageScenario, "_browse", 2, 2.0);
    sim.end(ConstructKind::UsageScenario, "_browse", 1, 3.0);
    sim.end(ConstructKind::UsageScenario, "_browse", 2, 10.0);

    // ctx1: 0 -> 3, ctx2: 2 -> 10. Cross-matching would give 1 and 10.
    assert_eq!(sim.durations("rt-us"), vec![3.0, 8.0]);
    Ok(())
}

#[test]
fn test_entry_level_call_must_reference_a_system() {
    let repository = MonitorRepository::new(vec![Monitor::new("m").with_specification(
        response_time(
            "rt-buy",
            entry_call(InterfaceProvidingEntity::Component(NamedEntity::new("_cart", "Cart"))),
        ),
    )]);

    let result = Simulation::new(repository);
    let error = result.err().expect("setup must fail");
    let Some(ProbeError::WiringFailed(failures)) = error.downcast_ref::<ProbeError>() else {
        panic!("unexpected error: {error}");
    };
    assert_eq!(failures.len(), 1);
    assert!(matches!(*failures[0].error, ProbeError::InvalidModelReference(_)));
}

#[test]
fn test_entry_level_call_on_system_is_measured() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m").with_specification(
        response_time(
            "rt-buy",
            entry_call(InterfaceProvidingEntity::System(NamedEntity::new("_shop", "Shop"))),
        ),
    )]);
    let sim = Simulation::new(repository)?;
    sim.control.set_running(true);

    sim.begin(ConstructKind::EntryLevelSystemCall, "_buy", 9, 1.0);
    sim.end(ConstructKind::EntryLevelSystemCall, "_buy", 9, 1.25);

    assert_eq!(sim.durations("rt-buy"), vec![0.25]);
    assert_eq!(
        sim.listener.calculators()[0].calculator.measuring_point(),
        &MeasuringPoint::SystemOperation {
            system: EntityKey::new("_shop"),
            role: EntityKey::new("_provShop"),
            operation_signature: EntityKey::new("_sigBuy"),
        }
    );
    Ok(())
}

#[test]
fn test_system_operation_call_is_measured_by_signature() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .with_specification(response_time("rt-checkout", system_operation()))]);
    let sim = Simulation::new(repository)?;
    sim.control.set_running(true);

    assert!(sim
        .listener
        .registry()
        .is_instrumented(&EntityKey::new("_sigCheckout")));

    sim.begin(ConstructKind::SystemOperationCall, "_sigCheckout", 3, 2.0);
    sim.begin(ConstructKind::SystemOperationCall, "_sigCheckout", 4, 2.5);
    sim.end(ConstructKind::SystemOperationCall, "_sigCheckout", 3, 4.0);
    sim.end(ConstructKind::SystemOperationCall, "_sigCheckout", 4, 7.5);

    assert_eq!(sim.durations("rt-checkout"), vec![2.0, 5.0]);
    assert_eq!(
        sim.listener.calculators()[0]
            .calculator
            .measuring_point()
            .to_string(),
        "SystemOperation[_shop/_provShop/_sigCheckout]"
    );
    Ok(())
}

#[test]
fn test_reconfiguration_probe_is_created_once() -> Result<()> {
    let control = Arc::new(SharedSimulationControl::new());
    let backend = Arc::new(InMemoryBackend::new());
    let strategy = Arc::new(ReconfigurationProbe::recording(
        control.clone(),
        MeasuringPoint::text("Reconfiguration"),
        MetricDescription::reconfiguration_time(),
        backend.clone(),
    ));
    let listener = ProbeFrameworkListener::builder(
        Arc::new(MonitorRepository::default()),
        control.clone(),
        backend.clone(),
    )
    .with_reconfiguration_strategy(strategy.clone())
    .build()?;

    control.set_running(true);
    control.set_time(4.0);
    listener.reconfiguration_interpretation(&ReconfigurationEvent::new(4.0));
    let probe = strategy.probe().unwrap().id();
    control.set_time(6.0);
    listener.reconfiguration_interpretation(&ReconfigurationEvent::new(6.0));

    assert_eq!(strategy.probes_created(), 1);
    assert_eq!(strategy.probe().unwrap().id(), probe);
    assert_eq!(backend.history("Reconfiguration")?.len(), 2);
    Ok(())
}

#[test]
fn test_stale_start_is_never_paired_after_stop() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .with_specification(response_time("rt-us", scenario()))]);
    let sim = Simulation::new(repository)?;

    sim.control.set_running(true);
    sim.begin(ConstructKind::UsageScenario, "_browse", 1, 0.0);

    // The simulation stops mid-flight; the end arrives during teardown.
    sim.control.set_running(false);
    sim.end(ConstructKind::UsageScenario, "_browse", 1, 5.0);

    // A new run reuses context 1 for an unrelated invocation.
    sim.control.set_running(true);
    sim.end(ConstructKind::UsageScenario, "_browse", 1, 20.0);
    sim.begin(ConstructKind::UsageScenario, "_browse", 1, 30.0);
    sim.end(ConstructKind::UsageScenario, "_browse", 1, 31.0);

    assert_eq!(sim.durations("rt-us"), vec![1.0]);
    Ok(())
}

#[test]
fn test_start_from_previous_run_is_dropped_after_silent_restart() -> Result<()> {
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .with_specification(response_time("rt-us", scenario()))]);
    let sim = Simulation::new(repository)?;

    sim.control.set_running(true);
    sim.begin(ConstructKind::UsageScenario, "_browse", 1, 0.0);

    // No event is dispatched between the stop and the restart.
    sim.control.set_running(false);
    sim.control.set_running(true);
    sim.end(ConstructKind::UsageScenario, "_browse", 1, 100.0);

    assert!(sim.durations("rt-us").is_empty());
    assert_eq!(sim.listener.calculators()[0].calculator.pending_count(), 0);
    Ok(())
}

#[test]
fn test_decorators_extend_without_blocking_each_other() -> Result<()> {
    struct Broken;

    impl ProbeFrameworkListenerDecorator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn register_measurements(&self, _context: &mut ExtensionContext<'_>) -> Result<()> {
            anyhow::bail!("missing metric description")
        }
    }

    struct ExternalCalls;

    impl ProbeFrameworkListenerDecorator for ExternalCalls {
        fn name(&self) -> &str {
            "external-calls"
        }

        fn register_measurements(&self, context: &mut ExtensionContext<'_>) -> Result<()> {
            let spec = response_time("rt-ext", external_call());
            context.wire_response_time(&spec)?;
            // Registering an existing element again is harmless.
            context.register_pair(&EntityKey::new("_browse"));
            Ok(())
        }
    }

    let control = Arc::new(SharedSimulationControl::new());
    let backend = Arc::new(InMemoryBackend::new());
    let repository = MonitorRepository::new(vec![Monitor::new("m")
        .with_specification(response_time("rt-us", scenario()))]);
    let listener =
        ProbeFrameworkListener::builder(Arc::new(repository), control.clone(), backend.clone())
            .with_decorator(Arc::new(Broken))
            .with_decorator(Arc::new(ExternalCalls))
            .build()?;

    assert_eq!(listener.decorator_failures().len(), 1);
    assert_eq!(listener.decorator_failures()[0].decorator, "broken");
    assert_eq!(listener.registry().len(), 2);

    control.set_running(true);
    let ctx = ExecutionContext::new(3);
    control.set_time(1.0);
    listener.begin_external_call_interpretation(&ModelElementPassedEvent::begin("_lookup", ctx));
    control.set_time(2.0);
    listener.end_external_call_interpretation(&ModelElementPassedEvent::end("_lookup", ctx));

    assert_eq!(backend.history("rt-ext")?.len(), 1);
    Ok(())
}

#[test]
fn test_monitor_repository_from_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("monitors.json");
    std::fs::write(
        &path,
        r#"{
            "monitors": [
                {
                    "id": "m1",
                    "measurement_specifications": [
                        {
                            "id": "rt-us",
                            "metric": { "id": "response_time" },
                            "monitored_element": { "kind": "usage_scenario", "key": "_browse" }
                        }
                    ]
                },
                {
                    "id": "m2",
                    "activated": false,
                    "measurement_specifications": [
                        {
                            "id": "rt-off",
                            "metric": { "id": "response_time" },
                            "processing_type": {
                                "kind": "fixed_size_aggregation",
                                "window_length": 4,
                                "window_increment": 2
                            },
                            "monitored_element": { "kind": "usage_scenario", "key": "_other" }
                        }
                    ]
                }
            ]
        }"#,
    )?;

    let sim = Simulation::new(MonitorRepository::from_file(&path)?)?;
    assert_eq!(sim.listener.calculators().len(), 1);
    assert!(sim.listener.registry().is_instrumented(&EntityKey::new("_browse")));
    assert!(!sim.listener.registry().is_instrumented(&EntityKey::new("_other")));
    Ok(())
}
