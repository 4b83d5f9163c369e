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

//! The probe framework: instruments model elements named by the monitoring
//! configuration and turns interpretation events into response-time
//! measurements.
//!
//! Setup happens once, in [`ProbeFrameworkListenerBuilder::build`]. After
//! that the [`ProbeFrameworkListener`] is registered with the interpreter and
//! only reads its probe registry.

pub mod aggregators;
pub mod calculators;
pub mod config;
pub mod extension;
pub mod filter;
pub mod listener;
pub mod probes;
pub mod resolver;
pub mod storage;
pub mod wiring;

pub use config::{ProbeFrameworkConfig, ReconfigurationMode};
pub use extension::{DecoratorFailure, ExtensionContext, ProbeFrameworkListenerDecorator};
pub use filter::MeasurementSpecificationFilter;
pub use listener::{
    IgnoreReconfigurations, ProbeFrameworkListener, ProbeFrameworkListenerBuilder,
    ReconfigurationMeasurement, ReconfigurationProbe,
};
pub use probes::{ProbeId, ProbeListener, ProbePair, ProbeRegistry, TriggeredProbe};
pub use resolver::MeasuringPointResolver;
pub use storage::{BackendStats, InMemoryBackend, MeasurementBackend};
pub use wiring::CalculatorWiring;

/// Initializes `env_logger` from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logging() {
    use env_logger::{Builder, Env};

    let _ = Builder::from_env(Env::default().default_filter_or("info")).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        log::info!("Logging initialized twice.");
    }
}
