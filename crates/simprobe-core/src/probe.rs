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

//! The probe contract: a leaf capability capturing one instantaneous
//! observation, bound to the execution context of the simulated process that
//! triggered it.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};

/// A point in simulated time.
pub type SimTime = f64;

/// The correlation token of the simulated process currently executing.
///
/// Start and stop observations of the same logical invocation carry the same
/// context, which is how concurrent invocations of one model element by
/// different simulated processes are kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext(u64);

impl ExecutionContext {
    /// The context of observations not tied to any simulated process.
    pub const EMPTY: ExecutionContext = ExecutionContext(0);

    /// Creates a context from a request id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the request id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// A single observation taken by a probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// The observed value, typically the simulation time at triggering.
    pub value: SimTime,
    /// The context the observation belongs to.
    pub context: ExecutionContext,
}

impl Observation {
    /// Creates an observation.
    pub fn new(value: SimTime, context: ExecutionContext) -> Self {
        Self { value, context }
    }
}

/// A triggerable source of observations.
///
/// A probe has no notion of simulation state and neither stores nor forwards
/// what it observes; callers guard against triggering after the simulation
/// has stopped.
pub trait Probe: Send + Sync + Debug {
    /// Takes one observation for `context`.
    fn take_measurement(&self, context: ExecutionContext) -> Observation;
}
