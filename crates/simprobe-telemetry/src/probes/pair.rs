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

//! The ordered start/stop probe pair of an instrumented element.

use super::triggered::TriggeredProbe;
use std::sync::Arc;

const START_PROBE_INDEX: usize = 0;
const STOP_PROBE_INDEX: usize = 1;

/// An immutable `[start, stop]` pair of probes.
///
/// Both probes are created together and never individually replaced. Cloning
/// a pair shares the probes.
#[derive(Debug, Clone)]
pub struct ProbePair {
    probes: Arc<[Arc<TriggeredProbe>; 2]>,
}

impl ProbePair {
    /// Creates a pair from its two probes.
    pub fn new(start: TriggeredProbe, stop: TriggeredProbe) -> Self {
        Self {
            probes: Arc::new([Arc::new(start), Arc::new(stop)]),
        }
    }

    /// The probe triggered when an invocation begins.
    pub fn start(&self) -> &Arc<TriggeredProbe> {
        &self.probes[START_PROBE_INDEX]
    }

    /// The probe triggered when an invocation ends.
    pub fn stop(&self) -> &Arc<TriggeredProbe> {
        &self.probes[STOP_PROBE_INDEX]
    }

    /// Returns `true` if both pairs share the very same probes.
    pub fn ptr_eq(&self, other: &ProbePair) -> bool {
        Arc::ptr_eq(&self.probes, &other.probes)
    }
}
