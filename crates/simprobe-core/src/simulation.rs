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

//! The simulation control collaborator.

use crate::probe::SimTime;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// The view of the simulation engine the instrumentation layer needs.
///
/// The running flag is the single piece of shared mutable state consulted on
/// every dispatch, and must be read afresh each time.
pub trait SimulationControl: Send + Sync + Debug {
    /// Returns `true` while the simulation is running.
    fn is_running(&self) -> bool;

    /// Returns the current simulation time.
    fn current_time(&self) -> SimTime;

    /// Returns a counter that changes on every change of the running flag.
    ///
    /// Two reads returning the same value bracket a single run, even if no
    /// event was dispatched in between.
    fn run_generation(&self) -> u64;
}

/// A [`SimulationControl`] whose state is set from the outside.
///
/// Useful when embedding the instrumentation layer into an engine that keeps
/// its own clock, and in tests.
#[derive(Debug, Default)]
pub struct SharedSimulationControl {
    running: AtomicBool,
    generation: AtomicU64,
    time_bits: AtomicU64,
}

impl SharedSimulationControl {
    /// Creates a stopped simulation at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the running flag, starting a new run generation if it changed.
    pub fn set_running(&self, running: bool) {
        if self.running.swap(running, Ordering::SeqCst) != running {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Sets the current simulation time.
    pub fn set_time(&self, time: SimTime) {
        self.time_bits.store(time.to_bits(), Ordering::SeqCst);
    }

    /// Moves the simulation clock forward by `delta`.
    pub fn advance(&self, delta: SimTime) {
        self.set_time(self.current_time() + delta);
    }
}

impl SimulationControl for SharedSimulationControl {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn current_time(&self) -> SimTime {
        f64::from_bits(self.time_bits.load(Ordering::SeqCst))
    }

    fn run_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_control_state() {
        let control = SharedSimulationControl::new();
        assert!(!control.is_running());
        assert_eq!(control.current_time(), 0.0);

        control.set_running(true);
        control.set_time(2.5);
        control.advance(0.5);
        assert!(control.is_running());
        assert_eq!(control.current_time(), 3.0);
    }

    #[test]
    fn test_run_generation_changes_on_transitions_only() {
        let control = SharedSimulationControl::new();
        assert_eq!(control.run_generation(), 0);

        control.set_running(false);
        assert_eq!(control.run_generation(), 0);

        control.set_running(true);
        control.set_running(true);
        assert_eq!(control.run_generation(), 1);

        control.set_running(false);
        control.set_running(true);
        assert_eq!(control.run_generation(), 3);
    }
}
