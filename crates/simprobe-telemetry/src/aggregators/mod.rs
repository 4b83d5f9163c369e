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

//! Aggregators route calculated values into the measurement store.

pub mod marker;
pub mod response_time;

pub use self::marker::MarkerAggregator;
pub use self::response_time::ResponseTimeAggregator;

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts what an aggregator handed to the store.
#[derive(Debug, Default)]
pub struct AggregatorStats {
    recorded: AtomicU64,
    rejected: AtomicU64,
}

impl AggregatorStats {
    /// Measurements accepted by the store.
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }

    /// Measurements the store refused.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub(crate) fn count<T, E>(&self, result: &Result<T, E>) {
        let counter = if result.is_ok() {
            &self.recorded
        } else {
            &self.rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
