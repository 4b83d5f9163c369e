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

//! Window processing applied to recorded values.

use super::backend::StoredValue;
use simprobe_core::error::{ProbeError, ProbeResult};
use simprobe_core::measurement::RuntimeMeasurement;
use simprobe_core::monitoring::ProcessingType;
use simprobe_core::probe::SimTime;
use std::collections::VecDeque;

/// Per-channel processing state.
#[derive(Debug)]
pub(crate) enum ChannelProcessor {
    FeedThrough,
    FixedSize {
        window_length: usize,
        window_increment: usize,
        window: VecDeque<f64>,
        since_emit: usize,
    },
    TimeDriven {
        window_length: SimTime,
        window_increment: SimTime,
        window: VecDeque<(SimTime, f64)>,
        boundary: Option<SimTime>,
    },
}

impl ChannelProcessor {
    pub(crate) fn new(channel: &str, processing_type: &ProcessingType) -> ProbeResult<Self> {
        match *processing_type {
            ProcessingType::FeedThrough => Ok(ChannelProcessor::FeedThrough),
            ProcessingType::FixedSizeAggregation {
                window_length,
                window_increment,
            } => {
                if window_length == 0 || window_increment == 0 {
                    return Err(ProbeError::InvalidArgument(format!(
                        "channel '{channel}': fixed size windows need a positive length and increment"
                    )));
                }
                Ok(ChannelProcessor::FixedSize {
                    window_length,
                    window_increment,
                    window: VecDeque::with_capacity(window_length),
                    since_emit: 0,
                })
            }
            ProcessingType::TimeDrivenAggregation {
                window_length,
                window_increment,
            } => {
                if !(window_length > 0.0 && window_increment > 0.0) {
                    return Err(ProbeError::InvalidArgument(format!(
                        "channel '{channel}': time driven windows need a positive length and increment"
                    )));
                }
                Ok(ChannelProcessor::TimeDriven {
                    window_length,
                    window_increment,
                    window: VecDeque::new(),
                    boundary: None,
                })
            }
            ProcessingType::VariableSizeAggregation { .. } => {
                Err(ProbeError::UnsupportedProcessingType {
                    specification: channel.to_string(),
                    kind: processing_type.kind(),
                })
            }
        }
    }

    /// Feeds one measurement and returns the values to store, if any.
    pub(crate) fn process(&mut self, measurement: &RuntimeMeasurement) -> Vec<StoredValue> {
        let kind = measurement.kind;
        match self {
            ChannelProcessor::FeedThrough => vec![StoredValue {
                value: measurement.value,
                point_in_time: measurement.point_in_time,
                kind,
            }],
            ChannelProcessor::FixedSize {
                window_length,
                window_increment,
                window,
                since_emit,
            } => {
                window.push_back(measurement.value);
                if window.len() > *window_length {
                    window.pop_front();
                }
                *since_emit += 1;

                if window.len() == *window_length && *since_emit >= *window_increment {
                    *since_emit = 0;
                    vec![StoredValue {
                        value: mean(window.iter().copied()),
                        point_in_time: measurement.point_in_time,
                        kind,
                    }]
                } else {
                    Vec::new()
                }
            }
            ChannelProcessor::TimeDriven {
                window_length,
                window_increment,
                window,
                boundary,
            } => {
                let time = measurement.point_in_time;
                let mut end = boundary.unwrap_or(time + *window_length);
                let mut emitted = Vec::new();

                // Close every window that ends at or before the new value.
                while time >= end {
                    let start = end - *window_length;
                    if window.back().map_or(true, |(at, _)| *at < start) {
                        // This window and all later ones up to `time` are empty.
                        let skipped = ((time - end) / *window_increment).floor() + 1.0;
                        end += skipped * *window_increment;
                        if end <= time {
                            end += *window_increment;
                        }
                        window.clear();
                        break;
                    }

                    let values = window
                        .iter()
                        .filter(|(at, _)| *at >= start && *at < end)
                        .map(|(_, value)| *value);
                    if let Some(value) = mean_of_nonempty(values) {
                        emitted.push(StoredValue {
                            value,
                            point_in_time: end,
                            kind,
                        });
                    }

                    let next = end + *window_increment;
                    if next <= end {
                        break;
                    }
                    end = next;
                    let earliest = end - *window_length;
                    while window.front().is_some_and(|(at, _)| *at < earliest) {
                        window.pop_front();
                    }
                }

                *boundary = Some(end);
                window.push_back((time, measurement.value));
                emitted
            }
        }
    }

    pub(crate) fn is_aggregating(&self) -> bool {
        !matches!(self, ChannelProcessor::FeedThrough)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    mean_of_nonempty(values).unwrap_or(0.0)
}

fn mean_of_nonempty(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simprobe_core::measuring_point::MeasuringPoint;
    use simprobe_core::model::EntityKey;
    use simprobe_core::monitoring::ProcessingKind;

    fn measurement(value: f64, at: SimTime) -> RuntimeMeasurement {
        RuntimeMeasurement::duration(
            "rt",
            EntityKey::new("_us"),
            MeasuringPoint::text("test"),
            value,
            at,
        )
    }

    fn values(stored: &[StoredValue]) -> Vec<f64> {
        stored.iter().map(|v| v.value).collect()
    }

    #[test]
    fn test_feed_through_keeps_every_value() {
        let mut processor = ChannelProcessor::new("rt", &ProcessingType::FeedThrough).unwrap();
        assert_eq!(values(&processor.process(&measurement(1.5, 1.0))), vec![1.5]);
        assert_eq!(values(&processor.process(&measurement(2.5, 2.0))), vec![2.5]);
        assert!(!processor.is_aggregating());
    }

    #[test]
    fn test_fixed_size_sliding_mean() {
        let mut processor = ChannelProcessor::new(
            "rt",
            &ProcessingType::FixedSizeAggregation {
                window_length: 3,
                window_increment: 2,
            },
        )
        .unwrap();

        let mut out = Vec::new();
        for (i, value) in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0].into_iter().enumerate() {
            out.extend(processor.process(&measurement(value, i as f64)));
        }
        // Windows [1,2,3], [3,4,5], [5,6,7].
        assert_eq!(values(&out), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_time_driven_windows() {
        let mut processor = ChannelProcessor::new(
            "rt",
            &ProcessingType::TimeDrivenAggregation {
                window_length: 10.0,
                window_increment: 10.0,
            },
        )
        .unwrap();

        let mut out = Vec::new();
        out.extend(processor.process(&measurement(2.0, 0.0)));
        out.extend(processor.process(&measurement(4.0, 5.0)));
        assert!(out.is_empty());

        // Crossing t=10 closes [0, 10).
        out.extend(processor.process(&measurement(8.0, 12.0)));
        assert_eq!(values(&out), vec![3.0]);
        assert_eq!(out[0].point_in_time, 10.0);

        // Crossing t=30 closes [10, 20); [20, 30) is empty and emits nothing.
        out.extend(processor.process(&measurement(1.0, 31.0)));
        assert_eq!(values(&out), vec![3.0, 8.0]);
    }

    #[test]
    fn test_time_driven_skips_empty_gap() {
        let step = 1.0 / 1024.0;
        let mut processor = ChannelProcessor::new(
            "rt",
            &ProcessingType::TimeDrivenAggregation {
                window_length: step,
                window_increment: step,
            },
        )
        .unwrap();

        let mut out = Vec::new();
        out.extend(processor.process(&measurement(2.0, 0.0)));
        // About 1e8 empty windows lie between the two values.
        out.extend(processor.process(&measurement(4.0, 1e5)));
        assert_eq!(values(&out), vec![2.0]);
        assert_eq!(out[0].point_in_time, step);

        out.extend(processor.process(&measurement(6.0, 1e5 + 0.5)));
        assert_eq!(values(&out), vec![2.0, 4.0]);
        assert_eq!(out[1].point_in_time, 1e5 + step);

        let ChannelProcessor::TimeDriven { boundary, window, .. } = &processor else {
            panic!("expected a time driven processor");
        };
        assert!(boundary.is_some_and(|end| end > 1e5 + 0.5));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_invalid_windows_are_rejected() {
        let result = ChannelProcessor::new(
            "rt",
            &ProcessingType::FixedSizeAggregation {
                window_length: 0,
                window_increment: 1,
            },
        );
        assert!(matches!(result, Err(ProbeError::InvalidArgument(_))));

        let result = ChannelProcessor::new(
            "rt",
            &ProcessingType::TimeDrivenAggregation {
                window_length: 5.0,
                window_increment: 0.0,
            },
        );
        assert!(matches!(result, Err(ProbeError::InvalidArgument(_))));
    }

    #[test]
    fn test_variable_size_is_unsupported() {
        let result = ChannelProcessor::new(
            "rt",
            &ProcessingType::VariableSizeAggregation {
                window_increment: 1.0,
            },
        );
        assert!(matches!(
            result,
            Err(ProbeError::UnsupportedProcessingType {
                kind: ProcessingKind::VariableSizeAggregation,
                ..
            })
        ));
    }
}
