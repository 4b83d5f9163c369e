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

//! The error taxonomy of the instrumentation layer.

use crate::model::EntityKey;
use crate::monitoring::ProcessingKind;
use std::fmt::{self, Display};

/// A convenience alias for results produced by the instrumentation layer.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors raised while instrumenting a model or recording measurements.
///
/// Setup-time errors are reported and fail the enclosing setup operation.
/// Dispatch is tolerant: an unmonitored element or a stopped simulation is
/// a no-op, never an error.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Missing or malformed input to a resolution or filtering call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A model element kind without a measuring-point mapping.
    #[error("Unsupported model element: {0}")]
    UnsupportedModelElement(String),

    /// A semantically malformed model.
    #[error("Invalid model reference: {0}")]
    InvalidModelReference(String),

    /// No probe pair was registered for the element.
    #[error("Entity '{0}' is not instrumented")]
    NotInstrumented(EntityKey),

    /// The measurement store cannot apply the requested processing type.
    #[error("Processing type {kind} of specification '{specification}' is not supported by the measurement store")]
    UnsupportedProcessingType {
        /// The rejected specification.
        specification: String,
        /// The processing kind that was requested.
        kind: ProcessingKind,
    },

    /// A measurement was recorded into a channel that was never opened.
    #[error("Unknown measurement channel '{0}'")]
    UnknownChannel(String),

    /// The measurement store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// One or more specifications could not be wired during setup.
    #[error("Wiring failed for {} measurement specification(s): {}", .0.len(), WiringFailures(.0))]
    WiringFailed(Vec<WiringFailure>),

    /// An extension decorator failed to register its measurements.
    #[error("Decorator '{name}' failed: {reason}")]
    Decorator {
        /// The decorator name.
        name: String,
        /// The reported failure.
        reason: String,
    },

    /// Reading or writing a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The failure to wire a single measurement specification.
#[derive(Debug)]
pub struct WiringFailure {
    /// The id of the specification that was not wired.
    pub specification: String,
    /// Why it was not wired.
    pub error: Box<ProbeError>,
}

impl WiringFailure {
    /// Creates a wiring failure for a specification.
    pub fn new(specification: impl Into<String>, error: ProbeError) -> Self {
        Self {
            specification: specification.into(),
            error: Box::new(error),
        }
    }
}

impl Display for WiringFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.specification, self.error)
    }
}

struct WiringFailures<'a>(&'a [WiringFailure]);

impl Display for WiringFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, failure) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
