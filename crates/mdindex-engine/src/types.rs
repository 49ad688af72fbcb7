// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core scalar types and the error taxonomy for index builds.
*/

/// Coordinate value along one axis of the index space
pub type Coord = f32;

/// Event signal and squared error
pub type Signal = f32;

/// Result type for index build operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Failure reported by an external event-source collaborator
/// (unit conversion or coordinate computation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that abort an index build.
///
/// Events falling outside the index bounds are never reported here; they are
/// filtered silently.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Unsupported dimensionality, event variant, event representation or
    /// box settings. Detected before any event is processed.
    #[error("Unsupported configuration: {0}")]
    Configuration(String),

    /// Malformed input reported by the event source collaborators
    #[error("Invalid event data in channel {channel}: {source}")]
    Data {
        channel: usize,
        #[source]
        source: SourceError,
    },

    #[error("Failed to create worker pool: {0}")]
    ThreadPool(String),
}

impl IndexError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        IndexError::Configuration(message.into())
    }

    pub(crate) fn data(channel: usize, source: SourceError) -> Self {
        IndexError::Data { channel, source }
    }

    /// True for errors detected up front, before any event was touched
    pub fn is_configuration(&self) -> bool {
        matches!(self, IndexError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_message_names_channel() {
        let err = IndexError::data(7, SourceError::new("negative time-of-flight"));
        assert_eq!(
            err.to_string(),
            "Invalid event data in channel 7: negative time-of-flight"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_error() {
        let err = IndexError::configuration("9 dimensions");
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Unsupported configuration: 9 dimensions");
    }
}
