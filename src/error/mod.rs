//! Error sets for buffering, updating, event intake, configuration, recording,
//! random number acquisition, and slice scheduling.

use thiserror::Error;


/// Error set for the per-channel input accumulators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BufferError {
    /// Step offset does not fit inside the buffered scheduling horizon
    #[error("Step offset {offset} outside of buffered horizon of {size} steps")]
    OffsetOutsideHorizon { offset: i64, size: usize },
}

/// Error set for violations of the update contract
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpdateError {
    /// `from` must be strictly smaller than `to`
    #[error("Update range is empty, from ({from}) must be less than to ({to})")]
    EmptyStepRange { from: i64, to: i64 },
    /// `from` must not be negative
    #[error("Update range cannot start at negative step {0}")]
    NegativeStart(i64),
    /// `to` must not run past the minimum delay window
    #[error("Update range ending at {to} exceeds minimum delay window of {min_delay} steps")]
    BeyondMinDelay { to: i64, min_delay: i64 },
    /// Input buffers have not been sized for a scheduling horizon
    #[error("Input buffers must be initialized before updating")]
    BuffersNotInitialized,
    /// No random number generator has been acquired for the neuron
    #[error("Neuron must be calibrated before updating")]
    NotCalibrated,
}

/// Error set for invalid incoming spike events
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    /// Event delay must be strictly positive
    #[error("Spike event delay must be positive, found {0}")]
    NonPositiveDelay(i64),
    /// Receptor type does not correspond to an input channel
    #[error("Unknown receptor type {0}")]
    UnknownReceptorType(i64),
    /// Event would be delivered before the current slice
    #[error("Spike event delivery at relative step {0} lies before the current slice")]
    DeliveryInPast(i64),
}

/// Error set for bulk configuration
#[derive(Error, Debug)]
pub enum StatusError {
    /// Numeric values written through the status interface must be finite
    #[error("Value for '{key}' must be finite, found {value}")]
    NonFiniteValue { key: &'static str, value: f64 },
    /// Status could not be parsed
    #[error("Cannot parse status: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error set for the recording sink
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordingError {
    /// Requested variable is not in the recordables table
    #[error("'{0}' is not a recordable variable")]
    UnknownRecordable(String),
    /// Sampling interval must be at least one step
    #[error("Recording interval must be at least one step")]
    ZeroInterval,
}

/// Error set for acquiring random number generators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RngError {
    /// No generator exists for the requested execution context
    #[error("No random number generator for thread {thread}, only {contexts} available")]
    UnknownThread { thread: usize, contexts: usize },
    /// At least one execution context is required
    #[error("At least one execution context is required")]
    NoContexts,
}

/// Error set for the simulation clock
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Resolution must be a positive, finite number of milliseconds
    #[error("Resolution must be positive and finite, found {0}")]
    InvalidResolution(f64),
    /// Minimum delay must be at least one step
    #[error("Minimum delay must be at least one step, found {0}")]
    NonPositiveMinDelay(i64),
    /// Maximum delay cannot be smaller than the minimum delay
    #[error("Maximum delay ({max_delay}) cannot be smaller than minimum delay ({min_delay})")]
    MaxDelayBelowMinDelay { min_delay: i64, max_delay: i64 },
    /// Time in milliseconds has no representation in whole steps
    #[error("Time of {0} ms cannot be represented in steps")]
    TimeOutOfRange(f64),
    /// Simulation was started before the node was prepared
    #[error("Node must be prepared before simulating")]
    NotPrepared,
}

/// A set of errors that may occur when using the library
#[derive(Error, Debug)]
pub enum ContextualNeuronError {
    /// Errors related to input buffering
    #[error(transparent)]
    BufferRelatedError(#[from] BufferError),
    /// Errors related to the update contract
    #[error(transparent)]
    UpdateRelatedError(#[from] UpdateError),
    /// Errors related to incoming events
    #[error(transparent)]
    EventRelatedError(#[from] EventError),
    /// Errors related to configuration
    #[error(transparent)]
    StatusRelatedError(#[from] StatusError),
    /// Errors related to recording
    #[error(transparent)]
    RecordingRelatedError(#[from] RecordingError),
    /// Errors related to random number generation
    #[error(transparent)]
    RngRelatedError(#[from] RngError),
    /// Errors related to simulation scheduling
    #[error(transparent)]
    SimulationRelatedError(#[from] SimulationError),
}
