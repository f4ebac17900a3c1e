//! Sampling of recordable state variables.
//!
//! A node notifies its [`RecordingSink`] once per simulated step, the sink decides
//! whether to keep a sample. [`DataLogger`] keeps every `interval`-th step of the
//! variables listed in `record_from` until the samples are requested.

use serde::{Deserialize, Serialize};
use crate::error::RecordingError;
use crate::neuron::{Recordable, Recordables};


/// Receives a notification every simulated step with the state to sample from
pub trait RecordingSink<S> {
    /// Prepares the sink for a run
    fn init(&mut self) -> Result<(), RecordingError>;
    /// Discards every stored sample
    fn reset(&mut self);
    /// Offers the state after `step` has been simulated
    fn record_data(&mut self, step: i64, source: &S);
}

/// Values of the recorded variables at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSample {
    /// Step at the end of which the sample was taken
    pub step: i64,
    /// Values in the order of `record_from`
    pub values: Vec<f64>,
}

/// Buffers samples of selected recordables at a fixed step interval
#[derive(Debug, Clone)]
pub struct DataLogger<S: Recordables> {
    record_from: Vec<String>,
    interval: i64,
    accessors: Vec<Recordable<S>>,
    data: Vec<RecordedSample>,
}

impl<S: Recordables> Default for DataLogger<S> {
    fn default() -> Self {
        DataLogger {
            record_from: S::recordable_names().into_iter().map(String::from).collect(),
            interval: 1,
            accessors: Vec::new(),
            data: Vec::new(),
        }
    }
}

impl<S: Recordables> DataLogger<S> {
    /// Records the named variables every `interval` steps
    pub fn new(record_from: Vec<String>, interval: i64) -> Self {
        DataLogger {
            record_from,
            interval,
            accessors: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn get_record_from(&self) -> &[String] {
        &self.record_from
    }

    pub fn get_interval(&self) -> i64 {
        self.interval
    }

    /// Samples stored since the last request
    pub fn get_data(&self) -> &[RecordedSample] {
        &self.data
    }

    /// Hands out every stored sample and clears the buffer
    pub fn handle_request(&mut self) -> Vec<RecordedSample> {
        std::mem::take(&mut self.data)
    }
}

impl<S: Recordables> RecordingSink<S> for DataLogger<S> {
    fn init(&mut self) -> Result<(), RecordingError> {
        if self.interval < 1 {
            return Err(RecordingError::ZeroInterval);
        }

        self.accessors = self.record_from.iter()
            .map(|name| {
                S::find_recordable(name).ok_or_else(|| RecordingError::UnknownRecordable(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(())
    }

    fn reset(&mut self) {
        self.data.clear();
    }

    fn record_data(&mut self, step: i64, source: &S) {
        if self.accessors.is_empty() || (step + 1) % self.interval != 0 {
            return;
        }

        self.data.push(RecordedSample {
            step: step + 1,
            values: self.accessors.iter().map(|recordable| (recordable.accessor)(source)).collect(),
        });
    }
}
