//! A stochastic two-point neuron whose receptive field drive is amplified or attenuated
//! by a separate contextual field input.
//!
//! ```text
//! r = receptive field input - w0
//! c = contextual field input - v0
//!
//! activation = r * (k1 + (1 - k1) * exp(k2 * r * c)) + k3 * c
//! theta = 1 / (1 + exp(-activation))
//! ```
//!
//! Input arrives as weighted spikes on two receptor types and is accumulated per
//! step. Every step recomputes `theta`, on the last step of a batch starting at the
//! slice origin the neuron spikes with probability `theta`, so it fires at most once
//! per minimum delay window.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use super::{Node, Recordable, Recordables, SpikeArchive, SpikeHistory, SpikeSink};
use super::recordable_traits::Recordables;
use super::ring_buffer::RingBuffer;
use crate::error::{ContextualNeuronError, EventError, StatusError, UpdateError};
use crate::recording::{DataLogger, RecordedSample, RecordingSink};
use crate::rng::{RngHandle, RngManager};
use crate::simulation::{SimulationClock, SpikeEvent, Time};
use crate::status::Status;


/// Receptor type of the receptive field input
pub const RECEPTIVE_FIELD_RECEPTOR: i64 = 1;
/// Receptor type of the contextual field input
pub const CONTEXTUAL_FIELD_RECEPTOR: i64 = 2;

/// Input channels of the neuron
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Driving input
    ReceptiveField,
    /// Modulatory input
    ContextualField,
}

impl Channel {
    /// Receptor type code used to route events to the channel
    pub fn receptor_type(&self) -> i64 {
        match self {
            Channel::ReceptiveField => RECEPTIVE_FIELD_RECEPTOR,
            Channel::ContextualField => CONTEXTUAL_FIELD_RECEPTOR,
        }
    }

    /// Channel that receives events for the given receptor type
    pub fn from_receptor_type(receptor_type: i64) -> Result<Self, EventError> {
        match receptor_type {
            RECEPTIVE_FIELD_RECEPTOR => Ok(Channel::ReceptiveField),
            CONTEXTUAL_FIELD_RECEPTOR => Ok(Channel::ContextualField),
            _ => Err(EventError::UnknownReceptorType(receptor_type)),
        }
    }

    /// Converts channel to string
    pub fn to_str(&self) -> &'static str {
        match self {
            Channel::ReceptiveField => "receptive_field",
            Channel::ContextualField => "contextual_field",
        }
    }
}

/// Constants of the activation function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextualModulationParameters {
    /// Fraction of the receptive field drive that is not modulated
    pub k1: f64,
    /// Gain of the exponential modulation
    pub k2: f64,
    /// Linear contextual field coefficient
    pub k3: f64,
    /// Re-evaluation interval (ms), stored for configuration only
    pub interval: f64,
}

impl Default for ContextualModulationParameters {
    fn default() -> Self {
        ContextualModulationParameters {
            k1: 0.5,
            k2: 2.0,
            k3: 0.0,
            interval: 1.0, // ms
        }
    }
}

impl ContextualModulationParameters {
    /// Writes every parameter into the status
    pub fn get(&self, status: &mut Status) {
        status.k1 = Some(self.k1);
        status.k2 = Some(self.k2);
        status.k3 = Some(self.k3);
        status.interval = Some(self.interval);
    }

    /// Overwrites the parameters present in the status
    pub fn set(&mut self, status: &Status) {
        if let Some(k1) = status.k1 {
            self.k1 = k1;
        }
        if let Some(k2) = status.k2 {
            self.k2 = k2;
        }
        if let Some(k3) = status.k3 {
            self.k3 = k3;
        }
        if let Some(interval) = status.interval {
            self.interval = interval;
        }
    }
}

/// Dynamic state of the neuron, `theta` is only ever written by the update
#[derive(Debug, Clone, Copy, Default, PartialEq, Recordables)]
pub struct ContextualModulationState {
    /// Receptive field input after subtracting `w0`
    #[recordable]
    pub receptive_field: f64,
    /// Contextual field input after subtracting `v0`
    #[recordable]
    pub contextual_field: f64,
    /// Firing probability
    #[recordable]
    theta: f64,
    /// Receptive field offset
    pub w0: f64,
    /// Contextual field offset
    pub v0: f64,
}

impl ContextualModulationState {
    /// State with the given channel offsets
    pub fn new(w0: f64, v0: f64) -> Self {
        ContextualModulationState {
            w0,
            v0,
            ..ContextualModulationState::default()
        }
    }

    /// Firing probability computed at the last update step
    pub fn get_theta(&self) -> f64 {
        self.theta
    }

    /// Writes every state variable into the status
    pub fn get(&self, status: &mut Status) {
        status.theta = Some(self.theta);
        status.w0 = Some(self.w0);
        status.v0 = Some(self.v0);
        status.receptive_field = Some(self.receptive_field);
        status.contextual_field = Some(self.contextual_field);
    }

    /// Overwrites the state variables present in the status, `theta` is derived
    /// every step and is left untouched
    pub fn set(&mut self, status: &Status) {
        if status.theta.is_some() {
            warn!("theta is derived from the inputs every step, ignoring written value");
        }
        if let Some(w0) = status.w0 {
            self.w0 = w0;
        }
        if let Some(v0) = status.v0 {
            self.v0 = v0;
        }
        if let Some(receptive_field) = status.receptive_field {
            self.receptive_field = receptive_field;
        }
        if let Some(contextual_field) = status.contextual_field {
            self.contextual_field = contextual_field;
        }
    }
}

fn zero_if_nan(value: f64) -> f64 {
    if value.is_nan() { 0. } else { value }
}

/// Combines receptive and contextual field into the activation, overflowing
/// terms saturate to infinity and the result is never NaN for finite inputs
pub fn activation(params: &ContextualModulationParameters, receptive_field: f64, contextual_field: f64) -> f64 {
    // a product of finite factors is only NaN when an overflow meets a zero factor
    let exponent = zero_if_nan(params.k2 * receptive_field * contextual_field);

    let unmodulated = 1. - params.k1;
    let modulation = if unmodulated == 0. {
        params.k1
    } else {
        params.k1 + unmodulated * exponent.exp()
    };

    // opposing saturated terms leave the activation at zero
    zero_if_nan(receptive_field * modulation + params.k3 * contextual_field)
}

/// Maps an activation onto a probability, saturates at `0.` and `1.`
pub fn logistic(activation: f64) -> f64 {
    1. / (1. + (-activation).exp())
}

/// Firing probability for the given inputs after offset subtraction
pub fn firing_probability(
    params: &ContextualModulationParameters,
    receptive_field: f64,
    contextual_field: f64,
) -> f64 {
    logistic(activation(params, receptive_field, contextual_field))
}

/// Two-point neuron integrating a receptive and a contextual field input,
/// spike times are kept in the archive `A` and state samples are offered to
/// the recording sink `R`
#[derive(Clone)]
pub struct ContextualModulationNeuron<
    A: SpikeArchive = SpikeHistory,
    R: RecordingSink<ContextualModulationState> = DataLogger<ContextualModulationState>,
> {
    /// Activation constants
    pub params: ContextualModulationParameters,
    /// Dynamic state
    pub state: ContextualModulationState,
    /// Execution context the neuron is updated in
    pub thread: usize,
    receptive_field_buffer: RingBuffer,
    contextual_field_buffer: RingBuffer,
    min_delay: i64,
    archive: A,
    logger: R,
    rng: Option<RngHandle>,
}

impl<A, R> Debug for ContextualModulationNeuron<A, R>
where
    A: SpikeArchive + Debug,
    R: RecordingSink<ContextualModulationState> + Debug,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("ContextualModulationNeuron")
            .field("params", &self.params)
            .field("state", &self.state)
            .field("thread", &self.thread)
            .field("receptive_field_buffer", &self.receptive_field_buffer)
            .field("contextual_field_buffer", &self.contextual_field_buffer)
            .field("min_delay", &self.min_delay)
            .field("archive", &self.archive)
            .field("logger", &self.logger)
            .field("calibrated", &self.rng.is_some())
            .finish()
    }
}

impl<A, R> Default for ContextualModulationNeuron<A, R>
where
    A: SpikeArchive + Default,
    R: RecordingSink<ContextualModulationState> + Default,
{
    fn default() -> Self {
        ContextualModulationNeuron::new(
            ContextualModulationParameters::default(),
            ContextualModulationState::default(),
            A::default(),
            R::default(),
        )
    }
}

impl ContextualModulationNeuron {
    /// Returns the default implementation of the neuron
    pub fn default_impl() -> Self {
        ContextualModulationNeuron::default()
    }
}

impl<A: SpikeArchive> ContextualModulationNeuron<A, DataLogger<ContextualModulationState>> {
    /// Hands out every sample recorded since the last request
    pub fn handle_data_logging_request(&mut self) -> Vec<RecordedSample> {
        self.logger.handle_request()
    }
}

impl<A, R> ContextualModulationNeuron<A, R>
where
    A: SpikeArchive,
    R: RecordingSink<ContextualModulationState>,
{
    /// Creates a neuron reporting to the given spike archive and recording sink
    pub fn new(
        params: ContextualModulationParameters,
        state: ContextualModulationState,
        archive: A,
        logger: R,
    ) -> Self {
        ContextualModulationNeuron {
            params,
            state,
            thread: 0,
            receptive_field_buffer: RingBuffer::default(),
            contextual_field_buffer: RingBuffer::default(),
            min_delay: 0,
            archive,
            logger,
            rng: None,
        }
    }

    pub fn get_archive(&self) -> &A {
        &self.archive
    }

    pub fn get_logger(&self) -> &R {
        &self.logger
    }

    pub fn get_logger_mut(&mut self) -> &mut R {
        &mut self.logger
    }

    /// Whether a random number generator has been acquired
    pub fn is_calibrated(&self) -> bool {
        self.rng.is_some()
    }

    /// Absolute step of the latest spike
    pub fn get_last_spike_step(&self) -> Option<i64> {
        self.archive.get_last_spike_step()
    }

    /// Resets the state to a copy of the prototype's state
    pub fn init_state(&mut self, prototype: &ContextualModulationState) {
        self.state = *prototype;
    }

    /// Snapshot of every parameter and state variable, the receptor type codes,
    /// and the recordable names
    pub fn get_status(&self) -> Status {
        let mut status = Status::default();
        self.params.get(&mut status);
        self.state.get(&mut status);

        status.receptor_types = Some(BTreeMap::from([
            (Channel::ReceptiveField.to_str().to_string(), RECEPTIVE_FIELD_RECEPTOR),
            (Channel::ContextualField.to_str().to_string(), CONTEXTUAL_FIELD_RECEPTOR),
        ]));
        status.recordables = Some(
            ContextualModulationState::recordable_names().into_iter().map(String::from).collect()
        );

        status
    }

    /// Overwrites the parameters and state variables present in the status, nothing
    /// is changed if any value present is not finite
    pub fn set_status(&mut self, status: &Status) -> Result<(), StatusError> {
        status.check_finite()?;

        self.params.set(status);
        self.state.set(status);

        Ok(())
    }

    /// Adds `weight * multiplicity` to the input of `channel` at the given offset
    /// from the current slice origin
    pub fn handle_channel_event(
        &mut self,
        channel: Channel,
        offset: i64,
        weight: f64,
        multiplicity: u32,
    ) -> Result<(), ContextualNeuronError> {
        let buffer = match channel {
            Channel::ReceptiveField => &mut self.receptive_field_buffer,
            Channel::ContextualField => &mut self.contextual_field_buffer,
        };

        buffer.add_value(offset, weight * multiplicity as f64)?;

        Ok(())
    }

    fn set_buffer_origin(&mut self, origin: Time) {
        self.receptive_field_buffer.set_origin(origin.get_steps());
        self.contextual_field_buffer.set_origin(origin.get_steps());
    }
}

impl<A, R> Node for ContextualModulationNeuron<A, R>
where
    A: SpikeArchive,
    R: RecordingSink<ContextualModulationState>,
{
    fn init_buffers(&mut self, clock: &SimulationClock) {
        self.receptive_field_buffer.resize(clock.buffer_size());
        self.contextual_field_buffer.resize(clock.buffer_size());
        self.set_buffer_origin(clock.get_slice_origin());
        self.min_delay = clock.get_min_delay();

        self.logger.reset();
        self.archive.clear_history();

        debug!(buffer_size = clock.buffer_size(), "initialized input buffers");
    }

    fn calibrate(&mut self, rngs: &RngManager) -> Result<(), ContextualNeuronError> {
        self.logger.init()?;
        self.rng = Some(rngs.get_rng(self.thread)?);

        debug!(thread = self.thread, "calibrated neuron");

        Ok(())
    }

    fn handles_test_event(&self, receptor_type: i64) -> Result<(), EventError> {
        Channel::from_receptor_type(receptor_type).map(|_| ())
    }

    fn handle(&mut self, event: &SpikeEvent, clock: &SimulationClock) -> Result<(), ContextualNeuronError> {
        if event.delay <= 0 {
            return Err(EventError::NonPositiveDelay(event.delay).into());
        }
        let channel = Channel::from_receptor_type(event.receptor_type)?;

        let origin = clock.get_slice_origin();
        let offset = event.get_rel_delivery_steps(origin);
        if offset < 0 {
            return Err(EventError::DeliveryInPast(offset).into());
        }

        self.set_buffer_origin(origin);
        self.handle_channel_event(channel, offset, event.weight, event.multiplicity)
    }

    fn update<S: SpikeSink>(
        &mut self,
        origin: Time,
        from: i64,
        to: i64,
        spike_sink: &mut S,
    ) -> Result<(), ContextualNeuronError> {
        if from < 0 {
            return Err(UpdateError::NegativeStart(from).into());
        }
        if from >= to {
            return Err(UpdateError::EmptyStepRange { from, to }.into());
        }
        if self.receptive_field_buffer.is_empty() || self.contextual_field_buffer.is_empty() {
            return Err(UpdateError::BuffersNotInitialized.into());
        }
        if to > self.min_delay {
            return Err(UpdateError::BeyondMinDelay { to, min_delay: self.min_delay }.into());
        }
        let rng = self.rng.clone().ok_or(UpdateError::NotCalibrated)?;

        self.set_buffer_origin(origin);

        for lag in from..to {
            self.state.receptive_field = self.receptive_field_buffer.get_value(lag)? - self.state.w0;
            self.state.contextual_field = self.contextual_field_buffer.get_value(lag)? - self.state.v0;

            self.state.theta = firing_probability(
                &self.params,
                self.state.receptive_field,
                self.state.contextual_field,
            );

            // only fire once per minimum delay window
            if from == 0 && lag == to - 1 {
                let draw: f64 = rng.lock().gen();

                if draw < self.state.theta {
                    self.archive.set_spike_time(origin.get_steps() + lag + 1);
                    spike_sink.send_spike(lag);

                    trace!(lag, theta = self.state.theta, "neuron spiked");
                }
            }

            self.logger.record_data(origin.get_steps() + lag, &self.state);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        activation, logistic, Channel, ContextualModulationParameters, ContextualModulationState,
        CONTEXTUAL_FIELD_RECEPTOR, RECEPTIVE_FIELD_RECEPTOR,
    };
    use crate::error::EventError;
    use crate::neuron::Recordables;


    #[test]
    fn test_zero_input_is_half() {
        let params = ContextualModulationParameters::default();

        assert_eq!(activation(&params, 0., 0.), 0.);
        assert_eq!(logistic(0.), 0.5);
    }

    #[test]
    fn test_contextual_field_amplifies_drive() {
        let params = ContextualModulationParameters::default();

        let without_context = activation(&params, 1., 0.);
        let with_context = activation(&params, 1., 1.);
        let against_context = activation(&params, 1., -1.);

        assert!(with_context > without_context);
        assert!(against_context < without_context);
        // the modulation never flips the sign of the drive when k3 is zero
        assert!(against_context > 0.);
    }

    #[test]
    fn test_unmodulated_drive_with_overflowing_exponent() {
        let params = ContextualModulationParameters { k1: 1., ..ContextualModulationParameters::default() };

        assert_eq!(activation(&params, 20., 20.), 20.);
        assert_eq!(activation(&params, -20., -20.), -20.);
    }

    #[test]
    fn test_overflow_against_zero_factor() {
        let params = ContextualModulationParameters { k2: 1e300, ..ContextualModulationParameters::default() };

        // k2 * r overflows, the contextual field is zero so nothing is modulated
        assert_eq!(activation(&params, 1e10, 0.), 1e10);
    }

    #[test]
    fn test_opposing_saturated_terms() {
        let params = ContextualModulationParameters { k1: 2., k2: 1., k3: 1e300, interval: 1. };

        // the drive saturates to -inf, the contextual term overflows to +inf
        let value = activation(&params, 1e200, 1e200);
        assert_eq!(value, 0.);
        assert_eq!(logistic(value), 0.5);
    }

    #[test]
    fn test_logistic_saturates() {
        assert_eq!(logistic(f64::INFINITY), 1.);
        assert_eq!(logistic(f64::NEG_INFINITY), 0.);
        assert_eq!(logistic(1e4), 1.);
        assert_eq!(logistic(-1e4), 0.);
    }

    #[test]
    fn test_channel_receptor_types() {
        assert_eq!(Channel::from_receptor_type(RECEPTIVE_FIELD_RECEPTOR), Ok(Channel::ReceptiveField));
        assert_eq!(Channel::from_receptor_type(CONTEXTUAL_FIELD_RECEPTOR), Ok(Channel::ContextualField));
        assert_eq!(Channel::from_receptor_type(0), Err(EventError::UnknownReceptorType(0)));
        assert_eq!(Channel::ContextualField.receptor_type(), CONTEXTUAL_FIELD_RECEPTOR);
    }

    #[test]
    fn test_recordables_table() {
        let mut state = ContextualModulationState::new(0., 0.);
        state.receptive_field = 2.;
        state.contextual_field = -1.;

        assert_eq!(
            ContextualModulationState::recordable_names(),
            vec!["receptive_field", "contextual_field", "theta"],
        );
        assert_eq!(state.get_recordable("receptive_field"), Some(2.));
        assert_eq!(state.get_recordable("contextual_field"), Some(-1.));
        assert_eq!(state.get_recordable("theta"), Some(0.));
        assert_eq!(state.get_recordable("w0"), None);
    }
}
