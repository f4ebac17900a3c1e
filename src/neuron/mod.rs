//! The node lifecycle used by the slice scheduler, the collaborators a node reports
//! to (spike delivery, spike history, recording), and the recordables registry.
//!
//! Nodes are prepared once per run ([`Node::init_buffers`] then [`Node::calibrate`]),
//! receive weighted spike events through [`Node::handle`], and are advanced through
//! a slice of the minimum delay window with [`Node::update`].

pub mod ring_buffer;
pub mod contextual_modulation;
/// A derive macro to build the static table of recordable state variables.
pub mod recordable_traits {
    pub use recordable_traits::*;
}
use crate::error::{ContextualNeuronError, EventError};
use crate::rng::RngManager;
use crate::simulation::{SimulationClock, SpikeEvent, Time};


/// Receives spikes emitted by a node during an update, only the step offset
/// within the current slice is passed, routing and delays are up to the receiver
pub trait SpikeSink {
    /// Delivers a spike emitted at `lag` steps after the slice origin
    fn send_spike(&mut self, lag: i64);
}

impl SpikeSink for Vec<i64> {
    fn send_spike(&mut self, lag: i64) {
        self.push(lag);
    }
}

/// Keeps track of the spike times of a node across a run
pub trait SpikeArchive {
    /// Stores a spike occurring at the given absolute step
    fn set_spike_time(&mut self, step: i64);
    /// Returns the absolute step of the latest spike
    fn get_last_spike_step(&self) -> Option<i64>;
    /// Removes all stored spikes
    fn clear_history(&mut self);
}

/// Spike archive storing every spike step of the current run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpikeHistory {
    /// Absolute spike steps in ascending order
    pub history: Vec<i64>,
}

impl SpikeArchive for SpikeHistory {
    fn set_spike_time(&mut self, step: i64) {
        self.history.push(step);
    }

    fn get_last_spike_step(&self) -> Option<i64> {
        self.history.last().copied()
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// A named, externally observable state variable and how to read it
pub struct Recordable<S> {
    /// Name of the variable
    pub name: &'static str,
    /// Reads the current value of the variable
    pub accessor: fn(&S) -> f64,
}

impl<S> Clone for Recordable<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Recordable<S> {}

impl<S> std::fmt::Debug for Recordable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Recordable").field("name", &self.name).finish()
    }
}

/// Static table of recordable variables, usually implemented through
/// `#[derive(Recordables)]` with `#[recordable]` on each observable field
pub trait Recordables: Sized + 'static {
    /// Returns every recordable variable of the type
    fn recordables() -> &'static [Recordable<Self>];

    /// Returns the names of every recordable variable
    fn recordable_names() -> Vec<&'static str> {
        Self::recordables().iter().map(|recordable| recordable.name).collect()
    }

    /// Looks up the recordable with the given name
    fn find_recordable(name: &str) -> Option<Recordable<Self>> {
        Self::recordables().iter().find(|recordable| recordable.name == name).copied()
    }

    /// Returns the current value of the named variable
    fn get_recordable(&self, name: &str) -> Option<f64> {
        Self::find_recordable(name).map(|recordable| (recordable.accessor)(self))
    }
}

/// A node that can be driven by the slice scheduler
pub trait Node {
    /// Sizes and clears input buffers for the scheduling horizon of the clock,
    /// resets recording and spike history
    fn init_buffers(&mut self, clock: &SimulationClock);
    /// Acquires the generator of the node's execution context and prepares recording
    fn calibrate(&mut self, rngs: &RngManager) -> Result<(), ContextualNeuronError>;
    /// Checks whether events for the given receptor type can be handled
    fn handles_test_event(&self, receptor_type: i64) -> Result<(), EventError>;
    /// Buffers an incoming spike event for its delivery step
    fn handle(&mut self, event: &SpikeEvent, clock: &SimulationClock) -> Result<(), ContextualNeuronError>;
    /// Advances the node over steps `from..to` of the slice starting at `origin`,
    /// spikes are only emitted on the last step of a batch starting at the slice origin
    fn update<S: SpikeSink>(
        &mut self,
        origin: Time,
        from: i64,
        to: i64,
        spike_sink: &mut S,
    ) -> Result<(), ContextualNeuronError>;
}
