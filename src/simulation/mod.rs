//! Discrete simulation time, the slice clock, spike events, and a driver that
//! advances a single node slice by slice.
//!
//! A run is partitioned into slices of `min_delay` steps, events are buffered
//! relative to the origin of the slice they arrive in and may target any step
//! within `min_delay + max_delay` steps of that origin.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use crate::error::{ContextualNeuronError, EventError, SimulationError};
use crate::neuron::Node;
use crate::rng::RngManager;


/// A point in simulation time as a whole number of steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time {
    steps: i64,
}

impl Time {
    /// Time at the given step
    pub fn step(steps: i64) -> Self {
        Time { steps }
    }

    /// Time closest to `ms` milliseconds given the resolution (ms), fails if the
    /// number of steps is not finite or does not fit in an `i64`
    pub fn from_ms(ms: f64, resolution: f64) -> Result<Self, SimulationError> {
        let steps = (ms / resolution).round();
        if !steps.is_finite() || steps.abs() >= i64::MAX as f64 {
            return Err(SimulationError::TimeOutOfRange(ms));
        }

        Ok(Time { steps: steps as i64 })
    }

    pub fn get_steps(&self) -> i64 {
        self.steps
    }

    /// Converts to milliseconds given the resolution (ms)
    pub fn get_ms(&self, resolution: f64) -> f64 {
        self.steps as f64 * resolution
    }
}

/// Keeps track of the simulation resolution, the delay bounds that define the
/// scheduling horizon, and the origin of the current slice
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    resolution: f64,
    min_delay: i64,
    max_delay: i64,
    slice_origin: Time,
}

impl Default for SimulationClock {
    fn default() -> Self {
        SimulationClock {
            resolution: 0.1, // ms
            min_delay: 1,
            max_delay: 1,
            slice_origin: Time::default(),
        }
    }
}

impl SimulationClock {
    /// Creates a clock with the given resolution (ms) and delay bounds (steps)
    pub fn new(resolution: f64, min_delay: i64, max_delay: i64) -> Result<Self, SimulationError> {
        if !resolution.is_finite() || resolution <= 0. {
            return Err(SimulationError::InvalidResolution(resolution));
        }
        if min_delay < 1 {
            return Err(SimulationError::NonPositiveMinDelay(min_delay));
        }
        if max_delay < min_delay {
            return Err(SimulationError::MaxDelayBelowMinDelay { min_delay, max_delay });
        }

        Ok(SimulationClock {
            resolution,
            min_delay,
            max_delay,
            slice_origin: Time::default(),
        })
    }

    pub fn get_resolution(&self) -> f64 {
        self.resolution
    }

    pub fn get_min_delay(&self) -> i64 {
        self.min_delay
    }

    pub fn get_max_delay(&self) -> i64 {
        self.max_delay
    }

    pub fn get_slice_origin(&self) -> Time {
        self.slice_origin
    }

    /// Number of steps input buffers must span
    pub fn buffer_size(&self) -> usize {
        (self.min_delay + self.max_delay) as usize
    }

    /// Moves the slice origin forward by one minimum delay
    pub fn advance_slice(&mut self) {
        self.slice_origin = Time::step(self.slice_origin.get_steps() + self.min_delay);
    }

    /// Number of steps closest to `ms` milliseconds
    pub fn ms_to_steps(&self, ms: f64) -> Result<i64, SimulationError> {
        Ok(Time::from_ms(ms, self.resolution)?.get_steps())
    }
}

/// A weighted spike arriving at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeEvent {
    /// Time the spike was emitted at
    pub stamp: Time,
    /// Transmission delay (steps)
    pub delay: i64,
    /// Synaptic weight
    pub weight: f64,
    /// Number of spikes represented by the event
    pub multiplicity: u32,
    /// Receptor type of the target the event is routed to
    pub receptor_type: i64,
}

impl SpikeEvent {
    /// Single spike emitted at `stamp` for the given receptor type
    pub fn new(stamp: Time, delay: i64, weight: f64, receptor_type: i64) -> Self {
        SpikeEvent {
            stamp,
            delay,
            weight,
            multiplicity: 1,
            receptor_type,
        }
    }

    /// Absolute step the event is delivered at
    pub fn get_delivery_step(&self) -> i64 {
        self.stamp.get_steps() + self.delay - 1
    }

    /// Delivery step relative to the given slice origin
    pub fn get_rel_delivery_steps(&self, slice_origin: Time) -> i64 {
        self.get_delivery_step() - slice_origin.get_steps()
    }
}

/// Drives a single node through a run, delivering scheduled events as their
/// delivery step enters the buffered horizon and collecting emitted spikes
#[derive(Debug, Clone)]
pub struct NeuronRun<N: Node> {
    /// Node being simulated
    pub node: N,
    clock: SimulationClock,
    pending: Vec<SpikeEvent>,
    slice_offset: i64,
    spike_steps: Vec<i64>,
    prepared: bool,
}

impl<N: Node> NeuronRun<N> {
    pub fn new(node: N, clock: SimulationClock) -> Self {
        NeuronRun {
            node,
            clock,
            pending: Vec::new(),
            slice_offset: 0,
            spike_steps: Vec::new(),
            prepared: false,
        }
    }

    pub fn get_clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Absolute step the next update starts at
    pub fn current_step(&self) -> i64 {
        self.clock.get_slice_origin().get_steps() + self.slice_offset
    }

    /// Absolute steps of every spike emitted so far, a spike emitted during step `t`
    /// is stamped at `t + 1`
    pub fn get_spike_steps(&self) -> &[i64] {
        &self.spike_steps
    }

    /// Sizes buffers for the clock's horizon and calibrates the node
    pub fn prepare(&mut self, rngs: &RngManager) -> Result<(), ContextualNeuronError> {
        self.node.init_buffers(&self.clock);
        self.node.calibrate(rngs)?;
        self.spike_steps.clear();
        self.prepared = true;

        debug!(
            min_delay = self.clock.get_min_delay(),
            max_delay = self.clock.get_max_delay(),
            "prepared node for simulation"
        );

        Ok(())
    }

    /// Queues an incoming event, the event must target a known receptor
    /// and must not be delivered before the current step
    pub fn schedule(&mut self, event: SpikeEvent) -> Result<(), ContextualNeuronError> {
        self.node.handles_test_event(event.receptor_type)?;
        if event.delay <= 0 {
            return Err(EventError::NonPositiveDelay(event.delay).into());
        }
        if event.get_delivery_step() < self.current_step() {
            return Err(
                EventError::DeliveryInPast(event.get_rel_delivery_steps(self.clock.get_slice_origin())).into()
            );
        }

        self.pending.push(event);

        Ok(())
    }

    fn deliver_pending(&mut self) -> Result<(), ContextualNeuronError> {
        let origin = self.clock.get_slice_origin();
        let horizon = self.clock.buffer_size() as i64;

        let (ready, waiting): (Vec<SpikeEvent>, Vec<SpikeEvent>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|event| event.get_rel_delivery_steps(origin) < horizon);
        self.pending = waiting;

        let mut ready = ready.into_iter();
        while let Some(event) = ready.next() {
            if let Err(error) = self.deliver(&event, origin) {
                // the failed event and everything after it stay queued
                let mut unhandled = vec![event];
                unhandled.extend(ready);
                unhandled.append(&mut self.pending);
                self.pending = unhandled;

                return Err(error);
            }
        }

        Ok(())
    }

    fn deliver(&mut self, event: &SpikeEvent, origin: Time) -> Result<(), ContextualNeuronError> {
        let rel_delivery = event.get_rel_delivery_steps(origin);
        if rel_delivery < self.slice_offset {
            return Err(EventError::DeliveryInPast(rel_delivery).into());
        }

        self.node.handle(event, &self.clock)
    }

    /// Number of scheduled events not yet handed to the node
    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }

    /// Simulates the given number of steps, returns the steps of spikes emitted
    /// during this call, a run stopping inside a slice resumes from there
    pub fn simulate(&mut self, steps: i64) -> Result<Vec<i64>, ContextualNeuronError> {
        if !self.prepared {
            return Err(SimulationError::NotPrepared.into());
        }

        let min_delay = self.clock.get_min_delay();
        let mut remaining = steps;
        let mut spikes = Vec::new();

        while remaining > 0 {
            self.deliver_pending()?;

            let origin = self.clock.get_slice_origin();
            let from = self.slice_offset;
            let to = (from + remaining).min(min_delay);

            let mut lags: Vec<i64> = Vec::new();
            self.node.update(origin, from, to, &mut lags)?;

            for lag in lags {
                let spike_step = origin.get_steps() + lag + 1;
                trace!(spike_step, "node spiked");
                spikes.push(spike_step);
            }

            remaining -= to - from;
            if to == min_delay {
                self.clock.advance_slice();
                self.slice_offset = 0;
            } else {
                self.slice_offset = to;
            }
        }

        debug!(steps, spikes = spikes.len(), current_step = self.current_step(), "simulated");

        self.spike_steps.extend_from_slice(&spikes);

        Ok(spikes)
    }
}
