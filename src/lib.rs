//! # Contextual Neurons
//!
//! `contextual_neurons` implements a discrete-time, stochastic two-point neuron for
//! slice based spiking network simulation. The neuron integrates two independent
//! weighted spike streams, a driving receptive field and a modulating contextual
//! field, combines them through a nonlinear activation, maps the activation onto a
//! firing probability, and fires at most once per minimum delay window.
//!
//! The simulation environment is represented by narrow collaborators: a
//! [`neuron::SpikeSink`] receiving emitted spikes, a [`neuron::SpikeArchive`] keeping
//! spike times, a [`recording::RecordingSink`] sampling the recordable state, and an
//! [`rng::RngManager`] owning one generator per execution context.
//!
//! ## Example Code
//!
//! ### Driving a neuron with receptive and contextual input
//!
//! ```rust
//! use contextual_neurons::{
//!     error::ContextualNeuronError,
//!     neuron::contextual_modulation::{
//!         ContextualModulationNeuron, CONTEXTUAL_FIELD_RECEPTOR, RECEPTIVE_FIELD_RECEPTOR,
//!     },
//!     rng::RngManager,
//!     simulation::{NeuronRun, SimulationClock, SpikeEvent, Time},
//! };
//!
//! fn main() -> Result<(), ContextualNeuronError> {
//!     // 0.1 ms resolution, slices of 10 steps, delays of up to 20 steps
//!     let clock = SimulationClock::new(0.1, 10, 20)?;
//!     let rngs = RngManager::new(42, 1)?;
//!
//!     let mut run = NeuronRun::new(ContextualModulationNeuron::default_impl(), clock);
//!     run.prepare(&rngs)?;
//!
//!     for stamp in (0..100).step_by(10) {
//!         run.schedule(SpikeEvent::new(Time::step(stamp), 5, 2.0, RECEPTIVE_FIELD_RECEPTOR))?;
//!         run.schedule(SpikeEvent::new(Time::step(stamp), 5, 1.0, CONTEXTUAL_FIELD_RECEPTOR))?;
//!     }
//!
//!     let spikes = run.simulate(100)?;
//!     assert!(spikes.len() <= 10);
//!
//!     let samples = run.node.handle_data_logging_request();
//!     assert_eq!(samples.len(), 100);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Configuring a neuron through its status
//!
//! ```rust
//! use contextual_neurons::{
//!     error::StatusError,
//!     neuron::contextual_modulation::ContextualModulationNeuron,
//!     status::Status,
//! };
//!
//! fn main() -> Result<(), StatusError> {
//!     let mut neuron = ContextualModulationNeuron::default_impl();
//!
//!     // unknown keys are ignored
//!     neuron.set_status(&Status::from_json(r#"{"k2": 4.0, "v0": 0.5, "C_m": 250.0}"#)?)?;
//!
//!     let status = neuron.get_status();
//!     assert_eq!(status.k2, Some(4.0));
//!     assert_eq!(status.v0, Some(0.5));
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod neuron;
pub mod recording;
pub mod rng;
pub mod simulation;
pub mod status;
