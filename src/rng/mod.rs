//! Random number generators owned per execution context.
//!
//! Every context (worker thread) owns exactly one generator, neurons borrow a
//! handle to the generator of their own context when they are calibrated
//! so draws never contend across contexts and stay reproducible per context.

use std::sync::Arc;
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use crate::error::RngError;


/// Shared handle to the generator of one execution context
pub type RngHandle = Arc<Mutex<dyn RngCore + Send>>;

/// Owns one random number generator per execution context
#[derive(Clone)]
pub struct RngManager {
    generators: Vec<RngHandle>,
}

impl RngManager {
    /// Creates `contexts` generators, context `i` is seeded with `seed + i`
    pub fn new(seed: u64, contexts: usize) -> Result<Self, RngError> {
        if contexts == 0 {
            return Err(RngError::NoContexts);
        }

        let generators = (0..contexts)
            .map(|i| {
                let rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
                Arc::new(Mutex::new(rng)) as RngHandle
            })
            .collect();

        Ok(RngManager { generators })
    }

    /// Uses the given generators, one per execution context in order
    pub fn from_generators<R: RngCore + Send + 'static>(generators: Vec<R>) -> Result<Self, RngError> {
        if generators.is_empty() {
            return Err(RngError::NoContexts);
        }

        let generators = generators.into_iter()
            .map(|rng| Arc::new(Mutex::new(rng)) as RngHandle)
            .collect();

        Ok(RngManager { generators })
    }

    /// Number of execution contexts
    pub fn num_contexts(&self) -> usize {
        self.generators.len()
    }

    /// Returns a handle to the generator of the given execution context
    pub fn get_rng(&self, thread: usize) -> Result<RngHandle, RngError> {
        self.generators
            .get(thread)
            .cloned()
            .ok_or(RngError::UnknownThread { thread, contexts: self.generators.len() })
    }
}
