//! A ring buffer accumulating weighted input for future time steps.
//!
//! Slots are addressed by their offset from the origin of the current slice,
//! the buffer wraps around once the origin moves forward so every slot is
//! reused once it has been drained.

use crate::error::BufferError;


/// Accumulates weighted input per future time step over the scheduling horizon
/// (`min_delay + max_delay` steps)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingBuffer {
    buffer: Vec<f64>,
    origin: i64,
}

impl RingBuffer {
    /// Creates a buffer spanning `size` steps
    pub fn new(size: usize) -> Self {
        RingBuffer {
            buffer: vec![0.; size],
            origin: 0,
        }
    }

    /// Number of steps the buffer spans
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Resizes the buffer to span `size` steps and zeroes every slot
    pub fn resize(&mut self, size: usize) {
        self.buffer.clear();
        self.buffer.resize(size, 0.);
    }

    /// Zeroes every slot
    pub fn clear(&mut self) {
        self.buffer.iter_mut().for_each(|slot| *slot = 0.);
    }

    /// Moves the reference point that offsets are relative to, should be the
    /// absolute step of the current slice origin
    pub fn set_origin(&mut self, origin: i64) {
        self.origin = origin;
    }

    /// Returns the slice origin offsets are currently relative to
    pub fn get_origin(&self) -> i64 {
        self.origin
    }

    fn index(&self, offset: i64) -> Result<usize, BufferError> {
        let size = self.buffer.len();
        if offset < 0 || offset >= size as i64 {
            return Err(BufferError::OffsetOutsideHorizon { offset, size });
        }

        Ok((self.origin + offset).rem_euclid(size as i64) as usize)
    }

    /// Adds `amount` to the slot `offset` steps after the slice origin
    pub fn add_value(&mut self, offset: i64, amount: f64) -> Result<(), BufferError> {
        let index = self.index(offset)?;
        self.buffer[index] += amount;

        Ok(())
    }

    /// Returns the value accumulated for the slot `offset` steps after the slice
    /// origin and resets that slot to zero
    pub fn get_value(&mut self, offset: i64) -> Result<f64, BufferError> {
        let index = self.index(offset)?;

        Ok(std::mem::take(&mut self.buffer[index]))
    }
}
